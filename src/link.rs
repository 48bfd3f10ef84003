//! Selection of the link that governs a resource.

use serde::Serialize;
use serde_json::Value;

use crate::error::DeriveError;
use crate::types::{json_type_name, Ldo, SELF_REL};

/// Kind of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    /// More than one `rel="self"` link; nothing is generated.
    AmbiguousSelfLink,
    /// Links with other relations were ignored.
    UnsupportedRelation,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::AmbiguousSelfLink => "ambiguous-self-link",
            DiagnosticCode::UnsupportedRelation => "unsupported-relation",
        }
    }
}

/// A non-fatal diagnostic emitted during derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    fn ambiguous_self_link() -> Self {
        Self {
            code: DiagnosticCode::AmbiguousSelfLink,
            message: r#"found several links where rel="self""#.to_string(),
        }
    }

    fn unsupported_relation() -> Self {
        Self {
            code: DiagnosticCode::UnsupportedRelation,
            message: r#"only hyper schema links with rel="self" are supported at the moment"#
                .to_string(),
        }
    }
}

/// Outcome of link selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The governing self link, if exactly one exists.
    pub link: Option<Ldo>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Pick the single `rel="self"` link of a Hyper-Schema document.
///
/// A missing `links` keyword counts as no links. Several self links are
/// ambiguous and select nothing; a single self link next to other
/// relations is selected with a diagnostic.
///
/// # Errors
///
/// Returns `DeriveError::InvalidLinks` if `links` is not an array, or
/// `DeriveError::InvalidLink` if the selected link has malformed fields.
pub fn select_self_link(root: &Value) -> Result<Selection, DeriveError> {
    let links: &[Value] = match root.get("links") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(links)) => links,
        Some(other) => {
            return Err(DeriveError::InvalidLinks {
                actual: json_type_name(other).to_string(),
            })
        }
    };

    let selfs: Vec<(usize, &Value)> = links
        .iter()
        .enumerate()
        .filter(|(_, link)| link.get("rel").and_then(Value::as_str) == Some(SELF_REL))
        .collect();

    tracing::debug!(
        links = links.len(),
        self_links = selfs.len(),
        "selecting governing link"
    );

    let mut diagnostics = Vec::new();

    if selfs.len() > 1 {
        diagnostics.push(Diagnostic::ambiguous_self_link());
        return Ok(Selection {
            link: None,
            diagnostics,
        });
    }
    if !selfs.is_empty() && selfs.len() != links.len() {
        diagnostics.push(Diagnostic::unsupported_relation());
    }

    let link = match selfs.first() {
        Some(&(index, value)) => Some(
            serde_json::from_value::<Ldo>(value.clone())
                .map_err(|source| DeriveError::InvalidLink { index, source })?,
        ),
        None => None,
    };

    Ok(Selection { link, diagnostics })
}
