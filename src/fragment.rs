//! Schema fragments derived from a self link.
//!
//! Every artifact is described by one [`ArtifactSpec`] row: which LDO field
//! feeds the fragment, the export suffix, and the human-facing text.
//!
//! | Artifact | Fragment |
//! |----------|----------|
//! | Href Template | `const` and `default` of the `href` string |
//! | Href Variables | `hrefSchema` as-is |
//! | Request Headers | object of `headerSchema`, all required, open |
//! | Request Body | `submissionSchema` as-is |
//! | Response Headers | object of `targetHints` enums, all required, open |
//! | Response Body | `targetSchema` as-is |

use serde_json::{json, Map, Value};

use crate::types::{ArtifactKind, Ldo};

/// One row of the derivation table.
#[derive(Clone, Copy)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub title: &'static str,
    pub description: &'static str,
    pub build: fn(&Ldo) -> Value,
}

/// Derivation table, in output order.
pub static ARTIFACTS: [ArtifactSpec; 6] = [
    ArtifactSpec {
        kind: ArtifactKind::HrefTemplate,
        title: "Href Template",
        description: "Href body format as described by hyper schema href.",
        build: href_template,
    },
    ArtifactSpec {
        kind: ArtifactKind::HrefVariables,
        title: "Href Variables",
        description: "Href body format as described by hyper schema hrefSchema.",
        build: href_variables,
    },
    ArtifactSpec {
        kind: ArtifactKind::RequestHeaders,
        title: "Request Headers",
        description: "Request headers format as described by hyper schema headerSchema.",
        build: request_headers,
    },
    ArtifactSpec {
        kind: ArtifactKind::RequestBody,
        title: "Request Body",
        description: "Request body format as described by hyper schema submissionSchema.",
        build: request_body,
    },
    ArtifactSpec {
        kind: ArtifactKind::ResponseHeaders,
        title: "Response Headers",
        description: "Response headers format as described by hyper schema targetHints.",
        build: response_headers,
    },
    ArtifactSpec {
        kind: ArtifactKind::ResponseBody,
        title: "Response Body",
        description: "Response body format as described by hyper schema targetSchema.",
        build: response_body,
    },
];

/// Look up the table row for an artifact kind.
pub fn artifact_spec(kind: ArtifactKind) -> &'static ArtifactSpec {
    // ARTIFACTS is indexed in ArtifactKind::ALL order
    &ARTIFACTS[kind as usize]
}

/// Build the fragment for one artifact of `link`.
pub fn derive_fragment(kind: ArtifactKind, link: &Ldo) -> Value {
    (artifact_spec(kind).build)(link)
}

fn href_template(link: &Ldo) -> Value {
    json!({
        "type": "string",
        "const": link.href,
        "default": link.href,
    })
}

fn href_variables(link: &Ldo) -> Value {
    verbatim(link.href_schema.as_ref())
}

fn request_headers(link: &Ldo) -> Value {
    open_object(
        link.header_schema.clone(),
        link.header_schema.keys().cloned().collect(),
    )
}

fn request_body(link: &Ldo) -> Value {
    verbatim(link.submission_schema.as_ref())
}

fn response_headers(link: &Ldo) -> Value {
    let properties: Map<String, Value> = link
        .target_hints
        .iter()
        .map(|hint| (hint.field.clone(), json!({ "enum": hint.values })))
        .collect();
    let required = link.target_hints.iter().map(|h| h.field.clone()).collect();
    open_object(properties, required)
}

fn response_body(link: &Ldo) -> Value {
    verbatim(link.target_schema.as_ref())
}

/// An absent schema accepts anything.
fn verbatim(schema: Option<&Value>) -> Value {
    schema.cloned().unwrap_or_else(|| Value::Object(Map::new()))
}

fn open_object(properties: Map<String, Value>, required: Vec<String>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": true,
    })
}
