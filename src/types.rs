//! Core types for Hyper-Schema link derivation.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The only link relation this crate generates declarations for.
pub const SELF_REL: &str = "self";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A Link Description Object from a Hyper-Schema `links` array.
///
/// Only the fields read by the derivation pipeline are kept; any other
/// LDO keywords (`title`, `method`, `anchor`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ldo {
    #[serde(default)]
    pub rel: String,
    /// URL template, e.g. `/widgets/{id}`.
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href_schema: Option<Value>,
    /// Header name to schema, in declaration order.
    #[serde(default)]
    pub header_schema: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_schema: Option<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_target_hints",
        serialize_with = "serialize_target_hints"
    )]
    pub target_hints: Vec<TargetHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<Value>,
}

/// One `targetHints` entry: a response header and its allowed values.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetHint {
    pub field: String,
    pub values: Vec<Value>,
}

fn deserialize_target_hints<'de, D>(deserializer: D) -> Result<Vec<TargetHint>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Map::<String, Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(field, values)| match values {
            Value::Array(values) => Ok(TargetHint { field, values }),
            other => Err(D::Error::custom(format!(
                "targetHints/{}: expected array, got {}",
                field,
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn serialize_target_hints<S>(hints: &[TargetHint], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let map: Map<String, Value> = hints
        .iter()
        .map(|hint| (hint.field.clone(), Value::Array(hint.values.clone())))
        .collect();
    map.serialize(serializer)
}

/// The six declarations derived from a self link, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    HrefTemplate,
    HrefVariables,
    RequestHeaders,
    RequestBody,
    ResponseHeaders,
    ResponseBody,
}

impl ArtifactKind {
    /// All kinds in the order records are produced.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::HrefTemplate,
        ArtifactKind::HrefVariables,
        ArtifactKind::RequestHeaders,
        ArtifactKind::RequestBody,
        ArtifactKind::ResponseHeaders,
        ArtifactKind::ResponseBody,
    ];

    /// Suffix appended to the base export name.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::HrefTemplate => "_HrefTemplate",
            ArtifactKind::HrefVariables => "_HrefVariables",
            ArtifactKind::RequestHeaders => "_RequestHeaders",
            ArtifactKind::RequestBody => "_RequestBody",
            ArtifactKind::ResponseHeaders => "_ResponseHeaders",
            ArtifactKind::ResponseBody => "_ResponseBody",
        }
    }

    /// Kebab-case name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::HrefTemplate => "href-template",
            ArtifactKind::HrefVariables => "href-variables",
            ArtifactKind::RequestHeaders => "request-headers",
            ArtifactKind::RequestBody => "request-body",
            ArtifactKind::ResponseHeaders => "response-headers",
            ArtifactKind::ResponseBody => "response-body",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown artifact \"{}\": expected one of {}", s, names.join(", "))
            })
    }
}

/// Options for a derivation run.
#[derive(Debug, Clone)]
pub struct DeriveOptions {
    /// Export name every artifact suffix is appended to.
    pub base_export_name: String,
    /// When true, any diagnostic makes the run count as failed.
    pub strict: bool,
}

impl DeriveOptions {
    /// Create options for the given base export name, strict mode off.
    pub fn new(base_export_name: impl Into<String>) -> Self {
        Self {
            base_export_name: base_export_name.into(),
            strict: false,
        }
    }

    /// Set strict mode (diagnostics are failures).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
