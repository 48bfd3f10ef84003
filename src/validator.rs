//! Run-time checks attached to compiled declarations.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{SchemaError, ValidateError};

/// Base URI the enclosing Hyper-Schema document is registered under.
const DOCUMENT_URI: &str = "urn:hyper-schema-defs:document";

/// Run-time validation predicate for one declaration.
///
/// Wraps a compiled `jsonschema` validator together with the fragment it
/// was built from. Cloning shares the compiled validator.
#[derive(Clone)]
pub struct ValidationCheck {
    schema: Value,
    validator: Arc<jsonschema::Validator>,
}

impl ValidationCheck {
    /// Compile a check for `schema`.
    ///
    /// # Errors
    ///
    /// Returns the validator's message if `schema` is not a valid JSON Schema.
    pub fn new(schema: &Value) -> Result<Self, String> {
        let validator = jsonschema::validator_for(schema).map_err(|e| e.to_string())?;
        Ok(Self {
            schema: schema.clone(),
            validator: Arc::new(validator),
        })
    }

    /// Compile a check for a fragment lifted out of `document`.
    ///
    /// Local references (`#`, `#/definitions/...`) in the fragment resolve
    /// against `document` instead of the fragment itself.
    ///
    /// # Errors
    ///
    /// Returns the validator's message if `schema` is not a valid JSON
    /// Schema or a reference does not resolve.
    pub fn in_document(schema: &Value, document: &Value) -> Result<Self, String> {
        let mut contents = document.clone();
        if let Value::Object(map) = &mut contents {
            map.remove("$schema");
        }
        let resource = jsonschema::Draft::Draft202012.create_resource(contents);

        let validator = jsonschema::options()
            .with_resource(DOCUMENT_URI, resource)
            .build(&anchor_local_refs(schema))
            .map_err(|e| e.to_string())?;
        Ok(Self {
            schema: schema.clone(),
            validator: Arc::new(validator),
        })
    }

    /// The fragment this check enforces.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn is_valid(&self, payload: &Value) -> bool {
        self.validator.is_valid(payload)
    }

    /// Validate a payload, collecting every error.
    ///
    /// # Errors
    ///
    /// Returns `ValidateError::Invalid` if the payload doesn't match.
    pub fn validate(&self, payload: &Value) -> Result<(), ValidateError> {
        let errors: Vec<SchemaError> = self
            .validator
            .iter_errors(payload)
            .map(|e| SchemaError {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidateError::Invalid { errors })
        }
    }
}

/// Rewrite `#...` references to point into the registered document.
///
/// Subschemas with their own `$id` are left alone; their local references
/// name themselves.
fn anchor_local_refs(schema: &Value) -> Value {
    match schema {
        Value::Object(map) if map.contains_key("$id") => schema.clone(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(reference) if key == "$ref" && reference.starts_with('#') => {
                        Value::String(format!("{}{}", DOCUMENT_URI, reference))
                    }
                    other => anchor_local_refs(other),
                };
                (key.clone(), value)
            })
            .collect(),
        Value::Array(items) => items.iter().map(anchor_local_refs).collect(),
        other => other.clone(),
    }
}

impl fmt::Debug for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationCheck")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ValidationCheck {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
    }
}

impl Serialize for ValidationCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.schema.serialize(serializer)
    }
}
