//! Default schema compiler.
//!
//! Infers a structural [`TypeExpr`] for a fragment, brands it with the
//! export name, and pairs it with a `jsonschema` [`ValidationCheck`].

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::capability::SchemaCompiler;
use crate::error::CompileError;
use crate::types::json_type_name;
use crate::validator::ValidationCheck;

/// Import statement for declarations checked with [`ValidationCheck`].
pub const DEFAULT_RUNTIME_IMPORT: &str = "use jsonschema::Validator;";

/// Structural type of a schema fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Unknown,
    Null,
    Boolean,
    Number,
    Integer,
    String,
    Literal(Value),
    /// Another exported declaration, by name.
    Named(String),
    /// An empty union is the uninhabited type.
    Union(Vec<TypeExpr>),
    Array(Box<TypeExpr>),
    Object {
        fields: Vec<Field>,
        /// Whether undeclared properties are allowed.
        open: bool,
    },
    /// A refined type that only values passing the named check inhabit.
    Brand {
        inner: Box<TypeExpr>,
        brand: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    pub required: bool,
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Unknown => f.write_str("unknown"),
            TypeExpr::Null => f.write_str("null"),
            TypeExpr::Boolean => f.write_str("boolean"),
            TypeExpr::Number => f.write_str("number"),
            TypeExpr::Integer => f.write_str("integer"),
            TypeExpr::String => f.write_str("string"),
            TypeExpr::Literal(value) => write!(f, "{}", value),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Union(members) if members.is_empty() => f.write_str("never"),
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            TypeExpr::Array(items) => write!(f, "Array<{}>", items),
            TypeExpr::Object { fields, open } => {
                if fields.is_empty() && !open {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for field in fields {
                    let marker = if field.required { "" } else { "?" };
                    write!(f, "{}{}: {}; ", Value::from(field.name.as_str()), marker, field.ty)?;
                }
                if *open {
                    f.write_str("[key: string]: unknown; ")?;
                }
                f.write_str("}")
            }
            TypeExpr::Brand { inner, brand } => {
                write!(f, "Brand<{}, {}>", inner, Value::from(brand.as_str()))
            }
        }
    }
}

impl Serialize for TypeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A named, exported type plus its run-time check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub export_name: String,
    pub exported: bool,
    #[serde(rename = "type")]
    pub declared_type: TypeExpr,
    #[serde(rename = "fragment")]
    pub check: ValidationCheck,
}

/// [`SchemaCompiler`] backed by the `jsonschema` crate.
///
/// Fragments are lifted out of a Hyper-Schema document. Attach that
/// document with [`JsonSchemaCompiler::with_root`] so local `$ref`s resolve
/// against it; without one, local references are rejected.
#[derive(Debug, Clone)]
pub struct JsonSchemaCompiler {
    runtime_import: String,
    document: Option<Document>,
}

/// The document fragments come from, and the name it is exported under.
#[derive(Debug, Clone)]
struct Document {
    root: Value,
    base_export_name: String,
}

impl Default for JsonSchemaCompiler {
    fn default() -> Self {
        Self {
            runtime_import: DEFAULT_RUNTIME_IMPORT.to_string(),
            document: None,
        }
    }
}

impl JsonSchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the import statement reported to the generation context.
    pub fn with_runtime_import(mut self, statement: impl Into<String>) -> Self {
        self.runtime_import = statement.into();
        self
    }

    /// Resolve local references against `root`, a document exported as
    /// `base_export_name`. A reference to `#` becomes
    /// [`TypeExpr::Named`] of that name.
    pub fn with_root(mut self, root: &Value, base_export_name: impl Into<String>) -> Self {
        self.document = Some(Document {
            root: root.clone(),
            base_export_name: base_export_name.into(),
        });
        self
    }
}

impl SchemaCompiler for JsonSchemaCompiler {
    fn compile(&self, fragment: &Value, export_name: &str) -> Result<Declaration, CompileError> {
        let inner = Inference::new(export_name, self.document.as_ref()).infer(fragment)?;
        let check = match &self.document {
            Some(document) => ValidationCheck::in_document(fragment, &document.root),
            None => ValidationCheck::new(fragment),
        }
        .map_err(|message| CompileError::InvalidSchema {
            export_name: export_name.to_string(),
            message,
        })?;

        Ok(Declaration {
            export_name: export_name.to_string(),
            exported: true,
            declared_type: TypeExpr::Brand {
                inner: Box::new(inner),
                brand: export_name.to_string(),
            },
            check,
        })
    }

    fn runtime_import(&self) -> &str {
        &self.runtime_import
    }
}

/// Infer the structural type of a standalone schema.
///
/// # Errors
///
/// Returns `CompileError` for non-schema values, unknown `type` names and
/// local `$ref`s, which need a document to resolve against.
pub fn infer_type(schema: &Value, export_name: &str) -> Result<TypeExpr, CompileError> {
    Inference::new(export_name, None).infer(schema)
}

struct Inference<'a> {
    export_name: &'a str,
    document: Option<&'a Document>,
    /// Pointers currently being expanded; a repeat is a cycle.
    resolving: Vec<&'a str>,
}

impl<'a> Inference<'a> {
    fn new(export_name: &'a str, document: Option<&'a Document>) -> Self {
        Self {
            export_name,
            document,
            resolving: Vec::new(),
        }
    }

    fn infer(&mut self, schema: &'a Value) -> Result<TypeExpr, CompileError> {
        let map = match schema {
            Value::Bool(true) => return Ok(TypeExpr::Unknown),
            Value::Bool(false) => return Ok(TypeExpr::Union(Vec::new())),
            Value::Object(map) => map,
            other => {
                return Err(self.invalid(format!(
                    "expected object or boolean schema, got {}",
                    json_type_name(other)
                )))
            }
        };

        if let Some(Value::String(reference)) = map.get("$ref") {
            if let Some(ty) = self.infer_ref(reference)? {
                return Ok(ty);
            }
        }

        if let Some(value) = map.get("const") {
            return Ok(TypeExpr::Literal(value.clone()));
        }

        if let Some(values) = map.get("enum") {
            let Value::Array(values) = values else {
                return Err(self.invalid(format!(
                    "enum must be an array, got {}",
                    json_type_name(values)
                )));
            };
            return Ok(union(values.iter().cloned().map(TypeExpr::Literal).collect()));
        }

        for keyword in ["anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = map.get(keyword) {
                let members = branches
                    .iter()
                    .map(|branch| self.infer(branch))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(union(members));
            }
        }

        match map.get("type") {
            Some(Value::String(name)) => self.infer_named(name, map),
            Some(Value::Array(names)) => {
                let members = names
                    .iter()
                    .map(|name| match name {
                        Value::String(name) => self.infer_named(name, map),
                        other => Err(self.unsupported(format!("type {}", other))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(union(members))
            }
            Some(other) => Err(self.unsupported(format!("type {}", other))),
            None if map.contains_key("properties") => self.infer_object(map),
            None => Ok(TypeExpr::Unknown),
        }
    }

    /// Type of a local `$ref`, or `None` for references to other resources.
    fn infer_ref(&mut self, reference: &'a str) -> Result<Option<TypeExpr>, CompileError> {
        let Some(pointer) = reference.strip_prefix('#') else {
            return Ok(None);
        };
        let Some(document) = self.document else {
            return Err(self.unsupported(format!("$ref \"{}\"", reference)));
        };

        if pointer.is_empty() {
            return Ok(Some(TypeExpr::Named(document.base_export_name.clone())));
        }
        // Plain-name anchors are left to the validator.
        if !pointer.starts_with('/') || self.resolving.contains(&pointer) {
            return Ok(Some(TypeExpr::Unknown));
        }

        let target = document.root.pointer(pointer).ok_or_else(|| {
            self.invalid(format!("$ref \"{}\" does not resolve in the document", reference))
        })?;
        self.resolving.push(pointer);
        let ty = self.infer(target);
        self.resolving.pop();
        ty.map(Some)
    }

    fn infer_named(
        &mut self,
        name: &str,
        map: &'a Map<String, Value>,
    ) -> Result<TypeExpr, CompileError> {
        match name {
            "null" => Ok(TypeExpr::Null),
            "boolean" => Ok(TypeExpr::Boolean),
            "number" => Ok(TypeExpr::Number),
            "integer" => Ok(TypeExpr::Integer),
            "string" => Ok(TypeExpr::String),
            "array" => {
                let items = match map.get("items") {
                    Some(items @ (Value::Object(_) | Value::Bool(_))) => self.infer(items)?,
                    _ => TypeExpr::Unknown,
                };
                Ok(TypeExpr::Array(Box::new(items)))
            }
            "object" => self.infer_object(map),
            other => Err(self.unsupported(format!("type \"{}\"", other))),
        }
    }

    fn infer_object(&mut self, map: &'a Map<String, Value>) -> Result<TypeExpr, CompileError> {
        let required: Vec<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let Some(Value::Object(properties)) = map.get("properties") {
            for (name, schema) in properties {
                fields.push(Field {
                    name: name.clone(),
                    ty: self.infer(schema)?,
                    required: required.contains(&name.as_str()),
                });
            }
        }

        let open = !matches!(map.get("additionalProperties"), Some(Value::Bool(false)));
        Ok(TypeExpr::Object { fields, open })
    }

    fn invalid(&self, message: String) -> CompileError {
        CompileError::InvalidSchema {
            export_name: self.export_name.to_string(),
            message,
        }
    }

    fn unsupported(&self, keyword: String) -> CompileError {
        CompileError::Unsupported {
            export_name: self.export_name.to_string(),
            keyword,
        }
    }
}

fn union(mut members: Vec<TypeExpr>) -> TypeExpr {
    if members.len() == 1 {
        members.remove(0)
    } else {
        TypeExpr::Union(members)
    }
}
