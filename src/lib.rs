//! Hyper-Schema Declarations
//!
//! Derives six named, validated declarations from the `rel="self"` link of a
//! JSON Hyper-Schema document: the href template, href variables, request
//! headers, request body, response headers and response body.
//!
//! # Example
//!
//! ```
//! use hyper_schema_defs::{derive_artifacts, Context, JsonSchemaCompiler, KeywordIntrospector};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "links": [{
//!         "rel": "self",
//!         "href": "/widgets/{id}",
//!         "headerSchema": { "X-Key": { "type": "string" } },
//!         "targetHints": { "X-Status": ["ok", "error"] }
//!     }]
//! });
//!
//! let mut context = Context::new("Widget");
//! let derivation = derive_artifacts(
//!     &schema,
//!     &JsonSchemaCompiler::new(),
//!     &KeywordIntrospector,
//!     &mut context,
//! )
//! .unwrap();
//!
//! assert_eq!(derivation.records.len(), 6);
//! assert_eq!(derivation.records[0].export_name(), "Widget_HrefTemplate");
//! assert!(derivation.records[2].dec.check.is_valid(&json!({ "X-Key": "k", "X-Extra": 1 })));
//! assert!(!derivation.records[4].dec.check.is_valid(&json!({ "X-Status": "unknown" })));
//! ```
//!
//! # Link Selection
//!
//! | Links | Records | Diagnostics |
//! |-------|---------|-------------|
//! | none, or no `rel="self"` | 0 | none |
//! | exactly one `rel="self"` | 6 | none |
//! | one `rel="self"` plus others | 6 | unsupported relation |
//! | several `rel="self"` | 0 | ambiguous self link |

mod capability;
mod compiler;
mod derive;
mod error;
mod fragment;
mod link;
mod loader;
mod types;
mod validator;

pub use capability::{
    Context, GenerationContext, KeywordIntrospector, SchemaCompiler, SchemaIntrospector,
};
pub use compiler::{
    infer_type, Declaration, Field, JsonSchemaCompiler, TypeExpr, DEFAULT_RUNTIME_IMPORT,
};
pub use derive::{
    derive_artifacts, derive_with_defaults, from_self_link, package, DefInput, Derivation, Meta,
};
pub use error::{CompileError, DeriveError, LoadError, SchemaError, ValidateError};
pub use fragment::{artifact_spec, derive_fragment, ArtifactSpec, ARTIFACTS};
pub use link::{select_self_link, Diagnostic, DiagnosticCode, Selection};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, load_payload,
};
pub use types::{ArtifactKind, DeriveOptions, Ldo, TargetHint, SELF_REL};
pub use validator::ValidationCheck;

#[cfg(feature = "remote")]
pub use loader::load_document_url;
