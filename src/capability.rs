//! Collaborator interfaces consumed by the derivation pipeline.
//!
//! The pipeline never compiles schemas, extracts examples, or names things
//! on its own. It asks three independent capabilities:
//!
//! - [`SchemaCompiler`] turns a fragment into a [`Declaration`].
//! - [`SchemaIntrospector`] pulls example and default values out of a fragment.
//! - [`GenerationContext`] supplies the base export name and receives
//!   diagnostics and import statements.

use serde_json::Value;

use crate::compiler::Declaration;
use crate::error::CompileError;
use crate::link::Diagnostic;

/// Compiles a JSON Schema fragment into a named declaration.
pub trait SchemaCompiler {
    /// Compile `fragment` into a declaration exported as `export_name`.
    ///
    /// # Errors
    ///
    /// Returns `CompileError` when the fragment uses constructs the
    /// compiler cannot represent.
    fn compile(&self, fragment: &Value, export_name: &str) -> Result<Declaration, CompileError>;

    /// Import statement for the run-time validation library the
    /// compiled declarations depend on.
    fn runtime_import(&self) -> &str;
}

/// Extracts presentation values from a JSON Schema fragment.
pub trait SchemaIntrospector {
    /// Example values for the fragment, possibly empty.
    fn examples(&self, fragment: &Value) -> Vec<Value>;

    /// Default value for the fragment, if it declares one.
    fn default_value(&self, fragment: &Value) -> Option<Value>;
}

/// Per-run generation state shared with the caller.
pub trait GenerationContext {
    /// Export name every artifact suffix is appended to.
    fn base_export_name(&self) -> &str;

    /// Receive a non-fatal diagnostic.
    fn warning(&mut self, diagnostic: &Diagnostic) {
        log_diagnostic(diagnostic);
    }

    /// Record an import statement the generated declarations need.
    fn add_import(&mut self, statement: &str);
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    tracing::warn!(code = diagnostic.code.as_str(), "{}", diagnostic.message);
}

/// Introspector reading the `examples`, `const` and `default` keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntrospector;

impl SchemaIntrospector for KeywordIntrospector {
    fn examples(&self, fragment: &Value) -> Vec<Value> {
        match fragment.get("examples") {
            Some(Value::Array(examples)) => examples.clone(),
            Some(_) => Vec::new(),
            None => fragment.get("const").cloned().into_iter().collect(),
        }
    }

    fn default_value(&self, fragment: &Value) -> Option<Value> {
        fragment.get("default").cloned()
    }
}

/// In-memory [`GenerationContext`].
///
/// Imports are de-duplicated and kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Context {
    base_export_name: String,
    imports: Vec<String>,
    warnings: Vec<Diagnostic>,
}

impl Context {
    pub fn new(base_export_name: impl Into<String>) -> Self {
        Self {
            base_export_name: base_export_name.into(),
            imports: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

impl GenerationContext for Context {
    fn base_export_name(&self) -> &str {
        &self.base_export_name
    }

    fn warning(&mut self, diagnostic: &Diagnostic) {
        log_diagnostic(diagnostic);
        self.warnings.push(diagnostic.clone());
    }

    fn add_import(&mut self, statement: &str) {
        if !self.imports.iter().any(|s| s == statement) {
            self.imports.push(statement.to_string());
        }
    }
}
