//! Declaration packaging and the derivation pipeline.

use serde::Serialize;
use serde_json::Value;

use crate::capability::{
    Context, GenerationContext, KeywordIntrospector, SchemaCompiler, SchemaIntrospector,
};
use crate::compiler::{Declaration, JsonSchemaCompiler};
use crate::error::DeriveError;
use crate::fragment::{ArtifactSpec, ARTIFACTS};
use crate::link::{select_self_link, Diagnostic};
use crate::types::{ArtifactKind, DeriveOptions, Ldo};

/// Presentation metadata for one declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub title: String,
    pub description: String,
    pub examples: Vec<Value>,
    pub default_value: Option<Value>,
}

/// One packaged artifact: metadata plus declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefInput {
    pub kind: ArtifactKind,
    pub meta: Meta,
    #[serde(flatten)]
    pub dec: Declaration,
}

impl DefInput {
    pub fn export_name(&self) -> &str {
        &self.dec.export_name
    }

    pub fn fragment(&self) -> &Value {
        self.dec.check.schema()
    }
}

/// Result of a derivation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivation {
    /// Either empty or all six artifacts in [`ArtifactKind::ALL`] order.
    pub records: Vec<DefInput>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Derivation {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&DefInput> {
        self.records.iter().find(|record| record.kind == kind)
    }

    /// Whether the run succeeded under `options`.
    ///
    /// In strict mode any diagnostic is a failure.
    pub fn passes(&self, options: &DeriveOptions) -> bool {
        !options.strict || self.diagnostics.is_empty()
    }
}

/// Run [`derive_artifacts`] with the built-in capabilities.
///
/// Local `$ref`s in the link's schemas resolve against `root`.
///
/// Returns the derivation together with the context, which holds the
/// import statements the declarations need.
///
/// # Errors
///
/// Returns `DeriveError` as [`derive_artifacts`] does.
pub fn derive_with_defaults(
    root: &Value,
    options: &DeriveOptions,
) -> Result<(Derivation, Context), DeriveError> {
    let mut context = Context::new(options.base_export_name.as_str());
    let compiler = JsonSchemaCompiler::new().with_root(root, options.base_export_name.as_str());
    let derivation = derive_artifacts(root, &compiler, &KeywordIntrospector, &mut context)?;
    Ok((derivation, context))
}

/// Derive the six declarations of a Hyper-Schema document.
///
/// Selects the single `rel="self"` link and packages one record per
/// artifact kind. Returns no records when there is no self link or when
/// several exist. Every diagnostic is both returned and handed to
/// `context`.
///
/// # Errors
///
/// Returns `DeriveError` if `links` is malformed or the compiler rejects a
/// fragment.
pub fn derive_artifacts<C, I, G>(
    root: &Value,
    compiler: &C,
    introspector: &I,
    context: &mut G,
) -> Result<Derivation, DeriveError>
where
    C: SchemaCompiler + ?Sized,
    I: SchemaIntrospector + ?Sized,
    G: GenerationContext + ?Sized,
{
    let selection = select_self_link(root)?;
    for diagnostic in &selection.diagnostics {
        context.warning(diagnostic);
    }

    let records = match &selection.link {
        Some(link) => from_self_link(link, compiler, introspector, context)?,
        None => Vec::new(),
    };

    Ok(Derivation {
        records,
        diagnostics: selection.diagnostics,
    })
}

/// Package all six artifacts of a self link.
///
/// # Errors
///
/// Returns `DeriveError::Compile` on the first fragment the compiler rejects.
pub fn from_self_link<C, I, G>(
    link: &Ldo,
    compiler: &C,
    introspector: &I,
    context: &mut G,
) -> Result<Vec<DefInput>, DeriveError>
where
    C: SchemaCompiler + ?Sized,
    I: SchemaIntrospector + ?Sized,
    G: GenerationContext + ?Sized,
{
    context.add_import(compiler.runtime_import());

    ARTIFACTS
        .iter()
        .map(|spec| {
            let fragment = (spec.build)(link);
            package(
                context.base_export_name(),
                spec,
                fragment,
                compiler,
                introspector,
            )
        })
        .collect()
}

/// Wrap one fragment into a [`DefInput`].
///
/// # Errors
///
/// Propagates the compiler's error unchanged.
pub fn package<C, I>(
    base_export_name: &str,
    spec: &ArtifactSpec,
    fragment: Value,
    compiler: &C,
    introspector: &I,
) -> Result<DefInput, DeriveError>
where
    C: SchemaCompiler + ?Sized,
    I: SchemaIntrospector + ?Sized,
{
    let export_name = format!("{}{}", base_export_name, spec.kind.suffix());
    tracing::debug!(export = %export_name, kind = %spec.kind, "packaging declaration");

    let meta = Meta {
        title: spec.title.to_string(),
        description: spec.description.to_string(),
        examples: introspector.examples(&fragment),
        default_value: introspector.default_value(&fragment),
    };
    let dec = compiler.compile(&fragment, &export_name)?;

    Ok(DefInput {
        kind: spec.kind,
        meta,
        dec,
    })
}
