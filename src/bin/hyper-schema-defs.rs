//! Hyper-Schema Declarations CLI
//!
//! Command-line interface for deriving self-link declarations and checking
//! payloads against them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hyper_schema_defs::{
    derive_with_defaults, load_document_auto, load_payload, ArtifactKind, DeriveOptions,
    ValidateError,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hyper-schema-defs")]
#[command(about = "Derive validated declarations from JSON Hyper-Schema self links")]
#[command(version)]
struct Cli {
    /// Log derivation steps (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the six declarations of a schema's rel="self" link
    Derive {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Base export name the artifact suffixes are appended to
        #[arg(long, short)]
        name: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Fail when any diagnostic is emitted
        #[arg(long)]
        strict: bool,
    },

    /// Check a payload against one derived declaration
    Check {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Payload file to check
        payload: PathBuf,

        /// Base export name the artifact suffixes are appended to
        #[arg(long, short)]
        name: String,

        /// Artifact to check against (e.g., request-body, response-headers)
        #[arg(long, short)]
        artifact: ArtifactKind,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Derive {
            schema,
            name,
            output,
            pretty,
            strict,
        } => run_derive(&schema, DeriveOptions::new(name).strict(strict), output, pretty),

        Commands::Check {
            schema,
            payload,
            name,
            artifact,
            json,
        } => run_check(&schema, &payload, name, artifact, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "hyper_schema_defs=debug"
    } else {
        "hyper_schema_defs=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_derive(
    schema_source: &str,
    options: DeriveOptions,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let schema = load_document_auto(schema_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let (derivation, context) = derive_with_defaults(&schema, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let document = serde_json::json!({
        "imports": context.imports(),
        "records": derivation.records,
        "diagnostics": derivation.diagnostics,
    });

    let json_output = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    if derivation.passes(&options) {
        Ok(())
    } else {
        eprintln!(
            "Error: {} diagnostic(s) in strict mode",
            derivation.diagnostics.len()
        );
        Err(1)
    }
}

fn run_check(
    schema_source: &str,
    payload_path: &Path,
    name: String,
    artifact: ArtifactKind,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_payload(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let schema = load_document_auto(schema_source).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;

    let (derivation, _) = derive_with_defaults(&schema, &DeriveOptions::new(name)).map_err(|e| {
        report_error(json_output, &e.to_string());
        e.exit_code() as u8
    })?;

    let Some(record) = derivation.get(artifact) else {
        report_error(
            json_output,
            "no declarations derived: schema needs exactly one rel=\"self\" link",
        );
        return Err(2);
    };

    match record.dec.check.validate(&payload) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid {}", record.export_name());
            }
            Ok(())
        }
        Err(e) => {
            let code = e.exit_code() as u8;
            let ValidateError::Invalid { errors } = e;
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed for {}:", record.export_name());
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(code)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
