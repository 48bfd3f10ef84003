//! Error types for loading, deriving and validating.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a Hyper-Schema document or payload.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON in {origin}: {source}")]
    InvalidJson {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{origin} is not a Hyper-Schema document: expected object, got {actual}")]
    NotADocument { origin: String, actual: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } | LoadError::NotADocument { .. } => 2,
        }
    }
}

/// Errors reported by a schema compiler for a single fragment.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot compile {export_name}: {message}")]
    InvalidSchema {
        export_name: String,
        message: String,
    },

    #[error("cannot compile {export_name}: unsupported {keyword}")]
    Unsupported {
        export_name: String,
        keyword: String,
    },
}

/// Errors that abort derivation for a document.
#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("invalid links: expected array, got {actual}")]
    InvalidLinks { actual: String },

    #[error("invalid link at /links/{index}: {source}")]
    InvalidLink {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl DeriveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors when checking a payload against a compiled declaration.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid value.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
