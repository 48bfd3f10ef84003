//! Loading Hyper-Schema documents and payloads.
//!
//! Documents come from a file, a string, or an HTTP URL and must be JSON
//! objects, since only an object can carry a `links` array. Payloads are
//! any JSON value.

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::types::json_type_name;

#[cfg(feature = "remote")]
use std::time::Duration;

#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a Hyper-Schema document from a file.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound`/`ReadError` for IO failures,
/// `LoadError::InvalidJson` for unparsable content, and
/// `LoadError::NotADocument` when the root is not an object.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let origin = path.display().to_string();
    let content = read_file(path)?;
    as_document(&origin, parse(&origin, &content)?)
}

/// Load a Hyper-Schema document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` or `LoadError::NotADocument`.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    as_document("<string>", parse("<string>", content)?)
}

/// Fetch a Hyper-Schema document over HTTP(S).
///
/// Non-success statuses are errors.
///
/// # Errors
///
/// Returns `LoadError::NetworkError` when the request fails, otherwise
/// the same errors as [`load_document_str`].
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let network = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;
    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network)?;

    as_document(url, parse(url, &body)?)
}

/// Whether `source` names an HTTP(S) resource rather than a file.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load a document from a file path or, with the `remote` feature, a URL.
///
/// # Errors
///
/// See [`load_document`] and [`load_document_url`].
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if !is_url(source) {
        return load_document(Path::new(source));
    }

    #[cfg(feature = "remote")]
    {
        load_document_url(source)
    }
    #[cfg(not(feature = "remote"))]
    {
        Err(LoadError::FileNotFound {
            path: std::path::PathBuf::from(source),
        })
    }
}

/// Load a payload to check against a declaration. Any JSON value is accepted.
///
/// # Errors
///
/// Returns `LoadError` for IO failures and unparsable content.
pub fn load_payload(path: &Path) -> Result<Value, LoadError> {
    let content = read_file(path)?;
    parse(&path.display().to_string(), &content)
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn parse(origin: &str, content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson {
        origin: origin.to_string(),
        source,
    })
}

fn as_document(origin: &str, value: Value) -> Result<Value, LoadError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(LoadError::NotADocument {
            origin: origin.to_string(),
            actual: json_type_name(&value).to_string(),
        })
    }
}
