//! # Domain Errors

use thiserror::Error;

/// A persisted or transmitted payload could not be read.
///
/// Callers recover by treating the state as absent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Not parseable at all (bad syntax, truncated, wrong shape).
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// A field every schema version carries is absent.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field is present but its value is unusable.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let message = e.to_string();
        match e.classify() {
            Category::Data if message.starts_with("missing field") => {
                DecodeError::MissingField(message)
            }
            Category::Data => DecodeError::InvalidValue(message),
            Category::Io | Category::Syntax | Category::Eof => DecodeError::Malformed(message),
        }
    }
}

/// A value could not be encoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Encode failed: {0}")]
pub struct EncodeError(pub String);

impl From<serde_json::Error> for EncodeError {
    fn from(e: serde_json::Error) -> Self {
        EncodeError(e.to_string())
    }
}
