//! Error types for the ledger API client.
//!
//! # Design
//! Server rejections carry the HTTP status and the best message the body
//! offered. Shape problems (a file endpoint answering JSON, a list endpoint
//! answering an unknown envelope) get their own variants so callers can
//! tell them apart from transport failures.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned a non-2xx status.
    ///
    /// `message` is the JSON body's `message` field when present, otherwise
    /// the raw body text. `errors` keeps a validation map if the body had one.
    #[error("API error {status}: {message}")]
    Http {
        status: u16,
        message: String,
        errors: Option<Value>,
    },

    /// A file was expected but the server answered with JSON.
    #[error("API error (expected file, got JSON): {body}")]
    UnexpectedJson { body: String },

    /// A list endpoint answered with a shape that is not a known envelope.
    #[error("unrecognized list envelope: {shape}")]
    UnrecognizedEnvelope { shape: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Arguments rejected before any request was built.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The persisted user cache could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status for server rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_status_and_message() {
        let err = ApiError::Http {
            status: 422,
            message: "The email field is required.".to_string(),
            errors: None,
        };
        assert_eq!(err.to_string(), "API error 422: The email field is required.");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn unexpected_json_display() {
        let err = ApiError::UnexpectedJson {
            body: r#"{"message":"no data"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"API error (expected file, got JSON): {"message":"no data"}"#
        );
        assert_eq!(err.status(), None);
    }
}
