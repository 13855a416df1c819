//! Error types for the FlexiLance client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire client.
///
/// Network and backend failures carry a message that is already fit to show
/// to the user; callers turn them into toasts and keep going.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FlexiError {
    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("Network error: {message}")]
    Transport { message: String },

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend answered successfully but the body could not be decoded.
    #[error("Unexpected response from server: {message}")]
    MalformedResponse { message: String },

    /// Client-side validation rejected the input before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The current user's role does not allow the operation.
    #[error("{0}")]
    Forbidden(String),

    /// A record the client asked for does not exist.
    #[error("No {kind} with id {id}")]
    NotFound { kind: String, id: String },

    /// Reading or writing local files (config, state, locks) failed.
    #[error("Local storage error: {message}")]
    Io { message: String },

    /// A stored or received document did not match its expected shape.
    #[error("Could not read {format} data: {message}")]
    Serialization { format: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A broken invariant inside the client itself.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlexiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The failure happened before the backend answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The backend rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Backend { status: 401 | 403, .. })
    }

    /// Either a local lookup miss or a 404 from the backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Backend { status: 404, .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// The text a toast should show for this error.
    ///
    /// Backend and validation messages are shown verbatim; everything else
    /// uses the `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            Self::Validation(message) | Self::Forbidden(message) => message.clone(),
            Self::MalformedResponse { .. } => "An error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for FlexiError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("{err} ({:?})", err.kind()))
    }
}

fn decode_failure(format: &str, err: impl std::fmt::Display) -> FlexiError {
    FlexiError::Serialization {
        format: format.to_string(),
        message: err.to_string(),
    }
}

impl From<serde_json::Error> for FlexiError {
    fn from(err: serde_json::Error) -> Self {
        decode_failure("JSON", err)
    }
}

impl From<toml::de::Error> for FlexiError {
    fn from(err: toml::de::Error) -> Self {
        decode_failure("TOML", err)
    }
}

impl From<toml::ser::Error> for FlexiError {
    fn from(err: toml::ser::Error) -> Self {
        decode_failure("TOML", err)
    }
}

impl From<String> for FlexiError {
    fn from(message: String) -> Self {
        Self::Internal(message)
    }
}

pub type Result<T> = std::result::Result<T, FlexiError>;
