use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that end a chat turn without a response bundle
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Generative model not configured: {0}")]
    ModelUnavailable(String),

    #[error("Advice generation failed: {0}")]
    Advice(String),
}

impl ChatError {
    /// True when the caller sent something unusable, as opposed to an
    /// upstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ChatError::InvalidInput(_))
    }
}

/// Error payload returned to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl From<&ChatError> for ErrorBody {
    fn from(err: &ChatError) -> Self {
        Self::new(err.to_string())
    }
}
