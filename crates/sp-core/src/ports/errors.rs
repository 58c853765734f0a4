use thiserror::Error;

use crate::preference::state_machine::GENERIC_ERROR_MESSAGE;

/// Failures reported by a preferences backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceApiError {
    /// Request refused before reaching the server (e.g. nothing selected).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Network failure, timeout or transient server error.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The server understood the request and refused it.
    #[error("rejected by server: {message}")]
    Rejected { status: Option<u16>, message: String },
}

impl PreferenceApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Only transport failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Message suitable for the error banner.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Validation { message }
            | Self::Transport { message }
            | Self::Rejected { message, .. } => message.trim(),
        };
        if message.is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message.to_string()
        }
    }
}
