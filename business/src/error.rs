use serde::Deserialize;
use thiserror::Error;

use crate::http::{HttpError, Response};

pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Failure talking to the property backend.
///
/// Every variant is retryable by repeating the same user action; nothing here is
/// fatal to the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Network unreachable, timeout, or the connection dropped.
    #[error("network error: {0}")]
    Transport(String),
    /// The backend answered with an unexpected status. `message` is whatever the
    /// body said, if anything.
    #[error("server responded with {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    /// The response could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a `Rejected` error, keeping whatever message the backend sent.
    pub fn rejected(response: &Response) -> Self {
        Self::Rejected {
            status: response.status,
            message: extract_error_message(&response.body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Text suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(reason) => format!("Network error: {reason}"),
            Self::Rejected { .. } | Self::Decode(_) => self
                .backend_message()
                .unwrap_or(GENERIC_FAILURE)
                .to_owned(),
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        Self::Transport(e.message)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Extracts the `message` (or `error`) field from a JSON error body.
fn extract_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
}
