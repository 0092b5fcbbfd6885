use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwipeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("No session credentials. Run `eatsease config --set-username NAME --set-token TOKEN`")]
    MissingCredentials,

    #[error("Session expired. Please log in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Server error (HTTP {status})")]
    ServerError { status: u16 },

    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    ApiParse(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Common(#[from] eatsease_common::Error),
}

impl SwipeError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SwipeError::SessionExpired)
    }

    /// Failures a later manual retry (re-swipe, refresh) may get past
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SwipeError::Network(_) | SwipeError::Timeout(_) | SwipeError::ServerError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SwipeError>;
