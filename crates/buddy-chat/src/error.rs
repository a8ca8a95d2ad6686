//! Error types for the chat and catalog core.

use buddy_core::error::BuddyError;

/// Errors raised by collaborator calls and session transitions.
///
/// Operations on the controller, catalog view model and history replay
/// catch these at their boundary; they surface only through logs and, for
/// chat, a fixed user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("{0} request reported failure")]
    Rejected(&'static str),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<BuddyError> for ChatError {
    fn from(err: BuddyError) -> Self {
        match err {
            BuddyError::UnsupportedLanguage(code) => ChatError::UnsupportedLanguage(code),
            other => ChatError::Config(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::Decode(err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}
