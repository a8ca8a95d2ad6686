use thiserror::Error;

/// Top-level error type for the Legal Buddy client.
///
/// Subsystem crates define their own error types and implement
/// `From<BuddyError>` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuddyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl From<toml::de::Error> for BuddyError {
    fn from(err: toml::de::Error) -> Self {
        BuddyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for BuddyError {
    fn from(err: serde_json::Error) -> Self {
        BuddyError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Legal Buddy operations.
pub type Result<T> = std::result::Result<T, BuddyError>;
