use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Identity, Language, UserId};

/// Top-level configuration for the Legal Buddy client.
///
/// Loaded from `~/.legal-buddy/config.toml` by default. Every section is
/// optional; missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuddyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl BuddyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed. Callers decide
    /// whether to fall back to [`BuddyConfig::default`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Location of the remote answering / catalog / history service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL; API paths (`/api/chat`, ...) are appended to it.
    pub base_url: String,
    /// Request timeout in seconds. Unset uses the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: None,
        }
    }
}

/// What to do with chat responses that resolve out of submission order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Append every response as it resolves.
    #[default]
    AppendAll,
    /// Drop a response when a newer request has been issued since.
    LatestOnly,
}

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: UserId,
    pub username: String,
    pub default_language: Language,
    pub response_ordering: ResponseOrdering,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let identity = Identity::default();
        Self {
            user_id: identity.user_id,
            username: identity.username,
            default_language: Language::default(),
            response_ordering: ResponseOrdering::default(),
        }
    }
}

impl SessionConfig {
    /// Identity the session is started with.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username.clone(),
        }
    }
}
