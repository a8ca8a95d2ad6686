use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BuddyError;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier of a scheme record, as assigned by the catalog service.
pub type SchemeId = i64;

/// Identifier of the (single, implicit) user of a session.
pub type UserId = i64;

/// Number of description characters shown in a catalog listing preview.
pub const PREVIEW_CHARS: usize = 60;

// =============================================================================
// Enums
// =============================================================================

/// Languages the answering endpoint can reply in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// All supported languages, in display order.
    pub const ALL: [Language; 2] = [Language::English, Language::Hindi];

    /// Wire code sent to the answering endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = BuddyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| BuddyError::UnsupportedLanguage(s.to_string()))
    }
}

/// Author of a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Opaque user identity, fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            user_id: 0,
            username: "Guest".to_string(),
        }
    }
}

// =============================================================================
// Scheme
// =============================================================================

/// A government assistance programme as served by the catalog.
///
/// Only `id`, `name` and `description` are guaranteed; the remaining fields
/// are carried through when the catalog provides them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: SchemeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eligibility: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub how_to_apply: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helpline: Option<String>,
}

impl Scheme {
    /// Build a scheme with only the guaranteed fields set.
    pub fn new(id: SchemeId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            category: None,
            eligibility: Vec::new(),
            benefits: None,
            documents_required: Vec::new(),
            how_to_apply: Vec::new(),
            official_website: None,
            helpline: None,
        }
    }

    /// Short description used in catalog listings.
    pub fn preview(&self) -> String {
        let head: String = self.description.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}
