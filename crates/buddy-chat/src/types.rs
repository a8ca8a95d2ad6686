//! Request and response shapes exchanged with the remote collaborators.

use buddy_core::{Language, Scheme, SchemeId, UserId};
use serde::{Deserialize, Deserializer, Serialize};

/// Fallback shown when the endpoint reports failure without any text.
pub const GENERIC_APOLOGY: &str = "Sorry, I could not generate a response. Please try again.";

// =============================================================================
// Chat
// =============================================================================

/// Body of a chat request. `scheme_id` is always sent, as `null` when no
/// scheme is selected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: Language,
    pub user_id: UserId,
    pub scheme_id: Option<SchemeId>,
}

/// Answering endpoint reply, success or in-band failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
}

impl ChatReply {
    /// Successful reply carrying an answer and its citations.
    pub fn answered(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            success: true,
            answer: Some(answer.into()),
            error: None,
            sources,
        }
    }

    /// In-band failure reply.
    pub fn failed(answer: Option<&str>, error: Option<&str>) -> Self {
        Self {
            success: false,
            answer: answer.map(str::to_string),
            error: error.map(str::to_string),
            sources: Vec::new(),
        }
    }

    /// Most specific human-readable text for a failed reply:
    /// `answer`, then `error`, then [`GENERIC_APOLOGY`]. Empty strings count
    /// as absent.
    pub fn failure_text(&self) -> String {
        [self.answer.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or(GENERIC_APOLOGY)
            .to_string()
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The single predicate a catalog listing is derived from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CatalogFilter {
    #[default]
    All,
    Category(String),
    Search(String),
}

impl CatalogFilter {
    /// Query parameters for the list-schemes call.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            CatalogFilter::All => Vec::new(),
            CatalogFilter::Category(category) => vec![("category", category.as_str())],
            CatalogFilter::Search(term) => vec![("search", term.as_str())],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SchemesReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub schemes: Vec<Scheme>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategoriesReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<String>,
}

// =============================================================================
// History
// =============================================================================

/// One stored question/answer exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub message: String,
    pub response: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HistoryReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<HistoryEntry>,
}

/// Treat an explicit JSON `null` list the same as a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
