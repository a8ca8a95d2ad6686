//! Remote collaborators and their HTTP implementation.
//!
//! The core talks to three services through the traits below; [`HttpBackend`]
//! implements all three against the Legal Buddy REST API.

use std::time::Duration;

use async_trait::async_trait;
use buddy_core::config::EndpointConfig;
use buddy_core::{Scheme, UserId};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ChatError;
use crate::types::{
    CatalogFilter, CategoriesReply, ChatReply, ChatRequest, HistoryEntry, HistoryReply,
    SchemesReply,
};

// =============================================================================
// Collaborator traits
// =============================================================================

/// The remote answering endpoint.
///
/// `Ok` carries the decoded reply, including in-band failures
/// (`success = false`). `Err` means the endpoint was unreachable or the reply
/// could not be decoded.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// The scheme catalog store.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Schemes matching `filter`, in the store's order.
    async fn list_schemes(&self, filter: &CatalogFilter) -> Result<Vec<Scheme>, ChatError>;

    async fn list_categories(&self) -> Result<Vec<String>, ChatError>;
}

/// The stored chat history.
#[async_trait]
pub trait HistoryService: Send + Sync {
    /// Prior exchanges for `user_id`. Ordering is not guaranteed.
    async fn fetch_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, ChatError>;
}

// =============================================================================
// HttpBackend
// =============================================================================

/// HTTP client for the Legal Buddy REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for `base_url` with transport defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base(base_url.into()),
        }
    }

    /// Create a backend from the endpoint configuration section.
    pub fn from_config(config: &EndpointConfig) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: normalize_base(config.base_url.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a JSON body regardless of status; the API reports failure
    /// in-band, so only an undecodable body is an error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ChatError> {
        let status = response.status();
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ChatError::Decode(format!("HTTP {}: {}", status.as_u16(), e)))
    }
}

fn normalize_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

#[async_trait]
impl AnswerService for HttpBackend {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(request)
            .send()
            .await?;
        tracing::debug!(status = response.status().as_u16(), "Chat response received");
        Self::decode(response).await
    }
}

#[async_trait]
impl CatalogService for HttpBackend {
    async fn list_schemes(&self, filter: &CatalogFilter) -> Result<Vec<Scheme>, ChatError> {
        let response = self
            .client
            .get(self.url("/api/schemes"))
            .query(&filter.query_pairs())
            .send()
            .await?;
        let reply: SchemesReply = Self::decode(response).await?;
        if !reply.success {
            return Err(ChatError::Rejected("schemes"));
        }
        Ok(reply.schemes)
    }

    async fn list_categories(&self) -> Result<Vec<String>, ChatError> {
        let response = self.client.get(self.url("/api/categories")).send().await?;
        let reply: CategoriesReply = Self::decode(response).await?;
        if !reply.success {
            return Err(ChatError::Rejected("categories"));
        }
        Ok(reply.categories)
    }
}

#[async_trait]
impl HistoryService for HttpBackend {
    async fn fetch_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, ChatError> {
        let response = self
            .client
            .get(self.url(&format!("/api/chat-history/{user_id}")))
            .send()
            .await?;
        let reply: HistoryReply = Self::decode(response).await?;
        if !reply.success {
            return Err(ChatError::Rejected("history"));
        }
        Ok(reply.history)
    }
}
