//! Transcript messages and their rendered form.

use buddy_core::Role;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::citation::{citation_badges, Citation};
use crate::formatter::{escape, format_message};

pub const WELCOME_TITLE: &str = "Welcome to AI Legal Buddy!";
pub const WELCOME_TAGLINE: &str = "Get instant answers about Indian government schemes";
pub const WELCOME_TIPS: [&str; 3] = [
    "Browse schemes by category",
    "Ask questions in English or Hindi",
    "Access official resources",
];

/// Header above the citation badges of an answer.
pub const SOURCES_HEADER: &str = "Official Resources";

/// A single transcript entry, immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub sources: Vec<String>,
    pub created_at: i64,
}

impl Message {
    /// A user message. Users never carry citations.
    pub fn user(text: impl Into<String>) -> Self {
        Self::build(Role::User, text.into(), Vec::new())
    }

    /// An assistant message with its citation URLs.
    pub fn assistant(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self::build(Role::Assistant, text.into(), sources)
    }

    /// Override the creation time (epoch seconds), used when replaying
    /// stored exchanges.
    pub fn at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    fn build(role: Role, text: String, sources: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text,
            sources,
            created_at: Utc::now().timestamp(),
        }
    }

    /// Format the text and resolve citation badges.
    pub fn render(&self) -> RenderedMessage {
        let citations = match self.role {
            Role::Assistant => citation_badges(&self.sources),
            Role::User => Vec::new(),
        };
        RenderedMessage {
            id: self.id,
            role: self.role,
            markup: format_message(&self.text),
            citations,
        }
    }
}

/// A message ready for the rendering surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: Uuid,
    pub role: Role,
    pub markup: String,
    pub citations: Vec<Citation>,
}

impl RenderedMessage {
    /// The full message block, with an "Official Resources" section when
    /// there is at least one citation badge.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"message {}\"><div class=\"message-content\">{}",
            self.role, self.markup
        );
        if !self.citations.is_empty() {
            html.push_str("<div class=\"message-sources\"><div class=\"sources-header\">");
            html.push_str(SOURCES_HEADER);
            html.push_str("</div><div class=\"sources-badges\">");
            for citation in &self.citations {
                html.push_str(&citation.to_html());
            }
            html.push_str("</div></div>");
        }
        html.push_str("</div></div>");
        html
    }
}

/// What the transcript shows: the welcome placeholder when empty,
/// otherwise the messages in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscriptEntry<'a> {
    Welcome,
    Message(&'a Message),
}

/// Markup for the welcome placeholder.
pub fn welcome_html() -> String {
    let tips: String = WELCOME_TIPS
        .iter()
        .map(|tip| format!("<li>{}</li>", escape(tip)))
        .collect();
    format!(
        "<div class=\"welcome-message\"><h2>{}</h2><p>{}</p><ul>{}</ul></div>",
        WELCOME_TITLE, WELCOME_TAGLINE, tips
    )
}
