//! Chat session and scheme catalog core for Legal Buddy.
//!
//! Holds the session state (language, selected scheme, transcript), drives
//! exchanges with the remote answering endpoint, renders answers and their
//! citations into safe markup, and keeps the scheme catalog listing in sync
//! with category and search filters.

pub mod assistant;
pub mod catalog;
pub mod citation;
pub mod client;
pub mod controller;
pub mod error;
pub mod events;
pub mod formatter;
pub mod history;
pub mod message;
pub mod session;
pub mod types;

pub use assistant::SchemeAssistant;
pub use catalog::{CatalogView, CatalogViewModel};
pub use citation::{badge_label, citation_badges, Citation};
pub use client::{AnswerService, CatalogService, HistoryService, HttpBackend};
pub use controller::{ChatController, SendOutcome, CONNECTIVITY_ERROR};
pub use error::ChatError;
pub use events::ViewEvent;
pub use formatter::format_message;
pub use history::replay_history;
pub use message::{Message, RenderedMessage, TranscriptEntry};
pub use session::{Session, SharedSession};
pub use types::{CatalogFilter, ChatReply, ChatRequest, HistoryEntry, GENERIC_APOLOGY};
