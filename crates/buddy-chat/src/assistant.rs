//! Composition of the chat controller, catalog view model and history.

use std::sync::Arc;

use buddy_core::config::SessionConfig;
use buddy_core::BuddyConfig;
use tokio::sync::broadcast;

use crate::catalog::CatalogViewModel;
use crate::client::{AnswerService, CatalogService, HistoryService, HttpBackend};
use crate::controller::ChatController;
use crate::error::ChatError;
use crate::events::{self, ViewEvent};
use crate::history::replay_history;
use crate::session::Session;

/// One client session: chat, catalog and history wired to a shared
/// [`Session`] and a single event channel.
pub struct SchemeAssistant {
    chat: ChatController,
    catalog: CatalogViewModel,
    history: Arc<dyn HistoryService>,
}

impl SchemeAssistant {
    /// Wire the core to arbitrary collaborators.
    pub fn new(
        config: &SessionConfig,
        answers: Arc<dyn AnswerService>,
        catalog: Arc<dyn CatalogService>,
        history: Arc<dyn HistoryService>,
    ) -> Self {
        let session = Session::new(config.identity(), config.default_language).shared();
        let events = events::channel();
        let chat = ChatController::new(
            Arc::clone(&session),
            answers,
            events.clone(),
            config.response_ordering,
        );
        let catalog = CatalogViewModel::new(catalog, session, events);
        Self {
            chat,
            catalog,
            history,
        }
    }

    /// Wire the core to the HTTP backend described by `config`.
    pub fn connect(config: &BuddyConfig) -> Result<Self, ChatError> {
        let backend = Arc::new(HttpBackend::from_config(&config.endpoint)?);
        Ok(Self::new(
            &config.session,
            backend.clone(),
            backend.clone(),
            backend,
        ))
    }

    pub fn chat(&self) -> &ChatController {
        &self.chat
    }

    pub fn catalog(&self) -> &CatalogViewModel {
        &self.catalog
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.chat.subscribe()
    }

    /// Session start: replay history and load the catalog and categories.
    /// Each step is independent; failures are logged only.
    pub async fn start(&self) {
        let (replayed, (), ()) = tokio::join!(
            replay_history(&self.chat, self.history.as_ref()),
            self.catalog.load_all(),
            self.catalog.load_categories(),
        );
        tracing::info!(replayed, "Session started");
    }
}
