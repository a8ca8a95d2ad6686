//! Scheme catalog view model.
//!
//! Holds the visible scheme listing, the category list and the selected
//! scheme detail. The listing is always derived from exactly one filter
//! (everything, one category, or one search term) and keeps the order the
//! catalog service returned. Failed loads leave the previous view in place.

use std::sync::{Arc, Mutex, MutexGuard};

use buddy_core::{Scheme, SchemeId};
use tracing::{debug, info, warn};

use crate::client::CatalogService;
use crate::events::{publish, EventSender, ViewEvent};
use crate::session::{lock, SharedSession};
use crate::types::CatalogFilter;

/// Snapshot of what the catalog panel shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogView {
    pub visible: Vec<Scheme>,
    pub filter: CatalogFilter,
    pub categories: Vec<String>,
    pub selected: Option<Scheme>,
}

impl CatalogView {
    pub fn active_category(&self) -> Option<&str> {
        match &self.filter {
            CatalogFilter::Category(category) => Some(category),
            _ => None,
        }
    }

    pub fn active_search_term(&self) -> Option<&str> {
        match &self.filter {
            CatalogFilter::Search(term) => Some(term),
            _ => None,
        }
    }
}

/// Synchronizes free-text search, category filters and the listing.
pub struct CatalogViewModel {
    service: Arc<dyn CatalogService>,
    session: SharedSession,
    events: EventSender,
    view: Mutex<CatalogView>,
}

impl CatalogViewModel {
    pub fn new(service: Arc<dyn CatalogService>, session: SharedSession, events: EventSender) -> Self {
        Self {
            service,
            session,
            events,
            view: Mutex::new(CatalogView::default()),
        }
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> CatalogView {
        self.lock_view().clone()
    }

    pub fn visible_schemes(&self) -> Vec<Scheme> {
        self.lock_view().visible.clone()
    }

    /// Look up a scheme in the visible listing.
    pub fn find_visible(&self, id: SchemeId) -> Option<Scheme> {
        self.lock_view().visible.iter().find(|s| s.id == id).cloned()
    }

    /// Show the full catalog and clear any filter.
    pub async fn load_all(&self) {
        self.apply(CatalogFilter::All).await;
    }

    /// Show only schemes in `category`; clears the search term.
    pub async fn filter_by_category(&self, category: &str) {
        info!(category = %category, "Filtering schemes by category");
        self.apply(CatalogFilter::Category(category.to_string())).await;
    }

    /// Show schemes matching `term`; clears the category. An empty term
    /// behaves like [`load_all`](Self::load_all). Whitespace is a real term.
    pub async fn filter_by_search(&self, term: &str) {
        if term.is_empty() {
            self.load_all().await;
        } else {
            debug!(term = %term, "Searching schemes");
            self.apply(CatalogFilter::Search(term.to_string())).await;
        }
    }

    /// Refresh the category button list.
    pub async fn load_categories(&self) {
        match self.service.list_categories().await {
            Ok(categories) => {
                info!(count = categories.len(), "Loaded categories");
                self.lock_view().categories = categories.clone();
                publish(&self.events, ViewEvent::CategoriesChanged(categories));
            }
            Err(e) => warn!(error = %e, "Failed to load categories"),
        }
    }

    /// Select `scheme` for the detail panel and for subsequent chat
    /// requests. The listing is not touched and the scheme need not be in it.
    pub fn select(&self, scheme: &Scheme) {
        lock(&self.session).select_scheme(scheme.id);
        self.lock_view().selected = Some(scheme.clone());
        info!(scheme_id = scheme.id, name = %scheme.name, "Selected scheme");
        publish(&self.events, ViewEvent::SchemeSelected(scheme.clone()));
    }

    /// Select by id. A listed scheme gets the detail panel; an unlisted id
    /// is still used for chat requests but leaves no detail to show.
    pub fn select_id(&self, id: SchemeId) -> Option<Scheme> {
        if let Some(scheme) = self.find_visible(id) {
            self.select(&scheme);
            return Some(scheme);
        }
        lock(&self.session).select_scheme(id);
        self.lock_view().selected = None;
        info!(scheme_id = id, "Selected scheme outside the listing");
        publish(&self.events, ViewEvent::UnlistedSchemeSelected(id));
        None
    }

    async fn apply(&self, filter: CatalogFilter) {
        match self.service.list_schemes(&filter).await {
            Ok(schemes) => {
                info!(count = schemes.len(), filter = ?filter, "Loaded schemes");
                {
                    let mut view = self.lock_view();
                    view.visible = schemes.clone();
                    view.filter = filter;
                }
                publish(&self.events, ViewEvent::CatalogChanged(schemes));
            }
            Err(e) => warn!(error = %e, filter = ?filter, "Failed to load schemes"),
        }
    }

    fn lock_view(&self) -> MutexGuard<'_, CatalogView> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// =============================================================================
// Tests
// =============================================================================
