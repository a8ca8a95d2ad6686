//! Notifications published to the rendering surface.

use buddy_core::{Language, Scheme, SchemeId};
use tokio::sync::broadcast;

use crate::message::RenderedMessage;

/// Capacity of the view event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything the rendering surface needs to repaint.
///
/// Events are published after the corresponding state change, so a
/// subscriber reading state in response always sees the new value.
#[derive(Clone, Debug)]
pub enum ViewEvent {
    /// A message was appended to the transcript.
    MessageAppended(RenderedMessage),
    /// The transcript was reset to the welcome placeholder.
    TranscriptReset,
    /// The "thinking" indicator changed visibility.
    PendingChanged(bool),
    /// The visible catalog listing was replaced.
    CatalogChanged(Vec<Scheme>),
    /// The category button list was replaced.
    CategoriesChanged(Vec<String>),
    /// A scheme was picked for the detail panel.
    SchemeSelected(Scheme),
    /// A scheme outside the visible listing was picked by id; the detail
    /// panel is cleared.
    UnlistedSchemeSelected(SchemeId),
    /// The active answer language changed.
    LanguageChanged(Language),
}

/// Sender half shared by the controller and the catalog view model.
pub type EventSender = broadcast::Sender<ViewEvent>;

/// Create a fresh event channel. The initial receiver is dropped; callers
/// subscribe through the sender.
pub fn channel() -> EventSender {
    let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    tx
}

/// Publish an event. Having no subscribers is not an error.
pub(crate) fn publish(tx: &EventSender, event: ViewEvent) {
    let _ = tx.send(event);
}
