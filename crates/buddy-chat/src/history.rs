//! Replay of stored chat history into a fresh transcript.
//!
//! The history service makes no ordering promise. Entries are put into
//! chronological order before replay: by timestamp when every entry has a
//! parseable one, otherwise by assuming the service's newest-first order.

use chrono::{DateTime, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::client::HistoryService;
use crate::controller::ChatController;
use crate::message::Message;
use crate::types::HistoryEntry;

/// Timestamp layout of the history store (`CURRENT_TIMESTAMP`).
const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fetch prior exchanges for the session's user and append them, oldest
/// first, as user/assistant message pairs.
///
/// Returns the number of exchanges replayed. Failures are logged and leave
/// the transcript untouched.
pub async fn replay_history(controller: &ChatController, service: &dyn HistoryService) -> usize {
    let user_id = controller.identity().user_id;
    let entries = match service.fetch_history(user_id).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(user_id, error = %e, "Failed to load chat history");
            return 0;
        }
    };
    if entries.is_empty() {
        info!(user_id, "No chat history found");
        return 0;
    }

    let ordered = chronological(entries);
    let count = ordered.len();
    for entry in ordered {
        let created_at = entry.timestamp.as_deref().and_then(parse_timestamp);
        let mut question = Message::user(entry.message);
        let mut answer = Message::assistant(entry.response, entry.sources);
        if let Some(ts) = created_at {
            question = question.at(ts);
            answer = answer.at(ts);
        }
        controller.append(question);
        controller.append(answer);
    }
    info!(user_id, count, "Replayed chat history");
    count
}

/// Order entries oldest first.
pub fn chronological(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    // Newest first on the wire; entries sharing a second keep that contract.
    entries.reverse();
    let stamps: Option<Vec<i64>> = entries
        .iter()
        .map(|e| e.timestamp.as_deref().and_then(parse_timestamp))
        .collect();

    match stamps {
        Some(stamps) => {
            debug!("Ordering history by timestamp");
            let mut keyed: Vec<(i64, HistoryEntry)> = stamps.into_iter().zip(entries).collect();
            keyed.sort_by_key(|(ts, _)| *ts);
            keyed.into_iter().map(|(_, entry)| entry).collect()
        }
        None => {
            debug!("History lacks timestamps; assuming newest first");
            entries
        }
    }
}

/// Parse a store or RFC 3339 timestamp to epoch seconds (UTC).
fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, STORE_TIMESTAMP_FORMAT) {
        return Some(naive.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.timestamp())
}

// =============================================================================
// Tests
// =============================================================================
