//! Session state: language, selected scheme and transcript.
//!
//! The session is an explicit value owned by the controller and shared with
//! the catalog view model; every mutation goes through a named transition.

use std::sync::{Arc, Mutex, MutexGuard};

use buddy_core::{Identity, Language, SchemeId};

use crate::message::{Message, TranscriptEntry};

/// Session shared between the controller and the catalog view model.
pub type SharedSession = Arc<Mutex<Session>>;

/// Mutable client-side state for one user.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Identity,
    language: Language,
    selected_scheme: Option<SchemeId>,
    transcript: Vec<Message>,
}

impl Session {
    /// Start a session with an empty transcript and no selected scheme.
    pub fn new(identity: Identity, language: Language) -> Self {
        Self {
            identity,
            language,
            selected_scheme: None,
            transcript: Vec::new(),
        }
    }

    /// Wrap the session for sharing.
    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn selected_scheme(&self) -> Option<SchemeId> {
        self.selected_scheme
    }

    pub fn messages(&self) -> &[Message] {
        &self.transcript
    }

    /// Transcript as displayed: a single welcome entry when empty.
    pub fn entries(&self) -> Vec<TranscriptEntry<'_>> {
        if self.transcript.is_empty() {
            vec![TranscriptEntry::Welcome]
        } else {
            self.transcript.iter().map(TranscriptEntry::Message).collect()
        }
    }

    // -- Transitions --

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Point the session at a scheme. Existence is not checked.
    pub fn select_scheme(&mut self, id: SchemeId) {
        self.selected_scheme = Some(id);
    }

    pub fn append(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// Drop every message; language and selection are untouched.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Identity::default(), Language::default())
    }
}

/// Lock a shared session, recovering the state if a holder panicked.
pub(crate) fn lock(session: &SharedSession) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| {
        tracing::error!("Session lock poisoned; recovering state");
        poisoned.into_inner()
    })
}
