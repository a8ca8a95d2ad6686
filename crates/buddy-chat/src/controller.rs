//! Chat session controller.
//!
//! Drives one request/response exchange per submitted message: the user
//! message is appended optimistically, the pending indicator is raised, the
//! answering endpoint is called, and exactly one assistant message is
//! appended whatever the outcome.
//!
//! Requests are never cancelled or de-duplicated. Each send takes a
//! monotonic sequence number; with [`ResponseOrdering::AppendAll`] every
//! response is appended in resolution order, with
//! [`ResponseOrdering::LatestOnly`] a response is dropped when a newer
//! request was issued after it.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use buddy_core::config::ResponseOrdering;
use buddy_core::{Identity, Language, SchemeId};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::client::AnswerService;
use crate::error::ChatError;
use crate::events::{publish, EventSender, ViewEvent};
use crate::message::Message;
use crate::session::{lock, SharedSession};
use crate::types::ChatRequest;

/// Shown when the endpoint cannot be reached or replies with garbage.
pub const CONNECTIVITY_ERROR: &str = "Error connecting to server. Please try again.";

/// How a [`ChatController::send_message`] call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was sent or recorded.
    Ignored,
    /// The endpoint answered; the answer was appended.
    Answered,
    /// The endpoint reported failure; its error text was appended.
    Failed,
    /// Transport or decode failure; the connectivity message was appended.
    Unreachable,
    /// A newer request was issued first and ordering is `LatestOnly`;
    /// nothing was appended for this response.
    Superseded,
}

/// Orchestrates chat exchanges against a shared [`Session`](crate::Session).
pub struct ChatController {
    session: SharedSession,
    answers: Arc<dyn AnswerService>,
    events: EventSender,
    ordering: ResponseOrdering,
    last_seq: AtomicU64,
    in_flight: AtomicUsize,
}

impl ChatController {
    pub fn new(
        session: SharedSession,
        answers: Arc<dyn AnswerService>,
        events: EventSender,
        ordering: ResponseOrdering,
    ) -> Self {
        Self {
            session,
            answers,
            events,
            ordering,
            last_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    // -- Queries --

    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.ordering
    }

    pub fn identity(&self) -> Identity {
        lock(&self.session).identity().clone()
    }

    pub fn language(&self) -> Language {
        lock(&self.session).language()
    }

    pub fn selected_scheme(&self) -> Option<SchemeId> {
        lock(&self.session).selected_scheme()
    }

    /// Snapshot of the transcript messages.
    pub fn transcript(&self) -> Vec<Message> {
        lock(&self.session).messages().to_vec()
    }

    /// Whether the "thinking" indicator is showing.
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // -- Transitions --

    /// Switch the answer language for subsequent sends.
    pub fn set_language(&self, language: Language) {
        lock(&self.session).set_language(language);
        info!(language = %language, "Language changed");
        publish(&self.events, ViewEvent::LanguageChanged(language));
    }

    /// Switch language by wire code. Unknown codes leave it unchanged.
    pub fn set_language_code(&self, code: &str) -> Result<Language, ChatError> {
        let language: Language = code.parse()?;
        self.set_language(language);
        Ok(language)
    }

    /// Point subsequent sends at a scheme.
    pub fn select_scheme(&self, id: SchemeId) {
        lock(&self.session).select_scheme(id);
        info!(scheme_id = id, "Scheme selected");
    }

    /// Reset the transcript to the welcome placeholder.
    pub fn clear(&self) {
        lock(&self.session).clear();
        info!("Chat cleared");
        publish(&self.events, ViewEvent::TranscriptReset);
    }

    /// Append a message and notify the rendering surface.
    pub(crate) fn append(&self, message: Message) {
        let rendered = message.render();
        lock(&self.session).append(message);
        publish(&self.events, ViewEvent::MessageAppended(rendered));
    }

    // -- Exchange --

    /// Send a chat message and record the reply.
    ///
    /// Blank input is ignored. Otherwise exactly one user message and, unless
    /// superseded, exactly one assistant message are appended, and the
    /// pending indicator is lowered once no request remains in flight.
    pub async fn send_message(&self, raw_text: &str) -> SendOutcome {
        let text = raw_text.trim();
        if text.is_empty() {
            debug!("Ignoring blank chat message");
            return SendOutcome::Ignored;
        }

        let user_message = Message::user(text);
        let rendered = user_message.render();
        let request = {
            let mut session = lock(&self.session);
            session.append(user_message);
            ChatRequest {
                message: text.to_string(),
                language: session.language(),
                user_id: session.identity().user_id,
                scheme_id: session.selected_scheme(),
            }
        };
        publish(&self.events, ViewEvent::MessageAppended(rendered));

        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.begin_pending();
        info!(
            seq,
            language = %request.language,
            user_id = request.user_id,
            scheme_id = ?request.scheme_id,
            "Sending chat message"
        );

        let result = self.answers.ask(&request).await;
        self.end_pending();

        if self.ordering == ResponseOrdering::LatestOnly
            && seq < self.last_seq.load(Ordering::SeqCst)
        {
            warn!(seq, "Discarding response superseded by a newer request");
            return SendOutcome::Superseded;
        }

        let (reply, outcome) = match result {
            Ok(reply) if reply.success => match reply.answer {
                Some(answer) => {
                    debug!(seq, sources = reply.sources.len(), "Answer received");
                    (Message::assistant(answer, reply.sources), SendOutcome::Answered)
                }
                None => {
                    error!(seq, "Successful chat reply without an answer");
                    (
                        Message::assistant(CONNECTIVITY_ERROR, Vec::new()),
                        SendOutcome::Unreachable,
                    )
                }
            },
            Ok(reply) => {
                warn!(seq, error = ?reply.error, "Answering endpoint reported failure");
                (
                    Message::assistant(reply.failure_text(), Vec::new()),
                    SendOutcome::Failed,
                )
            }
            Err(e) => {
                error!(seq, error = %e, "Chat request failed");
                (
                    Message::assistant(CONNECTIVITY_ERROR, Vec::new()),
                    SendOutcome::Unreachable,
                )
            }
        };
        self.append(reply);
        outcome
    }

    fn begin_pending(&self) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            publish(&self.events, ViewEvent::PendingChanged(true));
        }
    }

    fn end_pending(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            publish(&self.events, ViewEvent::PendingChanged(false));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use buddy_core::Role;
    use tokio::sync::Notify;

    use crate::events;
    use crate::session::Session;
    use crate::types::{ChatReply, GENERIC_APOLOGY};

    /// Scripted answering endpoint that records every request.
    struct ScriptedAnswers {
        reply: Result<ChatReply, String>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedAnswers {
        fn replying(reply: ChatReply) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("connection refused".to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerService for ScriptedAnswers {
        async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(ChatError::Transport)
        }
    }

    /// Endpoint where "slow" waits until a "fast" request has been answered.
    struct RacingAnswers {
        gate: Notify,
    }

    #[async_trait]
    impl AnswerService for RacingAnswers {
        async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
            if request.message == "slow" {
                self.gate.notified().await;
            } else {
                self.gate.notify_one();
            }
            Ok(ChatReply::answered(
                format!("re: {}", request.message),
                Vec::new(),
            ))
        }
    }

    fn controller(answers: Arc<dyn AnswerService>) -> ChatController {
        controller_with(answers, ResponseOrdering::AppendAll)
    }

    fn controller_with(
        answers: Arc<dyn AnswerService>,
        ordering: ResponseOrdering,
    ) -> ChatController {
        ChatController::new(Session::default().shared(), answers, events::channel(), ordering)
    }

    fn drain(rx: &mut broadcast::Receiver<ViewEvent>) -> Vec<ViewEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    // ---- Validation ----

    #[tokio::test]
    async fn test_blank_message_is_noop() {
        let answers = ScriptedAnswers::replying(ChatReply::answered("x", vec![]));
        let ctl = controller(answers.clone());
        let mut rx = ctl.subscribe();

        assert_eq!(ctl.send_message("").await, SendOutcome::Ignored);
        assert_eq!(ctl.send_message("   \n\t").await, SendOutcome::Ignored);

        assert!(answers.requests().is_empty());
        assert!(ctl.transcript().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    // ---- Success ----

    #[tokio::test]
    async fn test_success_appends_user_then_assistant() {
        let answers = ScriptedAnswers::replying(ChatReply::answered(
            "It is a farmer support scheme.",
            vec!["https://www.pmkisan.gov.in/x".to_string()],
        ));
        let ctl = controller(answers.clone());

        let outcome = ctl.send_message("What is PM-KISAN?").await;
        assert_eq!(outcome, SendOutcome::Answered);

        let transcript = ctl.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].text, "What is PM-KISAN?");
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].text, "It is a farmer support scheme.");

        let rendered = transcript[1].render();
        assert_eq!(rendered.citations.len(), 1);
        assert_eq!(rendered.citations[0].label, "PMKISAN.GOV.IN");
        assert!(!ctl.is_pending());
    }

    #[tokio::test]
    async fn test_request_carries_session_fields() {
        let answers = ScriptedAnswers::replying(ChatReply::answered("ok", vec![]));
        let ctl = controller(answers.clone());

        ctl.send_message("What is PM-KISAN?").await;

        let requests = answers.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "What is PM-KISAN?");
        assert_eq!(requests[0].language, Language::English);
        assert_eq!(requests[0].user_id, 0);
        assert_eq!(requests[0].scheme_id, None);
    }

    #[tokio::test]
    async fn test_message_is_trimmed() {
        let answers = ScriptedAnswers::replying(ChatReply::answered("ok", vec![]));
        let ctl = controller(answers.clone());

        ctl.send_message("  hello  ").await;

        assert_eq!(answers.requests()[0].message, "hello");
        assert_eq!(ctl.transcript()[0].text, "hello");
    }

    #[tokio::test]
    async fn test_selected_scheme_is_sent() {
        let answers = ScriptedAnswers::replying(ChatReply::answered("ok", vec![]));
        let ctl = controller(answers.clone());

        ctl.select_scheme(5);
        ctl.send_message("details?").await;

        assert_eq!(answers.requests()[0].scheme_id, Some(5));
    }

    #[tokio::test]
    async fn test_language_applies_to_next_send() {
        let answers = ScriptedAnswers::replying(ChatReply::answered("ok", vec![]));
        let ctl = controller(answers.clone());

        ctl.send_message("one").await;
        ctl.set_language(Language::Hindi);
        ctl.send_message("two").await;

        let requests = answers.requests();
        assert_eq!(requests[0].language, Language::English);
        assert_eq!(requests[1].language, Language::Hindi);
    }

    #[test]
    fn test_set_language_code_rejects_unknown() {
        let ctl = controller(ScriptedAnswers::replying(ChatReply::default()));
        ctl.set_language(Language::Hindi);

        let err = ctl.set_language_code("french").unwrap_err();
        assert!(matches!(err, ChatError::UnsupportedLanguage(_)));
        assert_eq!(ctl.language(), Language::Hindi);

        assert_eq!(ctl.set_language_code("ENGLISH").unwrap(), Language::English);
        assert_eq!(ctl.language(), Language::English);
    }

    // ---- Failure ----

    #[tokio::test]
    async fn test_in_band_failure_uses_answer_text() {
        let answers = ScriptedAnswers::replying(ChatReply::failed(
            Some("Gemini API key not configured."),
            None,
        ));
        let ctl = controller(answers);

        assert_eq!(ctl.send_message("hi").await, SendOutcome::Failed);

        let transcript = ctl.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].text, "Gemini API key not configured.");
        assert!(!ctl.is_pending());
    }

    #[tokio::test]
    async fn test_in_band_failure_falls_back_to_error_then_apology() {
        let ctl = controller(ScriptedAnswers::replying(ChatReply::failed(
            None,
            Some("Message is required"),
        )));
        ctl.send_message("hi").await;
        assert_eq!(ctl.transcript()[1].text, "Message is required");

        let ctl = controller(ScriptedAnswers::replying(ChatReply::failed(None, None)));
        ctl.send_message("hi").await;
        assert_eq!(ctl.transcript()[1].text, GENERIC_APOLOGY);
    }

    #[tokio::test]
    async fn test_failure_drops_sources() {
        let mut reply = ChatReply::failed(Some("no"), None);
        reply.sources = vec!["https://a.gov.in".to_string()];
        let ctl = controller(ScriptedAnswers::replying(reply));

        ctl.send_message("hi").await;

        assert!(ctl.transcript()[1].sources.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_appends_connectivity_error() {
        let ctl = controller(ScriptedAnswers::unreachable());

        assert_eq!(ctl.send_message("hi").await, SendOutcome::Unreachable);

        let transcript = ctl.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript.last().unwrap().text, CONNECTIVITY_ERROR);
        assert!(!ctl.is_pending());
    }

    #[tokio::test]
    async fn test_success_without_answer_is_malformed() {
        let reply = ChatReply {
            success: true,
            ..ChatReply::default()
        };
        let ctl = controller(ScriptedAnswers::replying(reply));

        assert_eq!(ctl.send_message("hi").await, SendOutcome::Unreachable);
        assert_eq!(ctl.transcript()[1].text, CONNECTIVITY_ERROR);
    }

    // ---- Events ----

    #[tokio::test]
    async fn test_event_sequence_for_exchange() {
        let ctl = controller(ScriptedAnswers::replying(ChatReply::answered("a", vec![])));
        let mut rx = ctl.subscribe();

        ctl.send_message("q").await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 4);
        assert!(matches!(&events[0], ViewEvent::MessageAppended(m) if m.role == Role::User));
        assert!(matches!(events[1], ViewEvent::PendingChanged(true)));
        assert!(matches!(events[2], ViewEvent::PendingChanged(false)));
        assert!(matches!(&events[3], ViewEvent::MessageAppended(m) if m.role == Role::Assistant));
    }

    #[tokio::test]
    async fn test_pending_ends_cleared_on_transport_failure() {
        let ctl = controller(ScriptedAnswers::unreachable());
        let mut rx = ctl.subscribe();

        ctl.send_message("q").await;

        let last_pending = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::PendingChanged(p) => Some(p),
                _ => None,
            })
            .last();
        assert_eq!(last_pending, Some(false));
        assert!(!ctl.is_pending());
    }

    // ---- Clear ----

    #[tokio::test]
    async fn test_clear_resets_to_welcome() {
        let ctl = controller(ScriptedAnswers::replying(ChatReply::answered("a", vec![])));
        ctl.set_language(Language::Hindi);
        ctl.select_scheme(3);
        for q in ["one", "two", "three"] {
            ctl.send_message(q).await;
        }
        assert_eq!(ctl.transcript().len(), 6);

        let mut rx = ctl.subscribe();
        ctl.clear();

        assert!(ctl.transcript().is_empty());
        let session = ctl.session();
        assert_eq!(
            lock(&session).entries(),
            vec![crate::message::TranscriptEntry::Welcome]
        );
        assert_eq!(ctl.language(), Language::Hindi);
        assert_eq!(ctl.selected_scheme(), Some(3));
        assert!(matches!(rx.try_recv(), Ok(ViewEvent::TranscriptReset)));
    }

    // ---- Concurrency ----

    #[tokio::test]
    async fn test_concurrent_sends_append_in_resolution_order() {
        let ctl = controller(Arc::new(RacingAnswers {
            gate: Notify::new(),
        }));

        let (slow, fast) = tokio::join!(ctl.send_message("slow"), ctl.send_message("fast"));
        assert_eq!(slow, SendOutcome::Answered);
        assert_eq!(fast, SendOutcome::Answered);

        let texts: Vec<String> = ctl.transcript().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["slow", "fast", "re: fast", "re: slow"]);
        assert!(!ctl.is_pending());
    }

    #[tokio::test]
    async fn test_latest_only_drops_superseded_response() {
        let ctl = controller_with(
            Arc::new(RacingAnswers {
                gate: Notify::new(),
            }),
            ResponseOrdering::LatestOnly,
        );

        let (slow, fast) = tokio::join!(ctl.send_message("slow"), ctl.send_message("fast"));
        assert_eq!(slow, SendOutcome::Superseded);
        assert_eq!(fast, SendOutcome::Answered);

        let texts: Vec<String> = ctl.transcript().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["slow", "fast", "re: fast"]);
        assert!(!ctl.is_pending());
    }

    #[tokio::test]
    async fn test_pending_stays_up_while_any_request_in_flight() {
        let ctl = controller(Arc::new(RacingAnswers {
            gate: Notify::new(),
        }));
        let mut rx = ctl.subscribe();

        tokio::join!(ctl.send_message("slow"), ctl.send_message("fast"));

        let pending: Vec<bool> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::PendingChanged(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(pending, vec![true, false]);
    }
}
