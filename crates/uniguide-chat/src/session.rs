//! Conversation session: one chat's message log and turn state machine.
//!
//! States are [`SessionMode::Idle`] and [`SessionMode::AwaitingResponse`].
//! A submission appends the user message immediately and spawns one deferred
//! task that resolves the reply and waits out the typing delay. That task is
//! tagged with the session epoch; [`ChatSession::reset`] bumps the epoch and
//! aborts the task, and a task that still lands with a stale epoch appends
//! nothing.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};
use uniguide_core::config::ChatConfig;
use uniguide_core::types::Message;

use crate::dispatcher::QueryDispatcher;
use crate::error::ChatError;
use crate::response;
use crate::types::{Reply, SessionMode, TurnOutcome};

struct SessionState {
    messages: Vec<Message>,
    mode: SessionMode,
    epoch: u64,
    draft: String,
    in_flight: Option<AbortHandle>,
}

impl SessionState {
    fn seeded(greeting: &str) -> Self {
        Self {
            messages: vec![Message::assistant(greeting, Vec::new())],
            mode: SessionMode::Idle,
            epoch: 0,
            draft: String::new(),
            in_flight: None,
        }
    }
}

/// Handle to the deferred reply of one accepted submission.
#[derive(Debug)]
pub struct PendingTurn {
    epoch: u64,
    handle: JoinHandle<TurnOutcome>,
}

impl PendingTurn {
    /// Epoch the turn was submitted under.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Wait for the reply to land. A turn cancelled by reset counts as
    /// discarded.
    pub async fn wait(self) -> TurnOutcome {
        self.handle.await.unwrap_or(TurnOutcome::Discarded)
    }
}

/// A single in-memory conversation.
///
/// Submissions spawn onto the current tokio runtime.
pub struct ChatSession {
    dispatcher: Arc<QueryDispatcher>,
    state: Arc<Mutex<SessionState>>,
    greeting: String,
    response_delay: Duration,
    max_message_length: usize,
}

impl ChatSession {
    /// Create a session in `Idle` with the greeting already in the log.
    pub fn new(dispatcher: Arc<QueryDispatcher>, config: &ChatConfig) -> Self {
        Self {
            dispatcher,
            state: Arc::new(Mutex::new(SessionState::seeded(&config.greeting))),
            greeting: config.greeting.clone(),
            response_delay: Duration::from_millis(config.response_delay_ms),
            max_message_length: config.max_message_length,
        }
    }

    /// Submit user text.
    ///
    /// Rejects empty or overlong text and any submission made while a reply
    /// is pending; a rejected submission leaves the session untouched.
    pub fn submit(&self, text: &str) -> Result<PendingTurn, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        let mut state = lock(&self.state);
        if state.mode == SessionMode::AwaitingResponse {
            debug!("Submission ignored while awaiting response");
            return Err(ChatError::AwaitingResponse);
        }

        state.messages.push(Message::user(text));
        state.mode = SessionMode::AwaitingResponse;
        state.draft.clear();
        let epoch = state.epoch;

        let turn = tokio::spawn(run_turn(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.state),
            text.to_string(),
            epoch,
            self.response_delay,
        ));
        state.in_flight = Some(turn.abort_handle());
        let handle = tokio::spawn(supervise_turn(turn, Arc::clone(&self.state), epoch));

        Ok(PendingTurn { epoch, handle })
    }

    /// Submit the current draft. The draft is cleared only if accepted.
    pub fn submit_draft(&self) -> Result<PendingTurn, ChatError> {
        let draft = lock(&self.state).draft.clone();
        self.submit(&draft)
    }

    /// Submit a suggestion chip's text as the next user turn.
    pub fn select_suggestion(&self, suggestion: &str) -> Result<PendingTurn, ChatError> {
        self.submit(suggestion)
    }

    /// Start a new chat: clear the log, invalidate in-flight replies, and
    /// seed a fresh greeting.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        if let Some(task) = state.in_flight.take() {
            task.abort();
        }
        let epoch = state.epoch.wrapping_add(1);
        *state = SessionState::seeded(&self.greeting);
        state.epoch = epoch;
        debug!(epoch, "Conversation reset");
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.state).draft = text.into();
    }

    pub fn draft(&self) -> String {
        lock(&self.state).draft.clone()
    }

    /// Ordered snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.state).messages.clone()
    }

    pub fn mode(&self) -> SessionMode {
        lock(&self.state).mode
    }

    /// Whether the typing indicator should show.
    pub fn is_typing(&self) -> bool {
        self.mode() == SessionMode::AwaitingResponse
    }

    pub fn epoch(&self) -> u64 {
        lock(&self.state).epoch
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // State is only mutated in whole steps, so a poisoned guard is still consistent.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_turn(
    dispatcher: Arc<QueryDispatcher>,
    state: Arc<Mutex<SessionState>>,
    text: String,
    epoch: u64,
    delay: Duration,
) -> TurnOutcome {
    let (reply, ()) = tokio::join!(dispatcher.resolve(&text), tokio::time::sleep(delay));
    deliver(&state, epoch, reply)
}

/// Await a turn task. A panicking turn still gets the fallback reply, so the
/// session returns to `Idle` instead of staying busy. A turn aborted by reset
/// is discarded.
async fn supervise_turn(
    turn: JoinHandle<TurnOutcome>,
    state: Arc<Mutex<SessionState>>,
    epoch: u64,
) -> TurnOutcome {
    match turn.await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => {
            warn!(epoch, "Turn task panicked, replying with fallback");
            deliver(&state, epoch, response::fallback())
        }
        Err(_) => TurnOutcome::Discarded,
    }
}

/// Append the assistant reply if `epoch` is still current.
fn deliver(state: &Mutex<SessionState>, epoch: u64, reply: Reply) -> TurnOutcome {
    let mut state = lock(state);
    if state.epoch != epoch {
        debug!(stale = epoch, current = state.epoch, "Discarding reply from reset session");
        return TurnOutcome::Discarded;
    }
    let message = Message::assistant(reply.text, reply.suggestions);
    state.messages.push(message.clone());
    state.mode = SessionMode::Idle;
    state.in_flight = None;
    TurnOutcome::Delivered(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use uniguide_core::error::Result as CoreResult;
    use uniguide_core::provider::{EntityProvider, InMemoryCatalog};
    use uniguide_core::types::{Role, University};

    use crate::response::FALLBACK_TEXT;

    use crate::types::Tier;

    fn config() -> ChatConfig {
        ChatConfig {
            greeting: "Welcome to UniGuide".to_string(),
            response_delay_ms: 1000,
            provider_timeout_ms: 500,
            max_message_length: 50,
        }
    }

    fn session() -> ChatSession {
        let dispatcher =
            QueryDispatcher::with_defaults(Arc::new(InMemoryCatalog::sample()), &config()).unwrap();
        ChatSession::new(Arc::new(dispatcher), &config())
    }

    /// Provider that violates the error-reporting contract by panicking.
    struct PanickingProvider;

    #[async_trait]
    impl EntityProvider for PanickingProvider {
        async fn list_entities(&self) -> CoreResult<Vec<University>> {
            panic!("catalog backend crashed");
        }
        async fn find_entity_by_name(&self, _name: &str) -> CoreResult<Option<University>> {
            panic!("catalog backend crashed");
        }
    }

    // ---- Initial state ----

    #[test]
    fn test_new_session_is_idle_with_greeting() {
        let s = session();
        assert_eq!(s.mode(), SessionMode::Idle);
        assert!(!s.is_typing());
        assert_eq!(s.epoch(), 0);
        let log = s.messages();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].role, Role::Assistant);
        assert_eq!(log[0].content, "Welcome to UniGuide");
    }

    // ---- Submission ----

    #[tokio::test(start_paused = true)]
    async fn test_submit_appends_user_message_synchronously() {
        let s = session();
        let pending = s.submit("hi").unwrap();
        let log = s.messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].role, Role::User);
        assert_eq!(log[1].content, "hi");
        assert!(s.is_typing());
        assert_eq!(pending.epoch(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_appended_after_delay() {
        let s = session();
        let started = tokio::time::Instant::now();
        let outcome = s.submit("hi").unwrap().wait().await;
        assert!(started.elapsed() >= Duration::from_millis(1000));

        let TurnOutcome::Delivered(message) = outcome else {
            panic!("expected delivery");
        };
        assert_eq!(message.role, Role::Assistant);
        assert!(message.suggestions.is_some());
        assert_eq!(s.mode(), SessionMode::Idle);
        assert_eq!(s.messages().len(), 3);
        assert_eq!(s.messages()[2], message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_not_visible_before_delay() {
        let s = session();
        let _pending = s.submit("hi").unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(s.messages().len(), 2);
        assert!(s.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_trimmed() {
        let s = session();
        s.submit("   hello   ").unwrap().wait().await;
        assert_eq!(s.messages()[1].content, "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_submission_rejected() {
        let s = session();
        assert!(matches!(s.submit("   "), Err(ChatError::EmptyMessage)));
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.mode(), SessionMode::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_too_long_submission_rejected() {
        let s = session();
        let long = "a".repeat(51);
        assert!(matches!(s.submit(&long), Err(ChatError::MessageTooLong(50))));
        assert_eq!(s.messages().len(), 1);
        let ok = "a".repeat(50);
        assert!(s.submit(&ok).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_session_rejects_second_submission() {
        let s = session();
        let first = s.submit("hi").unwrap();
        assert!(matches!(s.submit("hello"), Err(ChatError::AwaitingResponse)));
        assert_eq!(s.messages().len(), 2);

        first.wait().await;
        assert_eq!(s.messages().len(), 3);
        assert!(s.submit("hello").is_ok());
    }

    // ---- Draft and chips ----

    #[tokio::test(start_paused = true)]
    async fn test_submit_draft_clears_draft() {
        let s = session();
        s.set_draft("tell me about pup");
        assert_eq!(s.draft(), "tell me about pup");
        let pending = s.submit_draft().unwrap();
        assert_eq!(s.draft(), "");
        pending.wait().await;
        assert_eq!(s.messages()[1].content, "tell me about pup");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_draft_is_kept() {
        let s = session();
        let _first = s.submit("hi").unwrap();
        s.set_draft("where is ust");
        assert!(s.submit_draft().is_err());
        assert_eq!(s.draft(), "where is ust");
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_suggestion_submits_chip_text() {
        let s = session();
        let TurnOutcome::Delivered(greeting_reply) = s.submit("hi").unwrap().wait().await else {
            panic!("expected delivery");
        };
        let chip = greeting_reply.suggestions.unwrap()[0].clone();
        s.select_suggestion(&chip).unwrap().wait().await;
        let log = s.messages();
        assert_eq!(log[3].content, chip);
        assert_eq!(log[4].role, Role::Assistant);
    }

    // ---- Reset ----

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_log_and_bumps_epoch() {
        let s = session();
        s.submit("hi").unwrap().wait().await;
        s.set_draft("unsent");
        s.reset();
        assert_eq!(s.epoch(), 1);
        assert_eq!(s.mode(), SessionMode::Idle);
        assert_eq!(s.draft(), "");
        let log = s.messages();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].content, "Welcome to UniGuide");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_delay_discards_reply() {
        let s = session();
        let pending = s.submit("hi").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        s.reset();
        assert_eq!(pending.wait().await, TurnOutcome::Discarded);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(s.messages().len(), 1);
        assert!(!s.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_usable_after_reset() {
        let s = session();
        let _stale = s.submit("hi").unwrap();
        s.reset();
        let outcome = s.submit("hello").unwrap().wait().await;
        assert!(matches!(outcome, TurnOutcome::Delivered(_)));
        assert_eq!(s.messages().len(), 3);
    }

    // ---- Panicking turn ----

    #[tokio::test(start_paused = true)]
    async fn test_panicking_turn_replies_with_fallback_and_recovers() {
        let dispatcher =
            QueryDispatcher::with_defaults(Arc::new(PanickingProvider), &config()).unwrap();
        let s = ChatSession::new(Arc::new(dispatcher), &config());

        let outcome = s.submit("tell me about pup").unwrap().wait().await;
        let TurnOutcome::Delivered(message) = outcome else {
            panic!("expected fallback delivery");
        };
        assert_eq!(message.content, FALLBACK_TEXT);
        assert_eq!(s.mode(), SessionMode::Idle);
        assert_eq!(s.messages().len(), 3);

        // Keyword turns never touch the provider and still work afterwards.
        let outcome = s.submit("hi").unwrap().wait().await;
        assert!(matches!(outcome, TurnOutcome::Delivered(_)));
        assert_eq!(s.messages().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_turn_recovers_without_wait() {
        let dispatcher =
            QueryDispatcher::with_defaults(Arc::new(PanickingProvider), &config()).unwrap();
        let s = ChatSession::new(Arc::new(dispatcher), &config());

        drop(s.submit("tell me about pup").unwrap());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(s.mode(), SessionMode::Idle);
        assert!(s.submit("hi").is_ok());
    }

    #[test]
    fn test_deliver_with_stale_epoch_is_noop() {
        let state = Mutex::new(SessionState::seeded("hello"));
        lock(&state).epoch = 3;
        lock(&state).mode = SessionMode::AwaitingResponse;
        let outcome = deliver(&state, 2, Reply::new("late", Tier::Keyword));
        assert_eq!(outcome, TurnOutcome::Discarded);
        let guard = lock(&state);
        assert_eq!(guard.messages.len(), 1);
        assert_eq!(guard.mode, SessionMode::AwaitingResponse);
    }

    #[test]
    fn test_deliver_with_current_epoch_appends() {
        let state = Mutex::new(SessionState::seeded("hello"));
        lock(&state).mode = SessionMode::AwaitingResponse;
        let reply = Reply::new("on time", Tier::Keyword).with_suggestions(vec!["Help".into()]);
        let outcome = deliver(&state, 0, reply);
        assert!(matches!(outcome, TurnOutcome::Delivered(ref m) if m.content == "on time"));
        let guard = lock(&state);
        assert_eq!(guard.messages.len(), 2);
        assert_eq!(guard.mode, SessionMode::Idle);
        assert_eq!(guard.messages[1].suggestions, Some(vec!["Help".to_string()]));
    }
}
