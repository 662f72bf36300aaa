use serde::{Deserialize, Serialize};
use uniguide_core::types::Message;

/// Dispatch stage that produced a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Keyword,
    Pattern,
    Dynamic,
    Fallback,
}

/// A resolved answer for one user turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    /// Suggestion chips to attach to the assistant message.
    pub suggestions: Vec<String>,
    pub tier: Tier,
}

impl Reply {
    pub fn new(text: impl Into<String>, tier: Tier) -> Self {
        Self {
            text: text.into(),
            suggestions: Vec::new(),
            tier,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// Conversation session mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Idle,
    AwaitingResponse,
}

/// What happened to a submitted turn's deferred reply.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// The assistant message was appended to the log.
    Delivered(Message),
    /// The session was reset before the reply landed; nothing was appended.
    Discarded,
}
