//! Error types for the query engine and conversation session.

use uniguide_core::error::UniGuideError;

/// Errors from the chat engine.
///
/// None of these cross the dispatcher boundary: [`crate::QueryDispatcher::resolve`]
/// absorbs provider failures, and construction errors surface before any
/// conversation starts.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("a response is still pending")]
    AwaitingResponse,
    #[error("duplicate knowledge base trigger: {0}")]
    DuplicateTrigger(String),
    #[error("invalid knowledge base entry: {0}")]
    InvalidEntry(String),
    #[error("invalid pattern for rule {rule}: {reason}")]
    InvalidPattern { rule: String, reason: String },
    #[error("data provider error: {0}")]
    Provider(String),
    #[error("data provider timed out after {0} ms")]
    ProviderTimeout(u64),
}

impl From<UniGuideError> for ChatError {
    fn from(err: UniGuideError) -> Self {
        match err {
            UniGuideError::ProviderTimeout(ms) => ChatError::ProviderTimeout(ms),
            other => ChatError::Provider(other.to_string()),
        }
    }
}
