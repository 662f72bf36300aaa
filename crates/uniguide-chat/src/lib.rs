//! Query resolution engine for UniGuide.
//!
//! Turns free-text chat input into a single reply by trying four tiers in
//! order (knowledge base keywords, pattern rules, dynamic aggregate queries,
//! default fallback), and drives one resolution per user turn through a
//! per-conversation session state machine.

pub mod dispatcher;
pub mod dynamic;
pub mod error;
pub mod keyword;
pub mod knowledge;
pub mod parser;
pub mod resolver;
pub mod response;
pub mod rules;
pub mod session;
pub mod types;

pub use dispatcher::QueryDispatcher;
pub use dynamic::{DynamicIntent, DynamicResolver};
pub use error::ChatError;
pub use keyword::KeywordMatcher;
pub use knowledge::{KnowledgeBase, KnowledgeEntry};
pub use resolver::EntityResolver;
pub use rules::{Rule, RuleEngine, RuleHandler, RuleOutcome};
pub use session::{ChatSession, PendingTurn};
pub use types::{Reply, SessionMode, Tier, TurnOutcome};
