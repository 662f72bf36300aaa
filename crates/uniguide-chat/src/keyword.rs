//! First dispatch tier: substring lookup against the knowledge base.

use std::sync::Arc;

use crate::knowledge::{KnowledgeBase, KnowledgeEntry};

/// Scans knowledge base entries in declared order for a trigger contained
/// in the input.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    knowledge: Arc<KnowledgeBase>,
}

impl KeywordMatcher {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Return the first entry whose trigger is a substring of `input`.
    ///
    /// `input` must already be normalized. Empty or whitespace-only input
    /// never matches.
    pub fn match_input(&self, input: &str) -> Option<&KnowledgeEntry> {
        if input.trim().is_empty() {
            return None;
        }
        self.knowledge
            .entries()
            .iter()
            .find(|entry| input.contains(entry.trigger.as_str()))
    }
}
