//! Static knowledge base: an ordered table of trigger -> canned response.
//!
//! Declared order is precedence. Triggers match as substrings of the
//! normalized input, so several may fit the same message; the earliest entry
//! wins. Entries that share text with a later, shorter trigger must be listed
//! first (for example "goodbye" before "bye").

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::parser::normalize_input;

/// A single trigger and the reply it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Normalized trigger text (lowercase, single-spaced).
    pub trigger: String,
    pub response: String,
    /// Suggestion chips shown under the reply.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl KnowledgeEntry {
    pub fn new(trigger: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            response: response.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Immutable, ordered knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Build a knowledge base, normalizing every trigger.
    ///
    /// Fails on an empty trigger, an empty response, or a trigger that
    /// collides with an earlier one after normalization.
    pub fn new(entries: Vec<KnowledgeEntry>) -> Result<Self, ChatError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.trigger = normalize_input(&entry.trigger);
            if entry.trigger.is_empty() {
                return Err(ChatError::InvalidEntry("trigger is empty".to_string()));
            }
            if entry.response.trim().is_empty() {
                return Err(ChatError::InvalidEntry(format!(
                    "response for '{}' is empty",
                    entry.trigger
                )));
            }
            if !seen.insert(entry.trigger.clone()) {
                return Err(ChatError::DuplicateTrigger(entry.trigger));
            }
            normalized.push(entry);
        }
        Ok(Self {
            entries: normalized,
        })
    }

    /// The built-in UniGuide table.
    pub fn builtin() -> Result<Self, ChatError> {
        Self::new(default_entries())
    }

    /// Entries in precedence order.
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Look up an entry by its exact trigger.
    pub fn get(&self, trigger: &str) -> Option<&KnowledgeEntry> {
        let key = normalize_input(trigger);
        self.entries.iter().find(|e| e.trigger == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn default_entries() -> Vec<KnowledgeEntry> {
    vec![
        // Listed above "hi", which is a substring of "scholarship".
        KnowledgeEntry::new(
            "scholarship",
            "Scholarships are offered by universities, government agencies such as CHED and DOST, \
             and private foundations. Most require good grades and proof of financial need.",
        )
        .with_suggestions(&["Admission requirements", "How many universities are there?"]),
        KnowledgeEntry::new(
            "good morning",
            "Good morning! What would you like to know about universities today?",
        )
        .with_suggestions(&["Tell me about PUP", "How many universities are there?"]),
        KnowledgeEntry::new(
            "hello",
            "Hello! I can tell you about universities, their programs, and admissions.",
        )
        .with_suggestions(&["Tell me about PUP", "How many universities are there?", "Help"]),
        KnowledgeEntry::new(
            "hi",
            "Hi there! Ask me about a university by name or acronym, or about admissions.",
        )
        .with_suggestions(&[
            "Tell me about PUP",
            "How many universities are there?",
            "Admission requirements",
        ]),
        KnowledgeEntry::new(
            "thank",
            "You're welcome! Let me know if there's anything else you'd like to know.",
        ),
        KnowledgeEntry::new(
            "goodbye",
            "Goodbye! Good luck with your university search.",
        ),
        KnowledgeEntry::new("bye", "Bye! Come back anytime."),
        KnowledgeEntry::new(
            "help",
            "You can ask me things like: \"tell me about PUP\", \"where is UST\", \
             \"programs of DLSU\", \"compare UP and ADMU\", or \"how many universities are there\".",
        )
        .with_suggestions(&["Tell me about UP", "Compare PUP and UST", "Program count"]),
        KnowledgeEntry::new(
            "admission requirements",
            "Most universities ask for a completed application form, a copy of your \
             senior high school report card, a birth certificate, and an entrance exam result. \
             Check each university's admission office for its exact list.",
        )
        .with_suggestions(&["Entrance exam", "Scholarships", "Universities with open admission"]),
        KnowledgeEntry::new(
            "entrance exam",
            "Many universities run their own entrance exams (for example the UPCAT or PUPCET). \
             Exams usually cover mathematics, science, English, and reading comprehension.",
        )
        .with_suggestions(&["Admission requirements", "Scholarships"]),
        KnowledgeEntry::new(
            "tuition",
            "Tuition varies widely: state universities are often free under the free tuition law, \
             while private universities charge per unit. Ask a specific university's office for \
             current fees.",
        ),
    ]
}
