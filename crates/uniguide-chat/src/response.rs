//! Canned replies used when no tier produces an answer or a lookup fails.

use crate::types::{Reply, Tier};

/// Reply when no tier matched, or the input was empty.
pub const FALLBACK_TEXT: &str = "I'm not sure I understand. You can ask me about a specific \
     university (for example \"tell me about PUP\"), its programs or admission status, or \
     how many universities there are.";

/// Reply when a pattern rule matched but its catalog read failed.
pub const LOOKUP_UNAVAILABLE_TEXT: &str = "I can't look up university details right now. \
     Please try again in a moment.";

fn default_suggestions() -> Vec<String> {
    vec![
        "Tell me about PUP".to_string(),
        "How many universities are there?".to_string(),
        "Help".to_string(),
    ]
}

/// Default reply for unmatched input.
pub fn fallback() -> Reply {
    Reply::new(FALLBACK_TEXT, Tier::Fallback).with_suggestions(default_suggestions())
}

/// Reply for a pattern that named a university the catalog does not know.
pub fn not_found(candidate: &str) -> Reply {
    Reply::new(
        format!(
            "I couldn't find a university called \"{}\". Check the spelling, or try its full \
             name or acronym.",
            candidate
        ),
        Tier::Pattern,
    )
    .with_suggestions(vec![
        "List universities".to_string(),
        "Tell me about PUP".to_string(),
    ])
}

/// Reply for a pattern whose catalog read failed.
pub fn lookup_unavailable() -> Reply {
    Reply::new(LOOKUP_UNAVAILABLE_TEXT, Tier::Pattern)
}
