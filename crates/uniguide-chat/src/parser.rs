//! Input normalization and candidate-name cleanup.
//!
//! Everything here is pure: no provider access, no state. The rule engine
//! uses these helpers to turn a regex capture into a lookup key before the
//! resolver ever touches the catalog.

use uniguide_core::types::normalize_key;

/// Words that name a category rather than a specific university.
///
/// A rule whose capture is one of these does not apply to the input.
static GENERIC_TERMS: &[&str] = &[
    "universities", "university", "schools", "school", "colleges", "college",
    "campuses", "campus", "programs", "program", "courses", "course", "degrees",
    "the", "it", "them", "this", "that", "these", "those", "there", "here", "total",
    "each", "everything", "anything", "something", "you", "me", "yourself",
];

/// Category words that head a generic phrase.
static PLURAL_TERMS: &[&str] = &[
    "universities", "schools", "colleges", "campuses", "programs", "courses", "degrees",
];

/// Quantifiers stripped before the generic-term check ("all universities").
static QUANTIFIERS: &[&str] = &["all", "every", "any", "the", "those", "these"];

/// Lowercase, trim, and collapse internal whitespace runs to single spaces.
pub fn normalize_input(raw: &str) -> String {
    normalize_key(raw)
}

/// Clean a raw regex capture into a lookup candidate.
///
/// Strips trailing punctuation and a leading "the". Returns `None` when
/// nothing meaningful remains.
pub fn clean_candidate(raw: &str) -> Option<String> {
    let stripped = raw.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, '?' | '!' | '.' | ',' | ';' | ':')
    });
    let normalized = normalize_key(stripped);
    let candidate = normalized.strip_prefix("the ").unwrap_or(&normalized);
    if candidate.is_empty() {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// Whether a cleaned candidate refers to a category instead of a university.
pub fn is_generic_term(candidate: &str) -> bool {
    let mut words: Vec<&str> = candidate.split_whitespace().collect();
    while words.len() > 1 && QUANTIFIERS.contains(&words[0]) {
        words.remove(0);
    }
    match words.as_slice() {
        [] => true,
        [single] => GENERIC_TERMS.contains(single),
        // "universities in manila" is generic, "university of santo tomas" is a name
        [head, ..] => PLURAL_TERMS.contains(head),
    }
}
