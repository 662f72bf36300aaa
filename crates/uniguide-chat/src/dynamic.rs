//! Third dispatch tier: broad intents answered from a live catalog read.
//!
//! Intents are an ordered list of `{predicate, compute, degraded}` triples.
//! The first intent whose predicate accepts the input owns the turn; if the
//! catalog read fails or times out, its canned degraded message is returned
//! instead. Nothing escapes this tier as an error.

use tracing::{debug, warn};
use uniguide_core::types::{AdmissionStatus, University};

use crate::resolver::EntityResolver;

/// One broad query intent.
#[derive(Clone, Copy)]
pub struct DynamicIntent {
    pub name: &'static str,
    /// Receives normalized input.
    pub predicate: fn(&str) -> bool,
    pub compute: fn(&[University]) -> String,
    /// Topic-relevant answer used when the catalog cannot be read.
    pub degraded: &'static str,
}

impl std::fmt::Debug for DynamicIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicIntent").field("name", &self.name).finish()
    }
}

/// Ordered dynamic intents.
#[derive(Debug, Clone)]
pub struct DynamicResolver {
    intents: Vec<DynamicIntent>,
}

impl DynamicResolver {
    pub fn new(intents: Vec<DynamicIntent>) -> Self {
        Self { intents }
    }

    /// The built-in UniGuide intents.
    pub fn builtin() -> Self {
        Self::new(default_intents())
    }

    /// First intent accepting `input`. Pure.
    pub fn matching_intent(&self, input: &str) -> Option<&DynamicIntent> {
        self.intents.iter().find(|intent| (intent.predicate)(input))
    }

    /// Answer `input` from a catalog snapshot, or `None` if no intent applies.
    pub async fn try_dynamic(&self, input: &str, resolver: &EntityResolver) -> Option<String> {
        let intent = self.matching_intent(input)?;
        match resolver.snapshot().await {
            Ok(entities) => {
                debug!(intent = intent.name, count = entities.len(), "Dynamic intent answered");
                Some((intent.compute)(&entities))
            }
            Err(e) => {
                warn!(intent = intent.name, error = %e, "Catalog read failed, using degraded answer");
                Some(intent.degraded.to_string())
            }
        }
    }
}

// =============================================================================
// Built-in intents
// =============================================================================

fn contains_any(input: &str, words: &[&str]) -> bool {
    words.iter().any(|w| input.contains(w))
}

fn default_intents() -> Vec<DynamicIntent> {
    vec![
        DynamicIntent {
            name: "university_count",
            predicate: |input| {
                input.contains("how many") && contains_any(input, &["universit", "school"])
            },
            compute: |entities| match entities.len() {
                1 => "There is currently 1 university in our database.".to_string(),
                n => format!("There are currently {} universities in our database.", n),
            },
            degraded: "I can't reach the university list right now, so I don't have an exact \
                       count. Please try again in a moment.",
        },
        DynamicIntent {
            name: "program_count",
            predicate: |input| {
                input.contains("program") && contains_any(input, &["count", "how many", "total"])
            },
            compute: |entities| {
                let total: usize = entities.iter().map(|u| u.programs.len()).sum();
                format!(
                    "Across {} universities there are {} programs listed in total.",
                    entities.len(),
                    total
                )
            },
            degraded: "I can't count programs right now because the catalog is unavailable. \
                       Each university typically offers dozens of programs.",
        },
        DynamicIntent {
            name: "open_admissions",
            predicate: |input| input.contains("open") && input.contains("admission"),
            compute: |entities| {
                let open: Vec<&str> = entities
                    .iter()
                    .filter(|u| u.admission_status == AdmissionStatus::Open)
                    .map(|u| u.acronym.as_str())
                    .collect();
                if open.is_empty() {
                    "No universities in our database have open admission right now.".to_string()
                } else {
                    format!("Admission is currently open at: {}.", open.join(", "))
                }
            },
            degraded: "I can't check admission schedules right now. Admission periods usually \
                       open several months before the school year starts.",
        },
        DynamicIntent {
            name: "list_universities",
            predicate: |input| {
                contains_any(input, &["list", "show all", "all"])
                    && contains_any(input, &["universities", "schools"])
            },
            compute: |entities| {
                if entities.is_empty() {
                    return "There are no universities in our database yet.".to_string();
                }
                let names: Vec<String> = entities
                    .iter()
                    .map(|u| format!("{} ({})", u.name, u.acronym))
                    .collect();
                format!("Here are the universities I know about: {}.", names.join("; "))
            },
            degraded: "I can't load the university list right now. Please try again shortly.",
        },
        DynamicIntent {
            name: "compare_hint",
            predicate: |input| input.contains("compare"),
            compute: |entities| {
                let examples: Vec<&str> =
                    entities.iter().take(2).map(|u| u.acronym.as_str()).collect();
                match examples.as_slice() {
                    [a, b] => format!(
                        "To compare universities, ask something like \"compare {} and {}\".",
                        a, b
                    ),
                    _ => "To compare universities, ask \"compare <university> and <university>\"."
                        .to_string(),
                }
            },
            degraded: "To compare universities, ask \"compare <university> and <university>\".",
        },
    ]
}
