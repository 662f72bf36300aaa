//! Second dispatch tier: ordered regex rules over named entities.
//!
//! Each rule splits into a pure extraction step ([`Rule::extract`]) and an
//! impure resolution step run by [`RuleEngine::apply`]. A rule whose regex
//! does not match, or whose capture names a category instead of a
//! university, is inapplicable and the engine moves on. Once a rule has
//! extracted real candidates the engine commits to it: an unknown name is
//! reported as [`RuleOutcome::NotFound`] and no later rule is tried.

use regex::Regex;
use tracing::debug;
use uniguide_core::types::University;

use crate::error::ChatError;
use crate::parser::{clean_candidate, is_generic_term};
use crate::resolver::{select_entity, EntityResolver};

const NAME_GROUP: &str = "name";
const FIRST_GROUP: &str = "first";
const SECOND_GROUP: &str = "second";

/// Renders an answer about one university.
pub type RenderOne = fn(&University) -> String;
/// Renders an answer about two universities.
pub type RenderPair = fn(&University, &University) -> String;

/// How a matched rule turns resolved entities into text.
#[derive(Clone, Copy)]
pub enum RuleHandler {
    /// Pattern captures `(?P<name>...)`.
    Single(RenderOne),
    /// Pattern captures `(?P<first>...)` and `(?P<second>...)`.
    Pair(RenderPair),
}

impl RuleHandler {
    fn groups(&self) -> &'static [&'static str] {
        match self {
            RuleHandler::Single(_) => &[NAME_GROUP],
            RuleHandler::Pair(_) => &[FIRST_GROUP, SECOND_GROUP],
        }
    }
}

/// Result of running the rule tier on one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// A rule matched and every named university resolved.
    Text(String),
    /// A rule matched but this candidate is not in the catalog.
    NotFound(String),
    /// No rule applies to the input.
    Inapplicable,
}

/// A compiled, case-insensitive pattern with its handler.
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    handler: RuleHandler,
}

impl Rule {
    /// Compile a rule. The pattern is always matched case-insensitively and
    /// must contain the capture groups its handler expects.
    pub fn new(name: &'static str, pattern: &str, handler: RuleHandler) -> Result<Self, ChatError> {
        let pattern = Regex::new(&format!("(?i){}", pattern)).map_err(|e| {
            ChatError::InvalidPattern {
                rule: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        for group in handler.groups() {
            if !pattern.capture_names().flatten().any(|n| n == *group) {
                return Err(ChatError::InvalidPattern {
                    rule: name.to_string(),
                    reason: format!("missing capture group '{}'", group),
                });
            }
        }
        Ok(Self {
            name,
            pattern,
            handler,
        })
    }

    pub fn single(name: &'static str, pattern: &str, render: RenderOne) -> Result<Self, ChatError> {
        Self::new(name, pattern, RuleHandler::Single(render))
    }

    pub fn pair(name: &'static str, pattern: &str, render: RenderPair) -> Result<Self, ChatError> {
        Self::new(name, pattern, RuleHandler::Pair(render))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Extract cleaned lookup candidates from `input`.
    ///
    /// Returns `None` when the pattern does not match or any capture is
    /// empty or generic. Never touches the catalog.
    pub fn extract(&self, input: &str) -> Option<Vec<String>> {
        let caps = self.pattern.captures(input)?;
        let mut candidates = Vec::with_capacity(self.handler.groups().len());
        for group in self.handler.groups() {
            let candidate = clean_candidate(caps.name(group)?.as_str())?;
            if is_generic_term(&candidate) {
                return None;
            }
            candidates.push(candidate);
        }
        Some(candidates)
    }

    fn render(&self, entities: &[&University]) -> Option<String> {
        match (self.handler, entities) {
            (RuleHandler::Single(render), [one]) => Some(render(*one)),
            (RuleHandler::Pair(render), [a, b]) => Some(render(*a, *b)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Strictly ordered rule list.
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The built-in UniGuide rule set.
    pub fn builtin() -> Result<Self, ChatError> {
        Ok(Self::new(default_rules()?))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule that applies to `input`, with its candidates. Pure.
    pub fn find_applicable(&self, input: &str) -> Option<(&Rule, Vec<String>)> {
        self.rules
            .iter()
            .find_map(|rule| rule.extract(input).map(|candidates| (rule, candidates)))
    }

    /// Run the tier: extract, then resolve every candidate against a single
    /// catalog snapshot.
    ///
    /// The catalog is only read when some rule applies. Provider failures are
    /// returned as `Err` for the dispatcher to degrade.
    pub async fn apply(
        &self,
        input: &str,
        resolver: &EntityResolver,
    ) -> Result<RuleOutcome, ChatError> {
        let Some((rule, candidates)) = self.find_applicable(input) else {
            return Ok(RuleOutcome::Inapplicable);
        };

        let snapshot = resolver.snapshot().await?;
        let mut resolved = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            match select_entity(&snapshot, candidate) {
                Some(entity) => resolved.push(entity),
                None => {
                    debug!(rule = rule.name(), candidate = %candidate, "Entity not found");
                    return Ok(RuleOutcome::NotFound(candidate.clone()));
                }
            }
        }

        match rule.render(&resolved) {
            Some(text) => {
                debug!(rule = rule.name(), "Pattern rule answered");
                Ok(RuleOutcome::Text(text))
            }
            None => Ok(RuleOutcome::Inapplicable),
        }
    }
}

// =============================================================================
// Built-in rules
// =============================================================================

fn default_rules() -> Result<Vec<Rule>, ChatError> {
    Ok(vec![
        Rule::pair(
            "compare",
            r"^compare\s+(?P<first>.+?)\s+(?:and|vs\.?|versus|with|to)\s+(?P<second>.+)$",
            render_comparison,
        )?,
        Rule::single("where_is", r"^where\s+is\s+(?P<name>.+)$", render_location)?,
        Rule::single("location_of", r"\blocation\s+of\s+(?P<name>.+)$", render_location)?,
        Rule::single(
            "program_count_of",
            r"^how\s+many\s+programs?\s+(?:does|do|at|in|of)\s+(?P<name>.+?)(?:\s+offer\b.*)?$",
            render_program_count,
        )?,
        Rule::single(
            "programs_of",
            r"\bprograms?\s+(?:of|at|in|offered\s+by)\s+(?P<name>.+)$",
            render_programs,
        )?,
        Rule::single(
            "programs_offered",
            r"^what\s+programs\s+(?:does|do)\s+(?P<name>.+?)\s+offer\b",
            render_programs,
        )?,
        Rule::single(
            "admission_of",
            r"\badmissions?\s+(?:status\s+)?(?:of|at|for|in)\s+(?P<name>.+)$",
            render_admission,
        )?,
        Rule::single(
            "is_open",
            r"^is\s+(?P<name>.+?)\s+(?:still\s+)?(?:open|accepting)\b",
            render_admission,
        )?,
        Rule::single(
            "stands_for",
            r"^what\s+does\s+(?P<name>.+?)\s+stand\s+for\b",
            render_full_name,
        )?,
        Rule::single(
            "tell_me_about",
            r"^tell\s+me\s+(?:more\s+)?about\s+(?P<name>.+)$",
            render_about,
        )?,
        Rule::single(
            "info_on",
            r"^(?:info|information|details)\s+(?:on|about|for)\s+(?P<name>.+)$",
            render_about,
        )?,
        Rule::single("what_is", r"^(?:what|who)\s+is\s+(?P<name>.+)$", render_about)?,
    ])
}

fn render_about(u: &University) -> String {
    u.long_description()
}

fn render_location(u: &University) -> String {
    format!("{} ({}) is located in {}.", u.name, u.acronym, u.location)
}

fn render_programs(u: &University) -> String {
    match u.program_list() {
        Some(list) => format!("{} offers the following programs: {}.", u.acronym, list),
        None => format!("{} has no programs listed yet.", u.name),
    }
}

fn render_program_count(u: &University) -> String {
    match u.programs.len() {
        0 => format!("{} has no programs listed yet.", u.name),
        1 => format!("{} offers 1 program.", u.acronym),
        n => format!("{} offers {} programs.", u.acronym, n),
    }
}

fn render_admission(u: &University) -> String {
    format!(
        "Admission at {} ({}) is {}.",
        u.name,
        u.acronym,
        u.admission_status.describe()
    )
}

fn render_full_name(u: &University) -> String {
    format!("{} stands for {}.", u.acronym, u.name)
}

fn render_comparison(a: &University, b: &University) -> String {
    let line = |u: &University| {
        format!(
            "{} is in {}, lists {} program{}, and admission is {}.",
            u.acronym,
            u.location,
            u.programs.len(),
            if u.programs.len() == 1 { "" } else { "s" },
            u.admission_status.describe()
        )
    };
    format!("Comparing {} and {}: {} {}", a.acronym, b.acronym, line(a), line(b))
}
