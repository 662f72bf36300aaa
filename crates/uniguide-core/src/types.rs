use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Whether a university is currently taking applications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    /// Accepting applications.
    Open,
    /// Application period has ended.
    Closed,
    /// Application period has been announced but not started.
    Upcoming,
    /// No published schedule.
    #[default]
    Unknown,
}

impl AdmissionStatus {
    /// Human-readable phrase for use inside a sentence.
    pub fn describe(&self) -> &'static str {
        match self {
            AdmissionStatus::Open => "currently open",
            AdmissionStatus::Closed => "currently closed",
            AdmissionStatus::Upcoming => "opening soon",
            AdmissionStatus::Unknown => "not yet announced",
        }
    }
}

impl std::fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdmissionStatus::Open => "open",
            AdmissionStatus::Closed => "closed",
            AdmissionStatus::Upcoming => "upcoming",
            AdmissionStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Author of a conversation message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

// =============================================================================
// Entities
// =============================================================================

/// A degree program offered by a university.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    /// Degree level, e.g. "Bachelor" or "Master".
    #[serde(default)]
    pub level: Option<String>,
}

/// A university record owned by the catalog.
///
/// The chat engine only ever holds a per-call copy of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub id: u64,
    pub name: String,
    pub acronym: String,
    pub location: String,
    #[serde(default)]
    pub admission_status: AdmissionStatus,
    #[serde(default)]
    pub programs: Vec<Program>,
    /// Free-form summary shown in "tell me about" answers.
    #[serde(default)]
    pub description: Option<String>,
}

impl University {
    /// Long-form description used when a user asks about this university.
    pub fn long_description(&self) -> String {
        let mut text = format!("{} ({}) is located in {}.", self.name, self.acronym, self.location);
        if let Some(ref description) = self.description {
            text.push(' ');
            text.push_str(description);
        }
        if !self.programs.is_empty() {
            text.push_str(&format!(
                " It offers {} program{}.",
                self.programs.len(),
                if self.programs.len() == 1 { "" } else { "s" }
            ));
        }
        text.push_str(&format!(
            " Admission is {}.",
            self.admission_status.describe()
        ));
        text
    }

    /// Comma-separated program names, or `None` when nothing is listed.
    pub fn program_list(&self) -> Option<String> {
        if self.programs.is_empty() {
            return None;
        }
        Some(
            self.programs
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Whether `name` equals this university's name or acronym under
    /// [`normalize_key`].
    pub fn matches_name(&self, name: &str) -> bool {
        let needle = normalize_key(name);
        !needle.is_empty()
            && (normalize_key(&self.name) == needle || normalize_key(&self.acronym) == needle)
    }
}

/// Lookup key for names and acronyms: lowercase, trimmed, and with internal
/// whitespace runs collapsed to one space.
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// =============================================================================
// Conversation
// =============================================================================

/// A single entry in a conversation log. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Suggestion chips attached to an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl Message {
    /// Build a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            suggestions: None,
        }
    }

    /// Build an assistant message. An empty suggestion list is stored as `None`.
    pub fn assistant(content: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            suggestions: if suggestions.is_empty() {
                None
            } else {
                Some(suggestions)
            },
        }
    }
}
