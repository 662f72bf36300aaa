//! Entity data provider seam.
//!
//! The chat engine reads universities through [`EntityProvider`] and never
//! writes. [`InMemoryCatalog`] is the in-process implementation used by the
//! binary and by tests; the surrounding listing/CRUD features own mutation.

use std::collections::HashSet;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::error::{Result, UniGuideError};
use crate::types::{AdmissionStatus, Program, University};

/// Read-only access to the university catalog.
///
/// Implementations must report failures as `Err`, never panic.
#[async_trait]
pub trait EntityProvider: Send + Sync {
    /// All known universities, in catalog order.
    async fn list_entities(&self) -> Result<Vec<University>>;

    /// Find a university whose name or acronym matches `name`, ignoring case
    /// and surrounding whitespace.
    async fn find_entity_by_name(&self, name: &str) -> Result<Option<University>>;
}

/// Thread-safe in-memory university catalog.
#[derive(Debug)]
pub struct InMemoryCatalog {
    entities: RwLock<Vec<University>>,
}

impl InMemoryCatalog {
    /// Create a catalog holding the given universities.
    pub fn new(entities: Vec<University>) -> Self {
        Self {
            entities: RwLock::new(entities),
        }
    }

    /// Load a catalog from a JSON array of universities.
    ///
    /// Rejects files containing duplicate ids.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entities: Vec<University> = serde_json::from_str(&content)?;
        let mut seen = HashSet::new();
        for u in &entities {
            if !seen.insert(u.id) {
                return Err(UniGuideError::InvalidCatalog(format!(
                    "duplicate university id {}",
                    u.id
                )));
            }
        }
        info!(count = entities.len(), path = %path.display(), "Catalog loaded");
        Ok(Self::new(entities))
    }

    /// Built-in sample catalog.
    pub fn sample() -> Self {
        Self::new(sample_universities())
    }

    /// Insert or replace a university by id.
    pub fn upsert(&self, university: University) -> Result<()> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| UniGuideError::Provider(format!("catalog lock poisoned: {}", e)))?;
        match entities.iter_mut().find(|u| u.id == university.id) {
            Some(existing) => *existing = university,
            None => entities.push(university),
        }
        Ok(())
    }

    /// Remove a university by id. Returns whether anything was removed.
    pub fn remove(&self, id: u64) -> Result<bool> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| UniGuideError::Provider(format!("catalog lock poisoned: {}", e)))?;
        let before = entities.len();
        entities.retain(|u| u.id != id);
        Ok(entities.len() != before)
    }

    /// Number of universities in the catalog.
    pub fn len(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntityProvider for InMemoryCatalog {
    async fn list_entities(&self) -> Result<Vec<University>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| UniGuideError::Provider(format!("catalog lock poisoned: {}", e)))?;
        Ok(entities.clone())
    }

    async fn find_entity_by_name(&self, name: &str) -> Result<Option<University>> {
        let entities = self
            .entities
            .read()
            .map_err(|e| UniGuideError::Provider(format!("catalog lock poisoned: {}", e)))?;
        Ok(entities
            .iter()
            .filter(|u| u.matches_name(name))
            .min_by_key(|u| u.id)
            .cloned())
    }
}

fn program(name: &str, level: &str) -> Program {
    Program {
        name: name.to_string(),
        level: Some(level.to_string()),
    }
}

fn sample_universities() -> Vec<University> {
    vec![
        University {
            id: 1,
            name: "Polytechnic University of the Philippines".into(),
            acronym: "PUP".into(),
            location: "Sta. Mesa, Manila".into(),
            admission_status: AdmissionStatus::Open,
            programs: vec![
                program("BS Computer Science", "Bachelor"),
                program("BS Information Technology", "Bachelor"),
                program("BS Accountancy", "Bachelor"),
                program("BS Civil Engineering", "Bachelor"),
            ],
            description: Some(
                "It is one of the largest state universities in the country, known for \
                 low tuition and strong engineering and business programs."
                    .into(),
            ),
        },
        University {
            id: 2,
            name: "University of the Philippines Diliman".into(),
            acronym: "UP".into(),
            location: "Diliman, Quezon City".into(),
            admission_status: AdmissionStatus::Closed,
            programs: vec![
                program("BS Computer Science", "Bachelor"),
                program("BS Physics", "Bachelor"),
                program("MS Data Science", "Master"),
            ],
            description: Some(
                "It is the flagship campus of the national university system.".into(),
            ),
        },
        University {
            id: 3,
            name: "Ateneo de Manila University".into(),
            acronym: "ADMU".into(),
            location: "Loyola Heights, Quezon City".into(),
            admission_status: AdmissionStatus::Upcoming,
            programs: vec![
                program("BS Management", "Bachelor"),
                program("AB Communication", "Bachelor"),
            ],
            description: Some("It is a private Jesuit research university.".into()),
        },
        University {
            id: 4,
            name: "De La Salle University".into(),
            acronym: "DLSU".into(),
            location: "Malate, Manila".into(),
            admission_status: AdmissionStatus::Open,
            programs: vec![
                program("BS Computer Engineering", "Bachelor"),
                program("BS Psychology", "Bachelor"),
            ],
            description: Some("It is a private Lasallian research university.".into()),
        },
        University {
            id: 5,
            name: "University of Santo Tomas".into(),
            acronym: "UST".into(),
            location: "Sampaloc, Manila".into(),
            admission_status: AdmissionStatus::Unknown,
            programs: vec![
                program("BS Nursing", "Bachelor"),
                program("BS Architecture", "Bachelor"),
            ],
            description: Some("It is the oldest existing university in Asia.".into()),
        },
    ]
}
