//! Entity resolution against the university catalog.
//!
//! [`select_entity`] is the pure matching step over a snapshot;
//! [`EntityResolver`] owns the provider and the read timeout.

use std::sync::Arc;
use std::time::Duration;

use uniguide_core::provider::EntityProvider;
use uniguide_core::types::University;

use crate::error::ChatError;

/// Pick the university whose name or acronym equals `name` after
/// normalization.
///
/// When several match (say two campuses sharing an acronym) the one with the
/// lowest id wins, independent of snapshot order.
pub fn select_entity<'a>(entities: &'a [University], name: &str) -> Option<&'a University> {
    entities
        .iter()
        .filter(|u| u.matches_name(name))
        .min_by_key(|u| u.id)
}

/// Reads catalog snapshots and resolves names against them.
#[derive(Clone)]
pub struct EntityResolver {
    provider: Arc<dyn EntityProvider>,
    timeout: Duration,
}

impl EntityResolver {
    pub fn new(provider: Arc<dyn EntityProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Take one consistent read of the catalog.
    ///
    /// Provider errors and reads exceeding the configured timeout both come
    /// back as `Err`.
    pub async fn snapshot(&self) -> Result<Vec<University>, ChatError> {
        match tokio::time::timeout(self.timeout, self.provider.list_entities()).await {
            Ok(result) => result.map_err(ChatError::from),
            Err(_) => Err(ChatError::ProviderTimeout(self.timeout.as_millis() as u64)),
        }
    }

    /// Resolve a single name with a fresh snapshot.
    pub async fn resolve(&self, name: &str) -> Result<Option<University>, ChatError> {
        let entities = self.snapshot().await?;
        Ok(select_entity(&entities, name).cloned())
    }
}
