//! Query dispatcher: runs the tiers in a fixed order for one input.
//!
//! Order: keyword -> pattern rules -> dynamic intents -> fallback. The first
//! tier producing a result wins. `resolve` never fails and never returns an
//! empty reply; provider errors are absorbed by the tier that owns them.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uniguide_core::config::ChatConfig;
use uniguide_core::provider::EntityProvider;

use crate::dynamic::DynamicResolver;
use crate::error::ChatError;
use crate::keyword::KeywordMatcher;
use crate::knowledge::KnowledgeBase;
use crate::parser::normalize_input;
use crate::resolver::EntityResolver;
use crate::response;
use crate::rules::{RuleEngine, RuleOutcome};
use crate::types::{Reply, Tier};

/// Coordinates the four resolution tiers.
pub struct QueryDispatcher {
    keywords: KeywordMatcher,
    rules: RuleEngine,
    dynamic: DynamicResolver,
    resolver: EntityResolver,
}

impl QueryDispatcher {
    /// Build a dispatcher from explicit tables.
    pub fn new(
        knowledge: KnowledgeBase,
        rules: RuleEngine,
        dynamic: DynamicResolver,
        provider: Arc<dyn EntityProvider>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            keywords: KeywordMatcher::new(Arc::new(knowledge)),
            rules,
            dynamic,
            resolver: EntityResolver::new(provider, provider_timeout),
        }
    }

    /// Build a dispatcher with the built-in knowledge base, rules, and intents.
    pub fn with_defaults(
        provider: Arc<dyn EntityProvider>,
        config: &ChatConfig,
    ) -> Result<Self, ChatError> {
        Ok(Self::new(
            KnowledgeBase::builtin()?,
            RuleEngine::builtin()?,
            DynamicResolver::builtin(),
            provider,
            Duration::from_millis(config.provider_timeout_ms),
        ))
    }

    /// Resolve raw user input to exactly one reply.
    pub async fn resolve(&self, raw_input: &str) -> Reply {
        let input = normalize_input(raw_input);
        if input.is_empty() {
            return response::fallback();
        }

        let reply = self.run_tiers(&input).await;
        if reply.text.trim().is_empty() {
            warn!(tier = ?reply.tier, "Tier produced an empty reply, using fallback");
            return response::fallback();
        }
        debug!(tier = ?reply.tier, "Query resolved");
        reply
    }

    /// Text-only form of [`resolve`](Self::resolve).
    pub async fn resolve_text(&self, raw_input: &str) -> String {
        self.resolve(raw_input).await.text
    }

    async fn run_tiers(&self, input: &str) -> Reply {
        // Tier 1: knowledge base keywords
        if let Some(entry) = self.keywords.match_input(input) {
            return Reply::new(entry.response.clone(), Tier::Keyword)
                .with_suggestions(entry.suggestions.clone());
        }

        // Tier 2: pattern rules. NotFound stops here; only Inapplicable continues.
        match self.rules.apply(input, &self.resolver).await {
            Ok(RuleOutcome::Text(text)) => return Reply::new(text, Tier::Pattern),
            Ok(RuleOutcome::NotFound(candidate)) => return response::not_found(&candidate),
            Ok(RuleOutcome::Inapplicable) => {}
            Err(e) => {
                warn!(error = %e, "Pattern lookup failed");
                return response::lookup_unavailable();
            }
        }

        // Tier 3: dynamic intents (absorbs its own failures)
        if let Some(text) = self.dynamic.try_dynamic(input, &self.resolver).await {
            return Reply::new(text, Tier::Dynamic);
        }

        // Tier 4
        response::fallback()
    }
}
