use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, UniGuideError};

/// Top-level configuration for the UniGuide assistant.
///
/// Loaded from `~/.uniguide/config.toml` by default. Every section falls
/// back to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniGuideConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl UniGuideConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: UniGuideConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        let (config, error) = Self::load_or_fallback(path);
        if let Some(e) = error {
            warn!(
                "Failed to load config from {}: {}. Using defaults.",
                path.display(),
                e
            );
        }
        config
    }

    /// Like [`load_or_default`](Self::load_or_default), but hands the load
    /// error back instead of logging it. Used before a subscriber exists.
    pub fn load_or_fallback(path: &Path) -> (Self, Option<UniGuideError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| UniGuideError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Conversation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Greeting seeded into every new conversation.
    pub greeting: String,
    /// Simulated typing latency before an assistant reply is appended.
    pub response_delay_ms: u64,
    /// Upper bound on a single data provider read in the dynamic tier.
    pub provider_timeout_ms: u64,
    /// Longest accepted user submission, in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: "Hi! I'm UniGuide. Ask me about universities, programs, or admissions."
                .to_string(),
            response_delay_ms: 1000,
            provider_timeout_ms: 3000,
            max_message_length: 500,
        }
    }
}

/// Entity catalog source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file with a list of universities. The built-in sample is used when unset.
    pub path: Option<String>,
}
