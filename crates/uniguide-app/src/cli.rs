//! CLI argument definitions for the UniGuide terminal chat.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// UniGuide, a university information assistant for the terminal.
#[derive(Parser, Debug)]
#[command(name = "uniguide", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// JSON file of universities to load instead of the built-in sample.
    #[arg(long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Typing delay before each reply, in milliseconds.
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > UNIGUIDE_CONFIG env var > ~/.uniguide/config.toml
    /// > ./config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("UNIGUIDE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the catalog seed file.
    ///
    /// Priority: --catalog flag > `[catalog].path`. `None` means the
    /// built-in sample catalog.
    pub fn resolve_catalog_path(&self, config_path: Option<&str>) -> Option<PathBuf> {
        self.catalog
            .clone()
            .or_else(|| config_path.map(PathBuf::from))
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > RUST_LOG > config file value.
    pub fn resolve_log_filter(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        match std::env::var("RUST_LOG") {
            Ok(filter) if !filter.trim().is_empty() => filter,
            _ => config_level.to_string(),
        }
    }

    /// Resolve the typing delay. Priority: --delay-ms flag > config file value.
    pub fn resolve_delay_ms(&self, config_delay_ms: u64) -> u64 {
        self.delay_ms.unwrap_or(config_delay_ms)
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");

    if let Ok(home) = home {
        let path = PathBuf::from(home).join(".uniguide").join("config.toml");
        if path.exists() {
            return path;
        }
    }
    PathBuf::from("config.toml")
}
