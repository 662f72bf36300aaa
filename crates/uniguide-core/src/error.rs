use thiserror::Error;

/// Top-level error type for UniGuide.
///
/// Subsystem crates define their own error types and implement
/// `From<UniGuideError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UniGuideError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Data provider error: {0}")]
    Provider(String),

    #[error("Data provider timed out after {0} ms")]
    ProviderTimeout(u64),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

impl From<toml::de::Error> for UniGuideError {
    fn from(err: toml::de::Error) -> Self {
        UniGuideError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for UniGuideError {
    fn from(err: toml::ser::Error) -> Self {
        UniGuideError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for UniGuideError {
    fn from(err: serde_json::Error) -> Self {
        UniGuideError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for UniGuide operations.
pub type Result<T> = std::result::Result<T, UniGuideError>;
