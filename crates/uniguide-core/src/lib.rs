pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::UniGuideConfig;
pub use error::{Result, UniGuideError};
pub use provider::{EntityProvider, InMemoryCatalog};
pub use types::*;
