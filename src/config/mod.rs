//! Configuration management
//!
//! Settings are resolved once at startup from, lowest to highest priority:
//! 1. `default.toml`
//! 2. `{environment}.toml`
//! 3. `local.toml` (not committed)
//! 4. `NOTIFY_*` environment variables
//!
//! CLI flags are merged on top by [`crate::cli::ConfigurationMerger`].

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{CorsConfig, Settings, SmtpConfig, TeamsConfig};
