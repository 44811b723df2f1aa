//! Configuration Layer

pub mod loader;

pub use loader::{Config, ConfigError, DEFAULT_CONFIG_FILE};
