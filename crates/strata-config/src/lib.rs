//! Configuration system for the strata world generator.
//!
//! Holds the canonical [`GenerationConfig`] record, the legacy and current
//! settings layouts and the bridge that merges them, RON persistence, and
//! CLI overrides via clap.

mod bridge;
mod cli;
mod config;
mod error;
mod generation;

pub use bridge::{LegacySettings, WorldSettings, reconcile};
pub use cli::CliArgs;
pub use config::{CONFIG_FILE_NAME, Config, DebugConfig, RuntimeConfig};
pub use error::ConfigError;
pub use generation::{BiomeSpec, CountRange, GenerationConfig, RandomizationMode, WorldBounds};
