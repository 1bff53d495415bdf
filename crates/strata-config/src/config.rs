//! Top-level settings file with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bridge::{LegacySettings, WorldSettings, reconcile};
use crate::error::ConfigError;
use crate::generation::GenerationConfig;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "strata.ron";

/// Everything stored in `strata.ron`.
///
/// Generation parameters may come from the current `world` section, from an
/// older `legacy` section, or both; [`Config::generation_config`] reconciles
/// them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Current-format generation settings.
    pub world: Option<WorldSettings>,
    /// Legacy-format generation settings.
    pub legacy: Option<LegacySettings>,
    /// Execution settings that never affect generated content.
    pub runtime: RuntimeConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Execution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker threads for pooled stages (0 = one per CPU).
    pub worker_threads: usize,
    /// Run every stage inline on the calling thread.
    pub sequential: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// The canonical generation record for this file.
    pub fn generation_config(&self) -> GenerationConfig {
        reconcile(
            GenerationConfig::default(),
            self.legacy.as_ref(),
            self.world.as_ref(),
        )
    }

    /// Mutable access to the current-format section, creating it if absent.
    pub fn world_mut(&mut self) -> &mut WorldSettings {
        self.world.get_or_insert_with(WorldSettings::default)
    }

    /// Platform default config directory (`<config_dir>/strata`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("strata"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `strata.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: returns `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
