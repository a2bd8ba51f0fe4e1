/// Console configuration
use crate::error::{ConsoleError, Result};
use nada_playback::{FileStore, PlaybackConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "nada.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Length of every simulated track
    #[serde(default = "default_duration_secs")]
    pub default_duration_secs: f64,

    /// Clock step used when advancing time
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Refuse playback until the first command is typed
    #[serde(default)]
    pub block_autoplay: bool,
}

impl SimulationSettings {
    pub fn tick_secs(&self) -> f64 {
        self.tick_ms as f64 / 1000.0
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            storage: default_storage(),
            simulation: default_simulation(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `nada.toml` is read when
    /// present. `NADA_`-prefixed variables override the file, with `__`
    /// between section and key (`NADA_PLAYBACK__INITIAL_VOLUME=0.5`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("NADA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let volume = self.playback.initial_volume;
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(ConsoleError::Config(format!(
                "playback.initial_volume must be between 0 and 1, got {}",
                volume
            )));
        }

        FileStore::new(&self.storage.data_dir)
            .path_for(&self.playback.storage_key)
            .map_err(|e| ConsoleError::Config(format!("playback.storage_key: {}", e)))?;

        let duration = self.simulation.default_duration_secs;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ConsoleError::Config(format!(
                "simulation.default_duration_secs must be positive, got {}",
                duration
            )));
        }

        if self.simulation.tick_ms == 0 {
            return Err(ConsoleError::Config(
                "simulation.tick_ms must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        data_dir: default_data_dir(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_simulation() -> SimulationSettings {
    SimulationSettings {
        default_duration_secs: default_duration_secs(),
        tick_ms: default_tick_ms(),
        block_autoplay: false,
    }
}

fn default_duration_secs() -> f64 {
    180.0
}

fn default_tick_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConsoleConfig::default();
        config.validate().unwrap();
        assert_eq!(config.playback.storage_key, "music_queue");
        assert_eq!(config.simulation.tick_secs(), 1.0);
    }

    #[test]
    fn rejects_bad_volume() {
        let mut config = ConsoleConfig::default();
        config.playback.initial_volume = 1.5;
        assert!(matches!(config.validate(), Err(ConsoleError::Config(_))));
    }

    #[test]
    fn rejects_path_like_storage_key() {
        let mut config = ConsoleConfig::default();
        config.playback.storage_key = "../queue".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_tick() {
        let mut config = ConsoleConfig::default();
        config.simulation.tick_ms = 0;
        assert!(config.validate().is_err());
    }
}
