use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::audio::DEFAULT_VOLUME;
use crate::error::{GameError, GameResult};

pub const COUNTDOWN_INTERVAL: Duration = Duration::from_millis(1000);

/// Persisted settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub relocation_interval_ms: u64,
    pub session_secs: u32,
    pub lives: u32,
    pub volume: f32,
    pub muted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relocation_interval_ms: 1000,
            session_secs: 60,
            lives: 3,
            volume: DEFAULT_VOLUME,
            muted: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> GameResult<()> {
        if self.relocation_interval_ms == 0 {
            return Err(GameError::InvalidConfig(
                "relocation interval must be positive".into(),
            ));
        }
        if self.session_secs == 0 {
            return Err(GameError::InvalidConfig(
                "session length must be positive".into(),
            ));
        }
        if i32::try_from(self.session_secs).is_err() {
            return Err(GameError::InvalidConfig(format!(
                "session length {} too large",
                self.session_secs
            )));
        }
        if self.lives == 0 {
            return Err(GameError::InvalidConfig("lives must be positive".into()));
        }
        if i32::try_from(self.lives).is_err() {
            return Err(GameError::InvalidConfig(format!(
                "lives {} too large",
                self.lives
            )));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(GameError::InvalidConfig(format!(
                "volume {} outside 0.0..=1.0",
                self.volume
            )));
        }
        Ok(())
    }

    /// Counters saturate at `i32::MAX`, which `validate` already rejects
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            relocation_interval: Duration::from_millis(self.relocation_interval_ms),
            countdown_interval: COUNTDOWN_INTERVAL,
            session_secs: i32::try_from(self.session_secs).unwrap_or(i32::MAX),
            lives: i32::try_from(self.lives).unwrap_or(i32::MAX),
            volume: if self.muted { 0.0 } else { self.volume },
        }
    }
}

/// Fixed parameters of one round
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub relocation_interval: Duration,
    pub countdown_interval: Duration,
    pub session_secs: i32,
    pub lives: i32,
    pub volume: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Config::default().session_config()
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> GameResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("whackr_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> GameResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
