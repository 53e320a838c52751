use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest accepted tick or hold-repeat interval.
pub const MAX_INTERVAL_MS: i64 = 60_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub fonts_dir: Option<PathBuf>,
    pub tick_interval_ms: i64,
    pub hold_repeat_ms: i64,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("pomodoro"),
            fonts_dir: None,
            tick_interval_ms: 1000,
            hold_repeat_ms: 120,
            window_width: 540.0,
            window_height: 720.0,
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pomodoro")
    }

    /// Loads the user config, falling back to defaults when the file is
    /// missing or unreadable. A missing file is created with the defaults.
    pub fn load() -> Self {
        let config_path = Self::config_dir().join("config.json");
        if !config_path.exists() {
            let config = Self::default();
            if let Err(e) = config.save() {
                warn!("Could not write default config: {}", e);
            }
            return config;
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config at {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let config_str = std::fs::read_to_string(config_path)?;
            let config: Self = serde_json::from_str(&config_str)?;
            info!("Loaded config from {}", config_path.display());
            Ok(config.sanitized())
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_dir())
    }

    pub fn save_to(&self, config_dir: &Path) -> Result<()> {
        crate::utils::ensure_directory(config_dir)?;

        let config_path = config_dir.join("config.json");
        let config_str = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, config_str)?;

        Ok(())
    }

    fn sanitized(mut self) -> Self {
        if self.tick_interval_ms <= 0 {
            warn!("tick_interval_ms must be positive, using 1000");
            self.tick_interval_ms = 1000;
        }
        if self.hold_repeat_ms <= 0 {
            warn!("hold_repeat_ms must be positive, using 120");
            self.hold_repeat_ms = 120;
        }
        if self.tick_interval_ms > MAX_INTERVAL_MS {
            warn!("tick_interval_ms too large, using {}", MAX_INTERVAL_MS);
            self.tick_interval_ms = MAX_INTERVAL_MS;
        }
        if self.hold_repeat_ms > MAX_INTERVAL_MS {
            warn!("hold_repeat_ms too large, using {}", MAX_INTERVAL_MS);
            self.hold_repeat_ms = MAX_INTERVAL_MS;
        }
        self
    }
}
