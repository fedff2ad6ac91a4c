use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::selection::YearBounds;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HAPPINESS_DASH_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

/// Runtime settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Folder holding the three tables, loaded at startup.
    pub data_dir: Option<PathBuf>,
    pub bounds: YearBounds,
    pub ridgeline: RidgelineConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RidgelineConfig {
    pub bandwidth: f64,
    /// Approximate number of grid intervals over `[0, 1]`.
    pub grid_ticks: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub window_years: i32,
    pub step_millis: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: Some(PathBuf::from("data")),
            bounds: YearBounds::default(),
            ridgeline: RidgelineConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

impl Default for RidgelineConfig {
    fn default() -> Self {
        RidgelineConfig {
            bandwidth: 0.12,
            grid_ticks: 80,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            window_years: 2,
            step_millis: 700,
        }
    }
}

impl PlaybackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.step_millis)
    }
}

impl DashboardConfig {
    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: DashboardConfig =
            serde_json::from_str(text).context("parsing dashboard config")?;
        config.bounds = config.bounds.normalized();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// `$HAPPINESS_DASH_CONFIG`, else `./dashboard.json`, else defaults.
    ///
    /// An explicitly named file that fails to load is an error; a broken
    /// default file is logged and ignored.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            log::info!("Loading config from {}", path.display());
            return Self::from_file(&path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            match Self::from_file(default_path) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Ignoring {DEFAULT_CONFIG_FILE}: {e:#}"),
            }
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(DashboardConfig::from_json("{}").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config = DashboardConfig::from_json(
            r#"{ "data_dir": "/srv/happiness", "ridgeline": { "bandwidth": 0.2 },
                 "bounds": { "soft_min": 2024, "soft_max": 2016 } }"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/happiness")));
        assert_eq!(config.ridgeline.bandwidth, 0.2);
        assert_eq!(config.ridgeline.grid_ticks, 80);
        assert_eq!((config.bounds.soft_min, config.bounds.soft_max), (2016, 2024));
        assert_eq!(config.playback.interval(), Duration::from_millis(700));
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(DashboardConfig::from_json("{ \"bounds\": 3 }").is_err());
    }
}
