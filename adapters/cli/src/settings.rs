use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use laser_tank_session::{Config, DEFAULT_RENDER_INTERVAL};
use serde::Deserialize;

/// User settings read from an optional TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Pause between two rendered frames, in milliseconds.
    pub(crate) render_interval_ms: u64,
    /// Default log filter used when `RUST_LOG` is unset.
    pub(crate) log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_interval_ms: DEFAULT_RENDER_INTERVAL.as_millis() as u64,
            log_level: "warn".to_owned(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings toml")
    }

    /// Session configuration derived from the settings.
    pub(crate) fn session_config(&self) -> Config {
        Config::new(Duration::from_millis(self.render_interval_ms))
    }
}
