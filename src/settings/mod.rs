use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::element::Jdspfx;
use crate::engine::{Command, RecordingEngine};
use crate::params::{ParameterStore, PropertyValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rate for [`engine_commands`](Self::engine_commands) when the caller gives none.
    pub sample_rate: u32,
    /// Frames per buffer handed to the stream processor.
    pub block_frames: usize,
    /// Property name to value, applied in name order.
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_frames: 1024,
            properties: BTreeMap::new(),
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sample Rate: {}", self.sample_rate)?;
        writeln!(f, "Block Frames: {}", self.block_frames)?;
        writeln!(f, "Properties:")?;
        for (name, value) in &self.properties {
            writeln!(f, "  {name} = {value}")?;
        }
        Ok(())
    }
}

impl Settings {
    /// Load from the user config directory, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::get_settings_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            info!("No settings file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Self =
            serde_json::from_str(&contents).context("Failed to parse settings")?;
        debug!("Loaded settings from {path:?}");
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).context("Failed to write settings file")?;

        debug!("Saved settings to {path:?}");
        Ok(())
    }

    /// Capture every control of `params` as a property map.
    pub fn from_parameters(params: &ParameterStore) -> Self {
        let properties = params
            .iter()
            .map(|(id, value)| (id.name().to_string(), PropertyValue::from(value)))
            .collect();
        Self {
            properties,
            ..Self::default()
        }
    }

    /// Parse a `name=value` override as given on the command line.
    pub fn parse_override(arg: &str) -> Result<(String, PropertyValue)> {
        let (name, value) = arg
            .split_once('=')
            .with_context(|| format!("expected name=value, got '{arg}'"))?;
        let value = match value {
            "true" => PropertyValue::Bool(true),
            "false" => PropertyValue::Bool(false),
            v => v
                .parse::<i32>()
                .map_or_else(|_| PropertyValue::Str(v.to_string()), PropertyValue::Int),
        };
        Ok((name.trim().to_string(), value))
    }

    /// Apply every property. Rejected ones are logged and skipped so one bad
    /// entry cannot take the rest down; returns how many were rejected.
    pub fn apply(&self, fx: &Jdspfx) -> usize {
        let mut rejected = 0;
        for (name, value) in &self.properties {
            if let Err(e) = fx.set_property(name, value.clone()) {
                warn!("Skipping setting '{name}': {e}");
                rejected += 1;
            }
        }
        rejected
    }

    /// Commands an engine receives when an element carrying these settings is
    /// configured at `sample_rate`, or at [`Settings::sample_rate`] when `None`.
    pub fn engine_commands(&self, sample_rate: Option<u32>) -> Result<Vec<Command>> {
        let rate = sample_rate.unwrap_or(self.sample_rate);
        let (engine, rx) = RecordingEngine::new();
        let fx = Jdspfx::new(engine);

        let rejected = self.apply(&fx);
        if rejected > 0 {
            warn!("{rejected} setting(s) rejected, previous values kept");
        }
        fx.configure(i32::try_from(rate).context("sample rate out of range")?)?;

        Ok(rx.try_iter().collect())
    }

    fn get_settings_path() -> PathBuf {
        const SETTINGS_FILENAME: &str = "settings.json";

        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir)
                .join("jdspfx")
                .join(SETTINGS_FILENAME)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("jdspfx")
                .join(SETTINGS_FILENAME)
        } else {
            PathBuf::from(".").join(SETTINGS_FILENAME)
        }
    }
}
