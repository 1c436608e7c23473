//! Settings for CallScope.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file at all) is a valid configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of most recent expansion levels kept on screen.
    pub visible_parents: usize,
    pub engine: EngineSettings,
    pub artifacts: ArtifactSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Graphviz executable.
    pub program: String,
    /// Layout algorithm passed as `-K`.
    pub layout: String,
    /// Output format passed as `-T`.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    pub enabled: bool,
    pub dir: PathBuf,
    pub debug_file: String,
    pub error_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            visible_parents: 3,
            engine: EngineSettings::default(),
            artifacts: ArtifactSettings::default(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: "dot".to_string(),
            layout: "dot".to_string(),
            format: "svg".to_string(),
        }
    }
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("."),
            debug_file: "debug_dot.txt".to_string(),
            error_file: "error_dot.txt".to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(text)?;
        settings.visible_parents = settings.visible_parents.max(1);
        Ok(settings)
    }
}
