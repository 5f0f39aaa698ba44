//! Application configuration
//!
//! Stored as JSON at `<config dir>/sublayer/config.json`. Missing files
//! and missing fields fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::ExportFormat;
use crate::error::{Result, SublayerError};
use crate::speech::COQUI_DEFAULT_MODEL;

/// Which speech engine to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthEngine {
    #[default]
    Espeak,
    Coqui,
    Tone,
    Command,
}

impl std::str::FromStr for SynthEngine {
    type Err = SublayerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            "coqui" | "tts" => Ok(Self::Coqui),
            "tone" => Ok(Self::Tone),
            "command" => Ok(Self::Command),
            other => Err(SublayerError::Config {
                reason: format!("unknown speech engine '{}'", other),
            }),
        }
    }
}

/// Program and argument template for a custom speech engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    /// `{text}` and `{output}` are substituted per call
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub engine: SynthEngine,
    /// espeak-ng voice, e.g. "en-us"
    pub voice: Option<String>,
    pub coqui_model: String,
    pub command: Option<CommandTemplate>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            engine: SynthEngine::default(),
            voice: None,
            coqui_model: COQUI_DEFAULT_MODEL.to_string(),
            command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub bit_depth: u16,
    /// Resample on export; `None` keeps the speech engine's rate
    pub sample_rate: Option<u32>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let format = ExportFormat::default();
        Self {
            bit_depth: format.bit_depth,
            sample_rate: format.sample_rate,
        }
    }
}

impl ExportConfig {
    pub fn format(&self) -> ExportFormat {
        ExportFormat::new(self.sample_rate, self.bit_depth)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub synth: SynthConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load from `path`, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text).map_err(|e| SublayerError::Config {
            reason: format!("{}: {}", path.display(), e),
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// `<config dir>/sublayer/config.json`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sublayer").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.synth.engine, SynthEngine::Espeak);
        assert_eq!(config.export.bit_depth, 16);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "synth": { "engine": "coqui" } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.synth.engine, SynthEngine::Coqui);
        assert_eq!(config.synth.coqui_model, COQUI_DEFAULT_MODEL);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.synth.engine = SynthEngine::Command;
        config.synth.command = Some(CommandTemplate {
            program: "piper".to_string(),
            args: vec!["--output_file".to_string(), "{output}".to_string()],
        });
        config.export.bit_depth = 24;
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(SublayerError::Config { .. })
        ));
    }

    #[test]
    fn test_engine_from_str() {
        assert_eq!("espeak-ng".parse::<SynthEngine>().unwrap(), SynthEngine::Espeak);
        assert_eq!("TONE".parse::<SynthEngine>().unwrap(), SynthEngine::Tone);
        assert!("festival".parse::<SynthEngine>().is_err());
    }
}
