//! Application configuration
//!
//! Combines the generation client settings with audio settings. Values come
//! from defaults, an optional TOML file, and environment overrides, in that
//! order.

use crate::audio::{SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};
use crate::genai::GenAiConfig;
use crate::{MuseError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variables checked for the API key, first match wins
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Environment variable overriding the API host
pub const BASE_URL_VAR: &str = "MUSE_BASE_URL";

/// Audio settings for speech playback
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of the raw PCM returned by the speech model
    pub speech_sample_rate: u32,

    /// Channel count of the raw PCM returned by the speech model
    pub speech_channels: u16,

    /// Whether to open an output device at all
    pub enable_output: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            speech_sample_rate: SPEECH_SAMPLE_RATE,
            speech_channels: SPEECH_CHANNELS,
            enable_output: true,
        }
    }
}

/// Configuration for the complete application
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub genai: GenAiConfig,
    pub audio: AudioConfig,
}

impl StudioConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("muse").join("config.toml"))
    }

    /// Load from the default path (if present) and the environment
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MuseError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&text)
            .map_err(|e| MuseError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MuseError::Config(format!("Invalid config: {}", e)))
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            debug!("API key taken from environment");
            self.genai.api_key = key.trim().to_string();
        }

        if let Some(url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.genai = self.genai.clone().with_base_url(url.trim());
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.genai.api_key.trim().is_empty() {
            return Err(MuseError::Config(format!(
                "No API key configured. Set {} or add it to the config file",
                API_KEY_VARS[0]
            )));
        }
        if self.genai.base_url.trim().is_empty() {
            return Err(MuseError::Config("base_url must not be empty".into()));
        }
        if self.audio.speech_sample_rate == 0 || self.audio.speech_channels == 0 {
            return Err(MuseError::Config(
                "speech sample rate and channel count must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.audio.speech_sample_rate, 24000);
        assert_eq!(config.audio.speech_channels, 1);
        assert!(config.audio.enable_output);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = StudioConfig::default();
        config.apply_env(env(&[
            ("API_KEY", "fallback"),
            ("GEMINI_API_KEY", "primary"),
            ("MUSE_BASE_URL", "http://localhost:8080/"),
        ]));
        assert_eq!(config.genai.api_key, "primary");
        assert_eq!(config.genai.base_url, "http://localhost:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = StudioConfig::from_toml(
            r#"
            [genai]
            api_key = "abc"
            voice_name = "Puck"

            [audio]
            enable_output = false
            "#,
        )
        .unwrap();

        assert_eq!(config.genai.voice_name, "Puck");
        assert_eq!(config.genai.quality_chat_model, "gemini-2.5-pro");
        assert!(!config.audio.enable_output);
        assert_eq!(config.audio.speech_sample_rate, 24000);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[genai]\napi_key = \"from-file\"\n").unwrap();
        assert_eq!(StudioConfig::from_file(&path).unwrap().genai.api_key, "from-file");

        std::fs::write(&path, "[genai\n").unwrap();
        assert!(matches!(StudioConfig::from_file(&path), Err(MuseError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_rate() {
        let mut config = StudioConfig::default();
        config.genai = GenAiConfig::new("key");
        assert!(config.validate().is_ok());

        config.audio.speech_sample_rate = 0;
        assert!(matches!(config.validate(), Err(MuseError::Config(_))));
    }
}
