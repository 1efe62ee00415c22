//! Model and endpoint configuration for the generation client

use serde::Deserialize;
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the generation client
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// API key sent with every request
    pub api_key: String,

    /// Scheme and host of the API, without a trailing slash
    pub base_url: String,

    /// Chat model used when low latency is requested
    pub fast_chat_model: String,

    /// Chat model used otherwise
    pub quality_chat_model: String,

    /// Image generation model
    pub image_model: String,

    /// Text-to-speech model
    pub speech_model: String,

    /// Model used to rewrite text for the humanizer
    pub humanize_model: String,

    /// Prebuilt voice for speech synthesis
    pub voice_name: String,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            fast_chat_model: "gemini-2.5-flash".to_string(),
            quality_chat_model: "gemini-2.5-pro".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            humanize_model: "gemini-2.5-flash".to_string(),
            voice_name: "Kore".to_string(),
        }
    }
}

impl fmt::Debug for GenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenAiConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("fast_chat_model", &self.fast_chat_model)
            .field("quality_chat_model", &self.quality_chat_model)
            .field("image_model", &self.image_model)
            .field("speech_model", &self.speech_model)
            .field("humanize_model", &self.humanize_model)
            .field("voice_name", &self.voice_name)
            .finish()
    }
}

impl GenAiConfig {
    /// Create a new configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point the client at a different host (used by tests and proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Chat model for the given latency preference.
    pub fn chat_model(&self, use_low_latency: bool) -> &str {
        if use_low_latency {
            &self.fast_chat_model
        } else {
            &self.quality_chat_model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        let config = GenAiConfig::default();
        assert_eq!(config.chat_model(true), "gemini-2.5-flash");
        assert_eq!(config.chat_model(false), "gemini-2.5-pro");
        assert_eq!(config.image_model, "imagen-4.0-generate-001");
        assert_eq!(config.voice_name, "Kore");
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let config = GenAiConfig::new("key").with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", GenAiConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
