//! Generation client
//!
//! Validates caller input, builds the provider request for each of the four
//! operations, dispatches it exactly once, and collapses any failure into
//! the operation's coarse [`MuseError::Generation`]. The detailed cause is
//! logged here and never shown to the user.

use super::backend::{GenerationBackend, ImageRequest, SpeechRequest, TextRequest};
use super::config::GenAiConfig;
use super::data_url;
use super::prompts::{build_humanize_prompt, build_speech_prompt, HUMANIZER_SYSTEM_INSTRUCTION};
use super::tone::Tone;
use crate::messages::{ChatMessage, Role};
use crate::{MuseError, Operation, Result};
use std::sync::Arc;
use tracing::{debug, error};

/// Output format requested from the image model
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Aspect ratio requested from the image model
pub const IMAGE_ASPECT_RATIO: &str = "1:1";

#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    config: GenAiConfig,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: GenAiConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    /// Continue a conversation. `history` must end with the newest user message.
    ///
    /// `use_low_latency` only selects the model; a failure on that model is
    /// final.
    pub async fn complete_chat(&self, history: &[ChatMessage], use_low_latency: bool) -> Result<String> {
        match history.last() {
            None => return Err(MuseError::Validation("chat history is empty".into())),
            Some(last) if last.role != Role::User => {
                return Err(MuseError::Validation(
                    "chat history must end with a user message".into(),
                ))
            }
            Some(last) if last.content.trim().is_empty() => {
                return Err(MuseError::Validation("user message is empty".into()))
            }
            Some(_) => {}
        }

        let model = self.config.chat_model(use_low_latency).to_string();
        debug!("Dispatching chat to {} ({} messages)", model, history.len());

        let request = TextRequest {
            model,
            contents: history.to_vec(),
            system_instruction: None,
        };
        self.backend
            .generate_text(request)
            .await
            .map_err(|e| translate(Operation::Chat, e))
    }

    /// Generate one square JPEG for `prompt`, returned as a data URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        require_text(prompt, "image prompt")?;

        let request = ImageRequest {
            model: self.config.image_model.clone(),
            prompt: prompt.to_string(),
            number_of_images: 1,
            mime_type: IMAGE_MIME_TYPE.to_string(),
            aspect_ratio: IMAGE_ASPECT_RATIO.to_string(),
        };
        debug!("Dispatching image generation to {}", request.model);

        let images = self
            .backend
            .generate_images(request)
            .await
            .map_err(|e| translate(Operation::Image, e))?;

        let bytes = images.into_iter().next().ok_or_else(|| {
            translate(
                Operation::Image,
                MuseError::MalformedResponse("no image data".into()),
            )
        })?;

        Ok(data_url::encode(IMAGE_MIME_TYPE, &bytes))
    }

    /// Synthesize `text` and return the first audio payload as base64.
    pub async fn synthesize_speech(&self, text: &str) -> Result<String> {
        require_text(text, "speech text")?;

        let request = SpeechRequest {
            model: self.config.speech_model.clone(),
            text: build_speech_prompt(text),
            voice_name: self.config.voice_name.clone(),
        };
        debug!("Dispatching speech to {}", request.model);

        let parts = self
            .backend
            .generate_speech(request)
            .await
            .map_err(|e| translate(Operation::Speech, e))?;

        parts
            .into_iter()
            .next()
            .map(|part| part.data)
            .filter(|data| !data.is_empty())
            .ok_or_else(|| {
                translate(
                    Operation::Speech,
                    MuseError::MalformedResponse("no audio data".into()),
                )
            })
    }

    /// Rewrite `text` in `tone` so it reads as human-authored prose.
    pub async fn humanize_text(&self, text: &str, tone: Tone) -> Result<String> {
        require_text(text, "text to humanize")?;

        let request = TextRequest {
            model: self.config.humanize_model.clone(),
            contents: vec![ChatMessage::user(build_humanize_prompt(text, tone))],
            system_instruction: Some(HUMANIZER_SYSTEM_INSTRUCTION.to_string()),
        };
        debug!("Dispatching humanize ({}) to {}", tone, request.model);

        self.backend
            .generate_text(request)
            .await
            .map_err(|e| translate(Operation::Humanize, e))
    }
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MuseError::Validation(format!("{} is empty", what)));
    }
    Ok(())
}

fn translate(operation: Operation, cause: MuseError) -> MuseError {
    error!("{} request failed: {}", operation, cause);
    MuseError::generation(operation, cause)
}
