//! Remote API boundary
//!
//! The three logical provider operations. Implementations return raw
//! provider data; validation, prompt building, and error translation live
//! in [`GenerationClient`](super::GenerationClient).

use crate::messages::ChatMessage;
use crate::Result;
use async_trait::async_trait;

/// Text generation over a role/content message sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub model: String,
    pub contents: Vec<ChatMessage>,
    pub system_instruction: Option<String>,
}

/// Image generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub number_of_images: u32,
    pub mime_type: String,
    pub aspect_ratio: String,
}

/// Speech synthesis parameters. The response is restricted to audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub model: String,
    pub text: String,
    pub voice_name: String,
}

/// One inlined audio part of a speech response.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAudio {
    pub mime_type: String,
    /// Base64 text exactly as the provider returned it
    pub data: String,
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns the generated text.
    async fn generate_text(&self, request: TextRequest) -> Result<String>;

    /// Returns the raw bytes of every generated image, in response order.
    async fn generate_images(&self, request: ImageRequest) -> Result<Vec<Vec<u8>>>;

    /// Returns every inlined audio part, in response order.
    async fn generate_speech(&self, request: SpeechRequest) -> Result<Vec<InlineAudio>>;
}
