//! Generation client for the Gemini API
//!
//! This module provides:
//! - A backend trait describing the three remote operations
//! - An HTTP implementation of that trait
//! - The client that validates input, builds prompts, and translates errors

pub mod backend;
pub mod client;
pub mod config;
pub mod data_url;
pub mod gemini;
pub mod prompts;
pub mod tone;

pub use backend::{GenerationBackend, ImageRequest, InlineAudio, SpeechRequest, TextRequest};
pub use client::GenerationClient;
pub use config::GenAiConfig;
pub use gemini::GeminiBackend;
pub use tone::Tone;
