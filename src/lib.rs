pub mod audio;
pub mod controllers;
pub mod genai;
pub mod integration;
pub mod messages;
pub mod ui;

use std::fmt;
use thiserror::Error;

/// The four remote operations of the generation client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Chat,
    Image,
    Speech,
    Humanize,
}

impl Operation {
    /// Fixed message shown to the user when this operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Chat => "Failed to get response from Gemini.",
            Operation::Image => "Failed to generate image.",
            Operation::Speech => "Failed to generate speech.",
            Operation::Humanize => "Failed to humanize text.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Chat => "chat",
            Operation::Image => "image",
            Operation::Speech => "speech",
            Operation::Humanize => "humanize",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone)]
pub enum MuseError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    /// Coarse failure of a generation operation. Displays only the fixed
    /// user-facing message; the cause is kept for diagnostics.
    #[error("{}", .operation.failure_message())]
    Generation {
        operation: Operation,
        #[source]
        cause: Box<MuseError>,
    },
}

impl From<std::io::Error> for MuseError {
    fn from(e: std::io::Error) -> Self {
        MuseError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for MuseError {
    fn from(e: reqwest::Error) -> Self {
        MuseError::Transport(e.to_string())
    }
}

impl MuseError {
    /// Wrap an internal failure into the coarse error for `operation`.
    pub fn generation(operation: Operation, cause: MuseError) -> Self {
        MuseError::Generation {
            operation,
            cause: Box::new(cause),
        }
    }

    /// The operation this error belongs to, if it is a generation failure.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            MuseError::Generation { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// The innermost diagnostic cause.
    pub fn root_cause(&self) -> &MuseError {
        match self {
            MuseError::Generation { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MuseError::Validation(_) => true,
            // Network hiccups and provider errors are usually transient
            MuseError::Transport(_) => true,
            MuseError::MalformedResponse(_) => true,
            MuseError::Decode(_) => true,
            // Hardware/device errors may require user intervention
            MuseError::AudioDevice(_) => false,
            MuseError::AudioProcessing(_) => true,
            MuseError::Config(_) => false,
            MuseError::Channel(_) => false,
            MuseError::Generation { cause, .. } => cause.is_recoverable(),
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            MuseError::Validation(_) => "Please enter some text first.".to_string(),
            MuseError::Transport(_) => {
                "Could not reach the generation service. Please try again.".to_string()
            }
            MuseError::MalformedResponse(_) => {
                "The generation service returned an unexpected response.".to_string()
            }
            MuseError::Decode(_) => "Received audio could not be decoded.".to_string(),
            MuseError::AudioDevice(_) => {
                "Audio device error. Please check your speakers.".to_string()
            }
            MuseError::AudioProcessing(_) => "Audio processing failed.".to_string(),
            MuseError::Config(_) => "Configuration error. Please check settings.".to_string(),
            MuseError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            MuseError::Generation { operation, .. } => operation.failure_message().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MuseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_displays_fixed_message() {
        let err = MuseError::generation(
            Operation::Humanize,
            MuseError::Transport("503 Service Unavailable: overloaded".into()),
        );
        assert_eq!(err.to_string(), "Failed to humanize text.");
        assert_eq!(err.user_message(), "Failed to humanize text.");
        assert_eq!(err.operation(), Some(Operation::Humanize));
    }

    #[test]
    fn test_root_cause_keeps_detail() {
        let err = MuseError::generation(
            Operation::Speech,
            MuseError::MalformedResponse("no audio data".into()),
        );
        assert!(matches!(
            err.root_cause(),
            MuseError::MalformedResponse(msg) if msg == "no audio data"
        ));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Malformed response: no audio data"));
    }

    #[test]
    fn test_recoverability() {
        assert!(MuseError::Transport("timeout".into()).is_recoverable());
        assert!(!MuseError::AudioDevice("none".into()).is_recoverable());
        assert!(!MuseError::generation(Operation::Chat, MuseError::Config("x".into()))
            .is_recoverable());
    }
}
