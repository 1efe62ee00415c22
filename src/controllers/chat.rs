//! Chat controller
//!
//! Owns the conversation and the speech playback slot. Each model message
//! can be spoken; the message index is its playback slot.

use super::{dispatch, worker_stopped_message, InFlight};
use crate::audio::{decode_base64, decode_pcm16, AudioSink, PlaybackEvent, PlaybackManager};
use crate::integration::{AudioConfig, GenerationCommand, GenerationEvent};
use crate::messages::{ChatMessage, Conversation};
use crate::Result;
use crossbeam_channel::Sender;
use tracing::{debug, warn};
use uuid::Uuid;

/// Greeting shown above the conversation. It is not sent to the model.
pub const WELCOME_MESSAGE: &str = "Hello! How can I help you today?";

/// Playback state of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    /// Speech requested, waiting for audio
    Loading,
    Playing,
}

#[derive(Debug, Clone, Copy)]
struct PendingSpeech {
    request_id: Uuid,
    slot: usize,
}

pub struct ChatController {
    /// Current text input
    pub input: String,

    /// Prefer the faster chat model
    pub use_low_latency: bool,

    conversation: Conversation,
    in_flight: InFlight,
    last_error: Option<String>,
    /// Whether the last failure is worth sending again
    retryable: bool,
    speech: Option<PendingSpeech>,
    playback: PlaybackManager,
    audio: AudioConfig,
    command_tx: Sender<GenerationCommand>,
}

impl ChatController {
    pub fn new(
        command_tx: Sender<GenerationCommand>,
        sink: Box<dyn AudioSink>,
        audio: AudioConfig,
    ) -> Self {
        Self {
            input: String::new(),
            use_low_latency: false,
            conversation: Conversation::new(),
            in_flight: InFlight::default(),
            last_error: None,
            retryable: false,
            speech: None,
            playback: PlaybackManager::new(sink),
            audio,
            command_tx,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    /// Send the current input. Returns whether a request was dispatched.
    pub fn submit(&mut self) -> bool {
        if self.input.trim().is_empty() {
            return false;
        }
        let Some(request_id) = self.in_flight.begin() else {
            debug!("Chat request already in flight, ignoring submit");
            return false;
        };

        let content = std::mem::take(&mut self.input);
        self.conversation.push_user(content);
        self.send_history(request_id)
    }

    /// A failed reply can be requested again when the failure was transient
    /// and the newest message is still unanswered.
    pub fn can_retry(&self) -> bool {
        self.retryable && !self.is_loading() && self.conversation.awaits_reply()
    }

    /// Ask again for a reply to the unanswered history.
    pub fn retry(&mut self) -> bool {
        if !self.can_retry() {
            return false;
        }
        let Some(request_id) = self.in_flight.begin() else {
            return false;
        };
        debug!("Retrying chat with {} messages", self.conversation.len());
        self.send_history(request_id)
    }

    fn send_history(&mut self, request_id: Uuid) -> bool {
        self.last_error = None;
        self.retryable = false;

        let command = GenerationCommand::Chat {
            request_id,
            history: self.conversation.snapshot(),
            use_low_latency: self.use_low_latency,
        };
        match dispatch(&self.command_tx, &mut self.in_flight, command) {
            Ok(()) => true,
            Err(message) => {
                self.last_error = Some(message);
                false
            }
        }
    }

    /// Start speaking the message at `slot`, or stop it if it is already
    /// playing or waiting for audio.
    pub fn toggle_speech(&mut self, slot: usize) {
        if self.playback.playing_slot() == Some(slot) {
            self.playback.stop_all();
            return;
        }
        if matches!(self.speech, Some(pending) if pending.slot == slot) {
            debug!("Speech for message {} cancelled before audio arrived", slot);
            self.speech = None;
            return;
        }

        let Some(message) = self.conversation.get(slot) else {
            return;
        };
        if message.is_user() || message.content.trim().is_empty() {
            return;
        }

        let request_id = Uuid::new_v4();
        let command = GenerationCommand::Speech {
            request_id,
            text: message.content.clone(),
            slot,
        };
        if self.command_tx.send(command).is_err() {
            warn!("Generation worker unavailable, cannot speak message {}", slot);
            return;
        }
        self.speech = Some(PendingSpeech { request_id, slot });
    }

    pub fn slot_state(&self, slot: usize) -> SlotState {
        if self.playback.playing_slot() == Some(slot) {
            SlotState::Playing
        } else if matches!(self.speech, Some(pending) if pending.slot == slot) {
            SlotState::Loading
        } else {
            SlotState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn stop_speech(&mut self) {
        self.speech = None;
        self.playback.stop_all();
    }

    /// Observe finished playbacks. Call once per frame.
    pub fn poll_playback(&mut self) -> Vec<PlaybackEvent> {
        self.playback.poll()
    }

    /// Apply a worker event. Returns whether the event belonged to this
    /// controller.
    pub fn handle_event(&mut self, event: &GenerationEvent) -> bool {
        match event {
            GenerationEvent::ChatReply { request_id, result } => {
                if !self.in_flight.complete(*request_id) {
                    return false;
                }
                match result {
                    Ok(text) => {
                        self.conversation.push_model(text.clone());
                    }
                    Err(e) => {
                        self.last_error = Some(e.user_message());
                        self.retryable = e.is_recoverable();
                    }
                }
                true
            }
            GenerationEvent::SpeechReady {
                request_id,
                slot,
                result,
            } => {
                match self.speech {
                    Some(pending) if pending.request_id == *request_id => {}
                    _ => return false,
                }
                self.speech = None;
                if let Err(e) = self.start_playback(*slot, result) {
                    // Playback failures only reset the slot
                    warn!("Could not play message {}: {}", slot, e.root_cause());
                }
                true
            }
            GenerationEvent::Shutdown => {
                self.speech = None;
                if self.in_flight.abandon() {
                    self.last_error = Some(worker_stopped_message());
                }
                false
            }
            _ => false,
        }
    }

    fn start_playback(&mut self, slot: usize, result: &Result<String>) -> Result<()> {
        let data = result.as_ref().map_err(Clone::clone)?;
        let bytes = decode_base64(data)?;
        let buffer = decode_pcm16(&bytes, self.audio.speech_sample_rate, self.audio.speech_channels)?;
        debug!("Playing {:.1}s of speech for message {}", buffer.duration_secs(), slot);
        self.playback.play(buffer, slot)?;
        Ok(())
    }
}
