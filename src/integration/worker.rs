//! Background worker for generation requests
//!
//! The UI thread never awaits. Controllers send a [`GenerationCommand`] and
//! later receive exactly one [`GenerationEvent`] carrying the same request
//! id, whether the call succeeded or failed.

use crate::genai::{GenerationClient, Tone};
use crate::messages::ChatMessage;
use crate::{MuseError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Requests that can be sent to the worker
#[derive(Debug, Clone)]
pub enum GenerationCommand {
    /// Continue a conversation
    Chat {
        request_id: Uuid,
        /// Snapshot of the conversation, ending with the newest user message
        history: Vec<ChatMessage>,
        use_low_latency: bool,
    },

    /// Generate one image
    Image { request_id: Uuid, prompt: String },

    /// Synthesize speech for the message at `slot`
    Speech {
        request_id: Uuid,
        text: String,
        slot: usize,
    },

    /// Rewrite text in the given tone
    Humanize {
        request_id: Uuid,
        text: String,
        tone: Tone,
    },

    /// Stop the worker
    Shutdown,
}

/// Results emitted by the worker
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    ChatReply {
        request_id: Uuid,
        result: Result<String>,
    },

    /// Result is a data URL
    ImageReady {
        request_id: Uuid,
        result: Result<String>,
    },

    /// Result is base64 PCM
    SpeechReady {
        request_id: Uuid,
        slot: usize,
        result: Result<String>,
    },

    Humanized {
        request_id: Uuid,
        result: Result<String>,
    },

    /// Worker has shut down
    Shutdown,
}

impl GenerationEvent {
    pub fn request_id(&self) -> Option<Uuid> {
        match self {
            GenerationEvent::ChatReply { request_id, .. }
            | GenerationEvent::ImageReady { request_id, .. }
            | GenerationEvent::SpeechReady { request_id, .. }
            | GenerationEvent::Humanized { request_id, .. } => Some(*request_id),
            GenerationEvent::Shutdown => None,
        }
    }
}

/// Generation worker with channel-based communication
pub struct GenerationWorker {
    client: GenerationClient,
    command_tx: Sender<GenerationCommand>,
    command_rx: Receiver<GenerationCommand>,
    event_tx: Sender<GenerationEvent>,
    event_rx: Receiver<GenerationEvent>,
}

impl GenerationWorker {
    pub fn new(client: GenerationClient) -> Self {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        Self {
            client,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<GenerationCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<GenerationEvent> {
        self.event_rx.clone()
    }

    /// Start the worker thread
    ///
    /// Each command runs as its own task, so a slow image request does not
    /// hold up an unrelated chat reply.
    pub fn start_worker(self) -> Result<JoinHandle<()>> {
        let client = self.client;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;

        thread::Builder::new()
            .name("generation-worker".into())
            .spawn(move || {
                info!("Generation worker starting");

                let runtime = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("Failed to create tokio runtime: {}", e);
                        fail_pending(&command_rx, &event_tx, &e.to_string());
                        return;
                    }
                };

                loop {
                    match command_rx.recv() {
                        Ok(GenerationCommand::Shutdown) => {
                            info!("Generation worker shutting down");
                            break;
                        }
                        Ok(command) => {
                            let client = client.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let event = execute(&client, command).await;
                                if event_tx.send(event).is_err() {
                                    debug!("Event receiver dropped, discarding result");
                                }
                            });
                        }
                        Err(_) => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }

                drop(runtime);
                let _ = event_tx.send(GenerationEvent::Shutdown);
                info!("Generation worker stopped");
            })
            .map_err(|e| MuseError::Channel(format!("Failed to spawn generation worker: {}", e)))
    }
}

/// Run one command against the client and wrap the outcome as an event.
pub async fn execute(client: &GenerationClient, command: GenerationCommand) -> GenerationEvent {
    match command {
        GenerationCommand::Chat {
            request_id,
            history,
            use_low_latency,
        } => GenerationEvent::ChatReply {
            request_id,
            result: client.complete_chat(&history, use_low_latency).await,
        },
        GenerationCommand::Image { request_id, prompt } => GenerationEvent::ImageReady {
            request_id,
            result: client.generate_image(&prompt).await,
        },
        GenerationCommand::Speech {
            request_id,
            text,
            slot,
        } => GenerationEvent::SpeechReady {
            request_id,
            slot,
            result: client.synthesize_speech(&text).await,
        },
        GenerationCommand::Humanize {
            request_id,
            text,
            tone,
        } => GenerationEvent::Humanized {
            request_id,
            result: client.humanize_text(&text, tone).await,
        },
        GenerationCommand::Shutdown => GenerationEvent::Shutdown,
    }
}

/// Answer every queued command with an error so no controller stays busy.
fn fail_pending(
    command_rx: &Receiver<GenerationCommand>,
    event_tx: &Sender<GenerationEvent>,
    reason: &str,
) {
    while let Ok(command) = command_rx.try_recv() {
        let cause = MuseError::Channel(reason.to_string());
        let event = match command {
            GenerationCommand::Chat { request_id, .. } => GenerationEvent::ChatReply {
                request_id,
                result: Err(MuseError::generation(crate::Operation::Chat, cause)),
            },
            GenerationCommand::Image { request_id, .. } => GenerationEvent::ImageReady {
                request_id,
                result: Err(MuseError::generation(crate::Operation::Image, cause)),
            },
            GenerationCommand::Speech {
                request_id, slot, ..
            } => GenerationEvent::SpeechReady {
                request_id,
                slot,
                result: Err(MuseError::generation(crate::Operation::Speech, cause)),
            },
            GenerationCommand::Humanize { request_id, .. } => GenerationEvent::Humanized {
                request_id,
                result: Err(MuseError::generation(crate::Operation::Humanize, cause)),
            },
            GenerationCommand::Shutdown => continue,
        };
        let _ = event_tx.send(event);
    }
    let _ = event_tx.send(GenerationEvent::Shutdown);
}
