//! Humanizer controller

use super::{dispatch, worker_stopped_message, InFlight};
use crate::genai::Tone;
use crate::integration::{GenerationCommand, GenerationEvent};
use crossbeam_channel::Sender;
use tracing::debug;

pub struct HumanizerController {
    /// Text to rewrite
    pub input: String,

    /// Tone of the rewrite
    pub tone: Tone,

    in_flight: InFlight,
    output: Option<String>,
    error: Option<String>,
    command_tx: Sender<GenerationCommand>,
}

impl HumanizerController {
    pub fn new(command_tx: Sender<GenerationCommand>) -> Self {
        Self {
            input: String::new(),
            tone: Tone::default(),
            in_flight: InFlight::default(),
            output: None,
            error: None,
            command_tx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    pub fn submit(&mut self) -> bool {
        if self.input.trim().is_empty() {
            return false;
        }
        let Some(request_id) = self.in_flight.begin() else {
            debug!("Humanize request already in flight, ignoring submit");
            return false;
        };

        self.output = None;
        self.error = None;

        let command = GenerationCommand::Humanize {
            request_id,
            text: self.input.clone(),
            tone: self.tone,
        };
        match dispatch(&self.command_tx, &mut self.in_flight, command) {
            Ok(()) => true,
            Err(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    pub fn handle_event(&mut self, event: &GenerationEvent) -> bool {
        match event {
            GenerationEvent::Humanized { request_id, result } => {
                if !self.in_flight.complete(*request_id) {
                    return false;
                }
                match result {
                    Ok(text) => self.output = Some(text.clone()),
                    Err(e) => self.error = Some(e.user_message()),
                }
                true
            }
            GenerationEvent::Shutdown => {
                if self.in_flight.abandon() {
                    self.error = Some(worker_stopped_message());
                }
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MuseError, Operation};
    use crossbeam_channel::unbounded;

    #[test]
    fn test_humanize_with_selected_tone() {
        let (tx, rx) = unbounded();
        let mut humanizer = HumanizerController::new(tx);
        assert_eq!(humanizer.tone, Tone::Friendly);

        humanizer.input = "Leverage synergies.".into();
        humanizer.tone = Tone::Casual;
        assert!(humanizer.submit());

        let request_id = match rx.try_recv().unwrap() {
            GenerationCommand::Humanize {
                request_id,
                text,
                tone,
            } => {
                assert_eq!(text, "Leverage synergies.");
                assert_eq!(tone, Tone::Casual);
                request_id
            }
            other => panic!("expected humanize command, got {:?}", other),
        };

        humanizer.handle_event(&GenerationEvent::Humanized {
            request_id,
            result: Ok("Let's work together.".into()),
        });
        assert_eq!(humanizer.output(), Some("Let's work together."));
        assert!(!humanizer.is_loading());
    }

    #[test]
    fn test_busy_flag_blocks_second_request() {
        let (tx, rx) = unbounded();
        let mut humanizer = HumanizerController::new(tx);
        humanizer.input = "text".into();
        assert!(humanizer.submit());
        assert!(!humanizer.submit());
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_failure_message() {
        let (tx, rx) = unbounded();
        let mut humanizer = HumanizerController::new(tx);
        humanizer.input = "text".into();
        humanizer.submit();
        let id = rx.try_recv().ok().and_then(|c| match c {
            GenerationCommand::Humanize { request_id, .. } => Some(request_id),
            _ => None,
        });

        humanizer.handle_event(&GenerationEvent::Humanized {
            request_id: id.unwrap(),
            result: Err(MuseError::generation(
                Operation::Humanize,
                MuseError::Transport("timeout".into()),
            )),
        });
        assert_eq!(humanizer.error(), Some("Failed to humanize text."));
        assert_eq!(humanizer.output(), None);
    }
}
