//! Image generation controller

use super::{dispatch, worker_stopped_message, InFlight};
use crate::integration::{GenerationCommand, GenerationEvent};
use crossbeam_channel::Sender;
use tracing::debug;

pub struct ImageController {
    /// Prompt being edited
    pub prompt: String,

    in_flight: InFlight,
    image_url: Option<String>,
    error: Option<String>,
    command_tx: Sender<GenerationCommand>,
}

impl ImageController {
    pub fn new(command_tx: Sender<GenerationCommand>) -> Self {
        Self {
            prompt: String::new(),
            in_flight: InFlight::default(),
            image_url: None,
            error: None,
            command_tx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Data URL of the last generated image
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.prompt.trim().is_empty()
    }

    /// Request an image for the current prompt. The prompt is kept so it
    /// can be tweaked and resubmitted.
    pub fn submit(&mut self) -> bool {
        if self.prompt.trim().is_empty() {
            return false;
        }
        let Some(request_id) = self.in_flight.begin() else {
            debug!("Image request already in flight, ignoring submit");
            return false;
        };

        self.image_url = None;
        self.error = None;

        let command = GenerationCommand::Image {
            request_id,
            prompt: self.prompt.clone(),
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
            GenerationEvent::ImageReady { request_id, result } => {
                if !self.in_flight.complete(*request_id) {
                    return false;
                }
                match result {
                    Ok(url) => self.image_url = Some(url.clone()),
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
    use crossbeam_channel::{unbounded, Receiver};
    use uuid::Uuid;

    fn take_image(rx: &Receiver<GenerationCommand>) -> (Uuid, String) {
        match rx.try_recv().unwrap() {
            GenerationCommand::Image { request_id, prompt } => (request_id, prompt),
            other => panic!("expected image command, got {:?}", other),
        }
    }

    #[test]
    fn test_image_success() {
        let (tx, rx) = unbounded();
        let mut image = ImageController::new(tx);
        image.prompt = "a red fox".into();

        assert!(image.submit());
        assert!(image.is_loading());
        assert!(!image.submit());
        assert_eq!(rx.len(), 1);

        let (request_id, prompt) = take_image(&rx);
        assert_eq!(prompt, "a red fox");

        image.handle_event(&GenerationEvent::ImageReady {
            request_id,
            result: Ok("data:image/jpeg;base64,AAAA".into()),
        });
        assert!(!image.is_loading());
        assert_eq!(image.image_url(), Some("data:image/jpeg;base64,AAAA"));
        assert_eq!(image.prompt, "a red fox");
    }

    #[test]
    fn test_resubmit_clears_previous_result() {
        let (tx, rx) = unbounded();
        let mut image = ImageController::new(tx);
        image.prompt = "fox".into();
        image.submit();
        let (request_id, _) = take_image(&rx);
        image.handle_event(&GenerationEvent::ImageReady {
            request_id,
            result: Err(MuseError::generation(
                Operation::Image,
                MuseError::MalformedResponse("no image data".into()),
            )),
        });
        assert_eq!(image.error(), Some("Failed to generate image."));
        assert_eq!(image.image_url(), None);

        assert!(image.submit());
        assert_eq!(image.error(), None);
    }

    #[test]
    fn test_blank_prompt_dispatches_nothing() {
        let (tx, rx) = unbounded();
        let mut image = ImageController::new(tx);
        image.prompt = "  ".into();
        assert!(!image.submit());
        assert!(rx.is_empty());
    }
}
