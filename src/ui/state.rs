//! Application state
//!
//! Holds the three controllers and routes worker events to them.

use crate::audio::{AudioSink, PlaybackEvent};
use crate::controllers::{ChatController, HumanizerController, ImageController};
use crate::integration::{AudioConfig, GenerationCommand, GenerationEvent};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

/// The panel currently shown. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Chat,
    Image,
    Humanizer,
}

impl View {
    pub const ALL: [View; 3] = [View::Chat, View::Image, View::Humanizer];

    pub fn title(&self) -> &'static str {
        match self {
            View::Chat => "Chat",
            View::Image => "Image",
            View::Humanizer => "Humanizer",
        }
    }
}

pub struct AppState {
    pub view: View,
    pub chat: ChatController,
    pub image: ImageController,
    pub humanizer: HumanizerController,

    command_tx: Sender<GenerationCommand>,
    event_rx: Receiver<GenerationEvent>,
    worker_running: bool,
}

impl AppState {
    pub fn new(
        command_tx: Sender<GenerationCommand>,
        event_rx: Receiver<GenerationEvent>,
        sink: Box<dyn AudioSink>,
        audio: AudioConfig,
    ) -> Self {
        Self {
            view: View::default(),
            chat: ChatController::new(command_tx.clone(), sink, audio),
            image: ImageController::new(command_tx.clone()),
            humanizer: HumanizerController::new(command_tx.clone()),
            command_tx,
            event_rx,
            worker_running: true,
        }
    }

    /// Switch panels. Leaving the chat silences any speech.
    pub fn set_view(&mut self, view: View) {
        if self.view == view {
            return;
        }
        if self.view == View::Chat {
            self.chat.stop_speech();
        }
        debug!("Switching view to {}", view.title());
        self.view = view;
    }

    /// Drain worker events and playback completions. Call once per frame.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            if matches!(event, GenerationEvent::Shutdown) {
                warn!("Generation worker stopped");
                self.worker_running = false;
            }

            let handled = self.chat.handle_event(&event)
                || self.image.handle_event(&event)
                || self.humanizer.handle_event(&event);

            if !handled {
                if let Some(request_id) = event.request_id() {
                    debug!("Dropping stale result for request {}", request_id);
                }
            }
        }

        for event in self.chat.poll_playback() {
            if let PlaybackEvent::Finished { slot, .. } = event {
                debug!("Speech for message {} finished", slot);
            }
        }
    }

    /// Whether the UI should keep repainting
    pub fn is_busy(&self) -> bool {
        self.chat.is_loading()
            || self.chat.is_playing()
            || self.image.is_loading()
            || self.humanizer.is_loading()
    }

    pub fn worker_running(&self) -> bool {
        self.worker_running
    }

    /// Stop playback and ask the worker to exit.
    pub fn shutdown(&mut self) {
        self.chat.stop_speech();
        if self.worker_running && self.command_tx.send(GenerationCommand::Shutdown).is_ok() {
            info!("Requested generation worker shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSink;
    use crossbeam_channel::unbounded;

    fn state() -> (AppState, Receiver<GenerationCommand>, Sender<GenerationEvent>) {
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let state = AppState::new(
            command_tx,
            event_rx,
            Box::new(NullSink::default()),
            AudioConfig::default(),
        );
        (state, command_rx, event_tx)
    }

    #[test]
    fn test_events_reach_owning_controller() {
        let (mut state, command_rx, event_tx) = state();
        state.image.prompt = "a lighthouse".into();
        state.image.submit();
        let request_id = match command_rx.try_recv().unwrap() {
            GenerationCommand::Image { request_id, .. } => request_id,
            other => panic!("unexpected command {:?}", other),
        };

        event_tx
            .send(GenerationEvent::ImageReady {
                request_id,
                result: Ok("data:image/jpeg;base64,AA==".into()),
            })
            .unwrap();
        state.poll_events();

        assert!(!state.image.is_loading());
        assert!(state.image.image_url().is_some());
        assert!(!state.is_busy());
    }

    #[test]
    fn test_shutdown_event_releases_all_panels() {
        let (mut state, _command_rx, event_tx) = state();
        state.chat.input = "Hello".into();
        state.chat.submit();
        state.humanizer.input = "text".into();
        state.humanizer.submit();
        assert!(state.is_busy());

        event_tx.send(GenerationEvent::Shutdown).unwrap();
        state.poll_events();

        assert!(!state.is_busy());
        assert!(!state.worker_running());
        assert!(state.chat.last_error().is_some());
        assert!(state.humanizer.error().is_some());
    }

    #[test]
    fn test_view_defaults_to_chat() {
        let (mut state, command_rx, _event_tx) = state();
        assert_eq!(state.view, View::Chat);
        state.set_view(View::Humanizer);
        assert_eq!(state.view, View::Humanizer);

        state.shutdown();
        assert!(matches!(command_rx.try_recv(), Ok(GenerationCommand::Shutdown)));
    }
}
