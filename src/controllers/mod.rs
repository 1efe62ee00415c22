//! Interaction controllers
//!
//! One controller per panel. Each holds its panel's state and sequences at
//! most one generation request at a time: a submit while a request is in
//! flight, or with blank input, dispatches nothing.

pub mod chat;
pub mod humanizer;
pub mod image;

pub use chat::{ChatController, SlotState, WELCOME_MESSAGE};
pub use humanizer::HumanizerController;
pub use image::ImageController;

use crate::integration::GenerationCommand;
use crate::MuseError;
use crossbeam_channel::Sender;
use tracing::error;
use uuid::Uuid;

/// Busy flag for one controller, tied to the id of the request in flight.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pending: Option<Uuid>,
}

impl InFlight {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim the flag for a new request. Returns `None` while busy.
    pub fn begin(&mut self) -> Option<Uuid> {
        if self.is_busy() {
            return None;
        }
        let id = Uuid::new_v4();
        self.pending = Some(id);
        Some(id)
    }

    /// Release the flag if `request_id` is the request in flight.
    pub fn complete(&mut self, request_id: Uuid) -> bool {
        if self.pending == Some(request_id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Release the flag unconditionally.
    pub fn abandon(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

/// Send `command`, releasing `in_flight` and returning the user-facing
/// message if the worker is gone.
pub(crate) fn dispatch(
    command_tx: &Sender<GenerationCommand>,
    in_flight: &mut InFlight,
    command: GenerationCommand,
) -> Result<(), String> {
    command_tx.send(command).map_err(|e| {
        error!("Generation worker unavailable: {}", e);
        in_flight.abandon();
        MuseError::Channel(e.to_string()).user_message()
    })
}

/// Message shown when the worker stops while a request is outstanding.
pub(crate) fn worker_stopped_message() -> String {
    MuseError::Channel("generation worker stopped".into()).user_message()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_single_claim() {
        let mut flag = InFlight::default();
        let id = flag.begin().unwrap();
        assert!(flag.is_busy());
        assert!(flag.begin().is_none());

        assert!(!flag.complete(Uuid::new_v4()));
        assert!(flag.is_busy());
        assert!(flag.complete(id));
        assert!(!flag.is_busy());
        assert!(flag.begin().is_some());
    }
}
