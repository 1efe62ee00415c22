//! Single-slot playback management
//!
//! A [`PlaybackManager`] owns one [`AudioSink`] and at most one active
//! playback. Starting a new playback always stops the current one first,
//! so exactly one handle is ever live. Natural completion is reported by
//! the sink through a [`FinishSignal`] from any thread and observed on the
//! owning thread by [`PlaybackManager::poll`].

use super::buffer::AudioBuffer;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Identifies one started playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle {
    id: u64,
}

/// Fired by a sink once the last sample of a buffer has been played.
/// Firing more than once has no further effect.
#[derive(Debug, Clone)]
pub struct FinishSignal {
    id: u64,
    tx: Sender<u64>,
    fired: Arc<AtomicBool>,
}

impl FinishSignal {
    fn new(id: u64, tx: Sender<u64>) -> Self {
        Self {
            id,
            tx,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fire(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(self.id);
        }
    }
}

/// Platform audio output holding a single voice.
pub trait AudioSink {
    /// Begin sounding `buffer`. The sink must call `done.fire()` when the
    /// buffer has been played to the end.
    fn start(&mut self, buffer: AudioBuffer, done: FinishSignal) -> Result<()>;

    /// Silence the current voice immediately. Must be a no-op when idle.
    fn stop(&mut self);
}

/// Sink that plays nothing and finishes at once.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn start(&mut self, _buffer: AudioBuffer, done: FinishSignal) -> Result<()> {
        done.fire();
        Ok(())
    }

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The owner asked for the playback to stop
    Requested,
    /// A newer playback took the slot
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started { handle: PlaybackHandle, slot: usize },
    Stopped { handle: PlaybackHandle, slot: usize, reason: StopReason },
    Finished { handle: PlaybackHandle, slot: usize },
}

#[derive(Debug, Clone, Copy)]
struct ActivePlayback {
    handle: PlaybackHandle,
    slot: usize,
}

pub struct PlaybackManager {
    sink: Box<dyn AudioSink>,
    active: Option<ActivePlayback>,
    next_id: u64,
    finished_tx: Sender<u64>,
    finished_rx: Receiver<u64>,
    events: VecDeque<PlaybackEvent>,
}

impl PlaybackManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        let (finished_tx, finished_rx) = unbounded();
        Self {
            sink,
            active: None,
            next_id: 1,
            finished_tx,
            finished_rx,
            events: VecDeque::new(),
        }
    }

    /// Play `buffer` for the given logical slot, superseding whatever is
    /// currently playing. If the sink fails to start, nothing is playing
    /// afterwards.
    pub fn play(&mut self, buffer: AudioBuffer, slot: usize) -> Result<PlaybackHandle> {
        if let Some(previous) = self.active.take() {
            self.sink.stop();
            debug!("Playback {} superseded by slot {}", previous.handle.id, slot);
            self.events.push_back(PlaybackEvent::Stopped {
                handle: previous.handle,
                slot: previous.slot,
                reason: StopReason::Superseded,
            });
        }

        let handle = PlaybackHandle { id: self.next_id };
        self.next_id += 1;

        let done = FinishSignal::new(handle.id, self.finished_tx.clone());
        if let Err(e) = self.sink.start(buffer, done) {
            warn!("Failed to start playback for slot {}: {}", slot, e);
            return Err(e);
        }

        self.active = Some(ActivePlayback { handle, slot });
        self.events.push_back(PlaybackEvent::Started { handle, slot });
        Ok(handle)
    }

    /// Stop `handle` if it is still the active playback. Stopping a
    /// finished or superseded handle does nothing. Returns whether a
    /// playback was stopped.
    pub fn stop(&mut self, handle: PlaybackHandle) -> bool {
        match self.active {
            Some(active) if active.handle == handle => {
                self.sink.stop();
                self.active = None;
                self.events.push_back(PlaybackEvent::Stopped {
                    handle,
                    slot: active.slot,
                    reason: StopReason::Requested,
                });
                true
            }
            _ => false,
        }
    }

    /// Stop whatever is playing.
    pub fn stop_all(&mut self) -> bool {
        match self.active_handle() {
            Some(handle) => self.stop(handle),
            None => false,
        }
    }

    /// Collect completions reported by the sink and return every event
    /// since the last poll, oldest first.
    pub fn poll(&mut self) -> Vec<PlaybackEvent> {
        while let Ok(id) = self.finished_rx.try_recv() {
            match self.active {
                Some(active) if active.handle.id == id => {
                    self.active = None;
                    self.events.push_back(PlaybackEvent::Finished {
                        handle: active.handle,
                        slot: active.slot,
                    });
                }
                // Completion of a playback that was already stopped
                _ => {}
            }
        }
        self.events.drain(..).collect()
    }

    pub fn active_handle(&self) -> Option<PlaybackHandle> {
        self.active.map(|a| a.handle)
    }

    pub fn playing_slot(&self) -> Option<usize> {
        self.active.map(|a| a.slot)
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }
}
