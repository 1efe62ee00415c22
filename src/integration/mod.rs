//! Integration layer
//!
//! Connects the UI thread to the generation client: configuration plus a
//! background worker that runs remote calls and reports results over
//! channels.

pub mod config;
pub mod worker;

pub use config::{AudioConfig, StudioConfig};
pub use worker::{GenerationCommand, GenerationEvent, GenerationWorker};
