//! Audio decoding and single-slot playback
//!
//! Speech arrives as base64 text holding raw 16-bit PCM. This module turns
//! it into an [`AudioBuffer`] and plays it through a [`PlaybackManager`],
//! which guarantees that at most one buffer is sounding at a time.

pub mod buffer;
pub mod decode;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod playback;
pub mod resampler;

pub use buffer::AudioBuffer;
pub use decode::{decode_base64, decode_pcm16, encode_base64};
#[cfg(feature = "audio-io")]
pub use output::DeviceSink;
pub use playback::{
    AudioSink, FinishSignal, NullSink, PlaybackEvent, PlaybackHandle, PlaybackManager, StopReason,
};
pub use resampler::{stream_resampled, AudioResampler};

/// Sample rate of speech returned by the synthesis model
pub const SPEECH_SAMPLE_RATE: u32 = 24000;

/// Channel count of speech returned by the synthesis model
pub const SPEECH_CHANNELS: u16 = 1;

/// Open the default output device, or a silent sink when none is usable.
pub fn default_sink() -> Box<dyn AudioSink> {
    #[cfg(feature = "audio-io")]
    {
        match DeviceSink::new() {
            Ok(sink) => return Box::new(sink),
            Err(e) => tracing::warn!("Audio output unavailable, speech is muted: {}", e),
        }
    }
    Box::new(NullSink::default())
}
