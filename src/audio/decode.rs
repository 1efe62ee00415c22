//! Base64 and raw PCM decoding for synthesized speech

use super::buffer::AudioBuffer;
use crate::{MuseError, Result};
use base64::{engine::general_purpose, Engine as _};

/// Decode standard base64 text into bytes.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| MuseError::Decode(format!("invalid base64 audio: {}", e)))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Interpret `bytes` as signed 16-bit little-endian PCM with the given
/// layout. No format sniffing is done: the caller must know the format.
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    if sample_rate == 0 || channels == 0 {
        return Err(MuseError::Decode(format!(
            "unsupported PCM layout: {} Hz, {} channels",
            sample_rate, channels
        )));
    }

    let frame_bytes = 2 * channels as usize;
    if bytes.is_empty() {
        return Err(MuseError::Decode("audio payload is empty".into()));
    }
    if bytes.len() % frame_bytes != 0 {
        return Err(MuseError::Decode(format!(
            "{} bytes is not a whole number of {}-byte frames",
            bytes.len(),
            frame_bytes
        )));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(AudioBuffer::new(samples, sample_rate, channels))
}
