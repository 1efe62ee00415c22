//! Sample-rate conversion for speech buffers
//!
//! Output devices rarely run at the 24 kHz the speech model produces, so
//! buffers are converted to the device rate while playback is running.

use super::buffer::AudioBuffer;
use crate::{MuseError, Result};
use crossbeam_channel::Sender;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Frames fed to the sinc resampler per call
const CHUNK_FRAMES: usize = 1024;

pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    ratio: f64,
    channels: usize,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32, channels: u16) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(MuseError::AudioProcessing(
                "sample rates must be greater than 0".into(),
            ));
        }
        if channels == 0 {
            return Err(MuseError::AudioProcessing(
                "channel count must be greater than 0".into(),
            ));
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let ratio = output_rate as f64 / input_rate as f64;
        let resampler = SincFixedIn::<f32>::new(
            ratio,
            2.0,
            params,
            CHUNK_FRAMES,
            channels as usize,
        )
        .map_err(|e| MuseError::AudioProcessing(format!("failed to create resampler: {}", e)))?;

        debug!("Resampler {} Hz -> {} Hz, {} channels", input_rate, output_rate, channels);

        Ok(Self {
            resampler,
            ratio,
            channels: channels as usize,
        })
    }

    /// Convert interleaved `input`, handing each converted chunk to `emit`
    /// as soon as it is ready. Returning `false` from `emit` stops early.
    ///
    /// The filter delay is removed from the front and the tail is flushed,
    /// so exactly `ceil(frames * ratio)` frames come out, aligned with the
    /// input.
    pub fn process_chunks<F>(&mut self, input: &[f32], mut emit: F) -> Result<()>
    where
        F: FnMut(&[f32]) -> bool,
    {
        if input.is_empty() {
            return Ok(());
        }
        self.resampler.reset();

        let total_frames = input.len() / self.channels;
        let mut skip = self.resampler.output_delay();
        let mut remaining = self.output_frames(input);
        let mut offset = 0;
        let mut interleaved = Vec::new();

        while remaining > 0 {
            let frames = total_frames.saturating_sub(offset).min(CHUNK_FRAMES);

            // SincFixedIn wants exactly CHUNK_FRAMES per call; past the end
            // it is fed silence until the delayed tail has come out
            let mut planar = vec![vec![0.0f32; CHUNK_FRAMES]; self.channels];
            for frame in 0..frames {
                let base = (offset + frame) * self.channels;
                for (channel, lane) in planar.iter_mut().enumerate() {
                    lane[frame] = input[base + channel];
                }
            }
            offset += frames;

            let converted = self
                .resampler
                .process(&planar, None)
                .map_err(|e| MuseError::AudioProcessing(format!("resampling failed: {}", e)))?;

            let produced = converted[0].len();
            let dropped = skip.min(produced);
            skip -= dropped;
            let keep = (produced - dropped).min(remaining);
            if keep == 0 {
                continue;
            }

            interleaved.clear();
            for frame in dropped..dropped + keep {
                for lane in &converted {
                    interleaved.push(lane[frame]);
                }
            }
            remaining -= keep;

            if !emit(&interleaved) {
                debug!("Resampling stopped by consumer");
                return Ok(());
            }
        }

        Ok(())
    }

    fn output_frames(&self, input: &[f32]) -> usize {
        let frames = input.len() / self.channels;
        (frames as f64 * self.ratio).ceil() as usize
    }
}

/// Convert `buffer` to `output_rate` and send it chunk by chunk to `chunks`.
///
/// Meant to run on its own thread while playback consumes the chunks. Stops
/// quietly once the receiver is dropped.
pub fn stream_resampled(
    buffer: &AudioBuffer,
    output_rate: u32,
    chunks: &Sender<Vec<f32>>,
) -> Result<()> {
    if buffer.sample_rate == output_rate {
        let _ = chunks.send(buffer.samples.clone());
        return Ok(());
    }

    let mut resampler = AudioResampler::new(buffer.sample_rate, output_rate, buffer.channels)?;
    resampler.process_chunks(&buffer.samples, |chunk| chunks.send(chunk.to_vec()).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resample(buffer: &AudioBuffer, output_rate: u32) -> AudioBuffer {
        let (tx, rx) = crossbeam_channel::unbounded();
        stream_resampled(buffer, output_rate, &tx).unwrap();
        drop(tx);
        let samples: Vec<f32> = rx.iter().flatten().collect();
        AudioBuffer::new(samples, output_rate, buffer.channels)
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(AudioResampler::new(0, 48000, 1).is_err());
        assert!(AudioResampler::new(24000, 0, 1).is_err());
        assert!(AudioResampler::new(24000, 48000, 0).is_err());
    }

    #[test]
    fn test_same_rate_is_copy() {
        let buffer = AudioBuffer::new(vec![0.25, -0.5], 24000, 1);
        assert_eq!(resample(&buffer, 24000), buffer);
    }

    #[test]
    fn test_upsample_speech_to_device_rate() {
        let samples: Vec<f32> = (0..2400).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let buffer = AudioBuffer::new(samples, 24000, 1);

        let converted = resample(&buffer, 48000);

        assert_eq!(converted.sample_rate, 48000);
        assert_eq!(converted.channels, 1);
        assert_eq!(converted.frames(), 4800);
    }

    #[test]
    fn test_upsample_keeps_tail() {
        // Silence with a loud final 100 frames
        let mut samples = vec![0.0f32; 2400];
        for sample in &mut samples[2300..] {
            *sample = 0.8;
        }
        let buffer = AudioBuffer::new(samples, 24000, 1);

        let converted = resample(&buffer, 48000);
        assert_eq!(converted.frames(), 4800);

        let tail = &converted.samples[4620..4780];
        let tail_peak = tail.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(tail_peak > 0.7, "tail peak {}", tail_peak);

        // Energy of 200 frames at 0.8 is 128
        let energy: f32 = converted.samples.iter().map(|s| s * s).sum();
        assert!((energy - 128.0).abs() < 10.0, "energy {}", energy);

        // No filter delay at the front: the lead-in stays silent
        let head_peak = converted.samples[..4400]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(head_peak < 0.05, "head peak {}", head_peak);
    }

    #[test]
    fn test_downsample_multichannel_length() {
        let buffer = AudioBuffer::new(vec![0.1; 3000 * 2], 48000, 2);
        let converted = resample(&buffer, 44100);
        assert_eq!(converted.frames(), (3000.0f64 * 44100.0 / 48000.0).ceil() as usize);
        assert_eq!(converted.samples.len() % 2, 0);
    }

    #[test]
    fn test_long_buffer_arrives_in_chunks() {
        let samples: Vec<f32> = (0..5000).map(|i| (i as f32 * 0.01).sin() * 0.3).collect();
        let buffer = AudioBuffer::new(samples, 24000, 1);
        let (tx, rx) = crossbeam_channel::unbounded();

        stream_resampled(&buffer, 44100, &tx).unwrap();
        drop(tx);

        let chunks: Vec<Vec<f32>> = rx.iter().collect();
        assert!(chunks.len() > 1);
        let total: usize = chunks.iter().map(Vec::len).sum();
        assert_eq!(total, (5000.0f64 * 44100.0 / 24000.0).ceil() as usize);
    }

    #[test]
    fn test_stream_stops_when_receiver_dropped() {
        let buffer = AudioBuffer::new(vec![0.2; 48000], 24000, 1);
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(rx);
        assert!(stream_resampled(&buffer, 48000, &tx).is_ok());
    }

    #[test]
    fn test_empty_input() {
        let buffer = AudioBuffer::new(Vec::new(), 24000, 1);
        assert!(resample(&buffer, 44100).samples.is_empty());
    }
}
