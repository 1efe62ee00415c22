use super::buffer::AudioBuffer;
use super::playback::{AudioSink, FinishSignal};
use super::resampler::stream_resampled;
use crate::{MuseError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, TryRecvError};
use std::thread;
use tracing::{debug, error, info};

/// Resampled chunks buffered ahead of the output callback
const RESAMPLED_CHUNKS: usize = 32;

/// Speech output on the default cpal device. Holds one stream at a time;
/// the stream lives exactly as long as the voice it plays.
pub struct DeviceSink {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl DeviceSink {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| MuseError::AudioDevice("No output device available".into()))?;

        info!("Using output device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

        let config = device
            .default_output_config()
            .map_err(|e| MuseError::AudioDevice(format!("Failed to get output config: {}", e)))?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

impl AudioSink for DeviceSink {
    fn start(&mut self, buffer: AudioBuffer, done: FinishSignal) -> Result<()> {
        self.stop();

        let device_rate = self.sample_rate();
        let source_channels = buffer.channels.max(1) as usize;
        let device_channels = self.config.channels.max(1) as usize;
        let duration = buffer.duration_secs();

        // Resampling runs off the UI thread; the callback plays chunks as
        // they arrive and outputs silence if it catches up
        let (chunk_tx, chunk_rx) = bounded::<Vec<f32>>(RESAMPLED_CHUNKS);
        thread::Builder::new()
            .name("speech-resampler".into())
            .spawn(move || {
                if let Err(e) = stream_resampled(&buffer, device_rate, &chunk_tx) {
                    error!("Failed to resample speech: {}", e);
                }
            })
            .map_err(|e| MuseError::AudioProcessing(format!("Failed to spawn resampler: {}", e)))?;

        let mut chunk: Vec<f32> = Vec::new();
        let mut position = 0usize;
        let mut exhausted = false;

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(device_channels) {
                        while !exhausted && position * source_channels >= chunk.len() {
                            match chunk_rx.try_recv() {
                                Ok(next) => {
                                    chunk = next;
                                    position = 0;
                                }
                                Err(TryRecvError::Empty) => break,
                                Err(TryRecvError::Disconnected) => exhausted = true,
                            }
                        }
                        if position * source_channels >= chunk.len() {
                            frame.fill(0.0);
                            continue;
                        }
                        // Mono fans out to every device channel; extra device channels repeat the last source channel
                        for (channel, out) in frame.iter_mut().enumerate() {
                            let source = channel.min(source_channels - 1);
                            *out = chunk[position * source_channels + source];
                        }
                        position += 1;
                    }

                    if exhausted {
                        done.fire();
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| MuseError::AudioDevice(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| MuseError::AudioDevice(format!("Failed to start output stream: {}", e)))?;

        debug!("Playing {:.2}s of speech", duration);
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!("Stopped audio output stream");
        }
    }
}

impl Drop for DeviceSink {
    fn drop(&mut self) {
        self.stop();
    }
}
