//! Audio output using cpal
//!
//! Opens the default output device and pulls interleaved f32 frames from a
//! render callback on the audio thread. cpal streams are not `Send`, so an
//! `AudioOutput` stays on the thread that created it.

use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Audio output manager using cpal.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    /// Bumped by the stream error callback
    error_count: Arc<AtomicU32>,
}

impl AudioOutput {
    /// Open the default output device.
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?;

        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Using default audio device: {}", name);

        let supported = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;
        let sample_format = supported.sample_format();
        let config = supported.config();

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
            error_count: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Start the stream.
    ///
    /// `render` fills an interleaved f32 buffer laid out for
    /// [`channels`](Self::channels) channels at
    /// [`sample_rate`](Self::sample_rate). It runs on the real-time audio
    /// thread and must not block.
    pub fn start<F>(&mut self, render: F) -> Result<()>
    where
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        info!("Starting audio stream");

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32, F>(render)?,
            SampleFormat::I16 => self.build_stream::<i16, F>(render)?,
            SampleFormat::U16 => self.build_stream::<u16, F>(render)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        info!("Audio stream started");
        Ok(())
    }

    fn build_stream<T, F>(&self, mut render: F) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        let error_count = Arc::clone(&self.error_count);
        let mut scratch: Vec<f32> = Vec::new();

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    scratch.iter_mut().for_each(|s| *s = 0.0);
                    render(&mut scratch);
                    for (out, s) in data.iter_mut().zip(scratch.iter()) {
                        *out = T::from_sample(s.clamp(-1.0, 1.0));
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_count.fetch_add(1, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))
    }

    /// Pause the stream
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
            info!("Audio stream stopped");
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Stream errors reported by the device since the stream started
    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::SeqCst)
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
