//! Core audio data types
//!
//! A decoded track lives entirely in RAM so decks can seek and crossfade
//! without touching the network again.

/// RMS level that loudness normalization aims for (about -14 dBFS)
const NORMALIZATION_TARGET_RMS: f32 = 0.2;

/// Upper bound on normalization gain (+6 dB)
pub const MAX_NORMALIZATION_GAIN: f32 = 2.0;

/// Fully decoded audio for one track.
///
/// **Format:**
/// - Samples are f32 (floating point -1.0 to 1.0)
/// - Interleaved by channel: [c0, c1, c0, c1, ...]
/// - Sample rate and channel count are whatever the source had
#[derive(Debug, Clone)]
pub struct DecodedBuffer {
    /// PCM audio samples (interleaved)
    pub samples: Vec<f32>,

    pub sample_rate: u32,

    pub channels: u16,

    /// Gain that brings this buffer to the normalization target,
    /// computed once at decode time
    pub normalization_gain: f32,
}

impl DecodedBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let normalization_gain = normalization_gain_for(&samples);
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
            normalization_gain,
        }
    }

    /// A silent buffer of the given length
    ///
    /// Handy for tests: a low sample rate keeps long durations cheap.
    pub fn silence(duration_secs: f64, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let frames = (duration_secs.max(0.0) * sample_rate as f64).round() as usize;
        Self::new(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Sample for an output channel at a frame, mapping channel counts by
    /// wrapping (mono feeds every output channel)
    pub fn sample(&self, frame: usize, out_channel: usize) -> f32 {
        let channels = self.channels as usize;
        let index = frame * channels + (out_channel % channels);
        self.samples.get(index).copied().unwrap_or(0.0)
    }

    /// Frame index for a position in seconds
    pub fn frame_at(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.sample_rate as f64) as usize
    }
}

fn normalization_gain_for(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 1.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
    let rms = (sum_sq / samples.len() as f64).sqrt() as f32;
    if rms <= f32::EPSILON {
        return 1.0;
    }
    (NORMALIZATION_TARGET_RMS / rms).min(MAX_NORMALIZATION_GAIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_duration() {
        let buffer = DecodedBuffer::silence(180.0, 100, 1);
        assert_eq!(buffer.frames(), 18_000);
        assert!((buffer.duration_secs() - 180.0).abs() < 1e-9);
        assert_eq!(buffer.normalization_gain, 1.0);
    }

    #[test]
    fn test_mono_maps_to_every_output_channel() {
        let buffer = DecodedBuffer::new(vec![0.1, 0.2, 0.3], 3, 1);
        assert_eq!(buffer.sample(1, 0), 0.2);
        assert_eq!(buffer.sample(1, 1), 0.2);
        assert_eq!(buffer.sample(5, 0), 0.0);
    }

    #[test]
    fn test_normalization_gain_capped() {
        let quiet = DecodedBuffer::new(vec![0.01; 100], 100, 1);
        assert_eq!(quiet.normalization_gain, MAX_NORMALIZATION_GAIN);

        let loud = DecodedBuffer::new(vec![0.8, -0.8, 0.8, -0.8], 100, 1);
        assert!((loud.normalization_gain - 0.25).abs() < 1e-6);
    }
}
