//! Player settings
//!
//! The settings object recognised by the engine. Field names serialize in
//! camelCase so the same document can come from a UI layer or a TOML file.

use crate::{Error, FadeCurve, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quality preference for URL selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    /// Let the connection-quality signal choose between high and medium
    #[default]
    Auto,
    Lossless,
    High,
    Medium,
}

impl std::str::FromStr for AudioQuality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(AudioQuality::Auto),
            "lossless" => Ok(AudioQuality::Lossless),
            "high" => Ok(AudioQuality::High),
            "medium" => Ok(AudioQuality::Medium),
            other => Err(Error::InvalidInput(format!("unknown audio quality '{}'", other))),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSettings {
    /// Crossfade duration in seconds; 0 disables crossfading
    pub crossfade: f64,
    pub audio_quality: AudioQuality,
    /// Scale each deck by its buffer's loudness normalization gain
    pub normalize_volume: bool,
    /// EQ gains in dB (stored and reported only)
    pub eq_low: f32,
    pub eq_mid: f32,
    pub eq_high: f32,
    /// Advance to the next track just before the current one ends
    pub gapless_playback: bool,
    /// Number of upcoming queue entries kept warm in the preload cache
    pub preload_ahead: usize,
    /// Preload cache capacity (entries)
    pub max_cache_size: usize,
    /// Gently lower the active deck before the crossfade window
    pub auto_fade_out: bool,
    /// Seconds before the end of a track where auto fade-out begins
    pub fade_out_start_offset: f64,
    pub crossfade_curve: FadeCurve,
    /// Upper bound on a single load, in seconds
    pub load_timeout: f64,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            crossfade: 3.0,
            audio_quality: AudioQuality::Auto,
            normalize_volume: false,
            eq_low: 0.0,
            eq_mid: 0.0,
            eq_high: 0.0,
            gapless_playback: true,
            preload_ahead: 2,
            max_cache_size: 5,
            auto_fade_out: false,
            fade_out_start_offset: 10.0,
            crossfade_curve: FadeCurve::default(),
            load_timeout: 30.0,
            volume: 1.0,
        }
    }
}

impl PlayerSettings {
    /// Reject settings the engine cannot honour and clamp soft ranges.
    pub fn validate(mut self) -> Result<Self> {
        if !self.crossfade.is_finite() || self.crossfade < 0.0 {
            return Err(Error::Config(format!(
                "crossfade must be a non-negative number of seconds, got {}",
                self.crossfade
            )));
        }
        if self.max_cache_size == 0 {
            return Err(Error::Config("maxCacheSize must be at least 1".to_string()));
        }
        if !self.load_timeout.is_finite() || self.load_timeout <= 0.0 {
            return Err(Error::Config(format!(
                "loadTimeout must be positive, got {}",
                self.load_timeout
            )));
        }
        if !self.fade_out_start_offset.is_finite() || self.fade_out_start_offset < 0.0 {
            self.fade_out_start_offset = 0.0;
        }
        self.volume = self.volume.clamp(0.0, 1.0);
        Ok(self)
    }

    pub fn crossfade_duration(&self) -> Duration {
        Duration::from_secs_f64(self.crossfade.max(0.0))
    }

    pub fn load_timeout_duration(&self) -> Duration {
        Duration::from_secs_f64(self.load_timeout)
    }
}
