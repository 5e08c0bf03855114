//! Quality selection
//!
//! Picks the URL to load for a track given the configured preference and
//! the current connection quality.

use segue_common::{AudioQuality, QualityTier, Track};
use std::sync::atomic::{AtomicBool, Ordering};

/// Source of the binary connection-quality signal
pub trait ConnectionProbe: Send + Sync {
    fn is_good_connection(&self) -> bool;
}

/// Settable connection-quality flag; starts out "good"
#[derive(Debug)]
pub struct ConnectionQuality {
    good: AtomicBool,
}

impl ConnectionQuality {
    pub fn new(good: bool) -> Self {
        Self { good: AtomicBool::new(good) }
    }

    pub fn set_good(&self, good: bool) {
        self.good.store(good, Ordering::Relaxed);
    }
}

impl Default for ConnectionQuality {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectionProbe for ConnectionQuality {
    fn is_good_connection(&self) -> bool {
        self.good.load(Ordering::Relaxed)
    }
}

/// Preferred tier for a quality setting
fn preferred_tier(preference: AudioQuality, good_connection: bool) -> QualityTier {
    match preference {
        AudioQuality::Auto if good_connection => QualityTier::High,
        AudioQuality::Auto => QualityTier::Medium,
        AudioQuality::Lossless => QualityTier::Lossless,
        AudioQuality::High => QualityTier::High,
        AudioQuality::Medium => QualityTier::Medium,
    }
}

/// Resolve the URL to load, or `None` if the track has nothing playable
///
/// A single `audio_url` always wins. Otherwise the preferred tier is tried
/// first, then `high → medium → lossless`.
pub fn select_url(track: &Track, preference: AudioQuality, good_connection: bool) -> Option<String> {
    if let Some(url) = track.audio_url.as_deref().filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }

    let urls = track.audio_urls.as_ref()?;
    let preferred = preferred_tier(preference, good_connection);

    std::iter::once(preferred)
        .chain(QualityTier::FALLBACK_CHAIN)
        .find_map(|tier| urls.get(tier))
        .map(str::to_string)
}
