//! Track model
//!
//! A track is immutable once constructed. It carries either a single
//! `audio_url` (single-quality tracks) or a set of quality-tagged URLs.

use serde::{Deserialize, Serialize};

/// Audio encoding tier of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Lossless,
    High,
    Medium,
}

impl QualityTier {
    /// Fallback order used when a preferred tier is missing
    pub const FALLBACK_CHAIN: [QualityTier; 3] =
        [QualityTier::High, QualityTier::Medium, QualityTier::Lossless];
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::Lossless => write!(f, "lossless"),
            QualityTier::High => write!(f, "high"),
            QualityTier::Medium => write!(f, "medium"),
        }
    }
}

/// Quality-tagged URL set; any tier may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lossless: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
}

impl AudioUrls {
    /// URL for a tier, if present and non-empty
    pub fn get(&self, tier: QualityTier) -> Option<&str> {
        let url = match tier {
            QualityTier::Lossless => self.lossless.as_deref(),
            QualityTier::High => self.high.as_deref(),
            QualityTier::Medium => self.medium.as_deref(),
        };
        url.filter(|u| !u.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        QualityTier::FALLBACK_CHAIN.iter().all(|tier| self.get(*tier).is_none())
    }
}

/// A remotely hosted track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Catalog identifier; also the preload cache key
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Duration in seconds, if known before loading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Single-quality URL; overrides `audio_urls` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_urls: Option<AudioUrls>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_url: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration: None,
            audio_url: None,
            audio_urls: None,
            art_url: None,
        }
    }

    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    pub fn with_audio_urls(mut self, urls: AudioUrls) -> Self {
        self.audio_urls = Some(urls);
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_art_url(mut self, url: impl Into<String>) -> Self {
        self.art_url = Some(url.into());
        self
    }
}
