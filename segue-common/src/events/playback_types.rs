//! Playback-related type definitions
//!
//! Supporting types for transport state and error reporting.

use serde::{Deserialize, Serialize};

/// Engine-wide transport phase
///
/// `Idle → Loading → (Playing ⇄ Paused) → Crossfading → Playing`, with
/// `Error` reachable from `Loading`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportPhase {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Crossfading,
    Error,
}

impl TransportPhase {
    /// Whether a deck is audibly advancing
    pub fn is_audible(&self) -> bool {
        matches!(self, TransportPhase::Playing | TransportPhase::Crossfading)
    }
}

impl std::fmt::Display for TransportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportPhase::Idle => write!(f, "idle"),
            TransportPhase::Loading => write!(f, "loading"),
            TransportPhase::Playing => write!(f, "playing"),
            TransportPhase::Paused => write!(f, "paused"),
            TransportPhase::Crossfading => write!(f, "crossfading"),
            TransportPhase::Error => write!(f, "error"),
        }
    }
}

/// Category of a surfaced playback failure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport-level failure (connection, timeout, server error)
    Network,
    /// The resource was fetched but could not be decoded
    UnsupportedFormat,
    /// The resource does not exist
    NotFound,
    /// Quality selection found no playable URL
    NoAudioUrl,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::UnsupportedFormat => write!(f, "unsupported format"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::NoAudioUrl => write!(f, "no audio url"),
        }
    }
}
