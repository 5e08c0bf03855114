//! Types shared with UI collaborators

use crate::Track;
use serde::{Deserialize, Serialize};

/// Listening statistics reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Number of tracks that started playing successfully
    pub total_plays: u64,
    /// Seconds of audible playback (paused time excluded)
    pub total_listen_time: f64,
    /// Entries currently resident in the preload cache
    pub cache_size: usize,
    /// Entries waiting in the playback queue
    pub queue_length: usize,
    pub current_track: Option<Track>,
}
