//! Diagnostics and status accessors
//!
//! **Responsibilities:**
//! - Listening statistics
//! - Read-only views of transport, deck, cache and prefetch state
//! - Event subscription and the render handle for audio output

use super::core::PlaybackEngine;
use crate::playback::deck::{DeckId, DeckStatus};
use crate::playback::deck_pair::RenderHandle;
use segue_common::events::{PlayerEvent, PlayerStats, TransportPhase};
use segue_common::{PlayerSettings, Track};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::Instant;

impl PlaybackEngine {
    pub async fn get_stats(&self) -> PlayerStats {
        let (total_plays, total_listen_time, current_track) = {
            let state = self.state.read().await;
            (
                state.total_plays,
                state.listen_time(Instant::now()),
                state.current_track.clone(),
            )
        };
        let queue_length = self.queue.read().await.len();
        let cache_size = self.cache.read().await.len();

        PlayerStats {
            total_plays,
            total_listen_time,
            cache_size,
            queue_length,
            current_track,
        }
    }

    /// Subscribe to player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Handle for the audio output callback
    pub fn render_handle(&self) -> RenderHandle {
        RenderHandle::new(Arc::clone(&self.decks))
    }

    pub async fn phase(&self) -> TransportPhase {
        self.state.read().await.phase
    }

    pub async fn is_playing(&self) -> bool {
        self.state.read().await.phase.is_audible()
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.state.read().await.current_track.clone()
    }

    /// Position of the current track in seconds
    pub async fn position(&self) -> f64 {
        let state = self.state.read().await;
        if state.phase.is_audible() {
            self.lock_decks().active_deck().position(Instant::now())
        } else {
            state.paused_position
        }
    }

    pub async fn duration(&self) -> f64 {
        self.state.read().await.duration
    }

    pub async fn is_buffering(&self) -> bool {
        self.state.read().await.buffering
    }

    pub async fn settings(&self) -> PlayerSettings {
        self.settings.read().await.clone()
    }

    /// Crossfader parameter (0.0 = deck A, 1.0 = deck B)
    pub fn fade_parameter(&self) -> f32 {
        self.lock_decks().fade_parameter(Instant::now())
    }

    pub fn active_deck(&self) -> DeckId {
        self.lock_decks().active()
    }

    pub fn deck_status(&self) -> [DeckStatus; 2] {
        self.lock_decks().status(Instant::now())
    }

    /// Cached track ids, oldest first
    pub async fn cached_track_ids(&self) -> Vec<String> {
        self.cache.read().await.ids()
    }

    /// Track ids waiting for a background load
    pub async fn pending_preloads(&self) -> Vec<String> {
        self.prefetch.read().await.ids()
    }
}
