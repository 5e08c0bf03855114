//! Preload scheduling
//!
//! **Responsibilities:**
//! - `trigger_preload`: keep the next `preload_ahead` queue entries pending
//!   or cached
//! - `preload_step`: one scheduler iteration
//! - The background scheduler loop
//!
//! Background loads never run while a foreground load is in flight, and a
//! failed background load is logged and dropped.

use super::core::{PlaybackEngine, PRELOAD_IDLE_DELAY};
use crate::error::Error;
use crate::playback::preload::PreloadStep;
use crate::playback::quality;
use segue_common::events::PlayerEvent;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

impl PlaybackEngine {
    /// Queue the soonest upcoming tracks that are not cached yet
    ///
    /// Pending entries that dropped out of the look-ahead window are
    /// discarded.
    pub async fn trigger_preload(&self) {
        let ahead = self.settings.read().await.preload_ahead;
        let upcoming = self.queue.read().await.upcoming(ahead);
        let window: HashSet<&str> = upcoming.iter().map(|t| t.id.as_str()).collect();

        let cache = self.cache.read().await;
        let mut prefetch = self.prefetch.write().await;
        prefetch.retain(|t| window.contains(t.id.as_str()));

        for track in upcoming.iter().filter(|t| !cache.contains(&t.id)) {
            if prefetch.enqueue(track.clone()) {
                debug!("Scheduled preload of {}", track.id);
            }
        }
    }

    /// Run one preload iteration
    pub async fn preload_step(&self) -> PreloadStep {
        if self.state.read().await.buffering {
            return PreloadStep::Deferred;
        }

        let Some(track) = self.prefetch.write().await.pop_front() else {
            return PreloadStep::Idle;
        };

        if self.cache.read().await.contains(&track.id) {
            return PreloadStep::Skipped(track.id);
        }

        let (preference, timeout) = {
            let settings = self.settings.read().await;
            (settings.audio_quality, settings.load_timeout_duration())
        };

        let Some(url) = quality::select_url(&track, preference, self.connection.is_good_connection())
        else {
            warn!(
                "Preload skipped: {}",
                Error::NoAudioUrlAvailable { track_id: track.id.clone() }
            );
            return PreloadStep::Failed(track.id);
        };

        debug!("Preloading {} from {}", track.id, url);
        match self.load_with_timeout(&url, timeout).await {
            Ok(buffer) => {
                self.cache_insert(&track.id, buffer).await;
                info!("Preloaded {}", track.id);
                let id = track.id.clone();
                self.events.emit_lossy(PlayerEvent::PreloadComplete { track });
                PreloadStep::Loaded(id)
            }
            Err(source) => {
                let err = Error::PreloadFailed {
                    track_id: track.id.clone(),
                    source,
                };
                warn!("{}", err);
                PreloadStep::Failed(track.id)
            }
        }
    }

    pub(super) fn spawn_preload_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            debug!("Preload scheduler started");
            while engine.running.load(Ordering::SeqCst) {
                let step = engine.preload_step().await;
                if !matches!(step, PreloadStep::Idle | PreloadStep::Deferred) {
                    debug!("Preload step: {:?}", step);
                }
                tokio::time::sleep(PRELOAD_IDLE_DELAY).await;
            }
            debug!("Preload scheduler stopped");
        })
    }
}
