//! Queue operations module
//!
//! **Responsibilities:**
//! - Queue mutations (add, remove, clear, shuffle)
//! - Queue queries
//! - QueueUpdate event emission
//!
//! Every mutation re-runs the preload trigger so the look-ahead window
//! follows the queue.

use super::core::PlaybackEngine;
use segue_common::events::PlayerEvent;
use segue_common::Track;
use tracing::{debug, info};

impl PlaybackEngine {
    /// Append a track to the queue
    pub async fn add_to_queue(&self, track: Track) {
        info!("Queued {} - {} ({})", track.artist, track.title, track.id);
        self.queue.write().await.push(track);
        self.emit_queue_update().await;
        self.trigger_preload().await;
    }

    /// Remove the entry at `index`
    ///
    /// Out-of-range indexes (including negative ones) leave the queue
    /// untouched and return `None`. A removed track's cached or pending
    /// preload is dropped unless the same track is still queued elsewhere.
    pub async fn remove_from_queue(&self, index: isize) -> Option<Track> {
        let (removed, still_queued) = {
            let mut queue = self.queue.write().await;
            let removed = queue.remove(index)?;
            let still_queued = queue.contains(&removed.id);
            (removed, still_queued)
        };
        info!("Removed {} from queue (index {})", removed.id, index);

        if !still_queued {
            if self.cache.write().await.remove(&removed.id).is_some() {
                debug!("Dropped cached buffer for {}", removed.id);
            }
            self.prefetch.write().await.remove(&removed.id);
        }

        self.emit_queue_update().await;
        self.trigger_preload().await;
        Some(removed)
    }

    pub async fn clear_queue(&self) {
        info!("Queue cleared");
        self.queue.write().await.clear();
        self.prefetch.write().await.clear();
        self.emit_queue_update().await;
        self.trigger_preload().await;
    }

    /// Uniformly permute the queue
    pub async fn shuffle_queue(&self) {
        {
            let mut queue = self.queue.write().await;
            queue.shuffle(&mut rand::thread_rng());
        }
        info!("Queue shuffled");
        self.emit_queue_update().await;
        self.trigger_preload().await;
    }

    /// Snapshot of the queue, soonest first
    pub async fn queue(&self) -> Vec<Track> {
        self.queue.read().await.to_vec()
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.read().await.len()
    }

    pub(super) async fn emit_queue_update(&self) {
        let queue = self.queue.read().await.to_vec();
        self.events.emit_lossy(PlayerEvent::QueueUpdate { queue });
    }
}
