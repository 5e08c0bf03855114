//! Background prefetch bookkeeping
//!
//! The prefetch queue lists tracks waiting to be loaded into the preload
//! cache. The scheduler loop that drains it lives on the engine.

use segue_common::Track;
use std::collections::VecDeque;

/// Result of one scheduler iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadStep {
    /// Nothing pending
    Idle,
    /// A foreground load is in flight; background work waits
    Deferred,
    /// Loaded and cached
    Loaded(String),
    /// Load failed; the entry is dropped, not retried
    Failed(String),
    /// Already cached by the time it was popped
    Skipped(String),
}

/// Pending background loads, unique by track id
#[derive(Debug, Default)]
pub struct PrefetchQueue {
    pending: VecDeque<Track>,
}

impl PrefetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track unless its id is already pending
    pub fn enqueue(&mut self, track: Track) -> bool {
        if self.contains(&track.id) {
            return false;
        }
        self.pending.push_back(track);
        true
    }

    pub fn pop_front(&mut self) -> Option<Track> {
        self.pending.pop_front()
    }

    pub fn remove(&mut self, track_id: &str) {
        self.pending.retain(|t| t.id != track_id);
    }

    /// Keep only entries for which `keep` returns true
    pub fn retain<F: FnMut(&Track) -> bool>(&mut self, keep: F) {
        self.pending.retain(keep);
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.pending.iter().any(|t| t.id == track_id)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.pending.iter().map(|t| t.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_deduplicates() {
        let mut queue = PrefetchQueue::new();
        assert!(queue.enqueue(Track::new("a", "A", "x")));
        assert!(!queue.enqueue(Track::new("a", "A again", "x")));
        assert!(queue.enqueue(Track::new("b", "B", "x")));
        assert_eq!(queue.ids(), vec!["a", "b"]);

        queue.remove("a");
        assert_eq!(queue.pop_front().unwrap().id, "b");
        assert!(queue.is_empty());
    }
}
