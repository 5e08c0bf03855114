//! Playback queue
//!
//! Ordered list of upcoming tracks. FIFO unless shuffled.

use rand::seq::SliceRandom;
use rand::Rng;
use segue_common::Track;
use std::collections::VecDeque;

#[derive(Debug, Default, Clone)]
pub struct PlaybackQueue {
    tracks: VecDeque<Track>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push_back(track);
    }

    pub fn pop_front(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Remove by position; out-of-range (including negative) is a no-op
    pub fn remove(&mut self, index: isize) -> Option<Track> {
        let index = usize::try_from(index).ok()?;
        self.tracks.remove(index)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Uniform random permutation
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tracks.make_contiguous().shuffle(rng);
    }

    /// The next `n` tracks, soonest first
    pub fn upcoming(&self, n: usize) -> Vec<Track> {
        self.tracks.iter().take(n).cloned().collect()
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn queue_of(ids: &[&str]) -> PlaybackQueue {
        let mut queue = PlaybackQueue::new();
        for id in ids {
            queue.push(Track::new(*id, *id, "artist"));
        }
        queue
    }

    fn ids(queue: &PlaybackQueue) -> Vec<String> {
        queue.to_vec().into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_fifo() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert_eq!(queue.pop_front().unwrap().id, "a");
        assert_eq!(queue.pop_front().unwrap().id, "b");
        assert_eq!(queue.pop_front().unwrap().id, "c");
        assert!(queue.pop_front().is_none());
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut queue = queue_of(&["a", "b"]);
        assert!(queue.remove(-1).is_none());
        assert!(queue.remove(2).is_none());
        assert_eq!(ids(&queue), vec!["a", "b"]);

        assert_eq!(queue.remove(1).unwrap().id, "b");
        assert_eq!(ids(&queue), vec!["a"]);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut queue = queue_of(&["a", "b", "c", "d", "e", "f"]);
        queue.shuffle(&mut StdRng::seed_from_u64(7));

        let mut shuffled = ids(&queue);
        shuffled.sort();
        assert_eq!(shuffled, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_upcoming() {
        let queue = queue_of(&["a", "b", "c"]);
        let next: Vec<String> = queue.upcoming(2).into_iter().map(|t| t.id).collect();
        assert_eq!(next, vec!["a", "b"]);
        assert_eq!(queue.upcoming(10).len(), 3);
    }
}
