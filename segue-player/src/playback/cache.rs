//! Preload cache
//!
//! Bounded map from track id to decoded audio. Eviction is by insertion
//! order: once full, inserting a new id drops the oldest-inserted entry.
//! Reads do not refresh an entry's age.

use crate::audio::types::DecodedBuffer;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

pub struct PreloadCache<V = Arc<DecodedBuffer>> {
    entries: HashMap<String, V>,
    /// Ids oldest-first
    order: VecDeque<String>,
    capacity: usize,
}

impl<V: Clone> PreloadCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, id: &str) -> Option<V> {
        self.entries.get(id).cloned()
    }

    /// Insert an entry, returning the id evicted to make room
    ///
    /// Re-inserting an existing id replaces its value in place without
    /// changing its age.
    pub fn put(&mut self, id: &str, value: V) -> Option<String> {
        if let Some(existing) = self.entries.get_mut(id) {
            *existing = value;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        self.entries.insert(id.to_string(), value);
        self.order.push_back(id.to_string());
        evicted
    }

    pub fn remove(&mut self, id: &str) -> Option<V> {
        let value = self.entries.remove(id)?;
        self.order.retain(|k| k != id);
        Some(value)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, evicting oldest entries as needed
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<String> {
        self.capacity = capacity.max(1);
        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            match self.evict_oldest() {
                Some(id) => evicted.push(id),
                None => break,
            }
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Ids oldest-first
    pub fn ids(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let id = self.order.pop_front()?;
        self.entries.remove(&id);
        debug!("Evicted {} from preload cache", id);
        Some(id)
    }
}
