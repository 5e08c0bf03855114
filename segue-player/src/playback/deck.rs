//! Playback decks
//!
//! A deck is one playback slot: it holds at most one decoded buffer, knows
//! where in that buffer it is, and carries its own volume. Position is
//! derived from the clock rather than accumulated, so a deck never drifts
//! and can be queried from any thread.

use crate::audio::types::DecodedBuffer;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Deck identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeckId {
    A,
    B,
}

impl DeckId {
    pub fn other(self) -> DeckId {
        match self {
            DeckId::A => DeckId::B,
            DeckId::B => DeckId::A,
        }
    }

    /// Crossfader position at which this deck is fully audible
    pub fn crossfader_side(self) -> f32 {
        match self {
            DeckId::A => 0.0,
            DeckId::B => 1.0,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            DeckId::A => 0,
            DeckId::B => 1,
        }
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckId::A => write!(f, "A"),
            DeckId::B => write!(f, "B"),
        }
    }
}

/// Linear gain ramp from one level to another
#[derive(Debug, Clone, Copy)]
pub struct GainRamp {
    from: f32,
    to: f32,
    started_at: Instant,
    duration: Duration,
}

impl GainRamp {
    /// A constant level
    pub fn fixed(level: f32, now: Instant) -> Self {
        Self {
            from: level,
            to: level,
            started_at: now,
            duration: Duration::ZERO,
        }
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f32();
        let t = (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }
}

/// Snapshot of one deck for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStatus {
    pub id: DeckId,
    pub track_id: Option<String>,
    pub playing: bool,
    pub position: f64,
    pub volume: f32,
}

/// One playback slot
#[derive(Debug)]
pub struct Deck {
    id: DeckId,
    buffer: Option<Arc<DecodedBuffer>>,
    track_id: Option<String>,
    playing: bool,
    /// When the deck last started
    started_at: Instant,
    /// Buffer position at `started_at`, or the held position while stopped
    start_offset: f64,
    volume: GainRamp,
}

impl Deck {
    pub fn new(id: DeckId, now: Instant) -> Self {
        Self {
            id,
            buffer: None,
            track_id: None,
            playing: false,
            started_at: now,
            start_offset: 0.0,
            volume: GainRamp::fixed(1.0, now),
        }
    }

    pub fn id(&self) -> DeckId {
        self.id
    }

    /// Replace the deck's contents. Any playback on this deck stops.
    pub fn load(&mut self, track_id: &str, buffer: Arc<DecodedBuffer>, now: Instant) {
        self.buffer = Some(buffer);
        self.track_id = Some(track_id.to_string());
        self.playing = false;
        self.start_offset = 0.0;
        self.volume = GainRamp::fixed(1.0, now);
    }

    /// Start (or restart) playback at `offset` seconds
    pub fn start(&mut self, offset: f64, now: Instant) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.start_offset = offset.clamp(0.0, self.duration());
        self.started_at = now;
        self.playing = self.buffer.is_some();
    }

    /// Stop playback, holding the current position
    pub fn stop(&mut self, now: Instant) {
        if self.playing {
            self.start_offset = self.position(now);
            self.playing = false;
        }
    }

    /// Drop the buffer and reset to an empty slot
    pub fn release(&mut self, now: Instant) {
        self.buffer = None;
        self.track_id = None;
        self.playing = false;
        self.start_offset = 0.0;
        self.volume = GainRamp::fixed(1.0, now);
    }

    /// Playback position in seconds, clamped to the buffer duration
    pub fn position(&self, now: Instant) -> f64 {
        if !self.playing {
            return self.start_offset;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        (self.start_offset + elapsed).min(self.duration())
    }

    pub fn duration(&self) -> f64 {
        self.buffer.as_ref().map(|b| b.duration_secs()).unwrap_or(0.0)
    }

    pub fn set_volume(&mut self, level: f32, now: Instant) {
        self.volume = GainRamp::fixed(level.clamp(0.0, 1.0), now);
    }

    /// Ramp volume from its current value to `target` over `over`
    pub fn ramp_volume(&mut self, target: f32, over: Duration, now: Instant) {
        self.volume = GainRamp {
            from: self.volume.value_at(now),
            to: target.clamp(0.0, 1.0),
            started_at: now,
            duration: over,
        };
    }

    pub fn volume_at(&self, now: Instant) -> f32 {
        self.volume.value_at(now)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    pub fn buffer(&self) -> Option<&Arc<DecodedBuffer>> {
        self.buffer.as_ref()
    }

    pub fn status(&self, now: Instant) -> DeckStatus {
        DeckStatus {
            id: self.id,
            track_id: self.track_id.clone(),
            playing: self.playing,
            position: self.position(now),
            volume: self.volume_at(now),
        }
    }
}
