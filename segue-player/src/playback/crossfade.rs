//! Crossfade timing
//!
//! A crossfade moves a single fader parameter from the outgoing deck's side
//! to the incoming deck's side over a fixed duration. Per-deck gains come
//! from the configured fade curve.

use crate::playback::deck::DeckId;
use segue_common::FadeCurve;
use std::time::Duration;
use tokio::time::Instant;

/// A running transition between the two decks
#[derive(Debug, Clone, Copy)]
pub struct Crossfade {
    pub from: DeckId,
    pub to: DeckId,
    pub started_at: Instant,
    pub duration: Duration,
    pub curve: FadeCurve,
}

impl Crossfade {
    pub fn new(from: DeckId, duration: Duration, curve: FadeCurve, now: Instant) -> Self {
        Self {
            from,
            to: from.other(),
            started_at: now,
            duration,
            curve,
        }
    }

    /// Fraction of the transition completed (0.0 - 1.0)
    pub fn progress_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Fader parameter: 0.0 is deck A, 1.0 is deck B
    pub fn parameter_at(&self, now: Instant) -> f32 {
        let from = self.from.crossfader_side();
        let to = self.to.crossfader_side();
        from + (to - from) * self.progress_at(now)
    }

    /// Curve gain for a deck at `now`
    pub fn gain_for(&self, deck: DeckId, now: Instant) -> f32 {
        let (gain_a, gain_b) = self.curve.crossfader_gains(self.parameter_at(now));
        match deck {
            DeckId::A => gain_a,
            DeckId::B => gain_b,
        }
    }
}
