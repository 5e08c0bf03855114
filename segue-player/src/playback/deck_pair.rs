//! The A/B deck pair
//!
//! Exactly two decks exist for the engine's lifetime. One is active, the
//! other standby; during a crossfade both play and the crossfader decides
//! how loud each one is. The pair is shared with the audio thread behind a
//! `std::sync::Mutex`, so every method here is short and non-blocking.

use crate::audio::types::DecodedBuffer;
use crate::playback::crossfade::Crossfade;
use crate::playback::deck::{Deck, DeckId, DeckStatus};
use segue_common::FadeCurve;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub struct DeckPair {
    decks: [Deck; 2],
    active: DeckId,
    crossfade: Option<Crossfade>,
    master_volume: f32,
    normalize: bool,
}

impl DeckPair {
    pub fn new(now: Instant) -> Self {
        Self {
            decks: [Deck::new(DeckId::A, now), Deck::new(DeckId::B, now)],
            active: DeckId::A,
            crossfade: None,
            master_volume: 1.0,
            normalize: false,
        }
    }

    pub fn active(&self) -> DeckId {
        self.active
    }

    pub fn standby(&self) -> DeckId {
        self.active.other()
    }

    pub fn deck(&self, id: DeckId) -> &Deck {
        &self.decks[id.index()]
    }

    pub fn deck_mut(&mut self, id: DeckId) -> &mut Deck {
        &mut self.decks[id.index()]
    }

    pub fn active_deck(&self) -> &Deck {
        self.deck(self.active)
    }

    pub fn active_deck_mut(&mut self) -> &mut Deck {
        let id = self.active;
        self.deck_mut(id)
    }

    /// Put a buffer on the standby deck
    ///
    /// The caller must have finished any running crossfade first, otherwise
    /// the standby deck may still be the audible outgoing side.
    pub fn load_standby(&mut self, track_id: &str, buffer: Arc<DecodedBuffer>, now: Instant) -> DeckId {
        let standby = self.standby();
        self.deck_mut(standby).load(track_id, buffer, now);
        standby
    }

    /// Stop the active deck and start standby at full level immediately
    pub fn hard_cut(&mut self, now: Instant) {
        let outgoing = self.active;
        let incoming = self.standby();
        self.deck_mut(outgoing).stop(now);
        let deck = self.deck_mut(incoming);
        deck.set_volume(1.0, now);
        deck.start(0.0, now);
        self.active = incoming;
        self.crossfade = None;
        debug!("Hard cut {} -> {}", outgoing, incoming);
    }

    /// Start standby and begin fading over to it
    ///
    /// Roles swap immediately: the incoming deck is the active one for
    /// position and transport purposes while the outgoing deck fades out.
    pub fn begin_crossfade(&mut self, duration: Duration, curve: FadeCurve, now: Instant) {
        let outgoing = self.active;
        let incoming = self.standby();
        let deck = self.deck_mut(incoming);
        deck.set_volume(1.0, now);
        deck.start(0.0, now);
        self.crossfade = Some(Crossfade::new(outgoing, duration, curve, now));
        self.active = incoming;
        debug!("Crossfade {} -> {} over {:?}", outgoing, incoming, duration);
    }

    /// Complete a running crossfade now: stop the outgoing deck and leave
    /// the incoming one at full level. Returns the retired deck, if any.
    pub fn finish_crossfade(&mut self, now: Instant) -> Option<DeckId> {
        let fade = self.crossfade.take()?;
        self.deck_mut(fade.from).stop(now);
        debug!("Crossfade finished, deck {} retired", fade.from);
        Some(fade.from)
    }

    /// Fader parameter (0.0 = deck A, 1.0 = deck B)
    pub fn fade_parameter(&self, now: Instant) -> f32 {
        match &self.crossfade {
            Some(fade) => fade.parameter_at(now),
            None => self.active.crossfader_side(),
        }
    }

    /// Effective output gain for a deck, all stages applied
    pub fn deck_gain(&self, id: DeckId, now: Instant) -> f32 {
        let deck = self.deck(id);
        if !deck.is_playing() {
            return 0.0;
        }

        let mut gain = deck.volume_at(now) * self.master_volume;
        if self.normalize {
            if let Some(buffer) = deck.buffer() {
                gain *= buffer.normalization_gain;
            }
        }

        match &self.crossfade {
            Some(fade) => gain * fade.gain_for(id, now),
            None if id == self.active => gain,
            None => 0.0,
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    /// Mix both decks into `out` (interleaved, `channels` wide)
    ///
    /// Mixes additively, so callers pass a zeroed buffer. Source frames are
    /// picked by nearest-sample lookup when the buffer and device rates differ.
    pub fn render(&self, out: &mut [f32], channels: usize, sample_rate: u32, now: Instant) {
        if channels == 0 || sample_rate == 0 {
            return;
        }
        let frames = out.len() / channels;

        for deck in &self.decks {
            let gain = self.deck_gain(deck.id(), now);
            if gain <= 0.0 {
                continue;
            }
            let Some(buffer) = deck.buffer() else {
                continue;
            };

            let step = buffer.sample_rate as f64 / sample_rate as f64;
            let first = buffer.frame_at(deck.position(now)) as f64;
            let available = buffer.frames();

            for frame in 0..frames {
                let src = (first + frame as f64 * step) as usize;
                if src >= available {
                    break;
                }
                for ch in 0..channels {
                    out[frame * channels + ch] += buffer.sample(src, ch) * gain;
                }
            }
        }
    }

    /// Stop both decks and free their buffers
    pub fn release(&mut self, now: Instant) {
        self.crossfade = None;
        for deck in &mut self.decks {
            deck.release(now);
        }
    }

    pub fn status(&self, now: Instant) -> [DeckStatus; 2] {
        [self.decks[0].status(now), self.decks[1].status(now)]
    }
}

/// Lock the shared pair, recovering from poisoning
///
/// A panic while holding the lock cannot leave the pair half-updated in a
/// way that matters more than going silent, so the audio thread keeps going.
pub fn lock_decks(decks: &Mutex<DeckPair>) -> MutexGuard<'_, DeckPair> {
    decks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle the output device uses to pull mixed audio
#[derive(Clone)]
pub struct RenderHandle {
    decks: Arc<Mutex<DeckPair>>,
}

impl RenderHandle {
    pub fn new(decks: Arc<Mutex<DeckPair>>) -> Self {
        Self { decks }
    }

    /// Fill `out` with the current mix; silence when nothing plays
    pub fn render(&self, out: &mut [f32], channels: usize, sample_rate: u32) {
        out.iter_mut().for_each(|s| *s = 0.0);
        lock_decks(&self.decks).render(out, channels, sample_rate, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(level: f32, secs: f64) -> Arc<DecodedBuffer> {
        let frames = (secs * 100.0) as usize;
        Arc::new(DecodedBuffer::new(vec![level; frames], 100, 1))
    }

    #[test]
    fn test_hard_cut_swaps_roles() {
        let now = Instant::now();
        let mut pair = DeckPair::new(now);

        let loaded = pair.load_standby("t1", buffer(0.5, 10.0), now);
        assert_eq!(loaded, DeckId::B);
        pair.hard_cut(now);

        assert_eq!(pair.active(), DeckId::B);
        assert!(pair.active_deck().is_playing());
        assert_eq!(pair.deck_gain(DeckId::B, now), 1.0);
        assert_eq!(pair.deck_gain(DeckId::A, now), 0.0);
        assert_eq!(pair.fade_parameter(now), 1.0);
    }

    #[test]
    fn test_crossfade_then_finish() {
        let now = Instant::now();
        let mut pair = DeckPair::new(now);
        pair.load_standby("t1", buffer(0.5, 10.0), now);
        pair.hard_cut(now);

        pair.load_standby("t2", buffer(0.5, 10.0), now);
        pair.begin_crossfade(Duration::from_secs(2), FadeCurve::Linear, now);
        assert_eq!(pair.active(), DeckId::A);
        assert!(pair.deck(DeckId::A).is_playing());
        assert!(pair.deck(DeckId::B).is_playing());

        let mid = now + Duration::from_secs(1);
        assert!((pair.fade_parameter(mid) - 0.5).abs() < 1e-6);
        assert!((pair.deck_gain(DeckId::A, mid) - 0.5).abs() < 1e-6);
        assert!((pair.deck_gain(DeckId::B, mid) - 0.5).abs() < 1e-6);

        assert_eq!(pair.finish_crossfade(mid), Some(DeckId::B));
        assert!(!pair.deck(DeckId::B).is_playing());
        assert_eq!(pair.fade_parameter(mid), 0.0);
        assert_eq!(pair.finish_crossfade(mid), None);
    }

    #[test]
    fn test_render_mixes_active_deck() {
        let now = Instant::now();
        let mut pair = DeckPair::new(now);
        pair.load_standby("t1", buffer(0.5, 10.0), now);
        pair.hard_cut(now);
        pair.set_master_volume(0.5);

        let mut out = vec![0.0f32; 8];
        pair.render(&mut out, 2, 100, now);
        assert!(out.iter().all(|s| (*s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_gain_stages_multiply() {
        let now = Instant::now();
        let mut pair = DeckPair::new(now);
        let quiet = buffer(0.05, 10.0);
        let boost = quiet.normalization_gain;
        assert!(boost > 1.0);
        pair.load_standby("t1", quiet, now);
        pair.hard_cut(now);

        pair.set_master_volume(0.5);
        assert!((pair.deck_gain(DeckId::B, now) - 0.5).abs() < 1e-6);

        pair.set_normalize(true);
        assert!((pair.deck_gain(DeckId::B, now) - 0.5 * boost).abs() < 1e-6);

        pair.set_master_volume(3.0);
        assert!((pair.deck_gain(DeckId::B, now) - boost).abs() < 1e-6);
    }

    #[test]
    fn test_render_past_end_is_silent() {
        let now = Instant::now();
        let mut pair = DeckPair::new(now);
        pair.load_standby("t1", buffer(0.5, 1.0), now);
        pair.hard_cut(now);

        let mut out = vec![0.0f32; 4];
        pair.render(&mut out, 1, 100, now + Duration::from_secs(2));
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_release_frees_both() {
        let now = Instant::now();
        let mut pair = DeckPair::new(now);
        pair.load_standby("t1", buffer(0.5, 1.0), now);
        pair.hard_cut(now);
        pair.release(now);

        assert!(!pair.deck(DeckId::A).is_loaded());
        assert!(!pair.deck(DeckId::B).is_loaded());
    }
}
