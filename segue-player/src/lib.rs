//! # Segue Player Library (segue-player)
//!
//! Continuous-playback engine: two decks with crossfading, gapless
//! auto-advance, a playback queue, and a bounded preload cache fed by a
//! background scheduler.
//!
//! **Architecture:** fetch + decode (reqwest + symphonia) into RAM, mix both
//! decks in the output callback (cpal), drive transport from async tasks
//! (tokio).

pub mod audio;
pub mod error;
pub mod playback;

pub use error::{Error, LoadError, LoadErrorKind, Result};
pub use playback::PlaybackEngine;
