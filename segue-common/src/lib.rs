//! # Segue Common Library
//!
//! Shared code for the segue playback engine and its collaborators:
//! - Track model and quality tiers
//! - Player settings and settings-file loading
//! - Event types (PlayerEvent enum) and the EventBus
//! - Fade curve definitions and calculations

pub mod config;
pub mod error;
pub mod events;
pub mod fade_curves;
pub mod settings;
pub mod track;

pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
pub use settings::{AudioQuality, PlayerSettings};
pub use track::{AudioUrls, QualityTier, Track};
