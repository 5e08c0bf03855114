//! Error types for segue-player
//!
//! Load failures carry a closed kind so retry decisions and UI reporting
//! never depend on message text.

use segue_common::events::ErrorKind;
use thiserror::Error;

/// Classification of a failed load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// Connection failure, timeout, or server-side error; worth retrying
    Network,
    /// Bytes arrived but could not be decoded
    UnsupportedFormat,
    /// The URL does not name a resource
    NotFound,
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadErrorKind::Network => write!(f, "network"),
            LoadErrorKind::UnsupportedFormat => write!(f, "unsupported format"),
            LoadErrorKind::NotFound => write!(f, "not found"),
        }
    }
}

impl From<LoadErrorKind> for ErrorKind {
    fn from(kind: LoadErrorKind) -> Self {
        match kind {
            LoadErrorKind::Network => ErrorKind::Network,
            LoadErrorKind::UnsupportedFormat => ErrorKind::UnsupportedFormat,
            LoadErrorKind::NotFound => ErrorKind::NotFound,
        }
    }
}

/// A failed fetch-and-decode of one URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub message: String,
}

impl LoadError {
    pub fn network(message: impl Into<String>) -> Self {
        Self { kind: LoadErrorKind::Network, message: message.into() }
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self { kind: LoadErrorKind::UnsupportedFormat, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { kind: LoadErrorKind::NotFound, message: message.into() }
    }

    /// Only transport-level failures are retried
    pub fn is_retryable(&self) -> bool {
        self.kind == LoadErrorKind::Network
    }
}

/// Main error type for segue-player
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch or decode failure
    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    /// Quality selection found no usable URL
    #[error("No audio URL available for track {track_id}")]
    NoAudioUrlAvailable { track_id: String },

    /// Background prefetch failed (never surfaced to the UI)
    #[error("Preload of track {track_id} failed: {source}")]
    PreloadFailed {
        track_id: String,
        #[source]
        source: LoadError,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Errors from the shared library
    #[error(transparent)]
    Common(#[from] segue_common::Error),
}

impl Error {
    /// Category reported in `PlayerEvent::Error`, if this error is one the
    /// UI should see
    pub fn event_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Load(e) => Some(e.kind.into()),
            Error::NoAudioUrlAvailable { .. } => Some(ErrorKind::NoAudioUrl),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Load(e) if e.is_retryable())
    }
}

/// Convenience Result type using segue-player Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_is_retryable() {
        assert!(LoadError::network("connection reset").is_retryable());
        assert!(!LoadError::not_found("404").is_retryable());
        assert!(!LoadError::unsupported_format("bad header").is_retryable());

        assert!(Error::from(LoadError::network("timeout")).is_retryable());
        assert!(!Error::NoAudioUrlAvailable { track_id: "t".into() }.is_retryable());
    }

    #[test]
    fn test_event_kind_mapping() {
        assert_eq!(
            Error::from(LoadError::unsupported_format("x")).event_kind(),
            Some(ErrorKind::UnsupportedFormat)
        );
        assert_eq!(
            Error::NoAudioUrlAvailable { track_id: "t".into() }.event_kind(),
            Some(ErrorKind::NoAudioUrl)
        );
        assert_eq!(Error::InvalidState("x".into()).event_kind(), None);
    }
}
