//! Common error types for segue

use thiserror::Error;

/// Common result type for segue operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the engine and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Settings file could not be parsed
    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
