//! Settings file resolution and loading
//!
//! Resolution follows a fixed priority order:
//! 1. Explicit path (command-line argument)
//! 2. `SEGUE_CONFIG` environment variable
//! 3. `<user config dir>/segue/config.toml`
//! 4. Built-in defaults
//!
//! An explicitly named file that cannot be read is an error. A missing file
//! at the default location is not; defaults are used instead.

use crate::{Error, PlayerSettings, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a settings file
pub const CONFIG_ENV_VAR: &str = "SEGUE_CONFIG";

/// Where the settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserConfig(PathBuf),
    Defaults,
}

/// Default settings path for the platform (`~/.config/segue/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("segue").join("config.toml"))
}

/// Decide which settings file to use, without reading it
pub fn resolve_settings_source(cli_arg: Option<&Path>) -> SettingsSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return SettingsSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return SettingsSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: User config file, only if it exists
    if let Some(path) = default_config_path() {
        if path.exists() {
            return SettingsSource::UserConfig(path);
        }
    }

    // Priority 4: Built-in defaults
    SettingsSource::Defaults
}

/// Parse and validate a settings file
pub fn load_settings_file(path: &Path) -> Result<PlayerSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read settings file {}: {}", path.display(), e))
    })?;
    let settings: PlayerSettings = toml::from_str(&content)?;
    settings.validate()
}

/// Resolve and load settings
pub fn load_settings(cli_arg: Option<&Path>) -> Result<(PlayerSettings, SettingsSource)> {
    let source = resolve_settings_source(cli_arg);
    let settings = match &source {
        SettingsSource::CommandLine(path)
        | SettingsSource::Environment(path)
        | SettingsSource::UserConfig(path) => {
            info!("Loading settings from {}", path.display());
            load_settings_file(path)?
        }
        SettingsSource::Defaults => {
            debug!("No settings file found, using defaults");
            PlayerSettings::default()
        }
    };
    Ok((settings, source))
}
