//! Settings file loading tests
//!
//! Uses serial_test to prevent races on the SEGUE_CONFIG environment variable.

use segue_common::config::{load_settings, load_settings_file, SettingsSource, CONFIG_ENV_VAR};
use segue_common::{AudioQuality, Error, FadeCurve};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn settings_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_settings_file() {
    let file = settings_file(
        r#"
crossfade = 6.5
audioQuality = "high"
normalizeVolume = true
eqLow = 1.5
eqMid = 0.0
eqHigh = -3.0
gaplessPlayback = false
preloadAhead = 4
maxCacheSize = 8
crossfadeCurve = "s_curve"
"#,
    );

    let settings = load_settings_file(file.path()).unwrap();
    assert_eq!(settings.crossfade, 6.5);
    assert_eq!(settings.audio_quality, AudioQuality::High);
    assert!(settings.normalize_volume);
    assert_eq!(settings.eq_high, -3.0);
    assert!(!settings.gapless_playback);
    assert_eq!(settings.preload_ahead, 4);
    assert_eq!(settings.max_cache_size, 8);
    assert_eq!(settings.crossfade_curve, FadeCurve::SCurve);
}

#[test]
fn test_partial_settings_file_keeps_defaults() {
    let file = settings_file("crossfade = 0\n");

    let settings = load_settings_file(file.path()).unwrap();
    assert_eq!(settings.crossfade, 0.0);
    assert_eq!(settings.preload_ahead, 2);
    assert!(settings.gapless_playback);
}

#[test]
fn test_malformed_settings_file() {
    let file = settings_file("crossfade = \"loud\"\n");
    assert!(matches!(
        load_settings_file(file.path()),
        Err(Error::SettingsParse(_))
    ));
}

#[test]
fn test_invalid_values_rejected() {
    let file = settings_file("maxCacheSize = 0\n");
    assert!(matches!(load_settings_file(file.path()), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    let file = settings_file("preloadAhead = 7\n");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let (settings, source) = load_settings(None).unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(settings.preload_ahead, 7);
    assert_eq!(source, SettingsSource::Environment(file.path().to_path_buf()));
}

#[test]
#[serial]
fn test_cli_argument_overrides_env_var() {
    let env_file = settings_file("preloadAhead = 7\n");
    let cli_file = settings_file("preloadAhead = 3\n");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let (settings, source) = load_settings(Some(cli_file.path())).unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(settings.preload_ahead, 3);
    assert!(matches!(source, SettingsSource::CommandLine(_)));
}

#[test]
#[serial]
fn test_env_var_pointing_at_missing_file_is_error() {
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/segue-config.toml");

    let result = load_settings(None);

    env::remove_var(CONFIG_ENV_VAR);
    assert!(result.is_err());
}
