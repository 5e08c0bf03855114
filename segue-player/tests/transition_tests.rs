//! Deck pair transition tests: crossfade timing, hard cuts, and transport
//! commands that arrive mid-transition.

mod helpers;

use helpers::{engine_with, track, MockLoader};
use segue_common::events::TransportPhase;
use segue_common::PlayerSettings;
use segue_player::playback::DeckId;
use std::time::Duration;
use tokio::time::sleep;

fn crossfade_settings(seconds: f64) -> PlayerSettings {
    PlayerSettings {
        crossfade: seconds,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_play_is_hard_cut() {
    let engine = engine_with(crossfade_settings(3.0), MockLoader::new());

    engine.play(track("a")).await.unwrap();

    assert_eq!(engine.phase().await, TransportPhase::Playing);
    assert_eq!(engine.active_deck(), DeckId::B);
    let status = engine.deck_status();
    assert!(!status[0].playing);
    assert!(status[1].playing);
    assert_eq!(status[1].track_id.as_deref(), Some("a"));
}

#[tokio::test(start_paused = true)]
async fn test_crossfade_midpoint_and_retirement() {
    let engine = engine_with(crossfade_settings(3.0), MockLoader::new());

    engine.play(track("a")).await.unwrap();
    let outgoing = engine.active_deck();
    sleep(Duration::from_secs(1)).await;

    engine.play(track("b")).await.unwrap();
    let incoming = engine.active_deck();
    assert_eq!(incoming, outgoing.other());
    assert_eq!(engine.phase().await, TransportPhase::Crossfading);

    let start = engine.fade_parameter();
    assert!((start - outgoing.crossfader_side()).abs() < 1e-3);

    sleep(Duration::from_millis(1500)).await;
    let mid = engine.fade_parameter();
    assert!((mid - 0.5).abs() < 0.01, "fade parameter at midpoint was {}", mid);
    let status = engine.deck_status();
    assert!(status[0].playing && status[1].playing);

    // 3.2s after the second play: outgoing deck retired
    sleep(Duration::from_millis(1700)).await;
    let status = engine.deck_status();
    let outgoing_status = status.iter().find(|s| s.id == outgoing).unwrap();
    assert!(!outgoing_status.playing);
    assert_eq!(engine.phase().await, TransportPhase::Playing);
    assert_eq!(engine.fade_parameter(), incoming.crossfader_side());
    assert_eq!(engine.current_track().await.unwrap().id, "b");
}

#[tokio::test(start_paused = true)]
async fn test_fade_parameter_monotonic_over_transition() {
    let engine = engine_with(crossfade_settings(2.0), MockLoader::new());
    engine.play(track("a")).await.unwrap();
    engine.play(track("b")).await.unwrap();

    let mut samples = vec![engine.fade_parameter()];
    for _ in 0..4 {
        sleep(Duration::from_millis(500)).await;
        samples.push(engine.fade_parameter());
    }

    assert!(samples.iter().all(|p| (0.0..=1.0).contains(p)));
    // a went to deck B, so b fades in on deck A: the parameter falls
    assert!(samples.windows(2).all(|w| w[0] >= w[1]), "{:?}", samples);
}

#[tokio::test(start_paused = true)]
async fn test_zero_crossfade_hard_cuts() {
    let engine = engine_with(crossfade_settings(0.0), MockLoader::new());

    engine.play(track("a")).await.unwrap();
    sleep(Duration::from_secs(5)).await;
    engine.play(track("b")).await.unwrap();

    assert_eq!(engine.phase().await, TransportPhase::Playing);
    let status = engine.deck_status();
    assert_eq!(status.iter().filter(|s| s.playing).count(), 1);
    assert!(engine.position().await < 1e-6);
}

#[tokio::test(start_paused = true)]
async fn test_pause_during_crossfade_snaps_to_new_deck() {
    let engine = engine_with(crossfade_settings(3.0), MockLoader::new());
    engine.play(track("a")).await.unwrap();
    engine.play(track("b")).await.unwrap();
    let incoming = engine.active_deck();

    sleep(Duration::from_secs(1)).await;
    engine.toggle_play().await.unwrap();

    assert_eq!(engine.phase().await, TransportPhase::Paused);
    assert_eq!(engine.fade_parameter(), incoming.crossfader_side());
    assert!(engine.deck_status().iter().all(|s| !s.playing));
    assert!((engine.position().await - 1.0).abs() < 1e-3);

    // The scheduled completion must not disturb the paused state
    sleep(Duration::from_secs(5)).await;
    assert_eq!(engine.phase().await, TransportPhase::Paused);
}

#[tokio::test(start_paused = true)]
async fn test_seek_during_crossfade_applies_to_new_track() {
    let engine = engine_with(crossfade_settings(3.0), MockLoader::new());
    engine.play(track("a")).await.unwrap();
    engine.play(track("b")).await.unwrap();
    sleep(Duration::from_secs(1)).await;

    engine.seek(60.0).await.unwrap();

    assert_eq!(engine.phase().await, TransportPhase::Playing);
    assert!((engine.position().await - 60.0).abs() < 1e-3);
    assert_eq!(engine.deck_status().iter().filter(|s| s.playing).count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_play_during_crossfade_starts_fresh_transition() {
    let engine = engine_with(crossfade_settings(3.0), MockLoader::new());
    engine.play(track("a")).await.unwrap();
    engine.play(track("b")).await.unwrap();
    let b_deck = engine.active_deck();
    sleep(Duration::from_secs(1)).await;

    engine.play(track("c")).await.unwrap();

    assert_eq!(engine.current_track().await.unwrap().id, "c");
    assert_eq!(engine.phase().await, TransportPhase::Crossfading);
    assert_eq!(engine.active_deck(), b_deck.other());

    // The first transition's completion (due at 3.1s) must not cut this one short
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(engine.phase().await, TransportPhase::Crossfading);

    sleep(Duration::from_millis(700)).await;
    assert_eq!(engine.phase().await, TransportPhase::Playing);
    let status = engine.deck_status();
    let b_status = status.iter().find(|s| s.id == b_deck).unwrap();
    assert!(!b_status.playing);
}
