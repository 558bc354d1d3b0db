//! Engine bridge tests against a scripted fake engine process.
//!
//! The fake speaks just enough of the line protocol (`uci`/`uciok`,
//! `go`/`bestmove`, `quit`) to exercise the handshake, search, timeout, and
//! recovery paths without a real search engine installed.

use std::time::Duration;

use backend::domain::BoardState;
use backend::engine::EngineError;
use backend::{EngineConfig, EngineHandle, MoveSearch};
use serial_test::serial;

const FAKE_ENGINE: &str = r#"
while read line; do
  case "$line" in
    uci) echo uciok ;;
    go*) echo "info depth 1 score cp 20"; echo "bestmove e2e4 ponder e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Completes the handshake but never answers a search.
const MUTE_ENGINE: &str = r#"
while read line; do
  case "$line" in
    uci) echo uciok ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Never acknowledges the handshake at all.
const DEAF_ENGINE: &str = "while read line; do :; done";

fn sh_engine(script: &str) -> EngineConfig {
    let mut config = EngineConfig::new("sh", vec!["-c".to_string(), script.to_string()]);
    config.init_timeout = Duration::from_millis(2000);
    config.search_margin = Duration::from_millis(500);
    config
}

#[tokio::test]
#[serial]
async fn scripted_engine_answers_search() {
    let engine = EngineHandle::spawn(sh_engine(FAKE_ENGINE));

    let mv = engine
        .best_move(BoardState::START_FEN, 10, Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(mv, "e2e4");

    engine.shutdown().await;
}

#[tokio::test]
#[serial]
async fn searches_are_served_in_submission_order() {
    let engine = EngineHandle::spawn(sh_engine(FAKE_ENGINE));

    for _ in 0..3 {
        let mv = engine
            .best_move(BoardState::START_FEN, 5, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(mv, "e2e4");
    }

    engine.shutdown().await;
}

#[tokio::test]
#[serial]
async fn shutdown_is_idempotent_and_engine_restarts_lazily() {
    let engine = EngineHandle::spawn(sh_engine(FAKE_ENGINE));

    engine.shutdown().await;
    engine.shutdown().await;

    // A search after quit spawns a fresh process.
    let mv = engine
        .best_move(BoardState::START_FEN, 10, Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(mv, "e2e4");

    engine.shutdown().await;
}

#[tokio::test]
#[serial]
async fn silent_search_times_out_without_wedging_the_bridge() {
    let engine = EngineHandle::spawn(sh_engine(MUTE_ENGINE));

    let err = engine
        .best_move(BoardState::START_FEN, 10, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Timeout));

    // The broken process was dropped; the next request gets a fresh one and
    // fails the same way instead of hanging.
    let err = engine
        .best_move(BoardState::START_FEN, 10, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Timeout));

    engine.shutdown().await;
}

#[tokio::test]
#[serial]
async fn handshake_timeout_reports_unavailable() {
    let mut config = sh_engine(DEAF_ENGINE);
    config.init_timeout = Duration::from_millis(300);
    let engine = EngineHandle::spawn(config);

    let err = engine
        .best_move(BoardState::START_FEN, 10, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unavailable(_)));

    engine.shutdown().await;
}

#[tokio::test]
#[serial]
async fn missing_binary_reports_unavailable() {
    let config = EngineConfig::new("definitely-not-a-chess-engine", vec![]);
    let engine = EngineHandle::spawn(config);

    let err = engine
        .best_move(BoardState::START_FEN, 10, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unavailable(_)));
}
