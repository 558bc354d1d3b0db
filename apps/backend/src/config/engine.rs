//! Search-engine process configuration.

use std::env;
use std::time::Duration;

/// How the engine child process is launched and how long we wait on it.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Budget for the `uci`/`uciok` handshake on lazy start.
    pub init_timeout: Duration,
    /// Slack added on top of the requested movetime before a search is
    /// declared timed out.
    pub search_margin: Duration,
}

impl EngineConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            init_timeout: Duration::from_secs(5),
            search_margin: Duration::from_secs(5),
        }
    }

    /// Reads `CHESS_ENGINE_CMD` (default `stockfish`); extra whitespace-
    /// separated tokens become arguments.
    pub fn from_env() -> Self {
        let raw = env::var("CHESS_ENGINE_CMD").unwrap_or_else(|_| "stockfish".to_string());
        let mut parts = raw.split_whitespace().map(str::to_string);
        let command = parts.next().unwrap_or_else(|| "stockfish".to_string());
        Self::new(command, parts.collect())
    }
}
