//! Bridge to the external UCI search engine.
//!
//! One engine process per server instance, owned by a dedicated task.
//! Requests arrive over an mpsc channel, each carrying its own oneshot
//! reply handle, and are served strictly one at a time - concurrent
//! bot-move requests across games queue behind each other. The process is
//! started lazily on first search and dropped on any failure so the next
//! demand restarts it.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::engine::EngineConfig;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    #[error("engine search timed out")]
    Timeout,
}

/// Seam between the bot move generator and the engine process, so tests can
/// substitute a failing or scripted searcher.
#[async_trait]
pub trait MoveSearch: Send + Sync {
    /// Best move for `fen` at the given skill level, as UCI from/to text
    /// (four squares plus an optional promotion letter).
    async fn best_move(
        &self,
        fen: &str,
        skill_level: u8,
        movetime: Duration,
    ) -> Result<String, EngineError>;
}

enum EngineCommand {
    Search {
        fen: String,
        skill_level: u8,
        movetime: Duration,
        reply: oneshot::Sender<Result<String, EngineError>>,
    },
    Shutdown,
}

/// Cloneable handle onto the engine task.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Start the engine task. The child process itself is not spawned until
    /// the first search arrives.
    pub fn spawn(config: EngineConfig) -> Self {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(run_engine(rx, config));
        Self { tx }
    }

    /// Ask the engine to quit. Idempotent; a later search lazily restarts it.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(EngineCommand::Shutdown).await;
    }
}

#[async_trait]
impl MoveSearch for EngineHandle {
    async fn best_move(
        &self,
        fen: &str,
        skill_level: u8,
        movetime: Duration,
    ) -> Result<String, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineCommand::Search {
                fen: fen.to_string(),
                skill_level,
                movetime,
                reply,
            })
            .await
            .map_err(|_| EngineError::Unavailable("engine task stopped".to_string()))?;
        rx.await
            .map_err(|_| EngineError::Unavailable("engine request dropped".to_string()))?
    }
}

async fn run_engine(mut rx: mpsc::Receiver<EngineCommand>, config: EngineConfig) {
    let mut process: Option<EngineProcess> = None;

    while let Some(cmd) = rx.recv().await {
        match cmd {
            EngineCommand::Search {
                fen,
                skill_level,
                movetime,
                reply,
            } => {
                if process.is_none() {
                    match EngineProcess::start(&config).await {
                        Ok(started) => process = Some(started),
                        Err(err) => {
                            warn!(error = %err, command = %config.command, "engine start failed");
                            let _ = reply.send(Err(err));
                            continue;
                        }
                    }
                }
                let Some(engine) = process.as_mut() else {
                    continue;
                };

                let result = engine
                    .search(&fen, skill_level, movetime, config.search_margin)
                    .await;
                if let Err(err) = &result {
                    warn!(error = %err, "engine search failed, dropping process");
                    if let Some(mut dead) = process.take() {
                        dead.kill();
                    }
                }
                let _ = reply.send(result);
            }
            EngineCommand::Shutdown => {
                if let Some(mut engine) = process.take() {
                    engine.quit().await;
                }
            }
        }
    }

    if let Some(mut engine) = process.take() {
        engine.quit().await;
    }
}

struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl EngineProcess {
    async fn start(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to spawn {}: {e}", config.command))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdin not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdout not piped".to_string()))?;

        let mut engine = Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        };

        engine.send("uci").await?;
        match timeout(config.init_timeout, engine.wait_for_uciok()).await {
            Ok(Ok(())) => {
                info!(command = %config.command, "engine ready");
                Ok(engine)
            }
            Ok(Err(err)) => {
                engine.kill();
                Err(err)
            }
            Err(_) => {
                engine.kill();
                Err(EngineError::Unavailable(
                    "engine init handshake timed out".to_string(),
                ))
            }
        }
    }

    async fn wait_for_uciok(&mut self) -> Result<(), EngineError> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) if line.trim() == "uciok" => return Ok(()),
                Ok(Some(_)) => continue,
                Ok(None) => {
                    return Err(EngineError::Unavailable(
                        "engine exited before uciok".to_string(),
                    ))
                }
                Err(e) => return Err(EngineError::Unavailable(format!("engine read failed: {e}"))),
            }
        }
    }

    async fn search(
        &mut self,
        fen: &str,
        skill_level: u8,
        movetime: Duration,
        margin: Duration,
    ) -> Result<String, EngineError> {
        self.send(&format!("setoption name Skill Level value {skill_level}"))
            .await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go movetime {}", movetime.as_millis()))
            .await?;

        match timeout(movetime + margin, self.wait_for_bestmove()).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout),
        }
    }

    async fn wait_for_bestmove(&mut self) -> Result<String, EngineError> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(mv) = parse_bestmove(&line) {
                        debug!(best_move = mv, "engine answered");
                        return Ok(mv.to_string());
                    }
                }
                Ok(None) => {
                    return Err(EngineError::Unavailable(
                        "engine exited during search".to_string(),
                    ))
                }
                Err(e) => return Err(EngineError::Unavailable(format!("engine read failed: {e}"))),
            }
        }
    }

    async fn send(&mut self, line: &str) -> Result<(), EngineError> {
        let write = async {
            self.stdin.write_all(line.as_bytes()).await?;
            self.stdin.write_all(b"\n").await?;
            self.stdin.flush().await
        };
        write
            .await
            .map_err(|e| EngineError::Unavailable(format!("engine write failed: {e}")))
    }

    async fn quit(&mut self) {
        let _ = self.send("quit").await;
        if timeout(Duration::from_millis(500), self.child.wait())
            .await
            .is_err()
        {
            self.kill();
        }
    }

    fn kill(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// Extract the move from a `bestmove <move> [ponder ...]` line.
fn parse_bestmove(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("bestmove")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    rest.split_whitespace().next()
}
