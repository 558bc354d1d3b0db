//! Bot move generation: engine search with a random-legal fallback.

use std::sync::Arc;
use std::time::Duration;

use rand::prelude::*;
use tracing::warn;

use crate::ai::profiles::BotProfile;
use crate::domain::board::{BoardState, MoveOutcome};
use crate::engine::MoveSearch;
use crate::errors::domain::{DomainError, InfraErrorKind, RuleKind};

/// Search time handed to the engine per bot move.
const SEARCH_MOVETIME: Duration = Duration::from_millis(1000);

pub struct BotMoveGenerator {
    engine: Arc<dyn MoveSearch>,
}

impl BotMoveGenerator {
    pub fn new(engine: Arc<dyn MoveSearch>) -> Self {
        Self { engine }
    }

    /// Produce one legal move for the side to move on `board`.
    ///
    /// Engine failures (unavailable, timeout, or an illegal answer) degrade
    /// to a uniformly random legal move; they are never surfaced to callers.
    /// Only a position with no legal move at all fails, and a terminal
    /// position would already have ended the game before we got here.
    pub async fn generate(
        &self,
        board: &mut BoardState,
        profile: &BotProfile,
    ) -> Result<MoveOutcome, DomainError> {
        tokio::time::sleep(profile.think_delay).await;

        let fen = board.fen();
        match self
            .engine
            .best_move(&fen, profile.skill_level, SEARCH_MOVETIME)
            .await
        {
            Ok(uci) => match board.apply_uci(&uci) {
                Ok(outcome) => return Ok(outcome),
                Err(err) => warn!(
                    bot = profile.id,
                    uci = %uci,
                    error = %err,
                    "engine produced an unplayable move, falling back to random"
                ),
            },
            Err(err) => warn!(
                bot = profile.id,
                error = %err,
                "engine search failed, falling back to random"
            ),
        }

        let candidates = board.legal_moves_san();
        let Some(san) = candidates.choose(&mut rand::rng()) else {
            return Err(DomainError::rule(
                RuleKind::NoLegalMoves,
                "no legal moves available",
            ));
        };
        board.apply_san(san).map_err(|err| {
            DomainError::infra(
                InfraErrorKind::Other("board".to_string()),
                format!("fallback move rejected: {err}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::ai::profiles::BotDifficulty;
    use crate::engine::EngineError;

    struct FailingSearch;

    #[async_trait]
    impl MoveSearch for FailingSearch {
        async fn best_move(
            &self,
            _fen: &str,
            _skill_level: u8,
            _movetime: Duration,
        ) -> Result<String, EngineError> {
            Err(EngineError::Timeout)
        }
    }

    struct ScriptedSearch(&'static str);

    #[async_trait]
    impl MoveSearch for ScriptedSearch {
        async fn best_move(
            &self,
            _fen: &str,
            _skill_level: u8,
            _movetime: Duration,
        ) -> Result<String, EngineError> {
            Ok(self.0.to_string())
        }
    }

    fn instant_profile() -> BotProfile {
        BotProfile {
            id: "testbot",
            name: "Test Bot",
            difficulty: BotDifficulty::Beginner,
            elo_min: 0,
            elo_max: 1,
            skill_level: 0,
            think_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn engine_answer_is_applied() {
        let generator = BotMoveGenerator::new(Arc::new(ScriptedSearch("e2e4")));
        let mut board = BoardState::new();
        let outcome = generator
            .generate(&mut board, &instant_profile())
            .await
            .unwrap();
        assert_eq!(outcome.san, "e4");
    }

    #[tokio::test]
    async fn engine_failure_falls_back_to_a_legal_move() {
        let generator = BotMoveGenerator::new(Arc::new(FailingSearch));
        let mut board = BoardState::new();
        let legal_before = board.legal_moves_san();

        let outcome = generator
            .generate(&mut board, &instant_profile())
            .await
            .unwrap();
        assert!(legal_before.contains(&outcome.san.trim_end_matches(['+', '#']).to_string()));
    }

    #[tokio::test]
    async fn illegal_engine_answer_falls_back() {
        let generator = BotMoveGenerator::new(Arc::new(ScriptedSearch("e2e5")));
        let mut board = BoardState::new();
        let outcome = generator
            .generate(&mut board, &instant_profile())
            .await
            .unwrap();
        // Still a playable reply, not an error.
        assert!(!outcome.san.is_empty());
    }

    #[tokio::test]
    async fn terminal_position_reports_no_legal_moves() {
        let generator = BotMoveGenerator::new(Arc::new(FailingSearch));
        // Fool's mate final position: white to move, checkmated.
        let mut board = BoardState::new();
        for mv in ["f3", "e5", "g4", "Qh4#"] {
            board.apply_san(mv).unwrap();
        }

        let err = generator
            .generate(&mut board, &instant_profile())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Rule(RuleKind::NoLegalMoves, _)));
    }
}
