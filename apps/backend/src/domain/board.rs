//! Position handling on top of the chess rules library.
//!
//! `BoardState` is the only place that talks to shakmaty. It exposes what the
//! session core needs: FEN in/out, SAN and UCI move application, legal move
//! listing, and terminal-state flags.

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};
use thiserror::Error;

use crate::domain::game::Color;

/// Errors raised while parsing or applying moves.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid move text: {0}")]
    InvalidMove(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// The result of applying one ply.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// SAN with check/mate suffix, e.g. "Nf3", "Qh4#".
    pub san: String,
    /// Position after the move.
    pub fen_after: String,
    /// Side to move after the move.
    pub turn_after: Color,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    /// Stalemate, insufficient material, or the 50-move rule.
    pub is_draw: bool,
}

#[derive(Debug, Clone)]
pub struct BoardState {
    position: Chess,
}

impl BoardState {
    pub const START_FEN: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    pub fn new() -> Self {
        Self {
            position: Chess::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| BoardError::InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| BoardError::InvalidFen(format!("{e}")))?;
        Ok(Self { position })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.position.turn().into()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    /// Apply a move given in SAN ("Nf3", with or without check suffix).
    pub fn apply_san(&mut self, san: &str) -> Result<MoveOutcome, BoardError> {
        let parsed: SanPlus = san
            .parse()
            .map_err(|e| BoardError::InvalidMove(format!("{san}: {e}")))?;
        let m = parsed
            .san
            .to_move(&self.position)
            .map_err(|_| BoardError::IllegalMove(san.to_string()))?;
        self.play(&m)
    }

    /// Apply a move given in UCI from/to form ("e2e4", "a7a8q").
    pub fn apply_uci(&mut self, uci: &str) -> Result<MoveOutcome, BoardError> {
        let parsed: UciMove = uci
            .parse()
            .map_err(|_| BoardError::InvalidMove(uci.to_string()))?;
        let m = parsed
            .to_move(&self.position)
            .map_err(|_| BoardError::IllegalMove(uci.to_string()))?;
        self.play(&m)
    }

    /// Legal moves in the current position, in SAN.
    pub fn legal_moves_san(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| San::from_move(&self.position, m).to_string())
            .collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        !self.position.legal_moves().is_empty()
    }

    fn play(&mut self, m: &Move) -> Result<MoveOutcome, BoardError> {
        if !self.position.is_legal(m) {
            return Err(BoardError::IllegalMove(format!("{m:?}")));
        }

        // SAN depends on the position before the move.
        let san = SanPlus::from_move(self.position.clone(), m).to_string();

        self.position = self
            .position
            .clone()
            .play(m)
            .map_err(|_| BoardError::IllegalMove(format!("{m:?}")))?;

        let is_checkmate = self.position.is_checkmate();
        let is_stalemate = self.position.is_stalemate();
        let is_draw = is_stalemate
            || self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100;

        Ok(MoveOutcome {
            san,
            fen_after: self.fen(),
            turn_after: self.turn(),
            is_check: self.position.is_check(),
            is_checkmate,
            is_stalemate,
            is_draw,
        })
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position() {
        let board = BoardState::new();
        assert_eq!(board.turn(), Color::White);
        assert!(!board.is_check());
        assert_eq!(board.fen(), BoardState::START_FEN);
        assert_eq!(board.legal_moves_san().len(), 20);
    }

    #[test]
    fn san_application_alternates_turn() {
        let mut board = BoardState::new();

        let outcome = board.apply_san("e4").unwrap();
        assert_eq!(outcome.san, "e4");
        assert_eq!(outcome.turn_after, Color::Black);

        let outcome = board.apply_san("e5").unwrap();
        assert_eq!(outcome.turn_after, Color::White);

        let outcome = board.apply_san("Nf3").unwrap();
        assert_eq!(outcome.san, "Nf3");
    }

    #[test]
    fn uci_application_reports_san() {
        let mut board = BoardState::new();
        let outcome = board.apply_uci("g1f3").unwrap();
        assert_eq!(outcome.san, "Nf3");
    }

    #[test]
    fn illegal_san_is_rejected_without_mutating() {
        let mut board = BoardState::new();
        let before = board.fen();
        assert!(matches!(
            board.apply_san("e5"),
            Err(BoardError::IllegalMove(_))
        ));
        assert_eq!(board.fen(), before);
    }

    #[test]
    fn invalid_fen_is_rejected() {
        assert!(matches!(
            BoardState::from_fen("not a fen"),
            Err(BoardError::InvalidFen(_))
        ));
    }

    #[test]
    fn back_rank_mate_sets_flags() {
        // One move from checkmate: Re8#.
        let mut board = BoardState::from_fen("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1").unwrap();
        let outcome = board.apply_uci("e1e8").unwrap();
        assert_eq!(outcome.san, "Re8#");
        assert!(outcome.is_check);
        assert!(outcome.is_checkmate);
        assert!(!outcome.is_stalemate);
    }

    #[test]
    fn stalemate_sets_draw_flag() {
        // Qc7 stalemates the black king on a8.
        let mut board = BoardState::from_fen("k7/8/2K5/8/8/8/2Q5/8 w - - 0 1").unwrap();
        let outcome = board.apply_san("Qc7").unwrap();
        assert!(outcome.is_stalemate);
        assert!(outcome.is_draw);
        assert!(!outcome.is_checkmate);
    }

    #[test]
    fn promotion_roundtrip() {
        let mut board = BoardState::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let outcome = board.apply_uci("a7a8q").unwrap();
        assert!(outcome.san.starts_with("a8=Q"));
    }

    #[test]
    fn fen_roundtrip_preserves_turn() {
        let mut board = BoardState::new();
        board.apply_san("d4").unwrap();
        let reloaded = BoardState::from_fen(&board.fen()).unwrap();
        assert_eq!(reloaded.turn(), Color::Black);
    }

    #[test]
    fn terminal_position_has_no_legal_moves() {
        // Fool's mate final position.
        let mut board = BoardState::new();
        for mv in ["f3", "e5", "g4", "Qh4#"] {
            board.apply_san(mv).unwrap();
        }
        assert!(!board.has_legal_moves());
        assert!(board.legal_moves_san().is_empty());
    }
}
