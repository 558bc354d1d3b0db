//! Pure state transitions for the game lifecycle.
//!
//! The session service loads a game, delegates the decision to these
//! functions, and persists whatever they return. Keeping them free of I/O
//! makes the lifecycle rules testable without a database.

use crate::domain::board::MoveOutcome;
use crate::domain::game::{Color, GameOverReason};
use crate::entities::games::{GameResult, GameStatus};
use crate::errors::domain::{DomainError, RuleKind};

/// A game may be aborted while no side has committed to it, i.e. at most
/// one ply from each player has been recorded.
pub const ABORT_PLY_LIMIT: u64 = 2;

pub fn abort_allowed(ply_count: u64) -> bool {
    ply_count <= ABORT_PLY_LIMIT
}

/// Terminal statuses never accept another lifecycle operation.
pub fn ensure_active(status: GameStatus) -> Result<(), DomainError> {
    if status != GameStatus::InProgress {
        return Err(DomainError::rule(
            RuleKind::GameNotActive,
            "Game is not in progress",
        ));
    }
    Ok(())
}

/// The caller may move only when it occupies the seat that is on turn.
/// A caller with no seat in the game fails the same way as one moving out
/// of turn.
pub fn ensure_turn(turn: Color, seat: Option<Color>) -> Result<Color, DomainError> {
    match seat {
        Some(seat) if seat == turn => Ok(seat),
        _ => Err(DomainError::rule(RuleKind::NotYourTurn, "Not your turn")),
    }
}

pub fn win_for(color: Color) -> GameResult {
    match color {
        Color::White => GameResult::WhiteWin,
        Color::Black => GameResult::BlackWin,
    }
}

/// Status and result after a ply by `mover` produced `outcome`.
pub fn status_after_move(
    outcome: &MoveOutcome,
    mover: Color,
) -> (GameStatus, Option<GameResult>) {
    if outcome.is_checkmate {
        (GameStatus::Completed, Some(win_for(mover)))
    } else if outcome.is_stalemate || outcome.is_draw {
        (GameStatus::Completed, Some(GameResult::Draw))
    } else {
        (GameStatus::InProgress, None)
    }
}

/// The reason tag broadcast when a move ends the game.
pub fn reason_after_move(outcome: &MoveOutcome) -> Option<GameOverReason> {
    if outcome.is_checkmate {
        Some(GameOverReason::Checkmate)
    } else if outcome.is_stalemate {
        Some(GameOverReason::Stalemate)
    } else if outcome.is_draw {
        Some(GameOverReason::Draw)
    } else {
        None
    }
}

pub fn resign_result(resigner: Color) -> GameResult {
    win_for(resigner.opposite())
}

/// Terminal result once either clock has crossed zero, if any.
///
/// White's flag is checked first, mirroring the original clock handling:
/// a simultaneous double flag is scored for black.
pub fn timeout_result(white_time: i32, black_time: i32) -> Option<GameResult> {
    if white_time <= 0 {
        Some(GameResult::BlackWin)
    } else if black_time <= 0 {
        Some(GameResult::WhiteWin)
    } else {
        None
    }
}

pub fn winner_of(result: GameResult) -> Option<Color> {
    match result {
        GameResult::WhiteWin => Some(Color::White),
        GameResult::BlackWin => Some(Color::Black),
        GameResult::Draw | GameResult::Aborted => None,
    }
}
