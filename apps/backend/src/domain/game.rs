//! Core game-side types shared by the session service and the gateway.

use serde::{Deserialize, Serialize};

/// Side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The single-letter form used by FEN and the `current_turn` column.
    pub fn as_turn_str(self) -> &'static str {
        match self {
            Color::White => "w",
            Color::Black => "b",
        }
    }

    pub fn from_turn_str(s: &str) -> Option<Self> {
        match s {
            "w" => Some(Color::White),
            "b" => Some(Color::Black),
            _ => None,
        }
    }
}

impl From<shakmaty::Color> for Color {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }
}

/// A seat in a game: either a registered user or a bot profile.
///
/// Persisted as a pair of nullable columns per side rather than a reserved
/// id range, so a bot seat can never be confused with a user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerRef {
    Human { id: i64 },
    Bot { bot_id: String },
}

impl PlayerRef {
    pub fn human(id: i64) -> Self {
        PlayerRef::Human { id }
    }

    pub fn bot(bot_id: impl Into<String>) -> Self {
        PlayerRef::Bot {
            bot_id: bot_id.into(),
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self, PlayerRef::Bot { .. })
    }

    pub fn bot_id(&self) -> Option<&str> {
        match self {
            PlayerRef::Bot { bot_id } => Some(bot_id),
            PlayerRef::Human { .. } => None,
        }
    }

    pub fn human_id(&self) -> Option<i64> {
        match self {
            PlayerRef::Human { id } => Some(*id),
            PlayerRef::Bot { .. } => None,
        }
    }
}

/// Why a game ended, as broadcast in `game_over` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    Draw,
    Resignation,
    DrawAgreement,
    Timeout,
    Aborted,
}
