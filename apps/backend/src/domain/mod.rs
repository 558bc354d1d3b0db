pub mod board;
pub mod game;
pub mod pgn;
pub mod session;

pub use board::{BoardError, BoardState, MoveOutcome};
pub use game::{Color, GameOverReason, PlayerRef};
