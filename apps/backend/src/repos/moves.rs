//! Move repository functions for the domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::moves_sea as moves_adapter;
pub use crate::adapters::moves_sea::MoveCreate;
use crate::entities::moves;
use crate::errors::domain::DomainError;

/// One recorded ply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub game_id: i64,
    pub move_number: i32,
    pub san: String,
    pub fen: String,
    pub time_remaining: i32,
}

impl From<moves::Model> for Move {
    fn from(model: moves::Model) -> Self {
        Self {
            game_id: model.game_id,
            move_number: model.move_number,
            san: model.san,
            fen: model.fen,
            time_remaining: model.time_remaining,
        }
    }
}

pub async fn append_move<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MoveCreate,
) -> Result<Move, DomainError> {
    let mv = moves_adapter::append_move(conn, dto).await?;
    Ok(Move::from(mv))
}

pub async fn count_for_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<u64, DomainError> {
    Ok(moves_adapter::count_for_game(conn, game_id).await?)
}

/// Move history in ply order, for snapshots and replay.
pub async fn list_for_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<Move>, DomainError> {
    let moves = moves_adapter::list_for_game(conn, game_id).await?;
    Ok(moves.into_iter().map(Move::from).collect())
}
