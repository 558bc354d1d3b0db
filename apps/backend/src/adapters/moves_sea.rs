//! SeaORM adapter for the moves table - generic over ConnectionTrait.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::moves;

pub struct MoveCreate {
    pub game_id: i64,
    pub move_number: i32,
    pub san: String,
    pub fen: String,
    pub time_remaining: i32,
}

pub async fn append_move<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MoveCreate,
) -> Result<moves::Model, sea_orm::DbErr> {
    let mv = moves::ActiveModel {
        id: NotSet,
        game_id: Set(dto.game_id),
        move_number: Set(dto.move_number),
        san: Set(dto.san),
        fen: Set(dto.fen),
        time_remaining: Set(dto.time_remaining),
    };
    mv.insert(conn).await
}

pub async fn count_for_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    moves::Entity::find()
        .filter(moves::Column::GameId.eq(game_id))
        .count(conn)
        .await
}

pub async fn list_for_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<moves::Model>, sea_orm::DbErr> {
    moves::Entity::find()
        .filter(moves::Column::GameId.eq(game_id))
        .order_by_asc(moves::Column::MoveNumber)
        .all(conn)
        .await
}
