//! SeaORM adapter for the games table - generic over ConnectionTrait.
//!
//! Every update is conditioned on the current `lock_version` and increments
//! it, so a concurrent writer loses with a conflict instead of silently
//! clobbering game state.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set,
};
use time::OffsetDateTime;

use crate::entities::games;
use crate::entities::games::{GameResult, GameStatus, TimeControl};
use crate::errors::domain::OPTIMISTIC_LOCK_MARKER;

pub struct GameCreate {
    pub white_player_id: Option<i64>,
    pub white_bot_id: Option<String>,
    pub black_player_id: Option<i64>,
    pub black_bot_id: Option<String>,
    pub time_control: TimeControl,
    pub time_limit: i32,
    pub time_increment: i32,
    pub is_rated: bool,
    pub fen: String,
}

/// Columns rewritten when a ply is applied.
pub struct GameMoveUpdate {
    pub id: i64,
    pub expected_lock_version: i32,
    pub fen: String,
    pub pgn: String,
    pub current_turn: String,
    pub status: GameStatus,
    pub result: Option<GameResult>,
    pub ended_at: Option<OffsetDateTime>,
}

/// Terminal transition without a ply (resign, draw agreement, abort, timeout).
pub struct GameCompletionUpdate {
    pub id: i64,
    pub expected_lock_version: i32,
    pub status: GameStatus,
    pub result: GameResult,
    pub ended_at: OffsetDateTime,
}

pub struct GameClockUpdate {
    pub id: i64,
    pub expected_lock_version: i32,
    pub white_time_remaining: i32,
    pub black_time_remaining: i32,
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(game_id).one(conn).await
}

pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<games::Model, sea_orm::DbErr> {
    find_by_id(conn, game_id).await?.ok_or_else(|| {
        sea_orm::DbErr::RecordNotFound(format!("Game {game_id} not found"))
    })
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let game = games::ActiveModel {
        id: NotSet,
        white_player_id: Set(dto.white_player_id),
        white_bot_id: Set(dto.white_bot_id),
        black_player_id: Set(dto.black_player_id),
        black_bot_id: Set(dto.black_bot_id),
        time_control: Set(dto.time_control),
        time_limit: Set(dto.time_limit),
        time_increment: Set(dto.time_increment),
        is_rated: Set(dto.is_rated),
        white_time_remaining: Set(dto.time_limit),
        black_time_remaining: Set(dto.time_limit),
        status: Set(GameStatus::InProgress),
        result: Set(None),
        fen: Set(dto.fen),
        pgn: Set(String::new()),
        current_turn: Set("w".to_string()),
        started_at: Set(now),
        ended_at: Set(None),
        lock_version: Set(1),
    };
    game.insert(conn).await
}

pub async fn apply_move_update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameMoveUpdate,
) -> Result<games::Model, sea_orm::DbErr> {
    let id = dto.id;
    let expected = dto.expected_lock_version;
    optimistic_update_then_fetch(conn, id, expected, move |update| {
        update.set(games::ActiveModel {
            fen: Set(dto.fen),
            pgn: Set(dto.pgn),
            current_turn: Set(dto.current_turn),
            status: Set(dto.status),
            result: Set(dto.result),
            ended_at: Set(dto.ended_at),
            ..Default::default()
        })
    })
    .await
}

pub async fn complete_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCompletionUpdate,
) -> Result<games::Model, sea_orm::DbErr> {
    let id = dto.id;
    let expected = dto.expected_lock_version;
    optimistic_update_then_fetch(conn, id, expected, move |update| {
        update.set(games::ActiveModel {
            status: Set(dto.status),
            result: Set(Some(dto.result)),
            ended_at: Set(Some(dto.ended_at)),
            ..Default::default()
        })
    })
    .await
}

pub async fn update_clocks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameClockUpdate,
) -> Result<games::Model, sea_orm::DbErr> {
    let id = dto.id;
    let expected = dto.expected_lock_version;
    optimistic_update_then_fetch(conn, id, expected, move |update| {
        update.set(games::ActiveModel {
            white_time_remaining: Set(dto.white_time_remaining),
            black_time_remaining: Set(dto.black_time_remaining),
            ..Default::default()
        })
    })
    .await
}

/// Helper: apply an optimistic update with a lock version check, then refetch.
///
/// - Filters by id and the expected lock_version, incrementing it in place
/// - Checks rows_affected to distinguish NotFound from OptimisticLock
/// - Refetches and returns the updated model
async fn optimistic_update_then_fetch<C, F>(
    conn: &C,
    id: i64,
    expected_lock_version: i32,
    configure_update: F,
) -> Result<games::Model, sea_orm::DbErr>
where
    C: ConnectionTrait + Send + Sync,
    F: FnOnce(sea_orm::UpdateMany<games::Entity>) -> sea_orm::UpdateMany<games::Entity>,
{
    let result = configure_update(games::Entity::update_many())
        .col_expr(
            games::Column::LockVersion,
            Expr::col(games::Column::LockVersion).add(1),
        )
        .filter(games::Column::Id.eq(id))
        .filter(games::Column::LockVersion.eq(expected_lock_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let game = games::Entity::find_by_id(id).one(conn).await?;
        if let Some(game) = game {
            let payload = format!(
                "{OPTIMISTIC_LOCK_MARKER}{{\"expected\":{},\"actual\":{}}}",
                expected_lock_version, game.lock_version
            );
            return Err(sea_orm::DbErr::Custom(payload));
        }
        return Err(sea_orm::DbErr::RecordNotFound(format!(
            "Game {id} not found"
        )));
    }

    require_game(conn, id).await
}
