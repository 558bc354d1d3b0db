use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "game_status")]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Reserved initial state; the current creation paths go straight to InProgress.
    #[sea_orm(string_value = "waiting")]
    Waiting,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "aborted")]
    Aborted,
}

impl GameStatus {
    /// Terminal states never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Completed | GameStatus::Aborted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "game_result")]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    #[sea_orm(string_value = "white_win")]
    WhiteWin,
    #[sea_orm(string_value = "black_win")]
    BlackWin,
    #[sea_orm(string_value = "draw")]
    Draw,
    #[sea_orm(string_value = "aborted")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "time_control")]
#[serde(rename_all = "snake_case")]
pub enum TimeControl {
    #[sea_orm(string_value = "bullet")]
    Bullet,
    #[sea_orm(string_value = "blitz")]
    Blitz,
    #[sea_orm(string_value = "rapid")]
    Rapid,
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "custom")]
    Custom,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    // One of (player_id, bot_id) is set per side; see repos::games::PlayerRef.
    #[sea_orm(column_name = "white_player_id")]
    pub white_player_id: Option<i64>,
    #[sea_orm(column_name = "white_bot_id")]
    pub white_bot_id: Option<String>,
    #[sea_orm(column_name = "black_player_id")]
    pub black_player_id: Option<i64>,
    #[sea_orm(column_name = "black_bot_id")]
    pub black_bot_id: Option<String>,
    #[sea_orm(column_name = "time_control")]
    pub time_control: TimeControl,
    #[sea_orm(column_name = "time_limit")]
    pub time_limit: i32,
    #[sea_orm(column_name = "time_increment")]
    pub time_increment: i32,
    #[sea_orm(column_name = "is_rated")]
    pub is_rated: bool,
    #[sea_orm(column_name = "white_time_remaining")]
    pub white_time_remaining: i32,
    #[sea_orm(column_name = "black_time_remaining")]
    pub black_time_remaining: i32,
    pub status: GameStatus,
    pub result: Option<GameResult>,
    pub fen: String,
    pub pgn: String,
    /// Side to move, "w" or "b"; mirrors the FEN's side-to-move field.
    #[sea_orm(column_name = "current_turn")]
    pub current_turn: String,
    #[sea_orm(column_name = "started_at")]
    pub started_at: OffsetDateTime,
    #[sea_orm(column_name = "ended_at")]
    pub ended_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "lock_version")]
    pub lock_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::moves::Entity")]
    Moves,
}

impl Related<super::moves::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Moves.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
