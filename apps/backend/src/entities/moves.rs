use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ply of a game. Append-only; never mutated after insert.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moves")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "game_id")]
    pub game_id: i64,
    /// 1-indexed ply number within the game.
    #[sea_orm(column_name = "move_number")]
    pub move_number: i32,
    pub san: String,
    /// Position after the move.
    pub fen: String,
    /// Mover's clock (seconds) when the move was made.
    #[sea_orm(column_name = "time_remaining")]
    pub time_remaining: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::games::Entity",
        from = "Column::GameId",
        to = "super::games::Column::Id"
    )]
    Game,
}

impl Related<super::games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Game.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
