//! Game repository functions for the domain layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::games_sea as games_adapter;
pub use crate::adapters::games_sea::{
    GameClockUpdate, GameCompletionUpdate, GameCreate, GameMoveUpdate,
};
use crate::domain::game::{Color, PlayerRef};
use crate::entities::games;
use crate::entities::games::{GameResult, GameStatus, TimeControl};
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

/// Game domain model.
///
/// Converted from the database model (`games::Model`) when loaded through
/// repos functions; the nullable player/bot column pairs are folded into
/// [`PlayerRef`] seats here so nothing downstream handles raw columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: i64,
    pub white: PlayerRef,
    pub black: PlayerRef,
    pub time_control: TimeControl,
    pub time_limit: i32,
    pub time_increment: i32,
    pub is_rated: bool,
    pub white_time_remaining: i32,
    pub black_time_remaining: i32,
    pub status: GameStatus,
    pub result: Option<GameResult>,
    pub fen: String,
    pub pgn: String,
    pub turn: Color,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
    pub lock_version: i32,
}

impl Game {
    pub fn player(&self, color: Color) -> &PlayerRef {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// The seat a user occupies, if any.
    pub fn seat_of(&self, user_id: i64) -> Option<Color> {
        if self.white.human_id() == Some(user_id) {
            Some(Color::White)
        } else if self.black.human_id() == Some(user_id) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_member(&self, user_id: i64) -> bool {
        self.seat_of(user_id).is_some()
    }

    /// The bot-controlled seat, if this is a bot game.
    pub fn bot_seat(&self) -> Option<(Color, &str)> {
        if let Some(bot_id) = self.white.bot_id() {
            Some((Color::White, bot_id))
        } else {
            self.black.bot_id().map(|bot_id| (Color::Black, bot_id))
        }
    }

    pub fn time_remaining(&self, color: Color) -> i32 {
        match color {
            Color::White => self.white_time_remaining,
            Color::Black => self.black_time_remaining,
        }
    }
}

fn seat_from_columns(
    side: &str,
    player_id: Option<i64>,
    bot_id: Option<String>,
) -> Result<PlayerRef, DomainError> {
    match (player_id, bot_id) {
        (Some(id), None) => Ok(PlayerRef::human(id)),
        (None, Some(bot_id)) => Ok(PlayerRef::Bot { bot_id }),
        _ => Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("game has inconsistent {side} seat columns"),
        )),
    }
}

impl TryFrom<games::Model> for Game {
    type Error = DomainError;

    fn try_from(model: games::Model) -> Result<Self, Self::Error> {
        let white = seat_from_columns("white", model.white_player_id, model.white_bot_id)?;
        let black = seat_from_columns("black", model.black_player_id, model.black_bot_id)?;
        let turn = Color::from_turn_str(&model.current_turn).ok_or_else(|| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("game {} has invalid current_turn", model.id),
            )
        })?;

        Ok(Self {
            id: model.id,
            white,
            black,
            time_control: model.time_control,
            time_limit: model.time_limit,
            time_increment: model.time_increment,
            is_rated: model.is_rated,
            white_time_remaining: model.white_time_remaining,
            black_time_remaining: model.black_time_remaining,
            status: model.status,
            result: model.result,
            fen: model.fen,
            pgn: model.pgn,
            turn,
            started_at: model.started_at,
            ended_at: model.ended_at,
            lock_version: model.lock_version,
        })
    }
}

/// Column values for one seat of a new game.
pub fn seat_to_columns(seat: &PlayerRef) -> (Option<i64>, Option<String>) {
    match seat {
        PlayerRef::Human { id } => (Some(*id), None),
        PlayerRef::Bot { bot_id } => (None, Some(bot_id.clone())),
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<Game>, DomainError> {
    let game = games_adapter::find_by_id(conn, game_id).await?;
    game.map(Game::try_from).transpose()
}

/// Find a game by id or return a not-found domain error.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Game, DomainError> {
    find_by_id(conn, game_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"))
    })
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<Game, DomainError> {
    let game = games_adapter::create_game(conn, dto).await?;
    Game::try_from(game)
}

pub async fn apply_move_update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameMoveUpdate,
) -> Result<Game, DomainError> {
    let game = games_adapter::apply_move_update(conn, dto).await?;
    Game::try_from(game)
}

pub async fn complete_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCompletionUpdate,
) -> Result<Game, DomainError> {
    let game = games_adapter::complete_game(conn, dto).await?;
    Game::try_from(game)
}

pub async fn update_clocks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameClockUpdate,
) -> Result<Game, DomainError> {
    let game = games_adapter::update_clocks(conn, dto).await?;
    Game::try_from(game)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(white_bot: Option<&str>) -> games::Model {
        games::Model {
            id: 7,
            white_player_id: white_bot.is_none().then_some(11),
            white_bot_id: white_bot.map(str::to_string),
            black_player_id: Some(22),
            black_bot_id: None,
            time_control: TimeControl::Blitz,
            time_limit: 300,
            time_increment: 0,
            is_rated: true,
            white_time_remaining: 300,
            black_time_remaining: 300,
            status: GameStatus::InProgress,
            result: None,
            fen: crate::domain::BoardState::START_FEN.to_string(),
            pgn: String::new(),
            current_turn: "w".to_string(),
            started_at: OffsetDateTime::UNIX_EPOCH,
            ended_at: None,
            lock_version: 1,
        }
    }

    #[test]
    fn seats_fold_into_player_refs() {
        let game = Game::try_from(model(None)).unwrap();
        assert_eq!(game.white, PlayerRef::human(11));
        assert_eq!(game.seat_of(22), Some(Color::Black));
        assert_eq!(game.seat_of(99), None);
        assert!(game.bot_seat().is_none());
    }

    #[test]
    fn bot_seat_is_detected() {
        let game = Game::try_from(model(Some("rookie"))).unwrap();
        assert!(game.white.is_bot());
        assert_eq!(game.bot_seat(), Some((Color::White, "rookie")));
        assert_eq!(game.seat_of(11), None);
    }

    #[test]
    fn inconsistent_seat_columns_are_rejected() {
        let mut broken = model(Some("rookie"));
        broken.white_player_id = Some(11);
        assert!(Game::try_from(broken).is_err());

        let mut empty = model(None);
        empty.black_player_id = None;
        assert!(Game::try_from(empty).is_err());
    }
}
