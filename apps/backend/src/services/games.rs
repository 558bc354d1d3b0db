//! Game session orchestration - bridges pure domain logic with persistence.
//!
//! Sole writer of Game/Move state. Each operation loads the game, enforces
//! phase and turn legality through the domain helpers, delegates position
//! legality to the board, and persists the transition with an optimistic
//! lock check so a concurrent writer fails closed.

use sea_orm::{DatabaseConnection, TransactionTrait};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::ai::{profiles, BotMoveGenerator};
use crate::domain::board::{BoardError, BoardState, MoveOutcome};
use crate::domain::game::{Color, GameOverReason, PlayerRef};
use crate::domain::{pgn, session};
use crate::entities::games::{GameResult, GameStatus, TimeControl};
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind, RuleKind};
use crate::repos::games::{Game, GameCompletionUpdate, GameCreate, GameMoveUpdate};
use crate::repos::moves::MoveCreate;
use crate::repos::{games, moves};

pub struct CreateGameParams {
    pub white: PlayerRef,
    pub black: PlayerRef,
    pub time_control: TimeControl,
    pub time_limit: i32,
    pub time_increment: i32,
    pub is_rated: bool,
}

/// Result of one applied ply, for callers that broadcast it.
#[derive(Debug, Clone)]
pub struct MoveApplied {
    pub game_id: i64,
    pub san: String,
    pub fen: String,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_draw: bool,
    pub mover: Color,
    pub status: GameStatus,
    pub result: Option<GameResult>,
    pub reason: Option<GameOverReason>,
    pub winner: Option<Color>,
}

impl MoveApplied {
    pub fn ended_game(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A terminal transition without a ply (resign, draw, abort, timeout).
#[derive(Debug, Clone)]
pub struct GameEnded {
    pub game_id: i64,
    pub reason: GameOverReason,
    pub result: GameResult,
    pub winner: Option<Color>,
}

/// Outcome of a clock sync.
#[derive(Debug, Clone)]
pub enum ClockState {
    Running { white: i32, black: i32 },
    Flagged(GameEnded),
}

pub struct GameSessionService {
    generator: BotMoveGenerator,
}

impl GameSessionService {
    pub fn new(generator: BotMoveGenerator) -> Self {
        Self { generator }
    }

    pub async fn get_game(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
    ) -> Result<Game, AppError> {
        Ok(games::require_game(db, game_id).await?)
    }

    pub async fn list_moves(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
    ) -> Result<Vec<crate::repos::moves::Move>, AppError> {
        Ok(moves::list_for_game(db, game_id).await?)
    }

    pub async fn create_game(
        &self,
        db: &DatabaseConnection,
        params: CreateGameParams,
    ) -> Result<Game, AppError> {
        let (white_player_id, white_bot_id) = games::seat_to_columns(&params.white);
        let (black_player_id, black_bot_id) = games::seat_to_columns(&params.black);

        let game = games::create_game(
            db,
            GameCreate {
                white_player_id,
                white_bot_id,
                black_player_id,
                black_bot_id,
                time_control: params.time_control,
                time_limit: params.time_limit,
                time_increment: params.time_increment,
                is_rated: params.is_rated,
                fen: BoardState::START_FEN.to_string(),
            },
        )
        .await?;

        info!(
            game_id = game.id,
            time_control = ?game.time_control,
            time_limit = game.time_limit,
            is_rated = game.is_rated,
            "game created"
        );
        Ok(game)
    }

    /// Create a game against a bot opponent. When the bot plays white its
    /// first move is made before this returns, so the human never joins an
    /// empty board with a stuck opponent.
    pub async fn create_bot_game(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        bot_id: &str,
        time_control: TimeControl,
        time_limit: i32,
        time_increment: i32,
        bot_plays_white: bool,
    ) -> Result<Game, AppError> {
        let profile = profiles::by_id(bot_id).ok_or_else(|| {
            DomainError::rule(RuleKind::InvalidBotId, format!("Invalid bot ID: {bot_id}"))
        })?;

        let (white, black) = if bot_plays_white {
            (PlayerRef::bot(profile.id), PlayerRef::human(user_id))
        } else {
            (PlayerRef::human(user_id), PlayerRef::bot(profile.id))
        };

        let game = self
            .create_game(
                db,
                CreateGameParams {
                    white,
                    black,
                    time_control,
                    time_limit,
                    time_increment,
                    is_rated: false,
                },
            )
            .await?;

        if bot_plays_white {
            self.make_bot_move(db, game.id, user_id).await?;
        }

        Ok(game)
    }

    /// Apply one ply submitted by a player.
    ///
    /// Preconditions, checked in order: the game exists, it is in progress,
    /// it is the caller's turn, and the move is legal in the position.
    pub async fn make_move(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
        move_text: &str,
        player_id: i64,
    ) -> Result<MoveApplied, AppError> {
        let game = games::require_game(db, game_id).await?;
        session::ensure_active(game.status)?;
        session::ensure_turn(game.turn, game.seat_of(player_id))?;

        let mut board = board_for(&game)?;
        let outcome = board.apply_san(move_text).map_err(illegal_move)?;

        debug!(game_id, player_id, san = %outcome.san, "move accepted");
        self.persist_move(db, &game, outcome).await
    }

    /// Apply one ply on behalf of the bot-controlled side.
    pub async fn make_bot_move(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
        requesting_user: i64,
    ) -> Result<MoveApplied, AppError> {
        let game = games::require_game(db, game_id).await?;
        session::ensure_active(game.status)?;

        let (bot_color, bot_id) = game.bot_seat().ok_or_else(|| {
            DomainError::rule(RuleKind::NotBotGame, "This is not a bot game")
        })?;
        if game.turn != bot_color {
            return Err(DomainError::rule(RuleKind::NotBotTurn, "Not the bot's turn").into());
        }

        let profile = profiles::by_id(bot_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::BotProfile, format!("Bot {bot_id} not found"))
        })?;

        let mut board = board_for(&game)?;
        let outcome = self.generator.generate(&mut board, profile).await?;

        debug!(game_id, requesting_user, bot = profile.id, san = %outcome.san, "bot move generated");
        self.persist_move(db, &game, outcome).await
    }

    pub async fn resign(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
        player_id: i64,
    ) -> Result<GameEnded, AppError> {
        let game = games::require_game(db, game_id).await?;
        session::ensure_active(game.status)?;

        let seat = game
            .seat_of(player_id)
            .ok_or_else(|| AppError::forbidden("Not a player in this game"))?;

        self.complete(
            db,
            &game,
            GameStatus::Completed,
            session::resign_result(seat),
            GameOverReason::Resignation,
        )
        .await
    }

    /// Draw offers are advisory: the offer itself is relayed by the gateway
    /// and nothing is persisted until an accept arrives.
    pub async fn offer_draw(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
    ) -> Result<(), AppError> {
        let game = games::require_game(db, game_id).await?;
        session::ensure_active(game.status)?;
        Ok(())
    }

    pub async fn accept_draw(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
    ) -> Result<GameEnded, AppError> {
        let game = games::require_game(db, game_id).await?;
        session::ensure_active(game.status)?;

        self.complete(
            db,
            &game,
            GameStatus::Completed,
            GameResult::Draw,
            GameOverReason::DrawAgreement,
        )
        .await
    }

    /// Abort is only permitted before either side has committed to the game.
    pub async fn abort_game(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
    ) -> Result<GameEnded, AppError> {
        let game = games::require_game(db, game_id).await?;
        session::ensure_active(game.status)?;

        let plies = moves::count_for_game(db, game_id).await?;
        if !session::abort_allowed(plies) {
            return Err(DomainError::rule(
                RuleKind::AbortWindowClosed,
                format!("Cannot abort after {} moves", session::ABORT_PLY_LIMIT),
            )
            .into());
        }

        self.complete(
            db,
            &game,
            GameStatus::Aborted,
            GameResult::Aborted,
            GameOverReason::Aborted,
        )
        .await
    }

    /// Persist a clock snapshot; a clock at or below zero forces a timeout
    /// completion scored for the other side.
    pub async fn update_time(
        &self,
        db: &DatabaseConnection,
        game_id: i64,
        white_time: i32,
        black_time: i32,
    ) -> Result<ClockState, AppError> {
        let game = games::require_game(db, game_id).await?;
        session::ensure_active(game.status)?;

        // Stored clocks never go negative.
        let white = white_time.max(0);
        let black = black_time.max(0);

        let updated = games::update_clocks(
            db,
            crate::repos::games::GameClockUpdate {
                id: game.id,
                expected_lock_version: game.lock_version,
                white_time_remaining: white,
                black_time_remaining: black,
            },
        )
        .await?;

        match session::timeout_result(white_time, black_time) {
            Some(result) => {
                let ended = self
                    .complete(
                        db,
                        &updated,
                        GameStatus::Completed,
                        result,
                        GameOverReason::Timeout,
                    )
                    .await?;
                Ok(ClockState::Flagged(ended))
            }
            None => Ok(ClockState::Running { white, black }),
        }
    }

    async fn persist_move(
        &self,
        db: &DatabaseConnection,
        game: &Game,
        outcome: MoveOutcome,
    ) -> Result<MoveApplied, AppError> {
        let mover = game.turn;
        let (status, result) = session::status_after_move(&outcome, mover);
        let reason = session::reason_after_move(&outcome);

        let txn = db.begin().await.map_err(db_err)?;

        let plies_before = moves::count_for_game(&txn, game.id).await?;
        moves::append_move(
            &txn,
            MoveCreate {
                game_id: game.id,
                move_number: plies_before as i32 + 1,
                san: outcome.san.clone(),
                fen: outcome.fen_after.clone(),
                time_remaining: game.time_remaining(mover),
            },
        )
        .await?;

        games::apply_move_update(
            &txn,
            GameMoveUpdate {
                id: game.id,
                expected_lock_version: game.lock_version,
                fen: outcome.fen_after.clone(),
                pgn: pgn::append_san(&game.pgn, plies_before as u32, &outcome.san),
                current_turn: outcome.turn_after.as_turn_str().to_string(),
                status,
                result,
                ended_at: status.is_terminal().then(OffsetDateTime::now_utc),
            },
        )
        .await?;

        txn.commit().await.map_err(db_err)?;

        if status.is_terminal() {
            info!(game_id = game.id, ?result, "game completed by move");
        }

        Ok(MoveApplied {
            game_id: game.id,
            san: outcome.san,
            fen: outcome.fen_after,
            is_check: outcome.is_check,
            is_checkmate: outcome.is_checkmate,
            is_stalemate: outcome.is_stalemate,
            is_draw: outcome.is_draw,
            mover,
            status,
            result,
            reason,
            winner: result.and_then(session::winner_of),
        })
    }

    async fn complete(
        &self,
        db: &DatabaseConnection,
        game: &Game,
        status: GameStatus,
        result: GameResult,
        reason: GameOverReason,
    ) -> Result<GameEnded, AppError> {
        games::complete_game(
            db,
            GameCompletionUpdate {
                id: game.id,
                expected_lock_version: game.lock_version,
                status,
                result,
                ended_at: OffsetDateTime::now_utc(),
            },
        )
        .await?;

        info!(game_id = game.id, ?reason, ?result, "game ended");

        Ok(GameEnded {
            game_id: game.id,
            reason,
            result,
            winner: session::winner_of(result),
        })
    }
}

fn board_for(game: &Game) -> Result<BoardState, DomainError> {
    BoardState::from_fen(&game.fen).map_err(|err| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("game {} has an unreadable FEN: {err}", game.id),
        )
    })
}

fn illegal_move(err: BoardError) -> AppError {
    DomainError::rule(RuleKind::IllegalMove, err.to_string()).into()
}

fn db_err(err: sea_orm::DbErr) -> AppError {
    AppError::from(DomainError::from(err))
}
