//! Per-connection socket session actor.
//!
//! Authenticates the handshake, routes client events to the game session
//! service and the matchmaking pools, and emits broadcasts through the
//! registry. Rejections are reported privately to the requesting socket
//! only; room broadcasts stay in the order the handler chain emitted them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::jwt;
use crate::domain::game::{Color, PlayerRef};
use crate::entities::games::TimeControl;
use crate::error::AppError;
use crate::services::games::{ClockState, CreateGameParams, MoveApplied};
use crate::services::matchmaking::{JoinOutcome, PoolKey, QueueEntry};
use crate::state::app_state::AppState;
use crate::ws::hub::{Outbound, WsRegistry};
use crate::ws::protocol::{ClientMsg, GameSnapshot, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Deserialize)]
pub struct ConnectQuery {
    token: String,
}

/// Upgrade handler: the bearer token travels in the handshake query string
/// and the connection is refused before any event is accepted if it does
/// not verify.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<ConnectQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let claims = jwt::verify_access_token(&query.token, &app_state.security)?;
    let user_id = claims.user_id()?;

    let session = WsSession::new(user_id, app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    user_id: i64,
    app_state: web::Data<AppState>,
    last_heartbeat: Instant,
    heartbeat_handle: Option<actix::SpawnHandle>,
}

impl WsSession {
    fn new(user_id: i64, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            user_id,
            app_state,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn registry(&self) -> Arc<WsRegistry> {
        self.app_state.registry()
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, err: &AppError) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code: err.code().to_string(),
                message: err.detail(),
            },
        );
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    user_id = actor.user_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    fn dispatch(&mut self, msg: ClientMsg, ctx: &mut ws::WebsocketContext<Self>) {
        match msg {
            ClientMsg::JoinGame { game_id } => self.handle_join_game(game_id, ctx),
            ClientMsg::LeaveGame { game_id } => {
                self.registry().leave_room(game_id, self.conn_id);
            }
            ClientMsg::MakeMove { game_id, san } => self.handle_make_move(game_id, san, ctx),
            ClientMsg::Resign { game_id } => self.handle_resign(game_id, ctx),
            ClientMsg::DrawOffer { game_id } => self.handle_draw_offer(game_id, ctx),
            ClientMsg::DrawResponse { game_id, accepted } => {
                self.handle_draw_response(game_id, accepted, ctx)
            }
            ClientMsg::AbortGame { game_id } => self.handle_abort(game_id, ctx),
            ClientMsg::TimeUpdate {
                game_id,
                white_time,
                black_time,
            } => self.handle_time_update(game_id, white_time, black_time, ctx),
            ClientMsg::JoinQueue {
                time_control,
                time_limit,
                time_increment,
                rating,
                rating_range,
                is_rated,
            } => self.handle_join_queue(
                time_control,
                time_limit,
                time_increment,
                rating,
                rating_range,
                is_rated,
                ctx,
            ),
            ClientMsg::LeaveQueue {
                time_control,
                time_limit,
                time_increment,
            } => {
                let key = PoolKey {
                    time_control,
                    time_limit,
                    time_increment,
                };
                self.app_state.matchmaker().leave(&key, self.conn_id);
                Self::send_json(ctx, &ServerMsg::QueueLeft);
            }
            ClientMsg::SendMessage { game_id, message } => {
                self.registry().broadcast_except(
                    game_id,
                    self.conn_id,
                    ServerMsg::ReceiveMessage {
                        game_id,
                        from: self.user_id,
                        message,
                        timestamp: OffsetDateTime::now_utc(),
                    },
                );
            }
        }
    }

    /// Validate membership, reply with the full game state, then probe for a
    /// pending bot move so that a reload against a bot opponent cannot leave
    /// the bot stuck.
    fn handle_join_game(&mut self, game_id: i64, ctx: &mut ws::WebsocketContext<Self>) {
        let state = self.app_state.clone();
        let user_id = self.user_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                let game = state.games().get_game(db, game_id).await?;
                if !game.is_member(user_id) {
                    return Err(AppError::forbidden("Not authorized to join this game"));
                }
                Ok(GameSnapshot::from(game))
            }
            .into_actor(self)
            .map(move |res, actor, ctx| match res {
                Ok(snapshot) => {
                    actor.registry().join_room(game_id, actor.conn_id);
                    Self::send_json(ctx, &ServerMsg::GameJoined { game_id, game: snapshot });
                    actor.spawn_bot_probe(game_id, ctx);
                }
                Err(err) => {
                    warn!(
                        game_id,
                        user_id,
                        code = err.code(),
                        "[WS SESSION] join_game refused"
                    );
                    Self::send_error(ctx, &err);
                }
            }),
        );
    }

    fn handle_make_move(
        &mut self,
        game_id: i64,
        san: String,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        let state = self.app_state.clone();
        let registry = self.registry();
        let user_id = self.user_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                let applied = state.games().make_move(db, game_id, &san, user_id).await?;
                broadcast_move(&registry, &applied);

                // If the game continues and the other seat is bot-controlled,
                // chain its reply; the guards below are expected on any
                // human-vs-human game and stay silent.
                if !applied.ended_game() {
                    match state.games().make_bot_move(db, game_id, user_id).await {
                        Ok(bot_reply) => broadcast_move(&registry, &bot_reply),
                        Err(err) if is_benign_probe_error(&err) => {}
                        Err(err) => {
                            tracing::error!(game_id, user_id, error = %err, "[WS SESSION] bot reply failed")
                        }
                    }
                }
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), AppError>, _actor, ctx| {
                if let Err(err) = res {
                    warn!(
                        game_id,
                        user_id,
                        code = err.code(),
                        "[WS SESSION] make_move rejected"
                    );
                    Self::send_error(ctx, &err);
                }
            }),
        );
    }

    fn handle_resign(&mut self, game_id: i64, ctx: &mut ws::WebsocketContext<Self>) {
        let state = self.app_state.clone();
        let registry = self.registry();
        let user_id = self.user_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                let ended = state.games().resign(db, game_id, user_id).await?;
                registry.broadcast(
                    game_id,
                    ServerMsg::GameOver {
                        game_id,
                        result: ended.reason,
                        winner: ended.winner,
                    },
                );
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), AppError>, _actor, ctx| {
                if let Err(err) = res {
                    warn!(game_id, user_id, code = err.code(), "[WS SESSION] resign rejected");
                    Self::send_error(ctx, &err);
                }
            }),
        );
    }

    /// The offer itself is advisory: relayed to the rest of the room and
    /// persisted nowhere.
    fn handle_draw_offer(&mut self, game_id: i64, ctx: &mut ws::WebsocketContext<Self>) {
        let state = self.app_state.clone();
        let registry = self.registry();
        let user_id = self.user_id;
        let conn_id = self.conn_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                state.games().offer_draw(db, game_id).await?;
                registry.broadcast_except(
                    game_id,
                    conn_id,
                    ServerMsg::DrawOffer {
                        game_id,
                        from: user_id,
                    },
                );
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), AppError>, _actor, ctx| {
                if let Err(err) = res {
                    warn!(game_id, user_id, code = err.code(), "[WS SESSION] draw_offer rejected");
                    Self::send_error(ctx, &err);
                }
            }),
        );
    }

    fn handle_draw_response(
        &mut self,
        game_id: i64,
        accepted: bool,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        if !accepted {
            self.registry()
                .broadcast_except(game_id, self.conn_id, ServerMsg::DrawDeclined { game_id });
            return;
        }

        let state = self.app_state.clone();
        let registry = self.registry();
        let user_id = self.user_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                let ended = state.games().accept_draw(db, game_id).await?;
                registry.broadcast(
                    game_id,
                    ServerMsg::GameOver {
                        game_id,
                        result: ended.reason,
                        winner: ended.winner,
                    },
                );
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), AppError>, _actor, ctx| {
                if let Err(err) = res {
                    warn!(
                        game_id,
                        user_id,
                        code = err.code(),
                        "[WS SESSION] draw_response rejected"
                    );
                    Self::send_error(ctx, &err);
                }
            }),
        );
    }

    fn handle_abort(&mut self, game_id: i64, ctx: &mut ws::WebsocketContext<Self>) {
        let state = self.app_state.clone();
        let registry = self.registry();
        let user_id = self.user_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                let ended = state.games().abort_game(db, game_id).await?;
                registry.broadcast(
                    game_id,
                    ServerMsg::GameOver {
                        game_id,
                        result: ended.reason,
                        winner: ended.winner,
                    },
                );
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), AppError>, _actor, ctx| {
                if let Err(err) = res {
                    warn!(game_id, user_id, code = err.code(), "[WS SESSION] abort rejected");
                    Self::send_error(ctx, &err);
                }
            }),
        );
    }

    /// Clock sync from either client: relayed to the rest of the room and
    /// checked for a flag fall, which ends the game for everyone.
    fn handle_time_update(
        &mut self,
        game_id: i64,
        white_time: i32,
        black_time: i32,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        let state = self.app_state.clone();
        let registry = self.registry();
        let user_id = self.user_id;
        let conn_id = self.conn_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                match state
                    .games()
                    .update_time(db, game_id, white_time, black_time)
                    .await?
                {
                    ClockState::Running { white, black } => {
                        registry.broadcast_except(
                            game_id,
                            conn_id,
                            ServerMsg::TimeUpdate {
                                game_id,
                                white_time: white,
                                black_time: black,
                            },
                        );
                    }
                    ClockState::Flagged(ended) => {
                        registry.broadcast(
                            game_id,
                            ServerMsg::GameOver {
                                game_id,
                                result: ended.reason,
                                winner: ended.winner,
                            },
                        );
                    }
                }
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), AppError>, _actor, ctx| {
                if let Err(err) = res {
                    warn!(
                        game_id,
                        user_id,
                        code = err.code(),
                        "[WS SESSION] time_update rejected"
                    );
                    Self::send_error(ctx, &err);
                }
            }),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_join_queue(
        &mut self,
        time_control: TimeControl,
        time_limit: i32,
        time_increment: i32,
        rating: i32,
        rating_range: [i32; 2],
        is_rated: bool,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        let key = PoolKey {
            time_control,
            time_limit,
            time_increment,
        };
        let width = (rating_range[1] - rating_range[0]).max(0);
        let entry = QueueEntry::new(self.conn_id, self.user_id, rating);

        match self.app_state.matchmaker().join(key, entry, width) {
            JoinOutcome::Queued { position } => {
                Self::send_json(ctx, &ServerMsg::QueueJoined { position });
            }
            JoinOutcome::Matched { opponent } => {
                let state = self.app_state.clone();
                let registry = self.registry();
                let user_id = self.user_id;

                ctx.spawn(
                    async move {
                        let db = state.db()?;
                        let game = state
                            .games()
                            .create_game(
                                db,
                                CreateGameParams {
                                    white: PlayerRef::human(user_id),
                                    black: PlayerRef::human(opponent.player_id),
                                    time_control,
                                    time_limit,
                                    time_increment,
                                    is_rated,
                                },
                            )
                            .await?;

                        registry.send_to(
                            opponent.conn_id,
                            ServerMsg::MatchFound {
                                game_id: game.id,
                                color: Color::Black,
                            },
                        );
                        Ok(game.id)
                    }
                    .into_actor(self)
                    .map(move |res: Result<i64, AppError>, _actor, ctx| match res {
                        Ok(game_id) => Self::send_json(
                            ctx,
                            &ServerMsg::MatchFound {
                                game_id,
                                color: Color::White,
                            },
                        ),
                        Err(err) => {
                            tracing::error!(
                                user_id,
                                error = %err,
                                "[WS SESSION] failed to create matched game"
                            );
                            Self::send_error(ctx, &err);
                        }
                    }),
                );
            }
        }
    }

    /// Opportunistic bot-move attempt on behalf of the joiner's game.
    /// Guard errors are expected and swallowed without logging.
    fn spawn_bot_probe(&mut self, game_id: i64, ctx: &mut ws::WebsocketContext<Self>) {
        let state = self.app_state.clone();
        let registry = self.registry();
        let user_id = self.user_id;

        ctx.spawn(
            async move {
                let db = state.db()?;
                let applied = state.games().make_bot_move(db, game_id, user_id).await?;
                broadcast_move(&registry, &applied);
                Ok(())
            }
            .into_actor(self)
            .map(move |res: Result<(), AppError>, _actor, _ctx| {
                if let Err(err) = res {
                    if !is_benign_probe_error(&err) {
                        tracing::error!(game_id, user_id, error = %err, "[WS SESSION] bot resumption failed");
                    }
                }
            }),
        );
    }
}

/// Broadcast an applied ply to the game's room, following with `game_over`
/// when the ply ended the game.
fn broadcast_move(registry: &WsRegistry, applied: &MoveApplied) {
    registry.broadcast(
        applied.game_id,
        ServerMsg::MoveMade {
            game_id: applied.game_id,
            san: applied.san.clone(),
            fen: applied.fen.clone(),
            is_check: applied.is_check,
            is_checkmate: applied.is_checkmate,
            is_stalemate: applied.is_stalemate,
            is_draw: applied.is_draw,
        },
    );
    if let Some(reason) = applied.reason {
        registry.broadcast(
            applied.game_id,
            ServerMsg::GameOver {
                game_id: applied.game_id,
                result: reason,
                winner: applied.winner,
            },
        );
    }
}

/// Guards the opportunistic bot-move chain is expected to trip: a game with
/// no bot seat, a bot that is not on turn, or a game that already ended.
fn is_benign_probe_error(err: &AppError) -> bool {
    matches!(
        err.code(),
        "NOT_BOT_GAME" | "NOT_BOT_TURN" | "GAME_NOT_ACTIVE"
    )
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            user_id = self.user_id,
            "[WS SESSION] started"
        );

        self.registry()
            .register_connection(self.conn_id, ctx.address().recipient::<Outbound>());
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry().unregister_connection(self.conn_id);
        self.app_state.matchmaker().remove_connection(self.conn_id);
        info!(
            conn_id = %self.conn_id,
            user_id = self.user_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(cmd) => self.dispatch(cmd, ctx),
                    Err(_) => Self::send_error(
                        ctx,
                        &AppError::invalid("BAD_REQUEST", "Malformed message"),
                    ),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, &AppError::invalid("BAD_REQUEST", "Binary not supported"));
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    user_id = self.user_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &msg.0);
    }
}
