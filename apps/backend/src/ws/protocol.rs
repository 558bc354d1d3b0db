//! Wire protocol for the realtime gateway.
//!
//! Both directions are JSON objects tagged by `type`; the tags are the
//! event surface the clients speak (`join_game`, `move_made`, ...).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::game::{Color, GameOverReason, PlayerRef};
use crate::entities::games::{GameResult, GameStatus, TimeControl};
use crate::repos::games::Game;

/// The full game record sent as the reply to `join_game`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
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
    pub current_turn: Color,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
}

impl From<Game> for GameSnapshot {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            white: game.white,
            black: game.black,
            time_control: game.time_control,
            time_limit: game.time_limit,
            time_increment: game.time_increment,
            is_rated: game.is_rated,
            white_time_remaining: game.white_time_remaining,
            black_time_remaining: game.black_time_remaining,
            status: game.status,
            result: game.result,
            fen: game.fen,
            pgn: game.pgn,
            current_turn: game.turn,
            started_at: game.started_at,
            ended_at: game.ended_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    JoinGame {
        game_id: i64,
    },
    LeaveGame {
        game_id: i64,
    },
    MakeMove {
        game_id: i64,
        #[serde(rename = "move")]
        san: String,
    },
    Resign {
        game_id: i64,
    },
    DrawOffer {
        game_id: i64,
    },
    DrawResponse {
        game_id: i64,
        accepted: bool,
    },
    AbortGame {
        game_id: i64,
    },
    TimeUpdate {
        game_id: i64,
        white_time: i32,
        black_time: i32,
    },
    JoinQueue {
        time_control: TimeControl,
        time_limit: i32,
        time_increment: i32,
        rating: i32,
        /// Inclusive [min, max] band; its width is the match window.
        rating_range: [i32; 2],
        is_rated: bool,
    },
    LeaveQueue {
        time_control: TimeControl,
        time_limit: i32,
        time_increment: i32,
    },
    SendMessage {
        game_id: i64,
        message: String,
    },
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    GameJoined {
        game_id: i64,
        game: GameSnapshot,
    },
    MoveMade {
        game_id: i64,
        #[serde(rename = "move")]
        san: String,
        fen: String,
        is_check: bool,
        is_checkmate: bool,
        is_stalemate: bool,
        is_draw: bool,
    },
    GameOver {
        game_id: i64,
        result: GameOverReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<Color>,
    },
    DrawOffer {
        game_id: i64,
        from: i64,
    },
    DrawDeclined {
        game_id: i64,
    },
    TimeUpdate {
        game_id: i64,
        white_time: i32,
        black_time: i32,
    },
    QueueJoined {
        position: usize,
    },
    QueueLeft,
    MatchFound {
        game_id: i64,
        color: Color,
    },
    ReceiveMessage {
        game_id: i64,
        from: i64,
        message: String,
        timestamp: OffsetDateTime,
    },
    Error {
        code: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_use_the_published_names() {
        let msg: ClientMsg = serde_json::from_str(
            r#"{"type":"make_move","game_id":7,"move":"Nf3"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMsg::MakeMove { game_id: 7, ref san } if san == "Nf3"));

        let msg: ClientMsg = serde_json::from_str(
            r#"{"type":"join_queue","time_control":"blitz","time_limit":300,
                "time_increment":0,"rating":1500,"rating_range":[1400,1600],"is_rated":true}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientMsg::JoinQueue {
                time_control: TimeControl::Blitz,
                time_limit: 300,
                rating_range: [1400, 1600],
                ..
            }
        ));
    }

    #[test]
    fn move_made_carries_flags_and_move_key() {
        let json = serde_json::to_string(&ServerMsg::MoveMade {
            game_id: 3,
            san: "Re8#".to_string(),
            fen: "fen".to_string(),
            is_check: true,
            is_checkmate: true,
            is_stalemate: false,
            is_draw: false,
        })
        .unwrap();
        assert!(json.contains(r#""type":"move_made""#));
        assert!(json.contains(r#""move":"Re8#""#));
        assert!(json.contains(r#""is_checkmate":true"#));
    }

    #[test]
    fn game_over_omits_absent_winner() {
        let draw = serde_json::to_string(&ServerMsg::GameOver {
            game_id: 3,
            result: GameOverReason::Draw,
            winner: None,
        })
        .unwrap();
        assert!(draw.contains(r#""result":"draw""#));
        assert!(!draw.contains("winner"));

        let mate = serde_json::to_string(&ServerMsg::GameOver {
            game_id: 3,
            result: GameOverReason::Checkmate,
            winner: Some(Color::White),
        })
        .unwrap();
        assert!(mate.contains(r#""winner":"white""#));
    }

    #[test]
    fn match_found_names_the_assigned_color() {
        let json = serde_json::to_string(&ServerMsg::MatchFound {
            game_id: 12,
            color: Color::Black,
        })
        .unwrap();
        assert!(json.contains(r#""type":"match_found""#));
        assert!(json.contains(r#""color":"black""#));
    }

    #[test]
    fn queue_left_is_a_bare_event() {
        let json = serde_json::to_string(&ServerMsg::QueueLeft).unwrap();
        assert_eq!(json, r#"{"type":"queue_left"}"#);
    }
}
