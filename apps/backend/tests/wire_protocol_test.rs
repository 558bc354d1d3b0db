//! Pins the socket event surface: every event keeps its published name and
//! payload shape.

use backend::domain::game::{Color, GameOverReason, PlayerRef};
use backend::entities::games::{GameResult, GameStatus, TimeControl};
use backend::ws::protocol::{ClientMsg, GameSnapshot, ServerMsg};
use time::OffsetDateTime;

fn tag_of(value: &serde_json::Value) -> &str {
    value["type"].as_str().expect("tagged message")
}

#[test]
fn client_event_names_are_stable() {
    let cases: Vec<(ClientMsg, &str)> = vec![
        (ClientMsg::JoinGame { game_id: 1 }, "join_game"),
        (ClientMsg::LeaveGame { game_id: 1 }, "leave_game"),
        (
            ClientMsg::MakeMove {
                game_id: 1,
                san: "e4".into(),
            },
            "make_move",
        ),
        (ClientMsg::Resign { game_id: 1 }, "resign"),
        (ClientMsg::DrawOffer { game_id: 1 }, "draw_offer"),
        (
            ClientMsg::DrawResponse {
                game_id: 1,
                accepted: true,
            },
            "draw_response",
        ),
        (ClientMsg::AbortGame { game_id: 1 }, "abort_game"),
        (
            ClientMsg::TimeUpdate {
                game_id: 1,
                white_time: 250,
                black_time: 240,
            },
            "time_update",
        ),
        (
            ClientMsg::JoinQueue {
                time_control: TimeControl::Blitz,
                time_limit: 300,
                time_increment: 0,
                rating: 1500,
                rating_range: [1400, 1600],
                is_rated: true,
            },
            "join_queue",
        ),
        (
            ClientMsg::LeaveQueue {
                time_control: TimeControl::Blitz,
                time_limit: 300,
                time_increment: 0,
            },
            "leave_queue",
        ),
        (
            ClientMsg::SendMessage {
                game_id: 1,
                message: "gg".into(),
            },
            "send_message",
        ),
    ];

    for (msg, expected) in cases {
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(tag_of(&value), expected);
        // Every client event must parse back from its own wire form.
        let parsed: ClientMsg = serde_json::from_value(value).unwrap();
        assert_eq!(
            tag_of(&serde_json::to_value(&parsed).unwrap()),
            expected
        );
    }
}

#[test]
fn server_event_names_are_stable() {
    let snapshot = GameSnapshot {
        id: 9,
        white: PlayerRef::human(11),
        black: PlayerRef::bot("rookie"),
        time_control: TimeControl::Blitz,
        time_limit: 300,
        time_increment: 0,
        is_rated: false,
        white_time_remaining: 300,
        black_time_remaining: 300,
        status: GameStatus::InProgress,
        result: None,
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".into(),
        pgn: String::new(),
        current_turn: Color::White,
        started_at: OffsetDateTime::UNIX_EPOCH,
        ended_at: None,
    };

    let cases: Vec<(ServerMsg, &str)> = vec![
        (
            ServerMsg::GameJoined {
                game_id: 9,
                game: snapshot,
            },
            "game_joined",
        ),
        (
            ServerMsg::MoveMade {
                game_id: 9,
                san: "e4".into(),
                fen: "fen".into(),
                is_check: false,
                is_checkmate: false,
                is_stalemate: false,
                is_draw: false,
            },
            "move_made",
        ),
        (
            ServerMsg::GameOver {
                game_id: 9,
                result: GameOverReason::Timeout,
                winner: Some(Color::Black),
            },
            "game_over",
        ),
        (
            ServerMsg::DrawOffer {
                game_id: 9,
                from: 11,
            },
            "draw_offer",
        ),
        (ServerMsg::DrawDeclined { game_id: 9 }, "draw_declined"),
        (
            ServerMsg::TimeUpdate {
                game_id: 9,
                white_time: 100,
                black_time: 90,
            },
            "time_update",
        ),
        (ServerMsg::QueueJoined { position: 1 }, "queue_joined"),
        (ServerMsg::QueueLeft, "queue_left"),
        (
            ServerMsg::MatchFound {
                game_id: 9,
                color: Color::White,
            },
            "match_found",
        ),
        (
            ServerMsg::ReceiveMessage {
                game_id: 9,
                from: 11,
                message: "gg".into(),
                timestamp: OffsetDateTime::UNIX_EPOCH,
            },
            "receive_message",
        ),
        (
            ServerMsg::Error {
                code: "NOT_YOUR_TURN".into(),
                message: "Not your turn".into(),
            },
            "error",
        ),
    ];

    for (msg, expected) in cases {
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(tag_of(&value), expected);
    }
}

#[test]
fn snapshot_seats_are_tagged_unions() {
    let value = serde_json::to_value(PlayerRef::bot("grandmaster")).unwrap();
    assert_eq!(value["kind"], "bot");
    assert_eq!(value["bot_id"], "grandmaster");

    let value = serde_json::to_value(PlayerRef::human(42)).unwrap();
    assert_eq!(value["kind"], "human");
    assert_eq!(value["id"], 42);
}

#[test]
fn enums_use_snake_case_wire_values() {
    assert_eq!(
        serde_json::to_value(GameStatus::InProgress).unwrap(),
        "in_progress"
    );
    assert_eq!(
        serde_json::to_value(GameResult::WhiteWin).unwrap(),
        "white_win"
    );
    assert_eq!(serde_json::to_value(TimeControl::Blitz).unwrap(), "blitz");
    assert_eq!(
        serde_json::to_value(GameOverReason::DrawAgreement).unwrap(),
        "draw_agreement"
    );
}
