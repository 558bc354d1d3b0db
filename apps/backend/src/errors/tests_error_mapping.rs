use actix_web::http::StatusCode;

use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind, RuleKind};

#[test]
fn rule_violations_map_to_stable_codes() {
    let cases = [
        (RuleKind::GameNotActive, "GAME_NOT_ACTIVE"),
        (RuleKind::NotYourTurn, "NOT_YOUR_TURN"),
        (RuleKind::IllegalMove, "ILLEGAL_MOVE"),
        (RuleKind::AbortWindowClosed, "ABORT_WINDOW_CLOSED"),
        (RuleKind::InvalidBotId, "INVALID_BOT_ID"),
        (RuleKind::NotBotGame, "NOT_BOT_GAME"),
        (RuleKind::NotBotTurn, "NOT_BOT_TURN"),
        (RuleKind::NoLegalMoves, "NO_LEGAL_MOVES"),
    ];

    for (kind, expected) in cases {
        let app: AppError = DomainError::rule(kind, "detail").into();
        assert_eq!(app.code(), expected);
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
    }
}

#[test]
fn not_found_maps_to_404() {
    let app: AppError = DomainError::not_found(NotFoundKind::Game, "Game not found").into();
    assert_eq!(app.code(), "GAME_NOT_FOUND");
    assert_eq!(app.status(), StatusCode::NOT_FOUND);

    let app: AppError = DomainError::not_found(NotFoundKind::BotProfile, "no such bot").into();
    assert_eq!(app.code(), "BOT_NOT_FOUND");
}

#[test]
fn optimistic_lock_maps_to_conflict() {
    let app: AppError =
        DomainError::conflict(ConflictKind::OptimisticLock, "lock version mismatch").into();
    assert_eq!(app.code(), "OPTIMISTIC_LOCK");
    assert_eq!(app.status(), StatusCode::CONFLICT);
}

#[test]
fn engine_failures_map_to_internal_with_engine_codes() {
    let app: AppError = DomainError::infra(InfraErrorKind::EngineUnavailable, "spawn failed").into();
    assert_eq!(app.code(), "ENGINE_UNAVAILABLE");
    assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let app: AppError = DomainError::infra(InfraErrorKind::EngineTimeout, "no bestmove").into();
    assert_eq!(app.code(), "ENGINE_TIMEOUT");
}

#[test]
fn internal_detail_is_not_leaked() {
    let app = AppError::internal("INTERNAL", "stack trace and secrets");
    assert_eq!(app.detail(), "Internal error");
}
