use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::ai::BotMoveGenerator;
use crate::engine::MoveSearch;
use crate::error::AppError;
use crate::services::games::GameSessionService;
use crate::services::matchmaking::Matchmaker;
use crate::state::security_config::SecurityConfig;
use crate::ws::hub::WsRegistry;

/// Application state containing shared resources.
///
/// The registry and matchmaking pools are plain fields here rather than
/// module globals, so every piece of gateway state has exactly one owner.
pub struct AppState {
    /// Database connection (optional for test scenarios)
    db: Option<DatabaseConnection>,
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
    registry: Arc<WsRegistry>,
    matchmaker: Arc<Matchmaker>,
    games: Arc<GameSessionService>,
}

impl AppState {
    pub fn new(
        db: Option<DatabaseConnection>,
        security: SecurityConfig,
        engine: Arc<dyn MoveSearch>,
    ) -> Self {
        Self {
            db,
            security,
            registry: Arc::new(WsRegistry::new()),
            matchmaker: Arc::new(Matchmaker::new()),
            games: Arc::new(GameSessionService::new(BotMoveGenerator::new(engine))),
        }
    }

    pub fn db(&self) -> Result<&DatabaseConnection, AppError> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::db("No database connection configured"))
    }

    pub fn registry(&self) -> Arc<WsRegistry> {
        self.registry.clone()
    }

    pub fn matchmaker(&self) -> Arc<Matchmaker> {
        self.matchmaker.clone()
    }

    pub fn games(&self) -> Arc<GameSessionService> {
        self.games.clone()
    }
}
