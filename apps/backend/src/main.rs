use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use backend::config::engine::EngineConfig;
use backend::engine::EngineHandle;
use backend::middleware::cors::cors_middleware;
use backend::state::security_config::SecurityConfig;
use backend::{config, routes, telemetry, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let jwt = match std::env::var("BACKEND_JWT_SECRET") {
        Ok(jwt) => jwt,
        Err(_) => {
            eprintln!("BACKEND_JWT_SECRET must be set");
            std::process::exit(1);
        }
    };
    let security_config = SecurityConfig::new(jwt.as_bytes());

    let db = match config::db::db_url() {
        Ok(url) => match config::db::connect_db(&url).await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("Failed to connect to database: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // The engine child process itself starts lazily on the first bot move.
    let engine = EngineHandle::spawn(EngineConfig::from_env());

    let app_state = AppState::new(Some(db), security_config, Arc::new(engine.clone()));
    let data = web::Data::new(app_state);

    tracing::info!(host = %host, port, "starting game server");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    engine.shutdown().await;
    server
}
