//! Database configuration and connection.

use std::env;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::AppError;

/// Database URL from the runtime environment.
pub fn db_url() -> Result<String, AppError> {
    env::var("DATABASE_URL").map_err(|_| AppError::config("DATABASE_URL must be set"))
}

pub async fn connect_db(url: &str) -> Result<DatabaseConnection, AppError> {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    Database::connect(options)
        .await
        .map_err(|e| AppError::db(format!("Failed to connect to database: {e}")))
}
