use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr};

use crate::config::AppConfig;
use crate::database;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
}

impl AppState {
    /// Begin a write transaction with the configured statement timeout.
    pub async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        database::begin(&self.db, self.config.database.statement_timeout_ms).await
    }
}
