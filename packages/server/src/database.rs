use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    TransactionTrait,
};

use crate::config::DatabaseConfig;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// Open a write transaction bounded by the configured statement timeout.
///
/// The timeout is transaction-local, so pooled connections are left untouched
/// once the transaction ends.
pub async fn begin(
    db: &DatabaseConnection,
    statement_timeout_ms: u64,
) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    if statement_timeout_ms > 0 {
        txn.execute_unprepared(&format!(
            "SET LOCAL statement_timeout = {statement_timeout_ms}"
        ))
        .await?;
    }
    Ok(txn)
}
