use std::net::SocketAddr;

use anyhow::Context;
use server::config::AppConfig;
use server::state::AppState;
use server::{build_router, database, seed};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db).await?;
    seed::promote_admins(&db, &config.bootstrap.admin_usernames).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = build_router(AppState { db, config });

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
