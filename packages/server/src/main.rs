use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use common::media::FilesystemMediaStore;
use tracing::{Level, info};

use scribe_server::config::AppConfig;
use scribe_server::state::AppState;
use scribe_server::{build_router, database, notify, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db).await?;
    if let Some(admin) = &config.admin {
        seed::seed_superuser(&db, admin).await?;
    }

    let media = FilesystemMediaStore::new(
        PathBuf::from(&config.storage.media_dir),
        config.storage.max_image_size,
    )
    .await
    .context("Failed to prepare media directory")?;
    let notifier = notify::build_notifier(&config.email)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        notifier,
        media: Arc::new(media),
    };
    let app = build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
