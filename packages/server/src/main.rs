use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use streetreview::build_router;
use streetreview::config::AppConfig;
use streetreview::database::{init_db, migrate};
use streetreview::state::AppState;
use streetreview::utils::image_probe::{HttpImageProbe, ImageProbe, NoopImageProbe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to database")?;

    // Never serve against a partially migrated schema.
    let applied = migrate(&db).await.context("Database migration failed")?;
    info!(applied = applied.len(), "Database schema is up to date");

    let image_probe: Arc<dyn ImageProbe> = if config.image_probe.enabled {
        Arc::new(
            HttpImageProbe::new(&config.image_probe)
                .context("Failed to build image probe client")?,
        )
    } else {
        info!("Image probe disabled");
        Arc::new(NoopImageProbe)
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        image_probe,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
