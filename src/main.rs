use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use spabook::config::AppConfig;
use spabook::db;
use spabook::handlers;
use spabook::services::directions::osrm::OsrmProvider;
use spabook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url, Path::new(&config.migrations_dir))?;

    tracing::info!(url = %config.directions_url, "using OSRM directions provider");
    let directions = OsrmProvider::new(config.directions_url.clone());

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        directions: Box::new(directions),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
