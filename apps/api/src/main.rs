mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;
mod storage;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::llm_client::HfChatClient;
use crate::resume::extraction::PdfTextExtractor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::LocalFileStore;
use crate::store::postgres::PgSessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    init_schema(&pool).await?;

    // Initialize upload storage
    let files = LocalFileStore::new(&config.upload_dir);
    files.ensure_root().await.map_err(anyhow::Error::new)?;
    info!("Upload storage ready at {}", config.upload_dir);

    // Initialize generative client
    let llm = HfChatClient::new(config.hf_api_key.clone());
    info!("Generative client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        store: Arc::new(PgSessionStore::new(pool)),
        llm: Arc::new(llm),
        files: Arc::new(files),
        extractor: Arc::new(PdfTextExtractor),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
