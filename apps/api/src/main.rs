mod config;
mod errors;
mod intake;
mod matching;
mod models;
mod records;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::intake::progress::ManualProgress;
use crate::intake::IntakeSessions;
use crate::matching::{MatchClient, MatchRunner};
use crate::records::{MemoryRecordStore, PgRecordStore, RecordStore};
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent API v{}", env!("CARGO_PKG_VERSION"));

    let records: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => Arc::new(PgRecordStore::connect(url).await?),
        None => {
            info!("DATABASE_URL not set; keeping records in memory");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let matchmaker = MatchClient::new(
        config.matchmaking_url.clone(),
        Duration::from_secs(config.matchmaking_timeout_secs),
    )?;
    info!(
        "Matchmaking client initialized (endpoint: {}, timeout: {}s)",
        matchmaker.endpoint(),
        config.matchmaking_timeout_secs
    );

    let session_ttl = Duration::from_secs(config.intake_session_ttl_secs);
    let intake = IntakeSessions::new(Arc::new(ManualProgress), session_ttl);
    tokio::spawn({
        let intake = intake.clone();
        async move {
            let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                intake.sweep_idle().await;
            }
        }
    });

    let state = AppState {
        records: records.clone(),
        intake,
        matchmaking: Arc::new(MatchRunner::new(records, Arc::new(matchmaker))),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the front-end origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
