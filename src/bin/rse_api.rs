//! TigerTrust RSE API Server
//!
//! Usage:
//!   cargo run --bin rse_api
//!
//! Environment:
//!   PORT / RSE_PORT  - Server port (default: 4000)
//!   RSE_HOST         - Server host (default: 0.0.0.0)
//!   SOLANA_NETWORK   - mainnet-beta | devnet | testnet (default: devnet)
//!   SOLANA_RPC_URL   - Explicit RPC endpoint
//!   RUST_LOG         - Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use tigertrust_rse::api::{create_router, handlers::AppState, start_cleanup_task};
use tigertrust_rse::providers::mask_url;
use tigertrust_rse::utils::constants::{APP_NAME, APP_VERSION};
use tigertrust_rse::{EngineConfig, TelemetryCollector, TrustScorer};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = EngineConfig::from_env()?;
    let scorer = TrustScorer::from_config(&config)?;

    let telemetry = Arc::new(TelemetryCollector::new());
    let state = Arc::new(AppState::new(
        scorer,
        telemetry.clone(),
        &config.api,
        config.ledger.network.name(),
    ));

    start_cleanup_task(state.rate_limiter.clone());

    let app = create_router(state);

    let addr = config.api.socket_addr()?;

    info!(
        network = config.ledger.network.name(),
        rpc = %mask_url(&config.ledger.rpc_url),
        policy = %config.scoring.version,
        "{} v{} starting on http://{}",
        APP_NAME,
        APP_VERSION,
        addr
    );
    info!("  POST /api/risk/recalculate  - Score a wallet");
    info!("  POST /v1/risk/recalculate   - Score a wallet");
    info!("  GET  /v1/stats              - Scoring statistics");
    info!("  GET  /v1/health             - Health check");

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received");
    info!("Final stats: {}", telemetry.get_stats().summary());
    info!("{} shutdown complete", APP_NAME);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
}
