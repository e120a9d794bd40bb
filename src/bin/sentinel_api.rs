//! Sentinel Cloud API Server
//!
//! REST API for trade risk scoring and supply chain analytics
//!
//! Usage:
//!   cargo run --bin sentinel_api
//!
//! Environment:
//!   SENTINEL_PORT - Server port (default: 8000, PORT takes precedence)
//!   SENTINEL_HOST - Server host (default: 0.0.0.0)
//!   SENTINEL_SEED - Dataset seed (default: 42)
//!   RUST_LOG      - Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use sentinel_iscore::api::{create_router, handlers::AppState, start_cleanup_task};
use sentinel_iscore::Settings;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let settings = Settings::from_env();
    info!(
        "⚙️ Settings: seed={}, cache TTL={}s, rate limit={}/min",
        settings.dataset_seed,
        settings.score_cache_ttl.as_secs(),
        settings.rate_limit_requests
    );

    // Create app state (generates the synthetic dataset)
    let state = Arc::new(AppState::new(&settings)?);
    let telemetry_for_shutdown = state.telemetry.clone();

    // Start background cleanup task for rate limiter
    start_cleanup_task();
    info!("🧹 Background cleanup task started");

    // Create router
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;

    info!("🚀 Sentinel API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  GET /v1/countries                      - List countries");
    info!("  GET /v1/suppliers                      - List suppliers");
    info!("  GET /v1/products                       - List products");
    info!("  GET /v1/trade-routes                   - List trade routes");
    info!("  GET /v1/companies                      - List companies");
    info!("  GET /v1/risk-score/:entity_type/:id    - Composite risk score");
    info!("  GET /v1/supply-chain-risk/:company_id  - Supply chain breakdown");
    info!("  GET /v1/risk-alerts                    - Active risk events");
    info!("  GET /v1/dashboard-summary              - Dashboard aggregates");
    info!("  GET /v1/stats                          - Service statistics");
    info!("  GET /v1/health                         - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");
    info!("");

    // Start server with graceful shutdown
    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");

    let stats = telemetry_for_shutdown.get_stats();
    info!("📊 Exporting final telemetry...");
    info!("   Total scored: {}", stats.total_scored);
    info!("   High risk detected: {}", stats.high_risk_detected);

    if let Err(e) = telemetry_for_shutdown.flush() {
        warn!("   ⚠️ Failed to flush telemetry events: {}", e);
    }
    match telemetry_for_shutdown.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    info!("👋 Sentinel API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════════╗
    ║                                                          ║
    ║    S E N T I N E L   i - S C O R E                       ║
    ║                                                          ║
    ║    Geopolitical Trade Risk Intelligence                  ║
    ║    C L O U D   A P I   v0.1.0                            ║
    ║                                                          ║
    ╚══════════════════════════════════════════════════════════╝
    "#
    );
}
