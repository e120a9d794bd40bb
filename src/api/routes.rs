//! API Route Configuration

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{auth_middleware, logging_middleware, rate_limit_middleware};

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health & Status
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        // Entities
        .route("/countries", get(handlers::list_countries))
        .route("/countries/:id", get(handlers::get_country))
        .route("/suppliers", get(handlers::list_suppliers))
        .route("/suppliers/:id", get(handlers::get_supplier))
        .route("/products", get(handlers::list_products))
        .route("/products/:id", get(handlers::get_product))
        .route("/trade-routes", get(handlers::list_trade_routes))
        .route("/trade-routes/:id", get(handlers::get_trade_route))
        .route("/companies", get(handlers::list_companies))
        .route("/companies/:id", get(handlers::get_company))
        // Risk analytics
        .route(
            "/risk-score/:entity_type/:id",
            get(handlers::get_risk_score),
        )
        .route(
            "/supply-chain-risk/:company_id",
            get(handlers::get_supply_chain_risk),
        )
        .route("/risk-alerts", get(handlers::get_risk_alerts))
        .route("/dashboard-summary", get(handlers::get_dashboard_summary));

    // Build full router
    Router::new()
        .nest("/v1", api_v1)
        // Also expose health at root for load balancers
        .route("/health", get(handlers::health_check))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(middleware::from_fn(auth_middleware))
}
