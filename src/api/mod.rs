//! Sentinel Cloud API Module
//! REST API for trade risk scoring and supply chain analytics

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
