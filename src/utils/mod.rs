//! Utils Module - Caching & Telemetry

pub mod cache;
pub mod telemetry;

pub use cache::*;
pub use telemetry::*;
