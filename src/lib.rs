//! Sentinel i-Score Library
//!
//! Composite risk scoring for geopolitical trade exposure:
//! - Country risk from political, economic and corruption indices
//! - Supplier risk across financial, cyber, operational and tier factors
//! - Trade route vulnerability with transport mode and chokepoint weighting
//! - Product risk under market conditions
//! - Company supply chain risk aggregated over the full sourcing graph

pub mod api;
pub mod core;
pub mod data;
pub mod models;
pub mod utils;

pub use crate::core::engine::{IScoreEngine, MarketConditions, ScoreDetail};
pub use crate::core::score::{compute_score, CompositeScore, RiskFactorSet, WeightScheme};
pub use data::generator::DataGenerator;
pub use data::store::RiskStore;
pub use models::config::{DatasetSizes, Settings};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{EntityType, RiskLevel};
pub use utils::cache::{CacheStats, ScoreCache};
pub use utils::telemetry::{TelemetryCollector, TelemetryEvent, TelemetryStats};
