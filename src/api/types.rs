//! API Request/Response Types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::store::{DashboardSummary, Page};
use crate::models::types::{
    Company, Country, Product, RiskEvent, RouteType, Supplier, TradeRoute,
};
use crate::utils::cache::CacheStats;
use crate::utils::telemetry::TelemetryStats;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: "Invalid or missing API key".to_string(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

// ============================================
// Query parameters
// ============================================

/// Build a pagination window from optional query fields
pub fn to_page(skip: Option<usize>, limit: Option<usize>) -> Page {
    let d = Page::default();
    Page {
        skip: skip.unwrap_or(d.skip),
        limit: limit.unwrap_or(d.limit).min(1000),
    }
}

// serde_urlencoded cannot flatten numeric fields, so skip/limit are
// repeated per query struct instead of shared via #[serde(flatten)]

#[derive(Debug, Deserialize, Default)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub risk_min: Option<f64>,
    pub risk_max: Option<f64>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SupplierQuery {
    pub country_id: Option<u32>,
    pub industry: Option<String>,
    pub tier: Option<u8>,
    pub risk_min: Option<f64>,
    pub risk_max: Option<f64>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RouteQuery {
    pub route_type: Option<RouteType>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CompanyQuery {
    pub sector: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AlertQuery {
    pub severity_min: Option<f64>,
    pub event_type: Option<String>,
    pub country_id: Option<u32>,
    pub limit: Option<usize>,
}

// ============================================
// Entity listings
// ============================================

#[derive(Debug, Serialize)]
pub struct ListData<T: Serialize> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub skip: usize,
    pub limit: usize,
}

impl<T: Serialize> ListData<T> {
    pub fn new(items: Vec<T>, total_count: usize, page: Page) -> Self {
        Self {
            items,
            total_count,
            skip: page.skip,
            limit: page.limit,
        }
    }
}

pub type CountryListData = ListData<Country>;
pub type SupplierListData = ListData<Supplier>;
pub type ProductListData = ListData<Product>;
pub type RouteListData = ListData<TradeRoute>;
pub type CompanyListData = ListData<Company>;

/// A country plus derived exposure statistics
#[derive(Debug, Serialize)]
pub struct CountryDetailData {
    #[serde(flatten)]
    pub country: Country,
    pub statistics: CountryStatistics,
}

#[derive(Debug, Serialize)]
pub struct CountryStatistics {
    pub supplier_count: usize,
    pub active_risk_events: usize,
    pub risk_level: String,
}

// ============================================
// Risk scoring
// ============================================

#[derive(Debug, Serialize)]
pub struct RiskScoreData {
    pub entity_type: String,
    pub entity_id: u32,
    pub risk_score: f64,
    pub level: String,
    pub color: String,
    pub breakdown: BTreeMap<String, f64>,
    /// Whether the score came from the cache
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct SupplyChainRiskData {
    pub company_id: u32,
    pub company_name: String,
    pub overall_risk_score: f64,
    pub level: String,
    pub color: String,
    pub supplier_risk: f64,
    pub route_risk: f64,
    pub product_risk: f64,
    pub concentration_risk: f64,
    pub geographic_concentration: f64,
    pub supplier_count: usize,
    pub route_count: usize,
    pub product_count: usize,
}

// ============================================
// Alerts & dashboard
// ============================================

#[derive(Debug, Serialize)]
pub struct AlertsData {
    pub alerts: Vec<RiskEvent>,
    pub total_count: usize,
}

pub type DashboardData = DashboardSummary;

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub telemetry: TelemetryStats,
    pub cache: CacheStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
