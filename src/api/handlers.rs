//! API Request Handlers

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

use super::types::*;
use crate::core::engine::{IScoreEngine, MarketConditions};
use crate::data::generator::DataGenerator;
use crate::data::store::{
    CompanyFilter, CountryFilter, EventFilter, ProductFilter, RiskStore, RouteFilter,
    SupplierFilter, HIGH_RISK_THRESHOLD,
};
use crate::models::config::Settings;
use crate::models::errors::AppResult;
use crate::models::types::{EntityType, EventType, RiskLevel};
use crate::utils::cache::{ScoreCache, ScoreRecord};
use crate::utils::telemetry::{TelemetryCollector, TelemetryEvent};

type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

/// Fallback country risk when an entity references an unknown country
const NEUTRAL_COUNTRY_RISK: f64 = 50.0;

/// Shared application state
pub struct AppState {
    pub store: Arc<RiskStore>,
    pub engine: IScoreEngine,
    pub cache: Arc<ScoreCache>,
    pub telemetry: Arc<TelemetryCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: &Settings) -> AppResult<Self> {
        let store = Arc::new(RiskStore::new());
        let mut generator = DataGenerator::new(settings.dataset_seed);
        let counts = generator.populate(&store, &settings.dataset_sizes)?;
        info!(
            "📊 Dataset ready: {} countries, {} suppliers, {} products, {} routes, {} companies, {} events",
            counts.countries,
            counts.suppliers,
            counts.products,
            counts.trade_routes,
            counts.companies,
            counts.risk_events
        );

        let cache = Arc::new(ScoreCache::with_ttl(settings.score_cache_ttl.as_secs()));

        // Background task: cleanup expired cache entries every 60 seconds
        let cache_clone = cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                cache_clone.cleanup_expired();
            }
        });

        let telemetry = Arc::new(TelemetryCollector::with_config(
            settings.telemetry_dir.clone().into(),
            1000,
        ));

        Ok(Self {
            store,
            engine: IScoreEngine::new(),
            cache,
            telemetry,
            start_time: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn error_response(
    status: StatusCode,
    error: ApiError,
    start: Instant,
) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        status,
        Json(ApiResponse::error(
            error,
            start.elapsed().as_secs_f64() * 1000.0,
        )),
    )
}

fn latency_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, latency_ms(start)))
}

// ============================================
// Countries
// ============================================

pub async fn list_countries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Json<ApiResponse<CountryListData>> {
    let start = Instant::now();
    let page = to_page(query.skip, query.limit);

    let (items, total) = state.store.list_countries(&CountryFilter {
        region: query.region,
        risk_min: query.risk_min,
        risk_max: query.risk_max,
        page,
    });

    Json(ApiResponse::success(
        ListData::new(items, total, page),
        latency_ms(start),
    ))
}

pub async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> HandlerResult<CountryDetailData> {
    let start = Instant::now();

    let country = state.store.get_country(id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Country {} not found", id)),
            start,
        )
    })?;

    let statistics = CountryStatistics {
        supplier_count: state.store.supplier_count_for_country(id),
        active_risk_events: state.store.active_event_count_for_country(id),
        risk_level: RiskLevel::from_score(country.risk_score).as_str().to_string(),
    };

    Ok(Json(ApiResponse::success(
        CountryDetailData {
            country,
            statistics,
        },
        latency_ms(start),
    )))
}

// ============================================
// Suppliers
// ============================================

pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SupplierQuery>,
) -> Json<ApiResponse<SupplierListData>> {
    let start = Instant::now();
    let page = to_page(query.skip, query.limit);

    let (items, total) = state.store.list_suppliers(&SupplierFilter {
        country_id: query.country_id,
        industry: query.industry,
        tier: query.tier,
        risk_min: query.risk_min,
        risk_max: query.risk_max,
        page,
    });

    Json(ApiResponse::success(
        ListData::new(items, total, page),
        latency_ms(start),
    ))
}

pub async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> HandlerResult<crate::models::types::Supplier> {
    let start = Instant::now();

    let supplier = state.store.get_supplier(id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Supplier {} not found", id)),
            start,
        )
    })?;

    Ok(Json(ApiResponse::success(supplier, latency_ms(start))))
}

// ============================================
// Products
// ============================================

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Json<ApiResponse<ProductListData>> {
    let start = Instant::now();
    let page = to_page(query.skip, query.limit);

    let (items, total) = state.store.list_products(&ProductFilter {
        category: query.category,
        page,
    });

    Json(ApiResponse::success(
        ListData::new(items, total, page),
        latency_ms(start),
    ))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> HandlerResult<crate::models::types::Product> {
    let start = Instant::now();

    let product = state.store.get_product(id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Product {} not found", id)),
            start,
        )
    })?;

    Ok(Json(ApiResponse::success(product, latency_ms(start))))
}

// ============================================
// Trade Routes
// ============================================

pub async fn list_trade_routes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
) -> Json<ApiResponse<RouteListData>> {
    let start = Instant::now();
    let page = to_page(query.skip, query.limit);

    let (items, total) = state.store.list_trade_routes(&RouteFilter {
        route_type: query.route_type,
        page,
    });

    Json(ApiResponse::success(
        ListData::new(items, total, page),
        latency_ms(start),
    ))
}

pub async fn get_trade_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> HandlerResult<crate::models::types::TradeRoute> {
    let start = Instant::now();

    let route = state.store.get_trade_route(id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Trade route {} not found", id)),
            start,
        )
    })?;

    Ok(Json(ApiResponse::success(route, latency_ms(start))))
}

// ============================================
// Companies
// ============================================

pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Json<ApiResponse<CompanyListData>> {
    let start = Instant::now();
    let page = to_page(query.skip, query.limit);

    let (items, total) = state.store.list_companies(&CompanyFilter {
        sector: query.sector,
        page,
    });

    Json(ApiResponse::success(
        ListData::new(items, total, page),
        latency_ms(start),
    ))
}

pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> HandlerResult<crate::models::types::Company> {
    let start = Instant::now();

    let company = state.store.get_company(id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Company {} not found", id)),
            start,
        )
    })?;

    Ok(Json(ApiResponse::success(company, latency_ms(start))))
}

// ============================================
// Risk Scoring
// ============================================

pub async fn get_risk_score(
    State(state): State<Arc<AppState>>,
    Path((entity_type, id)): Path<(String, u32)>,
) -> HandlerResult<RiskScoreData> {
    let start = Instant::now();

    let entity_type = EntityType::parse(&entity_type).ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request(format!(
                "Unknown entity type '{}'. Supported: country, supplier, trade-route, product, company",
                entity_type
            )),
            start,
        )
    })?;

    // CACHE-FIRST: serve a fresh score without recomputation
    if let Some(record) = state.cache.get(entity_type, id) {
        return Ok(Json(ApiResponse::success(
            RiskScoreData {
                entity_type: entity_type.as_str().to_string(),
                entity_id: id,
                risk_score: record.score,
                level: record.level.as_str().to_string(),
                color: record.level.color_code().to_string(),
                breakdown: record.breakdown,
                cached: true,
            },
            latency_ms(start),
        )));
    }

    let record = match compute_entity_score(&state, entity_type, id) {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                ApiError::not_found(format!("{} {} not found", entity_type.as_str(), id)),
                start,
            ))
        }
        Err(e) => {
            error!("❌ Scoring failed for {} {}: {}", entity_type.as_str(), id, e);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(format!("Scoring failed: {}", e)),
                start,
            ));
        }
    };

    state.cache.set(record.clone());

    let high_risk = record.score >= HIGH_RISK_THRESHOLD;
    state.telemetry.record_scoring(
        TelemetryEvent::new(
            entity_type,
            id,
            record.score,
            record.level,
            start.elapsed().as_millis() as u64,
        ),
        high_risk,
    );
    if high_risk {
        info!(
            "🚨 High risk detected: {} {} scored {:.1}",
            entity_type.as_str(),
            id,
            record.score
        );
    }

    Ok(Json(ApiResponse::success(
        RiskScoreData {
            entity_type: entity_type.as_str().to_string(),
            entity_id: id,
            risk_score: record.score,
            level: record.level.as_str().to_string(),
            color: record.level.color_code().to_string(),
            breakdown: record.breakdown,
            cached: false,
        },
        latency_ms(start),
    )))
}

/// Compute a fresh score for any scoreable entity; Ok(None) means the
/// entity does not exist
fn compute_entity_score(
    state: &AppState,
    entity_type: EntityType,
    id: u32,
) -> AppResult<Option<ScoreRecord>> {
    let (score, breakdown) = match entity_type {
        EntityType::Country => {
            let Some(country) = state.store.get_country(id) else {
                return Ok(None);
            };
            let detail = state.engine.score_country(&country)?;
            (detail.score.value(), detail.factors.to_map())
        }
        EntityType::Supplier => {
            let Some(supplier) = state.store.get_supplier(id) else {
                return Ok(None);
            };
            let country_risk = state
                .store
                .get_country(supplier.country_id)
                .map(|c| c.risk_score)
                .unwrap_or(NEUTRAL_COUNTRY_RISK);
            let b = state.engine.score_supplier(&supplier, country_risk)?;
            let breakdown = BTreeMap::from([
                ("financial_risk".to_string(), b.financial_risk),
                ("cyber_risk".to_string(), b.cyber_risk),
                ("operational_risk".to_string(), b.operational_risk),
                ("country_risk".to_string(), b.country_risk),
                ("tier_risk".to_string(), b.tier_risk),
            ]);
            (b.overall.value(), breakdown)
        }
        EntityType::TradeRoute => {
            let Some(route) = state.store.get_trade_route(id) else {
                return Ok(None);
            };
            let origin_risk = state
                .store
                .get_country(route.origin_country_id)
                .map(|c| c.risk_score)
                .unwrap_or(NEUTRAL_COUNTRY_RISK);
            let destination_risk = state
                .store
                .get_country(route.destination_country_id)
                .map(|c| c.risk_score)
                .unwrap_or(NEUTRAL_COUNTRY_RISK);
            let detail = state
                .engine
                .score_trade_route(&route, origin_risk, destination_risk)?;
            (detail.score.value(), detail.factors.to_map())
        }
        EntityType::Product => {
            let Some(product) = state.store.get_product(id) else {
                return Ok(None);
            };
            let detail = state
                .engine
                .score_product(&product, &MarketConditions::default())?;
            (detail.score.value(), detail.factors.to_map())
        }
        EntityType::Company => {
            let Some(company) = state.store.get_company(id) else {
                return Ok(None);
            };
            let suppliers = state.store.all_suppliers();
            let routes = state.store.all_trade_routes();
            let products = state.store.all_products();
            let b = state
                .engine
                .score_company(&company, &suppliers, &routes, &products)?;
            let breakdown = BTreeMap::from([
                ("supplier_risk".to_string(), b.supplier_risk),
                ("route_risk".to_string(), b.route_risk),
                ("product_risk".to_string(), b.product_risk),
                ("concentration_risk".to_string(), b.concentration_risk),
                ("geographic_concentration".to_string(), b.geographic_concentration),
            ]);
            (b.overall.value(), breakdown)
        }
    };

    Ok(Some(ScoreRecord {
        entity_type,
        entity_id: id,
        score,
        level: RiskLevel::from_score(score),
        breakdown,
    }))
}

// ============================================
// Supply Chain Risk
// ============================================

pub async fn get_supply_chain_risk(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<u32>,
) -> HandlerResult<SupplyChainRiskData> {
    let start = Instant::now();

    let company = state.store.get_company(company_id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Company {} not found", company_id)),
            start,
        )
    })?;

    let suppliers = state.store.all_suppliers();
    let routes = state.store.all_trade_routes();
    let products = state.store.all_products();

    let breakdown = state
        .engine
        .score_company(&company, &suppliers, &routes, &products)
        .map_err(|e| {
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(format!("Scoring failed: {}", e)),
                start,
            )
        })?;

    let level = RiskLevel::from_score(breakdown.overall.value());

    Ok(Json(ApiResponse::success(
        SupplyChainRiskData {
            company_id,
            company_name: company.name,
            overall_risk_score: breakdown.overall.value(),
            level: level.as_str().to_string(),
            color: level.color_code().to_string(),
            supplier_risk: breakdown.supplier_risk,
            route_risk: breakdown.route_risk,
            product_risk: breakdown.product_risk,
            concentration_risk: breakdown.concentration_risk,
            geographic_concentration: breakdown.geographic_concentration,
            supplier_count: suppliers.len(),
            route_count: routes.len(),
            product_count: products.len(),
        },
        latency_ms(start),
    )))
}

// ============================================
// Risk Alerts
// ============================================

pub async fn get_risk_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlertQuery>,
) -> HandlerResult<AlertsData> {
    let start = Instant::now();

    let event_type = match query.event_type.as_deref() {
        Some(raw) => Some(EventType::parse(raw).ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                ApiError::bad_request(format!("Unknown event type '{}'", raw)),
                start,
            )
        })?),
        None => None,
    };

    let (alerts, total_count) = state.store.list_risk_events(&EventFilter {
        severity_min: query.severity_min,
        event_type,
        country_id: query.country_id,
        limit: query.limit.unwrap_or(100).min(1000),
    });

    Ok(Json(ApiResponse::success(
        AlertsData {
            alerts,
            total_count,
        },
        latency_ms(start),
    )))
}

// ============================================
// Dashboard & Stats
// ============================================

pub async fn get_dashboard_summary(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<DashboardData>> {
    let start = Instant::now();
    let summary = state.store.dashboard_summary();
    Json(ApiResponse::success(summary, latency_ms(start)))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let telemetry = state.telemetry.get_stats();
    let cache = state.cache.stats();

    info!(
        "📊 Cache Stats: {} entries, {:.1}% hit rate ({} hits / {} misses)",
        cache.entries, cache.hit_rate, cache.hits, cache.misses
    );

    let data = StatsData {
        telemetry,
        cache,
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, latency_ms(start)))
}
