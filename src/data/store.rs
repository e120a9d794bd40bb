//! In-Memory Entity Store
//!
//! DashMap-backed store for the synthetic dataset. List operations take a
//! filter struct plus pagination and return the pre-pagination total count,
//! matching what dashboard clients need for paging controls.

use dashmap::DashMap;
use serde::Serialize;

use crate::models::types::{
    Company, Country, EventType, Product, RiskEvent, RouteType, Supplier, TradeRoute,
};

/// Score at or above which an entity counts as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

/// Pagination window
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub risk_min: Option<f64>,
    pub risk_max: Option<f64>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    pub country_id: Option<u32>,
    pub industry: Option<String>,
    pub tier: Option<u8>,
    pub risk_min: Option<f64>,
    pub risk_max: Option<f64>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    pub route_type: Option<RouteType>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    pub sector: Option<String>,
    pub page: Page,
}

/// Filter for active risk events; results are ordered by severity descending
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub severity_min: Option<f64>,
    pub event_type: Option<EventType>,
    pub country_id: Option<u32>,
    pub limit: usize,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            severity_min: None,
            event_type: None,
            country_id: None,
            limit: 100,
        }
    }
}

// ============================================
// Dashboard aggregates
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct EntityCounts {
    pub total_countries: usize,
    pub total_suppliers: usize,
    pub total_products: usize,
    pub total_routes: usize,
    pub total_companies: usize,
    pub active_risk_events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskMetrics {
    pub average_country_risk: f64,
    pub average_supplier_risk: f64,
    pub average_route_vulnerability: f64,
    pub high_risk_countries: usize,
    pub high_risk_suppliers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub summary: EntityCounts,
    pub risk_metrics: RiskMetrics,
}

// ============================================
// Store
// ============================================

/// Thread-safe store over all entity kinds
#[derive(Default)]
pub struct RiskStore {
    countries: DashMap<u32, Country>,
    suppliers: DashMap<u32, Supplier>,
    products: DashMap<u32, Product>,
    trade_routes: DashMap<u32, TradeRoute>,
    companies: DashMap<u32, Company>,
    risk_events: DashMap<u32, RiskEvent>,
}

impl RiskStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- inserts ----

    pub fn insert_country(&self, c: Country) {
        self.countries.insert(c.id, c);
    }

    pub fn insert_supplier(&self, s: Supplier) {
        self.suppliers.insert(s.id, s);
    }

    pub fn insert_product(&self, p: Product) {
        self.products.insert(p.id, p);
    }

    pub fn insert_trade_route(&self, r: TradeRoute) {
        self.trade_routes.insert(r.id, r);
    }

    pub fn insert_company(&self, c: Company) {
        self.companies.insert(c.id, c);
    }

    pub fn insert_risk_event(&self, e: RiskEvent) {
        self.risk_events.insert(e.id, e);
    }

    // ---- point lookups ----

    pub fn get_country(&self, id: u32) -> Option<Country> {
        self.countries.get(&id).map(|c| c.clone())
    }

    pub fn get_supplier(&self, id: u32) -> Option<Supplier> {
        self.suppliers.get(&id).map(|s| s.clone())
    }

    pub fn get_product(&self, id: u32) -> Option<Product> {
        self.products.get(&id).map(|p| p.clone())
    }

    pub fn get_trade_route(&self, id: u32) -> Option<TradeRoute> {
        self.trade_routes.get(&id).map(|r| r.clone())
    }

    pub fn get_company(&self, id: u32) -> Option<Company> {
        self.companies.get(&id).map(|c| c.clone())
    }

    // ---- list operations ----

    /// Filtered, paginated countries with pre-pagination total
    pub fn list_countries(&self, filter: &CountryFilter) -> (Vec<Country>, usize) {
        let matches: Vec<Country> = self
            .countries
            .iter()
            .filter(|c| {
                filter.region.as_deref().is_none_or(|r| c.region == r)
                    && filter.risk_min.is_none_or(|min| c.risk_score >= min)
                    && filter.risk_max.is_none_or(|max| c.risk_score <= max)
            })
            .map(|c| c.clone())
            .collect();
        paginate(matches, &filter.page)
    }

    pub fn list_suppliers(&self, filter: &SupplierFilter) -> (Vec<Supplier>, usize) {
        let matches: Vec<Supplier> = self
            .suppliers
            .iter()
            .filter(|s| {
                filter.country_id.is_none_or(|id| s.country_id == id)
                    && filter.industry.as_deref().is_none_or(|i| s.industry == i)
                    && filter.tier.is_none_or(|t| s.tier == t)
                    && filter.risk_min.is_none_or(|min| s.overall_risk_score >= min)
                    && filter.risk_max.is_none_or(|max| s.overall_risk_score <= max)
            })
            .map(|s| s.clone())
            .collect();
        paginate(matches, &filter.page)
    }

    pub fn list_products(&self, filter: &ProductFilter) -> (Vec<Product>, usize) {
        let matches: Vec<Product> = self
            .products
            .iter()
            .filter(|p| filter.category.as_deref().is_none_or(|c| p.category == c))
            .map(|p| p.clone())
            .collect();
        paginate(matches, &filter.page)
    }

    pub fn list_trade_routes(&self, filter: &RouteFilter) -> (Vec<TradeRoute>, usize) {
        let matches: Vec<TradeRoute> = self
            .trade_routes
            .iter()
            .filter(|r| filter.route_type.is_none_or(|t| r.route_type == t))
            .map(|r| r.clone())
            .collect();
        paginate(matches, &filter.page)
    }

    pub fn list_companies(&self, filter: &CompanyFilter) -> (Vec<Company>, usize) {
        let matches: Vec<Company> = self
            .companies
            .iter()
            .filter(|c| filter.sector.as_deref().is_none_or(|s| c.sector == s))
            .map(|c| c.clone())
            .collect();
        paginate(matches, &filter.page)
    }

    /// Active risk events matching the filter, highest severity first
    pub fn list_risk_events(&self, filter: &EventFilter) -> (Vec<RiskEvent>, usize) {
        let mut matches: Vec<RiskEvent> = self
            .risk_events
            .iter()
            .filter(|e| {
                e.is_active
                    && filter.severity_min.is_none_or(|min| e.severity >= min)
                    && filter.event_type.is_none_or(|t| e.event_type == t)
                    && filter.country_id.is_none_or(|id| e.country_id == id)
            })
            .map(|e| e.clone())
            .collect();
        matches.sort_by(|a, b| b.severity.total_cmp(&a.severity));
        let total = matches.len();
        matches.truncate(filter.limit);
        (matches, total)
    }

    // ---- bulk reads for aggregate scoring ----

    pub fn all_suppliers(&self) -> Vec<Supplier> {
        self.suppliers.iter().map(|s| s.clone()).collect()
    }

    pub fn all_trade_routes(&self) -> Vec<TradeRoute> {
        self.trade_routes.iter().map(|r| r.clone()).collect()
    }

    pub fn all_products(&self) -> Vec<Product> {
        self.products.iter().map(|p| p.clone()).collect()
    }

    pub fn all_countries(&self) -> Vec<Country> {
        let mut countries: Vec<Country> = self.countries.iter().map(|c| c.clone()).collect();
        countries.sort_by_key(|c| c.id);
        countries
    }

    pub fn all_companies(&self) -> Vec<Company> {
        let mut companies: Vec<Company> = self.companies.iter().map(|c| c.clone()).collect();
        companies.sort_by_key(|c| c.id);
        companies
    }

    pub fn all_risk_events(&self) -> Vec<RiskEvent> {
        self.risk_events.iter().map(|e| e.clone()).collect()
    }

    // ---- per-entity statistics ----

    pub fn supplier_count_for_country(&self, country_id: u32) -> usize {
        self.suppliers
            .iter()
            .filter(|s| s.country_id == country_id)
            .count()
    }

    pub fn active_event_count_for_country(&self, country_id: u32) -> usize {
        self.risk_events
            .iter()
            .filter(|e| e.country_id == country_id && e.is_active)
            .count()
    }

    // ---- dashboard aggregates ----

    pub fn dashboard_summary(&self) -> DashboardSummary {
        let summary = EntityCounts {
            total_countries: self.countries.len(),
            total_suppliers: self.suppliers.iter().filter(|s| s.is_active).count(),
            total_products: self.products.len(),
            total_routes: self.trade_routes.iter().filter(|r| r.is_active).count(),
            total_companies: self.companies.len(),
            active_risk_events: self.risk_events.iter().filter(|e| e.is_active).count(),
        };

        let risk_metrics = RiskMetrics {
            average_country_risk: round2(mean(
                self.countries.iter().map(|c| c.risk_score),
            )),
            average_supplier_risk: round2(mean(
                self.suppliers.iter().map(|s| s.overall_risk_score),
            )),
            average_route_vulnerability: round2(mean(
                self.trade_routes.iter().map(|r| r.vulnerability_score),
            )),
            high_risk_countries: self
                .countries
                .iter()
                .filter(|c| c.risk_score >= HIGH_RISK_THRESHOLD)
                .count(),
            high_risk_suppliers: self
                .suppliers
                .iter()
                .filter(|s| s.overall_risk_score >= HIGH_RISK_THRESHOLD)
                .count(),
        };

        DashboardSummary {
            summary,
            risk_metrics,
        }
    }
}

/// Sort by id, report total, apply skip/limit
fn paginate<T>(mut items: Vec<T>, page: &Page) -> (Vec<T>, usize)
where
    T: HasId,
{
    items.sort_by_key(|i| i.id());
    let total = items.len();
    let items = items
        .into_iter()
        .skip(page.skip)
        .take(page.limit)
        .collect();
    (items, total)
}

trait HasId {
    fn id(&self) -> u32;
}

macro_rules! impl_has_id {
    ($($ty:ty),*) => {
        $(impl HasId for $ty {
            fn id(&self) -> u32 {
                self.id
            }
        })*
    };
}

impl_has_id!(Country, Supplier, Product, TradeRoute, Company, RiskEvent);

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn country(id: u32, region: &str, risk: f64) -> Country {
        Country {
            id,
            country_code: format!("C{:02}", id),
            country_name: format!("Country {}", id),
            region: region.to_string(),
            gdp_usd: 1_000_000_000_000,
            population: 50_000_000,
            political_stability_index: 60.0,
            economic_freedom_index: 60.0,
            corruption_perception_index: 60.0,
            risk_score: risk,
            last_updated: Utc::now(),
        }
    }

    fn event(id: u32, country_id: u32, severity: f64, active: bool) -> RiskEvent {
        RiskEvent {
            id,
            event_id: format!("EVENT_{:06}", id),
            country_id,
            event_type: EventType::Geopolitical,
            severity,
            title: "Geopolitical Risk Event".to_string(),
            description: "Test event".to_string(),
            source: "Internal".to_string(),
            impact_score: severity,
            confidence_score: 0.8,
            event_date: Utc::now(),
            is_active: active,
        }
    }

    #[test]
    fn test_country_filter_and_pagination() {
        let store = RiskStore::new();
        store.insert_country(country(1, "Europe", 30.0));
        store.insert_country(country(2, "Europe", 80.0));
        store.insert_country(country(3, "Asia", 55.0));

        let (all, total) = store.list_countries(&CountryFilter::default());
        assert_eq!(total, 3);
        assert_eq!(all.len(), 3);
        // Sorted by id
        assert_eq!(all[0].id, 1);

        let (europe, total) = store.list_countries(&CountryFilter {
            region: Some("Europe".to_string()),
            ..Default::default()
        });
        assert_eq!(total, 2);
        assert_eq!(europe.len(), 2);

        let (page, total) = store.list_countries(&CountryFilter {
            page: Page { skip: 1, limit: 1 },
            ..Default::default()
        });
        assert_eq!(total, 3, "total reflects the filter, not the page");
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 2);
    }

    #[test]
    fn test_risk_band_filter() {
        let store = RiskStore::new();
        store.insert_country(country(1, "Europe", 30.0));
        store.insert_country(country(2, "Europe", 80.0));

        let (risky, _) = store.list_countries(&CountryFilter {
            risk_min: Some(70.0),
            ..Default::default()
        });
        assert_eq!(risky.len(), 1);
        assert_eq!(risky[0].id, 2);
    }

    #[test]
    fn test_event_listing_orders_by_severity() {
        let store = RiskStore::new();
        store.insert_risk_event(event(1, 1, 40.0, true));
        store.insert_risk_event(event(2, 1, 90.0, true));
        store.insert_risk_event(event(3, 1, 95.0, false)); // inactive, excluded

        let (events, total) = store.list_risk_events(&EventFilter::default());
        assert_eq!(total, 2);
        assert_eq!(events[0].severity, 90.0);
        assert_eq!(events[1].severity, 40.0);
    }

    #[test]
    fn test_dashboard_summary_aggregates() {
        let store = RiskStore::new();
        store.insert_country(country(1, "Europe", 40.0));
        store.insert_country(country(2, "Asia", 80.0));
        store.insert_risk_event(event(1, 1, 60.0, true));

        let summary = store.dashboard_summary();
        assert_eq!(summary.summary.total_countries, 2);
        assert_eq!(summary.summary.active_risk_events, 1);
        assert_eq!(summary.risk_metrics.average_country_risk, 60.0);
        assert_eq!(summary.risk_metrics.high_risk_countries, 1);
    }
}
