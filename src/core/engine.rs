//! i-Score Engine
//!
//! Per-entity-type risk scoring for countries, suppliers, trade routes,
//! products and company supply chains. Every score is a fixed-weight linear
//! combination produced by [`compute_score`]; the engine only prepares the
//! factor inputs (inversions, log scaling, caps) and the weight schemes.

use serde::Serialize;

use crate::core::score::{compute_score, CompositeScore, RiskFactorSet, WeightScheme};
use crate::models::errors::AppResult;
use crate::models::types::{Company, Country, Product, RouteType, Supplier, TradeRoute};

/// Canonical factor names shared by the engine, the API breakdowns and tests
pub mod factors {
    pub const POLITICAL: &str = "political_stability";
    pub const ECONOMIC: &str = "economic_freedom";
    pub const CORRUPTION: &str = "corruption";
    pub const DEVELOPMENT: &str = "development";

    pub const FINANCIAL: &str = "financial_health";
    pub const CYBER: &str = "cyber_risk";
    pub const OPERATIONAL: &str = "operational_risk";
    pub const COUNTRY: &str = "country_risk";
    pub const TIER: &str = "tier_risk";

    pub const DISTANCE: &str = "distance";
    pub const TRANSIT: &str = "transit_time";
    pub const COST: &str = "cost";
    pub const CHOKEPOINT: &str = "chokepoint";

    pub const CRITICALITY: &str = "criticality";
    pub const VOLATILITY: &str = "price_volatility";
    pub const SUBSTITUTION: &str = "substitution";
    pub const PRICE: &str = "price_level";

    pub const SUPPLIER_RISK: &str = "supplier_risk";
    pub const ROUTE_RISK: &str = "route_risk";
    pub const PRODUCT_RISK: &str = "product_risk";
    pub const CONCENTRATION: &str = "concentration";
    pub const GEOGRAPHIC: &str = "geographic_concentration";
}

/// GDP-per-capita level treated as fully developed (log scale cap)
const GDP_PER_CAPITA_CAP: f64 = 100_000.0;
/// Price level treated as maximal for product scoring (log scale cap)
const PRICE_CAP_USD: f64 = 100_000.0;
/// Route normalization caps
const DISTANCE_CAP_KM: f64 = 20_000.0;
const TRANSIT_CAP_DAYS: f64 = 30.0;
const COST_CAP_PER_TON: f64 = 8_000.0;
/// Expected supplier base for concentration normalization
const EXPECTED_SUPPLIER_COUNT: f64 = 1_000.0;
/// Expected sourcing-country spread for geographic concentration
const EXPECTED_COUNTRY_SPREAD: f64 = 20.0;
/// Neutral fallback when an aggregate has no inputs
const NEUTRAL_SCORE: f64 = 50.0;

/// A composite score together with the factor inputs that produced it
#[derive(Debug, Clone, Serialize)]
pub struct ScoreDetail {
    pub score: CompositeScore,
    pub factors: RiskFactorSet,
}

/// Per-category supplier risk breakdown (all values 0-100)
#[derive(Debug, Clone, Serialize)]
pub struct SupplierRiskBreakdown {
    pub financial_risk: f64,
    pub cyber_risk: f64,
    pub operational_risk: f64,
    pub country_risk: f64,
    pub tier_risk: f64,
    pub overall: CompositeScore,
}

/// Company-level supply chain risk breakdown (all values 0-100)
#[derive(Debug, Clone, Serialize)]
pub struct SupplyChainBreakdown {
    pub supplier_risk: f64,
    pub route_risk: f64,
    pub product_risk: f64,
    pub concentration_risk: f64,
    pub geographic_concentration: f64,
    pub overall: CompositeScore,
}

/// Exogenous market conditions feeding product scoring
#[derive(Debug, Clone, Copy)]
pub struct MarketConditions {
    /// Market-wide volatility, 0-1
    pub overall_volatility: f64,
    /// Positive values mean demand exceeds supply, 0-1
    pub supply_demand_imbalance: f64,
}

impl Default for MarketConditions {
    fn default() -> Self {
        Self {
            overall_volatility: 0.2,
            supply_demand_imbalance: 0.0,
        }
    }
}

/// Stateless scoring engine; safe to share and call concurrently
#[derive(Debug, Clone, Copy, Default)]
pub struct IScoreEngine;

impl IScoreEngine {
    pub fn new() -> Self {
        Self
    }

    // ============================================
    // Weight schemes (fixed per entity type)
    // ============================================

    pub fn country_weights() -> AppResult<WeightScheme> {
        WeightScheme::new([
            (factors::POLITICAL, 0.4),
            (factors::ECONOMIC, 0.3),
            (factors::CORRUPTION, 0.2),
            (factors::DEVELOPMENT, 0.1),
        ])
    }

    pub fn supplier_weights() -> AppResult<WeightScheme> {
        WeightScheme::new([
            (factors::FINANCIAL, 0.3),
            (factors::CYBER, 0.2),
            (factors::OPERATIONAL, 0.2),
            (factors::COUNTRY, 0.2),
            (factors::TIER, 0.1),
        ])
    }

    pub fn route_weights() -> AppResult<WeightScheme> {
        WeightScheme::new([
            (factors::DISTANCE, 0.2),
            (factors::TRANSIT, 0.15),
            (factors::COST, 0.1),
            (factors::CHOKEPOINT, 0.25),
            (factors::COUNTRY, 0.3),
        ])
    }

    pub fn product_weights() -> AppResult<WeightScheme> {
        WeightScheme::new([
            (factors::CRITICALITY, 0.4),
            (factors::VOLATILITY, 0.3),
            (factors::SUBSTITUTION, 0.2),
            (factors::PRICE, 0.1),
        ])
    }

    pub fn company_weights() -> AppResult<WeightScheme> {
        WeightScheme::new([
            (factors::SUPPLIER_RISK, 0.3),
            (factors::ROUTE_RISK, 0.25),
            (factors::PRODUCT_RISK, 0.2),
            (factors::CONCENTRATION, 0.15),
            (factors::GEOGRAPHIC, 0.1),
        ])
    }

    // ============================================
    // Entity scoring
    // ============================================

    /// Country risk: inverted stability/freedom/corruption indices plus a
    /// development factor from log-scaled GDP per capita.
    pub fn score_country(&self, country: &Country) -> AppResult<ScoreDetail> {
        let gdp_per_capita = country.gdp_usd as f64 / country.population.max(1) as f64;
        let development_level = log_scaled(gdp_per_capita, GDP_PER_CAPITA_CAP);

        let factors = RiskFactorSet::new()
            .with(factors::POLITICAL, invert(country.political_stability_index))
            .with(factors::ECONOMIC, invert(country.economic_freedom_index))
            .with(
                factors::CORRUPTION,
                invert(country.corruption_perception_index),
            )
            .with(factors::DEVELOPMENT, invert(development_level));

        let score = compute_score(&factors, &Self::country_weights()?)?;
        Ok(ScoreDetail { score, factors })
    }

    /// Supplier risk adjusted by the risk of its home country.
    pub fn score_supplier(
        &self,
        supplier: &Supplier,
        country_risk: f64,
    ) -> AppResult<SupplierRiskBreakdown> {
        let financial_risk = invert(supplier.financial_health_score);
        let cyber_risk = supplier.cyber_risk_score.clamp(0.0, 100.0);
        let operational_risk = supplier.operational_risk_score.clamp(0.0, 100.0);
        let country_risk = country_risk.clamp(0.0, 100.0);
        // Tier 1 is direct sourcing; visibility degrades with depth
        let tier_risk = ((supplier.tier.saturating_sub(1)) as f64 / 5.0 * 100.0).clamp(0.0, 100.0);

        let factors = RiskFactorSet::new()
            .with(factors::FINANCIAL, financial_risk)
            .with(factors::CYBER, cyber_risk)
            .with(factors::OPERATIONAL, operational_risk)
            .with(factors::COUNTRY, country_risk)
            .with(factors::TIER, tier_risk);

        let overall = compute_score(&factors, &Self::supplier_weights()?)?;

        Ok(SupplierRiskBreakdown {
            financial_risk,
            cyber_risk,
            operational_risk,
            country_risk,
            tier_risk,
            overall,
        })
    }

    /// Trade route vulnerability. The weighted sum is scaled by a transport
    /// mode multiplier (sea routes pass chokepoints, air routes bypass them)
    /// and re-clamped.
    pub fn score_trade_route(
        &self,
        route: &TradeRoute,
        origin_risk: f64,
        destination_risk: f64,
    ) -> AppResult<ScoreDetail> {
        let factors = RiskFactorSet::new()
            .with(factors::DISTANCE, capped_pct(route.distance_km, DISTANCE_CAP_KM))
            .with(
                factors::TRANSIT,
                capped_pct(route.transit_time_days as f64, TRANSIT_CAP_DAYS),
            )
            .with(factors::COST, capped_pct(route.cost_per_ton, COST_CAP_PER_TON))
            .with(factors::CHOKEPOINT, route.chokepoint_risk.clamp(0.0, 100.0))
            .with(
                factors::COUNTRY,
                ((origin_risk + destination_risk) / 2.0).clamp(0.0, 100.0),
            );

        let base = compute_score(&factors, &Self::route_weights()?)?;
        let score = CompositeScore::from_raw(base.value() * route_multiplier(route.route_type));
        Ok(ScoreDetail { score, factors })
    }

    /// Product risk under the given market conditions. A supply/demand
    /// imbalance amplifies the combined score before clamping.
    pub fn score_product(
        &self,
        product: &Product,
        market: &MarketConditions,
    ) -> AppResult<ScoreDetail> {
        let volatility =
            ((product.price_volatility + market.overall_volatility) * 100.0).clamp(0.0, 100.0);

        let factors = RiskFactorSet::new()
            .with(
                factors::CRITICALITY,
                (product.criticality_score * 100.0).clamp(0.0, 100.0),
            )
            .with(factors::VOLATILITY, volatility)
            .with(
                factors::SUBSTITUTION,
                (product.substitution_difficulty * 100.0).clamp(0.0, 100.0),
            )
            .with(factors::PRICE, log_scaled(product.base_price_usd, PRICE_CAP_USD));

        let base = compute_score(&factors, &Self::product_weights()?)?;
        let score = if market.supply_demand_imbalance > 0.0 {
            CompositeScore::from_raw(base.value() * (1.0 + market.supply_demand_imbalance))
        } else {
            base
        };
        Ok(ScoreDetail { score, factors })
    }

    /// Aggregate supply chain risk of a company over its supplier, route and
    /// product portfolio. Empty portfolios fall back to the neutral score so
    /// a company without mapped suppliers is not reported as risk-free.
    pub fn score_company(
        &self,
        _company: &Company,
        suppliers: &[Supplier],
        routes: &[TradeRoute],
        products: &[Product],
    ) -> AppResult<SupplyChainBreakdown> {
        let supplier_risk = mean_or_neutral(suppliers.iter().map(|s| s.overall_risk_score));
        let route_risk = mean_or_neutral(routes.iter().map(|r| r.vulnerability_score));
        let product_risk = mean_or_neutral(products.iter().map(|p| p.criticality_score * 100.0));

        let concentration = suppliers.len() as f64 / EXPECTED_SUPPLIER_COUNT;
        let concentration_risk = ((1.0 - concentration) * 100.0).clamp(0.0, 100.0);

        let distinct_countries = {
            let mut ids: Vec<u32> = suppliers.iter().map(|s| s.country_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids.len() as f64
        };
        let geographic_concentration =
            ((1.0 - distinct_countries / EXPECTED_COUNTRY_SPREAD) * 100.0).clamp(0.0, 100.0);

        let factors = RiskFactorSet::new()
            .with(factors::SUPPLIER_RISK, supplier_risk)
            .with(factors::ROUTE_RISK, route_risk)
            .with(factors::PRODUCT_RISK, product_risk)
            .with(factors::CONCENTRATION, concentration_risk)
            .with(factors::GEOGRAPHIC, geographic_concentration);

        let overall = compute_score(&factors, &Self::company_weights()?)?;

        Ok(SupplyChainBreakdown {
            supplier_risk,
            route_risk,
            product_risk,
            concentration_risk,
            geographic_concentration,
            overall,
        })
    }
}

// ============================================
// Normalization helpers
// ============================================

/// Invert a 0-100 "higher is better" index into a risk factor
fn invert(index: f64) -> f64 {
    (100.0 - index).clamp(0.0, 100.0)
}

/// Linear cap normalization into 0-100
fn capped_pct(value: f64, cap: f64) -> f64 {
    ((value / cap).clamp(0.0, 1.0)) * 100.0
}

/// Log normalization into 0-100 (ln(1+v) / ln(1+cap))
fn log_scaled(value: f64, cap: f64) -> f64 {
    let scaled = value.max(0.0).ln_1p() / cap.ln_1p() * 100.0;
    scaled.clamp(0.0, 100.0)
}

fn route_multiplier(route_type: RouteType) -> f64 {
    match route_type {
        RouteType::Sea => 1.2,
        RouteType::Air => 0.8,
        RouteType::Land => 1.0,
    }
}

fn mean_or_neutral(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        NEUTRAL_SCORE
    } else {
        (sum / count as f64).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn country(id: u32, psi: f64, efi: f64, cpi: f64, gdp: u64, pop: u64) -> Country {
        Country {
            id,
            country_code: format!("C{:02}", id),
            country_name: format!("Country {}", id),
            region: "Test Region".to_string(),
            gdp_usd: gdp,
            population: pop,
            political_stability_index: psi,
            economic_freedom_index: efi,
            corruption_perception_index: cpi,
            risk_score: 0.0,
            last_updated: Utc::now(),
        }
    }

    fn supplier(tier: u8, financial: f64, cyber: f64, operational: f64) -> Supplier {
        Supplier {
            id: 1,
            supplier_code: "SUP_000001".to_string(),
            name: "Test Supplier".to_string(),
            country_id: 1,
            industry: "Electronics".to_string(),
            tier,
            annual_revenue: 50_000_000,
            employee_count: 400,
            financial_health_score: financial,
            cyber_risk_score: cyber,
            operational_risk_score: operational,
            overall_risk_score: 0.0,
            is_active: true,
        }
    }

    fn route(route_type: RouteType) -> TradeRoute {
        TradeRoute {
            id: 1,
            route_code: "ROUTE_000001".to_string(),
            origin_country_id: 1,
            destination_country_id: 2,
            route_type,
            distance_km: 10_000.0,
            transit_time_days: 20,
            cost_per_ton: 400.0,
            capacity_utilization: 0.8,
            vulnerability_score: 0.0,
            chokepoint_risk: 40.0,
            is_active: true,
        }
    }

    #[test]
    fn test_country_score_favours_stability() {
        let engine = IScoreEngine::new();
        let stable = country(1, 85.0, 80.0, 75.0, 20_000_000_000_000, 300_000_000);
        let unstable = country(2, 25.0, 30.0, 20.0, 500_000_000_000, 200_000_000);

        let low = engine.score_country(&stable).unwrap();
        let high = engine.score_country(&unstable).unwrap();

        assert!(low.score.value() < high.score.value());
        assert!(low.score.value() >= 0.0 && high.score.value() <= 100.0);
    }

    #[test]
    fn test_country_factors_are_inverted_indices() {
        let engine = IScoreEngine::new();
        let c = country(1, 75.0, 80.0, 70.0, 2_000_000_000_000, 100_000_000);
        let detail = engine.score_country(&c).unwrap();

        assert_eq!(detail.factors.get(factors::POLITICAL), Some(25.0));
        assert_eq!(detail.factors.get(factors::ECONOMIC), Some(20.0));
        assert_eq!(detail.factors.get(factors::CORRUPTION), Some(30.0));
    }

    #[test]
    fn test_supplier_breakdown_matches_weighted_sum() {
        let engine = IScoreEngine::new();
        let s = supplier(2, 85.0, 30.0, 40.0);
        let b = engine.score_supplier(&s, 25.0).unwrap();

        // financial 15, cyber 30, operational 40, country 25, tier 20
        let expected = 15.0 * 0.3 + 30.0 * 0.2 + 40.0 * 0.2 + 25.0 * 0.2 + 20.0 * 0.1;
        assert!((b.overall.value() - expected).abs() < 1e-9);
        assert_eq!(b.tier_risk, 20.0);
    }

    #[test]
    fn test_deeper_tier_raises_supplier_risk() {
        let engine = IScoreEngine::new();
        let shallow = engine.score_supplier(&supplier(1, 70.0, 30.0, 30.0), 40.0).unwrap();
        let deep = engine.score_supplier(&supplier(6, 70.0, 30.0, 30.0), 40.0).unwrap();
        assert!(deep.overall.value() > shallow.overall.value());
    }

    #[test]
    fn test_sea_route_more_vulnerable_than_land() {
        let engine = IScoreEngine::new();
        let sea = engine.score_trade_route(&route(RouteType::Sea), 40.0, 60.0).unwrap();
        let land = engine.score_trade_route(&route(RouteType::Land), 40.0, 60.0).unwrap();
        let air = engine.score_trade_route(&route(RouteType::Air), 40.0, 60.0).unwrap();

        assert!(sea.score.value() > land.score.value());
        assert!(air.score.value() < land.score.value());
    }

    #[test]
    fn test_product_imbalance_amplifies_score() {
        let engine = IScoreEngine::new();
        let product = Product {
            id: 1,
            product_code: "PROD_000001".to_string(),
            name: "Semiconductors - wafer".to_string(),
            category: "Semiconductors".to_string(),
            unit: "piece".to_string(),
            base_price_usd: 50.0,
            price_volatility: 0.4,
            criticality_score: 0.9,
            substitution_difficulty: 0.8,
        };

        let calm = engine
            .score_product(&product, &MarketConditions::default())
            .unwrap();
        let squeezed = engine
            .score_product(
                &product,
                &MarketConditions {
                    overall_volatility: 0.2,
                    supply_demand_imbalance: 0.3,
                },
            )
            .unwrap();

        assert!(squeezed.score.value() > calm.score.value());
        assert!(squeezed.score.value() <= 100.0);
    }

    #[test]
    fn test_company_empty_portfolio_is_neutral_not_safe() {
        let engine = IScoreEngine::new();
        let company = Company {
            id: 1,
            company_code: "COMP_000001".to_string(),
            name: "Test Corp".to_string(),
            ticker: "TSTC".to_string(),
            sector: "Industrial".to_string(),
            revenue_usd: 50_000_000_000,
            market_cap_usd: 80_000_000_000,
            employee_count: 120_000,
            headquarters_country_id: 1,
            supply_chain_risk_score: 0.0,
        };

        let b = engine.score_company(&company, &[], &[], &[]).unwrap();
        assert_eq!(b.supplier_risk, 50.0);
        assert_eq!(b.route_risk, 50.0);
        // No suppliers at all is maximal concentration
        assert_eq!(b.concentration_risk, 100.0);
        assert!(b.overall.value() > 40.0);
    }

    #[test]
    fn test_all_weight_schemes_are_valid() {
        assert!(IScoreEngine::country_weights().is_ok());
        assert!(IScoreEngine::supplier_weights().is_ok());
        assert!(IScoreEngine::route_weights().is_ok());
        assert!(IScoreEngine::product_weights().is_ok());
        assert!(IScoreEngine::company_weights().is_ok());
    }
}
