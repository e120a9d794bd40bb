//! Type definitions for the Sentinel risk platform
//! Entity value objects mirrored from the trade-risk schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk level classification for a 0-100 composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// 0-20: routine monitoring
    Low,
    /// 20-40: review recommended
    Moderate,
    /// 40-60: elevated exposure
    Elevated,
    /// 60-80: likely disruption
    High,
    /// 80-100: severe exposure
    Critical,
}

impl RiskLevel {
    /// Band a composite score into a level
    pub fn from_score(score: f64) -> Self {
        if score < 20.0 {
            RiskLevel::Low
        } else if score < 40.0 {
            RiskLevel::Moderate
        } else if score < 60.0 {
            RiskLevel::Elevated
        } else if score < 80.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::Elevated => "ELEVATED",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Color code for dashboard clients
    pub fn color_code(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#22c55e",
            RiskLevel::Moderate => "#eab308",
            RiskLevel::Elevated => "#f97316",
            RiskLevel::High => "#ef4444",
            RiskLevel::Critical => "#7c2d12",
        }
    }
}

/// Entity kinds that carry a composite risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Country,
    Supplier,
    TradeRoute,
    Product,
    Company,
}

impl EntityType {
    /// Parse the path-segment spelling used by the API
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "country" => Some(Self::Country),
            "supplier" => Some(Self::Supplier),
            "trade-route" => Some(Self::TradeRoute),
            "product" => Some(Self::Product),
            "company" => Some(Self::Company),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Supplier => "supplier",
            Self::TradeRoute => "trade-route",
            Self::Product => "product",
            Self::Company => "company",
        }
    }
}

// ============================================
// Entities
// ============================================

/// Country with geopolitical risk indices (all indices 0-100, higher = better
/// except `risk_score`, where higher = riskier)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub id: u32,
    pub country_code: String,
    pub country_name: String,
    pub region: String,
    pub gdp_usd: u64,
    pub population: u64,
    pub political_stability_index: f64,
    pub economic_freedom_index: f64,
    pub corruption_perception_index: f64,
    pub risk_score: f64,
    pub last_updated: DateTime<Utc>,
}

/// Supplier in the 1-6 tier system (tier 1 = direct, higher = deeper)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: u32,
    pub supplier_code: String,
    pub name: String,
    pub country_id: u32,
    pub industry: String,
    pub tier: u8,
    pub annual_revenue: u64,
    pub employee_count: u32,
    pub financial_health_score: f64,
    pub cyber_risk_score: f64,
    pub operational_risk_score: f64,
    pub overall_risk_score: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub product_code: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub base_price_usd: f64,
    /// Annualized price volatility, 0-1
    pub price_volatility: f64,
    /// Strategic criticality, 0-1
    pub criticality_score: f64,
    /// Difficulty of substituting the product, 0-1
    pub substitution_difficulty: f64,
}

/// Transport mode of a trade route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Sea,
    Air,
    Land,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Sea => "sea",
            RouteType::Air => "air",
            RouteType::Land => "land",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRoute {
    pub id: u32,
    pub route_code: String,
    pub origin_country_id: u32,
    pub destination_country_id: u32,
    pub route_type: RouteType,
    pub distance_km: f64,
    pub transit_time_days: u32,
    pub cost_per_ton: f64,
    pub capacity_utilization: f64,
    pub vulnerability_score: f64,
    /// Exposure to maritime chokepoints, 0-100
    pub chokepoint_risk: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: u32,
    pub company_code: String,
    pub name: String,
    pub ticker: String,
    pub sector: String,
    pub revenue_usd: u64,
    pub market_cap_usd: u64,
    pub employee_count: u32,
    pub headquarters_country_id: u32,
    pub supply_chain_risk_score: f64,
}

/// Category of a monitored risk event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Geopolitical,
    Economic,
    Cyber,
    Regulatory,
    Environmental,
    SupplyChain,
}

impl EventType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "geopolitical" => Some(Self::Geopolitical),
            "economic" => Some(Self::Economic),
            "cyber" => Some(Self::Cyber),
            "regulatory" => Some(Self::Regulatory),
            "environmental" => Some(Self::Environmental),
            "supply_chain" => Some(Self::SupplyChain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Geopolitical => "geopolitical",
            Self::Economic => "economic",
            Self::Cyber => "cyber",
            Self::Regulatory => "regulatory",
            Self::Environmental => "environmental",
            Self::SupplyChain => "supply_chain",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEvent {
    pub id: u32,
    pub event_id: String,
    pub country_id: u32,
    pub event_type: EventType,
    /// Severity 0-100
    pub severity: f64,
    pub title: String,
    pub description: String,
    pub source: String,
    pub impact_score: f64,
    /// Source confidence, 0-1
    pub confidence_score: f64,
    pub event_date: DateTime<Utc>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(53.0), RiskLevel::Elevated);
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Critical);
    }

    #[test]
    fn test_entity_type_roundtrip() {
        for ty in [
            EntityType::Country,
            EntityType::Supplier,
            EntityType::TradeRoute,
            EntityType::Product,
            EntityType::Company,
        ] {
            assert_eq!(EntityType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EntityType::parse("warehouse"), None);
    }

    #[test]
    fn test_route_type_serde_spelling() {
        let json = serde_json::to_string(&RouteType::Sea).unwrap();
        assert_eq!(json, "\"sea\"");
    }
}
