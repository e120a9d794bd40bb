//! Configuration module for the Sentinel service
//!
//! Everything is read from environment variables with sensible defaults;
//! there is no config file. Parse failures fall back to the default rather
//! than aborting startup.

use std::time::Duration;
use tracing::warn;

/// How many of each entity the synthetic generator produces
#[derive(Debug, Clone, Copy)]
pub struct DatasetSizes {
    pub countries: usize,
    pub suppliers: usize,
    pub products: usize,
    pub trade_routes: usize,
    pub companies: usize,
    pub risk_events: usize,
}

impl Default for DatasetSizes {
    fn default() -> Self {
        Self {
            countries: 15,
            suppliers: 500,
            products: 200,
            trade_routes: 120,
            companies: 50,
            risk_events: 150,
        }
    }
}

impl DatasetSizes {
    /// Read overrides from SENTINEL_* env vars
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            countries: env_usize("SENTINEL_COUNTRIES", d.countries),
            suppliers: env_usize("SENTINEL_SUPPLIERS", d.suppliers),
            products: env_usize("SENTINEL_PRODUCTS", d.products),
            trade_routes: env_usize("SENTINEL_TRADE_ROUTES", d.trade_routes),
            companies: env_usize("SENTINEL_COMPANIES", d.companies),
            risk_events: env_usize("SENTINEL_RISK_EVENTS", d.risk_events),
        }
    }
}

/// Service-wide settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bind host for the API server
    pub host: String,
    /// Bind port (PORT takes precedence for PaaS deployments)
    pub port: u16,
    /// RNG seed for reproducible synthetic datasets
    pub dataset_seed: u64,
    /// Sizes of the generated dataset
    pub dataset_sizes: DatasetSizes,
    /// TTL for cached composite scores
    pub score_cache_ttl: Duration,
    /// Requests allowed per rate-limit window
    pub rate_limit_requests: u32,
    /// Rate-limit window duration
    pub rate_limit_window: Duration,
    /// Directory for telemetry exports
    pub telemetry_dir: String,
    /// Directory for dataset exports (generator binary)
    pub export_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            dataset_seed: 42,
            dataset_sizes: DatasetSizes::default(),
            score_cache_ttl: Duration::from_secs(300),
            rate_limit_requests: 100,
            rate_limit_window: Duration::from_secs(60),
            telemetry_dir: "./telemetry".to_string(),
            export_dir: "./data/synthetic".to_string(),
        }
    }
}

impl Settings {
    /// Build settings from the environment
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            host: std::env::var("SENTINEL_HOST").unwrap_or(d.host),
            port: std::env::var("PORT")
                .or_else(|_| std::env::var("SENTINEL_PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(d.port),
            dataset_seed: env_u64("SENTINEL_SEED", d.dataset_seed),
            dataset_sizes: DatasetSizes::from_env(),
            score_cache_ttl: Duration::from_secs(env_u64(
                "SENTINEL_CACHE_TTL_SECS",
                d.score_cache_ttl.as_secs(),
            )),
            rate_limit_requests: env_u64("SENTINEL_RATE_LIMIT", d.rate_limit_requests as u64)
                as u32,
            rate_limit_window: d.rate_limit_window,
            telemetry_dir: std::env::var("SENTINEL_TELEMETRY_DIR").unwrap_or(d.telemetry_dir),
            export_dir: std::env::var("SENTINEL_EXPORT_DIR").unwrap_or(d.export_dir),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("⚠️ Ignoring invalid {}={}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env_u64(key, default as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let s = Settings::default();
        assert_eq!(s.port, 8000);
        assert_eq!(s.score_cache_ttl.as_secs(), 300);
        assert!(s.dataset_sizes.countries > 0);
        assert!(s.dataset_sizes.suppliers >= s.dataset_sizes.companies);
    }
}
