//! Sentinel Dataset Generator
//!
//! Offline generation of the synthetic trade-risk dataset. Produces the
//! same entity graph the API serves and writes each entity kind to a JSON
//! file for inspection or downstream loading.
//!
//! Usage:
//!   cargo run --bin sentinel_gen
//!
//! Environment:
//!   SENTINEL_SEED       - Dataset seed (default: 42)
//!   SENTINEL_EXPORT_DIR - Output directory (default: ./data/synthetic)
//!   SENTINEL_COUNTRIES / SENTINEL_SUPPLIERS / ... - Entity counts

use std::fs;
use std::path::Path;

use eyre::Result;
use sentinel_iscore::{DataGenerator, RiskStore, Settings};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env();
    info!(
        "🌱 Generating synthetic dataset (seed={}) into {}",
        settings.dataset_seed, settings.export_dir
    );

    let store = RiskStore::new();
    let mut generator = DataGenerator::new(settings.dataset_seed);
    let counts = generator.populate(&store, &settings.dataset_sizes)?;

    let export_dir = Path::new(&settings.export_dir);
    fs::create_dir_all(export_dir)?;

    export_json(export_dir, "countries.json", &store.all_countries())?;
    export_json(export_dir, "suppliers.json", &store.all_suppliers())?;
    export_json(export_dir, "products.json", &store.all_products())?;
    export_json(export_dir, "trade_routes.json", &store.all_trade_routes())?;
    export_json(export_dir, "companies.json", &store.all_companies())?;
    export_json(export_dir, "risk_events.json", &store.all_risk_events())?;

    let summary = store.dashboard_summary();
    export_json(export_dir, "summary.json", &summary)?;

    info!("");
    info!("✅ Dataset generation complete:");
    info!("   Countries:    {}", counts.countries);
    info!("   Suppliers:    {}", counts.suppliers);
    info!("   Products:     {}", counts.products);
    info!("   Trade routes: {}", counts.trade_routes);
    info!("   Companies:    {}", counts.companies);
    info!("   Risk events:  {}", counts.risk_events);
    info!(
        "   Avg country risk: {:.2}, high-risk suppliers: {}",
        summary.risk_metrics.average_country_risk, summary.risk_metrics.high_risk_suppliers
    );
    info!("   Exported to {}", export_dir.display());

    Ok(())
}

fn export_json<T: Serialize>(dir: &Path, filename: &str, value: &T) -> Result<()> {
    let path = dir.join(filename);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json)?;
    info!("💾 Wrote {}", path.display());
    Ok(())
}
