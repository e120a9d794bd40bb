//! Telemetry Module
//!
//! Collects anonymous scoring statistics for performance monitoring and
//! the `/v1/stats` endpoint. Only entity kinds, scores and latencies are
//! recorded; no client identifiers are stored.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::models::types::{EntityType, RiskLevel};

/// A single scoring observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Unix timestamp
    pub timestamp: u64,
    pub entity_type: EntityType,
    pub entity_id: u32,
    pub risk_score: f64,
    pub level: RiskLevel,
    /// Scoring latency in milliseconds
    pub latency_ms: u64,
}

impl TelemetryEvent {
    pub fn new(
        entity_type: EntityType,
        entity_id: u32,
        risk_score: f64,
        level: RiskLevel,
        latency_ms: u64,
    ) -> Self {
        Self {
            timestamp: current_timestamp(),
            entity_type,
            entity_id,
            risk_score,
            level,
            latency_ms,
        }
    }
}

/// Aggregated statistics for the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Total scoring requests served
    pub total_scored: u64,
    /// Scores at or above the high-risk threshold
    pub high_risk_detected: u64,
    /// Requests by entity kind
    pub scored_by_type: HashMap<String, u64>,
    /// Average scoring latency (ms)
    pub avg_latency_ms: f64,
    /// Session start timestamp
    pub period_start: u64,
    /// Timestamp of this snapshot
    pub period_end: u64,
}

/// Collector behind the stats endpoint; atomic counters for the hot path,
/// a buffered event log flushed to JSONL for offline analysis
pub struct TelemetryCollector {
    events: Arc<RwLock<Vec<TelemetryEvent>>>,
    total_scored: AtomicU64,
    high_risk_detected: AtomicU64,
    total_latency_ms: AtomicU64,
    scored_by_type: Arc<RwLock<HashMap<EntityType, u64>>>,
    session_start: u64,
    export_dir: PathBuf,
    max_buffer_size: usize,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self::with_config(PathBuf::from("./telemetry"), 1000)
    }

    pub fn with_config(export_dir: PathBuf, max_buffer_size: usize) -> Self {
        let _ = fs::create_dir_all(&export_dir);

        Self {
            events: Arc::new(RwLock::new(Vec::with_capacity(max_buffer_size))),
            total_scored: AtomicU64::new(0),
            high_risk_detected: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            scored_by_type: Arc::new(RwLock::new(HashMap::new())),
            session_start: current_timestamp(),
            export_dir,
            max_buffer_size,
        }
    }

    /// Record one scoring request
    pub fn record_scoring(&self, event: TelemetryEvent, high_risk: bool) {
        self.total_scored.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(event.latency_ms, Ordering::Relaxed);

        if high_risk {
            self.high_risk_detected.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut counts) = self.scored_by_type.write() {
            *counts.entry(event.entity_type).or_insert(0) += 1;
        }

        if let Ok(mut events) = self.events.write() {
            events.push(event);

            // Auto-flush when the buffer fills
            if events.len() >= self.max_buffer_size {
                let events_to_flush = std::mem::take(&mut *events);
                drop(events); // release lock before I/O
                let _ = self.flush_events(&events_to_flush);
            }
        }
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total_scored = self.total_scored.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if total_scored > 0 {
            total_latency as f64 / total_scored as f64
        } else {
            0.0
        };

        let scored_by_type = self
            .scored_by_type
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            total_scored,
            high_risk_detected: self.high_risk_detected.load(Ordering::Relaxed),
            scored_by_type,
            avg_latency_ms: avg_latency,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Export the current stats snapshot to a JSON file
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        let stats = self.get_stats();
        let filename = format!("stats_{}.json", current_timestamp());
        let path = self.export_dir.join(filename);

        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;

        Ok(path)
    }

    /// Flush any buffered events, e.g. on shutdown
    pub fn flush(&self) -> Result<(), std::io::Error> {
        if let Ok(mut events) = self.events.write() {
            let events_to_flush = std::mem::take(&mut *events);
            drop(events);
            self.flush_events(&events_to_flush)?;
        }
        Ok(())
    }

    fn flush_events(&self, events: &[TelemetryEvent]) -> Result<(), std::io::Error> {
        if events.is_empty() {
            return Ok(());
        }

        let filename = format!("events_{}.jsonl", current_timestamp());
        let path = self.export_dir.join(filename);

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        for event in events {
            if let Ok(json) = serde_json::to_string(event) {
                writeln!(file, "{}", json)?;
            }
        }

        Ok(())
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(entity_type: EntityType, score: f64, latency: u64) -> TelemetryEvent {
        TelemetryEvent::new(entity_type, 1, score, RiskLevel::from_score(score), latency)
    }

    #[test]
    fn test_collector_counts_and_latency() {
        let collector = TelemetryCollector::new();
        collector.record_scoring(event(EntityType::Country, 53.0, 10), false);
        collector.record_scoring(event(EntityType::Supplier, 82.0, 20), true);

        let stats = collector.get_stats();
        assert_eq!(stats.total_scored, 2);
        assert_eq!(stats.high_risk_detected, 1);
        assert_eq!(stats.avg_latency_ms, 15.0);
        assert_eq!(stats.scored_by_type.get("country"), Some(&1));
        assert_eq!(stats.scored_by_type.get("supplier"), Some(&1));
    }

    #[test]
    fn test_empty_collector_has_zero_latency() {
        let collector = TelemetryCollector::new();
        let stats = collector.get_stats();
        assert_eq!(stats.total_scored, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
    }

    #[test]
    fn test_stats_serialize() {
        let collector = TelemetryCollector::new();
        collector.record_scoring(event(EntityType::Product, 70.0, 5), true);

        let json = serde_json::to_string(&collector.get_stats()).unwrap();
        assert!(json.contains("high_risk_detected"));
        assert!(json.contains("product"));
    }
}
