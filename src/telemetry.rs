//! Telemetry Module for the Risk Scoring Engine
//!
//! Aggregate counters only:
//! - requests, successes and failures by error code
//! - tier distribution of issued scores
//! - collaborator degradations (partial data)
//! - average scoring latency
//!
//! Privacy-first: no wallet addresses or individual scores are retained.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::tier::TrustTier;
use crate::models::errors::ErrorCode;

/// Snapshot of the collector
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct TelemetryStats {
    pub total_requests: u64,
    pub total_scored: u64,
    pub total_failed: u64,
    /// Issued scores per tier, keyed by tier name
    pub tiers: BTreeMap<&'static str, u64>,
    /// Failures per error code
    pub failures_by_code: BTreeMap<&'static str, u64>,
    /// Scores issued with at least one collaborator missing
    pub partial_data_scores: u64,
    pub avg_latency_ms: f64,
    pub period_start: u64,
    pub period_end: u64,
}

impl TelemetryStats {
    /// Plain-text summary for shutdown logs
    pub fn summary(&self) -> String {
        let tiers = TrustTier::ALL
            .iter()
            .map(|t| format!("{} {}", t.as_str(), self.tiers.get(t.as_str()).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(" | ");

        format!(
            "requests {} | scored {} | failed {} | partial {} | avg {:.2}ms | {}",
            self.total_requests,
            self.total_scored,
            self.total_failed,
            self.partial_data_scores,
            self.avg_latency_ms,
            tiers,
        )
    }
}

/// Lock-free counters plus one small map for failure codes
pub struct TelemetryCollector {
    total_requests: AtomicU64,
    total_scored: AtomicU64,
    total_failed: AtomicU64,
    partial_data_scores: AtomicU64,
    total_latency_ms: AtomicU64,
    tier_counts: [AtomicU64; 5],
    failures: RwLock<BTreeMap<&'static str, u64>>,
    session_start: u64,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_scored: AtomicU64::new(0),
            total_failed: AtomicU64::new(0),
            partial_data_scores: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            tier_counts: Default::default(),
            failures: RwLock::new(BTreeMap::new()),
            session_start: current_timestamp(),
        }
    }

    /// Record a successfully issued score
    pub fn record_score(&self, tier: TrustTier, partial: bool, latency_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_scored.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.tier_counts[tier.index()].fetch_add(1, Ordering::Relaxed);
        if partial {
            self.partial_data_scores.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, code: ErrorCode) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_failed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut failures) = self.failures.write() {
            *failures.entry(code.as_str()).or_insert(0) += 1;
        }
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let total_scored = self.total_scored.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if total_scored > 0 {
            total_latency as f64 / total_scored as f64
        } else {
            0.0
        };

        let tiers = TrustTier::ALL
            .iter()
            .map(|t| (t.as_str(), self.tier_counts[t.index()].load(Ordering::Relaxed)))
            .collect();

        let failures_by_code = self
            .failures
            .read()
            .map(|f| f.clone())
            .unwrap_or_default();

        TelemetryStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_scored,
            total_failed: self.total_failed.load(Ordering::Relaxed),
            tiers,
            failures_by_code,
            partial_data_scores: self.partial_data_scores.load(Ordering::Relaxed),
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
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

    #[test]
    fn test_empty_collector() {
        let stats = TelemetryCollector::new().get_stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
        assert_eq!(stats.tiers.len(), 5);
        assert!(stats.tiers.values().all(|&c| c == 0));
    }

    #[test]
    fn test_record_scores_and_failures() {
        let telemetry = TelemetryCollector::new();
        telemetry.record_score(TrustTier::Bronze, false, 10);
        telemetry.record_score(TrustTier::Silver, true, 30);
        telemetry.record_score(TrustTier::Silver, false, 20);
        telemetry.record_failure(ErrorCode::AddressInvalid);
        telemetry.record_failure(ErrorCode::LedgerUnavailable);
        telemetry.record_failure(ErrorCode::LedgerUnavailable);

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_requests, 6);
        assert_eq!(stats.total_scored, 3);
        assert_eq!(stats.total_failed, 3);
        assert_eq!(stats.partial_data_scores, 1);
        assert_eq!(stats.avg_latency_ms, 20.0);
        assert_eq!(stats.tiers["SILVER"], 2);
        assert_eq!(stats.tiers["DIAMOND"], 0);
        assert_eq!(stats.failures_by_code["LEDGER_UNAVAILABLE"], 2);
        assert_eq!(stats.failures_by_code["ADDRESS_INVALID"], 1);
    }

    #[test]
    fn test_summary_lists_every_tier() {
        let telemetry = TelemetryCollector::new();
        telemetry.record_score(TrustTier::Platinum, false, 5);
        let summary = telemetry.get_stats().summary();
        for tier in TrustTier::ALL {
            assert!(summary.contains(tier.as_str()));
        }
        assert!(summary.contains("PLATINUM 1"));
    }
}
