//! TigerTrust Risk Scoring Engine
//!
//! Assigns a trust score (0-1000) and a risk tier to a Solana wallet for
//! collateral-free micro-lending decisions:
//! - Ledger queries: signature history and SPL token holdings
//! - Feature extraction and aggregation with reputation signals
//! - Versioned, deterministic scoring policy
//! - Threshold-based tier classification

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod telemetry;
pub mod utils;

pub use crate::core::{
    FeatureAggregator, ScoringPolicy, TierPolicy, TrustScore, TrustScorer, TrustTier, WalletScore,
};
pub use models::{AppError, AppResult, EngineConfig, ErrorCode, FeatureVector, Network, WalletAddress};
pub use providers::{LedgerClient, SolanaLedgerClient};
pub use telemetry::{TelemetryCollector, TelemetryStats};
