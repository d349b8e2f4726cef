//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::pipeline::WalletScore;
use crate::core::scoring::ScoreFactor;
use crate::core::tier::{TierThreshold, TrustTier};
use crate::models::errors::{AppError, ErrorCode};
use crate::models::types::FeatureVector;
use crate::telemetry::TelemetryStats;

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
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: ErrorCode::ApiRateLimited.as_str().to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            retryable: true,
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            retryable: err.code.is_retryable(),
            details: None,
        }
    }
}

// ============================================
// Wallet Scoring
// ============================================

/// `wallet` is optional so a missing field gets our own 400, not a rejection
#[derive(Debug, Deserialize)]
pub struct ScoreWalletRequest {
    #[serde(default)]
    pub wallet: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletScoreData {
    pub wallet: String,
    pub score: u32,
    pub tier: TrustTier,
    pub tier_description: String,
    /// Feature vector with its camelCase wire names
    pub features_used: FeatureVector,
    pub breakdown: Vec<ScoreFactorResponse>,
    pub partial_data: Vec<String>,
    pub policy_version: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreFactorResponse {
    pub name: String,
    pub contribution: f64,
    pub reason: String,
}

impl From<ScoreFactor> for ScoreFactorResponse {
    fn from(factor: ScoreFactor) -> Self {
        Self {
            name: factor.name.to_string(),
            // Two decimals is plenty for display
            contribution: (factor.contribution * 100.0).round() / 100.0,
            reason: factor.reason,
        }
    }
}

impl From<WalletScore> for WalletScoreData {
    fn from(score: WalletScore) -> Self {
        Self {
            wallet: score.wallet.to_string(),
            score: score.score,
            tier: score.tier,
            tier_description: score.tier.description().to_string(),
            features_used: score.features,
            breakdown: score.breakdown.into_iter().map(Into::into).collect(),
            partial_data: score.partial_data.into_iter().map(String::from).collect(),
            policy_version: score.policy_version,
        }
    }
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub telemetry: TelemetryStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub network: String,
    pub policy_version: String,
    /// Active tier table, lowest bound first
    pub tiers: Vec<TierThreshold>,
    pub uptime_seconds: u64,
}
