//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::{RateLimitConfig, RateLimiter};
use super::types::*;
use crate::core::pipeline::TrustScorer;
use crate::models::config::ApiConfig;
use crate::models::errors::AppError;
use crate::telemetry::TelemetryCollector;
use crate::utils::constants::APP_VERSION;

/// Shared application state
pub struct AppState {
    pub scorer: TrustScorer,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Cluster name reported by the health check
    pub network: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        scorer: TrustScorer,
        telemetry: Arc<TelemetryCollector>,
        api: &ApiConfig,
        network: impl Into<String>,
    ) -> Self {
        Self {
            scorer,
            telemetry,
            rate_limiter: Arc::new(RateLimiter::new(RateLimitConfig::from(api))),
            network: network.into(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn failure(err: &AppError, start: Instant) -> ApiFailure {
    let status = StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))))
}

// ============================================
// Root / Health Check
// ============================================

pub async fn root() -> &'static str {
    "RSE Server Running"
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        network: state.network.clone(),
        policy_version: state.scorer.scoring_policy().version.clone(),
        tiers: state.scorer.tier_policy().thresholds().to_vec(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Wallet Scoring
// ============================================

pub async fn score_wallet(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScoreWalletRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<WalletScoreData>>, ApiFailure> {
    let start = Instant::now();

    let wallet = match payload {
        Ok(Json(req)) => req.wallet.filter(|w| !w.trim().is_empty()),
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable scoring request");
            None
        }
    };

    let Some(wallet) = wallet else {
        let err = AppError::bad_request("wallet required");
        state.telemetry.record_failure(err.code);
        return Err(failure(&err, start));
    };

    match state.scorer.score_wallet(&wallet).await {
        Ok(score) => {
            let latency = start.elapsed().as_millis() as u64;
            state
                .telemetry
                .record_score(score.tier, !score.partial_data.is_empty(), latency);

            Ok(Json(ApiResponse::success(
                WalletScoreData::from(score),
                elapsed_ms(start),
            )))
        }
        Err(err) => {
            if err.code.is_retryable() {
                warn!(code = err.code_str(), error = %err, "Scoring failed");
            } else {
                info!(code = err.code_str(), error = %err, "Scoring rejected");
            }
            state.telemetry.record_failure(err.code);
            Err(failure(&err, start))
        }
    }
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        telemetry: state.telemetry.get_stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: "v1".to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
