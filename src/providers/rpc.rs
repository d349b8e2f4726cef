//! RPC Client Module - Solana JSON-RPC transport
//!
//! 1. One pooled reqwest client per engine, cloned into every request
//! 2. Per-call timeout and gzip compression
//! 3. Optional exponential backoff with jitter (off by default)
//! 4. Endpoint credentials masked in logs
//!
//! Every transport failure surfaces as LEDGER_UNAVAILABLE. An outage must
//! never look like a wallet with no activity.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::config::LedgerConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    RETRY_BASE_DELAY_MS, RETRY_JITTER_PERCENT, RETRY_MAX_DELAY_MS, USER_AGENT as USER_AGENT_CONST,
};

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Node reports itself unhealthy or behind the cluster (code -32005)
    pub fn is_node_unhealthy(&self) -> bool {
        self.code == -32005
    }

    /// Provider quota text carried in a JSON-RPC error body
    pub fn is_rate_limit(&self) -> bool {
        self.message.to_lowercase().contains("rate limit")
    }

    fn kind(&self) -> &'static str {
        if self.is_node_unhealthy() {
            "node unhealthy"
        } else if self.is_rate_limit() {
            "rate limited"
        } else {
            "error"
        }
    }
}

/// JSON-RPC provider shared by all in-flight requests
#[derive(Clone)]
pub struct RpcProvider {
    url: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl RpcProvider {
    pub fn new(config: &LedgerConfig) -> AppResult<Self> {
        Ok(Self {
            url: config.rpc_url.clone(),
            client: Self::build_client(config.rpc_timeout)?,
            max_retries: config.max_retries,
        })
    }

    fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorCode::ConfigInvalidValue, "Failed to build HTTP client", e)
            })
    }

    /// Execute JSON-RPC call, retrying transport failures if configured
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let mut attempt = 0;
        loop {
            match self.execute_call::<T>(&payload).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay_ms(attempt);
                    warn!(
                        method,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Ledger call failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute_call<T: DeserializeOwned>(&self, payload: &serde_json::Value) -> AppResult<T> {
        debug!(url = %self.masked_url(), method = %payload["method"], "RPC request");

        let response = self.client.post(&self.url).json(payload).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::ledger_unavailable("Ledger rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(AppError::ledger_unavailable(format!("Ledger HTTP error: {}", status)));
        }

        let body = response.text().await?;
        let envelope: RpcResponse<T> = serde_json::from_str(&body)?;

        if let Some(error) = envelope.error {
            return Err(AppError::ledger_unavailable(format!(
                "Ledger RPC {}: {} (code: {})",
                error.kind(),
                error.message,
                error.code
            )));
        }

        envelope
            .result
            .ok_or_else(|| AppError::ledger_unavailable("No result in ledger response"))
    }

    /// RPC URL with credentials stripped (for logging)
    pub fn masked_url(&self) -> String {
        mask_url(&self.url)
    }
}

/// Hide API keys carried in a path segment or query string
pub fn mask_url(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    let masked = match without_query.split_once("/v2/") {
        Some((head, _)) => format!("{}/v2/***HIDDEN***", head),
        None => without_query.to_string(),
    };
    if url.contains('?') {
        format!("{}?***", masked)
    } else {
        masked
    }
}

/// Exponential backoff with +/- jitter, capped
fn backoff_delay_ms(attempt: u32) -> u64 {
    let exp = attempt.saturating_sub(1).min(16);
    let base = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << exp);
    let capped = base.min(RETRY_MAX_DELAY_MS);

    let jitter_range = (capped * RETRY_JITTER_PERCENT / 100) as i64;
    let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
    (capped as i64 + jitter).max(50) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://solana-mainnet.g.alchemy.com/v2/secret"),
            "https://solana-mainnet.g.alchemy.com/v2/***HIDDEN***"
        );
        assert_eq!(
            mask_url("https://mainnet.helius-rpc.com/?api-key=secret"),
            "https://mainnet.helius-rpc.com/?***"
        );
        assert_eq!(mask_url("https://api.devnet.solana.com"), "https://api.devnet.solana.com");
    }

    #[test]
    fn test_backoff_is_capped() {
        for attempt in 1..40 {
            let delay = backoff_delay_ms(attempt);
            let ceiling = RETRY_MAX_DELAY_MS + RETRY_MAX_DELAY_MS * RETRY_JITTER_PERCENT / 100;
            assert!(delay <= ceiling, "attempt {} waited {}ms", attempt, delay);
            assert!(delay >= 50);
        }
    }

    #[test]
    fn test_rpc_error_classification() {
        let behind = RpcError {
            code: -32005,
            message: "Node is behind by 120 slots".to_string(),
        };
        assert!(behind.is_node_unhealthy());
        assert!(!behind.is_rate_limit());
        assert_eq!(behind.kind(), "node unhealthy");

        let quota = RpcError {
            code: -32000,
            message: "Rate limit exceeded for this API key".to_string(),
        };
        assert!(quota.is_rate_limit());
        assert_eq!(quota.kind(), "rate limited");

        let bad_params = RpcError {
            code: -32602,
            message: "Invalid param: WrongSize".to_string(),
        };
        assert!(!bad_params.is_node_unhealthy());
        assert_eq!(bad_params.kind(), "error");
    }
}
