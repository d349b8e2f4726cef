//! Configuration module for the Risk Scoring Engine
//!
//! Every knob has a default in utils/constants.rs and may be overridden by an
//! environment variable. Network selection is deployment configuration only.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult, ErrorCode};
use crate::core::scoring::ScoringPolicy;
use crate::core::tier::TierPolicy;
use crate::utils::constants::{
    DEFAULT_API_HOST, DEFAULT_API_PORT, DEFAULT_MAX_SIGNATURE_PAGES,
    DEFAULT_RATE_LIMIT_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_SIGNATURE_PAGE_SIZE,
    SOLANA_DEVNET_RPC, SOLANA_MAINNET_RPC, SOLANA_TESTNET_RPC,
};

/// Solana cluster to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Mainnet,
    #[default]
    Devnet,
    Testnet,
}

impl Network {
    /// Public RPC endpoint for this cluster
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => SOLANA_MAINNET_RPC,
            Self::Devnet => SOLANA_DEVNET_RPC,
            Self::Testnet => SOLANA_TESTNET_RPC,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
        }
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Self::Mainnet),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(AppError::invalid_config(format!(
                "Unknown Solana network: {}",
                other
            ))),
        }
    }
}

/// Ledger client settings
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub network: Network,
    /// JSON-RPC endpoint (defaults to the network's public URL)
    pub rpc_url: String,
    /// Signatures requested per page
    pub signature_page_size: usize,
    /// Pages followed through the `before` cursor
    pub max_signature_pages: usize,
    /// Timeout for a single RPC call
    pub rpc_timeout: Duration,
    /// Transport retries (0 = fail on first error)
    pub max_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let network = Network::default();
        Self {
            network,
            rpc_url: network.default_rpc_url().to_string(),
            signature_page_size: DEFAULT_SIGNATURE_PAGE_SIZE,
            max_signature_pages: DEFAULT_MAX_SIGNATURE_PAGES,
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            max_retries: DEFAULT_RPC_MAX_RETRIES,
        }
    }
}

impl LedgerConfig {
    /// Config pointing at an explicit endpoint
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(AppError::invalid_config("RPC URL is empty"));
        }
        if self.signature_page_size == 0 || self.signature_page_size > DEFAULT_SIGNATURE_PAGE_SIZE {
            return Err(AppError::invalid_config(format!(
                "Signature page size must be within 1..={}",
                DEFAULT_SIGNATURE_PAGE_SIZE
            )));
        }
        if self.max_signature_pages == 0 {
            return Err(AppError::invalid_config("At least one signature page is required"));
        }
        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            port: DEFAULT_API_PORT,
            rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl ApiConfig {
    /// Bind address; the host must be an IPv4 or IPv6 literal
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let host = self.host.trim().trim_start_matches('[').trim_end_matches(']');
        let ip: IpAddr = host
            .parse()
            .map_err(|_| AppError::invalid_config(format!("RSE_HOST is not an IP address: {}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub ledger: LedgerConfig,
    /// Bound on the concurrent ledger fan-out of one request
    pub request_timeout: Duration,
    pub scoring: ScoringPolicy,
    pub tiers: TierPolicy,
    pub api: ApiConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            scoring: ScoringPolicy::default(),
            tiers: TierPolicy::default(),
            api: ApiConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Build from environment variables on top of defaults
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(network) = env_var(&lookup, "SOLANA_NETWORK") {
            config.ledger.network = network.parse()?;
            config.ledger.rpc_url = config.ledger.network.default_rpc_url().to_string();
        }
        if let Some(url) = env_var(&lookup, "SOLANA_RPC_URL") {
            config.ledger.rpc_url = url;
        }
        if let Some(size) = env_parse(&lookup, "RSE_SIGNATURE_PAGE_SIZE")? {
            config.ledger.signature_page_size = size;
        }
        if let Some(pages) = env_parse(&lookup, "RSE_MAX_SIGNATURE_PAGES")? {
            config.ledger.max_signature_pages = pages;
        }
        if let Some(secs) = env_parse(&lookup, "RSE_RPC_TIMEOUT_SECS")? {
            config.ledger.rpc_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = env_parse(&lookup, "RSE_RPC_MAX_RETRIES")? {
            config.ledger.max_retries = retries;
        }
        if let Some(secs) = env_parse(&lookup, "RSE_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = env_var(&lookup, "RSE_POLICY_PATH") {
            let policy = PolicyFile::load(&path)?;
            config.scoring = policy.scoring;
            config.tiers = policy.tiers;
        }

        if let Some(host) = env_var(&lookup, "RSE_HOST") {
            config.api.host = host;
        }
        // Hosting platforms inject PORT; RSE_PORT is for local runs
        if let Some(port) = env_parse(&lookup, "PORT")? {
            config.api.port = port;
        } else if let Some(port) = env_parse(&lookup, "RSE_PORT")? {
            config.api.port = port;
        }
        if let Some(requests) = env_parse(&lookup, "RSE_RATE_LIMIT_REQUESTS")? {
            config.api.rate_limit_requests = requests;
        }

        config.validate()?;

        info!(
            network = config.ledger.network.name(),
            page_size = config.ledger.signature_page_size,
            max_pages = config.ledger.max_signature_pages,
            max_retries = config.ledger.max_retries,
            policy = %config.scoring.version,
            "Engine configuration loaded"
        );

        Ok(config)
    }

    /// Check every section; policies included
    pub fn validate(&self) -> AppResult<()> {
        self.ledger.validate()?;
        if self.request_timeout.is_zero() {
            return Err(AppError::invalid_config("Request timeout must be positive"));
        }
        self.api.socket_addr()?;
        self.scoring.validate()?;
        self.tiers.validate()?;
        Ok(())
    }
}

/// Versioned scoring policy document
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    pub scoring: ScoringPolicy,
    pub tiers: TierPolicy,
}

impl PolicyFile {
    /// Read and validate a JSON policy file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigInvalidValue,
                format!("Cannot read policy file {}", path.display()),
                e,
            )
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        let policy: Self = serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigInvalidValue,
                format!("Invalid policy document: {}", e),
                e,
            )
        })?;
        policy.scoring.validate()?;
        policy.tiers.validate()?;
        Ok(policy)
    }
}

fn env_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> AppResult<Option<T>> {
    match env_var(lookup, key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::invalid_config(format!("{} has an invalid value: {}", key, raw))
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tier::TrustTier;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.network, Network::Devnet);
        assert_eq!(config.ledger.rpc_url, SOLANA_DEVNET_RPC);
        assert_eq!(config.api.port, 4000);
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("mainnet-beta".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("DEVNET".parse::<Network>().unwrap(), Network::Devnet);
        let err = "localnet".parse::<Network>().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = EngineConfig::default();
        config.ledger.signature_page_size = 0;
        assert!(config.validate().is_err());
        config.ledger.signature_page_size = 1001;
        assert!(config.validate().is_err());
        config.ledger.signature_page_size = 250;
        assert!(config.validate().is_ok());
    }

    const TEST_POLICY: &str = r#"{
            "scoring": {
                "version": "test-v2",
                "base": 50.0,
                "tx_count": { "weight": 300.0, "cap": 500 },
                "wallet_age_days": { "weight": 200.0, "cap": 365 },
                "nft_count": { "weight": 50.0, "cap": 5 },
                "successful_repayments": { "weight": 200.0, "cap": 10 },
                "token_count": { "weight": 50.0, "cap": 20 },
                "human_verified": 100.0,
                "has_vc": 50.0,
                "default_penalty": { "per_default": 200.0, "max": 1000.0 }
            },
            "tiers": [
                { "min_score": 0, "tier": "BRONZE" },
                { "min_score": 500, "tier": "GOLD" }
            ]
        }"#;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_policy_file_round_trip() {
        let policy = PolicyFile::from_json(TEST_POLICY).unwrap();
        assert_eq!(policy.scoring.version, "test-v2");
        assert_eq!(policy.tiers.classify(499), TrustTier::Bronze);
        assert_eq!(policy.tiers.classify(500), TrustTier::Gold);
    }

    #[test]
    fn test_policy_file_rejects_overweight() {
        let raw = r#"{
            "scoring": {
                "version": "too-heavy",
                "base": 500.0,
                "tx_count": { "weight": 600.0, "cap": 500 },
                "wallet_age_days": { "weight": 0.0, "cap": 1 },
                "nft_count": { "weight": 0.0, "cap": 1 },
                "successful_repayments": { "weight": 0.0, "cap": 1 },
                "token_count": { "weight": 0.0, "cap": 1 },
                "human_verified": 0.0,
                "has_vc": 0.0,
                "default_penalty": { "per_default": 0.0, "max": 0.0 }
            },
            "tiers": [ { "min_score": 0, "tier": "BRONZE" } ]
        }"#;

        let err = PolicyFile::from_json(raw).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.ledger.network, Network::Devnet);
        assert_eq!(config.ledger.rpc_url, SOLANA_DEVNET_RPC);
        assert_eq!(config.api.port, DEFAULT_API_PORT);
    }

    #[test]
    fn test_network_then_rpc_url_override() {
        let config = EngineConfig::from_lookup(lookup(&[("SOLANA_NETWORK", "mainnet-beta")])).unwrap();
        assert_eq!(config.ledger.network, Network::Mainnet);
        assert_eq!(config.ledger.rpc_url, SOLANA_MAINNET_RPC);

        let config = EngineConfig::from_lookup(lookup(&[
            ("SOLANA_NETWORK", "testnet"),
            ("SOLANA_RPC_URL", "https://rpc.example.com/?api-key=abc"),
        ]))
        .unwrap();
        assert_eq!(config.ledger.network, Network::Testnet);
        assert_eq!(config.ledger.rpc_url, "https://rpc.example.com/?api-key=abc");
    }

    #[test]
    fn test_port_wins_over_rse_port() {
        let config = EngineConfig::from_lookup(lookup(&[("RSE_PORT", "5000")])).unwrap();
        assert_eq!(config.api.port, 5000);

        let config = EngineConfig::from_lookup(lookup(&[("PORT", "8080"), ("RSE_PORT", "5000")])).unwrap();
        assert_eq!(config.api.port, 8080);

        // Blank values count as unset
        let config = EngineConfig::from_lookup(lookup(&[("PORT", "  "), ("RSE_PORT", "5000")])).unwrap();
        assert_eq!(config.api.port, 5000);
    }

    #[test]
    fn test_numeric_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("RSE_SIGNATURE_PAGE_SIZE", "250"),
            ("RSE_MAX_SIGNATURE_PAGES", "4"),
            ("RSE_REQUEST_TIMEOUT_SECS", "7"),
            ("RSE_RATE_LIMIT_REQUESTS", "12"),
        ]))
        .unwrap();
        assert_eq!(config.ledger.signature_page_size, 250);
        assert_eq!(config.ledger.max_signature_pages, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(7));
        assert_eq!(config.api.rate_limit_requests, 12);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for (key, value) in [
            ("RSE_SIGNATURE_PAGE_SIZE", "lots"),
            ("PORT", "99999"),
            ("RSE_REQUEST_TIMEOUT_SECS", "0"),
            ("SOLANA_NETWORK", "localnet"),
            ("RSE_HOST", "localhost"),
        ] {
            let err = EngineConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert_eq!(err.code, ErrorCode::ConfigInvalidValue, "{}={}", key, value);
        }
    }

    #[test]
    fn test_policy_path_loads_file() {
        let path = std::env::temp_dir().join(format!("rse-policy-{}.json", std::process::id()));
        std::fs::write(&path, TEST_POLICY).unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = EngineConfig::from_lookup(lookup(&[("RSE_POLICY_PATH", path_str.as_str())]));
        std::fs::remove_file(&path).ok();

        let config = config.unwrap();
        assert_eq!(config.scoring.version, "test-v2");
        assert_eq!(config.tiers.classify(500), TrustTier::Gold);
    }

    #[test]
    fn test_missing_policy_path_is_config_error() {
        let err = EngineConfig::from_lookup(lookup(&[("RSE_POLICY_PATH", "/nonexistent/rse-policy.json")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_socket_addr_accepts_ipv4_and_ipv6() {
        let mut api = ApiConfig::default();
        assert_eq!(api.socket_addr().unwrap(), "0.0.0.0:4000".parse::<SocketAddr>().unwrap());

        api.host = "::".to_string();
        api.port = 8080;
        assert_eq!(api.socket_addr().unwrap(), "[::]:8080".parse::<SocketAddr>().unwrap());

        api.host = "[::1]".to_string();
        assert!(api.socket_addr().unwrap().is_ipv6());

        api.host = "localhost".to_string();
        assert_eq!(api.socket_addr().unwrap_err().code, ErrorCode::ConfigInvalidValue);
    }
}
