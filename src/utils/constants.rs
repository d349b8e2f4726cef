//! Constants Module - Single Source of Truth
//!
//! Program ids, public endpoints and pipeline defaults.
//! No hardcoded values in other modules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "TigerTrust RSE";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for RPC requests
pub const USER_AGENT: &str = "TigerTrust-RSE/0.1.0";

// ============================================
// SOLANA CONSTANTS
// ============================================

/// SPL Token Program ID (the only token namespace we count)
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Decoded length of a Solana public key
pub const PUBKEY_BYTES: usize = 32;

/// Public JSON-RPC endpoints
pub const SOLANA_MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";
pub const SOLANA_DEVNET_RPC: &str = "https://api.devnet.solana.com";
pub const SOLANA_TESTNET_RPC: &str = "https://api.testnet.solana.com";

/// Commitment used for every read
pub const DEFAULT_COMMITMENT: &str = "confirmed";

// ============================================
// LEDGER CLIENT DEFAULTS
// ============================================

/// Signatures requested per page (RPC maximum)
pub const DEFAULT_SIGNATURE_PAGE_SIZE: usize = 1000;

/// Pages followed through the `before` cursor
pub const DEFAULT_MAX_SIGNATURE_PAGES: usize = 1;

/// Per-call HTTP timeout (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Bound on the whole ledger fan-out of one request (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Retries are off unless configured
pub const DEFAULT_RPC_MAX_RETRIES: u32 = 0;

/// Base retry delay in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 250;

/// Maximum retry delay in milliseconds
pub const RETRY_MAX_DELAY_MS: u64 = 4000;

/// Jitter percentage applied to retry delays
pub const RETRY_JITTER_PERCENT: u64 = 20;

// ============================================
// SCORING CONSTANTS
// ============================================

/// Upper bound of the trust score
pub const MAX_SCORE: u32 = 1000;

/// Seconds in one day, for wallet age
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Version tag of the built-in scoring policy
pub const DEFAULT_POLICY_VERSION: &str = "tigertrust-v1";

// ============================================
// API DEFAULTS
// ============================================

/// Default bind host
pub const DEFAULT_API_HOST: &str = "0.0.0.0";

/// Default port
pub const DEFAULT_API_PORT: u16 = 4000;

/// Requests per rate-limit window per client
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 60;

/// Rate-limit window (seconds)
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// In-flight requests per route; the rest queue
pub const MAX_IN_FLIGHT_REQUESTS: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_program_is_valid_pubkey() {
        let decoded = bs58::decode(TOKEN_PROGRAM).into_vec().unwrap();
        assert_eq!(decoded.len(), PUBKEY_BYTES);
    }

    #[test]
    fn test_defaults_are_bounded() {
        assert_eq!(DEFAULT_SIGNATURE_PAGE_SIZE, 1000);
        assert_eq!(DEFAULT_MAX_SIGNATURE_PAGES, 1);
        assert_eq!(DEFAULT_RPC_MAX_RETRIES, 0);
        assert!(DEFAULT_REQUEST_TIMEOUT_SECS >= DEFAULT_RPC_TIMEOUT_SECS);
    }
}
