//! Type definitions for the scoring pipeline
//! Every value here is request-scoped: built fresh, dropped after the response.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{AppError, AppResult};
use crate::utils::constants::PUBKEY_BYTES;

/// Structurally valid Solana wallet address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate a base58 address decoding to exactly 32 bytes
    pub fn parse(input: &str) -> AppResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_address("Wallet address is empty"));
        }

        let bytes = bs58::decode(trimmed).into_vec().map_err(|e| {
            AppError::with_source(
                super::errors::ErrorCode::AddressInvalid,
                format!("Wallet address is not valid base58: {}", trimmed),
                e,
            )
        })?;

        if bytes.len() != PUBKEY_BYTES {
            return Err(AppError::invalid_address(format!(
                "Wallet address must decode to {} bytes, got {}",
                PUBKEY_BYTES,
                bytes.len()
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for WalletAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Activity derived from the signature page(s)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    /// Signatures observed (bounded by the page window)
    pub tx_count: u64,
    /// Whole days since the oldest observed signature
    pub wallet_age_days: u64,
}

/// Holdings derived from SPL token accounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldingStats {
    /// Distinct token accounts
    pub token_count: u64,
    /// Accounts with zero decimals holding exactly one unit
    pub nft_count: u64,
}

/// Lending history from an external collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentHistory {
    pub successful_repayments: u64,
    pub defaults: u64,
}

/// Canonical feature vector, one per scoring request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub tx_count: u64,
    pub wallet_age_days: u64,
    pub nft_count: u64,
    pub successful_repayments: u64,
    pub defaults: u64,
    pub human_verified: bool,
    pub token_count: u64,
    #[serde(rename = "hasVC")]
    pub has_vc: bool,
}

impl FeatureVector {
    /// Brand-new wallet: no activity, no holdings, no history
    pub fn empty() -> Self {
        Self::default()
    }
}
