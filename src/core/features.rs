//! Feature Extractor
//!
//! Turns raw ledger responses into derived statistics. Pure functions: the
//! clock is passed in so extraction is reproducible.

use chrono::{DateTime, Utc};

use crate::models::types::{TokenHoldingStats, TransactionStats};
use crate::providers::ledger::{SignatureInfo, TokenAccount};
use crate::utils::constants::SECONDS_PER_DAY;

/// Count signatures and age the wallet from the oldest one fetched.
///
/// Signatures arrive most recent first, so the oldest is the last element.
/// Only that entry's block time is consulted: when it is missing the age is
/// 0 even if newer entries are timestamped. The count is bounded by the
/// fetched page window and undercounts very active wallets.
pub fn extract_transaction_stats(signatures: &[SignatureInfo], now: DateTime<Utc>) -> TransactionStats {
    let wallet_age_days = signatures
        .last()
        .and_then(|oldest| oldest.block_time)
        .map(|block_time| age_in_days(block_time, now))
        .unwrap_or(0);

    TransactionStats {
        tx_count: signatures.len() as u64,
        wallet_age_days,
    }
}

/// Whole days between `block_time` and `now`; future timestamps count as 0
fn age_in_days(block_time: i64, now: DateTime<Utc>) -> u64 {
    let elapsed = now.timestamp().saturating_sub(block_time);
    if elapsed <= 0 {
        return 0;
    }
    (elapsed / SECONDS_PER_DAY) as u64
}

/// NFT heuristic: zero decimals and exactly one unit held.
/// Fungible tokens minted with zero decimals can be false positives.
pub fn is_nft_like(account: &TokenAccount) -> bool {
    account.decimals == 0 && account.amount == 1
}

pub fn extract_token_stats(accounts: &[TokenAccount]) -> TokenHoldingStats {
    TokenHoldingStats {
        token_count: accounts.len() as u64,
        nft_count: accounts.iter().filter(|a| is_nft_like(a)).count() as u64,
    }
}
