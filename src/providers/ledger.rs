//! Ledger Client - read-only Solana queries for one wallet
//!
//! Two queries feed the pipeline:
//! - `getSignaturesForAddress`, most recent first, paged through `before`
//! - `getTokenAccountsByOwner`, filtered to the SPL Token program
//!
//! No scoring logic lives here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rpc::RpcProvider;
use crate::models::config::LedgerConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::WalletAddress;
use crate::utils::constants::{DEFAULT_COMMITMENT, TOKEN_PROGRAM};

// ============================================
// LEDGER TYPES
// ============================================

/// Entry returned by getSignaturesForAddress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub memo: Option<String>,
    /// Unix seconds; absent for very old or unconfirmed blocks
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

/// Token account reduced to what the extractor needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenAccount {
    pub pubkey: String,
    pub mint: String,
    /// Raw base-unit amount
    pub amount: u64,
    pub decimals: u8,
}

/// Keyed account from getTokenAccountsByOwner (jsonParsed)
#[derive(Debug, Deserialize)]
struct KeyedTokenAccount {
    pubkey: String,
    account: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    data: ParsedAccountData,
}

#[derive(Debug, Deserialize)]
struct ParsedAccountData {
    parsed: ParsedTokenAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedTokenAccount {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    mint: String,
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount: String,
    decimals: u8,
}

/// RpcResponse-with-context wrapper
#[derive(Debug, Deserialize)]
struct ContextValue<T> {
    value: T,
}

impl TryFrom<KeyedTokenAccount> for TokenAccount {
    type Error = AppError;

    fn try_from(keyed: KeyedTokenAccount) -> Result<Self, Self::Error> {
        let info = keyed.account.data.parsed.info;
        let amount = info.token_amount.amount.parse::<u64>().map_err(|_| {
            AppError::ledger_unavailable(format!(
                "Token account {} has a malformed amount: {:?}",
                keyed.pubkey, info.token_amount.amount
            ))
        })?;

        Ok(Self {
            pubkey: keyed.pubkey,
            mint: info.mint,
            amount,
            decimals: info.token_amount.decimals,
        })
    }
}

// ============================================
// LEDGER CLIENT
// ============================================

/// Read-only view of the ledger for one wallet
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Signatures involving the wallet, most recent first, bounded by paging
    async fn signatures_for_address(&self, wallet: &WalletAddress) -> AppResult<Vec<SignatureInfo>>;

    /// SPL Token accounts owned by the wallet
    async fn token_accounts_by_owner(&self, wallet: &WalletAddress) -> AppResult<Vec<TokenAccount>>;
}

/// Solana JSON-RPC implementation
#[derive(Clone)]
pub struct SolanaLedgerClient {
    rpc: RpcProvider,
    page_size: usize,
    max_pages: usize,
}

impl SolanaLedgerClient {
    pub fn new(config: &LedgerConfig) -> AppResult<Self> {
        let rpc = RpcProvider::new(config)?;
        info!(
            network = config.network.name(),
            url = %rpc.masked_url(),
            page_size = config.signature_page_size,
            max_pages = config.max_signature_pages,
            "Ledger client initialized"
        );

        Ok(Self {
            rpc,
            page_size: config.signature_page_size,
            max_pages: config.max_signature_pages,
        })
    }

    /// Node software version (connectivity check)
    pub async fn version(&self) -> AppResult<String> {
        let result: serde_json::Value = self.rpc.call("getVersion", serde_json::json!([])).await?;
        result
            .get("solana-core")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| AppError::ledger_unavailable("getVersion returned no solana-core"))
    }

    async fn signature_page(
        &self,
        wallet: &WalletAddress,
        before: Option<&str>,
    ) -> AppResult<Vec<SignatureInfo>> {
        let mut options = serde_json::json!({
            "limit": self.page_size,
            "commitment": DEFAULT_COMMITMENT,
        });
        if let Some(cursor) = before {
            options["before"] = serde_json::Value::String(cursor.to_string());
        }

        self.rpc
            .call("getSignaturesForAddress", serde_json::json!([wallet.as_str(), options]))
            .await
    }
}

#[async_trait]
impl LedgerClient for SolanaLedgerClient {
    async fn signatures_for_address(&self, wallet: &WalletAddress) -> AppResult<Vec<SignatureInfo>> {
        let mut signatures: Vec<SignatureInfo> = Vec::new();

        for page in 0..self.max_pages {
            let before = signatures.last().map(|s| s.signature.clone());
            let batch = self.signature_page(wallet, before.as_deref()).await?;
            let fetched = batch.len();
            signatures.extend(batch);

            debug!(wallet = %wallet, page, fetched, "Signature page fetched");

            if fetched < self.page_size {
                break;
            }
        }

        Ok(signatures)
    }

    async fn token_accounts_by_owner(&self, wallet: &WalletAddress) -> AppResult<Vec<TokenAccount>> {
        let params = serde_json::json!([
            wallet.as_str(),
            { "programId": TOKEN_PROGRAM },
            { "encoding": "jsonParsed", "commitment": DEFAULT_COMMITMENT }
        ]);

        let response: ContextValue<Vec<KeyedTokenAccount>> =
            self.rpc.call("getTokenAccountsByOwner", params).await?;

        response.value.into_iter().map(TokenAccount::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_info_parsing() {
        let raw = serde_json::json!([
            {
                "signature": "5h6xBEauJ3PK6SWCZ1PGjBvj8vDdWG3KpwATGy1ARAXFSDwt8GFXM7W5Ncn16wmqokgpiKRLuS83KUxyZyv2sUYv",
                "slot": 114,
                "err": null,
                "memo": null,
                "blockTime": 1_700_000_000,
                "confirmationStatus": "finalized"
            },
            { "signature": "abc", "slot": 100, "err": { "InstructionError": [0, "Custom"] } }
        ]);

        let sigs: Vec<SignatureInfo> = serde_json::from_value(raw).unwrap();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].block_time, Some(1_700_000_000));
        assert_eq!(sigs[0].confirmation_status.as_deref(), Some("finalized"));
        assert_eq!(sigs[1].block_time, None);
        assert!(sigs[1].err.is_some());
    }

    fn keyed(amount: &str, decimals: u8) -> serde_json::Value {
        serde_json::json!({
            "pubkey": "C2gJg6tKpQs41PRS1nC8aw3ZKNZK3HQQZGVrDFDup5nx",
            "account": {
                "data": {
                    "program": "spl-token",
                    "parsed": {
                        "type": "account",
                        "info": {
                            "mint": "3wyAj7Rt1TWVPZVteFJPLa26JmLvdb1CAKEFZm3NY75E",
                            "owner": "4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F",
                            "tokenAmount": {
                                "amount": amount,
                                "decimals": decimals,
                                "uiAmount": 1.0,
                                "uiAmountString": "1"
                            }
                        }
                    },
                    "space": 165
                },
                "executable": false,
                "lamports": 1726080,
                "owner": TOKEN_PROGRAM,
                "rentEpoch": 4
            }
        })
    }

    #[test]
    fn test_token_account_conversion() {
        let raw: KeyedTokenAccount = serde_json::from_value(keyed("1", 0)).unwrap();
        let account = TokenAccount::try_from(raw).unwrap();
        assert_eq!(account.amount, 1);
        assert_eq!(account.decimals, 0);
        assert_eq!(account.mint, "3wyAj7Rt1TWVPZVteFJPLa26JmLvdb1CAKEFZm3NY75E");
    }

    #[test]
    fn test_malformed_amount_is_ledger_error() {
        let raw: KeyedTokenAccount = serde_json::from_value(keyed("1.5", 0)).unwrap();
        let err = TokenAccount::try_from(raw).unwrap_err();
        assert_eq!(err.code, crate::models::errors::ErrorCode::LedgerUnavailable);
    }
}
