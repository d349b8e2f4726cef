//! Scoring pipeline
//!
//! wallet -> ledger fan-out -> extractor -> aggregator -> scoring -> tier
//!
//! Stateless per request. The two ledger queries and the collaborator
//! lookups run concurrently; any ledger failure aborts the request before a
//! score exists, so an outage never looks like an empty wallet.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::aggregator::{aggregate, FeatureAggregator};
use super::features::{extract_token_stats, extract_transaction_stats};
use super::scoring::{ScoreFactor, ScoringPolicy};
use super::tier::{TierPolicy, TrustTier};
use crate::models::config::EngineConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FeatureVector, WalletAddress};
use crate::providers::ledger::{LedgerClient, SolanaLedgerClient};
use crate::providers::reputation::{NoLivenessVerification, NoRepaymentHistory};

/// Result of scoring one wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletScore {
    pub wallet: WalletAddress,
    pub score: u32,
    pub tier: TrustTier,
    pub features: FeatureVector,
    pub breakdown: Vec<ScoreFactor>,
    pub policy_version: String,
    /// Collaborators that could not answer; their features used defaults
    pub partial_data: Vec<&'static str>,
}

/// Drives the whole pipeline for one wallet at a time
#[derive(Clone)]
pub struct TrustScorer {
    ledger: Arc<dyn LedgerClient>,
    aggregator: FeatureAggregator,
    scoring: ScoringPolicy,
    tiers: TierPolicy,
    request_timeout: Duration,
}

impl TrustScorer {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        aggregator: FeatureAggregator,
        scoring: ScoringPolicy,
        tiers: TierPolicy,
        request_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            aggregator,
            scoring,
            tiers,
            request_timeout,
        }
    }

    /// Solana-backed scorer with the no-data reputation collaborators
    pub fn from_config(config: &EngineConfig) -> AppResult<Self> {
        config.validate()?;
        let ledger = SolanaLedgerClient::new(&config.ledger)?;

        Ok(Self::new(
            Arc::new(ledger),
            FeatureAggregator::new(
                Arc::new(NoRepaymentHistory),
                Arc::new(NoLivenessVerification),
                config.request_timeout,
            ),
            config.scoring.clone(),
            config.tiers.clone(),
            config.request_timeout,
        ))
    }

    pub fn scoring_policy(&self) -> &ScoringPolicy {
        &self.scoring
    }

    pub fn tier_policy(&self) -> &TierPolicy {
        &self.tiers
    }

    /// Score a wallet against the current clock
    pub async fn score_wallet(&self, address: &str) -> AppResult<WalletScore> {
        self.score_wallet_at(address, Utc::now()).await
    }

    /// Score a wallet with wallet age measured from `now`
    pub async fn score_wallet_at(&self, address: &str, now: DateTime<Utc>) -> AppResult<WalletScore> {
        let start = Instant::now();

        // Reject malformed input before any network call
        let wallet = WalletAddress::parse(address)?;

        let ledger = async {
            tokio::time::timeout(self.request_timeout, async {
                tokio::try_join!(
                    self.ledger.signatures_for_address(&wallet),
                    self.ledger.token_accounts_by_owner(&wallet),
                )
            })
            .await?
        };
        // Collaborators never fail, so a ledger error drops their lookups
        let signals = async { Ok::<_, AppError>(self.aggregator.collect_signals(&wallet).await) };
        let ((signatures, accounts), signals) = tokio::try_join!(ledger, signals)?;

        debug!(
            wallet = %wallet,
            signatures = signatures.len(),
            token_accounts = accounts.len(),
            "Ledger data fetched"
        );

        let tx = extract_transaction_stats(&signatures, now);
        let tokens = extract_token_stats(&accounts);
        let features = aggregate(tx, tokens, &signals);

        let trust = self.scoring.evaluate(&features);
        let tier = self.tiers.classify(trust.total);

        info!(
            wallet = %wallet,
            score = trust.total,
            tier = tier.as_str(),
            policy = %trust.policy_version,
            partial = signals.is_partial(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Wallet scored"
        );

        Ok(WalletScore {
            wallet,
            score: trust.total,
            tier,
            features,
            breakdown: trust.breakdown,
            policy_version: trust.policy_version,
            partial_data: signals.unavailable,
        })
    }
}
