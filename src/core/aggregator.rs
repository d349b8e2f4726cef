//! Feature Aggregator
//!
//! Merges ledger-derived statistics with best-effort signals from the
//! reputation services into one FeatureVector.
//!
//! Collaborator failures never fail a request: the affected features fall
//! back to their neutral defaults and the collaborator is named in
//! `ExternalSignals::unavailable` so callers can surface partial data.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{FeatureVector, RepaymentHistory, TokenHoldingStats, TransactionStats, WalletAddress};
use crate::providers::reputation::{
    LivenessVerificationProvider, NoLivenessVerification, NoRepaymentHistory, RepaymentHistoryProvider,
};
use crate::utils::constants::DEFAULT_REQUEST_TIMEOUT_SECS;

/// What the reputation services said about a wallet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalSignals {
    /// `None` when the history service could not answer
    pub repayment: Option<RepaymentHistory>,
    /// `None` when the liveness service could not answer
    pub human_verified: Option<bool>,
    /// Names of collaborators that failed for this request
    pub unavailable: Vec<&'static str>,
}

impl ExternalSignals {
    pub fn is_partial(&self) -> bool {
        !self.unavailable.is_empty()
    }
}

/// Collects collaborator signals and assembles the feature vector
#[derive(Clone)]
pub struct FeatureAggregator {
    repayments: Arc<dyn RepaymentHistoryProvider>,
    liveness: Arc<dyn LivenessVerificationProvider>,
    timeout: Duration,
}

impl Default for FeatureAggregator {
    fn default() -> Self {
        Self::new(
            Arc::new(NoRepaymentHistory),
            Arc::new(NoLivenessVerification),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}

impl FeatureAggregator {
    pub fn new(
        repayments: Arc<dyn RepaymentHistoryProvider>,
        liveness: Arc<dyn LivenessVerificationProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            repayments,
            liveness,
            timeout,
        }
    }

    /// Per-collaborator deadline
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query both collaborators concurrently, degrading on error or timeout
    pub async fn collect_signals(&self, wallet: &WalletAddress) -> ExternalSignals {
        let (repayment, human_verified) = tokio::join!(
            bounded(self.timeout, self.repayments.repayment_history(wallet)),
            bounded(self.timeout, self.liveness.is_human_verified(wallet)),
        );

        let mut signals = ExternalSignals::default();

        match repayment {
            Ok(history) => signals.repayment = Some(history),
            Err(e) => {
                degrade(wallet, self.repayments.name(), &e);
                signals.unavailable.push(self.repayments.name());
            }
        }

        match human_verified {
            Ok(verified) => signals.human_verified = Some(verified),
            Err(e) => {
                degrade(wallet, self.liveness.name(), &e);
                signals.unavailable.push(self.liveness.name());
            }
        }

        signals
    }
}

/// Build the canonical feature vector. Missing signals take their defaults;
/// `has_vc` is set whenever the wallet holds any token account.
pub fn aggregate(
    tx: TransactionStats,
    tokens: TokenHoldingStats,
    signals: &ExternalSignals,
) -> FeatureVector {
    let history = signals.repayment.unwrap_or_default();

    FeatureVector {
        tx_count: tx.tx_count,
        wallet_age_days: tx.wallet_age_days,
        nft_count: tokens.nft_count,
        successful_repayments: history.successful_repayments,
        defaults: history.defaults,
        human_verified: signals.human_verified.unwrap_or(false),
        token_count: tokens.token_count,
        has_vc: tokens.token_count > 0,
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl std::future::Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AppError::partial_data(format!("no answer within {}ms", limit.as_millis())))?
}

fn degrade(wallet: &WalletAddress, collaborator: &'static str, error: &AppError) {
    warn!(
        code = ErrorCode::PartialDataUnavailable.as_str(),
        wallet = %wallet,
        collaborator,
        error = %error,
        "Collaborator unavailable, using defaults"
    );
}
