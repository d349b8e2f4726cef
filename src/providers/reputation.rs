//! Reputation ports
//!
//! Lending history and liveness verification live in separate services that
//! are not wired up yet. The aggregator talks to them only through these
//! traits; the no-data implementations answer with the neutral defaults.

use async_trait::async_trait;

use crate::models::errors::AppResult;
use crate::models::types::{RepaymentHistory, WalletAddress};

/// Source of repayment/default counts for a wallet
#[async_trait]
pub trait RepaymentHistoryProvider: Send + Sync {
    async fn repayment_history(&self, wallet: &WalletAddress) -> AppResult<RepaymentHistory>;

    /// Name used in logs and `partial_data`
    fn name(&self) -> &'static str {
        "repayment_history"
    }
}

/// Source of the face-liveness verification flag
#[async_trait]
pub trait LivenessVerificationProvider: Send + Sync {
    async fn is_human_verified(&self, wallet: &WalletAddress) -> AppResult<bool>;

    fn name(&self) -> &'static str {
        "liveness_verification"
    }
}

/// No lending history anywhere yet
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRepaymentHistory;

#[async_trait]
impl RepaymentHistoryProvider for NoRepaymentHistory {
    async fn repayment_history(&self, _wallet: &WalletAddress) -> AppResult<RepaymentHistory> {
        Ok(RepaymentHistory::default())
    }
}

/// No liveness service yet; nobody is verified
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLivenessVerification;

#[async_trait]
impl LivenessVerificationProvider for NoLivenessVerification {
    async fn is_human_verified(&self, _wallet: &WalletAddress) -> AppResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_data_providers_return_defaults() {
        let wallet = WalletAddress::parse("11111111111111111111111111111111").unwrap();

        let history = NoRepaymentHistory.repayment_history(&wallet).await.unwrap();
        assert_eq!(history.successful_repayments, 0);
        assert_eq!(history.defaults, 0);

        assert!(!NoLivenessVerification.is_human_verified(&wallet).await.unwrap());
    }
}
