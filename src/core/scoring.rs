//! Scoring Function
//!
//! Reduces a FeatureVector to a trust score in 0..=1000.
//!
//! Every positive signal contributes `weight * min(value, cap) / cap`, boolean
//! signals contribute their full weight when set, and each recorded default
//! subtracts a capped penalty. The sum starts from a floor `base` so that a
//! brand-new wallet lands on a fixed, documented score.
//!
//! The function is pure and total: no I/O, no randomness, a fixed summation
//! order, and a clamped result for every input.

use serde::{Deserialize, Serialize};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::FeatureVector;
use crate::utils::constants::{DEFAULT_POLICY_VERSION, MAX_SCORE};

/// Weight of a counted feature, saturating at `cap`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CappedWeight {
    pub weight: f64,
    pub cap: u64,
}

impl CappedWeight {
    pub const fn new(weight: f64, cap: u64) -> Self {
        Self { weight, cap }
    }

    /// Linear in `value` up to `cap`, flat afterwards
    pub fn contribution(&self, value: u64) -> f64 {
        if self.cap == 0 {
            return 0.0;
        }
        self.weight * (value.min(self.cap) as f64 / self.cap as f64)
    }
}

/// Penalty for recorded loan defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultPenalty {
    pub per_default: f64,
    pub max: f64,
}

impl DefaultPenalty {
    pub fn penalty(&self, defaults: u64) -> f64 {
        (defaults as f64 * self.per_default).min(self.max)
    }
}

/// Versioned weight table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub version: String,
    /// Score of the all-zero vector
    pub base: f64,
    pub tx_count: CappedWeight,
    pub wallet_age_days: CappedWeight,
    pub nft_count: CappedWeight,
    pub successful_repayments: CappedWeight,
    pub token_count: CappedWeight,
    pub human_verified: f64,
    pub has_vc: f64,
    pub default_penalty: DefaultPenalty,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            base: 100.0,
            tx_count: CappedWeight::new(200.0, 1000),
            wallet_age_days: CappedWeight::new(200.0, 730),
            nft_count: CappedWeight::new(50.0, 5),
            successful_repayments: CappedWeight::new(200.0, 10),
            token_count: CappedWeight::new(50.0, 20),
            human_verified: 150.0,
            has_vc: 50.0,
            default_penalty: DefaultPenalty {
                per_default: 150.0,
                max: 1000.0,
            },
        }
    }
}

impl ScoringPolicy {
    /// Reject tables that could break bounds or monotonicity
    pub fn validate(&self) -> AppResult<()> {
        if self.version.trim().is_empty() {
            return Err(AppError::invalid_config("Scoring policy version is empty"));
        }

        let capped = [
            ("tx_count", &self.tx_count),
            ("wallet_age_days", &self.wallet_age_days),
            ("nft_count", &self.nft_count),
            ("successful_repayments", &self.successful_repayments),
            ("token_count", &self.token_count),
        ];
        for (name, w) in capped {
            check_weight(name, w.weight)?;
            if w.cap == 0 {
                return Err(AppError::invalid_config(format!("{} cap must be positive", name)));
            }
        }

        check_weight("base", self.base)?;
        check_weight("human_verified", self.human_verified)?;
        check_weight("has_vc", self.has_vc)?;
        check_weight("default_penalty.per_default", self.default_penalty.per_default)?;
        check_weight("default_penalty.max", self.default_penalty.max)?;

        let ceiling = self.ceiling();
        if ceiling > MAX_SCORE as f64 {
            return Err(AppError::invalid_config(format!(
                "Policy {} can reach {:.1}, above the maximum score {}",
                self.version, ceiling, MAX_SCORE
            )));
        }

        Ok(())
    }

    /// Highest raw score this policy can produce
    pub fn ceiling(&self) -> f64 {
        self.base
            + self.tx_count.weight
            + self.wallet_age_days.weight
            + self.nft_count.weight
            + self.successful_repayments.weight
            + self.token_count.weight
            + self.human_verified
            + self.has_vc
    }

    /// Score of a wallet with no history at all
    pub fn floor_score(&self) -> u32 {
        self.score(&FeatureVector::empty())
    }

    /// Numeric score only
    pub fn score(&self, features: &FeatureVector) -> u32 {
        finalize(self.factors(features).iter().map(|f| f.contribution).sum())
    }

    /// Score plus per-feature breakdown
    pub fn evaluate(&self, features: &FeatureVector) -> TrustScore {
        let breakdown = self.factors(features);
        let total = finalize(breakdown.iter().map(|f| f.contribution).sum());

        TrustScore {
            total,
            policy_version: self.version.clone(),
            breakdown,
        }
    }

    fn factors(&self, f: &FeatureVector) -> Vec<ScoreFactor> {
        let flag = |set: bool, weight: f64| if set { weight } else { 0.0 };

        vec![
            ScoreFactor::new("base", self.base, "Floor score for any valid wallet".to_string()),
            ScoreFactor::new(
                "txCount",
                self.tx_count.contribution(f.tx_count),
                format!("{} transactions (saturates at {})", f.tx_count, self.tx_count.cap),
            ),
            ScoreFactor::new(
                "walletAgeDays",
                self.wallet_age_days.contribution(f.wallet_age_days),
                format!(
                    "{} days since first observed activity (saturates at {})",
                    f.wallet_age_days, self.wallet_age_days.cap
                ),
            ),
            ScoreFactor::new(
                "nftCount",
                self.nft_count.contribution(f.nft_count),
                format!("{} NFT-like holdings", f.nft_count),
            ),
            ScoreFactor::new(
                "successfulRepayments",
                self.successful_repayments.contribution(f.successful_repayments),
                format!("{} loans repaid", f.successful_repayments),
            ),
            ScoreFactor::new(
                "tokenCount",
                self.token_count.contribution(f.token_count),
                format!("{} token accounts", f.token_count),
            ),
            ScoreFactor::new(
                "humanVerified",
                flag(f.human_verified, self.human_verified),
                if f.human_verified { "Liveness check passed" } else { "No liveness check" }
                    .to_string(),
            ),
            ScoreFactor::new(
                "hasVC",
                flag(f.has_vc, self.has_vc),
                if f.has_vc { "Holds token credentials" } else { "No token credentials" }
                    .to_string(),
            ),
            ScoreFactor::new(
                "defaults",
                -self.default_penalty.penalty(f.defaults),
                format!("{} recorded defaults", f.defaults),
            ),
        ]
    }
}

fn check_weight(name: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::invalid_config(format!(
            "{} must be a finite, non-negative number (got {})",
            name, value
        )));
    }
    Ok(())
}

fn finalize(raw: f64) -> u32 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, MAX_SCORE as f64) as u32
}

/// Scored wallet with transparency data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustScore {
    /// Final score (0..=1000)
    pub total: u32,
    pub policy_version: String,
    pub breakdown: Vec<ScoreFactor>,
}

/// One feature's share of the score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFactor {
    pub name: &'static str,
    pub contribution: f64,
    pub reason: String,
}

impl ScoreFactor {
    fn new(name: &'static str, contribution: f64, reason: String) -> Self {
        Self {
            name,
            contribution,
            reason,
        }
    }
}
