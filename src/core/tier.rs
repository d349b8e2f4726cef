//! Tier Classifier
//!
//! Maps a trust score onto the lending program's tiers through a fixed,
//! ascending list of lower bounds. A score equal to a bound belongs to the
//! tier that bound opens (inclusive lower bound).

use serde::{Deserialize, Serialize};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::MAX_SCORE;

/// Ordered trust tiers, lowest first. Variant order matches the on-chain
/// `Tier` enum of the lending program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrustTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl TrustTier {
    pub const ALL: [TrustTier; 5] = [
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Platinum,
        Self::Diamond,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "BRONZE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
            Self::Diamond => "DIAMOND",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Bronze => "Little or no on-chain history",
            Self::Silver => "Some activity, limited track record",
            Self::Gold => "Established, active wallet",
            Self::Platinum => "Long-lived wallet with a solid record",
            Self::Diamond => "Strong history across every signal",
        }
    }

    /// Position in `ALL` (and the on-chain enum discriminant)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// One step of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThreshold {
    /// Inclusive lower bound
    pub min_score: u32,
    pub tier: TrustTier,
}

/// Ascending threshold table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierPolicy {
    thresholds: Vec<TierThreshold>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            thresholds: vec![
                TierThreshold { min_score: 0, tier: TrustTier::Bronze },
                TierThreshold { min_score: 300, tier: TrustTier::Silver },
                TierThreshold { min_score: 500, tier: TrustTier::Gold },
                TierThreshold { min_score: 700, tier: TrustTier::Platinum },
                TierThreshold { min_score: 850, tier: TrustTier::Diamond },
            ],
        }
    }
}

impl TierPolicy {
    /// Build a validated policy
    pub fn new(thresholds: Vec<TierThreshold>) -> AppResult<Self> {
        let policy = Self { thresholds };
        policy.validate()?;
        Ok(policy)
    }

    pub fn thresholds(&self) -> &[TierThreshold] {
        &self.thresholds
    }

    /// Totality and monotonicity of the table
    pub fn validate(&self) -> AppResult<()> {
        let first = self
            .thresholds
            .first()
            .ok_or_else(|| AppError::invalid_config("Tier table is empty"))?;

        if first.min_score != 0 {
            return Err(AppError::invalid_config(format!(
                "Lowest tier must start at 0, starts at {}",
                first.min_score
            )));
        }

        for pair in self.thresholds.windows(2) {
            if pair[1].min_score <= pair[0].min_score {
                return Err(AppError::invalid_config(format!(
                    "Tier bounds must be strictly increasing ({} after {})",
                    pair[1].min_score, pair[0].min_score
                )));
            }
            if pair[1].tier <= pair[0].tier {
                return Err(AppError::invalid_config(format!(
                    "Tier {} cannot follow {}",
                    pair[1].tier.as_str(),
                    pair[0].tier.as_str()
                )));
            }
        }

        if let Some(last) = self.thresholds.last() {
            if last.min_score > MAX_SCORE {
                return Err(AppError::invalid_config(format!(
                    "Tier bound {} exceeds the maximum score {}",
                    last.min_score, MAX_SCORE
                )));
            }
        }

        Ok(())
    }

    /// Highest tier whose lower bound the score reaches
    pub fn classify(&self, score: u32) -> TrustTier {
        self.thresholds
            .iter()
            .rev()
            .find(|t| score >= t.min_score)
            .or_else(|| self.thresholds.first())
            .map(|t| t.tier)
            .unwrap_or(TrustTier::Bronze)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        for pair in TrustTier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for (i, tier) in TrustTier::ALL.iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
    }

    #[test]
    fn test_each_bound_opens_its_tier() {
        let policy = TierPolicy::default();
        let cases = [
            (0, TrustTier::Bronze),
            (299, TrustTier::Bronze),
            (300, TrustTier::Silver),
            (499, TrustTier::Silver),
            (500, TrustTier::Gold),
            (699, TrustTier::Gold),
            (700, TrustTier::Platinum),
            (849, TrustTier::Platinum),
            (850, TrustTier::Diamond),
            (MAX_SCORE, TrustTier::Diamond),
        ];
        for (score, tier) in cases {
            assert_eq!(policy.classify(score), tier, "score {}", score);
        }
    }

    #[test]
    fn test_every_threshold_is_inclusive() {
        let policy = TierPolicy::default();
        assert_eq!(policy.thresholds().len(), TrustTier::ALL.len());
        for t in policy.thresholds() {
            assert_eq!(policy.classify(t.min_score), t.tier);
            if t.min_score > 0 {
                assert!(policy.classify(t.min_score - 1) < t.tier);
            }
        }
    }

    #[test]
    fn test_monotonic_over_full_range() {
        let policy = TierPolicy::default();
        let mut previous = policy.classify(0);
        for score in 1..=MAX_SCORE {
            let tier = policy.classify(score);
            assert!(tier >= previous, "tier dropped at {}", score);
            previous = tier;
        }
    }

    #[test]
    fn test_scores_above_range_stay_in_top_tier() {
        assert_eq!(TierPolicy::default().classify(u32::MAX), TrustTier::Diamond);
    }

    #[test]
    fn test_validation_rejects_bad_tables() {
        assert!(TierPolicy::new(vec![]).is_err());

        let not_from_zero = vec![TierThreshold { min_score: 10, tier: TrustTier::Bronze }];
        assert!(TierPolicy::new(not_from_zero).is_err());

        let unsorted = vec![
            TierThreshold { min_score: 0, tier: TrustTier::Bronze },
            TierThreshold { min_score: 500, tier: TrustTier::Silver },
            TierThreshold { min_score: 400, tier: TrustTier::Gold },
        ];
        assert!(TierPolicy::new(unsorted).is_err());

        let tiers_out_of_order = vec![
            TierThreshold { min_score: 0, tier: TrustTier::Gold },
            TierThreshold { min_score: 500, tier: TrustTier::Silver },
        ];
        assert!(TierPolicy::new(tiers_out_of_order).is_err());

        let above_max = vec![
            TierThreshold { min_score: 0, tier: TrustTier::Bronze },
            TierThreshold { min_score: MAX_SCORE + 1, tier: TrustTier::Diamond },
        ];
        assert!(TierPolicy::new(above_max).is_err());
    }

    #[test]
    fn test_two_tier_policy() {
        let policy = TierPolicy::new(vec![
            TierThreshold { min_score: 0, tier: TrustTier::Bronze },
            TierThreshold { min_score: 700, tier: TrustTier::Diamond },
        ])
        .unwrap();
        assert_eq!(policy.classify(699), TrustTier::Bronze);
        assert_eq!(policy.classify(700), TrustTier::Diamond);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TrustTier::Platinum).unwrap();
        assert_eq!(json, "\"PLATINUM\"");
        let tier: TrustTier = serde_json::from_str("\"SILVER\"").unwrap();
        assert_eq!(tier, TrustTier::Silver);
    }
}
