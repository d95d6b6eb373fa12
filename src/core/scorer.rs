//! Rule-based fraud risk scoring.
//!
//! Three independent components (amount, location, frequency) are summed,
//! clamped at the ceiling and compared with the block threshold. The scorer
//! holds no state between calls.

use crate::core::threshold::ThresholdTable;
use crate::domain::model::{
    Amount, Decision, FraudAssessment, Frequency, LocationRisk, RiskComponents, Transaction,
};
use crate::utils::error::{Result, ScoreError};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CEILING: u32 = 100;
pub const DEFAULT_BLOCK_THRESHOLD: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationScores {
    pub same_city: u32,
    pub different_city: u32,
    pub different_country: u32,
}

impl LocationScores {
    pub fn score(&self, location: LocationRisk) -> u32 {
        match location {
            LocationRisk::SameCity => self.same_city,
            LocationRisk::DifferentCity => self.different_city,
            LocationRisk::DifferentCountry => self.different_country,
        }
    }
}

impl Default for LocationScores {
    fn default() -> Self {
        Self {
            same_city: 0,
            different_city: 20,
            different_country: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    #[serde(default = "ThresholdTable::amount_default")]
    pub amount: ThresholdTable,
    #[serde(default)]
    pub location: LocationScores,
    #[serde(default = "ThresholdTable::frequency_default")]
    pub frequency: ThresholdTable,
    #[serde(default = "default_ceiling")]
    pub ceiling: u32,
    #[serde(default = "default_block_threshold")]
    pub block_threshold: u32,
}

fn default_ceiling() -> u32 {
    DEFAULT_CEILING
}

fn default_block_threshold() -> u32 {
    DEFAULT_BLOCK_THRESHOLD
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            amount: ThresholdTable::amount_default(),
            location: LocationScores::default(),
            frequency: ThresholdTable::frequency_default(),
            ceiling: DEFAULT_CEILING,
            block_threshold: DEFAULT_BLOCK_THRESHOLD,
        }
    }
}

impl Validate for ScoringPolicy {
    fn validate(&self) -> Result<()> {
        if self.ceiling == 0 {
            return Err(ScoreError::InvalidConfigValueError {
                field: "policy.ceiling".to_string(),
                value: self.ceiling.to_string(),
                reason: "Ceiling must be at least 1".to_string(),
            });
        }
        validate_range("policy.block_threshold", self.block_threshold, 0, self.ceiling)?;

        // 門檻高於可能的最高分時，交易永遠不會被封鎖
        let location_max = LocationRisk::ALL
            .iter()
            .map(|location| self.location.score(*location))
            .max()
            .unwrap_or(0);
        let reachable = self
            .amount
            .max_score()
            .saturating_add(self.frequency.max_score())
            .saturating_add(location_max)
            .min(self.ceiling);
        if reachable < self.block_threshold {
            tracing::warn!(
                "⚠️ Block threshold {} is above the highest reachable score {}; nothing will be blocked",
                self.block_threshold,
                reachable
            );
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    policy: ScoringPolicy,
}

impl RiskScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn components(
        &self,
        amount: Amount,
        location: LocationRisk,
        frequency: Frequency,
    ) -> RiskComponents {
        RiskComponents {
            amount: self.policy.amount.lookup(amount),
            location: self.policy.location.score(location),
            frequency: self.policy.frequency.lookup(frequency),
        }
    }

    pub fn decide(&self, probability: u32) -> Decision {
        if probability >= self.policy.block_threshold {
            Decision::Blocked
        } else {
            Decision::Approved
        }
    }

    pub fn evaluate(
        &self,
        amount: Amount,
        location: LocationRisk,
        frequency: Frequency,
    ) -> FraudAssessment {
        let components = self.components(amount, location, frequency);
        let probability = components.sum().min(self.policy.ceiling);

        FraudAssessment {
            probability,
            decision: self.decide(probability),
            components,
        }
    }

    pub fn score(&self, transaction: &Transaction) -> FraudAssessment {
        let assessment = self.evaluate(transaction.amount, transaction.location, transaction.frequency);

        tracing::debug!(
            amount = transaction.amount,
            location = %transaction.location,
            frequency = transaction.frequency,
            probability = assessment.probability,
            decision = %assessment.decision,
            "Transaction scored"
        );

        assessment
    }

    /// Score with the location given as a free-text label, as a UI host would pass it.
    pub fn score_labeled(
        &self,
        amount: Amount,
        location: &str,
        frequency: Frequency,
    ) -> Result<FraudAssessment> {
        let location: LocationRisk = location.parse()?;
        Ok(self.score(&Transaction::new(amount, location, frequency)))
    }
}
