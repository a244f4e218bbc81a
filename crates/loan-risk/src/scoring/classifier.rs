use serde::{Deserialize, Serialize};

use super::config::ConfigurationError;

/// Ordered qualitative risk bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::VeryHigh => "Very High Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Approve,
    Reject,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Approve => "Approve",
            Recommendation::Reject => "Reject",
        }
    }
}

/// Lower bounds of the MEDIUM, HIGH and VERY_HIGH bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub medium: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium: 0.25,
            high: 0.50,
            very_high: 0.75,
        }
    }
}

pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.60;

/// Maps a probability to a tier and a recommendation. Every band is inclusive on its
/// lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskClassifier {
    tiers: TierThresholds,
    decision_threshold: f64,
}

impl RiskClassifier {
    pub fn new(
        tiers: TierThresholds,
        decision_threshold: f64,
    ) -> Result<Self, ConfigurationError> {
        for (band, value) in [
            ("medium", tiers.medium),
            ("high", tiers.high),
            ("very_high", tiers.very_high),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigurationError::ThresholdOutOfRange { band, value });
            }
        }

        if !(tiers.medium < tiers.high && tiers.high < tiers.very_high) {
            return Err(ConfigurationError::NonMonotonicTiers {
                medium: tiers.medium,
                high: tiers.high,
                very_high: tiers.very_high,
            });
        }

        if !(decision_threshold > 0.0 && decision_threshold < 1.0) {
            return Err(ConfigurationError::DecisionThresholdOutOfRange {
                value: decision_threshold,
            });
        }

        Ok(Self {
            tiers,
            decision_threshold,
        })
    }

    pub fn tiers(&self) -> TierThresholds {
        self.tiers
    }

    pub fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }

    pub fn risk_level(&self, probability: f64) -> RiskLevel {
        if probability >= self.tiers.very_high {
            RiskLevel::VeryHigh
        } else if probability >= self.tiers.high {
            RiskLevel::High
        } else if probability >= self.tiers.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn recommendation(&self, probability: f64) -> Recommendation {
        if probability >= self.decision_threshold {
            Recommendation::Reject
        } else {
            Recommendation::Approve
        }
    }

    pub fn classify(&self, probability: f64) -> (RiskLevel, Recommendation) {
        (
            self.risk_level(probability),
            self.recommendation(probability),
        )
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self {
            tiers: TierThresholds::default(),
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }
}
