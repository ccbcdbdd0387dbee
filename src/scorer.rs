//! Combine the physics prior with the learned residual and classify the
//! result into a risk tier.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    Low,
    Medium,
    High,
}

/// Tier boundaries for one deployed model generation. Earlier generations
/// shipped (0.35, 0.65); the pair must stay fixed for the lifetime of a
/// deployed model or serving labels drift from training labels.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub advisory: f64,
    pub closure: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { advisory: 0.33, closure: 0.66 }
    }
}

impl Thresholds {
    pub fn classify(&self, score: f64) -> RiskClass {
        if score < self.advisory {
            RiskClass::Low
        } else if score < self.closure {
            RiskClass::Medium
        } else {
            RiskClass::High
        }
    }
}

/// Residual is additive and unclipped going in; only the combined value
/// observes the [0,1] bound.
pub fn combine(prior: f64, residual: f64) -> f64 {
    (prior + residual).clamp(0.0, 1.0)
}
