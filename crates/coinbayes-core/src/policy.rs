//! Update policy: the knobs that change sequential-update trajectories.
//!
//! Defaults: exact-zero halt, strict `[0.01, 0.99]` p-value bounds,
//! automatic posterior-to-prior iteration, kernel likelihood.

use coinbayes_error::{BayesError, Result};
use serde::{Deserialize, Serialize};

use crate::likelihood::LikelihoodForm;

/// Lower bound on p-values under [`PValueBounds::Strict`].
pub const STRICT_P_MIN: f64 = 0.01;
/// Upper bound on p-values under [`PValueBounds::Strict`].
pub const STRICT_P_MAX: f64 = 0.99;
/// Maximum allowed `|sum(priors) - 1|` before a session may start.
pub const DEFAULT_PRIOR_TOLERANCE: f64 = 0.001;
/// Threshold used by [`HaltCondition::Epsilon`] when none is configured.
pub const DEFAULT_HALT_EPSILON: f64 = 1e-10;

/// When an update is rejected as impossible.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltCondition {
    /// Halt only when total probability is exactly `0.0`.
    #[default]
    ExactZero,
    /// Halt when total probability is below the threshold.
    Epsilon(f64),
}

impl HaltCondition {
    /// Whether `total` (marginal probability of the data) halts the update.
    #[must_use]
    pub fn halts(self, total: f64) -> bool {
        match self {
            Self::ExactZero => total == 0.0,
            Self::Epsilon(threshold) => total < threshold,
        }
    }
}

/// Admissible range for hypothesis p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueBounds {
    /// `[0.01, 0.99]`; keeps the likelihood away from `0^0`.
    #[default]
    Strict,
    /// `[0, 1]`.
    Loose,
}

impl PValueBounds {
    /// Inclusive `(min, max)`.
    #[must_use]
    pub const fn range(self) -> (f64, f64) {
        match self {
            Self::Strict => (STRICT_P_MIN, STRICT_P_MAX),
            Self::Loose => (0.0, 1.0),
        }
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        let (min, max) = self.range();
        value.is_finite() && value >= min && value <= max
    }

    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

/// Whether the previous posterior becomes the next prior on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationMode {
    /// Every non-first trial starts from the previous posterior.
    #[default]
    Automatic,
    /// Priors only advance when the caller asks for it explicitly.
    Manual,
}

/// Full set of update knobs carried by an engine or session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePolicy {
    pub halt: HaltCondition,
    pub bounds: PValueBounds,
    pub iteration: IterationMode,
    pub likelihood: LikelihoodForm,
    /// Allowed deviation of the prior sum from `1.0` when gating a start.
    pub prior_tolerance: f64,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            halt: HaltCondition::ExactZero,
            bounds: PValueBounds::Strict,
            iteration: IterationMode::Automatic,
            likelihood: LikelihoodForm::Kernel,
            prior_tolerance: DEFAULT_PRIOR_TOLERANCE,
        }
    }
}

impl UpdatePolicy {
    /// Reject thresholds that would make every update halt or never halt
    /// in a meaningless way.
    pub fn validate(&self) -> Result<()> {
        if let HaltCondition::Epsilon(threshold) = self.halt {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(BayesError::InvalidPolicy(format!(
                    "halt epsilon must be finite and >= 0, got {threshold}"
                )));
            }
        }
        if !self.prior_tolerance.is_finite() || self.prior_tolerance < 0.0 {
            return Err(BayesError::InvalidPolicy(format!(
                "prior tolerance must be finite and >= 0, got {}",
                self.prior_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_zero_accepts_tiny_totals() {
        let halt = HaltCondition::ExactZero;
        assert!(halt.halts(0.0));
        assert!(!halt.halts(1e-300));
        assert!(!halt.halts(1e-50));
    }

    #[test]
    fn test_epsilon_halts_below_threshold() {
        let halt = HaltCondition::Epsilon(DEFAULT_HALT_EPSILON);
        assert!(halt.halts(0.0));
        assert!(halt.halts(1e-11));
        assert!(!halt.halts(1e-9));
    }

    #[test]
    fn test_bounds_contains() {
        assert!(PValueBounds::Strict.contains(0.01));
        assert!(PValueBounds::Strict.contains(0.99));
        assert!(!PValueBounds::Strict.contains(0.0));
        assert!(!PValueBounds::Strict.contains(1.0));
        assert!(!PValueBounds::Strict.contains(f64::NAN));
        assert!(PValueBounds::Loose.contains(0.0));
        assert!(PValueBounds::Loose.contains(1.0));
        assert!(!PValueBounds::Loose.contains(1.01));
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut policy = UpdatePolicy::default();
        assert!(policy.validate().is_ok());

        policy.halt = HaltCondition::Epsilon(-1.0);
        assert!(matches!(policy.validate(), Err(BayesError::InvalidPolicy(_))));

        policy.halt = HaltCondition::Epsilon(f64::INFINITY);
        assert!(matches!(policy.validate(), Err(BayesError::InvalidPolicy(_))));

        policy.halt = HaltCondition::ExactZero;
        policy.prior_tolerance = f64::NAN;
        assert!(matches!(policy.validate(), Err(BayesError::InvalidPolicy(_))));
    }

    #[test]
    fn test_policy_from_toml() {
        let policy: UpdatePolicy = toml::from_str(
            r#"
bounds = "loose"
iteration = "manual"
likelihood = "binomial"

[halt]
epsilon = 1e-10
"#,
        )
        .expect("policy should parse");
        assert_eq!(policy.bounds, PValueBounds::Loose);
        assert_eq!(policy.iteration, IterationMode::Manual);
        assert_eq!(policy.likelihood, LikelihoodForm::Binomial);
        assert_eq!(policy.halt, HaltCondition::Epsilon(1e-10));
        assert_eq!(policy.prior_tolerance, DEFAULT_PRIOR_TOLERANCE);
    }

    #[test]
    fn test_empty_toml_is_default_policy() {
        let policy: UpdatePolicy = toml::from_str("").expect("empty policy should parse");
        assert_eq!(policy, UpdatePolicy::default());
    }
}
