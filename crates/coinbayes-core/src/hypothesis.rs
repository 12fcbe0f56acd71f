//! Hypothesis set model.
//!
//! A [`HypothesisSet`] is an ordered, fixed-size list of candidate coin
//! biases with their current prior and posterior. Order is significant:
//! presentation uses it for column order and color assignment. Editors
//! validate a single field at a time and never renormalize on their own.

use coinbayes_error::{BayesError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::policy::PValueBounds;

/// Smallest supported number of hypotheses.
pub const MIN_HYPOTHESES: usize = 2;
/// Largest supported number of hypotheses.
pub const MAX_HYPOTHESES: usize = 10;

/// One candidate bias with its current belief.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    /// Probability of heads under this hypothesis.
    pub p_value: f64,
    /// Belief before the most recent observation.
    pub prior: f64,
    /// Belief after the most recent observation.
    pub posterior: f64,
}

/// Ordered, fixed-size set of 2 to 10 hypotheses sharing one p-value bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisSet {
    hypotheses: Vec<Hypothesis>,
    bounds: PValueBounds,
}

impl HypothesisSet {
    /// Evenly spaced hypotheses under strict bounds with uniform priors.
    pub fn initialize(count: usize) -> Result<Self> {
        Self::initialize_with_bounds(count, PValueBounds::Strict)
    }

    /// Evenly spaced hypotheses `i / (count - 1)`, clamped into `bounds` and
    /// rounded to three decimals, each with prior `1 / count`.
    ///
    /// The posterior starts equal to the prior.
    pub fn initialize_with_bounds(count: usize, bounds: PValueBounds) -> Result<Self> {
        check_count(count)?;
        let step = (count - 1) as f64;
        let p_values: Vec<f64> = (0..count)
            .map(|i| round3(bounds.clamp(i as f64 / step)))
            .collect();
        let set = Self::with_uniform_priors(p_values, bounds);
        info!(
            count,
            bounds = ?bounds,
            p_values = ?set.p_values(),
            "hypothesis set initialized"
        );
        Ok(set)
    }

    /// Build a set from explicit p-values with uniform priors.
    pub fn from_p_values(p_values: &[f64], bounds: PValueBounds) -> Result<Self> {
        check_count(p_values.len())?;
        let (min, max) = bounds.range();
        for (index, &value) in p_values.iter().enumerate() {
            if !bounds.contains(value) {
                return Err(BayesError::validation(
                    "p_value",
                    index,
                    value,
                    format!("must be within [{min}, {max}]"),
                ));
            }
        }
        Ok(Self::with_uniform_priors(p_values.to_vec(), bounds))
    }

    fn with_uniform_priors(p_values: Vec<f64>, bounds: PValueBounds) -> Self {
        let prior = 1.0 / p_values.len() as f64;
        let hypotheses = p_values
            .into_iter()
            .map(|p_value| Hypothesis {
                p_value,
                prior,
                posterior: prior,
            })
            .collect();
        Self { hypotheses, bounds }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    /// Always `false` for a constructed set; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }

    #[must_use]
    pub const fn bounds(&self) -> PValueBounds {
        self.bounds
    }

    #[must_use]
    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Hypothesis> {
        self.hypotheses.get(index)
    }

    #[must_use]
    pub fn p_values(&self) -> Vec<f64> {
        self.hypotheses.iter().map(|h| h.p_value).collect()
    }

    #[must_use]
    pub fn priors(&self) -> Vec<f64> {
        self.hypotheses.iter().map(|h| h.prior).collect()
    }

    #[must_use]
    pub fn posteriors(&self) -> Vec<f64> {
        self.hypotheses.iter().map(|h| h.posterior).collect()
    }

    /// Replace one p-value. Rejected values leave the set untouched.
    pub fn set_p_value(&mut self, index: usize, value: f64) -> Result<()> {
        self.check_index("p_value", index, value)?;
        if !self.bounds.contains(value) {
            let (min, max) = self.bounds.range();
            warn!(index, value, min, max, "p-value edit rejected");
            return Err(BayesError::validation(
                "p_value",
                index,
                value,
                format!("must be within [{min}, {max}]"),
            ));
        }
        self.hypotheses[index].p_value = value;
        debug!(index, value, "p-value updated");
        Ok(())
    }

    /// Replace one prior. No renormalization happens here; callers observe
    /// [`Self::prior_sum`] themselves.
    pub fn set_prior(&mut self, index: usize, value: f64) -> Result<()> {
        self.check_index("prior", index, value)?;
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            warn!(index, value, "prior edit rejected");
            return Err(BayesError::validation(
                "prior",
                index,
                value,
                "must be within [0, 1]",
            ));
        }
        self.hypotheses[index].prior = value;
        debug!(index, value, prior_sum = self.prior_sum(), "prior updated");
        Ok(())
    }

    /// Reset every prior to `1 / len`.
    pub fn set_uniform_priors(&mut self) {
        let prior = 1.0 / self.hypotheses.len() as f64;
        for hypothesis in &mut self.hypotheses {
            hypothesis.prior = prior;
        }
    }

    #[must_use]
    pub fn prior_sum(&self) -> f64 {
        self.hypotheses.iter().map(|h| h.prior).sum()
    }

    /// Whether `|prior_sum - 1| < tolerance`.
    #[must_use]
    pub fn priors_sum_to_one(&self, tolerance: f64) -> bool {
        (self.prior_sum() - 1.0).abs() < tolerance
    }

    /// Rescale priors so they sum to one.
    pub fn normalize_priors(&mut self) -> Result<()> {
        let sum = self.prior_sum();
        if sum == 0.0 {
            warn!(count = self.len(), "normalize rejected: priors sum to zero");
            return Err(BayesError::DegenerateState);
        }
        for hypothesis in &mut self.hypotheses {
            hypothesis.prior /= sum;
        }
        debug!(previous_sum = sum, "priors normalized");
        Ok(())
    }

    /// Index of the hypothesis with the largest posterior; the first one wins
    /// ties.
    #[must_use]
    pub fn map_hypothesis(&self) -> usize {
        let mut best = 0;
        for (index, hypothesis) in self.hypotheses.iter().enumerate().skip(1) {
            if hypothesis.posterior > self.hypotheses[best].posterior {
                best = index;
            }
        }
        best
    }

    /// Posterior expectation of the coin's bias, `sum(p_i * posterior_i)`.
    #[must_use]
    pub fn posterior_mean_bias(&self) -> f64 {
        self.hypotheses
            .iter()
            .map(|h| h.p_value * h.posterior)
            .sum()
    }

    /// Overwrite priors with the current posteriors.
    pub(crate) fn advance_priors(&mut self) {
        for hypothesis in &mut self.hypotheses {
            hypothesis.prior = hypothesis.posterior;
        }
    }

    /// Overwrite priors with previously captured values, in set order.
    pub(crate) fn restore_priors(&mut self, priors: &[f64]) {
        debug_assert_eq!(priors.len(), self.hypotheses.len());
        for (hypothesis, &prior) in self.hypotheses.iter_mut().zip(priors) {
            hypothesis.prior = prior;
        }
    }

    /// Install the priors used and posteriors produced by one update step.
    pub(crate) fn commit_update(&mut self, priors: &[f64], posteriors: &[f64]) {
        debug_assert_eq!(priors.len(), self.hypotheses.len());
        debug_assert_eq!(posteriors.len(), self.hypotheses.len());
        for ((hypothesis, &prior), &posterior) in
            self.hypotheses.iter_mut().zip(priors).zip(posteriors)
        {
            hypothesis.prior = prior;
            hypothesis.posterior = posterior;
        }
    }

    fn check_index(&self, field: &'static str, index: usize, value: f64) -> Result<()> {
        if index >= self.hypotheses.len() {
            warn!(field, index, len = self.hypotheses.len(), "edit rejected: no such hypothesis");
            return Err(BayesError::validation(
                field,
                index,
                value,
                format!("index out of range for {} hypotheses", self.hypotheses.len()),
            ));
        }
        Ok(())
    }
}

fn check_count(count: usize) -> Result<()> {
    if !(MIN_HYPOTHESES..=MAX_HYPOTHESES).contains(&count) {
        warn!(count, "hypothesis count rejected");
        return Err(BayesError::Configuration {
            count,
            min: MIN_HYPOTHESES,
            max: MAX_HYPOTHESES,
        });
    }
    Ok(())
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_five_clamps_extremes() {
        let set = HypothesisSet::initialize(5).unwrap();
        assert_eq!(set.p_values(), vec![0.01, 0.25, 0.5, 0.75, 0.99]);
        for hypothesis in set.hypotheses() {
            assert!((hypothesis.prior - 0.2).abs() < 1e-12);
            assert_eq!(hypothesis.posterior, hypothesis.prior);
        }
    }

    #[test]
    fn test_initialize_rounds_to_three_decimals() {
        let set = HypothesisSet::initialize(4).unwrap();
        assert_eq!(set.p_values(), vec![0.01, 0.333, 0.667, 0.99]);
    }

    #[test]
    fn test_initialize_loose_keeps_endpoints() {
        let set = HypothesisSet::initialize_with_bounds(3, PValueBounds::Loose).unwrap();
        assert_eq!(set.p_values(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_initialize_rejects_out_of_range_counts() {
        for count in [0, 1, 11, 50] {
            let err = HypothesisSet::initialize(count).unwrap_err();
            assert_eq!(
                err,
                BayesError::Configuration {
                    count,
                    min: MIN_HYPOTHESES,
                    max: MAX_HYPOTHESES
                }
            );
        }
    }

    #[test]
    fn test_set_p_value_validates_bounds() {
        let mut set = HypothesisSet::initialize(3).unwrap();
        let before = set.clone();
        assert!(matches!(
            set.set_p_value(1, 0.995),
            Err(BayesError::Validation { field: "p_value", index: 1, .. })
        ));
        assert!(set.set_p_value(1, f64::NAN).is_err());
        assert_eq!(set, before, "rejected edit must not touch the set");

        set.set_p_value(1, 0.42).unwrap();
        assert_eq!(set.get(1).unwrap().p_value, 0.42);
    }

    #[test]
    fn test_set_prior_validates_range_and_index() {
        let mut set = HypothesisSet::initialize(2).unwrap();
        assert!(set.set_prior(0, -0.1).is_err());
        assert!(set.set_prior(0, 1.1).is_err());
        assert!(matches!(
            set.set_prior(2, 0.5),
            Err(BayesError::Validation { field: "prior", index: 2, .. })
        ));
        set.set_prior(0, 0.9).unwrap();
        // No automatic renormalization.
        assert!((set.prior_sum() - 1.4).abs() < 1e-12);
        assert!(!set.priors_sum_to_one(0.001));
    }

    #[test]
    fn test_normalize_priors_rescales() {
        let mut set = HypothesisSet::initialize(3).unwrap();
        for index in 0..3 {
            set.set_prior(index, 0.2).unwrap();
        }
        set.normalize_priors().unwrap();
        for prior in set.priors() {
            assert!((prior - 1.0 / 3.0).abs() < 1e-12);
        }
        assert!(set.priors_sum_to_one(1e-9));
    }

    #[test]
    fn test_normalize_priors_zero_sum_is_degenerate() {
        let mut set = HypothesisSet::initialize(3).unwrap();
        for index in 0..3 {
            set.set_prior(index, 0.0).unwrap();
        }
        assert_eq!(set.normalize_priors(), Err(BayesError::DegenerateState));
        assert_eq!(set.prior_sum(), 0.0);
    }

    #[test]
    fn test_set_uniform_priors() {
        let mut set = HypothesisSet::initialize(4).unwrap();
        set.set_prior(0, 0.7).unwrap();
        set.set_uniform_priors();
        assert_eq!(set.priors(), vec![0.25; 4]);
    }

    #[test]
    fn test_map_and_mean() {
        let mut set = HypothesisSet::from_p_values(&[0.2, 0.8], PValueBounds::Strict).unwrap();
        set.commit_update(&[0.5, 0.5], &[0.25, 0.75]);
        assert_eq!(set.map_hypothesis(), 1);
        assert!((set.posterior_mean_bias() - (0.2 * 0.25 + 0.8 * 0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_map_prefers_first_on_tie() {
        let set = HypothesisSet::initialize(3).unwrap();
        assert_eq!(set.map_hypothesis(), 0);
    }

    #[test]
    fn test_from_p_values_rejects_out_of_bounds() {
        let err = HypothesisSet::from_p_values(&[0.0, 0.5], PValueBounds::Strict).unwrap_err();
        assert!(matches!(err, BayesError::Validation { index: 0, .. }));
        assert!(HypothesisSet::from_p_values(&[0.0, 0.5], PValueBounds::Loose).is_ok());
        assert!(HypothesisSet::from_p_values(&[0.5], PValueBounds::Loose).is_err());
    }
}
