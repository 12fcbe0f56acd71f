//! One step of discrete Bayesian updating.
//!
//! # Algorithm
//!
//! For an observation of `k` heads in `N` flips:
//!
//! 1. On any trial after the first (and with automatic iteration) the prior
//!    of every hypothesis is taken from its previous posterior.
//! 2. `u_h = L(k, N, p_h) * prior_h`.
//! 3. `T = sum(u_h)`, the marginal probability of the data.
//! 4. If the policy's halt condition rejects `T`, the update fails with
//!    [`BayesError::ImpossibleData`] and nothing is mutated.
//! 5. `posterior_h = u_h / T`.
//!
//! Evaluation runs on scratch vectors; the hypothesis set only changes once
//! the whole step has succeeded.

use coinbayes_error::{BayesError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hypothesis::HypothesisSet;
use crate::policy::{IterationMode, UpdatePolicy};

/// Maximum flips accepted in a single observation.
pub const MAX_FLIPS: u32 = 100;

/// A validated observation: `heads` out of `flips`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    flips: u32,
    heads: u32,
}

impl Observation {
    /// Requires `1 <= flips <= MAX_FLIPS` and `heads <= flips`.
    pub fn new(flips: u32, heads: u32) -> Result<Self> {
        if flips == 0 || flips > MAX_FLIPS || heads > flips {
            return Err(BayesError::InvalidObservation {
                flips,
                heads,
                max_flips: MAX_FLIPS,
            });
        }
        Ok(Self { flips, heads })
    }

    #[must_use]
    pub const fn flips(self) -> u32 {
        self.flips
    }

    #[must_use]
    pub const fn heads(self) -> u32 {
        self.heads
    }

    #[must_use]
    pub const fn tails(self) -> u32 {
        self.flips - self.heads
    }
}

/// Output of one update step, ordered like the hypothesis set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub observation: Observation,
    /// Priors the step actually used (after any posterior-to-prior advance).
    pub priors_used: Vec<f64>,
    /// Per-hypothesis likelihood in the engine's configured form.
    pub likelihoods: Vec<f64>,
    pub posteriors: Vec<f64>,
    /// Marginal probability of the observation, `T`.
    pub total_probability: f64,
}

/// Stateless update engine parameterized by an [`UpdatePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateEngine {
    policy: UpdatePolicy,
}

impl UpdateEngine {
    #[must_use]
    pub const fn new(policy: UpdatePolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &UpdatePolicy {
        &self.policy
    }

    /// Compute an update without touching `set`.
    pub fn evaluate(
        &self,
        set: &HypothesisSet,
        observation: Observation,
        is_first_trial: bool,
    ) -> Result<UpdateResult> {
        let advance = !is_first_trial && self.policy.iteration == IterationMode::Automatic;
        let priors_used = if advance {
            set.posteriors()
        } else {
            set.priors()
        };

        let form = self.policy.likelihood;
        let likelihoods: Vec<f64> = set
            .hypotheses()
            .iter()
            .map(|h| form.evaluate(observation.heads(), observation.flips(), h.p_value))
            .collect();

        let unnormalized: Vec<f64> = likelihoods
            .iter()
            .zip(&priors_used)
            .map(|(likelihood, prior)| likelihood * prior)
            .collect();
        let total: f64 = unnormalized.iter().sum();

        if self.policy.halt.halts(total) {
            warn!(
                flips = observation.flips(),
                heads = observation.heads(),
                total,
                halt = ?self.policy.halt,
                "update halted: data impossible under every hypothesis"
            );
            return Err(BayesError::ImpossibleData { total });
        }

        let posteriors: Vec<f64> = unnormalized.iter().map(|u| u / total).collect();

        debug!(
            flips = observation.flips(),
            heads = observation.heads(),
            advanced = advance,
            total,
            "update evaluated"
        );

        Ok(UpdateResult {
            observation,
            priors_used,
            likelihoods,
            posteriors,
            total_probability: total,
        })
    }

    /// Compute an update and install it into `set` on success.
    pub fn update(
        &self,
        set: &mut HypothesisSet,
        observation: Observation,
        is_first_trial: bool,
    ) -> Result<UpdateResult> {
        let result = self.evaluate(set, observation, is_first_trial)?;
        set.commit_update(&result.priors_used, &result.posteriors);
        Ok(result)
    }
}

/// Update `set` with `heads` out of `flips` under the default policy.
pub fn update(
    set: &mut HypothesisSet,
    flips: u32,
    heads: u32,
    is_first_trial: bool,
) -> Result<UpdateResult> {
    let observation = Observation::new(flips, heads)?;
    UpdateEngine::default().update(set, observation, is_first_trial)
}
