//! Discrete Bayesian updating over a small set of coin-bias hypotheses.
//!
//! A [`Session`] owns a [`HypothesisSet`], a [`TrialHistory`] and the trial
//! counter. Each call to [`Session::update`] feeds one observation of
//! `k` heads in `N` flips through the [`UpdateEngine`], records the
//! posteriors, and (under automatic iteration) makes them the starting point
//! of the next trial.

pub mod history;
pub mod hypothesis;
pub mod likelihood;
pub mod policy;
pub mod session;
pub mod update;

pub use coinbayes_error::{BayesError, Result};
pub use history::{TrialHistory, TrialRecord};
pub use hypothesis::{Hypothesis, HypothesisSet, MAX_HYPOTHESES, MIN_HYPOTHESES};
pub use likelihood::{LikelihoodForm, binomial_coefficient, likelihood};
pub use policy::{
    DEFAULT_HALT_EPSILON, DEFAULT_PRIOR_TOLERANCE, HaltCondition, IterationMode, PValueBounds,
    STRICT_P_MAX, STRICT_P_MIN, UpdatePolicy,
};
pub use session::Session;
pub use update::{MAX_FLIPS, Observation, UpdateEngine, UpdateResult, update};
