//! Session: the single owner of hypotheses, history and trial counter.
//!
//! Every mutating operation either succeeds completely or leaves the session
//! exactly as it was.

use coinbayes_error::Result;
use tracing::info;

use crate::history::{TrialHistory, TrialRecord};
use crate::hypothesis::{Hypothesis, HypothesisSet};
use crate::policy::UpdatePolicy;
use crate::update::{Observation, UpdateEngine, UpdateResult};

/// One interactive run: the hypothesis set, its trial history and the engine
/// that updates it.
///
/// Priors as last configured by the caller are kept apart from the live
/// priors, which drift as posteriors are iterated. [`Session::start_session`]
/// puts the configured values back.
#[derive(Debug, Clone)]
pub struct Session {
    set: HypothesisSet,
    configured_priors: Vec<f64>,
    history: TrialHistory,
    trials: u32,
    engine: UpdateEngine,
}

impl Session {
    /// New session with `count` evenly spaced hypotheses under `policy`.
    pub fn new(count: usize, policy: UpdatePolicy) -> Result<Self> {
        policy.validate()?;
        let set = HypothesisSet::initialize_with_bounds(count, policy.bounds)?;
        Ok(Self {
            configured_priors: set.priors(),
            set,
            history: TrialHistory::new(),
            trials: 0,
            engine: UpdateEngine::new(policy),
        })
    }

    pub fn with_defaults(count: usize) -> Result<Self> {
        Self::new(count, UpdatePolicy::default())
    }

    /// Replace the hypothesis set with a fresh one and restart.
    pub fn reconfigure(&mut self, count: usize) -> Result<()> {
        let set = HypothesisSet::initialize_with_bounds(count, self.engine.policy().bounds)?;
        self.configured_priors = set.priors();
        self.set = set;
        self.start_session();
        Ok(())
    }

    /// Clear the history, reset the trial counter and restore the configured
    /// priors. The next update treats them as its starting point.
    pub fn start_session(&mut self) {
        self.history.reset();
        self.trials = 0;
        self.set.restore_priors(&self.configured_priors);
        info!(
            count = self.set.len(),
            prior_sum = self.set.prior_sum(),
            "session started"
        );
    }

    #[must_use]
    pub const fn policy(&self) -> &UpdatePolicy {
        self.engine.policy()
    }

    #[must_use]
    pub const fn hypotheses(&self) -> &HypothesisSet {
        &self.set
    }

    #[must_use]
    pub fn history(&self) -> &[TrialRecord] {
        self.history.all()
    }

    #[must_use]
    pub const fn trial_history(&self) -> &TrialHistory {
        &self.history
    }

    /// Number of successful updates since the session started.
    #[must_use]
    pub const fn trial_count(&self) -> u32 {
        self.trials
    }

    pub fn set_p_value(&mut self, index: usize, value: f64) -> Result<()> {
        self.set.set_p_value(index, value)
    }

    pub fn set_prior(&mut self, index: usize, value: f64) -> Result<()> {
        self.set.set_prior(index, value)?;
        self.configured_priors[index] = value;
        Ok(())
    }

    pub fn set_uniform_priors(&mut self) {
        self.set.set_uniform_priors();
        self.configured_priors = self.set.priors();
    }

    /// Sum of the configured priors.
    #[must_use]
    pub fn prior_sum(&self) -> f64 {
        self.configured_priors.iter().sum()
    }

    /// Whether the configured priors are close enough to one for a session
    /// to start.
    #[must_use]
    pub fn ready_to_start(&self) -> bool {
        (self.prior_sum() - 1.0).abs() < self.engine.policy().prior_tolerance
    }

    /// Rescale the configured priors to sum to one and make them live.
    pub fn normalize_priors(&mut self) -> Result<()> {
        let mut configured = self.set.clone();
        configured.restore_priors(&self.configured_priors);
        configured.normalize_priors()?;
        self.configured_priors = configured.priors();
        self.set.restore_priors(&self.configured_priors);
        Ok(())
    }

    /// Copy current posteriors into priors.
    ///
    /// This is how trials chain under manual iteration; under automatic
    /// iteration the next update would do the same thing itself.
    pub fn advance(&mut self) -> &[Hypothesis] {
        self.set.advance_priors();
        self.set.hypotheses()
    }

    /// Run one trial: validate, update, record.
    pub fn update(&mut self, flips: u32, heads: u32) -> Result<UpdateResult> {
        let observation = Observation::new(flips, heads)?;
        let is_first_trial = self.trials == 0;
        let result = self
            .engine
            .evaluate(&self.set, observation, is_first_trial)?;

        let trial = self.trials + 1;
        self.history.record(
            trial,
            flips,
            heads,
            result.posteriors.clone(),
            self.set.p_values(),
        )?;
        self.set
            .commit_update(&result.priors_used, &result.posteriors);
        self.trials = trial;

        info!(
            trial,
            flips,
            heads,
            map_index = self.set.map_hypothesis(),
            mean_bias = self.set.posterior_mean_bias(),
            "trial recorded"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::IterationMode;
    use coinbayes_error::BayesError;

    #[test]
    fn test_update_records_history() {
        let mut session = Session::with_defaults(5).unwrap();
        session.update(10, 7).unwrap();
        session.update(10, 6).unwrap();

        assert_eq!(session.trial_count(), 2);
        let trials: Vec<u32> = session.history().iter().map(|r| r.trial).collect();
        assert_eq!(trials, vec![1, 2]);
        assert_eq!(
            session.history()[1].p_values,
            session.hypotheses().p_values()
        );
        assert_eq!(
            session.history()[1].posteriors,
            session.hypotheses().posteriors()
        );
    }

    #[test]
    fn test_start_session_resets_counter_and_history() {
        let mut session = Session::with_defaults(3).unwrap();
        session.update(4, 2).unwrap();
        session.start_session();
        assert_eq!(session.trial_count(), 0);
        assert!(session.history().is_empty());

        // First trial after restart starts from the configured priors again.
        let result = session.update(4, 4).unwrap();
        assert_eq!(result.priors_used, vec![1.0 / 3.0; 3]);
        assert_eq!(session.history()[0].trial, 1);
    }

    #[test]
    fn test_restart_after_iterated_trials_restores_configured_priors() {
        let mut session = Session::with_defaults(2).unwrap();
        session.set_prior(0, 0.25).unwrap();
        session.set_prior(1, 0.75).unwrap();
        session.start_session();
        session.update(10, 9).unwrap();
        let second = session.update(10, 9).unwrap();
        assert_ne!(second.priors_used, vec![0.25, 0.75]);

        session.start_session();
        assert_eq!(session.hypotheses().priors(), vec![0.25, 0.75]);
        let restarted = session.update(1, 1).unwrap();
        assert_eq!(restarted.priors_used, vec![0.25, 0.75]);
    }

    #[test]
    fn test_normalize_uses_configured_priors() {
        let mut session = Session::with_defaults(2).unwrap();
        session.set_prior(0, 0.2).unwrap();
        session.set_prior(1, 0.2).unwrap();
        session.update(10, 9).unwrap();
        session.update(10, 9).unwrap();

        session.normalize_priors().unwrap();
        assert_eq!(session.hypotheses().priors(), vec![0.5, 0.5]);
        session.start_session();
        assert_eq!(session.update(1, 1).unwrap().priors_used, vec![0.5, 0.5]);
    }

    #[test]
    fn test_failed_update_touches_nothing() {
        let mut session = Session::with_defaults(2).unwrap();
        session.update(3, 2).unwrap();
        let set_before = session.hypotheses().clone();

        assert!(matches!(
            session.update(3, 4),
            Err(BayesError::InvalidObservation { .. })
        ));
        assert_eq!(session.trial_count(), 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.hypotheses(), &set_before);
    }

    #[test]
    fn test_reconfigure_replaces_set() {
        let mut session = Session::with_defaults(2).unwrap();
        session.update(2, 1).unwrap();
        assert!(session.reconfigure(11).is_err());
        assert_eq!(session.hypotheses().len(), 2);
        assert_eq!(session.trial_count(), 1);

        session.reconfigure(6).unwrap();
        assert_eq!(session.hypotheses().len(), 6);
        assert_eq!(session.trial_count(), 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_manual_iteration_with_advance() {
        let policy = UpdatePolicy {
            iteration: IterationMode::Manual,
            ..UpdatePolicy::default()
        };
        let mut session = Session::new(2, policy).unwrap();
        let first = session.update(10, 9).unwrap();
        let second = session.update(10, 9).unwrap();
        assert_eq!(second.priors_used, first.priors_used);

        session.advance();
        let third = session.update(1, 1).unwrap();
        assert_eq!(third.priors_used, second.posteriors);
    }

    #[test]
    fn test_ready_to_start_tracks_prior_sum() {
        let mut session = Session::with_defaults(2).unwrap();
        assert!(session.ready_to_start());
        session.set_prior(0, 0.3).unwrap();
        assert!(!session.ready_to_start());
        session.normalize_priors().unwrap();
        assert!(session.ready_to_start());
    }
}
