//! Append-only log of completed trials.

use coinbayes_error::{BayesError, Result};
use serde::{Deserialize, Serialize};

/// One completed update, frozen at the time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// 1-based trial number within the session.
    pub trial: u32,
    pub flips: u32,
    pub heads: u32,
    /// Posterior per hypothesis, in hypothesis order.
    pub posteriors: Vec<f64>,
    /// p-value snapshot so labels stay stable if hypotheses are later edited.
    pub p_values: Vec<f64>,
}

/// Ordered log of the trials recorded since the session last started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialHistory {
    records: Vec<TrialRecord>,
}

impl TrialHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record.
    ///
    /// Trial numbers must be strictly increasing and start at 1; posteriors
    /// and p-values must describe the same number of hypotheses.
    pub fn record(
        &mut self,
        trial: u32,
        flips: u32,
        heads: u32,
        posteriors: Vec<f64>,
        p_values: Vec<f64>,
    ) -> Result<()> {
        let rejection = match self.records.last() {
            Some(last) if trial <= last.trial => Some(format!(
                "trial numbers must increase (last recorded {})",
                last.trial
            )),
            None if trial != 1 => Some("the first trial must be numbered 1".to_owned()),
            _ => None,
        };
        if let Some(reason) = rejection {
            return Err(BayesError::validation(
                "trial",
                self.records.len(),
                f64::from(trial),
                reason,
            ));
        }
        if posteriors.len() != p_values.len() {
            return Err(BayesError::validation(
                "posteriors",
                self.records.len(),
                posteriors.len() as f64,
                format!("expected {} entries to match p-values", p_values.len()),
            ));
        }
        self.records.push(TrialRecord {
            trial,
            flips,
            heads,
            posteriors,
            p_values,
        });
        Ok(())
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn all(&self) -> &[TrialRecord] {
        &self.records
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TrialRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(trial, posterior)` pairs for one hypothesis across all trials.
    ///
    /// Records that do not cover `hypothesis_index` are skipped.
    #[must_use]
    pub fn series_for(&self, hypothesis_index: usize) -> Vec<(u32, f64)> {
        self.records
            .iter()
            .filter_map(|record| {
                record
                    .posteriors
                    .get(hypothesis_index)
                    .map(|&posterior| (record.trial, posterior))
            })
            .collect()
    }

    /// Pretty JSON array of all records, for export.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrialHistory {
        let mut history = TrialHistory::new();
        history
            .record(1, 10, 7, vec![0.1, 0.9], vec![0.3, 0.7])
            .unwrap();
        history
            .record(2, 5, 1, vec![0.6, 0.4], vec![0.3, 0.7])
            .unwrap();
        history
    }

    #[test]
    fn test_record_and_read_back() {
        let history = sample();
        assert_eq!(history.len(), 2);
        assert_eq!(history.all()[0].trial, 1);
        assert_eq!(history.latest().unwrap().heads, 1);
        assert_eq!(history.series_for(1), vec![(1, 0.9), (2, 0.4)]);
        assert!(history.series_for(5).is_empty());
    }

    #[test]
    fn test_rejects_non_increasing_trial() {
        let mut history = sample();
        let err = history
            .record(2, 1, 0, vec![0.5, 0.5], vec![0.3, 0.7])
            .unwrap_err();
        assert!(matches!(err, BayesError::Validation { field: "trial", .. }));
        for first in [0, 2, 7] {
            let mut empty = TrialHistory::new();
            assert!(matches!(
                empty.record(first, 1, 0, vec![0.5, 0.5], vec![0.3, 0.7]),
                Err(BayesError::Validation { field: "trial", .. })
            ));
            assert!(empty.is_empty());
        }
        // Gaps after the first trial are allowed as long as numbers increase.
        history
            .record(5, 1, 0, vec![0.5, 0.5], vec![0.3, 0.7])
            .unwrap();
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let mut history = TrialHistory::new();
        assert!(history.record(1, 1, 0, vec![1.0], vec![0.3, 0.7]).is_err());
        assert!(history.is_empty());
    }

    #[test]
    fn test_reset_clears() {
        let mut history = sample();
        history.reset();
        assert!(history.is_empty());
        history
            .record(1, 1, 1, vec![0.5, 0.5], vec![0.3, 0.7])
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_json_export_round_trips() {
        let history = sample();
        let json = history.to_json().unwrap();
        let parsed: Vec<TrialRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, history.all());
    }
}
