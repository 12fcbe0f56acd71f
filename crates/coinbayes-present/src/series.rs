//! Label/value series for bar and line charts.

use coinbayes_core::{HypothesisSet, TrialHistory, UpdateResult};
use serde::Serialize;

/// Number of distinct colors a sink is expected to provide.
pub const PALETTE_SIZE: usize = 10;

/// Chart label for a hypothesis, e.g. `p=0.25`.
#[must_use]
pub fn hypothesis_label(p_value: f64) -> String {
    format!("p={p_value}")
}

/// Color slot assigned to the hypothesis at `index`.
#[must_use]
pub const fn color_slot(index: usize) -> usize {
    index % PALETTE_SIZE
}

/// One bar: label, height and color slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
    pub color_slot: usize,
}

/// One line: a hypothesis' posterior across trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: String,
    pub color_slot: usize,
    /// `(trial, posterior)` in trial order.
    pub points: Vec<(u32, f64)>,
}

/// Before/after bars for a single update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub flips: u32,
    pub heads: u32,
    pub before: Vec<SeriesPoint>,
    pub after: Vec<SeriesPoint>,
}

fn points(p_values: &[f64], values: &[f64]) -> Vec<SeriesPoint> {
    p_values
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (&p_value, &value))| SeriesPoint {
            label: hypothesis_label(p_value),
            value,
            color_slot: color_slot(index),
        })
        .collect()
}

#[must_use]
pub fn prior_series(set: &HypothesisSet) -> Vec<SeriesPoint> {
    points(&set.p_values(), &set.priors())
}

#[must_use]
pub fn posterior_series(set: &HypothesisSet) -> Vec<SeriesPoint> {
    points(&set.p_values(), &set.posteriors())
}

/// Priors used versus posteriors produced by one update.
#[must_use]
pub fn comparison(result: &UpdateResult, p_values: &[f64]) -> Comparison {
    Comparison {
        flips: result.observation.flips(),
        heads: result.observation.heads(),
        before: points(p_values, &result.priors_used),
        after: points(p_values, &result.posteriors),
    }
}

/// Posterior trajectory of one hypothesis. `None` when there is no history
/// or no such hypothesis.
///
/// The label is built from each record's own p-value snapshot: a hypothesis
/// whose p-value was edited mid-session reads e.g. `p=0.01 -> p=0.4`, so
/// earlier trials keep the value they were computed with.
#[must_use]
pub fn trajectory(history: &TrialHistory, hypothesis_index: usize) -> Option<LineSeries> {
    if history.latest()?.p_values.get(hypothesis_index).is_none() {
        return None;
    }
    let mut labels: Vec<String> = Vec::new();
    for record in history.all() {
        let Some(&p_value) = record.p_values.get(hypothesis_index) else {
            continue;
        };
        let label = hypothesis_label(p_value);
        if labels.last() != Some(&label) {
            labels.push(label);
        }
    }
    Some(LineSeries {
        label: labels.join(" -> "),
        color_slot: color_slot(hypothesis_index),
        points: history.series_for(hypothesis_index),
    })
}

/// One trajectory per hypothesis, in hypothesis order.
#[must_use]
pub fn trajectories(history: &TrialHistory) -> Vec<LineSeries> {
    let count = history.latest().map_or(0, |record| record.p_values.len());
    (0..count)
        .filter_map(|index| trajectory(history, index))
        .collect()
}
