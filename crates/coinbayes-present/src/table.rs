//! Tabular views of the hypothesis set and the trial history.

use coinbayes_core::{HypothesisSet, TrialRecord};
use serde::Serialize;

use crate::series::hypothesis_label;

/// Plain string table; every row has `header.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell(value: f64) -> String {
    format!("{value:.4}")
}

/// One row per hypothesis: index, p-value, prior, posterior.
#[must_use]
pub fn hypothesis_table(set: &HypothesisSet) -> Table {
    let header = ["#", "p", "prior", "posterior"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    let rows = set
        .hypotheses()
        .iter()
        .enumerate()
        .map(|(index, h)| {
            vec![
                (index + 1).to_string(),
                h.p_value.to_string(),
                cell(h.prior),
                cell(h.posterior),
            ]
        })
        .collect();
    Table { header, rows }
}

/// One row per trial: trial, N, k, then one posterior column per hypothesis.
///
/// Column labels come from the latest record's p-value snapshot. A cell from
/// a trial that ran under a different p-value carries its own label, e.g.
/// `0.2500 (p=0.01)`.
#[must_use]
pub fn history_table(records: &[TrialRecord]) -> Table {
    let mut header: Vec<String> = vec!["trial".to_owned(), "N".to_owned(), "k".to_owned()];
    let current: &[f64] = records
        .last()
        .map_or(&[][..], |latest| latest.p_values.as_slice());
    header.extend(current.iter().map(|&p| hypothesis_label(p)));
    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![
                record.trial.to_string(),
                record.flips.to_string(),
                record.heads.to_string(),
            ];
            row.extend(record.posteriors.iter().zip(&record.p_values).enumerate().map(
                |(index, (&posterior, &p_value))| {
                    if current.get(index) == Some(&p_value) {
                        cell(posterior)
                    } else {
                        format!("{} ({})", cell(posterior), hypothesis_label(p_value))
                    }
                },
            ));
            row
        })
        .collect();
    Table { header, rows }
}
