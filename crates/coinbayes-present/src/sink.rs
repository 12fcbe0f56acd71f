//! The seam between the adapter and whatever draws.

use coinbayes_core::{Session, UpdateResult};

use crate::series::{
    LineSeries, SeriesPoint, comparison, posterior_series, prior_series, trajectories,
};
use crate::table::{Table, history_table, hypothesis_table};

/// Anything that can draw bars, lines and tables.
///
/// Implementations own all layout and styling; they receive fully computed
/// data and must not call back into the session.
pub trait RenderSink {
    fn bar_chart(&mut self, title: &str, points: &[SeriesPoint]);
    fn line_chart(&mut self, title: &str, series: &[LineSeries]);
    fn table(&mut self, title: &str, table: &Table);
}

/// Push the standard session views: hypothesis table, prior and posterior
/// bars, and (once trials exist) the history table and trajectories.
pub fn render_session<S: RenderSink + ?Sized>(session: &Session, sink: &mut S) {
    let set = session.hypotheses();
    sink.table("Hypotheses", &hypothesis_table(set));
    sink.bar_chart("Prior", &prior_series(set));
    sink.bar_chart("Posterior", &posterior_series(set));

    let history = session.trial_history();
    if !history.is_empty() {
        sink.table("History", &history_table(history.all()));
        sink.line_chart("Posterior by trial", &trajectories(history));
    }
}

/// Push before/after bars for one update.
pub fn render_update<S: RenderSink + ?Sized>(
    result: &UpdateResult,
    p_values: &[f64],
    sink: &mut S,
) {
    let view = comparison(result, p_values);
    sink.bar_chart(
        &format!("Prior used ({} heads / {} flips)", view.heads, view.flips),
        &view.before,
    );
    sink.bar_chart("Posterior", &view.after);
}
