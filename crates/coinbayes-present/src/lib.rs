//! Presentation adapter for coinbayes.
//!
//! Converts session state into plain data (labelled series and string
//! tables) and hands it to a [`RenderSink`]. Nothing here draws.

pub mod series;
pub mod sink;
pub mod table;

pub use series::{
    Comparison, LineSeries, PALETTE_SIZE, SeriesPoint, color_slot, comparison, hypothesis_label,
    posterior_series, prior_series, trajectories, trajectory,
};
pub use sink::{RenderSink, render_session, render_update};
pub use table::{Table, history_table, hypothesis_table};
