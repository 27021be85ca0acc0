//! Rendering seam.
//!
//! The charting engine is an outside collaborator: the dashboard only asks it
//! to generate a chart once and to load fresh data into it afterwards.

mod snapshot;

pub use snapshot::{ChartSnapshot, SnapshotBackend, SnapshotHandle};

use crate::charts::ChartSpec;
use crate::data::SeriesTable;

/// A generated chart.
pub trait ChartHandle: Send + 'static {
    /// Replace the chart's data.
    fn load(&mut self, data: SeriesTable);
}

/// The charting engine.
pub trait ChartBackend: Send + Sync + 'static {
    type Handle: ChartHandle;

    /// Draw `spec` into its container. `data` is `None` when the initial
    /// fetch failed; the chart is drawn empty.
    fn generate(&self, spec: &ChartSpec, source_url: &str, data: Option<SeriesTable>)
    -> Self::Handle;
}
