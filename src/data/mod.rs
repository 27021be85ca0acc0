mod client;
mod series;

pub use client::{DataSource, HttpSource};
pub use series::{Sample, SeriesTable};
