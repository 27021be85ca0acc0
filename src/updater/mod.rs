//! The refresh loop: generate charts once, then reload them on a fixed timer.

mod dashboard;
mod timer;

pub use dashboard::{Dashboard, Lifecycle, RefreshSummary};
pub use timer::RefreshTimer;
