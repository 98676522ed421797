//! Diagnostic probes: fill-level indicator, heartbeat counter and transfer
//! statistics.

mod indicator;
mod stats;

pub use indicator::{ActivityCounter, LevelIndicator};
pub use stats::BridgeStats;
