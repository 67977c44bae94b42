//! View computation over pre-aggregated records.
//!
//! Nothing here derives new statistics; it only shapes what the dataset
//! already holds:
//! - Minimum-games partition and win-rate ordering
//! - Team filtering by selected brawlers
//! - Map popularity ranking from baseline totals

mod pipeline;
mod scan;

pub use pipeline::*;
pub use scan::*;
