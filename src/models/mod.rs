//! Core data models for the stats browser.

mod aggregate;
mod assets;
mod mode;
mod record;
mod selection;

pub use aggregate::*;
pub use assets::*;
pub use mode::*;
pub use record::*;
pub use selection::*;
