pub mod modes;
pub mod stats;
pub mod status;
