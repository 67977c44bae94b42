//! Per-map popularity totals.

use serde::{Deserialize, Serialize};

/// Total games recorded in a map's baseline bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapAggregate {
    pub map: String,
    pub total_games_played: u64,
}

impl MapAggregate {
    pub fn new(map: impl Into<String>, total_games_played: u64) -> Self {
        Self {
            map: map.into(),
            total_games_played,
        }
    }
}
