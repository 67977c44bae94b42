//! Pre-aggregated stat records as they appear in the dataset files.

use serde::{Deserialize, Serialize};

/// Common accessors the filter/sort pipeline needs.
pub trait StatRecord {
    fn games_played(&self) -> u64;

    /// Win rate as a fraction in `[0, 1]`.
    fn win_rate(&self) -> f64;
}

/// Aggregate stats for one brawler in one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStatRecord {
    #[serde(alias = "identifier")]
    pub brawler: String,
    pub games_played: u64,
    pub win_rate: f64,
}

impl CharacterStatRecord {
    pub fn new(brawler: impl Into<String>, games_played: u64, win_rate: f64) -> Self {
        Self {
            brawler: brawler.into(),
            games_played,
            win_rate,
        }
    }
}

impl StatRecord for CharacterStatRecord {
    fn games_played(&self) -> u64 {
        self.games_played
    }

    fn win_rate(&self) -> f64 {
        self.win_rate
    }
}

/// Aggregate stats for one three-brawler team composition.
///
/// Member order is kept as published for display; matching ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatRecord {
    pub team: [String; 3],
    pub games_played: u64,
    pub win_rate: f64,
}

impl TeamStatRecord {
    pub fn new(team: [&str; 3], games_played: u64, win_rate: f64) -> Self {
        Self {
            team: team.map(str::to_string),
            games_played,
            win_rate,
        }
    }

    pub fn contains(&self, brawler: &str) -> bool {
        self.team.iter().any(|b| b == brawler)
    }

    /// True when every selected brawler is on this team.
    pub fn includes_all<S: AsRef<str>>(&self, selected: &[S]) -> bool {
        selected.iter().all(|s| self.contains(s.as_ref()))
    }
}

impl StatRecord for TeamStatRecord {
    fn games_played(&self) -> u64 {
        self.games_played
    }

    fn win_rate(&self) -> f64 {
        self.win_rate
    }
}

/// Sum of games played across a record set.
pub fn total_games<T: StatRecord>(records: &[T]) -> u64 {
    records.iter().map(StatRecord::games_played).sum()
}
