//! Filter/sort pipeline for a single bucket's records.
//!
//! Pure and synchronous: the same records, threshold and selection always
//! produce the same view.

use serde::Serialize;

use crate::models::{CharacterStatRecord, MinGames, StatRecord, TeamStatRecord};

/// Records split by sample size, each list ordered by win rate descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView<T> {
    /// Records with at least `min_games` games.
    pub primary: Vec<T>,
    /// Records under the threshold, shown separately.
    pub underplayed: Vec<T>,
    /// The input held no records at all.
    pub no_data: bool,
}

impl<T> StatsView<T> {
    pub fn empty() -> Self {
        Self {
            primary: Vec::new(),
            underplayed: Vec::new(),
            no_data: true,
        }
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.underplayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map both lists into another record type (e.g. display cards).
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> StatsView<U> {
        StatsView {
            primary: self.primary.iter().map(&mut f).collect(),
            underplayed: self.underplayed.iter().map(&mut f).collect(),
            no_data: self.no_data,
        }
    }
}

/// Sort by win rate, highest first. Stable: ties keep their input order.
pub fn sort_by_win_rate_desc<T: StatRecord>(records: &mut [T]) {
    records.sort_by(|a, b| b.win_rate().total_cmp(&a.win_rate()));
}

/// Partition on `min_games` and order both halves.
pub fn view<T: StatRecord + Clone>(records: &[T], min_games: u64) -> StatsView<T> {
    let (mut primary, mut underplayed): (Vec<T>, Vec<T>) = records
        .iter()
        .cloned()
        .partition(|r| r.games_played() >= min_games);

    sort_by_win_rate_desc(&mut primary);
    sort_by_win_rate_desc(&mut underplayed);

    StatsView {
        primary,
        underplayed,
        no_data: records.is_empty(),
    }
}

/// Per-brawler view.
pub fn brawler_view(
    records: &[CharacterStatRecord],
    min_games: MinGames,
) -> StatsView<CharacterStatRecord> {
    view(records, min_games.value())
}

/// Teams containing every selected brawler. An empty selection keeps all.
pub fn filter_teams<S: AsRef<str>>(
    records: &[TeamStatRecord],
    selected: &[S],
) -> Vec<TeamStatRecord> {
    records
        .iter()
        .filter(|t| t.includes_all(selected))
        .cloned()
        .collect()
}

/// Team view: selection filter first, then partition and order.
pub fn team_view<S: AsRef<str>>(
    records: &[TeamStatRecord],
    min_games: MinGames,
    selected: &[S],
) -> StatsView<TeamStatRecord> {
    let retained = filter_teams(records, selected);
    let mut out = view(&retained, min_games.value());
    out.no_data = records.is_empty();
    out
}
