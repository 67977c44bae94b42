//! View selection: which bucket to read and how to filter it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of brawlers a team filter can hold at once.
pub const MAX_SELECTED: usize = 3;

/// Errors raised while building a selection from user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unknown game mode: {0}")]
    UnknownMode(String),

    #[error("Invalid map identifier: {0}")]
    InvalidMap(String),

    #[error("Invalid trophy tier: {0} (expected one of 700, 800, 900, 1000)")]
    InvalidTrophyTier(u32),

    #[error("Invalid rank tier: {0} (expected one of 10, 13, 16, 19)")]
    InvalidRankTier(u32),

    #[error("Invalid minimum games: {0} (expected one of 100, 250, 500, 1000, 2000)")]
    InvalidMinGames(u64),

    #[error("Specify either a trophy tier or a rank tier, not both")]
    ConflictingBuckets,

    #[error("Team statistics are only published for trophy buckets")]
    TeamRequiresTrophies,

    #[error("At most {MAX_SELECTED} brawlers can be selected")]
    TooManySelected,
}

/// Trophy range bucket (`700+`, `800+`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum TrophyTier {
    #[default]
    T700,
    T800,
    T900,
    T1000,
}

impl TrophyTier {
    pub const ALL: [TrophyTier; 4] = [
        TrophyTier::T700,
        TrophyTier::T800,
        TrophyTier::T900,
        TrophyTier::T1000,
    ];

    pub fn value(&self) -> u32 {
        match self {
            TrophyTier::T700 => 700,
            TrophyTier::T800 => 800,
            TrophyTier::T900 => 900,
            TrophyTier::T1000 => 1000,
        }
    }
}

impl TryFrom<u32> for TrophyTier {
    type Error = SelectionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        TrophyTier::ALL
            .into_iter()
            .find(|t| t.value() == value)
            .ok_or(SelectionError::InvalidTrophyTier(value))
    }
}

impl From<TrophyTier> for u32 {
    fn from(tier: TrophyTier) -> Self {
        tier.value()
    }
}

/// Ranked mode bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum RankTier {
    #[default]
    R10,
    R13,
    R16,
    R19,
}

impl RankTier {
    pub const ALL: [RankTier; 4] = [RankTier::R10, RankTier::R13, RankTier::R16, RankTier::R19];

    pub fn value(&self) -> u32 {
        match self {
            RankTier::R10 => 10,
            RankTier::R13 => 13,
            RankTier::R16 => 16,
            RankTier::R19 => 19,
        }
    }
}

impl TryFrom<u32> for RankTier {
    type Error = SelectionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        RankTier::ALL
            .into_iter()
            .find(|t| t.value() == value)
            .ok_or(SelectionError::InvalidRankTier(value))
    }
}

impl From<RankTier> for u32 {
    fn from(tier: RankTier) -> Self {
        tier.value()
    }
}

/// One partition of a map's dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tier", rename_all = "lowercase")]
pub enum Bucket {
    Trophies(TrophyTier),
    Ranked(RankTier),
}

impl Bucket {
    /// Lowest trophy tier, used as the popularity baseline.
    pub const BASELINE: Bucket = Bucket::Trophies(TrophyTier::T700);

    /// Lowest rank tier, the baseline when trophy data is absent.
    pub const RANKED_BASELINE: Bucket = Bucket::Ranked(RankTier::R10);

    /// Resolve a bucket from optional query values. Neither means the
    /// default trophy bucket.
    pub fn from_parts(trophies: Option<u32>, rank: Option<u32>) -> Result<Self, SelectionError> {
        match (trophies, rank) {
            (Some(_), Some(_)) => Err(SelectionError::ConflictingBuckets),
            (Some(t), None) => Ok(Bucket::Trophies(TrophyTier::try_from(t)?)),
            (None, Some(r)) => Ok(Bucket::Ranked(RankTier::try_from(r)?)),
            (None, None) => Ok(Bucket::BASELINE),
        }
    }

    /// Directory name under the map folder.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Bucket::Trophies(_) => "trophies",
            Bucket::Ranked(_) => "ranked",
        }
    }

    /// Suffix used in the document file name.
    pub fn suffix(&self) -> &'static str {
        match self {
            Bucket::Trophies(_) => "trophies",
            Bucket::Ranked(_) => "rank",
        }
    }

    pub fn tier_value(&self) -> u32 {
        match self {
            Bucket::Trophies(t) => t.value(),
            Bucket::Ranked(r) => r.value(),
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Trophies(t) => write!(f, "{}+ trophies", t.value()),
            Bucket::Ranked(r) => write!(f, "rank {}+", r.value()),
        }
    }
}

/// Minimum sample size for the primary list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct MinGames(u64);

impl MinGames {
    pub const ALLOWED: [u64; 5] = [100, 250, 500, 1000, 2000];

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for MinGames {
    fn default() -> Self {
        Self(500)
    }
}

impl TryFrom<u64> for MinGames {
    type Error = SelectionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(SelectionError::InvalidMinGames(value))
        }
    }
}

impl From<MinGames> for u64 {
    fn from(m: MinGames) -> Self {
        m.0
    }
}

/// Which page of a map the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    ByTrophies,
    ByRank,
    ByTeam,
}

/// Transient per-visit state for a map page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ViewSelection {
    pub kind: ViewKind,
    pub trophy_tier: TrophyTier,
    pub rank_tier: RankTier,
    pub min_games: MinGames,
    selected: Vec<String>,
}

impl ViewSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket this selection reads. Team view reuses the trophy bucket.
    pub fn bucket(&self) -> Bucket {
        match self.kind {
            ViewKind::ByTrophies | ViewKind::ByTeam => Bucket::Trophies(self.trophy_tier),
            ViewKind::ByRank => Bucket::Ranked(self.rank_tier),
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Add a brawler to the team filter. Returns `false` (and changes
    /// nothing) when the name is blank, already selected, or the filter is full.
    pub fn select(&mut self, brawler: &str) -> bool {
        if brawler.trim().is_empty()
            || self.selected.len() >= MAX_SELECTED
            || self.selected.iter().any(|s| s == brawler)
        {
            return false;
        }
        self.selected.push(brawler.to_string());
        true
    }

    /// Remove a brawler from the team filter. Returns whether it was present.
    pub fn deselect(&mut self, brawler: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != brawler);
        self.selected.len() != before
    }

    pub fn clear_selected(&mut self) {
        self.selected.clear();
    }
}

/// Build a team filter from a list, rejecting more than [`MAX_SELECTED`]
/// distinct names.
pub fn parse_selected<I, S>(names: I) -> Result<Vec<String>, SelectionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut selection = ViewSelection::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() || selection.selected.iter().any(|s| s == name) {
            continue;
        }
        if !selection.select(name) {
            return Err(SelectionError::TooManySelected);
        }
    }
    Ok(selection.selected)
}

/// Check that a map identifier is a single, non-hidden path segment.
pub fn validate_map_id(map: &str) -> Result<(), SelectionError> {
    let bad = map.is_empty()
        || map.starts_with('.')
        || map.contains('/')
        || map.contains('\\')
        || map.contains("..");
    if bad {
        Err(SelectionError::InvalidMap(map.to_string()))
    } else {
        Ok(())
    }
}
