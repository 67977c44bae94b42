//! Game modes that have published statistics.

use serde::{Deserialize, Serialize};

use super::SelectionError;

/// A game mode from the allow-list.
///
/// The identifier doubles as the dataset folder name, so the table below is
/// the single place that maps a mode to its folder, label and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    BrawlBall,
    GemGrab,
    Heist,
    KnockOut,
    Bounty,
    HotZone,
    ZombiePlunder,
    Payload,
    VolleyBrawl,
}

impl GameMode {
    /// Every allow-listed mode, in menu order.
    pub const ALL: [GameMode; 9] = [
        GameMode::BrawlBall,
        GameMode::GemGrab,
        GameMode::Heist,
        GameMode::KnockOut,
        GameMode::Bounty,
        GameMode::HotZone,
        GameMode::ZombiePlunder,
        GameMode::Payload,
        GameMode::VolleyBrawl,
    ];

    /// Folder under the data root holding this mode's maps.
    pub fn folder(&self) -> &'static str {
        match self {
            GameMode::BrawlBall => "brawlball",
            GameMode::GemGrab => "gemgrab",
            GameMode::Heist => "heist",
            GameMode::KnockOut => "knockout",
            GameMode::Bounty => "bounty",
            GameMode::HotZone => "hotzone",
            GameMode::ZombiePlunder => "zombieplunder",
            GameMode::Payload => "payload",
            GameMode::VolleyBrawl => "volleybrawl",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::BrawlBall => "Brawl Ball",
            GameMode::GemGrab => "Gem Grab",
            GameMode::Heist => "Heist",
            GameMode::KnockOut => "Knock Out",
            GameMode::Bounty => "Bounty",
            GameMode::HotZone => "Hot Zone",
            GameMode::ZombiePlunder => "Zombie Plunder",
            GameMode::Payload => "Payload",
            GameMode::VolleyBrawl => "Volley Brawl",
        }
    }

    /// Icon asset path, e.g. `/brawl_ball_icon.png`.
    pub fn icon(&self) -> String {
        format!(
            "/{}_icon.png",
            self.label().to_lowercase().replace(' ', "_")
        )
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.folder())
    }
}

impl std::str::FromStr for GameMode {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .into_iter()
            .find(|m| m.folder() == s)
            .ok_or_else(|| SelectionError::UnknownMode(s.to_string()))
    }
}
