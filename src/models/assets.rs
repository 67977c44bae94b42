//! Display helpers: asset paths, labels and win-rate colour bands.

use serde::{Deserialize, Serialize};

/// Normalize a name into an asset key: lowercase with spaces, periods and
/// hyphens removed.
pub fn asset_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Portrait image for a brawler, e.g. `MR. P` → `/characters/mrp_portrait.png`.
pub fn portrait_path(brawler: &str) -> String {
    format!("/characters/{}_portrait.png", asset_key(brawler))
}

/// Thumbnail image for a map.
pub fn map_thumbnail_path(map: &str) -> String {
    format!("/maps/{}.png", asset_key(map))
}

/// Decode `%XX` escapes, leaving malformed escapes as they are.
fn percent_decode(raw: &str) -> String {
    // Keep the form separators literal so the whole input is one key.
    let escaped = raw
        .replace('+', "%2B")
        .replace('&', "%26")
        .replace('=', "%3D");
    url::form_urlencoded::parse(escaped.as_bytes())
        .map(|(key, _)| key.into_owned())
        .collect()
}

/// Title-case a map folder name: `hard_rock_mine` → `Hard Rock Mine`.
/// Percent-escapes are decoded first.
pub fn display_map_name(map: &str) -> String {
    percent_decode(map)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `0.5321` → `53.2%`.
pub fn format_win_rate(win_rate: f64) -> String {
    format!("{:.1}%", win_rate * 100.0)
}

/// `1234567` → `1,234,567`.
pub fn format_games(games: u64) -> String {
    let digits = games.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Colour band for a win rate, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WinRateBand {
    Emerald,
    Green,
    Lime,
    Yellow,
    Amber,
    Orange,
    Rose,
    Red,
    DeepRed,
}

impl WinRateBand {
    pub fn from_win_rate(win_rate: f64) -> Self {
        let pct = win_rate * 100.0;
        if pct >= 57.0 {
            WinRateBand::Emerald
        } else if pct >= 55.0 {
            WinRateBand::Green
        } else if pct >= 53.0 {
            WinRateBand::Lime
        } else if pct >= 51.0 {
            WinRateBand::Yellow
        } else if pct >= 49.0 {
            WinRateBand::Amber
        } else if pct >= 47.0 {
            WinRateBand::Orange
        } else if pct >= 45.0 {
            WinRateBand::Rose
        } else if pct >= 43.0 {
            WinRateBand::Red
        } else {
            WinRateBand::DeepRed
        }
    }
}
