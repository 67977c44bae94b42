use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{brawler_view, team_view, StatsView};
use crate::models::{
    display_map_name, format_games, format_win_rate, parse_selected, portrait_path, Bucket,
    CharacterStatRecord, GameMode, MinGames, SelectionError, StatRecord, TeamStatRecord,
    WinRateBand,
};
use crate::storage::DatasetKey;

#[derive(Debug, Deserialize)]
pub struct BrawlerStatsParams {
    pub trophies: Option<u32>,
    pub rank: Option<u32>,
    pub min_games: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TeamStatsParams {
    pub trophies: Option<u32>,
    pub rank: Option<u32>,
    pub min_games: Option<u64>,
    /// Comma-separated brawler names, at most three.
    pub brawlers: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BrawlerCard {
    pub brawler: String,
    pub portrait: String,
    pub games_played: u64,
    pub games_label: String,
    pub win_rate: f64,
    pub win_rate_label: String,
    pub band: WinRateBand,
}

impl BrawlerCard {
    pub fn from_record(record: &CharacterStatRecord) -> Self {
        Self {
            brawler: record.brawler.clone(),
            portrait: portrait_path(&record.brawler),
            games_played: record.games_played,
            games_label: format_games(record.games_played),
            win_rate: record.win_rate,
            win_rate_label: format_win_rate(record.win_rate),
            band: WinRateBand::from_win_rate(record.win_rate),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamCard {
    pub team: [String; 3],
    pub portraits: [String; 3],
    pub games_played: u64,
    pub games_label: String,
    pub win_rate: f64,
    pub win_rate_label: String,
    pub band: WinRateBand,
}

impl TeamCard {
    pub fn from_record(record: &TeamStatRecord) -> Self {
        Self {
            team: record.team.clone(),
            portraits: record.team.each_ref().map(|b| portrait_path(b)),
            games_played: record.games_played(),
            games_label: format_games(record.games_played()),
            win_rate: record.win_rate(),
            win_rate_label: format_win_rate(record.win_rate()),
            band: WinRateBand::from_win_rate(record.win_rate()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViewResponse<C> {
    pub mode: GameMode,
    pub mode_label: String,
    pub map: String,
    pub map_label: String,
    pub bucket: Bucket,
    pub min_games: MinGames,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<String>,
    pub primary: Vec<C>,
    pub underplayed: Vec<C>,
    pub underplayed_label: String,
    pub no_data: bool,
}

impl<C> ViewResponse<C> {
    fn new(key: &DatasetKey, min_games: MinGames, view: StatsView<C>) -> Self {
        Self {
            mode: key.mode,
            mode_label: key.mode.label().to_string(),
            map_label: display_map_name(&key.map),
            map: key.map.clone(),
            bucket: key.bucket,
            min_games,
            selected: Vec::new(),
            primary: view.primary,
            underplayed: view.underplayed,
            underplayed_label: format!("Less than {} games", format_games(min_games.value())),
            no_data: view.no_data,
        }
    }
}

fn resolve_min_games(state: &AppState, requested: Option<u64>) -> Result<MinGames, ApiError> {
    match requested {
        Some(value) => Ok(MinGames::try_from(value)?),
        None => Ok(state.settings.default_min_games),
    }
}

pub async fn brawler_stats(
    State(state): State<AppState>,
    Path((mode, map)): Path<(String, String)>,
    Query(params): Query<BrawlerStatsParams>,
) -> Result<Json<ViewResponse<BrawlerCard>>, ApiError> {
    let mode: GameMode = mode.parse()?;
    let bucket = Bucket::from_parts(params.trophies, params.rank)?;
    let min_games = resolve_min_games(&state, params.min_games)?;
    let key = DatasetKey::brawlers(mode, &map, bucket)?;

    let load = state.accessor.load_brawlers(&key).await;
    let view = brawler_view(&load.records, min_games).map(BrawlerCard::from_record);

    Ok(Json(ViewResponse::new(&key, min_games, view)))
}

pub async fn team_stats(
    State(state): State<AppState>,
    Path((mode, map)): Path<(String, String)>,
    Query(params): Query<TeamStatsParams>,
) -> Result<Json<ViewResponse<TeamCard>>, ApiError> {
    let mode: GameMode = mode.parse()?;
    if params.rank.is_some() {
        return Err(SelectionError::TeamRequiresTrophies.into());
    }
    let bucket = Bucket::from_parts(params.trophies, None)?;
    let min_games = resolve_min_games(&state, params.min_games)?;
    let selected = match params.brawlers.as_deref() {
        Some(list) => parse_selected(list.split(','))?,
        None => Vec::new(),
    };
    let key = DatasetKey::teams(mode, &map, bucket)?;

    let load = state.accessor.load_teams(&key).await;
    let view = team_view(&load.records, min_games, &selected).map(TeamCard::from_record);

    let mut response = ViewResponse::new(&key, min_games, view);
    response.selected = selected;
    Ok(Json(response))
}
