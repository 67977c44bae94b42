use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{rank_maps, retain_popular};
use crate::models::{display_map_name, format_games, map_thumbnail_path, GameMode, MapAggregate};

#[derive(Debug, Serialize)]
pub struct ModeSummary {
    pub id: GameMode,
    pub label: String,
    pub icon: String,
}

#[derive(Debug, Serialize)]
pub struct ModesResponse {
    pub modes: Vec<ModeSummary>,
}

pub async fn list_modes() -> Json<ModesResponse> {
    let modes = GameMode::ALL
        .into_iter()
        .map(|mode| ModeSummary {
            id: mode,
            label: mode.label().to_string(),
            icon: mode.icon(),
        })
        .collect();
    Json(ModesResponse { modes })
}

#[derive(Debug, Deserialize)]
pub struct MapListParams {
    pub min_total: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct MapCard {
    pub map: String,
    pub label: String,
    pub thumbnail: String,
    pub total_games_played: u64,
    pub total_label: String,
}

impl From<MapAggregate> for MapCard {
    fn from(aggregate: MapAggregate) -> Self {
        Self {
            label: display_map_name(&aggregate.map),
            thumbnail: map_thumbnail_path(&aggregate.map),
            total_label: format_games(aggregate.total_games_played),
            total_games_played: aggregate.total_games_played,
            map: aggregate.map,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MapListResponse {
    pub mode: GameMode,
    pub mode_label: String,
    pub maps: Vec<MapCard>,
    /// Maps left out by the minimum-total policy
    pub hidden: usize,
}

pub async fn list_maps(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Query(params): Query<MapListParams>,
) -> Result<Json<MapListResponse>, ApiError> {
    let mode: GameMode = mode.parse()?;

    let ranked = rank_maps(
        mode,
        state.lister.as_ref(),
        &state.accessor,
        &state.settings.scan,
    )
    .await;

    let min_total = params.min_total.unwrap_or(state.settings.min_total_games);
    let total = ranked.len();
    let kept = retain_popular(ranked, min_total);

    Ok(Json(MapListResponse {
        mode,
        mode_label: mode.label().to_string(),
        hidden: total - kept.len(),
        maps: kept.into_iter().map(MapCard::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;

    fn brawlers(games: &[u64]) -> String {
        let items: Vec<String> = games
            .iter()
            .enumerate()
            .map(|(i, g)| {
                format!(
                    r#"{{"brawler": "B{}", "games_played": {}, "win_rate": 0.5}}"#,
                    i, g
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn test_list_modes() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/modes").await;

        assert_eq!(status, StatusCode::OK);
        let modes = json["modes"].as_array().unwrap();
        assert_eq!(modes.len(), 9);
        assert_eq!(modes[0]["id"], "brawlball");
        assert_eq!(modes[0]["label"], "Brawl Ball");
        assert_eq!(modes[0]["icon"], "/brawl_ball_icon.png");
    }

    #[tokio::test]
    async fn test_list_maps_ranked_by_total() {
        let tmp = tempfile::tempdir().unwrap();
        write_doc(
            tmp.path(),
            "payload/m1/trophies/brawler-700-trophies.json",
            &brawlers(&[100_000, 20_000]),
        );
        write_doc(
            tmp.path(),
            "payload/m2/trophies/brawler-700-trophies.json",
            "{ broken",
        );
        write_doc(
            tmp.path(),
            "payload/m3/ranked/brawler-10-rank.json",
            &brawlers(&[500]),
        );
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/modes/payload/maps").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["mode_label"], "Payload");
        let maps = json["maps"].as_array().unwrap();
        let order: Vec<&str> = maps.iter().map(|m| m["map"].as_str().unwrap()).collect();
        assert_eq!(order, vec!["m1", "m3", "m2"]);
        assert_eq!(maps[0]["total_games_played"], 120_000);
        assert_eq!(maps[0]["total_label"], "120,000");
        assert_eq!(maps[2]["total_games_played"], 0);
        assert_eq!(json["hidden"], 0);
    }

    #[tokio::test]
    async fn test_list_maps_min_total_filter() {
        let tmp = tempfile::tempdir().unwrap();
        write_doc(
            tmp.path(),
            "heist/safe_zone/trophies/brawler-700-trophies.json",
            &brawlers(&[5000]),
        );
        write_doc(
            tmp.path(),
            "heist/hot_potato/trophies/brawler-700-trophies.json",
            &brawlers(&[50]),
        );
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/modes/heist/maps?min_total=1000").await;

        assert_eq!(status, StatusCode::OK);
        let maps = json["maps"].as_array().unwrap();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0]["map"], "safe_zone");
        assert_eq!(maps[0]["label"], "Safe Zone");
        assert_eq!(maps[0]["thumbnail"], "/maps/safe_zone.png");
        assert_eq!(json["hidden"], 1);
    }

    #[tokio::test]
    async fn test_list_maps_unknown_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, _) = get_json(app, "/api/modes/duels/maps").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_maps_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup_test_state(tmp.path()));

        let (status, json) = get_json(app, "/api/modes/bounty/maps").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["maps"].as_array().unwrap().is_empty());
    }
}
