//! Map popularity scan.
//!
//! Loads every map's baseline bucket concurrently and ranks maps by total
//! games played. One map failing (missing file, bad JSON, timeout, panic)
//! only zeroes that map.

use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::{total_games, Bucket, GameMode, MapAggregate};
use crate::storage::{DatasetAccessor, DatasetKey, MapLister};

/// Tunables for [`rank_maps`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Upper bound on one map's baseline load.
    pub per_map_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            per_map_timeout: Duration::from_secs(5),
        }
    }
}

/// Total games in a map's baseline bucket: lowest trophy tier, or lowest
/// rank tier when the trophy document is missing or empty.
pub async fn baseline_total(accessor: &DatasetAccessor, mode: GameMode, map: &str) -> u64 {
    for bucket in [Bucket::BASELINE, Bucket::RANKED_BASELINE] {
        let key = match DatasetKey::brawlers(mode, map, bucket) {
            Ok(key) => key,
            Err(e) => {
                warn!("Skipping map {:?} in {}: {}", map, mode, e);
                return 0;
            }
        };
        let load = accessor.load_brawlers(&key).await;
        if !load.is_empty() {
            return total_games(&load.records);
        }
    }
    0
}

/// Rank a mode's maps by baseline games played, most played first.
///
/// Ties keep the lister's order. Maps whose baseline cannot be read are kept
/// with a total of zero.
pub async fn rank_maps(
    mode: GameMode,
    lister: &dyn MapLister,
    accessor: &DatasetAccessor,
    options: &ScanOptions,
) -> Vec<MapAggregate> {
    let maps = match lister.list_maps(mode).await {
        Ok(maps) => maps,
        Err(e) => {
            warn!("Failed to list maps for {}: {}", mode, e);
            return Vec::new();
        }
    };

    let mut totals = vec![0u64; maps.len()];
    let mut tasks = JoinSet::new();

    for (idx, map) in maps.iter().enumerate() {
        let accessor = accessor.clone();
        let map = map.clone();
        let limit = options.per_map_timeout;
        tasks.spawn(async move {
            match tokio::time::timeout(limit, baseline_total(&accessor, mode, &map)).await {
                Ok(total) => (idx, total),
                Err(_) => {
                    warn!("Timed out loading baseline for {}/{} after {:?}", mode, map, limit);
                    (idx, 0)
                }
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, total)) => totals[idx] = total,
            Err(e) => warn!("Map scan task failed for {}: {}", mode, e),
        }
    }

    let mut ranked: Vec<MapAggregate> = maps
        .into_iter()
        .zip(totals)
        .map(|(map, total)| MapAggregate::new(map, total))
        .collect();
    ranked.sort_by(|a, b| b.total_games_played.cmp(&a.total_games_played));

    info!("Ranked {} maps for {}", ranked.len(), mode);
    ranked
}

/// Drop maps whose total is below `min_total`. Order is preserved.
pub fn retain_popular(aggregates: Vec<MapAggregate>, min_total: u64) -> Vec<MapAggregate> {
    let before = aggregates.len();
    let kept: Vec<MapAggregate> = aggregates
        .into_iter()
        .filter(|a| a.total_games_played >= min_total)
        .collect();
    if kept.len() != before {
        debug!(
            "Hid {} maps under {} games",
            before - kept.len(),
            min_total
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DatasetSource, StaticMapLister, StorageError};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Arc;

    enum Doc {
        Body(String),
        Fail,
        Hang,
    }

    #[derive(Default)]
    struct FakeSource {
        docs: HashMap<String, Doc>,
    }

    impl FakeSource {
        fn with(mut self, path: &str, doc: Doc) -> Self {
            self.docs.insert(path.to_string(), doc);
            self
        }
    }

    #[async_trait]
    impl DatasetSource for FakeSource {
        fn describe(&self) -> String {
            "fake".to_string()
        }

        async fn fetch(&self, key: &DatasetKey) -> Result<Vec<u8>, StorageError> {
            match self.docs.get(&key.relative_path()) {
                Some(Doc::Body(body)) => Ok(body.clone().into_bytes()),
                Some(Doc::Fail) => Err(StorageError::Remote("connection reset".into())),
                Some(Doc::Hang) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(b"[]".to_vec())
                }
                None => Err(StorageError::DocumentNotFound(key.relative_path())),
            }
        }
    }

    fn records(games: &[u64]) -> Doc {
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
        Doc::Body(format!("[{}]", items.join(",")))
    }

    fn accessor(source: FakeSource) -> DatasetAccessor {
        DatasetAccessor::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_scenario_d_failed_map_kept_with_zero() {
        let source = FakeSource::default()
            .with(
                "payload/m1/trophies/brawler-700-trophies.json",
                records(&[70_000, 50_000]),
            )
            .with("payload/m2/trophies/brawler-700-trophies.json", Doc::Fail)
            .with("payload/m2/ranked/brawler-10-rank.json", Doc::Fail);
        let lister = StaticMapLister::default().with_mode(GameMode::Payload, &["m2", "m1"]);

        let ranked = rank_maps(
            GameMode::Payload,
            &lister,
            &accessor(source),
            &ScanOptions::default(),
        )
        .await;

        assert_eq!(
            ranked,
            vec![MapAggregate::new("m1", 120_000), MapAggregate::new("m2", 0)]
        );
    }

    #[tokio::test]
    async fn test_ranked_descending_with_stable_ties() {
        let source = FakeSource::default()
            .with("heist/a/trophies/brawler-700-trophies.json", records(&[100]))
            .with("heist/b/trophies/brawler-700-trophies.json", records(&[300]))
            .with("heist/c/trophies/brawler-700-trophies.json", records(&[100]));
        let lister = StaticMapLister::default().with_mode(GameMode::Heist, &["a", "b", "c"]);

        let ranked = rank_maps(
            GameMode::Heist,
            &lister,
            &accessor(source),
            &ScanOptions::default(),
        )
        .await;

        let order: Vec<&str> = ranked.iter().map(|a| a.map.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_rank_baseline() {
        let source = FakeSource::default()
            .with("bounty/m/trophies/brawler-700-trophies.json", records(&[]))
            .with("bounty/m/ranked/brawler-10-rank.json", records(&[40, 2]));

        let total = baseline_total(&accessor(source), GameMode::Bounty, "m").await;
        assert_eq!(total, 42);
    }

    #[tokio::test]
    async fn test_missing_everything_is_zero() {
        let total = baseline_total(&accessor(FakeSource::default()), GameMode::Bounty, "m").await;
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_timeout_zeroes_only_slow_map() {
        let source = FakeSource::default()
            .with("hotzone/slow/trophies/brawler-700-trophies.json", Doc::Hang)
            .with("hotzone/fast/trophies/brawler-700-trophies.json", records(&[10]));
        let lister = StaticMapLister::default().with_mode(GameMode::HotZone, &["slow", "fast"]);
        let options = ScanOptions {
            per_map_timeout: Duration::from_millis(50),
        };

        let ranked = rank_maps(GameMode::HotZone, &lister, &accessor(source), &options).await;

        assert_eq!(
            ranked,
            vec![MapAggregate::new("fast", 10), MapAggregate::new("slow", 0)]
        );
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let ranked = rank_maps(
            GameMode::Payload,
            &StaticMapLister::default(),
            &accessor(FakeSource::default()),
            &ScanOptions::default(),
        )
        .await;
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_retain_popular() {
        let aggregates = vec![
            MapAggregate::new("m1", 120_000),
            MapAggregate::new("m3", 900),
            MapAggregate::new("m2", 0),
        ];

        assert_eq!(retain_popular(aggregates.clone(), 0), aggregates);
        assert_eq!(
            retain_popular(aggregates, 1000),
            vec![MapAggregate::new("m1", 120_000)]
        );
    }
}
