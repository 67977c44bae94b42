//! Per-visit selection state with last-selection-wins fetches.
//!
//! Every selection change bumps a generation counter and hands out a
//! [`FetchTicket`]. A fetch result is only rendered if its ticket still
//! carries the current generation, so a slow response for an old selection
//! can never overwrite a newer one.

use crate::calculate::{brawler_view, team_view, StatsView};
use crate::models::{
    validate_map_id, CharacterStatRecord, GameMode, MinGames, RankTier, SelectionError,
    TeamStatRecord, TrophyTier, ViewKind, ViewSelection,
};
use crate::storage::{DatasetAccessor, DatasetKey, RecordKind};

/// Tag attached to one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub key: DatasetKey,
}

/// Records returned for a ticket.
#[derive(Debug, Clone)]
pub enum Fetched {
    Brawlers(Vec<CharacterStatRecord>),
    Teams(Vec<TeamStatRecord>),
}

/// What is currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Brawlers(StatsView<CharacterStatRecord>),
    Teams(StatsView<TeamStatRecord>),
}

/// Result of offering a fetch result to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Rendered,
    Stale,
}

/// Selection state for one map page.
#[derive(Debug, Clone)]
pub struct ViewSession {
    mode: GameMode,
    map: String,
    selection: ViewSelection,
    generation: u64,
    rendered: Option<Rendered>,
}

impl ViewSession {
    pub fn new(mode: GameMode, map: &str) -> Result<Self, SelectionError> {
        validate_map_id(map)?;
        Ok(Self {
            mode,
            map: map.to_string(),
            selection: ViewSelection::new(),
            generation: 0,
            rendered: None,
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn selection(&self) -> &ViewSelection {
        &self.selection
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    /// Start a fetch for the current selection.
    pub fn refresh(&mut self) -> FetchTicket {
        self.generation += 1;
        let kind = match self.selection.kind {
            ViewKind::ByTeam => RecordKind::Team,
            ViewKind::ByTrophies | ViewKind::ByRank => RecordKind::Brawler,
        };
        FetchTicket {
            generation: self.generation,
            key: DatasetKey {
                mode: self.mode,
                map: self.map.clone(),
                bucket: self.selection.bucket(),
                kind,
            },
        }
    }

    pub fn set_kind(&mut self, kind: ViewKind) -> FetchTicket {
        self.selection.kind = kind;
        self.refresh()
    }

    pub fn set_trophy_tier(&mut self, tier: TrophyTier) -> FetchTicket {
        self.selection.trophy_tier = tier;
        self.refresh()
    }

    pub fn set_rank_tier(&mut self, tier: RankTier) -> FetchTicket {
        self.selection.rank_tier = tier;
        self.refresh()
    }

    pub fn set_min_games(&mut self, min_games: MinGames) -> FetchTicket {
        self.selection.min_games = min_games;
        self.refresh()
    }

    /// Add a brawler to the team filter. `None` when the filter is full or
    /// already holds it; nothing changes and no fetch is needed.
    pub fn select(&mut self, brawler: &str) -> Option<FetchTicket> {
        if self.selection.select(brawler) {
            Some(self.refresh())
        } else {
            None
        }
    }

    pub fn deselect(&mut self, brawler: &str) -> Option<FetchTicket> {
        if self.selection.deselect(brawler) {
            Some(self.refresh())
        } else {
            None
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Render a fetch result if its ticket is still current.
    pub fn complete(&mut self, ticket: &FetchTicket, fetched: Fetched) -> Applied {
        if !self.is_current(ticket) {
            return Applied::Stale;
        }

        let min_games = self.selection.min_games;
        self.rendered = Some(match fetched {
            Fetched::Brawlers(records) => Rendered::Brawlers(brawler_view(&records, min_games)),
            Fetched::Teams(records) => Rendered::Teams(team_view(
                &records,
                min_games,
                self.selection.selected(),
            )),
        });
        Applied::Rendered
    }
}

/// Perform the load a ticket asks for.
pub async fn fetch_ticket(accessor: &DatasetAccessor, ticket: &FetchTicket) -> Fetched {
    match ticket.key.kind {
        RecordKind::Brawler => Fetched::Brawlers(accessor.load_brawlers(&ticket.key).await.records),
        RecordKind::Team => Fetched::Teams(accessor.load_teams(&ticket.key).await.records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bucket;

    fn session() -> ViewSession {
        ViewSession::new(GameMode::GemGrab, "gem_fort").unwrap()
    }

    fn brawlers() -> Fetched {
        Fetched::Brawlers(vec![
            CharacterStatRecord::new("A", 600, 0.55),
            CharacterStatRecord::new("B", 400, 0.60),
        ])
    }

    #[test]
    fn test_rejects_bad_map() {
        assert!(ViewSession::new(GameMode::GemGrab, "../x").is_err());
    }

    #[test]
    fn test_tickets_follow_selection() {
        let mut s = session();

        let t = s.refresh();
        assert_eq!(t.key.bucket, Bucket::BASELINE);
        assert_eq!(t.key.kind, RecordKind::Brawler);

        let t = s.set_kind(ViewKind::ByRank);
        assert_eq!(t.key.bucket, Bucket::Ranked(RankTier::R10));

        let t = s.set_kind(ViewKind::ByTeam);
        assert_eq!(t.key.kind, RecordKind::Team);
        assert_eq!(
            t.key.relative_path(),
            "gemgrab/gem_fort/trophies/team-700-trophies.json"
        );
    }

    #[test]
    fn test_generation_is_monotonic() {
        let mut s = session();
        let a = s.refresh();
        let b = s.set_trophy_tier(TrophyTier::T800);
        let c = s.set_min_games(MinGames::try_from(100).unwrap());
        assert!(a.generation < b.generation && b.generation < c.generation);
        assert_eq!(s.generation(), c.generation);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut s = session();
        let old = s.set_trophy_tier(TrophyTier::T800);
        let new = s.set_trophy_tier(TrophyTier::T900);

        assert_eq!(s.complete(&new, brawlers()), Applied::Rendered);
        let rendered = s.rendered().cloned();

        assert_eq!(
            s.complete(&old, Fetched::Brawlers(Vec::new())),
            Applied::Stale
        );
        assert_eq!(s.rendered().cloned(), rendered);
    }

    #[test]
    fn test_out_of_order_old_result_never_renders() {
        let mut s = session();
        let old = s.refresh();
        let _new = s.set_kind(ViewKind::ByRank);

        assert_eq!(s.complete(&old, brawlers()), Applied::Stale);
        assert!(s.rendered().is_none());
    }

    #[test]
    fn test_render_uses_current_min_games() {
        let mut s = session();
        let t = s.set_min_games(MinGames::try_from(250).unwrap());
        s.complete(&t, brawlers());

        match s.rendered() {
            Some(Rendered::Brawlers(view)) => {
                assert_eq!(view.primary.len(), 2);
                assert_eq!(view.primary[0].brawler, "B");
            }
            other => panic!("unexpected render: {:?}", other),
        }
    }

    #[test]
    fn test_select_beyond_cap_is_noop() {
        let mut s = session();
        s.set_kind(ViewKind::ByTeam);
        assert!(s.select("A").is_some());
        assert!(s.select("B").is_some());
        assert!(s.select("C").is_some());

        let generation = s.generation();
        assert!(s.select("D").is_none());
        assert_eq!(s.generation(), generation);
        assert_eq!(s.selection().selected(), ["A", "B", "C"]);
    }

    #[test]
    fn test_select_blank_is_noop() {
        let mut s = session();
        s.set_kind(ViewKind::ByTeam);
        let generation = s.generation();

        assert!(s.select("").is_none());
        assert!(s.select(" ").is_none());
        assert_eq!(s.generation(), generation);
        assert!(s.selection().selected().is_empty());

        let t = s.refresh();
        let fetched = Fetched::Teams(vec![TeamStatRecord::new(["A", "B", "C"], 900, 0.5)]);
        assert_eq!(s.complete(&t, fetched), Applied::Rendered);
        match s.rendered() {
            Some(Rendered::Teams(view)) => assert_eq!(view.primary.len(), 1),
            other => panic!("unexpected render: {:?}", other),
        }
    }

    #[test]
    fn test_team_render_applies_selection() {
        let mut s = session();
        s.set_kind(ViewKind::ByTeam);
        let t = s.select("B").unwrap();

        let fetched = Fetched::Teams(vec![
            TeamStatRecord::new(["A", "B", "C"], 1000, 0.5),
            TeamStatRecord::new(["A", "D", "E"], 1000, 0.6),
        ]);
        assert_eq!(s.complete(&t, fetched), Applied::Rendered);

        match s.rendered() {
            Some(Rendered::Teams(view)) => {
                assert_eq!(view.primary.len(), 1);
                assert_eq!(view.primary[0].team[0], "A");
                assert_eq!(view.primary[0].team[1], "B");
            }
            other => panic!("unexpected render: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_ticket_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let accessor =
            DatasetAccessor::local(crate::storage::StorageConfig::new(dir.path().to_path_buf()));
        let mut s = session();
        let t = s.refresh();

        let fetched = tokio_test::block_on(fetch_ticket(&accessor, &t));
        assert_eq!(s.complete(&t, fetched), Applied::Rendered);
        match s.rendered() {
            Some(Rendered::Brawlers(view)) => assert!(view.no_data),
            other => panic!("unexpected render: {:?}", other),
        }
    }
}
