//! In-process [`RecordStore`] used by the test-suite and offline tooling.
//!
//! All tables sit behind one `RwLock`, so every check-then-write below runs
//! under a single write guard and enforces the same uniqueness rules as the
//! Postgres schema.

use super::models::{
    Category, CategoryId, GroupId, NewRun, Player, PlayerId, Run, RunFilter, RunId, Scale,
    ScaleId, SegmentBestRecord, SegmentTimes,
};
use super::store::{RecordStore, StoreResult};
use crate::error::StoreError;
use crate::speedrun::catalog::{self, Segment};
use crate::timing::Ticks;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

type SegmentBestKey = (PlayerId, CategoryId, ScaleId);

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    scales: Vec<Scale>,
    players: BTreeMap<PlayerId, Player>,
    groups: BTreeMap<GroupId, BTreeSet<PlayerId>>,
    runs: BTreeMap<RunId, Run>,
    run_segments: HashMap<RunId, SegmentTimes>,
    segment_bests: HashMap<SegmentBestKey, SegmentTimes>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn run_matches(&self, run: &Run, filter: &RunFilter) -> bool {
        run.raid_type_id == filter.category
            && run.scale_id == filter.scale
            && filter.group.is_none_or(|g| run.player_group_id == g)
            && filter.ticks.is_none_or(|t| run.ticks == t)
            && filter.player.is_none_or(|p| {
                self.groups
                    .get(&run.player_group_id)
                    .is_some_and(|members| members.contains(&p))
            })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// An empty store with no reference data.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the raid types and scales from the catalog.
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        for identifier in catalog::CATEGORIES {
            let id = tables.next_id();
            tables.categories.push(Category {
                raid_type_id: CategoryId(id),
                identifier: identifier.to_string(),
            });
        }
        for (value, identifier) in catalog::SCALES {
            let id = tables.next_id();
            tables.scales.push(Scale {
                scale_id: ScaleId(id),
                identifier: identifier.to_string(),
                value,
            });
        }
        Self {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn category_by_identifier(&self, identifier: &str) -> StoreResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.identifier == identifier)
            .cloned())
    }

    async fn scale_by_value(&self, value: i32) -> StoreResult<Option<Scale>> {
        let tables = self.tables.read().await;
        Ok(tables.scales.iter().find(|s| s.value == value).cloned())
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn scales(&self) -> StoreResult<Vec<Scale>> {
        Ok(self.tables.read().await.scales.clone())
    }

    async fn find_player_by_external_id(&self, external_id: i64) -> StoreResult<Option<Player>> {
        let tables = self.tables.read().await;
        Ok(tables
            .players
            .values()
            .find(|p| p.external_id == external_id)
            .cloned())
    }

    async fn create_player(&self, external_id: i64, name: &str) -> StoreResult<Player> {
        let mut tables = self.tables.write().await;
        if tables.players.values().any(|p| p.external_id == external_id) {
            return Err(StoreError::Conflict("player.external_id"));
        }
        let player = Player {
            player_id: PlayerId(tables.next_id()),
            external_id,
            name: name.to_string(),
        };
        tables.players.insert(player.player_id, player.clone());
        Ok(player)
    }

    async fn rename_player(&self, player: PlayerId, name: &str) -> StoreResult<()> {
        if let Some(p) = self.tables.write().await.players.get_mut(&player) {
            p.name = name.to_string();
        }
        Ok(())
    }

    async fn group_candidates(&self, player: PlayerId, size: usize) -> StoreResult<Vec<GroupId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .filter(|(_, members)| members.len() == size && members.contains(&player))
            .map(|(id, _)| *id)
            .collect())
    }

    async fn group_member_ids(&self, group: GroupId) -> StoreResult<BTreeSet<PlayerId>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(&group).cloned().unwrap_or_default())
    }

    async fn create_group(&self, members: &BTreeSet<PlayerId>) -> StoreResult<GroupId> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|existing| existing == members) {
            return Err(StoreError::Conflict("player_group.member_key"));
        }
        let id = GroupId(tables.next_id());
        tables.groups.insert(id, members.clone());
        Ok(id)
    }

    async fn group_players(&self, group: GroupId) -> StoreResult<Vec<Player>> {
        let tables = self.tables.read().await;
        let Some(members) = tables.groups.get(&group) else {
            return Ok(Vec::new());
        };
        Ok(members
            .iter()
            .filter_map(|id| tables.players.get(id).cloned())
            .collect())
    }

    async fn runs_matching(&self, filter: &RunFilter) -> StoreResult<Vec<Run>> {
        let tables = self.tables.read().await;
        Ok(tables
            .runs
            .values()
            .filter(|run| tables.run_matches(run, filter))
            .cloned()
            .collect())
    }

    async fn insert_run(&self, new: &NewRun) -> StoreResult<Run> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.runs.values().any(|r| {
            r.raid_type_id == new.category
                && r.scale_id == new.scale
                && r.player_group_id == new.group
                && r.ticks == new.ticks
        });
        if duplicate {
            return Err(StoreError::Conflict("speedrun_time.unique_run"));
        }
        let run = Run {
            run_id: RunId(tables.next_id()),
            raid_type_id: new.category,
            scale_id: new.scale,
            player_group_id: new.group,
            ticks: new.ticks,
            screenshot: new.screenshot.clone(),
            submitted_at: Utc::now(),
        };
        tables.runs.insert(run.run_id, run.clone());
        if !new.segments.is_empty() {
            tables.run_segments.insert(run.run_id, new.segments.clone());
        }
        Ok(run)
    }

    async fn run_segments(&self, run: RunId) -> StoreResult<SegmentTimes> {
        let tables = self.tables.read().await;
        Ok(tables.run_segments.get(&run).cloned().unwrap_or_default())
    }

    async fn delete_run(&self, run: RunId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.run_segments.remove(&run);
        Ok(tables.runs.remove(&run).is_some())
    }

    async fn clear_screenshot(&self, run: RunId) -> StoreResult<()> {
        if let Some(r) = self.tables.write().await.runs.get_mut(&run) {
            r.screenshot = None;
        }
        Ok(())
    }

    async fn segment_bests(
        &self,
        player: PlayerId,
        category: CategoryId,
        scale: ScaleId,
    ) -> StoreResult<Option<SegmentBestRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .segment_bests
            .get(&(player, category, scale))
            .map(|times| SegmentBestRecord {
                player_id: player,
                raid_type_id: category,
                scale_id: scale,
                times: times.clone(),
            }))
    }

    async fn store_segment_best(
        &self,
        player: PlayerId,
        category: CategoryId,
        scale: ScaleId,
        segment: Segment,
        ticks: Ticks,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let times = tables
            .segment_bests
            .entry((player, category, scale))
            .or_default();
        times
            .entry(segment)
            .and_modify(|stored| *stored = (*stored).min(ticks))
            .or_insert(ticks);
        Ok(())
    }
}
