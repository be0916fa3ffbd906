//! A `RecordStore` that delegates to `MemoryStore` but can be told to fail
//! room-best writes for one player, standing in for a dropped connection.

use async_trait::async_trait;
use raidtimes::database::MemoryStore;
use raidtimes::database::models::{
    Category, CategoryId, GroupId, NewRun, Player, PlayerId, Run, RunFilter, RunId, Scale,
    ScaleId, SegmentBestRecord, SegmentTimes,
};
use raidtimes::database::store::{RecordStore, StoreResult};
use raidtimes::error::StoreError;
use raidtimes::speedrun::catalog::Segment;
use raidtimes::timing::Ticks;
use std::collections::BTreeSet;
use std::sync::Mutex;

pub struct FailingStore {
    inner: MemoryStore,
    failing: Mutex<Option<PlayerId>>,
}

impl FailingStore {
    pub fn seeded() -> Self {
        Self {
            inner: MemoryStore::seeded(),
            failing: Mutex::new(None),
        }
    }

    pub fn fail_room_writes_for(&self, player: PlayerId) {
        *self.failing.lock().unwrap() = Some(player);
    }

    pub fn recover(&self) {
        *self.failing.lock().unwrap() = None;
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn category_by_identifier(&self, identifier: &str) -> StoreResult<Option<Category>> {
        self.inner.category_by_identifier(identifier).await
    }

    async fn scale_by_value(&self, value: i32) -> StoreResult<Option<Scale>> {
        self.inner.scale_by_value(value).await
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        self.inner.categories().await
    }

    async fn scales(&self) -> StoreResult<Vec<Scale>> {
        self.inner.scales().await
    }

    async fn find_player_by_external_id(&self, external_id: i64) -> StoreResult<Option<Player>> {
        self.inner.find_player_by_external_id(external_id).await
    }

    async fn create_player(&self, external_id: i64, name: &str) -> StoreResult<Player> {
        self.inner.create_player(external_id, name).await
    }

    async fn rename_player(&self, player: PlayerId, name: &str) -> StoreResult<()> {
        self.inner.rename_player(player, name).await
    }

    async fn group_candidates(&self, player: PlayerId, size: usize) -> StoreResult<Vec<GroupId>> {
        self.inner.group_candidates(player, size).await
    }

    async fn group_member_ids(&self, group: GroupId) -> StoreResult<BTreeSet<PlayerId>> {
        self.inner.group_member_ids(group).await
    }

    async fn create_group(&self, members: &BTreeSet<PlayerId>) -> StoreResult<GroupId> {
        self.inner.create_group(members).await
    }

    async fn group_players(&self, group: GroupId) -> StoreResult<Vec<Player>> {
        self.inner.group_players(group).await
    }

    async fn runs_matching(&self, filter: &RunFilter) -> StoreResult<Vec<Run>> {
        self.inner.runs_matching(filter).await
    }

    async fn insert_run(&self, run: &NewRun) -> StoreResult<Run> {
        self.inner.insert_run(run).await
    }

    async fn run_segments(&self, run: RunId) -> StoreResult<SegmentTimes> {
        self.inner.run_segments(run).await
    }

    async fn delete_run(&self, run: RunId) -> StoreResult<bool> {
        self.inner.delete_run(run).await
    }

    async fn clear_screenshot(&self, run: RunId) -> StoreResult<()> {
        self.inner.clear_screenshot(run).await
    }

    async fn segment_bests(
        &self,
        player: PlayerId,
        category: CategoryId,
        scale: ScaleId,
    ) -> StoreResult<Option<SegmentBestRecord>> {
        self.inner.segment_bests(player, category, scale).await
    }

    async fn store_segment_best(
        &self,
        player: PlayerId,
        category: CategoryId,
        scale: ScaleId,
        segment: Segment,
        ticks: Ticks,
    ) -> StoreResult<()> {
        if *self.failing.lock().unwrap() == Some(player) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner
            .store_segment_best(player, category, scale, segment, ticks)
            .await
    }
}
