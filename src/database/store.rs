//! The persistence seam used by the speedrun engine.
//!
//! Every engine operation takes a `&dyn RecordStore` explicitly instead of
//! reaching for a shared global session. Implementations only expose
//! query-by-predicate primitives; the rules (set equality, duplicate guard,
//! best-time monotonicity) live in `crate::speedrun`. Uniqueness constraints
//! are still enforced here, and surface as [`StoreError::Conflict`].

use super::models::{
    Category, CategoryId, GroupId, NewRun, Player, PlayerId, Run, RunFilter, RunId, Scale,
    ScaleId, SegmentBestRecord, SegmentTimes,
};
use crate::error::StoreError;
use crate::speedrun::catalog::Segment;
use crate::timing::Ticks;
use async_trait::async_trait;
use std::collections::BTreeSet;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    // --- Reference data ---
    async fn category_by_identifier(&self, identifier: &str) -> StoreResult<Option<Category>>;
    async fn scale_by_value(&self, value: i32) -> StoreResult<Option<Scale>>;
    async fn categories(&self) -> StoreResult<Vec<Category>>;
    async fn scales(&self) -> StoreResult<Vec<Scale>>;

    // --- Players ---
    async fn find_player_by_external_id(&self, external_id: i64) -> StoreResult<Option<Player>>;
    /// Fails with `Conflict` if the external id is already known.
    async fn create_player(&self, external_id: i64, name: &str) -> StoreResult<Player>;
    async fn rename_player(&self, player: PlayerId, name: &str) -> StoreResult<()>;

    // --- Groups ---
    /// Groups that contain `player` and have exactly `size` members.
    async fn group_candidates(&self, player: PlayerId, size: usize) -> StoreResult<Vec<GroupId>>;
    async fn group_member_ids(&self, group: GroupId) -> StoreResult<BTreeSet<PlayerId>>;
    /// Fails with `Conflict` if a group with exactly these members exists.
    async fn create_group(&self, members: &BTreeSet<PlayerId>) -> StoreResult<GroupId>;
    async fn group_players(&self, group: GroupId) -> StoreResult<Vec<Player>>;

    // --- Runs ---
    /// Matching runs in creation order.
    async fn runs_matching(&self, filter: &RunFilter) -> StoreResult<Vec<Run>>;
    /// Inserts the run and its segment detail atomically. Fails with `Conflict`
    /// when (category, scale, group, ticks) already exists.
    async fn insert_run(&self, run: &NewRun) -> StoreResult<Run>;
    /// Room splits stored with a run; empty for single-time runs.
    async fn run_segments(&self, run: RunId) -> StoreResult<SegmentTimes>;
    /// Removes the run and its segment detail atomically. Returns false if absent.
    async fn delete_run(&self, run: RunId) -> StoreResult<bool>;
    async fn clear_screenshot(&self, run: RunId) -> StoreResult<()>;

    // --- Room personal bests ---
    async fn segment_bests(
        &self,
        player: PlayerId,
        category: CategoryId,
        scale: ScaleId,
    ) -> StoreResult<Option<SegmentBestRecord>>;
    /// Stores `ticks` for the room unless a lower value is already stored.
    /// Safe to repeat.
    async fn store_segment_best(
        &self,
        player: PlayerId,
        category: CategoryId,
        scale: ScaleId,
        segment: Segment,
        ticks: Ticks,
    ) -> StoreResult<()>;
}
