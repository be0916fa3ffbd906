//! Postgres implementation of [`RecordStore`].
//!
//! Queries use the runtime-checked `sqlx::query_as::<_, T>` form so the crate
//! builds without a live `DATABASE_URL`. Uniqueness is enforced by the schema
//! in `migrations/`; unique violations are mapped to `StoreError::Conflict`.

use super::init::DbPool;
use super::models::{
    Category, CategoryId, GroupId, NewRun, Player, PlayerId, Run, RunFilter, RunId, Scale,
    ScaleId, SegmentBestRecord, SegmentTimes,
};
use super::store::{RecordStore, StoreResult};
use crate::error::StoreError;
use crate::speedrun::catalog::Segment;
use crate::speedrun::groups::member_key;
use crate::timing::Ticks;
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::{instrument, warn};

const RUN_COLUMNS: &str =
    "run_id, raid_type_id, scale_id, player_group_id, ticks, screenshot, submitted_at";

/// Maps a unique violation to `Conflict`, anything else to `Database`.
fn conflict_or_database(err: sqlx::Error, constraint: &'static str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(constraint),
        _ => StoreError::Database(err),
    }
}

fn parse_segment_rows(rows: Vec<(String, Ticks)>) -> SegmentTimes {
    let mut times = SegmentTimes::new();
    for (key, ticks) in rows {
        match key.parse::<Segment>() {
            Ok(segment) => {
                times.insert(segment, ticks);
            }
            Err(()) => warn!(target: "db.segments", segment = %key, "unknown segment key in database"),
        }
    }
    times
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn category_by_identifier(&self, identifier: &str) -> StoreResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT raid_type_id, identifier FROM raid_type WHERE identifier = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn scale_by_value(&self, value: i32) -> StoreResult<Option<Scale>> {
        let scale = sqlx::query_as::<_, Scale>(
            "SELECT scale_id, identifier, value FROM scale WHERE value = $1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(scale)
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT raid_type_id, identifier FROM raid_type ORDER BY raid_type_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn scales(&self) -> StoreResult<Vec<Scale>> {
        let scales =
            sqlx::query_as::<_, Scale>("SELECT scale_id, identifier, value FROM scale ORDER BY value")
                .fetch_all(&self.pool)
                .await?;
        Ok(scales)
    }

    async fn find_player_by_external_id(&self, external_id: i64) -> StoreResult<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(
            "SELECT player_id, external_id, name FROM player WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }

    #[instrument(level = "debug", skip(self))]
    async fn create_player(&self, external_id: i64, name: &str) -> StoreResult<Player> {
        sqlx::query_as::<_, Player>(
            "INSERT INTO player (external_id, name) VALUES ($1, $2) RETURNING player_id, external_id, name",
        )
        .bind(external_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "player.external_id"))
    }

    async fn rename_player(&self, player: PlayerId, name: &str) -> StoreResult<()> {
        sqlx::query("UPDATE player SET name = $2 WHERE player_id = $1")
            .bind(player)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn group_candidates(&self, player: PlayerId, size: usize) -> StoreResult<Vec<GroupId>> {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        let groups = sqlx::query_scalar::<_, GroupId>(
            r#"SELECT g.player_group_id
            FROM player_group g
            JOIN player_group_member m ON m.player_group_id = g.player_group_id
            WHERE m.player_id = $1 AND g.size = $2
            ORDER BY g.player_group_id"#,
        )
        .bind(player)
        .bind(size)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn group_member_ids(&self, group: GroupId) -> StoreResult<BTreeSet<PlayerId>> {
        let members = sqlx::query_scalar::<_, PlayerId>(
            "SELECT player_id FROM player_group_member WHERE player_group_id = $1",
        )
        .bind(group)
        .fetch_all(&self.pool)
        .await?;
        Ok(members.into_iter().collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn create_group(&self, members: &BTreeSet<PlayerId>) -> StoreResult<GroupId> {
        let mut tx = self.pool.begin().await?;
        let size = i32::try_from(members.len()).unwrap_or(i32::MAX);
        let group = sqlx::query_scalar::<_, GroupId>(
            "INSERT INTO player_group (member_key, size) VALUES ($1, $2) RETURNING player_group_id",
        )
        .bind(member_key(members))
        .bind(size)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_or_database(e, "player_group.member_key"))?;
        for player in members {
            sqlx::query("INSERT INTO player_group_member (player_group_id, player_id) VALUES ($1, $2)")
                .bind(group)
                .bind(*player)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(group)
    }

    async fn group_players(&self, group: GroupId) -> StoreResult<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(
            r#"SELECT p.player_id, p.external_id, p.name
            FROM player p
            JOIN player_group_member m ON m.player_id = p.player_id
            WHERE m.player_group_id = $1
            ORDER BY p.player_id"#,
        )
        .bind(group)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    async fn runs_matching(&self, filter: &RunFilter) -> StoreResult<Vec<Run>> {
        let sql = format!(
            r#"SELECT {RUN_COLUMNS} FROM speedrun_time
            WHERE raid_type_id = $1 AND scale_id = $2
              AND ($3::INTEGER IS NULL OR player_group_id = $3)
              AND ($4::INTEGER IS NULL OR player_group_id IN (
                    SELECT player_group_id FROM player_group_member WHERE player_id = $4))
              AND ($5::INTEGER IS NULL OR ticks = $5)
            ORDER BY run_id"#
        );
        let runs = sqlx::query_as::<_, Run>(&sql)
            .bind(filter.category)
            .bind(filter.scale)
            .bind(filter.group)
            .bind(filter.player)
            .bind(filter.ticks)
            .fetch_all(&self.pool)
            .await?;
        Ok(runs)
    }

    #[instrument(level = "debug", skip(self, new), fields(group = %new.group, ticks = new.ticks))]
    async fn insert_run(&self, new: &NewRun) -> StoreResult<Run> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            r#"INSERT INTO speedrun_time (raid_type_id, scale_id, player_group_id, ticks, screenshot)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RUN_COLUMNS}"#
        );
        let run = sqlx::query_as::<_, Run>(&sql)
            .bind(new.category)
            .bind(new.scale)
            .bind(new.group)
            .bind(new.ticks)
            .bind(new.screenshot.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_or_database(e, "speedrun_time.unique_run"))?;
        for (segment, ticks) in &new.segments {
            sqlx::query("INSERT INTO run_segment_time (run_id, segment, ticks) VALUES ($1, $2, $3)")
                .bind(run.run_id)
                .bind(segment.key())
                .bind(*ticks)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(run)
    }

    async fn run_segments(&self, run: RunId) -> StoreResult<SegmentTimes> {
        let rows = sqlx::query_as::<_, (String, Ticks)>(
            "SELECT segment, ticks FROM run_segment_time WHERE run_id = $1",
        )
        .bind(run)
        .fetch_all(&self.pool)
        .await?;
        Ok(parse_segment_rows(rows))
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_run(&self, run: RunId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM run_segment_time WHERE run_id = $1")
            .bind(run)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM speedrun_time WHERE run_id = $1")
            .bind(run)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted == 1)
    }

    async fn clear_screenshot(&self, run: RunId) -> StoreResult<()> {
        sqlx::query("UPDATE speedrun_time SET screenshot = NULL WHERE run_id = $1")
            .bind(run)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn segment_bests(
        &self,
        player: PlayerId,
        category: CategoryId,
        scale: ScaleId,
    ) -> StoreResult<Option<SegmentBestRecord>> {
        let rows = sqlx::query_as::<_, (String, Ticks)>(
            r#"SELECT segment, ticks FROM segment_best
            WHERE player_id = $1 AND raid_type_id = $2 AND scale_id = $3"#,
        )
        .bind(player)
        .bind(category)
        .bind(scale)
        .fetch_all(&self.pool)
        .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(SegmentBestRecord {
            player_id: player,
            raid_type_id: category,
            scale_id: scale,
            times: parse_segment_rows(rows),
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
        sqlx::query(
            r#"INSERT INTO segment_best (player_id, raid_type_id, scale_id, segment, ticks)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (player_id, raid_type_id, scale_id, segment) DO UPDATE
            SET ticks = LEAST(segment_best.ticks, EXCLUDED.ticks),
                updated_at = CASE WHEN EXCLUDED.ticks < segment_best.ticks
                                  THEN NOW() ELSE segment_best.updated_at END"#,
        )
        .bind(player)
        .bind(category)
        .bind(scale)
        .bind(segment.key())
        .bind(ticks)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
