//! Fastest run per distinct group for a raid type and scale.

use crate::database::models::{CategoryId, GroupId, Player, Run, RunFilter, ScaleId};
use crate::database::store::RecordStore;
use crate::error::Result;
use std::collections::HashMap;
use tracing::instrument;

/// A leaderboard row with the group's players resolved for display.
#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub run: Run,
    pub players: Vec<Player>,
}

/// Keeps each group's fastest run, sorts ascending by ticks and truncates.
///
/// `runs` must be in creation order. Equal times keep the earlier run, both
/// within a group and across groups, so the result is deterministic.
pub fn fastest_per_group(runs: Vec<Run>, limit: usize) -> Vec<Run> {
    let mut best: HashMap<GroupId, Run> = HashMap::new();
    for run in runs {
        let faster = best
            .get(&run.player_group_id)
            .is_none_or(|current| (run.ticks, run.run_id) < (current.ticks, current.run_id));
        if faster {
            best.insert(run.player_group_id, run);
        }
    }
    let mut board: Vec<Run> = best.into_values().collect();
    board.sort_by_key(|r| (r.ticks, r.run_id));
    board.truncate(limit);
    board
}

#[instrument(level = "debug", skip(store))]
pub async fn top(
    store: &dyn RecordStore,
    category: CategoryId,
    scale: ScaleId,
    limit: usize,
) -> Result<Vec<Run>> {
    let runs = store
        .runs_matching(&RunFilter::board(category, scale))
        .await?;
    Ok(fastest_per_group(runs, limit))
}

/// [`top`] with each entry's players looked up.
pub async fn top_with_players(
    store: &dyn RecordStore,
    category: CategoryId,
    scale: ScaleId,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>> {
    let runs = top(store, category, scale, limit).await?;
    let mut entries = Vec::with_capacity(runs.len());
    for (index, run) in runs.into_iter().enumerate() {
        let players = store.group_players(run.player_group_id).await?;
        entries.push(LeaderboardEntry {
            rank: index + 1,
            run,
            players,
        });
    }
    Ok(entries)
}
