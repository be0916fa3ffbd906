//! Storing, finding and deleting completed runs.

use crate::database::models::{
    CategoryId, GroupId, NewRun, PlayerId, Run, RunFilter, RunId, ScaleId,
};
use crate::database::store::RecordStore;
use crate::error::{Result, SpeedrunError, StoreError};
use crate::timing::Ticks;
use tracing::{info, instrument};

/// Whose personal best to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbSubject {
    /// The exact group of players.
    Group(GroupId),
    /// Any group the player has run with.
    Player(PlayerId),
}

/// Stores a run for a group, rejecting an exact repeat of a stored one.
pub async fn submit(
    store: &dyn RecordStore,
    category: CategoryId,
    scale: ScaleId,
    group: GroupId,
    ticks: Ticks,
    screenshot: Option<String>,
) -> Result<Run> {
    let run = NewRun {
        category,
        scale,
        group,
        ticks,
        screenshot,
        segments: Default::default(),
    };
    submit_new(store, &run).await
}

/// [`submit`] for a run that may carry per-room detail.
#[instrument(level = "debug", skip(store, run), fields(category = %run.category, scale = %run.scale, group = %run.group, ticks = run.ticks))]
pub async fn submit_new(store: &dyn RecordStore, run: &NewRun) -> Result<Run> {
    if find_exact_run(store, run.category, run.scale, run.group, run.ticks)
        .await?
        .is_some()
    {
        return Err(SpeedrunError::DuplicateRun);
    }
    match store.insert_run(run).await {
        Ok(stored) => {
            info!(target: "speedrun.runs", run = %stored.run_id, ticks = stored.ticks, "run stored");
            Ok(stored)
        }
        // The constraint is the real guard; the lookup above only answers early.
        Err(StoreError::Conflict(_)) => Err(SpeedrunError::DuplicateRun),
        Err(e) => Err(e.into()),
    }
}

pub async fn find_exact_run(
    store: &dyn RecordStore,
    category: CategoryId,
    scale: ScaleId,
    group: GroupId,
    ticks: Ticks,
) -> Result<Option<Run>> {
    let filter = RunFilter::board(category, scale)
        .with_group(group)
        .with_ticks(ticks);
    Ok(store.runs_matching(&filter).await?.into_iter().next())
}

/// The fastest run for the subject, earliest first on equal times.
/// `None` simply means no run has been stored yet.
pub async fn find_personal_best(
    store: &dyn RecordStore,
    category: CategoryId,
    scale: ScaleId,
    subject: PbSubject,
) -> Result<Option<Run>> {
    let filter = match subject {
        PbSubject::Group(group) => RunFilter::board(category, scale).with_group(group),
        PbSubject::Player(player) => RunFilter::board(category, scale).with_player(player),
    };
    let runs = store.runs_matching(&filter).await?;
    Ok(runs.into_iter().min_by_key(|r| (r.ticks, r.run_id)))
}

/// Removes a run and its room detail. Returns false if it was already gone.
#[instrument(level = "debug", skip(store))]
pub async fn delete_run(store: &dyn RecordStore, run: RunId) -> Result<bool> {
    let deleted = store.delete_run(run).await?;
    if deleted {
        info!(target: "speedrun.runs", %run, "run deleted");
    }
    Ok(deleted)
}

/// Clears the screenshot reference when the stored file no longer exists.
/// Called by the display layer before showing a run.
pub async fn sync_screenshot(
    store: &dyn RecordStore,
    mut run: Run,
    exists: impl Fn(&str) -> bool,
) -> Result<Run> {
    let stale = run.screenshot.as_deref().is_some_and(|name| !exists(name));
    if stale {
        store.clear_screenshot(run.run_id).await?;
        info!(target: "speedrun.runs", run = %run.run_id, "pruned missing screenshot reference");
        run.screenshot = None;
    }
    Ok(run)
}
