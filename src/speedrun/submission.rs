//! The submission pipeline: validate, resolve players and group, store the
//! run and, for room-tracked raids, update every runner's room bests.
//!
//! All validation, including the duplicate lookup, happens before the first
//! write, so a rejected submission leaves the store untouched. A room-time
//! paste that repeats a stored run is the exception: it stores no run but
//! still applies the room bests, so a batch that failed halfway can be resent.

use super::catalog::segment_layout;
use super::paste::parse_segment_paste;
use super::players::{RunnerIdentity, distinct_runners, find_all, upsert_players};
use super::{groups, room_pbs, runs};
use crate::database::models::{Category, Improvements, NewRun, Player, Run, Scale, SegmentTimes};
use crate::database::store::RecordStore;
use crate::error::{Result, SpeedrunError};
use crate::timing::{GameTime, Ticks};
use tracing::{info, instrument};

/// A run submitted as a single completion time.
#[derive(Debug, Clone)]
pub struct TimedSubmission {
    pub category: String,
    /// Party size.
    pub scale: i32,
    pub runners: Vec<RunnerIdentity>,
    pub time: GameTime,
    pub screenshot: Option<String>,
}

/// A run submitted as a room-time paste. The party size comes from the paste.
#[derive(Debug, Clone)]
pub struct SegmentSubmission {
    pub category: String,
    pub runners: Vec<RunnerIdentity>,
    pub paste: String,
}

#[derive(Debug, Clone)]
pub struct SubmittedRun {
    pub run: Run,
    pub category: Category,
    pub scale: Scale,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone)]
pub struct SegmentRunOutcome {
    pub submitted: SubmittedRun,
    /// Rooms that improved, per runner. Runners without improvements are included
    /// with an empty map.
    pub improvements: Vec<(Player, Improvements)>,
    /// The run was already stored; `submitted.run` is the existing one.
    pub duplicate: bool,
}

/// Looks up the raid type by name and the scale by party size.
pub async fn resolve_reference(
    store: &dyn RecordStore,
    category: &str,
    scale: i32,
) -> Result<(Category, Scale)> {
    let category = store
        .category_by_identifier(category)
        .await?
        .ok_or_else(|| SpeedrunError::UnknownCategory(category.to_string()))?;
    let scale = store
        .scale_by_value(scale)
        .await?
        .ok_or(SpeedrunError::UnknownScale(scale))?;
    Ok((category, scale))
}

/// Checked before any group is resolved.
fn check_runner_count(scale: &Scale, runners: &[RunnerIdentity]) -> Result<Vec<RunnerIdentity>> {
    let distinct = distinct_runners(runners);
    if distinct.is_empty() {
        return Err(SpeedrunError::InvalidGroup);
    }
    if i32::try_from(distinct.len()).ok() != Some(scale.value) {
        return Err(SpeedrunError::RunnerCountMismatch {
            expected: scale.value,
            got: distinct.len(),
        });
    }
    Ok(distinct)
}

/// Read-only duplicate lookup. Only possible when the players and their group exist.
/// Returns the stored run with its players in runner order.
async fn find_duplicate(
    store: &dyn RecordStore,
    category: &Category,
    scale: &Scale,
    runners: &[RunnerIdentity],
    ticks: Ticks,
) -> Result<Option<(Run, Vec<Player>)>> {
    let external_ids: Vec<i64> = runners.iter().map(|r| r.external_id).collect();
    let Some(players) = find_all(store, &external_ids).await? else {
        return Ok(None);
    };
    let members = players.iter().map(|p| p.player_id).collect();
    let Some(group) = groups::find_group(store, &members).await? else {
        return Ok(None);
    };
    let run =
        runs::find_exact_run(store, category.raid_type_id, scale.scale_id, group, ticks).await?;
    Ok(run.map(|run| (run, players)))
}

async fn store_run(
    store: &dyn RecordStore,
    category: Category,
    scale: Scale,
    runners: &[RunnerIdentity],
    ticks: Ticks,
    screenshot: Option<String>,
    segments: SegmentTimes,
) -> Result<SubmittedRun> {
    let players = upsert_players(store, runners).await?;
    let group = groups::resolve_or_create(store, players.iter().map(|p| p.player_id)).await?;
    let new = NewRun {
        category: category.raid_type_id,
        scale: scale.scale_id,
        group,
        ticks,
        screenshot,
        segments,
    };
    let run = runs::submit_new(store, &new).await?;
    Ok(SubmittedRun {
        run,
        category,
        scale,
        players,
    })
}

#[instrument(level = "debug", skip(store, submission), fields(category = %submission.category, scale = submission.scale))]
pub async fn submit_timed_run(
    store: &dyn RecordStore,
    submission: &TimedSubmission,
) -> Result<SubmittedRun> {
    let ticks = submission.time.to_ticks()?;
    let (category, scale) =
        resolve_reference(store, &submission.category, submission.scale).await?;
    let runners = check_runner_count(&scale, &submission.runners)?;
    if find_duplicate(store, &category, &scale, &runners, ticks).await?.is_some() {
        return Err(SpeedrunError::DuplicateRun);
    }

    let submitted = store_run(
        store,
        category,
        scale,
        &runners,
        ticks,
        submission.screenshot.clone(),
        SegmentTimes::new(),
    )
    .await?;
    info!(target: "speedrun.submit", run = %submitted.run.run_id, ticks, "timed run submitted");
    Ok(submitted)
}

#[instrument(level = "debug", skip(store, submission), fields(category = %submission.category))]
pub async fn submit_segment_run(
    store: &dyn RecordStore,
    submission: &SegmentSubmission,
) -> Result<SegmentRunOutcome> {
    let layout = segment_layout(&submission.category)
        .ok_or_else(|| SpeedrunError::NotSegmentCapable(submission.category.clone()))?;
    let paste = parse_segment_paste(layout, &submission.paste)?;
    let (category, scale) =
        resolve_reference(store, &submission.category, paste.party_size).await?;
    let runners = check_runner_count(&scale, &submission.runners)?;
    let existing = find_duplicate(store, &category, &scale, &runners, paste.completed).await?;
    let duplicate = existing.is_some();

    let submitted = match existing {
        Some((run, players)) => {
            info!(
                target: "speedrun.submit",
                run = %run.run_id,
                "run already stored, reapplying room bests"
            );
            SubmittedRun {
                run,
                category,
                scale,
                players,
            }
        }
        None => {
            store_run(
                store,
                category,
                scale,
                &runners,
                paste.completed,
                None,
                paste.times.clone(),
            )
            .await?
        }
    };
    let improvements = room_pbs::update_for_players(
        store,
        &submitted.players,
        &submitted.category,
        &submitted.scale,
        &paste.times,
    )
    .await?;
    info!(
        target: "speedrun.submit",
        run = %submitted.run.run_id,
        ticks = paste.completed,
        improved = improvements.iter().filter(|(_, i)| !i.is_empty()).count(),
        duplicate,
        "room run submitted"
    );
    Ok(SegmentRunOutcome {
        submitted,
        improvements,
        duplicate,
    })
}

/// Deletes the exact run (raid type, scale, players, time) if it exists.
/// Returns the removed run. Lookup only: unknown players or groups mean "not found".
#[instrument(level = "debug", skip(store))]
pub async fn delete_submitted_run(
    store: &dyn RecordStore,
    category: &str,
    scale: i32,
    external_ids: &[i64],
    time: GameTime,
) -> Result<Option<Run>> {
    let ticks = time.to_ticks()?;
    let (category, scale) = resolve_reference(store, category, scale).await?;
    let Some(players) = find_all(store, external_ids).await? else {
        return Ok(None);
    };
    let members = players.iter().map(|p| p.player_id).collect();
    let Some(group) = groups::find_group(store, &members).await? else {
        return Ok(None);
    };
    let Some(run) =
        runs::find_exact_run(store, category.raid_type_id, scale.scale_id, group, ticks).await?
    else {
        return Ok(None);
    };
    if runs::delete_run(store, run.run_id).await? {
        Ok(Some(run))
    } else {
        Ok(None)
    }
}
