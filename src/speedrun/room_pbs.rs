//! Per-player best room times.
//!
//! Stored values only ever go down. Each improved room is written on its own
//! and the write is idempotent, so an interrupted update leaves every room it
//! already wrote intact and can simply be retried.

use crate::database::models::{
    Category, Improvements, Player, PlayerId, Scale, SegmentBestRecord, SegmentImprovement,
    SegmentTimes,
};
use crate::database::store::RecordStore;
use crate::error::Result;
use crate::speedrun::catalog::segment_layout;
use tracing::{debug, instrument, warn};

/// Rooms in `submitted` that beat the record, or that the record lacks.
/// Equal or slower times are not improvements.
pub fn compute_improvements(record: &SegmentBestRecord, submitted: &SegmentTimes) -> Improvements {
    submitted
        .iter()
        .filter_map(|(&segment, &new)| {
            let before = record.get(segment);
            match before {
                Some(old) if new >= old => None,
                _ => Some((segment, SegmentImprovement { before, after: new })),
            }
        })
        .collect()
}

/// Applies a submission to one player's record and reports what improved.
#[instrument(
    level = "debug",
    skip(store, player, category, scale, submitted),
    fields(player = %player, category = %category.identifier, scale = scale.value)
)]
pub async fn update(
    store: &dyn RecordStore,
    player: PlayerId,
    category: &Category,
    scale: &Scale,
    submitted: &SegmentTimes,
) -> Result<Improvements> {
    let layout = segment_layout(&category.identifier).unwrap_or_default();
    let tracked: SegmentTimes = submitted
        .iter()
        .filter(|(segment, _)| {
            let known = layout.contains(segment);
            if !known {
                warn!(target: "speedrun.room_pbs", %segment, category = %category.identifier, "ignoring room outside the raid layout");
            }
            known
        })
        .map(|(s, t)| (*s, *t))
        .collect();

    let record = store
        .segment_bests(player, category.raid_type_id, scale.scale_id)
        .await?
        .unwrap_or_else(|| SegmentBestRecord::empty(player, category.raid_type_id, scale.scale_id));
    let improvements = compute_improvements(&record, &tracked);

    for (segment, change) in &improvements {
        store
            .store_segment_best(player, category.raid_type_id, scale.scale_id, *segment, change.after)
            .await?;
    }
    debug!(target: "speedrun.room_pbs", improved = improvements.len(), "room bests updated");
    Ok(improvements)
}

/// Updates each runner in turn. A failure stops the batch but leaves the
/// players already processed untouched by it.
pub async fn update_for_players(
    store: &dyn RecordStore,
    players: &[Player],
    category: &Category,
    scale: &Scale,
    submitted: &SegmentTimes,
) -> Result<Vec<(Player, Improvements)>> {
    let mut results = Vec::with_capacity(players.len());
    for player in players {
        let improvements = update(store, player.player_id, category, scale, submitted).await?;
        results.push((player.clone(), improvements));
    }
    Ok(results)
}

pub async fn current_bests(
    store: &dyn RecordStore,
    player: PlayerId,
    category: &Category,
    scale: &Scale,
) -> Result<Option<SegmentBestRecord>> {
    Ok(store
        .segment_bests(player, category.raid_type_id, scale.scale_id)
        .await?)
}
