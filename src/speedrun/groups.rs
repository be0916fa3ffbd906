//! Resolves a set of players to the stable identity of exactly that set.

use crate::database::models::{GroupId, PlayerId};
use crate::database::store::RecordStore;
use crate::error::{Result, SpeedrunError, StoreError};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Canonical form of a member set: sorted ids joined by `,`.
/// Backs the `player_group.member_key` uniqueness constraint.
pub fn member_key(members: &BTreeSet<PlayerId>) -> String {
    members
        .iter()
        .map(|id| id.0.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Finds the group whose membership is exactly `members`. Read only.
#[instrument(level = "debug", skip(store))]
pub async fn find_group(
    store: &dyn RecordStore,
    members: &BTreeSet<PlayerId>,
) -> Result<Option<GroupId>> {
    let Some(anchor) = members.first() else {
        return Err(SpeedrunError::InvalidGroup);
    };
    // Same size and containing one member narrows the field; set equality decides.
    for candidate in store.group_candidates(*anchor, members.len()).await? {
        if store.group_member_ids(candidate).await? == *members {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Returns the group for exactly these players, creating it on first use.
/// The order in which players are supplied never matters.
#[instrument(level = "debug", skip(store, players))]
pub async fn resolve_or_create<I>(store: &dyn RecordStore, players: I) -> Result<GroupId>
where
    I: IntoIterator<Item = PlayerId>,
{
    let members: BTreeSet<PlayerId> = players.into_iter().collect();
    if let Some(existing) = find_group(store, &members).await? {
        return Ok(existing);
    }
    match store.create_group(&members).await {
        Ok(group) => {
            debug!(target: "speedrun.groups", %group, key = %member_key(&members), "created group");
            Ok(group)
        }
        // Another request created the same group between our lookup and insert.
        Err(StoreError::Conflict(_)) => find_group(store, &members)
            .await?
            .ok_or(SpeedrunError::Store(StoreError::Conflict("player_group.member_key"))),
        Err(e) => Err(e.into()),
    }
}
