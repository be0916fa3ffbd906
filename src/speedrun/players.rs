//! Player lookups and lazy creation for submitted runners.

use crate::constants::MAX_PLAYER_NAME_LEN;
use crate::database::models::Player;
use crate::database::store::RecordStore;
use crate::error::{Result, StoreError};
use tracing::{debug, instrument};

/// A runner as named by the submitter: a Discord user id and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerIdentity {
    pub external_id: i64,
    pub name: String,
}

impl RunnerIdentity {
    pub fn new(external_id: i64, name: impl Into<String>) -> Self {
        Self {
            external_id,
            name: name.into(),
        }
    }

    fn stored_name(&self) -> String {
        self.name.chars().take(MAX_PLAYER_NAME_LEN).collect()
    }
}

/// Drops repeated external ids, keeping the first occurrence.
pub fn distinct_runners(runners: &[RunnerIdentity]) -> Vec<RunnerIdentity> {
    let mut seen = std::collections::HashSet::new();
    runners
        .iter()
        .filter(|r| seen.insert(r.external_id))
        .cloned()
        .collect()
}

/// Looks every player up without writing. `None` if any of them is unknown.
pub async fn find_all(store: &dyn RecordStore, external_ids: &[i64]) -> Result<Option<Vec<Player>>> {
    let mut players = Vec::with_capacity(external_ids.len());
    for external_id in external_ids {
        match store.find_player_by_external_id(*external_id).await? {
            Some(player) => players.push(player),
            None => return Ok(None),
        }
    }
    Ok(Some(players))
}

/// Creates unknown runners and refreshes changed display names.
#[instrument(level = "debug", skip(store, runners), fields(count = runners.len()))]
pub async fn upsert_players(
    store: &dyn RecordStore,
    runners: &[RunnerIdentity],
) -> Result<Vec<Player>> {
    let mut players = Vec::with_capacity(runners.len());
    for runner in runners {
        let name = runner.stored_name();
        let player = match store.find_player_by_external_id(runner.external_id).await? {
            Some(mut existing) => {
                if existing.name != name {
                    store.rename_player(existing.player_id, &name).await?;
                    existing.name = name;
                }
                existing
            }
            None => match store.create_player(runner.external_id, &name).await {
                Ok(created) => {
                    debug!(target: "speedrun.players", external_id = runner.external_id, "created player");
                    created
                }
                Err(StoreError::Conflict(c)) => store
                    .find_player_by_external_id(runner.external_id)
                    .await?
                    .ok_or(StoreError::Conflict(c))?,
                Err(e) => return Err(e.into()),
            },
        };
        players.push(player);
    }
    Ok(players)
}
