//! Contains all the data structures that map to database tables or query results.

use crate::speedrun::catalog::Segment;
use crate::timing::Ticks;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
        #[sqlx(transparent)]
        pub struct $name(pub i32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(PlayerId);
id_type!(GroupId);
id_type!(RunId);
id_type!(CategoryId);
id_type!(ScaleId);

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub player_id: PlayerId,
    /// Discord user id.
    pub external_id: i64,
    pub name: String,
}

/// A raid type.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub raid_type_id: CategoryId,
    pub identifier: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    pub scale_id: ScaleId,
    pub identifier: String,
    /// Party size.
    pub value: i32,
}

/// One stored completion.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub run_id: RunId,
    pub raid_type_id: CategoryId,
    pub scale_id: ScaleId,
    pub player_group_id: GroupId,
    pub ticks: Ticks,
    pub screenshot: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

pub type SegmentTimes = BTreeMap<Segment, Ticks>;

/// A run about to be inserted, with its optional per-room detail.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub category: CategoryId,
    pub scale: ScaleId,
    pub group: GroupId,
    pub ticks: Ticks,
    pub screenshot: Option<String>,
    pub segments: SegmentTimes,
}

/// Predicate for [`crate::database::store::RecordStore::runs_matching`].
/// Category and scale are always required; the rest narrow the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunFilter {
    pub category: CategoryId,
    pub scale: ScaleId,
    pub group: Option<GroupId>,
    /// Matches runs whose group contains this player.
    pub player: Option<PlayerId>,
    pub ticks: Option<Ticks>,
}

impl RunFilter {
    pub fn board(category: CategoryId, scale: ScaleId) -> Self {
        Self {
            category,
            scale,
            group: None,
            player: None,
            ticks: None,
        }
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_ticks(mut self, ticks: Ticks) -> Self {
        self.ticks = Some(ticks);
        self
    }
}

/// Best-ever room times for one player at one scale of one raid type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentBestRecord {
    pub player_id: PlayerId,
    pub raid_type_id: CategoryId,
    pub scale_id: ScaleId,
    pub times: SegmentTimes,
}

impl SegmentBestRecord {
    pub fn empty(player_id: PlayerId, raid_type_id: CategoryId, scale_id: ScaleId) -> Self {
        Self {
            player_id,
            raid_type_id,
            scale_id,
            times: SegmentTimes::new(),
        }
    }

    pub fn get(&self, segment: Segment) -> Option<Ticks> {
        self.times.get(&segment).copied()
    }
}

/// Before/after values for a room whose best time improved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentImprovement {
    /// `None` when the room had no stored time yet.
    pub before: Option<Ticks>,
    pub after: Ticks,
}

pub type Improvements = BTreeMap<Segment, SegmentImprovement>;
