//! Static reference data: raid types, scales and the rooms tracked for each raid.
//!
//! The migration seeds the same identifiers into Postgres, and the in-memory
//! store seeds itself from these tables.

use crate::database::store::RecordStore;
use std::fmt;
use std::str::FromStr;

pub const CHAMBERS_OF_XERIC: &str = "Chambers of Xeric";
pub const CHAMBERS_OF_XERIC_CM: &str = "Chambers of Xeric: Challenge Mode";
pub const THEATRE_OF_BLOOD: &str = "Theatre of Blood";
pub const THEATRE_OF_BLOOD_HM: &str = "Theatre of Blood: Hard Mode";
pub const TOMBS_OF_AMASCUT_EXPERT: &str = "Tombs of Amascut: Expert Mode";

pub const CATEGORIES: [&str; 5] = [
    CHAMBERS_OF_XERIC,
    CHAMBERS_OF_XERIC_CM,
    THEATRE_OF_BLOOD,
    THEATRE_OF_BLOOD_HM,
    TOMBS_OF_AMASCUT_EXPERT,
];

/// (party size, label)
pub const SCALES: [(i32, &str); 5] = [
    (1, "Solo"),
    (2, "Duo"),
    (3, "Trio"),
    (4, "4-man"),
    (5, "5-man"),
];

/// A named room or phase with its own tracked best time.
///
/// `Completed` is the whole-raid aggregate and is part of every layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Tekton,
    Crabs,
    IceDemon,
    Shamans,
    Vanguards,
    Thieving,
    Vespula,
    Tightrope,
    Guardians,
    Vasa,
    Mystics,
    Muttadiles,
    Olm,
    Maiden,
    Bloat,
    Nylocas,
    Sotetseg,
    Xarpus,
    Verzik,
    Completed,
}

const CHAMBERS_CM_LAYOUT: &[Segment] = &[
    Segment::Tekton,
    Segment::Crabs,
    Segment::IceDemon,
    Segment::Shamans,
    Segment::Vanguards,
    Segment::Thieving,
    Segment::Vespula,
    Segment::Tightrope,
    Segment::Guardians,
    Segment::Vasa,
    Segment::Mystics,
    Segment::Muttadiles,
    Segment::Olm,
    Segment::Completed,
];

const THEATRE_LAYOUT: &[Segment] = &[
    Segment::Maiden,
    Segment::Bloat,
    Segment::Nylocas,
    Segment::Sotetseg,
    Segment::Xarpus,
    Segment::Verzik,
    Segment::Completed,
];

/// Rooms tracked for a raid type, or `None` when the raid only records totals.
pub fn segment_layout(category_identifier: &str) -> Option<&'static [Segment]> {
    match category_identifier {
        CHAMBERS_OF_XERIC_CM => Some(CHAMBERS_CM_LAYOUT),
        THEATRE_OF_BLOOD | THEATRE_OF_BLOOD_HM => Some(THEATRE_LAYOUT),
        _ => None,
    }
}

/// Raid types that accept room time submissions.
pub fn segment_capable_categories() -> impl Iterator<Item = &'static str> {
    CATEGORIES
        .into_iter()
        .filter(|c| segment_layout(c).is_some())
}

/// Lower-cases and strips everything but letters and digits, so that
/// `"Ice Demon"`, `"ice demon"` and `"IceDemon"` all compare equal.
pub fn normalise_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Segment {
    /// Stable storage key.
    pub fn key(&self) -> &'static str {
        match self {
            Segment::Tekton => "tekton",
            Segment::Crabs => "crabs",
            Segment::IceDemon => "icedemon",
            Segment::Shamans => "shamans",
            Segment::Vanguards => "vanguards",
            Segment::Thieving => "thieving",
            Segment::Vespula => "vespula",
            Segment::Tightrope => "tightrope",
            Segment::Guardians => "guardians",
            Segment::Vasa => "vasa",
            Segment::Mystics => "mystics",
            Segment::Muttadiles => "muttadiles",
            Segment::Olm => "olm",
            Segment::Maiden => "maiden",
            Segment::Bloat => "bloat",
            Segment::Nylocas => "nylocas",
            Segment::Sotetseg => "sotetseg",
            Segment::Xarpus => "xarpus",
            Segment::Verzik => "verzik",
            Segment::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::IceDemon => "Ice Demon",
            Segment::Completed => "Completed",
            Segment::Tekton => "Tekton",
            Segment::Crabs => "Crabs",
            Segment::Shamans => "Shamans",
            Segment::Vanguards => "Vanguards",
            Segment::Thieving => "Thieving",
            Segment::Vespula => "Vespula",
            Segment::Tightrope => "Tightrope",
            Segment::Guardians => "Guardians",
            Segment::Vasa => "Vasa",
            Segment::Mystics => "Mystics",
            Segment::Muttadiles => "Muttadiles",
            Segment::Olm => "Olm",
            Segment::Maiden => "Maiden",
            Segment::Bloat => "Bloat",
            Segment::Nylocas => "Nylocas",
            Segment::Sotetseg => "Sotetseg",
            Segment::Xarpus => "Xarpus",
            Segment::Verzik => "Verzik",
        }
    }
}

impl FromStr for Segment {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_key(s).as_str() {
            "tekton" => Ok(Segment::Tekton),
            "crabs" => Ok(Segment::Crabs),
            "icedemon" => Ok(Segment::IceDemon),
            "shamans" => Ok(Segment::Shamans),
            "vanguards" => Ok(Segment::Vanguards),
            "thieving" => Ok(Segment::Thieving),
            "vespula" => Ok(Segment::Vespula),
            "tightrope" => Ok(Segment::Tightrope),
            "guardians" => Ok(Segment::Guardians),
            "vasa" => Ok(Segment::Vasa),
            "mystics" => Ok(Segment::Mystics),
            "muttadiles" => Ok(Segment::Muttadiles),
            "olm" => Ok(Segment::Olm),
            "maiden" => Ok(Segment::Maiden),
            "bloat" => Ok(Segment::Bloat),
            "nylocas" | "nylo" => Ok(Segment::Nylocas),
            "sotetseg" | "sote" => Ok(Segment::Sotetseg),
            "xarpus" => Ok(Segment::Xarpus),
            "verzik" => Ok(Segment::Verzik),
            "completed" => Ok(Segment::Completed),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog raid types and scales that the store does not know about.
pub async fn missing_reference_data(
    store: &dyn RecordStore,
) -> crate::error::Result<Vec<String>> {
    let categories = store.categories().await?;
    let scales = store.scales().await?;
    let mut missing: Vec<String> = CATEGORIES
        .iter()
        .filter(|name| !categories.iter().any(|c| c.identifier == **name))
        .map(|name| name.to_string())
        .collect();
    missing.extend(
        SCALES
            .iter()
            .filter(|(value, _)| !scales.iter().any(|s| s.value == *value))
            .map(|(_, label)| format!("scale {label}")),
    );
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_ends_with_completed() {
        for category in segment_capable_categories() {
            let layout = segment_layout(category).unwrap();
            assert_eq!(layout.last(), Some(&Segment::Completed), "{category}");
        }
    }

    #[test]
    fn keys_parse_back_to_the_same_segment() {
        for layout in [CHAMBERS_CM_LAYOUT, THEATRE_LAYOUT] {
            for segment in layout {
                assert_eq!(segment.key().parse::<Segment>(), Ok(*segment));
                assert_eq!(segment.label().parse::<Segment>(), Ok(*segment));
            }
        }
    }

    #[test]
    fn only_room_tracked_raids_have_layouts() {
        assert!(segment_layout(CHAMBERS_OF_XERIC).is_none());
        assert!(segment_layout(TOMBS_OF_AMASCUT_EXPERT).is_none());
        assert_eq!(segment_capable_categories().count(), 3);
    }
}
