//! Reads the room-time export copied from the in-game raid analytics overlay.
//!
//! The export is a run of `Name: value` fields, for example
//! `Tekton: 1:04.8 | Crabs: 0:45.0 | ... | Completed: 25:30.6 | Size: 3`.
//! Separators are optional: Discord folds line breaks into spaces, so a field
//! starts wherever a known `Name:` key does.
//! Fields the raid layout does not track are ignored. The result is complete
//! or it is an error; nothing is applied from a partial paste.

use crate::database::models::SegmentTimes;
use crate::error::{Result, SpeedrunError};
use crate::speedrun::catalog::{Segment, normalise_key};
use crate::timing::{Ticks, display_to_ticks};

const SIZE_KEYS: [&str; 3] = ["size", "teamsize", "partysize"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPaste {
    pub party_size: i32,
    pub completed: Ticks,
    /// Every room of the layout, `Completed` included.
    pub times: SegmentTimes,
}

fn malformed(reason: impl Into<String>) -> SpeedrunError {
    SpeedrunError::MalformedSegmentPaste(reason.into())
}

fn is_known_key(key: &str) -> bool {
    SIZE_KEYS.contains(&key) || key.parse::<Segment>().is_ok()
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == ' ' || c == '\t'
}

/// A key found in the paste, with the byte offsets of its first letter and
/// of its colon.
struct KeySpan {
    start: usize,
    colon: usize,
    key: String,
}

/// Finds the key that ends at the colon at byte `colon`, if any.
///
/// A key colon follows a letter; time colons follow digits. The letters and
/// spaces before it may also hold the tail of the previous value, so the
/// longest run of trailing words that names a known key wins, falling back to
/// the last word.
fn key_before(text: &str, colon: usize) -> Option<KeySpan> {
    let head = &text[..colon];
    if !head.trim_end().ends_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let region_start = head
        .char_indices()
        .rev()
        .find(|(_, c)| !is_key_char(*c))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let region = &head[region_start..];

    let mut words = Vec::new();
    let mut offset = 0;
    for word in region.split_whitespace() {
        let at = offset + region[offset..].find(word)?;
        words.push((region_start + at, word));
        offset = at + word.len();
    }

    let chosen = (0..words.len())
        .find(|first| {
            let joined: String = words[*first..].iter().map(|(_, w)| *w).collect();
            is_known_key(&normalise_key(&joined))
        })
        .unwrap_or(words.len().checked_sub(1)?);
    let joined: String = words[chosen..].iter().map(|(_, w)| *w).collect();
    Some(KeySpan {
        start: words[chosen].0,
        colon,
        key: normalise_key(&joined),
    })
}

/// Splits the paste into `(normalised key, value)` fields. Text before the
/// first key is ignored.
fn fields(text: &str) -> Vec<(String, &str)> {
    let keys: Vec<KeySpan> = text
        .match_indices(':')
        .filter_map(|(colon, _)| key_before(text, colon))
        .collect();

    keys.iter()
        .enumerate()
        .map(|(i, span)| {
            let end = keys.get(i + 1).map_or(text.len(), |next| next.start);
            let value = text[span.colon + 1..end]
                .trim_matches(|c: char| c.is_whitespace() || c == '|');
            (span.key.clone(), value)
        })
        .collect()
}

pub fn parse_segment_paste(layout: &[Segment], text: &str) -> Result<SegmentPaste> {
    let mut party_size = None;
    let mut times = SegmentTimes::new();

    for (key, value) in fields(text) {
        if SIZE_KEYS.contains(&key.as_str()) {
            let size = value
                .parse::<i32>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| malformed(format!("`{value}` is not a party size")))?;
            party_size = Some(size);
            continue;
        }

        let Ok(segment) = key.parse::<Segment>() else {
            continue;
        };
        if !layout.contains(&segment) {
            continue;
        }
        let ticks = display_to_ticks(value)
            .map_err(|_| malformed(format!("`{value}` is not a valid time for {segment}")))?;
        times.insert(segment, ticks);
    }

    let missing: Vec<&str> = layout
        .iter()
        .filter(|s| !times.contains_key(*s))
        .map(|s| s.label())
        .collect();
    if !missing.is_empty() {
        return Err(malformed(format!("missing {}", missing.join(", "))));
    }
    let party_size = party_size.ok_or_else(|| malformed("missing party size"))?;
    let completed = times
        .get(&Segment::Completed)
        .copied()
        .ok_or_else(|| malformed("missing Completed"))?;

    Ok(SegmentPaste {
        party_size,
        completed,
        times,
    })
}
