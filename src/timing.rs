//! Conversion between human entered times and game ticks.
//!
//! The game clock advances in ticks of 0.6 seconds and every stored duration
//! is a whole number of ticks. Internally the helpers work in integer tenths
//! and hundredths of a second so that conversions in both directions round the
//! same way (half up) and round-trip exactly.

use crate::constants::{DURATION_TOLERANCE, MISSING_TIME, TICK_SECONDS};
use crate::error::{Result, SpeedrunError};

pub type Ticks = i32;

const TENTHS_PER_TICK: i64 = 6;
const CENTIS_PER_TICK: i64 = 60;

/// A duration as entered by a player: minutes, seconds and tenths of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTime {
    pub minutes: u32,
    pub seconds: u32,
    pub tenths: u32,
}

impl GameTime {
    pub fn new(minutes: u32, seconds: u32, tenths: u32) -> Self {
        Self {
            minutes,
            seconds,
            tenths,
        }
    }

    pub fn total_seconds(&self) -> f64 {
        f64::from(self.minutes) * 60.0 + f64::from(self.seconds) + f64::from(self.tenths) / 10.0
    }

    /// Validates the components and converts them to ticks.
    pub fn to_ticks(&self) -> Result<Ticks> {
        if self.seconds >= 60 || self.tenths >= 10 || !is_valid_duration(self.total_seconds()) {
            return Err(SpeedrunError::InvalidDuration);
        }
        Ok(ticks_from_components(self.minutes, self.seconds, self.tenths))
    }
}

fn div_round_half_up(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

fn clamp_ticks(value: i64) -> Ticks {
    Ticks::try_from(value).unwrap_or(Ticks::MAX)
}

/// Converts a duration to the nearest whole tick. Does not validate.
pub fn ticks_from_components(minutes: u32, seconds: u32, tenths: u32) -> Ticks {
    let total_tenths = i64::from(minutes) * 600 + i64::from(seconds) * 10 + i64::from(tenths);
    clamp_ticks(div_round_half_up(total_tenths, TENTHS_PER_TICK))
}

/// Splits a tick count back into minutes, seconds and tenths.
pub fn components_from_ticks(ticks: Ticks) -> GameTime {
    let total_tenths = i64::from(ticks.max(0)) * TENTHS_PER_TICK;
    GameTime {
        minutes: (total_tenths / 600) as u32,
        seconds: ((total_tenths % 600) / 10) as u32,
        tenths: (total_tenths % 10) as u32,
    }
}

/// A duration is only reachable in game if it is a whole number of ticks.
pub fn is_valid_duration(total_seconds: f64) -> bool {
    if !total_seconds.is_finite() || total_seconds < 0.0 {
        return false;
    }
    let ticks = total_seconds / TICK_SECONDS;
    (ticks - ticks.round()).abs() < DURATION_TOLERANCE
}

/// Renders ticks as `MM:SS.CC`. An absent value renders as `N/A`.
pub fn ticks_to_display(ticks: impl Into<Option<Ticks>>) -> String {
    let Some(ticks) = ticks.into() else {
        return MISSING_TIME.to_string();
    };
    if ticks < 0 {
        return MISSING_TIME.to_string();
    }
    let centis = i64::from(ticks) * CENTIS_PER_TICK;
    format!(
        "{:02}:{:02}.{:02}",
        centis / 6000,
        (centis % 6000) / 100,
        centis % 100
    )
}

/// Parses `[H:]M:SS[.f]` or `SS[.f]` (one or two fractional digits) into ticks.
pub fn display_to_ticks(text: &str) -> Result<Ticks> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(SpeedrunError::InvalidDuration);
    }

    let (seconds_part, leading) = parts.split_last().ok_or(SpeedrunError::InvalidDuration)?;
    let (whole, fraction) = match seconds_part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (*seconds_part, None),
    };

    let seconds = parse_digits(whole)?;
    if !leading.is_empty() && seconds >= 60 {
        return Err(SpeedrunError::InvalidDuration);
    }
    let fraction_centis = match fraction {
        None => 0,
        Some(f) if f.len() == 1 => parse_digits(f)? * 10,
        Some(f) if f.len() == 2 => parse_digits(f)?,
        Some(_) => return Err(SpeedrunError::InvalidDuration),
    };

    let mut total_minutes = 0_i64;
    for (index, part) in leading.iter().enumerate() {
        let value = parse_digits(part)?;
        // Minutes sit under an hour field when one is present.
        if leading.len() == 2 && index == 1 && value >= 60 {
            return Err(SpeedrunError::InvalidDuration);
        }
        total_minutes = total_minutes * 60 + value;
    }

    let centis = (total_minutes * 60 + seconds) * 100 + fraction_centis;
    Ok(clamp_ticks(div_round_half_up(centis, CENTIS_PER_TICK)))
}

fn parse_digits(s: &str) -> Result<i64> {
    if s.is_empty() || s.len() > 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SpeedrunError::InvalidDuration);
    }
    s.parse().map_err(|_| SpeedrunError::InvalidDuration)
}
