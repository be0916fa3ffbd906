// Central constants for timing, display and query limits.

/// Real seconds per game tick.
pub const TICK_SECONDS: f64 = 0.6;
/// Slack allowed when checking that a duration is a whole number of ticks.
pub const DURATION_TOLERANCE: f64 = 1e-9;
/// Rendered in place of a time that has not been recorded.
pub const MISSING_TIME: &str = "N/A";

pub const LEADERBOARD_LIMIT: usize = 10;
pub const EMBED_COLOUR: u32 = 0xc1005d;
pub const MAX_PLAYER_NAME_LEN: usize = 32;
