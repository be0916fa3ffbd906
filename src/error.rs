//! Error taxonomy shared by the store layer and the speedrun engine.

use thiserror::Error;

/// Failures raised by a [`crate::database::store::RecordStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write. The payload names the constraint.
    #[error("uniqueness constraint violated: {0}")]
    Conflict(&'static str),
}

/// Every way a submission or query can be rejected.
///
/// "Nothing found" is never an error here; lookups return `Option` instead.
#[derive(Debug, Error)]
pub enum SpeedrunError {
    #[error("The time submitted is not a possible in-game time.")]
    InvalidDuration,

    #[error("A group needs at least one player.")]
    InvalidGroup,

    #[error(
        "The number of runners submitted does not match the scale of the raid. Expected {expected}, got {got}."
    )]
    RunnerCountMismatch { expected: i32, got: usize },

    #[error("An identical raid time has already been submitted.")]
    DuplicateRun,

    #[error("The room times could not be read: {0}")]
    MalformedSegmentPaste(String),

    #[error("Unknown raid type `{0}`.")]
    UnknownCategory(String),

    #[error("Unknown scale {0}.")]
    UnknownScale(i32),

    #[error("{0} does not track room times.")]
    NotSegmentCapable(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SpeedrunError {
    /// True for rejections caused by the submitted input rather than by storage.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, SpeedrunError::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, SpeedrunError>;
