//! The run-record and personal-best engine.
//!
//! Every operation here takes the store handle explicitly and performs one
//! request-scoped unit of work. Nothing runs in the background.

pub mod catalog;
pub mod groups;
pub mod leaderboard;
pub mod paste;
pub mod players;
pub mod room_pbs;
pub mod runs;
pub mod submission;
