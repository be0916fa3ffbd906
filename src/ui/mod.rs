//! Presentation helpers shared by the slash commands.

pub mod embeds;
