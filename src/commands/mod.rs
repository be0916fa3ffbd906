//! Slash commands. Each command module exposes `register` and `run_slash`.

pub mod delete_run;
pub mod leaderboards;
pub mod options;
pub mod pb;
pub mod room_pbs;
pub mod runners;
pub mod submit_clipboard;
pub mod submit_run;

use serenity::builder::CreateCommand;

pub const COMMAND_NAMES: [&str; 6] = [
    "submit_run",
    "delete_run",
    "leaderboards",
    "pb",
    "submit_from_clipboard",
    "room_pbs",
];

/// Every command registered on the guild.
pub fn register_all() -> Vec<CreateCommand> {
    vec![
        submit_run::register(),
        delete_run::register(),
        leaderboards::register(),
        pb::register(),
        submit_clipboard::register(),
        room_pbs::register(),
    ]
}
