// Library entry so integration tests and the binary share the same modules.
pub mod attachments;
pub mod commands;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handler;
pub mod model;
pub mod speedrun;
pub mod timing;
pub mod ui;

pub use model::AppState;
