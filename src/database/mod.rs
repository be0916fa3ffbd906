//! This module acts as a central hub for all database-related logic.
//! `store` defines the seam the engine talks to; `postgres` and `memory`
//! are its two implementations.

pub mod init;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use init::DbPool;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::RecordStore;
