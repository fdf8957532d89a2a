//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - groups(id, name)
//! - curricula(id, name)
//! - sciences(id, name)
//! - students(id, name, group_id, curriculum_id, science_id)

pub mod gateway;
pub mod schema;
pub mod seed;

pub use gateway::{StoreConfig, StoreGateway};
pub use seed::{SeedData, seed_reference_data};

#[cfg(test)]
pub(crate) mod testing;
