//! Repository layer
//!
//! Generic over the entity type: statements come from the entity's
//! `StatementSet`, parameters are bound by name from `Entity::to_params`,
//! and rows are hydrated through `Entity::from_row`.

mod binding;
pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepository;
