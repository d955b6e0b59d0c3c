//! RecordKit Store - SQLite-backed generic repository
//!
//! Provides:
//! - `ConnectionProvider` and its SQLite implementation configured from
//!   named properties
//! - Provisioning: applying an initialization script once, with checksums
//! - `SqliteRepository`: the Create/Fetch/Update/Delete/FindWhere engine for
//!   every identity strategy

pub mod db;
pub mod errors;
pub mod provisioning;
pub mod repo;

pub use db::{ConnectionProvider, ProviderProperties, SqliteConnectionProvider};
pub use errors::Result;
pub use provisioning::ProvisionOutcome;
pub use repo::SqliteRepository;
