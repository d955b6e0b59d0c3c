//! RecordKit Core - entity, identity and result model
//!
//! The storage-agnostic half of the record-access layer:
//! - `Entity` and `FieldAccess`: how the generic repository sees a record type
//! - `IdentityStrategy`: sequential, opaque-key and versioned identities
//! - `StatementSet`: caller-authored SQL per operation kind
//! - `ActionResult` / `QueryResult` / `ServiceResult`: operation outcomes
//! - `Repository`: the operation protocol implemented by the store
//! - error and logging facilities shared by every crate

pub mod errors;
pub mod identity;
pub mod logging_facility;
pub mod model;
pub mod repository;
pub mod statements;

pub use errors::{ExError, ExErrorKind, FieldAccessError, Result};
pub use identity::{IdentityStrategy, VersionedFields};
pub use model::{
    ActionResult, Entity, FieldAccess, FieldValue, QueryResult, ResultStatus, RowValues,
    ServiceResult,
};
pub use repository::Repository;
pub use statements::{OperationKind, StatementSet, StatementSetBuilder};
