//! The repository protocol shared by every store implementation

use crate::errors::Result;
use crate::model::{ActionResult, Entity, QueryResult};

/// Create / Fetch / Update / Delete / FindWhere over one entity type
///
/// `Err` is reserved for failures of the store, the connection or the field
/// accessor. Expected outcomes such as "not found" or "stale version" come
/// back as `Ok` results with `ResultStatus::Error`.
pub trait Repository<E: Entity> {
    /// Insert `entity` with freshly assigned identity and return the stored row
    fn create(&self, entity: &E) -> Result<ActionResult<E>>;

    /// Load the single row matching the entity's identity
    fn fetch(&self, entity: &E) -> Result<ActionResult<E>>;

    /// Persist changes; returns the updated entity as a new value
    fn update(&self, entity: &E) -> Result<ActionResult<E>>;

    fn delete(&self, entity: &E) -> Result<ActionResult<E>>;

    /// Run the FIND statement followed by `filter`
    ///
    /// `filter` is concatenated verbatim and must not contain untrusted input.
    fn find_where(&self, filter: &str) -> Result<QueryResult<E>>;
}
