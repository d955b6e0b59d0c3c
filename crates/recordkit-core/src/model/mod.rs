pub mod entity;
pub mod result;
pub mod value;

pub use entity::{Entity, FieldAccess};
pub use result::{ActionResult, QueryResult, ResultStatus, ServiceResult};
pub use value::{FieldValue, RowValues};
