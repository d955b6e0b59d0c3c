//! Stage hooks injected into a `Service`

use recordkit_core::ActionResult;

/// The repository operation a pipeline run wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceOperation {
    Create,
    Fetch,
    Update,
    Delete,
}

impl ServiceOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceOperation::Create => "create",
            ServiceOperation::Fetch => "fetch",
            ServiceOperation::Update => "update",
            ServiceOperation::Delete => "delete",
        }
    }

    /// Operation name used in service-level log events
    pub fn log_name(&self) -> &'static str {
        match self {
            ServiceOperation::Create => "service_create",
            ServiceOperation::Fetch => "service_fetch",
            ServiceOperation::Update => "service_update",
            ServiceOperation::Delete => "service_delete",
        }
    }
}

impl std::fmt::Display for ServiceOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work run before or after the repository call
///
/// A hook reports its outcome as an `ActionResult`; an ERROR from pre-work
/// stops the pipeline before the repository is touched.
///
/// Any `Fn(ServiceOperation, &E) -> ActionResult<E>` closure is a hook:
///
/// ```
/// use recordkit_core::ActionResult;
/// use recordkit_engine::{ServiceOperation, WorkHook};
///
/// let reject_deletes = |op: ServiceOperation, _: &String| -> ActionResult<String> {
///     match op {
///         ServiceOperation::Delete => ActionResult::error("deletes are disabled"),
///         _ => ActionResult::ok(),
///     }
/// };
/// assert!(reject_deletes.run(ServiceOperation::Delete, &"x".to_string()).is_error());
/// assert!(reject_deletes.run(ServiceOperation::Fetch, &"x".to_string()).is_success());
/// ```
pub trait WorkHook<E>: Send + Sync {
    fn run(&self, op: ServiceOperation, entity: &E) -> ActionResult<E>;
}

impl<E, F> WorkHook<E> for F
where
    F: Fn(ServiceOperation, &E) -> ActionResult<E> + Send + Sync,
{
    fn run(&self, op: ServiceOperation, entity: &E) -> ActionResult<E> {
        self(op, entity)
    }
}

/// Always succeeds (the default pre-work and post-work).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl<E> WorkHook<E> for NoopHook {
    fn run(&self, _: ServiceOperation, _: &E) -> ActionResult<E> {
        ActionResult::ok()
    }
}
