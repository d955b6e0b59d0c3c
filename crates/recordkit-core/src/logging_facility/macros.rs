//! Operation boundary macros
//!
//! Every repository and service operation emits one `start` event and
//! exactly one of `end` / `end_error`. Event names are resolved through this
//! crate, so callers need no direct dependency on `recordkit-core-types`.

#[doc(hidden)]
pub use recordkit_core_types::schema as __schema;

/// Log the start of an operation
///
/// ```
/// # use recordkit_core::log_op_start;
/// log_op_start!("create", entity = "Customer", identity = "sequential");
/// log_op_start!("find_where");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::macros::__schema::EVENT_START
            $(, $($field)*)?
        );
    }};
}

/// Log the end of an operation that produced a result, including logical
/// ERROR results
///
/// ```
/// # use recordkit_core::log_op_end;
/// log_op_end!("fetch", duration_ms = 3, entity = "Customer", status = "SUCCESS");
/// log_op_end!("find_where", duration_ms = 5, rows = 12u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::macros::__schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        );
    }};
}

/// Log an operation that failed sharply with an `ExError`
///
/// ```
/// # use recordkit_core::log_op_error;
/// # use recordkit_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Persistence)
///     .with_op("create")
///     .with_message("database is locked");
/// log_op_error!("create", &err, duration_ms = 10, entity = "Document");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let failure: &$crate::errors::ExError = $err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::macros::__schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?failure.kind(),
            err_code = failure.code(),
            message = failure.message()
            $(, $($field)*)?
        );
    }};
}
