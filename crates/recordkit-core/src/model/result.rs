//! Outcome containers returned by the repository and service layers
//!
//! Results carry *logical* outcomes (found, not found, stale, ...). Failures
//! of the store itself are raised as `Err(ExError)` and never appear here.

use serde::{Deserialize, Serialize};

use crate::errors::{ExError, ExErrorKind};

/// Status of an operation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultStatus {
    Success,
    Error,
    /// Placeholder before an operation completes, and for skipped stages
    Information,
    /// A query matched nothing; distinct from a failure
    NoRecords,
}

impl ResultStatus {
    /// Stable code used in log events
    pub fn code(&self) -> &'static str {
        match self {
            ResultStatus::Success => "SUCCESS",
            ResultStatus::Error => "ERROR",
            ResultStatus::Information => "INFORMATION",
            ResultStatus::NoRecords => "NO_RECORDS",
        }
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of a single-entity operation
#[derive(Debug, Clone)]
pub struct ActionResult<E> {
    pub entity: Option<E>,
    pub status: ResultStatus,
    pub message: String,
    /// The classified cause of an ERROR outcome
    pub fault: Option<ExError>,
}

impl<E> ActionResult<E> {
    /// A fresh result in the `Information` state
    pub fn new() -> Self {
        Self {
            entity: None,
            status: ResultStatus::Information,
            message: String::new(),
            fault: None,
        }
    }

    pub fn success(entity: E) -> Self {
        Self {
            entity: Some(entity),
            status: ResultStatus::Success,
            message: String::new(),
            fault: None,
        }
    }

    /// Success that carries no entity, as returned by no-op hooks
    pub fn ok() -> Self {
        Self {
            status: ResultStatus::Success,
            ..Self::new()
        }
    }

    /// An ERROR outcome without a classified fault
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            entity: None,
            status: ResultStatus::Error,
            message: message.into(),
            fault: None,
        }
    }

    /// An ERROR outcome whose message comes from `fault`
    pub fn failed(fault: ExError) -> Self {
        Self {
            entity: None,
            status: ResultStatus::Error,
            message: fault.message().to_string(),
            fault: Some(fault),
        }
    }

    pub fn with_entity(mut self, entity: E) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == ResultStatus::Error
    }

    /// Kind of the attached fault, if any
    pub fn fault_kind(&self) -> Option<ExErrorKind> {
        self.fault.as_ref().map(ExError::kind)
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    pub fn into_entity(self) -> Option<E> {
        self.entity
    }
}

impl<E> Default for ActionResult<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a multi-entity query
#[derive(Debug, Clone)]
pub struct QueryResult<E> {
    pub entities: Vec<E>,
    pub status: ResultStatus,
    pub message: String,
}

impl<E> QueryResult<E> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            status: ResultStatus::Information,
            message: String::new(),
        }
    }

    pub fn success(entities: Vec<E>) -> Self {
        Self {
            entities,
            status: ResultStatus::Success,
            message: String::new(),
        }
    }

    pub fn no_records(message: impl Into<String>) -> Self {
        Self {
            entities: Vec::new(),
            status: ResultStatus::NoRecords,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            entities: Vec::new(),
            status: ResultStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<E> Default for QueryResult<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate outcome of one pre-work / work / post-work pipeline run
///
/// Stages that never ran keep their `Information` placeholder.
#[derive(Debug, Clone)]
pub struct ServiceResult<E> {
    pub pre_work: ActionResult<E>,
    pub work: ActionResult<E>,
    pub post_work: ActionResult<E>,
}

impl<E> ServiceResult<E> {
    pub fn new() -> Self {
        Self {
            pre_work: ActionResult::new(),
            work: ActionResult::new(),
            post_work: ActionResult::new(),
        }
    }

    /// True if any of the three stages reported ERROR
    pub fn has_error(&self) -> bool {
        self.stages().iter().any(|stage| stage.is_error())
    }

    /// The earliest stage that reported ERROR
    pub fn first_error(&self) -> Option<&ActionResult<E>> {
        self.stages().into_iter().find(|stage| stage.is_error())
    }

    /// Entity produced by the work stage
    pub fn entity(&self) -> Option<&E> {
        self.work.entity()
    }

    fn stages(&self) -> [&ActionResult<E>; 3] {
        [&self.pre_work, &self.work, &self.post_work]
    }
}

impl<E> Default for ServiceResult<E> {
    fn default() -> Self {
        Self::new()
    }
}
