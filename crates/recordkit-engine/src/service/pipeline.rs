//! The three-stage service pipeline
//!
//! Every operation runs pre-work, then the repository call (work), then
//! post-work. A stage reporting ERROR stops the run; later stages keep their
//! `Information` placeholder. Repository `Err`s are passed through untouched.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use recordkit_core::{
    log_op_end, log_op_error, log_op_start, ActionResult, Entity, Repository, Result,
    ServiceResult,
};
use recordkit_core_types::schema::{EVENT_STAGE_FAILED, EVENT_STAGE_SKIPPED};
use recordkit_core_types::RequestId;

use super::hooks::{NoopHook, ServiceOperation, WorkHook};

#[derive(Debug, Clone, Copy)]
enum Stage {
    PreWork,
    Work,
    PostWork,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::PreWork => "pre_work",
            Stage::Work => "work",
            Stage::PostWork => "post_work",
        }
    }
}

/// Repository wrapper running injected hooks around each operation
///
/// ```no_run
/// # use recordkit_core::{ActionResult, Entity, Repository};
/// # use recordkit_engine::{Service, ServiceOperation};
/// # fn demo<E: Entity + 'static, R: Repository<E>>(repo: R, entity: E) -> recordkit_core::Result<()> {
/// let service = Service::new(repo)
///     .with_pre_work(|_: ServiceOperation, _: &E| -> ActionResult<E> { ActionResult::ok() });
/// let outcome = service.create(&entity)?;
/// if outcome.has_error() {
///     // inspect outcome.pre_work / outcome.work / outcome.post_work
/// }
/// # Ok(())
/// # }
/// ```
pub struct Service<E, R> {
    repository: R,
    pre_work: Box<dyn WorkHook<E>>,
    post_work: Box<dyn WorkHook<E>>,
}

impl<E, R> Service<E, R>
where
    E: Entity,
    R: Repository<E>,
{
    /// Service with no-op pre-work and post-work
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            pre_work: Box::new(NoopHook),
            post_work: Box::new(NoopHook),
        }
    }

    pub fn with_pre_work(mut self, hook: impl WorkHook<E> + 'static) -> Self {
        self.pre_work = Box::new(hook);
        self
    }

    pub fn with_post_work(mut self, hook: impl WorkHook<E> + 'static) -> Self {
        self.post_work = Box::new(hook);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// # Errors
    ///
    /// Propagates repository failures unchanged
    pub fn create(&self, entity: &E) -> Result<ServiceResult<E>> {
        self.run(ServiceOperation::Create, entity)
    }

    /// # Errors
    ///
    /// Propagates repository failures unchanged
    pub fn fetch(&self, entity: &E) -> Result<ServiceResult<E>> {
        self.run(ServiceOperation::Fetch, entity)
    }

    /// # Errors
    ///
    /// Propagates repository failures unchanged
    pub fn update(&self, entity: &E) -> Result<ServiceResult<E>> {
        self.run(ServiceOperation::Update, entity)
    }

    /// # Errors
    ///
    /// Propagates repository failures unchanged
    pub fn delete(&self, entity: &E) -> Result<ServiceResult<E>> {
        self.run(ServiceOperation::Delete, entity)
    }

    fn work(&self, op: ServiceOperation, entity: &E) -> Result<ActionResult<E>> {
        match op {
            ServiceOperation::Create => self.repository.create(entity),
            ServiceOperation::Fetch => self.repository.fetch(entity),
            ServiceOperation::Update => self.repository.update(entity),
            ServiceOperation::Delete => self.repository.delete(entity),
        }
    }

    fn run(&self, op: ServiceOperation, entity: &E) -> Result<ServiceResult<E>> {
        let request_id = RequestId::new();
        let span = tracing::info_span!(
            "service",
            request_id = %request_id,
            entity = E::entity_name()
        );
        let _enter = span.enter();

        let start = Instant::now();
        let name = op.log_name();
        log_op_start!(name, entity = E::entity_name());

        let mut result = ServiceResult::new();

        result.pre_work = self.pre_work.run(op, entity);
        if result.pre_work.is_error() {
            stage_failed(name, Stage::PreWork, &result.pre_work);
            stage_skipped(name, Stage::Work);
            stage_skipped(name, Stage::PostWork);
            return Ok(finish(name, start, result));
        }

        result.work = match self.work(op, entity) {
            Ok(work) => work,
            Err(err) => {
                log_op_error!(
                    name,
                    &err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    entity = E::entity_name()
                );
                return Err(err);
            }
        };
        if result.work.is_error() {
            stage_failed(name, Stage::Work, &result.work);
            stage_skipped(name, Stage::PostWork);
            return Ok(finish(name, start, result));
        }

        result.post_work = match result.work.entity() {
            Some(produced) => self.post_work.run(op, produced),
            None => self.post_work.run(op, entity),
        };
        if result.post_work.is_error() {
            stage_failed(name, Stage::PostWork, &result.post_work);
        }

        Ok(finish(name, start, result))
    }
}

fn finish<E>(name: &'static str, start: Instant, result: ServiceResult<E>) -> ServiceResult<E> {
    let status = result
        .first_error()
        .map(|stage| stage.status)
        .unwrap_or(result.work.status);
    log_op_end!(
        name,
        duration_ms = start.elapsed().as_millis() as u64,
        status = status.code()
    );
    result
}

fn stage_failed<E>(op: &'static str, stage: Stage, outcome: &ActionResult<E>) {
    tracing::warn!(
        component = module_path!(),
        op,
        event = EVENT_STAGE_FAILED,
        stage = stage.as_str(),
        err_code = outcome.fault.as_ref().map(|f| f.code()).unwrap_or_default(),
        message = outcome.message.as_str()
    );
}

fn stage_skipped(op: &'static str, stage: Stage) {
    tracing::info!(
        component = module_path!(),
        op,
        event = EVENT_STAGE_SKIPPED,
        stage = stage.as_str()
    );
}
