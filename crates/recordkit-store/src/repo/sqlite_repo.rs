//! SQLite repository implementation
//!
//! One engine for all three identity strategies. Each operation opens its
//! own connection through the provider and drops it before returning.

#![allow(clippy::result_large_err)]

use std::marker::PhantomData;
use std::time::Instant;

use crate::db::ConnectionProvider;
use crate::errors::{from_rusqlite, Result};
use crate::repo::binding::{execute_bound, query_entities};
use recordkit_core::{
    log_op_end, log_op_error, log_op_start, ActionResult, Entity, ExError, ExErrorKind,
    FieldValue, IdentityStrategy, OperationKind, QueryResult, Repository, ResultStatus,
    StatementSet,
};
use rusqlite::{Connection, TransactionBehavior};

/// Generic repository over entity type `E`
///
/// ```no_run
/// # use recordkit_store::{SqliteConnectionProvider, SqliteRepository};
/// # use recordkit_core::{Repository, StatementSet};
/// # fn demo<E: recordkit_core::Entity>(entity: E) -> recordkit_store::Result<()> {
/// let provider = SqliteConnectionProvider::for_path("/var/lib/app/records.db")?;
/// let statements = StatementSet::builder()
///     .create("INSERT INTO Customer (Name) VALUES (:Name)")
///     .fetch("SELECT * FROM Customer WHERE CustomerId = :CustomerId")
///     .update("UPDATE Customer SET Name = :Name WHERE CustomerId = :CustomerId")
///     .delete("DELETE FROM Customer WHERE CustomerId = :CustomerId")
///     .find("SELECT * FROM Customer")
///     .build()?;
/// let repo = SqliteRepository::<E, _>::new(provider, statements);
/// let created = repo.create(&entity)?;
/// # Ok(())
/// # }
/// ```
pub struct SqliteRepository<E, P> {
    provider: P,
    statements: StatementSet,
    identity: IdentityStrategy,
    _entity: PhantomData<fn() -> E>,
}

/// Result of the guarded write half of a versioned update
enum VersionedWrite<E> {
    Written(usize),
    Rejected(ActionResult<E>),
}

impl<E: Entity, P: ConnectionProvider> SqliteRepository<E, P> {
    /// Repository using the identity strategy declared by `E`
    pub fn new(provider: P, statements: StatementSet) -> Self {
        Self::with_identity(provider, statements, E::identity())
    }

    pub fn with_identity(provider: P, statements: StatementSet, identity: IdentityStrategy) -> Self {
        Self {
            provider,
            statements,
            identity,
            _entity: PhantomData,
        }
    }

    pub fn identity(&self) -> &IdentityStrategy {
        &self.identity
    }

    pub fn statements(&self) -> &StatementSet {
        &self.statements
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn fault(&self, kind: ExErrorKind, op: OperationKind, message: impl Into<String>) -> ExError {
        ExError::new(kind)
            .with_op(op.as_str())
            .with_entity(E::entity_name())
            .with_message(message)
    }

    fn identity_missing(&self, entity: E, message: impl Into<String>) -> ActionResult<E> {
        ActionResult::failed(self.fault(ExErrorKind::MissingIdentity, OperationKind::Create, message))
            .with_entity(entity)
    }

    fn create_inner(&self, entity: &E) -> Result<ActionResult<E>> {
        let mut prepared = self.identity.prepare_create(entity)?;

        let execution = {
            let conn = self.provider.connect()?;
            execute_bound(
                &conn,
                self.statements.create_statement(),
                &prepared.to_params(),
                E::entity_name(),
            )?
        };

        if let IdentityStrategy::OpaqueKey { .. } = self.identity {
            // The key was assigned before the insert; only the write needs confirming
            let written = match execution.returned.as_slice() {
                [] => execution.affected >= 1,
                [value] => is_positive_identity(value),
                _ => false,
            };
            if !written {
                return Ok(self.identity_missing(
                    prepared,
                    "insert did not write the keyed record",
                ));
            }
        } else {
            let id = match execution.generated_identity() {
                Some(value) if is_positive_identity(&value) => value.as_i64("generated identity")?,
                Some(value) => {
                    let message = format!("insert returned a non-positive identity {:?}", value);
                    return Ok(self.identity_missing(prepared, message));
                }
                None => {
                    return Ok(self.identity_missing(
                        prepared,
                        "insert did not return exactly one generated identity",
                    ));
                }
            };
            self.identity.assign_generated_id(&mut prepared, id)?;
        }

        let fetched = self.fetch_inner(&prepared)?;
        if fetched.is_success() {
            return Ok(fetched.with_message("record created"));
        }

        let mut fault = self.fault(
            ExErrorKind::NotFound,
            OperationKind::Create,
            format!(
                "unable to fetch created record {}",
                self.identity.describe(&prepared)
            ),
        );
        if let Some(cause) = fetched.fault {
            fault = fault.with_source(cause);
        }
        Ok(ActionResult::failed(fault).with_entity(prepared))
    }

    fn fetch_inner(&self, entity: &E) -> Result<ActionResult<E>> {
        let conn = self.provider.connect()?;
        self.fetch_with(&conn, entity)
    }

    /// Fetch on a connection the caller already holds
    fn fetch_with(&self, conn: &Connection, entity: &E) -> Result<ActionResult<E>> {
        let matches: Vec<E> =
            query_entities(conn, self.statements.fetch_statement(), &entity.to_params())?;
        let count = matches.len();

        let result = match matches.into_iter().next() {
            None => ActionResult::failed(self.fault(
                ExErrorKind::NotFound,
                OperationKind::Fetch,
                format!("record not found: {}", self.identity.describe(entity)),
            )),
            Some(first) if count == 1 => ActionResult::success(first),
            Some(first) => ActionResult::failed(self.fault(
                ExErrorKind::AmbiguousSelection,
                OperationKind::Fetch,
                format!(
                    "ambiguous fetch: {} records matched {}",
                    count,
                    self.identity.describe(entity)
                ),
            ))
            .with_entity(first),
        };
        Ok(result)
    }

    fn update_inner(&self, entity: &E) -> Result<ActionResult<E>> {
        if self.identity.is_versioned() {
            return self.update_versioned(entity);
        }

        let affected = {
            let conn = self.provider.connect()?;
            execute_bound(
                &conn,
                self.statements.update_statement(),
                &entity.to_params(),
                E::entity_name(),
            )?
            .affected
        };

        match affected {
            0 => Ok(ActionResult::failed(self.fault(
                ExErrorKind::NoRowsAffected,
                OperationKind::Update,
                format!("update failed: no rows affected for {}", self.identity.describe(entity)),
            ))
            .with_entity(entity.clone())),
            1 => {
                let fetched = self.fetch_inner(entity)?;
                if fetched.is_success() {
                    return Ok(fetched.with_message("record updated"));
                }
                let mut fault = self.fault(
                    ExErrorKind::NotFound,
                    OperationKind::Update,
                    "updated record could not be fetched",
                );
                if let Some(cause) = fetched.fault {
                    fault = fault.with_source(cause);
                }
                Ok(ActionResult::failed(fault).with_entity(entity.clone()))
            }
            n => {
                let fetched = self.fetch_inner(entity)?;
                let confirmed = fetched.into_entity().unwrap_or_else(|| entity.clone());
                Ok(ActionResult::failed(self.fault(
                    ExErrorKind::AmbiguousMutation,
                    OperationKind::Update,
                    format!("ambiguous update: {} rows affected", n),
                ))
                .with_entity(confirmed))
            }
        }
    }

    /// Versioned update: staleness check and write in one immediate
    /// transaction, then confirm the new version row exists
    fn update_versioned(&self, entity: &E) -> Result<ActionResult<E>> {
        match self.write_next_version(entity)? {
            VersionedWrite::Rejected(result) => Ok(result),
            VersionedWrite::Written(affected) => {
                tracing::debug!(
                    component = module_path!(),
                    entity = E::entity_name(),
                    rows = affected,
                    "version row written"
                );

                let next = self.identity.next_version(entity)?;
                let fetched = self.fetch_inner(&next)?;
                if fetched.is_success() {
                    let version = self
                        .identity
                        .version(&next)?
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    return Ok(fetched.with_message(format!("record advanced to version {}", version)));
                }

                let mut fault = self.fault(
                    ExErrorKind::NotFound,
                    OperationKind::Update,
                    format!(
                        "unable to find new record version {}",
                        self.identity.describe(&next)
                    ),
                );
                if let Some(cause) = fetched.fault {
                    fault = fault.with_source(cause);
                }
                Ok(ActionResult::failed(fault).with_entity(next))
            }
        }
    }

    fn write_next_version(&self, entity: &E) -> Result<VersionedWrite<E>> {
        let mut conn = self.provider.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        let existing = self.fetch_with(&tx, entity)?;
        let stored = match existing.status {
            ResultStatus::Success => existing.entity,
            _ if existing.fault_kind() == Some(ExErrorKind::NotFound) => {
                return Ok(VersionedWrite::Rejected(
                    ActionResult::failed(self.fault(
                        ExErrorKind::NotFound,
                        OperationKind::Update,
                        format!("record not found: {}", self.identity.describe(entity)),
                    ))
                    .with_entity(entity.clone()),
                ));
            }
            _ => return Ok(VersionedWrite::Rejected(existing)),
        };
        let Some(stored) = stored else {
            return Err(self.fault(
                ExErrorKind::Internal,
                OperationKind::Update,
                "successful fetch returned no entity",
            ));
        };

        let same_version = self.identity.version(&stored)? == self.identity.version(entity)?;
        if !self.identity.is_current(&stored)? || !same_version {
            return Ok(VersionedWrite::Rejected(
                ActionResult::failed(self.fault(
                    ExErrorKind::StaleVersion,
                    OperationKind::Update,
                    format!(
                        "record version is not current: {}",
                        self.identity.describe(entity)
                    ),
                ))
                .with_entity(stored),
            ));
        }

        let affected = execute_bound(
            &tx,
            self.statements.update_statement(),
            &entity.to_params(),
            E::entity_name(),
        )?
        .affected;

        if affected == 0 {
            return Ok(VersionedWrite::Rejected(
                ActionResult::failed(self.fault(
                    ExErrorKind::NoRowsAffected,
                    OperationKind::Update,
                    format!("update failed: no rows affected for {}", self.identity.describe(entity)),
                ))
                .with_entity(entity.clone()),
            ));
        }

        tx.commit().map_err(from_rusqlite)?;
        Ok(VersionedWrite::Written(affected))
    }

    fn delete_inner(&self, entity: &E) -> Result<ActionResult<E>> {
        let affected = {
            let conn = self.provider.connect()?;
            execute_bound(
                &conn,
                self.statements.delete_statement(),
                &entity.to_params(),
                E::entity_name(),
            )?
            .affected
        };

        let result = match affected {
            1 => ActionResult::success(entity.clone()).with_message("record deleted"),
            0 => ActionResult::failed(self.fault(
                ExErrorKind::NoRowsAffected,
                OperationKind::Delete,
                format!("no record deleted for {}", self.identity.describe(entity)),
            ))
            .with_entity(entity.clone()),
            n => ActionResult::failed(self.fault(
                ExErrorKind::AmbiguousMutation,
                OperationKind::Delete,
                format!("ambiguous delete: {} rows affected", n),
            ))
            .with_entity(entity.clone()),
        };
        Ok(result)
    }

    fn find_where_inner(&self, filter: &str) -> Result<QueryResult<E>> {
        let find = self.statements.find_statement();
        let filter = filter.trim();
        let sql = if filter.is_empty() {
            find.to_string()
        } else {
            format!("{} {}", find, filter)
        };

        let conn = self.provider.connect()?;
        let entities: Vec<E> = query_entities(&conn, &sql, &[])?;
        if entities.is_empty() {
            return Ok(QueryResult::no_records("no records found"));
        }
        let count = entities.len();
        let mut result = QueryResult::success(entities);
        result.message = format!("{} records found", count);
        Ok(result)
    }
}

impl<E: Entity, P: ConnectionProvider> Repository<E> for SqliteRepository<E, P> {
    fn create(&self, entity: &E) -> Result<ActionResult<E>> {
        let start = Instant::now();
        log_op_start!("create", entity = E::entity_name(), identity = self.identity.name());
        finish_action("create", start, self.create_inner(entity))
    }

    fn fetch(&self, entity: &E) -> Result<ActionResult<E>> {
        let start = Instant::now();
        log_op_start!("fetch", entity = E::entity_name());
        finish_action("fetch", start, self.fetch_inner(entity))
    }

    fn update(&self, entity: &E) -> Result<ActionResult<E>> {
        let start = Instant::now();
        log_op_start!("update", entity = E::entity_name(), identity = self.identity.name());
        finish_action("update", start, self.update_inner(entity))
    }

    fn delete(&self, entity: &E) -> Result<ActionResult<E>> {
        let start = Instant::now();
        log_op_start!("delete", entity = E::entity_name());
        finish_action("delete", start, self.delete_inner(entity))
    }

    fn find_where(&self, filter: &str) -> Result<QueryResult<E>> {
        let start = Instant::now();
        log_op_start!("find_where", entity = E::entity_name());
        let result = self.find_where_inner(filter);
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(query) => {
                log_op_end!(
                    "find_where",
                    duration_ms = duration_ms,
                    entity = E::entity_name(),
                    status = query.status.code(),
                    rows = query.len() as u64
                );
            }
            Err(err) => {
                log_op_error!("find_where", err, duration_ms = duration_ms, entity = E::entity_name());
            }
        }
        result
    }
}

/// Emit the end (or end_error) event of a single-entity operation
fn finish_action<E: Entity>(
    op: &'static str,
    start: Instant,
    result: Result<ActionResult<E>>,
) -> Result<ActionResult<E>> {
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(action) => {
            if action.is_error() {
                tracing::warn!(
                    component = module_path!(),
                    op,
                    entity = E::entity_name(),
                    err_code = action.fault.as_ref().map(ExError::code).unwrap_or_default(),
                    message = action.message.as_str(),
                    "operation reported error"
                );
            }
            log_op_end!(
                op,
                duration_ms = duration_ms,
                entity = E::entity_name(),
                status = action.status.code()
            );
        }
        Err(err) => {
            log_op_error!(op, err, duration_ms = duration_ms, entity = E::entity_name());
        }
    }
    result
}

fn is_positive_identity(value: &FieldValue) -> bool {
    match value {
        FieldValue::Integer(i) => *i > 0,
        FieldValue::Real(r) => *r > 0.0,
        FieldValue::Text(s) => !s.is_empty(),
        _ => false,
    }
}
