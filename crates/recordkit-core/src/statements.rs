//! Per-entity SQL statement set
//!
//! The caller authors one parameterized statement per operation kind; the
//! set is validated once at build time and never changes afterwards.

use crate::errors::{ExError, ExErrorKind, Result};

/// The fixed set of repository operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Fetch,
    Update,
    Delete,
    Find,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Create,
        OperationKind::Fetch,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::Find,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Fetch => "fetch",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Find => "find",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable statement text for every operation of one entity type
///
/// Statements bind parameters by name (`:Field`, `@Field` or `$Field`).
/// UPDATE for a versioned entity is expected to flip the old row's current
/// flag and insert the next version; it may hold several `;`-separated
/// statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSet {
    create: String,
    fetch: String,
    update: String,
    delete: String,
    find: String,
}

impl StatementSet {
    pub fn builder() -> StatementSetBuilder {
        StatementSetBuilder::default()
    }

    pub fn create_statement(&self) -> &str {
        &self.create
    }

    pub fn fetch_statement(&self) -> &str {
        &self.fetch
    }

    pub fn update_statement(&self) -> &str {
        &self.update
    }

    pub fn delete_statement(&self) -> &str {
        &self.delete
    }

    pub fn find_statement(&self) -> &str {
        &self.find
    }

    pub fn statement(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Create => &self.create,
            OperationKind::Fetch => &self.fetch,
            OperationKind::Update => &self.update,
            OperationKind::Delete => &self.delete,
            OperationKind::Find => &self.find,
        }
    }
}

/// Builder for `StatementSet`; every kind must be supplied
#[derive(Debug, Clone, Default)]
pub struct StatementSetBuilder {
    create: Option<String>,
    fetch: Option<String>,
    update: Option<String>,
    delete: Option<String>,
    find: Option<String>,
}

impl StatementSetBuilder {
    pub fn create(mut self, sql: impl Into<String>) -> Self {
        self.create = Some(sql.into());
        self
    }

    pub fn fetch(mut self, sql: impl Into<String>) -> Self {
        self.fetch = Some(sql.into());
        self
    }

    pub fn update(mut self, sql: impl Into<String>) -> Self {
        self.update = Some(sql.into());
        self
    }

    pub fn delete(mut self, sql: impl Into<String>) -> Self {
        self.delete = Some(sql.into());
        self
    }

    pub fn find(mut self, sql: impl Into<String>) -> Self {
        self.find = Some(sql.into());
        self
    }

    /// # Errors
    ///
    /// `InvalidInput` naming the first operation kind that is missing or blank
    pub fn build(self) -> Result<StatementSet> {
        Ok(StatementSet {
            create: require(OperationKind::Create, self.create)?,
            fetch: require(OperationKind::Fetch, self.fetch)?,
            update: require(OperationKind::Update, self.update)?,
            delete: require(OperationKind::Delete, self.delete)?,
            find: require(OperationKind::Find, self.find)?,
        })
    }
}

fn require(kind: OperationKind, sql: Option<String>) -> Result<String> {
    match sql {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("build_statement_set")
            .with_message(format!("missing {} statement", kind))),
    }
}
