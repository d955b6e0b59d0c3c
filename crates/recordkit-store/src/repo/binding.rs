//! Named parameter binding, statement execution and row hydration

#![allow(clippy::result_large_err)]

use crate::errors::{anonymous_parameter, from_rusqlite, Result};
use recordkit_core::{Entity, FieldAccessError, FieldValue, RowValues};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Batch, Connection, Statement};

const PARAMETER_PREFIXES: &[char] = &[':', '@', '$'];

/// Outcome of running possibly several `;`-separated statements
#[derive(Debug, Default)]
pub(crate) struct Execution {
    /// Rows changed, summed over every statement
    pub affected: usize,
    /// First column of every row produced by a `RETURNING` clause
    pub returned: Vec<FieldValue>,
    /// Rowid of the first statement that inserted a rowid row
    pub inserted_rowid: Option<i64>,
}

impl Execution {
    /// The single identity value the insert produced, if there was one
    ///
    /// A `RETURNING` clause wins; otherwise the rowid of the first insert in
    /// the batch is used. Later inserts (audit rows and the like) never
    /// supply the identity.
    pub fn generated_identity(&self) -> Option<FieldValue> {
        match self.returned.as_slice() {
            [] => self.inserted_rowid.map(FieldValue::Integer),
            [value] => Some(value.clone()),
            _ => None,
        }
    }
}

/// Execute every statement in `sql`, binding parameters from `params`
pub(crate) fn execute_bound(
    conn: &Connection,
    sql: &str,
    params: &[(&'static str, FieldValue)],
    entity: &str,
) -> Result<Execution> {
    let mut execution = Execution::default();
    let mut batch = Batch::new(conn, sql);

    while let Some(mut stmt) = batch.next().map_err(from_rusqlite)? {
        bind_named(&mut stmt, params, entity)?;
        let rowid_before = conn.last_insert_rowid();

        if stmt.column_count() == 0 {
            let changed = stmt.raw_execute().map_err(from_rusqlite)?;
            execution.affected += changed;
            let rowid_after = conn.last_insert_rowid();
            if changed > 0 && rowid_after != rowid_before && execution.inserted_rowid.is_none() {
                execution.inserted_rowid = Some(rowid_after);
            }
            continue;
        }

        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next().map_err(from_rusqlite)? {
            execution.affected += 1;
            execution
                .returned
                .push(to_field_value(row.get_ref(0).map_err(from_rusqlite)?, "returning")?);
        }
    }

    Ok(execution)
}

/// Run a single query and hydrate every row into `E`
pub(crate) fn query_entities<E: Entity>(
    conn: &Connection,
    sql: &str,
    params: &[(&'static str, FieldValue)],
) -> Result<Vec<E>> {
    let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
    bind_named(&mut stmt, params, E::entity_name())?;

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut entities = Vec::new();
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next().map_err(from_rusqlite)? {
        let mut values = RowValues::new();
        for (index, column) in columns.iter().enumerate() {
            let value = row.get_ref(index).map_err(from_rusqlite)?;
            values.push(column.clone(), to_field_value(value, column)?);
        }
        entities.push(E::from_row(&values)?);
    }

    Ok(entities)
}

/// Bind every named parameter of `stmt` from `params`
///
/// Names match case-insensitively, without their `:`/`@`/`$` prefix.
fn bind_named(
    stmt: &mut Statement<'_>,
    params: &[(&'static str, FieldValue)],
    entity: &str,
) -> Result<()> {
    for index in 1..=stmt.parameter_count() {
        let name = match stmt.parameter_name(index) {
            Some(name) if !name.starts_with('?') => name.to_string(),
            _ => return Err(anonymous_parameter(entity, index)),
        };
        let field = name.trim_start_matches(PARAMETER_PREFIXES);

        let value = params
            .iter()
            .find(|(param, _)| param.eq_ignore_ascii_case(field))
            .map(|(_, value)| to_sql_value(value))
            .ok_or_else(|| FieldAccessError::missing(entity, field))?;

        stmt.raw_bind_parameter(index, value)
            .map_err(from_rusqlite)?;
    }
    Ok(())
}

fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(i) => Value::Integer(*i),
        FieldValue::Real(r) => Value::Real(*r),
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Bool(b) => Value::Integer(i64::from(*b)),
        FieldValue::Blob(b) => Value::Blob(b.clone()),
    }
}

fn to_field_value(value: ValueRef<'_>, column: &str) -> Result<FieldValue> {
    Ok(match value {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(i) => FieldValue::Integer(i),
        ValueRef::Real(r) => FieldValue::Real(r),
        ValueRef::Text(bytes) => FieldValue::Text(
            std::str::from_utf8(bytes)
                .map_err(|_| FieldAccessError::conversion(column, "text", "invalid utf-8"))?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => FieldValue::Blob(bytes.to_vec()),
    })
}
