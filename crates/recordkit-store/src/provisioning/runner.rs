//! Provisioning runner

#![allow(clippy::result_large_err)]

use crate::errors::{checksum_mismatch, from_rusqlite, provisioning_error, Result};
use crate::provisioning::checksums::compute_checksum;
use rusqlite::{Connection, OptionalExtension};

/// Ledger of applied initialization scripts
pub const LEDGER_TABLE: &str = "recordkit_provisioning";

/// What `apply_script` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Applied,
    AlreadyApplied,
}

/// Apply `sql` under `script_id` unless it was applied before
///
/// # Errors
///
/// `ConstraintViolation` if `script_id` was applied with different content;
/// `Persistence` if the script itself fails (nothing is recorded then)
pub fn apply_script(conn: &mut Connection, script_id: &str, sql: &str) -> Result<ProvisionOutcome> {
    create_ledger_table(conn)?;

    let checksum = compute_checksum(sql);
    let recorded: Option<String> = conn
        .query_row(
            &format!("SELECT checksum FROM {} WHERE script_id = ?1", LEDGER_TABLE),
            [script_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        if recorded != checksum {
            return Err(checksum_mismatch(script_id, &recorded, &checksum));
        }
        tracing::debug!(component = module_path!(), script_id, "script already applied");
        return Ok(ProvisionOutcome::AlreadyApplied);
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(sql)
        .map_err(|e| provisioning_error(script_id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        &format!(
            "INSERT INTO {} (script_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
            LEDGER_TABLE
        ),
        rusqlite::params![script_id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(component = module_path!(), script_id, "script applied");
    Ok(ProvisionOutcome::Applied)
}

/// Ids of applied scripts in application order
pub fn applied_scripts(conn: &Connection) -> Result<Vec<String>> {
    create_ledger_table(conn)?;
    let mut stmt = conn
        .prepare(&format!("SELECT script_id FROM {} ORDER BY id", LEDGER_TABLE))
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

fn create_ledger_table(conn: &Connection) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                script_id TEXT NOT NULL UNIQUE,
                applied_at INTEGER NOT NULL,
                checksum TEXT NOT NULL
            )",
            LEDGER_TABLE
        ),
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}
