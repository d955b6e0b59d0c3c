//! Shared fixtures: one entity per identity strategy and a provisioned
//! database file in a scratch directory

#![allow(dead_code)]

use recordkit_core::{
    Entity, FieldAccess, FieldAccessError, FieldValue, IdentityStrategy, RowValues, StatementSet,
};
use recordkit_store::{ConnectionProvider, SqliteConnectionProvider, SqliteRepository};
use std::path::PathBuf;
use tempfile::TempDir;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// A provisioned database that lives as long as this value
pub struct TestDb {
    pub dir: TempDir,
    pub provider: SqliteConnectionProvider,
}

impl TestDb {
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("records.db")
    }

    pub fn count(&self, sql: &str) -> i64 {
        let conn = self.provider.connect().unwrap();
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }
}

pub fn setup_db() -> TestDb {
    let dir = TempDir::new().unwrap();
    let provider = SqliteConnectionProvider::for_path(dir.path().join("records.db"))
        .unwrap()
        .with_init_script(fixtures_dir().join("init.sql"));
    provider.create_database().unwrap();
    TestDb { dir, provider }
}

// --- Customer: sequential identity ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customer {
    pub customer_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
}

impl Customer {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

impl FieldAccess for Customer {
    fn get_field(&self, name: &str) -> Result<FieldValue, FieldAccessError> {
        match name {
            "CustomerId" => Ok(self.customer_id.into()),
            _ => Err(FieldAccessError::missing("Customer", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldAccessError> {
        match name {
            "CustomerId" => self.customer_id = value.as_opt_i64(name)?,
            _ => return Err(FieldAccessError::missing("Customer", name)),
        }
        Ok(())
    }
}

impl Entity for Customer {
    fn entity_name() -> &'static str {
        "Customer"
    }

    fn identity() -> IdentityStrategy {
        IdentityStrategy::sequential_for("Customer")
    }

    fn to_params(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("CustomerId", self.customer_id.into()),
            ("Name", self.name.as_str().into()),
            ("Email", self.email.clone().into()),
        ]
    }

    fn from_row(row: &RowValues) -> Result<Self, FieldAccessError> {
        Ok(Customer {
            customer_id: row.get_opt_i64("CustomerId")?,
            name: row.get_text("Name")?,
            email: row.get_opt_text("Email")?,
        })
    }
}

pub fn customer_statements() -> StatementSet {
    StatementSet::builder()
        .create("INSERT INTO Customer (Name, Email) VALUES (:Name, :Email)")
        .fetch("SELECT CustomerId, Name, Email FROM Customer WHERE CustomerId = :CustomerId")
        .update("UPDATE Customer SET Name = :Name, Email = :Email WHERE CustomerId = :CustomerId")
        .delete("DELETE FROM Customer WHERE CustomerId = :CustomerId")
        .find("SELECT CustomerId, Name, Email FROM Customer")
        .build()
        .unwrap()
}

pub fn customer_repo(db: &TestDb) -> SqliteRepository<Customer, &SqliteConnectionProvider> {
    SqliteRepository::new(&db.provider, customer_statements())
}

// --- Document: opaque key identity ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub document_guid: Option<String>,
    pub title: String,
    pub body: String,
}

impl Document {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

impl FieldAccess for Document {
    fn get_field(&self, name: &str) -> Result<FieldValue, FieldAccessError> {
        match name {
            "DocumentGuid" => Ok(self.document_guid.clone().into()),
            _ => Err(FieldAccessError::missing("Document", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldAccessError> {
        match name {
            "DocumentGuid" => self.document_guid = value.as_opt_text(name)?,
            _ => return Err(FieldAccessError::missing("Document", name)),
        }
        Ok(())
    }
}

impl Entity for Document {
    fn entity_name() -> &'static str {
        "Document"
    }

    fn identity() -> IdentityStrategy {
        IdentityStrategy::opaque_key_for("Document")
    }

    fn to_params(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("DocumentGuid", self.document_guid.clone().into()),
            ("Title", self.title.as_str().into()),
            ("Body", self.body.as_str().into()),
        ]
    }

    fn from_row(row: &RowValues) -> Result<Self, FieldAccessError> {
        Ok(Document {
            document_guid: row.get_opt_text("DocumentGuid")?,
            title: row.get_text("Title")?,
            body: row.get_text("Body")?,
        })
    }
}

pub fn document_statements() -> StatementSet {
    StatementSet::builder()
        .create("INSERT INTO Document (DocumentGuid, Title, Body) VALUES (@DocumentGuid, @Title, @Body)")
        .fetch("SELECT * FROM Document WHERE DocumentGuid = @DocumentGuid")
        .update("UPDATE Document SET Title = @Title, Body = @Body WHERE DocumentGuid = @DocumentGuid")
        .delete("DELETE FROM Document WHERE DocumentGuid = @DocumentGuid")
        .find("SELECT * FROM Document")
        .build()
        .unwrap()
}

pub fn document_repo(db: &TestDb) -> SqliteRepository<Document, &SqliteConnectionProvider> {
    SqliteRepository::new(&db.provider, document_statements())
}

// --- Policy: versioned identity ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Policy {
    pub policy_id: Option<i64>,
    pub policy_guid: String,
    pub record_version: f64,
    pub is_current: bool,
    pub holder: String,
    pub premium: f64,
}

impl Policy {
    pub fn for_holder(holder: &str, premium: f64) -> Self {
        Self {
            holder: holder.to_string(),
            premium,
            ..Self::default()
        }
    }
}

impl FieldAccess for Policy {
    fn get_field(&self, name: &str) -> Result<FieldValue, FieldAccessError> {
        match name {
            "PolicyId" => Ok(self.policy_id.into()),
            "PolicyGuid" => Ok(self.policy_guid.as_str().into()),
            "PolicyRecordVersion" => Ok(self.record_version.into()),
            "IsCurrent" => Ok(self.is_current.into()),
            _ => Err(FieldAccessError::missing("Policy", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldAccessError> {
        match name {
            "PolicyId" => self.policy_id = value.as_opt_i64(name)?,
            "PolicyGuid" => self.policy_guid = value.as_text(name)?,
            "PolicyRecordVersion" => self.record_version = value.as_f64(name)?,
            "IsCurrent" => self.is_current = value.as_bool(name)?,
            _ => return Err(FieldAccessError::missing("Policy", name)),
        }
        Ok(())
    }
}

impl Entity for Policy {
    fn entity_name() -> &'static str {
        "Policy"
    }

    fn identity() -> IdentityStrategy {
        IdentityStrategy::versioned_for("Policy")
    }

    fn to_params(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("PolicyId", self.policy_id.into()),
            ("PolicyGuid", self.policy_guid.as_str().into()),
            ("PolicyRecordVersion", self.record_version.into()),
            ("IsCurrent", self.is_current.into()),
            ("Holder", self.holder.as_str().into()),
            ("Premium", self.premium.into()),
        ]
    }

    fn from_row(row: &RowValues) -> Result<Self, FieldAccessError> {
        Ok(Policy {
            policy_id: row.get_opt_i64("PolicyId")?,
            policy_guid: row.get_text("PolicyGuid")?,
            record_version: row.get_f64("PolicyRecordVersion")?,
            is_current: row.get_bool("IsCurrent")?,
            holder: row.get_text("Holder")?,
            premium: row.get_f64("Premium")?,
        })
    }
}

/// The update flips the current row and appends version + 1 only when the
/// flip touched exactly one row
pub fn policy_statements() -> StatementSet {
    StatementSet::builder()
        .create(
            "INSERT INTO Policy (PolicyGuid, PolicyRecordVersion, IsCurrent, Holder, Premium) \
             VALUES ($PolicyGuid, $PolicyRecordVersion, $IsCurrent, $Holder, $Premium)",
        )
        .fetch(
            "SELECT * FROM Policy \
             WHERE PolicyGuid = $PolicyGuid AND PolicyRecordVersion = $PolicyRecordVersion",
        )
        .update(
            "UPDATE Policy SET IsCurrent = 0 \
             WHERE PolicyGuid = $PolicyGuid AND PolicyRecordVersion = $PolicyRecordVersion \
             AND IsCurrent = 1; \
             INSERT INTO Policy (PolicyGuid, PolicyRecordVersion, IsCurrent, Holder, Premium) \
             SELECT $PolicyGuid, $PolicyRecordVersion + 1, 1, $Holder, $Premium \
             WHERE changes() = 1;",
        )
        .delete("DELETE FROM Policy WHERE PolicyId = $PolicyId")
        .find("SELECT * FROM Policy")
        .build()
        .unwrap()
}

pub fn policy_repo(db: &TestDb) -> SqliteRepository<Policy, &SqliteConnectionProvider> {
    SqliteRepository::new(&db.provider, policy_statements())
}
