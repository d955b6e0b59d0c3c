//! Database connection management
//!
//! A `ConnectionProvider` hands out one freshly opened connection per
//! repository operation; the caller owns it and it closes when dropped.

#![allow(clippy::result_large_err)]

use crate::errors::{configuration_error, from_rusqlite, io_error, Result};
use crate::provisioning::{self, ProvisionOutcome};
use recordkit_core_types::Sensitive;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const PROP_CONNECTION_STRING: &str = "connection_string";
pub const PROP_INIT_SCRIPT: &str = "init_script";
pub const PROP_BUSY_TIMEOUT_MS: &str = "busy_timeout_ms";
pub const PROP_FOREIGN_KEYS: &str = "foreign_keys";
pub const PROP_JOURNAL_MODE: &str = "journal_mode";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_JOURNAL_MODE: &str = "wal";

/// Source of database connections for the repository
pub trait ConnectionProvider {
    /// Look up a named configuration property
    fn get_property(&self, name: &str) -> Option<String>;

    /// Open and configure a new connection
    ///
    /// # Errors
    ///
    /// `Persistence` if the database cannot be opened or configured
    fn connect(&self) -> Result<Connection>;

    /// Apply the initialization script; provisioning time only
    ///
    /// # Errors
    ///
    /// `Configuration` when no script is configured, `Io` when it cannot be
    /// read, `ConstraintViolation` when an applied script has changed
    fn create_database(&self) -> Result<ProvisionOutcome>;
}

impl<T: ConnectionProvider + ?Sized> ConnectionProvider for &T {
    fn get_property(&self, name: &str) -> Option<String> {
        (**self).get_property(name)
    }

    fn connect(&self) -> Result<Connection> {
        (**self).connect()
    }

    fn create_database(&self) -> Result<ProvisionOutcome> {
        (**self).create_database()
    }
}

impl<T: ConnectionProvider + ?Sized> ConnectionProvider for Arc<T> {
    fn get_property(&self, name: &str) -> Option<String> {
        (**self).get_property(name)
    }

    fn connect(&self) -> Result<Connection> {
        (**self).connect()
    }

    fn create_database(&self) -> Result<ProvisionOutcome> {
        (**self).create_database()
    }
}

/// Named string properties configuring a provider
///
/// Loaded from a flat YAML mapping:
///
/// ```yaml
/// connection_string: /var/lib/app/records.db
/// init_script: schema.sql
/// busy_timeout_ms: 2500
/// foreign_keys: true
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderProperties {
    values: BTreeMap<String, String>,
}

impl ProviderProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Parse a flat YAML mapping; scalar values are kept as strings
    ///
    /// # Errors
    ///
    /// `Serialization` for malformed YAML, `Configuration` for nested values
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_yaml::Value> =
            serde_yaml::from_str(content).map_err(|e| {
                recordkit_core::ExError::new(recordkit_core::ExErrorKind::Serialization)
                    .with_op("load_provider_properties")
                    .with_message(format!("Invalid provider YAML: {}", e))
            })?;

        let mut properties = Self::new();
        for (name, value) in raw {
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Null => continue,
                _ => return Err(configuration_error(&name, "expected a scalar value")),
            };
            properties.set(name, text);
        }
        Ok(properties)
    }

    /// Load properties from a YAML file
    ///
    /// A relative `init_script` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as `from_yaml_str`
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| io_error("load_provider_properties", e))?;
        let mut properties = Self::from_yaml_str(&content)?;

        let script = properties.get(PROP_INIT_SCRIPT).map(PathBuf::from);
        if let (Some(script), Some(dir)) = (script, path.parent()) {
            if script.is_relative() {
                let resolved = dir.join(script).to_string_lossy().into_owned();
                properties.set(PROP_INIT_SCRIPT, resolved);
            }
        }
        Ok(properties)
    }
}

impl std::fmt::Debug for ProviderProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.values {
            if name == PROP_CONNECTION_STRING {
                map.entry(name, &Sensitive::new(value));
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

/// SQLite connection provider
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    connection_string: Sensitive<String>,
    properties: ProviderProperties,
    busy_timeout: Duration,
    foreign_keys: bool,
    journal_mode: String,
}

impl SqliteConnectionProvider {
    /// # Errors
    ///
    /// `Configuration` if `connection_string` is absent or a typed property
    /// does not parse
    pub fn new(properties: ProviderProperties) -> Result<Self> {
        let connection_string = properties
            .get(PROP_CONNECTION_STRING)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| configuration_error(PROP_CONNECTION_STRING, "is required"))?
            .to_string();

        let busy_timeout_ms = match properties.get(PROP_BUSY_TIMEOUT_MS) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| configuration_error(PROP_BUSY_TIMEOUT_MS, "expected milliseconds"))?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        let foreign_keys = match properties.get(PROP_FOREIGN_KEYS) {
            Some(raw) => parse_flag(raw)
                .ok_or_else(|| configuration_error(PROP_FOREIGN_KEYS, "expected true or false"))?,
            None => true,
        };

        let journal_mode = properties
            .get(PROP_JOURNAL_MODE)
            .unwrap_or(DEFAULT_JOURNAL_MODE)
            .to_string();

        Ok(Self {
            connection_string: Sensitive::new(connection_string),
            properties,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
            foreign_keys,
            journal_mode,
        })
    }

    /// Provider for a database file with default settings
    ///
    /// # Errors
    ///
    /// As `new`
    pub fn for_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(ProviderProperties::new().with(
            PROP_CONNECTION_STRING,
            path.as_ref().to_string_lossy().into_owned(),
        ))
    }

    /// # Errors
    ///
    /// As `ProviderProperties::from_yaml_file` and `new`
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(ProviderProperties::from_yaml_file(path)?)
    }

    /// Same provider with an initialization script configured
    pub fn with_init_script<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.properties.set(
            PROP_INIT_SCRIPT,
            path.as_ref().to_string_lossy().into_owned(),
        );
        self
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn get_property(&self, name: &str) -> Option<String> {
        self.properties.get(name).map(str::to_string)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(self.connection_string.expose()).map_err(from_rusqlite)?;
        configure(&conn, self.busy_timeout, self.foreign_keys, &self.journal_mode)?;
        tracing::debug!(
            component = module_path!(),
            journal_mode = %self.journal_mode,
            "connection acquired"
        );
        Ok(conn)
    }

    fn create_database(&self) -> Result<ProvisionOutcome> {
        let script_path = self
            .properties
            .get(PROP_INIT_SCRIPT)
            .ok_or_else(|| configuration_error(PROP_INIT_SCRIPT, "is required to create the database"))?;
        let sql =
            std::fs::read_to_string(script_path).map_err(|e| io_error("create_database", e))?;
        let script_id = Path::new(script_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| script_path.to_string());

        let mut conn = self.connect()?;
        provisioning::apply_script(&mut conn, &script_id, &sql)
    }
}

/// Configure a connection: busy timeout, foreign keys, journal mode
pub fn configure(
    conn: &Connection,
    busy_timeout: Duration,
    foreign_keys: bool,
    journal_mode: &str,
) -> Result<()> {
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;

    conn.pragma_update(None, "foreign_keys", foreign_keys)
        .map_err(from_rusqlite)?;

    // journal_mode answers with the mode actually in effect
    let _mode: String = conn
        .pragma_update_and_check(None, "journal_mode", journal_mode, |row| row.get(0))
        .map_err(from_rusqlite)?;

    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_required() {
        let err = SqliteConnectionProvider::new(ProviderProperties::new()).unwrap_err();
        assert_eq!(err.kind(), recordkit_core::ExErrorKind::Configuration);
        assert_eq!(err.field(), Some(PROP_CONNECTION_STRING));
    }

    #[test]
    fn test_yaml_scalars_become_strings() {
        let props = ProviderProperties::from_yaml_str(
            "connection_string: /tmp/x.db\nbusy_timeout_ms: 250\nforeign_keys: false\n",
        )
        .unwrap();
        assert_eq!(props.get(PROP_BUSY_TIMEOUT_MS), Some("250"));
        assert_eq!(props.get(PROP_FOREIGN_KEYS), Some("false"));

        let provider = SqliteConnectionProvider::new(props).unwrap();
        assert_eq!(provider.busy_timeout, Duration::from_millis(250));
        assert!(!provider.foreign_keys);
    }

    #[test]
    fn test_nested_yaml_rejected() {
        let err = ProviderProperties::from_yaml_str("connection_string:\n  nested: 1\n").unwrap_err();
        assert_eq!(err.kind(), recordkit_core::ExErrorKind::Configuration);
    }

    #[test]
    fn test_debug_redacts_connection_string() {
        let provider = SqliteConnectionProvider::new(
            ProviderProperties::new().with(PROP_CONNECTION_STRING, "/secret/path.db"),
        )
        .unwrap();
        let rendered = format!("{:?}", provider);
        assert!(!rendered.contains("/secret/path.db"));
        assert!(rendered.contains("***REDACTED***"));
        assert_eq!(
            provider.get_property(PROP_CONNECTION_STRING).as_deref(),
            Some("/secret/path.db")
        );
    }

    #[test]
    fn test_bad_busy_timeout_rejected() {
        let props = ProviderProperties::new()
            .with(PROP_CONNECTION_STRING, "x.db")
            .with(PROP_BUSY_TIMEOUT_MS, "soon");
        let err = SqliteConnectionProvider::new(props).unwrap_err();
        assert_eq!(err.field(), Some(PROP_BUSY_TIMEOUT_MS));
    }
}
