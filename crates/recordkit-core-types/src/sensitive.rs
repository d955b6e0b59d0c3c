//! Redaction wrapper for secrets carried in configuration
//!
//! Connection strings routinely embed credentials, so the provider keeps them
//! in a `Sensitive<String>` that never renders its contents.

use std::fmt;

/// Value that prints as `***REDACTED***` under both Debug and Display
///
/// ```
/// use recordkit_core_types::Sensitive;
///
/// let dsn = Sensitive::new("file:/var/lib/app.db?key=hunter2".to_string());
/// assert_eq!(format!("{:?}", dsn), "***REDACTED***");
/// assert!(dsn.expose().ends_with("hunter2"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the secret; only at the point it is handed to the driver
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}
