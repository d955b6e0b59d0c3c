use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure raised by the record layer, and every fault attached to an
/// ERROR result, is classified by one of these kinds. Each kind maps to a
/// stable code usable in tests and log filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    Configuration,

    // Logical outcomes (attached to ERROR results)
    NotFound,
    AmbiguousSelection,
    NoRowsAffected,
    AmbiguousMutation,
    StaleVersion,
    MissingIdentity,

    // Field access
    MissingField,
    Conversion,

    // Provisioning
    ConstraintViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousSelection => "ERR_AMBIGUOUS_SELECTION",
            ExErrorKind::NoRowsAffected => "ERR_NO_ROWS_AFFECTED",
            ExErrorKind::AmbiguousMutation => "ERR_AMBIGUOUS_MUTATION",
            ExErrorKind::StaleVersion => "ERR_STALE_VERSION",
            ExErrorKind::MissingIdentity => "ERR_MISSING_IDENTITY",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::Conversion => "ERR_CONVERSION",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context (operation, entity
/// type, nested source) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    field: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            field: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add field name context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Failures of the dynamic field accessor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldAccessError {
    /// The entity declares no field with this name
    #[error("{entity} has no field named {field}")]
    MissingField { entity: String, field: String },

    /// The value could not be coerced to the field's declared type
    #[error("cannot convert {found} into {expected} for field {field}")]
    Conversion {
        field: String,
        expected: String,
        found: String,
    },
}

impl FieldAccessError {
    pub fn missing(entity: impl Into<String>, field: impl Into<String>) -> Self {
        FieldAccessError::MissingField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn conversion(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        FieldAccessError::Conversion {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<FieldAccessError> for ExError {
    fn from(err: FieldAccessError) -> Self {
        match &err {
            FieldAccessError::MissingField { entity, field } => {
                ExError::new(ExErrorKind::MissingField)
                    .with_op("field_access")
                    .with_entity(entity.clone())
                    .with_field(field.clone())
                    .with_message(err.to_string())
            }
            FieldAccessError::Conversion { field, .. } => ExError::new(ExErrorKind::Conversion)
                .with_op("field_access")
                .with_field(field.clone())
                .with_message(err.to_string()),
        }
    }
}
