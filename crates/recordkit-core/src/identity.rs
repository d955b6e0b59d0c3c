//! Identity strategies
//!
//! An entity type picks one strategy. The strategy names the identity fields
//! and knows how to shape them at create time and advance them on update;
//! it reaches the fields only through `FieldAccess`.

use uuid::Uuid;

use crate::errors::FieldAccessError;
use crate::model::{FieldAccess, FieldValue};

/// Field names managed by the versioned strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedFields {
    /// Integer row identifier, unique per version row
    pub row_id: String,
    /// String identifier shared by every version of one logical entity
    pub logical_id: String,
    /// Numeric version ordinal, 1.0 for the first row
    pub version: String,
    /// Boolean marker of the single current row
    pub current: String,
}

impl VersionedFields {
    /// `{Entity}Id`, `{Entity}Guid`, `{Entity}RecordVersion`, `IsCurrent`
    pub fn conventional(entity: &str) -> Self {
        Self {
            row_id: format!("{}Id", entity),
            logical_id: format!("{}Guid", entity),
            version: format!("{}RecordVersion", entity),
            current: "IsCurrent".to_string(),
        }
    }
}

/// How an entity's identity and concurrency token are shaped and mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// Integer identity assigned by the store on insert
    Sequential { id_field: String },
    /// String identity assigned by the repository before insert
    OpaqueKey { key_field: String },
    /// Append-only version rows sharing a logical identifier
    Versioned(VersionedFields),
}

impl IdentityStrategy {
    pub fn sequential(id_field: impl Into<String>) -> Self {
        IdentityStrategy::Sequential {
            id_field: id_field.into(),
        }
    }

    /// Sequential identity in `{Entity}Id`
    pub fn sequential_for(entity: &str) -> Self {
        Self::sequential(format!("{}Id", entity))
    }

    pub fn opaque_key(key_field: impl Into<String>) -> Self {
        IdentityStrategy::OpaqueKey {
            key_field: key_field.into(),
        }
    }

    /// Opaque key in `{Entity}Guid`
    pub fn opaque_key_for(entity: &str) -> Self {
        Self::opaque_key(format!("{}Guid", entity))
    }

    pub fn versioned(fields: VersionedFields) -> Self {
        IdentityStrategy::Versioned(fields)
    }

    pub fn versioned_for(entity: &str) -> Self {
        IdentityStrategy::Versioned(VersionedFields::conventional(entity))
    }

    /// Short name for log events
    pub fn name(&self) -> &'static str {
        match self {
            IdentityStrategy::Sequential { .. } => "sequential",
            IdentityStrategy::OpaqueKey { .. } => "opaque_key",
            IdentityStrategy::Versioned(_) => "versioned",
        }
    }

    pub fn is_versioned(&self) -> bool {
        matches!(self, IdentityStrategy::Versioned(_))
    }

    /// Copy of `entity` with identity fields shaped for insertion
    ///
    /// - Sequential: identity cleared, the store assigns it
    /// - OpaqueKey: a fresh UUID key
    /// - Versioned: fresh logical id, version 1.0, current, row id cleared
    ///
    /// # Errors
    ///
    /// Propagates `FieldAccessError` from the entity's accessor
    pub fn prepare_create<E>(&self, entity: &E) -> Result<E, FieldAccessError>
    where
        E: FieldAccess + Clone,
    {
        let mut prepared = entity.clone();
        match self {
            IdentityStrategy::Sequential { id_field } => {
                prepared.set_field(id_field, FieldValue::Null)?;
            }
            IdentityStrategy::OpaqueKey { key_field } => {
                prepared.set_field(key_field, FieldValue::Text(new_key()))?;
            }
            IdentityStrategy::Versioned(fields) => {
                prepared.set_field(&fields.row_id, FieldValue::Null)?;
                prepared.set_field(&fields.logical_id, FieldValue::Text(new_key()))?;
                prepared.set_field(&fields.version, FieldValue::Real(1.0))?;
                prepared.set_field(&fields.current, FieldValue::Bool(true))?;
            }
        }
        Ok(prepared)
    }

    /// Record the store-generated row identifier on a freshly inserted entity
    ///
    /// Opaque keys are already known, so the generated rowid is not stored.
    ///
    /// # Errors
    ///
    /// Propagates `FieldAccessError` from the entity's accessor
    pub fn assign_generated_id<E>(&self, entity: &mut E, id: i64) -> Result<(), FieldAccessError>
    where
        E: FieldAccess,
    {
        match self {
            IdentityStrategy::Sequential { id_field } => {
                entity.set_field(id_field, FieldValue::Integer(id))
            }
            IdentityStrategy::OpaqueKey { .. } => Ok(()),
            IdentityStrategy::Versioned(fields) => {
                entity.set_field(&fields.row_id, FieldValue::Integer(id))
            }
        }
    }

    /// Whether a stored row is the current version; always true for
    /// non-versioned strategies
    ///
    /// # Errors
    ///
    /// Propagates `FieldAccessError` from the entity's accessor
    pub fn is_current<E>(&self, entity: &E) -> Result<bool, FieldAccessError>
    where
        E: FieldAccess,
    {
        match self {
            IdentityStrategy::Versioned(fields) => entity
                .get_field(&fields.current)?
                .as_bool(&fields.current),
            _ => Ok(true),
        }
    }

    pub fn version<E>(&self, entity: &E) -> Result<Option<f64>, FieldAccessError>
    where
        E: FieldAccess,
    {
        match self {
            IdentityStrategy::Versioned(fields) => entity
                .get_field(&fields.version)?
                .as_f64(&fields.version)
                .map(Some),
            _ => Ok(None),
        }
    }

    /// The entity value expected after a successful versioned update
    ///
    /// Row id cleared (re-resolved by the next fetch), version advanced by
    /// exactly one. The input is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates `FieldAccessError` from the entity's accessor
    pub fn next_version<E>(&self, entity: &E) -> Result<E, FieldAccessError>
    where
        E: FieldAccess + Clone,
    {
        let mut next = entity.clone();
        if let IdentityStrategy::Versioned(fields) = self {
            let version = entity.get_field(&fields.version)?.as_f64(&fields.version)?;
            next.set_field(&fields.row_id, FieldValue::Null)?;
            next.set_field(&fields.version, FieldValue::Real(version + 1.0))?;
            next.set_field(&fields.current, FieldValue::Bool(true))?;
        }
        Ok(next)
    }

    /// Render the identity of `entity` for log and error messages
    pub fn describe<E>(&self, entity: &E) -> String
    where
        E: FieldAccess,
    {
        let render = |name: &str| match entity.get_field(name) {
            Ok(FieldValue::Null) => format!("{}=<unset>", name),
            Ok(FieldValue::Text(s)) => format!("{}={}", name, s),
            Ok(FieldValue::Integer(i)) => format!("{}={}", name, i),
            Ok(FieldValue::Real(r)) => format!("{}={}", name, r),
            Ok(other) => format!("{}={:?}", name, other),
            Err(_) => format!("{}=<missing>", name),
        };
        match self {
            IdentityStrategy::Sequential { id_field } => render(id_field),
            IdentityStrategy::OpaqueKey { key_field } => render(key_field),
            IdentityStrategy::Versioned(fields) => {
                format!("{} {}", render(&fields.logical_id), render(&fields.version))
            }
        }
    }
}

fn new_key() -> String {
    Uuid::new_v4().to_string()
}
