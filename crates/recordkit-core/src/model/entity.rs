use crate::errors::FieldAccessError;
use crate::identity::IdentityStrategy;
use crate::model::value::{FieldValue, RowValues};

/// Read/write access to an entity's identity fields by declared name
///
/// The repository is generic over entity shapes, so it cannot name identity
/// fields statically. Each entity type implements this capability for the
/// field names its `IdentityStrategy` declares. It is only ever called for
/// identity fields (id, key, version, current flag).
///
/// Implementations must return `MissingField` for unknown names and
/// `Conversion` when a value cannot be coerced into the field's type; the
/// coercion helpers on `FieldValue` produce exactly those errors.
pub trait FieldAccess {
    /// # Errors
    ///
    /// `MissingField` if the entity has no field with this name
    fn get_field(&self, name: &str) -> Result<FieldValue, FieldAccessError>;

    /// # Errors
    ///
    /// `MissingField` for unknown names, `Conversion` for incompatible values
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldAccessError>;
}

/// A record type the generic repository can persist
///
/// ```
/// use recordkit_core::{Entity, FieldAccess, FieldAccessError, FieldValue, IdentityStrategy, RowValues};
///
/// #[derive(Debug, Clone, Default)]
/// struct Tag {
///     tag_id: Option<i64>,
///     label: String,
/// }
///
/// impl FieldAccess for Tag {
///     fn get_field(&self, name: &str) -> Result<FieldValue, FieldAccessError> {
///         match name {
///             "TagId" => Ok(self.tag_id.into()),
///             _ => Err(FieldAccessError::missing("Tag", name)),
///         }
///     }
///
///     fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), FieldAccessError> {
///         match name {
///             "TagId" => self.tag_id = value.as_opt_i64(name)?,
///             _ => return Err(FieldAccessError::missing("Tag", name)),
///         }
///         Ok(())
///     }
/// }
///
/// impl Entity for Tag {
///     fn entity_name() -> &'static str {
///         "Tag"
///     }
///
///     fn identity() -> IdentityStrategy {
///         IdentityStrategy::sequential_for("Tag")
///     }
///
///     fn to_params(&self) -> Vec<(&'static str, FieldValue)> {
///         vec![("TagId", self.tag_id.into()), ("Label", self.label.as_str().into())]
///     }
///
///     fn from_row(row: &RowValues) -> Result<Self, FieldAccessError> {
///         Ok(Tag {
///             tag_id: row.get_opt_i64("TagId")?,
///             label: row.get_text("Label")?,
///         })
///     }
/// }
///
/// let mut tag = Tag::default();
/// tag.set_field("TagId", FieldValue::Integer(4)).unwrap();
/// assert_eq!(tag.tag_id, Some(4));
/// ```
pub trait Entity: FieldAccess + Clone + std::fmt::Debug {
    /// Name used in log events and for conventional identity field names
    fn entity_name() -> &'static str;

    /// Identity strategy and the field names it manages
    fn identity() -> IdentityStrategy;

    /// Named values available for statement parameter binding
    fn to_params(&self) -> Vec<(&'static str, FieldValue)>;

    /// Build an entity from one result row
    ///
    /// # Errors
    ///
    /// `MissingField` / `Conversion` when the row does not fit the entity
    fn from_row(row: &RowValues) -> Result<Self, FieldAccessError>;
}
