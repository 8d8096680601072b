//! The trait implemented by storable record types.

use crate::{EntitySchema, Value, ValueError};

/// A Rust type that can be stored as rows of one table.
///
/// Instead of discovering fields by runtime introspection, an implementor
/// describes itself once through [`schema`](Entity::schema) and exposes its
/// field values by name. The engine reads values with
/// [`value`](Entity::value) when binding parameters and writes them back with
/// [`set_value`](Entity::set_value) when materializing rows into a fresh
/// [`Default`] instance. Ignored fields are never read or written.
///
/// # Examples
///
/// ```
/// use entity_store_core::*;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Score {
///     id: i32,
///     name: String,
///     score: f64,
/// }
///
/// impl Entity for Score {
///     const NAME: &'static str = "Score";
///
///     fn schema() -> EntitySchema {
///         EntitySchema::new(Self::NAME)
///             .with_field(FieldSchema::new("id", SemanticType::Int).key())
///             .with_field(FieldSchema::new("name", SemanticType::Text))
///             .with_field(FieldSchema::new("score", SemanticType::Double))
///     }
///
///     fn value(&self, field: &str) -> Value {
///         match field {
///             "id" => self.id.into(),
///             "name" => self.name.as_str().into(),
///             "score" => self.score.into(),
///             _ => Value::Null,
///         }
///     }
///
///     fn set_value(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
///         match field {
///             "id" => self.id = value.try_into()?,
///             "name" => self.name = value.try_into()?,
///             "score" => self.score = value.try_into()?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
///
/// let mut s = Score::default();
/// s.set_value("name", Value::from("a")).unwrap();
/// assert_eq!(s.value("name"), Value::Text("a".into()));
/// ```
pub trait Entity: Default + 'static {
    /// Entity name; also the table name and registry identity.
    const NAME: &'static str;

    /// Describes the record's fields. Called once, at registration.
    fn schema() -> EntitySchema;

    /// Returns the current value of a persisted field.
    fn value(&self, field: &str) -> Value;

    /// Assigns a decoded column value to a persisted field.
    fn set_value(&mut self, field: &str, value: Value) -> Result<(), ValueError>;
}
