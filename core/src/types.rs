//! Entity description types.
//!
//! An [`EntitySchema`] is the registration-time description of one record
//! type: its table name and an ordered list of [`FieldSchema`]s. Field order
//! fixes column order in the generated DDL, in every statement template, and
//! in row materialization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a record field.
///
/// This is the closed set of types the engine knows how to map to a column
/// and decode back. [`SemanticType::Ignored`] marks a field that exists on
/// the record but is never persisted.
///
/// # Examples
///
/// ```
/// use entity_store_core::SemanticType;
///
/// assert_eq!(SemanticType::from_type_name("i64"), Some(SemanticType::Long));
/// assert_eq!(SemanticType::from_type_name("Vec<u8>"), Some(SemanticType::Bytes));
/// assert_eq!(SemanticType::from_type_name("decimal"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Boolean.
    Bool,
    /// Single byte.
    Byte,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 64-bit unsigned integer.
    #[serde(rename = "ulong")]
    ULong,
    /// Short text, stored as a bounded varchar.
    Text,
    /// Long-form text, stored unbounded.
    Comment,
    /// UTC timestamp.
    Timestamp,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Opaque byte sequence.
    Bytes,
    /// Never persisted.
    Ignored,
}

impl SemanticType {
    /// Resolves a declared type name to a semantic type.
    ///
    /// Accepts Rust primitive names (`i32`, `u64`, `String`, `Vec<u8>`, ...)
    /// as well as the lowercase variant names. Matching is case-insensitive.
    /// Returns `None` for anything the engine cannot store.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let ty = match normalized.as_str() {
            "bool" | "boolean" => Self::Bool,
            "u8" | "i8" | "byte" => Self::Byte,
            "i32" | "int" => Self::Int,
            "i64" | "long" => Self::Long,
            "u64" | "ulong" => Self::ULong,
            "string" | "text" | "str" => Self::Text,
            "comment" => Self::Comment,
            "datetime" | "timestamp" | "date" => Self::Timestamp,
            "f32" | "float" | "single" => Self::Float,
            "f64" | "double" => Self::Double,
            "bytes" | "blob" | "byte[]" | "vec<u8>" => Self::Bytes,
            "ignore" | "ignored" => Self::Ignored,
            _ => return None,
        };
        Some(ty)
    }

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Int => "int",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::Timestamp => "timestamp",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bytes => "bytes",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Markers attached to a field.
///
/// A key field is implicitly not-null. An ignored field is excluded from
/// DDL, from every statement template, and from row materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFlags {
    /// Part of the primary key.
    #[serde(default)]
    pub key: bool,
    /// Column carries a `NOT NULL` constraint.
    #[serde(default)]
    pub not_null: bool,
    /// Column is covered by the table's secondary index.
    #[serde(default, rename = "index")]
    pub indexed: bool,
    /// Field is not persisted.
    #[serde(default, rename = "ignore")]
    pub ignored: bool,
    /// Stored as an opaque blob column.
    #[serde(default)]
    pub blob: bool,
}

/// Description of one record field.
///
/// Use [`FieldSchema::new`] and chain the flag methods to build one.
///
/// # Examples
///
/// ```
/// use entity_store_core::{FieldSchema, SemanticType};
///
/// let id = FieldSchema::new("id", SemanticType::Long).key();
/// assert!(id.is_key());
/// assert!(id.is_not_null());
///
/// let scratch = FieldSchema::new("scratch", SemanticType::Text).ignored();
/// assert!(!scratch.is_persisted());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field (and column) name, unique within the entity.
    pub name: String,
    /// Declared semantic type.
    #[serde(rename = "type")]
    pub ty: SemanticType,
    /// Field markers.
    #[serde(flatten)]
    pub flags: FieldFlags,
}

impl FieldSchema {
    /// Creates an unflagged field.
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
            flags: FieldFlags::default(),
        }
    }

    /// Marks the field as part of the primary key.
    pub fn key(mut self) -> Self {
        self.flags.key = true;
        self
    }

    /// Marks the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.flags.not_null = true;
        self
    }

    /// Adds the column to the table's secondary index.
    pub fn indexed(mut self) -> Self {
        self.flags.indexed = true;
        self
    }

    /// Excludes the field from persistence.
    pub fn ignored(mut self) -> Self {
        self.flags.ignored = true;
        self
    }

    /// Stores the field in a blob column.
    pub fn blob(mut self) -> Self {
        self.flags.blob = true;
        self
    }

    /// Returns `true` if the field participates in the primary key.
    pub fn is_key(&self) -> bool {
        self.flags.key
    }

    /// Returns `true` if the column must not be null. Keys always are.
    pub fn is_not_null(&self) -> bool {
        self.flags.key || self.flags.not_null
    }

    /// Returns `true` if the field has a column.
    pub fn is_persisted(&self) -> bool {
        !self.flags.ignored && self.ty != SemanticType::Ignored
    }
}

/// Description of one record type.
///
/// The entity name doubles as the table name and as the identity under which
/// the type is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity (and table) name.
    pub name: String,
    /// Declared fields in declaration order, ignored ones included.
    pub fields: Vec<FieldSchema>,
}

impl EntitySchema {
    /// Creates an entity with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields that have a column, in declaration order.
    pub fn persisted_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.is_persisted())
    }

    /// Persisted key fields, in declaration order.
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.persisted_fields().filter(|f| f.is_key())
    }

    /// Persisted indexed fields, in declaration order.
    pub fn indexed_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.persisted_fields().filter(|f| f.flags.indexed)
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}
