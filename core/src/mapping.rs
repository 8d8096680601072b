//! Type mapper: semantic field type to column type and storage kind.
//!
//! The mapping is total over [`SemanticType`] except for two cases that are
//! rejected as [`ValidationError::UnsupportedType`]: a persisted field typed
//! [`SemanticType::Ignored`], and the blob marker on anything other than text
//! or bytes.
//!
//! | Semantic type | Column             | Storage kind |
//! |---------------|--------------------|--------------|
//! | `Bool`        | `TINYINT`          | `Bool`       |
//! | `Byte`        | `SMALLINT`         | `Byte`       |
//! | `Int`         | `INT`              | `Int`        |
//! | `Long`        | `BIGINT`           | `Long`       |
//! | `ULong`       | `UNSIGNED BIG INT` | `ULong`      |
//! | `Text`        | `VARCHAR(256)`     | `Text`       |
//! | `Text` + blob | `BLOB`             | `Text`       |
//! | `Comment`     | `TEXT`             | `Text`       |
//! | `Timestamp`   | `NUMERIC`          | `Timestamp`  |
//! | `Float`       | `REAL`             | `Float`      |
//! | `Double`      | `REAL`             | `Double`     |
//! | `Bytes`       | `BLOB`             | `Bytes`      |

use crate::{FieldSchema, SemanticType, ValidationError};

/// Column type used in generated DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    UnsignedBigInt,
    Varchar,
    Text,
    Numeric,
    Real,
    Blob,
}

impl ColumnType {
    /// DDL fragment for this column type.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::UnsignedBigInt => "UNSIGNED BIG INT",
            Self::Varchar => "VARCHAR(256)",
            Self::Text => "TEXT",
            Self::Numeric => "NUMERIC",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

/// In-memory kind used to decode a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Bool,
    Byte,
    Int,
    Long,
    ULong,
    Text,
    Timestamp,
    Float,
    Double,
    Bytes,
}

/// Result of mapping one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Column type for DDL.
    pub column: ColumnType,
    /// Decode kind for result rows.
    pub storage: StorageKind,
}

/// Maps a field of `entity` to its column type and storage kind.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedType`] naming the entity and field
/// when the field's type cannot be stored as declared.
///
/// # Examples
///
/// ```
/// use entity_store_core::*;
///
/// let m = map_field("Note", &FieldSchema::new("body", SemanticType::Comment)).unwrap();
/// assert_eq!(m.column.as_sql(), "TEXT");
/// assert_eq!(m.storage, StorageKind::Text);
///
/// let bad = FieldSchema::new("count", SemanticType::Int).blob();
/// assert!(map_field("Note", &bad).is_err());
/// ```
pub fn map_field(entity: &str, field: &FieldSchema) -> Result<FieldMapping, ValidationError> {
    let unsupported = || ValidationError::UnsupportedType {
        entity: entity.to_string(),
        field: field.name.clone(),
        ty: if field.flags.blob {
            format!("blob {}", field.ty)
        } else {
            field.ty.to_string()
        },
    };

    if field.flags.blob {
        return match field.ty {
            SemanticType::Text | SemanticType::Comment => Ok(FieldMapping {
                column: ColumnType::Blob,
                storage: StorageKind::Text,
            }),
            SemanticType::Bytes => Ok(FieldMapping {
                column: ColumnType::Blob,
                storage: StorageKind::Bytes,
            }),
            _ => Err(unsupported()),
        };
    }

    let (column, storage) = match field.ty {
        SemanticType::Bool => (ColumnType::TinyInt, StorageKind::Bool),
        SemanticType::Byte => (ColumnType::SmallInt, StorageKind::Byte),
        SemanticType::Int => (ColumnType::Int, StorageKind::Int),
        SemanticType::Long => (ColumnType::BigInt, StorageKind::Long),
        SemanticType::ULong => (ColumnType::UnsignedBigInt, StorageKind::ULong),
        SemanticType::Text => (ColumnType::Varchar, StorageKind::Text),
        SemanticType::Comment => (ColumnType::Text, StorageKind::Text),
        SemanticType::Timestamp => (ColumnType::Numeric, StorageKind::Timestamp),
        SemanticType::Float => (ColumnType::Real, StorageKind::Float),
        SemanticType::Double => (ColumnType::Real, StorageKind::Double),
        SemanticType::Bytes => (ColumnType::Blob, StorageKind::Bytes),
        SemanticType::Ignored => return Err(unsupported()),
    };

    Ok(FieldMapping { column, storage })
}
