//! Conversion between [`Value`]s and SQLite parameters and columns.
//!
//! Encoding is driven by the column's mapping, decoding by its storage
//! kind:
//!
//! - booleans and bytes are stored as integers
//! - `u64` is stored bit-for-bit as `i64` and cast back on read
//! - timestamps are stored as ISO 8601 text in UTC with nanosecond
//!   precision; years outside `0000..=9999` carry an explicit sign
//! - `f32` widens to `REAL` and narrows back exactly
//! - text bound to a `BLOB` column is stored as its UTF-8 bytes
//!
//! A value is only written into a column of its own storage kind, and NaN
//! is refused because SQLite stores it as `NULL`. Both are rejected before
//! any statement runs, so every row that was written can be read back.
//!
//! A `NULL` column always decodes to [`Value::Null`]; materialization leaves
//! the corresponding field at its default.

use chrono::{DateTime, NaiveDateTime, Utc};
use entity_store_core::{ColumnType, Entity, StorageKind, Value};
use rusqlite::Row;
use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::descriptor::{ColumnDescriptor, EntityDescriptor};
use crate::error::{Result, StoreError};

/// Text layout of a stored timestamp. `%Y` signs years past four digits.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Returns `true` if `value` may be bound into a column decoded as `storage`.
fn fits(value: &Value, storage: StorageKind) -> bool {
    matches!(
        (value, storage),
        (Value::Null, _)
            | (Value::Bool(_), StorageKind::Bool)
            | (Value::Byte(_), StorageKind::Byte)
            | (Value::Int(_), StorageKind::Int)
            | (Value::Long(_), StorageKind::Long)
            | (Value::ULong(_), StorageKind::ULong)
            | (Value::Text(_), StorageKind::Text)
            | (Value::Timestamp(_), StorageKind::Timestamp)
            | (Value::Float(_), StorageKind::Float)
            | (Value::Double(_), StorageKind::Double)
            | (Value::Bytes(_), StorageKind::Bytes)
    )
}

/// Encodes a value for binding into a column of `entity`.
///
/// # Errors
///
/// Returns [`StoreError::ConversionError`] if the value's kind does not
/// match the column's storage kind, or if a float is NaN.
pub(crate) fn encode(entity: &str, value: &Value, column: &ColumnDescriptor) -> Result<SqlValue> {
    let rejected = |message: String| StoreError::ConversionError {
        entity: entity.to_string(),
        field: column.name.clone(),
        message,
    };

    if !fits(value, column.mapping.storage) {
        return Err(rejected(format!(
            "cannot store {} in a {:?} column",
            value.kind(),
            column.mapping.storage
        )));
    }

    let encoded = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::Byte(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int(v) => SqlValue::Integer(i64::from(*v)),
        Value::Long(v) => SqlValue::Integer(*v),
        Value::ULong(v) => SqlValue::Integer(*v as i64),
        Value::Text(v) if column.mapping.column == ColumnType::Blob => {
            SqlValue::Blob(v.as_bytes().to_vec())
        }
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Timestamp(v) => SqlValue::Text(v.format(TIMESTAMP_FORMAT).to_string()),
        Value::Float(v) if v.is_nan() => return Err(rejected("NaN cannot be stored".into())),
        Value::Double(v) if v.is_nan() => return Err(rejected("NaN cannot be stored".into())),
        Value::Float(v) => SqlValue::Real(f64::from(*v)),
        Value::Double(v) => SqlValue::Real(*v),
        Value::Bytes(v) => SqlValue::Blob(v.clone()),
    };
    Ok(encoded)
}

/// Encodes a full row of values, one per persisted column.
pub(crate) fn encode_row(descriptor: &EntityDescriptor, values: &[Value]) -> Result<Vec<SqlValue>> {
    if values.len() != descriptor.columns().len() {
        return Err(StoreError::FieldCountMismatch {
            entity: descriptor.name().to_string(),
            expected: descriptor.columns().len(),
            actual: values.len(),
        });
    }
    descriptor
        .columns()
        .iter()
        .zip(values)
        .map(|(column, value)| encode(descriptor.name(), value, column))
        .collect()
}

/// Encodes a key tuple, one value per key column.
pub(crate) fn encode_keys(descriptor: &EntityDescriptor, keys: &[Value]) -> Result<Vec<SqlValue>> {
    if keys.len() != descriptor.key_arity() {
        return Err(StoreError::KeyCountMismatch {
            entity: descriptor.name().to_string(),
            expected: descriptor.key_arity(),
            actual: keys.len(),
        });
    }
    descriptor
        .key_columns()
        .zip(keys)
        .map(|(column, value)| encode(descriptor.name(), value, column))
        .collect()
}

/// Parses a stored timestamp: the native layout first, then RFC 3339 with
/// any offset.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Decodes one result column according to its storage kind.
pub(crate) fn decode(
    entity: &str,
    column: &ColumnDescriptor,
    raw: ValueRef<'_>,
) -> Result<Value> {
    let mismatch = |found: &str| StoreError::ConversionError {
        entity: entity.to_string(),
        field: column.name.clone(),
        message: format!("cannot decode {found} as {:?}", column.mapping.storage),
    };
    let out_of_range = |v: i64| StoreError::ConversionError {
        entity: entity.to_string(),
        field: column.name.clone(),
        message: format!("{v} out of range for {:?}", column.mapping.storage),
    };
    let utf8 = |bytes: &[u8]| {
        String::from_utf8(bytes.to_vec()).map_err(|e| StoreError::ConversionError {
            entity: entity.to_string(),
            field: column.name.clone(),
            message: e.to_string(),
        })
    };

    if let ValueRef::Null = raw {
        return Ok(Value::Null);
    }

    let value = match (column.mapping.storage, raw) {
        (StorageKind::Bool, ValueRef::Integer(v)) => Value::Bool(v != 0),
        (StorageKind::Byte, ValueRef::Integer(v)) => {
            Value::Byte(u8::try_from(v).map_err(|_| out_of_range(v))?)
        }
        (StorageKind::Int, ValueRef::Integer(v)) => {
            Value::Int(i32::try_from(v).map_err(|_| out_of_range(v))?)
        }
        (StorageKind::Long, ValueRef::Integer(v)) => Value::Long(v),
        (StorageKind::ULong, ValueRef::Integer(v)) => Value::ULong(v as u64),
        (StorageKind::Text, ValueRef::Text(bytes) | ValueRef::Blob(bytes)) => {
            Value::Text(utf8(bytes)?)
        }
        (StorageKind::Timestamp, ValueRef::Text(bytes)) => {
            let text = utf8(bytes)?;
            let parsed = parse_timestamp(&text).ok_or_else(|| StoreError::ConversionError {
                entity: entity.to_string(),
                field: column.name.clone(),
                message: format!("invalid timestamp '{text}'"),
            })?;
            Value::Timestamp(parsed)
        }
        (StorageKind::Timestamp, ValueRef::Integer(secs)) => {
            Value::Timestamp(DateTime::from_timestamp(secs, 0).ok_or_else(|| out_of_range(secs))?)
        }
        (StorageKind::Float, ValueRef::Real(v)) => Value::Float(v as f32),
        (StorageKind::Float, ValueRef::Integer(v)) => Value::Float(v as f32),
        (StorageKind::Double, ValueRef::Real(v)) => Value::Double(v),
        (StorageKind::Double, ValueRef::Integer(v)) => Value::Double(v as f64),
        (StorageKind::Bytes, ValueRef::Blob(bytes) | ValueRef::Text(bytes)) => {
            Value::Bytes(bytes.to_vec())
        }
        (_, other) => return Err(mismatch(&format!("{:?}", other.data_type()))),
    };
    Ok(value)
}

/// Reads every persisted column of a result row, by position.
///
/// Column `i` of the row belongs to persisted column `i` of the descriptor.
pub(crate) fn read_row(descriptor: &EntityDescriptor, row: &Row<'_>) -> Result<Vec<Value>> {
    descriptor
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| decode(descriptor.name(), column, row.get_ref(i)?))
        .collect()
}

/// Collects the values of every persisted field of a record.
pub(crate) fn record_values<T: Entity>(descriptor: &EntityDescriptor, record: &T) -> Vec<Value> {
    descriptor
        .columns()
        .iter()
        .map(|c| record.value(&c.name))
        .collect()
}

/// Collects the key values of a record, in key order.
pub(crate) fn record_keys<T: Entity>(descriptor: &EntityDescriptor, record: &T) -> Vec<Value> {
    descriptor
        .key_columns()
        .map(|c| record.value(&c.name))
        .collect()
}

/// Builds a fresh record from a decoded row.
///
/// Null columns are skipped, leaving the field at its default.
pub(crate) fn materialize<T: Entity>(descriptor: &EntityDescriptor, values: Vec<Value>) -> Result<T> {
    let mut record = T::default();
    for (column, value) in descriptor.columns().iter().zip(values) {
        if value.is_null() {
            continue;
        }
        record
            .set_value(&column.name, value)
            .map_err(|e| StoreError::ConversionError {
                entity: descriptor.name().to_string(),
                field: column.name.clone(),
                message: e.to_string(),
            })?;
    }
    Ok(record)
}
