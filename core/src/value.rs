//! Field values crossing the engine boundary.
//!
//! [`Value`] carries one field of a record into a statement parameter or out
//! of a result column. Conversions exist in both directions for every Rust
//! type the engine can store; [`Value::Null`] converts to the target type's
//! default so unset columns leave fields at their defaults.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors converting a [`Value`] into a concrete Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value holds a different variant than the target type expects.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Name of the expected variant.
        expected: &'static str,
        /// Name of the variant actually held.
        found: &'static str,
    },
}

/// A single field value.
///
/// # Examples
///
/// ```
/// use entity_store_core::Value;
///
/// let v = Value::from(42_i32);
/// assert_eq!(i32::try_from(v).unwrap(), 42);
///
/// // Null decodes to the default value.
/// assert_eq!(String::try_from(Value::Null).unwrap(), "");
///
/// // Wrong variant is an error.
/// assert!(bool::try_from(Value::from("yes")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Single byte.
    Byte(u8),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit unsigned integer.
    ULong(u64),
    /// Text of any length.
    Text(String),
    /// UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Byte sequence.
    Bytes(Vec<u8>),
}

impl Value {
    /// Variant name, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::ULong(_) => "ulong",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ValueError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        Value::Null => Ok(<$ty>::default()),
                        other => Err(ValueError::TypeMismatch {
                            expected: $name,
                            found: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    bool => Bool, "bool";
    u8 => Byte, "byte";
    i32 => Int, "int";
    i64 => Long, "long";
    u64 => ULong, "ulong";
    String => Text, "text";
    DateTime<Utc> => Timestamp, "timestamp";
    f32 => Float, "float";
    f64 => Double, "double";
    Vec<u8> => Bytes, "bytes";
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
