use strum::{Display, FromRepr};

use crate::common::config::{INT_WIDTH, LENGTH_PREFIX_WIDTH};

/// Column types supported by Heap DB.
///
/// These types define the kind of data a column can hold and how
/// it's encoded/decoded on the wire.
///
/// # Example
///
/// ```
/// use heap_db::DataType;
///
/// assert_eq!(DataType::Int32.external_name(), "int");
/// assert_eq!(DataType::VarChar(20).external_name(), "varchar(20)");
/// assert_eq!(DataType::VarChar(20).max_size_bytes(), 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 32-bit signed integer.
    ///
    /// Stored as 4 bytes in little-endian format.
    Int32,

    /// Variable-length text with maximum length.
    ///
    /// Stored as 4-byte length prefix + UTF-8 bytes.
    /// The usize parameter specifies the maximum number of bytes allowed.
    VarChar(usize),
}

/// Stable numeric tag stored in serialized schema metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u32)]
pub enum TypeTag {
    #[strum(serialize = "int")]
    Int = 1,
    #[strum(serialize = "varchar")]
    VarChar = 2,
}

impl DataType {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            DataType::Int32 => TypeTag::Int,
            DataType::VarChar(_) => TypeTag::VarChar,
        }
    }

    /// Size limit as declared in SQL terms: the storage width for `int`,
    /// the byte limit for `varchar(N)`.
    pub fn max_sql_length(&self) -> usize {
        match self {
            DataType::Int32 => INT_WIDTH,
            DataType::VarChar(max) => *max,
        }
    }

    /// Upper bound on the encoded width of one value of this type.
    pub fn max_size_bytes(&self) -> usize {
        match self {
            DataType::Int32 => INT_WIDTH,
            DataType::VarChar(max) => max + LENGTH_PREFIX_WIDTH,
        }
    }

    /// Name used when rendering a schema, e.g. `varchar(30)`.
    pub fn external_name(&self) -> String {
        self.to_string()
    }

    /// Rebuilds a type from its serialized tag and max-length fields.
    pub(crate) fn from_parts(tag: TypeTag, max_length: usize) -> Self {
        match tag {
            TypeTag::Int => DataType::Int32,
            TypeTag::VarChar => DataType::VarChar(max_length),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int32 => write!(f, "{}", TypeTag::Int),
            DataType::VarChar(max) => write!(f, "{}({})", TypeTag::VarChar, max),
        }
    }
}

/// A value that can be stored in a tuple.
///
/// Integers are carried as `i64` so an out-of-range input can be reported
/// instead of silently truncated; a stored integer always fits in `i32`.
///
/// # Example
///
/// ```
/// use heap_db::Value;
///
/// assert_eq!(Value::from(42), Value::Integer(42));
/// assert_eq!(Value::from("Ada"), Value::Text("Ada".to_string()));
/// assert_eq!(Value::from(None::<i32>), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A signed integer value.
    Integer(i64),

    /// A UTF-8 text string.
    Text(String),

    /// Represents a NULL value (absence of data).
    ///
    /// Never allowed in a key or string column, and never serialized.
    Null,
}

impl Value {
    /// Short description of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Text(_) => "string",
            Value::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
