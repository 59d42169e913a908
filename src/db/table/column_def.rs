use crate::{
    common::error::{Result, ValueError},
    core::{
        serialization::{read_fixed, read_prefixed_str, write_fixed, write_prefixed},
        types::{DataType, Value},
    },
};

/// Definition of a single column in a table schema.
///
/// Specifies the column name and the data type; together they also decide
/// how a value of this column is validated and encoded on the wire.
///
/// # Example
///
/// ```
/// use heap_db::{ColumnDef, DataType};
///
/// let col = ColumnDef::new("name", DataType::VarChar(20));
/// assert_eq!(col.name, "name");
/// assert_eq!(col.to_string(), "name varchar(20)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDef {
    /// The column name.
    pub name: String,

    /// The data type for values in this column.
    pub data_type: DataType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_owned(),
            data_type,
        }
    }

    /// Checks a value against this column and returns the form that will be
    /// stored.
    ///
    /// Integers may be null but must fit in 32 bits. Strings may not be null
    /// and are limited in UTF-8 bytes, not characters; an integer written to
    /// a string column is stored as its decimal text.
    pub(crate) fn validate(&self, value: Value) -> Result<Value> {
        match (self.data_type, value) {
            (DataType::VarChar(_), Value::Null) => {
                Err(ValueError::NullString(self.name.clone()).into())
            }
            (DataType::Int32, Value::Null) => Ok(Value::Null),
            (DataType::Int32, Value::Integer(number)) => {
                check_int_range(number)?;
                Ok(Value::Integer(number))
            }
            (DataType::Int32, other) => Err(self.type_mismatch(&other).into()),
            (DataType::VarChar(max), Value::Integer(number)) => {
                let text = number.to_string();
                check_length(&text, max)?;
                Ok(Value::Text(text))
            }
            (DataType::VarChar(max), Value::Text(text)) => {
                check_length(&text, max)?;
                Ok(Value::Text(text))
            }
        }
    }

    /// Encodes one value of this column into `out`.
    ///
    /// - Integer: 4 bytes (little-endian i32)
    /// - VarChar: 4-byte length (u32) + UTF-8 bytes
    ///
    /// Nulls have no wire representation.
    pub(crate) fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match (self.data_type, value) {
            (_, Value::Null) => Err(ValueError::NullValue(self.name.clone()).into()),
            (DataType::Int32, Value::Integer(number)) => {
                write_fixed(check_int_range(*number)?, out);
                Ok(())
            }
            (DataType::VarChar(max), Value::Text(text)) => {
                check_length(text, max)?;
                write_prefixed(text.as_bytes(), out);
                Ok(())
            }
            (_, other) => Err(self.type_mismatch(other).into()),
        }
    }

    /// Decodes one value of this column starting at `offset`.
    ///
    /// Returns the value and the offset just past it.
    pub(crate) fn decode(&self, bytes: &[u8], offset: usize) -> Result<(Value, usize)> {
        match self.data_type {
            DataType::Int32 => {
                let (number, end) = read_fixed::<i32, 4>(bytes, offset)?;
                Ok((Value::Integer(number.into()), end))
            }
            DataType::VarChar(max) => {
                let (text, end) = read_prefixed_str(bytes, offset, Some(max))?;
                Ok((Value::Text(text), end))
            }
        }
    }

    fn type_mismatch(&self, found: &Value) -> ValueError {
        ValueError::TypeMismatch {
            column: self.name.clone(),
            expected: self.data_type.to_string(),
            found: found.kind().to_owned(),
        }
    }
}

impl std::fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)
    }
}

fn check_int_range(number: i64) -> Result<i32, ValueError> {
    i32::try_from(number).map_err(|_| ValueError::RangeOverflow(number))
}

fn check_length(text: &str, max: usize) -> Result<(), ValueError> {
    let length = text.len();
    if length > max {
        return Err(ValueError::LengthExceeded { length, max });
    }
    Ok(())
}
