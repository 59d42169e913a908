use std::rc::Rc;

use super::schema::SchemaRef;
use crate::{
    common::error::{FormatError, Result, SchemaError, TableError, ValueError},
    core::types::{DataType, Value},
};

/// A row of values bound to one schema.
///
/// Every value has been checked against its column, and the tuple can only
/// be changed through [`Tuple::set`], which re-runs that check. Nulls are
/// allowed in memory for non-key integer columns but cannot be serialized.
///
/// # Example
///
/// ```
/// use heap_db::{Schema, Tuple, Value};
///
/// let mut schema = Schema::new();
/// schema.add_key_int("id")?.add_varchar("name", 20)?;
/// let schema = schema.into_ref();
///
/// let tuple = Tuple::new(&schema, vec![Value::from(1), Value::from("Ada")])?;
/// assert_eq!(tuple.get_int(0)?, 1);
/// assert_eq!(tuple.get_by_name("name")?, &Value::from("Ada"));
/// assert_eq!(tuple.to_string(), "[1, Ada]");
/// # Ok::<(), heap_db::DatabaseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tuple {
    schema: SchemaRef,
    values: Vec<Value>,
}

impl Tuple {
    /// Creates a tuple from a full list of values, one per column.
    pub fn new(schema: &SchemaRef, values: Vec<Value>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(ValueError::ArityMismatch {
                expected: schema.len(),
                actual: values.len(),
            }
            .into());
        }

        let mut tuple = Self {
            schema: Rc::clone(schema),
            values: vec![Value::Null; values.len()],
        };
        for (index, value) in values.into_iter().enumerate() {
            tuple.set(index, value)?;
        }

        Ok(tuple)
    }

    /// Creates a tuple holding the default of each column: an empty string for
    /// VARCHAR columns and NULL for INT columns.
    ///
    /// Fails with `PrimaryKeyNull` when the key is an INT column.
    pub fn with_defaults(schema: &SchemaRef) -> Result<Self> {
        let values = schema
            .columns()
            .iter()
            .map(|col| match col.data_type {
                DataType::Int32 => Value::Null,
                DataType::VarChar(_) => Value::Text(String::new()),
            })
            .collect();

        Self::new(schema, values)
    }

    /// Builds a tuple under `schema` from a left and a right tuple.
    ///
    /// The first `left.len()` columns of `schema` must be `left`'s columns in
    /// order; every remaining column is looked up by name in `right`. A
    /// `schema` shorter than `left` fails with `OutOfRange`.
    pub fn join(schema: &SchemaRef, left: &Tuple, right: &Tuple) -> Result<Self> {
        let mut values = Vec::with_capacity(schema.len());

        for (index, value) in left.values.iter().enumerate() {
            let expected = schema.column_name(index)?;
            let left_name = left.schema.column_name(index)?;
            if left_name != expected {
                return Err(TableError::JoinSchemaMismatch {
                    index,
                    expected: expected.to_owned(),
                    found: left_name.to_owned(),
                }
                .into());
            }
            values.push(value.clone());
        }

        for column in schema.columns().iter().skip(left.len()) {
            values.push(right.get_by_name(&column.name)?.clone());
        }

        Self::new(schema, values)
    }

    /// Builds a tuple under `schema` by taking each of its columns from this
    /// tuple by name.
    pub fn projection(&self, schema: &SchemaRef) -> Result<Self> {
        let values = schema
            .columns()
            .iter()
            .map(|col| self.get_by_name(&col.name).cloned())
            .collect::<Result<Vec<_>>>()?;

        Self::new(schema, values)
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Number of values (always the schema's column count).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values in schema order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or_else(|| {
            SchemaError::OutOfRange {
                index,
                len: self.values.len(),
            }
            .into()
        })
    }

    pub fn get_by_name(&self, name: &str) -> Result<&Value> {
        let index = self
            .schema
            .column_index(name)
            .ok_or_else(|| SchemaError::UnknownColumn(name.to_owned()))?;
        self.get(index)
    }

    /// Returns the value of an INT column.
    pub fn get_int(&self, index: usize) -> Result<i32> {
        let column = self.schema.column(index)?;
        if column.data_type != DataType::Int32 {
            return Err(self.accessor_mismatch(index, "int"));
        }

        match self.get(index)? {
            Value::Integer(number) => {
                i32::try_from(*number).map_err(|_| ValueError::RangeOverflow(*number).into())
            }
            _ => Err(ValueError::NullValue(column.name.clone()).into()),
        }
    }

    /// Returns the value of a VARCHAR column.
    pub fn get_string(&self, index: usize) -> Result<&str> {
        let column = self.schema.column(index)?;
        if !matches!(column.data_type, DataType::VarChar(_)) {
            return Err(self.accessor_mismatch(index, "varchar"));
        }

        match self.get(index)? {
            Value::Text(text) => Ok(text),
            _ => Err(ValueError::NullValue(column.name.clone()).into()),
        }
    }

    /// The primary-key value, if the schema declares a key.
    pub fn key(&self) -> Option<&Value> {
        self.schema.key_index().map(|idx| &self.values[idx])
    }

    /// Replaces the value at `index` after validating it.
    ///
    /// Checks run in this order: key not null, string not null, integer
    /// type and range, string byte length. On failure the tuple is left
    /// unchanged.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let column = self.schema.column(index)?;

        if value.is_null() && self.schema.key_index() == Some(index) {
            return Err(ValueError::PrimaryKeyNull(column.name.clone()).into());
        }

        self.values[index] = column.validate(value)?;
        Ok(())
    }

    /// Encodes every column in schema order.
    ///
    /// Fails with `NullValue` if any column holds NULL.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.schema.row_byte_width());
        for (column, value) in self.schema.columns().iter().zip(&self.values) {
            column.encode(value, &mut bytes)?;
        }
        Ok(bytes)
    }

    /// Decodes a tuple produced by [`Tuple::serialize`] under `schema`.
    pub fn deserialize(schema: &SchemaRef, bytes: &[u8]) -> Result<Self> {
        let mut values = Vec::with_capacity(schema.len());
        let mut offset = 0;

        for column in schema.columns() {
            let (value, next) = column.decode(bytes, offset)?;
            values.push(value);
            offset = next;
        }

        if offset != bytes.len() {
            return Err(FormatError::TrailingBytes(bytes.len() - offset).into());
        }

        Self::new(schema, values)
    }

    /// Column name → value pairs in schema order.
    pub fn to_map(&self) -> Vec<(&str, &Value)> {
        self.schema
            .columns()
            .iter()
            .map(|col| col.name.as_str())
            .zip(&self.values)
            .collect()
    }

    fn accessor_mismatch(&self, index: usize, expected: &str) -> crate::DatabaseError {
        let found = self.values[index].kind();
        let column = &self.schema.columns()[index];
        ValueError::TypeMismatch {
            column: column.name.clone(),
            expected: expected.to_owned(),
            found: format!("{} column holding {found}", column.data_type),
        }
        .into()
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.schema, &other.schema) && self.values == other.values
    }
}

impl Eq for Tuple {}

impl std::fmt::Display for Tuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatabaseError, Schema};

    fn person_schema() -> SchemaRef {
        let mut schema = Schema::new();
        schema
            .add_key_int("id")
            .unwrap()
            .add_varchar("name", 20)
            .unwrap()
            .add_int("age")
            .unwrap();
        schema.into_ref()
    }

    fn ada(schema: &SchemaRef) -> Tuple {
        Tuple::new(schema, vec![1.into(), "Ada".into(), 36.into()]).unwrap()
    }

    #[test]
    fn test_new_validates_every_column() {
        let schema = person_schema();
        let result = Tuple::new(&schema, vec![1.into(), "Ada".into(), "old".into()]);
        assert!(matches!(
            result,
            Err(DatabaseError::Value(ValueError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_new_arity_mismatch() {
        let schema = person_schema();
        let result = Tuple::new(&schema, vec![1.into()]);
        assert!(matches!(
            result,
            Err(DatabaseError::Value(ValueError::ArityMismatch {
                expected: 3,
                actual: 1
            }))
        ));
    }

    #[test]
    fn test_new_key_cannot_be_null() {
        let schema = person_schema();
        let result = Tuple::new(&schema, vec![Value::Null, "Ada".into(), 36.into()]);
        assert!(matches!(
            result,
            Err(DatabaseError::Value(ValueError::PrimaryKeyNull(_)))
        ));
    }

    #[test]
    fn test_with_defaults() {
        let mut schema = Schema::new();
        schema
            .add_key_varchar("code", 4)
            .unwrap()
            .add_int("count")
            .unwrap();
        let schema = schema.into_ref();

        let tuple = Tuple::with_defaults(&schema).unwrap();
        assert_eq!(tuple.get(0).unwrap(), &Value::from(""));
        assert_eq!(tuple.get(1).unwrap(), &Value::Null);

        // An INT key has no non-null default.
        assert!(matches!(
            Tuple::with_defaults(&person_schema()),
            Err(DatabaseError::Value(ValueError::PrimaryKeyNull(_)))
        ));
    }

    #[test]
    fn test_get_by_index_and_name() {
        let schema = person_schema();
        let tuple = ada(&schema);

        assert_eq!(tuple.get(1).unwrap(), &Value::from("Ada"));
        assert_eq!(tuple.get_by_name("age").unwrap(), &Value::Integer(36));
        assert!(matches!(
            tuple.get(3),
            Err(DatabaseError::Schema(SchemaError::OutOfRange { .. }))
        ));
        assert!(matches!(
            tuple.get_by_name("email"),
            Err(DatabaseError::Schema(SchemaError::UnknownColumn(_)))
        ));
        assert_eq!(tuple.key(), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_typed_accessors() {
        let schema = person_schema();
        let mut tuple = ada(&schema);

        assert_eq!(tuple.get_int(2).unwrap(), 36);
        assert_eq!(tuple.get_string(1).unwrap(), "Ada");
        assert!(matches!(
            tuple.get_int(1),
            Err(DatabaseError::Value(ValueError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            tuple.get_string(0),
            Err(DatabaseError::Value(ValueError::TypeMismatch { .. }))
        ));

        tuple.set(2, Value::Null).unwrap();
        assert!(matches!(
            tuple.get_int(2),
            Err(DatabaseError::Value(ValueError::NullValue(_)))
        ));
    }

    #[test]
    fn test_set_validation_order() {
        let schema = person_schema();
        let mut tuple = ada(&schema);

        assert!(matches!(
            tuple.set(0, Value::Null),
            Err(DatabaseError::Value(ValueError::PrimaryKeyNull(_)))
        ));
        assert!(matches!(
            tuple.set(1, Value::Null),
            Err(DatabaseError::Value(ValueError::NullString(_)))
        ));
        assert!(matches!(
            tuple.set(2, i64::from(i32::MAX) + 1),
            Err(DatabaseError::Value(ValueError::RangeOverflow(_)))
        ));
        assert!(matches!(
            tuple.set(1, "x".repeat(21)),
            Err(DatabaseError::Value(ValueError::LengthExceeded { .. }))
        ));

        // failed sets leave the tuple untouched
        assert_eq!(tuple, ada(&schema));
    }

    #[test]
    fn test_set_counts_utf8_bytes() {
        let schema = person_schema();
        let mut tuple = ada(&schema);

        // 10 characters, 20 bytes
        assert!(tuple.set(1, "éééééééééé").is_ok());
        assert!(tuple.set(1, "ééééééééééx").is_err());
    }

    #[test]
    fn test_set_normalizes_integers_into_strings() {
        let schema = person_schema();
        let mut tuple = ada(&schema);

        tuple.set(1, 42).unwrap();
        assert_eq!(tuple.get_string(1).unwrap(), "42");
    }

    #[test]
    fn test_equality_requires_same_schema_instance() {
        let schema = person_schema();
        let twin = person_schema();

        assert_eq!(ada(&schema), ada(&schema));
        assert_ne!(ada(&schema), ada(&twin));
    }

    #[test]
    fn test_serialize_round_trip() {
        let schema = person_schema();
        let tuple = ada(&schema);

        let bytes = tuple.serialize().unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 3 + 4);
        assert_eq!(Tuple::deserialize(&schema, &bytes).unwrap(), tuple);
    }

    #[test]
    fn test_serialize_rejects_null() {
        let schema = person_schema();
        let mut tuple = ada(&schema);
        tuple.set(2, Value::Null).unwrap();

        assert!(matches!(
            tuple.serialize(),
            Err(DatabaseError::Value(ValueError::NullValue(column))) if column == "age"
        ));
    }

    #[test]
    fn test_deserialize_trailing_bytes() {
        let schema = person_schema();
        let mut bytes = ada(&schema).serialize().unwrap();
        bytes.push(0);

        assert!(matches!(
            Tuple::deserialize(&schema, &bytes),
            Err(DatabaseError::Format(FormatError::TrailingBytes(1)))
        ));
    }

    #[test]
    fn test_deserialize_truncated() {
        let schema = person_schema();
        let bytes = ada(&schema).serialize().unwrap();

        assert!(matches!(
            Tuple::deserialize(&schema, &bytes[..bytes.len() - 1]),
            Err(DatabaseError::Format(FormatError::TruncatedBuffer { .. }))
        ));
    }

    #[test]
    fn test_projection() {
        let schema = person_schema();
        let projected_schema = schema.projection(&["age", "name"]).unwrap().into_ref();

        let projected = ada(&schema).projection(&projected_schema).unwrap();
        assert_eq!(projected.to_string(), "[36, Ada]");
        assert!(Rc::ptr_eq(projected.schema(), &projected_schema));

        let mut other = Schema::new();
        other.add_int("height").unwrap();
        assert!(matches!(
            ada(&schema).projection(&other.into_ref()),
            Err(DatabaseError::Schema(SchemaError::UnknownColumn(_)))
        ));
    }

    #[test]
    fn test_join() {
        let left_schema = person_schema();
        let mut right = Schema::new();
        right
            .add_key_int("id")
            .unwrap()
            .add_varchar("city", 10)
            .unwrap();
        let right_schema = right.into_ref();
        let joined_schema = left_schema.natural_join(&right_schema).into_ref();

        let right_tuple = Tuple::new(&right_schema, vec![1.into(), "London".into()]).unwrap();
        let joined = Tuple::join(&joined_schema, &ada(&left_schema), &right_tuple).unwrap();
        assert_eq!(joined.to_string(), "[1, Ada, 36, London]");

        // swapping sides breaks the positional prefix
        assert!(matches!(
            Tuple::join(&joined_schema, &right_tuple, &ada(&left_schema)),
            Err(DatabaseError::Table(TableError::JoinSchemaMismatch { index: 1, .. }))
        ));
    }

    #[test]
    fn test_join_target_shorter_than_left() {
        let mut left = Schema::new();
        left.add_int("a").unwrap().add_int("b").unwrap();
        let left = left.into_ref();
        let mut right = Schema::new();
        right.add_int("c").unwrap();
        let right = right.into_ref();
        let mut target = Schema::new();
        target.add_int("a").unwrap();
        let target = target.into_ref();

        let lt = Tuple::new(&left, vec![1.into(), 2.into()]).unwrap();
        let rt = Tuple::new(&right, vec![3.into()]).unwrap();
        assert!(matches!(
            Tuple::join(&target, &lt, &rt),
            Err(DatabaseError::Schema(SchemaError::OutOfRange { index: 1, len: 1 }))
        ));
    }

    #[test]
    fn test_join_column_missing_from_right() {
        let left_schema = person_schema();
        let mut right = Schema::new();
        right.add_key_int("id").unwrap();
        let right_schema = right.into_ref();
        let mut target = (*left_schema).clone();
        target.add_varchar("zz", 5).unwrap();
        let target = target.into_ref();

        let right_tuple = Tuple::new(&right_schema, vec![1.into()]).unwrap();
        assert!(matches!(
            Tuple::join(&target, &ada(&left_schema), &right_tuple),
            Err(DatabaseError::Schema(SchemaError::UnknownColumn(column))) if column == "zz"
        ));
    }

    #[test]
    fn test_to_map() {
        let schema = person_schema();
        let tuple = ada(&schema);
        let map = tuple.to_map();
        assert_eq!(map[0], ("id", &Value::Integer(1)));
        assert_eq!(map[2], ("age", &Value::Integer(36)));
    }
}
