use std::rc::Rc;

use tracing::debug;

use super::column_def::ColumnDef;
use crate::{
    common::{
        config::MAX_COLUMN_NAME_LENGTH,
        error::{FormatError, Result, SchemaError},
    },
    core::{
        serialization::{read_fixed, read_prefixed_str, write_fixed, write_prefixed},
        types::{DataType, TypeTag},
    },
};

/// Shared handle to a schema.
///
/// Tuples and tables hold one of these; two handles describe "the same
/// schema" only when they point at the same allocation.
pub type SchemaRef = Rc<Schema>;

/// A table schema defining the structure of rows.
///
/// A schema is an ordered list of uniquely named column definitions with at
/// most one primary-key column. Columns are only ever appended; once the
/// schema is shared through a [`SchemaRef`] it is immutable.
///
/// # Example
///
/// ```
/// use heap_db::Schema;
///
/// let mut schema = Schema::new();
/// schema
///     .add_key_int("id")?
///     .add_varchar("name", 50)?
///     .add_int("age")?;
///
/// assert_eq!(schema.len(), 3);
/// assert_eq!(schema.column_index("name"), Some(1));
/// assert_eq!(schema.key(), Some("id"));
/// assert_eq!(schema.to_string(), "[id int PRIMARY KEY, name varchar(50), age int]");
/// # Ok::<(), heap_db::DatabaseError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// The ordered list of column definitions.
    columns: Vec<ColumnDef>,

    /// Index of the primary-key column, if any.
    key: Option<usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the schema in a shared handle.
    pub fn into_ref(self) -> SchemaRef {
        Rc::new(self)
    }

    /// Appends an INT column.
    pub fn add_int(&mut self, name: &str) -> Result<&mut Self> {
        self.push(ColumnDef::new(name, DataType::Int32))
    }

    /// Appends a VARCHAR column holding at most `max_size` UTF-8 bytes.
    pub fn add_varchar(&mut self, name: &str, max_size: usize) -> Result<&mut Self> {
        if max_size == 0 {
            return Err(SchemaError::InvalidSize(max_size).into());
        }
        self.push(ColumnDef::new(name, DataType::VarChar(max_size)))
    }

    /// Appends an INT column and makes it the primary key.
    pub fn add_key_int(&mut self, name: &str) -> Result<&mut Self> {
        self.ensure_no_key()?;
        self.add_int(name)?;
        self.set_key_to_last(name);
        Ok(self)
    }

    /// Appends a VARCHAR column and makes it the primary key.
    pub fn add_key_varchar(&mut self, name: &str, max_size: usize) -> Result<&mut Self> {
        self.ensure_no_key()?;
        self.add_varchar(name, max_size)?;
        self.set_key_to_last(name);
        Ok(self)
    }

    fn push(&mut self, column: ColumnDef) -> Result<&mut Self> {
        let name_len = column.name.chars().count();
        if name_len == 0 || name_len > MAX_COLUMN_NAME_LENGTH {
            return Err(SchemaError::InvalidName {
                name: column.name,
                max: MAX_COLUMN_NAME_LENGTH,
            }
            .into());
        }
        if self.column_index(&column.name).is_some() {
            return Err(SchemaError::DuplicateColumn(column.name).into());
        }

        self.columns.push(column);
        Ok(self)
    }

    fn ensure_no_key(&self) -> Result<()> {
        match self.key() {
            Some(key) => Err(SchemaError::KeyAlreadySet(key.to_owned()).into()),
            None => Ok(()),
        }
    }

    fn set_key_to_last(&mut self, name: &str) {
        debug!(key = name, "primary key set");
        self.key = self.columns.len().checked_sub(1);
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The columns in schema order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Finds the index of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn column(&self, index: usize) -> Result<&ColumnDef> {
        self.columns.get(index).ok_or_else(|| {
            SchemaError::OutOfRange {
                index,
                len: self.columns.len(),
            }
            .into()
        })
    }

    pub fn column_name(&self, index: usize) -> Result<&str> {
        self.column(index).map(|col| col.name.as_str())
    }

    pub fn column_type(&self, index: usize) -> Result<DataType> {
        self.column(index).map(|col| col.data_type)
    }

    /// The declared SQL size of a column: 4 for int, N for varchar(N).
    pub fn max_sql_size(&self, index: usize) -> Result<usize> {
        self.column_type(index).map(|ty| ty.max_sql_length())
    }

    /// Name of the primary-key column, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.map(|idx| self.columns[idx].name.as_str())
    }

    pub fn key_index(&self) -> Option<usize> {
        self.key
    }

    /// Upper bound on the encoded size of one tuple.
    ///
    /// Strings are variable-length on the wire, so the real packed size is
    /// usually smaller.
    pub fn row_byte_width(&self) -> usize {
        self.columns
            .iter()
            .map(|col| col.data_type.max_size_bytes())
            .sum()
    }

    /// π projection: a new schema with only `names`, in the order given.
    ///
    /// The primary key survives only if its column is part of the projection.
    pub fn projection<S: AsRef<str>>(&self, names: &[S]) -> Result<Schema> {
        let mut projected = Schema::new();

        for name in names {
            let name = name.as_ref();
            let index = self
                .column_index(name)
                .ok_or_else(|| SchemaError::UnknownColumn(name.to_owned()))?;

            projected.push(self.columns[index].clone())?;
            if self.key == Some(index) {
                projected.key = Some(projected.columns.len() - 1);
            }
        }

        Ok(projected)
    }

    /// ⨝ natural join: this schema's columns followed by the columns of
    /// `other` whose names are not already present.
    ///
    /// The left key is kept only when `other`'s key is one of the shared
    /// columns; otherwise a left row could pair with several right rows and
    /// the key would no longer be unique.
    pub fn natural_join(&self, other: &Schema) -> Schema {
        let mut joined = Schema {
            columns: self.columns.clone(),
            key: None,
        };

        for column in &other.columns {
            if self.column_index(&column.name).is_none() {
                joined.columns.push(column.clone());
            }
        }

        let right_key_shared = other
            .key()
            .is_some_and(|key| self.column_index(key).is_some());
        if right_key_shared {
            joined.key = self.key;
        }

        joined
    }

    /// Column names present in both schemas, in this schema's order.
    pub fn common_columns<'a>(&'a self, other: &Schema) -> Vec<&'a str> {
        self.columns
            .iter()
            .map(|col| col.name.as_str())
            .filter(|name| other.column_index(name).is_some())
            .collect()
    }

    /// Serializes the schema metadata.
    ///
    /// Per column: u32 name length, name bytes, u32 type tag, u32 max
    /// length, u32 primary-key flag. All integers little-endian.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        for (idx, column) in self.columns.iter().enumerate() {
            write_prefixed(column.name.as_bytes(), &mut bytes);
            write_fixed(column.data_type.type_tag() as u32, &mut bytes);
            write_fixed(column.data_type.max_sql_length() as u32, &mut bytes);
            write_fixed(u32::from(self.key == Some(idx)), &mut bytes);
        }

        bytes
    }

    /// Rebuilds a schema from [`Schema::serialize`] output.
    ///
    /// Columns are read until the buffer is exhausted and go through the same
    /// checks as the `add_*` builders. A key flag other than 0 or 1 is
    /// rejected.
    pub fn deserialize(bytes: &[u8]) -> Result<Schema> {
        let mut schema = Schema::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let (name, next) = read_prefixed_str(bytes, offset, None)?;
            let (tag, next) = read_fixed::<u32, 4>(bytes, next)?;
            let (max_length, next) = read_fixed::<u32, 4>(bytes, next)?;
            let (is_key, next) = read_fixed::<u32, 4>(bytes, next)?;
            offset = next;

            let tag = TypeTag::from_repr(tag).ok_or(FormatError::UnknownTypeTag(tag))?;
            let is_key = match is_key {
                0 => false,
                1 => true,
                flag => return Err(FormatError::InvalidKeyFlag(flag).into()),
            };
            match (DataType::from_parts(tag, max_length as usize), is_key) {
                (DataType::Int32, false) => schema.add_int(&name)?,
                (DataType::Int32, true) => schema.add_key_int(&name)?,
                (DataType::VarChar(max), false) => schema.add_varchar(&name, max)?,
                (DataType::VarChar(max), true) => schema.add_key_varchar(&name, max)?,
            };
        }

        Ok(schema)
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (idx, column) in self.columns.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{column}")?;
            if self.key == Some(idx) {
                write!(f, " PRIMARY KEY")?;
            }
        }
        write!(f, "]")
    }
}
