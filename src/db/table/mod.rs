use std::rc::Rc;

use tracing::debug;

use crate::{
    common::error::{Result, SchemaError, TableError},
    core::types::Value,
};

pub mod column_def;
pub mod schema;
pub mod tuple;

use schema::SchemaRef;
use tuple::Tuple;

/// An in-memory table: an ordered sequence of tuples sharing one schema.
///
/// When the schema declares a primary key, no two tuples hold equal key
/// values. Lookups are linear scans; there is no index.
///
/// # Example
///
/// ```
/// use heap_db::{Schema, Table, Tuple, Value};
///
/// let mut schema = Schema::new();
/// schema.add_key_int("id")?.add_varchar("name", 20)?;
/// let schema = schema.into_ref();
///
/// let mut table = Table::new(&schema);
/// assert!(table.insert(Tuple::new(&schema, vec![1.into(), "Ada".into()])?)?);
/// assert!(!table.insert(Tuple::new(&schema, vec![1.into(), "Grace".into()])?)?);
/// assert_eq!(table.len(), 1);
/// # Ok::<(), heap_db::DatabaseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    /// The table's schema, shared with every tuple in it.
    schema: SchemaRef,

    /// Tuples in insertion order.
    tuples: Vec<Tuple>,
}

impl Table {
    /// Creates an empty table over `schema`.
    pub fn new(schema: &SchemaRef) -> Self {
        Self {
            schema: Rc::clone(schema),
            tuples: Vec::new(),
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    /// Appends a tuple.
    ///
    /// The tuple must have been built from this table's schema handle.
    /// Returns `Ok(false)` without changing the table when the key is
    /// already present.
    pub fn insert(&mut self, tuple: Tuple) -> Result<bool> {
        if !Rc::ptr_eq(tuple.schema(), &self.schema) {
            return Err(TableError::SchemaIdentityMismatch.into());
        }

        if let Some(key) = tuple.key().filter(|key| self.position_of_key(key).is_some()) {
            debug!(%key, "rejected duplicate primary key");
            return Ok(false);
        }

        self.tuples.push(tuple);
        Ok(true)
    }

    /// Removes the tuple with the given key.
    ///
    /// Returns `Ok(false)` if no tuple has that key.
    pub fn delete(&mut self, key: impl Into<Value>) -> Result<bool> {
        let key = key.into();
        self.require_key()?;

        match self.position_of_key(&key) {
            Some(position) => {
                self.tuples.remove(position);
                debug!(%key, "deleted tuple");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// σ selection on the primary key.
    pub fn lookup_by_key(&self, key: impl Into<Value>) -> Result<Option<&Tuple>> {
        let key = key.into();
        self.require_key()?;

        Ok(self.position_of_key(&key).map(|position| &self.tuples[position]))
    }

    /// σ selection on `column = value`, collected into a new table over the
    /// same schema.
    pub fn lookup_by_column(&self, column: &str, value: impl Into<Value>) -> Result<Table> {
        let value = value.into();
        let index = self
            .schema
            .column_index(column)
            .ok_or_else(|| SchemaError::UnknownColumn(column.to_owned()))?;

        let mut result = Table::new(&self.schema);
        for tuple in self.tuples.iter().filter(|t| t.get(index).ok() == Some(&value)) {
            result.insert(tuple.clone())?;
        }

        Ok(result)
    }

    fn require_key(&self) -> Result<usize> {
        self.schema
            .key_index()
            .ok_or_else(|| TableError::NoPrimaryKey.into())
    }

    fn position_of_key(&self, key: &Value) -> Option<usize> {
        self.tuples.iter().position(|t| t.key() == Some(key))
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.tuples.is_empty() {
            return write!(f, "Empty Table");
        }

        for (idx, tuple) in self.tuples.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{tuple}")?;
        }
        Ok(())
    }
}
