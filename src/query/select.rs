use std::{fmt, rc::Rc};

use tracing::debug;

use super::condition::Condition;
use crate::{common::error::Result, db::table::Table};

/// σ/π query: keeps the rows matching a condition, optionally projected to
/// a list of columns.
///
/// # Example
///
/// ```
/// use heap_db::{Equals, Schema, SelectQuery, Table, Tuple};
///
/// let mut schema = Schema::new();
/// schema.add_key_int("id")?.add_varchar("name", 20)?;
/// let schema = schema.into_ref();
///
/// let mut table = Table::new(&schema);
/// table.insert(Tuple::new(&schema, vec![1.into(), "Ada".into()])?)?;
/// table.insert(Tuple::new(&schema, vec![2.into(), "Grace".into()])?)?;
///
/// let query = SelectQuery::new(Some(&["name"]), Equals::new("id", 2));
/// let result = query.apply(&table)?;
/// assert_eq!(result.to_string(), "[Grace]");
/// assert_eq!(query.to_string(), "select name where id = 2");
/// # Ok::<(), heap_db::DatabaseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery<C> {
    /// Columns to project; `None` keeps every column (`select *`).
    columns: Option<Vec<String>>,
    condition: C,
}

impl<C: Condition> SelectQuery<C> {
    /// Projects onto `columns` when given; use [`SelectQuery::all`] for `select *`.
    ///
    /// A bare `None` leaves the column list type unknown, so
    /// `SelectQuery::new(None, cond)` needs a turbofish such as
    /// `None::<&[&str]>`; [`SelectQuery::all`] is the same query without one.
    pub fn new<I>(columns: Option<I>, condition: C) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            columns: columns.map(|names| {
                names
                    .into_iter()
                    .map(|name| name.as_ref().to_owned())
                    .collect()
            }),
            condition,
        }
    }

    /// `select *` with the given condition.
    pub fn all(condition: C) -> Self {
        Self {
            columns: None,
            condition,
        }
    }

    /// Runs the query, producing a new table.
    ///
    /// Without a projection the result shares the source schema handle and
    /// holds the matching tuples unchanged; with one, the result has a new
    /// schema and every matching tuple is projected onto it. Source order is
    /// preserved.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let source = table.schema();
        let schema = match &self.columns {
            None => Rc::clone(source),
            Some(names) => source.projection(names.as_slice())?.into_ref(),
        };
        let needs_projection = !Rc::ptr_eq(&schema, source);

        let mut result = Table::new(&schema);
        for row in table {
            if !self.condition.evaluate(row)? {
                continue;
            }

            let row = if needs_projection {
                row.projection(&schema)?
            } else {
                row.clone()
            };
            result.insert(row)?;
        }

        debug!(query = %self, matched = result.len(), scanned = table.len(), "select");
        Ok(result)
    }
}

impl<C: Condition> fmt::Display for SelectQuery<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.columns {
            Some(names) => write!(f, "select {} where {}", names.join(","), self.condition),
            None => write!(f, "select * where {}", self.condition),
        }
    }
}
