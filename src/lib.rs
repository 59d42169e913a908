//! Heap DB: an in-memory relational storage and query layer.
//!
//! Build a [`Schema`], share it with [`Schema::into_ref`], validate rows
//! as [`Tuple`]s against it, keep them in a [`Table`] and query tables with
//! [`SelectQuery`] and [`natural_join`].

pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod query;

pub use common::{
    config::{DEFAULT_LOG_FILTER, MAX_COLUMN_NAME_LENGTH},
    error::{DatabaseError, FormatError, Result, SchemaError, TableError, ValueError},
};
pub use crate::core::types::{DataType, TypeTag, Value};
pub use db::table::{
    Table,
    column_def::ColumnDef,
    schema::{Schema, SchemaRef},
    tuple::Tuple,
};
pub use query::{
    condition::{AlwaysTrue, And, Condition, ConditionExt, Equals, Not, Or, Predicate},
    join::natural_join,
    select::SelectQuery,
};
