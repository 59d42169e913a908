use tracing::{debug, trace};

use crate::{
    common::error::Result,
    db::table::{Table, tuple::Tuple},
};

/// ⨝ natural join of two tables.
///
/// Rows pair up when they agree on every column name the two schemas share;
/// with no shared column the result is the full Cartesian product. Output
/// order is left-table order outer, right-table order inner.
///
/// When the right table's key is a shared column each left row has at most
/// one partner, found with a key lookup instead of a scan of the right table.
/// The rows and their order are the same either way.
pub fn natural_join(left: &Table, right: &Table) -> Result<Table> {
    let left_schema = left.schema();
    let right_schema = right.schema();
    let joined_schema = left_schema.natural_join(right_schema).into_ref();
    let join_columns = left_schema.common_columns(right_schema);

    let mut result = Table::new(&joined_schema);

    if join_columns.is_empty() {
        for r1 in left {
            for r2 in right {
                result.insert(Tuple::join(&joined_schema, r1, r2)?)?;
            }
        }
        debug!(rows = result.len(), "cartesian product");
        return Ok(result);
    }

    let right_key = right_schema
        .key()
        .filter(|key| join_columns.contains(key));

    for r1 in left {
        match right_key {
            Some(key) => match right.lookup_by_key(r1.get_by_name(key)?.clone())? {
                Some(r2) if rows_match(r1, r2, &join_columns)? => {
                    trace!(left = %r1, right = %r2, "key match");
                    result.insert(Tuple::join(&joined_schema, r1, r2)?)?;
                }
                _ => {}
            },
            None => {
                for r2 in right {
                    if rows_match(r1, r2, &join_columns)? {
                        trace!(left = %r1, right = %r2, "match");
                        result.insert(Tuple::join(&joined_schema, r1, r2)?)?;
                    }
                }
            }
        }
    }

    debug!(
        rows = result.len(),
        on = ?join_columns,
        key_lookup = right_key.is_some(),
        "natural join"
    );
    Ok(result)
}

fn rows_match(r1: &Tuple, r2: &Tuple, columns: &[&str]) -> Result<bool> {
    for column in columns {
        if r1.get_by_name(column)? != r2.get_by_name(column)? {
            return Ok(false);
        }
    }
    Ok(true)
}
