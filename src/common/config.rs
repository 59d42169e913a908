//! Compile-time limits shared by the schema, the codec and the demo binary.

/// Longest column name a schema accepts, in characters.
pub const MAX_COLUMN_NAME_LENGTH: usize = 24;

/// Encoded width of an integer column.
pub const INT_WIDTH: usize = 4;

/// Width of the length prefix in front of every encoded string.
pub const LENGTH_PREFIX_WIDTH: usize = 4;

/// Log filter used by the binary when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "heap_db=info,heapdb=info";
