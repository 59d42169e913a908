use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

/// Top-level error returned by every fallible operation.
///
/// Each category wraps transparently, so `?` lifts a category error into
/// a `DatabaseError` and a caller can still match on the inner kind.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),
}

/// Errors raised while building or addressing a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SchemaError {
    #[error("Duplicate column name '{0}'")]
    #[diagnostic(code(heap_db::schema::duplicate_column))]
    DuplicateColumn(String),

    #[error("Invalid column name '{name}': must be non-empty and at most {max} characters")]
    #[diagnostic(code(heap_db::schema::invalid_name))]
    InvalidName { name: String, max: usize },

    #[error("Invalid VARCHAR size {0}: must be greater than zero")]
    #[diagnostic(code(heap_db::schema::invalid_size))]
    InvalidSize(usize),

    #[error("Primary key already set to '{0}'")]
    #[diagnostic(code(heap_db::schema::key_already_set))]
    KeyAlreadySet(String),

    #[error("Column '{0}' not found")]
    #[diagnostic(code(heap_db::schema::unknown_column))]
    UnknownColumn(String),

    #[error("No column at index {index} (schema has {len} columns)")]
    #[diagnostic(code(heap_db::schema::out_of_range))]
    OutOfRange { index: usize, len: usize },
}

/// Errors raised when a value does not fit the column it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValueError {
    #[error("Column '{column}' expects {expected}, got {found}")]
    #[diagnostic(code(heap_db::value::type_mismatch))]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Value {0} is out of the signed 32-bit range")]
    #[diagnostic(code(heap_db::value::range_overflow))]
    RangeOverflow(i64),

    #[error("String of {length} bytes exceeds VARCHAR({max}) limit")]
    #[diagnostic(code(heap_db::value::length_exceeded))]
    LengthExceeded { length: usize, max: usize },

    #[error("Primary key '{0}' cannot be null")]
    #[diagnostic(code(heap_db::value::primary_key_null))]
    PrimaryKeyNull(String),

    #[error("String column '{0}' cannot be null")]
    #[diagnostic(
        code(heap_db::value::null_string),
        help("use an empty string for a string column with no data")
    )]
    NullString(String),

    #[error("Column '{0}' holds NULL")]
    #[diagnostic(code(heap_db::value::null_value))]
    NullValue(String),

    #[error("Expected {expected} values for schema, got {actual}")]
    #[diagnostic(code(heap_db::value::arity_mismatch))]
    ArityMismatch { expected: usize, actual: usize },
}

/// Errors raised while decoding the binary wire formats.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum FormatError {
    #[error("Not enough bytes: needed {needed} at offset {offset}, buffer has {available}")]
    #[diagnostic(code(heap_db::format::truncated_buffer))]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Encoded length {length} exceeds max {max}")]
    #[diagnostic(code(heap_db::format::corrupt_length))]
    CorruptLength { length: usize, max: usize },

    #[error("Invalid UTF-8 sequence at offset {0}")]
    #[diagnostic(code(heap_db::format::decode_utf8))]
    DecodeUtf8(usize),

    #[error("Unknown column type tag {0}")]
    #[diagnostic(code(heap_db::format::unknown_type_tag))]
    UnknownTypeTag(u32),

    #[error("Primary-key flag must be 0 or 1, found {0}")]
    #[diagnostic(code(heap_db::format::invalid_key_flag))]
    InvalidKeyFlag(u32),

    #[error("{0} trailing bytes after the last column")]
    #[diagnostic(code(heap_db::format::trailing_bytes))]
    TrailingBytes(usize),
}

/// Errors raised by table operations and tuple joins.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum TableError {
    #[error("Tuple schema does not match table schema")]
    #[diagnostic(
        code(heap_db::table::schema_identity_mismatch),
        help("build the tuple from the same schema handle the table was created with")
    )]
    SchemaIdentityMismatch,

    #[error("Table does not have a primary key")]
    #[diagnostic(code(heap_db::table::no_primary_key))]
    NoPrimaryKey,

    #[error("Join schema column {index} is '{expected}', left tuple has '{found}'")]
    #[diagnostic(code(heap_db::table::join_schema_mismatch))]
    JoinSchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },
}
