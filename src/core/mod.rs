pub mod serialization;
pub mod types;
