pub mod condition;
pub mod join;
pub mod select;
