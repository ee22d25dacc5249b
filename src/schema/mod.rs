//! Mapping abstract schemas to physical table layouts and diffing them.

pub mod binding;
pub mod diff;
pub mod mapper;

pub use binding::{bind, TableBinding};
pub use diff::{diff, ChangeSet};
pub use mapper::{map, ColumnDescriptor, ColumnType};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field {name:?} is not part of the table schema")]
    UnknownField { name: String },
}
