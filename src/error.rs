use crate::catalog::CatalogError;
use crate::data_types::{FieldType, TableId};
use crate::repository::interface::Error as RepositoryError;
use crate::schema::SchemaError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Table with ID {id} doesn't exist")]
    NotFound { id: TableId },

    #[error("Field {field:?} is not part of the table schema")]
    UnknownField { field: String },

    #[error("{field} cannot be migrated from {from_type} to {to_type}")]
    IncompatibleAlteration {
        field: String,
        from_type: FieldType,
        to_type: FieldType,
    },

    #[error("Table {name:?} already exists")]
    TableAlreadyExists { name: String },

    #[error("Internal SQL error: {0:?}")]
    Engine(sqlx::Error),

    #[error(transparent)]
    Catalog(CatalogError),
}

pub type Result<T, E = TableError> = std::result::Result<T, E>;

impl From<SchemaError> for TableError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnknownField { name } => TableError::UnknownField { field: name },
        }
    }
}

impl From<CatalogError> for TableError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::TableDoesNotExist { id } => TableError::NotFound { id },
            CatalogError::SqlxError(e) => TableError::Engine(e),
            e => TableError::Catalog(e),
        }
    }
}

impl From<RepositoryError> for TableError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::IncompatibleValue {
                column, from, to, ..
            } => TableError::IncompatibleAlteration {
                field: column,
                from_type: from,
                to_type: to,
            },
            RepositoryError::NotNullViolation(e) => {
                TableError::Validation(ValidationError::MissingValue {
                    reason: e.to_string(),
                })
            }
            RepositoryError::UniqueConstraintViolation(e)
            | RepositoryError::DuplicateTable(e)
            | RepositoryError::SqlxError(e) => TableError::Engine(e),
        }
    }
}
