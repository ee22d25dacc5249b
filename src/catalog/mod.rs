use async_trait::async_trait;

use crate::data_types::{AbstractSchema, TableDescriptor, TableId};

mod repository;

pub use repository::RepositoryStore;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{reason}")]
    Generic { reason: String },

    #[error("Table with ID {id} doesn't exist")]
    TableDoesNotExist { id: TableId },

    // Metastore implementation errors
    #[error("Internal SQL error: {0:?}")]
    SqlxError(sqlx::Error),

    #[error("Failed parsing JSON: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Durable storage of table descriptors: id, user-facing name and abstract schema
#[async_trait]
pub trait TableStore: Sync + Send {
    /// Persist a new descriptor and return it with its freshly allocated id
    async fn create(
        &self,
        name: &str,
        schema: &AbstractSchema,
    ) -> CatalogResult<TableDescriptor>;

    async fn get(&self, id: TableId) -> CatalogResult<TableDescriptor>;

    /// Overwrite the stored schema of an existing descriptor
    async fn save(&self, descriptor: &TableDescriptor) -> CatalogResult<()>;

    async fn delete(&self, id: TableId) -> CatalogResult<()>;
}
