use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::{CatalogError, CatalogResult, TableStore};
use crate::data_types::{AbstractSchema, TableDescriptor, TableId};
use crate::repository::interface::{Error as RepositoryError, Repository, TableRecord};

// Table descriptors stored in the `dynamic_table` relation of the same database
// that holds the physical tables.
pub struct RepositoryStore {
    pub repository: Arc<dyn Repository>,
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> CatalogError {
        match err {
            RepositoryError::UniqueConstraintViolation(e)
            | RepositoryError::NotNullViolation(e)
            | RepositoryError::DuplicateTable(e)
            | RepositoryError::SqlxError(e) => CatalogError::SqlxError(e),
            e @ RepositoryError::IncompatibleValue { .. } => CatalogError::Generic {
                reason: format!("Unexpected metadata store error: {e:?}"),
            },
        }
    }
}

fn not_found(id: TableId) -> impl FnOnce(RepositoryError) -> CatalogError {
    move |e| match e {
        RepositoryError::SqlxError(sqlx::error::Error::RowNotFound) => {
            CatalogError::TableDoesNotExist { id }
        }
        e => e.into(),
    }
}

impl TryFrom<TableRecord> for TableDescriptor {
    type Error = CatalogError;

    fn try_from(record: TableRecord) -> Result<Self, Self::Error> {
        Ok(TableDescriptor {
            id: record.id,
            name: record.name,
            schema: serde_json::from_str(&record.schema_json)?,
        })
    }
}

#[async_trait]
impl TableStore for RepositoryStore {
    async fn create(
        &self,
        name: &str,
        schema: &AbstractSchema,
    ) -> CatalogResult<TableDescriptor> {
        let schema_json = serde_json::to_string(schema)?;
        let id = self
            .repository
            .create_table_record(name, &schema_json)
            .await?;

        Ok(TableDescriptor {
            id,
            name: name.to_string(),
            schema: schema.clone(),
        })
    }

    async fn get(&self, id: TableId) -> CatalogResult<TableDescriptor> {
        self.repository
            .get_table_record(id)
            .await
            .map_err(not_found(id))?
            .try_into()
    }

    async fn save(&self, descriptor: &TableDescriptor) -> CatalogResult<()> {
        let schema_json = serde_json::to_string(&descriptor.schema)?;
        self.repository
            .update_table_record(descriptor.id, &schema_json)
            .await
            .map_err(not_found(descriptor.id))
    }

    async fn delete(&self, id: TableId) -> CatalogResult<()> {
        self.repository
            .delete_table_record(id)
            .await
            .map_err(not_found(id))
    }
}
