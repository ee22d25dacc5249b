//! Orchestrates the metadata store, the schema binder and differ and the DDL
//! executor behind the five table operations.

pub mod locks;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::catalog::TableStore;
use crate::data_types::{AbstractSchema, FieldValue, RowRecord, TableId, TableSummary};
use crate::ddl::DdlExecutor;
use crate::error::Result;
use crate::repository::interface::Repository;
use crate::schema::{bind, diff, ChangeSet, SchemaError};
use crate::validation::{validate_schema, validate_table_name, validate_value};

use self::locks::TableLocks;

/// Result of a schema update: what changed plus the schema now in effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    #[serde(flatten)]
    pub changes: ChangeSet,
    pub schema: AbstractSchema,
}

pub struct TableService {
    catalog: Arc<dyn TableStore>,
    ddl: DdlExecutor,
    repository: Arc<dyn Repository>,
    locks: TableLocks,
}

impl TableService {
    pub fn new(catalog: Arc<dyn TableStore>, repository: Arc<dyn Repository>) -> Self {
        Self {
            catalog,
            ddl: DdlExecutor::new(repository.clone()),
            repository,
            locks: TableLocks::default(),
        }
    }

    pub async fn create_table(
        &self,
        name: &str,
        schema: AbstractSchema,
    ) -> Result<TableSummary> {
        validate_table_name(name)?;
        validate_schema(&schema)?;

        let descriptor = self.catalog.create(name, &schema).await?;
        let binding = bind(&descriptor.physical_name(), &descriptor.schema);

        if let Err(e) = self.ddl.create_table(&binding).await {
            warn!(
                "Failed to create physical table {}, removing table {}: {e}",
                binding.physical_name(),
                descriptor.id
            );
            if let Err(cleanup) = self.catalog.delete(descriptor.id).await {
                warn!(
                    "Failed to remove the metadata of table {}: {cleanup}",
                    descriptor.id
                );
            }
            return Err(e);
        }

        info!(
            "Created table {} ({:?}) with {} field(s)",
            descriptor.id,
            descriptor.name,
            descriptor.schema.len()
        );
        Ok(descriptor.into())
    }

    pub async fn update_table(
        &self,
        id: TableId,
        schema: AbstractSchema,
    ) -> Result<UpdateSummary> {
        validate_schema(&schema)?;

        // Only tables that exist get a lock entry
        self.catalog.get(id).await?;
        let _guard = self.locks.write(id).await;

        let mut descriptor = self.catalog.get(id).await?;
        let physical_name = descriptor.physical_name();
        let old = bind(&physical_name, &descriptor.schema);
        let new = bind(&physical_name, &schema);

        let changes = diff(old.schema(), new.schema());
        descriptor.schema = schema;
        self.ddl
            .apply_change_set(&descriptor, &changes, &old, &new)
            .await?;
        if !changes.is_empty() {
            info!("Updated the schema of table {id}");
        }

        Ok(UpdateSummary {
            changes,
            schema: descriptor.schema,
        })
    }

    pub async fn insert_row(&self, id: TableId, values: &Map<String, Value>) -> Result<RowRecord> {
        self.catalog.get(id).await?;
        let _guard = self.locks.read(id).await;

        let descriptor = self.catalog.get(id).await?;
        let binding = bind(&descriptor.physical_name(), &descriptor.schema);

        // Reject unknown keys before looking at any value
        let columns = values
            .keys()
            .map(|field| binding.column(field))
            .collect::<Result<Vec<_>, SchemaError>>()?;

        let values = columns
            .iter()
            .zip(values.values())
            .map(|(column, value)| {
                Ok((
                    column.name.clone(),
                    validate_value(&column.name, column.field_type(), value)?,
                ))
            })
            .collect::<Result<Vec<(String, FieldValue)>>>()?;

        let row = self
            .repository
            .insert_row(binding.physical_name(), binding.field_columns(), &values)
            .await?;
        debug!("Inserted row {} into table {id}", row.id);
        Ok(row)
    }

    pub async fn list_rows(&self, id: TableId) -> Result<Vec<RowRecord>> {
        self.catalog.get(id).await?;
        let _guard = self.locks.read(id).await;

        let descriptor = self.catalog.get(id).await?;
        let binding = bind(&descriptor.physical_name(), &descriptor.schema);

        Ok(self
            .repository
            .select_rows(binding.physical_name(), binding.field_columns())
            .await?)
    }

    pub async fn get_table(&self, id: TableId) -> Result<TableSummary> {
        Ok(self.catalog.get(id).await?.into())
    }
}
