//! Realizes bindings and change-sets as structural changes to physical tables.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::CatalogError;
use crate::data_types::TableDescriptor;
use crate::error::{Result, TableError};
use crate::repository::interface::{Alteration, Error as RepositoryError, Repository};
use crate::schema::{ChangeSet, SchemaError, TableBinding};

pub struct DdlExecutor {
    repository: Arc<dyn Repository>,
}

/// Turn a change-set into the ordered list of column operations: additions first
/// (always nullable, existing rows have no value for them), then deletions, then
/// type alterations.
pub fn plan_alterations(
    change_set: &ChangeSet,
    old: &TableBinding,
    new: &TableBinding,
) -> Result<Vec<Alteration>, SchemaError> {
    let mut alterations = Vec::with_capacity(
        change_set.added.len() + change_set.deleted.len() + change_set.modified.len(),
    );

    for name in change_set.added.keys() {
        alterations.push(Alteration::AddColumn(new.column(name)?.as_nullable()));
    }
    for name in change_set.deleted.keys() {
        alterations.push(Alteration::DropColumn(old.column(name)?.clone()));
    }
    for name in change_set.modified.keys() {
        alterations.push(Alteration::AlterColumn {
            from: old.column(name)?.clone(),
            to: new.column(name)?.clone(),
        });
    }

    Ok(alterations)
}

impl DdlExecutor {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub async fn create_table(&self, binding: &TableBinding) -> Result<()> {
        let columns: Vec<_> = binding.all_columns().cloned().collect();
        debug!(
            "Creating physical table {} with {} column(s)",
            binding.physical_name(),
            columns.len()
        );

        self.repository
            .create_physical_table(binding.physical_name(), &columns)
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateTable(_) => TableError::TableAlreadyExists {
                    name: binding.physical_name().to_string(),
                },
                e => e.into(),
            })
    }

    /// Apply all changes in a single transaction and store `updated.schema` as the
    /// table's schema of record in that same transaction. Either everything takes
    /// effect or nothing does.
    pub async fn apply_change_set(
        &self,
        updated: &TableDescriptor,
        change_set: &ChangeSet,
        old: &TableBinding,
        new: &TableBinding,
    ) -> Result<()> {
        let physical_name = updated.physical_name();
        if change_set.is_empty() {
            debug!("No changes to apply to {physical_name}");
            return Ok(());
        }

        let alterations = plan_alterations(change_set, old, new)?;
        let schema_json = serde_json::to_string(&updated.schema).map_err(CatalogError::from)?;
        info!(
            "Altering {physical_name}: {} added, {} deleted, {} modified",
            change_set.added.len(),
            change_set.deleted.len(),
            change_set.modified.len()
        );

        self.repository
            .alter_physical_table(
                &physical_name,
                &alterations,
                Some((updated.id, &schema_json)),
            )
            .await?;
        Ok(())
    }
}
