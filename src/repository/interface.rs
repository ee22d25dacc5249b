use std::fmt::Debug;

use async_trait::async_trait;

use crate::data_types::{FieldType, FieldValue, RowRecord, TableId};
use crate::schema::ColumnDescriptor;

#[derive(sqlx::FromRow, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub id: TableId,
    pub name: String,
    pub schema_json: String,
}

/// A single structural change to a physical table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alteration {
    AddColumn(ColumnDescriptor),
    DropColumn(ColumnDescriptor),
    AlterColumn {
        from: ColumnDescriptor,
        to: ColumnDescriptor,
    },
}

/// Wrapper for conversion of database-specific error codes into actual errors
#[derive(Debug)]
pub enum Error {
    UniqueConstraintViolation(sqlx::Error),
    NotNullViolation(sqlx::Error),
    DuplicateTable(sqlx::Error),

    // A stored value has no representation in the altered column's new type
    IncompatibleValue {
        column: String,
        from: FieldType,
        to: FieldType,
        value: FieldValue,
    },

    // All other errors
    SqlxError(sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[async_trait]
pub trait Repository: Send + Sync + Debug {
    async fn setup(&self) -> Result<(), Error>;

    async fn create_table_record(
        &self,
        name: &str,
        schema_json: &str,
    ) -> Result<TableId, Error>;

    async fn get_table_record(&self, table_id: TableId) -> Result<TableRecord, Error>;

    async fn update_table_record(
        &self,
        table_id: TableId,
        schema_json: &str,
    ) -> Result<(), Error>;

    async fn delete_table_record(&self, table_id: TableId) -> Result<(), Error>;

    async fn create_physical_table(
        &self,
        physical_name: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<(), Error>;

    /// Apply all alterations in order inside a single transaction. When `table_record`
    /// is given, that record's `schema_json` is rewritten in the same transaction.
    async fn alter_physical_table(
        &self,
        physical_name: &str,
        alterations: &[Alteration],
        table_record: Option<(TableId, &str)>,
    ) -> Result<(), Error>;

    /// Insert the non-null `values` and return the stored row with the given `columns`
    async fn insert_row(
        &self,
        physical_name: &str,
        columns: &[ColumnDescriptor],
        values: &[(String, FieldValue)],
    ) -> Result<RowRecord, Error>;

    /// All rows, ordered by their generated id
    async fn select_rows(
        &self,
        physical_name: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<Vec<RowRecord>, Error>;
}
