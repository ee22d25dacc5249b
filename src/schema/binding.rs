use super::mapper::{map, ColumnDescriptor};
use super::SchemaError;
use crate::data_types::AbstractSchema;

/// Physical layout of a dynamic table, derived from an abstract schema.
///
/// Never persisted: it is rebuilt from the metadata record whenever it's needed,
/// so the abstract and physical representations can't drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBinding {
    physical_name: String,
    schema: AbstractSchema,
    primary_key: ColumnDescriptor,
    // Same order as `schema` (sorted by field name)
    columns: Vec<ColumnDescriptor>,
}

pub fn bind(physical_name: &str, schema: &AbstractSchema) -> TableBinding {
    let columns = schema
        .iter()
        .map(|(name, field_type)| map(name, *field_type))
        .collect();

    TableBinding {
        physical_name: physical_name.to_string(),
        schema: schema.clone(),
        primary_key: ColumnDescriptor::primary_key(),
        columns,
    }
}

impl TableBinding {
    pub fn physical_name(&self) -> &str {
        &self.physical_name
    }

    pub fn schema(&self) -> &AbstractSchema {
        &self.schema
    }

    pub fn primary_key(&self) -> &ColumnDescriptor {
        &self.primary_key
    }

    pub fn column(&self, name: &str) -> Result<&ColumnDescriptor, SchemaError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::UnknownField {
                name: name.to_string(),
            })
    }

    /// Columns backing user-defined fields, without the primary key
    pub fn field_columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Primary key first, then every field column
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        std::iter::once(&self.primary_key).chain(self.columns.iter())
    }
}
