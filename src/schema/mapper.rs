use crate::data_types::{FieldType, MAX_STRING_LENGTH, PRIMARY_KEY_COLUMN};

/// Engine-independent physical column type. Each repository renders these
/// into its own SQL type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer
    BigInt,
    Boolean,
    Varchar { max_length: u32 },
}

impl ColumnType {
    /// The logical type values of this column are read back as
    pub fn field_type(&self) -> FieldType {
        match self {
            ColumnType::BigInt => FieldType::Integer,
            ColumnType::Boolean => FieldType::Boolean,
            ColumnType::Varchar { .. } => FieldType::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDescriptor {
    pub fn field_type(&self) -> FieldType {
        self.column_type.field_type()
    }

    /// Copy of this column that accepts NULLs
    pub fn as_nullable(&self) -> Self {
        Self {
            nullable: true,
            ..self.clone()
        }
    }

    /// The system-generated row identifier column
    pub fn primary_key() -> Self {
        Self {
            name: PRIMARY_KEY_COLUMN.to_string(),
            column_type: ColumnType::BigInt,
            nullable: false,
            primary_key: true,
        }
    }
}

/// Translate a field into its physical column definition.
pub fn map(field_name: &str, field_type: FieldType) -> ColumnDescriptor {
    let column_type = match field_type {
        FieldType::Integer => ColumnType::BigInt,
        FieldType::Boolean => ColumnType::Boolean,
        FieldType::String => ColumnType::Varchar {
            max_length: MAX_STRING_LENGTH,
        },
    };

    ColumnDescriptor {
        name: field_name.to_string(),
        column_type,
        nullable: false,
        primary_key: false,
    }
}
