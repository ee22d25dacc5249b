use lazy_static::lazy_static;
use regex::Regex;

use crate::data_types::{
    AbstractSchema, FieldType, FieldValue, MAX_STRING_LENGTH, PRIMARY_KEY_COLUMN,
};

// Physical names are "{name}_{id}"; keep them under PostgreSQL's 63-byte
// identifier limit with room for a 19-digit id.
pub const MAX_TABLE_NAME_LENGTH: usize = 40;
// Leaves room for the "_tmp_" prefix of staging columns
pub const MAX_FIELD_NAME_LENGTH: usize = 58;

lazy_static! {
    static ref TABLE_NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap();
    // Lowercase only: SQLite compares identifiers case-insensitively
    static ref FIELD_NAME: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid table name {name:?}: must start with a letter, contain only letters, digits and underscores and be at most 40 characters long; \"sqlite\" and \"sqlite_*\" are reserved")]
    InvalidTableName { name: String },

    #[error("Invalid field name {name:?}: must start with a lowercase letter, contain only lowercase letters, digits and underscores and be at most 58 characters long")]
    InvalidFieldName { name: String },

    #[error("Field name {name:?} is reserved")]
    ReservedFieldName { name: String },

    #[error("Unsupported type {tag:?} for field {field:?}, expected one of integer, string, boolean")]
    UnsupportedType { field: String, tag: String },

    #[error("Field definitions must be a JSON object of field name to type")]
    MalformedSchema,

    #[error("Row values must be a JSON object of field name to value")]
    MalformedRow,

    #[error("Value {value} of field {field:?} is not a valid {expected}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        value: String,
    },

    #[error("Value of field {field:?} exceeds the maximum length of {max} characters")]
    StringTooLong { field: String, max: u32 },

    #[error("Missing value for a required field: {reason}")]
    MissingValue { reason: String },
}

// SQLite refuses to create objects named `sqlite_*` (case-insensitively), and
// physical names are "{name}_{id}"
fn is_reserved_table_name(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "sqlite" || name.starts_with("sqlite_")
}

pub fn validate_table_name(name: &str) -> Result<(), ValidationError> {
    if name.len() > MAX_TABLE_NAME_LENGTH
        || !TABLE_NAME.is_match(name)
        || is_reserved_table_name(name)
    {
        return Err(ValidationError::InvalidTableName {
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_field_name(name: &str) -> Result<(), ValidationError> {
    if name == PRIMARY_KEY_COLUMN {
        return Err(ValidationError::ReservedFieldName {
            name: name.to_string(),
        });
    }
    if name.len() > MAX_FIELD_NAME_LENGTH || !FIELD_NAME.is_match(name) {
        return Err(ValidationError::InvalidFieldName {
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_schema(schema: &AbstractSchema) -> Result<(), ValidationError> {
    schema.keys().try_for_each(|name| validate_field_name(name))
}

/// Parse user-supplied field definitions (`{"name": "integer", ...}`) into an
/// abstract schema, rejecting unknown type tags.
pub fn parse_schema(fields: &serde_json::Value) -> Result<AbstractSchema, ValidationError> {
    let fields = fields.as_object().ok_or(ValidationError::MalformedSchema)?;

    let schema = fields
        .iter()
        .map(|(name, tag)| {
            let field_type = tag
                .as_str()
                .and_then(|t| t.parse::<FieldType>().ok())
                .ok_or_else(|| ValidationError::UnsupportedType {
                    field: name.clone(),
                    tag: tag.as_str().map(str::to_string).unwrap_or_else(|| tag.to_string()),
                })?;
            Ok((name.clone(), field_type))
        })
        .collect::<Result<AbstractSchema, ValidationError>>()?;

    validate_schema(&schema)?;
    Ok(schema)
}

/// Type-check a single row value against its field type
pub fn validate_value(
    field: &str,
    field_type: FieldType,
    value: &serde_json::Value,
) -> Result<FieldValue, ValidationError> {
    let parsed = FieldValue::from_json(value, field_type).ok_or_else(|| {
        ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: field_type,
            value: value.to_string(),
        }
    })?;

    if let FieldValue::String(ref s) = parsed {
        if s.chars().count() > MAX_STRING_LENGTH as usize {
            return Err(ValidationError::StringTooLong {
                field: field.to_string(),
                max: MAX_STRING_LENGTH,
            });
        }
    }

    Ok(parsed)
}

pub fn parse_row(
    values: &serde_json::Value,
) -> Result<&serde_json::Map<String, serde_json::Value>, ValidationError> {
    values.as_object().ok_or(ValidationError::MalformedRow)
}
