use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub type TableId = i64;
pub type RowId = i64;

/// Name of the system-generated primary key column present in every physical table
pub const PRIMARY_KEY_COLUMN: &str = "id";

/// Maximum length (in characters) of a `string` field value
pub const MAX_STRING_LENGTH: u32 = 200;

/// Logical type of a user-defined field. Extending this set means extending
/// `schema::mapper` and `FieldValue::convert` as well.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    Integer,
    String,
    Boolean,
}

/// Abstract, engine-independent description of a table: field name -> type
pub type AbstractSchema = BTreeMap<String, FieldType>;

/// Durable metadata record of a logical table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub id: TableId,
    pub name: String,
    pub schema: AbstractSchema,
}

impl TableDescriptor {
    /// Name of the relational table backing this logical table. Including the
    /// id keeps two logical tables with the same display name apart.
    pub fn physical_name(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }
}

/// A single scalar stored in (or destined for) a dynamic table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
}

impl FieldValue {
    /// Interpret a JSON scalar as a value of the given field type. Returns `None`
    /// if the JSON value has the wrong shape.
    pub fn from_json(value: &serde_json::Value, field_type: FieldType) -> Option<Self> {
        use serde_json::Value;

        match (value, field_type) {
            (Value::Null, _) => Some(FieldValue::Null),
            (Value::Number(n), FieldType::Integer) => n.as_i64().map(FieldValue::Integer),
            (Value::Bool(b), FieldType::Boolean) => Some(FieldValue::Boolean(*b)),
            (Value::String(s), FieldType::String) => Some(FieldValue::String(s.clone())),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert a stored value into another field type when its column type is
    /// altered. `None` means the value has no representation in the target type.
    pub fn convert(&self, target: FieldType) -> Option<Self> {
        match (self, target) {
            (FieldValue::Null, _) => Some(FieldValue::Null),

            (FieldValue::Integer(_), FieldType::Integer)
            | (FieldValue::Boolean(_), FieldType::Boolean)
            | (FieldValue::String(_), FieldType::String) => Some(self.clone()),

            (FieldValue::Integer(i), FieldType::String) => {
                Some(FieldValue::String(i.to_string()))
            }
            (FieldValue::Integer(i), FieldType::Boolean) => {
                Some(FieldValue::Boolean(*i != 0))
            }

            (FieldValue::Boolean(b), FieldType::Integer) => {
                Some(FieldValue::Integer(i64::from(*b)))
            }
            (FieldValue::Boolean(b), FieldType::String) => {
                Some(FieldValue::String(b.to_string()))
            }

            (FieldValue::String(s), FieldType::Integer) => {
                s.trim().parse::<i64>().ok().map(FieldValue::Integer)
            }
            (FieldValue::String(s), FieldType::Boolean) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "t" | "true" | "y" | "yes" | "on" | "1" => Some(FieldValue::Boolean(true)),
                    "f" | "false" | "n" | "no" | "off" | "0" => {
                        Some(FieldValue::Boolean(false))
                    }
                    _ => None,
                }
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::String(s) => write!(f, "{s:?}"),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

/// A row of a dynamic table: the generated id plus one value per field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRecord {
    pub id: RowId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub id: TableId,
    pub name: String,
    pub schema: AbstractSchema,
}

impl From<TableDescriptor> for TableSummary {
    fn from(descriptor: TableDescriptor) -> Self {
        Self {
            id: descriptor.id,
            name: descriptor.name,
            schema: descriptor.schema,
        }
    }
}
