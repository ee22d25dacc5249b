use std::path::Path;

use config::{Config, ConfigError, File, FileFormat};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use sqlx::sqlite::SqliteJournalMode;

pub const DEFAULT_CONFIG_PATH: &str = "dyntable.toml";
// Used when there's no config file at all
pub const DEFAULT_SQLITE_DB: &str = "dyntable.sqlite";

lazy_static! {
    // The schema name is interpolated into `SET search_path` unquoted
    static ref PG_SCHEMA_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct DynTableConfig {
    pub catalog: Catalog,
    #[serde(default)]
    pub misc: Misc,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Catalog {
    #[cfg(feature = "catalog-postgres")]
    Postgres(Postgres),
    Sqlite(Sqlite),
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Postgres {
    pub dsn: String,
    #[serde(default = "default_schema")]
    pub schema: String,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Sqlite {
    pub dsn: String,
    #[serde(default)]
    pub journal_mode: JournalMode,
}

fn default_schema() -> String {
    "public".to_string()
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    #[default]
    Wal,
    Off,
}

impl From<JournalMode> for SqliteJournalMode {
    fn from(mode: JournalMode) -> Self {
        match mode {
            JournalMode::Delete => SqliteJournalMode::Delete,
            JournalMode::Truncate => SqliteJournalMode::Truncate,
            JournalMode::Persist => SqliteJournalMode::Persist,
            JournalMode::Memory => SqliteJournalMode::Memory,
            JournalMode::Wal => SqliteJournalMode::Wal,
            JournalMode::Off => SqliteJournalMode::Off,
        }
    }
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct Misc {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for Misc {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for DynTableConfig {
    fn default() -> Self {
        Self {
            catalog: Catalog::Sqlite(Sqlite {
                dsn: DEFAULT_SQLITE_DB.to_string(),
                journal_mode: JournalMode::default(),
            }),
            misc: Misc::default(),
        }
    }
}

pub fn validate_config(config: DynTableConfig) -> Result<DynTableConfig, ConfigError> {
    match config.catalog {
        #[cfg(feature = "catalog-postgres")]
        Catalog::Postgres(Postgres { ref schema, .. })
            if !PG_SCHEMA_NAME.is_match(schema) =>
        {
            Err(ConfigError::Message(format!(
                "Invalid PostgreSQL schema name {schema:?}: must start with a letter or \
                an underscore and contain only letters, digits and underscores"
            )))
        }
        Catalog::Sqlite(Sqlite { ref dsn, .. }) if dsn.is_empty() => Err(
            ConfigError::Message("The SQLite catalog needs a non-empty dsn".to_string()),
        ),
        _ => Ok(config),
    }
}

pub fn load_config(path: &Path) -> Result<DynTableConfig, ConfigError> {
    let path = path.to_str().ok_or_else(|| {
        ConfigError::Message(format!("Error parsing path {}", path.display()))
    })?;
    let config = Config::builder().add_source(File::new(path, FileFormat::Toml));

    config.build()?.try_deserialize().and_then(validate_config)
}

// Load a config from a string (to test our structs are defined correctly)
pub fn load_config_from_string(
    config_str: &str,
    skip_validation: bool,
) -> Result<DynTableConfig, ConfigError> {
    let config =
        Config::builder().add_source(File::from_str(config_str, FileFormat::Toml));

    if skip_validation {
        config.build()?.try_deserialize()
    } else {
        config.build()?.try_deserialize().and_then(validate_config)
    }
}
