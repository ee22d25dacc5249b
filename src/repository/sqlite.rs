use std::str::FromStr;

use async_trait::async_trait;
use futures::TryStreamExt;
use itertools::Itertools;
use sqlx::sqlite::SqliteJournalMode;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, QueryBuilder, Row, Sqlite,
};

use crate::data_types::{FieldValue, RowRecord, TableId, PRIMARY_KEY_COLUMN};
use crate::implement_repository;
use crate::schema::ColumnDescriptor;

use super::{
    default::{
        column_definition, decode_row, decode_value, quote_identifier, select_list,
        staging_column, RepositoryQueries,
    },
    interface::{Alteration, Error, Repository, Result, TableRecord},
};

#[derive(Debug)]
pub struct SqliteRepository {
    pub executor: Pool<Sqlite>,
}

impl SqliteRepository {
    pub const MIGRATOR: Migrator = sqlx::migrate!("migrations/sqlite");
    pub const QUERIES: RepositoryQueries = RepositoryQueries {
        integer_type: "INTEGER",
        boolean_type: "BOOLEAN",
        // SQLite doesn't enforce the length, the service does
        varchar_type: "VARCHAR",
        // AUTOINCREMENT so that ids of deleted rows are never handed out again
        primary_key_type: "INTEGER PRIMARY KEY AUTOINCREMENT",
    };

    pub async fn try_new(
        dsn: String,
        journal_mode: SqliteJournalMode,
    ) -> std::result::Result<Self, Error> {
        let in_memory = dsn.contains(":memory:") || dsn.contains("mode=memory");
        let options = SqliteConnectOptions::from_str(&dsn)
            .map_err(Error::SqlxError)?
            .create_if_missing(true)
            .journal_mode(journal_mode);

        let pool_options = if in_memory {
            // Every connection to an in-memory database sees its own empty database,
            // so pin the pool to a single connection that is never recycled.
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(Error::SqlxError)?;
        let repo = Self { executor: pool };
        repo.setup().await?;
        Ok(repo)
    }

    pub fn interpret_error(error: sqlx::Error) -> Error {
        if let sqlx::Error::Database(ref d) = error {
            // Reference: https://www.sqlite.org/rescode.html
            // sqlx doesn't always surface the extended result code, so match on the
            // message like the sqlite3 shell prints it.
            let message = d.message();

            if message.contains("UNIQUE constraint failed") {
                return Error::UniqueConstraintViolation(error);
            }
            if message.contains("NOT NULL constraint failed") {
                return Error::NotNullViolation(error);
            }
            if message.starts_with("table") && message.contains("already exists") {
                return Error::DuplicateTable(error);
            }
        }
        Error::SqlxError(error)
    }
}

implement_repository!(SqliteRepository);
