use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use itertools::Itertools;
use sqlx::{
    migrate::{MigrateDatabase, Migrator},
    postgres::PgPoolOptions,
    Executor, PgPool, Postgres, QueryBuilder, Row,
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
pub struct PostgresRepository {
    pub executor: PgPool,
    pub schema_name: String,
}

impl PostgresRepository {
    pub const MIGRATOR: Migrator = sqlx::migrate!("migrations/postgres");
    pub const QUERIES: RepositoryQueries = RepositoryQueries {
        integer_type: "BIGINT",
        boolean_type: "BOOLEAN",
        varchar_type: "VARCHAR",
        primary_key_type: "BIGSERIAL PRIMARY KEY",
    };

    pub async fn try_new(
        dsn: String,
        schema_name: String,
    ) -> std::result::Result<Self, Error> {
        if !Postgres::database_exists(&dsn)
            .await
            .map_err(Error::SqlxError)?
        {
            let _ = Postgres::create_database(&dsn).await;
        }

        let repo = PostgresRepository::connect(dsn, schema_name.clone()).await?;

        repo.executor
            .execute(format!("CREATE SCHEMA IF NOT EXISTS {schema_name};").as_str())
            .await
            .map_err(Error::SqlxError)?;

        // Setup the schema
        repo.setup().await?;
        Ok(repo)
    }

    pub async fn connect(
        dsn: String,
        schema_name: String,
    ) -> std::result::Result<Self, Error> {
        let schema_name_2 = schema_name.clone();

        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(16)
            .idle_timeout(Duration::from_millis(30000))
            .test_before_acquire(true)
            .after_connect(move |c, _m| {
                let schema_name = schema_name.to_owned();
                Box::pin(async move {
                    let query = format!("SET search_path TO {schema_name},public;");
                    c.execute(sqlx::query(&query)).await?;
                    Ok(())
                })
            })
            .connect(&dsn)
            .await
            .map_err(Error::SqlxError)?;

        Ok(Self {
            executor: pool,
            schema_name: schema_name_2,
        })
    }

    pub fn interpret_error(error: sqlx::Error) -> Error {
        if let sqlx::Error::Database(ref d) = error {
            // Reference: https://www.postgresql.org/docs/current/errcodes-appendix.html
            if let Some(code) = d.code() {
                if code == "23505" {
                    return Error::UniqueConstraintViolation(error);
                } else if code == "23502" {
                    return Error::NotNullViolation(error);
                } else if code == "42P07" {
                    return Error::DuplicateTable(error);
                }
            }
        }
        Error::SqlxError(error)
    }
}

implement_repository!(PostgresRepository);

pub mod testutils {
    use rand::Rng;

    use super::PostgresRepository;

    pub fn get_random_schema() -> String {
        // Generate a random schema (taken from IOx)
        let mut rng = rand::thread_rng();
        (&mut rng)
            .sample_iter(rand::distributions::Alphanumeric)
            .filter(|c| c.is_ascii_alphabetic())
            .take(20)
            .map(char::from)
            .collect::<String>()
    }

    pub async fn make_repository(dsn: &str) -> PostgresRepository {
        let schema_name = get_random_schema();

        PostgresRepository::try_new(dsn.to_string(), schema_name)
            .await
            .expect("Error setting up the database")
    }
}
