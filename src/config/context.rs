use std::sync::Arc;

use tracing::info;

use crate::catalog::RepositoryStore;
use crate::error::Result;
use crate::repository::{interface::Repository, sqlite::SqliteRepository};
use crate::service::TableService;

#[cfg(feature = "catalog-postgres")]
use crate::repository::postgres::PostgresRepository;

use super::schema;

async fn build_repository(config: &schema::DynTableConfig) -> Result<Arc<dyn Repository>> {
    let repository: Arc<dyn Repository> = match &config.catalog {
        #[cfg(feature = "catalog-postgres")]
        schema::Catalog::Postgres(schema::Postgres { dsn, schema }) => {
            info!("Using the PostgreSQL catalog in schema {schema}");
            Arc::new(PostgresRepository::try_new(dsn.to_string(), schema.to_string()).await?)
        }
        schema::Catalog::Sqlite(schema::Sqlite { dsn, journal_mode }) => {
            info!("Using the SQLite catalog at {dsn}");
            Arc::new(SqliteRepository::try_new(dsn.to_string(), (*journal_mode).into()).await?)
        }
    };

    Ok(repository)
}

/// Connect to the configured database, run migrations and wire up the service
pub async fn build_service(cfg: schema::DynTableConfig) -> Result<TableService> {
    let repository = build_repository(&cfg).await?;
    let catalog = Arc::new(RepositoryStore {
        repository: repository.clone(),
    });

    Ok(TableService::new(catalog, repository))
}

// Used in integration tests and the CLI tests
pub mod test_utils {
    use super::*;

    pub async fn in_memory_service() -> TableService {
        let config = schema::load_config_from_string(
            r#"
[catalog]
type = "sqlite"
dsn = "sqlite::memory:"
"#,
            false,
        )
        .unwrap();

        build_service(config).await.unwrap()
    }
}
