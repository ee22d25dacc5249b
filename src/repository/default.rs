use itertools::Itertools;
use sqlx::{ColumnIndex, Decode, Row, Type};

use crate::data_types::{FieldType, FieldValue, RowRecord, PRIMARY_KEY_COLUMN};
use crate::schema::{ColumnDescriptor, ColumnType};

/// Default implementation for a Repository that factors out common
/// query patterns / SQL queries between Postgres and SQLite.
///
/// Usage:
///
/// The calling module needs the helpers below, `futures::TryStreamExt` and the
/// repository interface types in scope.
///
/// The struct has to have certain fields, since this macro relies on them:
///
/// ```ignore
/// pub struct MyRepository {
///     pub executor: sqlx::Pool<sqlx::SqlxDatabaseType>
/// }
///
/// impl MyRepository {
///     pub const MIGRATOR: sqlx::Migrator = sqlx::migrate!("my/migrations");
///     pub const QUERIES: RepositoryQueries = RepositoryQueries {
///         integer_type: "...",
///     }
///     pub fn interpret_error(error: sqlx::Error) -> Error {
///         // Interpret the database-specific error code and turn some sqlx errors
///         // into the Error enum values like DuplicateTable/NotNullViolation
///         // ...
///     }
/// }
///
/// implement_repository!(MyRepository)
/// ```
///
/// The physical-table methods can't use compile-time checked queries anyway (table and
/// column names are only known at runtime), so a macro over both databases is the least
/// duplicated option: a `Pool<Any>` loses the database-specific types we decode into, and
/// making this generic over `sqlx::Database` needs a `where` clause per query type.
///
/// Statements touching physical tables are never prepared persistently: their result
/// shape changes whenever the table is altered.
///
/// Per-database SQL type names:
pub struct RepositoryQueries {
    pub integer_type: &'static str,
    pub boolean_type: &'static str,
    pub varchar_type: &'static str,
    pub primary_key_type: &'static str,
}

// Field names can't start with an underscore, so this never clashes with a field
const STAGING_COLUMN_PREFIX: &str = "_tmp_";

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn staging_column(column: &ColumnDescriptor) -> ColumnDescriptor {
    ColumnDescriptor {
        name: format!("{STAGING_COLUMN_PREFIX}{}", column.name),
        ..column.as_nullable()
    }
}

pub fn column_definition(queries: &RepositoryQueries, column: &ColumnDescriptor) -> String {
    let name = quote_identifier(&column.name);
    if column.primary_key {
        return format!("{name} {}", queries.primary_key_type);
    }

    let sql_type = match column.column_type {
        ColumnType::BigInt => queries.integer_type.to_string(),
        ColumnType::Boolean => queries.boolean_type.to_string(),
        ColumnType::Varchar { max_length } => {
            format!("{}({max_length})", queries.varchar_type)
        }
    };

    if column.nullable {
        format!("{name} {sql_type}")
    } else {
        format!("{name} {sql_type} NOT NULL")
    }
}

/// Primary key followed by the given columns
pub fn select_list(columns: &[ColumnDescriptor]) -> String {
    std::iter::once(quote_identifier(PRIMARY_KEY_COLUMN))
        .chain(columns.iter().map(|c| quote_identifier(&c.name)))
        .join(", ")
}

pub fn decode_value<'r, R>(
    row: &'r R,
    index: usize,
    field_type: FieldType,
) -> Result<FieldValue, sqlx::Error>
where
    R: Row,
    usize: ColumnIndex<R>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
    bool: Decode<'r, R::Database> + Type<R::Database>,
    String: Decode<'r, R::Database> + Type<R::Database>,
{
    let value = match field_type {
        FieldType::Integer => row
            .try_get::<Option<i64>, _>(index)?
            .map(FieldValue::Integer),
        FieldType::Boolean => row
            .try_get::<Option<bool>, _>(index)?
            .map(FieldValue::Boolean),
        FieldType::String => row
            .try_get::<Option<String>, _>(index)?
            .map(FieldValue::String),
    };

    Ok(value.unwrap_or(FieldValue::Null))
}

/// Decode a row selected with `select_list(columns)`
pub fn decode_row<'r, R>(
    row: &'r R,
    columns: &[ColumnDescriptor],
) -> Result<RowRecord, sqlx::Error>
where
    R: Row,
    usize: ColumnIndex<R>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
    bool: Decode<'r, R::Database> + Type<R::Database>,
    String: Decode<'r, R::Database> + Type<R::Database>,
{
    let id = row.try_get::<i64, _>(0)?;
    let fields = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            Ok((
                column.name.clone(),
                decode_value(row, i + 1, column.field_type())?,
            ))
        })
        .collect::<Result<_, sqlx::Error>>()?;

    Ok(RowRecord { id, fields })
}

#[macro_export]
macro_rules! implement_repository {
    ($repo: ident) => {
#[async_trait]
impl Repository for $repo {
    async fn setup(&self) -> Result<(), Error> {
        $repo::MIGRATOR
            .run(&self.executor)
            .await
            .map_err(|e| Error::SqlxError(e.into()))
    }

    async fn create_table_record(
        &self,
        name: &str,
        schema_json: &str,
    ) -> Result<TableId, Error> {
        let id = sqlx::query(r#"INSERT INTO dynamic_table (name, schema_json) VALUES ($1, $2) RETURNING id"#)
            .bind(name)
            .bind(schema_json)
            .fetch_one(&self.executor)
            .await.map_err($repo::interpret_error)?
            .try_get("id").map_err($repo::interpret_error)?;

        Ok(id)
    }

    async fn get_table_record(&self, table_id: TableId) -> Result<TableRecord, Error> {
        let table = sqlx::query_as(r#"SELECT id, name, schema_json FROM dynamic_table WHERE id = $1"#)
            .bind(table_id)
            .fetch_one(&self.executor)
            .await.map_err($repo::interpret_error)?;

        Ok(table)
    }

    // In these methods, return the ID back so that we get an error if the
    // table record didn't actually exist
    async fn update_table_record(
        &self,
        table_id: TableId,
        schema_json: &str,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE dynamic_table SET schema_json = $1 WHERE id = $2 RETURNING id")
            .bind(schema_json)
            .bind(table_id)
            .fetch_one(&self.executor)
            .await.map_err($repo::interpret_error)?;
        Ok(())
    }

    async fn delete_table_record(&self, table_id: TableId) -> Result<(), Error> {
        sqlx::query("DELETE FROM dynamic_table WHERE id = $1 RETURNING id")
            .bind(table_id)
            .fetch_one(&self.executor)
            .await.map_err($repo::interpret_error)?;
        Ok(())
    }

    async fn create_physical_table(
        &self,
        physical_name: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<(), Error> {
        let query = format!(
            "CREATE TABLE {} ({})",
            quote_identifier(physical_name),
            columns
                .iter()
                .map(|c| column_definition(&$repo::QUERIES, c))
                .join(", ")
        );

        sqlx::query(&query)
            .persistent(false)
            .execute(&self.executor)
            .await.map_err($repo::interpret_error)?;
        Ok(())
    }

    async fn alter_physical_table(
        &self,
        physical_name: &str,
        alterations: &[Alteration],
        table_record: Option<(TableId, &str)>,
    ) -> Result<(), Error> {
        let table = quote_identifier(physical_name);
        let pk = quote_identifier(PRIMARY_KEY_COLUMN);

        // Dropping the transaction without committing rolls everything back
        let mut tx = self.executor.begin().await.map_err($repo::interpret_error)?;

        for alteration in alterations {
            match alteration {
                Alteration::AddColumn(column) => {
                    let query = format!(
                        "ALTER TABLE {table} ADD COLUMN {}",
                        column_definition(&$repo::QUERIES, column)
                    );
                    sqlx::query(&query)
                        .persistent(false)
                        .execute(&mut *tx)
                        .await.map_err($repo::interpret_error)?;
                }
                Alteration::DropColumn(column) => {
                    let query = format!(
                        "ALTER TABLE {table} DROP COLUMN {}",
                        quote_identifier(&column.name)
                    );
                    sqlx::query(&query)
                        .persistent(false)
                        .execute(&mut *tx)
                        .await.map_err($repo::interpret_error)?;
                }
                Alteration::AlterColumn { from, to } => {
                    // Rewrite the column through a staging column of the new type, converting
                    // every stored value on the way. This behaves the same on every engine,
                    // including SQLite which has no ALTER COLUMN.
                    let staging = staging_column(to);
                    let column_name = quote_identifier(&from.name);
                    let staging_name = quote_identifier(&staging.name);

                    let query = format!(
                        "ALTER TABLE {table} ADD COLUMN {}",
                        column_definition(&$repo::QUERIES, &staging)
                    );
                    sqlx::query(&query)
                        .persistent(false)
                        .execute(&mut *tx)
                        .await.map_err($repo::interpret_error)?;

                    let query = format!("SELECT {pk}, {column_name} FROM {table}");
                    let rows = sqlx::query(&query)
                        .persistent(false)
                        .fetch_all(&mut *tx)
                        .await.map_err($repo::interpret_error)?;

                    let update = format!("UPDATE {table} SET {staging_name} = $1 WHERE {pk} = $2");
                    for row in rows {
                        let id: i64 = row.try_get(0).map_err($repo::interpret_error)?;
                        let value = decode_value(&row, 1, from.field_type())
                            .map_err($repo::interpret_error)?;

                        let converted = value.convert(to.field_type()).ok_or_else(|| {
                            Error::IncompatibleValue {
                                column: from.name.clone(),
                                from: from.field_type(),
                                to: to.field_type(),
                                value: value.clone(),
                            }
                        })?;

                        let query = sqlx::query(&update).persistent(false);
                        let query = match converted {
                            FieldValue::Integer(v) => query.bind(v),
                            FieldValue::Boolean(v) => query.bind(v),
                            FieldValue::String(v) => query.bind(v),
                            // The staging column starts out NULL
                            FieldValue::Null => continue,
                        };
                        query
                            .bind(id)
                            .execute(&mut *tx)
                            .await.map_err($repo::interpret_error)?;
                    }

                    for query in [
                        format!("ALTER TABLE {table} DROP COLUMN {column_name}"),
                        format!(
                            "ALTER TABLE {table} RENAME COLUMN {staging_name} TO {}",
                            quote_identifier(&to.name)
                        ),
                    ] {
                        sqlx::query(&query)
                            .persistent(false)
                            .execute(&mut *tx)
                            .await.map_err($repo::interpret_error)?;
                    }
                }
            }
        }

        if let Some((table_id, schema_json)) = table_record {
            sqlx::query("UPDATE dynamic_table SET schema_json = $1 WHERE id = $2 RETURNING id")
                .bind(schema_json)
                .bind(table_id)
                .fetch_one(&mut *tx)
                .await.map_err($repo::interpret_error)?;
        }

        tx.commit().await.map_err($repo::interpret_error)?;
        Ok(())
    }

    async fn insert_row(
        &self,
        physical_name: &str,
        columns: &[ColumnDescriptor],
        values: &[(String, FieldValue)],
    ) -> Result<RowRecord, Error> {
        let values: Vec<&(String, FieldValue)> =
            values.iter().filter(|(_, v)| !v.is_null()).collect();

        let mut builder: QueryBuilder<_> =
            QueryBuilder::new(format!("INSERT INTO {} ", quote_identifier(physical_name)));

        if values.is_empty() {
            builder.push("DEFAULT VALUES");
        } else {
            builder.push("(");
            builder.push(values.iter().map(|(name, _)| quote_identifier(name)).join(", "));
            builder.push(") VALUES (");

            let mut separated = builder.separated(", ");
            for (_, value) in values {
                match value.clone() {
                    FieldValue::Integer(v) => separated.push_bind(v),
                    FieldValue::Boolean(v) => separated.push_bind(v),
                    FieldValue::String(v) => separated.push_bind(v),
                    FieldValue::Null => continue,
                };
            }
            separated.push_unseparated(")");
        }

        builder.push(" RETURNING ");
        builder.push(select_list(columns));

        let row = builder
            .build()
            .persistent(false)
            .fetch_one(&self.executor)
            .await.map_err($repo::interpret_error)?;

        decode_row(&row, columns).map_err($repo::interpret_error)
    }

    async fn select_rows(
        &self,
        physical_name: &str,
        columns: &[ColumnDescriptor],
    ) -> Result<Vec<RowRecord>, Error> {
        let query = format!(
            "SELECT {} FROM {} ORDER BY {}",
            select_list(columns),
            quote_identifier(physical_name),
            quote_identifier(PRIMARY_KEY_COLUMN),
        );

        let rows: Vec<_> = sqlx::query(&query)
            .persistent(false)
            .fetch(&self.executor)
            .try_collect()
            .await.map_err($repo::interpret_error)?;

        rows.iter()
            .map(|row| decode_row(row, columns).map_err($repo::interpret_error))
            .collect()
    }
}

};
}
