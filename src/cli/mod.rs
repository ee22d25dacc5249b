use std::io::Write;

use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::data_types::TableId;
use crate::error::TableError;
use crate::service::TableService;
use crate::validation::{parse_row, parse_schema, ValidationError};

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Define a new table
    CreateTable {
        #[clap(long)]
        name: String,
        /// Field definitions as a JSON object, e.g. '{"age": "integer"}'
        #[clap(long)]
        fields: String,
    },
    /// Replace the schema of a table, altering its physical table in place
    UpdateTable {
        #[clap(long)]
        id: TableId,
        #[clap(long)]
        fields: String,
    },
    /// Show the id, name and schema of a table
    GetTable {
        #[clap(long)]
        id: TableId,
    },
    /// Insert one row, given as a JSON object of field values
    InsertRow {
        #[clap(long)]
        id: TableId,
        #[clap(long)]
        values: String,
    },
    /// List all rows of a table in insertion order
    ListRows {
        #[clap(long)]
        id: TableId,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid JSON argument: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error writing the output: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Table(err.into())
    }
}

fn print<W: Write, T: Serialize>(output: &mut W, result: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *output, result)?;
    writeln!(output)?;
    Ok(())
}

/// Run a single command against the service and write its JSON result to `output`
pub async fn run_command<W: Write>(
    service: &TableService,
    command: Command,
    output: &mut W,
) -> Result<(), CliError> {
    match command {
        Command::CreateTable { name, fields } => {
            let schema = parse_schema(&serde_json::from_str::<Value>(&fields)?)?;
            print(output, &service.create_table(&name, schema).await?)
        }
        Command::UpdateTable { id, fields } => {
            let schema = parse_schema(&serde_json::from_str::<Value>(&fields)?)?;
            print(output, &service.update_table(id, schema).await?)
        }
        Command::GetTable { id } => print(output, &service.get_table(id).await?),
        Command::InsertRow { id, values } => {
            let values = serde_json::from_str::<Value>(&values)?;
            print(output, &service.insert_row(id, parse_row(&values)?).await?)
        }
        Command::ListRows { id } => print(output, &service.list_rows(id).await?),
    }
}
