//! CLI command execution.

use std::time::Duration;

use serde_json::json;

use crate::{
    cli::{Args, Command},
    core::{
        connection::{self, OpenOptions},
        dao::Dao,
        types::Engine,
    },
    error::{MetaError, MetaResult},
};

#[derive(Debug)]
pub struct CommandOutput {
    pub engine: Engine,
    pub data: serde_json::Value,
}

pub async fn run(args: &Args) -> MetaResult<CommandOutput> {
    // The DAO interpolates names into DDL, so untrusted input stops here.
    if let Some(table) = args.command.table() {
        validate_table_ref(table, args.command.accepts_schema())?;
    }

    let opts = OpenOptions {
        busy_timeout: Duration::from_millis(args.busy_timeout_ms),
    };
    let dao = Dao::new(connection::open_with(&args.dsn, &opts).await?);
    let data = execute(&dao, &args.command).await?;
    Ok(CommandOutput {
        engine: dao.engine(),
        data,
    })
}

pub async fn execute(dao: &Dao, command: &Command) -> MetaResult<serde_json::Value> {
    let data = match command {
        Command::HasTable { table } => json!(dao.has_table(table).await),
        Command::Columns { table } => json!(dao.table_columns(table).await?),
        Command::Info { table } => serde_json::to_value(dao.table_info(table).await?)?,
        Command::Indexes { table } => {
            // Sorted for stable output.
            let indexes: std::collections::BTreeMap<_, _> =
                dao.table_indexes(table).await?.into_iter().collect();
            json!(indexes)
        }
        Command::Drop { table } => {
            dao.delete_table(table).await?;
            tracing::info!(table = %table, "table dropped");
            json!(true)
        }
        Command::Vacuum => {
            dao.vacuum().await?;
            json!(true)
        }
    };
    Ok(data)
}

/// Accepts `table`, plus `schema.table` when `allow_schema` is set, each
/// part matching `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Catalog lookups match bare table names only, so a qualified name is
/// rejected for them instead of silently finding nothing.
pub fn validate_table_ref(s: &str, allow_schema: bool) -> MetaResult<&str> {
    let mut parts = s.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(table), None, None) => is_identifier(table),
        (Some(schema), Some(table), None) => {
            allow_schema && is_identifier(schema) && is_identifier(table)
        }
        _ => false,
    };
    if valid {
        Ok(s)
    } else {
        Err(MetaError::InvalidIdentifier(s.to_string()))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else { return false };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
