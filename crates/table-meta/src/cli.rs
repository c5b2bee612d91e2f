use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "table-meta", about = "Inspect and manage table metadata")]
pub struct Args {
    /// Data source: SQLite path (`app.db`, `sqlite://app.db`, `:memory:`)
    /// or PostgreSQL connection string (`postgres://…`, `host=… dbname=…`).
    #[arg(long, env = "TABLE_META_DSN")]
    pub dsn: String,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// SQLite busy timeout.
    #[arg(long, default_value_t = 2_000)]
    pub busy_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check whether a table or view exists
    HasTable { table: String },
    /// List the column names of a table
    Columns { table: String },
    /// Show detailed column metadata of a table
    Info { table: String },
    /// List index definitions of a table
    Indexes { table: String },
    /// Drop a table if it exists
    Drop { table: String },
    /// Reclaim unused storage
    Vacuum,
}

impl Command {
    /// The table argument, if the command takes one.
    pub fn table(&self) -> Option<&str> {
        match self {
            Command::HasTable { table }
            | Command::Columns { table }
            | Command::Info { table }
            | Command::Indexes { table }
            | Command::Drop { table } => Some(table),
            Command::Vacuum => None,
        }
    }

    /// Whether the table argument may be `schema.table`. Only the drop
    /// statement resolves a qualified name.
    pub fn accepts_schema(&self) -> bool {
        matches!(self, Command::Drop { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_table_commands() {
        let args =
            Args::try_parse_from(["table-meta", "--dsn", "app.db", "info", "users"]).unwrap();
        assert_eq!(args.dsn, "app.db");
        assert_eq!(args.log_level, "info");
        assert_eq!(args.busy_timeout_ms, 2_000);
        assert_eq!(
            args.command,
            Command::Info {
                table: "users".into()
            }
        );
        assert_eq!(args.command.table(), Some("users"));
        assert!(!args.command.accepts_schema());
    }

    #[test]
    fn parses_vacuum() {
        let args = Args::try_parse_from([
            "table-meta",
            "--dsn",
            "postgres://localhost/app",
            "--busy-timeout-ms",
            "500",
            "vacuum",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Vacuum);
        assert_eq!(args.command.table(), None);
        assert_eq!(args.busy_timeout_ms, 500);
    }

    #[test]
    fn table_argument_is_required() {
        assert!(Args::try_parse_from(["table-meta", "--dsn", "app.db", "columns"]).is_err());
    }
}
