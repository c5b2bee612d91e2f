//! Opens a database handle from a data source descriptor.

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    core::{
        catalog::Database,
        postgres::PostgresDatabase,
        sqlite::{SqliteDatabase, DEFAULT_BUSY_TIMEOUT},
    },
    error::{MetaError, MetaResult},
};

/// Parsed data source descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Sqlite { path: PathBuf },
    Postgres { dsn: String },
}

impl DataSource {
    /// Detects the engine from the descriptor's shape.
    ///
    /// `postgres://` / `postgresql://` URLs and libpq `key=value` strings go
    /// to PostgreSQL. `sqlite:` prefixes are stripped; anything else is a
    /// SQLite path (including `:memory:` and `file:` URIs).
    pub fn parse(descriptor: &str) -> MetaResult<Self> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(MetaError::InvalidDescriptor("empty descriptor".into()));
        }

        if descriptor.starts_with("postgres://")
            || descriptor.starts_with("postgresql://")
            || is_libpq_keywords(descriptor)
        {
            return Ok(DataSource::Postgres {
                dsn: descriptor.to_string(),
            });
        }

        let path = descriptor
            .strip_prefix("sqlite://")
            .or_else(|| descriptor.strip_prefix("sqlite:"))
            .unwrap_or(descriptor);
        if path.is_empty() {
            return Err(MetaError::InvalidDescriptor(format!(
                "missing sqlite path in {descriptor:?}"
            )));
        }
        Ok(DataSource::Sqlite {
            path: PathBuf::from(path),
        })
    }
}

fn is_libpq_keywords(s: &str) -> bool {
    s.split_whitespace().any(|pair| {
        ["host=", "hostaddr=", "dbname=", "user="]
            .iter()
            .any(|key| pair.starts_with(key))
    })
}

#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Opens a handle with default options.
pub async fn open(descriptor: &str) -> MetaResult<Arc<dyn Database>> {
    open_with(descriptor, &OpenOptions::default()).await
}

/// Opens a handle for `descriptor`, selecting the engine implementation once.
///
/// Failures are final; retrying is up to the caller.
pub async fn open_with(descriptor: &str, opts: &OpenOptions) -> MetaResult<Arc<dyn Database>> {
    match DataSource::parse(descriptor)? {
        DataSource::Sqlite { path } => {
            let db = SqliteDatabase::open(&path, opts.busy_timeout).await?;
            Ok(Arc::new(db))
        }
        DataSource::Postgres { dsn } => {
            let db = PostgresDatabase::connect(&dsn).await?;
            Ok(Arc::new(db))
        }
    }
}
