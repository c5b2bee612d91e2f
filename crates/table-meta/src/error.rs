use thiserror::Error;

use crate::core::types::Engine;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("invalid data source descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("failed to open {engine} database: {source}")]
    Connection {
        engine: Engine,
        #[source]
        source: BoxError,
    },

    #[error("query error: {0}")]
    Query(String),

    #[error("empty table info probably due to invalid or missing table {0}")]
    MissingTable(String),

    #[error("invalid table identifier: {0}")]
    InvalidIdentifier(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for MetaError {
    fn from(e: rusqlite::Error) -> Self {
        MetaError::Query(e.to_string())
    }
}

impl From<tokio_postgres::Error> for MetaError {
    fn from(e: tokio_postgres::Error) -> Self {
        MetaError::Query(crate::core::postgres::format_error(&e))
    }
}

impl MetaError {
    pub(crate) fn connection(engine: Engine, source: impl Into<BoxError>) -> Self {
        MetaError::Connection {
            engine,
            source: source.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MetaError::InvalidDescriptor(_) => "INVALID_DESCRIPTOR",
            MetaError::Connection { .. } => "CONNECTION_FAILED",
            MetaError::Query(_) => "QUERY_ERROR",
            MetaError::MissingTable(_) => "MISSING_TABLE",
            MetaError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            MetaError::Io(_) => "IO_ERROR",
            MetaError::Json(_) => "JSON_ERROR",
            MetaError::Internal(_) => "INTERNAL",
        }
    }
}

pub type MetaResult<T> = Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_message_names_the_table() {
        let e = MetaError::MissingTable("users".into());
        assert_eq!(e.code(), "MISSING_TABLE");
        assert_eq!(
            e.to_string(),
            "empty table info probably due to invalid or missing table users"
        );
    }

    #[test]
    fn connection_error_keeps_source() {
        let e = MetaError::connection(Engine::Sqlite, "unable to open database file");
        assert_eq!(e.code(), "CONNECTION_FAILED");
        assert_eq!(
            e.to_string(),
            "failed to open sqlite database: unable to open database file"
        );
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn rusqlite_errors_become_query_errors() {
        let e: MetaError = rusqlite::Error::InvalidQuery.into();
        assert_eq!(e.code(), "QUERY_ERROR");
    }
}
