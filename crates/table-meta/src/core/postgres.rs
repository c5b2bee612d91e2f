//! PostgreSQL handle over `tokio-postgres`.

use async_trait::async_trait;
use tokio_postgres::{Client, Config, NoTls};

use crate::{
    core::{
        catalog::Database,
        types::{Engine, TableInfoRow},
    },
    error::{MetaError, MetaResult},
};

const EXISTS_SQL: &str = "SELECT count(*) FROM information_schema.tables \
     WHERE table_type IN ('BASE TABLE', 'VIEW') AND LOWER(table_name) = LOWER($1) LIMIT 1";

const COLUMN_NAMES_SQL: &str = "SELECT column_name::text FROM information_schema.columns \
     WHERE LOWER(table_name) = LOWER($1) ORDER BY table_schema, ordinal_position";

// information_schema exposes no primary-key flag on columns, so the rank is
// looked up from the table's PRIMARY KEY constraint.
const COLUMN_INFO_SQL: &str = "SELECT
        COALESCE((
            SELECT kcu.ordinal_position::int8
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
             AND kcu.table_name = tc.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND kcu.column_name = c.column_name
            LIMIT 1
        ), 0) AS pk,
        c.ordinal_position::int8 AS ordinal_position,
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        (CASE WHEN c.is_nullable = 'YES' THEN true ELSE false END) AS nullable,
        c.column_default::text AS column_default
    FROM information_schema.columns c
    WHERE LOWER(c.table_name) = LOWER($1)
    ORDER BY c.table_schema, c.ordinal_position";

const INDEXES_SQL: &str = "SELECT indexname::text, indexdef FROM pg_indexes \
     WHERE indexdef IS NOT NULL AND tablename = $1";

pub struct PostgresDatabase {
    client: Client,
}

impl PostgresDatabase {
    /// Connects using a libpq-style connection string or `postgres://` URL.
    ///
    /// Must be called from inside a tokio runtime: the connection driver is
    /// spawned onto it and lives until the client is dropped.
    pub async fn connect(dsn: &str) -> MetaResult<Self> {
        let config: Config = dsn
            .parse()
            .map_err(|e| MetaError::connection(Engine::Postgres, e))?;
        let database = config.get_dbname().unwrap_or_default().to_string();
        tracing::info!(database = %database, "connecting to PostgreSQL database");

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| MetaError::connection(Engine::Postgres, e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        tracing::info!(database = %database, "PostgreSQL connection established");
        Ok(Self { client })
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    async fn relation_exists(&self, table: &str) -> MetaResult<bool> {
        let row = self.client.query_one(EXISTS_SQL, &[&table]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count > 0)
    }

    async fn column_names(&self, table: &str) -> MetaResult<Vec<String>> {
        let rows = self.client.query(COLUMN_NAMES_SQL, &[&table]).await?;
        rows.iter()
            .map(|r| r.try_get::<_, String>(0).map_err(MetaError::from))
            .collect()
    }

    async fn column_info(&self, table: &str) -> MetaResult<Vec<TableInfoRow>> {
        let rows = self.client.query(COLUMN_INFO_SQL, &[&table]).await?;
        rows.iter()
            .map(|r| -> MetaResult<TableInfoRow> {
                Ok(TableInfoRow {
                    pk: r.try_get("pk")?,
                    index: r.try_get("ordinal_position")?,
                    name: r.try_get("column_name")?,
                    data_type: r.try_get("data_type")?,
                    nullable: r.try_get("nullable")?,
                    default_value: r.try_get("column_default")?,
                })
            })
            .collect()
    }

    async fn index_definitions(&self, table: &str) -> MetaResult<Vec<(String, String)>> {
        let rows = self.client.query(INDEXES_SQL, &[&table]).await?;
        rows.iter()
            .map(|r| -> MetaResult<(String, String)> { Ok((r.try_get(0)?, r.try_get(1)?)) })
            .collect()
    }

    async fn execute(&self, sql: &str) -> MetaResult<()> {
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}

/// Renders a driver error with the server's SQLSTATE, detail and hint when
/// the failure came from the server.
pub(crate) fn format_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut message = db_error.message().to_string();
    if let Some(detail) = db_error.detail().filter(|d| !d.trim().is_empty()) {
        message.push_str(&format!(" (detail: {detail})"));
    }
    if let Some(hint) = db_error.hint().filter(|h| !h.trim().is_empty()) {
        message.push_str(&format!(" (hint: {hint})"));
    }
    format!("{message} (code: {})", db_error.code().code())
}
