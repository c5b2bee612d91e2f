//! Table metadata operations over a shared database handle.

use std::sync::Arc;

use crate::{
    core::{
        catalog::Database,
        statements,
        types::{Engine, IndexMap, TableInfoRow},
    },
    error::{MetaError, MetaResult},
};

/// Engine-independent table metadata API.
///
/// Holds no state besides the handle; every call is a single round trip.
#[derive(Clone)]
pub struct Dao {
    db: Arc<dyn Database>,
}

impl Dao {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Arc<dyn Database> {
        &self.db
    }

    pub fn engine(&self) -> Engine {
        self.db.engine()
    }

    /// Checks if a table (or view) with the provided name exists
    /// (case-insensitive).
    ///
    /// Fails closed: any error while probing the catalog yields `false`.
    /// Callers use this as a gate before DDL and must never see an error
    /// from it.
    pub async fn has_table(&self, table: &str) -> bool {
        self.db.relation_exists(table).await.unwrap_or(false)
    }

    /// Returns all column names of a single table.
    ///
    /// An unknown table yields an empty list, not an error.
    pub async fn table_columns(&self, table: &str) -> MetaResult<Vec<String>> {
        self.db.column_names(table).await
    }

    /// Returns detailed column metadata for a table.
    ///
    /// Some catalogs answer an unknown table with an empty result instead of
    /// an error, so an empty result is reported as
    /// [`MetaError::MissingTable`].
    pub async fn table_info(&self, table: &str) -> MetaResult<Vec<TableInfoRow>> {
        let info = self.db.column_info(table).await?;
        if info.is_empty() {
            return Err(MetaError::MissingTable(table.to_string()));
        }
        Ok(info)
    }

    /// Returns index name -> definition for every index of the table with a
    /// non-null definition.
    ///
    /// Note: an unknown table yields an empty map, not an error.
    pub async fn table_indexes(&self, table: &str) -> MetaResult<IndexMap> {
        let defs = self.db.index_definitions(table).await?;
        Ok(defs.into_iter().collect())
    }

    /// Drops the specified table. No-op if it doesn't exist.
    ///
    /// `table` is interpolated into the statement verbatim and must come
    /// only from trusted input.
    pub async fn delete_table(&self, table: &str) -> MetaResult<()> {
        tracing::debug!(table, engine = %self.engine(), "dropping table");
        self.db.execute(&statements::drop_table(table)).await
    }

    /// Runs VACUUM on the current handle to reclaim unused disk space.
    pub async fn vacuum(&self) -> MetaResult<()> {
        tracing::debug!(engine = %self.engine(), "vacuuming database");
        self.db.execute(statements::vacuum()).await
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;

    use super::*;
    use crate::core::sqlite::{SqliteDatabase, DEFAULT_BUSY_TIMEOUT};

    async fn sqlite_dao() -> Dao {
        let db = SqliteDatabase::open(Path::new(":memory:"), DEFAULT_BUSY_TIMEOUT)
            .await
            .unwrap();
        let dao = Dao::new(Arc::new(db));
        dao.db()
            .execute(
                "CREATE TABLE users (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    created_at TEXT DEFAULT CURRENT_TIMESTAMP
                );
                CREATE INDEX idx_users_name ON users (name);
                CREATE TABLE empty_idx (id INTEGER);
                CREATE VIEW user_names AS SELECT name FROM users;",
            )
            .await
            .unwrap();
        dao
    }

    /// Handle whose every call fails, as a broken catalog read would.
    struct FailingDatabase;

    #[async_trait]
    impl Database for FailingDatabase {
        fn engine(&self) -> Engine {
            Engine::Postgres
        }

        async fn relation_exists(&self, _table: &str) -> MetaResult<bool> {
            Err(MetaError::Query("permission denied for schema".into()))
        }

        async fn column_names(&self, _table: &str) -> MetaResult<Vec<String>> {
            Err(MetaError::Query("permission denied for schema".into()))
        }

        async fn column_info(&self, _table: &str) -> MetaResult<Vec<TableInfoRow>> {
            Err(MetaError::Query("permission denied for schema".into()))
        }

        async fn index_definitions(&self, _table: &str) -> MetaResult<Vec<(String, String)>> {
            Err(MetaError::Query("permission denied for schema".into()))
        }

        async fn execute(&self, _sql: &str) -> MetaResult<()> {
            Err(MetaError::Query("permission denied for schema".into()))
        }
    }

    #[tokio::test]
    async fn test_has_table_is_case_insensitive() {
        let dao = sqlite_dao().await;
        assert!(dao.has_table("users").await);
        assert!(dao.has_table("USERS").await);
        assert!(dao.has_table("Users").await);
        assert!(dao.has_table("user_names").await);
    }

    #[tokio::test]
    async fn test_has_table_missing() {
        let dao = sqlite_dao().await;
        assert!(!dao.has_table("missing").await);
        assert!(!dao.has_table("").await);
    }

    #[tokio::test]
    async fn test_has_table_fails_closed() {
        let dao = Dao::new(Arc::new(FailingDatabase));
        assert!(!dao.has_table("users").await);
    }

    #[tokio::test]
    async fn test_table_columns() {
        let dao = sqlite_dao().await;
        let mut columns = dao.table_columns("users").await.unwrap();
        columns.sort();
        assert_eq!(columns, vec!["created_at", "id", "name"]);
    }

    #[tokio::test]
    async fn test_table_columns_missing_table_is_empty() {
        let dao = sqlite_dao().await;
        assert!(dao.table_columns("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_table_info() {
        let dao = sqlite_dao().await;
        let info = dao.table_info("USERS").await.unwrap();
        let names: Vec<&str> = info.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "created_at"]);
        assert_eq!(info[0].pk, 1);
        assert_eq!(info[2].index, 3);
        assert_eq!(info[2].default_value.as_deref(), Some("CURRENT_TIMESTAMP"));
    }

    #[tokio::test]
    async fn test_table_info_missing_table() {
        let dao = sqlite_dao().await;
        let err = dao.table_info("missing").await.unwrap_err();
        assert!(matches!(err, MetaError::MissingTable(ref t) if t == "missing"));
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let dao = Dao::new(Arc::new(FailingDatabase));
        assert_eq!(dao.table_columns("users").await.unwrap_err().code(), "QUERY_ERROR");
        assert_eq!(dao.table_info("users").await.unwrap_err().code(), "QUERY_ERROR");
        assert_eq!(dao.table_indexes("users").await.unwrap_err().code(), "QUERY_ERROR");
        assert_eq!(dao.delete_table("users").await.unwrap_err().code(), "QUERY_ERROR");
        assert_eq!(dao.vacuum().await.unwrap_err().code(), "QUERY_ERROR");
    }

    #[tokio::test]
    async fn test_table_indexes() {
        let dao = sqlite_dao().await;
        let indexes = dao.table_indexes("users").await.unwrap();
        assert_eq!(indexes.len(), 1);
        assert_eq!(
            indexes.get("idx_users_name").map(String::as_str),
            Some("CREATE INDEX idx_users_name ON users (name)")
        );

        assert!(dao.table_indexes("empty_idx").await.unwrap().is_empty());
        assert!(dao.table_indexes("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_table_is_idempotent() {
        let dao = sqlite_dao().await;
        dao.delete_table("empty_idx").await.unwrap();
        assert!(!dao.has_table("empty_idx").await);

        dao.delete_table("empty_idx").await.unwrap();
        dao.delete_table("never_existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_table_with_reserved_word_name() {
        let dao = sqlite_dao().await;
        dao.db()
            .execute("CREATE TABLE \"order\" (id INTEGER)")
            .await
            .unwrap();
        assert!(dao.has_table("order").await);
        assert_eq!(dao.table_info("order").await.unwrap().len(), 1);

        dao.delete_table("order").await.unwrap();
        assert!(!dao.has_table("order").await);
    }

    #[tokio::test]
    async fn test_vacuum_keeps_schema() {
        let dao = sqlite_dao().await;
        dao.vacuum().await.unwrap();

        assert!(dao.has_table("users").await);
        assert_eq!(dao.table_columns("users").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_vacuum_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = SqliteDatabase::open(&dir.path().join("vac.db"), DEFAULT_BUSY_TIMEOUT)
            .await
            .unwrap();
        let dao = Dao::new(Arc::new(db));

        dao.vacuum().await.unwrap();

        dao.db()
            .execute("CREATE TABLE logs (id INTEGER, line TEXT); INSERT INTO logs VALUES (1, 'x');")
            .await
            .unwrap();
        dao.delete_table("logs").await.unwrap();
        dao.vacuum().await.unwrap();
        assert!(!dao.has_table("logs").await);
    }
}
