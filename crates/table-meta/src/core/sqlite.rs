//! SQLite handle backed by a dedicated worker thread.
//!
//! `rusqlite::Connection` is not `Sync`, so the connection lives on its own
//! thread and requests reach it over a channel. Replies come back through
//! `tokio::sync::oneshot`, which lets the async [`Database`] methods await
//! them without blocking the runtime.

use std::{
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
    time::Duration,
};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use tokio::sync::oneshot;

use crate::{
    core::{
        catalog::Database,
        types::{Engine, TableInfoRow},
    },
    error::{MetaError, MetaResult},
};

const EXISTS_SQL: &str = "SELECT count(*) FROM sqlite_schema \
     WHERE type IN ('table', 'view') AND LOWER(name) = LOWER(?1) LIMIT 1";

const COLUMN_NAMES_SQL: &str = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

const COLUMN_INFO_SQL: &str = "SELECT pk, cid + 1, name, type, \"notnull\" = 0, dflt_value \
     FROM pragma_table_info(?1) ORDER BY cid";

const INDEXES_SQL: &str = "SELECT name, sql FROM sqlite_schema \
     WHERE type = 'index' AND sql IS NOT NULL AND tbl_name = ?1";

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(2_000);

#[derive(Debug)]
pub struct SqliteDatabase {
    tx: mpsc::Sender<DbTask>,
    path: PathBuf,
}

impl SqliteDatabase {
    /// Opens (creating if needed) the database at `path` on a new worker
    /// thread. Returns only once the connection is usable, so a bad path
    /// fails here rather than on the first query.
    pub async fn open(path: &Path, busy_timeout: Duration) -> MetaResult<Self> {
        let path = absolutize(path)?;
        let (tx, rx) = mpsc::channel::<DbTask>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let path_for_thread = path.clone();
        thread::Builder::new()
            .name("table-meta-sqlite".into())
            .spawn(move || db_worker_main(path_for_thread, busy_timeout, ready_tx, rx))
            .map_err(|e| MetaError::connection(Engine::Sqlite, e))?;

        ready_rx
            .await
            .map_err(|_| MetaError::Internal("sqlite worker exited before opening".into()))??;

        tracing::info!(path = %path.display(), "SQLite database opened");
        Ok(Self { tx, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<MetaResult<T>>) -> DbTask,
    ) -> MetaResult<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(make(tx))
            .map_err(|_| MetaError::Internal("sqlite worker unavailable".into()))?;
        rx.await
            .map_err(|_| MetaError::Internal("sqlite worker dropped response".into()))?
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    fn engine(&self) -> Engine {
        Engine::Sqlite
    }

    async fn relation_exists(&self, table: &str) -> MetaResult<bool> {
        let table = table.to_string();
        self.request(|respond_to| DbTask::RelationExists { table, respond_to }).await
    }

    async fn column_names(&self, table: &str) -> MetaResult<Vec<String>> {
        let table = table.to_string();
        self.request(|respond_to| DbTask::ColumnNames { table, respond_to }).await
    }

    async fn column_info(&self, table: &str) -> MetaResult<Vec<TableInfoRow>> {
        let table = table.to_string();
        self.request(|respond_to| DbTask::ColumnInfo { table, respond_to }).await
    }

    async fn index_definitions(&self, table: &str) -> MetaResult<Vec<(String, String)>> {
        let table = table.to_string();
        self.request(|respond_to| DbTask::Indexes { table, respond_to }).await
    }

    async fn execute(&self, sql: &str) -> MetaResult<()> {
        let sql = sql.to_string();
        self.request(|respond_to| DbTask::Execute { sql, respond_to }).await
    }
}

enum DbTask {
    RelationExists {
        table: String,
        respond_to: oneshot::Sender<MetaResult<bool>>,
    },
    ColumnNames {
        table: String,
        respond_to: oneshot::Sender<MetaResult<Vec<String>>>,
    },
    ColumnInfo {
        table: String,
        respond_to: oneshot::Sender<MetaResult<Vec<TableInfoRow>>>,
    },
    Indexes {
        table: String,
        respond_to: oneshot::Sender<MetaResult<Vec<(String, String)>>>,
    },
    Execute {
        sql: String,
        respond_to: oneshot::Sender<MetaResult<()>>,
    },
}

fn db_worker_main(
    db_path: PathBuf,
    busy_timeout: Duration,
    ready: oneshot::Sender<MetaResult<()>>,
    rx: mpsc::Receiver<DbTask>,
) {
    let conn = match open_conn(&db_path, busy_timeout) {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if ready.send(Ok(())).is_err() {
        return;
    }

    // Exits once every SqliteDatabase sender is dropped; the connection closes with it.
    while let Ok(task) = rx.recv() {
        match task {
            DbTask::RelationExists { table, respond_to } => {
                let _ = respond_to.send(relation_exists(&conn, &table));
            }
            DbTask::ColumnNames { table, respond_to } => {
                let _ = respond_to.send(column_names(&conn, &table));
            }
            DbTask::ColumnInfo { table, respond_to } => {
                let _ = respond_to.send(column_info(&conn, &table));
            }
            DbTask::Indexes { table, respond_to } => {
                let _ = respond_to.send(index_definitions(&conn, &table));
            }
            DbTask::Execute { sql, respond_to } => {
                let res = conn.execute_batch(&sql).map_err(MetaError::from);
                let _ = respond_to.send(res);
            }
        }
    }
    tracing::debug!(path = %db_path.display(), "SQLite worker stopped");
}

fn open_conn(path: &Path, busy_timeout: Duration) -> MetaResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)
        .map_err(|source| MetaError::connection(Engine::Sqlite, source))?;
    conn.busy_timeout(busy_timeout)
        .map_err(|source| MetaError::connection(Engine::Sqlite, source))?;
    Ok(conn)
}

fn relation_exists(conn: &Connection, table: &str) -> MetaResult<bool> {
    let count: i64 = conn.query_row(EXISTS_SQL, [table], |r| r.get(0))?;
    Ok(count > 0)
}

fn column_names(conn: &Connection, table: &str) -> MetaResult<Vec<String>> {
    let mut stmt = conn.prepare(COLUMN_NAMES_SQL)?;
    let names = stmt
        .query_map([table], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn column_info(conn: &Connection, table: &str) -> MetaResult<Vec<TableInfoRow>> {
    let mut stmt = conn.prepare(COLUMN_INFO_SQL)?;
    let rows = stmt
        .query_map([table], |r| {
            Ok(TableInfoRow {
                pk: r.get(0)?,
                index: r.get(1)?,
                name: r.get(2)?,
                data_type: r.get(3)?,
                nullable: r.get(4)?,
                default_value: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn index_definitions(conn: &Connection, table: &str) -> MetaResult<Vec<(String, String)>> {
    let mut stmt = conn.prepare(INDEXES_SQL)?;
    let rows = stmt
        .query_map([table], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn absolutize(path: &Path) -> MetaResult<PathBuf> {
    // The file may not exist yet, so canonicalize is not an option.
    let raw = path.to_string_lossy();
    if raw == ":memory:" || raw.starts_with("file:") || path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
