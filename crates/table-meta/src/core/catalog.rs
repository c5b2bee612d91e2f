//! Engine catalog abstraction.

use async_trait::async_trait;

use crate::core::types::{Engine, TableInfoRow};
use crate::error::MetaResult;

/// An open database handle together with its engine's catalog queries.
///
/// There is one implementation per supported engine, chosen once when the
/// handle is opened. Implementations report catalog failures as errors and
/// leave every policy decision (fail-closed existence, missing-table
/// detection) to [`Dao`](crate::core::dao::Dao). An implementation must not
/// swallow errors itself, otherwise the DAO can no longer tell a failed probe
/// from a negative one.
#[async_trait]
pub trait Database: Send + Sync {
    /// Engine identifier for logging and output.
    fn engine(&self) -> Engine;

    /// Whether a table or view named `table` exists (case-insensitive) in any
    /// schema visible to the connection.
    async fn relation_exists(&self, table: &str) -> MetaResult<bool>;

    /// Column names of `table` in catalog order. Unknown tables yield an
    /// empty list.
    async fn column_names(&self, table: &str) -> MetaResult<Vec<String>>;

    /// Full column metadata of `table` in ordinal order. Unknown tables
    /// yield an empty list; engines do not agree on raising an error.
    async fn column_info(&self, table: &str) -> MetaResult<Vec<TableInfoRow>>;

    /// `(name, definition)` pairs for every index on `table` whose
    /// definition is not NULL.
    async fn index_definitions(&self, table: &str) -> MetaResult<Vec<(String, String)>>;

    /// Execute a raw statement without parameter binding.
    async fn execute(&self, sql: &str) -> MetaResult<()>;
}
