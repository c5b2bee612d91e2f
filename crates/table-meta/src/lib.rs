//! Backend-agnostic table metadata for SQLite and PostgreSQL.
//!
//! Open a handle with [`core::connection::open`], wrap it in a
//! [`core::dao::Dao`] and query it:
//!
//! ```no_run
//! # async fn demo() -> table_meta::error::MetaResult<()> {
//! use table_meta::core::{connection, dao::Dao};
//!
//! let dao = Dao::new(connection::open("app.db").await?);
//! if dao.has_table("users").await {
//!     let columns = dao.table_columns("users").await?;
//!     println!("{columns:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod logging;
pub mod output;

pub use crate::core::{catalog::Database, dao::Dao, types::Engine};
pub use crate::error::{MetaError, MetaResult};
