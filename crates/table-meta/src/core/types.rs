use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Relational engine a handle is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Sqlite,
    Postgres,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Sqlite => "sqlite",
            Engine::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a table as reported by the engine's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfoRow {
    /// 0 when the column is not part of the primary key, otherwise its
    /// 1-based position within the key.
    pub pk: i64,
    /// 1-based ordinal position.
    pub index: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    /// Raw default expression, exactly as the catalog stores it.
    pub default_value: Option<String>,
}

/// Index name -> defining DDL.
pub type IndexMap = HashMap<String, String>;
