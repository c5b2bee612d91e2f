//! Structural SQL that cannot use bound parameters.
//!
//! Everything built here interpolates its arguments. Quoting keeps reserved
//! words and mixed-case names intact but is not sanitization: callers must
//! only pass identifiers that come from trusted schema definitions.

/// Quotes a possibly schema-qualified name: each `.`-separated part is
/// wrapped in double quotes, embedded quotes doubled.
///
/// On PostgreSQL a quoted name is matched exactly, so pass the name as the
/// catalog stores it.
pub fn quote_table_name(table: &str) -> String {
    table
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// `DROP TABLE IF EXISTS "<table>"`.
///
/// This is an injection surface if `table` is untrusted.
pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_table_name(table))
}

/// Storage reclamation, identical on every supported engine.
pub fn vacuum() -> &'static str {
    "VACUUM"
}
