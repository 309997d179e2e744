//! Database gateway abstraction.
//!
//! The engine never opens connections itself. It hands finished SQL text
//! to a [`DatabaseGateway`] and receives rows or affected-row counts back.

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteGateway;

use crate::error::Result;
use tablekit_proto::Row;

/// Synchronous SQL execution boundary.
pub trait DatabaseGateway: Send + Sync {
    /// Run a SELECT. `table` names the main table for diagnostics.
    fn select(&self, table: &str, sql: &str) -> Result<Vec<Row>>;

    /// Run `UPDATE <table> <set_where>` and return the affected row count.
    fn update(&self, table: &str, set_where: &str) -> Result<u64>;

    /// Run `INSERT INTO <table> <columns_values>` and return the new row id.
    fn insert(&self, table: &str, columns_values: &str) -> Result<i64>;

    /// Escape `value` for embedding between single quotes.
    fn escape_string(&self, value: &str) -> String;

    /// Message of the most recent failure, if any.
    fn last_error(&self) -> Option<String>;
}

/// Standard SQL escaping: single quotes are doubled.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}
