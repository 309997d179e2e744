//! SQLite gateway backed by rusqlite.

use super::{escape_sql_string, DatabaseGateway};
use crate::error::{Error, Result};
use crate::query::quote_ident;
use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::path::Path;
use tablekit_proto::{Row, Value};

/// A [`DatabaseGateway`] over a single SQLite connection.
///
/// Calls are serialized through a mutex; each statement runs in SQLite's
/// implicit transaction.
pub struct SqliteGateway {
    conn: Mutex<Connection>,
    last_error: Mutex<Option<String>>,
}

impl SqliteGateway {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| Error::Gateway(e.to_string()))?;
        tracing::debug!(path = %path.as_ref().display(), "opened sqlite database");
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Gateway(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            last_error: Mutex::new(None),
        }
    }

    /// Run a batch of statements (schema setup, seeding).
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let result = self.conn.lock().execute_batch(sql);
        self.record(result)
    }

    /// Run one statement and return the affected row count.
    pub fn execute(&self, sql: &str) -> Result<u64> {
        let result = self.conn.lock().execute(sql, []).map(|n| n as u64);
        self.record(result)
    }

    fn record<T>(&self, result: rusqlite::Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                let message = e.to_string();
                tracing::debug!(error = %message, "sqlite statement failed");
                *self.last_error.lock() = Some(message.clone());
                Err(Error::Gateway(message))
            }
        }
    }

    fn query(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<Row>> {
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut result = Row::new();
            for (i, name) in names.iter().enumerate() {
                result.push(name.clone(), to_value(row.get_ref(i)?));
            }
            out.push(result);
        }
        Ok(out)
    }
}

impl DatabaseGateway for SqliteGateway {
    fn select(&self, table: &str, sql: &str) -> Result<Vec<Row>> {
        let result = Self::query(&self.conn.lock(), sql);
        let rows = self.record(result)?;
        tracing::debug!(table, rows = rows.len(), "select executed");
        Ok(rows)
    }

    fn update(&self, table: &str, set_where: &str) -> Result<u64> {
        self.execute(&format!("UPDATE {}\n{set_where}", quote_ident(table)))
    }

    fn insert(&self, table: &str, columns_values: &str) -> Result<i64> {
        let sql = format!("INSERT INTO {} {columns_values}", quote_ident(table));
        let conn = self.conn.lock();
        let result = conn.execute(&sql, []).map(|_| conn.last_insert_rowid());
        drop(conn);
        self.record(result)
    }

    fn escape_string(&self, value: &str) -> String {
        escape_sql_string(value)
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
