//! Audit trail for successful updates.

use crate::error::Result;
use crate::gateway::DatabaseGateway;
use crate::query::quote_ident;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Kind of change recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// Row created.
    Insert,
    /// Row changed.
    Update,
    /// Row removed.
    Delete,
}

impl AuditAction {
    /// Lowercase name stored in the audit table.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Insert => "insert",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// When the change was made.
    pub timestamp: DateTime<Utc>,
    /// Acting user.
    pub user: String,
    /// Storage table affected.
    pub table: String,
    /// Identifier of the affected row.
    pub row_id: i64,
    /// Kind of change.
    pub action: AuditAction,
    /// Human readable summary.
    pub description: String,
}

impl AuditRecord {
    /// Record an update described by `diff`.
    pub fn update(
        user: impl Into<String>,
        table: impl Into<String>,
        row_id: i64,
        diff: &str,
    ) -> Self {
        let user = user.into();
        Self {
            timestamp: Utc::now(),
            description: format!("Entry updated by {user} ({diff})"),
            user,
            table: table.into(),
            row_id,
            action: AuditAction::Update,
        }
    }

    /// Format the record as a log line.
    pub fn to_log_line(&self) -> String {
        format!(
            "{} user={} table={} row={} action={} {}",
            self.timestamp.to_rfc3339(),
            self.user,
            self.table,
            self.row_id,
            self.action,
            self.description
        )
    }
}

/// Audit trail backend.
pub trait AuditLogger: Send + Sync {
    /// Append one record.
    fn log(&self, record: &AuditRecord) -> Result<()>;
}

/// Writes records into an audit table through the database gateway.
///
/// Expected columns: `username`, `affected_table`, `affected_row`,
/// `action`, `logdata`, `logged_at`.
pub struct GatewayAuditLogger {
    gateway: Arc<dyn DatabaseGateway>,
    table: String,
}

impl GatewayAuditLogger {
    /// Create a logger writing to `table`.
    pub fn new(gateway: Arc<dyn DatabaseGateway>, table: impl Into<String>) -> Self {
        Self {
            gateway,
            table: table.into(),
        }
    }

    fn quote(&self, value: &str) -> String {
        format!("'{}'", self.gateway.escape_string(value))
    }
}

impl AuditLogger for GatewayAuditLogger {
    fn log(&self, record: &AuditRecord) -> Result<()> {
        let columns = ["username", "affected_table", "affected_row", "action", "logdata", "logged_at"]
            .map(quote_ident)
            .join(", ");
        let values = [
            self.quote(&record.user),
            self.quote(&record.table),
            record.row_id.to_string(),
            self.quote(record.action.as_str()),
            self.quote(&record.description),
            self.quote(&record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]
        .join(", ");

        self.gateway
            .insert(&self.table, &format!("({columns}) VALUES ({values})"))?;
        tracing::debug!(table = %record.table, row = record.row_id, "audit record written");
        Ok(())
    }
}

/// In-memory audit logger for tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemoryAuditLogger {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLogger {
    /// Create a new memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all logged records.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Get record count.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditLogger for MemoryAuditLogger {
    fn log(&self, record: &AuditRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Audit logger that discards all records.
#[derive(Debug, Default)]
pub struct NullAuditLogger;

impl AuditLogger for NullAuditLogger {
    fn log(&self, _record: &AuditRecord) -> Result<()> {
        Ok(())
    }
}
