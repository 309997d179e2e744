//! UPDATE statement synthesis with optimistic concurrency.
//!
//! Every changed column is pinned to the value the client last read, so
//! the statement only matches while the row is unchanged. A statement that
//! affects zero rows therefore signals a concurrent modification.

use crate::catalog::TableDescriptor;
use crate::error::{Error, Result};
use crate::query::{numeric_literal, quote_ident, Criteria};
use crate::security::AccessContext;
use tablekit_proto::{FieldValues, Value};

/// A synthesized UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    /// `col=value` assignments.
    pub set_clause: String,
    /// Identifier predicate plus one pin per changed column.
    pub where_clause: String,
    /// Human readable diff for the audit trail.
    pub audit: String,
    /// Changed property names.
    pub changed: Vec<String>,
}

impl UpdateStatement {
    /// SET/WHERE text handed to the gateway's `update`.
    pub fn to_sql(&self) -> String {
        format!("   SET {}\n WHERE {}", self.set_clause, self.where_clause)
    }
}

/// Outcome of [`UpdateBuilder::create_update_statement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    /// Nothing changed; no statement and no audit entry.
    Unchanged,
    /// Statement to execute.
    Statement(UpdateStatement),
}

/// Builds UPDATE statements for one table.
pub struct UpdateBuilder<'a> {
    ctx: &'a AccessContext<'a>,
    table: &'a dyn TableDescriptor,
}

impl<'a> UpdateBuilder<'a> {
    /// Create a builder for `table`.
    pub fn new(ctx: &'a AccessContext<'a>, table: &'a dyn TableDescriptor) -> Self {
        Self { ctx, table }
    }

    /// Synthesize the update of instance `id` from `old` to `new` values.
    ///
    /// Only properties whose new value differs from the old one take part.
    /// Changing an unknown or read-only property aborts immediately;
    /// validation failures are collected and reported together.
    pub fn create_update_statement(
        &self,
        id: i64,
        old: &FieldValues,
        new: &FieldValues,
    ) -> Result<UpdatePlan> {
        let schema = self.table.schema();
        if let Err(e) = self.table.can_edit_instance(self.ctx, id) {
            tracing::warn!(entity = %schema.table_id, id, error = %e, "edit denied");
            return Err(e);
        }
        let id_column = schema
            .id_column()
            .ok_or_else(|| Error::Schema(format!("{} has no identifier column", schema.table_id)))?;

        let mut assignments = Vec::new();
        let mut criteria = Criteria::new();
        criteria.push(format!("{}={id}", quote_ident(id_column)));
        let mut diff = Vec::new();
        let mut changed = Vec::new();
        let mut invalid = Vec::new();

        for (name, value) in new {
            let old_value = old.get(name).unwrap_or(&Value::Null);
            if value.loosely_equals(old_value) {
                continue;
            }

            let prop = schema.property(name).ok_or_else(|| {
                Error::invalid_field(name.as_str(), format!("Property {name} was not recognized"))
            })?;
            if prop.is_readonly() {
                return Err(Error::invalid_field(
                    name.as_str(),
                    format!("Property {name} is read-only."),
                ));
            }

            if let Err(reason) = self.table.validate_before_save(id, old, new, prop, value) {
                tracing::debug!(entity = %schema.table_id, property = %name, %reason, "invalid value");
                invalid.push(name.clone());
            }

            let column = quote_ident(&prop.db_column);
            assignments.push(format!("{column}={}", self.literal(value)));
            criteria.push(if old_value.is_empty() {
                format!("({column} IS NULL OR {column}='')")
            } else {
                format!("{column}={}", self.literal(old_value))
            });
            diff.push(describe_change(&prop.db_column, old_value, value));
            changed.push(name.clone());
        }

        if changed.is_empty() {
            return Ok(UpdatePlan::Unchanged);
        }
        if !invalid.is_empty() {
            return Err(Error::Validation {
                message: format!(
                    "Value of one or more properties is invalid ({})",
                    invalid.join(", ")
                ),
                fields: invalid,
            });
        }

        let statement = UpdateStatement {
            set_clause: assignments.join(", "),
            where_clause: criteria.to_where_clause(),
            audit: diff.join(", "),
            changed,
        };
        tracing::debug!(entity = %schema.table_id, id, sql = %statement.to_sql(), "update statement");
        Ok(UpdatePlan::Statement(statement))
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => u8::from(*b).to_string(),
            Value::Int64(_) | Value::Float64(_) => match numeric_literal(value) {
                Some(literal) => literal,
                None => self.ctx.quote(&value.to_string()),
            },
            Value::String(s) => self.ctx.quote(s),
        }
    }
}

/// `col changed from old to new`; values are quoted unless both are numeric.
fn describe_change(column: &str, old: &Value, new: &Value) -> String {
    let old_text = old.to_text().unwrap_or_default();
    let new_text = new.to_text().unwrap_or_default();
    if old.is_numeric() && new.is_numeric() {
        format!("{column} changed from {old_text} to {new_text}")
    } else {
        format!("{column} changed from '{old_text}' to '{new_text}'")
    }
}
