//! Table schemas.

use super::property::{PropertyDescriptor, ID_PROPERTY};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Per-entity schema: names and the ordered property list.
///
/// Built once through [`TableSchemaBuilder`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Logical entity name; also the SQL alias of the main table.
    pub table_id: String,
    /// Storage table name.
    pub db_table: String,
    /// Properties in declaration order.
    pub properties: Vec<PropertyDescriptor>,
}

impl TableSchema {
    /// Start building a schema.
    pub fn builder(table_id: impl Into<String>, db_table: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            table_id: table_id.into(),
            db_table: db_table.into(),
            properties: Vec::new(),
        }
    }

    /// Get a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Get the identifier property.
    pub fn id_property(&self) -> Option<&PropertyDescriptor> {
        self.property(ID_PROPERTY)
    }

    /// Storage column of the identifier property.
    pub fn id_column(&self) -> Option<&str> {
        self.id_property().map(|p| p.db_column.as_str())
    }

    /// (property name, column) pairs of the label fields stored in this
    /// table. The identifier and joined-column overrides are excluded.
    pub fn label_fields(&self) -> Vec<(&str, &str)> {
        self.properties
            .iter()
            .filter(|p| p.is_label() && !p.is_id() && p.column_override().is_none())
            .map(|p| (p.name.as_str(), p.db_column.as_str()))
            .collect()
    }
}

/// Builder for [`TableSchema`].
#[derive(Debug)]
pub struct TableSchemaBuilder {
    table_id: String,
    db_table: String,
    properties: Vec<PropertyDescriptor>,
}

impl TableSchemaBuilder {
    /// Add a property.
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Add multiple properties.
    pub fn properties(mut self, properties: impl IntoIterator<Item = PropertyDescriptor>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Property names must be unique. The identifier property and
    /// properties reading a joined `alias.column` are forced read-only.
    /// Validation patterns are compiled here.
    pub fn build(self) -> Result<TableSchema> {
        if self.table_id.is_empty() || self.db_table.is_empty() {
            return Err(Error::Schema("table id and storage name are required".into()));
        }

        let mut seen = HashSet::new();
        let mut properties = self.properties;
        for prop in &mut properties {
            if !seen.insert(prop.name.clone()) {
                return Err(Error::Schema(format!(
                    "duplicate property '{}' in {}",
                    prop.name, self.table_id
                )));
            }
            if prop.is_id() || prop.column_override().is_some() {
                prop.flags.readonly = true;
            }
            prop.compile_pattern().map_err(|e| {
                Error::Schema(format!(
                    "invalid pattern for {}.{}: {e}",
                    self.table_id, prop.name
                ))
            })?;
        }

        Ok(TableSchema {
            table_id: self.table_id,
            db_table: self.db_table,
            properties,
        })
    }
}
