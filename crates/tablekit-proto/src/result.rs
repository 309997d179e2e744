//! Result types for list/get responses.

use crate::metadata::PublicMetadata;
use crate::value::Value;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Field values keyed by property name, as sent in a save request.
pub type FieldValues = BTreeMap<String, Value>;

/// A single result row.
///
/// Columns keep the order of the SELECT list; the row serializes as a
/// JSON object keyed by column alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push((name.into(), value));
    }

    /// Append a column, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value.into());
        self
    }

    /// Get a column value by alias.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column aliases in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over (alias, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One page of instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceList {
    /// Rows of the page (look-ahead row already removed).
    pub rows: Vec<Row>,
    /// Page number to request next, if more rows exist.
    pub next_page: Option<u32>,
    /// Entity metadata (absent for enumeration listings).
    pub metadata: Option<PublicMetadata>,
}

/// A single instance with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    /// The instance, if visible.
    pub row: Option<Row>,
    /// Entity metadata.
    pub metadata: PublicMetadata,
    /// Whether the current user may edit the instance.
    pub can_edit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keeps_column_order() {
        let row = Row::new()
            .with("id", 3i64)
            .with("name", "Acme")
            .with("status.id", 1i64);

        assert_eq!(row.len(), 3);
        assert_eq!(row.get("name"), Some(&Value::String("Acme".into())));
        assert_eq!(row.get("missing"), None);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"id":3,"name":"Acme","status.id":1}"#
        );
    }
}
