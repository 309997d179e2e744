//! Output formatters for service results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use tablekit_core::SaveOutcome;
use tablekit_proto::{InstanceList, InstanceView, PublicMetadata, Row, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format one page of instances.
    fn format_list(&self, list: &InstanceList) -> String;

    /// Format a single instance.
    fn format_instance(&self, view: &InstanceView) -> String;

    /// Format an entity schema.
    fn format_metadata(&self, metadata: &PublicMetadata) -> String;

    /// Format the outcome of a save.
    fn format_saved(&self, outcome: &SaveOutcome) -> String;

    /// Format the registered entity names.
    fn format_entities(&self, entities: &[String]) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format a simple message.
    fn format_message(&self, message: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_list(&self, list: &InstanceList) -> String {
        let mut output = format_rows_as_table(&list.rows);
        if let Some(next) = list.next_page {
            output.push_str(&format!("\nmore rows on page {next}"));
        }
        output
    }

    fn format_instance(&self, view: &InstanceView) -> String {
        let Some(row) = &view.row else {
            return format!("No visible {} with that id", view.metadata.table_name);
        };

        let mut table = Table::new();
        table.set_header(vec!["Property", "Value"]);
        for (name, value) in row.iter() {
            table.add_row(vec![Cell::new(name), Cell::new(format_value(value))]);
        }
        let access = if view.can_edit { "editable" } else { "read-only" };
        format!("{}\n{}", table, access)
    }

    fn format_metadata(&self, metadata: &PublicMetadata) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Property", "Label", "Purpose", "Flags", "Related"]);
        for prop in &metadata.properties {
            let mut flags = Vec::new();
            if prop.readonly {
                flags.push("readonly".to_string());
            }
            if prop.required {
                flags.push("required".to_string());
            }
            if let Some(length) = prop.length {
                flags.push(format!("max {length}"));
            }
            if let Some(pattern) = &prop.pattern {
                flags.push(format!("/{pattern}/"));
            }
            table.add_row(vec![
                Cell::new(prop.name.prop()),
                Cell::new(&prop.label),
                Cell::new(format!("{:?}", prop.purpose).to_lowercase()),
                Cell::new(flags.join(" ")),
                Cell::new(prop.related_table.as_deref().unwrap_or("")),
            ]);
        }

        let mut output = format!("{} ({})\n{}", metadata.display_name, metadata.table_name, table);
        for relation in &metadata.relations {
            output.push_str(&format!(
                "\n{} -> {}",
                relation.label, relation.class_name
            ));
        }
        output
    }

    fn format_saved(&self, outcome: &SaveOutcome) -> String {
        match outcome {
            SaveOutcome::Unchanged => "No changes".to_string(),
            SaveOutcome::Updated { audit, .. } => format!("Saved: {}", audit.description),
        }
    }

    fn format_entities(&self, entities: &[String]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Entity"]);

        for entity in entities {
            table.add_row(vec![entity]);
        }

        table.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_list(&self, list: &InstanceList) -> String {
        to_pretty_json(list)
    }

    fn format_instance(&self, view: &InstanceView) -> String {
        to_pretty_json(view)
    }

    fn format_metadata(&self, metadata: &PublicMetadata) -> String {
        to_pretty_json(metadata)
    }

    fn format_saved(&self, outcome: &SaveOutcome) -> String {
        let value = match outcome {
            SaveOutcome::Unchanged => serde_json::json!({ "status": "unchanged" }),
            SaveOutcome::Updated { audit, changed } => serde_json::json!({
                "status": "updated",
                "changed": changed,
                "audit": audit,
            }),
        };
        to_pretty_json(&value)
    }

    fn format_entities(&self, entities: &[String]) -> String {
        to_pretty_json(&entities)
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({
            "error": error
        })
        .to_string()
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({
            "message": message
        })
        .to_string()
    }
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// Rows as a table; columns come from the first row.
fn format_rows_as_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "No results".to_string();
    };

    let mut table = Table::new();
    table.set_header(first.column_names().map(Cell::new).collect::<Vec<_>>());
    for row in rows {
        let cells: Vec<Cell> = first
            .column_names()
            .map(|name| Cell::new(row.get(name).map(format_value).unwrap_or_default()))
            .collect();
        table.add_row(cells);
    }

    format!("{}\n{} row(s)", table, rows.len())
}

/// Format a Value as a display string.
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        other => other.to_text().unwrap_or_default(),
    }
}
