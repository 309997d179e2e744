//! Subcommands and their execution against the data service.

use crate::demo;
use crate::formatter::Formatter;
use clap::Subcommand;
use tablekit_core::{DataService, SqliteGateway, Verbosity};
use tablekit_proto::{FieldValues, RequestParams, Value};
use thiserror::Error;

/// What to do.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the demo tables and seed rows.
    Init,

    /// List registered entities.
    Entities,

    /// Show the public schema of an entity.
    Schema {
        /// Entity name.
        entity: String,
    },

    /// List one page of instances (`entity::property` lists enum values).
    List {
        /// Entity name.
        entity: String,

        /// 1-based page number.
        #[arg(long)]
        page: Option<u32>,

        /// Rows per page.
        #[arg(long)]
        max: Option<u32>,

        /// Comma-separated properties to return besides the defaults.
        #[arg(long, value_delimiter = ',')]
        props: Vec<String>,
    },

    /// Show one instance.
    Get {
        /// Entity name.
        entity: String,

        /// Instance identifier.
        id: String,

        /// Comma-separated properties to return (default: all).
        #[arg(long, value_delimiter = ',')]
        props: Vec<String>,
    },

    /// Save an edit of one instance.
    Save {
        /// Entity name.
        entity: String,

        /// Instance identifier.
        id: i64,

        /// Value last read, as name=value. Repeatable.
        #[arg(long = "old", value_name = "NAME=VALUE")]
        old: Vec<String>,

        /// Value to write, as name=value. Repeatable.
        #[arg(long = "new", value_name = "NAME=VALUE")]
        new: Vec<String>,
    },
}

/// Command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Engine failure.
    #[error(transparent)]
    Engine(#[from] tablekit_core::Error),

    /// `--user` is not `<id>:<name>`.
    #[error("invalid user '{0}', expected <id>:<name>")]
    User(String),

    /// Malformed `name=value` argument.
    #[error("invalid assignment '{0}', expected NAME=VALUE")]
    Assignment(String),
}

impl CommandError {
    /// Message shown to the user.
    pub fn message(&self, verbosity: Verbosity) -> String {
        match self {
            CommandError::Engine(e) => e.client_message(verbosity),
            other => other.to_string(),
        }
    }
}

/// Run `command` and return formatted output.
pub fn execute(
    service: &DataService,
    gateway: &SqliteGateway,
    command: Command,
    formatter: &dyn Formatter,
) -> Result<String, CommandError> {
    match command {
        Command::Init => {
            demo::seed(gateway)?;
            Ok(formatter.format_message("Demo catalog created"))
        }
        Command::Entities => Ok(formatter.format_entities(&service.registry().entity_names())),
        Command::Schema { entity } => {
            let metadata = service.get_public_metadata(&entity)?;
            Ok(formatter.format_metadata(&metadata))
        }
        Command::List {
            entity,
            page,
            max,
            props,
        } => {
            let mut request = RequestParams::new();
            if let Some(page) = page {
                request = request.with_page(page);
            }
            if let Some(max) = max {
                request = request.with_max(max);
            }
            if !props.is_empty() {
                request = request.with_props(props);
            }
            let list = service.list_instances(&entity, &request)?;
            Ok(formatter.format_list(&list))
        }
        Command::Get { entity, id, props } => {
            let mut request = RequestParams::new();
            if !props.is_empty() {
                request = request.with_props(props);
            }
            let view = service.get_instance(&entity, &id, &request)?;
            Ok(formatter.format_instance(&view))
        }
        Command::Save {
            entity,
            id,
            old,
            new,
        } => {
            let old = parse_assignments(&old)?;
            let new = parse_assignments(&new)?;
            let outcome = service.save_instance(&entity, id, &old, &new)?;
            Ok(formatter.format_saved(&outcome))
        }
    }
}

/// Parse `name=value` pairs. `NULL` is the null value; everything else is
/// passed as text and validated by the engine.
pub fn parse_assignments(pairs: &[String]) -> Result<FieldValues, CommandError> {
    pairs
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .filter(|(name, _)| !name.trim().is_empty())
                .ok_or_else(|| CommandError::Assignment(pair.clone()))?;
            let value = if value.eq_ignore_ascii_case("null") {
                Value::Null
            } else {
                Value::String(value.to_string())
            };
            Ok((name.trim().to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::JsonFormatter;
    use std::sync::Arc;
    use tablekit_core::{EngineConfig, StaticIdentity};

    fn setup() -> (DataService, Arc<SqliteGateway>) {
        let gateway = Arc::new(SqliteGateway::open_in_memory().unwrap());
        demo::seed(&gateway).unwrap();
        let service = DataService::new(
            Arc::new(demo::registry()),
            gateway.clone(),
            Arc::new(StaticIdentity::new(1, "demo")),
            EngineConfig::new(),
        );
        (service, gateway)
    }

    fn run(service: &DataService, gateway: &SqliteGateway, command: Command) -> serde_json::Value {
        let output = execute(service, gateway, command, &JsonFormatter).unwrap();
        serde_json::from_str(&output).unwrap()
    }

    #[test]
    fn test_parse_assignments() {
        let values = parse_assignments(&[
            "city=Oslo".to_string(),
            "vat=NULL".to_string(),
            "note=a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(values["city"], Value::String("Oslo".into()));
        assert_eq!(values["vat"], Value::Null);
        assert_eq!(values["note"], Value::String("a=b".into()));

        let err = parse_assignments(&["city".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "invalid assignment 'city', expected NAME=VALUE");
        assert!(parse_assignments(&["=Oslo".to_string()]).is_err());
    }

    #[test]
    fn test_list_contacts() {
        let (service, gateway) = setup();
        let json = run(
            &service,
            &gateway,
            Command::List {
                entity: "contact".into(),
                page: Some(1),
                max: Some(2),
                props: Vec::new(),
            },
        );
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["nextPage"], 2);
        assert_eq!(json["rows"][0]["company.label"], "Acme");
        assert_eq!(json["rows"][0]["status.label"], "Customer");
    }

    #[test]
    fn test_get_and_save_company() {
        let (service, gateway) = setup();
        let json = run(
            &service,
            &gateway,
            Command::Get {
                entity: "company".into(),
                id: "1".into(),
                props: Vec::new(),
            },
        );
        assert_eq!(json["row"]["name"], "Acme");
        assert_eq!(json["row"]["country"], "Norway");
        assert_eq!(json["canEdit"], true);

        let json = run(
            &service,
            &gateway,
            Command::Save {
                entity: "company".into(),
                id: 1,
                old: vec!["city=Oslo".into()],
                new: vec!["city=Bergen".into()],
            },
        );
        assert_eq!(json["status"], "updated");
        assert_eq!(json["changed"][0], "city");
    }

    #[test]
    fn test_save_without_permission_is_refused() {
        let (service, gateway) = setup();
        let err = execute(
            &service,
            &gateway,
            Command::Save {
                entity: "company".into(),
                id: 2,
                old: vec!["city=Stockholm".into()],
                new: vec!["city=Uppsala".into()],
            },
            &JsonFormatter,
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::Engine(_)));
    }

    #[test]
    fn test_unknown_entity_message() {
        let (service, gateway) = setup();
        let err = execute(
            &service,
            &gateway,
            Command::Schema {
                entity: "invoice".into(),
            },
            &JsonFormatter,
        )
        .unwrap_err();
        assert_eq!(err.message(Verbosity::Terse), "Class invoice not found");
    }
}
