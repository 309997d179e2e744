//! tablekit command-line client
//!
//! Opens a SQLite database, registers the demo CRM catalog, and runs one
//! data-service operation per invocation.

mod commands;
mod demo;
mod formatter;

use clap::Parser;
use commands::{Command, CommandError};
use formatter::{create_formatter, OutputFormat};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tablekit_core::config::{DEFAULT_MAX_PAGE_LENGTH, DEFAULT_PAGE_LENGTH};
use tablekit_core::{
    DataService, EngineConfig, IdentityProvider, NullAuditLogger, SqliteGateway, StaticIdentity,
    Verbosity,
};

/// Default acting user: id 1, named "demo".
pub const DEFAULT_USER: &str = "1:demo";

/// Default permission cache lifetime in seconds.
pub const DEFAULT_PERMISSION_TTL_SECS: u64 = 60;

/// tablekit command-line client
#[derive(Parser, Debug)]
#[command(name = "tablekit")]
#[command(version, about = "Schema-driven data access from the command line")]
pub struct Args {
    /// SQLite database file. Without it a seeded in-memory database is used.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Acting user as <id>:<name>
    #[arg(short, long, global = true, default_value = DEFAULT_USER)]
    pub user: String,

    /// Output format
    #[arg(long, global = true, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Show storage and registry detail in error messages
    #[arg(long, global = true)]
    pub verbose_errors: bool,

    /// Rows per page when a request gives no --max
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_LENGTH)]
    pub page_length: u32,

    /// Largest page length a request may ask for
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PAGE_LENGTH)]
    pub max_page_length: u32,

    /// Permission cache lifetime in seconds. Set to 0 to cache until exit.
    #[arg(long, global = true, default_value_t = DEFAULT_PERMISSION_TTL_SECS)]
    pub permission_ttl: u64,

    /// Do not write audit records
    #[arg(long, global = true)]
    pub no_audit: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Error detail requested by `--verbose-errors`.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flag(self.verbose_errors)
    }

    /// Convert command-line arguments to engine configuration.
    pub fn into_config(self) -> EngineConfig {
        let config = EngineConfig::new()
            .with_default_page_length(self.page_length)
            .with_max_page_length(self.max_page_length);
        if self.permission_ttl == 0 {
            config.without_permission_cache_ttl()
        } else {
            config.with_permission_cache_ttl(Duration::from_secs(self.permission_ttl))
        }
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tablekit=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let formatter = create_formatter(args.format);
    let verbosity = args.verbosity();

    match run(args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e.message(verbosity)));
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<String, CommandError> {
    let identity = StaticIdentity::parse(&args.user)
        .ok_or_else(|| CommandError::User(args.user.clone()))?;
    let gateway = match &args.db {
        Some(path) => SqliteGateway::open(path)?,
        None => {
            let gateway = SqliteGateway::open_in_memory()?;
            demo::seed(&gateway)?;
            gateway
        }
    };
    let gateway = Arc::new(gateway);
    tracing::debug!(user = ?identity.current_user_id(), db = ?args.db, "starting");

    let formatter = create_formatter(args.format);
    let command = args.command.clone();
    let no_audit = args.no_audit;
    let mut service = DataService::new(
        Arc::new(demo::registry()),
        gateway.clone(),
        Arc::new(identity),
        args.into_config(),
    );
    if no_audit {
        service = service.with_audit_logger(Arc::new(NullAuditLogger));
    }

    commands::execute(&service, &gateway, command, formatter.as_ref())
}
