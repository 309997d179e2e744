//! tablekit core - schema-driven query and update synthesis.
//!
//! Each entity declares a [`TableDescriptor`]: its properties, relations,
//! and security hooks. The engine turns a descriptor plus a client request
//! into SELECT/UPDATE text with access control, relation joins,
//! pagination, and optimistic concurrency, and hands it to a
//! [`DatabaseGateway`] for execution.
//!
//! # Example
//!
//! ```ignore
//! use tablekit_core::{DataService, EngineConfig, MetadataRegistry, SqliteGateway, StaticIdentity};
//!
//! let registry = MetadataRegistry::builder()
//!     .register("company", Company::new)
//!     .build();
//! let service = DataService::new(
//!     Arc::new(registry),
//!     Arc::new(SqliteGateway::open("crm.db")?),
//!     Arc::new(StaticIdentity::new(1, "admin")),
//!     EngineConfig::default(),
//! );
//! let page = service.list_instances("company", &RequestParams::new().with_max(10))?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod metadata;
pub mod mutation;
pub mod query;
pub mod security;
pub mod service;

#[cfg(test)]
mod testing;

pub use catalog::{
    MetadataRegistry, PropertyDescriptor, RegistryBuilder, RelationKind, RelationSummary,
    ScalarType, SharedDescriptor, TableDescriptor, TableSchema,
};
pub use config::{EngineConfig, Verbosity};
pub use error::{Error, ErrorKind, Result};
pub use gateway::DatabaseGateway;
#[cfg(feature = "sqlite")]
pub use gateway::SqliteGateway;
pub use identity::{Anonymous, IdentityProvider, StaticIdentity};
pub use metadata::MetadataProjector;
pub use mutation::{UpdateBuilder, UpdatePlan, UpdateStatement};
pub use query::{Criteria, IdFilter, Page, PropertySelection, SelectBuilder, SelectOptions};
pub use security::{
    AccessContext, AuditAction, AuditLogger, AuditRecord, GatewayAuditLogger, MemoryAuditLogger,
    NullAuditLogger, PermissionCache,
};
pub use service::{DataService, SaveOutcome};

/// Re-export protocol types.
pub use tablekit_proto as proto;
