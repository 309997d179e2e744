//! Schema catalog for tablekit.
//!
//! The catalog holds the per-entity descriptors the builders work from:
//! properties, relations, and the registry resolving entity names.

mod descriptor;
mod property;
mod registry;
mod relation;
mod schema;
mod types;

pub use descriptor::TableDescriptor;
pub use property::{PropertyDescriptor, PropertyFlags, ID_PROPERTY};
pub use registry::{DescriptorFactory, MetadataRegistry, RegistryBuilder, SharedDescriptor};
pub use relation::{RelationKind, RelationSummary};
pub use schema::{TableSchema, TableSchemaBuilder};
pub use types::ScalarType;
