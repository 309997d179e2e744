//! Entity registry: name -> descriptor.

use super::descriptor::TableDescriptor;
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared descriptor handle.
pub type SharedDescriptor = Arc<dyn TableDescriptor>;

/// Factory producing the descriptor of one entity.
pub type DescriptorFactory = Box<dyn Fn() -> Result<SharedDescriptor> + Send + Sync>;

/// Registration table, filled once at startup.
#[derive(Default)]
pub struct RegistryBuilder {
    factories: HashMap<String, DescriptorFactory>,
}

impl RegistryBuilder {
    /// Register a descriptor factory under `name` (case-insensitive).
    pub fn register<D, F>(mut self, name: &str, factory: F) -> Self
    where
        D: TableDescriptor + 'static,
        F: Fn() -> Result<D> + Send + Sync + 'static,
    {
        let factory: DescriptorFactory =
            Box::new(move || factory().map(|d| Arc::new(d) as SharedDescriptor));
        self.factories.insert(name.to_lowercase(), factory);
        self
    }

    /// Freeze the registration table.
    pub fn build(self) -> MetadataRegistry {
        MetadataRegistry {
            factories: self.factories,
            cache: DashMap::new(),
        }
    }
}

/// Process-wide descriptor cache.
///
/// Each name is resolved once: the factory runs on the first lookup and
/// the outcome, success or failure, is cached so repeated lookups of a
/// broken or unknown entity fail fast. Descriptors are immutable, so two
/// threads racing on a first lookup produce equivalent entries and the
/// first one stored wins.
pub struct MetadataRegistry {
    factories: HashMap<String, DescriptorFactory>,
    cache: DashMap<String, Result<SharedDescriptor>>,
}

impl MetadataRegistry {
    /// Start a registration table.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a descriptor by entity name.
    pub fn get_by_name(&self, name: &str) -> Result<SharedDescriptor> {
        let name = name.to_lowercase();
        validate_name(&name)?;

        if let Some(entry) = self.cache.get(&name) {
            return entry.value().clone();
        }

        let resolved = self.resolve(&name);
        self.cache
            .entry(name)
            .or_insert(resolved)
            .value()
            .clone()
    }

    /// Registered entity names, sorted.
    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    fn resolve(&self, name: &str) -> Result<SharedDescriptor> {
        let Some(factory) = self.factories.get(name) else {
            tracing::warn!(entity = name, "unrecognized entity, caching negative result");
            return Err(Error::UnrecognizedEntity(name.to_string()));
        };

        match factory() {
            Ok(descriptor) => {
                tracing::info!(
                    entity = name,
                    table = descriptor.db_table_name(),
                    properties = descriptor.schema().properties.len(),
                    "entity descriptor loaded"
                );
                Ok(descriptor)
            }
            Err(e) => {
                tracing::warn!(entity = name, error = %e, "entity factory failed, caching negative result");
                Err(Error::InvalidHandler {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl std::fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("entities", &self.entity_names())
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Entity names are lowercase ASCII letters, digits, `_` and `-`, start
/// with a letter, and are at least two characters long.
fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = name.len() >= 2
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

    if starts_with_letter && rest_ok {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}
