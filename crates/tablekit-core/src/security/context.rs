//! Context handed to entity security hooks.

use super::permissions::{company_ids, company_ids_granting, PermissionCache};
use crate::catalog::{MetadataRegistry, SharedDescriptor};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::gateway::DatabaseGateway;
use crate::identity::IdentityProvider;
use crate::query::quote_ident;
use std::sync::Arc;
use tablekit_proto::Row;

/// Everything a request may consult: storage, the acting user, cached
/// permissions, the registry, and configuration.
///
/// Borrowed for the duration of one request.
#[derive(Clone, Copy)]
pub struct AccessContext<'a> {
    gateway: &'a dyn DatabaseGateway,
    identity: &'a dyn IdentityProvider,
    permissions: &'a PermissionCache,
    registry: &'a MetadataRegistry,
    config: &'a EngineConfig,
}

impl<'a> AccessContext<'a> {
    /// Create a context.
    pub fn new(
        gateway: &'a dyn DatabaseGateway,
        identity: &'a dyn IdentityProvider,
        permissions: &'a PermissionCache,
        registry: &'a MetadataRegistry,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            gateway,
            identity,
            permissions,
            registry,
            config,
        }
    }

    /// The database gateway.
    pub fn gateway(&self) -> &'a dyn DatabaseGateway {
        self.gateway
    }

    /// The identity provider.
    pub fn identity(&self) -> &'a dyn IdentityProvider {
        self.identity
    }

    /// The entity registry.
    pub fn registry(&self) -> &'a MetadataRegistry {
        self.registry
    }

    /// Engine configuration.
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// Resolve an entity by name.
    pub fn resolve(&self, entity: &str) -> Result<SharedDescriptor> {
        self.registry.get_by_name(entity)
    }

    /// Identifier of the acting user.
    pub fn current_user_id(&self) -> Option<i64> {
        self.identity.current_user_id()
    }

    /// Identifier of the acting user, or `Security("Not logged in")`.
    pub fn require_user(&self) -> Result<i64> {
        self.current_user_id()
            .ok_or_else(|| Error::Security("Not logged in".to_string()))
    }

    /// The acting user's permission rows.
    pub fn permission_rows(&self) -> Result<Arc<Vec<Row>>> {
        let user_id = self.require_user()?;
        let table = &self.config.permission_table;
        self.permissions.get_or_load(user_id, || {
            let sql = format!(
                "SELECT * FROM {} WHERE {}={user_id}",
                quote_ident(table),
                quote_ident(&self.config.permission_user_column)
            );
            self.gateway.select(table, &sql)
        })
    }

    /// Companies the acting user has any permission row for.
    pub fn visible_company_ids(&self) -> Result<Vec<i64>> {
        Ok(company_ids(&self.permission_rows()?))
    }

    /// Companies for which the acting user holds `permission`.
    pub fn company_ids_with_permission(&self, permission: &str) -> Result<Vec<i64>> {
        Ok(company_ids_granting(&self.permission_rows()?, permission))
    }

    /// Escape a string for embedding between single quotes.
    pub fn escape(&self, value: &str) -> String {
        self.gateway.escape_string(value)
    }

    /// Escape and single-quote a string literal.
    pub fn quote(&self, value: &str) -> String {
        format!("'{}'", self.escape(value))
    }
}

impl std::fmt::Debug for AccessContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessContext")
            .field("user", &self.current_user_id())
            .field("registry", self.registry)
            .finish()
    }
}
