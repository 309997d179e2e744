//! The caller-facing operations: list, get, metadata, save.

use crate::catalog::{MetadataRegistry, SharedDescriptor};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::gateway::DatabaseGateway;
use crate::identity::IdentityProvider;
use crate::metadata::MetadataProjector;
use crate::mutation::{UpdateBuilder, UpdatePlan};
use crate::query::{IdFilter, Page, PropertySelection, SelectBuilder, SelectOptions};
use crate::security::{AccessContext, AuditLogger, AuditRecord, GatewayAuditLogger, PermissionCache};
use std::sync::Arc;
use tablekit_proto::{
    FieldValues, InstanceList, InstanceView, PublicMetadata, RequestParams, Row, Value,
};

/// Separator between an entity and one of its enumeration properties in a
/// list request (`contact::status`).
pub const ENUM_SEPARATOR: &str = "::";

/// Result of [`DataService::save_instance`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The new values equal the old ones; nothing was written.
    Unchanged,
    /// The row was updated and audited.
    Updated {
        /// The audit record written for the change.
        audit: AuditRecord,
        /// Changed property names.
        changed: Vec<String>,
    },
}

/// Engine entry point shared by all requests.
pub struct DataService {
    registry: Arc<MetadataRegistry>,
    gateway: Arc<dyn DatabaseGateway>,
    identity: Arc<dyn IdentityProvider>,
    audit: Arc<dyn AuditLogger>,
    permissions: PermissionCache,
    config: EngineConfig,
}

impl DataService {
    /// Create a service that audits into the configured audit table.
    pub fn new(
        registry: Arc<MetadataRegistry>,
        gateway: Arc<dyn DatabaseGateway>,
        identity: Arc<dyn IdentityProvider>,
        config: EngineConfig,
    ) -> Self {
        let audit = Arc::new(GatewayAuditLogger::new(
            gateway.clone(),
            config.audit_table.clone(),
        ));
        Self {
            registry,
            gateway,
            identity,
            audit,
            permissions: PermissionCache::new(config.permission_cache_ttl),
            config,
        }
    }

    /// Replace the audit logger.
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The entity registry.
    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    /// The permission cache.
    pub fn permissions(&self) -> &PermissionCache {
        &self.permissions
    }

    /// Request context handed to builders and hooks.
    pub fn context(&self) -> AccessContext<'_> {
        AccessContext::new(
            self.gateway.as_ref(),
            self.identity.as_ref(),
            &self.permissions,
            &self.registry,
            &self.config,
        )
    }

    /// List one page of instances.
    ///
    /// `entity::property` lists the values of an enumeration property.
    pub fn list_instances(&self, entity: &str, request: &RequestParams) -> Result<InstanceList> {
        let page = Page::new(
            request.page.unwrap_or(1).max(1),
            self.config.page_length(request.max),
        );
        if let Some((entity, property)) = entity.split_once(ENUM_SEPARATOR) {
            return self.list_enum(entity, property, page);
        }

        let ctx = self.context();
        let table = self.registry.get_by_name(entity)?;
        let selection = match request.property_names() {
            Some(names) => PropertySelection::Named(names),
            None => PropertySelection::Defaults,
        };
        let options = SelectOptions::new()
            .with_selection(selection)
            .with_page(page);
        let sql = SelectBuilder::new(&ctx, table.as_ref()).create_select_statement(request, &options)?;
        let rows = self.gateway.select(table.db_table_name(), &sql)?;
        let (rows, next_page) = split_page(rows, page);

        let metadata = MetadataProjector::new(&ctx).project(table.as_ref(), false)?;
        Ok(InstanceList {
            rows,
            next_page,
            metadata: Some(metadata),
        })
    }

    /// Fetch one instance by identifier.
    ///
    /// Without `props` every property is returned. `can_edit` is evaluated
    /// only when the row exists.
    pub fn get_instance(&self, entity: &str, id: &str, request: &RequestParams) -> Result<InstanceView> {
        let ctx = self.context();
        let table = self.registry.get_by_name(entity)?;
        let id_value = Value::String(id.to_string());
        let selection = match request.property_names() {
            Some(names) => PropertySelection::Named(names),
            None => PropertySelection::All,
        };
        let options = SelectOptions::new()
            .with_id(IdFilter::One(&id_value))
            .with_selection(selection);
        let sql = SelectBuilder::new(&ctx, table.as_ref()).create_select_statement(request, &options)?;
        let row = self
            .gateway
            .select(table.db_table_name(), &sql)?
            .into_iter()
            .next();

        let can_edit = match &row {
            Some(row) => self.can_edit(&ctx, &table, row, id),
            None => false,
        };
        let metadata = MetadataProjector::new(&ctx).project(table.as_ref(), true)?;
        Ok(InstanceView {
            row,
            metadata,
            can_edit,
        })
    }

    /// Client-safe schema of an entity, related entities included.
    pub fn get_public_metadata(&self, entity: &str) -> Result<PublicMetadata> {
        let ctx = self.context();
        let table = self.registry.get_by_name(entity)?;
        MetadataProjector::new(&ctx).project(table.as_ref(), true)
    }

    /// Apply a client edit of instance `id`.
    ///
    /// `old` holds the values the client read, `new` the values it wants.
    /// An update matching no row means the instance changed in between and
    /// is reported as [`Error::ConcurrencyConflict`].
    pub fn save_instance(
        &self,
        entity: &str,
        id: i64,
        old: &FieldValues,
        new: &FieldValues,
    ) -> Result<SaveOutcome> {
        let ctx = self.context();
        let table = self.registry.get_by_name(entity)?;
        let statement = match UpdateBuilder::new(&ctx, table.as_ref()).create_update_statement(id, old, new)? {
            UpdatePlan::Unchanged => return Ok(SaveOutcome::Unchanged),
            UpdatePlan::Statement(statement) => statement,
        };

        let affected = self
            .gateway
            .update(table.db_table_name(), &statement.to_sql())?;
        if affected == 0 {
            tracing::warn!(entity = %table.table_id(), id, "update matched no row, instance modified concurrently");
            return Err(Error::ConcurrencyConflict {
                entity: table.table_id().to_string(),
                id,
            });
        }

        let user = self
            .identity
            .current_user_name()
            .unwrap_or_else(|| "anonymous".to_string());
        let record = AuditRecord::update(user, table.db_table_name(), id, &statement.audit);
        if let Err(e) = self.audit.log(&record) {
            tracing::warn!(entity = %table.table_id(), id, error = %e, "failed to write audit record");
        }
        tracing::info!(entity = %table.table_id(), id, changed = ?statement.changed, "instance updated");

        Ok(SaveOutcome::Updated {
            audit: record,
            changed: statement.changed,
        })
    }

    fn list_enum(&self, entity: &str, property: &str, page: Page) -> Result<InstanceList> {
        let ctx = self.context();
        let table = self.registry.get_by_name(entity)?;
        let prop = table
            .schema()
            .property(property)
            .filter(|p| p.is_enum())
            .ok_or_else(|| {
                Error::Schema(format!("{entity}{ENUM_SEPARATOR}{property} is not an enumeration"))
            })?;

        let rows = MetadataProjector::new(&ctx)
            .enum_page(prop, Some(page))?
            .into_iter()
            .map(|value| Row::new().with("id", value.id).with("label", value.label))
            .collect();
        let (rows, next_page) = split_page(rows, page);
        Ok(InstanceList {
            rows,
            next_page,
            metadata: None,
        })
    }

    fn can_edit(&self, ctx: &AccessContext<'_>, table: &SharedDescriptor, row: &Row, id: &str) -> bool {
        let id = row
            .get("id")
            .and_then(Value::as_i64)
            .or_else(|| id.trim().parse().ok());
        match id {
            Some(id) => table.can_edit_instance(ctx, id).is_ok(),
            None => false,
        }
    }
}

impl std::fmt::Debug for DataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataService")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

/// Strip the look-ahead row and compute the next page number.
fn split_page(mut rows: Vec<Row>, page: Page) -> (Vec<Row>, Option<u32>) {
    let length = page.length as usize;
    if rows.len() > length {
        rows.truncate(length);
        (rows, Some(page.number + 1))
    } else {
        (rows, None)
    }
}
