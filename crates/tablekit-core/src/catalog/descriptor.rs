//! The per-entity descriptor contract.

use super::property::PropertyDescriptor;
use super::relation::RelationSummary;
use super::schema::TableSchema;
use crate::error::{Error, Result};
use crate::mutation::validate::validate_property;
use crate::query::Criteria;
use crate::security::AccessContext;
use tablekit_proto::{FieldValues, RequestParams, Value};

/// Schema plus security policy of one entity.
///
/// Each entity is a concrete implementation registered by name in the
/// [`MetadataRegistry`](super::MetadataRegistry). The query and update
/// builders never look at the current user themselves; identity-dependent
/// decisions happen only in [`enforce_select_security`] and
/// [`can_edit_instance`].
///
/// [`enforce_select_security`]: TableDescriptor::enforce_select_security
/// [`can_edit_instance`]: TableDescriptor::can_edit_instance
pub trait TableDescriptor: Send + Sync {
    /// The entity's schema.
    fn schema(&self) -> &TableSchema;

    /// Push the row-visibility predicates for the current user.
    ///
    /// At least one predicate must be pushed, even `1=1` for unrestricted
    /// roles. A hook that pushes nothing denies every row.
    fn enforce_select_security(
        &self,
        ctx: &AccessContext<'_>,
        request: &RequestParams,
        alias: &str,
        criteria: &mut Criteria,
    ) -> Result<()>;

    /// Check whether the current user may edit instance `id`.
    fn can_edit_instance(&self, _ctx: &AccessContext<'_>, _id: i64) -> Result<()> {
        Err(Error::not_authorized())
    }

    /// Extra joins for properties that read a joined `alias.column`.
    fn joins(&self, _alias: &str) -> Vec<String> {
        Vec::new()
    }

    /// Collection relations advertised to clients.
    fn relations(&self) -> Vec<RelationSummary> {
        Vec::new()
    }

    /// Human readable entity name.
    fn display_name(&self) -> String {
        let id = &self.schema().table_id;
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Validate one changed value. Returns the rejection reason.
    fn validate_before_save(
        &self,
        _id: i64,
        _old_values: &FieldValues,
        _new_values: &FieldValues,
        property: &PropertyDescriptor,
        value: &Value,
    ) -> std::result::Result<(), String> {
        validate_property(property, value)
    }

    /// Logical entity name.
    fn table_id(&self) -> &str {
        &self.schema().table_id
    }

    /// Storage table name.
    fn db_table_name(&self) -> &str {
        &self.schema().db_table
    }
}
