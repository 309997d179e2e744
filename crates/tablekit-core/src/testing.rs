//! Shared fixtures for unit tests.

use crate::catalog::{
    MetadataRegistry, PropertyDescriptor, RelationSummary, SharedDescriptor, TableDescriptor,
    TableSchema,
};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::gateway::{escape_sql_string, DatabaseGateway};
use crate::identity::StaticIdentity;
use crate::query::{qualified, Criteria};
use crate::security::{AccessContext, PermissionCache};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tablekit_proto::{RequestParams, Row};

/// Gateway that records statements and replays queued results.
#[derive(Default)]
pub(crate) struct StubGateway {
    results: Mutex<VecDeque<Vec<Row>>>,
    failure: Mutex<Option<String>>,
    selects: Mutex<Vec<String>>,
    updates: Mutex<Vec<(String, String)>>,
    inserts: Mutex<Vec<(String, String)>>,
    affected: Mutex<u64>,
}

impl StubGateway {
    /// Queue the rows returned by the next select.
    pub fn push_result(&self, rows: Vec<Row>) {
        self.results.lock().push_back(rows);
    }

    /// Make the next select fail with a gateway error.
    pub fn fail_next_select(&self, detail: &str) {
        *self.failure.lock() = Some(detail.to_string());
    }

    /// Affected row count reported by updates.
    pub fn set_affected(&self, affected: u64) {
        *self.affected.lock() = affected;
    }

    pub fn selects(&self) -> Vec<String> {
        self.selects.lock().clone()
    }

    pub fn updates(&self) -> Vec<(String, String)> {
        self.updates.lock().clone()
    }

    pub fn inserts(&self) -> Vec<(String, String)> {
        self.inserts.lock().clone()
    }
}

impl DatabaseGateway for StubGateway {
    fn select(&self, _table: &str, sql: &str) -> Result<Vec<Row>> {
        self.selects.lock().push(sql.to_string());
        if let Some(detail) = self.failure.lock().take() {
            return Err(Error::Gateway(detail));
        }
        Ok(self.results.lock().pop_front().unwrap_or_default())
    }

    fn update(&self, table: &str, set_where: &str) -> Result<u64> {
        self.updates
            .lock()
            .push((table.to_string(), set_where.to_string()));
        Ok(*self.affected.lock())
    }

    fn insert(&self, table: &str, columns_values: &str) -> Result<i64> {
        let mut inserts = self.inserts.lock();
        inserts.push((table.to_string(), columns_values.to_string()));
        Ok(inserts.len() as i64)
    }

    fn escape_string(&self, value: &str) -> String {
        escape_sql_string(value)
    }

    fn last_error(&self) -> Option<String> {
        None
    }
}

struct Company {
    schema: TableSchema,
}

impl TableDescriptor for Company {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn enforce_select_security(
        &self,
        _ctx: &AccessContext<'_>,
        _request: &RequestParams,
        _alias: &str,
        criteria: &mut Criteria,
    ) -> Result<()> {
        criteria.allow_all();
        Ok(())
    }

    fn can_edit_instance(&self, ctx: &AccessContext<'_>, _id: i64) -> Result<()> {
        ctx.require_user().map(|_| ())
    }

    fn joins(&self, alias: &str) -> Vec<String> {
        vec![format!(
            "LEFT OUTER JOIN `countries` `ctry` ON `ctry`.`country_id` = {}",
            qualified(alias, "country_id")
        )]
    }

    fn relations(&self) -> Vec<RelationSummary> {
        vec![RelationSummary::new("contacts", "Contacts", "contact")]
    }
}

struct Contact {
    schema: TableSchema,
}

impl TableDescriptor for Contact {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn enforce_select_security(
        &self,
        _ctx: &AccessContext<'_>,
        _request: &RequestParams,
        _alias: &str,
        criteria: &mut Criteria,
    ) -> Result<()> {
        criteria.allow_all();
        Ok(())
    }

    fn can_edit_instance(&self, ctx: &AccessContext<'_>, _id: i64) -> Result<()> {
        ctx.require_user().map(|_| ())
    }
}

/// Pushes no criteria and keeps the default edit policy.
struct Forgetful {
    schema: TableSchema,
}

impl TableDescriptor for Forgetful {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn enforce_select_security(
        &self,
        _ctx: &AccessContext<'_>,
        _request: &RequestParams,
        _alias: &str,
        _criteria: &mut Criteria,
    ) -> Result<()> {
        Ok(())
    }
}

fn company() -> Result<Company> {
    Ok(Company {
        schema: TableSchema::builder("company", "companies")
            .property(PropertyDescriptor::id("company_id"))
            .property(PropertyDescriptor::label("name", "Name").with_column("company_name"))
            .property(PropertyDescriptor::string("city", "City"))
            .property(PropertyDescriptor::string("vat", "VAT").with_pattern("[A-Z]{2}[0-9]+"))
            .property(PropertyDescriptor::string("country", "Country").with_column("ctry.name"))
            .build()?,
    })
}

fn contact() -> Result<Contact> {
    Ok(Contact {
        schema: TableSchema::builder("contact", "contacts")
            .property(PropertyDescriptor::id("contact_id"))
            .property(PropertyDescriptor::label("first_name", "First name"))
            .property(PropertyDescriptor::label("last_name", "Last name"))
            .property(
                PropertyDescriptor::string("email", "E-mail")
                    .with_pattern(".+@.+")
                    .selected_by_default(),
            )
            .property(PropertyDescriptor::string("phone", "Phone").with_pattern(r"\+?[0-9][0-9 ]*"))
            .property(
                PropertyDescriptor::enumeration(
                    "status",
                    "Status",
                    "status_id",
                    "contact_status",
                    "id",
                    "name",
                )
                .selected_by_default(),
            )
            .property(
                PropertyDescriptor::foreign_key("company", "Company", "company_id", "company")
                    .selected_by_default(),
            )
            .build()?,
    })
}

fn forgetful() -> Result<Forgetful> {
    Ok(Forgetful {
        schema: TableSchema::builder("forgetful", "forgetful")
            .property(PropertyDescriptor::id("id"))
            .property(PropertyDescriptor::string("note", "Note"))
            .build()?,
    })
}

fn orphan() -> Result<Contact> {
    Ok(Contact {
        schema: TableSchema::builder("orphan", "orphans")
            .property(PropertyDescriptor::id("orphan_id"))
            .property(PropertyDescriptor::foreign_key("owner", "Owner", "owner_id", "nobody"))
            .build()?,
    })
}

fn tag() -> Result<Contact> {
    Ok(Contact {
        schema: TableSchema::builder("tag", "tags")
            .property(PropertyDescriptor::id("tag_id"))
            .property(PropertyDescriptor::label("label", "Label"))
            .property(PropertyDescriptor::label("code", "Code").with_column("tag_code"))
            .build()?,
    })
}

fn item() -> Result<Contact> {
    Ok(Contact {
        schema: TableSchema::builder("item", "items")
            .property(PropertyDescriptor::id("item_id"))
            .property(PropertyDescriptor::foreign_key("tag", "Tag", "tag_id", "tag").selected_by_default())
            .build()?,
    })
}

/// Has no identifier property.
fn lookup() -> Result<Contact> {
    Ok(Contact {
        schema: TableSchema::builder("lookup", "lookups")
            .property(PropertyDescriptor::label("code", "Code"))
            .build()?,
    })
}

fn pointer() -> Result<Contact> {
    Ok(Contact {
        schema: TableSchema::builder("pointer", "pointers")
            .property(PropertyDescriptor::id("pointer_id"))
            .property(PropertyDescriptor::foreign_key("target", "Target", "lookup_id", "lookup"))
            .build()?,
    })
}

/// Registry with the test entities.
pub(crate) fn registry() -> MetadataRegistry {
    MetadataRegistry::builder()
        .register("company", company)
        .register("contact", contact)
        .register("forgetful", forgetful)
        .register("orphan", orphan)
        .register("tag", tag)
        .register("item", item)
        .register("lookup", lookup)
        .register("pointer", pointer)
        .build()
}

/// Everything an [`AccessContext`] borrows, owned in one place.
pub(crate) struct Fixture {
    pub gateway: StubGateway,
    pub identity: StaticIdentity,
    pub permissions: PermissionCache,
    pub registry: MetadataRegistry,
    pub config: EngineConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            gateway: StubGateway::default(),
            identity: StaticIdentity::new(7, "alice"),
            permissions: PermissionCache::default(),
            registry: registry(),
            config: EngineConfig::new(),
        }
    }

    pub fn ctx(&self) -> AccessContext<'_> {
        AccessContext::new(
            &self.gateway,
            &self.identity,
            &self.permissions,
            &self.registry,
            &self.config,
        )
    }

    pub fn descriptor(&self, name: &str) -> SharedDescriptor {
        self.registry.get_by_name(name).unwrap()
    }
}
