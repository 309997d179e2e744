//! Shared fixture: a small CRM schema on in-memory SQLite.

#![allow(dead_code)]

use std::sync::Arc;
use tablekit_core::query::{qualified, Criteria};
use tablekit_core::{
    AccessContext, DataService, DatabaseGateway, EngineConfig, MetadataRegistry,
    PropertyDescriptor, RelationSummary, Result, SqliteGateway, StaticIdentity, TableDescriptor,
    TableSchema,
};
use tablekit_core::proto::{RequestParams, Value};

const SCHEMA: &str = "
CREATE TABLE companies (
    company_id INTEGER PRIMARY KEY,
    company_name TEXT NOT NULL,
    city TEXT,
    vat TEXT
);
CREATE TABLE contact_status (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE contacts (
    contact_id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    status_id INTEGER,
    company_id INTEGER
);
CREATE TABLE activities (
    activity_id INTEGER PRIMARY KEY,
    subject TEXT NOT NULL,
    contact_id INTEGER
);
CREATE TABLE notes (
    id INTEGER PRIMARY KEY,
    note TEXT
);
CREATE TABLE contact_permissions (
    contact_id INTEGER NOT NULL,
    company_id INTEGER NOT NULL,
    can_edit INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE audit_log (
    id INTEGER PRIMARY KEY,
    username TEXT,
    affected_table TEXT,
    affected_row INTEGER,
    action TEXT,
    logdata TEXT,
    logged_at TEXT
);

INSERT INTO contact_status (id, name) VALUES (1, 'Lead'), (2, 'Customer'), (3, 'Former');

INSERT INTO companies (company_id, company_name, city, vat) VALUES
    (1, 'Acme', 'Oslo', 'NO100'),
    (2, 'Globex', 'Bergen', NULL),
    (3, 'Initech', NULL, NULL),
    (4, 'Umbrella', 'Trondheim', NULL),
    (5, 'Hooli', 'Stavanger', NULL),
    (6, 'Vandelay', 'Tromso', NULL);

INSERT INTO contacts (contact_id, first_name, last_name, email, phone, status_id, company_id) VALUES
    (1, 'Ada', 'Lovelace', 'ada@acme.test', NULL, 2, 1),
    (2, 'Alan', 'Turing', NULL, NULL, NULL, 2);

INSERT INTO activities (activity_id, subject, contact_id) VALUES (1, 'Kickoff', 1);
INSERT INTO notes (id, note) VALUES (1, 'hidden');

-- user 7 sees every company and edits the first three; user 8 sees five
INSERT INTO contact_permissions (contact_id, company_id, can_edit) VALUES
    (7, 1, 1), (7, 2, 1), (7, 3, 1), (7, 4, 0), (7, 5, 0), (7, 6, 0),
    (8, 1, 0), (8, 2, 0), (8, 3, 0), (8, 4, 0), (8, 5, 0);
";

/// Companies restricted to the user's permission rows.
pub struct Company {
    schema: TableSchema,
}

impl Company {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: TableSchema::builder("company", "companies")
                .property(PropertyDescriptor::id("company_id"))
                .property(PropertyDescriptor::label("name", "Name").with_column("company_name"))
                .property(PropertyDescriptor::string("city", "City"))
                .property(PropertyDescriptor::string("vat", "VAT").with_pattern("[A-Z]{2}[0-9]+"))
                .build()?,
        })
    }
}

impl TableDescriptor for Company {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn enforce_select_security(
        &self,
        ctx: &AccessContext<'_>,
        _request: &RequestParams,
        alias: &str,
        criteria: &mut Criteria,
    ) -> Result<()> {
        criteria.push_in(&qualified(alias, "company_id"), &ctx.visible_company_ids()?);
        Ok(())
    }

    fn can_edit_instance(&self, ctx: &AccessContext<'_>, id: i64) -> Result<()> {
        if ctx.company_ids_with_permission("can_edit")?.contains(&id) {
            Ok(())
        } else {
            Err(tablekit_core::Error::not_authorized())
        }
    }

    fn relations(&self) -> Vec<RelationSummary> {
        vec![RelationSummary::new("contacts", "Contacts", "contact")]
    }
}

pub struct Contact {
    schema: TableSchema,
}

impl Contact {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: TableSchema::builder("contact", "contacts")
                .property(PropertyDescriptor::id("contact_id"))
                .property(PropertyDescriptor::label("first_name", "First name"))
                .property(PropertyDescriptor::label("last_name", "Last name"))
                .property(
                    PropertyDescriptor::string("email", "E-mail")
                        .with_pattern("[^@ ]+@[^@ ]+")
                        .selected_by_default(),
                )
                .property(PropertyDescriptor::string("phone", "Phone").with_pattern(r"\+?[0-9][0-9 ]*$"))
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
}

impl TableDescriptor for Contact {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn enforce_select_security(
        &self,
        ctx: &AccessContext<'_>,
        _request: &RequestParams,
        alias: &str,
        criteria: &mut Criteria,
    ) -> Result<()> {
        criteria.push_in(&qualified(alias, "company_id"), &ctx.visible_company_ids()?);
        Ok(())
    }

    fn can_edit_instance(&self, ctx: &AccessContext<'_>, _id: i64) -> Result<()> {
        ctx.require_user().map(|_| ())
    }
}

pub struct Activity {
    schema: TableSchema,
}

impl Activity {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: TableSchema::builder("activity", "activities")
                .property(PropertyDescriptor::id("activity_id"))
                .property(PropertyDescriptor::label("subject", "Subject"))
                .property(
                    PropertyDescriptor::foreign_key("contact", "Contact", "contact_id", "contact")
                        .selected_by_default(),
                )
                .build()?,
        })
    }
}

impl TableDescriptor for Activity {
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
}

/// Forgets to add any security criteria.
pub struct Note {
    schema: TableSchema,
}

impl Note {
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: TableSchema::builder("note", "notes")
                .property(PropertyDescriptor::id("id"))
                .property(PropertyDescriptor::long_text("note", "Note").selected_by_default())
                .build()?,
        })
    }
}

impl TableDescriptor for Note {
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

pub fn registry() -> MetadataRegistry {
    MetadataRegistry::builder()
        .register("company", Company::new)
        .register("contact", Contact::new)
        .register("activity", Activity::new)
        .register("note", Note::new)
        .build()
}

pub struct TestContext {
    pub gateway: Arc<SqliteGateway>,
    pub service: DataService,
}

impl TestContext {
    /// Fixture acting as user 7.
    pub fn new() -> Self {
        Self::as_user(7, "alice")
    }

    pub fn as_user(id: i64, name: &str) -> Self {
        let gateway = Arc::new(SqliteGateway::open_in_memory().unwrap());
        gateway.execute_batch(SCHEMA).unwrap();
        let service = DataService::new(
            Arc::new(registry()),
            gateway.clone(),
            Arc::new(StaticIdentity::new(id, name)),
            EngineConfig::new(),
        );
        Self { gateway, service }
    }

    pub fn query(&self, sql: &str) -> Vec<tablekit_core::proto::Row> {
        self.gateway.select("test", sql).unwrap()
    }

    pub fn scalar(&self, sql: &str) -> Value {
        let rows = self.query(sql);
        let value = rows[0].iter().next().unwrap().1.clone();
        value
    }

    pub fn audit_count(&self) -> i64 {
        self.scalar("SELECT COUNT(*) FROM audit_log").as_i64().unwrap()
    }
}
