//! Demo CRM catalog and seed data.

use tablekit_core::query::{qualified, Criteria};
use tablekit_core::{
    AccessContext, DatabaseGateway, Error, MetadataRegistry, PropertyDescriptor,
    RelationSummary, Result, SqliteGateway, TableDescriptor, TableSchema,
};
use tablekit_proto::RequestParams;

/// Tables and rows created by `tablekit init`.
pub const SEED_SQL: &str = "
CREATE TABLE IF NOT EXISTS countries (
    country_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS companies (
    company_id INTEGER PRIMARY KEY,
    company_name TEXT NOT NULL,
    city TEXT,
    vat TEXT,
    country_id INTEGER
);
CREATE TABLE IF NOT EXISTS contact_status (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS contacts (
    contact_id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    status_id INTEGER,
    company_id INTEGER,
    birthday TEXT
);
CREATE TABLE IF NOT EXISTS contact_permissions (
    contact_id INTEGER NOT NULL,
    company_id INTEGER NOT NULL,
    can_edit INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY,
    username TEXT,
    affected_table TEXT,
    affected_row INTEGER,
    action TEXT,
    logdata TEXT,
    logged_at TEXT
);

INSERT OR IGNORE INTO countries (country_id, name) VALUES (1, 'Norway'), (2, 'Sweden');
INSERT OR IGNORE INTO contact_status (id, name) VALUES (1, 'Lead'), (2, 'Customer'), (3, 'Former');
INSERT OR IGNORE INTO companies (company_id, company_name, city, vat, country_id) VALUES
    (1, 'Acme', 'Oslo', 'NO100', 1),
    (2, 'Globex', 'Stockholm', 'SE200', 2),
    (3, 'Initech', NULL, NULL, 1);
INSERT OR IGNORE INTO contacts
    (contact_id, first_name, last_name, email, phone, status_id, company_id, birthday) VALUES
    (1, 'Ada', 'Lovelace', 'ada@acme.test', '+47 555 0100', 2, 1, '1815-12-10'),
    (2, 'Alan', 'Turing', 'alan@globex.test', NULL, 1, 2, '1912-06-23'),
    (3, 'Grace', 'Hopper', NULL, NULL, 3, 3, NULL);
DELETE FROM contact_permissions WHERE contact_id = 1;
INSERT INTO contact_permissions (contact_id, company_id, can_edit) VALUES
    (1, 1, 1), (1, 2, 0), (1, 3, 1);
";

/// Create the demo tables and rows. Safe to run more than once.
pub fn seed(gateway: &SqliteGateway) -> Result<()> {
    gateway.execute_batch(SEED_SQL)?;
    tracing::info!("demo catalog seeded");
    Ok(())
}

/// Registry holding the demo entities.
pub fn registry() -> MetadataRegistry {
    MetadataRegistry::builder()
        .register("company", Company::new)
        .register("contact", Contact::new)
        .build()
}

/// Edits need the `can_edit` permission on the company.
fn require_company_edit(ctx: &AccessContext<'_>, company_id: i64) -> Result<()> {
    if ctx.company_ids_with_permission("can_edit")?.contains(&company_id) {
        Ok(())
    } else {
        Err(Error::not_authorized())
    }
}

struct Company {
    schema: TableSchema,
}

impl Company {
    fn new() -> Result<Self> {
        Ok(Self {
            schema: TableSchema::builder("company", "companies")
                .property(PropertyDescriptor::id("company_id"))
                .property(
                    PropertyDescriptor::label("name", "Name")
                        .with_column("company_name")
                        .required()
                        .with_max_length(80),
                )
                .property(PropertyDescriptor::string("city", "City").selected_by_default())
                .property(PropertyDescriptor::string("vat", "VAT number").with_pattern("[A-Z]{2}[0-9]+$"))
                .property(
                    PropertyDescriptor::string("country", "Country")
                        .with_column("ctry.name")
                        .readonly(),
                )
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
        require_company_edit(ctx, id)
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

impl Contact {
    fn new() -> Result<Self> {
        Ok(Self {
            schema: TableSchema::builder("contact", "contacts")
                .property(PropertyDescriptor::id("contact_id"))
                .property(PropertyDescriptor::label("first_name", "First name").required())
                .property(PropertyDescriptor::label("last_name", "Last name").required())
                .property(
                    PropertyDescriptor::string("email", "E-mail")
                        .with_pattern("[^@ ]+@[^@ ]+$")
                        .selected_by_default(),
                )
                .property(PropertyDescriptor::string("phone", "Phone").with_pattern(r"\+?[0-9][0-9 ]*$"))
                .property(PropertyDescriptor::date("birthday", "Birthday"))
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

    fn can_edit_instance(&self, ctx: &AccessContext<'_>, id: i64) -> Result<()> {
        let sql = format!("SELECT `company_id` FROM `contacts` WHERE `contact_id`={id}");
        let company_id = ctx
            .gateway()
            .select("contacts", &sql)?
            .first()
            .and_then(|row| row.get("company_id"))
            .and_then(|value| value.as_i64());
        match company_id {
            Some(company_id) => require_company_edit(ctx, company_id),
            None => Err(Error::not_authorized()),
        }
    }
}
