//! SELECT statement synthesis.

use super::criteria::{qualified, quote_ident, Criteria, IdFilter};
use crate::catalog::{PropertyDescriptor, RelationKind, TableDescriptor};
use crate::error::{Error, Result};
use crate::security::AccessContext;
use tablekit_proto::RequestParams;

/// Which properties a select projects.
///
/// Default-selected properties are always projected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertySelection<'a> {
    /// Every property.
    All,
    /// Default-selected properties only.
    #[default]
    Defaults,
    /// Default-selected properties plus the named ones.
    Named(&'a [String]),
}

impl PropertySelection<'_> {
    /// Check if `prop` is projected.
    pub fn includes(&self, prop: &PropertyDescriptor) -> bool {
        match self {
            PropertySelection::All => true,
            PropertySelection::Defaults => prop.is_default(),
            PropertySelection::Named(names) => {
                prop.is_default() || names.iter().any(|n| *n == prop.name)
            }
        }
    }
}

/// A 1-based page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page number; 0 disables paging.
    pub number: u32,
    /// Rows per page.
    pub length: u32,
}

impl Page {
    /// Create a page.
    pub fn new(number: u32, length: u32) -> Self {
        Self { number, length }
    }

    /// Row offset of the first row.
    pub fn offset(&self) -> u64 {
        u64::from(self.number.saturating_sub(1)) * u64::from(self.length)
    }

    /// Rows fetched: one more than the page holds, to detect a next page.
    pub fn fetch_count(&self) -> u64 {
        u64::from(self.length) + 1
    }

    fn limit_clause(&self) -> Option<String> {
        (self.number > 0).then(|| format!(" LIMIT {}, {}", self.offset(), self.fetch_count()))
    }
}

/// Options of [`SelectBuilder::create_select_statement`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectOptions<'a> {
    /// Identifier restriction.
    pub id: IdFilter<'a>,
    /// Projected properties.
    pub selection: PropertySelection<'a>,
    /// Paging; `None` returns every matching row.
    pub page: Option<Page>,
}

impl<'a> SelectOptions<'a> {
    /// Default options: every row, default properties, no paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict by identifier.
    pub fn with_id(mut self, id: IdFilter<'a>) -> Self {
        self.id = id;
        self
    }

    /// Choose the projected properties.
    pub fn with_selection(mut self, selection: PropertySelection<'a>) -> Self {
        self.selection = selection;
        self
    }

    /// Fetch one page.
    pub fn with_page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }
}

/// Builds SELECT statements for one table.
///
/// The builder never inspects the current user. Row visibility comes only
/// from the table's `enforce_select_security` hook, and a hook that adds no
/// predicate turns the whole WHERE clause into `1=0`.
pub struct SelectBuilder<'a> {
    ctx: &'a AccessContext<'a>,
    table: &'a dyn TableDescriptor,
}

impl<'a> SelectBuilder<'a> {
    /// Create a builder for `table`.
    pub fn new(ctx: &'a AccessContext<'a>, table: &'a dyn TableDescriptor) -> Self {
        Self { ctx, table }
    }

    /// Synthesize the SELECT statement.
    pub fn create_select_statement(
        &self,
        request: &RequestParams,
        options: &SelectOptions<'_>,
    ) -> Result<String> {
        let schema = self.table.schema();
        let alias = schema.table_id.as_str();

        let mut columns = Vec::new();
        let mut joins = Vec::new();
        for prop in &schema.properties {
            if !options.selection.includes(prop) {
                continue;
            }
            self.project(prop, alias, &mut columns, &mut joins)?;
        }
        if columns.is_empty() {
            return Err(Error::Schema(format!(
                "no properties selected from {}",
                schema.table_id
            )));
        }
        joins.extend(self.table.joins(alias));

        let mut criteria = Criteria::new();
        if let Some(column) = self.id_column_for(&options.id)? {
            if let Some(predicate) = options.id.predicate(&qualified(alias, column)) {
                criteria.push(predicate);
            }
        }

        let before = criteria.len();
        self.table
            .enforce_select_security(self.ctx, request, alias, &mut criteria)?;
        if criteria.len() == before {
            tracing::warn!(
                entity = %schema.table_id,
                "security hook added no criteria, denying all rows"
            );
            criteria = Criteria::new();
        }

        let mut sql = format!(
            "SELECT {}\n  FROM {} {}",
            columns.join(",\n       "),
            quote_ident(&schema.db_table),
            quote_ident(alias)
        );
        for join in &joins {
            sql.push_str("\n  ");
            sql.push_str(join);
        }
        sql.push_str("\n WHERE\n  ");
        sql.push_str(&criteria.to_where_clause());
        if let Some(limit) = options.page.and_then(|p| p.limit_clause()) {
            if let Some(id_column) = schema.id_column() {
                sql.push_str("\n ORDER BY ");
                sql.push_str(&qualified(alias, id_column));
            }
            sql.push('\n');
            sql.push_str(&limit);
        }

        tracing::debug!(entity = %schema.table_id, sql = %sql, "select statement");
        Ok(sql)
    }

    fn id_column_for(&self, filter: &IdFilter<'_>) -> Result<Option<&'a str>> {
        if matches!(filter, IdFilter::All) {
            return Ok(None);
        }
        let schema = self.table.schema();
        schema
            .id_column()
            .map(Some)
            .ok_or_else(|| Error::Schema(format!("{} has no identifier column", schema.table_id)))
    }

    fn project(
        &self,
        prop: &PropertyDescriptor,
        alias: &str,
        columns: &mut Vec<String>,
        joins: &mut Vec<String>,
    ) -> Result<()> {
        match &prop.relation {
            RelationKind::Enum {
                table,
                id_column,
                text_column,
            } => {
                let related = format!("{}_{}", prop.name, table);
                joins.push(left_join(table, &related, id_column, alias, &prop.db_column));
                columns.push(project_as(
                    &qualified(&related, id_column),
                    &format!("{}.id", prop.name),
                ));
                columns.push(project_as(
                    &qualified(&related, text_column),
                    &format!("{}.label", prop.name),
                ));
            }
            RelationKind::ForeignKey { entity } => {
                let target = self.ctx.registry().get_by_name(entity).map_err(|e| {
                    Error::Schema(format!(
                        "related entity '{entity}' of {}.{} is unavailable: {e}",
                        self.table.table_id(),
                        prop.name
                    ))
                })?;
                let target_schema = target.schema();
                let target_id = target_schema.id_column().ok_or_else(|| {
                    Error::Schema(format!(
                        "related entity '{entity}' has no identifier column"
                    ))
                })?;

                let related = format!("{}_{}", prop.name, target_schema.table_id);
                joins.push(left_join(
                    &target_schema.db_table,
                    &related,
                    target_id,
                    alias,
                    &prop.db_column,
                ));
                columns.push(project_as(
                    &qualified(&related, target_id),
                    &format!("{}.id", prop.name),
                ));

                // Joined-column overrides of the related table are not reachable
                // from this statement's joins.
                let labels = target_schema.label_fields();
                for (name, column) in &labels {
                    columns.push(project_as(
                        &qualified(&related, column),
                        &format!("{}.{}", prop.name, name),
                    ));
                }
                if !labels.iter().any(|(name, _)| *name == "label") {
                    let label = if labels.is_empty() {
                        "NULL".to_string()
                    } else {
                        let parts: Vec<String> = labels
                            .iter()
                            .map(|(_, column)| qualified(&related, column))
                            .collect();
                        format!(
                            "CONCAT_WS({}, {})",
                            self.ctx.quote(&self.ctx.config().label_separator),
                            parts.join(", ")
                        )
                    };
                    columns.push(project_as(&label, &format!("{}.label", prop.name)));
                }
            }
            RelationKind::None => match prop.column_override() {
                Some((join_alias, column)) => {
                    columns.push(project_as(&qualified(join_alias, column), &prop.name));
                }
                None => {
                    columns.push(project_as(&qualified(alias, &prop.db_column), &prop.name));
                }
            },
        }
        Ok(())
    }
}

/// `SELECT id, text` of an enumeration table, ordered by id.
pub fn enum_values_statement(
    table: &str,
    id_column: &str,
    text_column: &str,
    page: Option<Page>,
) -> String {
    let mut sql = format!(
        "SELECT {} AS `id`, {} AS `label`\n  FROM {}\n ORDER BY {}",
        quote_ident(id_column),
        quote_ident(text_column),
        quote_ident(table),
        quote_ident(id_column)
    );
    if let Some(limit) = page.and_then(|p| p.limit_clause()) {
        sql.push('\n');
        sql.push_str(&limit);
    }
    sql
}

fn project_as(expr: &str, name: &str) -> String {
    format!("{expr} AS {}", quote_ident(name))
}

fn left_join(table: &str, alias: &str, key: &str, owner: &str, fk_column: &str) -> String {
    format!(
        "LEFT OUTER JOIN {} {} ON {} = {}",
        quote_ident(table),
        quote_ident(alias),
        qualified(alias, key),
        qualified(owner, fk_column)
    )
}
