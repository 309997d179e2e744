//! Client-safe schema projection.

use crate::catalog::{PropertyDescriptor, RelationKind, TableDescriptor};
use crate::error::Result;
use crate::query::{enum_values_statement, Page};
use crate::security::AccessContext;
use tablekit_proto::{
    EnumValue, PropertyName, PublicMetadata, PublicProperty, PublicRelation, Purpose, Value,
};

/// Projects table descriptors into [`PublicMetadata`].
///
/// Related entities are projected one level deep: their own relations are
/// never expanded, so cyclic references terminate.
pub struct MetadataProjector<'a> {
    ctx: &'a AccessContext<'a>,
}

impl<'a> MetadataProjector<'a> {
    /// Create a projector.
    pub fn new(ctx: &'a AccessContext<'a>) -> Self {
        Self { ctx }
    }

    /// Project `table`. With `include_relations`, foreign keys and relations
    /// carry the related entity's metadata.
    pub fn project(&self, table: &dyn TableDescriptor, include_relations: bool) -> Result<PublicMetadata> {
        let schema = table.schema();
        let mut properties = Vec::with_capacity(schema.properties.len());
        for prop in &schema.properties {
            properties.push(self.project_property(table, prop, include_relations)?);
        }

        let relations = table
            .relations()
            .into_iter()
            .map(|relation| {
                let metadata = if include_relations {
                    self.related(table, &relation.name, &relation.entity)
                } else {
                    None
                };
                PublicRelation {
                    name: relation.name,
                    label: relation.label,
                    class_name: relation.entity,
                    metadata,
                }
            })
            .collect();

        Ok(PublicMetadata {
            table_name: schema.table_id.clone(),
            display_name: table.display_name(),
            properties,
            relations,
        })
    }

    /// Id/label pairs of an enumeration property, ordered by id.
    ///
    /// Returns an empty list for properties that are not enumerations.
    pub fn enum_values(&self, prop: &PropertyDescriptor) -> Result<Vec<EnumValue>> {
        self.enum_page(prop, None)
    }

    /// One page of an enumeration's values, with one look-ahead row.
    pub fn enum_page(&self, prop: &PropertyDescriptor, page: Option<Page>) -> Result<Vec<EnumValue>> {
        let RelationKind::Enum {
            table,
            id_column,
            text_column,
        } = &prop.relation
        else {
            return Ok(Vec::new());
        };

        let sql = enum_values_statement(table, id_column, text_column, page);
        let rows = self.ctx.gateway().select(table, &sql)?;
        Ok(rows
            .into_iter()
            .map(|row| EnumValue {
                id: row.get("id").cloned().unwrap_or(Value::Null),
                label: row.get("label").cloned().unwrap_or(Value::Null),
            })
            .collect())
    }

    fn project_property(
        &self,
        table: &dyn TableDescriptor,
        prop: &PropertyDescriptor,
        include_relations: bool,
    ) -> Result<PublicProperty> {
        let mut public = PublicProperty {
            name: if prop.relation.is_relation() {
                PropertyName::composite(&prop.name)
            } else {
                PropertyName::Simple(prop.name.clone())
            },
            label: prop.label.clone(),
            description: prop.description.clone(),
            readonly: prop.is_readonly(),
            required: prop.is_required(),
            pattern: prop.pattern.clone(),
            length: prop.max_length,
            purpose: purpose_of(prop),
            related_table: None,
            related_metadata: None,
            value_list: None,
        };

        match &prop.relation {
            RelationKind::Enum { .. } => {
                public.related_table = Some(format!("{}::{}", table.table_id(), prop.name));
                public.value_list = match self.enum_values(prop) {
                    Ok(values) => Some(values),
                    Err(e) => {
                        tracing::warn!(
                            entity = %table.table_id(),
                            property = %prop.name,
                            error = %e,
                            "enumeration values unavailable"
                        );
                        None
                    }
                };
            }
            RelationKind::ForeignKey { entity } => {
                public.related_table = Some(entity.clone());
                if include_relations {
                    public.related_metadata =
                        self.related(table, &prop.name, entity).map(Box::new);
                }
            }
            RelationKind::None => {}
        }
        Ok(public)
    }

    fn related(&self, table: &dyn TableDescriptor, via: &str, entity: &str) -> Option<PublicMetadata> {
        let projected = self
            .ctx
            .resolve(entity)
            .and_then(|target| self.project(target.as_ref(), false));
        match projected {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!(
                    entity = %table.table_id(),
                    relation = via,
                    target = entity,
                    error = %e,
                    "related metadata unavailable"
                );
                None
            }
        }
    }
}

/// Display role: explicit override, then id, label, default-selected, and
/// secondary for everything else.
pub fn purpose_of(prop: &PropertyDescriptor) -> Purpose {
    if let Some(purpose) = prop.purpose {
        purpose
    } else if prop.is_id() {
        Purpose::Id
    } else if prop.is_label() {
        Purpose::Label
    } else if prop.is_default() {
        Purpose::Primary
    } else {
        Purpose::Secondary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use tablekit_proto::Row;

    #[test]
    fn test_purpose_priority() {
        let id = PropertyDescriptor::id("company_id");
        assert_eq!(purpose_of(&id), Purpose::Id);
        let name = PropertyDescriptor::label("name", "Name");
        assert_eq!(purpose_of(&name), Purpose::Label);
        let city = PropertyDescriptor::string("city", "City").selected_by_default();
        assert_eq!(purpose_of(&city), Purpose::Primary);
        let vat = PropertyDescriptor::string("vat", "VAT");
        assert_eq!(purpose_of(&vat), Purpose::Secondary);
        let name = PropertyDescriptor::label("name", "Name").with_purpose(Purpose::Secondary);
        assert_eq!(purpose_of(&name), Purpose::Secondary);
    }

    #[test]
    fn test_project_contact_with_relations() {
        let fixture = Fixture::new();
        fixture.gateway.push_result(vec![
            Row::new().with("id", 1).with("label", "Lead"),
            Row::new().with("id", 2).with("label", "Customer"),
        ]);
        let ctx = fixture.ctx();
        let contact = fixture.descriptor("contact");
        let metadata = MetadataProjector::new(&ctx)
            .project(contact.as_ref(), true)
            .unwrap();

        assert_eq!(metadata.table_name, "contact");
        assert_eq!(metadata.display_name, "Contact");

        let status = metadata.property("status").unwrap();
        assert_eq!(status.name, PropertyName::composite("status"));
        assert_eq!(status.related_table.as_deref(), Some("contact::status"));
        let values = status.value_list.as_ref().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].label, Value::String("Customer".into()));

        let company = metadata.property("company").unwrap();
        assert_eq!(company.related_table.as_deref(), Some("company"));
        let related = company.related_metadata.as_ref().unwrap();
        assert_eq!(related.table_name, "company");
        assert!(related.relations.iter().all(|r| r.metadata.is_none()));

        let email = metadata.property("email").unwrap();
        assert_eq!(email.pattern.as_deref(), Some(".+@.+"));
        assert_eq!(email.purpose, Purpose::Primary);
    }

    #[test]
    fn test_project_without_relations() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let company = fixture.descriptor("company");
        let metadata = MetadataProjector::new(&ctx)
            .project(company.as_ref(), false)
            .unwrap();

        assert_eq!(metadata.relations.len(), 1);
        assert_eq!(metadata.relations[0].class_name, "contact");
        assert!(metadata.relations[0].metadata.is_none());
        assert!(metadata.property("id").unwrap().readonly);
        assert_eq!(metadata.property("id").unwrap().purpose, Purpose::Id);
    }

    #[test]
    fn test_broken_relation_is_omitted() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx();
        let orphan = fixture.descriptor("orphan");
        let metadata = MetadataProjector::new(&ctx)
            .project(orphan.as_ref(), true)
            .unwrap();

        let owner = metadata.property("owner").unwrap();
        assert_eq!(owner.related_table.as_deref(), Some("nobody"));
        assert!(owner.related_metadata.is_none());
    }

    #[test]
    fn test_failed_value_list_is_omitted() {
        let fixture = Fixture::new();
        fixture.gateway.fail_next_select("no such table: contact_status");
        let ctx = fixture.ctx();
        let contact = fixture.descriptor("contact");
        let metadata = MetadataProjector::new(&ctx)
            .project(contact.as_ref(), false)
            .unwrap();

        let status = metadata.property("status").unwrap();
        assert_eq!(status.related_table.as_deref(), Some("contact::status"));
        assert!(status.value_list.is_none());
        assert_eq!(metadata.property("email").unwrap().purpose, Purpose::Primary);
    }
}
