//! Client-safe schema description types.
//!
//! These mirror the internal table descriptors but expose only what a
//! client needs to render and edit instances: no storage names, no
//! security policy.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Display role of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// The instance identifier.
    Id,
    /// Contributes to the instance display name.
    Label,
    /// Shown by default.
    Primary,
    /// Shown on request.
    Secondary,
}

/// Name of a projected property.
///
/// Relation properties are projected as two result columns
/// (`<prop>.id` and `<prop>.label`), so their name is composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyName {
    /// Ordinary property.
    Simple(String),
    /// Relation property.
    Composite {
        /// Property name.
        prop: String,
        /// Result column holding the related identifier.
        id: String,
        /// Result column holding the related label.
        label: String,
    },
}

impl PropertyName {
    /// Composite name for a relation property.
    pub fn composite(prop: &str) -> Self {
        PropertyName::Composite {
            prop: prop.to_string(),
            id: format!("{prop}.id"),
            label: format!("{prop}.label"),
        }
    }

    /// The underlying property name.
    pub fn prop(&self) -> &str {
        match self {
            PropertyName::Simple(name) => name,
            PropertyName::Composite { prop, .. } => prop,
        }
    }
}

/// One id/label pair of an enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Stored identifier.
    pub id: Value,
    /// Display text.
    pub label: Value,
}

/// Client-safe description of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProperty {
    /// Property name (composite for relations).
    pub name: PropertyName,
    /// Display label.
    pub label: String,
    /// Longer description.
    pub description: String,
    /// Whether the property can be edited.
    pub readonly: bool,
    /// Whether the property must hold a value.
    pub required: bool,
    /// Validation pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Maximum length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Display role.
    pub purpose: Purpose,
    /// Related entity (`<table>::<prop>` for enumerations).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_table: Option<String>,
    /// Projected metadata of the related entity (foreign keys only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_metadata: Option<Box<PublicMetadata>>,
    /// Allowed values (enumerations only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_list: Option<Vec<EnumValue>>,
}

/// A named relation from one entity to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRelation {
    /// Relation name.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Related entity name.
    pub class_name: String,
    /// Projected metadata of the related entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PublicMetadata>,
}

/// Client-safe description of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMetadata {
    /// Logical entity name.
    pub table_name: String,
    /// Human readable entity name.
    pub display_name: String,
    /// Properties in declaration order.
    pub properties: Vec<PublicProperty>,
    /// Relations to other entities.
    pub relations: Vec<PublicRelation>,
}

impl PublicMetadata {
    /// Find a property by its underlying name.
    pub fn property(&self, name: &str) -> Option<&PublicProperty> {
        self.properties.iter().find(|p| p.name.prop() == name)
    }
}
