//! Relation definitions between entities.

/// How a property relates to another table.
///
/// Related tables are referenced by name only and resolved through the
/// registry when needed, so two entities may reference each other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RelationKind {
    /// Plain column.
    #[default]
    None,
    /// Id/text lookup table rendered inline.
    Enum {
        /// Lookup table (storage name).
        table: String,
        /// Identifier column of the lookup table.
        id_column: String,
        /// Text column of the lookup table.
        text_column: String,
    },
    /// Reference to another registered entity.
    ForeignKey {
        /// Related entity name.
        entity: String,
    },
}

impl RelationKind {
    /// Check if this is any kind of relation.
    pub fn is_relation(&self) -> bool {
        !matches!(self, RelationKind::None)
    }

    /// Name of the related table or entity, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            RelationKind::None => None,
            RelationKind::Enum { table, .. } => Some(table),
            RelationKind::ForeignKey { entity } => Some(entity),
        }
    }
}

/// A named collection relation advertised by an entity (e.g. a company's
/// contacts). Used only for client metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSummary {
    /// Relation name.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Related entity name.
    pub entity: String,
}

impl RelationSummary {
    /// Create a relation summary.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            entity: entity.into(),
        }
    }
}
