//! Property descriptors.

use super::relation::RelationKind;
use super::types::ScalarType;
use regex::Regex;
use tablekit_proto::Purpose;

/// Name every table uses for its identifier property.
pub const ID_PROPERTY: &str = "id";

/// Boolean traits of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyFlags {
    /// Selected when the client names no properties.
    pub default: bool,
    /// Contributes to the entity's display name.
    pub label: bool,
    /// Must hold a value.
    pub required: bool,
    /// Cannot be changed through an update.
    pub readonly: bool,
}

/// Immutable description of one entity field.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Client-facing name, unique within the table.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Longer description.
    pub description: String,
    /// Storage column, or a qualified `alias.column` override.
    pub db_column: String,
    /// Scalar type.
    pub scalar: ScalarType,
    /// Boolean traits.
    pub flags: PropertyFlags,
    /// Validation pattern, matched against the start of a new value.
    pub pattern: Option<String>,
    /// Maximum length in characters.
    pub max_length: Option<u32>,
    /// Explicit display role.
    pub purpose: Option<Purpose>,
    /// Relation to another table.
    pub relation: RelationKind,
    /// Compiled `pattern`, filled in when the owning schema is built.
    pub(crate) compiled_pattern: Option<Regex>,
}

impl PropertyDescriptor {
    /// Create a property stored in the column of the same name.
    pub fn new(name: impl Into<String>, label: impl Into<String>, scalar: ScalarType) -> Self {
        let name = name.into();
        Self {
            label: label.into(),
            description: name.clone(),
            db_column: name.clone(),
            name,
            scalar,
            flags: PropertyFlags::default(),
            pattern: None,
            max_length: None,
            purpose: None,
            relation: RelationKind::None,
            compiled_pattern: None,
        }
    }

    /// The identifier property, stored in `column`.
    pub fn id(column: impl Into<String>) -> Self {
        Self::new(ID_PROPERTY, "Id", ScalarType::Integer)
            .with_column(column)
            .with_description("Instance ID")
            .selected_by_default()
            .readonly()
    }

    /// A required label string (part of the display name).
    pub fn label(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ScalarType::String)
            .with_description("Instance name")
            .with_max_length(255)
            .selected_by_default()
            .required()
            .label_field()
    }

    /// A short string.
    pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ScalarType::String).with_max_length(255)
    }

    /// An unbounded text.
    pub fn long_text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ScalarType::String)
    }

    /// A 32-bit integer.
    pub fn integer(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ScalarType::Integer)
    }

    /// A 64-bit integer.
    pub fn bigint(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ScalarType::Bigint)
    }

    /// A price or other decimal amount.
    pub fn price(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ScalarType::Double)
    }

    /// A date.
    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ScalarType::Date)
    }

    /// A foreign key to another registered entity.
    pub fn foreign_key(
        name: impl Into<String>,
        label: impl Into<String>,
        column: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        let mut prop = Self::new(name, label, ScalarType::Integer).with_column(column);
        prop.relation = RelationKind::ForeignKey {
            entity: entity.into(),
        };
        prop
    }

    /// A foreign key to an id/text lookup table.
    pub fn enumeration(
        name: impl Into<String>,
        label: impl Into<String>,
        column: impl Into<String>,
        table: impl Into<String>,
        id_column: impl Into<String>,
        text_column: impl Into<String>,
    ) -> Self {
        let mut prop = Self::new(name, label, ScalarType::Integer).with_column(column);
        prop.relation = RelationKind::Enum {
            table: table.into(),
            id_column: id_column.into(),
            text_column: text_column.into(),
        };
        prop
    }

    /// Set the storage column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.db_column = column.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Select when the client names no properties.
    pub fn selected_by_default(mut self) -> Self {
        self.flags.default = true;
        self
    }

    /// Set whether the property is selected by default.
    pub fn with_default(mut self, default: bool) -> Self {
        self.flags.default = default;
        self
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.flags.required = true;
        self
    }

    /// Mark as read-only.
    pub fn readonly(mut self) -> Self {
        self.flags.readonly = true;
        self
    }

    /// Mark as part of the display name.
    pub fn label_field(mut self) -> Self {
        self.flags.label = true;
        self
    }

    /// Set the validation pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self.compiled_pattern = None;
        self
    }

    /// Set the maximum length.
    pub fn with_max_length(mut self, length: u32) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Override the display role.
    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    /// Check if this is the identifier property.
    pub fn is_id(&self) -> bool {
        self.name == ID_PROPERTY
    }

    /// Check if selected by default.
    pub fn is_default(&self) -> bool {
        self.flags.default
    }

    /// Check if part of the display name.
    pub fn is_label(&self) -> bool {
        self.flags.label
    }

    /// Check if required.
    pub fn is_required(&self) -> bool {
        self.flags.required
    }

    /// Check if read-only.
    pub fn is_readonly(&self) -> bool {
        self.flags.readonly
    }

    /// Check if this is an enumeration.
    pub fn is_enum(&self) -> bool {
        matches!(self.relation, RelationKind::Enum { .. })
    }

    /// Check if this is a foreign key to an entity.
    pub fn is_foreign_key(&self) -> bool {
        matches!(self.relation, RelationKind::ForeignKey { .. })
    }

    /// Split a qualified `alias.column` override.
    ///
    /// The alias must be lowercase letters and underscores and the column
    /// may not contain backticks; anything else is treated as a plain
    /// column name.
    pub fn column_override(&self) -> Option<(&str, &str)> {
        let (alias, column) = self.db_column.split_once('.')?;
        let alias_ok = !alias.is_empty()
            && alias.chars().all(|c| c.is_ascii_lowercase() || c == '_');
        let column_ok = !column.is_empty() && !column.contains('`');
        (alias_ok && column_ok).then_some((alias, column))
    }

    /// The compiled validation pattern.
    pub(crate) fn compiled_pattern(&self) -> Option<&Regex> {
        self.compiled_pattern.as_ref()
    }

    /// Compile `pattern`, anchored at the start of the value.
    pub(crate) fn compile_pattern(&mut self) -> Result<(), regex::Error> {
        self.compiled_pattern = match &self.pattern {
            Some(pattern) => Some(Regex::new(&format!("^(?:{pattern})"))?),
            None => None,
        };
        Ok(())
    }
}
