//! Field definitions for entities.

use super::types::FieldType;
use rkyv::{Archive, Deserialize, Serialize};

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Label shown by form generators.
    pub label: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Whether a value must be provided.
    pub required: bool,
    /// Default value if not provided.
    pub default: Option<DefaultValue>,
    /// When the field is shown in generated forms.
    pub visibility: Visibility,
    /// Restriction on referenced records (reference fields only).
    pub domain: Vec<DomainClause>,
}

/// Default value for a field.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub enum DefaultValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// String value.
    String(String),
}

/// Form visibility of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Archive, Serialize, Deserialize)]
pub enum Visibility {
    /// Always shown.
    #[default]
    Always,
    /// Hidden unless another field of the same record has the given value.
    When {
        /// Field to inspect.
        field: String,
        /// Stored value that makes this field visible.
        equals: String,
    },
}

/// Comparison in a domain clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum DomainOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
}

/// A `field operator value` restriction on referenced records.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct DomainClause {
    /// Field on the referenced entity.
    pub field: String,
    /// Comparison.
    pub operator: DomainOperator,
    /// Stored value to compare with.
    pub value: String,
}

impl DomainClause {
    /// `field = value`.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: DomainOperator::Eq,
            value: value.into(),
        }
    }

    /// `field != value`.
    pub fn not_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: DomainOperator::Ne,
            value: value.into(),
        }
    }
}

impl FieldDef {
    /// Create a new required field.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: true,
            default: None,
            visibility: Visibility::Always,
            domain: Vec::new(),
        }
    }

    /// Create an optional field (required = false).
    pub fn optional(
        name: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            required: false,
            ..Self::new(name, label, field_type)
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Only show the field when `field` holds `equals`.
    pub fn visible_when(mut self, field: impl Into<String>, equals: impl Into<String>) -> Self {
        self.visibility = Visibility::When {
            field: field.into(),
            equals: equals.into(),
        };
        self
    }

    /// Add a domain clause.
    pub fn with_domain(mut self, clause: DomainClause) -> Self {
        self.domain.push(clause);
        self
    }

    /// Check if this field has a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::ScalarType;

    #[test]
    fn test_field_def_builder() {
        let field = FieldDef::optional("unique", "Unique", FieldType::scalar(ScalarType::Bool))
            .with_default(DefaultValue::Bool(false))
            .visible_when("kind", "view");

        assert!(!field.required);
        assert!(field.has_default());
        assert_eq!(
            field.visibility,
            Visibility::When {
                field: "kind".into(),
                equals: "view".into()
            }
        );
    }

    #[test]
    fn test_domain_clauses() {
        let field = FieldDef::new(
            "category",
            "Category",
            FieldType::optional_reference("product.category"),
        )
        .with_domain(DomainClause::not_equals("kind", "view"))
        .with_domain(DomainClause::equals("accounting", "false"));

        assert_eq!(field.domain.len(), 2);
        assert_eq!(field.domain[0].operator, DomainOperator::Ne);
    }
}
