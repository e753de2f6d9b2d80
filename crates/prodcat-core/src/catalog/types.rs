//! Core type definitions for the catalog.

use rkyv::{Archive, Deserialize, Serialize};

/// Scalar data types a field can hold.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// UTF-8 string.
    String,
}

/// Field types.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// An optional scalar value (nullable).
    OptionalScalar(ScalarType),
    /// A fixed set of (stored value, label) choices.
    Selection {
        /// Name of the selection.
        name: String,
        /// Allowed (value, label) pairs.
        choices: Vec<(String, String)>,
    },
    /// A single reference to another entity.
    Reference {
        /// Referenced entity.
        entity: String,
    },
    /// An optional single reference to another entity.
    OptionalReference {
        /// Referenced entity.
        entity: String,
    },
    /// A set of references through a relation.
    ReferenceSet {
        /// Relation name.
        relation: String,
    },
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarType::Int32 | ScalarType::Int64)
    }
}

impl FieldType {
    /// Create a scalar field type.
    pub fn scalar(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }

    /// Create an optional scalar field type.
    pub fn optional_scalar(scalar: ScalarType) -> Self {
        FieldType::OptionalScalar(scalar)
    }

    /// Create a selection field type.
    pub fn selection<'a>(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        FieldType::Selection {
            name: name.into(),
            choices: choices
                .into_iter()
                .map(|(value, label)| (value.to_string(), label.to_string()))
                .collect(),
        }
    }

    /// Create an optional reference field type.
    pub fn optional_reference(entity: impl Into<String>) -> Self {
        FieldType::OptionalReference {
            entity: entity.into(),
        }
    }

    /// Create a reference set field type.
    pub fn reference_set(relation: impl Into<String>) -> Self {
        FieldType::ReferenceSet {
            relation: relation.into(),
        }
    }

    /// Check if this type is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            FieldType::OptionalScalar(_) | FieldType::OptionalReference { .. }
        )
    }

    /// Check if the stored value of a selection is allowed.
    pub fn allows(&self, value: &str) -> bool {
        match self {
            FieldType::Selection { choices, .. } => choices.iter().any(|(v, _)| v == value),
            _ => true,
        }
    }
}
