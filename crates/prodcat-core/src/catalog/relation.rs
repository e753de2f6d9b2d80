//! Relation definitions between entities.

use rkyv::{Archive, Deserialize, Serialize};

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum Cardinality {
    /// Many records point at one (foreign key on the source).
    ManyToOne,
    /// Many-to-many relation through an edge entity.
    ManyToMany,
}

/// Behavior when a referenced record is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum DeleteBehavior {
    /// Delete referencing records (or edges).
    Cascade,
    /// Prevent deletion while references exist.
    Restrict,
    /// Clear the reference.
    SetNull,
}

/// A relation definition between two entities.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name (unique within schema).
    pub name: String,
    /// Source entity name.
    pub from_entity: String,
    /// Field on the source entity.
    pub from_field: String,
    /// Target entity name.
    pub to_entity: String,
    /// Relation cardinality.
    pub cardinality: Cardinality,
    /// Delete behavior when the target goes away.
    pub on_delete: DeleteBehavior,
    /// Edge entity for many-to-many relations.
    pub edge_entity: Option<String>,
}

impl RelationDef {
    /// Create a many-to-one relation.
    pub fn many_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            from_field: from_field.into(),
            to_entity: to_entity.into(),
            cardinality: Cardinality::ManyToOne,
            on_delete: DeleteBehavior::Restrict,
            edge_entity: None,
        }
    }

    /// Create a many-to-many relation.
    pub fn many_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
        edge_entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            from_field: from_field.into(),
            to_entity: to_entity.into(),
            cardinality: Cardinality::ManyToMany,
            on_delete: DeleteBehavior::Cascade,
            edge_entity: Some(edge_entity.into()),
        }
    }

    /// Set delete behavior.
    pub fn with_on_delete(mut self, on_delete: DeleteBehavior) -> Self {
        self.on_delete = on_delete;
        self
    }

    /// Check if this is a many-to-many relation.
    pub fn is_many_to_many(&self) -> bool {
        self.cardinality == Cardinality::ManyToMany
    }
}
