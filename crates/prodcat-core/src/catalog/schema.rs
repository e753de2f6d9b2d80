//! Schema bundle - versioned snapshot of the entire schema.

use super::{EntityDef, RelationDef};
use crate::error::Error;
use crate::storage::current_timestamp;
use rkyv::{Archive, Deserialize, Serialize};
use std::collections::BTreeMap;

/// A versioned snapshot of the entire schema.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Schema version (monotonically increasing).
    pub version: u64,
    /// Creation timestamp (microseconds since Unix epoch).
    pub created_at: u64,
    /// Entity definitions keyed by name.
    pub entities: BTreeMap<String, EntityDef>,
    /// Relation definitions keyed by name.
    pub relations: BTreeMap<String, RelationDef>,
}

impl SchemaBundle {
    /// Create an empty schema bundle.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            created_at: current_timestamp(),
            entities: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Add an entity to the schema.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    /// Add a relation to the schema.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Get a relation by name.
    pub fn get_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    /// Get all relations for an entity (as source).
    pub fn relations_from(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .values()
            .filter(|r| r.from_entity == entity)
            .collect()
    }

    /// Get all relations to an entity (as target).
    pub fn relations_to(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .values()
            .filter(|r| r.to_entity == entity)
            .collect()
    }

    /// Whether two bundles declare the same entities and relations,
    /// ignoring version and creation time.
    pub fn same_definitions(&self, other: &SchemaBundle) -> bool {
        self.entities == other.entities && self.relations == other.relations
    }

    /// Serialize the schema bundle to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a schema bundle from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let aligned = crate::storage::aligned(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}

impl Default for SchemaBundle {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::product::{product_schema, CATEGORY_ENTITY, TEMPLATE_ENTITY};

    #[test]
    fn test_relations_for_entity() {
        let schema = product_schema();

        let from_template = schema.relations_from(TEMPLATE_ENTITY);
        assert_eq!(from_template.len(), 2);

        let to_category = schema.relations_to(CATEGORY_ENTITY);
        assert_eq!(to_category.len(), 3);
    }

    #[test]
    fn test_same_definitions_ignores_version() {
        let mut a = product_schema();
        let b = product_schema();
        a.version = 7;

        assert!(a.same_definitions(&b));
        assert!(!a.same_definitions(&SchemaBundle::new(7)));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let schema = product_schema();
        let decoded = SchemaBundle::from_bytes(&schema.to_bytes().unwrap()).unwrap();

        assert_eq!(schema, decoded);
    }
}
