//! prodcat core - category catalog, store, and category constraint validation.
//!
//! This crate provides the product/category data model, a sled-backed store
//! standing in for the host persistence layer, and the validator that checks
//! required and unique category branches whenever templates are saved.

pub mod catalog;
pub mod constraint;
pub mod error;
pub mod hook;
pub mod model;
pub mod storage;

pub use catalog::{
    product_schema, product_schema_for, Cardinality, Catalog, DeleteBehavior, EntityDef,
    FieldDef, FieldType, RelationDef, ScalarType, SchemaBundle, Visibility,
};
pub use constraint::{CategoryGroup, CategoryValidator, ConstraintRules, ValidationConfig};
pub use error::{Error, ValidationError};
pub use hook::{CategoryConstraintHook, HookRegistry, SaveContext, TemplateHook};
pub use model::{
    Category, CategoryFilter, CategoryForest, CategoryId, CategoryKind, CategoryTree,
    NewCategory, NewTemplate, Template, TemplateId,
};
pub use storage::{StorageConfig, Store, Transaction};
