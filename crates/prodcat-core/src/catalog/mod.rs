//! Schema catalog.
//!
//! The catalog stores versioned declarations of entities, fields, and relations
//! for the host's migration and form layers.

mod catalog;
mod entity;
mod field;
pub mod product;
mod relation;
mod schema;
mod types;

pub use catalog::Catalog;
pub use entity::{EntityDef, OrderBy, OrderDirection};
pub use field::{DefaultValue, DomainClause, DomainOperator, FieldDef, Visibility};
pub use product::{product_schema, product_schema_for};
pub use relation::{Cardinality, DeleteBehavior, RelationDef};
pub use schema::SchemaBundle;
pub use types::{FieldType, ScalarType};
