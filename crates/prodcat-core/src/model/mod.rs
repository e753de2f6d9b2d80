//! Product and category model.

mod category;
mod forest;
mod template;
mod tree;

pub use category::{sort_siblings, Category, CategoryId, CategoryKind, NewCategory};
pub use forest::CategoryForest;
pub use template::{NewTemplate, Template, TemplateId};
pub use tree::{CategoryFilter, CategoryTree, PATH_SEPARATOR};
