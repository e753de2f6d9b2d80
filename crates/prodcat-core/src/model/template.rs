//! Product template records.

use std::fmt;

use super::CategoryId;

/// Product template identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TemplateId(pub u64);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product template with its category assignment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    /// Identifier.
    pub id: TemplateId,
    /// Name.
    pub name: String,
    /// Categories on the many-to-many tag set.
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    /// Single-valued accounting category.
    #[serde(default)]
    pub accounting_category: Option<CategoryId>,
}

impl Template {
    /// Display name used in user-facing messages.
    pub fn rec_name(&self) -> &str {
        &self.name
    }

    /// Replace the category set.
    pub fn set_categories(&mut self, categories: impl IntoIterator<Item = CategoryId>) {
        self.categories = categories.into_iter().collect();
    }
}

/// Values for a template that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct NewTemplate {
    /// Name.
    pub name: String,
    /// Categories on the tag set.
    #[serde(default)]
    pub categories: Vec<CategoryId>,
    /// Accounting category.
    #[serde(default)]
    pub accounting_category: Option<CategoryId>,
}

impl NewTemplate {
    /// Create a template without categories.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a category to the tag set.
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.categories.push(category);
        self
    }

    /// Add several categories to the tag set.
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = CategoryId>) -> Self {
        self.categories.extend(categories);
        self
    }

    /// Set the accounting category.
    pub fn with_accounting_category(mut self, category: CategoryId) -> Self {
        self.accounting_category = Some(category);
        self
    }

    /// Attach an identifier.
    pub fn into_template(self, id: TemplateId) -> Template {
        Template {
            id,
            name: self.name,
            categories: self.categories,
            accounting_category: self.accounting_category,
        }
    }
}
