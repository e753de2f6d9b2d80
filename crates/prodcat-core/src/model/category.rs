//! Category records.

use std::fmt;

use rkyv::{Archive, Deserialize, Serialize};

/// Category identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CategoryId {
    fn from(id: u64) -> Self {
        CategoryId(id)
    }
}

/// Category kind.
///
/// Only `View` categories carry active `required`/`unique` flags.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Plain tag category.
    #[default]
    Other,
    /// Grouping node that may constrain its branch.
    View,
}

impl CategoryKind {
    /// Selection values as (stored value, label) pairs.
    pub const SELECTION: [(&'static str, &'static str); 2] = [("other", "Other"), ("view", "View")];

    /// Stored value of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Other => "other",
            CategoryKind::View => "view",
        }
    }
}

/// A node in the category forest.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, serde::Serialize, serde::Deserialize,
)]
pub struct Category {
    /// Identifier.
    pub id: CategoryId,
    /// Name (unique among siblings by convention only).
    pub name: String,
    /// Parent category, `None` for roots.
    #[serde(default)]
    pub parent: Option<CategoryId>,
    /// Kind.
    #[serde(default)]
    pub kind: CategoryKind,
    /// At least one category of this branch must be on every template.
    #[serde(default)]
    pub required: bool,
    /// At most one category of this branch may be on a template.
    #[serde(default)]
    pub unique: bool,
    /// Used for the single-valued accounting category of templates.
    #[serde(default)]
    pub accounting: bool,
    /// Ordering hint among siblings.
    #[serde(default)]
    pub sequence: Option<i32>,
}

impl Category {
    /// Whether this category enforces the required-branch rule.
    pub fn is_required_view(&self) -> bool {
        self.kind == CategoryKind::View && self.required
    }

    /// Whether this category enforces the unique-branch rule.
    pub fn is_unique_view(&self) -> bool {
        self.kind == CategoryKind::View && self.unique
    }

    /// Whether this is a view category.
    pub fn is_view(&self) -> bool {
        self.kind == CategoryKind::View
    }
}

/// Values for a category that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct NewCategory {
    /// Name.
    pub name: String,
    /// Parent category.
    #[serde(default)]
    pub parent: Option<CategoryId>,
    /// Kind.
    #[serde(default)]
    pub kind: CategoryKind,
    /// Required flag.
    #[serde(default)]
    pub required: bool,
    /// Unique flag.
    #[serde(default)]
    pub unique: bool,
    /// Accounting flag.
    #[serde(default)]
    pub accounting: bool,
    /// Ordering hint.
    #[serde(default)]
    pub sequence: Option<i32>,
}

impl NewCategory {
    /// Create a root `other` category with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the parent category.
    pub fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Make this a view category.
    pub fn view(mut self) -> Self {
        self.kind = CategoryKind::View;
        self
    }

    /// Set the required flag.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the unique flag.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the accounting flag.
    pub fn accounting(mut self) -> Self {
        self.accounting = true;
        self
    }

    /// Set the ordering hint.
    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Attach an identifier.
    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            parent: self.parent,
            kind: self.kind,
            required: self.required,
            unique: self.unique,
            accounting: self.accounting,
            sequence: self.sequence,
        }
    }
}

/// Sort siblings by sequence (unset last), then name, then id.
pub fn sort_siblings(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        (a.sequence.is_none(), a.sequence, &a.name, a.id)
            .cmp(&(b.sequence.is_none(), b.sequence, &b.name, b.id))
    });
}
