//! Hierarchical category access.
//!
//! `CategoryTree` is the read surface the validator needs from whatever
//! persists categories: record lookup, ordered children, flag search, and the
//! `child_of` closure.

use std::collections::{BTreeSet, HashSet, VecDeque};

use super::{Category, CategoryId, CategoryKind};
use crate::error::Error;

/// Separator between ancestor names in a category's record name.
pub const PATH_SEPARATOR: &str = " / ";

/// Search filter over category flags. `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Kind to match.
    pub kind: Option<CategoryKind>,
    /// Required flag to match.
    pub required: Option<bool>,
    /// Unique flag to match.
    pub unique: Option<bool>,
    /// Accounting flag to match.
    pub accounting: Option<bool>,
}

impl CategoryFilter {
    /// Filter matching every category.
    pub fn all() -> Self {
        Self::default()
    }

    /// Required view categories.
    pub fn required_views() -> Self {
        Self {
            kind: Some(CategoryKind::View),
            required: Some(true),
            ..Default::default()
        }
    }

    /// Unique view categories.
    pub fn unique_views() -> Self {
        Self {
            kind: Some(CategoryKind::View),
            unique: Some(true),
            ..Default::default()
        }
    }

    /// Accounting categories.
    pub fn accounting() -> Self {
        Self {
            accounting: Some(true),
            ..Default::default()
        }
    }

    /// Check whether a category matches.
    pub fn matches(&self, category: &Category) -> bool {
        self.kind.map_or(true, |k| category.kind == k)
            && self.required.map_or(true, |r| category.required == r)
            && self.unique.map_or(true, |u| category.unique == u)
            && self.accounting.map_or(true, |a| category.accounting == a)
    }
}

/// Read access to a category forest.
pub trait CategoryTree {
    /// Look up a category by id.
    fn category(&self, id: CategoryId) -> Result<Option<Category>, Error>;

    /// Direct children of a category, in sibling order.
    fn children(&self, id: CategoryId) -> Result<Vec<Category>, Error>;

    /// All categories matching the filter, ordered by id.
    fn search(&self, filter: &CategoryFilter) -> Result<Vec<Category>, Error>;

    /// The given categories plus all their descendants.
    ///
    /// Ids that do not exist are skipped.
    fn child_of(&self, roots: &[CategoryId]) -> Result<BTreeSet<CategoryId>, Error> {
        let mut found = BTreeSet::new();
        let mut queue = VecDeque::new();

        for &root in roots {
            if self.category(root)?.is_some() && found.insert(root) {
                queue.push_back(root);
            }
        }

        while let Some(id) = queue.pop_front() {
            for child in self.children(id)? {
                if found.insert(child.id) {
                    queue.push_back(child.id);
                }
            }
        }

        Ok(found)
    }

    /// Strict descendants of a category.
    fn descendants(&self, id: CategoryId) -> Result<BTreeSet<CategoryId>, Error> {
        let mut found = self.child_of(&[id])?;
        found.remove(&id);
        Ok(found)
    }

    /// Full path name, ancestors first, joined by [`PATH_SEPARATOR`].
    fn rec_name(&self, id: CategoryId) -> Result<String, Error> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);

        while let Some(cid) = current {
            if !seen.insert(cid) {
                return Err(Error::Recursion(id.0));
            }
            let category = self.category(cid)?.ok_or(Error::NotFound {
                entity: "category",
                id: cid.0,
            })?;
            names.push(category.name);
            current = category.parent;
        }

        names.reverse();
        Ok(names.join(PATH_SEPARATOR))
    }

    /// Fail if making `parent` the parent of `id` would create a loop.
    fn check_recursion(&self, id: CategoryId, parent: Option<CategoryId>) -> Result<(), Error> {
        let mut seen = HashSet::new();
        let mut current = parent;

        while let Some(cid) = current {
            if cid == id || !seen.insert(cid) {
                return Err(Error::Recursion(id.0));
            }
            current = self.category(cid)?.and_then(|c| c.parent);
        }

        Ok(())
    }
}
