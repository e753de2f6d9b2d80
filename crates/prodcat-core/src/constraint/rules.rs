//! Required and unique category groups.

use std::collections::BTreeSet;

use tracing::debug;

use super::ValidationConfig;
use crate::error::Error;
use crate::model::{CategoryFilter, CategoryId, CategoryTree};

/// A constraining view category and the categories that count towards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    /// The required or unique view category.
    pub root: CategoryId,
    /// Record name of the root.
    pub name: String,
    /// Categories whose assignment counts for this group.
    pub members: BTreeSet<CategoryId>,
}

impl CategoryGroup {
    fn load<T: CategoryTree + ?Sized>(
        tree: &T,
        root: CategoryId,
        include_root: bool,
    ) -> Result<Self, Error> {
        let mut members = tree.descendants(root)?;
        if include_root {
            members.insert(root);
        }

        Ok(Self {
            root,
            name: tree.rec_name(root)?,
            members,
        })
    }

    /// Number of distinct members among the given categories.
    pub fn count_in(&self, categories: &BTreeSet<CategoryId>) -> usize {
        self.members.intersection(categories).count()
    }
}

/// Snapshot of every required and unique group in a category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintRules {
    /// Required groups, ordered by root id.
    pub required: Vec<CategoryGroup>,
    /// Unique groups, ordered by root id.
    pub unique: Vec<CategoryGroup>,
}

impl ConstraintRules {
    /// Load the groups from a tree.
    pub fn load<T: CategoryTree + ?Sized>(tree: &T, config: &ValidationConfig) -> Result<Self, Error> {
        let required = tree
            .search(&CategoryFilter::required_views())?
            .into_iter()
            .map(|c| CategoryGroup::load(tree, c.id, config.required_accepts_self))
            .collect::<Result<Vec<_>, _>>()?;

        let unique = tree
            .search(&CategoryFilter::unique_views())?
            .into_iter()
            .map(|c| CategoryGroup::load(tree, c.id, config.unique_counts_self))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            required = required.len(),
            unique = unique.len(),
            "loaded category constraint rules"
        );

        Ok(Self { required, unique })
    }

    /// True when no category constrains templates.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.unique.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryForest, NewCategory};

    #[test]
    fn test_load_groups() {
        let mut forest = CategoryForest::new();
        let size = forest
            .insert(NewCategory::new("Size").view().required().unique())
            .unwrap();
        let small = forest.insert(NewCategory::new("S").with_parent(size)).unwrap();
        let tiny = forest.insert(NewCategory::new("XS").with_parent(small)).unwrap();
        forest.insert(NewCategory::new("Loose")).unwrap();

        let rules = ConstraintRules::load(&forest, &ValidationConfig::default()).unwrap();
        assert_eq!(rules.required.len(), 1);
        assert_eq!(rules.unique.len(), 1);

        let group = &rules.required[0];
        assert_eq!(group.root, size);
        assert_eq!(group.name, "Size");
        assert_eq!(group.members, BTreeSet::from([small, tiny]));
    }

    #[test]
    fn test_include_root_when_configured() {
        let mut forest = CategoryForest::new();
        let size = forest.insert(NewCategory::new("Size").view().required()).unwrap();

        let config = ValidationConfig::default().with_required_accepts_self(true);
        let rules = ConstraintRules::load(&forest, &config).unwrap();
        assert!(rules.required[0].members.contains(&size));
        assert!(rules.unique.is_empty());
    }

    #[test]
    fn test_flags_ignored_on_non_view() {
        let mut forest = CategoryForest::new();
        forest.insert(NewCategory::new("Tag").required().unique()).unwrap();

        let rules = ConstraintRules::load(&forest, &ValidationConfig::default()).unwrap();
        assert!(rules.is_empty());
    }
}
