//! In-memory category forest.

use std::collections::BTreeMap;

use super::category::sort_siblings;
use super::{Category, CategoryFilter, CategoryId, CategoryTree, NewCategory};
use crate::error::Error;

/// A category forest held in memory.
///
/// Useful for validating against a detached snapshot, and as the tree
/// behind unit tests.
#[derive(Debug, Clone, Default)]
pub struct CategoryForest {
    categories: BTreeMap<CategoryId, Category>,
    children: BTreeMap<CategoryId, Vec<CategoryId>>,
    next_id: u64,
}

impl CategoryForest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Build a forest from a JSON array of categories.
    ///
    /// Entries may appear in any order, but every parent must be present.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let categories: Vec<Category> =
            serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))?;
        Self::from_categories(categories)
    }

    /// Snapshot every category of another tree.
    pub fn snapshot<T: CategoryTree + ?Sized>(tree: &T) -> Result<Self, Error> {
        Self::from_categories(tree.search(&CategoryFilter::all())?)
    }

    fn from_categories(categories: Vec<Category>) -> Result<Self, Error> {
        let mut forest = Self::new();
        for category in categories {
            forest.link(category)?;
        }

        let dangling = forest
            .categories
            .values()
            .find_map(|c| c.parent.filter(|p| !forest.categories.contains_key(p)));
        if let Some(parent) = dangling {
            return Err(Error::NotFound {
                entity: "category",
                id: parent.0,
            });
        }

        Ok(forest)
    }

    /// Insert a new category and return its id.
    pub fn insert(&mut self, category: NewCategory) -> Result<CategoryId, Error> {
        let id = CategoryId(self.next_id.max(1));
        self.insert_category(category.into_category(id))?;
        Ok(id)
    }

    /// Insert (or replace) a category with a known id. Its parent must exist.
    pub fn insert_category(&mut self, category: Category) -> Result<(), Error> {
        if let Some(parent) = category.parent {
            if !self.categories.contains_key(&parent) {
                return Err(Error::NotFound {
                    entity: "category",
                    id: parent.0,
                });
            }
        }
        self.link(category)
    }

    fn link(&mut self, category: Category) -> Result<(), Error> {
        self.check_recursion(category.id, category.parent)?;

        if let Some(previous) = self.categories.remove(&category.id) {
            if let Some(siblings) = previous.parent.and_then(|p| self.children.get_mut(&p)) {
                siblings.retain(|c| *c != previous.id);
            }
        }

        if let Some(parent) = category.parent {
            self.children.entry(parent).or_default().push(category.id);
        }

        self.next_id = self.next_id.max(category.id.0 + 1);
        self.categories.insert(category.id, category);
        Ok(())
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the forest is empty.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl CategoryTree for CategoryForest {
    fn category(&self, id: CategoryId) -> Result<Option<Category>, Error> {
        Ok(self.categories.get(&id).cloned())
    }

    fn children(&self, id: CategoryId) -> Result<Vec<Category>, Error> {
        let mut children: Vec<Category> = self
            .children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|cid| self.categories.get(cid).cloned())
            .collect();
        sort_siblings(&mut children);
        Ok(children)
    }

    fn search(&self, filter: &CategoryFilter) -> Result<Vec<Category>, Error> {
        Ok(self
            .categories
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn colour_forest() -> (CategoryForest, CategoryId, CategoryId, CategoryId) {
        let mut forest = CategoryForest::new();
        let colour = forest.insert(NewCategory::new("Colour").view()).unwrap();
        let red = forest
            .insert(NewCategory::new("Red").with_parent(colour))
            .unwrap();
        let dark_red = forest
            .insert(NewCategory::new("Dark").with_parent(red))
            .unwrap();
        (forest, colour, red, dark_red)
    }

    #[test]
    fn test_child_of_includes_roots() {
        let (forest, colour, red, dark_red) = colour_forest();

        let found = forest.child_of(&[colour]).unwrap();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![colour, red, dark_red]);

        let below = forest.descendants(colour).unwrap();
        assert!(!below.contains(&colour));
        assert_eq!(below.len(), 2);
    }

    #[test]
    fn test_child_of_skips_unknown_ids() {
        let (forest, _, _, _) = colour_forest();
        assert!(forest.child_of(&[CategoryId(999)]).unwrap().is_empty());
    }

    #[test]
    fn test_rec_name_is_full_path() {
        let (forest, _, _, dark_red) = colour_forest();
        assert_eq!(forest.rec_name(dark_red).unwrap(), "Colour / Red / Dark");
    }

    #[test]
    fn test_reparenting_into_descendant_is_rejected() {
        let (mut forest, colour, _, dark_red) = colour_forest();

        let mut moved = forest.category(colour).unwrap().unwrap();
        moved.parent = Some(dark_red);

        assert!(matches!(
            forest.insert_category(moved),
            Err(Error::Recursion(id)) if id == colour.0
        ));
    }

    #[test]
    fn test_search_by_flags() {
        let mut forest = CategoryForest::new();
        forest
            .insert(NewCategory::new("Size").view().required())
            .unwrap();
        forest.insert(NewCategory::new("Brand").view().unique()).unwrap();
        forest
            .insert(NewCategory::new("Not a view").required())
            .unwrap();

        let required = forest.search(&CategoryFilter::required_views()).unwrap();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].name, "Size");

        let unique = forest.search(&CategoryFilter::unique_views()).unwrap();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].name, "Brand");
    }

    #[test]
    fn test_from_json() {
        let forest = CategoryForest::from_json(
            r#"[
                {"id": 1, "name": "Root", "kind": "view", "required": true, "unique": true},
                {"id": 2, "name": "Child1", "parent": 1},
                {"id": 3, "name": "Child2", "parent": 1, "sequence": 1}
            ]"#,
        )
        .unwrap();

        assert_eq!(forest.len(), 3);
        let children = forest.children(CategoryId(1)).unwrap();
        assert_eq!(children[0].name, "Child2");
        assert_eq!(children[1].name, "Child1");
    }

    #[test]
    fn test_from_json_child_before_parent() {
        let forest = CategoryForest::from_json(
            r#"[
                {"id": 3, "name": "S", "parent": 2},
                {"id": 2, "name": "Size", "kind": "view", "required": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(forest.rec_name(CategoryId(3)).unwrap(), "Size / S");
        assert_eq!(forest.descendants(CategoryId(2)).unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_dangling_parent() {
        let result = CategoryForest::from_json(
            r#"[
                {"id": 2, "name": "Size", "kind": "view", "required": true, "parent": 1},
                {"id": 3, "name": "S", "parent": 2}
            ]"#,
        );

        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "category",
                id: 1
            })
        ));
    }

    #[test]
    fn test_insert_unknown_parent_fails() {
        let mut forest = CategoryForest::new();
        let result = forest.insert(NewCategory::new("Orphan").with_parent(CategoryId(42)));

        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "category",
                id: 42
            })
        ));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_snapshot_copies_tree() {
        let (forest, colour, red, dark_red) = colour_forest();

        let copy = CategoryForest::snapshot(&forest).unwrap();
        assert_eq!(copy.len(), 3);
        assert_eq!(copy.rec_name(dark_red).unwrap(), "Colour / Red / Dark");
        assert_eq!(copy.descendants(colour).unwrap(), BTreeSet::from([red, dark_red]));
    }
}
