//! Store implementation.

use sled::transaction::TransactionError;
use sled::{Db, IVec, Transactional, Tree};
use tracing::debug;

use super::key::{current_timestamp, decode_u64, encode_u64, LinkKey, ROOT_OWNER};
use super::record::{decode_category, encode_category, TemplateRecord};
use super::{StorageConfig, Transaction};
use crate::catalog::{product_schema, Catalog, SchemaBundle};
use crate::error::Error;
use crate::model::{
    sort_siblings, Category, CategoryFilter, CategoryId, CategoryTree, NewCategory, Template,
    TemplateId,
};

/// Tree name for category records.
const CATEGORY_TREE: &str = "category:data";

/// Tree name for the parent -> child index.
const CHILDREN_TREE: &str = "category:children";

/// Tree name for template records.
const TEMPLATE_TREE: &str = "template:data";

/// Tree name for template -> category links.
const TEMPLATE_LINK_TREE: &str = "template:categories";

/// Tree name for category -> template links.
const CATEGORY_LINK_TREE: &str = "category:templates";

/// The store wrapping sled.
///
/// Holds categories, templates, and the links between them, and answers the
/// hierarchical queries the validator needs.
pub struct Store {
    /// The underlying sled database.
    db: Db,

    /// Schema catalog.
    catalog: Catalog,

    /// Category records keyed by id.
    categories: Tree,

    /// Parent/child index (roots under [`ROOT_OWNER`]).
    child_index: Tree,

    /// Template records keyed by id.
    templates: Tree,

    /// Template -> category links.
    template_links: Tree,

    /// Category -> template links.
    category_links: Tree,
}

impl Store {
    /// Open or create a store with the given configuration.
    ///
    /// Installs the product schema in the catalog if the stored one differs.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        Self::open_with_schema(config, product_schema())
    }

    /// Open or create a store, installing `schema` if the stored one differs.
    pub fn open_with_schema(config: StorageConfig, schema: SchemaBundle) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        let catalog = Catalog::open(&db)?;
        catalog.ensure_schema(schema)?;

        Ok(Self {
            categories: db.open_tree(CATEGORY_TREE)?,
            child_index: db.open_tree(CHILDREN_TREE)?,
            templates: db.open_tree(TEMPLATE_TREE)?,
            template_links: db.open_tree(TEMPLATE_LINK_TREE)?,
            category_links: db.open_tree(CATEGORY_LINK_TREE)?,
            catalog,
            db,
        })
    }

    /// Schema catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Check if the database was recovered from a previous crash.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Allocate a new record id (never 0).
    pub fn generate_id(&self) -> Result<u64, Error> {
        Ok(self.db.generate_id()? + 1)
    }

    /// Start a template transaction.
    pub fn transaction(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    // ========== Categories ==========

    /// Create a category.
    pub fn create_category(&self, new: NewCategory) -> Result<Category, Error> {
        if let Some(parent) = new.parent {
            self.require_category(parent)?;
        }

        let category = new.into_category(CategoryId(self.generate_id()?));
        self.put_category(&category, None)?;

        debug!(id = category.id.0, name = %category.name, "created category");
        Ok(category)
    }

    /// Overwrite an existing category.
    pub fn write_category(&self, category: &Category) -> Result<(), Error> {
        let previous = self.require_category(category.id)?;
        if let Some(parent) = category.parent {
            self.require_category(parent)?;
        }
        self.check_recursion(category.id, category.parent)?;

        self.put_category(category, previous.parent)
    }

    /// Delete a category without children.
    ///
    /// Links from templates to the category are removed with it, and
    /// templates using it as accounting category have that field cleared.
    pub fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        let category = self.require_category(id)?;

        let children = self.child_index.scan_prefix(LinkKey::prefix(id.0)).count();
        if children > 0 {
            return Err(Error::HasChildren {
                id: id.0,
                children,
            });
        }

        let templates = self.templates_with_category(id)?;
        let cleared = self.clear_accounting_category(id)?;
        let id_key = encode_u64(id.0);
        let parent_key = LinkKey::new(category.parent.map_or(ROOT_OWNER, |p| p.0), id.0).encode();

        let result: Result<(), TransactionError<Error>> = (
            &self.categories,
            &self.child_index,
            &self.templates,
            &self.template_links,
            &self.category_links,
        )
            .transaction(|(cats, kids, data, t_links, c_links)| {
                cats.remove(&id_key[..])?;
                kids.remove(&parent_key[..])?;
                for template in &templates {
                    t_links.remove(&LinkKey::new(template.0, id.0).encode()[..])?;
                    c_links.remove(&LinkKey::new(id.0, template.0).encode()[..])?;
                }
                for (key, bytes) in &cleared {
                    data.insert(&key[..], bytes.as_slice())?;
                }
                Ok(())
            });
        tx_result(result)?;

        debug!(
            id = id.0,
            unlinked = templates.len(),
            cleared = cleared.len(),
            "deleted category"
        );
        Ok(())
    }

    /// Template records rewritten without the given accounting category.
    fn clear_accounting_category(&self, id: CategoryId) -> Result<Vec<(IVec, Vec<u8>)>, Error> {
        let mut cleared = Vec::new();
        for result in self.templates.iter() {
            let (key, value) = result?;
            let mut record = TemplateRecord::from_bytes(&value)?;
            if record.accounting_category == Some(id) {
                record.accounting_category = None;
                record.updated_at = current_timestamp();
                cleared.push((key, record.to_bytes()?));
            }
        }
        Ok(cleared)
    }

    /// Get a category or fail with `NotFound`.
    pub fn require_category(&self, id: CategoryId) -> Result<Category, Error> {
        self.category(id)?.ok_or(Error::NotFound {
            entity: "category",
            id: id.0,
        })
    }

    fn put_category(&self, category: &Category, old_parent: Option<CategoryId>) -> Result<(), Error> {
        let bytes = encode_category(category)?;
        let id_key = encode_u64(category.id.0);
        let old_key = LinkKey::new(old_parent.map_or(ROOT_OWNER, |p| p.0), category.id.0).encode();
        let new_key =
            LinkKey::new(category.parent.map_or(ROOT_OWNER, |p| p.0), category.id.0).encode();

        let result: Result<(), TransactionError<Error>> = (&self.categories, &self.child_index)
            .transaction(|(cats, kids)| {
                cats.insert(&id_key[..], bytes.as_slice())?;
                kids.remove(&old_key[..])?;
                kids.insert(&new_key[..], Vec::<u8>::new())?;
                Ok(())
            });
        tx_result(result)
    }

    /// Root categories in sibling order.
    pub fn roots(&self) -> Result<Vec<Category>, Error> {
        self.children_of_owner(ROOT_OWNER)
    }

    fn children_of_owner(&self, owner: u64) -> Result<Vec<Category>, Error> {
        let mut children = Vec::new();
        for result in self.child_index.scan_prefix(LinkKey::prefix(owner)) {
            let (key, _) = result?;
            let link = LinkKey::decode(&key).ok_or(Error::InvalidKey)?;
            if let Some(category) = self.category(CategoryId(link.target))? {
                children.push(category);
            }
        }
        sort_siblings(&mut children);
        Ok(children)
    }

    // ========== Templates ==========

    /// Load a template with its categories.
    pub fn template(&self, id: TemplateId) -> Result<Option<Template>, Error> {
        match self.template_record(id)? {
            Some(record) => Ok(Some(Template {
                id,
                name: record.name,
                categories: self.template_categories(id)?,
                accounting_category: record.accounting_category,
            })),
            None => Ok(None),
        }
    }

    /// Load every template, ordered by id.
    pub fn templates(&self) -> Result<Vec<Template>, Error> {
        let mut templates = Vec::new();
        for result in self.templates.iter() {
            let (key, value) = result?;
            let id = TemplateId(decode_u64(&key)?);
            let record = TemplateRecord::from_bytes(&value)?;
            templates.push(Template {
                id,
                name: record.name,
                categories: self.template_categories(id)?,
                accounting_category: record.accounting_category,
            });
        }
        Ok(templates)
    }

    /// Stored record of a template.
    pub fn template_record(&self, id: TemplateId) -> Result<Option<TemplateRecord>, Error> {
        match self.templates.get(encode_u64(id.0))? {
            Some(bytes) => Ok(Some(TemplateRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Categories linked to a template, ordered by id.
    pub fn template_categories(&self, id: TemplateId) -> Result<Vec<CategoryId>, Error> {
        self.scan_links(&self.template_links, id.0)
            .map(|ids| ids.into_iter().map(CategoryId).collect())
    }

    /// Templates linked to a category, ordered by id.
    pub fn templates_with_category(&self, id: CategoryId) -> Result<Vec<TemplateId>, Error> {
        self.scan_links(&self.category_links, id.0)
            .map(|ids| ids.into_iter().map(TemplateId).collect())
    }

    fn scan_links(&self, tree: &Tree, owner: u64) -> Result<Vec<u64>, Error> {
        let mut targets = Vec::new();
        for result in tree.scan_prefix(LinkKey::prefix(owner)) {
            let (key, _) = result?;
            let link = LinkKey::decode(&key).ok_or(Error::InvalidKey)?;
            targets.push(link.target);
        }
        Ok(targets)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    /// Trees written by template transactions.
    pub(crate) fn template_trees(&self) -> (&Tree, &Tree, &Tree) {
        (&self.templates, &self.template_links, &self.category_links)
    }
}

impl CategoryTree for Store {
    fn category(&self, id: CategoryId) -> Result<Option<Category>, Error> {
        match self.categories.get(encode_u64(id.0))? {
            Some(bytes) => Ok(Some(decode_category(&bytes)?)),
            None => Ok(None),
        }
    }

    fn children(&self, id: CategoryId) -> Result<Vec<Category>, Error> {
        self.children_of_owner(id.0)
    }

    fn search(&self, filter: &CategoryFilter) -> Result<Vec<Category>, Error> {
        let mut found = Vec::new();
        for result in self.categories.iter() {
            let (_, value) = result?;
            let category = decode_category(&value)?;
            if filter.matches(&category) {
                found.push(category);
            }
        }
        Ok(found)
    }
}

/// Flatten a sled transaction result.
pub(crate) fn tx_result<T>(result: Result<T, TransactionError<Error>>) -> Result<T, Error> {
    match result {
        Ok(value) => Ok(value),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(Error::Storage(e)),
    }
}
