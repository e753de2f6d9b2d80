//! prodcat - product categories with enforced category branches.
//!
//! A [`Database`] stores a category tree and product templates. Every template
//! save runs the registered hooks, which by default enforce that templates
//! carry a category below each required view category and at most one below
//! each unique view category.
//!
//! ```no_run
//! use prodcat::{Database, NewCategory, NewTemplate, SaveContext};
//!
//! let db = Database::open_temporary()?;
//! let size = db.create_category(NewCategory::new("Size").view().required().unique())?;
//! let small = db.create_category(NewCategory::new("S").with_parent(size.id))?;
//!
//! let ids = db.save_templates(
//!     vec![NewTemplate::new("Chair").with_category(small.id)],
//!     &SaveContext::default(),
//! )?;
//! assert_eq!(ids.len(), 1);
//! # Ok::<(), prodcat::Error>(())
//! ```

mod config;
mod error;

use parking_lot::RwLock;
use prodcat_core::product_schema_for;
use tracing::info;

pub use config::DatabaseConfig;
pub use error::Error;
pub use prodcat_core::{
    Category, CategoryConstraintHook, CategoryId, CategoryKind, CategoryTree, HookRegistry,
    NewCategory, NewTemplate, SaveContext, Store, Template, TemplateHook, TemplateId,
    ValidationConfig, ValidationError,
};

/// An open product category database.
pub struct Database {
    store: Store,
    hooks: RwLock<HookRegistry>,
    config: DatabaseConfig,
}

impl Database {
    /// Open a database with the category constraint hook installed.
    ///
    /// The catalog's template domains follow the validation settings.
    pub fn open(config: DatabaseConfig) -> Result<Self, Error> {
        let schema = product_schema_for(&config.validation);
        let store = Store::open_with_schema(config.storage.clone(), schema)?;
        let hooks = HookRegistry::with_category_constraints(config.validation.clone());

        info!(
            temporary = config.storage.temporary,
            recovered = store.was_recovered(),
            "opened product category database"
        );

        Ok(Self {
            store,
            hooks: RwLock::new(hooks),
            config,
        })
    }

    /// Open an in-memory database with default settings.
    pub fn open_temporary() -> Result<Self, Error> {
        Self::open(DatabaseConfig::temporary())
    }

    /// Get the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get the configuration the database was opened with.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Register an additional save hook. It runs after the existing ones.
    pub fn register_hook(&self, hook: impl TemplateHook + 'static) {
        self.hooks.write().register(hook);
    }

    /// Names of the registered save hooks.
    pub fn hook_names(&self) -> Vec<String> {
        self.hooks
            .read()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // ========== Categories ==========

    /// Create a category. Its parent, if any, must exist.
    pub fn create_category(&self, category: NewCategory) -> Result<Category, Error> {
        Ok(self.store.create_category(category)?)
    }

    /// Overwrite a category. Fails if the new parent creates a loop.
    pub fn write_category(&self, category: &Category) -> Result<(), Error> {
        Ok(self.store.write_category(category)?)
    }

    /// Delete a category. Fails while it still has children.
    pub fn delete_category(&self, id: CategoryId) -> Result<(), Error> {
        Ok(self.store.delete_category(id)?)
    }

    /// Get a category by id.
    pub fn category(&self, id: CategoryId) -> Result<Option<Category>, Error> {
        Ok(self.store.category(id)?)
    }

    /// Full path name of a category.
    pub fn category_rec_name(&self, id: CategoryId) -> Result<String, Error> {
        Ok(self.store.rec_name(id)?)
    }

    // ========== Templates ==========

    /// Create templates in one transaction.
    ///
    /// Either every template passes the save hooks and is stored, or none is.
    pub fn save_templates(
        &self,
        templates: Vec<NewTemplate>,
        ctx: &SaveContext,
    ) -> Result<Vec<TemplateId>, Error> {
        let mut tx = self.store.transaction();
        for template in templates {
            tx.create(template)?;
        }
        self.commit(tx, ctx)
    }

    /// Overwrite existing templates in one transaction.
    pub fn write_templates(
        &self,
        templates: Vec<Template>,
        ctx: &SaveContext,
    ) -> Result<Vec<TemplateId>, Error> {
        let mut tx = self.store.transaction();
        for template in templates {
            tx.write(template)?;
        }
        self.commit(tx, ctx)
    }

    /// Delete templates and their category links.
    pub fn delete_templates(&self, ids: &[TemplateId]) -> Result<(), Error> {
        let mut tx = self.store.transaction();
        for &id in ids {
            tx.delete(id);
        }
        self.commit(tx, &SaveContext::default())?;
        Ok(())
    }

    /// Get a template with its categories.
    pub fn template(&self, id: TemplateId) -> Result<Option<Template>, Error> {
        Ok(self.store.template(id)?)
    }

    /// Get every template, ordered by id.
    pub fn templates(&self) -> Result<Vec<Template>, Error> {
        Ok(self.store.templates()?)
    }

    /// Templates tagged with a category.
    pub fn templates_with_category(&self, id: CategoryId) -> Result<Vec<TemplateId>, Error> {
        Ok(self.store.templates_with_category(id)?)
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        Ok(self.store.flush()?)
    }

    fn commit(
        &self,
        tx: prodcat_core::Transaction<'_>,
        ctx: &SaveContext,
    ) -> Result<Vec<TemplateId>, Error> {
        let hooks = self.hooks.read();
        Ok(tx.commit(&hooks, ctx)?)
    }
}
