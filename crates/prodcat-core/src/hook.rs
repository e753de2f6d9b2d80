//! Template save hooks.
//!
//! Hooks run inside [`Transaction::commit`](crate::storage::Transaction::commit)
//! against the staged templates. Any hook error aborts the commit.

use tracing::{debug, instrument};

use crate::catalog::product::TEMPLATE_ENTITY;
use crate::constraint::{CategoryValidator, ValidationConfig};
use crate::error::Error;
use crate::model::{CategoryTree, Template};

/// Per-save options passed to every hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveContext {
    /// Skip the category constraint checks for this save.
    pub bypass_category_check: bool,
}

impl SaveContext {
    /// Context that skips the category constraint checks.
    pub fn bypass() -> Self {
        Self {
            bypass_category_check: true,
        }
    }
}

/// A check run before templates are written.
pub trait TemplateHook: Send + Sync {
    /// Hook name, for logging.
    fn name(&self) -> &str;

    /// Entity the hook is registered against.
    fn entity(&self) -> &str {
        TEMPLATE_ENTITY
    }

    /// Validate the created or updated templates of one save.
    fn validate(
        &self,
        tree: &dyn CategoryTree,
        templates: &[Template],
        ctx: &SaveContext,
    ) -> Result<(), Error>;
}

/// Ordered set of template hooks.
#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<Box<dyn TemplateHook>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the category constraint hook installed.
    pub fn with_category_constraints(config: ValidationConfig) -> Self {
        let mut registry = Self::new();
        registry.register(CategoryConstraintHook::new(config));
        registry
    }

    /// Append a hook. Hooks run in registration order.
    pub fn register(&mut self, hook: impl TemplateHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Run every hook, stopping at the first failure.
    pub fn run(
        &self,
        tree: &dyn CategoryTree,
        templates: &[Template],
        ctx: &SaveContext,
    ) -> Result<(), Error> {
        for hook in &self.hooks {
            hook.validate(tree, templates, ctx)?;
        }
        Ok(())
    }

    /// Names of the registered hooks.
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

/// Enforces required and unique category branches on saved templates.
#[derive(Debug, Clone, Default)]
pub struct CategoryConstraintHook {
    config: ValidationConfig,
}

impl CategoryConstraintHook {
    /// Create the hook.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validation settings.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl TemplateHook for CategoryConstraintHook {
    fn name(&self) -> &str {
        "category_constraints"
    }

    #[instrument(skip_all, fields(templates = templates.len()))]
    fn validate(
        &self,
        tree: &dyn CategoryTree,
        templates: &[Template],
        ctx: &SaveContext,
    ) -> Result<(), Error> {
        if ctx.bypass_category_check {
            debug!("category check bypassed");
            return Ok(());
        }

        CategoryValidator::new(tree, &self.config).validate(templates)
    }
}
