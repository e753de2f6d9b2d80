//! Template category validation.
//!
//! The CategoryValidator checks a batch of templates against the required and
//! unique groups of a category tree. Per template the order is: link domain,
//! required groups, unique groups. The first violation is returned.

use std::collections::BTreeSet;

use tracing::debug;

use super::{ConstraintRules, ValidationConfig};
use crate::error::{Error, ValidationError};
use crate::model::{CategoryId, CategoryTree, Template};

/// Category constraint validator.
pub struct CategoryValidator<'a, T: CategoryTree + ?Sized> {
    tree: &'a T,
    config: &'a ValidationConfig,
}

impl<'a, T: CategoryTree + ?Sized> CategoryValidator<'a, T> {
    /// Create a new validator.
    pub fn new(tree: &'a T, config: &'a ValidationConfig) -> Self {
        Self { tree, config }
    }

    /// Validate a batch of templates.
    ///
    /// The rules are loaded once for the whole batch.
    pub fn validate(&self, templates: &[Template]) -> Result<(), Error> {
        if templates.is_empty() {
            return Ok(());
        }

        let rules = ConstraintRules::load(self.tree, self.config)?;
        debug!(templates = templates.len(), "validating template categories");

        for template in templates {
            self.validate_template(&rules, template)?;
        }
        Ok(())
    }

    /// Validate one template against preloaded rules.
    pub fn validate_template(&self, rules: &ConstraintRules, template: &Template) -> Result<(), Error> {
        self.check_domain(template)?;

        let assigned: BTreeSet<CategoryId> = template.categories.iter().copied().collect();
        self.check_required(rules, template, &assigned)?;
        self.check_unique(rules, template, &assigned)?;
        Ok(())
    }

    /// Check that every category may be linked to the template.
    pub fn check_domain(&self, template: &Template) -> Result<(), Error> {
        for &id in &template.categories {
            let allowed = match self.tree.category(id)? {
                Some(category) => {
                    !category.accounting && (self.config.allow_view_assignment || !category.is_view())
                }
                None => false,
            };
            if !allowed {
                return Err(ValidationError::InvalidCategory {
                    template: template.rec_name().to_string(),
                    category: self.display_name(id),
                }
                .into());
            }
        }

        if let Some(id) = template.accounting_category {
            let is_accounting = self.tree.category(id)?.is_some_and(|c| c.accounting);
            if !is_accounting {
                return Err(ValidationError::InvalidAccountingCategory {
                    template: template.rec_name().to_string(),
                    category: self.display_name(id),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Check that every required group has an assigned member.
    pub fn check_required(
        &self,
        rules: &ConstraintRules,
        template: &Template,
        assigned: &BTreeSet<CategoryId>,
    ) -> Result<(), Error> {
        let missing: Vec<&str> = rules
            .required
            .iter()
            .filter(|group| group.count_in(assigned) == 0)
            .map(|group| group.name.as_str())
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(ValidationError::MissingRequiredCategories {
            template: template.rec_name().to_string(),
            categories: missing
                .iter()
                .take(self.config.max_reported_names)
                .map(|name| name.to_string())
                .collect(),
            missing: missing.len(),
        }
        .into())
    }

    /// Check that no unique group has more than one assigned member.
    pub fn check_unique(
        &self,
        rules: &ConstraintRules,
        template: &Template,
        assigned: &BTreeSet<CategoryId>,
    ) -> Result<(), Error> {
        match rules.unique.iter().find(|group| group.count_in(assigned) > 1) {
            Some(group) => Err(ValidationError::RepeatedUniqueCategory {
                template: template.rec_name().to_string(),
                category: group.name.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }

    fn display_name(&self, id: CategoryId) -> String {
        self.tree.rec_name(id).unwrap_or_else(|_| id.to_string())
    }
}
