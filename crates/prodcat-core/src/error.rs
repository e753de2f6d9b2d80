//! Core error types.

use thiserror::Error;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// Record not found.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Record identifier.
        id: u64,
    },

    /// A category's parent chain loops back to itself.
    #[error("recursion detected in the parent chain of category {0}")]
    Recursion(u64),

    /// A category still has children and cannot be deleted.
    #[error("category {id} still has {children} child categories")]
    HasChildren {
        /// Category identifier.
        id: u64,
        /// Number of remaining children.
        children: usize,
    },

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A save was rejected by a validation hook.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// User-facing validation failures raised while saving templates.
///
/// These abort the enclosing transaction; the user has to fix the
/// category assignment and save again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The template does not carry a category from every required branch.
    #[error(
        "The template {template} is missing some required categories: {}",
        .categories.join(", ")
    )]
    MissingRequiredCategories {
        /// Template display name.
        template: String,
        /// Record names of unsatisfied required categories (truncated).
        categories: Vec<String>,
        /// Total number of unsatisfied required categories.
        missing: usize,
    },

    /// The template carries more than one category from a unique branch.
    #[error("The template {template} has repeated categories marked as unique ({category})")]
    RepeatedUniqueCategory {
        /// Template display name.
        template: String,
        /// Record name of the unique category.
        category: String,
    },

    /// A category on the template is outside the allowed domain.
    #[error("The category {category} cannot be assigned to the template {template}")]
    InvalidCategory {
        /// Template display name.
        template: String,
        /// Record name (or id) of the rejected category.
        category: String,
    },

    /// The accounting category is not flagged for accounting.
    #[error("The category {category} of the template {template} is not an accounting category")]
    InvalidAccountingCategory {
        /// Template display name.
        template: String,
        /// Record name (or id) of the rejected category.
        category: String,
    },
}

impl ValidationError {
    /// Stable message key for host-side translation.
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredCategories { .. } => "missing_categories",
            ValidationError::RepeatedUniqueCategory { .. } => "repeated_unique",
            ValidationError::InvalidCategory { .. } => "invalid_category",
            ValidationError::InvalidAccountingCategory { .. } => "invalid_accounting_category",
        }
    }

    /// Message parameters, in the order the translated message expects them.
    pub fn params(&self) -> Vec<String> {
        match self {
            ValidationError::MissingRequiredCategories {
                template,
                categories,
                ..
            } => vec![template.clone(), categories.join(", ")],
            ValidationError::RepeatedUniqueCategory { template, category }
            | ValidationError::InvalidCategory { template, category }
            | ValidationError::InvalidAccountingCategory { template, category } => {
                vec![template.clone(), category.clone()]
            }
        }
    }

    /// Display name of the template that failed.
    pub fn template(&self) -> &str {
        match self {
            ValidationError::MissingRequiredCategories { template, .. }
            | ValidationError::RepeatedUniqueCategory { template, .. }
            | ValidationError::InvalidCategory { template, .. }
            | ValidationError::InvalidAccountingCategory { template, .. } => template,
        }
    }
}
