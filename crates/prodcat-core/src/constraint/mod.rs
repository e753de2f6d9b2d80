//! Category constraint enforcement.
//!
//! Required view categories need an assigned descendant on every template;
//! unique view categories allow at most one.

mod config;
mod rules;
mod validator;

pub use config::ValidationConfig;
pub use rules::{CategoryGroup, ConstraintRules};
pub use validator::CategoryValidator;
