//! Validation configuration.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Category constraint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Whether assigning a required category itself satisfies it.
    pub required_accepts_self: bool,
    /// Whether a unique category itself counts towards its own limit.
    pub unique_counts_self: bool,
    /// Whether view categories may be assigned to templates.
    pub allow_view_assignment: bool,
    /// Maximum number of category names listed in a missing-categories error.
    pub max_reported_names: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_accepts_self: false,
            unique_counts_self: false,
            allow_view_assignment: true,
            max_reported_names: 3,
        }
    }
}

impl ValidationConfig {
    /// Load a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::InvalidData(e.to_string()))
    }

    /// Let a required category satisfy itself.
    pub fn with_required_accepts_self(mut self, enabled: bool) -> Self {
        self.required_accepts_self = enabled;
        self
    }

    /// Count a unique category towards its own limit.
    pub fn with_unique_counts_self(mut self, enabled: bool) -> Self {
        self.unique_counts_self = enabled;
        self
    }

    /// Allow or reject view categories in the template tag set.
    pub fn with_view_assignment(mut self, allowed: bool) -> Self {
        self.allow_view_assignment = allowed;
        self
    }

    /// Set the number of names reported for missing required categories.
    pub fn with_max_reported_names(mut self, max: usize) -> Self {
        self.max_reported_names = max;
        self
    }
}
