//! Schema configuration.
//!
//! Configuration can be embedded in a service's TOML file, typically under a
//! `[graphql]` section.
//!
//! # Example Configuration
//!
//! ```toml
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! duplicate_operations = "reject"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::GraphQLError;

/// What to do when an operation name is registered twice under one root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with `GraphQLError::DuplicateOperationName`.
    #[default]
    Reject,
    /// Keep the latest registration and log a warning.
    Replace,
}

/// Schema assembly and execution limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Handling of operations registered twice under the same name.
    /// Default: reject
    #[serde(default)]
    pub duplicate_operations: DuplicatePolicy,
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            duplicate_operations: DuplicatePolicy::default(),
        }
    }
}

impl SchemaConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be > 0".into());
        }
        if self.max_complexity == 0 {
            return Err("max_complexity must be > 0".into());
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidConfig` on parse or validation failure.
    pub fn from_toml_str(source: &str) -> Result<Self, GraphQLError> {
        let config: Self =
            toml::from_str(source).map_err(|e| GraphQLError::InvalidConfig(e.to_string()))?;
        config.validate().map_err(GraphQLError::InvalidConfig)?;
        Ok(config)
    }
}
