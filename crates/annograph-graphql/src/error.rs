//! Error types for schema assembly.
//!
//! Every error here is raised synchronously while registering operations or
//! building the schema, never at query time.

use std::fmt;

use annograph_core::{CoreError, OperationKind};

/// Errors that can occur while assembling a schema.
#[derive(Debug)]
pub enum GraphQLError {
    /// A declared type could not be resolved.
    Core(CoreError),

    /// An operation name is already taken under the same root.
    DuplicateOperationName {
        /// Root the operation was registered under.
        root: OperationKind,
        /// Operation name.
        name: String,
    },

    /// Two distinct types would be emitted under the same GraphQL name.
    DuplicateTypeName(String),

    /// The execution engine rejected the generated schema.
    SchemaBuildFailed(String),

    /// Invalid schema configuration.
    InvalidConfig(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(err) => write!(f, "{err}"),
            Self::DuplicateOperationName { root, name } => {
                write!(f, "{root} operation '{name}' is already registered")
            }
            Self::DuplicateTypeName(name) => {
                write!(f, "GraphQL type name '{name}' is used by more than one type")
            }
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::InvalidConfig(msg) => {
                write!(f, "Invalid schema configuration: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl GraphQLError {
    /// Returns a stable error code for diagnostics.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Core(CoreError::UnresolvableType { .. }) => "UNRESOLVABLE_TYPE",
            Self::Core(CoreError::DirectionMismatch { .. }) => "DIRECTION_MISMATCH",
            Self::Core(CoreError::MisplacedAnnotation { .. }) => "MISPLACED_ANNOTATION",
            Self::DuplicateOperationName { .. } => "DUPLICATE_OPERATION_NAME",
            Self::DuplicateTypeName(_) => "DUPLICATE_TYPE_NAME",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

impl From<CoreError> for GraphQLError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}
