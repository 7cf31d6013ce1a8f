//! # annograph-graphql
//!
//! Schema assembly for annotated classes and operations.
//!
//! Classes declare their GraphQL shape in an [`annograph_core::MetadataStore`].
//! Functions and controller objects are then registered with a [`Manager`],
//! which resolves every return and parameter type and hands out either a
//! [`SchemaDefinition`] or an executable async-graphql dynamic schema.
//!
//! ## Overview
//!
//! Handlers are opaque async callables. They receive the operation's
//! arguments as JSON, the request context attached to the GraphQL request,
//! and a [`RequestInfo`]. Whatever JSON they return is served through the
//! declared return type.
//!
//! ## Configuration
//!
//! ```toml
//! [graphql]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! duplicate_operations = "reject"
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`handler`] - Invocation handlers and controllers
//! - [`assembler`] - Operation registry and schema definitions
//! - [`manager`] - Registration surface
//! - [`schema`] - Executable schema generation
//! - [`error`] - Error types for schema assembly

pub mod assembler;
pub mod config;
pub mod error;
pub mod handler;
pub mod manager;
pub mod schema;

// Re-export main types
pub use assembler::{ResolvedOperation, RootOperations, SchemaAssembler, SchemaDefinition};
pub use config::{DuplicatePolicy, SchemaConfig};
pub use error::GraphQLError;
pub use handler::{
    Controller, DynHandler, HandlerError, HandlerFuture, HandlerResult, InvocationHandler, Parameters,
    RequestInfo, handler_fn,
};
pub use manager::Manager;
pub use schema::{GraphSchemaBuilder, JSON_SCALAR};

/// Result type for schema assembly.
pub type Result<T> = std::result::Result<T, GraphQLError>;
