//! Executable schema generation.
//!
//! ## Components
//!
//! - [`GraphSchemaBuilder`] - Builds an async-graphql dynamic schema from a
//!   resolved schema definition
//! - [`create_json_scalar`] - The `JSON` scalar shared by every schema

mod builder;
mod value;

pub use builder::GraphSchemaBuilder;
pub use value::{JSON_SCALAR, create_json_scalar};
