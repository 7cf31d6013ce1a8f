//! # annograph-core
//!
//! Annotation metadata and type resolution for annograph.
//!
//! - [`metadata`] - key-value store of class, field and operation annotations
//! - [`declare`] - builders that populate the store once per declaration
//! - [`resolver`] - turns declared type references into resolved graph types
//! - [`registry`] - per-direction cache of resolved object and input types

pub mod annotation;
pub mod declare;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod resolver;
pub mod types;

pub use annotation::{
    Annotation, FieldAnnotation, OperationAnnotation, OperationKind, ParameterAnnotation,
    TypeAnnotation,
};
pub use declare::{ClassDecl, OperationDecl};
pub use error::{CoreError, Result};
pub use metadata::{Declaration, MetadataStore, Slot};
pub use registry::{CompositeType, ResolvedField, ResolvedType, TypeHandle, TypeRegistry};
pub use resolver::TypeResolver;
pub use types::{ClassId, Direction, Scalar, TypeRef};
