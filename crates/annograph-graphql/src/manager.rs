//! Registration surface.
//!
//! [`Manager`] owns the metadata store, the type registry and the schema
//! assembler. Free functions and controller objects are bound to the
//! operation annotations declared for them, and the result is turned into a
//! [`SchemaDefinition`] or an executable async-graphql [`Schema`].

use std::sync::Arc;

use annograph_core::{
    Direction, MetadataStore, OperationAnnotation, ResolvedType, Slot, TypeRef, TypeRegistry,
    TypeResolver,
};
use async_graphql::dynamic::Schema;
use tracing::{debug, trace};

use crate::assembler::{SchemaAssembler, SchemaDefinition};
use crate::config::SchemaConfig;
use crate::error::GraphQLError;
use crate::handler::{Controller, DynHandler, InvocationHandler, MethodHandler};
use crate::schema::GraphSchemaBuilder;

/// Entry point for registering operations and building schemas.
///
/// `Ctx` is the request context handed to every handler. It is read from the
/// request data at execution time, so attach it with
/// `async_graphql::Request::data`.
pub struct Manager<Ctx = ()> {
    metadata: MetadataStore,
    registry: TypeRegistry,
    assembler: SchemaAssembler<Ctx>,
    config: SchemaConfig,
}

impl<Ctx> Default for Manager<Ctx> {
    fn default() -> Self {
        Self::with_metadata(MetadataStore::new())
    }
}

impl<Ctx> Manager<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager over an already populated metadata store.
    pub fn with_metadata(metadata: MetadataStore) -> Self {
        Self {
            metadata,
            registry: TypeRegistry::new(),
            assembler: SchemaAssembler::default(),
            config: SchemaConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SchemaConfig) -> Self {
        self.assembler.set_duplicate_policy(config.duplicate_operations);
        self.config = config;
        self
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    /// Number of registered operations across both roots.
    pub fn operation_count(&self) -> usize {
        self.assembler.operation_count()
    }

    /// Types resolved so far.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Resolves a type reference against the manager's metadata and registry.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error when the reference cannot be converted.
    pub fn resolve(&mut self, type_ref: &TypeRef, direction: Direction) -> Result<ResolvedType, GraphQLError> {
        let mut resolver = TypeResolver::new(&self.metadata, &mut self.registry);
        Ok(resolver.resolve(type_ref, direction)?)
    }

    /// Registers a function under every operation annotation declared for it.
    ///
    /// `name` defaults to `function`. A function may carry a query and a
    /// mutation annotation at once; both share the handler. A function without
    /// annotations registers nothing.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::DuplicateOperationName` when the name is taken
    /// and duplicates are rejected. Nothing is registered in that case.
    pub fn register_function(
        &mut self,
        function: &str,
        name: Option<&str>,
        handler: impl InvocationHandler<Ctx>,
    ) -> Result<(), GraphQLError> {
        let name = name.unwrap_or(function);
        let handler: DynHandler<Ctx> = Arc::new(handler);

        let annotations: Vec<OperationAnnotation> =
            self.metadata.function_operations(function).cloned().collect();
        if annotations.is_empty() {
            debug!(function = %function, "Function has no operation annotations, skipping");
            return Ok(());
        }

        // Check every root first so a rejected name leaves nothing behind.
        for annotation in &annotations {
            self.assembler.ensure_available(annotation.kind, name)?;
        }
        for annotation in annotations {
            self.assembler
                .register_operation(annotation.kind, name, annotation, Arc::clone(&handler))?;
        }
        Ok(())
    }

    /// Registers every annotated method of a controller.
    ///
    /// Each query or mutation method becomes an operation named after the
    /// method and bound to that method on `controller`.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::DuplicateOperationName` when a method name is
    /// taken and duplicates are rejected. No method is registered in that case.
    pub fn register_object<C>(&mut self, controller: Arc<C>) -> Result<(), GraphQLError>
    where
        C: Controller<Ctx>,
    {
        let class = controller.class_id();

        let mut methods = Vec::new();
        for slot in [Slot::Query, Slot::Mutation] {
            for (method, annotation) in self.metadata.members(&class, slot) {
                if let Some(operation) = annotation.as_operation() {
                    methods.push((method.to_string(), operation.clone()));
                }
            }
        }
        trace!(class = %class, methods = methods.len(), "Registering controller");

        for (method, annotation) in &methods {
            self.assembler.ensure_available(annotation.kind, method)?;
        }
        for (method, annotation) in methods {
            let handler: DynHandler<Ctx> = Arc::new(MethodHandler::new(Arc::clone(&controller), method.as_str()));
            self.assembler
                .register_operation(annotation.kind, method, annotation, handler)?;
        }
        Ok(())
    }

    /// Registers a single operation with an explicit annotation.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::DuplicateOperationName` when the name is taken
    /// and duplicates are rejected.
    pub fn register_operation(
        &mut self,
        name: &str,
        annotation: OperationAnnotation,
        handler: impl InvocationHandler<Ctx>,
    ) -> Result<(), GraphQLError> {
        self.assembler
            .register_operation(annotation.kind, name, annotation, Arc::new(handler))
    }

    /// Resolves every registered operation into a schema definition.
    ///
    /// Resolved types stay cached in the manager's registry, so repeated
    /// builds reuse them.
    ///
    /// # Errors
    ///
    /// Returns the first resolution or naming error.
    pub fn build(&mut self) -> Result<SchemaDefinition<Ctx>, GraphQLError> {
        let mut resolver = TypeResolver::new(&self.metadata, &mut self.registry);
        self.assembler.build(&mut resolver)
    }
}

impl<Ctx> Manager<Ctx>
where
    Ctx: Clone + Send + Sync + 'static,
{
    /// Builds an executable schema.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidConfig`, any error from [`Manager::build`],
    /// or `GraphQLError::SchemaBuildFailed`.
    pub fn create_schema(&mut self) -> Result<Schema, GraphQLError> {
        self.config.validate().map_err(GraphQLError::InvalidConfig)?;
        let definition = self.build()?;
        GraphSchemaBuilder::new(&definition, &self.config).build()
    }
}
