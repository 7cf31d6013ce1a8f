//! Schema assembly.
//!
//! Collects registered query and mutation operations and resolves their
//! return and parameter types into a [`SchemaDefinition`].

use std::collections::HashSet;
use std::sync::Arc;

use annograph_core::{
    CompositeType, Direction, OperationAnnotation, OperationKind, ResolvedType, Scalar,
    TypeHandle, TypeResolver,
};
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::config::DuplicatePolicy;
use crate::error::GraphQLError;
use crate::handler::{DynHandler, HandlerFuture, Parameters, RequestInfo};

/// An operation with its types resolved and its handler bound.
pub struct ResolvedOperation<Ctx> {
    pub return_type: ResolvedType,
    pub args: IndexMap<String, ResolvedType>,
    pub description: Option<String>,
    handler: DynHandler<Ctx>,
}

impl<Ctx: 'static> ResolvedOperation<Ctx> {
    pub fn handler(&self) -> &DynHandler<Ctx> {
        &self.handler
    }

    /// Calls the bound handler with parameters passed through unchanged.
    pub fn invoke(&self, parameters: Parameters, context: Option<Ctx>, info: RequestInfo) -> HandlerFuture {
        self.handler.invoke(parameters, context, info)
    }
}

/// The named operations of one root type.
pub struct RootOperations<Ctx> {
    kind: OperationKind,
    pub(crate) operations: IndexMap<String, ResolvedOperation<Ctx>>,
}

impl<Ctx> RootOperations<Ctx> {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Root type name (`Query` or `Mutation`).
    pub fn name(&self) -> &'static str {
        self.kind.root_name()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedOperation<Ctx>> {
        self.operations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedOperation<Ctx>)> {
        self.operations.iter().map(|(name, op)| (name.as_str(), op))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Fully resolved schema, ready to hand to the execution engine.
pub struct SchemaDefinition<Ctx> {
    /// Query root, omitted when no query is registered.
    pub query: Option<RootOperations<Ctx>>,
    /// Mutation root, omitted when no mutation is registered.
    pub mutation: Option<RootOperations<Ctx>>,
    output_types: Vec<CompositeType>,
    input_types: Vec<CompositeType>,
}

impl<Ctx> SchemaDefinition<Ctx> {
    /// The composite type behind `handle`.
    pub fn composite(&self, handle: TypeHandle) -> Option<&CompositeType> {
        self.types(handle.direction()).get(handle.index())
    }

    /// All composite types of one direction, indexed by handle.
    pub fn types(&self, direction: Direction) -> &[CompositeType] {
        match direction {
            Direction::Output => &self.output_types,
            Direction::Input => &self.input_types,
        }
    }

    pub fn roots(&self) -> impl Iterator<Item = &RootOperations<Ctx>> {
        self.query.iter().chain(self.mutation.iter())
    }
}

struct RegisteredOperation<Ctx> {
    annotation: OperationAnnotation,
    handler: DynHandler<Ctx>,
}

/// Collects operations and builds [`SchemaDefinition`]s from them.
pub struct SchemaAssembler<Ctx> {
    query: IndexMap<String, RegisteredOperation<Ctx>>,
    mutation: IndexMap<String, RegisteredOperation<Ctx>>,
    duplicates: DuplicatePolicy,
}

impl<Ctx> Default for SchemaAssembler<Ctx> {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl<Ctx> SchemaAssembler<Ctx> {
    pub fn new(duplicates: DuplicatePolicy) -> Self {
        Self {
            query: IndexMap::new(),
            mutation: IndexMap::new(),
            duplicates,
        }
    }

    pub fn set_duplicate_policy(&mut self, duplicates: DuplicatePolicy) {
        self.duplicates = duplicates;
    }

    fn root(&self, kind: OperationKind) -> &IndexMap<String, RegisteredOperation<Ctx>> {
        match kind {
            OperationKind::Query => &self.query,
            OperationKind::Mutation => &self.mutation,
        }
    }

    fn root_mut(&mut self, kind: OperationKind) -> &mut IndexMap<String, RegisteredOperation<Ctx>> {
        match kind {
            OperationKind::Query => &mut self.query,
            OperationKind::Mutation => &mut self.mutation,
        }
    }

    /// Adds an operation under the `kind` root.
    ///
    /// # Errors
    ///
    /// With [`DuplicatePolicy::Reject`], returns
    /// `GraphQLError::DuplicateOperationName` if `name` is taken. With
    /// [`DuplicatePolicy::Replace`], the new operation replaces the old one in
    /// place.
    pub fn register_operation(
        &mut self,
        kind: OperationKind,
        name: impl Into<String>,
        annotation: OperationAnnotation,
        handler: DynHandler<Ctx>,
    ) -> Result<(), GraphQLError> {
        let name = name.into();
        self.ensure_available(kind, &name)?;

        let root = self.root_mut(kind);
        if root.contains_key(&name) {
            warn!(root = %kind, operation = %name, "Replacing previously registered operation");
        }

        trace!(root = %kind, operation = %name, "Registering operation");
        root.insert(name, RegisteredOperation { annotation, handler });
        Ok(())
    }

    /// Checks that `name` can be registered under the `kind` root without
    /// touching the assembler.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::DuplicateOperationName` if `name` is taken and
    /// the policy is [`DuplicatePolicy::Reject`].
    pub fn ensure_available(&self, kind: OperationKind, name: &str) -> Result<(), GraphQLError> {
        if self.duplicates == DuplicatePolicy::Reject && self.root(kind).contains_key(name) {
            return Err(GraphQLError::DuplicateOperationName {
                root: kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn operation_count(&self) -> usize {
        self.query.len() + self.mutation.len()
    }

    /// Resolves every registered operation.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error, or `GraphQLError::DuplicateTypeName`
    /// when two distinct types end up with the same GraphQL name.
    pub fn build(&self, resolver: &mut TypeResolver<'_>) -> Result<SchemaDefinition<Ctx>, GraphQLError> {
        debug!(
            queries = self.query.len(),
            mutations = self.mutation.len(),
            "Assembling schema definition"
        );

        let query = Self::build_root(OperationKind::Query, &self.query, resolver)?;
        let mutation = Self::build_root(OperationKind::Mutation, &self.mutation, resolver)?;

        let registry = resolver.registry();
        let definition = SchemaDefinition {
            query,
            mutation,
            output_types: registry.types(Direction::Output).to_vec(),
            input_types: registry.types(Direction::Input).to_vec(),
        };
        check_type_names(&definition)?;

        debug!(
            output_types = definition.output_types.len(),
            input_types = definition.input_types.len(),
            "Schema definition assembled"
        );
        Ok(definition)
    }

    fn build_root(
        kind: OperationKind,
        registered: &IndexMap<String, RegisteredOperation<Ctx>>,
        resolver: &mut TypeResolver<'_>,
    ) -> Result<Option<RootOperations<Ctx>>, GraphQLError> {
        if registered.is_empty() {
            return Ok(None);
        }

        let mut operations = IndexMap::with_capacity(registered.len());
        for (name, op) in registered {
            let annotation = &op.annotation;
            let return_type = resolver.resolve_wrapped(
                &annotation.return_type,
                annotation.is_list_return,
                Direction::Output,
            )?;

            let mut args = IndexMap::with_capacity(annotation.parameters.len());
            for (param, declared) in &annotation.parameters {
                let ty = resolver.resolve_wrapped(&declared.ty, declared.is_list, Direction::Input)?;
                args.insert(param.clone(), ty);
            }

            trace!(root = %kind, operation = %name, args = args.len(), "Resolved operation");
            operations.insert(
                name.clone(),
                ResolvedOperation {
                    return_type,
                    args,
                    description: annotation.description.clone(),
                    handler: Arc::clone(&op.handler),
                },
            );
        }

        Ok(Some(RootOperations { kind, operations }))
    }
}

/// Object types, input types, scalars and roots share one name space.
///
/// `Query` is always reserved since the executable schema emits a Query root
/// even when no query is registered.
fn check_type_names<Ctx>(definition: &SchemaDefinition<Ctx>) -> Result<(), GraphQLError> {
    let mut seen: HashSet<&str> = Scalar::ALL.iter().map(|s| s.graphql_name()).collect();
    seen.insert(OperationKind::Query.root_name());
    seen.extend(definition.roots().map(|root| root.name()));

    for composite in definition.output_types.iter().chain(&definition.input_types) {
        if !seen.insert(composite.name()) {
            return Err(GraphQLError::DuplicateTypeName(composite.name().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use annograph_core::{ClassDecl, MetadataStore, OperationDecl, TypeRef, TypeRegistry};
    use serde_json::json;

    use crate::handler::handler_fn;

    fn noop() -> DynHandler<()> {
        Arc::new(handler_fn(|_parameters, _context: Option<()>, _info| async move {
            Ok(json!(null))
        }))
    }

    fn model() -> MetadataStore {
        let mut store = MetadataStore::new();
        store
            .declare(
                ClassDecl::object("UserType")
                    .field("id", TypeRef::named("ID"))
                    .field("name", TypeRef::named("String")),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_empty_roots_are_omitted() {
        let store = model();
        let mut registry = TypeRegistry::new();
        let mut resolver = TypeResolver::new(&store, &mut registry);

        let assembler = SchemaAssembler::<()>::default();
        let definition = assembler.build(&mut resolver).unwrap();
        assert!(definition.query.is_none());
        assert!(definition.mutation.is_none());
        assert_eq!(definition.roots().count(), 0);
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut assembler = SchemaAssembler::<()>::default();
        let op = OperationDecl::query(TypeRef::named("String")).into_annotation();

        assembler
            .register_operation(OperationKind::Query, "ping", op.clone(), noop())
            .unwrap();
        let err = assembler
            .register_operation(OperationKind::Query, "ping", op.clone(), noop())
            .unwrap_err();
        assert!(matches!(
            err,
            GraphQLError::DuplicateOperationName {
                root: OperationKind::Query,
                ..
            }
        ));

        // Same name under the other root is fine.
        assembler
            .register_operation(OperationKind::Mutation, "ping", op, noop())
            .unwrap();
        assert_eq!(assembler.operation_count(), 2);
    }

    #[test]
    fn test_duplicate_replaced_when_allowed() {
        let store = model();
        let mut registry = TypeRegistry::new();
        let mut resolver = TypeResolver::new(&store, &mut registry);

        let mut assembler = SchemaAssembler::<()>::new(DuplicatePolicy::Replace);
        let first = OperationDecl::query(TypeRef::named("String")).into_annotation();
        let second = OperationDecl::query(TypeRef::class("UserType")).list().into_annotation();
        assembler
            .register_operation(OperationKind::Query, "users", first, noop())
            .unwrap();
        assembler
            .register_operation(OperationKind::Query, "users", second, noop())
            .unwrap();

        let definition = assembler.build(&mut resolver).unwrap();
        let query = definition.query.as_ref().unwrap();
        assert_eq!(query.len(), 1);
        assert!(query.get("users").unwrap().return_type.is_list());
    }

    #[test]
    fn test_parameters_resolve_as_input() {
        let mut store = model();
        store
            .declare(ClassDecl::input("UserType").named("UserFilter").field("id", TypeRef::named("ID")))
            .unwrap();
        let mut registry = TypeRegistry::new();
        let mut resolver = TypeResolver::new(&store, &mut registry);

        let mut assembler = SchemaAssembler::<()>::default();
        let op = OperationDecl::query(TypeRef::class("UserType"))
            .list()
            .list_param("filter", TypeRef::class("UserType"))
            .param("limit", TypeRef::named("Int"))
            .into_annotation();
        assembler
            .register_operation(OperationKind::Query, "users", op, noop())
            .unwrap();

        let definition = assembler.build(&mut resolver).unwrap();
        let users = definition.query.as_ref().unwrap().get("users").unwrap();

        let filter = &users.args["filter"];
        assert!(filter.is_list());
        let filter_type = definition.composite(filter.handle().unwrap()).unwrap();
        assert_eq!(filter_type.direction(), Direction::Input);
        assert_eq!(filter_type.name(), "UserFilter");
        assert_eq!(users.args["limit"], ResolvedType::Scalar(Scalar::Int));

        let output = definition.composite(users.return_type.handle().unwrap()).unwrap();
        assert_eq!(output.name(), "UserType");
    }

    #[test]
    fn test_duplicate_type_names_rejected() {
        let mut store = model();
        // Same class as both object and input without distinct names.
        store
            .declare(ClassDecl::input("UserType").field("id", TypeRef::named("ID")))
            .unwrap();
        let mut registry = TypeRegistry::new();
        let mut resolver = TypeResolver::new(&store, &mut registry);

        let mut assembler = SchemaAssembler::<()>::default();
        let op = OperationDecl::mutation(TypeRef::class("UserType"))
            .param("user", TypeRef::class("UserType"))
            .into_annotation();
        assembler
            .register_operation(OperationKind::Mutation, "addUser", op, noop())
            .unwrap();

        let err = assembler.build(&mut resolver).err().unwrap();
        assert!(matches!(err, GraphQLError::DuplicateTypeName(name) if name == "UserType"));
    }

    #[test]
    fn test_unresolvable_return_type() {
        let store = model();
        let mut registry = TypeRegistry::new();
        let mut resolver = TypeResolver::new(&store, &mut registry);

        let mut assembler = SchemaAssembler::<()>::default();
        let op = OperationDecl::query(TypeRef::class("Missing")).into_annotation();
        assembler
            .register_operation(OperationKind::Query, "missing", op, noop())
            .unwrap();

        let err = assembler.build(&mut resolver).err().unwrap();
        assert_eq!(err.error_code(), "UNRESOLVABLE_TYPE");
    }

    #[test]
    fn test_invoke_passes_parameters_through() {
        let store = model();
        let mut registry = TypeRegistry::new();
        let mut resolver = TypeResolver::new(&store, &mut registry);

        let echo: DynHandler<()> = Arc::new(handler_fn(
            |parameters, _context: Option<()>, _info| async move { Ok(serde_json::Value::Object(parameters)) },
        ));
        let mut assembler = SchemaAssembler::<()>::default();
        let op = OperationDecl::query(TypeRef::named("JSON"))
            .param("input", TypeRef::named("JSON"))
            .into_annotation();
        assembler
            .register_operation(OperationKind::Query, "echo", op, echo)
            .unwrap();
        let definition = assembler.build(&mut resolver).unwrap();

        let mut parameters = Parameters::new();
        parameters.insert("input".into(), json!({"nested": [1, 2]}));
        let info = RequestInfo::new(OperationKind::Query, "echo");
        let operation = definition.query.as_ref().unwrap().get("echo").unwrap();

        let value = futures_util::FutureExt::now_or_never(operation.invoke(parameters.clone(), None, info))
            .unwrap()
            .unwrap();
        assert_eq!(value, serde_json::Value::Object(parameters));
    }

    #[test]
    fn test_query_name_reserved_without_queries() {
        let mut store = MetadataStore::new();
        store
            .declare(ClassDecl::object("Query").field("id", TypeRef::named("ID")))
            .unwrap();
        let mut registry = TypeRegistry::new();
        let mut resolver = TypeResolver::new(&store, &mut registry);

        let mut assembler = SchemaAssembler::<()>::default();
        let op = OperationDecl::mutation(TypeRef::class("Query")).into_annotation();
        assembler
            .register_operation(OperationKind::Mutation, "m", op, noop())
            .unwrap();

        let err = assembler.build(&mut resolver).err().unwrap();
        assert!(matches!(err, GraphQLError::DuplicateTypeName(name) if name == "Query"));
    }

    #[test]
    fn test_ensure_available_follows_policy() {
        let op = OperationDecl::query(TypeRef::named("String")).into_annotation();

        let mut assembler = SchemaAssembler::<()>::default();
        assembler
            .register_operation(OperationKind::Query, "ping", op.clone(), noop())
            .unwrap();
        assert!(assembler.ensure_available(OperationKind::Query, "ping").is_err());
        assert!(assembler.ensure_available(OperationKind::Mutation, "ping").is_ok());

        assembler.set_duplicate_policy(DuplicatePolicy::Replace);
        assert!(assembler.ensure_available(OperationKind::Query, "ping").is_ok());
    }
}
