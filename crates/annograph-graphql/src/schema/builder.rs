//! Executable schema builder.
//!
//! Turns a [`SchemaDefinition`] into an async-graphql dynamic [`Schema`]. Each
//! composite type becomes an `Object` or `InputObject`, and each operation
//! becomes a root field whose resolver forwards to the bound handler.

use std::sync::Arc;

use annograph_core::{Direction, OperationKind, ResolvedType};
use async_graphql::Value;
use async_graphql::dynamic::{
    Field, FieldFuture, InputObject, InputValue, Object, Schema, SchemaBuilder, TypeRef,
};
use tracing::{debug, trace, warn};

use crate::assembler::{ResolvedOperation, RootOperations, SchemaDefinition};
use crate::config::SchemaConfig;
use crate::error::GraphQLError;
use crate::handler::RequestInfo;
use crate::schema::value::{collect_parameters, create_json_scalar, extract_field, json_to_graphql_value};

/// Builds an executable schema from a resolved definition.
///
/// # Example
///
/// ```ignore
/// let definition = manager.build()?;
/// let schema = GraphSchemaBuilder::new(&definition, &SchemaConfig::default()).build()?;
/// ```
pub struct GraphSchemaBuilder<'a, Ctx> {
    definition: &'a SchemaDefinition<Ctx>,
    config: &'a SchemaConfig,
}

impl<'a, Ctx> GraphSchemaBuilder<'a, Ctx>
where
    Ctx: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(definition: &'a SchemaDefinition<Ctx>, config: &'a SchemaConfig) -> Self {
        Self { definition, config }
    }

    /// Builds the GraphQL schema.
    ///
    /// When no query is registered the Query root carries a single `_version`
    /// field. The Mutation root is left out entirely when empty.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` if async-graphql rejects the
    /// generated types.
    pub fn build(&self) -> Result<Schema, GraphQLError> {
        debug!("Starting GraphQL schema build");

        let mutation_name = self.definition.mutation.as_ref().map(RootOperations::name);
        let mut schema_builder = Schema::build(OperationKind::Query.root_name(), mutation_name, None);

        schema_builder = schema_builder.register(create_json_scalar());
        schema_builder = self.register_output_types(schema_builder)?;
        schema_builder = self.register_input_types(schema_builder)?;

        let query = match &self.definition.query {
            Some(root) => self.build_root(root)?,
            None => version_only_query(),
        };
        schema_builder = schema_builder.register(query);

        if let Some(root) = &self.definition.mutation {
            schema_builder = schema_builder.register(self.build_root(root)?);
        }

        // Configure limits
        let mut schema_builder = schema_builder.limit_depth(self.config.max_depth);
        schema_builder = schema_builder.limit_complexity(self.config.max_complexity);

        if !self.config.introspection {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        debug!("GraphQL schema build complete");
        Ok(schema)
    }

    fn type_ref(&self, ty: &ResolvedType) -> Result<TypeRef, GraphQLError> {
        Ok(match ty {
            ResolvedType::Scalar(scalar) => TypeRef::named(scalar.graphql_name()),
            ResolvedType::Object(handle) | ResolvedType::InputObject(handle) => {
                let composite = self.definition.composite(*handle).ok_or_else(|| {
                    GraphQLError::SchemaBuildFailed(format!(
                        "no {} type registered at index {}",
                        handle.direction(),
                        handle.index()
                    ))
                })?;
                TypeRef::named(composite.name())
            }
            ResolvedType::List(inner) => TypeRef::List(Box::new(self.type_ref(inner)?)),
        })
    }

    fn register_output_types(&self, mut builder: SchemaBuilder) -> Result<SchemaBuilder, GraphQLError> {
        for composite in self.definition.types(Direction::Output) {
            trace!(type_name = %composite.name(), "Registering object type");
            let mut obj = Object::new(composite.name());
            if let Some(description) = composite.description() {
                obj = obj.description(description);
            }

            let mut has_fields = false;
            for (name, field) in composite.fields() {
                has_fields = true;
                let key = name.to_string();
                let mut gql_field = Field::new(name, self.type_ref(&field.ty)?, move |ctx| {
                    let key = key.clone();
                    FieldFuture::new(async move { extract_field(&ctx, &key) })
                });
                if let Some(description) = &field.description {
                    gql_field = gql_field.description(description);
                }
                obj = obj.field(gql_field);
            }

            // GraphQL requires at least one field per type
            if !has_fields {
                trace!(type_name = %composite.name(), "No fields declared, adding placeholder field");
                obj = obj.field(
                    Field::new("_placeholder", TypeRef::named(TypeRef::STRING), |_ctx| {
                        FieldFuture::new(async { Ok(None::<Value>) })
                    })
                    .description("Placeholder field - type has no declared fields"),
                );
            }

            builder = builder.register(obj);
        }
        Ok(builder)
    }

    fn register_input_types(&self, mut builder: SchemaBuilder) -> Result<SchemaBuilder, GraphQLError> {
        for composite in self.definition.types(Direction::Input) {
            trace!(type_name = %composite.name(), "Registering input type");
            let mut input = InputObject::new(composite.name());
            if let Some(description) = composite.description() {
                input = input.description(description);
            }

            let mut has_fields = false;
            for (name, field) in composite.fields() {
                has_fields = true;
                let mut value = InputValue::new(name, self.type_ref(&field.ty)?);
                if let Some(description) = &field.description {
                    value = value.description(description);
                }
                input = input.field(value);
            }

            if !has_fields {
                input = input.field(
                    InputValue::new("_placeholder", TypeRef::named(TypeRef::STRING))
                        .description("Placeholder field - type has no declared fields"),
                );
            }

            builder = builder.register(input);
        }
        Ok(builder)
    }

    fn build_root(&self, root: &RootOperations<Ctx>) -> Result<Object, GraphQLError> {
        let mut obj = Object::new(root.name());
        for (name, operation) in root.iter() {
            obj = obj.field(self.root_field(root.kind(), name, operation)?);
        }
        debug!(root = root.name(), fields = root.len(), "Built root type");
        Ok(obj)
    }

    fn root_field(
        &self,
        kind: OperationKind,
        name: &str,
        operation: &ResolvedOperation<Ctx>,
    ) -> Result<Field, GraphQLError> {
        let handler = Arc::clone(operation.handler());

        let mut field = Field::new(name, self.type_ref(&operation.return_type)?, move |ctx| {
            let handler = Arc::clone(&handler);
            FieldFuture::new(async move {
                let parameters = collect_parameters(&ctx)?;
                let context = ctx.data_opt::<Ctx>().cloned();
                let info = RequestInfo::new(kind, ctx.field().name());

                match handler.invoke(parameters, context, info).await {
                    Ok(serde_json::Value::Null) => Ok(None),
                    Ok(value) => Ok(Some(json_to_graphql_value(value))),
                    Err(err) => {
                        warn!(root = %kind, field = %ctx.field().name(), error = %err, "Handler failed");
                        Err(async_graphql::Error::new(err.message()))
                    }
                }
            })
        });

        for (arg, ty) in &operation.args {
            field = field.argument(InputValue::new(arg, self.type_ref(ty)?));
        }
        if let Some(description) = &operation.description {
            field = field.description(description);
        }
        Ok(field)
    }
}

fn version_only_query() -> Object {
    Object::new(OperationKind::Query.root_name()).field(
        Field::new("_version", TypeRef::named_nn(TypeRef::STRING), |_| {
            FieldFuture::new(async { Ok(Some(Value::String(env!("CARGO_PKG_VERSION").to_string()))) })
        })
        .description("API version"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Manager;
    use crate::handler::handler_fn;
    use annograph_core::{ClassDecl, OperationDecl, TypeRef as DeclaredType};
    use serde_json::json;

    fn manager() -> Manager {
        let mut manager = Manager::new();
        manager
            .metadata_mut()
            .declare(
                ClassDecl::object("UserType")
                    .description("A user")
                    .field("id", DeclaredType::named("ID"))
                    .list_field("tags", DeclaredType::named("String")),
            )
            .unwrap();
        manager
            .metadata_mut()
            .declare(ClassDecl::object("Empty"))
            .unwrap();
        manager
            .metadata_mut()
            .declare_function(
                "users",
                OperationDecl::query(DeclaredType::class("UserType"))
                    .list()
                    .param("limit", DeclaredType::named("Int")),
            )
            .unwrap();
        manager
            .metadata_mut()
            .declare_function("empty", OperationDecl::query(DeclaredType::class("Empty")))
            .unwrap();
        manager
            .register_function(
                "users",
                None,
                handler_fn(|_parameters, _context: Option<()>, _info| async move {
                    Ok(json!([{"id": "1", "tags": ["a"]}]))
                }),
            )
            .unwrap();
        manager
            .register_function(
                "empty",
                None,
                handler_fn(|_parameters, _context: Option<()>, _info| async move { Ok(json!({})) }),
            )
            .unwrap();
        manager
    }

    #[test]
    fn test_sdl_contains_types() {
        let mut manager = manager();
        let definition = manager.build().unwrap();
        let schema = GraphSchemaBuilder::new(&definition, &SchemaConfig::default())
            .build()
            .unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("type UserType"));
        assert!(sdl.contains("users(limit: Int): [UserType]"));
        assert!(sdl.contains("tags: [String]"));
        assert!(sdl.contains("_placeholder"), "Empty type needs a placeholder field");
        assert!(!sdl.contains("type Mutation"));
    }

    #[test]
    fn test_version_query_when_no_operations() {
        let mut manager = Manager::<()>::new();
        let definition = manager.build().unwrap();
        let schema = GraphSchemaBuilder::new(&definition, &SchemaConfig::default())
            .build()
            .unwrap();
        let sdl = schema.sdl();
        assert!(sdl.contains("_version"));
        assert!(!sdl.contains("type Mutation"));
    }

    #[test]
    fn test_type_ref_wraps_lists_once() {
        let mut manager = manager();
        let definition = manager.build().unwrap();
        let config = SchemaConfig::default();
        let builder = GraphSchemaBuilder::new(&definition, &config);

        let users = definition.query.as_ref().unwrap().get("users").unwrap();
        assert_eq!(builder.type_ref(&users.return_type).unwrap().to_string(), "[UserType]");
        assert_eq!(builder.type_ref(&users.args["limit"]).unwrap().to_string(), "Int");
    }

    #[test]
    fn test_unknown_handle_fails_build() {
        let mut manager = manager();
        let mut definition = manager.build().unwrap();

        // A handle from another registry that is out of range here.
        let mut other = Manager::<()>::new();
        for class in ["A", "B", "C"] {
            other
                .metadata_mut()
                .declare(ClassDecl::object(class).field("id", DeclaredType::named("ID")))
                .unwrap();
        }
        let mut foreign = None;
        for class in ["A", "B", "C"] {
            foreign = Some(other.resolve(&DeclaredType::class(class), Direction::Output).unwrap());
        }
        let foreign = foreign.unwrap();
        assert!(definition.composite(foreign.handle().unwrap()).is_none());

        definition
            .query
            .as_mut()
            .unwrap()
            .operations
            .get_mut("users")
            .unwrap()
            .return_type = foreign;

        let err = GraphSchemaBuilder::new(&definition, &SchemaConfig::default())
            .build()
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "SCHEMA_BUILD_FAILED");
    }
}
