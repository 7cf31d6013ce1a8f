//! Type resolution engine.
//!
//! Converts a declared [`TypeRef`] into a [`ResolvedType`] for one direction.
//!
//! Composite types are built in two phases. Phase one registers the identity
//! of every class reached (with no fields yet); phase two fills the field set
//! of each queued type. A field that points back at a type that is still
//! pending simply receives its handle, so direct and mutual self-references
//! terminate.
//!
//! Resolution is all-or-nothing: if any part of a `resolve` call fails, the
//! registry is rolled back to its state before the call.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{CoreError, Result};
use crate::metadata::MetadataStore;
use crate::registry::{CompositeType, ResolvedField, ResolvedType, TypeHandle, TypeRegistry};
use crate::types::{ClassId, Direction, Scalar, TypeRef};

/// Resolves type references against a metadata store, caching composite
/// types in a registry.
pub struct TypeResolver<'a> {
    metadata: &'a MetadataStore,
    registry: &'a mut TypeRegistry,
}

impl<'a> TypeResolver<'a> {
    pub fn new(metadata: &'a MetadataStore, registry: &'a mut TypeRegistry) -> Self {
        Self { metadata, registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    /// Resolves `type_ref` for use in `direction`.
    ///
    /// # Errors
    ///
    /// - `CoreError::UnresolvableType` if the reference is not a known scalar,
    ///   a registered class name, an annotated class or a non-empty wrapper.
    /// - `CoreError::DirectionMismatch` if a class is only annotated for the
    ///   other direction.
    pub fn resolve(&mut self, type_ref: &TypeRef, direction: Direction) -> Result<ResolvedType> {
        let checkpoint = self.registry.checkpoint();

        let result = self
            .register(type_ref, direction)
            .and_then(|resolved| self.complete_pending().map(|()| resolved));

        if let Err(err) = &result {
            debug!(type_ref = %type_ref, %direction, error = %err, "Type resolution failed, rolling back");
            self.registry.rollback(checkpoint);
        }
        result
    }

    /// Resolves `type_ref` and wraps the result in a list when `is_list` is set.
    pub fn resolve_wrapped(
        &mut self,
        type_ref: &TypeRef,
        is_list: bool,
        direction: Direction,
    ) -> Result<ResolvedType> {
        let resolved = self.resolve(type_ref, direction)?;
        Ok(if is_list {
            ResolvedType::list_of(resolved)
        } else {
            resolved
        })
    }

    /// Phase one: maps the reference to a type, registering identities only.
    fn register(&mut self, type_ref: &TypeRef, direction: Direction) -> Result<ResolvedType> {
        match type_ref {
            TypeRef::Scalar(scalar) => Ok(ResolvedType::Scalar(*scalar)),
            TypeRef::Named(name) => {
                if let Some(scalar) = Scalar::from_name(name) {
                    return Ok(ResolvedType::Scalar(scalar));
                }
                self.registry
                    .lookup(&ClassId::new(name.as_str()), direction)
                    .map(ResolvedType::composite)
                    .ok_or_else(|| CoreError::unresolvable(type_ref, direction))
            }
            TypeRef::Class(class) => self.register_class(class, direction),
            TypeRef::Wrapper {
                list: Some(inner), ..
            } => Ok(ResolvedType::list_of(self.register(inner, direction)?)),
            TypeRef::Wrapper {
                list: None,
                ty: Some(inner),
            } => self.register(inner, direction),
            TypeRef::Wrapper {
                list: None,
                ty: None,
            } => Err(CoreError::unresolvable(type_ref, direction)),
        }
    }

    fn register_class(&mut self, class: &ClassId, direction: Direction) -> Result<ResolvedType> {
        if let Some(handle) = self.registry.lookup(class, direction) {
            trace!(class = %class, %direction, "Using cached type");
            return Ok(ResolvedType::composite(handle));
        }

        let Some(annotation) = self.metadata.type_annotation(class, direction) else {
            if self
                .metadata
                .type_annotation(class, direction.opposite())
                .is_some()
            {
                return Err(CoreError::direction_mismatch(class.clone(), direction));
            }
            return Err(CoreError::unresolvable(TypeRef::Class(class.clone()), direction));
        };

        let name = annotation
            .name
            .clone()
            .unwrap_or_else(|| class.to_string());
        debug!(class = %class, type_name = %name, %direction, "Registering type");

        let handle = self.registry.register(CompositeType::new(
            class.clone(),
            name,
            direction,
            annotation.description.clone(),
        ));
        Ok(ResolvedType::composite(handle))
    }

    /// Phase two: resolves the field sets of all queued types.
    fn complete_pending(&mut self) -> Result<()> {
        while let Some(handle) = self.registry.pop_pending() {
            let fields = self.resolve_fields(handle)?;
            trace!(
                handle = handle.index(),
                direction = %handle.direction(),
                field_count = fields.len(),
                "Completed type"
            );
            self.registry.complete(handle, fields);
        }
        Ok(())
    }

    fn resolve_fields(&mut self, handle: TypeHandle) -> Result<IndexMap<String, ResolvedField>> {
        let Some(class) = self.registry.get(handle).map(|ty| ty.class().clone()) else {
            return Ok(IndexMap::new());
        };
        let metadata = self.metadata;
        let direction = handle.direction();

        let mut fields = IndexMap::new();
        for (name, field) in metadata.fields(&class) {
            let resolved = self.register(&field.declared_type, direction)?;
            let ty = if field.is_list {
                ResolvedType::list_of(resolved)
            } else {
                resolved
            };
            fields.insert(
                name.to_string(),
                ResolvedField {
                    ty,
                    description: field.description.clone(),
                },
            );
        }
        Ok(fields)
    }
}
