//! Metadata store for declarative annotations.
//!
//! Annotations are keyed by `(declaration, member?, slot)`. The slot mirrors a
//! distinct metadata key, so one class may be both an object and an input
//! type and one function may be both a query and a mutation.
//!
//! Field annotations are kept in a per-class collection that preserves
//! first-seen insertion order; that order becomes the field order of the
//! generated type.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::annotation::{Annotation, FieldAnnotation, OperationAnnotation, TypeAnnotation};
use crate::error::{CoreError, Result};
use crate::types::{ClassId, Direction};

/// The thing an annotation is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Declaration {
    /// A data-model class or a controller class (members are its methods).
    Class(ClassId),
    /// A free-standing function, identified by its registered id.
    Function(String),
}

impl Declaration {
    pub fn class(id: impl Into<ClassId>) -> Self {
        Self::Class(id.into())
    }

    pub fn function(id: impl Into<String>) -> Self {
        Self::Function(id.into())
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(id) => write!(f, "class {id}"),
            Self::Function(id) => write!(f, "function {id}"),
        }
    }
}

/// Metadata key an annotation is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Type,
    Input,
    Field,
    Query,
    Mutation,
}

impl Slot {
    /// Slot holding the type annotation for `direction`.
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Output => Self::Type,
            Direction::Input => Self::Input,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "type",
            Self::Input => "input",
            Self::Field => "field",
            Self::Query => "query",
            Self::Mutation => "mutation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MetadataKey {
    declaration: Declaration,
    member: Option<String>,
    slot: Slot,
}

/// Key-value store of annotations.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: IndexMap<MetadataKey, Annotation>,
    /// Field collections, created the first time a class is annotated.
    fields: HashMap<ClassId, IndexMap<String, Annotation>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `annotation` to `declaration` (or to one of its members).
    ///
    /// Re-annotating the same slot replaces the previous annotation but keeps
    /// its original position.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MisplacedAnnotation` when the annotation kind does
    /// not fit the target: field annotations need a class member, type
    /// annotations need a class itself, and operation annotations need a
    /// function or a class member.
    pub fn set_annotation(
        &mut self,
        declaration: Declaration,
        annotation: impl Into<Annotation>,
        member: Option<&str>,
    ) -> Result<()> {
        let annotation = annotation.into();
        let slot = annotation.slot();

        match (&declaration, member, slot) {
            (Declaration::Class(class), Some(member), Slot::Field) => {
                trace!(class = %class, field = member, "Annotating field");
                self.fields
                    .entry(class.clone())
                    .or_default()
                    .insert(member.to_string(), annotation);
                return Ok(());
            }
            (Declaration::Class(class), None, Slot::Type | Slot::Input) => {
                trace!(class = %class, %slot, "Annotating class");
                self.fields.entry(class.clone()).or_default();
            }
            (Declaration::Class(_), Some(_), Slot::Query | Slot::Mutation)
            | (Declaration::Function(_), None, Slot::Query | Slot::Mutation) => {}
            _ => {
                let target = match member {
                    Some(member) => format!("{declaration} member {member}"),
                    None => declaration.to_string(),
                };
                return Err(CoreError::misplaced(target, slot));
            }
        }

        let key = MetadataKey {
            declaration,
            member: member.map(str::to_string),
            slot,
        };
        self.entries.insert(key, annotation);
        Ok(())
    }

    /// Retrieves the annotation stored in `slot`, if any.
    pub fn get_annotation(
        &self,
        declaration: &Declaration,
        slot: Slot,
        member: Option<&str>,
    ) -> Option<&Annotation> {
        if slot == Slot::Field {
            let (Declaration::Class(class), Some(member)) = (declaration, member) else {
                return None;
            };
            return self.fields.get(class)?.get(member);
        }

        let key = MetadataKey {
            declaration: declaration.clone(),
            member: member.map(str::to_string),
            slot,
        };
        self.entries.get(&key)
    }

    pub fn has_annotation(
        &self,
        declaration: &Declaration,
        slot: Slot,
        member: Option<&str>,
    ) -> bool {
        self.get_annotation(declaration, slot, member).is_some()
    }

    /// The type annotation of `class` for `direction`.
    pub fn type_annotation(&self, class: &ClassId, direction: Direction) -> Option<&TypeAnnotation> {
        self.get_annotation(
            &Declaration::Class(class.clone()),
            Slot::for_direction(direction),
            None,
        )
        .and_then(Annotation::as_type)
    }

    /// Whether a field collection exists for `class`.
    pub fn has_fields(&self, class: &ClassId) -> bool {
        self.fields.contains_key(class)
    }

    /// Annotated fields of `class` in declaration order.
    pub fn fields<'a>(
        &'a self,
        class: &'a ClassId,
    ) -> impl Iterator<Item = (&'a str, &'a FieldAnnotation)> + 'a {
        self.fields
            .get(class)
            .into_iter()
            .flat_map(|fields| fields.iter())
            .filter_map(|(name, annotation)| match annotation {
                Annotation::Field(field) => Some((name.as_str(), field)),
                _ => None,
            })
    }

    /// Members of `class` annotated in `slot`, in declaration order.
    pub fn members<'a>(
        &'a self,
        class: &'a ClassId,
        slot: Slot,
    ) -> impl Iterator<Item = (&'a str, &'a Annotation)> + 'a {
        self.entries.iter().filter_map(move |(key, annotation)| {
            match (&key.declaration, key.member.as_deref()) {
                (Declaration::Class(id), Some(member)) if id == class && key.slot == slot => {
                    Some((member, annotation))
                }
                _ => None,
            }
        })
    }

    /// Query or mutation annotations carried by a function.
    pub fn function_operations<'a>(
        &'a self,
        function: &'a str,
    ) -> impl Iterator<Item = &'a OperationAnnotation> + 'a {
        let declaration = Declaration::function(function);
        [Slot::Query, Slot::Mutation]
            .into_iter()
            .filter_map(move |slot| self.get_annotation(&declaration, slot, None))
            .filter_map(Annotation::as_operation)
    }

    /// Number of stored annotations, field annotations included.
    pub fn len(&self) -> usize {
        self.entries.len() + self.fields.values().map(IndexMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::OperationKind;
    use crate::types::{Scalar, TypeRef};

    fn user() -> Declaration {
        Declaration::class("User")
    }

    #[test]
    fn test_set_and_get_type_annotation() {
        let mut store = MetadataStore::new();
        store
            .set_annotation(user(), TypeAnnotation::output().named("UserType"), None)
            .unwrap();

        assert!(store.has_annotation(&user(), Slot::Type, None));
        assert!(!store.has_annotation(&user(), Slot::Input, None));

        let annotation = store.type_annotation(&ClassId::new("User"), Direction::Output);
        assert_eq!(annotation.unwrap().name.as_deref(), Some("UserType"));
    }

    #[test]
    fn test_type_annotation_initializes_field_collection() {
        let mut store = MetadataStore::new();
        let class = ClassId::new("User");
        assert!(!store.has_fields(&class));

        store
            .set_annotation(user(), TypeAnnotation::output(), None)
            .unwrap();
        assert!(store.has_fields(&class));
        assert_eq!(store.fields(&class).count(), 0);
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut store = MetadataStore::new();
        for name in ["name", "id", "friends", "data"] {
            store
                .set_annotation(user(), FieldAnnotation::new(Scalar::String), Some(name))
                .unwrap();
        }
        // Replacing keeps the original position.
        store
            .set_annotation(user(), FieldAnnotation::new(Scalar::Id), Some("name"))
            .unwrap();

        let class = ClassId::new("User");
        let names: Vec<_> = store.fields(&class).map(|(name, _)| name).collect();
        assert_eq!(names, ["name", "id", "friends", "data"]);

        let (_, first) = store.fields(&class).next().unwrap();
        assert_eq!(first.declared_type, TypeRef::Scalar(Scalar::Id));
        assert!(store.has_annotation(&user(), Slot::Field, Some("data")));
    }

    #[test]
    fn test_misplaced_annotations() {
        let mut store = MetadataStore::new();

        let err = store
            .set_annotation(
                Declaration::function("users"),
                FieldAnnotation::new(Scalar::Id),
                Some("id"),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::MisplacedAnnotation { slot: Slot::Field, .. }));

        let err = store
            .set_annotation(user(), FieldAnnotation::new(Scalar::Id), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MisplacedAnnotation { .. }));

        let err = store
            .set_annotation(user(), TypeAnnotation::output(), Some("id"))
            .unwrap_err();
        assert!(matches!(err, CoreError::MisplacedAnnotation { slot: Slot::Type, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_members_and_function_operations() {
        let mut store = MetadataStore::new();
        let query = OperationAnnotation {
            kind: OperationKind::Query,
            return_type: TypeRef::named("String"),
            is_list_return: false,
            parameters: IndexMap::new(),
            description: None,
        };
        let mutation = OperationAnnotation {
            kind: OperationKind::Mutation,
            ..query.clone()
        };

        let controller = Declaration::class("Controller");
        store
            .set_annotation(controller.clone(), query.clone(), Some("users"))
            .unwrap();
        store
            .set_annotation(controller.clone(), mutation.clone(), Some("addUser"))
            .unwrap();
        store
            .set_annotation(controller, query.clone(), Some("user"))
            .unwrap();

        let class = ClassId::new("Controller");
        let queries: Vec<_> = store.members(&class, Slot::Query).map(|(m, _)| m).collect();
        assert_eq!(queries, ["users", "user"]);
        let mutations: Vec<_> = store.members(&class, Slot::Mutation).map(|(m, _)| m).collect();
        assert_eq!(mutations, ["addUser"]);

        let function = Declaration::function("ping");
        store.set_annotation(function.clone(), query, None).unwrap();
        store.set_annotation(function, mutation, None).unwrap();
        let kinds: Vec<_> = store.function_operations("ping").map(|op| op.kind).collect();
        assert_eq!(kinds, [OperationKind::Query, OperationKind::Mutation]);
        assert_eq!(store.function_operations("missing").count(), 0);
    }
}
