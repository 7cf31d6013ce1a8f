//! Registry of resolved composite types.
//!
//! One arena per direction. A class gets at most one handle per direction;
//! handles are never reused or evicted, so handle equality is type identity.
//! Types are registered with an empty field set first and completed later,
//! which lets self-referential classes point at their own handle.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

use crate::types::{ClassId, Direction, Scalar};

/// Identity of a registered object or input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle {
    direction: Direction,
    index: usize,
}

impl TypeHandle {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// A concrete, direction-specific graph type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    Scalar(Scalar),
    Object(TypeHandle),
    InputObject(TypeHandle),
    List(Box<ResolvedType>),
}

impl ResolvedType {
    /// The object or input type behind `handle`.
    pub fn composite(handle: TypeHandle) -> Self {
        match handle.direction {
            Direction::Output => Self::Object(handle),
            Direction::Input => Self::InputObject(handle),
        }
    }

    /// Wraps `inner` in a list unless it already is one.
    pub fn list_of(inner: ResolvedType) -> Self {
        match inner {
            list @ Self::List(_) => list,
            other => Self::List(Box::new(other)),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The composite handle, looking through lists.
    pub fn handle(&self) -> Option<TypeHandle> {
        match self {
            Self::Scalar(_) => None,
            Self::Object(handle) | Self::InputObject(handle) => Some(*handle),
            Self::List(inner) => inner.handle(),
        }
    }
}

/// A resolved field of a composite type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub ty: ResolvedType,
    pub description: Option<String>,
}

/// An object or input type built from a class declaration.
#[derive(Debug, Clone)]
pub struct CompositeType {
    class: ClassId,
    name: String,
    direction: Direction,
    description: Option<String>,
    /// `None` until the field set has been resolved.
    fields: Option<IndexMap<String, ResolvedField>>,
}

impl CompositeType {
    pub fn new(
        class: ClassId,
        name: impl Into<String>,
        direction: Direction,
        description: Option<String>,
    ) -> Self {
        Self {
            class,
            name: name.into(),
            direction,
            description,
            fields: None,
        }
    }

    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// GraphQL type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.fields.is_some()
    }

    /// Resolved fields in declaration order. Empty while pending.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ResolvedField)> {
        self.fields
            .iter()
            .flat_map(|fields| fields.iter())
            .map(|(name, field)| (name.as_str(), field))
    }

    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.as_ref()?.get(name)
    }
}

#[derive(Debug, Default)]
struct Arena {
    by_class: HashMap<ClassId, usize>,
    types: Vec<CompositeType>,
}

/// Registry position used to undo a failed resolution.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    input: usize,
    output: usize,
}

/// Registry for tracking resolved composite types.
///
/// Prevents duplicate type generation and handles circular references.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    input: Arena,
    output: Arena,
    /// Types registered but not yet given their fields.
    pending: VecDeque<TypeHandle>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn arena(&self, direction: Direction) -> &Arena {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    fn arena_mut(&mut self, direction: Direction) -> &mut Arena {
        match direction {
            Direction::Input => &mut self.input,
            Direction::Output => &mut self.output,
        }
    }

    /// Handle of `class` in `direction`, if already registered.
    pub fn lookup(&self, class: &ClassId, direction: Direction) -> Option<TypeHandle> {
        self.arena(direction)
            .by_class
            .get(class)
            .map(|&index| TypeHandle { direction, index })
    }

    pub fn get(&self, handle: TypeHandle) -> Option<&CompositeType> {
        self.arena(handle.direction).types.get(handle.index)
    }

    /// All types of one direction, indexed by handle.
    pub fn types(&self, direction: Direction) -> &[CompositeType] {
        &self.arena(direction).types
    }

    pub fn len(&self) -> usize {
        self.input.types.len() + self.output.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers the identity of a new type and queues it for completion.
    ///
    /// Returns the existing handle if the class is already registered.
    pub(crate) fn register(&mut self, composite: CompositeType) -> TypeHandle {
        let direction = composite.direction;
        if let Some(handle) = self.lookup(&composite.class, direction) {
            return handle;
        }

        let arena = self.arena_mut(direction);
        let index = arena.types.len();
        arena.by_class.insert(composite.class.clone(), index);
        arena.types.push(composite);

        let handle = TypeHandle { direction, index };
        self.pending.push_back(handle);
        handle
    }

    pub(crate) fn pop_pending(&mut self) -> Option<TypeHandle> {
        self.pending.pop_front()
    }

    pub(crate) fn complete(&mut self, handle: TypeHandle, fields: IndexMap<String, ResolvedField>) {
        if let Some(composite) = self.arena_mut(handle.direction).types.get_mut(handle.index) {
            composite.fields = Some(fields);
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            input: self.input.types.len(),
            output: self.output.types.len(),
        }
    }

    /// Drops every type registered after `checkpoint`.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        for (arena, len) in [
            (&mut self.input, checkpoint.input),
            (&mut self.output, checkpoint.output),
        ] {
            arena.types.truncate(len);
            arena.by_class.retain(|_, index| *index < len);
        }
        self.pending.clear();
    }
}
