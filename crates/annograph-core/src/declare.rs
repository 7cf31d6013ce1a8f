//! Declaration builders.
//!
//! Explicit, once-per-declaration registration calls that populate a
//! [`MetadataStore`]. Every field and parameter type is stated explicitly.
//!
//! ```
//! use annograph_core::{ClassDecl, MetadataStore, OperationDecl, Scalar, TypeRef};
//!
//! let mut store = MetadataStore::new();
//! store
//!     .declare(
//!         ClassDecl::object("User")
//!             .field("id", Scalar::Id)
//!             .field("name", Scalar::String)
//!             .list_field("friends", TypeRef::class("User")),
//!     )
//!     .unwrap();
//! store
//!     .declare_function("users", OperationDecl::query(TypeRef::class("User")).list())
//!     .unwrap();
//! ```

use indexmap::IndexMap;

use crate::annotation::{
    FieldAnnotation, OperationAnnotation, OperationKind, ParameterAnnotation, TypeAnnotation,
};
use crate::error::Result;
use crate::metadata::{Declaration, MetadataStore};
use crate::types::{ClassId, TypeRef};

/// A class together with its type annotations and fields.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    class: ClassId,
    annotations: Vec<TypeAnnotation>,
    fields: Vec<(String, FieldAnnotation)>,
}

impl ClassDecl {
    fn with(class: impl Into<ClassId>, annotations: Vec<TypeAnnotation>) -> Self {
        Self {
            class: class.into(),
            annotations,
            fields: Vec::new(),
        }
    }

    /// An object (output) type.
    pub fn object(class: impl Into<ClassId>) -> Self {
        Self::with(class, vec![TypeAnnotation::output()])
    }

    /// An input type.
    pub fn input(class: impl Into<ClassId>) -> Self {
        Self::with(class, vec![TypeAnnotation::input()])
    }

    /// Both an object and an input type, named `{Class}Type` and `{Class}Input`.
    pub fn entity(class: impl Into<ClassId>) -> Self {
        let class = class.into();
        let annotations = vec![
            TypeAnnotation::output().named(format!("{class}Type")),
            TypeAnnotation::input().named(format!("{class}Input")),
        ];
        Self::with(class, annotations)
    }

    /// Data-model fields only, without marking the class as a type.
    pub fn fields_of(class: impl Into<ClassId>) -> Self {
        Self::with(class, Vec::new())
    }

    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// Sets the GraphQL name on every annotation that has none yet.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        for annotation in self.annotations.iter_mut().filter(|a| a.name.is_none()) {
            annotation.name = Some(name.clone());
        }
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        for annotation in &mut self.annotations {
            annotation.description = Some(description.clone());
        }
        self
    }

    #[must_use]
    pub fn field(self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.field_with(name, FieldAnnotation::new(ty))
    }

    #[must_use]
    pub fn list_field(self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.field_with(name, FieldAnnotation::list(ty))
    }

    #[must_use]
    pub fn field_with(mut self, name: impl Into<String>, annotation: FieldAnnotation) -> Self {
        self.fields.push((name.into(), annotation));
        self
    }
}

/// A query or mutation with its return type and parameters.
#[derive(Debug, Clone)]
pub struct OperationDecl {
    annotation: OperationAnnotation,
}

impl OperationDecl {
    pub fn new(kind: OperationKind, return_type: impl Into<TypeRef>) -> Self {
        Self {
            annotation: OperationAnnotation {
                kind,
                return_type: return_type.into(),
                is_list_return: false,
                parameters: IndexMap::new(),
                description: None,
            },
        }
    }

    pub fn query(return_type: impl Into<TypeRef>) -> Self {
        Self::new(OperationKind::Query, return_type)
    }

    pub fn mutation(return_type: impl Into<TypeRef>) -> Self {
        Self::new(OperationKind::Mutation, return_type)
    }

    /// Returns a list of the declared return type.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.annotation.is_list_return = true;
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.annotation.parameters.insert(
            name.into(),
            ParameterAnnotation {
                ty: ty.into(),
                is_list: false,
            },
        );
        self
    }

    #[must_use]
    pub fn list_param(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.annotation.parameters.insert(
            name.into(),
            ParameterAnnotation {
                ty: ty.into(),
                is_list: true,
            },
        );
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.annotation.description = Some(description.into());
        self
    }

    pub fn into_annotation(self) -> OperationAnnotation {
        self.annotation
    }
}

impl From<OperationDecl> for OperationAnnotation {
    fn from(decl: OperationDecl) -> Self {
        decl.annotation
    }
}

impl MetadataStore {
    /// Stores every annotation carried by a class declaration.
    pub fn declare(&mut self, decl: ClassDecl) -> Result<()> {
        let ClassDecl {
            class,
            annotations,
            fields,
        } = decl;

        for annotation in annotations {
            self.set_annotation(Declaration::Class(class.clone()), annotation, None)?;
        }
        for (name, field) in fields {
            self.set_annotation(Declaration::Class(class.clone()), field, Some(&name))?;
        }
        Ok(())
    }

    /// Annotates a free-standing function.
    pub fn declare_function(&mut self, function: impl Into<String>, decl: OperationDecl) -> Result<()> {
        self.set_annotation(Declaration::Function(function.into()), decl.annotation, None)
    }

    /// Annotates a method of a controller class.
    pub fn declare_method(
        &mut self,
        class: impl Into<ClassId>,
        method: &str,
        decl: OperationDecl,
    ) -> Result<()> {
        self.set_annotation(Declaration::Class(class.into()), decl.annotation, Some(method))
    }
}
