//! Declarative annotation records.
//!
//! Annotations describe the intended schema role of a class, a class member or
//! a function. They are plain data: nothing is resolved until schema build.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metadata::Slot;
use crate::types::{Direction, TypeRef};

/// Marks a class as an object (output) or input type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAnnotation {
    /// GraphQL type name. Defaults to the class id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TypeAnnotation {
    pub fn output() -> Self {
        Self {
            name: None,
            direction: Direction::Output,
            description: None,
        }
    }

    pub fn input() -> Self {
        Self {
            name: None,
            direction: Direction::Input,
            description: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Declared type of one class member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnnotation {
    pub declared_type: TypeRef,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldAnnotation {
    pub fn new(declared_type: impl Into<TypeRef>) -> Self {
        Self {
            declared_type: declared_type.into(),
            is_list: false,
            description: None,
        }
    }

    pub fn list(declared_type: impl Into<TypeRef>) -> Self {
        Self {
            is_list: true,
            ..Self::new(declared_type)
        }
    }
}

/// Root an operation is exposed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// Name of the root object type.
    pub fn root_name(self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
        }
    }

    pub(crate) fn slot(self) -> Slot {
        match self {
            Self::Query => Slot::Query,
            Self::Mutation => Slot::Mutation,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Mutation => f.write_str("mutation"),
        }
    }
}

/// Declared type of one operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterAnnotation {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_list: bool,
}

/// Marks a function or method as a query or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationAnnotation {
    pub kind: OperationKind,
    pub return_type: TypeRef,
    #[serde(default)]
    pub is_list_return: bool,
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Any annotation the metadata store can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Type(TypeAnnotation),
    Field(FieldAnnotation),
    Operation(OperationAnnotation),
}

impl Annotation {
    /// The storage slot this annotation occupies.
    pub fn slot(&self) -> Slot {
        match self {
            Self::Type(ty) => match ty.direction {
                Direction::Output => Slot::Type,
                Direction::Input => Slot::Input,
            },
            Self::Field(_) => Slot::Field,
            Self::Operation(op) => op.kind.slot(),
        }
    }

    pub fn as_type(&self) -> Option<&TypeAnnotation> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_operation(&self) -> Option<&OperationAnnotation> {
        match self {
            Self::Operation(op) => Some(op),
            _ => None,
        }
    }
}

impl From<TypeAnnotation> for Annotation {
    fn from(annotation: TypeAnnotation) -> Self {
        Self::Type(annotation)
    }
}

impl From<FieldAnnotation> for Annotation {
    fn from(annotation: FieldAnnotation) -> Self {
        Self::Field(annotation)
    }
}

impl From<OperationAnnotation> for Annotation {
    fn from(annotation: OperationAnnotation) -> Self {
        Self::Operation(annotation)
    }
}
