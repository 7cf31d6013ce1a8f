//! Declared type references and the built-in scalar table.
//!
//! A [`TypeRef`] is the unresolved description of what a field, parameter or
//! return value should become. It is only turned into a concrete graph type by
//! the [`TypeResolver`](crate::resolver::TypeResolver).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a type is used as an argument (input) or as a result (output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Returns the other direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in scalars every declaration may refer to by name.
///
/// Scalars are direction-agnostic: the same scalar serves input and output
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scalar {
    #[serde(rename = "ID")]
    Id,
    String,
    Float,
    Int,
    Boolean,
    #[serde(rename = "JSON")]
    Json,
}

impl Scalar {
    pub const ALL: [Scalar; 6] = [
        Scalar::Id,
        Scalar::String,
        Scalar::Float,
        Scalar::Int,
        Scalar::Boolean,
        Scalar::Json,
    ];

    /// The GraphQL type name of this scalar.
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::String => "String",
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Boolean => "Boolean",
            Self::Json => "JSON",
        }
    }

    /// Looks up a scalar by its recognized name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ID" => Some(Self::Id),
            "String" => Some(Self::String),
            "Float" => Some(Self::Float),
            "Int" => Some(Self::Int),
            "Boolean" => Some(Self::Boolean),
            "JSON" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.graphql_name())
    }
}

/// Stable identifier of a declared class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClassId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unresolved type of a field, parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRef {
    /// A scalar name (`"ID"`, `"String"`, ...) or the id of a class that has
    /// already been resolved in the requested direction.
    Named(String),
    /// A host primitive identity (string, number, boolean, structured data).
    Scalar(Scalar),
    /// A declared class, built from its annotations on first use.
    Class(ClassId),
    /// `{list, type}` wrapper. `list` wins when both are present.
    Wrapper {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<Box<TypeRef>>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<Box<TypeRef>>,
    },
}

impl TypeRef {
    pub const ID: &'static str = "ID";
    pub const STRING: &'static str = "String";
    pub const FLOAT: &'static str = "Float";
    pub const INT: &'static str = "Int";
    pub const BOOLEAN: &'static str = "Boolean";
    pub const JSON: &'static str = "JSON";

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn class(id: impl Into<ClassId>) -> Self {
        Self::Class(id.into())
    }

    /// `{list: inner}`
    pub fn list_of(inner: impl Into<TypeRef>) -> Self {
        Self::Wrapper {
            list: Some(Box::new(inner.into())),
            ty: None,
        }
    }

    /// `{type: inner}`
    pub fn of(inner: impl Into<TypeRef>) -> Self {
        Self::Wrapper {
            list: None,
            ty: Some(Box::new(inner.into())),
        }
    }
}

impl From<Scalar> for TypeRef {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<ClassId> for TypeRef {
    fn from(id: ClassId) -> Self {
        Self::Class(id)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Class(id) => write!(f, "class {id}"),
            Self::Wrapper { list, ty } => {
                f.write_str("{")?;
                if let Some(list) = list {
                    write!(f, "list: {list}")?;
                }
                if let Some(ty) = ty {
                    if list.is_some() {
                        f.write_str(", ")?;
                    }
                    write!(f, "type: {ty}")?;
                }
                f.write_str("}")
            }
        }
    }
}
