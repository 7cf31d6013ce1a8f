use thiserror::Error;

use crate::metadata::Slot;
use crate::types::{ClassId, Direction};

/// Core error types for annotation handling and type resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("could not convert {type_ref} to an {direction} type")]
    UnresolvableType {
        type_ref: String,
        direction: Direction,
    },

    #[error("class {class} is not declared as an {requested} type")]
    DirectionMismatch {
        class: ClassId,
        requested: Direction,
    },

    #[error("{slot} annotation cannot be attached to {target}")]
    MisplacedAnnotation { target: String, slot: Slot },
}

impl CoreError {
    /// Create a new UnresolvableType error
    pub fn unresolvable(type_ref: impl ToString, direction: Direction) -> Self {
        Self::UnresolvableType {
            type_ref: type_ref.to_string(),
            direction,
        }
    }

    /// Create a new DirectionMismatch error
    pub fn direction_mismatch(class: ClassId, requested: Direction) -> Self {
        Self::DirectionMismatch { class, requested }
    }

    /// Create a new MisplacedAnnotation error
    pub fn misplaced(target: impl Into<String>, slot: Slot) -> Self {
        Self::MisplacedAnnotation {
            target: target.into(),
            slot,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::unresolvable("Unknown", Direction::Output);
        assert_eq!(err.to_string(), "could not convert Unknown to an output type");

        let err = CoreError::direction_mismatch(ClassId::new("UserInput"), Direction::Output);
        assert_eq!(
            err.to_string(),
            "class UserInput is not declared as an output type"
        );

        let err = CoreError::misplaced("function users", Slot::Field);
        assert_eq!(
            err.to_string(),
            "field annotation cannot be attached to function users"
        );
    }
}
