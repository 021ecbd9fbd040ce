//! Registration errors.
//!
//! Every variant is a programmer error in the type definitions themselves,
//! reported when the definition is registered rather than when it is used.

use std::fmt;

/// Error returned by [`TypeRegistry`](crate::TypeRegistry) registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationError {
    /// The name is already registered with a structurally different definition.
    Conflict { name: String },
    /// A referenced type id does not belong to this registry.
    UnknownType { index: usize },
    /// A referenced contract id does not belong to this registry.
    UnknownContract { index: usize },
    /// A reserved type is stored by value before its definition exists.
    IncompleteType { name: String, used_by: String },
    /// Two methods with the same name in one method set.
    DuplicateMethod { type_name: String, method: String },
    /// Interface types take their methods from their contract.
    MethodsOnInterface { type_name: String },
    /// Map keys must be comparable.
    UncomparableMapKey { map: String, key: String },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { name } => {
                write!(f, "`{name}` is already registered with a different definition")
            }
            Self::UnknownType { index } => write!(f, "unknown type id {index}"),
            Self::UnknownContract { index } => write!(f, "unknown contract id {index}"),
            Self::IncompleteType { name, used_by } => write!(
                f,
                "`{used_by}` stores `{name}` by value before `{name}` is defined"
            ),
            Self::DuplicateMethod { type_name, method } => {
                write!(f, "duplicate method `{method}` on `{type_name}`")
            }
            Self::MethodsOnInterface { type_name } => {
                write!(f, "interface type `{type_name}` cannot declare its own methods")
            }
            Self::UncomparableMapKey { map, key } => {
                write!(f, "map type `{map}` has key `{key}`, which is not comparable")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}
