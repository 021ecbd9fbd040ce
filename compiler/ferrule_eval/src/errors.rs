//! Error types for the runtime.
//!
//! `EvalErrorKind` gives each failure a typed category so callers branch on
//! the kind rather than parsing messages. Factory functions
//! (e.g. `not_comparable()`) populate both `kind` and `message`.
//!
//! None of these errors is ever folded into a boolean. The one sanctioned
//! local-recovery path is the two-result `assert_type`, which reports a
//! failed assertion as `ok = false` instead of an error.

use std::fmt;

use ferrule_types::RegistrationError;

use crate::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Conformance
    DoesNotConform {
        type_name: String,
        contract: String,
        missing: Vec<String>,
    },

    // Equality
    NotComparable {
        type_name: String,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },

    // Narrowing
    FailedAssertion {
        expected: String,
        found: Option<String>,
    },
    DuplicateDefaultArm,

    // Dispatch
    NilDispatch {
        method: String,
    },
    NoSuchMethod {
        method: String,
        type_name: String,
    },
    MissingImplementation {
        method: String,
        type_name: String,
    },
    NilPointerDereference {
        method: String,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    // Bindings
    UndefinedVariable {
        name: String,
    },
    ImmutableBinding {
        name: String,
    },

    /// A type or contract id the registry rejected.
    InvalidType {
        message: String,
    },

    /// Catch-all for host-defined failures (e.g. inside a native method).
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoesNotConform {
                type_name,
                contract,
                missing,
            } => write!(
                f,
                "`{type_name}` does not implement `{contract}` (missing or mismatched: {})",
                missing.join(", ")
            ),
            Self::NotComparable { type_name } => {
                write!(f, "comparing uncomparable type `{type_name}`")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::FailedAssertion {
                expected,
                found: Some(found),
            } => write!(f, "interface conversion: interface holds {found}, not {expected}"),
            Self::FailedAssertion {
                expected,
                found: None,
            } => write!(f, "interface conversion: interface is nil, not {expected}"),
            Self::DuplicateDefaultArm => write!(f, "multiple default arms in type switch"),
            Self::NilDispatch { method } => {
                write!(f, "method `{method}` called on a nil interface value")
            }
            Self::NoSuchMethod { method, type_name } => {
                write!(f, "no method `{method}` on type `{type_name}`")
            }
            Self::MissingImplementation { method, type_name } => write!(
                f,
                "method `{type_name}.{method}` is declared but has no implementation"
            ),
            Self::NilPointerDereference { method } => {
                write!(f, "nil pointer dereference calling `{method}`")
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => write!(f, "`{name}` expects {expected} arguments, got {got}"),
            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::ImmutableBinding { name } => {
                write!(f, "cannot assign to immutable variable `{name}`")
            }
            Self::InvalidType { message } | Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory errors.
    pub message: String,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
        }
    }

    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError { kind, message }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

impl From<RegistrationError> for EvalError {
    fn from(err: RegistrationError) -> Self {
        EvalError::from_kind(EvalErrorKind::InvalidType {
            message: err.to_string(),
        })
    }
}

// Factories

#[cold]
pub fn does_not_conform(type_name: &str, contract: &str, missing: Vec<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DoesNotConform {
        type_name: type_name.to_string(),
        contract: contract.to_string(),
        missing,
    })
}

#[cold]
pub fn not_comparable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotComparable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

/// `found` is `None` when the asserted interface was nil.
#[cold]
pub fn failed_assertion(expected: &str, found: Option<&str>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FailedAssertion {
        expected: expected.to_string(),
        found: found.map(str::to_string),
    })
}

#[cold]
pub fn duplicate_default_arm() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateDefaultArm)
}

#[cold]
pub fn nil_dispatch(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NilDispatch {
        method: method.to_string(),
    })
}

#[cold]
pub fn no_such_method(method: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMethod {
        method: method.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn missing_implementation(method: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingImplementation {
        method: method.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn nil_pointer_dereference(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NilPointerDereference {
        method: method.to_string(),
    })
}

#[cold]
pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn cannot_assign_immutable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImmutableBinding {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_type(index: usize) -> EvalError {
    RegistrationError::UnknownType { index }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_factory_message_matches_kind() {
        let err = not_comparable("map[string]int");
        assert_eq!(err.message, err.kind.to_string());
        assert_eq!(err.message, "comparing uncomparable type `map[string]int`");
    }

    #[test]
    fn test_failed_assertion_on_nil() {
        let err = failed_assertion("*Point", None);
        assert_eq!(err.to_string(), "interface conversion: interface is nil, not *Point");
    }

    #[test]
    fn test_registration_error_converts() {
        let err: EvalError = RegistrationError::UnknownContract { index: 3 }.into();
        assert!(matches!(err.kind, EvalErrorKind::InvalidType { .. }));
        assert_eq!(err.to_string(), "unknown contract id 3");
    }

    #[test]
    fn test_custom_error() {
        let err = EvalError::new("boom");
        assert_eq!(
            err.kind,
            EvalErrorKind::Custom {
                message: "boom".to_string()
            }
        );
    }
}
