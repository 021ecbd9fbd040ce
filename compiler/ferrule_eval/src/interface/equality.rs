//! The `==` rule for interface values and the payloads they carry.
//!
//! - both nil: equal
//! - exactly one nil: unequal
//! - different dynamic types: unequal
//! - same dynamic type that is not comparable: `NotComparable` error
//! - otherwise: payload equality under that type's rule
//!
//! Payload equality recurses through arrays and structs. An interface-typed
//! field compares by this same rule, so a struct whose fields are all
//! comparable can still fail at runtime when a field holds an uncomparable
//! dynamic value.

use ferrule_stack::ensure_sufficient_stack;
use ferrule_types::{TypeId, TypeKind, TypeRegistry};

use crate::errors::{not_comparable, type_mismatch, unknown_type};
use crate::{Cell, EvalError, InterfaceValue, Value};

impl InterfaceValue {
    /// Compare two interface values.
    ///
    /// Floats follow IEEE 754, so a boxed NaN is not equal to itself and
    /// `iv.equals(&iv)` is `Ok(false)` for it. Every other comparable value
    /// is equal to itself.
    ///
    /// Callers that must not fail check `is_comparable` on both dynamic
    /// types first.
    pub fn equals(&self, other: &InterfaceValue, registry: &TypeRegistry) -> Result<bool, EvalError> {
        match (self.parts(), other.parts()) {
            (None, None) => Ok(true),
            (None, Some(_)) | (Some(_), None) => Ok(false),
            (Some((a_ty, a)), Some((b_ty, b))) => {
                if a_ty != b_ty {
                    return Ok(false);
                }
                let desc = registry
                    .get(a_ty)
                    .ok_or_else(|| unknown_type(a_ty.index()))?;
                if !desc.is_comparable() {
                    return Err(not_comparable(registry.type_name(a_ty)));
                }
                payload_equals(registry, a_ty, a, b)
            }
        }
    }
}

/// Compare two payloads of type `ty`.
fn payload_equals(
    registry: &TypeRegistry,
    ty: TypeId,
    a: &Value,
    b: &Value,
) -> Result<bool, EvalError> {
    let kind = registry
        .get(ty)
        .and_then(|desc| desc.kind())
        .ok_or_else(|| unknown_type(ty.index()))?;

    ensure_sufficient_stack(|| match (kind, a, b) {
        (TypeKind::Basic(_), Value::Int(x), Value::Int(y)) => Ok(x == y),
        (TypeKind::Basic(_), Value::Float(x), Value::Float(y)) => Ok(x == y),
        (TypeKind::Basic(_), Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (TypeKind::Basic(_), Value::Str(x), Value::Str(y)) => Ok(x.as_str() == y.as_str()),

        (TypeKind::Pointer(_), Value::Pointer(x), Value::Pointer(y)) => Ok(match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => Cell::ptr_eq(x, y),
            _ => false,
        }),

        (TypeKind::Interface(_), Value::Interface(x), Value::Interface(y)) => {
            x.equals(y, registry)
        }

        (TypeKind::Array { elem, .. }, Value::Array(xs), Value::Array(ys)) => {
            if xs.len() != ys.len() {
                return Ok(false);
            }
            for (x, y) in xs.iter().zip(ys.iter()) {
                if !payload_equals(registry, *elem, x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }

        (TypeKind::Struct(fields), Value::Struct(xs), Value::Struct(ys)) => {
            if xs.len() != fields.len() || ys.len() != fields.len() {
                return Err(type_mismatch(registry.type_name(ty), "struct of different arity"));
            }
            for ((field, x), y) in fields.iter().zip(xs.iter()).zip(ys.iter()) {
                if !payload_equals(registry, field.ty, x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }

        (TypeKind::Slice(_) | TypeKind::Map { .. } | TypeKind::Func { .. }, _, _) => {
            Err(not_comparable(registry.type_name(ty)))
        }

        (_, a, b) => Err(type_mismatch(
            registry.type_name(ty),
            &format!("{} and {}", a.shape_name(), b.shape_name()),
        )),
    })
}
