//! Interface values: a dynamic type tag paired with a payload.
//!
//! An `InterfaceValue` is nil only when it carries no tag at all. Boxing a
//! nil pointer under a pointer type produces a non-nil interface whose
//! payload happens to be a nil pointer; `is_nil` inspects the tag only and
//! never looks inside the payload.

mod equality;

use ferrule_types::TypeId;

use crate::{Heap, Value};

#[derive(Clone, Debug, PartialEq)]
struct Boxed {
    ty: TypeId,
    payload: Value,
}

/// `(typeTag, payload)` pair, or nil.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterfaceValue {
    /// Tag and payload are present or absent together.
    inner: Option<Heap<Boxed>>,
}

impl InterfaceValue {
    /// The nil interface value.
    #[inline]
    pub fn nil() -> Self {
        InterfaceValue { inner: None }
    }

    /// Box `payload` under dynamic type `ty`. Never fails and never copies
    /// the payload.
    ///
    /// `ty` must be a concrete type. [`Dispatcher::box_value`](crate::Dispatcher::box_value)
    /// unwraps interface-typed values before calling this.
    pub fn boxed(ty: TypeId, payload: Value) -> Self {
        InterfaceValue {
            inner: Some(Heap::new(Boxed { ty, payload })),
        }
    }

    /// True iff there is no type tag.
    #[inline]
    pub fn is_nil(&self) -> bool {
        self.inner.is_none()
    }

    /// The dynamic type, if any.
    #[inline]
    pub fn dynamic_type(&self) -> Option<TypeId> {
        self.inner.as_ref().map(|b| b.ty)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.inner.as_ref().map(|b| &b.payload)
    }

    /// Tag and payload together.
    pub fn parts(&self) -> Option<(TypeId, &Value)> {
        self.inner.as_ref().map(|b| (b.ty, &b.payload))
    }
}

#[cfg(test)]
mod tests;
