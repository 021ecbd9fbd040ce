//! Method implementations keyed by (type, method name).

// Rc<dyn Fn> is the implementation of NativeMethod
#![expect(clippy::disallowed_types, reason = "Rc is the implementation of NativeMethod")]

use std::fmt;
use std::rc::Rc;

use ferrule_ir::Name;
use ferrule_types::{TypeId, TypeRegistry};
use rustc_hash::FxHashMap;

use crate::{EvalResult, Value};

/// Key for looking up a method implementation.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct MethodKey {
    pub type_id: TypeId,
    pub method_name: Name,
}

impl MethodKey {
    #[inline]
    pub const fn new(type_id: TypeId, method_name: Name) -> Self {
        Self {
            type_id,
            method_name,
        }
    }

    /// Format the key for display (requires the registry for names).
    pub fn display<'a>(&self, registry: &'a TypeRegistry) -> MethodKeyDisplay<'a> {
        MethodKeyDisplay {
            type_name: registry.type_name(self.type_id),
            method_name: registry.interner().lookup(self.method_name),
        }
    }
}

/// Helper for displaying a `MethodKey` with resolved names.
pub struct MethodKeyDisplay<'a> {
    type_name: &'a str,
    method_name: &'a str,
}

impl fmt::Display for MethodKeyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.method_name)
    }
}

/// A host-provided method body: `(receiver, args) -> result`.
#[derive(Clone)]
pub struct NativeMethod(Rc<dyn Fn(&Value, &[Value]) -> EvalResult>);

impl NativeMethod {
    pub fn new(f: impl Fn(&Value, &[Value]) -> EvalResult + 'static) -> Self {
        NativeMethod(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, receiver: &Value, args: &[Value]) -> EvalResult {
        (self.0)(receiver, args)
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeMethod")
    }
}

/// Registry of method implementations.
///
/// Declaring a method (its signature, on the type descriptor) and
/// implementing it (an entry here) are separate: conformance only looks at
/// declarations, dispatch needs both.
#[derive(Clone, Debug, Default)]
pub struct MethodTable {
    entries: FxHashMap<MethodKey, NativeMethod>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an implementation, replacing any previous one for the key.
    pub fn register(
        &mut self,
        type_id: TypeId,
        method_name: Name,
        f: impl Fn(&Value, &[Value]) -> EvalResult + 'static,
    ) {
        self.entries
            .insert(MethodKey::new(type_id, method_name), NativeMethod::new(f));
    }

    pub fn get(&self, key: MethodKey) -> Option<&NativeMethod> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
