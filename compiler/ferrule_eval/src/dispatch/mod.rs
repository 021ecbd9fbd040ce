//! The dispatcher: boxing, conformance-checked assignment, narrowing and
//! method calls on interface values.
//!
//! A `Dispatcher` owns three things:
//!
//! - a [`SharedMutableRegistry`] of type descriptors and contracts, so a front
//!   end can keep registering while the runtime reads
//! - a [`MethodTable`] of native implementations
//! - a [`ConformanceCache`] memoising `(type, contract)` answers
//!
//! Every operation takes the registry read lock for the duration of its
//! lookup only. Native methods and switch handlers run after the guard is
//! dropped, so they may call back into the dispatcher.

mod builder;
mod methods;
mod type_switch;

use ferrule_ir::{Name, SharedInterner};
use ferrule_types::{
    Conformance, ConformanceCache, ContractDef, ContractId, TypeDef, TypeDescriptor, TypeId,
    TypeKind, TypeRegistry,
};
use tracing::{debug, trace};

use crate::errors::{
    does_not_conform, failed_assertion, missing_implementation, nil_dispatch,
    nil_pointer_dereference, no_such_method, unknown_type, wrong_arg_count,
};
use crate::{EvalError, EvalResult, InterfaceValue, SharedMutableRegistry, Value};

pub use builder::DispatcherBuilder;
pub use methods::{MethodKey, MethodKeyDisplay, MethodTable, NativeMethod};
pub use type_switch::{Narrowed, SwitchOutcome, SwitchResult, TypeSwitch};

/// Resolves conformance, narrowing and method calls against one registry.
#[derive(Debug)]
pub struct Dispatcher {
    registry: SharedMutableRegistry<TypeRegistry>,
    methods: MethodTable,
    conformance: ConformanceCache,
}

impl Dispatcher {
    /// A dispatcher over a fresh registry with default settings.
    pub fn new(interner: SharedInterner) -> Self {
        DispatcherBuilder::new().interner(interner).build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    #[inline]
    pub fn registry(&self) -> &SharedMutableRegistry<TypeRegistry> {
        &self.registry
    }

    pub fn interner(&self) -> SharedInterner {
        self.registry.read().interner().clone()
    }

    #[inline]
    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    #[inline]
    pub fn conformance_cache(&self) -> &ConformanceCache {
        &self.conformance
    }

    // Registration

    pub fn register(&self, def: TypeDef) -> Result<TypeId, EvalError> {
        Ok(self.registry.write().register(def)?)
    }

    pub fn reserve(&self, name: Name) -> TypeId {
        self.registry.write().reserve(name)
    }

    pub fn define_contract(&self, def: ContractDef) -> Result<ContractId, EvalError> {
        Ok(self.registry.write().define_contract(def)?)
    }

    /// Install the implementation of `ty.method`.
    ///
    /// The signature is declared on the type; this only supplies the body.
    pub fn implement(
        &mut self,
        ty: TypeId,
        method: Name,
        f: impl Fn(&Value, &[Value]) -> EvalResult + 'static,
    ) {
        self.methods.register(ty, method, f);
    }

    // Boxing and conformance

    /// Box `value` of static type `ty` into an interface value.
    ///
    /// Never fails and never copies. A value whose static type is itself an
    /// interface type is already boxed; it is passed through so the dynamic
    /// type stays concrete.
    pub fn box_value(&self, value: Value, ty: TypeId) -> InterfaceValue {
        box_with(&self.registry.read(), value, ty)
    }

    pub fn conforms(&self, ty: TypeId, contract: ContractId) -> Result<bool, EvalError> {
        Ok(self
            .conformance
            .conforms(&self.registry.read(), ty, contract)?)
    }

    /// Full conformance report, listing what is missing.
    pub fn conformance(&self, ty: TypeId, contract: ContractId) -> Result<Conformance, EvalError> {
        Ok(self
            .conformance
            .conformance(&self.registry.read(), ty, contract)?)
    }

    /// Store `value` of type `ty` into a location of interface type `contract`.
    ///
    /// Fails with `DoesNotConform` before anything is boxed, so a value that
    /// lacks a required method never reaches a method call.
    #[tracing::instrument(level = "debug", skip(self, value))]
    pub fn assign(
        &self,
        value: Value,
        ty: TypeId,
        contract: ContractId,
    ) -> Result<InterfaceValue, EvalError> {
        let registry = self.registry.read();
        let report = self.conformance.conformance(&registry, ty, contract)?;
        if let Conformance::Missing(mismatches) = report {
            let missing = mismatches
                .iter()
                .map(|m| registry.interner().lookup(m.name()).to_owned())
                .collect();
            debug!(?missing, "assignment rejected");
            return Err(does_not_conform(
                registry.type_name(ty),
                registry.contract_name(contract),
                missing,
            ));
        }
        Ok(box_with(&registry, value, ty))
    }

    // Narrowing

    /// Two-result type assertion: `value, ok := iv.(want)`.
    ///
    /// On success returns the payload and `true`. Otherwise returns the zero
    /// value of `want` and `false`; `iv` is never touched. Asserting to an
    /// interface type checks conformance of the dynamic type instead of tag
    /// identity and yields the value still boxed.
    #[tracing::instrument(level = "trace", skip(self, iv), ret)]
    pub fn assert_type(&self, iv: &InterfaceValue, want: TypeId) -> (Value, bool) {
        let registry = self.registry.read();
        if let Some(&TypeKind::Interface(contract)) = registry.get(want).and_then(TypeDescriptor::kind)
        {
            // Ids inside a registered interface type are always known.
            let ok = iv.dynamic_type().is_some_and(|ty| {
                matches!(self.conformance.conforms(&registry, ty, contract), Ok(true))
            });
            let narrowed = if ok { iv.clone() } else { InterfaceValue::nil() };
            return (Value::Interface(narrowed), ok);
        }

        match iv.parts() {
            Some((ty, payload)) if ty == want => (payload.clone(), true),
            _ => (
                Value::zero(&registry, want).unwrap_or_else(|| Value::Interface(InterfaceValue::nil())),
                false,
            ),
        }
    }

    /// Single-result type assertion: `iv.(want)`.
    ///
    /// A failed assertion is an `Err(FailedAssertion)`; propagating it with
    /// `?` aborts the current operation.
    pub fn expect_type(&self, iv: &InterfaceValue, want: TypeId) -> EvalResult {
        let (value, ok) = self.assert_type(iv, want);
        if ok {
            return Ok(value);
        }
        let registry = self.registry.read();
        Err(failed_assertion(
            registry.type_name(want),
            iv.dynamic_type().map(|ty| registry.type_name(ty)),
        ))
    }

    /// Narrow `iv` to another interface: succeeds iff `iv` is non-nil and its
    /// dynamic type conforms to `contract`.
    ///
    /// On failure returns the nil interface and `false`.
    pub fn assert_contract(
        &self,
        iv: &InterfaceValue,
        contract: ContractId,
    ) -> Result<(InterfaceValue, bool), EvalError> {
        let Some(ty) = iv.dynamic_type() else {
            return Ok((InterfaceValue::nil(), false));
        };
        if self.conforms(ty, contract)? {
            Ok((iv.clone(), true))
        } else {
            Ok((InterfaceValue::nil(), false))
        }
    }

    /// Start a multi-way type switch.
    pub fn type_switch<R>(&self) -> TypeSwitch<'_, R> {
        TypeSwitch::new(self)
    }

    // Equality

    /// `a == b` for interface values. See [`InterfaceValue::equals`].
    pub fn equals(&self, a: &InterfaceValue, b: &InterfaceValue) -> Result<bool, EvalError> {
        a.equals(b, &self.registry.read())
    }

    /// Whether `iv` can take part in `==` without a `NotComparable` error.
    ///
    /// Nil is always comparable.
    pub fn is_comparable(&self, iv: &InterfaceValue) -> bool {
        match iv.dynamic_type() {
            Some(ty) => self.registry.read().is_comparable(ty),
            None => true,
        }
    }

    // Method calls

    /// Call `method` on the dynamic value inside `iv`.
    ///
    /// The receiver is the payload. A pointer type without its own entry for
    /// `method` uses the element type's implementation, with the pointee as
    /// receiver.
    pub fn call_method(&self, iv: &InterfaceValue, method: Name, args: &[Value]) -> EvalResult {
        let (implementation, receiver) = {
            let registry = self.registry.read();
            let method_name = registry.interner().lookup(method);
            let (ty, payload) = iv.parts().ok_or_else(|| nil_dispatch(method_name))?;
            let desc = registry.get(ty).ok_or_else(|| unknown_type(ty.index()))?;
            let sig = desc
                .method(method)
                .ok_or_else(|| no_such_method(method_name, registry.type_name(ty)))?;
            if args.len() != sig.params.len() {
                return Err(wrong_arg_count(method_name, sig.params.len(), args.len()));
            }

            if let Some(direct) = self.methods.get(MethodKey::new(ty, method)) {
                (direct.clone(), payload.clone())
            } else if let Some(&TypeKind::Pointer(elem)) = desc.kind() {
                let promoted = self
                    .methods
                    .get(MethodKey::new(elem, method))
                    .ok_or_else(|| missing_implementation(method_name, registry.type_name(ty)))?;
                let cell = payload
                    .as_pointer()
                    .ok_or_else(|| nil_pointer_dereference(method_name))?;
                (promoted.clone(), cell.get())
            } else {
                return Err(missing_implementation(method_name, registry.type_name(ty)));
            }
        };
        trace!(method = ?method, "dispatching");
        implementation.call(&receiver, args)
    }
}

fn box_with(registry: &TypeRegistry, value: Value, ty: TypeId) -> InterfaceValue {
    match value {
        Value::Interface(iv)
            if matches!(
                registry.get(ty).and_then(TypeDescriptor::kind),
                Some(TypeKind::Interface(_))
            ) =>
        {
            iv
        }
        value => InterfaceValue::boxed(ty, value),
    }
}
