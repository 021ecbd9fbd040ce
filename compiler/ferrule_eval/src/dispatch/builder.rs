//! `DispatcherBuilder` for creating Dispatcher instances with various configurations.

use ferrule_ir::SharedInterner;
use ferrule_types::{ConformanceCache, TypeRegistry};

use super::{Dispatcher, MethodTable};
use crate::SharedMutableRegistry;

/// Builder for creating Dispatcher instances.
///
/// Without an explicit registry the builder creates a fresh one over the
/// given interner (or a new interner if none was given).
#[derive(Debug)]
pub struct DispatcherBuilder {
    interner: Option<SharedInterner>,
    registry: Option<SharedMutableRegistry<TypeRegistry>>,
    methods: MethodTable,
    conformance_cache: bool,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            interner: None,
            registry: None,
            methods: MethodTable::new(),
            conformance_cache: true,
        }
    }

    /// Interner for a freshly created registry. Ignored when `registry` is set.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Share an existing registry, e.g. one a front end is still filling.
    #[must_use]
    pub fn registry(mut self, registry: SharedMutableRegistry<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn methods(mut self, methods: MethodTable) -> Self {
        self.methods = methods;
        self
    }

    /// Memoise conformance per `(type, contract)` pair. On by default.
    #[must_use]
    pub fn conformance_cache(mut self, enabled: bool) -> Self {
        self.conformance_cache = enabled;
        self
    }

    pub fn build(self) -> Dispatcher {
        let registry = self.registry.unwrap_or_else(|| {
            SharedMutableRegistry::new(TypeRegistry::new(self.interner.unwrap_or_default()))
        });
        let conformance = if self.conformance_cache {
            ConformanceCache::new()
        } else {
            ConformanceCache::disabled()
        };
        Dispatcher {
            registry,
            methods: self.methods,
            conformance,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
