//! Registry of type descriptors and interface contracts.
//!
//! The `TypeRegistry` hands out one canonical [`TypeId`] per named concrete
//! type. Registration is idempotent: registering the same definition twice
//! returns the same id, while a different definition under an existing name
//! is rejected.
//!
//! # Design
//!
//! - Descriptors live in a single `Vec`, indexed by `TypeId`
//! - Name → id lookup through `FxHashMap`
//! - Comparability and category bits are folded into [`TypeFlags`] once
//! - The four host scalars are registered first, at fixed ids
//!
//! # Forward references
//!
//! [`TypeRegistry::reserve`] hands out an id before the definition exists so
//! method signatures and pointers can mention the type being defined
//! (`Less(other Point) bool`, `next *Node`). A reserved type may not be
//! stored by value until its definition is registered.
//!
//! Completing a reserved type, or promoting its methods into a pointer type
//! that was registered earlier, bumps the registry [`epoch`](TypeRegistry::epoch).
//! Conformance caches key on it.

use ferrule_ir::{Name, SharedInterner};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::{
    BasicKind, ContractDef, ContractId, InterfaceContract, MethodSig, RegistrationError,
    TypeFlags, TypeId, TypeKind,
};

/// Definition of a concrete type, as written by the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    pub name: Name,
    pub kind: TypeKind,
    /// Methods declared directly on this type.
    pub methods: Vec<MethodSig>,
}

impl TypeDef {
    pub fn new(name: Name, kind: TypeKind) -> Self {
        TypeDef {
            name,
            kind,
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_method(mut self, sig: MethodSig) -> Self {
        self.methods.push(sig);
        self
    }
}

/// Immutable identity and metadata of a registered type.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    id: TypeId,
    name: Name,
    /// `None` while the type is only reserved.
    kind: Option<TypeKind>,
    declared: Vec<MethodSig>,
    method_set: Vec<MethodSig>,
    flags: TypeFlags,
}

impl TypeDescriptor {
    fn pending(id: TypeId, name: Name) -> Self {
        TypeDescriptor {
            id,
            name,
            kind: None,
            declared: Vec::new(),
            method_set: Vec::new(),
            flags: TypeFlags::IS_PENDING,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// Structural shape; `None` for a reserved type not yet defined.
    #[inline]
    pub fn kind(&self) -> Option<&TypeKind> {
        self.kind.as_ref()
    }

    /// Full method set, in a stable order.
    ///
    /// For pointer types this is the declared methods followed by the
    /// element type's method set.
    #[inline]
    pub fn method_set(&self) -> &[MethodSig] {
        &self.method_set
    }

    pub fn method(&self, name: Name) -> Option<&MethodSig> {
        self.method_set.iter().find(|m| m.name == name)
    }

    #[inline]
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    #[inline]
    pub fn is_comparable(&self) -> bool {
        self.flags.is_comparable()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.flags.contains(TypeFlags::IS_PENDING)
    }

    fn matches(&self, def: &TypeDef) -> bool {
        self.name == def.name && self.kind.as_ref() == Some(&def.kind) && self.declared == def.methods
    }
}

/// Registry for type descriptors and contracts.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    interner: SharedInterner,
    types: Vec<TypeDescriptor>,
    types_by_name: FxHashMap<Name, TypeId>,
    contracts: Vec<InterfaceContract>,
    contracts_by_name: FxHashMap<Name, ContractId>,
    /// Reserved element type → pointer types waiting for its methods.
    pending_promotions: FxHashMap<TypeId, Vec<TypeId>>,
    epoch: u64,
}

impl TypeRegistry {
    /// Create a registry with `int`, `float`, `bool` and `string` registered.
    pub fn new(interner: SharedInterner) -> Self {
        let mut registry = TypeRegistry {
            interner,
            types: Vec::new(),
            types_by_name: FxHashMap::default(),
            contracts: Vec::new(),
            contracts_by_name: FxHashMap::default(),
            pending_promotions: FxHashMap::default(),
            epoch: 0,
        };
        for kind in [BasicKind::Int, BasicKind::Float, BasicKind::Bool, BasicKind::Str] {
            let name = registry.interner.intern(kind.as_str());
            let id = registry.push_pending(name);
            registry.complete(id, TypeDef::new(name, TypeKind::Basic(kind)));
        }
        registry
    }

    /// Id of a host scalar type.
    #[inline]
    pub fn basic(&self, kind: BasicKind) -> TypeId {
        TypeId::from(kind)
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Changes whenever an existing descriptor's method set is filled in.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of registered (including reserved) types.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Register a type definition.
    ///
    /// Idempotent for identical definitions. A reserved name is completed
    /// by its first definition.
    #[tracing::instrument(level = "debug", skip(self, def), fields(name = self.interner.lookup(def.name)))]
    pub fn register(&mut self, def: TypeDef) -> Result<TypeId, RegistrationError> {
        if let Some(&id) = self.types_by_name.get(&def.name) {
            let existing = &self.types[id.index()];
            if !existing.is_pending() {
                if existing.matches(&def) {
                    trace!(?id, "already registered");
                    return Ok(id);
                }
                return Err(RegistrationError::Conflict {
                    name: self.interner.lookup(def.name).to_owned(),
                });
            }
            self.validate(&def, Some(id))?;
            self.complete(id, def);
            self.epoch += 1;
            debug!(?id, "completed reserved type");
            return Ok(id);
        }

        self.validate(&def, None)?;
        let id = self.push_pending(def.name);
        self.complete(id, def);
        debug!(?id, "registered type");
        Ok(id)
    }

    /// Reserve an id for `name` ahead of its definition.
    ///
    /// Returns the existing id if the name is already known.
    pub fn reserve(&mut self, name: Name) -> TypeId {
        if let Some(&id) = self.types_by_name.get(&name) {
            return id;
        }
        let id = self.push_pending(name);
        trace!(?id, name = self.interner.lookup(name), "reserved type");
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id.index())
    }

    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.types_by_name.get(&name).copied()
    }

    /// Look up a type by its source name.
    pub fn lookup_str(&self, name: &str) -> Option<TypeId> {
        self.lookup(self.interner.intern(name))
    }

    pub fn method_set(&self, id: TypeId) -> Option<&[MethodSig]> {
        self.get(id).map(TypeDescriptor::method_set)
    }

    /// Unknown ids are never comparable.
    pub fn is_comparable(&self, id: TypeId) -> bool {
        self.get(id).is_some_and(TypeDescriptor::is_comparable)
    }

    /// Display name of a type, for diagnostics.
    pub fn type_name(&self, id: TypeId) -> &'static str {
        self.get(id)
            .map_or("<unknown type>", |desc| self.interner.lookup(desc.name))
    }

    /// Define an interface contract.
    ///
    /// Embedded contracts are flattened; an embedded method that repeats an
    /// identical signature is merged, a clashing one is rejected.
    #[tracing::instrument(level = "debug", skip(self, def), fields(name = self.interner.lookup(def.name)))]
    pub fn define_contract(&mut self, def: ContractDef) -> Result<ContractId, RegistrationError> {
        if let Some(&id) = self.contracts_by_name.get(&def.name) {
            if self.contracts[id.index()].def == def {
                return Ok(id);
            }
            return Err(RegistrationError::Conflict {
                name: self.interner.lookup(def.name).to_owned(),
            });
        }

        for sig in &def.methods {
            for ty in sig.referenced_types() {
                self.check_known(ty)?;
            }
        }

        let mut methods: Vec<MethodSig> = Vec::new();
        let embedded = def
            .embeds
            .iter()
            .map(|&c| {
                self.contract(c)
                    .map(|contract| contract.methods.iter())
                    .ok_or(RegistrationError::UnknownContract { index: c.index() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        for sig in embedded.into_iter().flatten().chain(def.methods.iter()) {
            match methods.iter().find(|m| m.name == sig.name) {
                Some(existing) if existing == sig => {}
                Some(_) => {
                    return Err(RegistrationError::DuplicateMethod {
                        type_name: self.interner.lookup(def.name).to_owned(),
                        method: self.interner.lookup(sig.name).to_owned(),
                    })
                }
                None => methods.push(sig.clone()),
            }
        }

        let index = u32::try_from(self.contracts.len()).unwrap_or(u32::MAX);
        let id = ContractId::from_index(index);
        debug!(?id, methods = methods.len(), "defined contract");
        self.contracts_by_name.insert(def.name, id);
        self.contracts.push(InterfaceContract { id, def, methods });
        Ok(id)
    }

    pub fn contract(&self, id: ContractId) -> Option<&InterfaceContract> {
        self.contracts.get(id.index())
    }

    pub fn lookup_contract(&self, name: Name) -> Option<ContractId> {
        self.contracts_by_name.get(&name).copied()
    }

    /// Display name of a contract, for diagnostics.
    pub fn contract_name(&self, id: ContractId) -> &'static str {
        self.contract(id)
            .map_or("<unknown contract>", |c| self.interner.lookup(c.name()))
    }

    fn push_pending(&mut self, name: Name) -> TypeId {
        let index = u32::try_from(self.types.len()).unwrap_or(u32::MAX);
        let id = TypeId::from_index(index);
        self.types.push(TypeDescriptor::pending(id, name));
        self.types_by_name.insert(name, id);
        id
    }

    fn check_known(&self, id: TypeId) -> Result<&TypeDescriptor, RegistrationError> {
        self.get(id)
            .ok_or(RegistrationError::UnknownType { index: id.index() })
    }

    fn duplicate(&self, type_name: Name, method: Name) -> RegistrationError {
        RegistrationError::DuplicateMethod {
            type_name: self.interner.lookup(type_name).to_owned(),
            method: self.interner.lookup(method).to_owned(),
        }
    }

    /// Check a definition before any state changes.
    ///
    /// `reserved` is the id being completed, if the name was reserved.
    fn validate(&self, def: &TypeDef, reserved: Option<TypeId>) -> Result<(), RegistrationError> {
        for ty in def.kind.referenced_types() {
            self.check_known(ty)?;
        }
        for sig in &def.methods {
            for ty in sig.referenced_types() {
                self.check_known(ty)?;
            }
        }

        for ty in def.kind.by_value_constituents() {
            let desc = self.check_known(ty)?;
            if desc.is_pending() {
                return Err(RegistrationError::IncompleteType {
                    name: self.interner.lookup(desc.name).to_owned(),
                    used_by: self.interner.lookup(def.name).to_owned(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for sig in &def.methods {
            if !seen.insert(sig.name) {
                return Err(self.duplicate(def.name, sig.name));
            }
        }

        match &def.kind {
            TypeKind::Interface(contract) => {
                if self.contract(*contract).is_none() {
                    return Err(RegistrationError::UnknownContract {
                        index: contract.index(),
                    });
                }
                if !def.methods.is_empty() {
                    return Err(RegistrationError::MethodsOnInterface {
                        type_name: self.interner.lookup(def.name).to_owned(),
                    });
                }
            }
            TypeKind::Map { key, .. } => {
                if !self.is_comparable(*key) {
                    return Err(RegistrationError::UncomparableMapKey {
                        map: self.interner.lookup(def.name).to_owned(),
                        key: self.type_name(*key).to_owned(),
                    });
                }
            }
            TypeKind::Pointer(elem) => {
                if let Some(clash) = self.check_known(*elem)?
                    .method_set
                    .iter()
                    .find(|m| seen.contains(&m.name))
                {
                    return Err(self.duplicate(def.name, clash.name));
                }
            }
            _ => {}
        }

        // Pointers registered against this reserved name will receive its
        // methods; their own declarations must not collide with them.
        if let Some(waiting) = reserved.and_then(|id| self.pending_promotions.get(&id)) {
            for ptr in waiting {
                let ptr_desc = &self.types[ptr.index()];
                if let Some(clash) = ptr_desc
                    .declared
                    .iter()
                    .find(|m| seen.contains(&m.name))
                {
                    return Err(self.duplicate(ptr_desc.name, clash.name));
                }
            }
        }

        Ok(())
    }

    /// Fill in a validated definition at `id`.
    fn complete(&mut self, id: TypeId, def: TypeDef) {
        let constituent_flags: Vec<TypeFlags> = def
            .kind
            .by_value_constituents()
            .iter()
            .map(|ty| self.types[ty.index()].flags)
            .collect();
        let mut flags = TypeFlags::for_kind(&def.kind, constituent_flags.into_iter());

        let mut method_set = def.methods.clone();
        match &def.kind {
            TypeKind::Interface(contract) => {
                if let Some(contract) = self.contract(*contract) {
                    method_set.extend(contract.methods.iter().cloned());
                }
            }
            TypeKind::Pointer(elem) => {
                let elem_desc = &self.types[elem.index()];
                if elem_desc.is_pending() {
                    self.pending_promotions.entry(*elem).or_default().push(id);
                } else {
                    method_set.extend(elem_desc.method_set.iter().cloned());
                }
            }
            _ => {}
        }
        if !method_set.is_empty() {
            flags |= TypeFlags::HAS_METHODS;
        }

        let desc = &mut self.types[id.index()];
        desc.kind = Some(def.kind);
        desc.declared = def.methods;
        desc.method_set = method_set;
        desc.flags = flags;

        if let Some(waiting) = self.pending_promotions.remove(&id) {
            let promoted = self.types[id.index()].method_set.clone();
            for ptr in waiting {
                let ptr_desc = &mut self.types[ptr.index()];
                ptr_desc.method_set.extend(promoted.iter().cloned());
                if !ptr_desc.method_set.is_empty() {
                    ptr_desc.flags |= TypeFlags::HAS_METHODS;
                }
            }
            self.epoch += 1;
        }
    }
}
