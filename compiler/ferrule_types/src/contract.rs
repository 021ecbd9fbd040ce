//! Interface contracts: named sets of required method signatures.

use ferrule_ir::Name;

use crate::{ContractId, MethodSig};

/// Definition of a contract, as written by the front end.
///
/// `embeds` pulls in the full method set of earlier contracts; the result
/// is the union, so a contract built from `Reader` and `Writer` requires
/// both method sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractDef {
    pub name: Name,
    pub methods: Vec<MethodSig>,
    pub embeds: Vec<ContractId>,
}

impl ContractDef {
    pub fn new(name: Name) -> Self {
        ContractDef {
            name,
            methods: Vec::new(),
            embeds: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(mut self, sig: MethodSig) -> Self {
        self.methods.push(sig);
        self
    }

    #[must_use]
    pub fn embed(mut self, contract: ContractId) -> Self {
        self.embeds.push(contract);
        self
    }
}

/// A registered contract with its flattened method set.
#[derive(Clone, Debug)]
pub struct InterfaceContract {
    pub(crate) id: ContractId,
    pub(crate) def: ContractDef,
    pub(crate) methods: Vec<MethodSig>,
}

impl InterfaceContract {
    #[inline]
    pub fn id(&self) -> ContractId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.def.name
    }

    /// Required methods, embedded contracts first, in declaration order.
    #[inline]
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    pub fn method(&self, name: Name) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The empty contract, satisfied by every type.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
