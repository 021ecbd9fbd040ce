//! Structural conformance of types to interface contracts.
//!
//! A type conforms to a contract iff its method set contains every method
//! the contract requires, with an identical signature. Nothing links the two
//! explicitly, so the check is a pure function of two immutable descriptors
//! and its answer can be memoised per (type, contract) pair.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{
    ContractId, InterfaceContract, MethodSig, RegistrationError, TypeDescriptor, TypeId,
    TypeRegistry,
};
use ferrule_ir::Name;

/// Why one required method is not satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodMismatch {
    /// The type has no method with this name.
    Absent(Name),
    /// The type has a method with this name, but a different signature.
    WrongSignature { expected: MethodSig, found: MethodSig },
}

impl MethodMismatch {
    pub fn name(&self) -> Name {
        match self {
            MethodMismatch::Absent(name) => *name,
            MethodMismatch::WrongSignature { expected, .. } => expected.name,
        }
    }
}

/// Outcome of a conformance check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conformance {
    Satisfied,
    /// Every unsatisfied requirement, in contract order.
    Missing(Vec<MethodMismatch>),
}

impl Conformance {
    #[inline]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Conformance::Satisfied)
    }

    pub fn mismatches(&self) -> &[MethodMismatch] {
        match self {
            Conformance::Satisfied => &[],
            Conformance::Missing(mismatches) => mismatches,
        }
    }
}

/// Check `ty` against `contract`.
pub fn check_conformance(ty: &TypeDescriptor, contract: &InterfaceContract) -> Conformance {
    let mismatches: Vec<MethodMismatch> = contract
        .methods()
        .iter()
        .filter_map(|required| match ty.method(required.name) {
            None => Some(MethodMismatch::Absent(required.name)),
            Some(found) if found != required => Some(MethodMismatch::WrongSignature {
                expected: required.clone(),
                found: found.clone(),
            }),
            Some(_) => None,
        })
        .collect();

    if mismatches.is_empty() {
        Conformance::Satisfied
    } else {
        Conformance::Missing(mismatches)
    }
}

/// Hit/miss counters of a [`ConformanceCache`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct CacheState {
    /// Registry epoch the entries were computed against.
    epoch: u64,
    entries: FxHashMap<(TypeId, ContractId), Conformance>,
    stats: CacheStats,
}

/// Memoised conformance answers for one registry.
///
/// Entries are dropped wholesale when the registry epoch moves, which only
/// happens when a reserved type is completed.
pub struct ConformanceCache {
    enabled: bool,
    state: Mutex<CacheState>,
}

impl ConformanceCache {
    pub fn new() -> Self {
        ConformanceCache {
            enabled: true,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// A cache that recomputes every query.
    pub fn disabled() -> Self {
        ConformanceCache {
            enabled: false,
            ..Self::new()
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn conformance(
        &self,
        registry: &TypeRegistry,
        ty: TypeId,
        contract: ContractId,
    ) -> Result<Conformance, RegistrationError> {
        let desc = registry
            .get(ty)
            .ok_or(RegistrationError::UnknownType { index: ty.index() })?;
        let required = registry
            .contract(contract)
            .ok_or(RegistrationError::UnknownContract {
                index: contract.index(),
            })?;

        if !self.enabled {
            return Ok(check_conformance(desc, required));
        }

        let mut state = self.state.lock();
        if state.epoch != registry.epoch() {
            state.entries.clear();
            state.epoch = registry.epoch();
        }
        if let Some(hit) = state.entries.get(&(ty, contract)).cloned() {
            state.stats.hits += 1;
            return Ok(hit);
        }

        state.stats.misses += 1;
        let result = check_conformance(desc, required);
        trace!(
            ty = registry.type_name(ty),
            contract = registry.contract_name(contract),
            satisfied = result.is_satisfied(),
            "computed conformance"
        );
        state.entries.insert((ty, contract), result.clone());
        Ok(result)
    }

    pub fn conforms(
        &self,
        registry: &TypeRegistry,
        ty: TypeId,
        contract: ContractId,
    ) -> Result<bool, RegistrationError> {
        self.conformance(registry, ty, contract)
            .map(|c| c.is_satisfied())
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.stats = CacheStats::default();
    }
}

impl Default for ConformanceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConformanceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConformanceCache")
            .field("enabled", &self.enabled)
            .field("entries", &state.entries.len())
            .field("stats", &state.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests;
