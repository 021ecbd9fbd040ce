//! Method signatures.

use ferrule_ir::Name;
use smallvec::SmallVec;

use crate::TypeId;

/// A method signature: name, parameter types, result types.
///
/// The receiver is implicit. Two signatures match only if every component
/// is identical; there is no variance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub name: Name,
    pub params: SmallVec<[TypeId; 4]>,
    pub results: SmallVec<[TypeId; 2]>,
}

impl MethodSig {
    pub fn new(
        name: Name,
        params: impl IntoIterator<Item = TypeId>,
        results: impl IntoIterator<Item = TypeId>,
    ) -> Self {
        MethodSig {
            name,
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }

    /// A method with no parameters.
    pub fn nullary(name: Name, results: impl IntoIterator<Item = TypeId>) -> Self {
        Self::new(name, [], results)
    }

    pub(crate) fn referenced_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.params.iter().chain(self.results.iter()).copied()
    }
}
