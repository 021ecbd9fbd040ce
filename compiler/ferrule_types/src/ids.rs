//! Compact identities for registered types and contracts.
//!
//! Both are indices into the owning [`TypeRegistry`](crate::TypeRegistry).
//! Equal ids mean the same descriptor; identity comparison is all the
//! runtime ever needs for type tags.

use std::fmt;

use crate::BasicKind;

/// Identity of a registered concrete type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub(crate) const fn from_index(index: u32) -> Self {
        TypeId(index)
    }

    /// Position of the descriptor in its registry.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Host scalars are registered first, in `BasicKind` order.
impl From<BasicKind> for TypeId {
    #[inline]
    fn from(kind: BasicKind) -> Self {
        TypeId(kind as u32)
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Identity of a registered interface contract.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ContractId(u32);

impl ContractId {
    #[inline]
    pub(crate) const fn from_index(index: u32) -> Self {
        ContractId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self.0)
    }
}
