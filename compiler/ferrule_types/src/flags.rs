//! Pre-computed type metadata flags.
//!
//! `TypeFlags` are computed once when a descriptor is registered and never
//! recomputed, so `is_comparable` is an O(1) bit test instead of a walk over
//! nested fields.

use bitflags::bitflags;

use crate::TypeKind;

bitflags! {
    /// Pre-computed type properties.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u16 {
        // === Capability Flags ===

        /// Values of this type may be compared with `==`.
        const COMPARABLE = 1 << 0;
        /// The zero value is nil (pointer, slice, map, func, interface).
        const NILABLE = 1 << 1;
        /// The method set is non-empty.
        const HAS_METHODS = 1 << 2;

        // === Category Flags ===

        /// Host scalar (int, float, bool, string).
        const IS_BASIC = 1 << 8;
        /// Pointer to a storage cell.
        const IS_POINTER = 1 << 9;
        /// Fixed-size aggregate (array or struct).
        const IS_AGGREGATE = 1 << 10;
        /// Resizable container (slice or map).
        const IS_CONTAINER = 1 << 11;
        /// Callable.
        const IS_FUNCTION = 1 << 12;
        /// Named interface type.
        const IS_INTERFACE = 1 << 13;
        /// Reserved name whose definition has not been registered yet.
        const IS_PENDING = 1 << 14;
    }
}

impl TypeFlags {
    /// Compute flags for `kind`, given the already-computed flags of its
    /// by-value constituents.
    ///
    /// Comparability is the conjunction over constituents: one slice, map or
    /// func anywhere inside an aggregate poisons the whole aggregate.
    pub(crate) fn for_kind(kind: &TypeKind, constituents: impl Iterator<Item = TypeFlags>) -> Self {
        match kind {
            TypeKind::Basic(_) => TypeFlags::IS_BASIC | TypeFlags::COMPARABLE,
            TypeKind::Pointer(_) => {
                TypeFlags::IS_POINTER | TypeFlags::COMPARABLE | TypeFlags::NILABLE
            }
            TypeKind::Interface(_) => {
                TypeFlags::IS_INTERFACE | TypeFlags::COMPARABLE | TypeFlags::NILABLE
            }
            TypeKind::Array { .. } | TypeKind::Struct(_) => {
                let mut flags = TypeFlags::IS_AGGREGATE | TypeFlags::COMPARABLE;
                for inner in constituents {
                    if !inner.contains(TypeFlags::COMPARABLE) {
                        flags.remove(TypeFlags::COMPARABLE);
                    }
                }
                flags
            }
            TypeKind::Slice(_) | TypeKind::Map { .. } => {
                TypeFlags::IS_CONTAINER | TypeFlags::NILABLE
            }
            TypeKind::Func { .. } => TypeFlags::IS_FUNCTION | TypeFlags::NILABLE,
        }
    }

    #[inline]
    pub fn is_comparable(self) -> bool {
        self.contains(TypeFlags::COMPARABLE)
    }

    #[inline]
    pub fn is_nilable(self) -> bool {
        self.contains(TypeFlags::NILABLE)
    }
}
