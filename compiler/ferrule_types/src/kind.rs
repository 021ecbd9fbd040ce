//! Structural shape of a concrete type.

use ferrule_ir::Name;
use smallvec::SmallVec;

use crate::{ContractId, TypeId};

/// Scalar kinds provided by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Int,
    Float,
    Bool,
    Str,
}

impl BasicKind {
    /// Display name of the host scalar.
    pub fn as_str(self) -> &'static str {
        match self {
            BasicKind::Int => "int",
            BasicKind::Float => "float",
            BasicKind::Bool => "bool",
            BasicKind::Str => "string",
        }
    }
}

/// A named struct field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Name,
    pub ty: TypeId,
}

impl Field {
    pub const fn new(name: Name, ty: TypeId) -> Self {
        Field { name, ty }
    }
}

/// The shape a [`TypeDef`](crate::TypeDef) is built from.
///
/// Constituent types must already be registered (or reserved, for
/// positions that are not stored by value).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Basic(BasicKind),
    /// Pointer to a storage cell holding an `elem`; compared by identity.
    Pointer(TypeId),
    /// Fixed-size array; comparable iff `elem` is.
    Array { elem: TypeId, len: usize },
    /// Fixed field list; comparable iff every field is.
    Struct(Vec<Field>),
    /// Resizable sequence. Never comparable.
    Slice(TypeId),
    /// Keyed container. Never comparable; `key` must be.
    Map { key: TypeId, value: TypeId },
    /// Callable. Never comparable.
    Func {
        params: SmallVec<[TypeId; 4]>,
        results: SmallVec<[TypeId; 2]>,
    },
    /// A named interface type; values of it hold an interface value.
    Interface(ContractId),
}

impl TypeKind {
    /// Types stored inline in a value of this kind.
    ///
    /// These must be complete at registration because comparability and
    /// zero values are derived from them.
    pub(crate) fn by_value_constituents(&self) -> SmallVec<[TypeId; 4]> {
        match self {
            TypeKind::Array { elem, .. } => smallvec::smallvec![*elem],
            TypeKind::Struct(fields) => fields.iter().map(|f| f.ty).collect(),
            TypeKind::Map { key, .. } => smallvec::smallvec![*key],
            TypeKind::Basic(_)
            | TypeKind::Pointer(_)
            | TypeKind::Slice(_)
            | TypeKind::Func { .. }
            | TypeKind::Interface(_) => SmallVec::new(),
        }
    }

    /// Every type id the kind mentions.
    pub(crate) fn referenced_types(&self) -> SmallVec<[TypeId; 4]> {
        match self {
            TypeKind::Basic(_) | TypeKind::Interface(_) => SmallVec::new(),
            TypeKind::Pointer(elem) | TypeKind::Slice(elem) | TypeKind::Array { elem, .. } => {
                smallvec::smallvec![*elem]
            }
            TypeKind::Struct(fields) => fields.iter().map(|f| f.ty).collect(),
            TypeKind::Map { key, value } => smallvec::smallvec![*key, *value],
            TypeKind::Func { params, results } => {
                params.iter().chain(results.iter()).copied().collect()
            }
        }
    }
}
