//! Runtime payloads.
//!
//! A `Value` is what an interface value carries next to its type tag. All
//! heap payloads go through [`Heap`], so cloning a `Value` never deep-copies:
//! boxing a value into an interface shares the payload with the original.
//!
//! Pointers are storage cells. Taking the address of a variable hands out
//! the same [`Cell`] a closure captures, and pointer equality is cell
//! identity.

mod heap;

use std::fmt;

use ferrule_stack::ensure_sufficient_stack;
use ferrule_types::{BasicKind, TypeId, TypeKind, TypeRegistry};

pub use heap::Heap;

use crate::{Cell, Closure, InterfaceValue};

/// Runtime value in the Ferrule runtime.
#[derive(Clone, Debug)]
pub enum Value {
    // Scalars (inline)
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Heap<String>),

    /// Pointer to a storage cell; `None` is the nil pointer.
    Pointer(Option<Cell>),

    // Fixed-size aggregates
    Array(Heap<Vec<Value>>),
    /// Field values in declaration order.
    Struct(Heap<Vec<Value>>),

    // Nilable containers and callables
    Slice(Option<Heap<Vec<Value>>>),
    Map(Option<Heap<Vec<(Value, Value)>>>),
    Func(Option<Closure>),

    /// Content of an interface-typed location (field, element, variable).
    Interface(InterfaceValue),
}

impl Value {
    // Factory methods

    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(items))
    }

    pub fn structure(fields: Vec<Value>) -> Self {
        Value::Struct(Heap::new(fields))
    }

    pub fn slice(items: Vec<Value>) -> Self {
        Value::Slice(Some(Heap::new(items)))
    }

    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map(Some(Heap::new(entries)))
    }

    pub fn pointer_to(cell: Cell) -> Self {
        Value::Pointer(Some(cell))
    }

    /// A fresh cell holding `value`, and a pointer to it.
    pub fn new_pointer(value: Value) -> Self {
        Value::Pointer(Some(Cell::new(value)))
    }

    #[inline]
    pub fn nil_pointer() -> Self {
        Value::Pointer(None)
    }

    pub fn func(closure: Closure) -> Self {
        Value::Func(Some(closure))
    }

    // Accessors

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&Cell> {
        match self {
            Value::Pointer(Some(cell)) => Some(cell),
            _ => None,
        }
    }

    /// Elements of an array, struct or non-nil slice.
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::Struct(items) | Value::Slice(Some(items)) => {
                Some(items.as_slice())
            }
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&Closure> {
        match self {
            Value::Func(Some(closure)) => Some(closure),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceValue> {
        match self {
            Value::Interface(iv) => Some(iv),
            _ => None,
        }
    }

    /// Shape name for diagnostics when no type tag is at hand.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Pointer(_) => "pointer",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Slice(_) => "slice",
            Value::Map(_) => "map",
            Value::Func(_) => "func",
            Value::Interface(_) => "interface",
        }
    }

    /// The zero value of `ty`.
    ///
    /// `None` for ids the registry does not know or has only reserved.
    pub fn zero(registry: &TypeRegistry, ty: TypeId) -> Option<Value> {
        let kind = registry.get(ty)?.kind()?;
        ensure_sufficient_stack(|| match kind {
            TypeKind::Basic(BasicKind::Int) => Some(Value::Int(0)),
            TypeKind::Basic(BasicKind::Float) => Some(Value::Float(0.0)),
            TypeKind::Basic(BasicKind::Bool) => Some(Value::Bool(false)),
            TypeKind::Basic(BasicKind::Str) => Some(Value::string("")),
            TypeKind::Pointer(_) => Some(Value::Pointer(None)),
            TypeKind::Array { elem, len } => {
                let elem = Value::zero(registry, *elem)?;
                Some(Value::array(vec![elem; *len]))
            }
            TypeKind::Struct(fields) => fields
                .iter()
                .map(|f| Value::zero(registry, f.ty))
                .collect::<Option<Vec<_>>>()
                .map(Value::structure),
            TypeKind::Slice(_) => Some(Value::Slice(None)),
            TypeKind::Map { .. } => Some(Value::Map(None)),
            TypeKind::Func { .. } => Some(Value::Func(None)),
            TypeKind::Interface(_) => Some(Value::Interface(InterfaceValue::nil())),
        })
    }
}

/// Host-level structural equality, used by tests and hosts.
///
/// This is not the language's `==`: it ignores comparability and never
/// fails. Use [`InterfaceValue::equals`] for that.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Pointer(a), Value::Pointer(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Cell::ptr_eq(a, b),
                _ => false,
            },
            (Value::Array(a), Value::Array(b)) | (Value::Struct(a), Value::Struct(b)) => {
                a.as_slice() == b.as_slice()
            }
            (Value::Slice(a), Value::Slice(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.as_slice() == b.as_slice(),
                _ => false,
            },
            (Value::Map(a), Value::Map(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.as_slice() == b.as_slice(),
                _ => false,
            },
            (Value::Func(a), Value::Func(b)) => match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Closure::ptr_eq(a, b),
                _ => false,
            },
            (Value::Interface(a), Value::Interface(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "\"{}\"", s.as_str()),
            Value::Pointer(None)
            | Value::Slice(None)
            | Value::Map(None)
            | Value::Func(None) => write!(f, "<nil>"),
            Value::Pointer(Some(cell)) => write!(f, "0x{:x}", cell.addr()),
            Value::Array(items) | Value::Slice(Some(items)) => {
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }
            Value::Struct(fields) => {
                write!(f, "{{")?;
                write_seq(f, fields)?;
                write!(f, "}}")
            }
            Value::Map(Some(entries)) => {
                write!(f, "map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "]")
            }
            Value::Func(Some(_)) => write!(f, "<func>"),
            Value::Interface(iv) => match iv.payload() {
                Some(payload) => write!(f, "{payload}"),
                None => write!(f, "<nil>"),
            },
        }
    }
}
