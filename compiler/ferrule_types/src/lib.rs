//! Ferrule Types - the type side of interface dispatch.
//!
//! # Architecture
//!
//! - [`TypeRegistry`]: canonical [`TypeDescriptor`]s, one per named concrete
//!   type, plus the [`InterfaceContract`]s they may satisfy
//! - [`TypeFlags`]: comparability and category bits computed once at registration
//! - [`check_conformance`]: pure structural superset check of method sets
//! - [`ConformanceCache`]: memoised conformance per (type, contract) pair
//!
//! Conformance is never stored on a descriptor. A type registered before a
//! contract existed satisfies that contract as soon as its method set covers it.

mod conformance;
mod contract;
mod error;
mod flags;
mod ids;
mod kind;
mod registry;
mod signature;

pub use conformance::{check_conformance, CacheStats, Conformance, ConformanceCache, MethodMismatch};
pub use contract::{ContractDef, InterfaceContract};
pub use error::RegistrationError;
pub use flags::TypeFlags;
pub use ids::{ContractId, TypeId};
pub use kind::{BasicKind, Field, TypeKind};
pub use registry::{TypeDef, TypeDescriptor, TypeRegistry};
pub use signature::MethodSig;
