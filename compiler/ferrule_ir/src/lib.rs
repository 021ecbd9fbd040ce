//! Ferrule IR - identifiers shared across the Ferrule runtime.
//!
//! Type names, method names and captured-variable names are all interned
//! into compact [`Name`] handles so registries can key on them cheaply.

mod interner;
mod name;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
