//! Ferrule Eval - interface values, dynamic dispatch and closure capture.
//!
//! # Architecture
//!
//! - `Value`: runtime payloads, heap data shared through `Heap`
//! - `InterfaceValue`: a `(dynamic type, payload)` pair or nil, with the `==` rule
//! - `Dispatcher`: conformance-checked assignment, assertion, type switch
//!   and method calls, over a `SharedMutableRegistry<TypeRegistry>`
//! - `Environment`: scope stack whose bindings are shared `Cell`s
//! - `Closure`: function literal holding an ordered `CaptureEnv`
//! - `LoopBinding`: the per-loop choice between one shared cell and a fresh
//!   cell per iteration
//!
//! Type descriptors, contracts and conformance live in `ferrule_types`.

mod closure;
mod dispatch;
mod environment;
pub mod errors;
mod interface;
mod logging;
mod shared;
mod value;

pub use closure::{
    run_counted_loop, run_range_loop, CallFrame, CaptureEnv, Captured, Closure, ClosureBody,
    IterationBinding, LoopBinding, LoopFlow,
};
pub use dispatch::{
    Dispatcher, DispatcherBuilder, MethodKey, MethodKeyDisplay, MethodTable, Narrowed,
    NativeMethod, SwitchOutcome, SwitchResult, TypeSwitch,
};
pub use environment::{Cell, Environment, LocalScope, Mutability, Scope};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interface::InterfaceValue;
pub use logging::init_tracing;
pub use shared::SharedMutableRegistry;
pub use value::{Heap, Value};
