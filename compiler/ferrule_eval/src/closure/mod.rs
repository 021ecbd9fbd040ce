//! Function literals and their captured environments.
//!
//! A [`Closure`] holds a [`CaptureEnv`]: an ordered list of
//! `(name, cell)` pairs taken from the defining scope. Cells are shared,
//! not copied, so:
//!
//! - writes by the enclosing code after the closure was created are visible
//!   to the closure
//! - writes by the closure are visible to the enclosing code and to every
//!   other closure holding the same cell
//! - a captured variable is read when the closure runs, not when it is built
//!
//! The only way two closures see distinct copies of "the same" variable is
//! that the variable was bound to distinct cells, which is what
//! [`IterationBinding::FreshPerIteration`] does for loop variables.

// Rc<dyn Fn> is the implementation of Closure; Heap<T> is sized-only.
#![expect(clippy::disallowed_types, reason = "Rc is the implementation of Closure")]

mod loop_binding;

use std::fmt;
use std::rc::Rc;

use ferrule_ir::{Name, SharedInterner};

use crate::environment::Mutability;
use crate::errors::{cannot_assign_immutable, undefined_variable, wrong_arg_count};
use crate::{Cell, EvalError, EvalResult, Value};

pub use loop_binding::{run_counted_loop, run_range_loop, IterationBinding, LoopBinding, LoopFlow};

/// One captured variable.
#[derive(Clone, Debug)]
pub struct Captured {
    pub name: Name,
    pub cell: Cell,
    pub mutability: Mutability,
}

/// Ordered mapping from captured name to storage cell.
#[derive(Clone)]
pub struct CaptureEnv {
    entries: Vec<Captured>,
    interner: SharedInterner,
}

impl CaptureEnv {
    pub fn new(interner: SharedInterner) -> Self {
        CaptureEnv {
            entries: Vec::new(),
            interner,
        }
    }

    /// Add a capture; capturing a name twice keeps the first cell.
    pub fn insert(&mut self, name: Name, cell: Cell, mutability: Mutability) {
        if self.get(name).is_none() {
            self.entries.push(Captured {
                name,
                cell,
                mutability,
            });
        }
    }

    pub fn get(&self, name: Name) -> Option<&Cell> {
        self.entries
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Captured> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, name: Name) -> Option<&Captured> {
        self.entries.iter().find(|c| c.name == name)
    }
}

impl fmt::Debug for CaptureEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|c| (self.interner.lookup(c.name), &c.cell)),
            )
            .finish()
    }
}

/// Body of a closure: receives the call frame, returns a value.
pub type ClosureBody = dyn Fn(&CallFrame<'_>) -> EvalResult;

/// A callable function literal.
#[derive(Clone)]
pub struct Closure {
    params: Rc<[Name]>,
    captures: Rc<CaptureEnv>,
    body: Rc<ClosureBody>,
}

impl Closure {
    pub fn new(
        params: Vec<Name>,
        captures: CaptureEnv,
        body: impl Fn(&CallFrame<'_>) -> EvalResult + 'static,
    ) -> Self {
        Closure {
            params: params.into(),
            captures: Rc::new(captures),
            body: Rc::new(body),
        }
    }

    pub fn params(&self) -> &[Name] {
        &self.params
    }

    pub fn captures(&self) -> &CaptureEnv {
        &self.captures
    }

    /// Call the closure. Captured cells are dereferenced now.
    pub fn invoke(&self, args: &[Value]) -> EvalResult {
        if args.len() != self.params.len() {
            return Err(wrong_arg_count("closure", self.params.len(), args.len()));
        }
        let frame = CallFrame {
            params: &self.params,
            args,
            captures: &self.captures,
        };
        (self.body)(&frame)
    }

    /// Identity comparison (the same literal evaluation).
    pub fn ptr_eq(a: &Closure, b: &Closure) -> bool {
        Rc::ptr_eq(&a.body, &b.body) && Rc::ptr_eq(&a.captures, &b.captures)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("arity", &self.params.len())
            .field("captures", &self.captures)
            .finish_non_exhaustive()
    }
}

/// What a closure body sees while it runs.
pub struct CallFrame<'a> {
    params: &'a [Name],
    args: &'a [Value],
    captures: &'a CaptureEnv,
}

impl CallFrame<'_> {
    /// Read a parameter or captured variable.
    ///
    /// Parameters shadow captures of the same name.
    pub fn get(&self, name: Name) -> EvalResult {
        if let Some(pos) = self.params.iter().position(|p| *p == name) {
            return Ok(self.args[pos].clone());
        }
        self.captures
            .get(name)
            .map(Cell::get)
            .ok_or_else(|| undefined_variable(self.captures.interner.lookup(name)))
    }

    /// Write a captured variable through its shared cell.
    pub fn set(&self, name: Name, value: Value) -> Result<(), EvalError> {
        let captured = self
            .captures
            .entry(name)
            .ok_or_else(|| undefined_variable(self.captures.interner.lookup(name)))?;
        if !captured.mutability.is_mutable() {
            return Err(cannot_assign_immutable(self.captures.interner.lookup(name)));
        }
        captured.cell.set(value);
        Ok(())
    }

    /// Positional argument.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn cell(&self, name: Name) -> Option<&Cell> {
        self.captures.get(name)
    }
}

#[cfg(test)]
mod tests;
