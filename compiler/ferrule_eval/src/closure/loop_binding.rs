//! Loop-variable binding policy.
//!
//! A loop variable captured by closures inside the body can be bound two
//! ways, and the loop construct must say which:
//!
//! - [`IterationBinding::SharedAcrossIterations`]: one cell for the whole
//!   loop. Every closure created in any iteration reads that cell, so after
//!   the loop they all report the variable's final value.
//! - [`IterationBinding::FreshPerIteration`]: a new cell per iteration,
//!   initialised with the then-current value before the body runs. Each
//!   iteration's closures keep their own value.
//!
//! Neither is a default; callers name the policy.

use ferrule_ir::Name;
use tracing::trace;

use crate::environment::{Environment, Mutability};
use crate::{Cell, EvalError, Value};

/// How a loop binds its control variable across iterations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IterationBinding {
    SharedAcrossIterations,
    FreshPerIteration,
}

/// Whether the loop continues after a body run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopFlow {
    Next,
    Break,
}

/// Policy object a loop applies to its control variable.
#[derive(Debug)]
pub struct LoopBinding {
    var: Name,
    policy: IterationBinding,
    /// The single cell, once created, under the shared policy.
    shared: Option<Cell>,
}

impl LoopBinding {
    pub fn new(var: Name, policy: IterationBinding) -> Self {
        LoopBinding {
            var,
            policy,
            shared: None,
        }
    }

    /// One cell for the whole loop.
    pub fn shared(var: Name) -> Self {
        Self::new(var, IterationBinding::SharedAcrossIterations)
    }

    /// A distinct cell per iteration.
    pub fn fresh_per_iteration(var: Name) -> Self {
        Self::new(var, IterationBinding::FreshPerIteration)
    }

    #[inline]
    pub fn var(&self) -> Name {
        self.var
    }

    #[inline]
    pub fn policy(&self) -> IterationBinding {
        self.policy
    }

    /// The cell the next iteration binds the variable to, holding `current`.
    pub fn cell_for_iteration(&mut self, current: Value) -> Cell {
        match self.policy {
            IterationBinding::FreshPerIteration => Cell::new(current),
            IterationBinding::SharedAcrossIterations => match &self.shared {
                Some(cell) => {
                    cell.set(current);
                    cell.clone()
                }
                None => {
                    let cell = Cell::new(current);
                    self.shared = Some(cell.clone());
                    cell
                }
            },
        }
    }
}

/// Three-clause loop: `for var := init; cond(var); var = post(var) { body }`.
///
/// The body runs in its own scope with `var` bound to the iteration's cell.
/// `post` reads the variable through that cell, so body writes to it carry
/// into the next iteration under either policy.
pub fn run_counted_loop(
    env: &mut Environment,
    binding: &mut LoopBinding,
    init: Value,
    mut cond: impl FnMut(&Value) -> bool,
    mut post: impl FnMut(&Value) -> Value,
    mut body: impl FnMut(&mut Environment) -> Result<LoopFlow, EvalError>,
) -> Result<(), EvalError> {
    trace!(policy = ?binding.policy(), "counted loop");
    let mut current = init;
    let mut iterations = 0usize;
    loop {
        let cell = binding.cell_for_iteration(current);
        if !cond(&cell.get()) {
            break;
        }

        env.push_scope();
        env.define_cell(binding.var(), cell.clone(), Mutability::Mutable);
        let flow = body(env);
        env.pop_scope();
        iterations += 1;

        if flow? == LoopFlow::Break {
            break;
        }
        current = post(&cell.get());
    }
    trace!(iterations, "counted loop done");
    Ok(())
}

/// Range loop: bind `var` to each item in turn and run `body`.
pub fn run_range_loop(
    env: &mut Environment,
    binding: &mut LoopBinding,
    items: impl IntoIterator<Item = Value>,
    mut body: impl FnMut(&mut Environment) -> Result<LoopFlow, EvalError>,
) -> Result<(), EvalError> {
    trace!(policy = ?binding.policy(), "range loop");
    for item in items {
        let cell = binding.cell_for_iteration(item);
        env.push_scope();
        env.define_cell(binding.var(), cell, Mutability::Mutable);
        let flow = body(env);
        env.pop_scope();
        if flow? == LoopFlow::Break {
            break;
        }
    }
    Ok(())
}
