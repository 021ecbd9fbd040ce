//! Lexical environment built from storage cells.
//!
//! Every binding owns a [`Cell`]. Scopes map names to cells, so capturing a
//! variable means cloning the cell handle, not the value: the enclosing
//! scope and every closure that captured it read and write one location.

// Rc is the intentional implementation detail of LocalScope<T>
#![expect(
    clippy::disallowed_types,
    reason = "Rc is the implementation of LocalScope<T>"
)]

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use ferrule_ir::{Name, SharedInterner};

use crate::errors::{cannot_assign_immutable, undefined_variable};
use crate::{CaptureEnv, EvalError, Value};

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// A single-threaded reference-counted wrapper with interior mutability.
///
/// All `Rc<RefCell<T>>` allocations in the environment go through
/// `LocalScope::new()`. It is deliberately not `Send`: cells shared between
/// independently scheduled tasks need host-provided synchronization.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles share one allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }

    /// Number of live handles to the allocation.
    #[inline]
    pub fn handle_count(this: &Self) -> usize {
        Rc::strong_count(&this.0)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Storage cell backing one variable.
///
/// Clones are handles to the same location. Reads happen when `get` is
/// called, so a closure sees whatever the cell holds at call time.
#[derive(Clone)]
pub struct Cell(LocalScope<Value>);

impl Cell {
    pub fn new(value: Value) -> Self {
        Cell(LocalScope::new(value))
    }

    /// Current contents.
    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: Value) {
        *self.0.borrow_mut() = value;
    }

    pub fn replace(&self, value: Value) -> Value {
        std::mem::replace(&mut *self.0.borrow_mut(), value)
    }

    #[inline]
    pub fn ptr_eq(a: &Cell, b: &Cell) -> bool {
        LocalScope::ptr_eq(&a.0, &b.0)
    }

    /// Number of handles (scopes, closures, pointers) sharing this cell.
    pub fn handle_count(&self) -> usize {
        LocalScope::handle_count(&self.0)
    }

    /// Address of the cell; stable for its lifetime.
    pub fn addr(&self) -> usize {
        self.0.addr()
    }
}

// Contents are not printed: a cell may hold a pointer to itself.
impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell(0x{:x})", self.addr())
    }
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    cell: Cell,
    mutability: Mutability,
}

/// A single scope containing variable bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Bind `name` to `cell` in this scope, shadowing outer bindings.
    #[inline]
    pub fn bind(&mut self, name: Name, cell: Cell, mutability: Mutability) {
        self.bindings.insert(name, Binding { cell, mutability });
    }

    /// Find the innermost binding of `name`.
    pub fn resolve(&self, name: Name) -> Option<(Cell, Mutability)> {
        if let Some(binding) = self.bindings.get(&name) {
            return Some((binding.cell.clone(), binding.mutability));
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().resolve(name))
    }
}

/// Environment using a scope stack.
pub struct Environment {
    /// Stack of scopes, with current scope at the top.
    scopes: Vec<LocalScope<Scope>>,
    /// Global scope (always at the bottom).
    global: LocalScope<Scope>,
    interner: SharedInterner,
}

impl Environment {
    pub fn new(interner: SharedInterner) -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
            interner,
        }
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current_scope().clone();
        self.scopes.push(LocalScope::new(Scope::with_parent(parent)));
    }

    /// Pop the current scope. The global scope is never popped.
    ///
    /// Cells of the popped scope stay alive as long as a closure or pointer
    /// still holds them.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[inline]
    fn current_scope(&self) -> &LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global)
    }

    /// Define a variable in the current scope with a fresh cell.
    pub fn define(&mut self, name: Name, value: Value, mutability: Mutability) -> Cell {
        let cell = Cell::new(value);
        self.define_cell(name, cell.clone(), mutability);
        cell
    }

    /// Bind an existing cell in the current scope.
    pub fn define_cell(&mut self, name: Name, cell: Cell, mutability: Mutability) {
        self.current_scope().borrow_mut().bind(name, cell, mutability);
    }

    pub fn define_global(&mut self, name: Name, value: Value) {
        self.global
            .borrow_mut()
            .bind(name, Cell::new(value), Mutability::Immutable);
    }

    /// Current value of a variable.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.lookup_cell(name).map(|cell| cell.get())
    }

    pub fn lookup_cell(&self, name: Name) -> Option<Cell> {
        self.current_scope()
            .borrow()
            .resolve(name)
            .map(|(cell, _)| cell)
    }

    /// Write through the variable's cell; every capturer observes it.
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), EvalError> {
        let (cell, mutability) = self.resolve(name)?;
        if !mutability.is_mutable() {
            return Err(cannot_assign_immutable(self.interner.lookup(name)));
        }
        cell.set(value);
        Ok(())
    }

    /// The one cell backing `name` in the current lexical scope.
    pub fn capture_shared(&self, name: Name) -> Result<Cell, EvalError> {
        self.resolve(name).map(|(cell, _)| cell)
    }

    /// Capture `names`, in order, for a function literal.
    pub fn capture(&self, names: &[Name]) -> Result<CaptureEnv, EvalError> {
        let mut env = CaptureEnv::new(self.interner.clone());
        for &name in names {
            let (cell, mutability) = self.resolve(name)?;
            env.insert(name, cell, mutability);
        }
        Ok(env)
    }

    /// `&name`: a pointer to the variable's cell.
    pub fn address_of(&self, name: Name) -> Result<Value, EvalError> {
        self.capture_shared(name).map(Value::pointer_to)
    }

    /// Environment for a function call: shares globals, fresh local stack.
    #[must_use]
    pub fn child(&self) -> Self {
        let global = self.global.clone();
        Environment {
            scopes: vec![global.clone()],
            global,
            interner: self.interner.clone(),
        }
    }

    fn resolve(&self, name: Name) -> Result<(Cell, Mutability), EvalError> {
        self.current_scope()
            .borrow()
            .resolve(name)
            .ok_or_else(|| undefined_variable(self.interner.lookup(name)))
    }
}

#[cfg(test)]
mod tests;
