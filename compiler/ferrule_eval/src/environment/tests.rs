use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

fn env() -> Environment {
    Environment::new(SharedInterner::default())
}

#[test]
fn test_define_and_lookup() {
    let mut env = env();
    let x = env.interner().intern("x");
    env.define(x, Value::Int(42), Mutability::Immutable);
    assert_eq!(env.lookup(x), Some(Value::Int(42)));
}

#[test]
fn test_inner_scope_shadows_and_pops() {
    let mut env = env();
    let x = env.interner().intern("x");
    env.define(x, Value::Int(1), Mutability::Mutable);

    env.push_scope();
    env.define(x, Value::Int(2), Mutability::Mutable);
    assert_eq!(env.lookup(x), Some(Value::Int(2)));
    env.pop_scope();

    assert_eq!(env.lookup(x), Some(Value::Int(1)));
}

#[test]
fn test_global_scope_never_popped() {
    let mut env = env();
    assert_eq!(env.depth(), 1);
    env.pop_scope();
    env.pop_scope();
    assert_eq!(env.depth(), 1);
}

#[test]
fn test_assign_writes_through_outer_cell() {
    let mut env = env();
    let x = env.interner().intern("x");
    let cell = env.define(x, Value::Int(1), Mutability::Mutable);

    env.push_scope();
    env.assign(x, Value::Int(5)).unwrap();
    env.pop_scope();

    assert_eq!(cell.get(), Value::Int(5));
    assert_eq!(env.lookup(x), Some(Value::Int(5)));
}

#[test]
fn test_assign_immutable_fails() {
    let mut env = env();
    let x = env.interner().intern("x");
    env.define(x, Value::Int(1), Mutability::Immutable);
    let err = env.assign(x, Value::Int(2)).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ImmutableBinding {
            name: "x".to_string()
        }
    );
}

#[test]
fn test_assign_undefined_fails() {
    let mut env = env();
    let y = env.interner().intern("y");
    let err = env.assign(y, Value::Int(2)).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedVariable { .. }));
}

#[test]
fn test_capture_shared_returns_the_binding_cell() {
    let mut env = env();
    let x = env.interner().intern("x");
    let cell = env.define(x, Value::Int(1), Mutability::Mutable);

    let captured = env.capture_shared(x).unwrap();
    assert!(Cell::ptr_eq(&cell, &captured));

    captured.set(Value::Int(9));
    assert_eq!(env.lookup(x), Some(Value::Int(9)));
}

#[test]
fn test_capture_keeps_order() {
    let mut env = env();
    let i = env.interner().clone();
    let (a, b, c) = (i.intern("a"), i.intern("b"), i.intern("c"));
    for name in [a, b, c] {
        env.define(name, Value::Int(0), Mutability::Mutable);
    }
    let captures = env.capture(&[c, a]).unwrap();
    let names: Vec<_> = captures.iter().map(|cap| cap.name).collect();
    assert_eq!(names, vec![c, a]);
}

#[test]
fn test_address_of_aliases_the_variable() {
    let mut env = env();
    let x = env.interner().intern("x");
    env.define(x, Value::Int(1), Mutability::Mutable);

    let ptr = env.address_of(x).unwrap();
    ptr.as_pointer().unwrap().set(Value::Int(7));
    assert_eq!(env.lookup(x), Some(Value::Int(7)));
}

#[test]
fn test_cell_outlives_popped_scope() {
    let mut env = env();
    let x = env.interner().intern("x");
    env.push_scope();
    let cell = env.define(x, Value::Int(3), Mutability::Mutable);
    let captured = env.capture_shared(x).unwrap();
    env.pop_scope();

    assert_eq!(env.lookup(x), None);
    assert_eq!(captured.get(), Value::Int(3));
    assert_eq!(cell.handle_count(), 2);
}

#[test]
fn test_child_sees_globals_only() {
    let mut env = env();
    let i = env.interner().clone();
    let (g, local) = (i.intern("g"), i.intern("local"));
    env.define_global(g, Value::Int(1));
    env.push_scope();
    env.define(local, Value::Int(2), Mutability::Mutable);

    let child = env.child();
    assert_eq!(child.lookup(g), Some(Value::Int(1)));
    assert_eq!(child.lookup(local), None);
}
