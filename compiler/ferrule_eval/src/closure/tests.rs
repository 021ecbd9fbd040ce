use super::*;
use crate::environment::Environment;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

fn env() -> Environment {
    Environment::new(SharedInterner::default())
}

/// `func() int { return <name> }`
fn reader(env: &Environment, name: Name) -> Closure {
    let captures = env.capture(&[name]).unwrap();
    Closure::new(Vec::new(), captures, move |frame| frame.get(name))
}

#[test]
fn test_reads_cell_at_call_time() {
    let mut env = env();
    let x = env.interner().intern("x");
    env.define(x, Value::Int(1), Mutability::Mutable);
    let f = reader(&env, x);

    env.assign(x, Value::Int(2)).unwrap();
    assert_eq!(f.invoke(&[]).unwrap(), Value::Int(2));
}

#[test]
fn test_closure_writes_visible_to_enclosing_scope_and_siblings() {
    let mut env = env();
    let count = env.interner().intern("count");
    env.define(count, Value::Int(0), Mutability::Mutable);

    let captures = env.capture(&[count]).unwrap();
    let incr = Closure::new(Vec::new(), captures, move |frame| {
        let next = frame.get(count)?.as_int().unwrap_or(0) + 1;
        frame.set(count, Value::Int(next))?;
        Ok(Value::Int(next))
    });
    let read = reader(&env, count);

    incr.invoke(&[]).unwrap();
    incr.invoke(&[]).unwrap();
    assert_eq!(env.lookup(count), Some(Value::Int(2)));
    assert_eq!(read.invoke(&[]).unwrap(), Value::Int(2));
}

#[test]
fn test_params_shadow_captures() {
    let mut env = env();
    let x = env.interner().intern("x");
    env.define(x, Value::Int(1), Mutability::Mutable);
    let captures = env.capture(&[x]).unwrap();
    let f = Closure::new(vec![x], captures, move |frame| frame.get(x));
    assert_eq!(f.invoke(&[Value::Int(10)]).unwrap(), Value::Int(10));
}

#[test]
fn test_arity_checked() {
    let env = env();
    let x = env.interner().intern("x");
    let f = Closure::new(vec![x], CaptureEnv::new(env.interner().clone()), move |frame| {
        frame.get(x)
    });
    let err = f.invoke(&[]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "closure".to_string(),
            expected: 1,
            got: 0,
        }
    );
}

#[test]
fn test_immutable_capture_rejects_writes() {
    let mut env = env();
    let k = env.interner().intern("k");
    env.define(k, Value::Int(1), Mutability::Immutable);
    let captures = env.capture(&[k]).unwrap();
    let f = Closure::new(Vec::new(), captures, move |frame| {
        frame.set(k, Value::Int(2))?;
        Ok(Value::Int(0))
    });
    let err = f.invoke(&[]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ImmutableBinding { .. }));
}

#[test]
fn test_capture_env_first_insert_wins() {
    let env = env();
    let x = env.interner().intern("x");
    let first = Cell::new(Value::Int(1));
    let mut captures = CaptureEnv::new(env.interner().clone());
    captures.insert(x, first.clone(), Mutability::Mutable);
    captures.insert(x, Cell::new(Value::Int(2)), Mutability::Mutable);
    assert_eq!(captures.len(), 1);
    assert!(Cell::ptr_eq(captures.get(x).unwrap(), &first));
}

#[test]
fn test_cell_policy_shared_reuses_one_cell() {
    let i = SharedInterner::default();
    let mut binding = LoopBinding::shared(i.intern("i"));
    let a = binding.cell_for_iteration(Value::Int(0));
    let b = binding.cell_for_iteration(Value::Int(1));
    assert!(Cell::ptr_eq(&a, &b));
    assert_eq!(a.get(), Value::Int(1));
}

#[test]
fn test_cell_policy_fresh_allocates_per_iteration() {
    let i = SharedInterner::default();
    let mut binding = LoopBinding::fresh_per_iteration(i.intern("i"));
    let a = binding.cell_for_iteration(Value::Int(0));
    let b = binding.cell_for_iteration(Value::Int(1));
    assert!(!Cell::ptr_eq(&a, &b));
    assert_eq!(a.get(), Value::Int(0));
    assert_eq!(b.get(), Value::Int(1));
}

/// `for i := 0; i < 3; i++ { fs = append(fs, func() int { return i }) }`
fn collect_loop_closures(policy: IterationBinding) -> Vec<Value> {
    let mut env = env();
    let i = env.interner().intern("i");
    let mut binding = LoopBinding::new(i, policy);
    let mut closures = Vec::new();

    run_counted_loop(
        &mut env,
        &mut binding,
        Value::Int(0),
        |v| v.as_int().is_some_and(|n| n < 3),
        |v| Value::Int(v.as_int().unwrap_or(0) + 1),
        |env| {
            closures.push(reader(env, i));
            Ok(LoopFlow::Next)
        },
    )
    .unwrap();

    closures.iter().map(|f| f.invoke(&[]).unwrap()).collect()
}

#[test]
fn test_counted_loop_shared_cell_reports_final_value() {
    assert_eq!(
        collect_loop_closures(IterationBinding::SharedAcrossIterations),
        vec![Value::Int(3), Value::Int(3), Value::Int(3)]
    );
}

#[test]
fn test_counted_loop_fresh_cells_report_each_iteration() {
    assert_eq!(
        collect_loop_closures(IterationBinding::FreshPerIteration),
        vec![Value::Int(0), Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn test_body_write_carries_into_next_iteration() {
    let mut env = env();
    let i = env.interner().intern("i");
    let mut binding = LoopBinding::fresh_per_iteration(i);
    let mut seen = Vec::new();

    run_counted_loop(
        &mut env,
        &mut binding,
        Value::Int(0),
        |v| v.as_int().is_some_and(|n| n < 10),
        |v| Value::Int(v.as_int().unwrap_or(0) + 1),
        |env| {
            let n = env.lookup(i).and_then(|v| v.as_int()).unwrap_or(-1);
            seen.push(n);
            env.assign(i, Value::Int(n + 3))?;
            Ok(LoopFlow::Next)
        },
    )
    .unwrap();

    assert_eq!(seen, vec![0, 4, 8]);
}

#[test]
fn test_range_loop_break_stops_early() {
    let mut env = env();
    let v = env.interner().intern("v");
    let mut binding = LoopBinding::fresh_per_iteration(v);
    let mut closures = Vec::new();

    run_range_loop(
        &mut env,
        &mut binding,
        [10, 20, 30, 40].map(Value::Int),
        |env| {
            closures.push(reader(env, v));
            if env.lookup(v) == Some(Value::Int(30)) {
                return Ok(LoopFlow::Break);
            }
            Ok(LoopFlow::Next)
        },
    )
    .unwrap();

    let values: Vec<_> = closures.iter().map(|f| f.invoke(&[]).unwrap()).collect();
    assert_eq!(values, vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
    assert_eq!(env.lookup(v), None);
}

#[test]
fn test_body_error_propagates_and_scope_is_popped() {
    let mut env = env();
    let v = env.interner().intern("v");
    let mut binding = LoopBinding::shared(v);
    let err = run_range_loop(&mut env, &mut binding, [Value::Int(1)], |_| {
        Err(EvalError::new("boom"))
    })
    .unwrap_err();
    assert_eq!(err.message, "boom");
    assert_eq!(env.depth(), 1);
}
