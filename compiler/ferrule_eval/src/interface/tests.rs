use super::*;
use crate::errors::EvalErrorKind;
use crate::Cell;
use ferrule_ir::SharedInterner;
use ferrule_types::{BasicKind, ContractDef, Field, TypeDef, TypeKind, TypeRegistry};
use pretty_assertions::assert_eq;

struct Fixture {
    reg: TypeRegistry,
    int: TypeId,
    string: TypeId,
    ptr: TypeId,
    ints: TypeId,
    counts: TypeId,
    holder: TypeId,
}

fn fixture() -> Fixture {
    let mut reg = TypeRegistry::new(SharedInterner::default());
    let i = reg.interner().clone();
    let int = reg.basic(BasicKind::Int);
    let string = reg.basic(BasicKind::Str);
    let ptr = reg
        .register(TypeDef::new(i.intern("*int"), TypeKind::Pointer(int)))
        .unwrap();
    let ints = reg
        .register(TypeDef::new(i.intern("[]int"), TypeKind::Slice(int)))
        .unwrap();
    let counts = reg
        .register(TypeDef::new(
            i.intern("map[string]int"),
            TypeKind::Map {
                key: string,
                value: int,
            },
        ))
        .unwrap();
    let any = reg.define_contract(ContractDef::new(i.intern("any"))).unwrap();
    let any_ty = reg
        .register(TypeDef::new(i.intern("any"), TypeKind::Interface(any)))
        .unwrap();
    let holder = reg
        .register(TypeDef::new(
            i.intern("Holder"),
            TypeKind::Struct(vec![Field::new(i.intern("v"), any_ty)]),
        ))
        .unwrap();
    Fixture {
        reg,
        int,
        string,
        ptr,
        ints,
        counts,
        holder,
    }
}

#[test]
fn test_nil_is_only_the_empty_tag() {
    let f = fixture();
    assert!(InterfaceValue::nil().is_nil());
    assert!(InterfaceValue::default().is_nil());

    let typed_nil = InterfaceValue::boxed(f.ptr, Value::nil_pointer());
    assert!(!typed_nil.is_nil());
    assert_eq!(typed_nil.dynamic_type(), Some(f.ptr));
    assert_eq!(typed_nil.payload(), Some(&Value::nil_pointer()));
}

#[test]
fn test_typed_nil_not_equal_to_nil() {
    let f = fixture();
    let typed_nil = InterfaceValue::boxed(f.ptr, Value::nil_pointer());
    assert_eq!(typed_nil.equals(&InterfaceValue::nil(), &f.reg), Ok(false));
    assert_eq!(
        InterfaceValue::nil().equals(&InterfaceValue::nil(), &f.reg),
        Ok(true)
    );
}

#[test]
fn test_basic_payloads_compare_by_value() {
    let f = fixture();
    let a = InterfaceValue::boxed(f.int, Value::Int(7));
    let b = InterfaceValue::boxed(f.int, Value::Int(7));
    let c = InterfaceValue::boxed(f.int, Value::Int(8));
    assert_eq!(a.equals(&b, &f.reg), Ok(true));
    assert_eq!(a.equals(&c, &f.reg), Ok(false));
}

#[test]
fn test_nan_is_not_equal_to_itself() {
    let f = fixture();
    let float = f.reg.basic(BasicKind::Float);
    let nan = InterfaceValue::boxed(float, Value::Float(f64::NAN));
    let one = InterfaceValue::boxed(float, Value::Float(1.0));
    assert_eq!(nan.equals(&nan, &f.reg), Ok(false));
    assert_eq!(nan.equals(&nan.clone(), &f.reg), Ok(false));
    assert_eq!(one.equals(&one, &f.reg), Ok(true));
}

#[test]
fn test_different_dynamic_types_unequal() {
    let f = fixture();
    let n = InterfaceValue::boxed(f.int, Value::Int(1));
    let s = InterfaceValue::boxed(f.string, Value::string("1"));
    assert_eq!(n.equals(&s, &f.reg), Ok(false));
}

#[test]
fn test_pointers_compare_by_identity() {
    let f = fixture();
    let cell = Cell::new(Value::Int(1));
    let a = InterfaceValue::boxed(f.ptr, Value::pointer_to(cell.clone()));
    let b = InterfaceValue::boxed(f.ptr, Value::pointer_to(cell));
    let c = InterfaceValue::boxed(f.ptr, Value::new_pointer(Value::Int(1)));
    assert_eq!(a.equals(&b, &f.reg), Ok(true));
    assert_eq!(a.equals(&c, &f.reg), Ok(false));
}

#[test]
fn test_uncomparable_dynamic_type_is_an_error() {
    let f = fixture();
    let a = InterfaceValue::boxed(f.ints, Value::slice(vec![Value::Int(1)]));
    let err = a.equals(&a.clone(), &f.reg).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NotComparable {
            type_name: "[]int".to_string()
        }
    );

    let m = InterfaceValue::boxed(f.counts, Value::map(Vec::new()));
    assert!(matches!(
        m.equals(&m, &f.reg).unwrap_err().kind,
        EvalErrorKind::NotComparable { .. }
    ));
}

#[test]
fn test_uncomparable_against_nil_is_just_false() {
    let f = fixture();
    let a = InterfaceValue::boxed(f.ints, Value::slice(Vec::new()));
    assert_eq!(a.equals(&InterfaceValue::nil(), &f.reg), Ok(false));
}

#[test]
fn test_interface_field_propagates_not_comparable() {
    let f = fixture();
    let inner_int = Value::Interface(InterfaceValue::boxed(f.int, Value::Int(1)));
    let inner_slice = Value::Interface(InterfaceValue::boxed(f.ints, Value::slice(Vec::new())));

    let a = InterfaceValue::boxed(f.holder, Value::structure(vec![inner_int.clone()]));
    let b = InterfaceValue::boxed(f.holder, Value::structure(vec![inner_int]));
    assert_eq!(a.equals(&b, &f.reg), Ok(true));

    let c = InterfaceValue::boxed(f.holder, Value::structure(vec![inner_slice]));
    assert!(matches!(
        c.equals(&c, &f.reg).unwrap_err().kind,
        EvalErrorKind::NotComparable { .. }
    ));
}

#[test]
fn test_boxing_shares_the_payload() {
    let f = fixture();
    let items = Value::slice(vec![Value::Int(1)]);
    let iv = InterfaceValue::boxed(f.ints, items.clone());
    match (iv.payload(), &items) {
        (Some(Value::Slice(Some(a))), Value::Slice(Some(b))) => {
            assert!(crate::Heap::ptr_eq(a, b));
        }
        other => panic!("unexpected payload {other:?}"),
    }
}
