use super::*;
use crate::{BasicKind, ContractDef, Field, TypeDef, TypeKind};
use ferrule_ir::SharedInterner;
use pretty_assertions::assert_eq;

struct Shapes {
    reg: TypeRegistry,
    shape: ContractId,
    rect: TypeId,
    circle: TypeId,
}

/// `Shape { Area() float; Perimeter() float }`, a `Rect` with both methods
/// and a `Circle` with only `Area`.
fn shapes() -> Shapes {
    let mut reg = TypeRegistry::new(SharedInterner::default());
    let i = reg.interner().clone();
    let float = reg.basic(BasicKind::Float);
    let area = MethodSig::nullary(i.intern("Area"), [float]);
    let perimeter = MethodSig::nullary(i.intern("Perimeter"), [float]);

    let shape = reg
        .define_contract(
            ContractDef::new(i.intern("Shape"))
                .method(area.clone())
                .method(perimeter.clone()),
        )
        .unwrap();
    let rect = reg
        .register(
            TypeDef::new(
                i.intern("Rect"),
                TypeKind::Struct(vec![
                    Field::new(i.intern("w"), float),
                    Field::new(i.intern("h"), float),
                ]),
            )
            .with_method(perimeter)
            .with_method(area.clone()),
        )
        .unwrap();
    let circle = reg
        .register(
            TypeDef::new(
                i.intern("Circle"),
                TypeKind::Struct(vec![Field::new(i.intern("r"), float)]),
            )
            .with_method(area),
        )
        .unwrap();

    Shapes {
        reg,
        shape,
        rect,
        circle,
    }
}

#[test]
fn test_superset_conforms_regardless_of_order() {
    let s = shapes();
    let cache = ConformanceCache::new();
    assert!(cache.conforms(&s.reg, s.rect, s.shape).unwrap());
}

#[test]
fn test_missing_method_reported() {
    let s = shapes();
    let cache = ConformanceCache::new();
    let result = cache.conformance(&s.reg, s.circle, s.shape).unwrap();
    let perimeter = s.reg.interner().intern("Perimeter");
    assert_eq!(
        result,
        Conformance::Missing(vec![MethodMismatch::Absent(perimeter)])
    );
}

#[test]
fn test_wrong_signature_does_not_conform() {
    let mut s = shapes();
    let i = s.reg.interner().clone();
    let int = s.reg.basic(BasicKind::Int);
    let float = s.reg.basic(BasicKind::Float);
    let sloppy = s
        .reg
        .register(
            TypeDef::new(i.intern("Sloppy"), TypeKind::Basic(BasicKind::Int))
                .with_method(MethodSig::nullary(i.intern("Area"), [int]))
                .with_method(MethodSig::nullary(i.intern("Perimeter"), [float])),
        )
        .unwrap();

    let result = ConformanceCache::new()
        .conformance(&s.reg, sloppy, s.shape)
        .unwrap();
    assert!(!result.is_satisfied());
    assert_eq!(result.mismatches().len(), 1);
    assert_eq!(result.mismatches()[0].name(), i.intern("Area"));
    assert!(matches!(
        result.mismatches()[0],
        MethodMismatch::WrongSignature { .. }
    ));
}

#[test]
fn test_empty_contract_satisfied_by_everything() {
    let mut s = shapes();
    let any = s
        .reg
        .define_contract(ContractDef::new(s.reg.interner().intern("any")))
        .unwrap();
    let cache = ConformanceCache::new();
    for ty in [s.rect, s.circle, s.reg.basic(BasicKind::Bool)] {
        assert!(cache.conforms(&s.reg, ty, any).unwrap());
    }
}

#[test]
fn test_contract_defined_later_still_satisfied() {
    let mut s = shapes();
    let i = s.reg.interner().clone();
    let float = s.reg.basic(BasicKind::Float);
    let area_only = s
        .reg
        .define_contract(
            ContractDef::new(i.intern("HasArea"))
                .method(MethodSig::nullary(i.intern("Area"), [float])),
        )
        .unwrap();
    let cache = ConformanceCache::new();
    assert!(cache.conforms(&s.reg, s.circle, area_only).unwrap());
    assert!(cache.conforms(&s.reg, s.rect, area_only).unwrap());
}

#[test]
fn test_cache_hits_on_repeat_queries() {
    let s = shapes();
    let cache = ConformanceCache::new();
    cache.conforms(&s.reg, s.rect, s.shape).unwrap();
    cache.conforms(&s.reg, s.rect, s.shape).unwrap();
    cache.conforms(&s.reg, s.circle, s.shape).unwrap();
    assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });

    cache.clear();
    assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn test_disabled_cache_never_records() {
    let s = shapes();
    let cache = ConformanceCache::disabled();
    assert!(!cache.is_enabled());
    cache.conforms(&s.reg, s.rect, s.shape).unwrap();
    cache.conforms(&s.reg, s.rect, s.shape).unwrap();
    assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn test_cache_invalidated_when_reserved_type_completes() {
    let mut s = shapes();
    let i = s.reg.interner().clone();
    let float = s.reg.basic(BasicKind::Float);
    let cache = ConformanceCache::new();

    let square = s.reg.reserve(i.intern("Square"));
    assert!(!cache.conforms(&s.reg, square, s.shape).unwrap());

    s.reg
        .register(
            TypeDef::new(i.intern("Square"), TypeKind::Basic(BasicKind::Float))
                .with_method(MethodSig::nullary(i.intern("Area"), [float]))
                .with_method(MethodSig::nullary(i.intern("Perimeter"), [float])),
        )
        .unwrap();
    assert!(cache.conforms(&s.reg, square, s.shape).unwrap());
}

#[test]
fn test_unknown_ids_are_errors() {
    let s = shapes();
    let cache = ConformanceCache::new();
    let bogus = TypeId::from_index(4242);
    assert_eq!(
        cache.conforms(&s.reg, bogus, s.shape),
        Err(RegistrationError::UnknownType { index: 4242 })
    );
}
