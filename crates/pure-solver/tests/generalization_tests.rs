use super::*;
use crate::test_support::Fixture;

fn paths(fx: &Fixture, types: &[GenericType]) -> Vec<String> {
    types.iter().map(|t| fx.print(t)).collect()
}

#[test]
fn test_primitive_linearization() {
    let fx = Fixture::new();
    let lin = linearize(&fx.graph, TypeId::INTEGER).unwrap();
    assert_eq!(&*lin, &[TypeId::INTEGER, TypeId::NUMBER, TypeId::ANY]);
    assert_eq!(&*linearize(&fx.graph, TypeId::ANY).unwrap(), &[TypeId::ANY]);
    assert_eq!(&*linearize(&fx.graph, TypeId::NIL).unwrap(), &[TypeId::NIL, TypeId::ANY]);
}

#[test]
fn test_super_types_substitute_arguments_at_every_depth() {
    let mut fx = Fixture::new();
    fx.class("A<T>", &[], &[]);
    fx.class("B<X>", &[], &[]);
    fx.class("C<Y>", &["A<B<Y>>"], &[]);
    let supers = all_super_types_including_self(&fx.graph, &fx.ty("C<String>")).unwrap();
    assert_eq!(paths(&fx, &supers), vec!["C<String>", "A<B<String>>", "Any"]);
}

#[test]
fn test_raw_subtype_does_not_leak_its_parameter_names() {
    let mut fx = Fixture::new();
    fx.class("A<T>", &[], &[]);
    fx.class("B<T>", &["A<T>"], &[]);
    fx.class("Holder<|m>", &[], &[]);
    fx.class("SubHolder<|m>", &["Holder<|m>"], &[]);

    let supers = all_super_types_including_self(&fx.graph, &fx.ty("B")).unwrap();
    assert_eq!(paths(&fx, &supers), vec!["B", "A<Any>", "Any"]);
    let supers = all_super_types_including_self(&fx.graph, &fx.ty("SubHolder")).unwrap();
    assert_eq!(paths(&fx, &supers), vec!["SubHolder", "Holder<|*>", "Any"]);
}

#[test]
fn test_c3_respects_declaration_order() {
    let mut fx = Fixture::new();
    fx.class("Base", &[], &[]);
    fx.class("Left", &["Base"], &[]);
    fx.class("Right", &["Base"], &[]);
    fx.class("Child", &["Left", "Right"], &[]);
    let supers = all_super_types_including_self(&fx.graph, &fx.ty("Child")).unwrap();
    assert_eq!(paths(&fx, &supers), vec!["Child", "Left", "Right", "Base", "Any"]);
}

#[test]
fn test_resolution_is_idempotent() {
    let mut fx = Fixture::new();
    fx.class("A<T>", &[], &[]);
    fx.class("B<Z>", &["A<Z>"], &[]);
    let gt = fx.ty("B<Integer>");
    let first = all_super_types_including_self(&fx.graph, &gt).unwrap();
    let second = all_super_types_including_self(&fx.graph, &gt).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cycle_is_detected() {
    let mut fx = Fixture::new();
    let a = fx.declare("A");
    let b = fx.declare("B");
    fx.define(a, &["B"], &[]);
    fx.define(b, &["A"], &[]);
    let err = linearize(&fx.graph, a).unwrap_err();
    assert_eq!(
        err,
        TypeError::CyclicGeneralization {
            path: "test::A".to_string(),
            chain: vec!["test::A".to_string(), "test::B".to_string(), "test::A".to_string()],
        }
    );
}

#[test]
fn test_inconsistent_hierarchy() {
    let mut fx = Fixture::new();
    fx.class("X", &[], &[]);
    fx.class("Y", &[], &[]);
    fx.class("XY", &["X", "Y"], &[]);
    fx.class("YX", &["Y", "X"], &[]);
    let z = fx.class("Z", &["XY", "YX"], &[]);
    let err = linearize(&fx.graph, z).unwrap_err();
    assert!(matches!(err, TypeError::InconsistentGeneralization { .. }));
}

#[test]
fn test_diamond_with_conflicting_arguments() {
    let mut fx = Fixture::new();
    fx.class("Top<T>", &[], &[]);
    fx.class("L", &["Top<String>"], &[]);
    fx.class("R", &["Top<Integer>"], &[]);
    fx.class("D", &["L", "R"], &[]);
    let err = all_super_types_including_self(&fx.graph, &fx.ty("D")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Diamond inheritance error! test::Top is reached as both Top<String> and Top<Integer> from D"
    );
}

#[test]
fn test_diamond_with_agreeing_arguments_is_fine() {
    let mut fx = Fixture::new();
    fx.class("Top<T>", &[], &[]);
    fx.class("L", &["Top<String>"], &[]);
    fx.class("R", &["Top<String>"], &[]);
    fx.class("D", &["L", "R"], &[]);
    let supers = all_super_types_including_self(&fx.graph, &fx.ty("D")).unwrap();
    assert_eq!(paths(&fx, &supers), vec!["D", "L", "R", "Top<String>", "Any"]);
}

#[test]
fn test_lambda_function_extends_function() {
    let fx = Fixture::new();
    let lambda = fx.ty("LambdaFunction<{String[1]->Boolean[1]}>");
    let supers = all_super_types_including_self(&fx.graph, &lambda).unwrap();
    assert_eq!(
        paths(&fx, &supers),
        vec![
            "LambdaFunction<{String[1]->Boolean[1]}>",
            "Function<{String[1]->Boolean[1]}>",
            "Any"
        ]
    );
}

#[test]
fn test_structural_types_end_at_any() {
    let fx = Fixture::new();
    let supers = all_super_types_including_self(&fx.graph, &fx.ty("(a:String)")).unwrap();
    assert_eq!(paths(&fx, &supers), vec!["(a:String)", "Any"]);
}

#[test]
fn test_subtype_and_distance() {
    let mut fx = Fixture::new();
    let a = fx.class("A", &[], &[]);
    let b = fx.class("B", &["A"], &[]);
    assert!(is_subtype(&fx.graph, b, a).unwrap());
    assert!(!is_subtype(&fx.graph, a, b).unwrap());
    assert!(is_subtype(&fx.graph, TypeId::NIL, b).unwrap());
    assert!(is_subtype(&fx.graph, b, TypeId::ANY).unwrap());
    assert_eq!(generalization_distance(&fx.graph, b, a).unwrap(), Some(1));
    assert_eq!(generalization_distance(&fx.graph, b, TypeId::ANY).unwrap(), Some(2));
    assert_eq!(generalization_distance(&fx.graph, a, b).unwrap(), None);
}

#[test]
fn test_linearization_is_cached_until_graph_changes() {
    let mut fx = Fixture::new();
    let a = fx.class("A", &[], &[]);
    let b = fx.class("B", &["A"], &[]);
    linearize(&fx.graph, b).unwrap();
    assert!(fx.graph.cached_linearization(b).is_some());
    fx.class("C", &[], &[]);
    assert!(fx.graph.cached_linearization(b).is_none());
    assert_eq!(&*linearize(&fx.graph, b).unwrap(), &[b, a, TypeId::ANY]);
}
