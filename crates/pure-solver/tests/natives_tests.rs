use super::*;
use crate::functions::format_signature;

#[test]
fn test_natives_register_cleanly() {
    let graph = TypeGraph::new();
    let mut registry = FunctionRegistry::new();
    let ids = register_natives(&graph, &mut registry).unwrap();
    assert_eq!(ids.len(), registry.len());
    assert!(ids.iter().all(|id| registry.owner(*id) == Some(SourceUnitId::BUILTIN)));
    assert!(
        registry
            .iter()
            .all(|(_, sig)| sig.package().is_some_and(is_core_package))
    );
}

#[test]
fn test_plus_overloads() {
    let graph = TypeGraph::new();
    let mut registry = FunctionRegistry::new();
    register_natives(&graph, &mut registry).unwrap();
    let mut printed: Vec<String> = registry
        .by_name("plus")
        .iter()
        .filter_map(|id| registry.get(*id))
        .map(|sig| format_signature(&graph, sig))
        .collect();
    printed.sort();
    assert_eq!(
        printed,
        vec![
            "meta::pure::functions::math::plus(Decimal[*]):Decimal[1]",
            "meta::pure::functions::math::plus(Float[*]):Float[1]",
            "meta::pure::functions::math::plus(Integer[*]):Integer[1]",
            "meta::pure::functions::math::plus(Number[*]):Number[1]",
            "meta::pure::functions::string::plus(String[*]):String[1]",
        ]
    );
}

#[test]
fn test_relation_join_returns_a_union() {
    let graph = TypeGraph::new();
    let mut registry = FunctionRegistry::new();
    register_natives(&graph, &mut registry).unwrap();
    let join = registry.lookup_path("meta::pure::functions::relation::join");
    assert_eq!(join.len(), 1);
    let sig = registry.get(join[0]).unwrap();
    assert_eq!(graph.print(&sig.return_type), "Relation<T+V>");
}

#[test]
fn test_core_packages() {
    assert!(is_core_package("meta::pure::functions::math"));
    assert!(!is_core_package("meta::pure::functions"));
    assert!(!is_core_package("test"));
}
