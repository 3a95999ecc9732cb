use super::*;

const UNIT: SourceUnitId = SourceUnitId(1);

fn class(path: &str) -> TypeData {
    TypeData::Class(ClassType::new(path))
}

#[test]
fn test_builtins_are_registered_at_their_constants() {
    let graph = TypeGraph::new();
    assert_eq!(graph.path(TypeId::ANY), "Any");
    assert_eq!(graph.path(TypeId::NIL), "Nil");
    assert_eq!(graph.path(TypeId::INTEGER), "Integer");
    assert_eq!(graph.path(TypeId::LAMBDA_FUNCTION), "LambdaFunction");
    assert_eq!(graph.lookup_path("Relation"), Some(TypeId::RELATION));
    assert_eq!(graph.len(), TypeId::FIRST_USER as usize);
    assert_eq!(graph.owner(TypeId::STRING), Some(SourceUnitId::BUILTIN));
}

#[test]
fn test_declare_and_resolve_by_import() {
    let mut graph = TypeGraph::new();
    let id = graph.declare(class("test::Person"), UNIT).unwrap();
    assert_eq!(graph.lookup_path("test::Person"), Some(id));
    assert_eq!(graph.simple_name(id), "Person");

    let imports: Vec<Name> = vec!["test".into()];
    assert_eq!(graph.resolve_name("Person", &imports), Some(id));
    assert_eq!(graph.resolve_name("Person", &[]), None);
    assert_eq!(graph.resolve_name("String", &[]), Some(TypeId::STRING));
    assert_eq!(graph.resolve_name("other::Person", &imports), None);
}

#[test]
fn test_duplicate_path_is_rejected() {
    let mut graph = TypeGraph::new();
    graph.declare(class("test::A"), UNIT).unwrap();
    let err = graph.declare(class("test::A"), SourceUnitId(2)).unwrap_err();
    assert_eq!(err.to_string(), "test::A has already been defined!");
}

#[test]
fn test_remove_unit_frees_slots_and_paths() {
    let mut graph = TypeGraph::new();
    let a = graph.declare(class("test::A"), UNIT).unwrap();
    let b = graph.declare(class("other::B"), SourceUnitId(2)).unwrap();
    let before = graph.generation();

    let removed = graph.remove_unit(UNIT);
    assert_eq!(removed, vec![a]);
    assert!(!graph.contains(a));
    assert!(graph.contains(b));
    assert_eq!(graph.lookup_path("test::A"), None);
    assert_eq!(graph.path(a), "<removed>");
    assert!(graph.generation() > before);

    let again = graph.declare(class("test::A"), UNIT).unwrap();
    assert_eq!(again, a, "freed slot is reused");
}

#[test]
fn test_builtins_survive_remove_unit() {
    let mut graph = TypeGraph::new();
    assert!(graph.remove_unit(SourceUnitId::BUILTIN).is_empty());
    assert_eq!(graph.len(), TypeId::FIRST_USER as usize);
}

#[test]
fn test_linearization_cache_resets_on_generation_change() {
    let mut graph = TypeGraph::new();
    let lin: Arc<[TypeId]> = Arc::from(vec![TypeId::INTEGER, TypeId::NUMBER, TypeId::ANY]);
    graph.store_linearization(TypeId::INTEGER, lin.clone());
    assert_eq!(graph.cached_linearization(TypeId::INTEGER), Some(lin));
    assert_eq!(graph.cached_linearization_count(), 1);

    graph.declare(class("test::A"), UNIT).unwrap();
    assert_eq!(graph.cached_linearization(TypeId::INTEGER), None);
    assert_eq!(graph.cached_linearization_count(), 0);
}

#[test]
fn test_define_replaces_data_in_place() {
    let mut graph = TypeGraph::new();
    let id = graph.declare(class("test::A"), UNIT).unwrap();
    let mut defined = ClassType::new("test::A");
    defined.type_parameters.push(TypeParameter::new("T"));
    assert!(graph.define(id, TypeData::Class(defined)));
    assert_eq!(graph.get(id).map(|d| d.type_parameters().len()), Some(1));
    assert_eq!(graph.types_of_unit(UNIT), vec![id]);
}
