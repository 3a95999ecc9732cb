use super::*;
use crate::test_support::Fixture;

fn common(fx: &Fixture, types: &[&str], covariant: bool) -> String {
    let types: Vec<GenericType> = types.iter().map(|t| fx.ty(t)).collect();
    fx.print(&best_common_generic_type(&fx.graph, &types, covariant).unwrap())
}

#[test]
fn test_covariant_primitives() {
    let fx = Fixture::new();
    assert_eq!(common(&fx, &["Integer", "Integer"], true), "Integer");
    assert_eq!(common(&fx, &["Integer", "Float"], true), "Number");
    assert_eq!(common(&fx, &["Integer", "Float", "Decimal"], true), "Number");
    assert_eq!(common(&fx, &["Integer", "String"], true), "Any");
    assert_eq!(common(&fx, &["StrictDate", "DateTime"], true), "Date");
}

#[test]
fn test_covariant_edges() {
    let fx = Fixture::new();
    assert_eq!(common(&fx, &[], true), "Nil");
    assert_eq!(common(&fx, &["Nil", "Integer"], true), "Integer");
    assert_eq!(common(&fx, &["Any", "Integer"], true), "Any");
    assert_eq!(common(&fx, &["T", "Integer"], true), "Any");
}

#[test]
fn test_first_shared_ancestor_in_declaration_order() {
    let mut fx = Fixture::new();
    fx.class("Base", &[], &[]);
    fx.class("Left", &["Base"], &[]);
    fx.class("Right", &["Base"], &[]);
    fx.class("Child", &["Left", "Right"], &[]);
    assert_eq!(common(&fx, &["Left", "Right"], true), "Base");
    assert_eq!(common(&fx, &["Child", "Right"], true), "Right");
}

#[test]
fn test_arguments_merge_per_variance() {
    let mut fx = Fixture::new();
    fx.class("MyList<T>", &[], &[]);
    fx.class("Sink<-T>", &[], &[]);
    assert_eq!(common(&fx, &["MyList<Integer>", "MyList<Float>"], true), "MyList<Number>");
    assert_eq!(common(&fx, &["Sink<Integer>", "Sink<Number>"], true), "Sink<Integer>");
}

#[test]
fn test_contravariant() {
    let fx = Fixture::new();
    assert_eq!(common(&fx, &["Integer", "Number"], false), "Integer");
    assert_eq!(common(&fx, &["Integer", "String"], false), "Nil");
    assert_eq!(common(&fx, &["Any", "String"], false), "String");
    assert_eq!(common(&fx, &[], false), "Any");
}

#[test]
fn test_function_types_merge_slot_wise() {
    let fx = Fixture::new();
    assert_eq!(
        common(&fx, &["{Number[1]->Integer[1]}", "{Integer[1]->Float[1]}"], true),
        "{Integer[1]->Number[1]}"
    );
    assert_eq!(
        common(&fx, &["{Number[*]->Integer[1]}", "{Number[0..1]->Integer[*]}"], true),
        "{Number[0..1]->Integer[*]}"
    );
    assert_eq!(common(&fx, &["{Number[1]->Integer[1]}", "{->Integer[1]}"], true), "Any");
}

#[test]
fn test_relations_merge_column_wise() {
    let fx = Fixture::new();
    assert_eq!(common(&fx, &["(a:Integer)", "(a:Float)"], true), "(a:Number)");
    assert_eq!(common(&fx, &["(a:Integer)", "(b:Integer)"], true), "Any");
}
