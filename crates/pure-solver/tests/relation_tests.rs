use super::*;
use crate::test_support::Fixture;

fn rel(fx: &Fixture, text: &str) -> RelationType {
    fx.ty(text).as_relation_type().cloned().unwrap()
}

#[test]
fn test_lookup_column() {
    let fx = Fixture::new();
    let r = rel(&fx, "(a:String, b:Integer)");
    let ty = lookup_column(&fx.graph, &r, "b").unwrap();
    assert_eq!(fx.print(ty), "Integer");
}

#[test]
fn test_lookup_missing_column_lists_columns() {
    let fx = Fixture::new();
    let r = rel(&fx, "(a:String, b:Integer)");
    let err = lookup_column(&fx.graph, &r, "x").unwrap_err();
    assert_eq!(
        err.to_string(),
        "The system can't find the column x in the Relation (a:String, b:Integer)"
    );
}

#[test]
fn test_union_appends_columns() {
    let fx = Fixture::new();
    let result = union(&rel(&fx, "(legal:String)"), &rel(&fx, "(mod:String)")).unwrap();
    assert_eq!(fx.print(&GenericType::relation(result)), "(legal:String, mod:String)");
}

#[test]
fn test_union_reports_duplicates() {
    let fx = Fixture::new();
    let err = union(&rel(&fx, "(legal:String)"), &rel(&fx, "(legal:String, mod:String)")).unwrap_err();
    assert_eq!(err.to_string(), "The relation contains duplicates: [legal]");

    let err = union(&rel(&fx, "(a:String, b:String)"), &rel(&fx, "(b:String, a:String)")).unwrap_err();
    assert_eq!(err.to_string(), "The relation contains duplicates: [b, a]");
}

#[test]
fn test_difference_ignores_absent_names() {
    let fx = Fixture::new();
    let result = difference(&rel(&fx, "(a:String, b:Integer)"), &rel(&fx, "(b:Any, zz:Any)"));
    assert_eq!(fx.print(&GenericType::relation(result)), "(a:String)");
}

#[test]
fn test_evaluate_operation_waits_for_concrete_operands() {
    let fx = Fixture::new();
    let pending = evaluate_operation(&fx.ty("T"), TypeOperationKind::Union, &fx.ty("(a:String)")).unwrap();
    assert!(pending.is_none());

    let done = evaluate_operation(&fx.ty("(a:String)"), TypeOperationKind::Union, &fx.ty("(b:String)"))
        .unwrap()
        .unwrap();
    assert_eq!(done.len(), 2);
}

#[test]
fn test_wider_relation_is_compatible_with_narrower() {
    let fx = Fixture::new();
    let wide = rel(&fx, "(a:Integer, b:String)");
    let narrow = rel(&fx, "(a:Number)");
    assert!(is_compatible_with(&fx.graph, &wide, &narrow).unwrap());
    assert!(!is_compatible_with(&fx.graph, &narrow, &wide).unwrap());
    assert!(!is_compatible_with(&fx.graph, &rel(&fx, "(a:String)"), &narrow).unwrap());
}

#[test]
fn test_equality_is_order_sensitive() {
    let fx = Fixture::new();
    assert!(relation_types_equal(&rel(&fx, "(a:String, b:Integer)"), &rel(&fx, "(a:String, b:Integer)")));
    assert!(!relation_types_equal(&rel(&fx, "(a:String, b:Integer)"), &rel(&fx, "(b:Integer, a:String)")));
}

#[test]
fn test_merge_column_wise() {
    let fx = Fixture::new();
    let merged = merge(&fx.graph, &rel(&fx, "(a:Integer)"), &rel(&fx, "(a:Float)")).unwrap();
    assert_eq!(fx.print(&GenericType::relation(merged)), "(a:Number)");

    let err = merge(&fx.graph, &rel(&fx, "(a:Integer)"), &rel(&fx, "(b:Integer)")).unwrap_err();
    assert_eq!(err.to_string(), "Incompatible types (a:Integer) && (b:Integer)");
}
