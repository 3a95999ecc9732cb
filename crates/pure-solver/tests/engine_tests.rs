use super::*;
use crate::test_support::Session;

fn person(session: &mut Session) {
    session.fx.class(
        "Person",
        &[],
        &[("firstName", "String", "1"), ("nickNames", "String", "*")],
    );
}

#[test]
fn test_literals_and_collections() {
    let session = Session::new();
    let mut mixed = Expr::collection(vec![Expr::integer(1), Expr::float(2.0)]);
    assert_eq!(session.print(&session.infer(&mut mixed).unwrap()), "Number[2]");

    let mut empty = Expr::collection(vec![]);
    assert_eq!(session.print(&session.infer(&mut empty).unwrap()), "Nil[0]");

    let mut text = Expr::collection(vec![Expr::string("a"), Expr::string("b"), Expr::string("c")]);
    assert_eq!(session.print(&session.infer(&mut text).unwrap()), "String[3]");
    // Every node carries its type afterwards.
    let ExprKind::Collection(elements) = &text.kind else {
        panic!("expected a collection");
    };
    assert!(elements.iter().all(|e| e.inferred.is_some()));
}

#[test]
fn test_unknown_variable_is_located() {
    let session = Session::new();
    let range = SourceRange::new(2, 4, 2, 9);
    let mut expr = Expr::variable("ghost").at(range);
    let err = session.infer(&mut expr).unwrap_err();
    assert_eq!(err.range, range);
    assert_eq!(err.to_string(), "The variable 'ghost' is unknown!");
}

#[test]
fn test_let_binds_in_sequence() {
    let session = Session::new();
    let mut body = vec![
        Expr::let_("x", Expr::integer(3)),
        Expr::plus(Expr::variable("x"), Expr::integer(4)),
    ];
    let found = session.check("test::g():Integer[1]", &mut body).unwrap();
    assert_eq!(session.print(&found), "Integer[1]");
}

#[test]
fn test_property_multiplicity_follows_the_receiver() {
    let mut session = Session::new();
    person(&mut session);
    let mut one = Expr::property(Expr::variable("p"), "firstName");
    let found = session.infer_with(&[("p", "Person[1]")], &mut one).unwrap();
    assert_eq!(session.print(&found), "String[1]");

    let mut many = Expr::property(Expr::variable("p"), "firstName");
    let found = session.infer_with(&[("p", "Person[*]")], &mut many).unwrap();
    assert_eq!(session.print(&found), "String[*]");

    let mut maybe = Expr::property(Expr::variable("p"), "firstName");
    let found = session.infer_with(&[("p", "Person[0..1]")], &mut maybe).unwrap();
    assert_eq!(session.print(&found), "String[0..1]");
}

#[test]
fn test_missing_property() {
    let mut session = Session::new();
    person(&mut session);
    let mut expr = Expr::property(Expr::variable("p"), "age");
    let err = session.infer_with(&[("p", "Person[1]")], &mut expr).unwrap_err();
    assert_eq!(err.to_string(), "Can't find the property 'age' in the class Person");
}

#[test]
fn test_new_instance_infers_type_arguments() {
    let mut session = Session::new();
    session.fx.class("MyClass<Z>", &[], &[("value", "Z", "1")]);
    let mut inferred = Expr::new_instance("MyClass", vec![("value", Expr::string("ok"))]);
    assert_eq!(
        session.print(&session.infer(&mut inferred).unwrap()),
        "MyClass<String>[1]"
    );

    let mut written = Expr::new_instance("MyClass<Integer>", vec![("value", Expr::string("ok"))]);
    let err = session.infer(&mut written).unwrap_err();
    assert_eq!(err.to_string(), "Type Error: String[1] not a subtype of Integer[1]");
}

#[test]
fn test_class_reference() {
    let mut session = Session::new();
    person(&mut session);
    let mut expr = Expr::class_reference("Person");
    assert_eq!(session.print(&session.infer(&mut expr).unwrap()), "Class<Person>[1]");
    let mut all = Expr::call("all", vec![Expr::class_reference("Person")]);
    assert_eq!(session.print(&session.infer(&mut all).unwrap()), "Person[*]");
}

#[test]
fn test_return_type_is_checked() {
    let session = Session::new();
    let mut body = vec![Expr::string("a")];
    let err = session.check("test::g():Integer[1]", &mut body).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Return type error in function 'g'; found: String; expected: Integer"
    );

    let mut body = vec![Expr::collection(vec![Expr::string("a"), Expr::string("b")])];
    let err = session.check("test::h():String[1]", &mut body).unwrap_err();
    assert!(matches!(err.error, TypeError::ReturnMultiplicityMismatch { .. }));
}

#[test]
fn test_parameters_are_in_scope() {
    let session = Session::new();
    let mut body = vec![Expr::arrow(Expr::variable("s"), "size", vec![])];
    let found = session.check("test::count(s:String[*]):Integer[1]", &mut body).unwrap();
    assert_eq!(session.print(&found), "Integer[1]");
    let ExprKind::Call { resolved, .. } = &body[0].kind else {
        panic!("expected a call");
    };
    assert!(resolved.is_some());
}

#[test]
fn test_type_parameters_are_opaque_in_the_body() {
    let mut session = Session::new();
    session.fx.class("MyClass<Z>", &[], &[("value", "Z", "1")]);
    let mut body = vec![Expr::new_instance("MyClass<T>", vec![("value", Expr::string("ok"))])];
    let found = session
        .check("test::f<T>(s:T[*]):MyClass<T>[1]", &mut body)
        .unwrap();
    assert_eq!(session.print(&found), "MyClass<T>[1]");
}

#[test]
fn test_dependencies_skip_builtins() {
    let mut session = Session::new();
    person(&mut session);
    let mut checker = session.checker();
    let mut expr = Expr::call("all", vec![Expr::class_reference("Person")]);
    checker.infer(&mut expr).unwrap();
    assert_eq!(
        checker.dependencies().iter().copied().collect::<Vec<_>>(),
        vec![crate::test_support::TEST_UNIT]
    );
}

#[test]
fn test_deep_nesting_hits_the_recursion_limit() {
    let session = Session::new();
    let mut expr = Expr::integer(1);
    for _ in 0..600 {
        expr = Expr::collection(vec![expr]);
    }
    let err = session.infer(&mut expr).unwrap_err();
    assert!(matches!(err.error, TypeError::RecursionLimit { .. }));
}
