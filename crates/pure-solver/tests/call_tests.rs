use super::*;
use crate::expr::LambdaParameter;
use crate::test_support::Session;

fn resolved_path(session: &Session, expr: &Expr) -> String {
    let ExprKind::Call { resolved, .. } = &expr.kind else {
        panic!("expected a call");
    };
    let id = resolved.expect("call was not resolved");
    session.functions.get(id).unwrap().path.to_string()
}

fn lambda(parameters: &[&str], body: Vec<Expr>) -> Expr {
    Expr::lambda(parameters.iter().map(|p| LambdaParameter::untyped(*p)).collect(), body)
}

#[test]
fn test_plus_picks_the_closest_overload() {
    let session = Session::new();
    let mut integers = Expr::plus(Expr::integer(1), Expr::integer(2));
    assert_eq!(session.print(&session.infer(&mut integers).unwrap()), "Integer[1]");
    assert_eq!(resolved_path(&session, &integers), "meta::pure::functions::math::plus");

    let mut mixed = Expr::plus(Expr::integer(1), Expr::float(2.5));
    assert_eq!(session.print(&session.infer(&mut mixed).unwrap()), "Number[1]");

    let mut strings = Expr::plus(Expr::string("a"), Expr::string("b"));
    assert_eq!(session.print(&session.infer(&mut strings).unwrap()), "String[1]");
    assert_eq!(resolved_path(&session, &strings), "meta::pure::functions::string::plus");
}

#[test]
fn test_closer_supertype_wins() {
    let mut session = Session::new();
    session.function("test::describe(n:Any[1]):Integer[1]");
    session.function("test::describe(n:Number[1]):String[1]");
    let mut expr = Expr::call("describe", vec![Expr::integer(1)]);
    assert_eq!(session.print(&session.infer(&mut expr).unwrap()), "String[1]");
}

#[test]
fn test_no_match_lists_core_overloads_as_not_imported() {
    let session = Session::new();
    let mut expr = Expr::plus(Expr::integer(1), Expr::string("3")).at(SourceRange::point(3, 38));
    let err = session.infer(&mut expr).unwrap_err();
    assert_eq!(err.range, SourceRange::point(3, 38));
    assert_eq!(
        err.to_string(),
        "The system can't find a match for the function: plus(_:Any[2])\n\
         \n\
         No functions, in packages already imported, match the function name.\n\
         \n\
         These functions, in packages not imported, match the function name. Add an import for one of these packages to use them:\n\
         \tmeta::pure::functions::math::plus(Decimal[*]):Decimal[1]\n\
         \tmeta::pure::functions::math::plus(Float[*]):Float[1]\n\
         \tmeta::pure::functions::math::plus(Integer[*]):Integer[1]\n\
         \tmeta::pure::functions::math::plus(Number[*]):Number[1]\n\
         \tmeta::pure::functions::string::plus(String[*]):String[1]\n"
    );
}

#[test]
fn test_multiplicity_parameter_flows_to_the_result() {
    let mut session = Session::new();
    session.function("test::f<|m>(s:String[m]):String[m]");
    session.function("pl(a:String[1], b:String[1]):String[1]");

    let mut one = Expr::arrow(Expr::call("f", vec![Expr::string("a")]), "pl", vec![Expr::string("ok")]);
    assert_eq!(session.print(&session.infer(&mut one).unwrap()), "String[1]");

    let mut two = Expr::arrow(
        Expr::call("f", vec![Expr::collection(vec![Expr::string("a"), Expr::string("b")])]),
        "pl",
        vec![Expr::string("ok")],
    );
    let err = session.infer(&mut two).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The system can't find a match for the function: pl(_:String[2],_:String[1])\n\
         \n\
         These functions, in packages already imported, would match the function call if you changed the parameters.\n\
         \tpl(String[1], String[1]):String[1]\n\
         \n\
         No functions, in packages not imported, match the function name.\n"
    );
}

#[test]
fn test_unknown_function_is_not_listed() {
    let session = Session::new();
    let mut expr = Expr::call("nowhere", vec![Expr::integer(1)]);
    let err = session.infer(&mut expr).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The system can't find a match for the function: nowhere(_:Integer[1])"
    );
}

#[test]
fn test_lambda_parameters_come_from_the_call() {
    let session = Session::new();
    let strings = Expr::collection(vec![Expr::string("a"), Expr::string("b")]);
    let mut filtered = Expr::arrow(
        strings.clone(),
        "filter",
        vec![lambda(&["x"], vec![Expr::equal(Expr::variable("x"), Expr::string("a"))])],
    );
    assert_eq!(session.print(&session.infer(&mut filtered).unwrap()), "String[*]");

    let mut mapped = Expr::arrow(
        strings,
        "map",
        vec![lambda(&["x"], vec![Expr::arrow(Expr::variable("x"), "size", vec![])])],
    );
    assert_eq!(session.print(&session.infer(&mut mapped).unwrap()), "Integer[*]");
    let ExprKind::Call { arguments, .. } = &mapped.kind else {
        panic!("expected a call");
    };
    let processed = arguments[1].as_lambda().unwrap();
    assert!(processed.phase.is_done());
    assert_eq!(
        session.fx.graph.print(&GenericType::function(processed.function_type.clone().unwrap())),
        "{String[1]->Integer[1]}"
    );
}

#[test]
fn test_typed_lambda_binds_the_return_parameter() {
    let mut session = Session::new();
    session.function("test::f<T>(s:Function<{->T[1]}>[1]):T[1]");
    let mut expr = Expr::plus(
        Expr::call("f", vec![Expr::lambda(vec![], vec![Expr::integer(1)])]),
        Expr::integer(1),
    );
    assert_eq!(session.print(&session.infer(&mut expr).unwrap()), "Integer[1]");
}

#[test]
fn test_lambda_without_context_cannot_be_inferred() {
    let mut session = Session::new();
    session.function("test::apply<T>(f:Function<{T[1]->Boolean[1]}>[1]):Boolean[1]");
    let at = SourceRange::new(4, 12, 4, 12);
    let mut parameter = LambdaParameter::untyped("x");
    parameter.range = at;
    let mut expr = Expr::call(
        "apply",
        vec![Expr::lambda(vec![parameter], vec![Expr::boolean(true)])],
    );
    let err = session.infer(&mut expr).unwrap_err();
    assert_eq!(err.error, TypeError::CannotInferLambdaParameters);
    assert_eq!(err.range, at);
}

#[test]
fn test_unresolvable_type_parameter() {
    let mut session = Session::new();
    session.function("test::make<T>():T[1]");
    let mut expr = Expr::call("make", vec![]);
    let err = session.infer(&mut expr).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The type parameter T was not resolved (make / {->T[1]})!"
    );
}

#[test]
fn test_relation_filter_and_map() {
    let session = Session::new();
    let rows = [("r", "Relation<(a:Integer, b:String)>[1]")];

    let mut filtered = Expr::arrow(
        Expr::variable("r"),
        "filter",
        vec![lambda(
            &["x"],
            vec![Expr::equal(Expr::property(Expr::variable("x"), "a"), Expr::integer(1))],
        )],
    );
    let found = session.infer_with(&rows, &mut filtered).unwrap();
    assert_eq!(session.print(&found), "Relation<(a:Integer, b:String)>[1]");
    assert_eq!(resolved_path(&session, &filtered), "meta::pure::functions::relation::filter");

    let mut mapped = Expr::arrow(
        Expr::variable("r"),
        "map",
        vec![lambda(&["x"], vec![Expr::property(Expr::variable("x"), "b")])],
    );
    assert_eq!(session.print(&session.infer_with(&rows, &mut mapped).unwrap()), "String[*]");

    let mut missing = Expr::arrow(
        Expr::variable("r"),
        "map",
        vec![lambda(&["x"], vec![Expr::property(Expr::variable("x"), "c")])],
    );
    let err = session.infer_with(&rows, &mut missing).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The system can't find the column c in the Relation (a:Integer, b:String)"
    );
}

#[test]
fn test_relation_join_unions_columns() {
    let session = Session::new();
    let rows = [
        ("left", "Relation<(a:Integer)>[1]"),
        ("right", "Relation<(b:String)>[1]"),
    ];
    let mut joined = Expr::call(
        "join",
        vec![
            Expr::variable("left"),
            Expr::variable("right"),
            lambda(&["x", "y"], vec![Expr::boolean(true)]),
        ],
    );
    let found = session.infer_with(&rows, &mut joined).unwrap();
    assert_eq!(session.print(&found), "Relation<(a:Integer, b:String)>[1]");

    let mut clash = Expr::call(
        "join",
        vec![
            Expr::variable("left"),
            Expr::variable("left"),
            lambda(&["x", "y"], vec![Expr::boolean(true)]),
        ],
    );
    let err = session.infer_with(&rows, &mut clash).unwrap_err();
    assert_eq!(err.to_string(), "The relation contains duplicates: [a]");
}

#[test]
fn test_type_parameter_resolved_from_the_enclosing_call() {
    let mut session = Session::new();
    session.fx.class("MyClass<Z>", &[], &[]);
    session.function("test::g<K>(f:Function<{K[1]->Boolean[1]}>[1]):MyClass<K>[1]");
    session.function("test::pair<T>(s:T[*], a:MyClass<T>[1]):T[1]");

    let strings = Expr::collection(vec![Expr::string("a"), Expr::string("b")]);
    let inner = Expr::call(
        "g",
        vec![lambda(&["t"], vec![Expr::equal(Expr::variable("t"), Expr::string("x"))])],
    );
    let mut expr = Expr::call("pair", vec![strings.clone(), inner]);
    assert_eq!(session.print(&session.infer(&mut expr).unwrap()), "String[1]");

    // The lambda body is typed with `t:String`, so its errors surface.
    let failing = Expr::call(
        "g",
        vec![lambda(
            &["t"],
            vec![
                Expr::let_("e", Expr::plus(Expr::variable("t"), Expr::integer(3))),
                Expr::equal(Expr::variable("e"), Expr::integer(2)),
            ],
        )],
    );
    let mut expr = Expr::call("pair", vec![strings, failing]);
    let err = session.infer(&mut expr).unwrap_err();
    assert!(
        err.to_string()
            .starts_with("The system can't find a match for the function: plus(_:Any[2])")
    );
}

#[test]
fn test_qualified_call_selects_one_package() {
    let session = Session::new();
    let mut expr = Expr::call(
        "meta::pure::functions::math::plus",
        vec![Expr::collection(vec![Expr::integer(1), Expr::integer(2)])],
    );
    assert_eq!(session.print(&session.infer(&mut expr).unwrap()), "Integer[1]");

    let mut wrong = Expr::call(
        "meta::pure::functions::string::plus",
        vec![Expr::collection(vec![Expr::integer(1)])],
    );
    assert!(matches!(
        session.infer(&mut wrong).unwrap_err().error,
        TypeError::NoMatchingOverload(_)
    ));
}

#[test]
fn test_rename_signature_keeps_shape() {
    let session = Session::new();
    let map = session.signature("test::map<T,V>(value:T[*], func:Function<{T[1]->V[*]}>[1]):V[*]");
    let renamed = rename_signature(&map, 7).unwrap();
    assert_eq!(
        session.fx.graph.print(&GenericType::function(renamed.function_type())),
        "{T#7[*], Function<{T#7[1]->V#7[*]}>[1]->V#7[*]}"
    );
    assert_eq!(declared_name("V#7"), "V");
    assert_eq!(declared_name("V"), "V");
}

#[test]
fn test_caller_parameter_shares_a_name_with_the_callee_s() {
    let session = Session::new();
    let body = |native: &str, result: Expr| {
        vec![Expr::arrow(Expr::variable("c"), native, vec![lambda(&["x"], vec![result])])]
    };

    let mut mapped = body("map", Expr::variable("x"));
    let found = session.check("app::g<V>(c:V[*]):V[*]", &mut mapped).unwrap();
    assert_eq!(session.print(&found), "V[*]");

    let mut renamed = body("map", Expr::variable("x"));
    let found = session.check("app::g<W>(c:W[*]):W[*]", &mut renamed).unwrap();
    assert_eq!(session.print(&found), "W[*]");

    let mut filtered = body("filter", Expr::boolean(true));
    let found = session.check("app::keep<T>(c:T[*]):T[*]", &mut filtered).unwrap();
    assert_eq!(session.print(&found), "T[*]");
}
