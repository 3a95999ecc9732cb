//! Whole-program scenarios: models and function bodies compiled through
//! [`Program`], checked through the public API only.

use pure_common::SourceRange;
use pure_solver::{
    ClassDefinition, Expr, ExprKind, FunctionDefinition, InferencePhase, LambdaParameter, Program,
    SourceUnit, TypeError, UnitState,
};

/// Route engine events to the test harness when `PURE_LOG` is set.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("PURE_LOG"))
        .with_test_writer()
        .try_init();
}

fn model() -> SourceUnit {
    SourceUnit::new("model.pure")
        .class(ClassDefinition::new("test::MyClass<T>").property("value", "T[1]"))
        .function(FunctionDefinition::new(
            "test::f<T>(s:T[*]):MyClass<T>[1]",
            vec![Expr::new_instance(
                "MyClass<T>",
                vec![("value", Expr::arrow(Expr::variable("s"), "toOne", vec![]))],
            )],
        ))
}

/// `function app::go():Any[*] { f(<elements>).value + <right> }`
fn go(elements: Vec<Expr>, right: Expr) -> SourceUnit {
    let body = Expr::plus(
        Expr::property(Expr::call("f", vec![Expr::collection(elements)]), "value"),
        right.at(SourceRange::point(3, 38)),
    )
    .at(SourceRange::point(3, 38));
    SourceUnit::new("go.pure")
        .import("test")
        .function(FunctionDefinition::new("app::go():Any[*]", vec![body]).at(SourceRange::new(2, 1, 4, 1)))
}

fn compile(units: Vec<SourceUnit>) -> (Program, pure_solver::CompileReport) {
    init_logging();
    let mut program = Program::new().unwrap();
    for unit in units {
        program.add_source(unit).unwrap();
    }
    let report = program.compile();
    (program, report)
}

fn return_of(program: &Program, path: &str) -> String {
    let compiled = program.compiled(path);
    assert_eq!(compiled.len(), 1, "{path} was not compiled");
    program.graph().print_value(&compiled[0].return_value)
}

#[test]
fn test_string_value_plus_string() {
    let (program, report) = compile(vec![
        model(),
        go(vec![Expr::string("a"), Expr::string("b")], Expr::string("ee")),
    ]);
    assert!(report.is_ok(), "{:?}", report.errors);
    assert_eq!(return_of(&program, "app::go"), "String[1]");
}

#[test]
fn test_integer_value_plus_integer() {
    let (program, report) = compile(vec![
        model(),
        go(vec![Expr::integer(1), Expr::integer(2)], Expr::integer(3)),
    ]);
    assert!(report.is_ok(), "{:?}", report.errors);
    assert_eq!(return_of(&program, "app::go"), "Integer[1]");
}

#[test]
fn test_integer_value_plus_string_lists_candidates() {
    let (program, report) = compile(vec![
        model(),
        go(vec![Expr::integer(1), Expr::integer(2)], Expr::string("3")),
    ]);
    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.span.range, SourceRange::point(3, 38));
    assert_eq!(
        error.to_string(),
        "Compilation error at (resource:go.pure line:3 column:38), \"\
         The system can't find a match for the function: plus(_:Any[2])\n\
         \n\
         No functions, in packages already imported, match the function name.\n\
         \n\
         These functions, in packages not imported, match the function name. Add an import for one of these packages to use them:\n\
         \tmeta::pure::functions::math::plus(Decimal[*]):Decimal[1]\n\
         \tmeta::pure::functions::math::plus(Float[*]):Float[1]\n\
         \tmeta::pure::functions::math::plus(Integer[*]):Integer[1]\n\
         \tmeta::pure::functions::math::plus(Number[*]):Number[1]\n\
         \tmeta::pure::functions::string::plus(String[*]):String[1]\n\""
    );
    assert_eq!(program.state("go.pure"), Some(UnitState::Failed));
    assert_eq!(program.state("model.pure"), Some(UnitState::Compiled));
}

#[test]
fn test_relation_columns_in_lambdas() {
    let filter = Expr::arrow(
        Expr::variable("r"),
        "filter",
        vec![Expr::lambda(
            vec![LambdaParameter::untyped("x")],
            vec![Expr::equal(Expr::property(Expr::variable("x"), "a"), Expr::integer(1))],
        )],
    );
    let unit = SourceUnit::new("rel.pure").function(FunctionDefinition::new(
        "rel::keep(r:Relation<(a:Integer, b:String)>[1]):Relation<(a:Integer, b:String)>[1]",
        vec![filter],
    ));
    let (program, report) = compile(vec![unit]);
    assert!(report.is_ok(), "{:?}", report.errors);
    assert_eq!(return_of(&program, "rel::keep"), "Relation<(a:Integer, b:String)>[1]");
}

#[test]
fn test_relation_union_in_signature_and_body() {
    let join = Expr::call(
        "join",
        vec![
            Expr::variable("l"),
            Expr::variable("r"),
            Expr::lambda(
                vec![LambdaParameter::untyped("x"), LambdaParameter::untyped("y")],
                vec![Expr::boolean(true)],
            ),
        ],
    );
    let ok = SourceUnit::new("join.pure").function(FunctionDefinition::new(
        "rel::both(l:Relation<(legal:String)>[1], r:Relation<(mod:String)>[1]):Relation<(legal:String, mod:String)>[1]",
        vec![join.clone()],
    ));
    let clash = SourceUnit::new("clash.pure").function(FunctionDefinition::new(
        "rel::clash(l:Relation<(legal:String)>[1], r:Relation<(legal:String, mod:String)>[1]):Any[*]",
        vec![join],
    ));
    let (program, report) = compile(vec![ok, clash]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(&*report.errors[0].source_name, "clash.pure");
    assert_eq!(report.errors[0].message(), "The relation contains duplicates: [legal]");
    assert!(matches!(report.errors[0].error, TypeError::DuplicateColumn { .. }));
    assert_eq!(return_of(&program, "rel::both"), "Relation<(legal:String, mod:String)>[1]");
}

#[test]
fn test_open_variables_survive_recompilation() {
    let person = SourceUnit::new("person.pure")
        .class(ClassDefinition::new("people::Person").property("lastName", "String[1]"));
    let inner = Expr::lambda(
        vec![LambdaParameter::untyped("p")],
        vec![Expr::equal(
            Expr::property(Expr::variable("p"), "lastName"),
            Expr::variable("a"),
        )],
    );
    let outer = Expr::lambda(
        vec![LambdaParameter::typed("a", "String[1]")],
        vec![Expr::arrow(
            Expr::call("all", vec![Expr::class_reference("Person")]),
            "filter",
            vec![inner],
        )],
    );
    let query = SourceUnit::new("query.pure")
        .import("people")
        .function(FunctionDefinition::new("app::query():Any[*]", vec![outer]));

    let (mut program, report) = compile(vec![person.clone(), query]);
    assert!(report.is_ok(), "{:?}", report.errors);
    for _ in 0..3 {
        let compiled = program.compiled("app::query");
        let outer = compiled[0].body[0].as_lambda().unwrap();
        assert!(outer.open_variables.is_empty());
        let ExprKind::Call { arguments, .. } = &outer.body[0].kind else {
            panic!("expected a call");
        };
        let inner = arguments[1].as_lambda().unwrap();
        assert_eq!(inner.phase, InferencePhase::Done);
        assert_eq!(
            inner.open_variables.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            vec!["a".to_string()]
        );

        // Touch the dependency so the query is typed again from scratch.
        program.replace_source(person.clone()).unwrap();
        assert_eq!(program.state("query.pure"), Some(UnitState::Pending));
        assert!(program.compile().is_ok());
    }
}
