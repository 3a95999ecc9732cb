//! Generic matching and overload resolution benchmarks.
//!
//! Builds a class chain `Level0 <- Level1 <- ... <- LevelN`, each level
//! passing its type argument up, then measures matching a deep subtype
//! against the root and compiling bodies that resolve overloads.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pure_solver::{
    ClassDefinition, Expr, FunctionDefinition, GenericType, LambdaParameter, MatchPolicy, Program,
    SourceUnit, TypeLowering, generic_type_match,
};

fn chain(depth: usize) -> SourceUnit {
    let mut unit = SourceUnit::new("chain.pure")
        .class(ClassDefinition::new("bench::Level0<T>").property("value", "T[1]"));
    for level in 1..=depth {
        unit = unit.class(
            ClassDefinition::new(format!("bench::Level{level}<T>")).extends(format!("Level{}<T>", level - 1)),
        );
    }
    unit
}

fn compiled(units: Vec<SourceUnit>) -> Program {
    let mut program = Program::new().unwrap();
    for unit in units {
        program.add_source(unit).unwrap();
    }
    let report = program.compile();
    assert!(report.is_ok(), "{:?}", report.errors);
    program
}

fn lower(program: &Program, text: &str) -> GenericType {
    let imports = [pure_common::Name::from("bench")];
    TypeLowering::new(program.graph(), &imports).lower_str(text).unwrap()
}

fn bench_deep_subtype_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("generic_match/deep_subtype");
    for depth in [4usize, 16, 64] {
        let program = compiled(vec![chain(depth)]);
        let target = lower(&program, "Level0<Any>");
        let value = lower(&program, &format!("Level{depth}<String>"));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                generic_type_match(
                    program.graph(),
                    black_box(&target),
                    black_box(&value),
                    MatchPolicy::OVERLOAD,
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_overload_resolution(c: &mut Criterion) {
    let strings = Expr::collection((0..8).map(|i| Expr::string(format!("s{i}"))).collect());
    let body = vec![Expr::arrow(
        Expr::arrow(
            strings,
            "filter",
            vec![Expr::lambda(
                vec![LambdaParameter::untyped("x")],
                vec![Expr::equal(Expr::variable("x"), Expr::string("s1"))],
            )],
        ),
        "map",
        vec![Expr::lambda(
            vec![LambdaParameter::untyped("x")],
            vec![Expr::plus(
                Expr::arrow(Expr::variable("x"), "size", vec![]),
                Expr::integer(1),
            )],
        )],
    )];
    let unit = SourceUnit::new("calls.pure")
        .function(FunctionDefinition::new("bench::run():Integer[*]", body));

    c.bench_function("overload_resolution/filter_map_plus", |b| {
        b.iter(|| compiled(vec![black_box(unit.clone())]))
    });
}

criterion_group!(matcher_benches, bench_deep_subtype_match, bench_overload_resolution);
criterion_main!(matcher_benches);
