//! Fixtures shared by unit tests: a graph with a `test` package imported and
//! string-based helpers for declaring classes and writing types.

use crate::engine::{CheckResult, FunctionChecker};
use crate::expr::Expr;
use crate::functions::{FunctionId, FunctionRegistry, FunctionSignature};
use crate::graph::TypeGraph;
use crate::lower::TypeLowering;
use crate::multiplicity::Multiplicity;
use crate::natives::register_natives;
use crate::type_expr::parse_type_parameter;
use crate::types::{ClassType, GenericType, PropertyInfo, TypeData, TypeId, ValueType};
use pure_common::{Name, SourceUnitId};

pub(crate) const TEST_UNIT: SourceUnitId = SourceUnitId(1);

pub(crate) struct Fixture {
    pub graph: TypeGraph,
    pub imports: Vec<Name>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            graph: TypeGraph::new(),
            imports: vec!["test".into()],
        }
    }

    /// Declare `test::Name<T, -U|m>` without supertypes or properties.
    pub fn declare(&mut self, header: &str) -> TypeId {
        let (name, params) = match header.split_once('<') {
            Some((name, rest)) => (name.trim(), rest.trim_end_matches('>')),
            None => (header.trim(), ""),
        };
        let (types, mults) = params.split_once('|').unwrap_or((params, ""));
        let mut class = ClassType::new(format!("test::{name}"));
        class.type_parameters = types
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(|t| parse_type_parameter(t).unwrap())
            .collect();
        class.multiplicity_parameters = mults
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(Name::from)
            .collect();
        self.graph.declare(TypeData::Class(class), TEST_UNIT).unwrap()
    }

    /// Set supertypes and properties (`(name, type, multiplicity)`) of a
    /// declared class. Types may mention the class's own parameters.
    pub fn define(&mut self, id: TypeId, extends: &[&str], properties: &[(&str, &str, &str)]) {
        let mut class = self.graph.get(id).and_then(TypeData::as_class).cloned().unwrap();
        let params: Vec<Name> = class.type_parameters.iter().map(|p| p.name.clone()).collect();
        let lowering = TypeLowering::new(&self.graph, &self.imports).with_type_parameters(&params);
        class.generalizations = extends.iter().map(|e| lowering.lower_str(e).unwrap()).collect();
        class.properties = properties
            .iter()
            .map(|(name, ty, mult)| PropertyInfo {
                name: (*name).into(),
                generic_type: lowering.lower_str(ty).unwrap(),
                multiplicity: mult.parse::<Multiplicity>().unwrap(),
            })
            .collect();
        assert!(self.graph.define(id, TypeData::Class(class)));
    }

    pub fn class(&mut self, header: &str, extends: &[&str], properties: &[(&str, &str, &str)]) -> TypeId {
        let id = self.declare(header);
        self.define(id, extends, properties);
        id
    }

    /// Lower a type; single upper-case letters are type parameters.
    pub fn ty(&self, text: &str) -> GenericType {
        let params: Vec<Name> = ["T", "U", "V", "X", "Y", "Z"].iter().map(|p| Name::from(*p)).collect();
        TypeLowering::new(&self.graph, &self.imports)
            .with_type_parameters(&params)
            .lower_str(text)
            .unwrap()
    }

    /// Lower `Type[mult]`; single upper-case letters are type parameters.
    pub fn value(&self, text: &str) -> ValueType {
        let params: Vec<Name> = ["T", "U", "V", "X", "Y", "Z"].iter().map(|p| Name::from(*p)).collect();
        TypeLowering::new(&self.graph, &self.imports)
            .with_type_parameters(&params)
            .lower_value_str(text)
            .unwrap()
    }

    pub fn print(&self, generic_type: &GenericType) -> String {
        self.graph.print(generic_type)
    }
}

/// A [`Fixture`] plus a function registry holding the natives, for tests
/// that type expressions.
pub(crate) struct Session {
    pub fx: Fixture,
    pub functions: FunctionRegistry,
}

impl Session {
    pub fn new() -> Self {
        let fx = Fixture::new();
        let mut functions = FunctionRegistry::new();
        register_natives(&fx.graph, &mut functions).unwrap();
        Self { fx, functions }
    }

    /// Register a signature such as `test::f<T>(s:T[*]):T[1]`.
    pub fn function(&mut self, text: &str) -> FunctionId {
        let signature = FunctionSignature::parse(&self.fx.graph, &self.fx.imports, text).unwrap();
        self.functions.register(signature, TEST_UNIT).unwrap()
    }

    pub fn signature(&self, text: &str) -> FunctionSignature {
        FunctionSignature::parse(&self.fx.graph, &self.fx.imports, text).unwrap()
    }

    pub fn checker(&self) -> FunctionChecker<'_> {
        FunctionChecker::new(&self.fx.graph, &self.functions, &self.fx.imports)
    }

    pub fn infer(&self, expr: &mut Expr) -> CheckResult<ValueType> {
        self.checker().infer(expr)
    }

    /// Infer with `variables` (`(name, "Type[mult]")`) in scope.
    pub fn infer_with(&self, variables: &[(&str, &str)], expr: &mut Expr) -> CheckResult<ValueType> {
        let mut checker = self.checker();
        for (name, value) in variables {
            checker.scope.bind((*name).into(), self.fx.value(value));
        }
        checker.infer(expr)
    }

    pub fn check(&self, signature: &str, body: &mut [Expr]) -> CheckResult<ValueType> {
        let signature = self.signature(signature);
        self.checker().check_function(&signature, body)
    }

    pub fn print(&self, value: &ValueType) -> String {
        self.fx.graph.print_value(value)
    }
}
