//! Generic type inference for Pure.
//!
//! The solver types Pure models: classes with type and multiplicity
//! parameters, function types, relation types with column algebra, and
//! function bodies whose lambdas get their parameter types from the calls
//! they are passed to.
//!
//! - **Types**: an arena ([`TypeGraph`]) of nominal types addressed by
//!   [`TypeId`]; structural types are plain values ([`GenericType`]).
//! - **Matching**: [`generic_match`] decides whether a value fits a target
//!   and scores the fit for overload ranking.
//! - **Inference**: [`InferenceContext`] binds callee parameters per call
//!   in **ena** unification tables.
//! - **Checking**: [`FunctionChecker`] walks a body post-order, resolving
//!   overloads and typing deferred lambdas.
//! - **Program**: [`Program`] owns source units and rolls back any unit
//!   that fails to compile.

pub mod common_type;
pub mod compat;
pub mod diagnostics;
pub mod engine;
pub mod expr;
pub mod format;
pub mod functions;
pub mod generalization;
pub mod generic_match;
pub mod graph;
pub mod infer;
pub mod inheritance;
pub mod instantiate;
pub mod lower;
pub mod multiplicity;
pub mod multiplicity_match;
pub mod natives;
pub mod phase;
pub mod program;
pub mod recursion;
pub mod relation;
pub mod scope;
pub mod type_expr;
pub mod type_match;
pub mod types;

mod call;
mod lambda;

#[cfg(test)]
mod test_support;

pub use common_type::best_common_generic_type;
pub use compat::{generic_types_equal, is_generic_compatible_with, value_type_compatible, value_types_equal};
pub use diagnostics::{CompileError, NoMatchingOverload, TypeError};
pub use engine::{CheckError, CheckResult, FunctionChecker};
pub use expr::{Expr, ExprKind, Lambda, LambdaParameter, Literal};
pub use format::TypeFormatter;
pub use functions::{FunctionId, FunctionRegistry, FunctionSignature, format_signature};
pub use generalization::{all_super_types_including_self, is_subtype, linearize};
pub use generic_match::{GenericTypeMatch, MatchPolicy, ParameterMatchBehavior, generic_type_match, matches};
pub use graph::TypeGraph;
pub use infer::InferenceContext;
pub use inheritance::{resolve_property, resolve_type_parameters_using_inheritance};
pub use lower::TypeLowering;
pub use multiplicity::Multiplicity;
pub use phase::InferencePhase;
pub use program::{
    ClassDefinition, CompileReport, CompiledFunction, FunctionDefinition, Program, PropertyDefinition,
    SourceUnit, UnitState,
};
pub use types::{
    ClassType, Column, FunctionParameter, FunctionType, GenericType, RawType, RelationType, TypeData,
    TypeId, TypeParameter, ValueType,
};
