//! Function-type inference engine.
//!
//! [`FunctionChecker`] walks a function body post-order and types every
//! expression. Calls are resolved against the [`FunctionRegistry`] in
//! `call.rs`; lambdas whose parameter types must come from the enclosing
//! call are handled in `lambda.rs`.
//!
//! A checker is built per function. It owns the variable scope and records
//! the source units whose types and functions the body ends up depending
//! on, which the program uses for cascading rollback.

use crate::compat::{is_generic_compatible_with, multiplicity_compatible, value_type_compatible};
use crate::call::{declared_name, renamed_apart};
use crate::common_type::best_common_generic_type;
use crate::diagnostics::TypeError;
use crate::expr::{Expr, ExprKind, Literal, PropertyAssignment};
use crate::functions::{FunctionId, FunctionRegistry, FunctionSignature};
use crate::graph::TypeGraph;
use crate::infer::InferenceContext;
use crate::inheritance::resolve_property;
use crate::instantiate::declaration_signature;
use crate::lower::TypeLowering;
use crate::multiplicity::Multiplicity;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::relation;
use crate::scope::VariableScope;
use crate::types::{GenericType, RawType, TypeData, TypeId, ValueType};
use pure_common::{Name, SourceRange, SourceUnitId};
use std::collections::BTreeSet;
use tracing::{Level, debug, span};

/// Remaining stack below which inference continues on a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_SEGMENT: usize = 1024 * 1024;

// =============================================================================
// Errors
// =============================================================================

/// A [`TypeError`] and the range of the expression that raised it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct CheckError {
    pub error: TypeError,
    pub range: SourceRange,
}

pub type CheckResult<T> = Result<T, CheckError>;

pub(crate) trait AtRange<T> {
    fn at(self, range: SourceRange) -> CheckResult<T>;
}

impl<T> AtRange<T> for Result<T, TypeError> {
    fn at(self, range: SourceRange) -> CheckResult<T> {
        self.map_err(|error| CheckError { error, range })
    }
}

// =============================================================================
// FunctionChecker
// =============================================================================

pub struct FunctionChecker<'a> {
    pub(crate) graph: &'a TypeGraph,
    pub(crate) functions: &'a FunctionRegistry,
    pub(crate) imports: &'a [Name],
    /// Type parameters of the function being checked; opaque in its body.
    pub(crate) type_parameters: Vec<Name>,
    pub(crate) scope: VariableScope,
    depth: DepthCounter,
    dependencies: BTreeSet<SourceUnitId>,
    /// Numbers the callee parameters renamed apart at each call.
    renamed_calls: u32,
}

impl<'a> FunctionChecker<'a> {
    pub fn new(graph: &'a TypeGraph, functions: &'a FunctionRegistry, imports: &'a [Name]) -> Self {
        Self {
            graph,
            functions,
            imports,
            type_parameters: Vec::new(),
            scope: VariableScope::new(),
            depth: DepthCounter::with_profile(RecursionProfile::ExpressionCheck),
            dependencies: BTreeSet::new(),
            renamed_calls: 0,
        }
    }

    pub(crate) fn next_call_tag(&mut self) -> u32 {
        self.renamed_calls += 1;
        self.renamed_calls
    }

    /// Units whose types or functions the checked code refers to.
    pub fn dependencies(&self) -> &BTreeSet<SourceUnitId> {
        &self.dependencies
    }

    pub fn into_dependencies(self) -> BTreeSet<SourceUnitId> {
        self.dependencies
    }

    /// Type `body` and check its last expression against the declared
    /// return type. Returns the body's type.
    pub fn check_function(&mut self, signature: &FunctionSignature, body: &mut [Expr]) -> CheckResult<ValueType> {
        let _span = span!(Level::DEBUG, "check_function", function = %signature.path).entered();
        self.type_parameters = signature.type_parameter_names();
        self.scope.push_frame();
        for parameter in &signature.parameters {
            if let Some(name) = &parameter.name {
                self.scope.bind(
                    name.clone(),
                    ValueType::new(parameter.generic_type.clone(), parameter.multiplicity.clone()),
                );
            }
        }
        let result = self.infer_sequence(body);
        self.scope.pop_frame();
        let found = result?;
        let range = body.last().map(|e| e.range).unwrap_or_default();
        self.check_return(signature, &found).at(range)?;
        debug!(function = %signature.path, found = %self.graph.print_value(&found), "function checked");
        Ok(found)
    }

    fn check_return(&self, signature: &FunctionSignature, found: &ValueType) -> Result<(), TypeError> {
        let expected = signature.return_value();
        if !is_generic_compatible_with(self.graph, &found.generic_type, &expected.generic_type)? {
            return Err(TypeError::ReturnTypeMismatch {
                function: signature.name().to_string(),
                found: self.graph.print(&found.generic_type),
                expected: self.graph.print(&expected.generic_type),
            });
        }
        if !multiplicity_compatible(&found.multiplicity, &expected.multiplicity, true) {
            return Err(TypeError::ReturnMultiplicityMismatch {
                function: signature.name().to_string(),
                found: found.multiplicity.print_bracketed(),
                expected: expected.multiplicity.print_bracketed(),
            });
        }
        Ok(())
    }

    /// Type each expression in order; the last one gives the type. An empty
    /// sequence is `Nil[0]`.
    pub(crate) fn infer_sequence(&mut self, body: &mut [Expr]) -> CheckResult<ValueType> {
        let mut last = ValueType::empty();
        for expr in body.iter_mut() {
            last = self.infer(expr)?;
        }
        Ok(last)
    }

    pub fn infer(&mut self, expr: &mut Expr) -> CheckResult<ValueType> {
        self.infer_expected(expr, None)
    }

    /// Type `expr`, using `expected` to supply parameter types to lambdas
    /// and return-type context to calls that cannot resolve on their own.
    pub(crate) fn infer_expected(&mut self, expr: &mut Expr, expected: Option<&ValueType>) -> CheckResult<ValueType> {
        if !self.depth.enter() {
            return Err(TypeError::RecursionLimit {
                context: "inferring an expression".to_string(),
            })
            .at(expr.range);
        }
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.infer_kind(expr, expected));
        self.depth.leave();
        let value = result?;
        expr.inferred = Some(value.clone());
        Ok(value)
    }

    fn infer_kind(&mut self, expr: &mut Expr, expected: Option<&ValueType>) -> CheckResult<ValueType> {
        let range = expr.range;
        match &mut expr.kind {
            ExprKind::Literal(literal) => Ok(ValueType::one(GenericType::nominal(literal_type(literal)))),
            ExprKind::Collection(elements) => self.infer_collection(elements, range),
            ExprKind::Variable(name) => self.scope.lookup(name).cloned().ok_or_else(|| CheckError {
                error: TypeError::UnknownVariable { name: name.to_string() },
                range,
            }),
            ExprKind::Let { name, value } => {
                let value = self.infer(value)?;
                self.scope.bind(name.clone(), value.clone());
                Ok(value)
            }
            ExprKind::Lambda(lambda) => {
                let context = expected.and_then(|e| crate::call::expected_function_type(&e.generic_type));
                match self.visit_lambda(lambda, context, range)? {
                    Some(value) => Ok(value),
                    None => Err(TypeError::CannotInferLambdaParameters).at(lambda.untyped_range(range)),
                }
            }
            ExprKind::Call {
                function,
                arguments,
                resolved,
            } => self.infer_call(function, arguments, resolved, expected, range),
            ExprKind::Property { receiver, property } => {
                let receiver = self.infer(receiver)?;
                self.infer_property(&receiver, property).at(range)
            }
            ExprKind::New { class, assignments } => self.infer_new(class, assignments, range),
            ExprKind::ClassReference(class) => {
                let generic_type = self.lowering().lower_str(class).at(range)?;
                self.note_type(&generic_type);
                Ok(ValueType::one(GenericType::applied(
                    TypeId::CLASS,
                    vec![generic_type],
                    Vec::new(),
                )))
            }
        }
    }

    fn infer_collection(&mut self, elements: &mut [Expr], range: SourceRange) -> CheckResult<ValueType> {
        if elements.is_empty() {
            return Ok(ValueType::empty());
        }
        let mut types = Vec::with_capacity(elements.len());
        let mut multiplicities = Vec::with_capacity(elements.len());
        for element in elements.iter_mut() {
            let value = self.infer(element)?;
            types.push(value.generic_type);
            multiplicities.push(value.multiplicity);
        }
        let generic_type = best_common_generic_type(self.graph, &types, true).at(range)?;
        Ok(ValueType::new(generic_type, Multiplicity::sum(&multiplicities)))
    }

    /// `$receiver.property`. Row types resolve columns; classes resolve
    /// properties through their supertypes. A to-many receiver maps the
    /// property over its elements.
    fn infer_property(&mut self, receiver: &ValueType, property: &str) -> Result<ValueType, TypeError> {
        let owner = &receiver.generic_type;
        let found = match &owner.raw {
            RawType::Relation(row) => Some(ValueType::new(
                relation::lookup_column(self.graph, row, property)?.clone(),
                Multiplicity::ONE,
            )),
            RawType::Nominal(_) => resolve_property(self.graph, owner, property)?,
            _ => None,
        };
        let Some(value) = found else {
            return Err(TypeError::PropertyNotFound {
                property: property.to_string(),
                class: self.graph.print(owner),
            });
        };
        let multiplicity = if receiver.multiplicity == Multiplicity::ONE {
            value.multiplicity
        } else if receiver.multiplicity == Multiplicity::ZERO_ONE && value.multiplicity.is_to_one() {
            Multiplicity::ZERO_ONE
        } else {
            Multiplicity::ZERO_MANY
        };
        Ok(ValueType::new(value.generic_type, multiplicity))
    }

    /// `^MyClass<T>(value = ...)`. Type arguments left off the class are
    /// inferred from the assigned values.
    fn infer_new(&mut self, class: &str, assignments: &mut [PropertyAssignment], range: SourceRange) -> CheckResult<ValueType> {
        let written = self.lowering().lower_str(class).at(range)?;
        self.note_type(&written);
        let Some((id, declaration)) = written
            .nominal_id()
            .and_then(|id| self.graph.get(id).and_then(TypeData::as_class).map(|c| (id, c.clone())))
        else {
            return Err(TypeError::TypeMismatch {
                found: self.graph.print(&written),
                expected: "Class".to_string(),
            })
            .at(range);
        };

        let mut values = Vec::with_capacity(assignments.len());
        for assignment in assignments.iter_mut() {
            values.push(self.infer(&mut assignment.value)?);
        }

        let instance = if written.type_arguments.is_empty() && declaration.has_generics() {
            let tag = self.next_call_tag();
            let type_names: Vec<Name> = declaration
                .type_parameters
                .iter()
                .map(|p| renamed_apart(&p.name, tag))
                .collect();
            let multiplicity_names: Vec<Name> = declaration
                .multiplicity_parameters
                .iter()
                .map(|m| renamed_apart(m, tag))
                .collect();
            let mut context = InferenceContext::new(self.graph);
            for name in &type_names {
                context.fresh_type_param(name.clone());
            }
            for name in &multiplicity_names {
                context.fresh_multiplicity_param(name.clone());
            }
            let template = GenericType::applied(
                id,
                type_names.iter().map(|n| GenericType::parameter(n.clone())).collect(),
                multiplicity_names.iter().map(|n| Multiplicity::parameter(n.clone())).collect(),
            );
            for (assignment, value) in assignments.iter().zip(&values) {
                let slot = self.property_slot(&template, assignment)?;
                context.register_value(&slot, value).at(assignment.value.range)?;
            }
            if let Some(parameter) = context.unresolved_type_params().into_iter().next() {
                return Err(TypeError::UnresolvableTypeParameter {
                    parameter: declared_name(&parameter).to_string(),
                    function: declaration.path.to_string(),
                    signature: declaration_signature(self.graph, id),
                })
                .at(range);
            }
            if let Some(parameter) = context.unresolved_multiplicity_params().into_iter().next() {
                return Err(TypeError::UnresolvedMultiplicityParameter {
                    parameter: declared_name(&parameter).to_string(),
                })
                .at(range);
            }
            let substitution = context.substitution();
            GenericType::applied(
                id,
                type_names
                    .iter()
                    .filter_map(|n| substitution.type_binding(n).cloned())
                    .collect(),
                multiplicity_names
                    .iter()
                    .filter_map(|n| substitution.multiplicity_binding(n).cloned())
                    .collect(),
            )
        } else {
            written
        };

        for (assignment, value) in assignments.iter().zip(&values) {
            let slot = self.property_slot(&instance, assignment)?;
            if !value_type_compatible(self.graph, value, &slot).at(assignment.value.range)? {
                return Err(TypeError::TypeMismatch {
                    found: self.graph.print_value(value),
                    expected: self.graph.print_value(&slot),
                })
                .at(assignment.value.range);
            }
        }
        Ok(ValueType::one(instance))
    }

    fn property_slot(&self, owner: &GenericType, assignment: &PropertyAssignment) -> CheckResult<ValueType> {
        resolve_property(self.graph, owner, &assignment.property)
            .at(assignment.value.range)?
            .ok_or_else(|| CheckError {
                error: TypeError::PropertyNotFound {
                    property: assignment.property.to_string(),
                    class: self.graph.print(owner),
                },
                range: assignment.value.range,
            })
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    pub(crate) fn lowering(&self) -> TypeLowering<'_> {
        TypeLowering::new(self.graph, self.imports).with_type_parameters(&self.type_parameters)
    }

    pub(crate) fn note_type(&mut self, generic_type: &GenericType) {
        let graph = self.graph;
        let dependencies = &mut self.dependencies;
        generic_type.for_each_nominal(&mut |id| {
            if let Some(owner) = graph.owner(id)
                && !owner.is_builtin()
            {
                dependencies.insert(owner);
            }
        });
    }

    pub(crate) fn note_function(&mut self, id: FunctionId) {
        if let Some(owner) = self.functions.owner(id)
            && !owner.is_builtin()
        {
            self.dependencies.insert(owner);
        }
    }
}

fn literal_type(literal: &Literal) -> TypeId {
    match literal {
        Literal::String(_) => TypeId::STRING,
        Literal::Integer(_) => TypeId::INTEGER,
        Literal::Float(_) => TypeId::FLOAT,
        Literal::Decimal(_) => TypeId::DECIMAL,
        Literal::Boolean(_) => TypeId::BOOLEAN,
        Literal::StrictDate(_) => TypeId::STRICT_DATE,
        Literal::DateTime(_) => TypeId::DATE_TIME,
    }
}

#[cfg(test)]
#[path = "../tests/engine_tests.rs"]
mod tests;
