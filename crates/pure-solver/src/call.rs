//! Call binding.
//!
//! Resolving `f(a, b)` runs in two stages:
//!
//! 1. Arguments are typed first. Lambdas with untyped parameters, and calls
//!    that can only be typed once their expected type is known, are left
//!    pending.
//! 2. Every visible overload of `f` with the right arity is scored slot by
//!    slot (raw type, then arguments, then multiplicity). Candidates are
//!    tried best-first: the callee's type parameters, renamed apart from
//!    any the caller has in scope, are bound from the typed arguments;
//!    pending arguments are typed once their slots no longer mention
//!    unbound parameters; the arguments are checked against the
//!    instantiated slots. The first candidate that survives wins.
//!
//! Each candidate works on its own copy of the arguments and its own
//! [`InferenceContext`], so a rejected candidate leaves nothing behind.

use crate::compat::value_type_compatible;
use crate::diagnostics::{NoMatchingOverload, TypeError};
use crate::engine::{AtRange, CheckError, CheckResult, FunctionChecker};
use crate::expr::{Expr, ExprKind};
use crate::functions::{FunctionId, FunctionSignature, format_signature};
use crate::generic_match::{GenericTypeMatch, MatchPolicy, generic_type_match};
use crate::infer::InferenceContext;
use crate::instantiate::{TypeSubstitution, instantiate, instantiate_function_type, instantiate_multiplicity};
use crate::multiplicity::Multiplicity;
use crate::multiplicity_match::{MultiplicityMatch, multiplicity_match};
use crate::natives::is_core_package;
use crate::types::{FunctionType, GenericType, RawType, TypeId, TypeParameter, ValueType};
use pure_common::limits::{MAX_LAMBDA_PASSES, MAX_LISTED_CANDIDATES};
use pure_common::{Name, SourceRange, simple_name};
use tracing::{Level, debug, span, trace};

/// What the first stage learned about one argument.
#[derive(Clone, Debug)]
enum Argument {
    Typed(ValueType),
    /// A lambda waiting for its parameter types.
    Lambda { arity: usize },
    /// A call that needs its expected type before it can be typed.
    Call,
}

impl Argument {
    fn value(&self) -> Option<&ValueType> {
        match self {
            Argument::Typed(value) => Some(value),
            Argument::Lambda { .. } | Argument::Call => None,
        }
    }
}

/// Per-slot match quality; compared lexicographically, smaller is better.
type Score = Vec<(GenericTypeMatch, MultiplicityMatch)>;

/// The function type a slot expects: `{T[1]->Boolean[1]}` for both
/// `Function<{T[1]->Boolean[1]}>` and a bare function type.
pub(crate) fn expected_function_type(generic_type: &GenericType) -> Option<&FunctionType> {
    match &generic_type.raw {
        RawType::Function(function_type) => Some(function_type),
        RawType::Nominal(TypeId::FUNCTION | TypeId::LAMBDA_FUNCTION) => generic_type
            .type_arguments
            .first()
            .and_then(GenericType::as_function_type),
        _ => None,
    }
}

fn instantiate_value(value: &ValueType, substitution: &TypeSubstitution) -> Result<ValueType, TypeError> {
    Ok(ValueType::new(
        instantiate(&value.generic_type, substitution)?,
        instantiate_multiplicity(&value.multiplicity, substitution),
    ))
}

/// `name#tag`: a parameter name no source can spell. Argument types may
/// carry the caller's parameters, and a caller's `V` must never be taken
/// for the callee's.
pub(crate) fn renamed_apart(name: &str, tag: u32) -> Name {
    format!("{name}#{tag}").into()
}

/// The name a parameter was declared with, before [`renamed_apart`].
pub(crate) fn declared_name(name: &str) -> &str {
    name.split_once('#').map_or(name, |(declared, _)| declared)
}

/// `signature` with its own type and multiplicity parameters renamed apart.
fn rename_signature(signature: &FunctionSignature, tag: u32) -> Result<FunctionSignature, TypeError> {
    let mut substitution = TypeSubstitution::new();
    let mut type_parameters = Vec::with_capacity(signature.type_parameters.len());
    for parameter in &signature.type_parameters {
        let fresh = renamed_apart(&parameter.name, tag);
        substitution.bind_type(parameter.name.clone(), GenericType::parameter(fresh.clone()));
        type_parameters.push(TypeParameter {
            name: fresh,
            contravariant: parameter.contravariant,
        });
    }
    let mut multiplicity_parameters = Vec::with_capacity(signature.multiplicity_parameters.len());
    for parameter in &signature.multiplicity_parameters {
        let fresh = renamed_apart(parameter, tag);
        substitution.bind_multiplicity(parameter.clone(), Multiplicity::parameter(fresh.clone()));
        multiplicity_parameters.push(fresh);
    }
    let function_type = instantiate_function_type(&signature.function_type(), &substitution)?;
    Ok(FunctionSignature {
        path: signature.path.clone(),
        type_parameters,
        multiplicity_parameters,
        parameters: function_type.parameters,
        return_type: function_type.return_type,
        return_multiplicity: function_type.return_multiplicity,
    })
}

fn mentions_any(generic_type: &GenericType, multiplicity: &Multiplicity, names: &[Name]) -> bool {
    let mut found = multiplicity.parameter_name().is_some_and(|m| names.contains(m));
    generic_type.for_each_type_parameter(&mut |name| found |= names.contains(name));
    generic_type.for_each_multiplicity_parameter(&mut |name| found |= names.contains(name));
    found
}

impl FunctionChecker<'_> {
    pub(crate) fn infer_call(
        &mut self,
        function: &Name,
        arguments: &mut Vec<Expr>,
        resolved: &mut Option<FunctionId>,
        expected: Option<&ValueType>,
        range: SourceRange,
    ) -> CheckResult<ValueType> {
        let _span = span!(Level::DEBUG, "call", function = %function).entered();
        let states = self.infer_arguments(arguments)?;

        let functions = self.functions;
        let name = simple_name(function);
        let qualified = name.len() != function.len();
        let mut ranked: Vec<(Score, FunctionId)> = Vec::new();
        for &id in functions.by_name(name) {
            let Some(signature) = functions.get(id) else {
                continue;
            };
            let reachable = if qualified {
                signature.path == *function
            } else {
                self.is_visible(signature)
            };
            if !reachable || signature.arity() != states.len() {
                continue;
            }
            if let Some(score) = self.score(signature, &states).at(range)? {
                ranked.push((score, id));
            }
        }
        // Stable: equal scores keep registration order.
        ranked.sort_by(|a, b| a.0.cmp(&b.0));
        trace!(candidates = ranked.len(), "overloads ranked");

        let mut failure = None;
        for (_, id) in &ranked {
            let Some(signature) = functions.get(*id) else {
                continue;
            };
            let mut attempt = arguments.clone();
            match self.bind_candidate(signature, &mut attempt, &states, expected, range) {
                Ok(Some(value)) => {
                    *arguments = attempt;
                    *resolved = Some(*id);
                    self.note_function(*id);
                    debug!(
                        overload = %signature.path,
                        result = %self.graph.print_value(&value),
                        "overload selected"
                    );
                    return Ok(value);
                }
                Ok(None) => trace!(overload = %signature.path, "overload rejected"),
                Err(error) => {
                    failure.get_or_insert(error);
                }
            }
        }
        Err(failure.unwrap_or_else(|| self.no_match(name, &states, range)))
    }

    fn infer_arguments(&mut self, arguments: &mut [Expr]) -> CheckResult<Vec<Argument>> {
        let mut states = Vec::with_capacity(arguments.len());
        for argument in arguments.iter_mut() {
            let range = argument.range;
            let state = if let ExprKind::Lambda(lambda) = &mut argument.kind {
                match self.visit_lambda(lambda, None, range)? {
                    Some(value) => {
                        argument.inferred = Some(value.clone());
                        Argument::Typed(value)
                    }
                    None => Argument::Lambda {
                        arity: lambda.parameters.len(),
                    },
                }
            } else if matches!(argument.kind, ExprKind::Call { .. }) {
                match self.infer(argument) {
                    Ok(value) => Argument::Typed(value),
                    Err(error) if error.error == TypeError::CannotInferLambdaParameters => {
                        trace!("argument waits for its expected type");
                        Argument::Call
                    }
                    Err(error) => return Err(error),
                }
            } else {
                Argument::Typed(self.infer(argument)?)
            };
            states.push(state);
        }
        Ok(states)
    }

    /// Imported, in the root package, or a core package.
    fn is_visible(&self, signature: &FunctionSignature) -> bool {
        self.is_imported(signature) || signature.package().is_some_and(is_core_package)
    }

    fn is_imported(&self, signature: &FunctionSignature) -> bool {
        match signature.package() {
            None => true,
            Some(package) => self.imports.iter().any(|i| &**i == package),
        }
    }

    /// `None` when some argument cannot fill its slot.
    fn score(&self, signature: &FunctionSignature, states: &[Argument]) -> Result<Option<Score>, TypeError> {
        let policy = MatchPolicy::OVERLOAD;
        let mut score = Vec::with_capacity(states.len());
        for (parameter, state) in signature.parameters.iter().zip(states) {
            let slot = match state {
                Argument::Typed(value) => {
                    let Some(generic) =
                        generic_type_match(self.graph, &parameter.generic_type, &value.generic_type, policy)?
                    else {
                        return Ok(None);
                    };
                    let Some(multiplicity) = multiplicity_match(&parameter.multiplicity, &value.multiplicity, policy)
                    else {
                        return Ok(None);
                    };
                    (generic, multiplicity)
                }
                Argument::Lambda { arity } => {
                    let accepts = match expected_function_type(&parameter.generic_type) {
                        Some(function_type) => function_type.parameters.len() == *arity,
                        None => {
                            parameter.generic_type.type_parameter_name().is_some() || parameter.generic_type.is_any()
                        }
                    };
                    let Some(multiplicity) = multiplicity_match(&parameter.multiplicity, &Multiplicity::ONE, policy)
                    else {
                        return Ok(None);
                    };
                    if !accepts {
                        return Ok(None);
                    }
                    (GenericTypeMatch::non_concrete(), multiplicity)
                }
                Argument::Call => (GenericTypeMatch::non_concrete(), MultiplicityMatch::NonConcrete),
            };
            score.push(slot);
        }
        Ok(Some(score))
    }

    /// Bind `declared` to the arguments. `Ok(None)` rejects the candidate.
    fn bind_candidate(
        &mut self,
        declared: &FunctionSignature,
        arguments: &mut [Expr],
        states: &[Argument],
        expected: Option<&ValueType>,
        range: SourceRange,
    ) -> CheckResult<Option<ValueType>> {
        let graph = self.graph;
        let signature = &rename_signature(declared, self.next_call_tag()).at(range)?;
        let mut context = InferenceContext::new(graph);
        for parameter in &signature.type_parameters {
            context.fresh_type_param(parameter.name.clone());
        }
        for parameter in &signature.multiplicity_parameters {
            context.fresh_multiplicity_param(parameter.clone());
        }

        let slots: Vec<ValueType> = signature
            .parameters
            .iter()
            .map(|p| ValueType::new(p.generic_type.clone(), p.multiplicity.clone()))
            .collect();
        let mut values: Vec<Option<ValueType>> = states.iter().map(|s| s.value().cloned()).collect();
        for (slot, value) in slots.iter().zip(&values) {
            if let Some(value) = value {
                context.register_value(slot, value).at(range)?;
            }
        }
        if let Some(expected) = expected {
            context.register_value(&signature.return_value(), expected).at(range)?;
        }

        for pass in 0..MAX_LAMBDA_PASSES {
            let mut pending = false;
            let mut progressed = false;
            for index in 0..values.len() {
                if values[index].is_some() {
                    continue;
                }
                pending = true;
                let mut unresolved = context.unresolved_type_params();
                unresolved.extend(context.unresolved_multiplicity_params());
                let slot = instantiate_value(&slots[index], &context.substitution()).at(range)?;

                let argument = &mut arguments[index];
                let argument_range = argument.range;
                let value = if let ExprKind::Lambda(lambda) = &mut argument.kind {
                    let Some(function_type) = expected_function_type(&slot.generic_type) else {
                        continue;
                    };
                    if function_type
                        .parameters
                        .iter()
                        .any(|p| mentions_any(&p.generic_type, &p.multiplicity, &unresolved))
                    {
                        continue;
                    }
                    let function_type = function_type.clone();
                    self.visit_lambda(lambda, Some(&function_type), argument_range)?
                } else {
                    if mentions_any(&slot.generic_type, &slot.multiplicity, &unresolved) {
                        continue;
                    }
                    Some(self.infer_expected(argument, Some(&slot))?)
                };
                let Some(value) = value else {
                    continue;
                };
                argument.inferred = Some(value.clone());
                context.register_value(&slots[index], &value).at(range)?;
                values[index] = Some(value);
                progressed = true;
            }
            if !pending || !progressed {
                break;
            }
            trace!(pass, overload = %signature.path, "deferred arguments pass");
        }

        if let Some(index) = values.iter().position(Option::is_none) {
            let argument = &arguments[index];
            let at = argument
                .as_lambda()
                .map_or(argument.range, |lambda| lambda.untyped_range(argument.range));
            return Err(TypeError::CannotInferLambdaParameters).at(at);
        }
        if let Some(parameter) = context.unresolved_type_params().into_iter().next() {
            return Err(TypeError::UnresolvableTypeParameter {
                parameter: declared_name(&parameter).to_string(),
                function: declared.name().to_string(),
                signature: graph.print(&GenericType::function(declared.function_type())),
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
        for (slot, value) in slots.iter().zip(values.iter().flatten()) {
            let slot = instantiate_value(slot, &substitution).at(range)?;
            if !value_type_compatible(graph, value, &slot).at(range)? {
                trace!(
                    found = %graph.print_value(value),
                    expected = %graph.print_value(&slot),
                    "argument does not fit the bound slot"
                );
                return Ok(None);
            }
        }
        instantiate_value(&signature.return_value(), &substitution)
            .map(Some)
            .at(range)
    }

    /// `plus(_:Any[2])`, listing the overloads when there are few enough.
    fn no_match(&self, name: &str, states: &[Argument], range: SourceRange) -> CheckError {
        let arguments: Vec<String> = states
            .iter()
            .map(|state| match state {
                Argument::Typed(value) => format!("_:{}", self.graph.print_value(value)),
                Argument::Lambda { .. } => "_:LambdaFunction[1]".to_string(),
                Argument::Call => "_:Any[*]".to_string(),
            })
            .collect();
        let call = format!("{name}({})", arguments.join(","));

        let candidates = self.functions.by_name(name);
        let listed = !candidates.is_empty() && candidates.len() < MAX_LISTED_CANDIDATES;
        let mut imported = Vec::new();
        let mut not_imported = Vec::new();
        if listed {
            for signature in candidates.iter().filter_map(|id| self.functions.get(*id)) {
                let text = format_signature(self.graph, signature);
                if self.is_imported(signature) {
                    imported.push(text);
                } else {
                    not_imported.push(text);
                }
            }
            imported.sort();
            not_imported.sort();
        }
        debug!(call = %call, "no matching overload");
        CheckError {
            error: TypeError::NoMatchingOverload(Box::new(NoMatchingOverload {
                call,
                imported,
                not_imported,
                listed,
            })),
            range,
        }
    }
}

#[cfg(test)]
#[path = "../tests/call_tests.rs"]
mod tests;
