//! Lambda processing.
//!
//! A lambda with every parameter typed is processed where it stands. One
//! with untyped parameters is deferred until the enclosing call has bound
//! enough of the callee's type parameters to supply them, then processed
//! with that context. The lambda's [`InferencePhase`](crate::phase::InferencePhase) records how far it
//! got; a lambda that is already done is not processed again.

use crate::diagnostics::TypeError;
use crate::engine::{AtRange, CheckResult, FunctionChecker};
use crate::expr::Lambda;
use crate::phase::{PhaseEvent, advance};
use crate::types::{FunctionParameter, FunctionType, GenericType, ValueType};
use pure_common::SourceRange;
use tracing::{debug, trace};

impl FunctionChecker<'_> {
    /// Type `lambda`, taking missing parameter types from `context`.
    ///
    /// Returns `None` when parameter types are still missing; the lambda is
    /// then left deferred.
    pub(crate) fn visit_lambda(
        &mut self,
        lambda: &mut Lambda,
        context: Option<&FunctionType>,
        range: SourceRange,
    ) -> CheckResult<Option<ValueType>> {
        if lambda.phase.is_done() {
            lambda.phase = advance(lambda.phase, PhaseEvent::ContextSupplied).at(range)?;
            return Ok(lambda
                .function_type
                .clone()
                .map(|f| ValueType::one(GenericType::lambda(f))));
        }

        let entry = lambda.phase;
        let Some(parameters) = self.lambda_parameters(lambda, context, range)? else {
            lambda.phase = advance(lambda.phase, PhaseEvent::ParametersMissing).at(range)?;
            trace!(phase = %lambda.phase, "lambda deferred");
            return Ok(None);
        };
        let event = if lambda.has_untyped_parameters() {
            PhaseEvent::ContextSupplied
        } else {
            PhaseEvent::ParametersBound
        };
        lambda.phase = advance(lambda.phase, event).at(range)?;

        self.scope.push_frame();
        for parameter in &parameters {
            self.note_type(&parameter.generic_type);
            if let Some(name) = &parameter.name {
                self.scope.bind(
                    name.clone(),
                    ValueType::new(parameter.generic_type.clone(), parameter.multiplicity.clone()),
                );
            }
        }
        let body = self.lambda_body(lambda, range);
        self.scope.pop_frame();
        let found = match body {
            Ok(found) => found,
            Err(error) => {
                // A later visit starts over from where this one began.
                lambda.phase = entry;
                return Err(error);
            }
        };

        lambda.phase = advance(lambda.phase, PhaseEvent::ReturnDerived).at(range)?;
        let function_type = FunctionType::new(parameters, found.generic_type, found.multiplicity);
        lambda.open_variables = lambda.compute_open_variables();
        lambda.function_type = Some(function_type.clone());
        lambda.phase = advance(lambda.phase, PhaseEvent::Finished).at(range)?;
        let value = ValueType::one(GenericType::lambda(function_type));
        debug!(lambda = %self.graph.print_value(&value), "lambda typed");
        Ok(Some(value))
    }

    /// Declared types first, then `context`, slot by slot.
    fn lambda_parameters(
        &self,
        lambda: &Lambda,
        context: Option<&FunctionType>,
        range: SourceRange,
    ) -> CheckResult<Option<Vec<FunctionParameter>>> {
        if let Some(context) = context
            && context.parameters.len() != lambda.parameters.len()
        {
            return Err(TypeError::TypeMismatch {
                found: format!("a lambda with {} parameters", lambda.parameters.len()),
                expected: self.graph.print(&GenericType::function(context.clone())),
            })
            .at(range);
        }
        let mut parameters = Vec::with_capacity(lambda.parameters.len());
        for (index, parameter) in lambda.parameters.iter().enumerate() {
            let value = match &parameter.value_type {
                Some(text) => {
                    let at = if parameter.range.is_unknown() { range } else { parameter.range };
                    self.lowering().lower_value_str(text).at(at)?
                }
                None => match context.and_then(|c| c.parameters.get(index)) {
                    Some(slot) => ValueType::new(slot.generic_type.clone(), slot.multiplicity.clone()),
                    None => return Ok(None),
                },
            };
            parameters.push(FunctionParameter::named(
                parameter.name.clone(),
                value.generic_type,
                value.multiplicity,
            ));
        }
        Ok(Some(parameters))
    }

    fn lambda_body(&mut self, lambda: &mut Lambda, range: SourceRange) -> CheckResult<ValueType> {
        lambda.phase = advance(lambda.phase, PhaseEvent::BodyStarted).at(range)?;
        let found = self.infer_sequence(&mut lambda.body)?;
        lambda.phase = advance(lambda.phase, PhaseEvent::BodyTyped).at(range)?;
        Ok(found)
    }
}

#[cfg(test)]
#[path = "../tests/lambda_tests.rs"]
mod tests;
