//! Lowering parsed type expressions into [`GenericType`]s.
//!
//! Names resolve to type parameters in scope first, then to graph types via
//! the unit's imports. Argument counts are checked against declarations and
//! relation column lists against duplicates.

use crate::diagnostics::TypeError;
use crate::graph::TypeGraph;
use crate::instantiate::check_argument_counts;
use crate::type_expr::{TypeExpr, ValueTypeExpr, parse_type, parse_value_type};
use crate::types::{Column, FunctionParameter, FunctionType, GenericType, RelationType, ValueType};
use pure_common::Name;

pub struct TypeLowering<'a> {
    graph: &'a TypeGraph,
    imports: &'a [Name],
    type_parameters: &'a [Name],
}

impl<'a> TypeLowering<'a> {
    pub fn new(graph: &'a TypeGraph, imports: &'a [Name]) -> Self {
        Self {
            graph,
            imports,
            type_parameters: &[],
        }
    }

    pub fn with_type_parameters(mut self, type_parameters: &'a [Name]) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    pub fn lower(&self, expr: &TypeExpr) -> Result<GenericType, TypeError> {
        match expr {
            TypeExpr::Path {
                path,
                type_arguments,
                multiplicity_arguments,
            } => {
                if type_arguments.is_empty()
                    && multiplicity_arguments.is_empty()
                    && self.type_parameters.iter().any(|p| p == path)
                {
                    return Ok(GenericType::parameter(path.clone()));
                }
                let id = self
                    .graph
                    .resolve_name(path, self.imports)
                    .ok_or_else(|| TypeError::UnknownType {
                        path: path.to_string(),
                    })?;
                let generic_type = GenericType::applied(
                    id,
                    type_arguments
                        .iter()
                        .map(|arg| self.lower(arg))
                        .collect::<Result<_, _>>()?,
                    multiplicity_arguments.clone(),
                );
                check_argument_counts(self.graph, &generic_type)?;
                Ok(generic_type)
            }
            TypeExpr::Function {
                parameters,
                return_type,
            } => Ok(GenericType::function(self.lower_function(parameters, return_type)?)),
            TypeExpr::Relation { columns } => {
                let columns = columns
                    .iter()
                    .map(|(name, column_type)| Ok(Column::new(name.clone(), self.lower(column_type)?)))
                    .collect::<Result<Vec<_>, TypeError>>()?;
                Ok(GenericType::relation(RelationType::new(columns)?))
            }
            TypeExpr::Operation { left, kind, right } => {
                let left = self.lower(left)?;
                let right = self.lower(right)?;
                match crate::relation::evaluate_operation(&left, *kind, &right)? {
                    Some(evaluated) => Ok(GenericType::relation(evaluated)),
                    None => Ok(GenericType::operation(left, *kind, right)),
                }
            }
        }
    }

    pub fn lower_value_type(&self, expr: &ValueTypeExpr) -> Result<ValueType, TypeError> {
        Ok(ValueType::new(self.lower(&expr.type_expr)?, expr.multiplicity.clone()))
    }

    fn lower_function(
        &self,
        parameters: &[ValueTypeExpr],
        return_type: &ValueTypeExpr,
    ) -> Result<FunctionType, TypeError> {
        let parameters = parameters
            .iter()
            .map(|p| {
                let value = self.lower_value_type(p)?;
                Ok(FunctionParameter::new(value.generic_type, value.multiplicity))
            })
            .collect::<Result<Vec<_>, TypeError>>()?;
        let ret = self.lower_value_type(return_type)?;
        Ok(FunctionType::new(parameters, ret.generic_type, ret.multiplicity))
    }

    /// Parse and lower `text` in one step.
    pub fn lower_str(&self, text: &str) -> Result<GenericType, TypeError> {
        self.lower(&parse_type(text)?)
    }

    /// Parse and lower `Type[mult]` in one step.
    pub fn lower_value_str(&self, text: &str) -> Result<ValueType, TypeError> {
        self.lower_value_type(&parse_value_type(text)?)
    }
}

#[cfg(test)]
#[path = "../tests/lower_tests.rs"]
mod tests;
