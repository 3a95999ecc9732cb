//! Type substitution.
//!
//! A [`TypeSubstitution`] maps type parameter names to generic types and
//! multiplicity parameter names to multiplicities. [`instantiate`] applies it
//! at every nesting depth, including function-type slots and relation
//! columns, and evaluates relation operations (`T+V`, `T-V`) once both
//! operands have become concrete relation types.

use crate::diagnostics::TypeError;
use crate::format::TypeFormatter;
use crate::graph::TypeGraph;
use crate::multiplicity::Multiplicity;
use crate::relation;
use crate::types::{
    Column, FunctionParameter, FunctionType, GenericType, RawType, RelationType, TypeId,
};
use indexmap::IndexMap;
use pure_common::Name;
use std::sync::Arc;

// =============================================================================
// TypeSubstitution
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    types: IndexMap<Name, GenericType>,
    multiplicities: IndexMap<Name, Multiplicity>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.multiplicities.is_empty()
    }

    pub fn bind_type(&mut self, name: Name, generic_type: GenericType) {
        self.types.insert(name, generic_type);
    }

    pub fn bind_multiplicity(&mut self, name: Name, multiplicity: Multiplicity) {
        self.multiplicities.insert(name, multiplicity);
    }

    pub fn type_binding(&self, name: &str) -> Option<&GenericType> {
        self.types.get(name)
    }

    pub fn multiplicity_binding(&self, name: &str) -> Option<&Multiplicity> {
        self.multiplicities.get(name)
    }

    pub fn type_bindings(&self) -> impl Iterator<Item = (&Name, &GenericType)> {
        self.types.iter()
    }

    pub fn multiplicity_bindings(&self) -> impl Iterator<Item = (&Name, &Multiplicity)> {
        self.multiplicities.iter()
    }

    /// Bindings of `other` win over existing ones.
    pub fn extend(&mut self, other: TypeSubstitution) {
        self.types.extend(other.types);
        self.multiplicities.extend(other.multiplicities);
    }
}

// =============================================================================
// Argument binding
// =============================================================================

/// `MyClass<T>` / `Holder<T|m>`: how a nominal type is declared.
pub fn declaration_signature(graph: &TypeGraph, id: TypeId) -> String {
    let formatter = TypeFormatter::new(graph);
    let mut out = formatter.nominal(id).to_string();
    let Some(data) = graph.get(id) else {
        return out;
    };
    let params = data.type_parameters();
    let mults = data.multiplicity_parameters();
    if params.is_empty() && mults.is_empty() {
        return out;
    }
    out.push('<');
    let names: Vec<&str> = params.iter().map(|p| &*p.name).collect();
    out.push_str(&names.join(", "));
    if !mults.is_empty() {
        out.push('|');
        let names: Vec<&str> = mults.iter().map(|m| &**m).collect();
        out.push_str(&names.join(", "));
    }
    out.push('>');
    out
}

/// Check that a nominal type carries either no arguments (raw use) or
/// exactly one per declared parameter.
pub fn check_argument_counts(graph: &TypeGraph, generic_type: &GenericType) -> Result<(), TypeError> {
    let Some(id) = generic_type.nominal_id() else {
        return Ok(());
    };
    let Some(data) = graph.get(id) else {
        return Ok(());
    };
    let type_args = generic_type.type_arguments.len();
    if type_args != 0 && type_args != data.type_parameters().len() {
        return Err(TypeError::TypeArgumentMismatch {
            expected: declaration_signature(graph, id),
            actual: graph.print(generic_type),
        });
    }
    let mult_args = generic_type.multiplicity_arguments.len();
    if mult_args != 0 && mult_args != data.multiplicity_parameters().len() {
        return Err(TypeError::MultiplicityArgumentMismatch {
            expected: declaration_signature(graph, id),
            actual: graph.print(generic_type),
        });
    }
    Ok(())
}

/// Substitution binding the declared parameters of a nominal type to the
/// arguments it carries. Raw uses (no arguments) bind nothing.
pub fn bind_type_arguments(
    graph: &TypeGraph,
    generic_type: &GenericType,
) -> Result<TypeSubstitution, TypeError> {
    let mut substitution = TypeSubstitution::new();
    let Some(data) = generic_type.nominal_id().and_then(|id| graph.get(id)) else {
        return Ok(substitution);
    };
    check_argument_counts(graph, generic_type)?;
    for (param, arg) in data.type_parameters().iter().zip(&generic_type.type_arguments) {
        substitution.bind_type(param.name.clone(), arg.clone());
    }
    for (param, arg) in data
        .multiplicity_parameters()
        .iter()
        .zip(&generic_type.multiplicity_arguments)
    {
        substitution.bind_multiplicity(param.clone(), arg.clone());
    }
    Ok(substitution)
}

// =============================================================================
// Instantiation
// =============================================================================

/// Apply `substitution` throughout `generic_type`.
///
/// Fails only when a relation operation becomes evaluable and is invalid
/// (duplicate columns in a union).
pub fn instantiate(
    generic_type: &GenericType,
    substitution: &TypeSubstitution,
) -> Result<GenericType, TypeError> {
    let type_arguments = generic_type
        .type_arguments
        .iter()
        .map(|arg| instantiate(arg, substitution))
        .collect::<Result<Vec<_>, _>>()?;
    let multiplicity_arguments = generic_type
        .multiplicity_arguments
        .iter()
        .map(|m| instantiate_multiplicity(m, substitution))
        .collect();

    let raw = match &generic_type.raw {
        RawType::Parameter(name) => match substitution.type_binding(name) {
            // A bound parameter is replaced wholesale; parameters never carry
            // arguments of their own.
            Some(bound) => return Ok(bound.clone()),
            None => generic_type.raw.clone(),
        },
        RawType::Nominal(_) => generic_type.raw.clone(),
        RawType::Function(f) => RawType::Function(Arc::new(instantiate_function_type(f, substitution)?)),
        RawType::Relation(r) => {
            let columns = r
                .columns
                .iter()
                .map(|c| {
                    Ok(Column::new(
                        c.name.clone(),
                        instantiate(&c.generic_type, substitution)?,
                    ))
                })
                .collect::<Result<Vec<_>, TypeError>>()?;
            RawType::Relation(Arc::new(RelationType { columns }))
        }
        RawType::Operation(op) => {
            let left = instantiate(&op.left, substitution)?;
            let right = instantiate(&op.right, substitution)?;
            match relation::evaluate_operation(&left, op.kind, &right)? {
                Some(evaluated) => return Ok(GenericType::relation(evaluated)),
                None => return Ok(GenericType::operation(left, op.kind, right)),
            }
        }
    };
    Ok(GenericType {
        raw,
        type_arguments,
        multiplicity_arguments,
    })
}

pub fn instantiate_multiplicity(multiplicity: &Multiplicity, substitution: &TypeSubstitution) -> Multiplicity {
    match multiplicity {
        Multiplicity::Parameter(name) => substitution
            .multiplicity_binding(name)
            .cloned()
            .unwrap_or_else(|| multiplicity.clone()),
        Multiplicity::Concrete { .. } => multiplicity.clone(),
    }
}

pub fn instantiate_function_type(
    function_type: &FunctionType,
    substitution: &TypeSubstitution,
) -> Result<FunctionType, TypeError> {
    let parameters = function_type
        .parameters
        .iter()
        .map(|p| {
            Ok(FunctionParameter {
                name: p.name.clone(),
                generic_type: instantiate(&p.generic_type, substitution)?,
                multiplicity: instantiate_multiplicity(&p.multiplicity, substitution),
            })
        })
        .collect::<Result<Vec<_>, TypeError>>()?;
    Ok(FunctionType {
        parameters,
        return_type: instantiate(&function_type.return_type, substitution)?,
        return_multiplicity: instantiate_multiplicity(&function_type.return_multiplicity, substitution),
    })
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
