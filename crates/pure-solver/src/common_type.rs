//! Best common generic type.
//!
//! Covariantly this is the most specific type every input can be used as
//! (the type of a collection literal `[1, 2.0]` is `Number`). Contravariantly
//! it is the input that can be used as every other one, or `Nil`.

use crate::compat::is_generic_compatible_with;
use crate::diagnostics::TypeError;
use crate::generalization::linearize;
use crate::graph::TypeGraph;
use crate::inheritance::homogenize;
use crate::multiplicity::Multiplicity;
use crate::relation;
use crate::types::{FunctionParameter, FunctionType, GenericType, RawType, RelationType, TypeId};

pub fn best_common_generic_type(
    graph: &TypeGraph,
    types: &[GenericType],
    covariant: bool,
) -> Result<GenericType, TypeError> {
    let mut distinct: Vec<&GenericType> = Vec::with_capacity(types.len());
    for t in types {
        if !distinct.contains(&t) {
            distinct.push(t);
        }
    }
    if covariant {
        common_supertype(graph, &distinct)
    } else {
        common_subtype(graph, &distinct)
    }
}

fn common_supertype(graph: &TypeGraph, types: &[&GenericType]) -> Result<GenericType, TypeError> {
    if types.iter().any(|t| t.is_any()) {
        return Ok(GenericType::any());
    }
    let types: Vec<&GenericType> = types.iter().copied().filter(|t| !t.is_nil()).collect();
    match types.as_slice() {
        [] => return Ok(GenericType::nil()),
        [only] => return Ok((*only).clone()),
        _ => {}
    }
    if types.iter().any(|t| !t.is_concrete()) {
        return Ok(GenericType::any());
    }
    if types.iter().all(|t| matches!(t.raw, RawType::Function(_))) {
        return Ok(merge_function_types(graph, &types)?.unwrap_or_else(GenericType::any));
    }
    if types.iter().all(|t| matches!(t.raw, RawType::Relation(_))) {
        let mut merged = types[0].as_relation_type().cloned().unwrap_or_else(RelationType::empty);
        for t in &types[1..] {
            let Some(next) = t.as_relation_type() else {
                return Ok(GenericType::any());
            };
            match relation::merge(graph, &merged, next) {
                Ok(m) => merged = m,
                Err(_) => return Ok(GenericType::any()),
            }
        }
        return Ok(GenericType::relation(merged));
    }
    let Some(ids) = types.iter().map(|t| t.nominal_id()).collect::<Option<Vec<TypeId>>>() else {
        return Ok(GenericType::any());
    };

    let mut linearizations = Vec::with_capacity(ids.len());
    for id in &ids {
        linearizations.push(linearize(graph, *id)?);
    }
    let shortest = linearizations
        .iter()
        .min_by_key(|l| l.len())
        .cloned()
        .unwrap_or_default();
    let Some(ancestor) = shortest
        .iter()
        .copied()
        .find(|candidate| linearizations.iter().all(|l| l.contains(candidate)))
    else {
        return Ok(GenericType::any());
    };
    merge_arguments(graph, &types, ancestor)
}

/// `ancestor` with the arguments of every input's view of it merged.
fn merge_arguments(graph: &TypeGraph, types: &[&GenericType], ancestor: TypeId) -> Result<GenericType, TypeError> {
    let Some(data) = graph.get(ancestor) else {
        return Ok(GenericType::nominal(ancestor));
    };
    let parameters = data.type_parameters().to_vec();
    let multiplicity_parameter_count = data.multiplicity_parameters().len();
    if parameters.is_empty() && multiplicity_parameter_count == 0 {
        return Ok(GenericType::nominal(ancestor));
    }
    let mut views = Vec::with_capacity(types.len());
    for t in types {
        match homogenize(graph, t, ancestor)? {
            Some(view) if view.type_arguments.len() == parameters.len() => views.push(view),
            // Raw uses lose the arguments.
            _ => return Ok(GenericType::nominal(ancestor)),
        }
    }
    let mut type_arguments = Vec::with_capacity(parameters.len());
    for (i, parameter) in parameters.iter().enumerate() {
        let arguments: Vec<GenericType> = views.iter().map(|v| v.type_arguments[i].clone()).collect();
        type_arguments.push(best_common_generic_type(graph, &arguments, !parameter.contravariant)?);
    }
    let mut multiplicity_arguments = Vec::with_capacity(multiplicity_parameter_count);
    for i in 0..multiplicity_parameter_count {
        multiplicity_arguments.push(Multiplicity::min_subsuming(
            views.iter().filter_map(|v| v.multiplicity_arguments.get(i)),
        ));
    }
    Ok(GenericType::applied(ancestor, type_arguments, multiplicity_arguments))
}

/// Slot-wise merge: parameters narrowed, return widened. `None` when the
/// shapes differ.
fn merge_function_types(graph: &TypeGraph, types: &[&GenericType]) -> Result<Option<GenericType>, TypeError> {
    let functions: Vec<&FunctionType> = types.iter().filter_map(|t| t.as_function_type()).collect();
    let Some(first) = functions.first() else {
        return Ok(None);
    };
    let arity = first.parameters.len();
    if functions.iter().any(|f| f.parameters.len() != arity) {
        return Ok(None);
    }
    let mut parameters = Vec::with_capacity(arity);
    for i in 0..arity {
        let slot_types: Vec<GenericType> = functions
            .iter()
            .map(|f| f.parameters[i].generic_type.clone())
            .collect();
        let generic_type = best_common_generic_type(graph, &slot_types, false)?;
        let mut multiplicity = first.parameters[i].multiplicity.clone();
        for f in &functions[1..] {
            match multiplicity.intersect(&f.parameters[i].multiplicity) {
                Some(m) => multiplicity = m,
                None if multiplicity == f.parameters[i].multiplicity => {}
                None => return Ok(None),
            }
        }
        parameters.push(FunctionParameter::new(generic_type, multiplicity));
    }
    let returns: Vec<GenericType> = functions.iter().map(|f| f.return_type.clone()).collect();
    let return_type = best_common_generic_type(graph, &returns, true)?;
    let return_multiplicity = Multiplicity::min_subsuming(functions.iter().map(|f| &f.return_multiplicity));
    Ok(Some(GenericType::function(FunctionType::new(
        parameters,
        return_type,
        return_multiplicity,
    ))))
}

fn common_subtype(graph: &TypeGraph, types: &[&GenericType]) -> Result<GenericType, TypeError> {
    if types.iter().any(|t| t.is_nil()) {
        return Ok(GenericType::nil());
    }
    let types: Vec<&GenericType> = types.iter().copied().filter(|t| !t.is_any()).collect();
    if types.is_empty() {
        return Ok(GenericType::any());
    }
    'candidates: for candidate in &types {
        for other in &types {
            if !is_generic_compatible_with(graph, candidate, other)? {
                continue 'candidates;
            }
        }
        return Ok((*candidate).clone());
    }
    Ok(GenericType::nil())
}

#[cfg(test)]
#[path = "../tests/common_type_tests.rs"]
mod tests;
