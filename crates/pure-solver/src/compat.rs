//! Structural equality and compatibility of generic types.
//!
//! Compatibility answers "can a value of type `a` be used where `b` is
//! expected". It is more permissive than matching: sides that are still
//! parameters are accepted, since the question is asked about declared
//! return types and re-inference results where a pending parameter means
//! "not known yet" rather than "wrong".

use crate::diagnostics::TypeError;
use crate::generalization::is_subtype;
use crate::graph::TypeGraph;
use crate::inheritance::homogenize;
use crate::multiplicity::Multiplicity;
use crate::relation;
use crate::types::{FunctionType, GenericType, RawType, ValueType};

/// Same raw type and pairwise equal arguments, order-sensitive.
/// Function parameter names are ignored.
pub fn generic_types_equal(a: &GenericType, b: &GenericType) -> bool {
    a == b
}

pub fn value_types_equal(a: &ValueType, b: &ValueType) -> bool {
    generic_types_equal(&a.generic_type, &b.generic_type) && a.multiplicity == b.multiplicity
}

/// True when `value` can be used where `expected` is expected.
pub fn is_generic_compatible_with(
    graph: &TypeGraph,
    value: &GenericType,
    expected: &GenericType,
) -> Result<bool, TypeError> {
    is_generic_compatible_with_variance(graph, value, expected, true)
}

/// Compatibility in either direction: with `covariant == false`, `expected`
/// must be usable where `value` is.
pub fn is_generic_compatible_with_variance(
    graph: &TypeGraph,
    value: &GenericType,
    expected: &GenericType,
    covariant: bool,
) -> Result<bool, TypeError> {
    if value == expected || !value.is_concrete() || !expected.is_concrete() {
        return Ok(true);
    }
    let (sub, sup) = if covariant { (value, expected) } else { (expected, value) };
    if sub.is_nil() || sup.is_any() {
        return Ok(true);
    }
    match (&sup.raw, &sub.raw) {
        (RawType::Function(_), RawType::Function(_)) => {
            let (Some(value_fn), Some(expected_fn)) = (value.as_function_type(), expected.as_function_type())
            else {
                return Ok(false);
            };
            function_types_compatible(graph, value_fn, expected_fn, covariant)
        }
        (RawType::Relation(sup_rel), RawType::Relation(sub_rel)) => {
            relation::is_compatible_with(graph, sub_rel, sup_rel)
        }
        (RawType::Nominal(sup_id), RawType::Nominal(sub_id)) => {
            if !is_subtype(graph, *sub_id, *sup_id)? {
                return Ok(false);
            }
            if sup.type_arguments.is_empty() && sup.multiplicity_arguments.is_empty() {
                return Ok(true);
            }
            let Some(view) = homogenize(graph, sub, *sup_id)? else {
                return Ok(false);
            };
            // A raw use of a generic class is compatible with any instance.
            if view.type_arguments.is_empty() && view.multiplicity_arguments.is_empty() {
                return Ok(true);
            }
            if view.type_arguments.len() != sup.type_arguments.len()
                || view.multiplicity_arguments.len() != sup.multiplicity_arguments.len()
            {
                return Ok(false);
            }
            let parameters = graph
                .get(*sup_id)
                .map(|data| data.type_parameters().to_vec())
                .unwrap_or_default();
            for (i, (sub_arg, sup_arg)) in view.type_arguments.iter().zip(&sup.type_arguments).enumerate() {
                let argument_covariant = !parameters.get(i).is_some_and(|p| p.contravariant);
                if !is_generic_compatible_with_variance(graph, sub_arg, sup_arg, argument_covariant)? {
                    return Ok(false);
                }
            }
            Ok(view
                .multiplicity_arguments
                .iter()
                .zip(&sup.multiplicity_arguments)
                .all(|(sub_m, sup_m)| multiplicity_compatible(sub_m, sup_m, true)))
        }
        _ => Ok(false),
    }
}

/// Parameters contravariantly, return covariantly.
fn function_types_compatible(
    graph: &TypeGraph,
    value: &FunctionType,
    expected: &FunctionType,
    covariant: bool,
) -> Result<bool, TypeError> {
    if value.parameters.len() != expected.parameters.len() {
        return Ok(false);
    }
    for (v, e) in value.parameters.iter().zip(&expected.parameters) {
        if !is_generic_compatible_with_variance(graph, &v.generic_type, &e.generic_type, !covariant)?
            || !multiplicity_compatible(&v.multiplicity, &e.multiplicity, !covariant)
        {
            return Ok(false);
        }
    }
    Ok(
        is_generic_compatible_with_variance(graph, &value.return_type, &expected.return_type, covariant)?
            && multiplicity_compatible(&value.return_multiplicity, &expected.return_multiplicity, covariant),
    )
}

/// Interval containment; parameters on either side are accepted.
pub fn multiplicity_compatible(value: &Multiplicity, expected: &Multiplicity, covariant: bool) -> bool {
    if !value.is_concrete() || !expected.is_concrete() {
        return true;
    }
    if covariant {
        expected.subsumes(value)
    } else {
        value.subsumes(expected)
    }
}

/// Type and multiplicity compatibility of a value with an expected slot.
pub fn value_type_compatible(graph: &TypeGraph, value: &ValueType, expected: &ValueType) -> Result<bool, TypeError> {
    Ok(is_generic_compatible_with(graph, &value.generic_type, &expected.generic_type)?
        && multiplicity_compatible(&value.multiplicity, &expected.multiplicity, true))
}

#[cfg(test)]
#[path = "../tests/compat_tests.rs"]
mod tests;
