//! Generalization resolver.
//!
//! Computes the C3 linearization of `extends` hierarchies and, for a generic
//! type, the ordered list of all its supertypes with type arguments
//! substituted through every level (`A<B<Y>>`).
//!
//! - Self comes first and `Any` last.
//! - Declaration order of `extends` lists is respected.
//! - Cycles are reported as [`TypeError::CyclicGeneralization`], found with a
//!   visiting set.
//! - Hierarchies with no consistent C3 order are reported as
//!   [`TypeError::InconsistentGeneralization`].
//! - An ancestor reached with two different argument lists is reported as
//!   [`TypeError::DiamondInheritance`].

use crate::diagnostics::TypeError;
use crate::graph::TypeGraph;
use crate::instantiate::{bind_type_arguments, instantiate};
use crate::multiplicity::Multiplicity;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{GenericType, RawType, TypeData, TypeId};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// C3 linearization of a nominal type: itself, then its ancestors, ending
/// with `Any`. Cached per graph generation.
pub fn linearize(graph: &TypeGraph, id: TypeId) -> Result<Arc<[TypeId]>, TypeError> {
    if let Some(cached) = graph.cached_linearization(id) {
        return Ok(cached);
    }
    let mut guard = RecursionGuard::with_profile(RecursionProfile::Generalization);
    linearize_guarded(graph, id, &mut guard)
}

fn linearize_guarded(
    graph: &TypeGraph,
    id: TypeId,
    guard: &mut RecursionGuard<TypeId>,
) -> Result<Arc<[TypeId]>, TypeError> {
    if let Some(cached) = graph.cached_linearization(id) {
        return Ok(cached);
    }
    match guard.enter(id) {
        RecursionResult::Entered => {}
        RecursionResult::Cycle => {
            let mut chain: Vec<String> = guard
                .cycle_from(&id)
                .iter()
                .map(|t| graph.path(*t).to_string())
                .collect();
            chain.push(graph.path(id).to_string());
            return Err(TypeError::CyclicGeneralization {
                path: graph.path(id).to_string(),
                chain,
            });
        }
        RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
            return Err(TypeError::RecursionLimit {
                context: format!("resolving the generalizations of {}", graph.path(id)),
            });
        }
    }
    let result = compute_linearization(graph, id, guard);
    guard.leave(id);
    let linearization: Arc<[TypeId]> = result?.into();
    trace!(type_id = id.0, len = linearization.len(), "linearize");
    graph.store_linearization(id, linearization.clone());
    Ok(linearization)
}

fn compute_linearization(
    graph: &TypeGraph,
    id: TypeId,
    guard: &mut RecursionGuard<TypeId>,
) -> Result<Vec<TypeId>, TypeError> {
    if id == TypeId::ANY {
        return Ok(vec![TypeId::ANY]);
    }
    let supers = direct_supertypes(graph, id);
    let mut sequences: Vec<Vec<TypeId>> = Vec::with_capacity(supers.len() + 1);
    for super_id in &supers {
        sequences.push(linearize_guarded(graph, *super_id, guard)?.to_vec());
    }
    sequences.push(supers.clone());

    let mut result = vec![id];
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            break;
        }
        let head = sequences
            .iter()
            .map(|s| s[0])
            .find(|candidate| sequences.iter().all(|s| !s[1..].contains(candidate)));
        let Some(head) = head else {
            return Err(TypeError::InconsistentGeneralization {
                path: graph.path(id).to_string(),
                supertypes: supers.iter().map(|s| graph.path(*s).to_string()).collect(),
            });
        };
        result.push(head);
        for sequence in &mut sequences {
            if sequence[0] == head {
                sequence.remove(0);
            }
        }
    }
    Ok(result)
}

/// Declared direct supertypes; an empty `extends` list means `Any`.
fn direct_supertypes(graph: &TypeGraph, id: TypeId) -> Vec<TypeId> {
    let declared: Vec<TypeId> = match graph.get(id) {
        None | Some(TypeData::Top) => return Vec::new(),
        Some(TypeData::Bottom) => Vec::new(),
        Some(TypeData::Primitive(p)) => p.generalizations.to_vec(),
        Some(TypeData::Class(c)) => c
            .generalizations
            .iter()
            .filter_map(GenericType::nominal_id)
            .collect(),
    };
    if declared.is_empty() {
        vec![TypeId::ANY]
    } else {
        declared
    }
}

/// Declared generalizations of a nominal type as generic types, in terms of
/// its own parameters.
fn declared_generalizations(graph: &TypeGraph, id: TypeId) -> Vec<GenericType> {
    match graph.get(id) {
        Some(TypeData::Class(c)) => c.generalizations.clone(),
        Some(TypeData::Primitive(p)) => p.generalizations.iter().map(|g| GenericType::nominal(*g)).collect(),
        _ => Vec::new(),
    }
}

/// Every supertype of `generic_type`, self first, with type arguments
/// substituted, in linearization order.
pub fn all_super_types_including_self(
    graph: &TypeGraph,
    generic_type: &GenericType,
) -> Result<Vec<GenericType>, TypeError> {
    let id = match &generic_type.raw {
        RawType::Nominal(id) => *id,
        RawType::Function(_) | RawType::Relation(_) => {
            return Ok(vec![generic_type.clone(), GenericType::any()]);
        }
        RawType::Parameter(_) | RawType::Operation(_) => return Ok(vec![generic_type.clone()]),
    };
    let linearization = linearize(graph, id)?;

    let mut resolved: FxHashMap<TypeId, GenericType> = FxHashMap::default();
    resolved.insert(id, generic_type.clone());
    let mut worklist = VecDeque::from([with_erased_arguments(graph, generic_type)]);
    while let Some(current) = worklist.pop_front() {
        let Some(current_id) = current.nominal_id() else {
            continue;
        };
        let substitution = bind_type_arguments(graph, &current)?;
        for generalization in declared_generalizations(graph, current_id) {
            let super_type = instantiate(&generalization, &substitution)?;
            let Some(super_id) = super_type.nominal_id() else {
                continue;
            };
            match resolved.get(&super_id) {
                Some(existing) if *existing != super_type => {
                    return Err(TypeError::DiamondInheritance {
                        path: graph.print(generic_type),
                        ancestor: graph.path(super_id).to_string(),
                        first: graph.print(existing),
                        second: graph.print(&super_type),
                    });
                }
                Some(_) => {}
                None => {
                    resolved.insert(super_id, super_type.clone());
                    worklist.push_back(super_type);
                }
            }
        }
    }

    Ok(linearization
        .iter()
        .map(|t| resolved.remove(t).unwrap_or_else(|| GenericType::nominal(*t)))
        .collect())
}

/// A raw use of a generic class with `Any` for each missing type argument
/// and `[*]` for each missing multiplicity argument, so the class's own
/// parameter names never reach its supertypes.
fn with_erased_arguments(graph: &TypeGraph, generic_type: &GenericType) -> GenericType {
    let Some(data) = generic_type.nominal_id().and_then(|id| graph.get(id)) else {
        return generic_type.clone();
    };
    let mut erased = generic_type.clone();
    if erased.type_arguments.is_empty() {
        erased.type_arguments = data.type_parameters().iter().map(|_| GenericType::any()).collect();
    }
    if erased.multiplicity_arguments.is_empty() {
        erased.multiplicity_arguments = data
            .multiplicity_parameters()
            .iter()
            .map(|_| Multiplicity::ZERO_MANY)
            .collect();
    }
    erased
}

/// True when `sub` is `sup`, or `sup` appears in `sub`'s linearization.
/// `Nil` is below and `Any` above every type.
pub fn is_subtype(graph: &TypeGraph, sub: TypeId, sup: TypeId) -> Result<bool, TypeError> {
    if sub == sup || sup == TypeId::ANY || sub == TypeId::NIL {
        return Ok(true);
    }
    Ok(linearize(graph, sub)?.contains(&sup))
}

/// Position of `sup` in `sub`'s linearization: 0 for the type itself.
pub fn generalization_distance(graph: &TypeGraph, sub: TypeId, sup: TypeId) -> Result<Option<u32>, TypeError> {
    if sub == sup {
        return Ok(Some(0));
    }
    Ok(linearize(graph, sub)?
        .iter()
        .position(|t| *t == sup)
        .map(|p| p as u32))
}

#[cfg(test)]
#[path = "../tests/generalization_tests.rs"]
mod tests;
