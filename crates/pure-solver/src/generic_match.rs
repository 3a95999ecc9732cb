//! Generic type matching.
//!
//! Decides whether a value's generic type fits a target generic type and,
//! when it does, how closely. The result is a [`GenericTypeMatch`] tree that
//! orders lexicographically over the raw match, then the type-argument
//! matches, then the multiplicity-argument matches. Overload resolution
//! sorts candidates by it.
//!
//! Type parameters on either side are handled by [`ParameterMatchBehavior`]:
//! `MatchAnything` accepts any counterpart, `MatchCautiously` only accepts a
//! counterpart the parameter could never rule out.

use crate::diagnostics::TypeError;
use crate::graph::TypeGraph;
use crate::inheritance::homogenize;
use crate::multiplicity_match::{MultiplicityMatch, multiplicity_match};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::type_match::TypeMatch;
use crate::types::{GenericType, TypeParameter};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterMatchBehavior {
    MatchAnything,
    MatchCautiously,
}

/// Direction and parameter handling for one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatchPolicy {
    /// When true the value must be a subtype of the target.
    pub covariant: bool,
    pub target_parameters: ParameterMatchBehavior,
    pub value_parameters: ParameterMatchBehavior,
}

impl MatchPolicy {
    /// Policy used when shortlisting overloads: signature parameters accept
    /// anything, parameters left in argument types are treated cautiously.
    pub const OVERLOAD: Self = Self::new(
        true,
        ParameterMatchBehavior::MatchAnything,
        ParameterMatchBehavior::MatchCautiously,
    );

    pub const fn new(
        covariant: bool,
        target_parameters: ParameterMatchBehavior,
        value_parameters: ParameterMatchBehavior,
    ) -> Self {
        Self {
            covariant,
            target_parameters,
            value_parameters,
        }
    }

    pub const fn flipped(self) -> Self {
        Self {
            covariant: !self.covariant,
            ..self
        }
    }
}

/// Closeness of a generic type match. Smaller is better.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GenericTypeMatch {
    pub raw: TypeMatch,
    pub type_arguments: Vec<GenericTypeMatch>,
    pub multiplicity_arguments: Vec<MultiplicityMatch>,
}

impl GenericTypeMatch {
    pub fn new(raw: TypeMatch) -> Self {
        Self {
            raw,
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
        }
    }

    pub fn exact() -> Self {
        Self::new(TypeMatch::Exact)
    }

    pub fn non_concrete() -> Self {
        Self::new(TypeMatch::NonConcrete)
    }

    /// True when every part of the tree matched exactly.
    pub fn is_exact(&self) -> bool {
        self.raw == TypeMatch::Exact
            && self.type_arguments.iter().all(GenericTypeMatch::is_exact)
            && self.multiplicity_arguments.iter().all(|m| *m == MultiplicityMatch::Exact)
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Walks two generic types in lockstep, bounded by the nesting limit.
pub struct GenericMatcher<'g> {
    graph: &'g TypeGraph,
    depth: DepthCounter,
}

impl<'g> GenericMatcher<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            depth: DepthCounter::with_profile(RecursionProfile::GenericNesting),
        }
    }

    pub(crate) fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    pub fn generic_type_match(
        &mut self,
        target: &GenericType,
        value: &GenericType,
        policy: MatchPolicy,
    ) -> Result<Option<GenericTypeMatch>, TypeError> {
        if !self.depth.enter() {
            return Err(TypeError::RecursionLimit {
                context: format!("matching {}", self.graph.print(value)),
            });
        }
        let result = self.match_inner(target, value, policy);
        self.depth.leave();
        result
    }

    fn match_inner(
        &mut self,
        target: &GenericType,
        value: &GenericType,
        policy: MatchPolicy,
    ) -> Result<Option<GenericTypeMatch>, TypeError> {
        if target == value {
            return Ok(Some(GenericTypeMatch::exact()));
        }
        let covariant = policy.covariant;

        if !target.is_concrete() {
            let accepted = match policy.target_parameters {
                ParameterMatchBehavior::MatchAnything => true,
                ParameterMatchBehavior::MatchCautiously => {
                    if value.is_concrete() {
                        (covariant && value.is_nil()) || (!covariant && value.is_any())
                    } else {
                        target.type_parameter_name().is_some()
                            && target.type_parameter_name() == value.type_parameter_name()
                    }
                }
            };
            return Ok(accepted.then(GenericTypeMatch::non_concrete));
        }
        if !value.is_concrete() {
            let accepted = match policy.value_parameters {
                ParameterMatchBehavior::MatchAnything => true,
                ParameterMatchBehavior::MatchCautiously => {
                    (covariant && target.is_any()) || (!covariant && target.is_nil())
                }
            };
            return Ok(accepted.then(GenericTypeMatch::non_concrete));
        }

        let Some(raw) = self.raw_type_match(target, value, policy)? else {
            return Ok(None);
        };
        let (sup, sub) = if covariant { (target, value) } else { (value, target) };
        if sub.is_nil() || sup.is_any() {
            return Ok(Some(GenericTypeMatch::new(raw)));
        }
        if sup.type_arguments.is_empty() && sup.multiplicity_arguments.is_empty() {
            return Ok(Some(GenericTypeMatch::new(raw)));
        }
        let Some(sup_id) = sup.nominal_id() else {
            return Ok(Some(GenericTypeMatch::new(raw)));
        };

        // View the subtype as an instance of the supertype's class so the
        // argument lists line up.
        let Some(homogenized) = homogenize(self.graph, sub, sup_id)? else {
            return Ok(None);
        };
        let (target_view, value_view) = if covariant {
            (target, &homogenized)
        } else {
            (&homogenized, value)
        };
        if target_view.type_arguments.len() != value_view.type_arguments.len()
            || target_view.multiplicity_arguments.len() != value_view.multiplicity_arguments.len()
        {
            trace!(
                target = %self.graph.print(target_view),
                value = %self.graph.print(value_view),
                "argument count mismatch"
            );
            return Ok(None);
        }

        let parameters: Vec<TypeParameter> = self
            .graph
            .get(sup_id)
            .map(|data| data.type_parameters().to_vec())
            .unwrap_or_default();
        let mut type_arguments = Vec::with_capacity(target_view.type_arguments.len());
        for (i, (t, v)) in target_view
            .type_arguments
            .iter()
            .zip(&value_view.type_arguments)
            .enumerate()
        {
            let argument_policy = match parameters.get(i) {
                Some(p) if p.contravariant => policy.flipped(),
                _ => policy,
            };
            let Some(m) = self.generic_type_match(t, v, argument_policy)? else {
                return Ok(None);
            };
            type_arguments.push(m);
        }
        let mut multiplicity_arguments = Vec::with_capacity(target_view.multiplicity_arguments.len());
        for (t, v) in target_view
            .multiplicity_arguments
            .iter()
            .zip(&value_view.multiplicity_arguments)
        {
            let Some(m) = multiplicity_match(t, v, policy) else {
                return Ok(None);
            };
            multiplicity_arguments.push(m);
        }
        Ok(Some(GenericTypeMatch {
            raw,
            type_arguments,
            multiplicity_arguments,
        }))
    }
}

/// Match `value` against `target` under `policy`.
pub fn generic_type_match(
    graph: &TypeGraph,
    target: &GenericType,
    value: &GenericType,
    policy: MatchPolicy,
) -> Result<Option<GenericTypeMatch>, TypeError> {
    GenericMatcher::new(graph).generic_type_match(target, value, policy)
}

/// Boolean form of [`generic_type_match`].
pub fn matches(
    graph: &TypeGraph,
    target: &GenericType,
    value: &GenericType,
    covariant: bool,
    target_parameters: ParameterMatchBehavior,
    value_parameters: ParameterMatchBehavior,
) -> Result<bool, TypeError> {
    let policy = MatchPolicy::new(covariant, target_parameters, value_parameters);
    Ok(generic_type_match(graph, target, value, policy)?.is_some())
}

#[cfg(test)]
#[path = "../tests/generic_match_tests.rs"]
mod tests;
