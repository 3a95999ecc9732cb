//! Type parameter inference for a single call.
//!
//! Each type and multiplicity parameter of the callee gets an inference
//! variable in an `ena` unification table. Argument types are registered
//! against the callee's parameter templates; every occurrence of a parameter
//! in a template contributes a binding, and repeated bindings are merged
//! with the best common type (covariant positions widen, contravariant
//! positions narrow).
//!
//! Type parameters that appear in argument types belong to the caller (an
//! enclosing generic function) and are bound as opaque types. Parameters
//! are found by name, so the callee's must be renamed apart from the
//! caller's before they are registered here.

use crate::common_type::best_common_generic_type;
use crate::diagnostics::TypeError;
use crate::graph::TypeGraph;
use crate::inheritance::homogenize;
use crate::instantiate::TypeSubstitution;
use crate::multiplicity::Multiplicity;
use crate::types::{GenericType, RawType, ValueType};
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use pure_common::Name;
use tracing::trace;

/// An inference variable standing for a callee type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

/// Current binding of an [`InferenceVar`]. Callers merge before storing, so
/// the incoming value always wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferenceValue(pub Option<GenericType>);

impl UnifyKey for InferenceVar {
    type Value = InferenceValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceVar(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

impl UnifyValue for InferenceValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        match (&a.0, &b.0) {
            (_, Some(t)) | (Some(t), None) => Ok(InferenceValue(Some(t.clone()))),
            (None, None) => Ok(InferenceValue(None)),
        }
    }
}

/// An inference variable standing for a callee multiplicity parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MultiplicityVar(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiplicityValue(pub Option<Multiplicity>);

impl UnifyKey for MultiplicityVar {
    type Value = MultiplicityValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        MultiplicityVar(u)
    }

    fn tag() -> &'static str {
        "MultiplicityVar"
    }
}

impl UnifyValue for MultiplicityValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        match (&a.0, &b.0) {
            (_, Some(m)) | (Some(m), None) => Ok(MultiplicityValue(Some(m.clone()))),
            (None, None) => Ok(MultiplicityValue(None)),
        }
    }
}

/// Inference state for one candidate of one call.
pub struct InferenceContext<'g> {
    graph: &'g TypeGraph,
    types: InPlaceUnificationTable<InferenceVar>,
    multiplicities: InPlaceUnificationTable<MultiplicityVar>,
    type_params: Vec<(Name, InferenceVar)>,
    multiplicity_params: Vec<(Name, MultiplicityVar)>,
}

impl<'g> InferenceContext<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        InferenceContext {
            graph,
            types: InPlaceUnificationTable::new(),
            multiplicities: InPlaceUnificationTable::new(),
            type_params: Vec::new(),
            multiplicity_params: Vec::new(),
        }
    }

    pub fn fresh_type_param(&mut self, name: Name) -> InferenceVar {
        let var = self.types.new_key(InferenceValue(None));
        self.type_params.push((name, var));
        var
    }

    pub fn fresh_multiplicity_param(&mut self, name: Name) -> MultiplicityVar {
        let var = self.multiplicities.new_key(MultiplicityValue(None));
        self.multiplicity_params.push((name, var));
        var
    }

    pub fn find_type_param(&self, name: &str) -> Option<InferenceVar> {
        self.type_params
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| *v)
    }

    pub fn find_multiplicity_param(&self, name: &str) -> Option<MultiplicityVar> {
        self.multiplicity_params
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| *v)
    }

    /// Make two callee parameters share one binding.
    pub fn unify(&mut self, a: InferenceVar, b: InferenceVar) {
        self.types.union(a, b);
    }

    pub fn probe(&mut self, var: InferenceVar) -> Option<GenericType> {
        self.types.probe_value(var).0
    }

    pub fn probe_multiplicity(&mut self, var: MultiplicityVar) -> Option<Multiplicity> {
        self.multiplicities.probe_value(var).0
    }

    /// Merge `generic_type` into the binding of `var`.
    pub fn bind(&mut self, var: InferenceVar, generic_type: GenericType, covariant: bool) -> Result<(), TypeError> {
        let merged = match self.probe(var) {
            None => generic_type,
            Some(existing) if existing == generic_type => return Ok(()),
            Some(existing) => best_common_generic_type(self.graph, &[existing, generic_type], covariant)?,
        };
        trace!(var = var.0, bound = %self.graph.print(&merged), covariant, "bind type parameter");
        self.types.union_value(var, InferenceValue(Some(merged)));
        Ok(())
    }

    /// Merge `multiplicity` into the binding of `var`: covariant positions
    /// widen, contravariant positions narrow.
    pub fn bind_multiplicity(&mut self, var: MultiplicityVar, multiplicity: Multiplicity, covariant: bool) {
        let merged = match self.probe_multiplicity(var) {
            None => multiplicity,
            Some(existing) if covariant => Multiplicity::min_subsuming([&existing, &multiplicity]),
            Some(existing) => existing.intersect(&multiplicity).unwrap_or(existing),
        };
        self.multiplicities.union_value(var, MultiplicityValue(Some(merged)));
    }

    /// Register `value` against `template`, binding every callee parameter
    /// that occurs in the template.
    pub fn register(&mut self, template: &GenericType, value: &GenericType, covariant: bool) -> Result<(), TypeError> {
        match (&template.raw, &value.raw) {
            (RawType::Parameter(name), _) => {
                // Parameters in `value` belong to the caller and are bound
                // like any other type.
                let Some(var) = self.find_type_param(name) else {
                    return Ok(());
                };
                self.bind(var, value.clone(), covariant)?;
            }
            (RawType::Function(t), RawType::Function(v)) => {
                for (tp, vp) in t.parameters.iter().zip(&v.parameters) {
                    self.register(&tp.generic_type, &vp.generic_type, !covariant)?;
                    self.register_multiplicity(&tp.multiplicity, &vp.multiplicity, !covariant);
                }
                self.register(&t.return_type, &v.return_type, covariant)?;
                self.register_multiplicity(&t.return_multiplicity, &v.return_multiplicity, covariant);
            }
            (RawType::Relation(t), RawType::Relation(v)) => {
                for column in t.columns() {
                    if let Some(actual) = v.column(&column.name) {
                        self.register(&column.generic_type, &actual.generic_type, covariant)?;
                    }
                }
            }
            (RawType::Operation(op), RawType::Relation(_)) => {
                // `T-Z` against a known relation: the left operand is at least
                // that relation.
                self.register(&op.left, value, covariant)?;
            }
            (RawType::Nominal(template_id), RawType::Nominal(_)) => {
                if template.type_arguments.is_empty() && template.multiplicity_arguments.is_empty() {
                    return Ok(());
                }
                let view = if covariant {
                    homogenize(self.graph, value, *template_id)?
                } else {
                    Some(value.clone())
                };
                let Some(view) = view else {
                    return Ok(());
                };
                let parameters = self
                    .graph
                    .get(*template_id)
                    .map(|data| data.type_parameters().to_vec())
                    .unwrap_or_default();
                for (i, (t, v)) in template.type_arguments.iter().zip(&view.type_arguments).enumerate() {
                    let flip = parameters.get(i).is_some_and(|p| p.contravariant);
                    self.register(t, v, covariant != flip)?;
                }
                for (t, v) in template
                    .multiplicity_arguments
                    .iter()
                    .zip(&view.multiplicity_arguments)
                {
                    self.register_multiplicity(t, v, covariant);
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn register_multiplicity(&mut self, template: &Multiplicity, value: &Multiplicity, covariant: bool) {
        let Some(name) = template.parameter_name() else {
            return;
        };
        let Some(var) = self.find_multiplicity_param(name) else {
            return;
        };
        self.bind_multiplicity(var, value.clone(), covariant);
    }

    /// Register an argument's value type against a parameter slot.
    pub fn register_value(&mut self, template: &ValueType, value: &ValueType) -> Result<(), TypeError> {
        self.register(&template.generic_type, &value.generic_type, true)?;
        self.register_multiplicity(&template.multiplicity, &value.multiplicity, true);
        Ok(())
    }

    pub fn is_resolved(&mut self, name: &str) -> bool {
        match self.find_type_param(name) {
            Some(var) => self.probe(var).is_some(),
            None => self
                .find_multiplicity_param(name)
                .is_some_and(|var| self.probe_multiplicity(var).is_some()),
        }
    }

    /// Bindings found so far. Unresolved parameters are left out.
    pub fn substitution(&mut self) -> TypeSubstitution {
        let mut substitution = TypeSubstitution::new();
        for (name, var) in self.type_params.clone() {
            if let Some(bound) = self.probe(var) {
                substitution.bind_type(name, bound);
            }
        }
        for (name, var) in self.multiplicity_params.clone() {
            if let Some(bound) = self.probe_multiplicity(var) {
                substitution.bind_multiplicity(name, bound);
            }
        }
        substitution
    }

    pub fn unresolved_type_params(&mut self) -> Vec<Name> {
        let mut unresolved = Vec::new();
        for (name, var) in self.type_params.clone() {
            if self.probe(var).is_none() {
                unresolved.push(name);
            }
        }
        unresolved
    }

    pub fn unresolved_multiplicity_params(&mut self) -> Vec<Name> {
        let mut unresolved = Vec::new();
        for (name, var) in self.multiplicity_params.clone() {
            if self.probe_multiplicity(var).is_none() {
                unresolved.push(name);
            }
        }
        unresolved
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
