//! Raw type matching with distances.
//!
//! Compares the raw types of two concrete generic types, ignoring their
//! arguments. The result ranks how close the value is to the target:
//!
//! `Exact < NonConcrete < Simple(distance) < Function(slots) < Bottom`
//!
//! where `distance` is the position of the supertype in the subtype's
//! linearization.

use crate::diagnostics::TypeError;
use crate::generalization::generalization_distance;
use crate::generic_match::{GenericMatcher, GenericTypeMatch, MatchPolicy};
use crate::multiplicity_match::{MultiplicityMatch, multiplicity_match};
use crate::relation;
use crate::types::{FunctionType, GenericType, RawType};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeMatch {
    Exact,
    NonConcrete,
    Simple(u32),
    Function(Box<FunctionTypeMatch>),
    /// `Nil` matched as the subtype.
    Bottom,
}

/// Slot-wise match of two function types.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FunctionTypeMatch {
    pub parameter_types: Vec<GenericTypeMatch>,
    pub parameter_multiplicities: Vec<MultiplicityMatch>,
    pub return_type: GenericTypeMatch,
    pub return_multiplicity: MultiplicityMatch,
}

impl TypeMatch {
    fn rank(&self) -> u8 {
        match self {
            TypeMatch::Exact => 0,
            TypeMatch::NonConcrete => 1,
            TypeMatch::Simple(_) => 2,
            TypeMatch::Function(_) => 3,
            TypeMatch::Bottom => 4,
        }
    }
}

impl Ord for TypeMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TypeMatch::Simple(a), TypeMatch::Simple(b)) => a.cmp(b),
            (TypeMatch::Function(a), TypeMatch::Function(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for TypeMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl GenericMatcher<'_> {
    /// Match the raw types of two concrete generic types.
    pub(crate) fn raw_type_match(
        &mut self,
        target: &GenericType,
        value: &GenericType,
        policy: MatchPolicy,
    ) -> Result<Option<TypeMatch>, TypeError> {
        let graph = self.graph();
        let (sup, sub) = if policy.covariant {
            (target, value)
        } else {
            (value, target)
        };
        if sub.is_nil() {
            return Ok(Some(TypeMatch::Bottom));
        }
        match (&sup.raw, &sub.raw) {
            (RawType::Function(_), RawType::Function(_)) => {
                let (Some(target_fn), Some(value_fn)) =
                    (target.as_function_type(), value.as_function_type())
                else {
                    return Ok(None);
                };
                Ok(self
                    .function_type_match(target_fn, value_fn, policy)?
                    .map(|m| TypeMatch::Function(Box::new(m))))
            }
            // The subtype may carry extra columns.
            (RawType::Relation(sup_rel), RawType::Relation(sub_rel)) => {
                if relation::relation_types_equal(sup_rel, sub_rel) {
                    Ok(Some(TypeMatch::Exact))
                } else if relation::is_compatible_with(graph, sub_rel, sup_rel)? {
                    let extra = sub_rel.len().saturating_sub(sup_rel.len()) as u32;
                    Ok(Some(TypeMatch::Simple(1 + extra)))
                } else {
                    Ok(None)
                }
            }
            (RawType::Nominal(_), RawType::Function(_) | RawType::Relation(_)) => {
                Ok(sup.is_any().then_some(TypeMatch::Simple(1)))
            }
            (RawType::Nominal(sup_id), RawType::Nominal(sub_id)) => {
                Ok(match generalization_distance(graph, *sub_id, *sup_id)? {
                    Some(0) => Some(TypeMatch::Exact),
                    Some(distance) => Some(TypeMatch::Simple(distance)),
                    None => None,
                })
            }
            _ => Ok(None),
        }
    }

    /// Parameters contravariantly, return covariantly; counts must agree.
    fn function_type_match(
        &mut self,
        target: &FunctionType,
        value: &FunctionType,
        policy: MatchPolicy,
    ) -> Result<Option<FunctionTypeMatch>, TypeError> {
        if target.parameters.len() != value.parameters.len() {
            return Ok(None);
        }
        let flipped = policy.flipped();
        let mut parameter_types = Vec::with_capacity(target.parameters.len());
        let mut parameter_multiplicities = Vec::with_capacity(target.parameters.len());
        for (t, v) in target.parameters.iter().zip(&value.parameters) {
            let Some(type_match) = self.generic_type_match(&t.generic_type, &v.generic_type, flipped)? else {
                return Ok(None);
            };
            let Some(mult_match) = multiplicity_match(&t.multiplicity, &v.multiplicity, flipped) else {
                return Ok(None);
            };
            parameter_types.push(type_match);
            parameter_multiplicities.push(mult_match);
        }
        let Some(return_type) = self.generic_type_match(&target.return_type, &value.return_type, policy)? else {
            return Ok(None);
        };
        let Some(return_multiplicity) =
            multiplicity_match(&target.return_multiplicity, &value.return_multiplicity, policy)
        else {
            return Ok(None);
        };
        Ok(Some(FunctionTypeMatch {
            parameter_types,
            parameter_multiplicities,
            return_type,
            return_multiplicity,
        }))
    }
}

#[cfg(test)]
#[path = "../tests/type_match_tests.rs"]
mod tests;
