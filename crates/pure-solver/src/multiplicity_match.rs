//! Multiplicity matching by interval containment.
//!
//! In covariant mode the target range must contain the value range. The
//! match records how far each bound is from an exact fit so overloads can
//! be ranked: `[1]` against `[0..1]` is a closer fit than `[1]` against `[*]`.

use crate::generic_match::{MatchPolicy, ParameterMatchBehavior};
use crate::multiplicity::Multiplicity;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiplicityMatch {
    Exact,
    NonConcrete,
    Simple { lower_distance: u32, upper_distance: u32 },
}

impl MultiplicityMatch {
    fn rank(&self) -> (u8, u32, u32) {
        match *self {
            Self::Exact => (0, 0, 0),
            Self::NonConcrete => (1, 0, 0),
            // Upper bound distance dominates.
            Self::Simple {
                lower_distance,
                upper_distance,
            } => (2, upper_distance, lower_distance),
        }
    }
}

impl Ord for MultiplicityMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for MultiplicityMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Match `value` against `target`; `None` when they don't fit.
pub fn multiplicity_match(
    target: &Multiplicity,
    value: &Multiplicity,
    policy: MatchPolicy,
) -> Option<MultiplicityMatch> {
    if target == value {
        return Some(MultiplicityMatch::Exact);
    }
    let covariant = policy.covariant;
    match (target.bounds(), value.bounds()) {
        (None, _) => match policy.target_parameters {
            ParameterMatchBehavior::MatchAnything => Some(MultiplicityMatch::NonConcrete),
            // A parameter target only accepts a range it would bind to
            // anyway: the full range, seen contravariantly.
            ParameterMatchBehavior::MatchCautiously => {
                (!covariant && value.is_zero_many()).then_some(MultiplicityMatch::NonConcrete)
            }
        },
        (Some(_), None) => match policy.value_parameters {
            ParameterMatchBehavior::MatchAnything => Some(MultiplicityMatch::NonConcrete),
            ParameterMatchBehavior::MatchCautiously => {
                (covariant && target.is_zero_many()).then_some(MultiplicityMatch::Simple {
                    lower_distance: u32::MAX,
                    upper_distance: u32::MAX,
                })
            }
        },
        (Some(target_bounds), Some(value_bounds)) => {
            let ((large_lower, large_upper), (small_lower, small_upper)) = if covariant {
                (target_bounds, value_bounds)
            } else {
                (value_bounds, target_bounds)
            };
            let lower_distance = small_lower.checked_sub(large_lower)?;
            let upper_distance = match (large_upper, small_upper) {
                (None, None) => 0,
                (None, Some(_)) => u32::MAX,
                (Some(_), None) => return None,
                (Some(large), Some(small)) => large.checked_sub(small)?,
            };
            Some(MultiplicityMatch::Simple {
                lower_distance,
                upper_distance,
            })
        }
    }
}

/// Boolean form with cautious parameter handling on both sides.
pub fn multiplicity_matches(target: &Multiplicity, value: &Multiplicity, covariant: bool) -> bool {
    let policy = MatchPolicy::new(
        covariant,
        ParameterMatchBehavior::MatchCautiously,
        ParameterMatchBehavior::MatchCautiously,
    );
    multiplicity_match(target, value, policy).is_some()
}

#[cfg(test)]
#[path = "../tests/multiplicity_match_tests.rs"]
mod tests;
