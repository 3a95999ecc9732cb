//! Multiplicities: `[1]`, `[0..1]`, `[*]`, `[1..*]`, `[m]`.

use pure_common::Name;
use std::fmt;
use std::str::FromStr;

/// Cardinality of a value.
///
/// `upper == None` means unbounded (`*`). A `Parameter` is a multiplicity
/// variable declared by a class or function (`Class A<|m>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    Concrete { lower: u32, upper: Option<u32> },
    Parameter(Name),
}

impl Multiplicity {
    pub const ZERO: Self = Self::exactly(0);
    pub const ONE: Self = Self::exactly(1);
    pub const ZERO_ONE: Self = Self::range(0, Some(1));
    pub const ZERO_MANY: Self = Self::range(0, None);
    pub const ONE_MANY: Self = Self::range(1, None);

    pub const fn exactly(n: u32) -> Self {
        Self::Concrete {
            lower: n,
            upper: Some(n),
        }
    }

    pub const fn range(lower: u32, upper: Option<u32>) -> Self {
        Self::Concrete { lower, upper }
    }

    pub fn parameter(name: impl Into<Name>) -> Self {
        Self::Parameter(name.into())
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Self::Concrete { .. })
    }

    pub fn parameter_name(&self) -> Option<&Name> {
        match self {
            Self::Parameter(name) => Some(name),
            Self::Concrete { .. } => None,
        }
    }

    /// `(lower, upper)` for concrete multiplicities.
    pub fn bounds(&self) -> Option<(u32, Option<u32>)> {
        match *self {
            Self::Concrete { lower, upper } => Some((lower, upper)),
            Self::Parameter(_) => None,
        }
    }

    pub fn is_to_one(&self) -> bool {
        matches!(self, Self::Concrete { upper: Some(1), .. })
    }

    pub fn is_to_many(&self) -> bool {
        match self {
            Self::Concrete { upper, .. } => upper.is_none_or(|u| u > 1),
            Self::Parameter(_) => false,
        }
    }

    pub fn is_zero_many(&self) -> bool {
        *self == Self::ZERO_MANY
    }

    /// True when every cardinality allowed by `other` is allowed by `self`.
    /// Parameters only subsume themselves.
    pub fn subsumes(&self, other: &Multiplicity) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some((lower, upper)), Some((other_lower, other_upper))) => {
                lower <= other_lower
                    && match (upper, other_upper) {
                        (None, _) => true,
                        (Some(_), None) => false,
                        (Some(u), Some(other_u)) => other_u <= u,
                    }
            }
            (None, None) => self == other,
            _ => false,
        }
    }

    /// Cardinalities allowed by both, or `None` if the ranges are disjoint or
    /// either side is a parameter.
    pub fn intersect(&self, other: &Multiplicity) -> Option<Multiplicity> {
        let (lower, upper) = self.bounds()?;
        let (other_lower, other_upper) = other.bounds()?;
        let lower = lower.max(other_lower);
        let upper = match (upper, other_upper) {
            (None, u) | (u, None) => u,
            (Some(a), Some(b)) => Some(a.min(b)),
        };
        if upper.is_some_and(|u| u < lower) {
            return None;
        }
        Some(Self::range(lower, upper))
    }

    /// Smallest multiplicity subsuming all inputs. Any non-concrete input
    /// gives `[*]`; an empty input gives `[0]`.
    pub fn min_subsuming<'a>(multiplicities: impl IntoIterator<Item = &'a Multiplicity>) -> Multiplicity {
        let mut result: Option<(u32, Option<u32>)> = None;
        for m in multiplicities {
            let Some((lower, upper)) = m.bounds() else {
                return Self::ZERO_MANY;
            };
            result = Some(match result {
                None => (lower, upper),
                Some((acc_lower, acc_upper)) => (
                    acc_lower.min(lower),
                    match (acc_upper, upper) {
                        (Some(a), Some(b)) => Some(a.max(b)),
                        _ => None,
                    },
                ),
            });
        }
        result.map_or(Self::ZERO, |(lower, upper)| Self::range(lower, upper))
    }

    /// Multiplicity of a collection literal whose elements have the given
    /// multiplicities.
    pub fn sum<'a>(multiplicities: impl IntoIterator<Item = &'a Multiplicity>) -> Multiplicity {
        let mut lower: u32 = 0;
        let mut upper: Option<u32> = Some(0);
        for m in multiplicities {
            let Some((l, u)) = m.bounds() else {
                return Self::ZERO_MANY;
            };
            lower = lower.saturating_add(l);
            upper = match (upper, u) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                _ => None,
            };
        }
        Self::range(lower, upper)
    }

    /// `[1]`, `[0..*]`, `[m]`
    pub fn print_bracketed(&self) -> String {
        format!("[{self}]")
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(name) => f.write_str(name),
            Self::Concrete { lower, upper } => match upper {
                Some(u) if u == lower => write!(f, "{lower}"),
                Some(u) => write!(f, "{lower}..{u}"),
                None if *lower == 0 => f.write_str("*"),
                None => write!(f, "{lower}..*"),
            },
        }
    }
}

/// Error for malformed multiplicity text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid multiplicity '{text}'")]
pub struct ParseMultiplicityError {
    pub text: String,
}

impl FromStr for Multiplicity {
    type Err = ParseMultiplicityError;

    /// Accepts `1`, `0..1`, `*`, `1..*`, `m`, optionally wrapped in brackets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseMultiplicityError {
            text: s.to_string(),
        };
        let trimmed = s.trim();
        let body = match trimmed.strip_prefix('[') {
            Some(rest) => rest.strip_suffix(']').ok_or_else(error)?.trim(),
            None => trimmed,
        };
        if body.is_empty() {
            return Err(error());
        }
        if body == "*" {
            return Ok(Self::ZERO_MANY);
        }
        let parse_bound = |text: &str| text.trim().parse::<u32>().map_err(|_| error());
        if let Some((lower, upper)) = body.split_once("..") {
            let lower = parse_bound(lower)?;
            let upper = match upper.trim() {
                "*" => None,
                text => Some(parse_bound(text)?),
            };
            if upper.is_some_and(|u| u < lower) {
                return Err(error());
            }
            return Ok(Self::range(lower, upper));
        }
        if body.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self::exactly(parse_bound(body)?));
        }
        let is_identifier = body
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && body.chars().all(|c| c.is_alphanumeric() || c == '_');
        if is_identifier {
            Ok(Self::parameter(body))
        } else {
            Err(error())
        }
    }
}

#[cfg(test)]
#[path = "../tests/multiplicity_tests.rs"]
mod tests;
