//! Source locations.
//!
//! Diagnostics in Pure are reported as `(resource line:column)` pairs, so
//! spans are line/column ranges rather than byte offsets. Lines and columns
//! are 1-based.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a source unit (one `.pure` file) inside a program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceUnitId(pub u32);

impl SourceUnitId {
    /// Owner of built-in types and native functions.
    pub const BUILTIN: Self = Self(0);

    /// First id handed out to user source units.
    pub const FIRST_USER: u32 = 1;

    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

/// A line/column range inside one source unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceRange {
    pub const fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// A zero-width range at a single position.
    pub const fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    /// True when no position was recorded (synthesized nodes).
    pub const fn is_unknown(&self) -> bool {
        self.start_line == 0
    }

    /// Smallest range covering both `self` and `other`.
    pub fn cover(&self, other: &SourceRange) -> SourceRange {
        if self.is_unknown() {
            return *other;
        }
        if other.is_unknown() {
            return *self;
        }
        let (start_line, start_column) =
            (self.start_line, self.start_column).min((other.start_line, other.start_column));
        let (end_line, end_column) =
            (self.end_line, self.end_column).max((other.end_line, other.end_column));
        SourceRange::new(start_line, start_column, end_line, end_column)
    }
}

/// A range tagged with the source unit it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub unit: SourceUnitId,
    pub range: SourceRange,
}

impl SourceSpan {
    pub const fn new(unit: SourceUnitId, range: SourceRange) -> Self {
        Self { unit, range }
    }

    /// Span for nodes with no source position.
    pub const fn unknown(unit: SourceUnitId) -> Self {
        Self {
            unit,
            range: SourceRange::new(0, 0, 0, 0),
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line:{} column:{}", self.start_line, self.start_column)
    }
}

#[cfg(test)]
#[path = "../tests/span_tests.rs"]
mod tests;
