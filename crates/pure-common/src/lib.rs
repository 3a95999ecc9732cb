//! Common types and utilities for the Pure type engine.
//!
//! This crate provides foundational types used across all pure crates:
//! - Shared names and package-path helpers (`Name`, `simple_name`, `package_of`)
//! - Source locations (`SourceUnitId`, `SourceSpan`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`)
//! - Engine limits and thresholds

// Names and `::`-separated package paths
pub mod name;
pub use name::{Name, package_of, simple_name};

// Span - Source unit identifiers and line/column ranges
pub mod span;
pub use span::{SourceRange, SourceSpan, SourceUnitId};

// Centralized limits and thresholds
pub mod limits;

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, format_message};
