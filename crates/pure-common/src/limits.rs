//! Centralized limits and thresholds for the Pure type engine.
//!
//! Recursion limits for type-level walks (linearization, matching,
//! substitution) live in `pure_solver::recursion::RecursionProfile`; the
//! constants here cover the expression-level engine and diagnostics.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth for expression inference.
///
/// Each nested call, lambda or property access adds a frame. Past this depth
/// the engine raises a recursion-limit error instead of overflowing the stack.
pub const MAX_EXPRESSION_DEPTH: u32 = 500;

/// Maximum depth of a generalization chain.
///
/// Real models rarely exceed a dozen levels; anything deeper than this is
/// treated as a runaway hierarchy.
pub const MAX_GENERALIZATION_DEPTH: u32 = 100;

/// Maximum depth of structural descent through generic type arguments.
pub const MAX_GENERIC_NESTING_DEPTH: u32 = 64;

// =============================================================================
// Operation Counts
// =============================================================================

/// Maximum number of passes over deferred lambdas in one call.
///
/// Each pass must make progress (process at least one lambda); this bound
/// only guards against a bug in the progress check.
pub const MAX_LAMBDA_PASSES: usize = 16;

// =============================================================================
// Diagnostics
// =============================================================================

/// Overload candidates are listed in "no match" errors only when the number
/// of functions sharing the name is below this bound.
pub const MAX_LISTED_CANDIDATES: usize = 20;
