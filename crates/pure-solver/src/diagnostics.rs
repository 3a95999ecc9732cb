//! Engine errors.
//!
//! [`TypeError`] is what the type algebra and inference layers raise. The
//! engine attaches a source location to produce a [`CompileError`], which
//! renders in the canonical Pure form:
//!
//! ```text
//! Compilation error at (resource:model.pure line:3 column:5), "MESSAGE"
//! ```

use pure_common::{Diagnostic, Name, SourceSpan};
use std::fmt;

/// Error codes, stable per kind.
pub mod codes {
    pub const TYPE_ARGUMENT_MISMATCH: u32 = 1001;
    pub const MULTIPLICITY_ARGUMENT_MISMATCH: u32 = 1002;
    pub const CYCLIC_GENERALIZATION: u32 = 1003;
    pub const INCONSISTENT_GENERALIZATION: u32 = 1004;
    pub const DIAMOND_INHERITANCE: u32 = 1005;
    pub const UNRESOLVED_TYPE_ARGUMENT: u32 = 1006;
    pub const UNKNOWN_COLUMN: u32 = 1007;
    pub const DUPLICATE_COLUMN: u32 = 1008;
    pub const UNRESOLVABLE_TYPE_PARAMETER: u32 = 1009;
    pub const UNRESOLVED_MULTIPLICITY_PARAMETER: u32 = 1010;
    pub const NO_MATCHING_OVERLOAD: u32 = 1011;
    pub const CANNOT_INFER_LAMBDA_PARAMETERS: u32 = 1012;
    pub const UNKNOWN_TYPE: u32 = 1013;
    pub const UNKNOWN_VARIABLE: u32 = 1014;
    pub const PROPERTY_NOT_FOUND: u32 = 1015;
    pub const INCOMPATIBLE_TYPES: u32 = 1016;
    pub const TYPE_MISMATCH: u32 = 1017;
    pub const RETURN_TYPE_MISMATCH: u32 = 1018;
    pub const RETURN_MULTIPLICITY_MISMATCH: u32 = 1019;
    pub const DUPLICATE_DEFINITION: u32 = 1020;
    pub const PARSE: u32 = 1021;
    pub const RECURSION_LIMIT: u32 = 1022;
    pub const INVALID_INFERENCE_STATE: u32 = 1023;
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("Type argument mismatch for {expected}; got: {actual}")]
    TypeArgumentMismatch { expected: String, actual: String },

    #[error("Multiplicity argument mismatch for {expected}; got: {actual}")]
    MultiplicityArgumentMismatch { expected: String, actual: String },

    #[error("Class {path} extends itself: {}", .chain.join(" -> "))]
    CyclicGeneralization { path: String, chain: Vec<String> },

    #[error("Inconsistent generalization hierarchy for {path}: no consistent linearization of {}", .supertypes.join(", "))]
    InconsistentGeneralization { path: String, supertypes: Vec<String> },

    #[error("Diamond inheritance error! {ancestor} is reached as both {first} and {second} from {path}")]
    DiamondInheritance {
        path: String,
        ancestor: String,
        first: String,
        second: String,
    },

    #[error("Can't resolve type parameters of {ancestor} from {subtype}: the type arguments of {subtype} are not concrete")]
    UnresolvedTypeArgument { subtype: String, ancestor: String },

    #[error("The system can't find the column {column} in the Relation {relation}")]
    UnknownColumn { column: String, relation: String },

    #[error("The relation contains duplicates: [{}]", .columns.join(", "))]
    DuplicateColumn { columns: Vec<String> },

    #[error("The type parameter {parameter} was not resolved ({function} / {signature})!")]
    UnresolvableTypeParameter {
        parameter: String,
        function: String,
        signature: String,
    },

    #[error("The multiplicity parameter {parameter} was not resolved!")]
    UnresolvedMultiplicityParameter { parameter: String },

    #[error("{0}")]
    NoMatchingOverload(Box<NoMatchingOverload>),

    #[error("Can't infer the parameters' types for the lambda. Please specify it in the signature.")]
    CannotInferLambdaParameters,

    #[error("{path} has not been defined!")]
    UnknownType { path: String },

    #[error("The variable '{name}' is unknown!")]
    UnknownVariable { name: String },

    #[error("Can't find the property '{property}' in the class {class}")]
    PropertyNotFound { property: String, class: String },

    #[error("Incompatible types {left} && {right}")]
    IncompatibleTypes { left: String, right: String },

    #[error("Type Error: {found} not a subtype of {expected}")]
    TypeMismatch { found: String, expected: String },

    #[error("Return type error in function '{function}'; found: {found}; expected: {expected}")]
    ReturnTypeMismatch {
        function: String,
        found: String,
        expected: String,
    },

    #[error("Return multiplicity error in function '{function}'; found: {found}; expected: {expected}")]
    ReturnMultiplicityMismatch {
        function: String,
        found: String,
        expected: String,
    },

    #[error("{path} has already been defined!")]
    DuplicateDefinition { path: String },

    #[error("Parse error at offset {offset} in '{text}': {message}")]
    Parse {
        text: String,
        offset: usize,
        message: String,
    },

    #[error("Recursion limit reached while {context}")]
    RecursionLimit { context: String },

    #[error("Invalid inference state: can't apply {event} in state {state}")]
    InvalidInferenceState { state: String, event: String },
}

impl TypeError {
    pub fn code(&self) -> u32 {
        match self {
            TypeError::TypeArgumentMismatch { .. } => codes::TYPE_ARGUMENT_MISMATCH,
            TypeError::MultiplicityArgumentMismatch { .. } => codes::MULTIPLICITY_ARGUMENT_MISMATCH,
            TypeError::CyclicGeneralization { .. } => codes::CYCLIC_GENERALIZATION,
            TypeError::InconsistentGeneralization { .. } => codes::INCONSISTENT_GENERALIZATION,
            TypeError::DiamondInheritance { .. } => codes::DIAMOND_INHERITANCE,
            TypeError::UnresolvedTypeArgument { .. } => codes::UNRESOLVED_TYPE_ARGUMENT,
            TypeError::UnknownColumn { .. } => codes::UNKNOWN_COLUMN,
            TypeError::DuplicateColumn { .. } => codes::DUPLICATE_COLUMN,
            TypeError::UnresolvableTypeParameter { .. } => codes::UNRESOLVABLE_TYPE_PARAMETER,
            TypeError::UnresolvedMultiplicityParameter { .. } => {
                codes::UNRESOLVED_MULTIPLICITY_PARAMETER
            }
            TypeError::NoMatchingOverload(_) => codes::NO_MATCHING_OVERLOAD,
            TypeError::CannotInferLambdaParameters => codes::CANNOT_INFER_LAMBDA_PARAMETERS,
            TypeError::UnknownType { .. } => codes::UNKNOWN_TYPE,
            TypeError::UnknownVariable { .. } => codes::UNKNOWN_VARIABLE,
            TypeError::PropertyNotFound { .. } => codes::PROPERTY_NOT_FOUND,
            TypeError::IncompatibleTypes { .. } => codes::INCOMPATIBLE_TYPES,
            TypeError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            TypeError::ReturnTypeMismatch { .. } => codes::RETURN_TYPE_MISMATCH,
            TypeError::ReturnMultiplicityMismatch { .. } => codes::RETURN_MULTIPLICITY_MISMATCH,
            TypeError::DuplicateDefinition { .. } => codes::DUPLICATE_DEFINITION,
            TypeError::Parse { .. } => codes::PARSE,
            TypeError::RecursionLimit { .. } => codes::RECURSION_LIMIT,
            TypeError::InvalidInferenceState { .. } => codes::INVALID_INFERENCE_STATE,
        }
    }
}

// =============================================================================
// No matching overload
// =============================================================================

/// Payload of a "no match" error: the call as written plus the candidates
/// that share its name, split by whether their package is imported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoMatchingOverload {
    /// `plus(_:Any[2])`
    pub call: String,
    pub imported: Vec<String>,
    pub not_imported: Vec<String>,
    /// False when the candidate listing is suppressed (no candidates, or
    /// too many to list).
    pub listed: bool,
}

impl fmt::Display for NoMatchingOverload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The system can't find a match for the function: {}", self.call)?;
        if !self.listed {
            return Ok(());
        }
        f.write_str("\n\n")?;
        if self.imported.is_empty() {
            f.write_str("No functions, in packages already imported, match the function name.\n")?;
        } else {
            f.write_str(
                "These functions, in packages already imported, would match the function call if you changed the parameters.\n",
            )?;
            for candidate in &self.imported {
                writeln!(f, "\t{candidate}")?;
            }
        }
        f.write_str("\n")?;
        if self.not_imported.is_empty() {
            f.write_str("No functions, in packages not imported, match the function name.\n")?;
        } else {
            f.write_str(
                "These functions, in packages not imported, match the function name. Add an import for one of these packages to use them:\n",
            )?;
            for candidate in &self.not_imported {
                writeln!(f, "\t{candidate}")?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// CompileError
// =============================================================================

/// A [`TypeError`] located in a source unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Compilation error at (resource:{source_name} {}), \"{error}\"", .span.range)]
pub struct CompileError {
    pub source_name: Name,
    pub span: SourceSpan,
    pub error: TypeError,
}

impl CompileError {
    pub fn new(source_name: Name, span: SourceSpan, error: TypeError) -> Self {
        Self {
            source_name,
            span,
            error,
        }
    }

    pub fn code(&self) -> u32 {
        self.error.code()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(
            self.source_name.to_string(),
            self.span.range,
            self.message(),
            self.code(),
        )
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(error: &CompileError) -> Self {
        error.to_diagnostic()
    }
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
