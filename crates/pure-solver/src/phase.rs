//! Processing phases of a lambda body.
//!
//! A lambda moves through these phases as the engine visits it. The
//! transition function is pure; the engine stores the phase on the lambda
//! node and asks [`transition`] for the next one on every event. A lambda
//! whose parameter types are unknown when first visited waits in
//! [`InferencePhase::Deferred`] until the enclosing call supplies them.

use crate::diagnostics::TypeError;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InferencePhase {
    #[default]
    Unvisited,
    ParametersRegistered,
    BodyProcessing,
    ReturnTypeDerivation,
    Validated,
    Done,
    Deferred,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    /// Every parameter has a type.
    ParametersBound,
    /// Some parameter type is still unknown.
    ParametersMissing,
    /// The enclosing call supplied the expected function type.
    ContextSupplied,
    BodyStarted,
    BodyTyped,
    ReturnDerived,
    Finished,
}

impl InferencePhase {
    pub fn is_done(self) -> bool {
        self == InferencePhase::Done
    }

    pub fn is_deferred(self) -> bool {
        self == InferencePhase::Deferred
    }
}

/// Next phase, or `None` when `event` is not valid in `phase`.
pub fn transition(phase: InferencePhase, event: PhaseEvent) -> Option<InferencePhase> {
    use InferencePhase::*;
    use PhaseEvent::*;
    let next = match (phase, event) {
        (Unvisited, ParametersBound) => ParametersRegistered,
        (Unvisited, ParametersMissing) => Deferred,
        (Unvisited | Deferred, ContextSupplied) => ParametersRegistered,
        (Deferred, ParametersMissing) => Deferred,
        (ParametersRegistered, BodyStarted) => BodyProcessing,
        (BodyProcessing, BodyTyped) => ReturnTypeDerivation,
        (ReturnTypeDerivation, ReturnDerived) => Validated,
        (Validated, Finished) => Done,
        // Revisiting a finished lambda changes nothing.
        (Done, ParametersBound | ContextSupplied) => Done,
        _ => return None,
    };
    Some(next)
}

/// [`transition`] as a `Result`.
pub fn advance(phase: InferencePhase, event: PhaseEvent) -> Result<InferencePhase, TypeError> {
    transition(phase, event).ok_or_else(|| TypeError::InvalidInferenceState {
        state: phase.to_string(),
        event: event.to_string(),
    })
}

impl fmt::Display for InferencePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for PhaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
#[path = "../tests/phase_tests.rs"]
mod tests;
