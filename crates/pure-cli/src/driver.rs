//! Load models, compile them as one program, collect the results.

use anyhow::{Context, Result};
use pure_common::Diagnostic;
use pure_solver::{CompileError, Program, SourceUnit};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::model::load_model;

/// The inferred return type of one compiled function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypedFunction {
    pub path: String,
    pub returns: String,
}

#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub diagnostics: Vec<Diagnostic>,
    /// Sorted by path.
    pub functions: Vec<TypedFunction>,
}

impl CheckOutcome {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub fn check_models(paths: &[PathBuf]) -> Result<CheckOutcome> {
    let mut units = Vec::new();
    for path in paths {
        units.extend(load_model(path)?);
    }
    check_units(units)
}

/// Compile `units` together. Errors inside units become diagnostics;
/// only setup failures (such as two units sharing a name) are `Err`.
pub fn check_units(units: Vec<SourceUnit>) -> Result<CheckOutcome> {
    let mut program = Program::new().context("failed to register native functions")?;
    for unit in units {
        let name = unit.name.clone();
        program
            .add_source(unit)
            .with_context(|| format!("cannot add source unit {name}"))?;
    }
    let report = program.compile();
    info!(
        compiled = report.compiled.len(),
        errors = report.errors.len(),
        "compilation finished"
    );

    let mut functions: Vec<TypedFunction> = program
        .compiled_functions()
        .map(|f| TypedFunction {
            path: f.path.to_string(),
            returns: program.graph().print_value(&f.return_value),
        })
        .collect();
    functions.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.returns.cmp(&b.returns)));

    Ok(CheckOutcome {
        diagnostics: report.errors.iter().map(CompileError::to_diagnostic).collect(),
        functions,
    })
}
