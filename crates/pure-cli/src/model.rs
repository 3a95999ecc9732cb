//! JSON model files.
//!
//! A model file holds either a single source unit or a list of them:
//!
//! ```json
//! [{"name": "model.pure",
//!   "classes": [{"header": "test::MyClass<T>",
//!                "properties": [{"name": "value", "type": "T[1]"}]}],
//!   "functions": [{"signature": "test::f<T>(s:T[*]):MyClass<T>[1]", "body": [...]}]}]
//! ```
//!
//! A unit without a name is named after its file.

use anyhow::{Context, Result};
use pure_solver::SourceUnit;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelDocument {
    Many(Vec<SourceUnit>),
    One(SourceUnit),
}

/// Parse model text; `origin` names units that have no name of their own.
pub fn parse_model(text: &str, origin: &str) -> Result<Vec<SourceUnit>> {
    let document: ModelDocument = serde_json::from_str(text).with_context(|| format!("invalid model in {origin}"))?;
    let mut units = match document {
        ModelDocument::Many(units) => units,
        ModelDocument::One(unit) => vec![unit],
    };
    let unnamed = units.iter().filter(|u| u.name.is_empty()).count();
    let mut index = 0;
    for unit in &mut units {
        if unit.name.is_empty() {
            index += 1;
            unit.name = if unnamed == 1 {
                origin.into()
            } else {
                format!("{origin}#{index}").into()
            };
        }
    }
    Ok(units)
}

pub fn load_model(path: &Path) -> Result<Vec<SourceUnit>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let origin = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_model(&text, &origin)
}

#[cfg(test)]
#[path = "../tests/model_tests.rs"]
mod tests;
