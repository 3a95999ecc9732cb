//! Incremental compilation of source units.
//!
//! A [`Program`] owns the type graph, the function registry and every
//! source unit added to it. `compile()` brings all pending units up to
//! date in four steps:
//!
//! 1. declare class shells (path and parameters) so units can refer to each
//!    other's types regardless of order;
//! 2. define supertypes and properties, then register function signatures;
//! 3. validate class hierarchies;
//! 4. type function bodies.
//!
//! A unit that fails any step is rolled back: its types, functions and
//! compiled bodies leave the graph, and every unit that depended on it is
//! sent back to pending. The failing unit's source stays so that a later
//! edit can fix it.

use crate::diagnostics::{CompileError, TypeError};
use crate::engine::{AtRange, CheckError, CheckResult, FunctionChecker};
use crate::expr::Expr;
use crate::format::TypeFormatter;
use crate::functions::{FunctionId, FunctionRegistry, FunctionSignature, format_signature};
use crate::generalization::all_super_types_including_self;
use crate::graph::TypeGraph;
use crate::lower::TypeLowering;
use crate::multiplicity::Multiplicity;
use crate::natives::register_natives;
use crate::type_expr::parse_class_header;
use crate::types::{ClassType, GenericType, PropertyInfo, TypeData, TypeId, ValueType};
use pure_common::{Name, SourceRange, SourceSpan, SourceUnitId, package_of};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info_span};

// =============================================================================
// Source model
// =============================================================================

/// One source file: classes and functions with types written as text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    #[serde(default)]
    pub name: Name,
    #[serde(default)]
    pub imports: Vec<Name>,
    #[serde(default)]
    pub classes: Vec<ClassDefinition>,
    #[serde(default)]
    pub functions: Vec<FunctionDefinition>,
}

/// `Class model::MyClass<T> extends Base { value: T[1]; }`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Full path and parameters: `model::MyClass<T|m>`.
    pub header: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub range: SourceRange,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: Name,
    /// `T[1]`, `String[*]`.
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub range: SourceRange,
}

/// A function signature and its body. A function without a body is a
/// native: only its signature is registered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub signature: String,
    #[serde(default)]
    pub body: Option<Vec<Expr>>,
    #[serde(default)]
    pub range: SourceRange,
}

impl SourceUnit {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn import(mut self, package: impl Into<Name>) -> Self {
        self.imports.push(package.into());
        self
    }

    pub fn class(mut self, class: ClassDefinition) -> Self {
        self.classes.push(class);
        self
    }

    pub fn function(mut self, function: FunctionDefinition) -> Self {
        self.functions.push(function);
        self
    }

    /// Explicit imports plus the packages this unit declares into.
    fn effective_imports(&self) -> Vec<Name> {
        let mut imports = self.imports.clone();
        let declared = self
            .classes
            .iter()
            .filter_map(|c| parse_class_header(&c.header).ok().map(|h| h.path))
            .chain(self.functions.iter().filter_map(|f| declared_function_path(&f.signature)));
        for path in declared {
            if let Some(package) = package_of(&path)
                && !imports.iter().any(|i| &**i == package)
            {
                imports.push(package.into());
            }
        }
        imports
    }
}

fn declared_function_path(signature: &str) -> Option<Name> {
    crate::type_expr::parse_signature(signature).ok().map(|s| s.path)
}

impl ClassDefinition {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, generalization: impl Into<String>) -> Self {
        self.extends.push(generalization.into());
        self
    }

    pub fn property(mut self, name: impl Into<Name>, value_type: impl Into<String>) -> Self {
        self.properties.push(PropertyDefinition {
            name: name.into(),
            value_type: value_type.into(),
            range: SourceRange::default(),
        });
        self
    }

    pub fn at(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }
}

impl FunctionDefinition {
    pub fn native(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            ..Self::default()
        }
    }

    pub fn new(signature: impl Into<String>, body: Vec<Expr>) -> Self {
        Self {
            signature: signature.into(),
            body: Some(body),
            range: SourceRange::default(),
        }
    }

    pub fn at(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }
}

// =============================================================================
// Program
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitState {
    /// Added or invalidated; nothing of it is in the graph.
    Pending,
    /// Types and signatures registered, bodies not yet checked.
    Declared,
    Compiled,
    /// Rolled back after an error; retried after the next edit.
    Failed,
}

/// A typed function body.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledFunction {
    pub id: FunctionId,
    pub path: Name,
    pub body: Vec<Expr>,
    pub return_value: ValueType,
}

#[derive(Clone, Debug, Default)]
pub struct CompileReport {
    /// Units that reached `Compiled` in this call, in compile order.
    pub compiled: Vec<Name>,
    pub errors: Vec<CompileError>,
}

impl CompileReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Clone, Debug)]
struct UnitEntry {
    source: SourceUnit,
    state: UnitState,
    /// Other units whose types or functions this one refers to.
    dependencies: BTreeSet<SourceUnitId>,
    /// Registered id of each entry of `source.functions`.
    function_ids: Vec<FunctionId>,
    compiled: Vec<CompiledFunction>,
}

impl UnitEntry {
    fn new(source: SourceUnit) -> Self {
        Self {
            source,
            state: UnitState::Pending,
            dependencies: BTreeSet::new(),
            function_ids: Vec::new(),
            compiled: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Program {
    graph: TypeGraph,
    functions: FunctionRegistry,
    units: BTreeMap<SourceUnitId, UnitEntry>,
    next_unit: u32,
}

impl Program {
    /// An empty program with the native library registered.
    pub fn new() -> Result<Self, TypeError> {
        let graph = TypeGraph::new();
        let mut functions = FunctionRegistry::new();
        register_natives(&graph, &mut functions)?;
        Ok(Self {
            graph,
            functions,
            units: BTreeMap::new(),
            next_unit: SourceUnitId::FIRST_USER,
        })
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn unit_id(&self, name: &str) -> Option<SourceUnitId> {
        self.units
            .iter()
            .find(|(_, entry)| &*entry.source.name == name)
            .map(|(id, _)| *id)
    }

    pub fn source(&self, name: &str) -> Option<&SourceUnit> {
        self.entry(name).map(|e| &e.source)
    }

    pub fn state(&self, name: &str) -> Option<UnitState> {
        self.entry(name).map(|e| e.state)
    }

    /// Compiled bodies of every overload declared at `path`.
    pub fn compiled(&self, path: &str) -> Vec<&CompiledFunction> {
        self.compiled_functions().filter(|f| &*f.path == path).collect()
    }

    /// Every compiled body, grouped by unit in the order units were added.
    pub fn compiled_functions(&self) -> impl Iterator<Item = &CompiledFunction> + '_ {
        self.units.values().flat_map(|e| &e.compiled)
    }

    fn entry(&self, name: &str) -> Option<&UnitEntry> {
        self.unit_id(name).and_then(|id| self.units.get(&id))
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    pub fn add_source(&mut self, source: SourceUnit) -> Result<SourceUnitId, TypeError> {
        if self.unit_id(&source.name).is_some() {
            return Err(TypeError::DuplicateDefinition {
                path: source.name.to_string(),
            });
        }
        let id = SourceUnitId(self.next_unit);
        self.next_unit += 1;
        debug!(unit = %source.name, unit_id = id.0, "source added");
        self.units.insert(id, UnitEntry::new(source));
        self.retry_failed();
        Ok(id)
    }

    /// Swap the source of an existing unit (or add it). The old version
    /// and everything depending on it are invalidated.
    pub fn replace_source(&mut self, source: SourceUnit) -> Result<SourceUnitId, TypeError> {
        let Some(id) = self.unit_id(&source.name) else {
            return self.add_source(source);
        };
        self.retire(id, UnitState::Pending);
        if let Some(entry) = self.units.get_mut(&id) {
            debug!(unit = %source.name, "source replaced");
            entry.source = source;
        }
        self.retry_failed();
        Ok(id)
    }

    pub fn remove_source(&mut self, name: &str) -> Option<SourceUnit> {
        let id = self.unit_id(name)?;
        self.retire(id, UnitState::Pending);
        let entry = self.units.remove(&id)?;
        debug!(unit = %name, "source removed");
        self.retry_failed();
        Some(entry.source)
    }

    fn retry_failed(&mut self) {
        for entry in self.units.values_mut() {
            if entry.state == UnitState::Failed {
                entry.state = UnitState::Pending;
            }
        }
    }

    /// Remove everything `unit` registered and send its dependents back
    /// to pending.
    fn retire(&mut self, unit: SourceUnitId, state: UnitState) {
        self.graph.remove_unit(unit);
        self.functions.remove_unit(unit);
        let Some(entry) = self.units.get_mut(&unit) else {
            return;
        };
        entry.state = state;
        entry.dependencies.clear();
        entry.function_ids.clear();
        entry.compiled.clear();

        let dependents: Vec<SourceUnitId> = self
            .units
            .iter()
            .filter(|(id, e)| {
                **id != unit
                    && matches!(e.state, UnitState::Declared | UnitState::Compiled)
                    && e.dependencies.contains(&unit)
            })
            .map(|(id, _)| *id)
            .collect();
        for dependent in dependents {
            if let Some(e) = self.units.get(&dependent) {
                debug!(unit = %e.source.name, cause = unit.0, "dependent invalidated");
            }
            self.retire(dependent, UnitState::Pending);
        }
    }

    fn fail(&mut self, unit: SourceUnitId, error: CheckError, report: &mut CompileReport) {
        let Some(entry) = self.units.get(&unit) else {
            return;
        };
        let name = entry.source.name.clone();
        debug!(unit = %name, error = %error, "unit rolled back");
        report
            .errors
            .push(CompileError::new(name, SourceSpan::new(unit, error.range), error.error));
        self.retire(unit, UnitState::Failed);
    }

    fn units_in(&self, state: UnitState) -> Vec<SourceUnitId> {
        self.units
            .iter()
            .filter(|(_, e)| e.state == state)
            .map(|(id, _)| *id)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Compilation
    // -------------------------------------------------------------------------

    /// Compile every pending unit. Units that fail are rolled back and
    /// reported; the rest of the program stays usable.
    pub fn compile(&mut self) -> CompileReport {
        let mut report = CompileReport::default();
        loop {
            let pending = self.units_in(UnitState::Pending);
            if pending.is_empty() {
                break;
            }
            let _span = info_span!("compile", units = pending.len()).entered();

            for &unit in &pending {
                if let Err(e) = self.declare_unit(unit) {
                    self.fail(unit, e, &mut report);
                }
            }
            for unit in self.still_declared(&pending) {
                if let Err(e) = self.define_unit(unit) {
                    self.fail(unit, e, &mut report);
                }
            }
            for unit in self.still_declared(&pending) {
                if let Err(e) = self.validate_unit(unit) {
                    self.fail(unit, e, &mut report);
                }
            }
            for unit in self.still_declared(&pending) {
                match self.compile_bodies(unit) {
                    Ok(()) => {
                        if let Some(entry) = self.units.get_mut(&unit) {
                            entry.state = UnitState::Compiled;
                            report.compiled.push(entry.source.name.clone());
                        }
                    }
                    Err(e) => self.fail(unit, e, &mut report),
                }
            }
        }
        report
    }

    fn still_declared(&self, batch: &[SourceUnitId]) -> Vec<SourceUnitId> {
        batch
            .iter()
            .copied()
            .filter(|id| self.units.get(id).is_some_and(|e| e.state == UnitState::Declared))
            .collect()
    }

    /// Register a shell for every class: path and parameters only.
    fn declare_unit(&mut self, unit: SourceUnitId) -> CheckResult<()> {
        let Some(entry) = self.units.get(&unit) else {
            return Ok(());
        };
        let classes = entry.source.classes.clone();
        for class in &classes {
            let header = parse_class_header(&class.header).at(class.range)?;
            let mut shell = ClassType::new(header.path);
            shell.type_parameters = header.type_parameters;
            shell.multiplicity_parameters = header.multiplicity_parameters;
            self.graph
                .declare(TypeData::Class(shell), unit)
                .at(class.range)?;
        }
        if let Some(entry) = self.units.get_mut(&unit) {
            entry.state = UnitState::Declared;
        }
        Ok(())
    }

    /// Fill in supertypes and properties, then register signatures.
    fn define_unit(&mut self, unit: SourceUnitId) -> CheckResult<()> {
        let Some(entry) = self.units.get(&unit) else {
            return Ok(());
        };
        let source = entry.source.clone();
        let imports = source.effective_imports();
        let mut dependencies = BTreeSet::new();

        for class in &source.classes {
            let header = parse_class_header(&class.header).at(class.range)?;
            let Some(id) = self.graph.lookup_path(&header.path) else {
                continue;
            };
            let Some(mut data) = self.graph.get(id).and_then(TypeData::as_class).cloned() else {
                continue;
            };
            let names: Vec<Name> = data.type_parameters.iter().map(|p| p.name.clone()).collect();
            {
                let lowering = TypeLowering::new(&self.graph, &imports).with_type_parameters(&names);
                data.generalizations = class
                    .extends
                    .iter()
                    .map(|e| lowering.lower_str(e))
                    .collect::<Result<_, _>>()
                    .at(class.range)?;
                data.properties = class
                    .properties
                    .iter()
                    .map(|p| {
                        let value = lowering.lower_value_str(&p.value_type).at(p.range)?;
                        Ok(PropertyInfo {
                            name: p.name.clone(),
                            generic_type: value.generic_type,
                            multiplicity: value.multiplicity,
                        })
                    })
                    .collect::<CheckResult<_>>()?;
            }
            for generic_type in data
                .generalizations
                .iter()
                .chain(data.properties.iter().map(|p| &p.generic_type))
            {
                self.note_owners(generic_type, &mut dependencies);
            }
            self.graph.define(id, TypeData::Class(data));
        }

        let mut function_ids = Vec::with_capacity(source.functions.len());
        for function in &source.functions {
            let signature =
                FunctionSignature::parse(&self.graph, &imports, &function.signature).at(function.range)?;
            self.note_owners(&GenericType::function(signature.function_type()), &mut dependencies);
            let id = self.functions.register(signature, unit).at(function.range)?;
            function_ids.push(id);
        }

        dependencies.remove(&unit);
        if let Some(entry) = self.units.get_mut(&unit) {
            entry.dependencies = dependencies;
            entry.function_ids = function_ids;
        }
        Ok(())
    }

    fn note_owners(&self, generic_type: &GenericType, into: &mut BTreeSet<SourceUnitId>) {
        generic_type.for_each_nominal(&mut |id| {
            if let Some(owner) = self.graph.owner(id)
                && !owner.is_builtin()
            {
                into.insert(owner);
            }
        });
    }

    /// Reject cyclic, inconsistent or diamond hierarchies.
    fn validate_unit(&self, unit: SourceUnitId) -> CheckResult<()> {
        let Some(entry) = self.units.get(&unit) else {
            return Ok(());
        };
        for class in &entry.source.classes {
            let header = parse_class_header(&class.header).at(class.range)?;
            let Some(id) = self.graph.lookup_path(&header.path) else {
                continue;
            };
            let own = GenericType::applied(
                id,
                header
                    .type_parameters
                    .iter()
                    .map(|p| GenericType::parameter(p.name.clone()))
                    .collect(),
                header
                    .multiplicity_parameters
                    .iter()
                    .map(|m| Multiplicity::parameter(m.clone()))
                    .collect(),
            );
            all_super_types_including_self(&self.graph, &own).at(class.range)?;
        }
        Ok(())
    }

    /// Type every function body against its registered signature.
    fn compile_bodies(&mut self, unit: SourceUnitId) -> CheckResult<()> {
        let Some(entry) = self.units.get(&unit) else {
            return Ok(());
        };
        let imports = entry.source.effective_imports();
        let mut dependencies = entry.dependencies.clone();
        let mut compiled = Vec::new();

        for (definition, id) in entry.source.functions.iter().zip(&entry.function_ids) {
            let Some(body) = &definition.body else {
                continue;
            };
            let Some(signature) = self.functions.get(*id) else {
                continue;
            };
            let mut body = body.clone();
            let mut checker = FunctionChecker::new(&self.graph, &self.functions, &imports);
            let return_value = checker
                .check_function(signature, &mut body)
                .map_err(|e| located_or(e, definition.range))?;
            dependencies.extend(checker.into_dependencies());
            compiled.push(CompiledFunction {
                id: *id,
                path: signature.path.clone(),
                body,
                return_value,
            });
        }

        dependencies.remove(&unit);
        if let Some(entry) = self.units.get_mut(&unit) {
            entry.dependencies = dependencies;
            entry.compiled = compiled;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Snapshot
    // -------------------------------------------------------------------------

    /// Size of [`Program::snapshot`] rendered as JSON.
    pub fn graph_size(&self) -> usize {
        self.snapshot().to_string().len()
    }

    /// Everything user units contributed to the graph, printed with full
    /// paths and sorted so that slot reuse does not show.
    pub fn snapshot(&self) -> serde_json::Value {
        let formatter = TypeFormatter::new(&self.graph).with_full_paths();

        let mut types: Vec<(String, serde_json::Value)> = self
            .graph
            .iter()
            .filter(|(id, _)| self.graph.owner(*id).is_some_and(|o| !o.is_builtin()))
            .map(|(id, data)| (data.path().to_string(), self.type_snapshot(&formatter, id, data)))
            .collect();
        types.sort_by(|a, b| a.0.cmp(&b.0));

        let mut functions: Vec<String> = self
            .functions
            .iter()
            .filter(|(id, _)| self.functions.owner(*id).is_some_and(|o| !o.is_builtin()))
            .map(|(_, signature)| format_signature(&self.graph, signature))
            .collect();
        functions.sort();

        let mut compiled: Vec<(String, serde_json::Value)> = self
            .compiled_functions()
            .map(|f| {
                let mut annotations = Vec::new();
                for expr in &f.body {
                    expr.walk(&mut |node| {
                        if let Some(value) = &node.inferred {
                            annotations.push(formatter.value_type(value));
                        }
                    });
                }
                (
                    f.path.to_string(),
                    json!({
                        "path": &*f.path,
                        "returns": formatter.value_type(&f.return_value),
                        "annotations": annotations,
                    }),
                )
            })
            .collect();
        compiled.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.to_string().cmp(&b.1.to_string())));

        json!({
            "types": types.into_iter().map(|(_, t)| t).collect::<Vec<_>>(),
            "functions": functions,
            "compiled": compiled.into_iter().map(|(_, c)| c).collect::<Vec<_>>(),
        })
    }

    fn type_snapshot(&self, formatter: &TypeFormatter<'_>, id: TypeId, data: &TypeData) -> serde_json::Value {
        let owner = self
            .graph
            .owner(id)
            .and_then(|o| self.units.get(&o))
            .map(|e| e.source.name.to_string());
        let Some(class) = data.as_class() else {
            return json!({ "path": data.path(), "owner": owner });
        };
        json!({
            "path": &*class.path,
            "owner": owner,
            "typeParameters": class.type_parameters.iter().map(|p| p.name.to_string()).collect::<Vec<_>>(),
            "multiplicityParameters": class.multiplicity_parameters.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            "generalizations": class.generalizations.iter().map(|g| formatter.generic_type(g)).collect::<Vec<_>>(),
            "properties": class
                .properties
                .iter()
                .map(|p| format!(
                    "{}:{}",
                    p.name,
                    formatter.value_type(&ValueType::new(p.generic_type.clone(), p.multiplicity.clone()))
                ))
                .collect::<Vec<_>>(),
        })
    }
}

/// Synthesized expressions carry no range; report those at the function.
fn located_or(error: CheckError, fallback: SourceRange) -> CheckError {
    if error.range.is_unknown() {
        CheckError {
            range: fallback,
            ..error
        }
    } else {
        error
    }
}

#[cfg(test)]
#[path = "../tests/program_tests.rs"]
mod tests;
