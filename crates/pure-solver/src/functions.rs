//! Function signatures and the registry used for overload lookup.
//!
//! Functions are registered under their full path and indexed by simple
//! name; every overload of `plus` shares the `plus` entry. Like types, each
//! function records the source unit that declared it.

use crate::diagnostics::TypeError;
use crate::format::TypeFormatter;
use crate::graph::TypeGraph;
use crate::lower::TypeLowering;
use crate::multiplicity::Multiplicity;
use crate::type_expr::{SignatureExpr, parse_signature};
use crate::types::{FunctionParameter, FunctionType, GenericType, TypeParameter, ValueType};
use pure_common::{Name, SourceUnitId, package_of, simple_name};
use rustc_hash::FxHashMap;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

/// A declared function: `pkg::f<T|m>(s:T[*]):MyClass<T>[m]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub path: Name,
    pub type_parameters: Vec<TypeParameter>,
    pub multiplicity_parameters: Vec<Name>,
    pub parameters: Vec<FunctionParameter>,
    pub return_type: GenericType,
    pub return_multiplicity: Multiplicity,
}

impl FunctionSignature {
    /// Lower a parsed signature. Type names resolve through `imports`.
    pub fn lower(graph: &TypeGraph, imports: &[Name], expr: &SignatureExpr) -> Result<Self, TypeError> {
        let names: Vec<Name> = expr.type_parameters.iter().map(|p| p.name.clone()).collect();
        let lowering = TypeLowering::new(graph, imports).with_type_parameters(&names);
        let parameters = expr
            .parameters
            .iter()
            .map(|p| {
                let value = lowering.lower_value_type(&p.value_type)?;
                Ok(FunctionParameter::named(p.name.clone(), value.generic_type, value.multiplicity))
            })
            .collect::<Result<Vec<_>, TypeError>>()?;
        let ret = lowering.lower_value_type(&expr.return_type)?;
        Ok(Self {
            path: expr.path.clone(),
            type_parameters: expr.type_parameters.clone(),
            multiplicity_parameters: expr.multiplicity_parameters.clone(),
            parameters,
            return_type: ret.generic_type,
            return_multiplicity: ret.multiplicity,
        })
    }

    /// Parse and lower `text` in one step.
    pub fn parse(graph: &TypeGraph, imports: &[Name], text: &str) -> Result<Self, TypeError> {
        Self::lower(graph, imports, &parse_signature(text)?)
    }

    pub fn name(&self) -> &str {
        simple_name(&self.path)
    }

    pub fn package(&self) -> Option<&str> {
        package_of(&self.path)
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter_value(&self, index: usize) -> Option<ValueType> {
        self.parameters
            .get(index)
            .map(|p| ValueType::new(p.generic_type.clone(), p.multiplicity.clone()))
    }

    pub fn return_value(&self) -> ValueType {
        ValueType::new(self.return_type.clone(), self.return_multiplicity.clone())
    }

    pub fn type_parameter_names(&self) -> Vec<Name> {
        self.type_parameters.iter().map(|p| p.name.clone()).collect()
    }

    /// The signature as a function type: `{T[*]->MyClass<T>[1]}`.
    pub fn function_type(&self) -> FunctionType {
        FunctionType::new(
            self.parameters.clone(),
            self.return_type.clone(),
            self.return_multiplicity.clone(),
        )
    }

    /// Same name and parameter types (names ignored).
    fn overloads_same_slots(&self, other: &FunctionSignature) -> bool {
        self.path == other.path && self.parameters == other.parameters
    }
}

/// `meta::pure::functions::string::plus(String[*]):String[1]`; types are
/// printed by simple name.
pub fn format_signature(graph: &TypeGraph, signature: &FunctionSignature) -> String {
    let formatter = TypeFormatter::new(graph);
    let parameters: Vec<String> = signature
        .parameters
        .iter()
        .map(|p| formatter.value_type(&ValueType::new(p.generic_type.clone(), p.multiplicity.clone())))
        .collect();
    format!(
        "{}({}):{}",
        signature.path,
        parameters.join(", "),
        formatter.value_type(&signature.return_value())
    )
}

// =============================================================================
// FunctionRegistry
// =============================================================================

#[derive(Clone, Debug)]
struct FunctionSlot {
    signature: FunctionSignature,
    owner: SourceUnitId,
}

#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    slots: Vec<Option<FunctionSlot>>,
    free: Vec<u32>,
    by_name: FxHashMap<Name, Vec<FunctionId>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, signature: FunctionSignature, owner: SourceUnitId) -> Result<FunctionId, TypeError> {
        let name: Name = signature.name().into();
        if let Some(ids) = self.by_name.get(&name)
            && ids
                .iter()
                .filter_map(|id| self.get(*id))
                .any(|existing| existing.overloads_same_slots(&signature))
        {
            return Err(TypeError::DuplicateDefinition {
                path: signature.path.to_string(),
            });
        }
        let path = signature.path.clone();
        let slot = Some(FunctionSlot { signature, owner });
        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = slot;
                FunctionId(index)
            }
            None => {
                self.slots.push(slot);
                FunctionId(self.slots.len() as u32 - 1)
            }
        };
        self.by_name.entry(name).or_default().push(id);
        trace!(function_id = id.0, path = %path, owner = owner.0, "FunctionRegistry::register");
        Ok(id)
    }

    /// Remove every function owned by `unit`; returns the removed ids.
    pub fn remove_unit(&mut self, unit: SourceUnitId) -> Vec<FunctionId> {
        let mut removed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|s| s.owner == unit) {
                *slot = None;
                removed.push(FunctionId(index as u32));
            }
        }
        if removed.is_empty() {
            return removed;
        }
        for ids in self.by_name.values_mut() {
            ids.retain(|id| !removed.contains(id));
        }
        self.by_name.retain(|_, ids| !ids.is_empty());
        self.free.extend(removed.iter().map(|id| id.0));
        removed
    }

    pub fn get(&self, id: FunctionId) -> Option<&FunctionSignature> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|slot| &slot.signature)
    }

    pub fn owner(&self, id: FunctionId) -> Option<SourceUnitId> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|slot| slot.owner)
    }

    /// Every overload with this simple name, in registration order.
    pub fn by_name(&self, name: &str) -> &[FunctionId] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn lookup_path(&self, path: &str) -> Vec<FunctionId> {
        self.by_name(simple_name(path))
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some_and(|s| &*s.path == path))
            .collect()
    }

    pub fn functions_of_unit(&self, unit: SourceUnitId) -> Vec<FunctionId> {
        self.iter()
            .filter(|(id, _)| self.owner(*id) == Some(unit))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (FunctionId, &FunctionSignature)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|s| (FunctionId(index as u32), &s.signature))
        })
    }
}

#[cfg(test)]
#[path = "../tests/functions_tests.rs"]
mod tests;
