//! The type graph: an arena of nominal types.
//!
//! Every class, primitive and the `Any`/`Nil` bounds live here, addressed by
//! [`TypeId`]. Each entry records the source unit that declared it so a whole
//! unit can be dropped at once when it is edited or fails to compile.
//!
//! The graph carries a generation counter that moves on every mutation.
//! Derived data (linearizations) is cached against the generation and
//! discarded lazily the first time it is read after a change.

use crate::diagnostics::TypeError;
use crate::types::{ClassType, GenericType, PrimitiveType, TypeData, TypeId, TypeParameter};
use dashmap::DashMap;
use pure_common::{Name, SourceUnitId, package_of, simple_name};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

#[derive(Clone, Debug)]
struct TypeSlot {
    data: TypeData,
    owner: SourceUnitId,
}

// =============================================================================
// TypeGraph
// =============================================================================

pub struct TypeGraph {
    slots: Vec<Option<TypeSlot>>,
    free: Vec<u32>,
    by_path: FxHashMap<Name, TypeId>,
    generation: u64,
    /// `TypeId` -> C3 linearization, valid for `cache_generation`.
    linearizations: DashMap<TypeId, Arc<[TypeId]>>,
    cache_generation: AtomicU64,
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraph {
    /// A graph holding only the built-in types.
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_path: FxHashMap::default(),
            generation: 0,
            linearizations: DashMap::new(),
            cache_generation: AtomicU64::new(0),
        };
        graph.register_builtins();
        graph
    }

    fn register_builtins(&mut self) {
        let primitive = |path: &str, supers: &[TypeId]| {
            TypeData::Primitive(PrimitiveType {
                path: path.into(),
                generalizations: supers.iter().copied().collect(),
            })
        };
        let generic_class = |path: &str| {
            let mut class = ClassType::new(path);
            class.type_parameters = vec![TypeParameter::new("T")];
            TypeData::Class(class)
        };
        let mut lambda = ClassType::new("LambdaFunction");
        lambda.type_parameters = vec![TypeParameter::new("T")];
        lambda.generalizations = vec![GenericType::applied(
            TypeId::FUNCTION,
            vec![GenericType::parameter("T")],
            Vec::new(),
        )];

        // Order must follow the TypeId constants.
        let builtins: [TypeData; TypeId::FIRST_USER as usize] = [
            TypeData::Top,
            TypeData::Bottom,
            primitive("String", &[]),
            primitive("Boolean", &[]),
            primitive("Number", &[]),
            primitive("Integer", &[TypeId::NUMBER]),
            primitive("Float", &[TypeId::NUMBER]),
            primitive("Decimal", &[TypeId::NUMBER]),
            primitive("Date", &[]),
            primitive("StrictDate", &[TypeId::DATE]),
            primitive("DateTime", &[TypeId::DATE]),
            primitive("LatestDate", &[TypeId::DATE]),
            generic_class("Function"),
            TypeData::Class(lambda),
            generic_class("Relation"),
            generic_class("Class"),
        ];
        for data in builtins {
            let path: Name = data.path().into();
            let id = TypeId(self.slots.len() as u32);
            self.by_path.insert(path, id);
            self.slots.push(Some(TypeSlot {
                data,
                owner: SourceUnitId::BUILTIN,
            }));
        }
        debug_assert_eq!(self.slots.len() as u32, TypeId::FIRST_USER);
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Add a nominal type owned by `owner`.
    pub fn declare(&mut self, data: TypeData, owner: SourceUnitId) -> Result<TypeId, TypeError> {
        let path: Name = data.path().into();
        if self.by_path.contains_key(&path) {
            return Err(TypeError::DuplicateDefinition {
                path: path.to_string(),
            });
        }
        let slot = Some(TypeSlot { data, owner });
        let id = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = slot;
                TypeId(index)
            }
            None => {
                self.slots.push(slot);
                TypeId(self.slots.len() as u32 - 1)
            }
        };
        self.by_path.insert(path.clone(), id);
        self.bump_generation();
        trace!(type_id = id.0, path = %path, owner = owner.0, "TypeGraph::declare");
        Ok(id)
    }

    /// Replace the data of an existing type (second registration phase).
    /// The path must not change.
    pub fn define(&mut self, id: TypeId, data: TypeData) -> bool {
        let Some(Some(slot)) = self.slots.get_mut(id.0 as usize) else {
            return false;
        };
        debug_assert_eq!(slot.data.path(), data.path());
        slot.data = data;
        self.bump_generation();
        true
    }

    /// Remove every type owned by `unit`; returns the removed ids.
    pub fn remove_unit(&mut self, unit: SourceUnitId) -> Vec<TypeId> {
        if unit.is_builtin() {
            return Vec::new();
        }
        let mut removed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|s| s.owner == unit) {
                if let Some(s) = slot.take() {
                    self.by_path.remove(s.data.path());
                }
                removed.push(TypeId(index as u32));
            }
        }
        self.free.extend(removed.iter().map(|id| id.0));
        if !removed.is_empty() {
            self.bump_generation();
            trace!(unit = unit.0, count = removed.len(), "TypeGraph::remove_unit");
        }
        removed
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeData> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|slot| &slot.data)
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.get(id).is_some()
    }

    pub fn owner(&self, id: TypeId) -> Option<SourceUnitId> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|slot| slot.owner)
    }

    /// Full path of a type; removed ids print as `<removed>`.
    pub fn path(&self, id: TypeId) -> &str {
        self.get(id).map_or("<removed>", TypeData::path)
    }

    pub fn lookup_path(&self, path: &str) -> Option<TypeId> {
        self.by_path.get(path).copied()
    }

    /// Resolve a (possibly qualified) name as seen from a unit with the given
    /// imports: exact path first, then each imported package.
    pub fn resolve_name(&self, name: &str, imports: &[Name]) -> Option<TypeId> {
        if let Some(id) = self.lookup_path(name) {
            return Some(id);
        }
        if package_of(name).is_some() {
            return None;
        }
        imports
            .iter()
            .find_map(|package| self.lookup_path(&format!("{package}::{name}")))
    }

    /// Simple name of a type: `test::MyClass` -> `MyClass`.
    pub fn simple_name(&self, id: TypeId) -> &str {
        simple_name(self.path(id))
    }

    /// Number of live types, built-ins included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeData)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|s| (TypeId(index as u32), &s.data))
        })
    }

    /// Types owned by `unit`.
    pub fn types_of_unit(&self, unit: SourceUnitId) -> Vec<TypeId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.as_ref().is_some_and(|s| s.owner == unit))
            .map(|(index, _)| TypeId(index as u32))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Linearization cache
    // -------------------------------------------------------------------------

    pub(crate) fn cached_linearization(&self, id: TypeId) -> Option<Arc<[TypeId]>> {
        self.sync_cache();
        self.linearizations.get(&id).map(|entry| entry.value().clone())
    }

    pub(crate) fn store_linearization(&self, id: TypeId, linearization: Arc<[TypeId]>) {
        self.sync_cache();
        self.linearizations.insert(id, linearization);
    }

    fn sync_cache(&self) {
        let cached = self.cache_generation.load(Ordering::Acquire);
        if cached != self.generation {
            self.linearizations.clear();
            self.cache_generation.store(self.generation, Ordering::Release);
            trace!(generation = self.generation, "TypeGraph: linearization cache reset");
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_linearization_count(&self) -> usize {
        self.sync_cache();
        self.linearizations.len()
    }
}

impl std::fmt::Debug for TypeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeGraph")
            .field("types", &self.len())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/graph_tests.rs"]
mod tests;
