//! Relation type algebra.
//!
//! Relation types are ordered lists of uniquely named, typed columns. The
//! operations here back column access on rows, the `T+V` / `T-V` operators
//! in signatures, and the relation rules of matching and compatibility.

use crate::common_type::best_common_generic_type;
use crate::compat::{generic_types_equal, is_generic_compatible_with};
use crate::diagnostics::TypeError;
use crate::graph::TypeGraph;
use crate::types::{Column, GenericType, RelationType, TypeOperationKind};
use indexmap::IndexSet;
use pure_common::Name;

impl RelationType {
    /// Build a relation type; duplicate column names are rejected and all of
    /// them are reported.
    pub fn new(columns: Vec<Column>) -> Result<Self, TypeError> {
        let mut seen: IndexSet<&str> = IndexSet::default();
        let mut duplicates: IndexSet<&str> = IndexSet::default();
        for column in &columns {
            if !seen.insert(&column.name) {
                duplicates.insert(&column.name);
            }
        }
        if !duplicates.is_empty() {
            return Err(TypeError::DuplicateColumn {
                columns: duplicates.iter().map(|n| n.to_string()).collect(),
            });
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self { columns: Vec::new() }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| &*c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &Name> {
        self.columns.iter().map(|c| &c.name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Type of column `name`, or an error listing the relation's columns.
pub fn lookup_column<'r>(
    graph: &TypeGraph,
    relation: &'r RelationType,
    name: &str,
) -> Result<&'r GenericType, TypeError> {
    relation
        .column(name)
        .map(|c| &c.generic_type)
        .ok_or_else(|| TypeError::UnknownColumn {
            column: name.to_string(),
            relation: graph.print(&GenericType::relation(relation.clone())),
        })
}

/// `left + right`: right's columns appended; shared names are an error.
pub fn union(left: &RelationType, right: &RelationType) -> Result<RelationType, TypeError> {
    let mut columns = left.columns.clone();
    columns.extend(right.columns.iter().cloned());
    RelationType::new(columns)
}

/// `left - right`: columns named in `right` removed; absent names are ignored.
pub fn difference(left: &RelationType, right: &RelationType) -> RelationType {
    RelationType {
        columns: left
            .columns
            .iter()
            .filter(|c| right.column(&c.name).is_none())
            .cloned()
            .collect(),
    }
}

/// Evaluate `left op right` when both sides are concrete relation types.
/// Returns `None` while either side is still pending.
pub fn evaluate_operation(
    left: &GenericType,
    kind: TypeOperationKind,
    right: &GenericType,
) -> Result<Option<RelationType>, TypeError> {
    let (Some(l), Some(r)) = (left.as_relation_type(), right.as_relation_type()) else {
        return Ok(None);
    };
    let result = match kind {
        TypeOperationKind::Union => union(l, r)?,
        TypeOperationKind::Difference => difference(l, r),
    };
    Ok(Some(result))
}

/// True when `wider` can be used where `narrower` is expected: it has every
/// column of `narrower`, with compatible types.
pub fn is_compatible_with(
    graph: &TypeGraph,
    wider: &RelationType,
    narrower: &RelationType,
) -> Result<bool, TypeError> {
    for expected in &narrower.columns {
        let Some(actual) = wider.column(&expected.name) else {
            return Ok(false);
        };
        if !is_generic_compatible_with(graph, &actual.generic_type, &expected.generic_type)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Same column names in the same order with equal types.
pub fn relation_types_equal(a: &RelationType, b: &RelationType) -> bool {
    a.columns.len() == b.columns.len()
        && a
            .columns
            .iter()
            .zip(&b.columns)
            .all(|(x, y)| x.name == y.name && generic_types_equal(&x.generic_type, &y.generic_type))
}

/// Column-wise best common type of two relations with the same column names.
pub fn merge(graph: &TypeGraph, a: &RelationType, b: &RelationType) -> Result<RelationType, TypeError> {
    let incompatible = || TypeError::IncompatibleTypes {
        left: graph.print(&GenericType::relation(a.clone())),
        right: graph.print(&GenericType::relation(b.clone())),
    };
    if a.columns.len() != b.columns.len() {
        return Err(incompatible());
    }
    let mut columns = Vec::with_capacity(a.columns.len());
    for column in &a.columns {
        let other = b.column(&column.name).ok_or_else(incompatible)?;
        let merged = best_common_generic_type(
            graph,
            &[column.generic_type.clone(), other.generic_type.clone()],
            true,
        )?;
        columns.push(Column::new(column.name.clone(), merged));
    }
    Ok(RelationType { columns })
}

#[cfg(test)]
#[path = "../tests/relation_tests.rs"]
mod tests;
