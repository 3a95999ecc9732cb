//! Built-in native functions.
//!
//! Natives live in the core packages below. Those packages are visible to
//! overload resolution from every unit without an import, but a no-match
//! report still lists them as "not imported" with their full path, the way
//! a user-declared function in a foreign package would be.

use crate::diagnostics::TypeError;
use crate::functions::{FunctionId, FunctionRegistry, FunctionSignature};
use crate::graph::TypeGraph;
use pure_common::SourceUnitId;
use tracing::debug;

pub const CORE_IMPORTS: &[&str] = &[
    "meta::pure::functions::boolean",
    "meta::pure::functions::collection",
    "meta::pure::functions::lang",
    "meta::pure::functions::math",
    "meta::pure::functions::meta",
    "meta::pure::functions::multiplicity",
    "meta::pure::functions::relation",
    "meta::pure::functions::string",
];

const NATIVE_SIGNATURES: &[&str] = &[
    // math
    "meta::pure::functions::math::plus(values:Integer[*]):Integer[1]",
    "meta::pure::functions::math::plus(values:Float[*]):Float[1]",
    "meta::pure::functions::math::plus(values:Decimal[*]):Decimal[1]",
    "meta::pure::functions::math::plus(values:Number[*]):Number[1]",
    "meta::pure::functions::math::minus(values:Integer[*]):Integer[1]",
    "meta::pure::functions::math::minus(values:Float[*]):Float[1]",
    "meta::pure::functions::math::minus(values:Number[*]):Number[1]",
    "meta::pure::functions::math::times(values:Integer[*]):Integer[1]",
    "meta::pure::functions::math::times(values:Float[*]):Float[1]",
    "meta::pure::functions::math::times(values:Number[*]):Number[1]",
    // string
    "meta::pure::functions::string::plus(values:String[*]):String[1]",
    // boolean
    "meta::pure::functions::boolean::equal(left:Any[*], right:Any[*]):Boolean[1]",
    "meta::pure::functions::boolean::not(value:Boolean[1]):Boolean[1]",
    // collection
    "meta::pure::functions::collection::size(values:Any[*]):Integer[1]",
    "meta::pure::functions::collection::isEmpty(values:Any[*]):Boolean[1]",
    "meta::pure::functions::collection::first<T>(set:T[*]):T[0..1]",
    "meta::pure::functions::collection::in(value:Any[0..1], collection:Any[*]):Boolean[1]",
    "meta::pure::functions::collection::filter<T>(value:T[*], func:Function<{T[1]->Boolean[1]}>[1]):T[*]",
    "meta::pure::functions::collection::map<T,V>(value:T[*], func:Function<{T[1]->V[*]}>[1]):V[*]",
    "meta::pure::functions::collection::all<T>(class:Class<T>[1]):T[*]",
    // multiplicity
    "meta::pure::functions::multiplicity::toOne<T>(values:T[*]):T[1]",
    // relation
    "meta::pure::functions::relation::filter<T>(rel:Relation<T>[1], f:Function<{T[1]->Boolean[1]}>[1]):Relation<T>[1]",
    "meta::pure::functions::relation::map<T,V>(rel:Relation<T>[1], f:Function<{T[1]->V[*]}>[1]):V[*]",
    "meta::pure::functions::relation::concatenate<T>(rel1:Relation<T>[1], rel2:Relation<T>[1]):Relation<T>[1]",
    "meta::pure::functions::relation::join<T,V>(rel1:Relation<T>[1], rel2:Relation<V>[1], f:Function<{T[1],V[1]->Boolean[1]}>[1]):Relation<T+V>[1]",
    "meta::pure::functions::relation::exclude<T,Z>(rel:Relation<T>[1], columns:Relation<Z>[1]):Relation<T-Z>[1]",
    "meta::pure::functions::relation::size<T>(rel:Relation<T>[1]):Integer[1]",
];

/// True when `package` is one of the always-visible core packages.
pub fn is_core_package(package: &str) -> bool {
    CORE_IMPORTS.contains(&package)
}

/// Register every native, owned by [`SourceUnitId::BUILTIN`].
pub fn register_natives(graph: &TypeGraph, registry: &mut FunctionRegistry) -> Result<Vec<FunctionId>, TypeError> {
    let ids = NATIVE_SIGNATURES
        .iter()
        .map(|text| {
            let signature = FunctionSignature::parse(graph, &[], text)?;
            registry.register(signature, SourceUnitId::BUILTIN)
        })
        .collect::<Result<Vec<_>, TypeError>>()?;
    debug!(count = ids.len(), "registered native functions");
    Ok(ids)
}

#[cfg(test)]
#[path = "../tests/natives_tests.rs"]
mod tests;
