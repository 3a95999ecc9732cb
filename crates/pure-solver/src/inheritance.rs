//! Type parameter resolution through inheritance.
//!
//! Given a concrete subtype and an ancestor, finds the ancestor in the
//! subtype's resolved supertype list and reads the bindings of the
//! ancestor's parameters off it. Also used to view a value as an instance
//! of one of its supertypes ([`homogenize`]) and to look up properties in
//! the context of a concrete owner.

use crate::diagnostics::TypeError;
use crate::generalization::all_super_types_including_self;
use crate::graph::TypeGraph;
use crate::instantiate::{TypeSubstitution, bind_type_arguments, instantiate, instantiate_multiplicity};
use crate::multiplicity::Multiplicity;
use crate::types::{GenericType, RawType, TypeData, TypeId, ValueType};
use tracing::trace;

/// Substitution that turns `ancestor` into the matching entry of
/// `subtype`'s supertype list.
///
/// The declared parameters of the ancestor's class are bound to the entry's
/// arguments. When `ancestor` carries argument templates (`Function<{T[1]->
/// Boolean[1]}>`), the parameters mentioned in them are bound too, descending
/// into function types and relation columns.
pub fn resolve_type_parameters_using_inheritance(
    graph: &TypeGraph,
    subtype: &GenericType,
    ancestor: &GenericType,
) -> Result<TypeSubstitution, TypeError> {
    if !subtype.is_fully_concrete() {
        return Err(TypeError::UnresolvedTypeArgument {
            subtype: graph.print(subtype),
            ancestor: graph.print(ancestor),
        });
    }
    let mut substitution = TypeSubstitution::new();
    let Some(ancestor_id) = ancestor.nominal_id() else {
        collect_bindings(graph, ancestor, subtype, &mut substitution)?;
        return Ok(substitution);
    };
    let Some(entry) = homogenize(graph, subtype, ancestor_id)? else {
        trace!(
            subtype = %graph.print(subtype),
            ancestor = %graph.print(ancestor),
            "ancestor not among supertypes"
        );
        return Ok(substitution);
    };
    // Parameters named in the ancestor's templates take precedence over the
    // class's declared parameter names.
    let mut templates = TypeSubstitution::new();
    collect_bindings(graph, ancestor, &entry, &mut templates)?;
    substitution.extend(bind_type_arguments(graph, &entry)?);
    substitution.extend(templates);
    Ok(substitution)
}

/// `value` viewed as an instance of `target`: the entry of its supertype
/// list whose raw type is `target`.
pub fn homogenize(
    graph: &TypeGraph,
    value: &GenericType,
    target: TypeId,
) -> Result<Option<GenericType>, TypeError> {
    if value.nominal_id() == Some(target) {
        return Ok(Some(value.clone()));
    }
    Ok(all_super_types_including_self(graph, value)?
        .into_iter()
        .find(|s| s.nominal_id() == Some(target)))
}

/// Walk `template` and `value` together, binding every parameter of
/// `template` to the part of `value` in the same position. The first
/// binding of a name wins.
pub fn collect_bindings(
    graph: &TypeGraph,
    template: &GenericType,
    value: &GenericType,
    substitution: &mut TypeSubstitution,
) -> Result<(), TypeError> {
    match (&template.raw, &value.raw) {
        (RawType::Parameter(name), _) => {
            if substitution.type_binding(name).is_none() {
                substitution.bind_type(name.clone(), value.clone());
            }
        }
        (RawType::Function(t), RawType::Function(v)) => {
            for (tp, vp) in t.parameters.iter().zip(&v.parameters) {
                collect_bindings(graph, &tp.generic_type, &vp.generic_type, substitution)?;
                collect_multiplicity_binding(&tp.multiplicity, &vp.multiplicity, substitution);
            }
            collect_bindings(graph, &t.return_type, &v.return_type, substitution)?;
            collect_multiplicity_binding(&t.return_multiplicity, &v.return_multiplicity, substitution);
        }
        (RawType::Relation(t), RawType::Relation(v)) => {
            for column in t.columns() {
                if let Some(actual) = v.column(&column.name) {
                    collect_bindings(graph, &column.generic_type, &actual.generic_type, substitution)?;
                }
            }
        }
        (RawType::Nominal(template_id), RawType::Nominal(_)) => {
            if template.type_arguments.is_empty() && template.multiplicity_arguments.is_empty() {
                return Ok(());
            }
            let Some(view) = homogenize(graph, value, *template_id)? else {
                return Ok(());
            };
            for (t, v) in template.type_arguments.iter().zip(&view.type_arguments) {
                collect_bindings(graph, t, v, substitution)?;
            }
            for (t, v) in template
                .multiplicity_arguments
                .iter()
                .zip(&view.multiplicity_arguments)
            {
                collect_multiplicity_binding(t, v, substitution);
            }
        }
        _ => {}
    }
    Ok(())
}

fn collect_multiplicity_binding(template: &Multiplicity, value: &Multiplicity, substitution: &mut TypeSubstitution) {
    if let Multiplicity::Parameter(name) = template
        && substitution.multiplicity_binding(name).is_none()
    {
        substitution.bind_multiplicity(name.clone(), value.clone());
    }
}

// =============================================================================
// Properties
// =============================================================================

/// Type of property `name` on `owner`, re-processed in the owner's context:
/// `value:Z[1]` on `MyClass<String>` is `String[1]`. Searches supertypes in
/// linearization order.
pub fn resolve_property(
    graph: &TypeGraph,
    owner: &GenericType,
    name: &str,
) -> Result<Option<ValueType>, TypeError> {
    for super_type in all_super_types_including_self(graph, owner)? {
        let Some(TypeData::Class(class)) = super_type.nominal_id().and_then(|id| graph.get(id)) else {
            continue;
        };
        let Some(property) = class.property(name) else {
            continue;
        };
        let substitution = bind_type_arguments(graph, &super_type)?;
        return Ok(Some(ValueType::new(
            instantiate(&property.generic_type, &substitution)?,
            instantiate_multiplicity(&property.multiplicity, &substitution),
        )));
    }
    Ok(None)
}

#[cfg(test)]
#[path = "../tests/inheritance_tests.rs"]
mod tests;
