//! Type representation.
//!
//! Nominal types (primitives, classes, `Any`, `Nil`) live in the
//! [`TypeGraph`](crate::graph::TypeGraph) arena and are referenced by
//! [`TypeId`]. Structural types (function types, relation types, pending
//! relation operations) are shared through `Arc` and compared by value.
//!
//! A [`GenericType`] pairs a shared raw type with *owned* argument lists:
//! cloning a generic type deep-copies its arguments but never duplicates the
//! raw type it points at.

use crate::multiplicity::Multiplicity;
use pure_common::Name;
use smallvec::SmallVec;
use std::sync::Arc;

// =============================================================================
// TypeId - Arena handle for nominal types
// =============================================================================

/// Handle of a nominal type in the [`TypeGraph`](crate::graph::TypeGraph).
///
/// Built-in types occupy fixed slots so they can be named by constant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ANY: Self = Self(0);
    pub const NIL: Self = Self(1);
    pub const STRING: Self = Self(2);
    pub const BOOLEAN: Self = Self(3);
    pub const NUMBER: Self = Self(4);
    pub const INTEGER: Self = Self(5);
    pub const FLOAT: Self = Self(6);
    pub const DECIMAL: Self = Self(7);
    pub const DATE: Self = Self(8);
    pub const STRICT_DATE: Self = Self(9);
    pub const DATE_TIME: Self = Self(10);
    pub const LATEST_DATE: Self = Self(11);
    pub const FUNCTION: Self = Self(12);
    pub const LAMBDA_FUNCTION: Self = Self(13);
    pub const RELATION: Self = Self(14);
    pub const CLASS: Self = Self(15);

    /// First slot available to user-declared types.
    pub const FIRST_USER: u32 = 16;

    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

// =============================================================================
// Nominal type data
// =============================================================================

/// A declared type parameter, e.g. `T` or `-T` (contravariant).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    pub name: Name,
    pub contravariant: bool,
}

impl TypeParameter {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            contravariant: false,
        }
    }

    pub fn contravariant(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            contravariant: true,
        }
    }
}

/// A class property with its declared type and multiplicity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: Name,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

/// A primitive type. Primitives never carry type parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveType {
    pub path: Name,
    /// Direct supertypes; empty means `Any`.
    pub generalizations: SmallVec<[TypeId; 1]>,
}

/// A class declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassType {
    pub path: Name,
    pub type_parameters: Vec<TypeParameter>,
    pub multiplicity_parameters: Vec<Name>,
    /// Declared supertypes in `extends` order, expressed in terms of this
    /// class's own parameters. Empty means `Any`.
    pub generalizations: Vec<GenericType>,
    pub properties: Vec<PropertyInfo>,
}

impl ClassType {
    pub fn new(path: impl Into<Name>) -> Self {
        Self {
            path: path.into(),
            type_parameters: Vec::new(),
            multiplicity_parameters: Vec::new(),
            generalizations: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn has_generics(&self) -> bool {
        !self.type_parameters.is_empty() || !self.multiplicity_parameters.is_empty()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| &*p.name == name)
    }
}

/// Data stored for each nominal type in the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeData {
    /// `Any`: supertype of everything.
    Top,
    /// `Nil`: subtype of everything.
    Bottom,
    Primitive(PrimitiveType),
    Class(ClassType),
}

impl TypeData {
    pub fn path(&self) -> &str {
        match self {
            TypeData::Top => "Any",
            TypeData::Bottom => "Nil",
            TypeData::Primitive(p) => &p.path,
            TypeData::Class(c) => &c.path,
        }
    }

    pub fn type_parameters(&self) -> &[TypeParameter] {
        match self {
            TypeData::Class(c) => &c.type_parameters,
            _ => &[],
        }
    }

    pub fn multiplicity_parameters(&self) -> &[Name] {
        match self {
            TypeData::Class(c) => &c.multiplicity_parameters,
            _ => &[],
        }
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            TypeData::Class(c) => Some(c),
            _ => None,
        }
    }
}

// =============================================================================
// Structural types
// =============================================================================

/// One parameter slot of a function type.
#[derive(Clone, Debug)]
pub struct FunctionParameter {
    pub name: Option<Name>,
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

impl FunctionParameter {
    pub fn new(generic_type: GenericType, multiplicity: Multiplicity) -> Self {
        Self {
            name: None,
            generic_type,
            multiplicity,
        }
    }

    pub fn named(name: impl Into<Name>, generic_type: GenericType, multiplicity: Multiplicity) -> Self {
        Self {
            name: Some(name.into()),
            generic_type,
            multiplicity,
        }
    }
}

/// Parameter names are documentation only; two slots are equal when their
/// types and multiplicities are.
impl PartialEq for FunctionParameter {
    fn eq(&self, other: &Self) -> bool {
        self.generic_type == other.generic_type && self.multiplicity == other.multiplicity
    }
}

impl Eq for FunctionParameter {}

/// `{P1[m1], P2[m2]->R[m]}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionType {
    pub parameters: Vec<FunctionParameter>,
    pub return_type: GenericType,
    pub return_multiplicity: Multiplicity,
}

impl FunctionType {
    pub fn new(
        parameters: Vec<FunctionParameter>,
        return_type: GenericType,
        return_multiplicity: Multiplicity,
    ) -> Self {
        Self {
            parameters,
            return_type,
            return_multiplicity,
        }
    }
}

/// A named, typed relation column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: Name,
    pub generic_type: GenericType,
}

impl Column {
    pub fn new(name: impl Into<Name>, generic_type: GenericType) -> Self {
        Self {
            name: name.into(),
            generic_type,
        }
    }
}

/// A row type: ordered columns with unique names.
///
/// Constructed through [`RelationType::new`](crate::relation), which rejects
/// duplicate names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationType {
    pub(crate) columns: Vec<Column>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOperationKind {
    /// `T+V`
    Union,
    /// `T-V`
    Difference,
}

impl TypeOperationKind {
    pub fn symbol(self) -> char {
        match self {
            TypeOperationKind::Union => '+',
            TypeOperationKind::Difference => '-',
        }
    }
}

/// A relation operation written in a signature (`Relation<T+V>`), evaluated
/// once both operands are concrete relation types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeOperation {
    pub left: GenericType,
    pub kind: TypeOperationKind,
    pub right: GenericType,
}

// =============================================================================
// GenericType
// =============================================================================

/// What a generic type points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawType {
    Nominal(TypeId),
    Function(Arc<FunctionType>),
    Relation(Arc<RelationType>),
    /// Unevaluated relation operation; not concrete.
    Operation(Arc<TypeOperation>),
    /// Unresolved type parameter; not concrete.
    Parameter(Name),
}

/// A raw type plus owned type and multiplicity arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericType {
    pub raw: RawType,
    pub type_arguments: Vec<GenericType>,
    pub multiplicity_arguments: Vec<Multiplicity>,
}

impl GenericType {
    pub fn nominal(id: TypeId) -> Self {
        Self {
            raw: RawType::Nominal(id),
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
        }
    }

    pub fn applied(
        id: TypeId,
        type_arguments: Vec<GenericType>,
        multiplicity_arguments: Vec<Multiplicity>,
    ) -> Self {
        Self {
            raw: RawType::Nominal(id),
            type_arguments,
            multiplicity_arguments,
        }
    }

    pub fn parameter(name: impl Into<Name>) -> Self {
        Self {
            raw: RawType::Parameter(name.into()),
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
        }
    }

    pub fn function(function_type: FunctionType) -> Self {
        Self::from_raw(RawType::Function(Arc::new(function_type)))
    }

    pub fn relation(relation_type: RelationType) -> Self {
        Self::from_raw(RawType::Relation(Arc::new(relation_type)))
    }

    pub fn operation(left: GenericType, kind: TypeOperationKind, right: GenericType) -> Self {
        Self::from_raw(RawType::Operation(Arc::new(TypeOperation { left, kind, right })))
    }

    pub fn from_raw(raw: RawType) -> Self {
        Self {
            raw,
            type_arguments: Vec::new(),
            multiplicity_arguments: Vec::new(),
        }
    }

    pub fn any() -> Self {
        Self::nominal(TypeId::ANY)
    }

    pub fn nil() -> Self {
        Self::nominal(TypeId::NIL)
    }

    /// `LambdaFunction<{...}>`
    pub fn lambda(function_type: FunctionType) -> Self {
        Self::applied(
            TypeId::LAMBDA_FUNCTION,
            vec![GenericType::function(function_type)],
            Vec::new(),
        )
    }

    /// `Relation<(...)>`
    pub fn relation_of(relation_type: RelationType) -> Self {
        Self::applied(
            TypeId::RELATION,
            vec![GenericType::relation(relation_type)],
            Vec::new(),
        )
    }

    /// Concrete means the raw type is known (not a parameter or a pending
    /// operation). Arguments may still be non-concrete.
    pub fn is_concrete(&self) -> bool {
        !matches!(self.raw, RawType::Parameter(_) | RawType::Operation(_))
    }

    /// Concrete all the way down, including arguments and function slots.
    pub fn is_fully_concrete(&self) -> bool {
        match &self.raw {
            RawType::Parameter(_) | RawType::Operation(_) => false,
            RawType::Nominal(_) => {
                self.type_arguments.iter().all(GenericType::is_fully_concrete)
                    && self.multiplicity_arguments.iter().all(Multiplicity::is_concrete)
            }
            RawType::Function(f) => {
                f.parameters.iter().all(|p| {
                    p.generic_type.is_fully_concrete() && p.multiplicity.is_concrete()
                }) && f.return_type.is_fully_concrete()
                    && f.return_multiplicity.is_concrete()
            }
            RawType::Relation(r) => r.columns.iter().all(|c| c.generic_type.is_fully_concrete()),
        }
    }

    pub fn type_parameter_name(&self) -> Option<&Name> {
        match &self.raw {
            RawType::Parameter(name) => Some(name),
            _ => None,
        }
    }

    pub fn nominal_id(&self) -> Option<TypeId> {
        match self.raw {
            RawType::Nominal(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_function_type(&self) -> Option<&FunctionType> {
        match &self.raw {
            RawType::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_relation_type(&self) -> Option<&RelationType> {
        match &self.raw {
            RawType::Relation(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        self.raw == RawType::Nominal(TypeId::ANY)
    }

    pub fn is_nil(&self) -> bool {
        self.raw == RawType::Nominal(TypeId::NIL)
    }

    /// Visit every type parameter name referenced anywhere inside this type.
    pub fn for_each_type_parameter(&self, f: &mut impl FnMut(&Name)) {
        match &self.raw {
            RawType::Parameter(name) => f(name),
            RawType::Nominal(_) => {}
            RawType::Function(ft) => {
                for p in &ft.parameters {
                    p.generic_type.for_each_type_parameter(f);
                }
                ft.return_type.for_each_type_parameter(f);
            }
            RawType::Relation(rt) => {
                for c in &rt.columns {
                    c.generic_type.for_each_type_parameter(f);
                }
            }
            RawType::Operation(op) => {
                op.left.for_each_type_parameter(f);
                op.right.for_each_type_parameter(f);
            }
        }
        for arg in &self.type_arguments {
            arg.for_each_type_parameter(f);
        }
    }

    /// Visit every multiplicity parameter name referenced inside this type.
    pub fn for_each_multiplicity_parameter(&self, f: &mut impl FnMut(&Name)) {
        for m in &self.multiplicity_arguments {
            if let Multiplicity::Parameter(name) = m {
                f(name);
            }
        }
        match &self.raw {
            RawType::Function(ft) => {
                for p in &ft.parameters {
                    if let Multiplicity::Parameter(name) = &p.multiplicity {
                        f(name);
                    }
                    p.generic_type.for_each_multiplicity_parameter(f);
                }
                if let Multiplicity::Parameter(name) = &ft.return_multiplicity {
                    f(name);
                }
                ft.return_type.for_each_multiplicity_parameter(f);
            }
            RawType::Relation(rt) => {
                for c in &rt.columns {
                    c.generic_type.for_each_multiplicity_parameter(f);
                }
            }
            RawType::Operation(op) => {
                op.left.for_each_multiplicity_parameter(f);
                op.right.for_each_multiplicity_parameter(f);
            }
            RawType::Nominal(_) | RawType::Parameter(_) => {}
        }
        for arg in &self.type_arguments {
            arg.for_each_multiplicity_parameter(f);
        }
    }

    /// Visit every nominal type referenced inside this type.
    pub fn for_each_nominal(&self, f: &mut impl FnMut(TypeId)) {
        match &self.raw {
            RawType::Nominal(id) => f(*id),
            RawType::Parameter(_) => {}
            RawType::Function(ft) => {
                for p in &ft.parameters {
                    p.generic_type.for_each_nominal(f);
                }
                ft.return_type.for_each_nominal(f);
            }
            RawType::Relation(rt) => {
                for c in &rt.columns {
                    c.generic_type.for_each_nominal(f);
                }
            }
            RawType::Operation(op) => {
                op.left.for_each_nominal(f);
                op.right.for_each_nominal(f);
            }
        }
        for arg in &self.type_arguments {
            arg.for_each_nominal(f);
        }
    }
}

/// A generic type together with the multiplicity of the value it types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueType {
    pub generic_type: GenericType,
    pub multiplicity: Multiplicity,
}

impl ValueType {
    pub fn new(generic_type: GenericType, multiplicity: Multiplicity) -> Self {
        Self {
            generic_type,
            multiplicity,
        }
    }

    pub fn one(generic_type: GenericType) -> Self {
        Self::new(generic_type, Multiplicity::ONE)
    }

    /// Type of the empty collection `[]`.
    pub fn empty() -> Self {
        Self::new(GenericType::nil(), Multiplicity::ZERO)
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
