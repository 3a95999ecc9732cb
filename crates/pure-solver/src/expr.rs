//! Expression trees handed to the inference engine.
//!
//! The front end builds these (in Rust or from a JSON model) with types
//! written as text; the engine fills in `inferred` on every node, the phase
//! and open variables of every lambda, and the chosen overload of every
//! call. Operator sugar is expanded by the builders: `a + b` is
//! `plus([a, b])` and `a->f(b)` is `f(a, b)`.

use crate::functions::FunctionId;
use crate::phase::InferencePhase;
use crate::types::{FunctionType, ValueType};
use pure_common::{Name, SourceRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Decimal(String),
    Boolean(bool),
    StrictDate(String),
    DateTime(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(default)]
    pub range: SourceRange,
    #[serde(skip)]
    pub inferred: Option<ValueType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Collection(Vec<Expr>),
    Variable(Name),
    Let {
        name: Name,
        value: Box<Expr>,
    },
    Lambda(Box<Lambda>),
    Call {
        function: Name,
        arguments: Vec<Expr>,
        #[serde(skip)]
        resolved: Option<FunctionId>,
    },
    Property {
        receiver: Box<Expr>,
        property: Name,
    },
    /// `^MyClass<T>(value = 'ok')`; the class is written as a type.
    New {
        class: String,
        #[serde(default)]
        assignments: Vec<PropertyAssignment>,
    },
    /// `Person` used as a value, typed `Class<Person>`.
    ClassReference(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyAssignment {
    pub property: Name,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LambdaParameter {
    pub name: Name,
    /// `String[1]`; absent when the type comes from the calling context.
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub range: SourceRange,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub parameters: Vec<LambdaParameter>,
    pub body: Vec<Expr>,
    #[serde(skip)]
    pub phase: InferencePhase,
    /// Sorted free variables of the body, filled in once the lambda is done.
    #[serde(skip)]
    pub open_variables: Vec<Name>,
    /// The lambda's type once it is done.
    #[serde(skip)]
    pub function_type: Option<FunctionType>,
}

// =============================================================================
// Builders
// =============================================================================

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            range: SourceRange::default(),
            inferred: None,
        }
    }

    pub fn at(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal(Literal::String(value.into())))
    }

    pub fn integer(value: i64) -> Self {
        Self::new(ExprKind::Literal(Literal::Integer(value)))
    }

    pub fn float(value: f64) -> Self {
        Self::new(ExprKind::Literal(Literal::Float(value)))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Literal(Literal::Boolean(value)))
    }

    pub fn collection(elements: Vec<Expr>) -> Self {
        Self::new(ExprKind::Collection(elements))
    }

    pub fn variable(name: impl Into<Name>) -> Self {
        Self::new(ExprKind::Variable(name.into()))
    }

    pub fn let_(name: impl Into<Name>, value: Expr) -> Self {
        Self::new(ExprKind::Let {
            name: name.into(),
            value: Box::new(value),
        })
    }

    pub fn lambda(parameters: Vec<LambdaParameter>, body: Vec<Expr>) -> Self {
        Self::new(ExprKind::Lambda(Box::new(Lambda::new(parameters, body))))
    }

    pub fn call(function: impl Into<Name>, arguments: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call {
            function: function.into(),
            arguments,
            resolved: None,
        })
    }

    /// `receiver->function(arguments)`
    pub fn arrow(receiver: Expr, function: impl Into<Name>, arguments: Vec<Expr>) -> Self {
        let mut all = Vec::with_capacity(arguments.len() + 1);
        all.push(receiver);
        all.extend(arguments);
        Self::call(function, all)
    }

    /// `left + right`
    pub fn plus(left: Expr, right: Expr) -> Self {
        let range = left.range.cover(&right.range);
        Self::call("plus", vec![Self::collection(vec![left, right]).at(range)]).at(range)
    }

    /// `left == right`
    pub fn equal(left: Expr, right: Expr) -> Self {
        let range = left.range.cover(&right.range);
        Self::call("equal", vec![left, right]).at(range)
    }

    pub fn property(receiver: Expr, property: impl Into<Name>) -> Self {
        Self::new(ExprKind::Property {
            receiver: Box::new(receiver),
            property: property.into(),
        })
    }

    pub fn new_instance(class: impl Into<String>, assignments: Vec<(&str, Expr)>) -> Self {
        Self::new(ExprKind::New {
            class: class.into(),
            assignments: assignments
                .into_iter()
                .map(|(property, value)| PropertyAssignment {
                    property: property.into(),
                    value,
                })
                .collect(),
        })
    }

    pub fn class_reference(class: impl Into<String>) -> Self {
        Self::new(ExprKind::ClassReference(class.into()))
    }

    /// The lambda inside this node, if it is one.
    pub fn as_lambda(&self) -> Option<&Lambda> {
        match &self.kind {
            ExprKind::Lambda(lambda) => Some(lambda),
            _ => None,
        }
    }

    /// Visit every node of the tree, parents first.
    pub fn walk<'e>(&'e self, f: &mut impl FnMut(&'e Expr)) {
        f(self);
        match &self.kind {
            ExprKind::Literal(_)
            | ExprKind::Variable(_)
            | ExprKind::ClassReference(_) => {}
            ExprKind::Collection(elements) => elements.iter().for_each(|e| e.walk(f)),
            ExprKind::Let { value, .. } => value.walk(f),
            ExprKind::Lambda(lambda) => lambda.body.iter().for_each(|e| e.walk(f)),
            ExprKind::Call { arguments, .. } => arguments.iter().for_each(|e| e.walk(f)),
            ExprKind::Property { receiver, .. } => receiver.walk(f),
            ExprKind::New { assignments, .. } => assignments.iter().for_each(|a| a.value.walk(f)),
        }
    }
}

impl LambdaParameter {
    pub fn untyped(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            value_type: None,
            range: SourceRange::default(),
        }
    }

    pub fn typed(name: impl Into<Name>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: Some(value_type.into()),
            range: SourceRange::default(),
        }
    }
}

// =============================================================================
// Open variables
// =============================================================================

impl Lambda {
    pub fn new(parameters: Vec<LambdaParameter>, body: Vec<Expr>) -> Self {
        Self {
            parameters,
            body,
            phase: InferencePhase::Unvisited,
            open_variables: Vec::new(),
            function_type: None,
        }
    }

    pub fn has_untyped_parameters(&self) -> bool {
        self.parameters.iter().any(|p| p.value_type.is_none())
    }

    /// Where to report missing parameter types: the first untyped
    /// parameter, or `fallback` when its position is unknown.
    pub fn untyped_range(&self, fallback: SourceRange) -> SourceRange {
        self.parameters
            .iter()
            .find(|p| p.value_type.is_none())
            .map(|p| p.range)
            .filter(|range| !range.is_unknown())
            .unwrap_or(fallback)
    }

    /// Variables the body reads that are bound neither by this lambda's
    /// parameters nor by a `let` inside it, sorted.
    pub fn compute_open_variables(&self) -> Vec<Name> {
        let mut bound: BTreeSet<Name> = self.parameters.iter().map(|p| p.name.clone()).collect();
        let mut open = BTreeSet::new();
        for expr in &self.body {
            collect_open(expr, &mut bound, &mut open);
        }
        open.into_iter().collect()
    }
}

fn collect_open(expr: &Expr, bound: &mut BTreeSet<Name>, open: &mut BTreeSet<Name>) {
    match &expr.kind {
        ExprKind::Variable(name) => {
            if !bound.contains(name) {
                open.insert(name.clone());
            }
        }
        ExprKind::Let { name, value } => {
            collect_open(value, bound, open);
            bound.insert(name.clone());
        }
        ExprKind::Lambda(lambda) => {
            for name in lambda.compute_open_variables() {
                if !bound.contains(&name) {
                    open.insert(name);
                }
            }
        }
        ExprKind::Literal(_) | ExprKind::ClassReference(_) => {}
        ExprKind::Collection(elements) => {
            for e in elements {
                collect_open(e, bound, open);
            }
        }
        ExprKind::Call { arguments, .. } => {
            for e in arguments {
                collect_open(e, bound, open);
            }
        }
        ExprKind::Property { receiver, .. } => collect_open(receiver, bound, open),
        ExprKind::New { assignments, .. } => {
            for a in assignments {
                collect_open(&a.value, bound, open);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/expr_tests.rs"]
mod tests;
