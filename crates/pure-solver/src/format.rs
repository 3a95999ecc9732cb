//! Printing types the way Pure writes them.
//!
//! - `Path<Arg1, Arg2|m1, m2>`; the suffix is omitted without arguments
//! - `{P1[m], P2[m]->R[m]}` for function types
//! - `(a:String, b:Integer)` for relation types
//! - `T+V` / `T-V` for pending relation operations
//!
//! Nominal types print by simple name unless full paths are requested.

use crate::graph::TypeGraph;
use crate::multiplicity::Multiplicity;
use crate::types::{FunctionType, GenericType, RawType, RelationType, TypeId, ValueType};
use std::fmt::Write;

pub struct TypeFormatter<'a> {
    graph: &'a TypeGraph,
    full_paths: bool,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(graph: &'a TypeGraph) -> Self {
        Self {
            graph,
            full_paths: false,
        }
    }

    pub fn with_full_paths(mut self) -> Self {
        self.full_paths = true;
        self
    }

    pub fn generic_type(&self, generic_type: &GenericType) -> String {
        let mut out = String::new();
        self.write_generic(&mut out, generic_type);
        out
    }

    /// `String[1]`
    pub fn value_type(&self, value: &ValueType) -> String {
        let mut out = String::new();
        self.write_generic(&mut out, &value.generic_type);
        write_multiplicity(&mut out, &value.multiplicity);
        out
    }

    pub fn function_type(&self, function_type: &FunctionType) -> String {
        let mut out = String::new();
        self.write_function(&mut out, function_type);
        out
    }

    pub fn relation_type(&self, relation_type: &RelationType) -> String {
        let mut out = String::new();
        self.write_relation(&mut out, relation_type);
        out
    }

    pub fn nominal(&self, id: TypeId) -> &'a str {
        if self.full_paths {
            self.graph.path(id)
        } else {
            self.graph.simple_name(id)
        }
    }

    fn write_generic(&self, out: &mut String, generic_type: &GenericType) {
        match &generic_type.raw {
            RawType::Nominal(id) => out.push_str(self.nominal(*id)),
            RawType::Parameter(name) => out.push_str(name),
            RawType::Function(f) => self.write_function(out, f),
            RawType::Relation(r) => self.write_relation(out, r),
            RawType::Operation(op) => {
                self.write_generic(out, &op.left);
                out.push(op.kind.symbol());
                self.write_generic(out, &op.right);
            }
        }
        let type_args = &generic_type.type_arguments;
        let mult_args = &generic_type.multiplicity_arguments;
        if type_args.is_empty() && mult_args.is_empty() {
            return;
        }
        out.push('<');
        for (i, arg) in type_args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_generic(out, arg);
        }
        if !mult_args.is_empty() {
            out.push('|');
            for (i, m) in mult_args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{m}");
            }
        }
        out.push('>');
    }

    fn write_function(&self, out: &mut String, function_type: &FunctionType) {
        out.push('{');
        for (i, param) in function_type.parameters.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_generic(out, &param.generic_type);
            write_multiplicity(out, &param.multiplicity);
        }
        out.push_str("->");
        self.write_generic(out, &function_type.return_type);
        write_multiplicity(out, &function_type.return_multiplicity);
        out.push('}');
    }

    fn write_relation(&self, out: &mut String, relation_type: &RelationType) {
        out.push('(');
        for (i, column) in relation_type.columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if needs_quotes(&column.name) {
                let _ = write!(out, "'{}'", column.name);
            } else {
                out.push_str(&column.name);
            }
            out.push(':');
            self.write_generic(out, &column.generic_type);
        }
        out.push(')');
    }
}

fn write_multiplicity(out: &mut String, multiplicity: &Multiplicity) {
    let _ = write!(out, "[{multiplicity}]");
}

fn needs_quotes(name: &str) -> bool {
    !name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl TypeGraph {
    /// Shorthand for `TypeFormatter::new(self).generic_type(..)`.
    pub fn print(&self, generic_type: &GenericType) -> String {
        TypeFormatter::new(self).generic_type(generic_type)
    }

    pub fn print_value(&self, value: &ValueType) -> String {
        TypeFormatter::new(self).value_type(value)
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
