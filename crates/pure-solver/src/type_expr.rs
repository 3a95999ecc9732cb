//! Type expressions and function signatures as written in source.
//!
//! Grammar:
//!
//! ```text
//! type       := primary (('+' | '-') primary)*
//! primary    := '{' (value_type (',' value_type)*)? '->' value_type '}'
//!             | '(' (column (',' column)*)? ')'
//!             | path ('<' type_args? ('|' mult_args)? '>')?
//! column     := (ident | quoted) ':' type
//! value_type := type '[' multiplicity ']'
//! header     := path ('<' type_params? ('|' idents)? '>')?
//! signature  := header '(' (ident ':' value_type (',' ...)*)? ')' ':' value_type
//! ```
//!
//! Parsing produces unresolved [`TypeExpr`] trees; names are bound to graph
//! types or type parameters by [`lower`](crate::lower).

use crate::diagnostics::TypeError;
use crate::multiplicity::Multiplicity;
use crate::types::{TypeOperationKind, TypeParameter};
use pure_common::Name;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    Path {
        path: Name,
        type_arguments: Vec<TypeExpr>,
        multiplicity_arguments: Vec<Multiplicity>,
    },
    Function {
        parameters: Vec<ValueTypeExpr>,
        return_type: Box<ValueTypeExpr>,
    },
    Relation {
        columns: Vec<(Name, TypeExpr)>,
    },
    Operation {
        left: Box<TypeExpr>,
        kind: TypeOperationKind,
        right: Box<TypeExpr>,
    },
}

/// `Type[multiplicity]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueTypeExpr {
    pub type_expr: TypeExpr,
    pub multiplicity: Multiplicity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterExpr {
    pub name: Name,
    pub value_type: ValueTypeExpr,
}

/// `pkg::name<T, U|m>(p:T[*]):U[m]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureExpr {
    pub path: Name,
    pub type_parameters: Vec<TypeParameter>,
    pub multiplicity_parameters: Vec<Name>,
    pub parameters: Vec<ParameterExpr>,
    pub return_type: ValueTypeExpr,
}

/// `pkg::MyClass<T, -U|m>`; also the head of a function signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassHeaderExpr {
    pub path: Name,
    pub type_parameters: Vec<TypeParameter>,
    pub multiplicity_parameters: Vec<Name>,
}

pub fn parse_type(text: &str) -> Result<TypeExpr, TypeError> {
    let mut parser = Parser::new(text);
    let result = parser.parse_type()?;
    parser.expect_end()?;
    Ok(result)
}

pub fn parse_value_type(text: &str) -> Result<ValueTypeExpr, TypeError> {
    let mut parser = Parser::new(text);
    let result = parser.parse_value_type()?;
    parser.expect_end()?;
    Ok(result)
}

pub fn parse_signature(text: &str) -> Result<SignatureExpr, TypeError> {
    let mut parser = Parser::new(text);
    let result = parser.parse_signature()?;
    parser.expect_end()?;
    Ok(result)
}

pub fn parse_class_header(text: &str) -> Result<ClassHeaderExpr, TypeError> {
    let mut parser = Parser::new(text);
    let result = parser.parse_class_header()?;
    parser.expect_end()?;
    Ok(result)
}

/// `T` or `-T` (contravariant).
pub fn parse_type_parameter(text: &str) -> Result<TypeParameter, TypeError> {
    let mut parser = Parser::new(text);
    let result = parser.parse_type_parameter()?;
    parser.expect_end()?;
    Ok(result)
}

pub fn parse_multiplicity(text: &str) -> Result<Multiplicity, TypeError> {
    text.parse::<Multiplicity>().map_err(|e| TypeError::Parse {
        text: text.to_string(),
        offset: 0,
        message: e.to_string(),
    })
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> TypeError {
        TypeError::Parse {
            text: self.text.to_string(),
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn at(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        self.rest().starts_with(token)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.at(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), TypeError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{token}'")))
        }
    }

    fn expect_end(&mut self) -> Result<(), TypeError> {
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(self.error(format!("unexpected '{c}'"))),
        }
    }

    fn identifier(&mut self) -> Result<&'a str, TypeError> {
        self.skip_whitespace();
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' => {}
            _ => return Err(self.error("expected identifier")),
        }
        let end = chars
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        Ok(&rest[..end])
    }

    fn path(&mut self) -> Result<Name, TypeError> {
        let start = {
            self.skip_whitespace();
            self.pos
        };
        self.identifier()?;
        while self.rest().starts_with("::") {
            self.pos += 2;
            self.identifier()?;
        }
        Ok(self.text[start..self.pos].into())
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeExpr, TypeError> {
        let mut left = self.parse_primary()?;
        loop {
            let kind = if self.at("->") {
                break;
            } else if self.eat("+") {
                TypeOperationKind::Union
            } else if self.eat("-") {
                TypeOperationKind::Difference
            } else {
                break;
            };
            let right = self.parse_primary()?;
            left = TypeExpr::Operation {
                left: Box::new(left),
                kind,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<TypeExpr, TypeError> {
        match self.peek() {
            Some('{') => self.parse_function_type(),
            Some('(') => self.parse_relation_type(),
            Some(_) => {
                let path = self.path()?;
                let (type_arguments, multiplicity_arguments) = if self.eat("<") {
                    self.parse_arguments()?
                } else {
                    (Vec::new(), Vec::new())
                };
                Ok(TypeExpr::Path {
                    path,
                    type_arguments,
                    multiplicity_arguments,
                })
            }
            None => Err(self.error("expected type")),
        }
    }

    /// After `<`: `A, B|m, n>`
    fn parse_arguments(&mut self) -> Result<(Vec<TypeExpr>, Vec<Multiplicity>), TypeError> {
        let mut types = Vec::new();
        let mut multiplicities = Vec::new();
        if !self.at("|") && !self.at(">") {
            loop {
                types.push(self.parse_type()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        if self.eat("|") {
            loop {
                multiplicities.push(self.parse_bare_multiplicity()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(">")?;
        Ok((types, multiplicities))
    }

    fn parse_bare_multiplicity(&mut self) -> Result<Multiplicity, TypeError> {
        self.skip_whitespace();
        let rest = self.rest();
        let end = rest.find([',', '>', ']']).unwrap_or(rest.len());
        let token = rest[..end].trim();
        let multiplicity = token
            .parse::<Multiplicity>()
            .map_err(|e| self.error(e.to_string()))?;
        self.pos += end;
        Ok(multiplicity)
    }

    fn parse_multiplicity(&mut self) -> Result<Multiplicity, TypeError> {
        self.expect("[")?;
        let multiplicity = self.parse_bare_multiplicity()?;
        self.expect("]")?;
        Ok(multiplicity)
    }

    fn parse_value_type(&mut self) -> Result<ValueTypeExpr, TypeError> {
        let type_expr = self.parse_type()?;
        let multiplicity = self.parse_multiplicity()?;
        Ok(ValueTypeExpr {
            type_expr,
            multiplicity,
        })
    }

    fn parse_function_type(&mut self) -> Result<TypeExpr, TypeError> {
        self.expect("{")?;
        let mut parameters = Vec::new();
        if !self.at("->") {
            loop {
                parameters.push(self.parse_value_type()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect("->")?;
        let return_type = self.parse_value_type()?;
        self.expect("}")?;
        Ok(TypeExpr::Function {
            parameters,
            return_type: Box::new(return_type),
        })
    }

    fn parse_relation_type(&mut self) -> Result<TypeExpr, TypeError> {
        self.expect("(")?;
        let mut columns = Vec::new();
        if !self.at(")") {
            loop {
                let name = self.parse_column_name()?;
                self.expect(":")?;
                let column_type = self.parse_type()?;
                columns.push((name, column_type));
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        Ok(TypeExpr::Relation { columns })
    }

    fn parse_column_name(&mut self) -> Result<Name, TypeError> {
        if self.eat("'") {
            let rest = self.rest();
            let end = rest
                .find('\'')
                .ok_or_else(|| self.error("unterminated quoted column name"))?;
            let name: Name = rest[..end].into();
            self.pos += end + 1;
            Ok(name)
        } else {
            Ok(self.identifier()?.into())
        }
    }

    // -------------------------------------------------------------------------
    // Signatures
    // -------------------------------------------------------------------------

    fn parse_type_parameter(&mut self) -> Result<TypeParameter, TypeError> {
        let contravariant = self.eat("-");
        let name: Name = self.identifier()?.into();
        Ok(TypeParameter {
            name,
            contravariant,
        })
    }

    fn parse_class_header(&mut self) -> Result<ClassHeaderExpr, TypeError> {
        let path = self.path()?;
        let mut type_parameters = Vec::new();
        let mut multiplicity_parameters = Vec::new();
        if self.eat("<") {
            if !self.at("|") && !self.at(">") {
                loop {
                    type_parameters.push(self.parse_type_parameter()?);
                    if !self.eat(",") {
                        break;
                    }
                }
            }
            if self.eat("|") {
                loop {
                    multiplicity_parameters.push(self.identifier()?.into());
                    if !self.eat(",") {
                        break;
                    }
                }
            }
            self.expect(">")?;
        }
        Ok(ClassHeaderExpr {
            path,
            type_parameters,
            multiplicity_parameters,
        })
    }

    fn parse_signature(&mut self) -> Result<SignatureExpr, TypeError> {
        let ClassHeaderExpr {
            path,
            type_parameters,
            multiplicity_parameters,
        } = self.parse_class_header()?;
        self.expect("(")?;
        let mut parameters = Vec::new();
        if !self.at(")") {
            loop {
                let name: Name = self.identifier()?.into();
                self.expect(":")?;
                let value_type = self.parse_value_type()?;
                parameters.push(ParameterExpr { name, value_type });
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")")?;
        self.expect(":")?;
        let return_type = self.parse_value_type()?;
        Ok(SignatureExpr {
            path,
            type_parameters,
            multiplicity_parameters,
            parameters,
            return_type,
        })
    }
}

#[cfg(test)]
#[path = "../tests/type_expr_tests.rs"]
mod tests;
