// Dweve PCL - Parameter Chain Language
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Expression resolver: turns a typed declaration into an evaluation plan.
//!
//! Each value kind has a small positional grammar. The first token is
//! classified as a literal or a parameter name, then the following
//! operator token selects the form. At most one operator is accepted.

use crate::declaration::Declaration;
use crate::error::{ParamErrorKind, ParamResult};
use crate::errors::messages;
use crate::limits::Limits;
use crate::name::{ParamKey, ParamName};
use crate::parameter::{BinaryOp, Element, Operand, Plan, Ref};
use crate::token::{is_double, is_integer, is_quoted, parse_boolean, unquote, Tokens};
use crate::units::UnitTable;
use crate::value::{Value, ValueKind};
use ValueKind::{
    Boolean, BooleanVector, Double, DoubleVector, Integer, IntegerVector, StringVector, Unitless,
    UnitlessVector,
};

/// Pseudo-name that reads the same parameter from the parent file.
pub const INHERITED_VALUE: &str = "inheritedvalue";

/// Name lookups available while resolving one file.
pub(crate) trait Scope {
    /// Kind of `key` among the file's own declarations, then its ancestors.
    fn kind_of(&self, key: &ParamKey) -> Option<ValueKind>;

    /// Unit of `key` in the ancestors of the file, if dimensioned there.
    fn inherited_unit(&self, key: &ParamKey) -> Option<String>;
}

/// Plan and unit produced for one declaration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolved {
    pub plan: Plan,
    pub unit: Option<String>,
}

/// Resolve `decl` as a parameter of `kind`.
pub(crate) fn resolve(
    decl: &Declaration,
    kind: ValueKind,
    scope: &dyn Scope,
    limits: &Limits,
) -> ParamResult<Resolved> {
    let mut parser = Parser {
        decl,
        kind,
        scope,
        limits,
        units: UnitTable::global(),
        tokens: Tokens::new(&decl.raw_value),
    };
    parser.parse().map_err(|e| {
        let with_hint = matches!(
            e.kind,
            ParamErrorKind::InvalidValue
                | ParamErrorKind::TrailingTokens
                | ParamErrorKind::TypeMismatch
                | ParamErrorKind::MissingUnit
        ) && e.hint.is_none();
        let e = e
            .with_parameter(format!(
                "{}{}:{}",
                kind.prefix(),
                if decl.changeable { "c" } else { "" },
                decl.name
            ))
            .with_value(decl.raw_value.as_str())
            .with_line(decl.line);
        if with_hint {
            e.with_hint(messages::grammar_hint(kind))
        } else {
            e
        }
    })
}

struct Parser<'a> {
    decl: &'a Declaration,
    kind: ValueKind,
    scope: &'a dyn Scope,
    limits: &'a Limits,
    units: &'static UnitTable,
    tokens: Tokens,
}

fn binary(lhs: Operand, op: BinaryOp, rhs: Operand) -> Plan {
    Plan::Binary { lhs, op, rhs }
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> ParamResult<Resolved> {
        if self.tokens.is_empty() {
            return Err(messages::empty_value());
        }
        let resolved = match self.kind {
            Double => self.parse_double()?,
            Unitless => self.parse_unitless()?,
            Integer => self.parse_integer()?,
            Boolean => self.parse_boolean()?,
            ValueKind::String => self.parse_string()?,
            DoubleVector => self.parse_double_vector()?,
            UnitlessVector => self.parse_unitless_vector()?,
            IntegerVector => self.parse_integer_vector()?,
            BooleanVector => self.parse_boolean_vector()?,
            StringVector => self.parse_string_vector()?,
        };
        self.finish()?;
        Ok(resolved)
    }

    // ==================== Token helpers ====================

    /// Anything left over must start with the comment character.
    fn finish(&mut self) -> ParamResult<()> {
        match self.tokens.next_token() {
            Some(token) if !token.starts_with('#') => {
                Err(messages::trailing_tokens(self.kind.is_vector()))
            }
            _ => Ok(()),
        }
    }

    /// Consume the next token if it is one of `ops`.
    fn operator(&mut self, ops: &[&str]) -> Option<BinaryOp> {
        let token = self.tokens.peek()?;
        if !ops.contains(&token) {
            return None;
        }
        let op = BinaryOp::from_token(token);
        self.tokens.next_token();
        op
    }

    fn is_self_reference(&self, token: &str) -> bool {
        token.eq_ignore_ascii_case(INHERITED_VALUE)
            || ParamKey::new(token) == *self.decl.name.key()
    }

    /// Kind of a name token as seen from this file.
    fn kind_of(&self, token: &str) -> Option<ValueKind> {
        if self.is_self_reference(token) {
            return Some(self.kind);
        }
        self.scope.kind_of(&ParamKey::new(token))
    }

    fn is_ref_of(&self, token: &str, kinds: &[ValueKind]) -> bool {
        self.kind_of(token).map_or(false, |k| kinds.contains(&k))
    }

    /// A reference operand of one of `kinds`.
    fn reference(&self, token: &str, kinds: &[ValueKind]) -> ParamResult<Ref> {
        if token.is_empty() {
            return Err(messages::missing_operand("in expression"));
        }
        if self.is_self_reference(token) {
            return Ok(Ref::Inherited);
        }
        match self.scope.kind_of(&ParamKey::new(token)) {
            None => Err(messages::unknown_reference(token)),
            Some(found) if !kinds.contains(&found) => {
                Err(messages::wrong_reference_kind(token, found, kinds))
            }
            Some(_) => Ok(Ref::Named(ParamName::new(token))),
        }
    }

    fn next_reference(&mut self, kinds: &[ValueKind]) -> ParamResult<Ref> {
        let token = self.tokens.take();
        self.reference(&token, kinds)
    }

    fn number(&self, token: &str) -> ParamResult<f64> {
        if !is_double(token) {
            return Err(messages::not_a_number(token));
        }
        token.parse::<f64>().map_err(|_| messages::not_a_number(token))
    }

    fn integer(&self, token: &str) -> ParamResult<i64> {
        if !is_integer(token) {
            return Err(messages::not_an_integer(token));
        }
        token
            .trim_start_matches('+')
            .parse::<i64>()
            .map_err(|_| messages::not_an_integer(token))
    }

    /// Validate a unit token and return it with its factor.
    fn unit(&self, token: &str) -> ParamResult<(String, f64)> {
        if token.is_empty() || token.starts_with('#') {
            return Err(messages::missing_unit());
        }
        if is_double(token) {
            return Err(messages::number_where_unit_expected(token));
        }
        let def = self
            .units
            .lookup(token)
            .ok_or_else(|| messages::unrecognized_unit(token))?;
        if let Some(parent) = self.scope.inherited_unit(self.decl.name.key()) {
            if let Some(parent_category) = self.units.category(&parent) {
                if parent_category != def.category {
                    return Err(messages::unit_differs_from_parent(
                        token,
                        &def.category,
                        parent_category,
                    ));
                }
            }
        }
        Ok((token.to_string(), def.factor))
    }

    fn next_unit(&mut self) -> ParamResult<(String, f64)> {
        let token = self.tokens.take();
        self.unit(&token)
    }

    fn with_unit(plan: Plan, unit: String) -> Resolved {
        Resolved {
            plan,
            unit: Some(unit),
        }
    }

    fn unitless(plan: Plan) -> Resolved {
        Resolved { plan, unit: None }
    }

    // ==================== Scalar grammars ====================

    fn parse_double(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_double(&v1) {
            let num = self.number(&v1)?;
            if self.operator(&["*"]).is_some() {
                // number * name_of_double unit
                let rhs = self.next_reference(&[Double])?;
                let (unit, _) = self.next_unit()?;
                let plan = binary(
                    Operand::Literal(Value::Unitless(num)),
                    BinaryOp::Multiply,
                    Operand::Param(rhs),
                );
                return Ok(Self::with_unit(plan, unit));
            }
            let (unit, factor) = self.next_unit()?;
            let lhs = Operand::Literal(Value::Double(num * factor));
            let plan = if let Some(op) = self.operator(&["+", "-"]) {
                binary(lhs, op, Operand::Param(self.next_reference(&[Double])?))
            } else if self.operator(&["*"]).is_some() {
                let rhs = self.next_reference(&[Unitless, Integer])?;
                binary(lhs, BinaryOp::Multiply, Operand::Param(rhs))
            } else {
                Plan::Literal(Value::Double(num * factor))
            };
            return Ok(Self::with_unit(plan, unit));
        }

        if let Some(op) = self.operator(&["+", "-"]) {
            let lhs = Operand::Param(self.reference(&v1, &[Double])?);
            let v2 = self.tokens.take();
            let plan = if is_double(&v2) {
                // name_of_double +- number unit
                let num = self.number(&v2)?;
                let (unit, factor) = self.next_unit()?;
                return Ok(Self::with_unit(
                    binary(lhs, op, Operand::Literal(Value::Double(num * factor))),
                    unit,
                ));
            } else {
                binary(lhs, op, Operand::Param(self.reference(&v2, &[Double])?))
            };
            let (unit, _) = self.next_unit()?;
            return Ok(Self::with_unit(plan, unit));
        }

        if self.operator(&["*"]).is_some() {
            // name_of_unitless_or_integer * number unit
            let lhs = Operand::Param(self.reference(&v1, &[Unitless, Integer])?);
            let num_token = self.tokens.take();
            let num = self.number(&num_token)?;
            let (unit, factor) = self.next_unit()?;
            let plan = binary(
                lhs,
                BinaryOp::Multiply,
                Operand::Literal(Value::Double(num * factor)),
            );
            return Ok(Self::with_unit(plan, unit));
        }

        let lhs = self.reference(&v1, &[Double])?;
        let (unit, _) = self.next_unit()?;
        let plan = if self.operator(&["*"]).is_some() {
            let v2 = self.tokens.take();
            let rhs = if is_double(&v2) {
                Operand::Literal(Value::Unitless(self.number(&v2)?))
            } else {
                Operand::Param(self.reference(&v2, &[Unitless, Integer])?)
            };
            binary(Operand::Param(lhs), BinaryOp::Multiply, rhs)
        } else {
            Plan::Reference(lhs)
        };
        Ok(Self::with_unit(plan, unit))
    }

    fn parse_unitless(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_double(&v1) {
            let lhs = Value::Unitless(self.number(&v1)?);
            let plan = match self.operator(&["+", "-", "*"]) {
                Some(op) => binary(
                    Operand::Literal(lhs),
                    op,
                    Operand::Param(self.next_reference(&[Unitless, Integer])?),
                ),
                None => Plan::Literal(lhs),
            };
            return Ok(Self::unitless(plan));
        }

        let lhs = self.reference(&v1, &[Unitless, Integer])?;
        let plan = match self.operator(&["+", "-", "*"]) {
            Some(op) => {
                let v2 = self.tokens.take();
                let rhs = if is_double(&v2) {
                    Operand::Literal(Value::Unitless(self.number(&v2)?))
                } else {
                    Operand::Param(self.reference(&v2, &[Unitless, Integer])?)
                };
                binary(Operand::Param(lhs), op, rhs)
            }
            None => Plan::Reference(lhs),
        };
        Ok(Self::unitless(plan))
    }

    fn parse_integer(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_double(&v1) {
            let lhs = Value::Integer(self.integer(&v1)?);
            let plan = if let Some(op) = self.operator(&["+", "-"]) {
                binary(
                    Operand::Literal(lhs),
                    op,
                    Operand::Param(self.next_reference(&[Integer])?),
                )
            } else if self.operator(&["*"]).is_some() {
                binary(
                    Operand::Literal(lhs),
                    BinaryOp::Multiply,
                    Operand::Param(self.next_reference(&[Integer, Unitless])?),
                )
            } else {
                Plan::Literal(lhs)
            };
            return Ok(Self::unitless(plan));
        }

        let plan = match self.operator(&["+", "-", "*"]) {
            Some(op) => {
                let lhs = Operand::Param(self.reference(&v1, &[Integer])?);
                let v2 = self.tokens.take();
                let rhs = if is_double(&v2) {
                    Operand::Literal(Value::Integer(self.integer(&v2)?))
                } else if op == BinaryOp::Multiply {
                    Operand::Param(self.reference(&v2, &[Integer, Unitless])?)
                } else {
                    Operand::Param(self.reference(&v2, &[Integer])?)
                };
                binary(lhs, op, rhs)
            }
            None => Plan::Reference(self.reference(&v1, &[Integer, Unitless])?),
        };
        Ok(Self::unitless(plan))
    }

    fn parse_boolean(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if self.is_ref_of(&v1, &[Boolean]) {
            let lhs = self.reference(&v1, &[Boolean])?;
            let plan = if self.operator(&["*"]).is_some() {
                let rhs = self.next_reference(&[Boolean])?;
                binary(Operand::Param(lhs), BinaryOp::Multiply, Operand::Param(rhs))
            } else {
                Plan::Reference(lhs)
            };
            return Ok(Self::unitless(plan));
        }

        match parse_boolean(&v1) {
            Some(b) => Ok(Self::unitless(Plan::Literal(Value::Boolean(b)))),
            None if is_quoted(&v1) || !v1.contains('/') => Err(messages::not_a_boolean(&v1)),
            None => match self.reference(&v1, &[Boolean]) {
                Err(e) => Err(e),
                Ok(_) => Err(messages::not_a_boolean(&v1)),
            },
        }
    }

    fn parse_string(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if v1.starts_with('"') {
            let text = self.string_literal(&v1)?;
            let plan = if self.operator(&["+"]).is_some() {
                let rhs = self.next_reference(&[Integer, ValueKind::String])?;
                binary(Operand::Literal(Value::String(text)), BinaryOp::Add, Operand::Param(rhs))
            } else {
                Plan::Literal(Value::String(text))
            };
            return Ok(Self::unitless(plan));
        }

        let lhs = self.reference(&v1, &[Integer, ValueKind::String])?;
        let plan = if self.operator(&["+"]).is_some() {
            let v2 = self.tokens.take();
            let rhs = if v2.starts_with('"') {
                Operand::Literal(Value::String(self.string_literal(&v2)?))
            } else {
                Operand::Param(self.reference(&v2, &[Integer, ValueKind::String])?)
            };
            binary(Operand::Param(lhs), BinaryOp::Add, rhs)
        } else {
            Plan::Reference(lhs)
        };
        Ok(Self::unitless(plan))
    }

    fn string_literal(&self, token: &str) -> ParamResult<String> {
        if !is_quoted(token) {
            return Err(messages::unterminated_string());
        }
        Ok(unquote(token).to_string())
    }

    // ==================== Vector helpers ====================

    /// Parse a declared element count.
    fn count(&self, token: &str) -> ParamResult<usize> {
        if !is_integer(token) {
            return Err(messages::vector_count_not_integer(token));
        }
        let n = token
            .trim_start_matches('+')
            .parse::<i64>()
            .map_err(|_| messages::vector_count_not_integer(token))?;
        if n < 0 {
            return Err(messages::vector_count_negative());
        }
        if n < 1 {
            return Err(messages::vector_count_zero());
        }
        let n = n as usize;
        if n > self.limits.max_vector_length {
            return Err(messages::vector_too_long(n, self.limits.max_vector_length));
        }
        Ok(n)
    }

    /// Take `count` raw value tokens.
    fn values(&mut self, count: usize) -> ParamResult<Vec<String>> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            match self.tokens.next_token() {
                Some(token) => values.push(token.to_string()),
                None => return Err(messages::vector_too_few_values(count, values.len())),
            }
        }
        Ok(values)
    }

    /// Classify one vector element of scalar kind `kind`.
    fn element(&self, token: &str, kind: ValueKind, factor: f64) -> ParamResult<Element> {
        let element = match kind {
            Double if is_double(token) => {
                Element::Literal(Value::Double(self.number(token)? * factor))
            }
            Double => Element::Param(self.reference(token, &[Double])?),
            Unitless if is_double(token) => Element::Literal(Value::Unitless(self.number(token)?)),
            Unitless => Element::Param(self.reference(token, &[Unitless, Integer])?),
            Integer if is_double(token) => Element::Literal(Value::Integer(self.integer(token)?)),
            Integer => Element::Param(self.reference(token, &[Integer])?),
            Boolean => match parse_boolean(token) {
                Some(b) => Element::Literal(Value::Boolean(b)),
                None => Element::Param(self.reference(token, &[Boolean])?),
            },
            ValueKind::String if token.starts_with('"') => {
                Element::Literal(Value::String(self.string_literal(token)?))
            }
            ValueKind::String if self.is_ref_of(token, &[ValueKind::String, Integer]) => {
                Element::Param(self.reference(token, &[ValueKind::String, Integer])?)
            }
            ValueKind::String => Element::Literal(Value::String(token.to_string())),
            _ => Element::Param(self.reference(token, &[kind])?),
        };
        Ok(element)
    }

    /// Build a list of vector kind `kind` from raw tokens.
    fn list(
        &self,
        raw: &[String],
        kind: ValueKind,
        factor: f64,
    ) -> ParamResult<(Option<Value>, Vec<Element>)> {
        let elements = raw
            .iter()
            .map(|t| self.element(t, kind.scalar(), factor))
            .collect::<ParamResult<Vec<_>>>()?;
        Ok((literal_vector(kind, &elements), elements))
    }

    fn list_operand(
        &self,
        raw: &[String],
        kind: ValueKind,
        factor: f64,
    ) -> ParamResult<Operand> {
        let (literal, elements) = self.list(raw, kind, factor)?;
        Ok(match literal {
            Some(value) => Operand::Literal(value),
            None => Operand::List { kind, elements },
        })
    }

    fn list_plan(
        &self,
        raw: &[String],
        kind: ValueKind,
        factor: f64,
    ) -> ParamResult<Plan> {
        let (literal, elements) = self.list(raw, kind, factor)?;
        Ok(match literal {
            Some(value) => Plan::Literal(value),
            None => Plan::List { kind, elements },
        })
    }

    /// Reject a quoted first token where the element count belongs.
    fn require_count_first(&self, v1: &str) -> ParamResult<()> {
        if v1.starts_with('"') {
            return Err(messages::vector_count_not_integer(v1));
        }
        Ok(())
    }

    // ==================== Vector grammars ====================

    fn parse_double_vector(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_double(&v1) {
            if self.operator(&["*"]).is_some() {
                // number * name_of_double_vector unit
                let scale = self.number(&v1)?;
                let rhs = self.next_reference(&[DoubleVector])?;
                let (unit, _) = self.next_unit()?;
                let plan = binary(
                    Operand::Literal(Value::Unitless(scale)),
                    BinaryOp::Multiply,
                    Operand::Param(rhs),
                );
                return Ok(Self::with_unit(plan, unit));
            }

            let count = self.count(&v1)?;
            let raw = self.values(count)?;

            if self.operator(&["*"]).is_some() {
                // N v1 .. vN * name_of_double_or_double_vector unit
                let rhs = self.next_reference(&[Double, DoubleVector])?;
                let (unit, _) = self.next_unit()?;
                let lhs = self.list_operand(&raw, UnitlessVector, 1.0)?;
                return Ok(Self::with_unit(
                    binary(lhs, BinaryOp::Multiply, Operand::Param(rhs)),
                    unit,
                ));
            }

            let (unit, factor) = self.next_unit()?;
            let plan = if let Some(op) = self.operator(&["+", "-"]) {
                let rhs = self.next_reference(&[Double, DoubleVector])?;
                binary(self.list_operand(&raw, DoubleVector, factor)?, op, Operand::Param(rhs))
            } else if self.operator(&["*"]).is_some() {
                let rhs =
                    self.next_reference(&[Unitless, Integer, UnitlessVector, IntegerVector])?;
                binary(
                    self.list_operand(&raw, DoubleVector, factor)?,
                    BinaryOp::Multiply,
                    Operand::Param(rhs),
                )
            } else {
                self.list_plan(&raw, DoubleVector, factor)?
            };
            return Ok(Self::with_unit(plan, unit));
        }

        self.require_count_first(&v1)?;
        if self.operator(&["*"]).is_some() {
            if self.is_ref_of(&v1, &[DoubleVector]) {
                // name_of_double_vector * N s1 .. sN unit
                let lhs = self.reference(&v1, &[DoubleVector])?;
                let count_token = self.tokens.take();
                let count = self.count(&count_token)?;
                let raw = self.values(count)?;
                let (unit, _) = self.next_unit()?;
                let rhs = self.list_operand(&raw, UnitlessVector, 1.0)?;
                return Ok(Self::with_unit(
                    binary(Operand::Param(lhs), BinaryOp::Multiply, rhs),
                    unit,
                ));
            }
            // name_of_unitless_or_integer * name_of_double_vector unit
            let lhs = self.reference(&v1, &[Unitless, Integer])?;
            let rhs = self.next_reference(&[DoubleVector])?;
            let (unit, _) = self.next_unit()?;
            return Ok(Self::with_unit(
                binary(Operand::Param(lhs), BinaryOp::Multiply, Operand::Param(rhs)),
                unit,
            ));
        }

        let lhs = self.reference(&v1, &[DoubleVector])?;
        let (unit, _) = self.next_unit()?;
        Ok(Self::with_unit(Plan::Reference(lhs), unit))
    }

    fn parse_unitless_vector(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_double(&v1) {
            if self.operator(&["*"]).is_some() {
                let scale = self.number(&v1)?;
                let rhs = self.next_reference(&[UnitlessVector])?;
                return Ok(Self::unitless(binary(
                    Operand::Literal(Value::Unitless(scale)),
                    BinaryOp::Multiply,
                    Operand::Param(rhs),
                )));
            }
            let count = self.count(&v1)?;
            let raw = self.values(count)?;
            let plan = match self.operator(&["+", "-", "*"]) {
                Some(op) => {
                    let rhs =
                        self.next_reference(&[Unitless, Integer, UnitlessVector, IntegerVector])?;
                    binary(self.list_operand(&raw, UnitlessVector, 1.0)?, op, Operand::Param(rhs))
                }
                None => self.list_plan(&raw, UnitlessVector, 1.0)?,
            };
            return Ok(Self::unitless(plan));
        }

        self.require_count_first(&v1)?;
        let plan = if self.operator(&["*"]).is_some() {
            let lhs = self.reference(&v1, &[Unitless, Integer])?;
            let rhs = self.next_reference(&[UnitlessVector])?;
            binary(Operand::Param(lhs), BinaryOp::Multiply, Operand::Param(rhs))
        } else {
            Plan::Reference(self.reference(&v1, &[UnitlessVector])?)
        };
        Ok(Self::unitless(plan))
    }

    fn parse_integer_vector(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_integer(&v1) {
            if self.operator(&["*"]).is_some() {
                let scale = self.integer(&v1)?;
                let rhs = self.next_reference(&[IntegerVector])?;
                return Ok(Self::unitless(binary(
                    Operand::Literal(Value::Integer(scale)),
                    BinaryOp::Multiply,
                    Operand::Param(rhs),
                )));
            }
            let count = self.count(&v1)?;
            let raw = self.values(count)?;
            let plan = match self.operator(&["+", "-", "*"]) {
                Some(op) => {
                    let rhs = self.next_reference(&[Integer, IntegerVector])?;
                    binary(self.list_operand(&raw, IntegerVector, 1.0)?, op, Operand::Param(rhs))
                }
                None => self.list_plan(&raw, IntegerVector, 1.0)?,
            };
            return Ok(Self::unitless(plan));
        }
        if is_double(&v1) {
            return Err(messages::vector_count_not_integer(&v1));
        }

        self.require_count_first(&v1)?;
        let plan = if self.operator(&["*"]).is_some() {
            let lhs = self.reference(&v1, &[Integer])?;
            let rhs = self.next_reference(&[IntegerVector])?;
            binary(Operand::Param(lhs), BinaryOp::Multiply, Operand::Param(rhs))
        } else {
            Plan::Reference(self.reference(&v1, &[IntegerVector])?)
        };
        Ok(Self::unitless(plan))
    }

    fn parse_boolean_vector(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_integer(&v1) {
            let count = self.count(&v1)?;
            let raw = self.values(count)?;
            return Ok(Self::unitless(self.list_plan(&raw, BooleanVector, 1.0)?));
        }
        self.require_count_first(&v1)?;
        Ok(Self::unitless(Plan::Reference(
            self.reference(&v1, &[BooleanVector])?,
        )))
    }

    fn parse_string_vector(&mut self) -> ParamResult<Resolved> {
        let v1 = self.tokens.take();
        if is_integer(&v1) {
            let count = self.count(&v1)?;
            let raw = self.values(count)?;
            let plan = if self.operator(&["+"]).is_some() {
                let rhs = self.next_reference(&[Integer, ValueKind::String, IntegerVector, StringVector])?;
                binary(
                    self.list_operand(&raw, StringVector, 1.0)?,
                    BinaryOp::Add,
                    Operand::Param(rhs),
                )
            } else {
                self.list_plan(&raw, StringVector, 1.0)?
            };
            return Ok(Self::unitless(plan));
        }
        self.require_count_first(&v1)?;
        Ok(Self::unitless(Plan::Reference(
            self.reference(&v1, &[StringVector])?,
        )))
    }
}

/// Collapse an all-literal element list into a vector value.
fn literal_vector(kind: ValueKind, elements: &[Element]) -> Option<Value> {
    let literals: Vec<&Value> = elements
        .iter()
        .map(|e| match e {
            Element::Literal(v) => Some(v),
            Element::Param(_) => None,
        })
        .collect::<Option<Vec<_>>>()?;
    let value = match kind {
        DoubleVector => Value::DoubleVector(literals.iter().filter_map(|v| v.as_f64()).collect()),
        UnitlessVector => {
            Value::UnitlessVector(literals.iter().filter_map(|v| v.as_f64()).collect())
        }
        IntegerVector => Value::IntegerVector(literals.iter().filter_map(|v| v.as_i64()).collect()),
        BooleanVector => {
            Value::BooleanVector(literals.iter().filter_map(|v| v.as_bool()).collect())
        }
        StringVector => Value::StringVector(
            literals
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;
    use std::collections::HashMap;

    struct MapScope {
        kinds: HashMap<ParamKey, ValueKind>,
        units: HashMap<ParamKey, String>,
    }

    impl MapScope {
        fn new(entries: &[(&str, ValueKind)]) -> Self {
            Self {
                kinds: entries
                    .iter()
                    .map(|(n, k)| (ParamKey::new(n), *k))
                    .collect(),
                units: HashMap::new(),
            }
        }

        fn with_unit(mut self, name: &str, unit: &str) -> Self {
            self.units.insert(ParamKey::new(name), unit.to_string());
            self
        }
    }

    impl Scope for MapScope {
        fn kind_of(&self, key: &ParamKey) -> Option<ValueKind> {
            self.kinds.get(key).copied()
        }

        fn inherited_unit(&self, key: &ParamKey) -> Option<String> {
            self.units.get(key).cloned()
        }
    }

    fn decl(name: &str, value: &str) -> Declaration {
        Declaration {
            name: ParamName::new(name),
            kind: None,
            raw_value: value.to_string(),
            changeable: false,
            must_be_absolute: false,
            line: 1,
        }
    }

    fn ok(kind: ValueKind, value: &str, scope: &MapScope) -> Resolved {
        resolve(&decl("X/Target", value), kind, scope, &Limits::default()).unwrap()
    }

    fn err(kind: ValueKind, value: &str, scope: &MapScope) -> ParamError {
        resolve(&decl("X/Target", value), kind, scope, &Limits::default()).unwrap_err()
    }

    fn named(name: &str) -> Operand {
        Operand::Param(Ref::Named(ParamName::new(name)))
    }

    fn empty() -> MapScope {
        MapScope::new(&[])
    }

    // ==================== Double grammar tests ====================

    #[test]
    fn test_double_literal() {
        let r = ok(Double, "5 cm", &empty());
        assert_eq!(r.plan, Plan::Literal(Value::Double(50.0)));
        assert_eq!(r.unit.as_deref(), Some("cm"));
    }

    #[test]
    fn test_double_literal_plus_name() {
        let scope = MapScope::new(&[("Ge/A", Double)]);
        let r = ok(Double, "2 mm + Ge/A", &scope);
        assert_eq!(
            r.plan,
            binary(Operand::Literal(Value::Double(2.0)), BinaryOp::Add, named("Ge/A"))
        );
    }

    #[test]
    fn test_double_number_times_name_unit() {
        let scope = MapScope::new(&[("Ge/A", Double)]);
        let r = ok(Double, "0.5 * Ge/A cm", &scope);
        assert_eq!(
            r.plan,
            binary(Operand::Literal(Value::Unitless(0.5)), BinaryOp::Multiply, named("Ge/A"))
        );
        assert_eq!(r.unit.as_deref(), Some("cm"));
    }

    #[test]
    fn test_double_name_plus_number_unit() {
        let scope = MapScope::new(&[("X", Double)]);
        let r = ok(Double, "X + 3 cm", &scope);
        assert_eq!(
            r.plan,
            binary(named("X"), BinaryOp::Add, Operand::Literal(Value::Double(30.0)))
        );
        assert_eq!(r.unit.as_deref(), Some("cm"));
    }

    #[test]
    fn test_double_name_minus_name_unit() {
        let scope = MapScope::new(&[("A", Double), ("B", Double)]);
        let r = ok(Double, "A - B mm", &scope);
        assert_eq!(r.plan, binary(named("A"), BinaryOp::Subtract, named("B")));
    }

    #[test]
    fn test_double_name_unit_times_number() {
        let scope = MapScope::new(&[("A", Double)]);
        let r = ok(Double, "A mm * 2", &scope);
        assert_eq!(
            r.plan,
            binary(named("A"), BinaryOp::Multiply, Operand::Literal(Value::Unitless(2.0)))
        );
    }

    #[test]
    fn test_double_unitless_times_number_unit() {
        let scope = MapScope::new(&[("U", Unitless)]);
        let r = ok(Double, "U * 2 m", &scope);
        assert_eq!(
            r.plan,
            binary(named("U"), BinaryOp::Multiply, Operand::Literal(Value::Double(2000.0)))
        );
    }

    #[test]
    fn test_double_reference() {
        let scope = MapScope::new(&[("A", Double)]);
        let r = ok(Double, "A m", &scope);
        assert_eq!(r.plan, Plan::Reference(Ref::Named(ParamName::new("A"))));
    }

    #[test]
    fn test_double_inherited_value() {
        let r = ok(Double, "InheritedValue mm * 2", &empty());
        assert_eq!(
            r.plan,
            binary(
                Operand::Param(Ref::Inherited),
                BinaryOp::Multiply,
                Operand::Literal(Value::Unitless(2.0))
            )
        );
        let r = ok(Double, "x/target + 1 mm", &empty());
        assert!(matches!(r.plan, Plan::Binary { lhs: Operand::Param(Ref::Inherited), .. }));
    }

    #[test]
    fn test_double_missing_unit() {
        let e = err(Double, "5", &empty());
        assert_eq!(e.kind, ParamErrorKind::MissingUnit);
        assert!(e.hint.as_deref().unwrap().starts_with("Double parameters"));
    }

    #[test]
    fn test_double_unrecognized_unit() {
        assert_eq!(err(Double, "5 furlong", &empty()).kind, ParamErrorKind::UnrecognizedUnit);
    }

    #[test]
    fn test_double_unit_against_parent() {
        let scope = empty().with_unit("X/Target", "m");
        assert!(resolve(&decl("X/Target", "5 cm"), Double, &scope, &Limits::default()).is_ok());
        let e = err(Double, "5 s", &scope);
        assert_eq!(e.kind, ParamErrorKind::UnitCategoryMismatch);
    }

    #[test]
    fn test_double_unknown_reference() {
        let e = err(Double, "Nope/Missing + 3 cm", &empty());
        assert_eq!(e.kind, ParamErrorKind::UnknownReference);
        assert_eq!(e.parameter.as_deref(), Some("d:X/Target"));
        assert_eq!(e.value.as_deref(), Some("Nope/Missing + 3 cm"));
    }

    #[test]
    fn test_double_wrong_reference_kind() {
        let scope = MapScope::new(&[("S", ValueKind::String)]);
        let e = err(Double, "S m", &scope);
        assert_eq!(e.kind, ParamErrorKind::TypeMismatch);
        assert!(e.hint.is_some());
    }

    #[test]
    fn test_double_trailing_tokens() {
        let e = err(Double, "5 cm 7", &empty());
        assert_eq!(e.kind, ParamErrorKind::TrailingTokens);
        assert!(!e.message.contains("stated length"));
    }

    #[test]
    fn test_double_comment_token_allowed() {
        assert!(resolve(&decl("X", "5 cm #note"), Double, &empty(), &Limits::default()).is_ok());
    }

    #[test]
    fn test_second_operator_rejected() {
        let scope = MapScope::new(&[("A", Double), ("B", Double)]);
        let e = err(Double, "A + 1 mm + B", &scope);
        assert_eq!(e.kind, ParamErrorKind::TrailingTokens);
    }

    // ==================== Unitless and integer grammar tests ====================

    #[test]
    fn test_unitless_forms() {
        let scope = MapScope::new(&[("U", Unitless), ("I", Integer)]);
        assert_eq!(ok(Unitless, "2.5", &scope).plan, Plan::Literal(Value::Unitless(2.5)));
        assert_eq!(
            ok(Unitless, "3 * I", &scope).plan,
            binary(Operand::Literal(Value::Unitless(3.0)), BinaryOp::Multiply, named("I"))
        );
        assert_eq!(
            ok(Unitless, "U - 1", &scope).plan,
            binary(named("U"), BinaryOp::Subtract, Operand::Literal(Value::Unitless(1.0)))
        );
        assert_eq!(
            ok(Unitless, "U * I", &scope).plan,
            binary(named("U"), BinaryOp::Multiply, named("I"))
        );
        assert_eq!(ok(Unitless, "I", &scope).plan, Plan::Reference(Ref::Named("I".into())));
        assert!(ok(Unitless, "U", &scope).unit.is_none());
    }

    #[test]
    fn test_unitless_unknown_reference() {
        let e = err(Unitless, "3 * name_that_does_not_exist", &empty());
        assert_eq!(e.kind, ParamErrorKind::UnknownReference);
    }

    #[test]
    fn test_integer_forms() {
        let scope = MapScope::new(&[("I", Integer), ("U", Unitless)]);
        assert_eq!(ok(Integer, "7", &scope).plan, Plan::Literal(Value::Integer(7)));
        assert_eq!(
            ok(Integer, "2 * U", &scope).plan,
            binary(Operand::Literal(Value::Integer(2)), BinaryOp::Multiply, named("U"))
        );
        assert_eq!(
            ok(Integer, "I + 1", &scope).plan,
            binary(named("I"), BinaryOp::Add, Operand::Literal(Value::Integer(1)))
        );
        assert_eq!(ok(Integer, "U", &scope).plan, Plan::Reference(Ref::Named("U".into())));
    }

    #[test]
    fn test_integer_rejects_real_literal() {
        assert_eq!(err(Integer, "2.5", &empty()).kind, ParamErrorKind::InvalidValue);
    }

    #[test]
    fn test_integer_plus_unitless_rejected() {
        let scope = MapScope::new(&[("U", Unitless)]);
        assert_eq!(err(Integer, "1 + U", &scope).kind, ParamErrorKind::TypeMismatch);
    }

    // ==================== Boolean and string grammar tests ====================

    #[test]
    fn test_boolean_forms() {
        let scope = MapScope::new(&[("B", Boolean), ("C", Boolean)]);
        assert_eq!(ok(Boolean, "\"True\"", &scope).plan, Plan::Literal(Value::Boolean(true)));
        assert_eq!(ok(Boolean, "\"f\"", &scope).plan, Plan::Literal(Value::Boolean(false)));
        assert_eq!(
            ok(Boolean, "B * C", &scope).plan,
            binary(named("B"), BinaryOp::Multiply, named("C"))
        );
        assert_eq!(ok(Boolean, "B", &scope).plan, Plan::Reference(Ref::Named("B".into())));
    }

    #[test]
    fn test_boolean_invalid() {
        assert_eq!(err(Boolean, "\"maybe\"", &empty()).kind, ParamErrorKind::InvalidValue);
        assert_eq!(err(Boolean, "Ts/Missing", &empty()).kind, ParamErrorKind::UnknownReference);
    }

    #[test]
    fn test_string_forms() {
        let scope = MapScope::new(&[("S", ValueKind::String), ("I", Integer)]);
        assert_eq!(
            ok(ValueKind::String, "\"G4_WATER\"", &scope).plan,
            Plan::Literal(Value::String("G4_WATER".into()))
        );
        assert_eq!(
            ok(ValueKind::String, "\"Run \" + I", &scope).plan,
            binary(Operand::Literal(Value::String("Run ".into())), BinaryOp::Add, named("I"))
        );
        assert_eq!(
            ok(ValueKind::String, "S + \".csv\"", &scope).plan,
            binary(named("S"), BinaryOp::Add, Operand::Literal(Value::String(".csv".into())))
        );
        assert_eq!(ok(ValueKind::String, "S + I", &scope).plan, binary(named("S"), BinaryOp::Add, named("I")));
    }

    #[test]
    fn test_string_with_spaces() {
        let r = ok(ValueKind::String, "\"Hello World\"", &empty());
        assert_eq!(r.plan, Plan::Literal(Value::String("Hello World".into())));
    }

    #[test]
    fn test_string_unterminated() {
        assert_eq!(err(ValueKind::String, "\"open", &empty()).kind, ParamErrorKind::InvalidValue);
    }

    // ==================== Vector grammar tests ====================

    #[test]
    fn test_double_vector_literal() {
        let r = ok(DoubleVector, "3 1 2 3 mm", &empty());
        assert_eq!(r.plan, Plan::Literal(Value::DoubleVector(vec![1.0, 2.0, 3.0])));
        let r = ok(DoubleVector, "2 1 2 cm", &empty());
        assert_eq!(r.plan, Plan::Literal(Value::DoubleVector(vec![10.0, 20.0])));
    }

    #[test]
    fn test_double_vector_with_named_element() {
        let scope = MapScope::new(&[("Ge/A", Double)]);
        let r = ok(DoubleVector, "2 Ge/A 4 mm", &scope);
        assert_eq!(
            r.plan,
            Plan::List {
                kind: DoubleVector,
                elements: vec![
                    Element::Param(Ref::Named("Ge/A".into())),
                    Element::Literal(Value::Double(4.0)),
                ],
            }
        );
    }

    #[test]
    fn test_double_vector_name_times_list() {
        let scope = MapScope::new(&[("V", DoubleVector)]);
        let r = ok(DoubleVector, "V * 3 1 2 3 m", &scope);
        assert_eq!(
            r.plan,
            binary(
                named("V"),
                BinaryOp::Multiply,
                Operand::Literal(Value::UnitlessVector(vec![1.0, 2.0, 3.0]))
            )
        );
        assert_eq!(r.unit.as_deref(), Some("m"));
    }

    #[test]
    fn test_double_vector_list_plus_name() {
        let scope = MapScope::new(&[("D", Double)]);
        let r = ok(DoubleVector, "2 1 2 cm + D", &scope);
        assert_eq!(
            r.plan,
            binary(
                Operand::Literal(Value::DoubleVector(vec![10.0, 20.0])),
                BinaryOp::Add,
                named("D")
            )
        );
    }

    #[test]
    fn test_double_vector_scale_forms() {
        let scope = MapScope::new(&[("V", DoubleVector), ("U", Unitless)]);
        assert!(matches!(ok(DoubleVector, "2 * V mm", &scope).plan, Plan::Binary { .. }));
        assert!(matches!(ok(DoubleVector, "U * V mm", &scope).plan, Plan::Binary { .. }));
        assert!(matches!(ok(DoubleVector, "V mm", &scope).plan, Plan::Reference(_)));
    }

    #[test]
    fn test_double_vector_number_where_unit_expected() {
        let e = err(DoubleVector, "2 1 2 3 mm", &empty());
        assert_eq!(e.kind, ParamErrorKind::MissingUnit);
    }

    #[test]
    fn test_vector_count_errors() {
        assert_eq!(err(UnitlessVector, "0", &empty()).kind, ParamErrorKind::InvalidValue);
        assert!(err(UnitlessVector, "-1 4", &empty()).message.contains("negative"));
        assert!(err(UnitlessVector, "1.5 4", &empty()).message.contains("non-integer"));
        assert!(err(StringVector, "\"a\" \"b\"", &empty()).message.contains("non-integer"));
        assert!(err(IntegerVector, "3 1 2", &empty()).message.contains("only 2"));
    }

    #[test]
    fn test_vector_too_long() {
        let limits = Limits {
            max_vector_length: 2,
            ..Limits::default()
        };
        let e = resolve(&decl("X", "3 1 2 3"), UnitlessVector, &empty(), &limits).unwrap_err();
        assert_eq!(e.kind, ParamErrorKind::Security);
    }

    #[test]
    fn test_vector_trailing_tokens_note() {
        let e = err(UnitlessVector, "2 1 2 3", &empty());
        assert_eq!(e.kind, ParamErrorKind::TrailingTokens);
        assert!(e.message.contains("stated length"));
    }

    #[test]
    fn test_unitless_vector_ops() {
        let scope = MapScope::new(&[("UV", UnitlessVector), ("I", Integer)]);
        assert_eq!(
            ok(UnitlessVector, "2 1 2 * UV", &scope).plan,
            binary(
                Operand::Literal(Value::UnitlessVector(vec![1.0, 2.0])),
                BinaryOp::Multiply,
                named("UV")
            )
        );
        assert!(matches!(ok(UnitlessVector, "I * UV", &scope).plan, Plan::Binary { .. }));
    }

    #[test]
    fn test_integer_vector_forms() {
        let scope = MapScope::new(&[("IV", IntegerVector), ("I", Integer)]);
        assert_eq!(
            ok(IntegerVector, "3 4 5 6", &scope).plan,
            Plan::Literal(Value::IntegerVector(vec![4, 5, 6]))
        );
        assert_eq!(
            ok(IntegerVector, "2 * IV", &scope).plan,
            binary(Operand::Literal(Value::Integer(2)), BinaryOp::Multiply, named("IV"))
        );
        assert_eq!(
            ok(IntegerVector, "2 1 2 - I", &scope).plan,
            binary(
                Operand::Literal(Value::IntegerVector(vec![1, 2])),
                BinaryOp::Subtract,
                named("I")
            )
        );
    }

    #[test]
    fn test_boolean_vector_forms() {
        let scope = MapScope::new(&[("BV", BooleanVector)]);
        assert_eq!(
            ok(BooleanVector, "2 \"True\" \"False\"", &scope).plan,
            Plan::Literal(Value::BooleanVector(vec![true, false]))
        );
        assert_eq!(ok(BooleanVector, "BV", &scope).plan, Plan::Reference(Ref::Named("BV".into())));
    }

    #[test]
    fn test_string_vector_forms() {
        let scope = MapScope::new(&[("S", ValueKind::String)]);
        assert_eq!(
            ok(StringVector, "2 \"g4em-standard_opt4\" \"g4decay\"", &scope).plan,
            Plan::Literal(Value::StringVector(vec![
                "g4em-standard_opt4".into(),
                "g4decay".into()
            ]))
        );
        assert_eq!(
            ok(StringVector, "2 \"a\" \"b\" + S", &scope).plan,
            binary(
                Operand::Literal(Value::StringVector(vec!["a".into(), "b".into()])),
                BinaryOp::Add,
                named("S")
            )
        );
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(err(Unitless, "   ", &empty()).kind, ParamErrorKind::InvalidValue);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let scope = MapScope::new(&[("X", Double)]);
        assert_eq!(ok(Double, "X + 3 cm", &scope), ok(Double, "X + 3 cm", &scope));
    }
}
