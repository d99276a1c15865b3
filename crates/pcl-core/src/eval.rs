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

//! Evaluation of resolved parameters.
//!
//! Plans are evaluated on every read. Named references are looked up
//! through the whole chain, so an edit to any parameter is seen by every
//! parameter that reads it. Each evaluation records the changeable
//! parameters it touched, which is what dependency tracking is built on.

use crate::error::ParamResult;
use crate::errors::messages;
use crate::graph::Graph;
use crate::limits::Limits;
use crate::name::ParamKey;
use crate::parameter::{BinaryOp, Element, Operand, ParamId, Parameter, Plan, Ref};
use crate::time_feature::TimeInputs;
use crate::units::UnitTable;
use crate::value::{Value, ValueKind};

/// Evaluates parameters of one graph, tracking what each read touched.
pub(crate) struct Evaluator<'g> {
    graph: &'g Graph,
    max_depth: usize,
    depth: usize,
    touched: Vec<ParamId>,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g Graph, limits: &Limits) -> Self {
        Self {
            graph,
            max_depth: limits.max_evaluation_depth,
            depth: 0,
            touched: Vec::new(),
        }
    }

    /// Changeable parameters read so far, each once.
    pub fn touched(&self) -> &[ParamId] {
        &self.touched
    }

    pub fn lookup(&self, name: &str) -> ParamResult<ParamId> {
        self.graph
            .find_global(&ParamKey::new(name))
            .ok_or_else(|| messages::undefined(name))
    }

    /// Value of `name`, whatever its kind.
    pub fn value_of(&mut self, name: &str) -> ParamResult<Value> {
        let id = self.lookup(name)?;
        self.evaluate(id)
    }

    /// Value of `name`, which must be of `kind`.
    pub fn typed(&mut self, name: &str, kind: ValueKind) -> ParamResult<Value> {
        let id = self.lookup(name)?;
        let found = self.graph.param(id).kind;
        if found != kind {
            return Err(messages::wrong_kind(name, kind, found));
        }
        self.evaluate(id)
    }

    /// Value of the dimensioned parameter `name` in internal units,
    /// checking that its unit belongs to `category`.
    pub fn dimensioned(&mut self, name: &str, kind: ValueKind, category: &str) -> ParamResult<Value> {
        let id = self.lookup(name)?;
        let param = self.graph.param(id);
        if param.kind != kind {
            return Err(messages::wrong_kind(name, kind, param.kind));
        }
        let found = param
            .unit()
            .and_then(|u| UnitTable::global().category(u))
            .unwrap_or("");
        if found != category {
            return Err(messages::wrong_category(name, category, found));
        }
        self.evaluate(id)
    }

    pub fn evaluate(&mut self, id: ParamId) -> ParamResult<Value> {
        if self.depth >= self.max_depth {
            return Err(messages::evaluation_too_deep(self.max_depth));
        }
        self.depth += 1;
        let result = self.compute(id);
        self.depth -= 1;
        result
    }

    fn compute(&mut self, id: ParamId) -> ParamResult<Value> {
        let graph = self.graph;
        let param = graph.param(id);
        param.mark_used();
        if param.changeable && !self.touched.contains(&id) {
            self.touched.push(id);
        }

        let value = match &param.plan {
            Plan::Literal(value) => value.clone(),
            Plan::List { kind, elements } => self.list(param, *kind, elements)?,
            Plan::Reference(reference) => {
                let target = self.target(param, reference)?;
                self.evaluate(target)?
            }
            Plan::Binary { lhs, op, rhs } => {
                let left = self.operand(param, lhs)?;
                let right = self.operand(param, rhs)?;
                combine(param.kind, left, *op, right, &operand_name(param, rhs))?
            }
            Plan::TimeFeature(base) => {
                let feature = graph
                    .feature(base)
                    .ok_or_else(|| messages::undefined(param.name.as_str()))?;
                feature.evaluate(graph.time(), self)?
            }
        };
        coerce(value, param.kind, param.name.as_str())
    }

    fn target(&self, param: &Parameter, reference: &Ref) -> ParamResult<ParamId> {
        match reference {
            Ref::Named(name) => self
                .graph
                .find_global(name.key())
                .ok_or_else(|| messages::undefined(name.as_str())),
            Ref::Inherited => self
                .graph
                .parent(param.file)
                .and_then(|parent| self.graph.find(parent, param.name.key()))
                .ok_or_else(|| messages::undefined(param.name.as_str())),
        }
    }

    fn operand(&mut self, param: &Parameter, operand: &Operand) -> ParamResult<Value> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::List { kind, elements } => self.list(param, *kind, elements),
            Operand::Param(reference) => {
                let target = self.target(param, reference)?;
                self.evaluate(target)
            }
        }
    }

    fn list(&mut self, param: &Parameter, kind: ValueKind, elements: &[Element]) -> ParamResult<Value> {
        let scalar = kind.scalar();
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let value = match element {
                Element::Literal(value) => value.clone(),
                Element::Param(reference) => {
                    let target = self.target(param, reference)?;
                    let name = self.graph.param(target).name.to_string();
                    coerce(self.evaluate(target)?, scalar, &name)?
                }
            };
            values.push(value);
        }
        collect_vector(kind, values, param.name.as_str())
    }
}

impl TimeInputs for Evaluator<'_> {
    fn exists(&self, name: &str) -> bool {
        self.graph.find_global(&ParamKey::new(name)).is_some()
    }

    fn double(&mut self, name: &str, category: &str) -> ParamResult<f64> {
        let value = self.dimensioned(name, ValueKind::Double, category)?;
        value
            .as_f64()
            .ok_or_else(|| messages::wrong_kind(name, ValueKind::Double, value.kind()))
    }

    fn unitless(&mut self, name: &str) -> ParamResult<f64> {
        let value = self.typed(name, ValueKind::Unitless)?;
        value
            .as_f64()
            .ok_or_else(|| messages::wrong_kind(name, ValueKind::Unitless, value.kind()))
    }

    fn double_vector(&mut self, name: &str, category: &str) -> ParamResult<Vec<f64>> {
        let value = self.dimensioned(name, ValueKind::DoubleVector, category)?;
        value
            .as_f64_vec()
            .ok_or_else(|| messages::wrong_kind(name, ValueKind::DoubleVector, value.kind()))
    }

    fn value(&mut self, name: &str) -> ParamResult<Value> {
        self.value_of(name)
    }
}

/// Name shown when the right operand does not fit the left.
fn operand_name(param: &Parameter, operand: &Operand) -> String {
    match operand.reference() {
        Some(Ref::Named(name)) => name.to_string(),
        _ => param.name.to_string(),
    }
}

// ==================== Combination ====================

/// A scalar or a vector of `T`.
#[derive(Debug, Clone, PartialEq)]
enum Shape<T> {
    Scalar(T),
    Vector(Vec<T>),
}

impl<T: Clone> Shape<T> {
    /// Apply `f` pairwise, broadcasting a scalar over a vector.
    fn zip_with<U>(self, other: Self, name: &str, f: impl Fn(T, T) -> U) -> ParamResult<Shape<U>> {
        Ok(match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Shape::Scalar(f(a, b)),
            (Self::Scalar(a), Self::Vector(v)) => {
                Shape::Vector(v.into_iter().map(|b| f(a.clone(), b)).collect())
            }
            (Self::Vector(v), Self::Scalar(b)) => {
                Shape::Vector(v.into_iter().map(|a| f(a, b.clone())).collect())
            }
            (Self::Vector(a), Self::Vector(b)) => {
                if a.len() != b.len() {
                    return Err(messages::vector_length_mismatch(name, a.len(), b.len()));
                }
                Shape::Vector(a.into_iter().zip(b).map(|(a, b)| f(a, b)).collect())
            }
        })
    }
}

fn numbers(value: &Value) -> Option<Shape<f64>> {
    match value.as_f64() {
        Some(x) => Some(Shape::Scalar(x)),
        None => value.as_f64_vec().map(Shape::Vector),
    }
}

fn integers(value: &Value) -> Option<Shape<i64>> {
    match value {
        Value::Integer(n) => Some(Shape::Scalar(*n)),
        Value::IntegerVector(v) => Some(Shape::Vector(v.clone())),
        _ => None,
    }
}

fn texts(value: &Value) -> Option<Shape<String>> {
    match value.as_text() {
        Some(s) => Some(Shape::Scalar(s)),
        None => value.as_text_vec().map(Shape::Vector),
    }
}

/// Combine two evaluated operands into a value of `kind`.
fn combine(kind: ValueKind, lhs: Value, op: BinaryOp, rhs: Value, name: &str) -> ParamResult<Value> {
    let incompatible = || messages::incompatible_operands(op.symbol());

    match kind {
        ValueKind::Boolean => match (lhs.as_bool(), rhs.as_bool(), op) {
            (Some(a), Some(b), BinaryOp::Multiply) => Ok(Value::Boolean(a && b)),
            _ => Err(incompatible()),
        },
        ValueKind::String | ValueKind::StringVector => {
            if op != BinaryOp::Add {
                return Err(incompatible());
            }
            let (Some(a), Some(b)) = (texts(&lhs), texts(&rhs)) else {
                return Err(incompatible());
            };
            match a.zip_with(b, name, |a, b| a + &b)? {
                Shape::Scalar(s) if kind == ValueKind::String => Ok(Value::String(s)),
                Shape::Scalar(s) => Ok(Value::StringVector(vec![s])),
                Shape::Vector(v) if kind == ValueKind::StringVector => Ok(Value::StringVector(v)),
                Shape::Vector(_) => Err(incompatible()),
            }
        }
        _ if kind.scalar() == ValueKind::Integer => {
            if let (Some(a), Some(b)) = (integers(&lhs), integers(&rhs)) {
                let result = a.zip_with(b, name, |a, b| match op {
                    BinaryOp::Add => a.wrapping_add(b),
                    BinaryOp::Subtract => a.wrapping_sub(b),
                    BinaryOp::Multiply => a.wrapping_mul(b),
                })?;
                return match result {
                    Shape::Scalar(n) if kind == ValueKind::Integer => Ok(Value::Integer(n)),
                    Shape::Scalar(n) => Ok(Value::IntegerVector(vec![n])),
                    Shape::Vector(v) if kind.is_vector() => Ok(Value::IntegerVector(v)),
                    Shape::Vector(_) => Err(incompatible()),
                };
            }
            combine_numbers(kind, &lhs, op, &rhs, name)
        }
        _ => combine_numbers(kind, &lhs, op, &rhs, name),
    }
}

fn combine_numbers(
    kind: ValueKind,
    lhs: &Value,
    op: BinaryOp,
    rhs: &Value,
    name: &str,
) -> ParamResult<Value> {
    let incompatible = || messages::incompatible_operands(op.symbol());
    let (Some(a), Some(b)) = (numbers(lhs), numbers(rhs)) else {
        return Err(incompatible());
    };
    let result = a.zip_with(b, name, |a, b| match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
    })?;

    let result = match result {
        Shape::Scalar(x) if kind.is_vector() => Shape::Vector(vec![x]),
        other => other,
    };
    match (kind, result) {
        (ValueKind::Double, Shape::Scalar(x)) => Ok(Value::Double(x)),
        (ValueKind::Unitless, Shape::Scalar(x)) => Ok(Value::Unitless(x)),
        (ValueKind::Integer, Shape::Scalar(x)) => Ok(Value::Integer(x as i64)),
        (ValueKind::DoubleVector, Shape::Vector(v)) => Ok(Value::DoubleVector(v)),
        (ValueKind::UnitlessVector, Shape::Vector(v)) => Ok(Value::UnitlessVector(v)),
        (ValueKind::IntegerVector, Shape::Vector(v)) => {
            Ok(Value::IntegerVector(v.into_iter().map(|x| x as i64).collect()))
        }
        _ => Err(incompatible()),
    }
}

// ==================== Coercion ====================

/// Convert `value` to `kind` where one kind reads as another: integers
/// widen to unitless, unitless truncates to integer, integers render as
/// strings.
fn coerce(value: Value, kind: ValueKind, name: &str) -> ParamResult<Value> {
    if value.kind() == kind {
        return Ok(value);
    }
    match (value, kind) {
        (Value::Integer(n), ValueKind::Unitless) => Ok(Value::Unitless(n as f64)),
        (Value::Unitless(x), ValueKind::Integer) => Ok(Value::Integer(x as i64)),
        (Value::Integer(n), ValueKind::String) => Ok(Value::String(n.to_string())),
        (Value::IntegerVector(v), ValueKind::UnitlessVector) => {
            Ok(Value::UnitlessVector(v.into_iter().map(|n| n as f64).collect()))
        }
        (Value::UnitlessVector(v), ValueKind::IntegerVector) => {
            Ok(Value::IntegerVector(v.into_iter().map(|x| x as i64).collect()))
        }
        (Value::IntegerVector(v), ValueKind::StringVector) => {
            Ok(Value::StringVector(v.into_iter().map(|n| n.to_string()).collect()))
        }
        (value, kind) => Err(messages::wrong_kind(name, kind, value.kind())),
    }
}

fn collect_vector(kind: ValueKind, values: Vec<Value>, name: &str) -> ParamResult<Value> {
    let mismatch = |v: &Value| messages::wrong_kind(name, kind.scalar(), v.kind());
    macro_rules! collect {
        ($variant:ident, $accessor:expr) => {
            values
                .iter()
                .map(|v| $accessor(v).ok_or_else(|| mismatch(v)))
                .collect::<ParamResult<Vec<_>>>()
                .map(Value::$variant)
        };
    }
    match kind {
        ValueKind::DoubleVector => collect!(DoubleVector, Value::as_f64),
        ValueKind::UnitlessVector => collect!(UnitlessVector, Value::as_f64),
        ValueKind::IntegerVector => collect!(IntegerVector, Value::as_i64),
        ValueKind::BooleanVector => collect!(BooleanVector, Value::as_bool),
        ValueKind::StringVector => {
            collect!(StringVector, |v: &Value| v.as_str().map(str::to_string))
        }
        other => Err(messages::wrong_kind(name, other.vector(), other)),
    }
}
