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

//! Typed parameter reads.
//!
//! [`ParameterReader`] turns one untyped read into the typed accessors
//! used by consumers. It is implemented by
//! [`ParameterManager`](crate::ParameterManager) for plain reads and by
//! [`ConsumerContext`](crate::ConsumerContext) for reads that record
//! dependencies.

use crate::error::ParamResult;
use crate::errors::messages;
use crate::units::UnitTable;
use crate::value::{Value, ValueKind};

/// What a read expects of the parameter it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadRequest<'a> {
    /// Any kind.
    Any,
    /// Exactly this kind.
    Kind(ValueKind),
    /// This dimensioned kind with a unit of the given category.
    Dimensioned(ValueKind, &'a str),
}

/// Typed access to parameter values.
///
/// Dimensioned values are returned in internal units unless a unit is
/// asked for explicitly.
pub trait ParameterReader {
    /// Evaluate `name` as allowed by `request`.
    fn read(&self, name: &str, request: ReadRequest<'_>) -> ParamResult<Value>;

    /// Current value of `name`, whatever its kind.
    fn get_value(&self, name: &str) -> ParamResult<Value> {
        self.read(name, ReadRequest::Any)
    }

    /// Dimensioned scalar in internal units; its unit must be of `category`.
    fn get_double(&self, name: &str, category: &str) -> ParamResult<f64> {
        let value = self.read(name, ReadRequest::Dimensioned(ValueKind::Double, category))?;
        extract(name, ValueKind::Double, &value, Value::as_f64)
    }

    /// Dimensioned scalar expressed in `unit`.
    fn get_double_in_unit(&self, name: &str, unit: &str) -> ParamResult<f64> {
        let def = UnitTable::global()
            .lookup(unit)
            .ok_or_else(|| messages::unrecognized_unit(unit))?;
        Ok(self.get_double(name, &def.category)? / def.factor)
    }

    fn get_unitless(&self, name: &str) -> ParamResult<f64> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::Unitless))?;
        extract(name, ValueKind::Unitless, &value, Value::as_f64)
    }

    fn get_integer(&self, name: &str) -> ParamResult<i64> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::Integer))?;
        extract(name, ValueKind::Integer, &value, Value::as_i64)
    }

    fn get_boolean(&self, name: &str) -> ParamResult<bool> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::Boolean))?;
        extract(name, ValueKind::Boolean, &value, Value::as_bool)
    }

    fn get_string(&self, name: &str) -> ParamResult<String> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::String))?;
        extract(name, ValueKind::String, &value, |v| v.as_str().map(str::to_string))
    }

    /// Dimensioned vector in internal units; its unit must be of `category`.
    fn get_double_vector(&self, name: &str, category: &str) -> ParamResult<Vec<f64>> {
        let value = self.read(
            name,
            ReadRequest::Dimensioned(ValueKind::DoubleVector, category),
        )?;
        extract(name, ValueKind::DoubleVector, &value, Value::as_f64_vec)
    }

    fn get_unitless_vector(&self, name: &str) -> ParamResult<Vec<f64>> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::UnitlessVector))?;
        extract(name, ValueKind::UnitlessVector, &value, Value::as_f64_vec)
    }

    fn get_integer_vector(&self, name: &str) -> ParamResult<Vec<i64>> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::IntegerVector))?;
        extract(name, ValueKind::IntegerVector, &value, |v| match v {
            Value::IntegerVector(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn get_boolean_vector(&self, name: &str) -> ParamResult<Vec<bool>> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::BooleanVector))?;
        extract(name, ValueKind::BooleanVector, &value, |v| match v {
            Value::BooleanVector(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn get_string_vector(&self, name: &str) -> ParamResult<Vec<String>> {
        let value = self.read(name, ReadRequest::Kind(ValueKind::StringVector))?;
        extract(name, ValueKind::StringVector, &value, |v| match v {
            Value::StringVector(v) => Some(v.clone()),
            _ => None,
        })
    }

    /// Dimensioned vector of exactly two values.
    fn get_two_vector(&self, name: &str, category: &str) -> ParamResult<[f64; 2]> {
        let v = self.get_double_vector(name, category)?;
        <[f64; 2]>::try_from(v.as_slice())
            .map_err(|_| messages::wrong_vector_length(name, 2, v.len()))
    }

    /// Dimensioned vector of exactly three values.
    fn get_three_vector(&self, name: &str, category: &str) -> ParamResult<[f64; 3]> {
        let v = self.get_double_vector(name, category)?;
        <[f64; 3]>::try_from(v.as_slice())
            .map_err(|_| messages::wrong_vector_length(name, 3, v.len()))
    }
}

fn extract<T>(
    name: &str,
    kind: ValueKind,
    value: &Value,
    f: impl FnOnce(&Value) -> Option<T>,
) -> ParamResult<T> {
    f(value).ok_or_else(|| messages::wrong_kind(name, kind, value.kind()))
}
