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

//! Time features: values computed from the simulation time.
//!
//! A feature is rooted at a `Tf/<name>` prefix. Declaring
//! `Tf/<name>/Function` with a closed-form function, or
//! `Tf/<name>/Values` for a step table, makes a changeable
//! `Tf/<name>/Value` parameter appear in the declaring file. Its inputs
//! (`Rate`, `StartValue`, `RepetitionInterval`, `Times`, `Values`) are
//! read from the parameter graph each time the feature is evaluated.

use crate::error::ParamResult;
use crate::errors::messages;
use crate::name::ParamName;
use crate::token::{is_double, is_integer, tokenize};
use crate::units::{rate_category, UnitTable, INVERSE_TIME};
use crate::value::{Value, ValueKind};
use parking_lot::Mutex;
use std::fmt;

/// Unit category of `RepetitionInterval` and step `Times`.
const TIME: &str = "Time";
const ANGLE: &str = "Angle";

/// Named functions of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFunction {
    Linear,
    Sqrt,
    Exponent,
    Sine,
    Cosine,
    Step,
}

impl TimeFunction {
    /// Case-insensitive lookup of a function name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "sqrt" => Some(Self::Sqrt),
            "exponent" => Some(Self::Exponent),
            "sine" => Some(Self::Sine),
            "cosine" => Some(Self::Cosine),
            "step" => Some(Self::Step),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Sqrt => "Sqrt",
            Self::Exponent => "Exponent",
            Self::Sine => "Sine",
            Self::Cosine => "Cosine",
            Self::Step => "Step",
        }
    }

    /// Outer function `g` of `g(rate * t + start)`.
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Linear | Self::Step => x,
            Self::Sqrt => x.sqrt(),
            Self::Exponent => x.exp(),
            Self::Sine => x.sin(),
            Self::Cosine => x.cos(),
        }
    }

    fn is_trigonometric(self) -> bool {
        matches!(self, Self::Sine | Self::Cosine)
    }
}

impl fmt::Display for TimeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reads a time feature's inputs from the parameter graph.
pub(crate) trait TimeInputs {
    fn exists(&self, name: &str) -> bool;

    /// Dimensioned value in internal units, checked against `category`.
    fn double(&mut self, name: &str, category: &str) -> ParamResult<f64>;

    fn unitless(&mut self, name: &str) -> ParamResult<f64>;

    /// Dimensioned vector in internal units, checked against `category`.
    fn double_vector(&mut self, name: &str, category: &str) -> ParamResult<Vec<f64>>;

    fn value(&mut self, name: &str) -> ParamResult<Value>;
}

/// Canonical time-feature prefix of a `Tf/<name>/Function` or
/// `Tf/<name>/Values` key, or `None` for any other name.
pub(crate) fn feature_base(key: &str) -> Option<(&str, bool)> {
    if key.len() <= 12 || !key.starts_with("tf/") {
        return None;
    }
    if let Some(base) = key.strip_suffix("/values") {
        return Some((base, true));
    }
    key.strip_suffix("/function").map(|base| (base, false))
}

/// One time feature.
#[derive(Debug)]
pub struct TimeFeature {
    base: ParamName,
    function: TimeFunction,
    kind: ValueKind,
    unit: Option<String>,
    /// Last value seen by [`TimeFeature::has_changed`].
    cache: Mutex<Option<Value>>,
}

impl TimeFeature {
    /// Build a closed-form feature from the raw value of its `Function`
    /// parameter. Returns `None` for `"Step"`, which is driven by `Values`.
    pub(crate) fn from_function(base: ParamName, raw_value: &str) -> ParamResult<Option<Self>> {
        let text = raw_value.trim();
        let inner = match text.strip_prefix('"').and_then(|rest| rest.find('"').map(|end| &rest[..end])) {
            Some(inner) => inner.trim(),
            None => return Err(messages::time_function_not_string()),
        };

        let mut tokens = inner.split_whitespace();
        let function_name = tokens.next().unwrap_or("");
        let unit = tokens.next().unwrap_or("");
        if is_double(unit) {
            return Err(messages::time_function_unit_is_number(unit));
        }

        let is_step = function_name.eq_ignore_ascii_case("step");
        if !is_step
            && (unit.eq_ignore_ascii_case("boolean") || unit.eq_ignore_ascii_case("string"))
        {
            return Err(messages::time_function_needs_step());
        }
        if is_step {
            return Ok(None);
        }

        let function = TimeFunction::from_name(function_name)
            .ok_or_else(|| messages::time_function_unknown(function_name))?;
        if function.is_trigonometric() && !unit.is_empty() {
            return Err(messages::time_function_must_be_unitless(function.name()));
        }

        let (kind, unit) = if unit.is_empty() {
            (ValueKind::Unitless, None)
        } else if UnitTable::global().is_unit(unit) {
            (ValueKind::Double, Some(unit.to_string()))
        } else {
            return Err(messages::unrecognized_unit(unit));
        };

        Ok(Some(Self::new(base, function, kind, unit)))
    }

    /// Build a step feature from the declared kind and raw value of its
    /// `Values` parameter.
    pub(crate) fn from_values(base: ParamName, kind: ValueKind, raw_value: &str) -> ParamResult<Self> {
        if !kind.is_vector() {
            return Err(messages::time_step_values_kind());
        }

        let tokens = tokenize(raw_value);
        let count_token = tokens.first().map(String::as_str).unwrap_or("");
        if !is_integer(count_token) {
            return Err(messages::vector_count_not_integer(count_token));
        }
        let count: i64 = count_token
            .trim_start_matches('+')
            .parse()
            .map_err(|_| messages::vector_count_not_integer(count_token))?;
        if count < 0 {
            return Err(messages::vector_count_negative());
        }
        let count = count as usize;
        if tokens.len() < count + 1 {
            return Err(messages::vector_too_few_values(count, tokens.len() - 1));
        }

        let unit = if kind == ValueKind::DoubleVector {
            let unit = tokens.get(count + 1).map(String::as_str).unwrap_or("");
            if unit.is_empty() {
                return Err(messages::missing_unit());
            }
            if is_double(unit) {
                return Err(messages::number_where_unit_expected(unit));
            }
            if !UnitTable::global().is_unit(unit) {
                return Err(messages::unrecognized_unit(unit));
            }
            Some(unit.to_string())
        } else {
            None
        };

        Ok(Self::new(base, TimeFunction::Step, kind.scalar(), unit))
    }

    fn new(base: ParamName, function: TimeFunction, kind: ValueKind, unit: Option<String>) -> Self {
        Self {
            base,
            function,
            kind,
            unit,
            cache: Mutex::new(None),
        }
    }

    /// The `Tf/<name>` prefix.
    pub fn base(&self) -> &ParamName {
        &self.base
    }

    pub fn function(&self) -> TimeFunction {
        self.function
    }

    /// Kind of the synthesized `Value` parameter.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Name of the synthesized parameter, `Tf/<name>/Value`.
    pub fn value_name(&self) -> String {
        self.input("Value")
    }

    /// Raw value given to the synthesized parameter.
    pub(crate) fn placeholder(&self) -> String {
        match (&self.unit, self.kind) {
            (Some(unit), _) => format!("0.000000001 {}", unit),
            (None, ValueKind::Boolean) => "\"True\"".to_string(),
            (None, ValueKind::String) => "\"null\"".to_string(),
            (None, ValueKind::Integer) => "0".to_string(),
            (None, _) => "0.000000001".to_string(),
        }
    }

    fn input(&self, suffix: &str) -> String {
        format!("{}/{}", self.base, suffix)
    }

    /// Value at simulation time `t`.
    pub(crate) fn evaluate(&self, t: f64, inputs: &mut dyn TimeInputs) -> ParamResult<Value> {
        match self.function {
            TimeFunction::Step => self.evaluate_step(t, inputs),
            function => self.evaluate_closed(function, t, inputs),
        }
    }

    fn evaluate_closed(
        &self,
        function: TimeFunction,
        t: f64,
        inputs: &mut dyn TimeInputs,
    ) -> ParamResult<Value> {
        let interval = self.input("RepetitionInterval");
        let t = if inputs.exists(&interval) {
            wrap(t, inputs.double(&interval, TIME)?)
        } else {
            t
        };

        let start_name = self.input("StartValue");
        let rate_name = self.input("Rate");
        let category = self
            .unit
            .as_deref()
            .and_then(|u| UnitTable::global().category(u))
            .map(str::to_string);

        let (start, rate) = match (&category, function.is_trigonometric()) {
            (_, true) => (
                inputs.double(&start_name, ANGLE)?,
                inputs.double(&rate_name, &rate_category(ANGLE))?,
            ),
            (Some(category), false) => (
                inputs.double(&start_name, category)?,
                inputs.double(&rate_name, &rate_category(category))?,
            ),
            (None, false) => (
                inputs.unitless(&start_name)?,
                inputs.double(&rate_name, INVERSE_TIME)?,
            ),
        };

        let x = function.apply(rate * t + start);
        Ok(match self.kind {
            ValueKind::Double => Value::Double(x),
            _ => Value::Unitless(x),
        })
    }

    fn evaluate_step(&self, t: f64, inputs: &mut dyn TimeInputs) -> ParamResult<Value> {
        let times = inputs.double_vector(&self.input("Times"), TIME)?;
        let values = inputs.value(&self.input("Values"))?;
        if times.len() != values.len() || times.is_empty() {
            return Err(messages::time_step_lengths(times.len(), values.len()));
        }

        let period = times[times.len() - 1];
        let t = wrap(t, period);
        let index = step_index(&times, t);
        values
            .element(index)
            .ok_or_else(messages::time_step_values_kind)
    }

    /// Re-evaluate at `t` and report whether the value differs from the
    /// last one seen. The cached value is replaced only on change.
    pub(crate) fn has_changed(&self, t: f64, inputs: &mut dyn TimeInputs) -> ParamResult<bool> {
        let value = self.evaluate(t, inputs)?;
        let mut cache = self.cache.lock();
        if cache.as_ref() == Some(&value) {
            return Ok(false);
        }
        *cache = Some(value);
        Ok(true)
    }

    /// Forget the cached value so the next check reports a change.
    pub(crate) fn reset(&self) {
        *self.cache.lock() = None;
    }
}

/// Reduce `t` into `[0, period)` when it has run past the period.
fn wrap(t: f64, period: f64) -> f64 {
    if period > 0.0 && t >= period {
        t % period
    } else {
        t
    }
}

/// Index into `Values` of the step active at `t`.
///
/// Breakpoints are ordered by time first; the active one is the first
/// strictly after `t`, clamped to the latest.
fn step_index(times: &[f64], t: f64) -> usize {
    let mut table: Vec<(f64, usize)> = times.iter().copied().zip(0..).collect();
    table.sort_by(|a, b| a.0.total_cmp(&b.0));
    let position = table
        .partition_point(|&(time, _)| time <= t)
        .min(table.len() - 1);
    table[position].1
}
