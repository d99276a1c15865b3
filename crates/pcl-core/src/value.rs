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

//! Value kinds and evaluated values.

use std::fmt;

/// The ten declarable value kinds, named by their type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    /// `b`
    Boolean,
    /// `i`
    Integer,
    /// `u`
    Unitless,
    /// `d`, a real number carrying a unit.
    Double,
    /// `s`
    String,
    /// `bv`
    BooleanVector,
    /// `iv`
    IntegerVector,
    /// `uv`
    UnitlessVector,
    /// `dv`
    DoubleVector,
    /// `sv`
    StringVector,
}

impl ValueKind {
    pub const ALL: [ValueKind; 10] = [
        ValueKind::Boolean,
        ValueKind::Integer,
        ValueKind::Unitless,
        ValueKind::Double,
        ValueKind::String,
        ValueKind::BooleanVector,
        ValueKind::IntegerVector,
        ValueKind::UnitlessVector,
        ValueKind::DoubleVector,
        ValueKind::StringVector,
    ];

    /// Parse a type prefix (`d`, `uv`, ...). Case-insensitive.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let kind = match prefix.to_ascii_lowercase().as_str() {
            "b" => Self::Boolean,
            "i" => Self::Integer,
            "u" => Self::Unitless,
            "d" => Self::Double,
            "s" => Self::String,
            "bv" => Self::BooleanVector,
            "iv" => Self::IntegerVector,
            "uv" => Self::UnitlessVector,
            "dv" => Self::DoubleVector,
            "sv" => Self::StringVector,
            _ => return None,
        };
        Some(kind)
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Boolean => "b",
            Self::Integer => "i",
            Self::Unitless => "u",
            Self::Double => "d",
            Self::String => "s",
            Self::BooleanVector => "bv",
            Self::IntegerVector => "iv",
            Self::UnitlessVector => "uv",
            Self::DoubleVector => "dv",
            Self::StringVector => "sv",
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(
            self,
            Self::BooleanVector
                | Self::IntegerVector
                | Self::UnitlessVector
                | Self::DoubleVector
                | Self::StringVector
        )
    }

    /// Element kind of a vector kind; scalars map to themselves.
    pub fn scalar(self) -> Self {
        match self {
            Self::BooleanVector => Self::Boolean,
            Self::IntegerVector => Self::Integer,
            Self::UnitlessVector => Self::Unitless,
            Self::DoubleVector => Self::Double,
            Self::StringVector => Self::String,
            other => other,
        }
    }

    /// Vector kind of a scalar kind; vectors map to themselves.
    pub fn vector(self) -> Self {
        match self {
            Self::Boolean => Self::BooleanVector,
            Self::Integer => Self::IntegerVector,
            Self::Unitless => Self::UnitlessVector,
            Self::Double => Self::DoubleVector,
            Self::String => Self::StringVector,
            other => other,
        }
    }

    /// Kinds that carry a unit.
    pub fn has_unit(self) -> bool {
        matches!(self, Self::Double | Self::DoubleVector)
    }

    /// Kinds whose values are numbers.
    pub fn is_numeric(self) -> bool {
        matches!(
            self.scalar(),
            Self::Integer | Self::Unitless | Self::Double
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// An evaluated parameter value.
///
/// Dimensioned values are held in internal units (millimetre, nanosecond,
/// MeV, radian, ...). The unit a parameter was declared with lives on the
/// parameter, not on the value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Unitless(f64),
    Double(f64),
    String(String),
    BooleanVector(Vec<bool>),
    IntegerVector(Vec<i64>),
    UnitlessVector(Vec<f64>),
    DoubleVector(Vec<f64>),
    StringVector(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Unitless(_) => ValueKind::Unitless,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::BooleanVector(_) => ValueKind::BooleanVector,
            Self::IntegerVector(_) => ValueKind::IntegerVector,
            Self::UnitlessVector(_) => ValueKind::UnitlessVector,
            Self::DoubleVector(_) => ValueKind::DoubleVector,
            Self::StringVector(_) => ValueKind::StringVector,
        }
    }

    /// Number of elements; scalars have length 1.
    pub fn len(&self) -> usize {
        match self {
            Self::BooleanVector(v) => v.len(),
            Self::IntegerVector(v) => v.len(),
            Self::UnitlessVector(v) | Self::DoubleVector(v) => v.len(),
            Self::StringVector(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric scalar view (integers widen).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Unitless(x) | Self::Double(x) => Some(*x),
            _ => None,
        }
    }

    /// Numeric vector view (integers widen).
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Self::IntegerVector(v) => Some(v.iter().map(|n| *n as f64).collect()),
            Self::UnitlessVector(v) | Self::DoubleVector(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text view used by string concatenation: strings as-is, integers
    /// in decimal.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Element-wise text view of string and integer vectors.
    pub fn as_text_vec(&self) -> Option<Vec<String>> {
        match self {
            Self::StringVector(v) => Some(v.clone()),
            Self::IntegerVector(v) => Some(v.iter().map(|n| n.to_string()).collect()),
            _ => None,
        }
    }

    /// Element `index` of a vector as a scalar value.
    pub fn element(&self, index: usize) -> Option<Value> {
        match self {
            Self::BooleanVector(v) => v.get(index).map(|b| Self::Boolean(*b)),
            Self::IntegerVector(v) => v.get(index).map(|n| Self::Integer(*n)),
            Self::UnitlessVector(v) => v.get(index).map(|x| Self::Unitless(*x)),
            Self::DoubleVector(v) => v.get(index).map(|x| Self::Double(*x)),
            Self::StringVector(v) => v.get(index).map(|s| Self::String(s.clone())),
            _ => None,
        }
    }

    /// Render with dimensioned values expressed in `factor`-sized units.
    pub fn display_scaled(&self, factor: f64) -> String {
        match self {
            Self::Double(x) => format_number(*x / factor),
            Self::DoubleVector(v) => {
                let mut out = v.len().to_string();
                for x in v {
                    out.push(' ');
                    out.push_str(&format_number(*x / factor));
                }
                out
            }
            other => other.to_string(),
        }
    }
}

pub(crate) fn format_number(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

fn format_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "\"{}\"", format_bool(*b)),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Unitless(x) | Self::Double(x) => write!(f, "{}", format_number(*x)),
            Self::String(s) => write!(f, "\"{}\"", s),
            Self::BooleanVector(v) => {
                write!(f, "{}", v.len())?;
                for b in v {
                    write!(f, " \"{}\"", format_bool(*b))?;
                }
                Ok(())
            }
            Self::IntegerVector(v) => {
                write!(f, "{}", v.len())?;
                for n in v {
                    write!(f, " {}", n)?;
                }
                Ok(())
            }
            Self::UnitlessVector(v) | Self::DoubleVector(v) => {
                write!(f, "{}", v.len())?;
                for x in v {
                    write!(f, " {}", format_number(*x))?;
                }
                Ok(())
            }
            Self::StringVector(v) => {
                write!(f, "{}", v.len())?;
                for s in v {
                    write!(f, " \"{}\"", s)?;
                }
                Ok(())
            }
        }
    }
}
