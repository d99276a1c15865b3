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

//! Resolved parameters and their evaluation plans.

use crate::name::{ParamKey, ParamName};
use crate::value::{Value, ValueKind};
use std::sync::atomic::{AtomicBool, Ordering};

/// Index of a file in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) usize);

impl FileId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a parameter in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub(crate) usize);

impl ParamId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Target of a reference operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Ref {
    /// Another parameter, read through the full chain.
    Named(ParamName),
    /// The same name, read from the parent of the declaring file.
    Inherited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
        }
    }
}

/// One element of a vector list.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Scalar literal, dimensioned values already in internal units.
    Literal(Value),
    /// Scalar parameter read at evaluation time.
    Param(Ref),
}

/// One side of a binary plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// Vector list of kind `kind` with at least one named element.
    List { kind: ValueKind, elements: Vec<Element> },
    Param(Ref),
}

impl Operand {
    pub(crate) fn reference(&self) -> Option<&Ref> {
        match self {
            Self::Param(r) => Some(r),
            _ => None,
        }
    }
}

/// How a parameter computes its value.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Literal(Value),
    /// Vector list with named elements.
    List { kind: ValueKind, elements: Vec<Element> },
    Reference(Ref),
    Binary {
        lhs: Operand,
        op: BinaryOp,
        rhs: Operand,
    },
    /// Value of the time feature rooted at the given `Tf/<name>` key.
    TimeFeature(ParamKey),
}

impl Plan {
    /// True for plans that depend on another parameter as a whole.
    pub fn is_relative(&self) -> bool {
        matches!(
            self,
            Self::Reference(_) | Self::Binary { .. } | Self::TimeFeature(_)
        )
    }

    /// Every reference in the plan, list elements included.
    pub(crate) fn all_refs(&self) -> Vec<&Ref> {
        fn elements(elements: &[Element]) -> impl Iterator<Item = &Ref> {
            elements.iter().filter_map(|e| match e {
                Element::Param(r) => Some(r),
                Element::Literal(_) => None,
            })
        }
        fn operand(operand: &Operand) -> Vec<&Ref> {
            match operand {
                Operand::Param(r) => vec![r],
                Operand::List { elements: list, .. } => elements(list).collect(),
                Operand::Literal(_) => Vec::new(),
            }
        }
        match self {
            Self::Reference(r) => vec![r],
            Self::List { elements: list, .. } => elements(list).collect(),
            Self::Binary { lhs, rhs, .. } => {
                let mut refs = operand(lhs);
                refs.extend(operand(rhs));
                refs
            }
            Self::Literal(_) | Self::TimeFeature(_) => Vec::new(),
        }
    }
}

/// The immutable, typed result of resolving one declaration.
#[derive(Debug)]
pub struct Parameter {
    pub(crate) name: ParamName,
    pub(crate) kind: ValueKind,
    pub(crate) changeable: bool,
    pub(crate) unit: Option<String>,
    pub(crate) raw_value: String,
    pub(crate) file: FileId,
    pub(crate) plan: Plan,
    used: AtomicBool,
}

impl Parameter {
    pub(crate) fn new(
        name: ParamName,
        kind: ValueKind,
        changeable: bool,
        unit: Option<String>,
        raw_value: String,
        file: FileId,
        plan: Plan,
    ) -> Self {
        Self {
            name,
            kind,
            changeable,
            unit,
            raw_value,
            file,
            plan,
            used: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &ParamName {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_changeable(&self) -> bool {
        self.changeable
    }

    /// Declared unit of dimensioned kinds.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Name with its type prefix (`dc:Ge/Box/TransX`).
    pub fn qualified_name(&self) -> String {
        format!(
            "{}{}:{}",
            self.kind.prefix(),
            if self.changeable { "c" } else { "" },
            self.name
        )
    }

    pub fn was_used(&self) -> bool {
        self.used.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_used(&self) {
        self.used.store(true, Ordering::Relaxed);
    }
}
