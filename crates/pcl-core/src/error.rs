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

//! Error types for parameter loading and resolution.

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred while loading or resolving parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamErrorKind {
    /// Parameter name contains a forbidden character or malformed prefix.
    InvalidName,
    /// Parameter value contains a forbidden character or malformed literal.
    InvalidValue,
    /// Same name declared twice in one file.
    DuplicateDeclaration,
    /// Two include chains disagree and the including file does not settle it.
    AmbiguousParameterChain,
    /// Sibling attributes of one entity modified from different chains.
    ControlByDifferentArms,
    /// Referenced parameter exists in no visible file.
    UnknownReference,
    /// Referenced or inherited parameter has an incompatible kind.
    TypeMismatch,
    /// Units of combined or overriding values are in different categories.
    UnitCategoryMismatch,
    /// Dimensioned value without a unit.
    MissingUnit,
    /// Unit symbol not present in the unit table.
    UnrecognizedUnit,
    /// Vector operands of different lengths.
    VectorLengthMismatch,
    /// Tokens left after a complete expression.
    TrailingTokens,
    /// Reserved structural attribute marked changeable.
    NonChangeableAttribute,
    /// Edit of an existing parameter that is not changeable.
    NotChangeable,
    /// Read of a name that resolves in no file of the chain.
    Undefined,
    /// Configured limit exceeded.
    Security,
    /// I/O error (file operations).
    IO,
}

impl fmt::Display for ParamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName => write!(f, "InvalidName"),
            Self::InvalidValue => write!(f, "InvalidValue"),
            Self::DuplicateDeclaration => write!(f, "DuplicateDeclaration"),
            Self::AmbiguousParameterChain => write!(f, "AmbiguousParameterChain"),
            Self::ControlByDifferentArms => write!(f, "ControlByDifferentArms"),
            Self::UnknownReference => write!(f, "UnknownReference"),
            Self::TypeMismatch => write!(f, "TypeMismatch"),
            Self::UnitCategoryMismatch => write!(f, "UnitCategoryMismatch"),
            Self::MissingUnit => write!(f, "MissingUnit"),
            Self::UnrecognizedUnit => write!(f, "UnrecognizedUnit"),
            Self::VectorLengthMismatch => write!(f, "VectorLengthMismatch"),
            Self::TrailingTokens => write!(f, "TrailingTokens"),
            Self::NonChangeableAttribute => write!(f, "NonChangeableAttribute"),
            Self::NotChangeable => write!(f, "NotChangeable"),
            Self::Undefined => write!(f, "Undefined"),
            Self::Security => write!(f, "SecurityError"),
            Self::IO => write!(f, "IOError"),
        }
    }
}

/// An error raised while loading, resolving or reading parameters.
///
/// Every error is fatal to the session that produced it. The optional
/// fields locate the failure; [`ParamError::report`] renders them as the
/// multi-line diagnostic shown to users.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ParamError {
    /// The kind of error.
    pub kind: ParamErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Name of the file whose declaration failed.
    pub file: Option<String>,
    /// Line number of the declaration (1-based).
    pub line: Option<usize>,
    /// Parameter as written, including its type prefix when known.
    pub parameter: Option<String>,
    /// Raw value text of the failing declaration.
    pub value: Option<String>,
    /// Remediation hint, e.g. the accepted grammar for the value kind.
    pub hint: Option<String>,
}

impl ParamError {
    /// Create a new error.
    pub fn new(kind: ParamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            line: None,
            parameter: None,
            value: None,
            hint: None,
        }
    }

    /// Attach the originating file, keeping the innermost one.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        if self.file.is_none() {
            self.file = Some(file.into());
        }
        self
    }

    /// Attach the line number, keeping the innermost one.
    pub fn with_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    /// Attach the failing parameter, keeping the innermost one.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        if self.parameter.is_none() {
            self.parameter = Some(parameter.into());
        }
        self
    }

    /// Attach the raw value text.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        if self.value.is_none() {
            self.value = Some(value.into());
        }
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Render the full diagnostic.
    pub fn report(&self) -> String {
        let mut out = String::new();
        match &self.file {
            Some(file) => {
                out.push_str("Parameter resolution failed in file: ");
                out.push_str(file);
                if let Some(line) = self.line.filter(|&line| line > 0) {
                    out.push_str(&format!(" (line {})", line));
                }
                out.push('\n');
            }
            None => out.push_str("Parameter resolution failed\n"),
        }
        if let Some(parameter) = &self.parameter {
            out.push_str("Parameter name: ");
            out.push_str(parameter);
            out.push('\n');
        }
        if let Some(value) = &self.value {
            out.push_str("has unsupported value: ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str(&format!("{}: {}", self.kind, self.message));
        if let Some(hint) = &self.hint {
            out.push('\n');
            out.push_str(hint);
        }
        out
    }

    // Convenience constructors for each error kind
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::InvalidName, message)
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::InvalidValue, message)
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::DuplicateDeclaration, message)
    }

    pub fn ambiguous_chain(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::AmbiguousParameterChain, message)
    }

    pub fn different_arms(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::ControlByDifferentArms, message)
    }

    pub fn unknown_reference(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::UnknownReference, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::TypeMismatch, message)
    }

    pub fn unit_mismatch(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::UnitCategoryMismatch, message)
    }

    pub fn missing_unit(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::MissingUnit, message)
    }

    pub fn unrecognized_unit(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::UnrecognizedUnit, message)
    }

    pub fn vector_length(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::VectorLengthMismatch, message)
    }

    pub fn trailing_tokens(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::TrailingTokens, message)
    }

    pub fn non_changeable_attribute(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::NonChangeableAttribute, message)
    }

    pub fn not_changeable(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::NotChangeable, message)
    }

    pub fn undefined(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::Undefined, message)
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::Security, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ParamErrorKind::IO, message)
    }
}

/// Result type for parameter operations.
pub type ParamResult<T> = Result<T, ParamError>;
