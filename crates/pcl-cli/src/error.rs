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

//! Structured error types for the PCL CLI.

use pcl_core::ParamError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for PCL CLI operations.
///
/// Commands build these and hand the rendered message to `main`, which
/// prints it and exits non-zero.
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// I/O operation failed (file read, write, or metadata access).
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// File size exceeds the configured maximum.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes ({max_mb} MB)")]
    FileTooLarge {
        path: PathBuf,
        actual: u64,
        max: u64,
        max_mb: u64,
    },

    /// Loading, resolving or reading parameters failed.
    ///
    /// Holds the multi-line report of the underlying [`ParamError`].
    #[error("{0}")]
    Resolution(String),

    /// JSON serialization error.
    #[error("JSON format error: {message}")]
    JsonFormat { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub fn file_too_large(path: impl Into<PathBuf>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<ParamError> for CliError {
    fn from(source: ParamError) -> Self {
        Self::Resolution(source.report())
    }
}

// Automatic conversion from serde_json::Error
impl From<serde_json::Error> for CliError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonFormat {
            message: source.to_string(),
        }
    }
}

impl From<CliError> for String {
    fn from(err: CliError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcl_core::ParamErrorKind;

    #[test]
    fn test_io_error_display() {
        let err = CliError::io_error(
            "run.txt",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("run.txt"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = CliError::file_too_large("big.txt", 200_000_000, 64 * 1024 * 1024);
        let msg = err.to_string();
        assert!(msg.contains("big.txt"));
        assert!(msg.contains("200000000 bytes"));
        assert!(msg.contains("64 MB"));
    }

    #[test]
    fn test_resolution_carries_report() {
        let source = ParamError::unknown_reference("Ge/Foo has not been defined")
            .with_file("run.txt")
            .with_parameter("d:Ge/Box/HLX");
        let err: CliError = source.into();
        let msg = err.to_string();
        assert!(msg.starts_with("Parameter resolution failed in file: run.txt"));
        assert!(msg.contains("Parameter name: d:Ge/Box/HLX"));
        assert!(msg.contains(&ParamErrorKind::UnknownReference.to_string()));
    }

    #[test]
    fn test_json_format_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let cli_err: CliError = json_err.into();
        assert!(matches!(cli_err, CliError::JsonFormat { .. }));
    }

    #[test]
    fn test_into_string() {
        let message: String = CliError::invalid_input("unknown format 'xml'").into();
        assert_eq!(message, "Invalid input: unknown format 'xml'");
    }
}
