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

//! Resource limits for parameter loading.

/// Configurable limits for loading and evaluation.
///
/// These bound the resources a parameter graph may consume. Exceeding any
/// of them is reported as a [`ParamErrorKind::Security`] error.
///
/// [`ParamErrorKind::Security`]: crate::ParamErrorKind::Security
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum size of one parameter file in bytes (default: 64MB).
    pub max_file_size: usize,
    /// Maximum line length in bytes (default: 1MB).
    pub max_line_length: usize,
    /// Maximum depth of nested `includeFile` chains (default: 64).
    pub max_include_depth: usize,
    /// Maximum number of distinct files in one graph (default: 10k).
    pub max_files: usize,
    /// Maximum declared vector length (default: 10M).
    pub max_vector_length: usize,
    /// Maximum nesting of references followed by one read (default: 256).
    ///
    /// A parameter that refers back to itself through other parameters
    /// would otherwise recurse without bound.
    pub max_evaluation_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: 64 * 1024 * 1024, // 64MB
            max_line_length: 1024 * 1024,    // 1MB
            max_include_depth: 64,
            max_files: 10_000,
            max_vector_length: 10_000_000,
            max_evaluation_depth: 256,
        }
    }
}

impl Limits {
    /// Create limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_file_size: usize::MAX,
            max_line_length: usize::MAX,
            max_include_depth: usize::MAX,
            max_files: usize::MAX,
            max_vector_length: usize::MAX,
            max_evaluation_depth: usize::MAX,
        }
    }
}
