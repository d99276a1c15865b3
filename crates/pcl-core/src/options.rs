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

//! Options controlling how a parameter graph is loaded.

use crate::limits::Limits;

/// Options for [`ParameterManager::load`](crate::ParameterManager::load).
///
/// # Examples
///
/// ```text
/// use pcl_core::{LoadOptions, Limits};
///
/// let opts = LoadOptions::builder()
///     .max_include_depth(16)
///     .built_in_defaults(false)
///     .build();
/// ```
///
/// # Fields
///
/// - `limits`: Resource limits for loading and evaluation
/// - `built_in_defaults`: Whether files without includes inherit the built-in defaults
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Resource limits.
    pub limits: Limits,
    /// Implicitly include the built-in defaults file.
    pub built_in_defaults: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            built_in_defaults: true,
        }
    }
}

impl LoadOptions {
    /// Create a new builder for LoadOptions.
    pub fn builder() -> LoadOptionsBuilder {
        LoadOptionsBuilder::new()
    }
}

/// Builder for ergonomic construction of LoadOptions.
#[derive(Debug, Clone)]
pub struct LoadOptionsBuilder {
    limits: Limits,
    built_in_defaults: bool,
}

impl LoadOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            built_in_defaults: true,
        }
    }

    /// Set the maximum file size in bytes.
    ///
    /// # Parameters
    ///
    /// - `size`: Maximum file size in bytes (default: 64MB)
    ///
    /// # Examples
    ///
    /// ```text
    /// LoadOptions::builder().max_file_size(1024 * 1024)
    /// ```
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.limits.max_file_size = size;
        self
    }

    /// Set the maximum line length in bytes.
    ///
    /// # Parameters
    ///
    /// - `length`: Maximum line length in bytes (default: 1MB)
    pub fn max_line_length(mut self, length: usize) -> Self {
        self.limits.max_line_length = length;
        self
    }

    /// Set the maximum depth of nested includes.
    ///
    /// # Parameters
    ///
    /// - `depth`: Maximum include depth (default: 64)
    ///
    /// # Examples
    ///
    /// ```text
    /// LoadOptions::builder().max_include_depth(8)
    /// ```
    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.limits.max_include_depth = depth;
        self
    }

    /// Set the maximum number of files in one graph.
    pub fn max_files(mut self, count: usize) -> Self {
        self.limits.max_files = count;
        self
    }

    /// Set the maximum declared vector length.
    pub fn max_vector_length(mut self, length: usize) -> Self {
        self.limits.max_vector_length = length;
        self
    }

    /// Set the maximum reference depth followed by a single read.
    pub fn max_evaluation_depth(mut self, depth: usize) -> Self {
        self.limits.max_evaluation_depth = depth;
        self
    }

    /// Replace all limits at once.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Enable or disable the implicit built-in defaults file.
    ///
    /// # Parameters
    ///
    /// - `enabled`: Whether leaf files include the defaults (default: true)
    pub fn built_in_defaults(mut self, enabled: bool) -> Self {
        self.built_in_defaults = enabled;
        self
    }

    /// Build the LoadOptions.
    pub fn build(self) -> LoadOptions {
        LoadOptions {
            limits: self.limits,
            built_in_defaults: self.built_in_defaults,
        }
    }
}

impl Default for LoadOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
