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

//! Where file text comes from.

use crate::error::ParamResult;
use crate::errors::messages;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies the raw bytes of a file named by an include spec.
pub trait FileSource {
    fn read(&self, spec: &str) -> ParamResult<Vec<u8>>;
}

/// Files on disk, with include specs resolved against `root`.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSource for FsSource {
    fn read(&self, spec: &str) -> ParamResult<Vec<u8>> {
        let path = self.root.join(spec);
        std::fs::read(&path).map_err(|e| messages::cannot_open(spec, &e.to_string()))
    }
}

/// Files held in memory, keyed by spec.
///
/// # Examples
///
/// ```text
/// let source = MemorySource::new()
///     .with_file("top.txt", "includeFile = base.txt\nd:Ge/Box/HLX = 2 cm")
///     .with_file("base.txt", "d:Ge/Box/HLX = 1 cm");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, spec: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(spec, text);
        self
    }

    pub fn insert(&mut self, spec: impl Into<String>, text: impl Into<String>) {
        self.files.insert(spec.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSource for MemorySource {
    fn read(&self, spec: &str) -> ParamResult<Vec<u8>> {
        self.files
            .get(spec)
            .map(|text| text.as_bytes().to_vec())
            .ok_or_else(|| messages::cannot_open(spec, "no such file"))
    }
}
