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

//! Loading a file graph from a [`FileSource`].

use crate::declaration::{DeclarationStore, BUILT_IN_DEFAULTS};
use crate::defaults::BUILT_IN_DEFAULTS_TEXT;
use crate::error::{ParamError, ParamResult};
use crate::errors::messages;
use crate::graph::{Graph, TRANSIENT_FILE};
use crate::loader::load_records;
use crate::options::LoadOptions;
use crate::parameter::FileId;
use crate::source::FileSource;
use std::collections::HashMap;
use tracing::debug;

/// Loads files depth first, each distinct spec exactly once.
pub(crate) struct GraphBuilder<'a> {
    source: &'a dyn FileSource,
    options: &'a LoadOptions,
    graph: Graph,
    loaded: HashMap<String, FileId>,
    /// Specs currently being loaded, outermost first.
    stack: Vec<String>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(source: &'a dyn FileSource, options: &'a LoadOptions) -> Self {
        Self {
            source,
            options,
            graph: Graph::new(),
            loaded: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Load `top` and everything it includes, then root the chain at the
    /// transient file.
    pub fn build(mut self, top: &str) -> ParamResult<Graph> {
        let top = self.load(top)?;
        self.graph.set_includes(TRANSIENT_FILE, vec![top]);
        self.graph.process(
            TRANSIENT_FILE,
            DeclarationStore::with_redefinition(),
            &self.options.limits,
            true,
        )?;
        debug!(
            "Parameter graph ready: {} files",
            self.graph.file_count() - 1
        );
        Ok(self.graph)
    }

    fn load(&mut self, spec: &str) -> ParamResult<FileId> {
        if let Some(&id) = self.loaded.get(spec) {
            return Ok(id);
        }

        let limits = &self.options.limits;
        let in_file = |e: ParamError| e.with_file(spec);
        if self.stack.iter().any(|s| s == spec) {
            return Err(in_file(messages::include_cycle(spec)));
        }
        if self.stack.len() >= limits.max_include_depth {
            return Err(in_file(messages::include_too_deep(limits.max_include_depth)));
        }
        if self.loaded.len() + self.stack.len() >= limits.max_files {
            return Err(in_file(messages::too_many_files(limits.max_files)));
        }

        self.stack.push(spec.to_string());
        let result = self.load_file(spec);
        self.stack.pop();
        result
    }

    fn load_file(&mut self, spec: &str) -> ParamResult<FileId> {
        let options = self.options;
        let in_file = |e: ParamError| e.with_file(spec);

        let bytes = if spec == BUILT_IN_DEFAULTS {
            BUILT_IN_DEFAULTS_TEXT.as_bytes().to_vec()
        } else {
            self.source.read(spec).map_err(in_file)?
        };

        let mut store = DeclarationStore::new();
        for record in load_records(&bytes, &options.limits).map_err(in_file)? {
            store
                .add_declaration(&record.name, &record.value, record.line)
                .map_err(in_file)?;
        }

        let specs = store.include_specs().to_vec();
        let mut includes = Vec::with_capacity(specs.len().max(1));
        for include in &specs {
            includes.push(self.load(include)?);
        }
        if specs.is_empty() && spec != BUILT_IN_DEFAULTS && options.built_in_defaults {
            includes.push(self.load(BUILT_IN_DEFAULTS)?);
        }

        debug!(
            "Loaded {}: {} declarations, {} includes",
            spec,
            store.len(),
            includes.len()
        );
        let id = self.graph.add_file(spec, includes);
        self.loaded.insert(spec.to_string(), id);
        self.graph.process(id, store, &options.limits, true)?;
        Ok(id)
    }
}
