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

//! The file graph: an arena of source files and resolved parameters.
//!
//! Files and parameters live in two vectors and refer to each other by
//! [`FileId`] and [`ParamId`]. Includes are kept as written for the
//! conflict checks, and each file also gets a single `parent` link once
//! its include graph has been linearized. After that, every lookup is a
//! walk up the parent links.

use crate::declaration::{Declaration, DeclarationStore};
use crate::error::{ParamError, ParamResult};
use crate::errors::messages;
use crate::limits::Limits;
use crate::name::{part_through_last_slash, ParamKey, ParamName};
use crate::parameter::{FileId, Operand, ParamId, Parameter, Plan, Ref};
use crate::resolver::{self, Scope};
use crate::time_feature::{feature_base, TimeFeature};
use crate::units::UnitTable;
use crate::value::ValueKind;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Root of every lookup chain. Edits made after load are stored here.
pub(crate) const TRANSIENT_FILE: FileId = FileId(0);

/// Bound on reference hops followed to find a declared vector length.
const MAX_LENGTH_DEPTH: usize = 64;

/// Display name of the transient file.
pub const TRANSIENT_FILE_NAME: &str = "TransientParameters";

/// Prefix and last segment of names that select which component a
/// parameter family configures. Changing one of these in a sibling chain
/// while another chain defines the family is rejected.
const ARMS: &[(&str, &str)] = &[
    ("ma/", "/components"),
    ("ge/", "/type"),
    ("so/", "/type"),
    ("sc/", "/quantity"),
    ("tf/", "/function"),
    ("gr/", "/type"),
    ("ph/", "/type"),
    ("vr/", "/type"),
];

/// One parameter file and the parameters resolved from it.
#[derive(Debug)]
pub(crate) struct SourceFile {
    pub name: String,
    /// Set by linearization.
    pub parent: Option<FileId>,
    pub includes: Vec<FileId>,
    pub params: HashMap<ParamKey, ParamId>,
}

impl SourceFile {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            includes: Vec::new(),
            params: HashMap::new(),
        }
    }
}

/// Arena of files and parameters.
#[derive(Debug)]
pub(crate) struct Graph {
    files: Vec<SourceFile>,
    params: Vec<Parameter>,
    features: BTreeMap<ParamKey, TimeFeature>,
    time: f64,
}

impl Graph {
    /// A graph holding only the transient file.
    pub fn new() -> Self {
        Self {
            files: vec![SourceFile::new(TRANSIENT_FILE_NAME)],
            params: Vec::new(),
            features: BTreeMap::new(),
            time: 0.0,
        }
    }

    pub fn add_file(&mut self, name: &str, includes: Vec<FileId>) -> FileId {
        let id = FileId(self.files.len());
        let mut file = SourceFile::new(name);
        file.includes = includes;
        self.files.push(file);
        id
    }

    pub fn set_includes(&mut self, file: FileId, includes: Vec<FileId>) {
        self.files[file.0].includes = includes;
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_name(&self, file: FileId) -> &str {
        &self.files[file.0].name
    }

    pub fn parent(&self, file: FileId) -> Option<FileId> {
        self.files[file.0].parent
    }

    pub fn param(&self, id: ParamId) -> &Parameter {
        &self.params[id.0]
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    // ==================== Lookups ====================

    /// Nearest declaration of `key` walking up from `from`.
    pub fn find(&self, from: FileId, key: &ParamKey) -> Option<ParamId> {
        let mut current = Some(from);
        while let Some(file) = current {
            let file = &self.files[file.0];
            if let Some(&id) = file.params.get(key) {
                return Some(id);
            }
            current = file.parent;
        }
        None
    }

    /// Lookup through the whole chain, edits first.
    pub fn find_global(&self, key: &ParamKey) -> Option<ParamId> {
        self.find(TRANSIENT_FILE, key)
    }

    /// Files of the chain starting at `from`, nearest first.
    pub fn chain(&self, from: FileId) -> Vec<FileId> {
        let mut chain = Vec::new();
        let mut current = Some(from);
        while let Some(file) = current {
            chain.push(file);
            current = self.files[file.0].parent;
        }
        chain
    }

    /// Pre-order walk of the include graph below `from`, each file once.
    fn preorder(&self, from: FileId) -> Vec<FileId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(file) = stack.pop() {
            if !seen.insert(file) {
                continue;
            }
            order.push(file);
            stack.extend(self.files[file.0].includes.iter().rev().copied());
        }
        order
    }

    /// First declaration of `key` in a pre-order walk of the includes.
    fn find_unlinearized(&self, from: FileId, key: &ParamKey) -> Option<ParamId> {
        self.preorder(from)
            .into_iter()
            .find_map(|file| self.files[file.0].params.get(key).copied())
    }

    /// Every name reachable from `from` through includes, first found wins.
    fn collect_unlinearized(&self, from: FileId) -> BTreeMap<ParamKey, ParamId> {
        let mut all = BTreeMap::new();
        for file in self.preorder(from) {
            for (key, &id) in &self.files[file.0].params {
                all.entry(key.clone()).or_insert(id);
            }
        }
        all
    }

    /// Names of the files reachable from `from`, in pre-order.
    fn chain_names(&self, from: FileId) -> Vec<String> {
        self.preorder(from)
            .into_iter()
            .map(|file| self.files[file.0].name.clone())
            .collect()
    }

    /// Pre-order list of `file` and its includes, repeats kept.
    fn build_vector(&self, file: FileId, vector: &mut Vec<FileId>) {
        vector.push(file);
        for &include in &self.files[file.0].includes {
            self.build_vector(include, vector);
        }
    }

    /// Flatten the include graph of `file` into a single parent chain.
    ///
    /// Walking the pre-order list backwards, each file not yet linked is
    /// given the previously linked file as its parent. A file included
    /// more than once therefore sits at its last position in the list.
    pub fn linearize(&mut self, file: FileId) {
        let mut vector = Vec::new();
        self.build_vector(file, &mut vector);
        for &f in &vector {
            self.files[f.0].parent = None;
        }

        let Some(&first) = vector.last() else {
            return;
        };
        let mut previous = first;
        for &current in vector.iter().rev() {
            if current != first && self.files[current.0].parent.is_none() {
                self.files[current.0].parent = Some(previous);
                previous = current;
            }
        }

        debug!(
            "Linearized chain of {}: {}",
            self.files[file.0].name,
            self.chain(file)
                .iter()
                .map(|f| self.files[f.0].name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
    }

    // ==================== Queries ====================

    /// Every visible parameter, nearest declaration per name, ordered by key.
    pub fn visible_parameters(&self) -> Vec<ParamId> {
        let mut all = BTreeMap::new();
        for file in self.chain(TRANSIENT_FILE) {
            for (key, &id) in &self.files[file.0].params {
                all.entry(key).or_insert(id);
            }
        }
        all.into_values().collect()
    }

    /// Display names of visible parameters longer than `prefix` that start with it.
    pub fn names_starting_with(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.visible_parameters()
            .into_iter()
            .map(|id| self.param(id))
            .filter(|p| {
                let key = p.name.key();
                key.as_str().len() > prefix.len() && key.starts_with(&prefix)
            })
            .map(|p| p.name.to_string())
            .collect()
    }

    /// Display names of visible parameters that start with `prefix` and
    /// end with `suffix`, with something in between.
    pub fn names_bracketed_by(&self, prefix: &str, suffix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let suffix = suffix.to_lowercase();
        self.visible_parameters()
            .into_iter()
            .map(|id| self.param(id))
            .filter(|p| {
                let key = p.name.key();
                key.as_str().len() > prefix.len() + suffix.len()
                    && key.starts_with(&prefix)
                    && key.ends_with(&suffix)
            })
            .map(|p| p.name.to_string())
            .collect()
    }

    /// Raw values of `key` in every chain file declaring it, nearest first.
    pub fn values_in_chain(&self, key: &ParamKey) -> Vec<(String, String)> {
        self.chain(TRANSIENT_FILE)
            .into_iter()
            .filter_map(|file| {
                let file = &self.files[file.0];
                file.params
                    .get(key)
                    .map(|&id| (file.name.clone(), self.param(id).raw_value.clone()))
            })
            .collect()
    }

    pub fn feature(&self, base: &ParamKey) -> Option<&TimeFeature> {
        self.features.get(base)
    }

    pub fn features(&self) -> impl Iterator<Item = &TimeFeature> {
        self.features.values()
    }

    /// Store `param` in `file`, replacing any earlier parameter of the same name.
    fn insert_parameter(&mut self, file: FileId, param: Parameter) -> ParamId {
        if let Some(&id) = self.files[file.0].params.get(param.name.key()) {
            self.params[id.0] = param;
            return id;
        }
        let id = ParamId(self.params.len());
        let key = param.name.key().clone();
        self.params.push(param);
        self.files[file.0].params.insert(key, id);
        id
    }

    // ==================== Processing ====================

    /// Resolve the declarations of `file` against its includes.
    ///
    /// Runs the chain conflict checks, type inference from the includes,
    /// time-feature synthesis, linearization, resolution of every
    /// declaration and the unit and length cross-checks. With `commit` unset the
    /// file is checked but nothing is stored and its chain is left as is.
    pub fn process(
        &mut self,
        file: FileId,
        mut store: DeclarationStore,
        limits: &Limits,
        commit: bool,
    ) -> ParamResult<Vec<ParamId>> {
        let name = self.files[file.0].name.clone();
        let in_file = |e: ParamError| e.with_file(name.as_str());

        self.check_chains(file, &mut store).map_err(in_file)?;
        self.infer_types(file, &mut store).map_err(in_file)?;
        let features = synthesize_features(&mut store).map_err(in_file)?;

        if commit {
            self.linearize(file);
        }

        let candidates = self
            .resolve_declarations(file, &store, &features, limits)
            .map_err(in_file)?;
        self.check_units(file, &candidates).map_err(in_file)?;
        self.check_lengths(file, &candidates).map_err(in_file)?;

        if !commit {
            return Ok(Vec::new());
        }

        let ids: Vec<ParamId> = candidates
            .into_iter()
            .map(|param| self.insert_parameter(file, param))
            .collect();
        for feature in features {
            self.features.insert(feature.base().key().clone(), feature);
        }
        debug!("Resolved {} parameters in {}", ids.len(), name);
        Ok(ids)
    }

    /// Reject names set differently in two include chains of `file`.
    fn check_chains(&self, file: FileId, store: &mut DeclarationStore) -> ParamResult<()> {
        let includes = self.files[file.0].includes.clone();
        if includes.len() < 2 {
            return Ok(());
        }

        for (i, &include1) in includes.iter().enumerate() {
            let all1 = self.collect_unlinearized(include1);

            for (key, &id1) in &all1 {
                for &include2 in &includes[i + 1..] {
                    let Some(id2) = self.find_unlinearized(include2, key) else {
                        continue;
                    };
                    if id2 == id1 {
                        continue;
                    }
                    match store.get_mut(key) {
                        Some(decl) => decl.must_be_absolute = true,
                        None => {
                            return Err(messages::ambiguous_chain(
                                &self.files[file.0].name,
                                &self.chain_names(include1),
                                &self.chain_names(include2),
                            )
                            .with_parameter(self.param(id1).name.as_str()));
                        }
                    }
                }

                let Some(suffix) = ARMS
                    .iter()
                    .find(|(prefix, suffix)| key.starts_with(prefix) && key.ends_with(suffix))
                    .map(|(_, suffix)| *suffix)
                else {
                    continue;
                };
                if key.as_str().len() <= suffix.len() {
                    continue;
                }
                let family = part_through_last_slash(key.as_str());

                for &include2 in includes.iter().filter(|&&f| f != include1) {
                    for (other_key, &other_id) in &self.collect_unlinearized(include2) {
                        if part_through_last_slash(other_key.as_str()) != family {
                            continue;
                        }
                        if self.find_unlinearized(include1, other_key) != Some(other_id) {
                            return Err(messages::different_arms(
                                &self.chain_names(include1),
                                self.param(other_id).name.as_str(),
                                &self.chain_names(include2),
                            )
                            .with_parameter(self.param(id1).name.as_str()));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Fill missing types from the includes and check declared ones.
    fn infer_types(&self, file: FileId, store: &mut DeclarationStore) -> ParamResult<()> {
        let in_transient = file == TRANSIENT_FILE;
        // Earlier edits count as ancestors of later ones.
        let roots = if in_transient {
            vec![TRANSIENT_FILE]
        } else {
            self.files[file.0].includes.clone()
        };
        for decl in store.iter_mut() {
            for &include in &roots {
                let Some(id) = self.find_unlinearized(include, decl.name.key()) else {
                    continue;
                };
                let existing = self.param(id);
                match decl.kind {
                    None => {
                        decl.kind = Some(existing.kind);
                        decl.changeable = existing.changeable;
                    }
                    Some(kind) if kind != existing.kind => {
                        return Err(in_declaration(
                            decl,
                            messages::type_differs_between_files(existing.kind, kind),
                        ));
                    }
                    Some(_) if decl.changeable != existing.changeable => {
                        let e = if in_transient {
                            messages::override_non_changeable()
                        } else {
                            messages::changeable_differs()
                        };
                        return Err(in_declaration(decl, e));
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    fn resolve_declarations(
        &self,
        file: FileId,
        store: &DeclarationStore,
        features: &[TimeFeature],
        limits: &Limits,
    ) -> ParamResult<Vec<Parameter>> {
        let scope = FileScope {
            graph: self,
            file,
            store,
        };
        let feature_values: HashMap<ParamKey, &TimeFeature> = features
            .iter()
            .map(|f| (ParamKey::new(&f.value_name()), f))
            .collect();

        let mut resolved = Vec::with_capacity(store.len());
        for decl in store.iter() {
            let kind = decl
                .kind
                .ok_or_else(|| in_declaration(decl, messages::unknown_type()))?;

            let (plan, unit) = match feature_values.get(decl.name.key()) {
                Some(feature) => (
                    Plan::TimeFeature(feature.base().key().clone()),
                    feature.unit().map(str::to_string),
                ),
                None => {
                    let r = resolver::resolve(decl, kind, &scope, limits)?;
                    if decl.must_be_absolute && r.plan.is_relative() {
                        return Err(in_declaration(decl, messages::must_be_absolute()));
                    }
                    (r.plan, r.unit)
                }
            };

            resolved.push(Parameter::new(
                decl.name.clone(),
                kind,
                decl.changeable,
                unit,
                decl.raw_value.clone(),
                file,
                plan,
            ));
        }
        Ok(resolved)
    }

    /// Parameter a reference of `owner` (declared in `file`) reads,
    /// preferring the file's own candidates.
    fn target<'a>(
        &'a self,
        file: FileId,
        local: &HashMap<&ParamKey, &'a Parameter>,
        owner: &Parameter,
        reference: &Ref,
    ) -> Option<&'a Parameter> {
        match reference {
            Ref::Named(name) => local
                .get(name.key())
                .copied()
                .or_else(|| self.find(file, name.key()).map(|id| self.param(id))),
            Ref::Inherited => self
                .parent(file)
                .and_then(|parent| self.find(parent, owner.name.key()))
                .map(|id| self.param(id)),
        }
    }

    /// Dimensioned parameters must agree in unit category with the
    /// dimensioned parameters they read.
    fn check_units(&self, file: FileId, candidates: &[Parameter]) -> ParamResult<()> {
        let units = UnitTable::global();
        let local: HashMap<&ParamKey, &Parameter> =
            candidates.iter().map(|p| (p.name.key(), p)).collect();

        for param in candidates.iter().filter(|p| p.kind.has_unit()) {
            let Some(category) = param.unit().and_then(|u| units.category(u)) else {
                continue;
            };
            for reference in param.plan.all_refs() {
                let Some(target) = self
                    .target(file, &local, param, reference)
                    .filter(|t| t.kind.has_unit())
                else {
                    continue;
                };
                let Some(other) = target.unit().and_then(|u| units.category(u)) else {
                    continue;
                };
                if other != category {
                    return Err(messages::unit_disagreement(
                        target.name.as_str(),
                        category,
                        other,
                    )
                    .with_parameter(param.qualified_name())
                    .with_value(param.raw_value.as_str()));
                }
            }
        }
        Ok(())
    }

    /// Both sides of a vector expression must have the same length when
    /// both lengths are fixed by the declarations.
    fn check_lengths(&self, file: FileId, candidates: &[Parameter]) -> ParamResult<()> {
        let local: HashMap<&ParamKey, &Parameter> =
            candidates.iter().map(|p| (p.name.key(), p)).collect();

        for param in candidates.iter().filter(|p| p.kind.is_vector()) {
            let Plan::Binary { lhs, rhs, .. } = &param.plan else {
                continue;
            };
            let left = self.operand_length(file, &local, param, lhs, 0);
            let right = self.operand_length(file, &local, param, rhs, 0);
            if let (Some(left), Some(right)) = (left, right) {
                if left != right {
                    let other = rhs
                        .reference()
                        .map(|r| match r {
                            Ref::Named(name) => name.to_string(),
                            Ref::Inherited => param.name.to_string(),
                        })
                        .unwrap_or_else(|| param.name.to_string());
                    return Err(messages::vector_length_mismatch(&other, left, right)
                        .with_parameter(param.qualified_name())
                        .with_value(param.raw_value.as_str()));
                }
            }
        }
        Ok(())
    }

    /// Declared length of a vector operand, `None` for scalars and for
    /// lengths only known once evaluated.
    fn operand_length(
        &self,
        file: FileId,
        local: &HashMap<&ParamKey, &Parameter>,
        owner: &Parameter,
        operand: &Operand,
        depth: usize,
    ) -> Option<usize> {
        match operand {
            Operand::Literal(value) => value.kind().is_vector().then(|| value.len()),
            Operand::List { elements, .. } => Some(elements.len()),
            Operand::Param(reference) => {
                let target = self.target(file, local, owner, reference)?;
                self.declared_length(target, depth + 1)
            }
        }
    }

    fn declared_length(&self, param: &Parameter, depth: usize) -> Option<usize> {
        if depth > MAX_LENGTH_DEPTH || !param.kind.is_vector() {
            return None;
        }
        let none = HashMap::new();
        match &param.plan {
            Plan::Literal(value) => Some(value.len()),
            Plan::List { elements, .. } => Some(elements.len()),
            Plan::Reference(reference) => {
                let target = self.target(param.file, &none, param, reference)?;
                self.declared_length(target, depth + 1)
            }
            Plan::Binary { lhs, rhs, .. } => self
                .operand_length(param.file, &none, param, lhs, depth)
                .or_else(|| self.operand_length(param.file, &none, param, rhs, depth)),
            Plan::TimeFeature(_) => None,
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

fn in_declaration(decl: &Declaration, e: ParamError) -> ParamError {
    e.with_parameter(decl.qualified_name())
        .with_value(decl.raw_value.as_str())
        .with_line(decl.line)
}

/// Build the time features declared in `store` and add their `Value`
/// declarations to it.
fn synthesize_features(store: &mut DeclarationStore) -> ParamResult<Vec<TimeFeature>> {
    let mut features = Vec::new();
    for decl in store.iter() {
        let Some((base, is_values)) = feature_base(decl.name.key().as_str()) else {
            continue;
        };
        let base = ParamName::new(decl.name.as_str().get(..base.len()).unwrap_or(base));
        let feature = if is_values {
            match decl.kind {
                Some(kind) => TimeFeature::from_values(base, kind, &decl.raw_value).map(Some),
                None => Ok(None),
            }
        } else {
            TimeFeature::from_function(base, &decl.raw_value)
        };
        match feature {
            Ok(Some(feature)) => features.push((feature, decl.line)),
            Ok(None) => {}
            Err(e) => return Err(in_declaration(decl, e)),
        }
    }

    let mut synthesized = Vec::with_capacity(features.len());
    for (feature, line) in features {
        store.insert(Declaration {
            name: ParamName::new(&feature.value_name()),
            kind: Some(feature.kind()),
            raw_value: feature.placeholder(),
            changeable: true,
            must_be_absolute: false,
            line,
        });
        synthesized.push(feature);
    }
    Ok(synthesized)
}

/// What the resolver sees while resolving one file.
struct FileScope<'a> {
    graph: &'a Graph,
    file: FileId,
    store: &'a DeclarationStore,
}

impl Scope for FileScope<'_> {
    fn kind_of(&self, key: &ParamKey) -> Option<ValueKind> {
        self.store.get(key).and_then(|d| d.kind).or_else(|| {
            self.graph
                .find(self.file, key)
                .map(|id| self.graph.param(id).kind)
        })
    }

    fn inherited_unit(&self, key: &ParamKey) -> Option<String> {
        let parent = self.graph.parent(self.file)?;
        let id = self.graph.find(parent, key)?;
        self.graph.param(id).unit.clone()
    }
}
