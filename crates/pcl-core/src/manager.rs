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

//! The parameter manager: the facade consumers read through.
//!
//! After load the graph is read concurrently through a [`RwLock`]. Edits
//! and time updates take a single change lock for the whole operation,
//! including the delivery of change notifications, so listeners observe
//! edits one at a time and may themselves read or edit parameters.

use crate::build::GraphBuilder;
use crate::declaration::{DeclarationStore, DUPLICATE_EXEMPT_PREFIX};
use crate::error::{ParamError, ParamResult};
use crate::errors::messages;
use crate::eval::Evaluator;
use crate::graph::{Graph, TRANSIENT_FILE, TRANSIENT_FILE_NAME};
use crate::name::{ParamKey, ParamName};
use crate::options::LoadOptions;
use crate::parameter::Parameter;
use crate::reader::{ParameterReader, ReadRequest};
use crate::source::{FileSource, FsSource};
use crate::units::UnitTable;
use crate::value::{Value, ValueKind};
use parking_lot::{Mutex, ReentrantMutex, RwLock, RwLockWriteGuard};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Placeholder shown for values that cannot be evaluated.
pub const UNDEFINED: &str = "Undefined";

/// Receives change notifications for one consumer.
pub trait ChangeListener: Send + Sync {
    /// `direct` is the name the consumer read that is now stale.
    fn on_change(&self, manager: &ParameterManager, direct: &ParamName);
}

impl<F> ChangeListener for F
where
    F: Fn(&ParameterManager, &ParamName) + Send + Sync,
{
    fn on_change(&self, manager: &ParameterManager, direct: &ParamName) {
        self(manager, direct)
    }
}

/// A consumer read `direct`, and its value depended on `base`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    pub base: ParamName,
    pub consumer: String,
    pub direct: ParamName,
}

/// Resolved parameters of one top file, with change tracking.
///
/// # Examples
///
/// ```text
/// use pcl_core::{ParameterManager, ParameterReader};
///
/// let pm = ParameterManager::from_path("run.txt")?;
/// let hlx = pm.get_double_in_unit("Ge/Box/HLX", "cm")?;
///
/// let ctx = pm.consumer("Box");
/// let hlx = ctx.get_double("Ge/Box/HLX", "Length")?;
/// drop(ctx);
///
/// for (consumer, name) in pm.apply_change("Ge/Box/HLX", "3 cm", false, false)? {
///     println!("{} must re-read {}", consumer, name);
/// }
/// ```
pub struct ParameterManager {
    graph: RwLock<Graph>,
    options: LoadOptions,
    change_lock: ReentrantMutex<()>,
    edges: Mutex<HashSet<DependencyEdge>>,
    listeners: RwLock<HashMap<String, Arc<dyn ChangeListener>>>,
    added: Mutex<Vec<(ParamKey, String, String)>>,
}

impl std::fmt::Debug for ParameterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterManager")
            .field("files", &self.graph.read().file_count())
            .field("edges", &self.edges.lock().len())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl ParameterManager {
    /// Load `top` and its includes from `source`.
    pub fn load(source: &dyn FileSource, top: &str, options: LoadOptions) -> ParamResult<Self> {
        let graph = GraphBuilder::new(source, &options).build(top)?;
        Ok(Self {
            graph: RwLock::new(graph),
            options,
            change_lock: ReentrantMutex::new(()),
            edges: Mutex::new(HashSet::new()),
            listeners: RwLock::new(HashMap::new()),
            added: Mutex::new(Vec::new()),
        })
    }

    /// Load a file from disk, resolving includes against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> ParamResult<Self> {
        Self::from_path_with(path, LoadOptions::default())
    }

    pub fn from_path_with(path: impl AsRef<Path>, options: LoadOptions) -> ParamResult<Self> {
        let path = path.as_ref();
        let root = path.parent().unwrap_or_else(|| Path::new(""));
        let top = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| messages::cannot_open(&path.display().to_string(), "not a file"))?;
        Self::load(&FsSource::new(root), &top, options)
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    // ==================== Reads ====================

    fn read_as(
        &self,
        consumer: Option<&str>,
        name: &str,
        request: ReadRequest<'_>,
    ) -> ParamResult<Value> {
        let graph = self.graph.read();
        let mut eval = Evaluator::new(&graph, &self.options.limits);
        let value = match request {
            ReadRequest::Any => eval.value_of(name),
            ReadRequest::Kind(kind) => eval.typed(name, kind),
            ReadRequest::Dimensioned(kind, category) => eval.dimensioned(name, kind, category),
        };

        // a failed read leaves nothing for a change to notify about
        if let (Some(consumer), true) = (consumer, value.is_ok()) {
            let direct = ParamName::new(name);
            let mut edges = self.edges.lock();
            for &id in eval.touched() {
                let edge = DependencyEdge {
                    base: graph.param(id).name().clone(),
                    consumer: consumer.to_string(),
                    direct: direct.clone(),
                };
                if !edges.contains(&edge) {
                    trace!("Dependency {} -> {} ({})", edge.base, edge.consumer, edge.direct);
                    edges.insert(edge);
                }
            }
        }
        value
    }

    /// Start a bracket of reads made on behalf of `consumer`.
    pub fn consumer(&self, consumer: impl Into<String>) -> ConsumerContext<'_> {
        ConsumerContext {
            manager: self,
            consumer: consumer.into(),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.graph.read().find_global(&ParamKey::new(name)).is_some()
    }

    fn with_param<T>(
        &self,
        name: &str,
        f: impl FnOnce(&Parameter) -> T,
    ) -> ParamResult<T> {
        let graph = self.graph.read();
        let id = graph
            .find_global(&ParamKey::new(name))
            .ok_or_else(|| messages::undefined(name))?;
        Ok(f(graph.param(id)))
    }

    pub fn type_of(&self, name: &str) -> ParamResult<ValueKind> {
        self.with_param(name, |p| p.kind())
    }

    /// Declared unit, `None` for kinds without one.
    pub fn unit_of(&self, name: &str) -> ParamResult<Option<String>> {
        self.with_param(name, |p| p.unit().map(str::to_string))
    }

    /// False for names that do not exist.
    pub fn is_changeable(&self, name: &str) -> bool {
        self.with_param(name, |p| p.is_changeable()).unwrap_or(false)
    }

    /// Number of elements of a vector parameter's current value.
    pub fn vector_length(&self, name: &str) -> ParamResult<usize> {
        let kind = self.type_of(name)?;
        if !kind.is_vector() {
            return Err(messages::wrong_kind(name, kind.vector(), kind));
        }
        Ok(self.get_value(name)?.len())
    }

    /// Current value formatted for reports, with dimensioned values in
    /// their declared unit. Values that fail to evaluate are shown as
    /// [`UNDEFINED`].
    pub fn value_as_string(&self, name: &str) -> String {
        match self.format_value(name) {
            Ok(text) => text,
            Err(e) => {
                warn!("Showing {} as {}: {}", name, UNDEFINED, e);
                UNDEFINED.to_string()
            }
        }
    }

    fn format_value(&self, name: &str) -> ParamResult<String> {
        let value = self.get_value(name)?;
        let unit = self.unit_of(name)?;
        Ok(match unit {
            Some(unit) if value.kind().has_unit() => {
                let factor = UnitTable::global().factor(&unit).unwrap_or(1.0);
                format!("{} {}", value.display_scaled(factor), unit)
            }
            _ => value.to_string(),
        })
    }

    // ==================== Queries ====================

    pub fn names_starting_with(&self, prefix: &str) -> Vec<String> {
        self.graph.read().names_starting_with(prefix)
    }

    pub fn names_bracketed_by(&self, prefix: &str, suffix: &str) -> Vec<String> {
        self.graph.read().names_bracketed_by(prefix, suffix)
    }

    /// Names of the `Value` parameters of every time feature.
    pub fn time_feature_names(&self) -> Vec<String> {
        self.graph.read().features().map(|f| f.value_name()).collect()
    }

    /// File names of the lookup chain, edits first.
    pub fn chain_files(&self) -> Vec<String> {
        let graph = self.graph.read();
        graph
            .chain(TRANSIENT_FILE)
            .into_iter()
            .map(|f| graph.file_name(f).to_string())
            .collect()
    }

    /// Files declaring `name` along the chain with their raw values,
    /// nearest first.
    pub fn values_in_chain(&self, name: &str) -> Vec<(String, String)> {
        self.graph.read().values_in_chain(&ParamKey::new(name))
    }

    /// Every visible parameter name, ordered by key.
    pub fn parameter_names(&self) -> Vec<String> {
        let graph = self.graph.read();
        graph
            .visible_parameters()
            .into_iter()
            .map(|id| graph.param(id).name().to_string())
            .collect()
    }

    pub fn changeable_parameters(&self) -> Vec<String> {
        let graph = self.graph.read();
        graph
            .visible_parameters()
            .into_iter()
            .map(|id| graph.param(id))
            .filter(|p| p.is_changeable())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Visible parameters never read since they were resolved.
    pub fn unused_parameters(&self) -> Vec<String> {
        let graph = self.graph.read();
        graph
            .visible_parameters()
            .into_iter()
            .map(|id| graph.param(id))
            .filter(|p| !p.was_used())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Committed edits as `(name, raw value)`, one per parameter in the
    /// order first edited, each holding its latest value.
    pub fn added_parameters(&self) -> Vec<(String, String)> {
        self.added
            .lock()
            .iter()
            .map(|(_, name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn dependency_edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self.edges.lock().iter().cloned().collect();
        edges.sort_by(|a, b| {
            (a.base.key(), &a.consumer, a.direct.key()).cmp(&(b.base.key(), &b.consumer, b.direct.key()))
        });
        edges
    }

    // ==================== Changes ====================

    pub fn register_listener(&self, consumer: impl Into<String>, listener: Arc<dyn ChangeListener>) {
        self.listeners.write().insert(consumer.into(), listener);
    }

    /// Distinct `(consumer, direct)` pairs that depend on `name`.
    pub fn change_notification(&self, name: &str) -> Vec<(String, ParamName)> {
        let key = ParamKey::new(name);
        let edges = self.edges.lock();
        let pairs: BTreeMap<(String, ParamKey), ParamName> = edges
            .iter()
            .filter(|e| *e.base.key() == key)
            .map(|e| ((e.consumer.clone(), e.direct.key().clone()), e.direct.clone()))
            .collect();
        pairs
            .into_iter()
            .map(|((consumer, _), direct)| (consumer, direct))
            .collect()
    }

    /// Declare `name` (optionally typed, `dc:Ge/Box/HLX`) with `raw_value`
    /// on top of everything loaded.
    ///
    /// With `test_only` the declaration is checked but not stored. Unless
    /// `permissive`, an existing parameter must be changeable. Returns the
    /// `(consumer, direct)` pairs notified.
    pub fn apply_change(
        &self,
        name: &str,
        raw_value: &str,
        test_only: bool,
        permissive: bool,
    ) -> ParamResult<Vec<(String, ParamName)>> {
        let _change = self.change_lock.lock();
        let in_transient = |e: ParamError| e.with_file(TRANSIENT_FILE_NAME);

        let mut store = DeclarationStore::with_redefinition();
        let decl_name = match store.add_declaration(name, raw_value, 0).map_err(in_transient)? {
            Some(decl) => decl.name.clone(),
            None => return Err(in_transient(messages::include_after_load().with_parameter(name))),
        };

        {
            let mut graph = self.graph.write();
            if !test_only && !permissive && !decl_name.key().starts_with(DUPLICATE_EXEMPT_PREFIX) {
                if let Some(id) = graph.find_global(decl_name.key()) {
                    if !graph.param(id).is_changeable() {
                        return Err(in_transient(
                            messages::not_changeable(decl_name.as_str())
                                .with_parameter(name)
                                .with_value(raw_value),
                        ));
                    }
                }
            }

            graph.process(TRANSIENT_FILE, store, &self.options.limits, !test_only)?;
            if test_only {
                return Ok(Vec::new());
            }
            reset_features(&graph, decl_name.key());
        }

        debug!("Applied change {} = {}", name, raw_value);
        {
            let mut added = self.added.lock();
            let (name, raw_value) = (name.to_string(), raw_value.to_string());
            match added.iter_mut().find(|(key, _, _)| key == decl_name.key()) {
                Some(slot) => {
                    slot.1 = name;
                    slot.2 = raw_value;
                }
                None => added.push((decl_name.key().clone(), name, raw_value)),
            }
        }
        Ok(self.deliver(decl_name.as_str()))
    }

    /// Notify every consumer of `name`, each `(consumer, direct)` once.
    fn deliver(&self, name: &str) -> Vec<(String, ParamName)> {
        let pairs = self.change_notification(name);
        for (consumer, direct) in &pairs {
            let listener = self.listeners.read().get(consumer).cloned();
            if let Some(listener) = listener {
                debug!("Notifying {} of {}", consumer, direct);
                listener.on_change(self, direct);
            }
        }
        pairs
    }

    /// Copy `old` to a new parameter `new` that reads it.
    pub fn clone_parameter(&self, old: &str, new: &str) -> ParamResult<()> {
        let (kind, unit) = self.with_param(old, |p| (p.kind(), p.unit().map(str::to_string)))?;
        let raw = match unit {
            Some(unit) => format!("{} {}", old, unit),
            None => old.to_string(),
        };
        self.apply_change(&format!("{}:{}", kind.prefix(), new), &raw, false, false)?;
        Ok(())
    }

    // ==================== Time ====================

    pub fn time(&self) -> f64 {
        self.graph.read().time()
    }

    /// Move the simulation clock to `t` (internal time units) and notify
    /// consumers of every time feature whose value changed.
    pub fn update_time(&self, t: f64) -> ParamResult<Vec<(String, ParamName)>> {
        let _change = self.change_lock.lock();
        let changed = {
            let mut graph = self.graph.write();
            graph.set_time(t);
            let graph = RwLockWriteGuard::downgrade(graph);
            let mut changed = Vec::new();
            for feature in graph.features() {
                let mut eval = Evaluator::new(&graph, &self.options.limits);
                if feature.has_changed(t, &mut eval)? {
                    changed.push(feature.value_name());
                }
            }
            changed
        };

        let mut pairs = Vec::new();
        for name in changed {
            pairs.extend(self.deliver(&name));
        }
        Ok(pairs)
    }
}

/// Forget cached time-feature values that an edit of `key` may affect.
fn reset_features(graph: &Graph, key: &ParamKey) {
    for feature in graph.features() {
        let base = feature.base().key();
        let affected = key
            .as_str()
            .strip_prefix(base.as_str())
            .map_or(false, |rest| rest.starts_with('/'));
        if affected {
            feature.reset();
        }
    }
}

impl ParameterReader for ParameterManager {
    fn read(&self, name: &str, request: ReadRequest<'_>) -> ParamResult<Value> {
        self.read_as(None, name, request)
    }
}

/// Reads made while a consumer builds itself. Every changeable
/// parameter a read touches is recorded as a dependency of the name read.
///
/// The bracket ends when the context is dropped or [`clear`](Self::clear)ed.
#[derive(Debug)]
pub struct ConsumerContext<'m> {
    manager: &'m ParameterManager,
    consumer: String,
}

impl ConsumerContext<'_> {
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn clear(self) {}
}

impl ParameterReader for ConsumerContext<'_> {
    fn read(&self, name: &str, request: ReadRequest<'_>) -> ParamResult<Value> {
        self.manager.read_as(Some(&self.consumer), name, request)
    }
}
