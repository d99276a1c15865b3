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

//! Parameter resolution engine for PCL parameter files.
//!
//! A PCL session starts from one top file. Each file may include parent
//! files with `includeFile`, forming a graph that is checked for
//! conflicting include chains and then flattened into a single lookup
//! chain. Every declaration is resolved into a typed [`Parameter`] whose
//! value is computed on read from literals, other parameters and the
//! simulation clock.
//!
//! # Reading
//!
//! [`ParameterManager`] is the entry point. Typed accessors come from the
//! [`ParameterReader`] trait, implemented both by the manager and by the
//! [`ConsumerContext`] handle a consumer reads through while it builds
//! itself:
//!
//! ```text
//! use pcl_core::{ParameterManager, ParameterReader};
//!
//! let pm = ParameterManager::from_path("run.txt")?;
//! let ctx = pm.consumer("Ge/Box");
//! let hlx = ctx.get_double("Ge/Box/HLX", "Length")?;
//! ```
//!
//! # Changes
//!
//! [`ParameterManager::apply_change`] declares a value on top of the loaded
//! files and notifies every consumer whose reads depended on it, each
//! `(consumer, name)` pair once. [`ParameterManager::update_time`] does the
//! same for time features whose value moved.
//!
//! # Errors
//!
//! Every failure is a [`ParamError`]; [`ParamError::report`] renders the
//! multi-line diagnostic naming the file, the declaration and the accepted
//! value forms.

mod build;
mod declaration;
mod defaults;
mod dump;
mod error;
pub mod errors;
mod eval;
mod graph;
mod limits;
pub mod loader;
mod manager;
mod name;
mod options;
mod parameter;
mod reader;
mod resolver;
mod source;
mod time_feature;
pub mod token;
pub mod units;
mod value;

pub use declaration::{
    is_never_changeable, Declaration, DeclarationStore, BUILT_IN_DEFAULTS, INCLUDE_FILE,
};
pub use defaults::BUILT_IN_DEFAULTS_TEXT;
pub use dump::{format_rows, DumpRow};
pub use error::{ParamError, ParamErrorKind, ParamResult};
pub use graph::TRANSIENT_FILE_NAME;
pub use limits::Limits;
pub use loader::{load_records, RawRecord};
pub use manager::{ChangeListener, ConsumerContext, DependencyEdge, ParameterManager, UNDEFINED};
pub use name::{part_after_last_slash, ParamKey, ParamName};
pub use options::{LoadOptions, LoadOptionsBuilder};
pub use parameter::{BinaryOp, Element, FileId, Operand, ParamId, Parameter, Plan, Ref};
pub use reader::{ParameterReader, ReadRequest};
pub use resolver::INHERITED_VALUE;
pub use source::{FileSource, FsSource, MemorySource};
pub use time_feature::{TimeFeature, TimeFunction};
pub use units::{UnitDef, UnitTable};
pub use value::{Value, ValueKind};
