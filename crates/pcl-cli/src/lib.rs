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

//! PCL CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! ## Loading & Editing
//!
//! - **validate**: Load a top file with its includes and resolve every parameter
//! - **get**: Print the value of one parameter, optionally in a chosen unit
//! - **set**: Apply a change on top of the loaded files and print the result
//!
//! ## Inspection
//!
//! - **dump**: Table (or JSON) of every parameter with its value and origin files
//! - **unused**: Parameters that nothing read
//! - **chain**: The linearized file chain, nearest first
//!
//! # Examples
//!
//! ```no_run
//! use pcl_cli::commands::{get, validate};
//!
//! # fn main() -> Result<(), String> {
//! validate("run.txt")?;
//! get("run.txt", "Ge/Box/HLX", Some("cm"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! The top file size is checked before loading and the engine enforces the
//! same ceiling for every include (configurable via `PCL_MAX_FILE_SIZE`).
//!
//! # Error Handling
//!
//! All commands return `Result<(), String>`. Resolution failures carry the
//! full multi-line diagnostic naming the file and the declaration.

pub mod cli;
pub mod commands;
pub mod error;
