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

//! CLI command definitions and argument parsing.
//!
//! - [`core`]: Loading and editing commands (validate, get, set)
//! - [`inspect`]: Inspection commands (dump, unused, chain)

mod core;
mod inspect;

use clap::Subcommand;

pub use core::CoreCommands;
pub use inspect::InspectCommands;

/// Top-level CLI commands enum.
///
/// ```text
/// Commands
/// ├── Core (validate, get, set)
/// └── Inspect (dump, unused, chain)
/// ```
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use pcl_cli::cli::Commands;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand)]
pub enum Commands {
    // Core commands - flattened to appear at top level
    #[command(flatten)]
    Core(CoreCommands),

    // Inspection commands - flattened to appear at top level
    #[command(flatten)]
    Inspect(InspectCommands),
}

impl Commands {
    /// Execute the command with the provided arguments.
    ///
    /// # Errors
    ///
    /// Returns `Err` with a printable message if the command fails.
    pub fn execute(self) -> Result<(), String> {
        match self {
            Commands::Core(cmd) => cmd.execute(),
            Commands::Inspect(cmd) => cmd.execute(),
        }
    }
}
