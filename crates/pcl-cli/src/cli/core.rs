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

//! Core PCL commands for loading, reading and editing parameters.

use crate::commands;
use clap::Subcommand;

/// Core PCL commands.
#[derive(Subcommand)]
pub enum CoreCommands {
    /// Validate a PCL file and its includes
    ///
    /// Loads the top file, every included file and the built-in defaults,
    /// then checks the include chains and resolves every parameter.
    Validate {
        /// Top parameter file
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Print the value of one parameter
    Get {
        /// Top parameter file
        #[arg(value_name = "FILE")]
        file: String,

        /// Parameter name (case-insensitive)
        #[arg(value_name = "NAME")]
        name: String,

        /// Print a double as a bare number in this unit
        #[arg(short, long)]
        unit: Option<String>,
    },

    /// Apply a change after loading and print the new value
    ///
    /// The change is declared in the transient file on top of the chain,
    /// exactly as a running session would apply it.
    Set {
        /// Top parameter file
        #[arg(value_name = "FILE")]
        file: String,

        /// Parameter name, optionally typed (dc:Ge/Box/HLX)
        #[arg(value_name = "NAME")]
        name: String,

        /// Raw value, as it would appear after '=' in a file
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,

        /// Check the change without applying it
        #[arg(short, long)]
        test_only: bool,

        /// Allow changing parameters not declared changeable
        #[arg(short, long)]
        permissive: bool,
    },
}

impl CoreCommands {
    /// Execute the core command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the command execution fails.
    pub fn execute(self) -> Result<(), String> {
        match self {
            CoreCommands::Validate { file } => commands::validate(&file),
            CoreCommands::Get { file, name, unit } => commands::get(&file, &name, unit.as_deref()),
            CoreCommands::Set {
                file,
                name,
                value,
                test_only,
                permissive,
            } => commands::set(&file, &name, &value, test_only, permissive),
        }
    }
}
