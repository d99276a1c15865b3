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

//! Inspection commands for dumps, unused parameters and file chains.

use crate::commands;
use clap::Subcommand;

/// Inspection commands.
#[derive(Subcommand)]
pub enum InspectCommands {
    /// Dump every parameter with its type, value and origin files
    Dump {
        /// Top parameter file
        #[arg(value_name = "FILE")]
        file: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Only parameters whose names start with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// List parameters that were never read
    ///
    /// Every parameter under each --prefix is read first, standing in for
    /// the consumers of a real session.
    Unused {
        /// Top parameter file
        #[arg(value_name = "FILE")]
        file: String,

        /// Read every parameter under this prefix (repeatable)
        #[arg(long = "prefix", value_name = "PREFIX")]
        prefixes: Vec<String>,
    },

    /// Print the linearized file chain, nearest first
    Chain {
        /// Top parameter file
        #[arg(value_name = "FILE")]
        file: String,
    },
}

impl InspectCommands {
    /// Execute the inspection command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the command execution fails.
    pub fn execute(self) -> Result<(), String> {
        match self {
            InspectCommands::Dump {
                file,
                format,
                prefix,
            } => commands::dump(&file, &format, prefix.as_deref()),
            InspectCommands::Unused { file, prefixes } => commands::unused(&file, &prefixes),
            InspectCommands::Chain { file } => commands::chain(&file),
        }
    }
}
