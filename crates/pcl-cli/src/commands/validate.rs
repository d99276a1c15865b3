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

//! Validate command - load a top file and resolve every parameter

use super::load_manager;
use colored::Colorize;

/// Load a PCL file with its includes and report whether it resolves.
///
/// # Errors
///
/// Returns `Err` with the resolution report if any file of the graph fails.
///
/// # Output
///
/// Prints a summary to stdout including:
/// - File validation status (✓ or ✗)
/// - Number of files in the chain
/// - Count of parameters, changeable parameters and time features
pub fn validate(file: &str) -> Result<(), String> {
    match load_manager(file) {
        Ok(pm) => {
            println!("{} {}", "✓".green().bold(), file);
            println!("  Files: {}", pm.chain_files().len());
            println!("  Parameters: {}", pm.parameter_names().len());
            println!("  Changeable: {}", pm.changeable_parameters().len());
            println!("  Time features: {}", pm.time_feature_names().len());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), file);
            Err(e.into())
        }
    }
}
