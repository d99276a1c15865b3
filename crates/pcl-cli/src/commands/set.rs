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

//! Set command - apply one change on top of the loaded files

use super::load_manager;
use crate::error::CliError;
use colored::Colorize;
use pcl_core::ParameterReader;

/// Declare `name = value` on top of the loaded files.
///
/// `name` may carry a type prefix (`dc:Ge/Box/HLX`) to introduce a new
/// parameter. With `test_only` the change is checked and discarded.
/// Unless `permissive`, an existing parameter must be changeable.
///
/// # Errors
///
/// Returns `Err` if loading fails or the change is rejected.
pub fn set(
    file: &str,
    name: &str,
    value: &str,
    test_only: bool,
    permissive: bool,
) -> Result<(), String> {
    let pm = load_manager(file)?;
    let notified = pm
        .apply_change(name, value, test_only, permissive)
        .map_err(CliError::from)?;

    if test_only {
        println!("{} {} = {} (not applied)", "✓".green().bold(), name, value);
        return Ok(());
    }

    let bare = name.rsplit_once(':').map_or(name, |(_, bare)| bare);
    pm.get_value(bare).map_err(CliError::from)?;
    println!("{} = {}", bare, pm.value_as_string(bare));
    println!("  Notified: {}", notified.len());
    Ok(())
}
