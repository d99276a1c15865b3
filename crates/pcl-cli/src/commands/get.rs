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

//! Get command - print the value of one parameter

use super::load_manager;
use crate::error::CliError;
use pcl_core::ParameterReader;

/// Print one parameter's value.
///
/// Without `unit` the value is printed in its declared unit, the way a
/// dump shows it. With `unit` the parameter must be a double and the bare
/// number is printed in that unit.
///
/// # Errors
///
/// Returns `Err` if loading fails, the name is undefined, or its value
/// cannot be computed or converted.
pub fn get(file: &str, name: &str, unit: Option<&str>) -> Result<(), String> {
    let pm = load_manager(file)?;
    match unit {
        Some(unit) => {
            let value = pm.get_double_in_unit(name, unit).map_err(CliError::from)?;
            println!("{}", value);
        }
        None => {
            // surface the failure instead of the dump-mode placeholder
            pm.get_value(name).map_err(CliError::from)?;
            println!("{}", pm.value_as_string(name));
        }
    }
    Ok(())
}
