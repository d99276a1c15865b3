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

//! Unused command - parameters that nothing read

use super::load_manager;
use crate::error::CliError;
use pcl_core::ParameterReader;
use tracing::debug;

/// Read every parameter under each of `prefixes`, then list the ones never
/// read.
///
/// Reading a parameter also reads whatever it references, so the listed
/// names are those outside every prefix and not referenced from inside one.
///
/// # Errors
///
/// Returns `Err` if loading fails or a parameter under a prefix cannot be
/// evaluated.
pub fn unused(file: &str, prefixes: &[String]) -> Result<(), String> {
    let pm = load_manager(file)?;
    for prefix in prefixes {
        let names = pm.names_starting_with(prefix);
        debug!("Reading {} parameters under {}", names.len(), prefix);
        for name in names {
            pm.get_value(&name).map_err(CliError::from)?;
        }
    }

    for name in pm.unused_parameters() {
        println!("{}", name);
    }
    Ok(())
}
