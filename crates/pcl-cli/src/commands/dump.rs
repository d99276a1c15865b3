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

//! Dump command - every parameter with its value and origin files

use super::{load_manager, write_output};
use crate::error::CliError;
use pcl_core::format_rows;

/// Dump parameters as a text table or JSON.
///
/// # Arguments
///
/// * `file` - Top parameter file
/// * `format` - `text` or `json`
/// * `prefix` - Only names starting with this prefix (any case)
///
/// # Errors
///
/// Returns `Err` if loading fails or `format` is not recognised.
pub fn dump(file: &str, format: &str, prefix: Option<&str>) -> Result<(), String> {
    let pm = load_manager(file)?;
    let rows = match prefix {
        Some(prefix) => pm.dump_matching(prefix),
        None => pm.dump(),
    };

    let output = match format {
        "text" => format_rows(&rows),
        "json" => {
            let mut json = serde_json::to_string_pretty(&rows).map_err(CliError::from)?;
            json.push('\n');
            json
        }
        _ => {
            return Err(CliError::invalid_input(format!(
                "unknown format '{}', expected 'text' or 'json'",
                format
            ))
            .into())
        }
    };
    write_output(&output)?;
    Ok(())
}
