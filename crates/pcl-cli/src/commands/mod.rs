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

//! CLI command implementations

mod chain;
mod dump;
mod get;
mod set;
mod unused;
mod validate;

pub use chain::chain;
pub use dump::dump;
pub use get::get;
pub use set::set;
pub use unused::unused;
pub use validate::validate;

use crate::error::CliError;
use pcl_core::{LoadOptions, ParameterManager};
use std::fs;
use std::io::{self, Write};
use tracing::debug;

/// Default maximum file size (64 MB), matching the engine's own limit.
/// Can be overridden via PCL_MAX_FILE_SIZE environment variable
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Get the maximum file size from environment or use default.
///
/// Falls back to [`DEFAULT_MAX_FILE_SIZE`] if `PCL_MAX_FILE_SIZE` is not
/// set or does not parse.
fn get_max_file_size() -> u64 {
    std::env::var("PCL_MAX_FILE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Load options for CLI sessions: engine defaults with the file-size
/// ceiling taken from the environment.
pub fn load_options() -> LoadOptions {
    let max = usize::try_from(get_max_file_size()).unwrap_or(usize::MAX);
    LoadOptions::builder().max_file_size(max).build()
}

/// Load a top file and its includes from disk.
///
/// The top file's size is checked against the ceiling before anything is
/// read; includes are checked by the engine as they load.
///
/// # Errors
///
/// Returns `Err` if the file metadata cannot be read, the file is too
/// large, or any file of the graph fails to load or resolve.
///
/// # Examples
///
/// ```no_run
/// use pcl_cli::commands::load_manager;
/// use pcl_core::ParameterReader;
///
/// # fn main() -> Result<(), String> {
/// let pm = load_manager("run.txt")?;
/// let hlx = pm.get_double("Ge/Box/HLX", "Length").map_err(|e| e.report())?;
/// # Ok(())
/// # }
/// ```
pub fn load_manager(path: &str) -> Result<ParameterManager, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    let max_file_size = get_max_file_size();
    if metadata.len() > max_file_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_file_size));
    }

    let pm = ParameterManager::from_path_with(path, load_options())?;
    debug!("Loaded {} ({} files in chain)", path, pm.chain_files().len());
    Ok(pm)
}

/// Write content to stdout.
pub fn write_output(content: &str) -> Result<(), CliError> {
    io::stdout()
        .write_all(content.as_bytes())
        .map_err(|e| CliError::io_error("<stdout>", e))
}
