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

//! Chain command - the linearized file chain

use super::load_manager;

/// Print the lookup chain, nearest file first, one per line.
pub fn chain(file: &str) -> Result<(), String> {
    let pm = load_manager(file)?;
    for (position, name) in pm.chain_files().iter().enumerate() {
        println!("{:>3}  {}", position, name);
    }
    Ok(())
}
