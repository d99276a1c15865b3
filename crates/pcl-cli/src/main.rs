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

//! PCL Command Line Interface

use clap::Parser;
use pcl_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// PCL - Parameter Chain Language toolkit
///
/// Loads a top parameter file with its includes, resolves every parameter
/// and lets you inspect or change the result.
///
/// # Examples
///
/// ```bash
/// # Check that a file and its includes resolve
/// pcl validate run.txt
///
/// # Read one value in a chosen unit
/// pcl get run.txt Ge/Box/HLX --unit cm
///
/// # Dump every parameter under Ge/ as JSON
/// pcl dump run.txt --format json --prefix Ge/
/// ```
#[derive(Parser)]
#[command(name = "pcl")]
#[command(author, version, about = "PCL - Parameter Chain Language toolkit", long_about = None)]
struct Cli {
    /// Log engine activity (debug level) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::from_default_env();
    if verbose {
        for directive in ["pcl_core=debug", "pcl_cli=debug"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
