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

//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

// Test helper to create a PCL command
fn pcl_cmd() -> Command {
    Command::cargo_bin("pcl").expect("Failed to find pcl binary")
}

// Test helper to create a temporary file with content
fn create_temp_file(content: &str) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("Failed to create temp file");
    fs::write(file.path(), content).expect("Failed to write temp file");
    file
}

// Test helper to lay out a top file with includes in one directory
fn create_temp_tree(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("Failed to write temp file");
    }
    let top = dir.path().join(files[0].0);
    (dir, top)
}

const BOX: &str = "s:Ge/Box/Type = \"TsBox\"\ndc:Ge/Box/HLX = 5 cm\nd:Ge/Box/HLY = Ge/Box/HLX cm * 2\n";

// ===== Help and Version Tests =====

#[test]
fn test_help_output() {
    pcl_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PCL - Parameter Chain Language toolkit"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_no_subcommand_fails() {
    pcl_cmd().assert().failure();
}

// ===== Validate Command Tests =====

#[test]
fn test_validate_valid_file() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("validate")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains("Parameters:"))
        .stdout(predicate::str::contains("Changeable:"));
}

#[test]
fn test_validate_reports_failing_file() {
    let (_dir, top) = create_temp_tree(&[
        ("top.txt", "includeFile = a.txt b.txt"),
        ("a.txt", "u:k = 2"),
        ("b.txt", "u:k = 3 * name_that_does_not_exist"),
    ]);

    pcl_cmd()
        .arg("validate")
        .arg(&top)
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗"))
        .stderr(predicate::str::contains("Parameter resolution failed in file: b.txt"))
        .stderr(predicate::str::contains("UnknownReference"));
}

#[test]
fn test_validate_ambiguous_chain() {
    let (_dir, top) = create_temp_tree(&[
        ("top.txt", "includeFile = water.txt air.txt"),
        ("water.txt", "s:Ge/Box/Material = \"G4_WATER\""),
        ("air.txt", "s:Ge/Box/Material = \"G4_AIR\""),
    ]);

    pcl_cmd()
        .arg("validate")
        .arg(&top)
        .assert()
        .failure()
        .stderr(predicate::str::contains("AmbiguousParameterChain"));
}

#[test]
fn test_validate_missing_file() {
    pcl_cmd()
        .arg("validate")
        .arg("/nonexistent/run.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn test_validate_file_too_large() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .env("PCL_MAX_FILE_SIZE", "10")
        .arg("validate")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

// ===== Get Command Tests =====

#[test]
fn test_get_value_in_declared_unit() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .args(["get"])
        .arg(file.path())
        .arg("ge/box/hlx")
        .assert()
        .success()
        .stdout("5 cm\n");
}

#[test]
fn test_get_value_in_requested_unit() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("get")
        .arg(file.path())
        .arg("Ge/Box/HLY")
        .args(["--unit", "mm"])
        .assert()
        .success()
        .stdout("100\n");
}

#[test]
fn test_get_undefined_fails() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("get")
        .arg(file.path())
        .arg("Ge/Box/HLZ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Undefined"));
}

#[test]
fn test_get_reads_through_includes() {
    let (_dir, top) = create_temp_tree(&[
        ("top.txt", "includeFile = base.txt\nGe/Box/HLX = 2 cm"),
        ("base.txt", BOX),
    ]);

    pcl_cmd()
        .arg("get")
        .arg(&top)
        .arg("Ge/Box/HLY")
        .args(["--unit", "cm"])
        .assert()
        .success()
        .stdout("4\n");
}

// ===== Set Command Tests =====

#[test]
fn test_set_changeable() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("set")
        .arg(file.path())
        .arg("Ge/Box/HLX")
        .arg("1 cm")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ge/Box/HLX = 1 cm"))
        .stdout(predicate::str::contains("Notified: 0"));
}

#[test]
fn test_set_not_changeable() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("set")
        .arg(file.path())
        .arg("Ge/Box/Type")
        .arg("\"TsCylinder\"")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotChangeable"));
}

#[test]
fn test_set_test_only() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("set")
        .arg(file.path())
        .arg("Ge/Box/HLX")
        .arg("2 cm")
        .arg("--test-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("not applied"));

    pcl_cmd()
        .arg("set")
        .arg(file.path())
        .arg("Ge/Box/HLX")
        .arg("2 s")
        .arg("--test-only")
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnitCategoryMismatch"));
}

#[test]
fn test_set_new_typed_parameter() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("set")
        .arg(file.path())
        .arg("uc:Sc/Scale")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sc/Scale = 3"));
}

// ===== Dump Command Tests =====

#[test]
fn test_dump_text() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("dump")
        .arg(file.path())
        .args(["--prefix", "Ge/Box"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parameter"))
        .stdout(predicate::str::contains("Ge/Box/HLX"))
        .stdout(predicate::str::contains("dc"))
        .stdout(predicate::str::contains("Ts/Seed").not());
}

#[test]
fn test_dump_json() {
    let file = create_temp_file(BOX);

    let output = pcl_cmd()
        .arg("dump")
        .arg(file.path())
        .args(["--format", "json", "--prefix", "Ge/Box/HLX"])
        .output()
        .expect("Failed to run pcl");
    assert!(output.status.success());

    let rows: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("dump output is JSON");
    let rows = rows.as_array().expect("dump output is an array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Ge/Box/HLX");
    assert_eq!(rows[0]["kind"], "dc");
    assert_eq!(rows[0]["value"], "5 cm");
}

#[test]
fn test_dump_unknown_format() {
    let file = create_temp_file(BOX);

    pcl_cmd()
        .arg("dump")
        .arg(file.path())
        .args(["--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'xml'"));
}

// ===== Unused and Chain Command Tests =====

#[test]
fn test_unused_after_reading_prefix() {
    let file = create_temp_file("d:Ge/Box/HLX = 5 cm\nd:Ge/Box/HLY = Ge/Box/HLX cm\nu:Sc/Scale = 2\nu:Sc/Offset = Sc/Scale\n");

    pcl_cmd()
        .arg("unused")
        .arg(file.path())
        .args(["--prefix", "Ge/Box/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sc/Scale"))
        .stdout(predicate::str::contains("Ge/Box/HLX").not());
}

#[test]
fn test_chain_lists_files_nearest_first() {
    let (_dir, top) = create_temp_tree(&[
        ("top.txt", "includeFile = base.txt"),
        ("base.txt", "u:X = 1"),
    ]);

    pcl_cmd()
        .arg("chain")
        .arg(&top)
        .assert()
        .success()
        .stdout(predicate::str::contains("TransientParameters"))
        .stdout(predicate::str::is_match(r"(?s)top\.txt.*base\.txt").unwrap());
}
