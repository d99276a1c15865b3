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

//! End-to-end tests driving whole file graphs through `MemorySource`.

use pcl_core::{
    LoadOptions, MemorySource, ParamErrorKind, ParamName, ParamResult, ParameterManager,
    ParameterReader, TRANSIENT_FILE_NAME,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn options() -> LoadOptions {
    LoadOptions::builder().built_in_defaults(false).build()
}

fn load(source: &MemorySource) -> ParamResult<ParameterManager> {
    ParameterManager::load(source, "top.txt", options())
}

fn single(text: &str) -> ParamResult<ParameterManager> {
    load(&MemorySource::new().with_file("top.txt", text))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// =============================================================================
// Include chains
// =============================================================================

#[test]
fn test_unknown_reference_reported_from_its_own_arm() {
    let source = MemorySource::new()
        .with_file("top.txt", "includeFile = a.txt b.txt")
        .with_file("a.txt", "u:k = 2")
        .with_file("b.txt", "u:k = 3 * name_that_does_not_exist");

    let err = load(&source).unwrap_err();
    assert_eq!(err.kind, ParamErrorKind::UnknownReference);
    assert_eq!(err.file.as_deref(), Some("b.txt"));
    assert_eq!(err.parameter.as_deref(), Some("u:k"));
    assert!(err.report().starts_with("Parameter resolution failed in file: b.txt"));
}

#[test]
fn test_sibling_conflict_needs_absolute_setting() {
    let arms = MemorySource::new()
        .with_file("water.txt", "s:Ge/Box/Material = \"G4_WATER\"")
        .with_file("air.txt", "s:Ge/Box/Material = \"G4_AIR\"");

    let unsettled = arms
        .clone()
        .with_file("top.txt", "includeFile = water.txt air.txt");
    let err = load(&unsettled).unwrap_err();
    assert_eq!(err.kind, ParamErrorKind::AmbiguousParameterChain);
    assert_eq!(err.file.as_deref(), Some("top.txt"));

    let settled = arms.with_file(
        "top.txt",
        "includeFile = water.txt air.txt\ns:Ge/Box/Material = \"G4_Pb\"",
    );
    let pm = load(&settled).unwrap();
    assert_eq!(pm.get_string("Ge/Box/Material").unwrap(), "G4_Pb");
}

#[test]
fn test_diamond_chain_lists_each_file_once() {
    let source = MemorySource::new()
        .with_file("top.txt", "includeFile = left.txt right.txt")
        .with_file("left.txt", "includeFile = base.txt\nu:L = 1")
        .with_file("right.txt", "includeFile = base.txt\nu:R = 2")
        .with_file("base.txt", "u:Base = 3");

    let pm = load(&source).unwrap();
    assert_eq!(
        pm.chain_files(),
        vec![TRANSIENT_FILE_NAME, "top.txt", "left.txt", "right.txt", "base.txt"]
    );
    assert_eq!(pm.get_unitless("Base").unwrap(), 3.0);
}

#[test]
fn test_nearer_file_overrides_parent() {
    let source = MemorySource::new()
        .with_file("top.txt", "includeFile = base.txt\nGe/Box/HLX = 2 cm")
        .with_file("base.txt", "dc:Ge/Box/HLX = 1 cm\nd:Ge/Box/HLY = Ge/Box/HLX cm * 3");

    let pm = load(&source).unwrap();
    assert_eq!(pm.get_double_in_unit("Ge/Box/HLX", "cm").unwrap(), 2.0);
    assert!(pm.is_changeable("Ge/Box/HLX"));
    // references resolve through the whole chain
    assert_eq!(pm.get_double_in_unit("Ge/Box/HLY", "cm").unwrap(), 6.0);
    assert_eq!(
        pm.values_in_chain("Ge/Box/HLX"),
        vec![
            ("top.txt".to_string(), "2 cm".to_string()),
            ("base.txt".to_string(), "1 cm".to_string())
        ]
    );
}

#[test]
fn test_inherited_value_reads_parent() {
    let source = MemorySource::new()
        .with_file("top.txt", "includeFile = base.txt\nd:Ge/Box/HLX = Ge/Box/HLX + 1 cm")
        .with_file("base.txt", "d:Ge/Box/HLX = 1 cm");

    let pm = load(&source).unwrap();
    assert!(close(pm.get_double_in_unit("Ge/Box/HLX", "cm").unwrap(), 2.0));
}

#[test]
fn test_type_mismatch_across_files() {
    let source = MemorySource::new()
        .with_file("top.txt", "includeFile = base.txt\ni:Sc/Bins = 4")
        .with_file("base.txt", "u:Sc/Bins = 4");

    let err = load(&source).unwrap_err();
    assert_eq!(err.kind, ParamErrorKind::TypeMismatch);
}

#[test]
fn test_built_in_defaults_are_visible() {
    let source = MemorySource::new().with_file("top.txt", "u:X = 1");
    let pm = ParameterManager::load(&source, "top.txt", LoadOptions::default()).unwrap();
    assert_eq!(pm.get_integer("Ts/Seed").unwrap(), 1);
    assert!(!pm.get_boolean("Ts/DumpParameters").unwrap());
}

// =============================================================================
// Units and vectors
// =============================================================================

#[test]
fn test_unit_agreement() {
    let pm = single("d:X = 5 m\nd:Y = X + 3 cm").unwrap();
    assert!(close(pm.get_double_in_unit("Y", "m").unwrap(), 5.03));

    let err = single("d:X = 5 m\nd:Y = X + 3 s").unwrap_err();
    assert_eq!(err.kind, ParamErrorKind::UnitCategoryMismatch);
}

#[test]
fn test_vector_length_agreement() {
    let err = single("dv:V = 3 1 2 3 mm\ndv:W = V * 2 1 2 m").unwrap_err();
    assert_eq!(err.kind, ParamErrorKind::VectorLengthMismatch);

    let pm = single("dv:V = 3 1 2 3 mm\ndv:W = V * 3 1 2 3 m").unwrap();
    assert_eq!(pm.vector_length("W").unwrap(), 3);
}

#[test]
fn test_requested_category_is_checked() {
    let pm = single("d:Ge/Box/HLX = 5 cm").unwrap();
    let err = pm.get_double("Ge/Box/HLX", "Time").unwrap_err();
    assert_eq!(err.kind, ParamErrorKind::UnitCategoryMismatch);
}

// =============================================================================
// Time features
// =============================================================================

#[test]
fn test_step_function_is_periodic() {
    let pm = single("dv:Tf/Beam/Times = 2 5 10 ns\nsv:Tf/Beam/Values = 2 \"A\" \"B\"").unwrap();

    pm.update_time(0.0).unwrap();
    assert_eq!(pm.get_string("Tf/Beam/Value").unwrap(), "A");
    pm.update_time(9.9).unwrap();
    assert_eq!(pm.get_string("Tf/Beam/Value").unwrap(), "B");
    pm.update_time(10.1).unwrap();
    assert_eq!(pm.get_string("Tf/Beam/Value").unwrap(), "A");
}

#[test]
fn test_step_times_need_not_be_ascending() {
    let pm = single("dv:Tf/Beam/Times = 3 10 2 5 ns\nsv:Tf/Beam/Values = 3 \"A\" \"B\" \"C\"").unwrap();

    pm.update_time(1.0).unwrap();
    assert_eq!(pm.get_string("Tf/Beam/Value").unwrap(), "B");
    pm.update_time(3.0).unwrap();
    assert_eq!(pm.get_string("Tf/Beam/Value").unwrap(), "C");
}

#[test]
fn test_linear_function_follows_clock() {
    let pm = single(
        "s:Tf/Pos/Function = \"Linear mm\"\nd:Tf/Pos/Rate = 2 mm/ns\nd:Tf/Pos/StartValue = 1 mm\nd:Ge/Box/TransX = Tf/Pos/Value mm",
    )
    .unwrap();

    pm.update_time(3.0).unwrap();
    assert!(close(pm.get_double_in_unit("Ge/Box/TransX", "mm").unwrap(), 7.0));
    assert_eq!(pm.time(), 3.0);
}

// =============================================================================
// Changes and notification
// =============================================================================

#[test]
fn test_notification_dedup_across_files() {
    let source = MemorySource::new()
        .with_file(
            "top.txt",
            "includeFile = base.txt\nd:Ge/Box/Size = Ge/Box/HLX + Ge/Box/HLX cm",
        )
        .with_file("base.txt", "dc:Ge/Box/HLX = 5 cm");
    let pm = load(&source).unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&fired);
    pm.register_listener(
        "Ge/Box",
        Arc::new(move |_: &ParameterManager, direct: &ParamName| {
            assert_eq!(direct.as_str(), "Ge/Box/Size");
            seen.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let ctx = pm.consumer("Ge/Box");
    ctx.get_double("Ge/Box/Size", "Length").unwrap();
    ctx.get_double("Ge/Box/Size", "Length").unwrap();
    drop(ctx);

    assert_eq!(pm.dependency_edges().len(), 1);
    let pairs = pm.apply_change("Ge/Box/HLX", "1 cm", false, false).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(pm.get_double_in_unit("Ge/Box/Size", "cm").unwrap(), 2.0);
}

#[test]
fn test_change_rejected_for_fixed_parameter() {
    let pm = single("s:Ge/Box/Type = \"TsBox\"\ndc:Ge/Box/HLX = 1 cm").unwrap();
    let err = pm.apply_change("Ge/Box/Type", "\"TsCylinder\"", false, false).unwrap_err();
    assert_eq!(err.kind, ParamErrorKind::NotChangeable);
    assert_eq!(err.file.as_deref(), Some(TRANSIENT_FILE_NAME));
    assert_eq!(pm.get_string("Ge/Box/Type").unwrap(), "TsBox");
}

#[test]
fn test_edit_history_and_unused() {
    let pm = single("dc:Ge/Box/HLX = 1 cm\nu:Sc/Scale = 2").unwrap();
    pm.apply_change("Ge/Box/HLX", "3 cm", false, false).unwrap();
    pm.apply_change("Ge/Box/HLX", "4 cm", false, false).unwrap();
    assert_eq!(
        pm.added_parameters(),
        vec![("Ge/Box/HLX".to_string(), "4 cm".to_string())]
    );
    assert_eq!(pm.get_double_in_unit("Ge/Box/HLX", "cm").unwrap(), 4.0);
    assert_eq!(pm.unused_parameters(), vec!["Sc/Scale"]);
}
