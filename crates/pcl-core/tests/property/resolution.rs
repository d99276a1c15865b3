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

//! Property-based tests for resolution determinism.

use pcl_core::{LoadOptions, MemorySource, ParameterManager, ParameterReader};
use proptest::prelude::*;

fn manager(text: &str) -> ParameterManager {
    let source = MemorySource::new().with_file("top.txt", text);
    let options = LoadOptions::builder().built_in_defaults(false).build();
    ParameterManager::load(&source, "top.txt", options).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: Loading the same text twice yields the same values.
    #[test]
    fn prop_resolution_is_idempotent(
        scale in -1000_i64..1000,
        length in 0.0_f64..1.0e4,
        count in 1_i64..50
    ) {
        let text = format!(
            "u:Sc/Scale = {}\nd:Ge/Box/HLX = {} cm\ni:Sc/Bins = {}\nd:Ge/Box/HLY = Ge/Box/HLX cm * Sc/Scale\ni:Sc/Total = Sc/Bins * 2",
            scale, length, count
        );
        let first = manager(&text);
        let second = manager(&text);

        for name in ["Ge/Box/HLX", "Ge/Box/HLY"] {
            let a = first.get_double(name, "Length").unwrap();
            let b = second.get_double(name, "Length").unwrap();
            prop_assert_eq!(a.to_bits(), b.to_bits(), "{} differs", name);
        }
        prop_assert_eq!(
            first.get_integer("Sc/Total").unwrap(),
            second.get_integer("Sc/Total").unwrap()
        );
    }

    /// Property: Repeated reads of one parameter agree.
    #[test]
    fn prop_repeated_reads_agree(values in prop::collection::vec(-1.0e3_f64..1.0e3, 1..16)) {
        let literal: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let text = format!("dv:Ge/Box/Points = {} {} mm", values.len(), literal.join(" "));
        let pm = manager(&text);

        let a = pm.get_double_vector("Ge/Box/Points", "Length").unwrap();
        let b = pm.get_double_vector("Ge/Box/Points", "Length").unwrap();
        prop_assert_eq!(a.len(), values.len());
        prop_assert_eq!(a, b);
    }

    /// Property: An integer literal reads back unchanged.
    #[test]
    fn prop_integer_literal_reads_back(value in -1_000_000_i64..1_000_000) {
        let pm = manager(&format!("i:Sc/Value = {}", value));
        prop_assert_eq!(pm.get_integer("Sc/Value").unwrap(), value);
    }
}
