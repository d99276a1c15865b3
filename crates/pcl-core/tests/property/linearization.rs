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

//! Property-based tests for include-chain linearization.

use pcl_core::{
    LoadOptions, MemorySource, ParameterManager, ParameterReader, TRANSIENT_FILE_NAME,
};
use proptest::prelude::*;
use std::collections::HashSet;

/// Top includes every middle file in `order`; each middle includes `base.txt`.
fn diamond(order: &[usize]) -> MemorySource {
    let includes: Vec<String> = order.iter().map(|i| format!("mid{}.txt", i)).collect();
    let mut source = MemorySource::new()
        .with_file("top.txt", format!("includeFile = {}", includes.join(" ")))
        .with_file("base.txt", "u:Shared = 7");
    for i in order {
        source.insert(
            format!("mid{}.txt", i),
            format!("includeFile = base.txt\nu:Mid{} = {}", i, i),
        );
    }
    source
}

fn manager(source: &MemorySource) -> ParameterManager {
    let options = LoadOptions::builder().built_in_defaults(false).build();
    ParameterManager::load(source, "top.txt", options).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: Each file appears once; the shared ancestor comes last.
    #[test]
    fn prop_diamond_visits_each_file_once(
        order in (1_usize..6).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let pm = manager(&diamond(&order));
        let chain = pm.chain_files();

        prop_assert_eq!(chain.len(), order.len() + 3);
        let unique: HashSet<&String> = chain.iter().collect();
        prop_assert_eq!(unique.len(), chain.len());
        prop_assert_eq!(chain[0].as_str(), TRANSIENT_FILE_NAME);
        prop_assert_eq!(chain[1].as_str(), "top.txt");
        prop_assert_eq!(chain.last().map(String::as_str), Some("base.txt"));
        for (position, i) in order.iter().enumerate() {
            prop_assert_eq!(&chain[position + 2], &format!("mid{}.txt", i));
        }
    }

    /// Property: Values are the same whatever order the arms are listed in.
    #[test]
    fn prop_include_order_does_not_change_values(
        order in (1_usize..6).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let pm = manager(&diamond(&order));
        prop_assert_eq!(pm.get_unitless("Shared").unwrap(), 7.0);
        for i in &order {
            let name = format!("Mid{}", i);
            prop_assert_eq!(pm.get_unitless(&name).unwrap(), *i as f64);
        }
    }
}
