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

//! Framework defaults, included implicitly by every file without includes.

/// Text of the built-in defaults file, in the ordinary file format.
pub const BUILT_IN_DEFAULTS_TEXT: &str = r#"
# Session
i:Ts/Seed = 1
i:Ts/MaxStepNumber = 1000000
b:Ts/DumpParameters = "False"
b:Ts/DumpNonDefaultParameters = "False"
b:Ts/ListUnusedParameters = "False"
i:Ts/ShowHistoryCountAtInterval = 1
i:Ts/RunIDPadding = 4
i:Ts/RunVerbosity = 0
i:Ts/EventVerbosity = 0
i:Ts/TrackingVerbosity = 0
i:Ts/SequenceVerbosity = 0
i:Ts/NumberOfThreads = 1
s:Ts/G4DataDirectory = ""
b:Ts/UseQt = "False"
d:Ts/ExtraSequenceSleepInterval = 10 s
d:Ts/KilledTrackMaxEnergy = 0. MeV
i:Ts/KilledTrackMaxCount = 0

# Physics
s:Ph/ListName = "Default"
b:Ph/ListProcesses = "False"
s:Ph/Default/Type = "Geant4_Modular"
sv:Ph/Default/Modules = 6 "g4em-standard_opt4" "g4h-phy_QGSP_BIC_HP" "g4decay" "g4ion-binarycascade" "g4h-elastic_HP" "g4stopping"
d:Ph/Default/EMRangeMin = 100. eV
d:Ph/Default/EMRangeMax = 500. MeV

# Time
b:Tf/RandomizeTimeDistribution = "False"
d:Tf/TimelineStart = 0. s
d:Tf/TimelineEnd = Tf/TimelineStart s
i:Tf/NumberOfSequentialTimes = 1
i:Tf/Verbosity = 0

# Geometry
i:Ge/Verbosity = 0
b:Ge/CheckForOverlaps = "True"
i:Ge/CheckForOverlapsResolution = 1000
d:Ge/CheckForOverlapsTolerance = 0. mm
b:Ge/QuitIfOverlapDetected = "True"
s:Ge/World/Type = "TsBox"
s:Ge/World/Material = "Air"
d:Ge/World/HLX = 5. m
d:Ge/World/HLY = 5. m
d:Ge/World/HLZ = 5. m
d:Ge/World/TransX = 0. m
d:Ge/World/TransY = 0. m
d:Ge/World/TransZ = 0. m
d:Ge/World/RotX = 0. deg
d:Ge/World/RotY = 0. deg
d:Ge/World/RotZ = 0. deg
b:Ge/World/Invisible = "True"

# Graphics
b:Gr/Enable = "True"
i:Gr/Verbosity = 0
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::DeclarationStore;
    use crate::limits::Limits;
    use crate::loader::load_records;

    #[test]
    fn test_defaults_parse() {
        let records = load_records(BUILT_IN_DEFAULTS_TEXT.as_bytes(), &Limits::default()).unwrap();
        let mut store = DeclarationStore::new();
        for record in &records {
            store
                .add_declaration(&record.name, &record.value, record.line)
                .unwrap();
        }
        assert_eq!(store.len(), records.len());
        assert!(store.include_specs().is_empty());
        assert!(store.iter().all(|d| d.kind.is_some()));
    }
}
