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

//! Unit symbols, categories and conversion factors.
//!
//! Values are stored in the internal unit system: millimetre, nanosecond,
//! MeV, positron charge, radian, kelvin and mole all have factor 1. Every
//! other symbol is expressed as a multiple of those.

use std::collections::HashMap;
use std::sync::OnceLock;

/// One unit symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    pub symbol: String,
    pub category: String,
    /// Multiplier from this unit to internal units.
    pub factor: f64,
}

/// Symbol table of all recognized units.
#[derive(Debug)]
pub struct UnitTable {
    units: HashMap<String, UnitDef>,
}

const MM: f64 = 1.0;
const NS: f64 = 1.0;
const MEV: f64 = 1.0;
const EPLUS: f64 = 1.0;
const RAD: f64 = 1.0;
const KELVIN: f64 = 1.0;
const MOLE: f64 = 1.0;

const SECOND: f64 = 1.0e9 * NS;
const METER: f64 = 1000.0 * MM;
const CM: f64 = 10.0 * MM;
const ELECTRON_CHARGE_COULOMB: f64 = 1.602_176_634e-19;
const COULOMB: f64 = EPLUS / ELECTRON_CHARGE_COULOMB;
const JOULE: f64 = MEV / (ELECTRON_CHARGE_COULOMB * 1.0e6);
const KILOGRAM: f64 = JOULE * SECOND * SECOND / (METER * METER);
const GRAM: f64 = 1.0e-3 * KILOGRAM;
const GRAY: f64 = JOULE / KILOGRAM;
const VOLT: f64 = 1.0e-6 * MEV / EPLUS;
const TESLA: f64 = VOLT * SECOND / (METER * METER);
const BECQUEREL: f64 = 1.0 / SECOND;

/// (category, [(symbol, factor)])
const BASE_UNITS: &[(&str, &[(&str, f64)])] = &[
    (
        "Length",
        &[
            ("km", 1.0e6 * MM),
            ("m", METER),
            ("cm", CM),
            ("mm", MM),
            ("um", 1.0e-3 * MM),
            ("nm", 1.0e-6 * MM),
            ("angstrom", 1.0e-7 * MM),
            ("fm", 1.0e-12 * MM),
        ],
    ),
    (
        "Surface",
        &[
            ("km2", 1.0e12 * MM * MM),
            ("m2", METER * METER),
            ("cm2", CM * CM),
            ("mm2", MM * MM),
            ("um2", 1.0e-6 * MM * MM),
            ("nm2", 1.0e-12 * MM * MM),
        ],
    ),
    (
        "Volume",
        &[
            ("km3", 1.0e18 * MM * MM * MM),
            ("m3", METER * METER * METER),
            ("cm3", CM * CM * CM),
            ("mm3", MM * MM * MM),
            ("um3", 1.0e-9 * MM * MM * MM),
            ("nm3", 1.0e-18 * MM * MM * MM),
            ("L", 1.0e6 * MM * MM * MM),
            ("dL", 1.0e5 * MM * MM * MM),
            ("cL", 1.0e4 * MM * MM * MM),
            ("mL", 1.0e3 * MM * MM * MM),
        ],
    ),
    (
        "Angle",
        &[
            ("rad", RAD),
            ("mrad", 1.0e-3 * RAD),
            ("deg", std::f64::consts::PI / 180.0 * RAD),
        ],
    ),
    ("Solid angle", &[("sr", 1.0)]),
    (
        "Time",
        &[
            ("s", SECOND),
            ("ms", 1.0e-3 * SECOND),
            ("us", 1.0e-6 * SECOND),
            ("ns", NS),
            ("ps", 1.0e-3 * NS),
            ("min", 60.0 * SECOND),
            ("h", 3600.0 * SECOND),
            ("d", 86400.0 * SECOND),
            ("y", 365.0 * 86400.0 * SECOND),
        ],
    ),
    (
        "Frequency",
        &[
            ("Hz", 1.0 / SECOND),
            ("kHz", 1.0e3 / SECOND),
            ("MHz", 1.0e6 / SECOND),
        ],
    ),
    (
        "Energy",
        &[
            ("eV", 1.0e-6 * MEV),
            ("keV", 1.0e-3 * MEV),
            ("MeV", MEV),
            ("GeV", 1.0e3 * MEV),
            ("TeV", 1.0e6 * MEV),
            ("PeV", 1.0e9 * MEV),
            ("J", JOULE),
        ],
    ),
    (
        "Mass",
        &[("kg", KILOGRAM), ("g", GRAM), ("mg", 1.0e-3 * GRAM)],
    ),
    (
        "Volumic Mass",
        &[
            ("g/cm3", GRAM / (CM * CM * CM)),
            ("mg/cm3", 1.0e-3 * GRAM / (CM * CM * CM)),
            ("kg/m3", KILOGRAM / (METER * METER * METER)),
        ],
    ),
    (
        "Dose",
        &[
            ("Gy", GRAY),
            ("cGy", 1.0e-2 * GRAY),
            ("mGy", 1.0e-3 * GRAY),
            ("uGy", 1.0e-6 * GRAY),
            ("Sv", GRAY),
        ],
    ),
    ("Electric charge", &[("e+", EPLUS), ("C", COULOMB)]),
    (
        "Electric potential",
        &[("V", VOLT), ("kV", 1.0e3 * VOLT), ("MV", 1.0e6 * VOLT)],
    ),
    (
        "Magnetic flux density",
        &[("T", TESLA), ("kG", 1.0e-1 * TESLA), ("G", 1.0e-4 * TESLA)],
    ),
    ("Temperature", &[("K", KELVIN)]),
    ("Amount of substance", &[("mol", MOLE)]),
    (
        "Activity",
        &[
            ("Bq", BECQUEREL),
            ("kBq", 1.0e3 * BECQUEREL),
            ("MBq", 1.0e6 * BECQUEREL),
            ("GBq", 1.0e9 * BECQUEREL),
            ("Ci", 3.7e10 * BECQUEREL),
            ("mCi", 3.7e7 * BECQUEREL),
            ("uCi", 3.7e4 * BECQUEREL),
        ],
    ),
    // Derived categories used by scorers and fields
    ("Molar mass", &[("g/mole", GRAM / MOLE)]),
    (
        "Magnetic field gradient",
        &[
            ("T/mm", TESLA / MM),
            ("T/cm", TESLA / CM),
            ("T/m", TESLA / METER),
        ],
    ),
    (
        "Electric field strength",
        &[
            ("V/mm", VOLT / MM),
            ("V/cm", VOLT / CM),
            ("V/m", VOLT / METER),
            ("kV/mm", 1.0e3 * VOLT / MM),
            ("kV/cm", 1.0e3 * VOLT / CM),
            ("kV/m", 1.0e3 * VOLT / METER),
        ],
    ),
    ("Energy fluence", &[("MeV/mm2", MEV / (MM * MM))]),
    ("Force", &[("MeV/mm", MEV / MM)]),
    ("perForce", &[("mm/MeV", MM / MEV)]),
    ("perForceSquare", &[("mm2/MeV2", MM * MM / (MEV * MEV))]),
    (
        "Force per density",
        &[("MeV/mm/(g/cm3)", MEV / MM / (GRAM / (CM * CM * CM)))],
    ),
    (
        "Energy force per density",
        &[("MeV2/mm/(g/cm3)", MEV * MEV / MM / (GRAM / (CM * CM * CM)))],
    ),
    (
        "Fluence",
        &[("/mm2", 1.0 / (MM * MM)), ("/cm2", 1.0 / (CM * CM))],
    ),
    ("perDose", &[("/Gy", 1.0 / GRAY)]),
    ("perDoseSquare", &[("/Gy2", 1.0 / (GRAY * GRAY))]),
    ("perEnergy", &[("/MeV", 1.0 / MEV)]),
    ("perForce perDose", &[("mm/MeV/Gy", MM / MEV / GRAY)]),
    ("Dose fluence", &[("Sv*mm2", GRAY * MM * MM)]),
    (
        "Molar concentration",
        &[("M", 1.0e3 * MOLE / (METER * METER * METER))],
    ),
    ("perTime", &[("/s", 1.0 / SECOND)]),
    (
        "perMolarConcentration perTime",
        &[("/M/s", METER * METER * METER / (1.0e3 * MOLE * SECOND))],
    ),
    (
        "Surface perTime",
        &[
            ("m2/s", METER * METER / SECOND),
            ("nm2/s", 1.0e-12 * MM * MM / SECOND),
        ],
    ),
];

/// Categories whose units also form `<unit>/<time unit>` rates.
const RATE_CATEGORIES: &[&str] = &["Length", "Angle", "Energy", "Magnetic flux density"];

const RATE_TIME_UNITS: &[&str] = &["s", "ms", "us", "ns", "ps"];

/// Category name of a time rate (`"Length"` becomes `"Length/Time"`).
pub fn rate_category(category: &str) -> String {
    format!("{}/Time", category)
}

/// Category of unitless time rates such as `1/s`.
pub const INVERSE_TIME: &str = "/Time";

impl UnitTable {
    fn build() -> Self {
        let mut units = HashMap::new();
        let mut insert = |symbol: String, category: String, factor: f64| {
            units.insert(
                symbol.clone(),
                UnitDef {
                    symbol,
                    category,
                    factor,
                },
            );
        };

        for (category, symbols) in BASE_UNITS {
            for (symbol, factor) in *symbols {
                insert(symbol.to_string(), category.to_string(), *factor);
            }
        }

        let time_factor = |symbol: &str| -> f64 {
            BASE_UNITS
                .iter()
                .find(|(category, _)| *category == "Time")
                .and_then(|(_, symbols)| symbols.iter().find(|(s, _)| *s == symbol))
                .map(|(_, f)| *f)
                .unwrap_or(1.0)
        };

        for (category, symbols) in BASE_UNITS {
            if !RATE_CATEGORIES.contains(category) {
                continue;
            }
            for (symbol, factor) in *symbols {
                for time in RATE_TIME_UNITS {
                    insert(
                        format!("{}/{}", symbol, time),
                        rate_category(category),
                        factor / time_factor(time),
                    );
                }
            }
        }
        for time in RATE_TIME_UNITS {
            insert(
                format!("1/{}", time),
                INVERSE_TIME.to_string(),
                1.0 / time_factor(time),
            );
        }

        Self { units }
    }

    /// The process-wide table.
    pub fn global() -> &'static UnitTable {
        static TABLE: OnceLock<UnitTable> = OnceLock::new();
        TABLE.get_or_init(UnitTable::build)
    }

    /// Look up a symbol. Symbols are case-sensitive (`mm` is not `Mm`).
    pub fn lookup(&self, symbol: &str) -> Option<&UnitDef> {
        self.units.get(symbol)
    }

    pub fn category(&self, symbol: &str) -> Option<&str> {
        self.lookup(symbol).map(|u| u.category.as_str())
    }

    pub fn factor(&self, symbol: &str) -> Option<f64> {
        self.lookup(symbol).map(|u| u.factor)
    }

    pub fn is_unit(&self, symbol: &str) -> bool {
        self.units.contains_key(symbol)
    }

    /// All symbols of `category`, sorted.
    pub fn symbols_in(&self, category: &str) -> Vec<&str> {
        let mut symbols: Vec<&str> = self
            .units
            .values()
            .filter(|u| u.category == category)
            .map(|u| u.symbol.as_str())
            .collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
