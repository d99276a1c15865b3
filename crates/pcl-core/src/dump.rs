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

//! Full-table dump of resolved parameters for audits and debugging.

use crate::manager::{ParameterManager, UNDEFINED};

/// One dumped parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DumpRow {
    pub name: String,
    /// Type prefix with the changeable marker (`dc`).
    pub kind: String,
    /// Current value in the declared unit, or `Undefined`.
    pub value: String,
    /// `(file, raw value)` for every chain file declaring the name,
    /// nearest first.
    pub files: Vec<(String, String)>,
}

impl ParameterManager {
    /// Dump every visible parameter, ordered by name.
    pub fn dump(&self) -> Vec<DumpRow> {
        self.parameter_names()
            .into_iter()
            .map(|name| self.dump_row(&name))
            .collect()
    }

    /// Dump the parameters whose names start with `prefix` (any case).
    pub fn dump_matching(&self, prefix: &str) -> Vec<DumpRow> {
        let prefix = prefix.to_lowercase();
        self.parameter_names()
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .map(|name| self.dump_row(&name))
            .collect()
    }

    fn dump_row(&self, name: &str) -> DumpRow {
        let kind = match self.type_of(name) {
            Ok(kind) => format!(
                "{}{}",
                kind.prefix(),
                if self.is_changeable(name) { "c" } else { "" }
            ),
            Err(_) => UNDEFINED.to_string(),
        };
        DumpRow {
            name: name.to_string(),
            kind,
            value: self.value_as_string(name),
            files: self.values_in_chain(name),
        }
    }

    /// Flat text table of [`dump`](Self::dump).
    pub fn dump_text(&self) -> String {
        format_rows(&self.dump())
    }
}

/// Render rows as an aligned table.
pub fn format_rows(rows: &[DumpRow]) -> String {
    const HEADERS: [&str; 4] = ["Parameter", "Type", "Value", "Set in"];
    let width = |f: fn(&DumpRow) -> usize, header: &str| {
        rows.iter().map(f).max().unwrap_or(0).max(header.len())
    };
    let name_width = width(|r| r.name.len(), HEADERS[0]);
    let kind_width = width(|r| r.kind.len(), HEADERS[1]);
    let value_width = width(|r| r.value.len(), HEADERS[2]);

    let mut out = format!(
        "{:<nw$}  {:<kw$}  {:<vw$}  {}\n",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        HEADERS[3],
        nw = name_width,
        kw = kind_width,
        vw = value_width
    );
    for row in rows {
        let files = row
            .files
            .iter()
            .map(|(file, raw)| format!("{} = {}", file, raw.replace('\n', " ")))
            .collect::<Vec<_>>()
            .join("; ");
        out.push_str(
            format!(
                "{:<nw$}  {:<kw$}  {:<vw$}  {}",
                row.name,
                row.kind,
                row.value,
                files,
                nw = name_width,
                kw = kind_width,
                vw = value_width
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoadOptions;
    use crate::source::MemorySource;

    fn manager() -> ParameterManager {
        let source = MemorySource::new()
            .with_file("top.txt", "includeFile = base.txt\ndc:Ge/Box/HLX = 5 cm")
            .with_file("base.txt", "dc:Ge/Box/HLX = 1 cm\nu:Sc/Bins = 4");
        let options = LoadOptions::builder().built_in_defaults(false).build();
        ParameterManager::load(&source, "top.txt", options).unwrap()
    }

    #[test]
    fn test_dump_rows() {
        let pm = manager();
        let rows = pm.dump();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ge/Box/HLX");
        assert_eq!(rows[0].kind, "dc");
        assert_eq!(rows[0].value, "5 cm");
        assert_eq!(
            rows[0].files,
            vec![
                ("top.txt".to_string(), "5 cm".to_string()),
                ("base.txt".to_string(), "1 cm".to_string())
            ]
        );
        assert_eq!(rows[1].name, "Sc/Bins");
        assert_eq!(rows[1].kind, "u");
    }

    #[test]
    fn test_dump_matching() {
        let pm = manager();
        let rows = pm.dump_matching("sc/");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "4");
    }

    #[test]
    fn test_dump_text_table() {
        let text = manager().dump_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Parameter"));
        assert!(lines[1].contains("top.txt = 5 cm; base.txt = 1 cm"));
        assert!(lines[2].starts_with("Sc/Bins"));
    }
}
