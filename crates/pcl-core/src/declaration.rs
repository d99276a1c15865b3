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

//! Declaration store: the raw, not-yet-typed contents of one file.

use crate::error::ParamResult;
use crate::errors::messages;
use crate::name::{ParamKey, ParamName};
use crate::value::ValueKind;
use std::collections::HashMap;
use tracing::warn;

/// Pseudo-name whose value lists parent files.
pub const INCLUDE_FILE: &str = "includefile";

/// Include spec naming the built-in defaults, always present implicitly.
pub const BUILT_IN_DEFAULTS: &str = "TOPAS_Built_In_Defaults";

/// Name family exempt from the duplicate check (generated in bulk).
pub(crate) const DUPLICATE_EXEMPT_PREFIX: &str = "ma/patienttissue";

/// (first segment, last segment) pairs that may never be changeable.
const NEVER_CHANGEABLE: &[(&str, &str)] = &[
    ("ge", "type"),
    ("sc", "quantity"),
    ("sc", "component"),
    ("so", "type"),
    ("so", "phasespacemultipleuse"),
    ("gr", "type"),
    ("ph", "modules"),
    ("ph", "listname"),
    ("vr", "usevariancereduction"),
    ("vr", "component"),
];

const NEVER_CHANGEABLE_EXACT: &[&str] = &["ge/world/hlx", "ge/world/hly", "ge/world/hlz"];

/// One raw declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: ParamName,
    /// Type from the prefix, or inferred later from an ancestor.
    pub kind: Option<ValueKind>,
    pub raw_value: String,
    pub changeable: bool,
    /// Set when this file settles a conflict between its include chains.
    pub must_be_absolute: bool,
    pub line: usize,
}

impl Declaration {
    /// Name with its type prefix, as shown in diagnostics (`dc:Ge/Box/TransX`).
    pub fn qualified_name(&self) -> String {
        match self.kind {
            Some(kind) => format!(
                "{}{}:{}",
                kind.prefix(),
                if self.changeable { "c" } else { "" },
                self.name
            ),
            None => self.name.to_string(),
        }
    }
}

/// True for names the deny-list forbids from being changeable.
pub fn is_never_changeable(key: &ParamKey) -> bool {
    let key = key.as_str();
    if NEVER_CHANGEABLE_EXACT.contains(&key) {
        return true;
    }
    let first = key.split('/').next().unwrap_or("");
    let last = key.rsplit('/').next().unwrap_or("");
    NEVER_CHANGEABLE
        .iter()
        .any(|(prefix, suffix)| *prefix == first && *suffix == last)
}

/// The declarations and include specs of one file, in file order.
#[derive(Debug, Default)]
pub struct DeclarationStore {
    declarations: Vec<Declaration>,
    index: HashMap<ParamKey, usize>,
    include_specs: Vec<String>,
    allow_redefinition: bool,
}

impl DeclarationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose names may be declared again, replacing the earlier value.
    pub fn with_redefinition() -> Self {
        Self {
            allow_redefinition: true,
            ..Self::default()
        }
    }

    /// Parse `type_and_name` and store the declaration.
    ///
    /// Returns `None` for `includeFile`, whose value is appended to the
    /// include specs instead.
    pub fn add_declaration(
        &mut self,
        type_and_name: &str,
        raw_value: &str,
        line: usize,
    ) -> ParamResult<Option<&Declaration>> {
        let context = |e: crate::ParamError| {
            e.with_line(line)
                .with_parameter(type_and_name)
                .with_value(raw_value)
        };

        if type_and_name.eq_ignore_ascii_case(INCLUDE_FILE) {
            let mut defaults_named = false;
            for spec in raw_value.split_whitespace() {
                if spec != BUILT_IN_DEFAULTS {
                    self.include_specs.push(spec.to_string());
                } else if defaults_named {
                    warn!("{} is named more than once on line {}", BUILT_IN_DEFAULTS, line);
                } else {
                    defaults_named = true;
                }
            }
            return Ok(None);
        }

        let (kind, changeable, name) = parse_type_and_name(type_and_name).map_err(context)?;
        let name = ParamName::new(name);

        if changeable && is_never_changeable(name.key()) {
            return Err(context(messages::reserved_changeable()));
        }

        let declaration = Declaration {
            name,
            kind,
            raw_value: raw_value.to_string(),
            changeable,
            must_be_absolute: false,
            line,
        };

        match self.index.get(declaration.name.key()).copied() {
            Some(pos) => {
                let exempt = declaration.name.key().starts_with(DUPLICATE_EXEMPT_PREFIX);
                if !self.allow_redefinition && !exempt {
                    return Err(context(messages::duplicate_in_file()));
                }
                self.declarations[pos] = declaration;
                Ok(Some(&self.declarations[pos]))
            }
            None => Ok(Some(self.insert(declaration))),
        }
    }

    /// Store a declaration built by the engine itself (time-feature values).
    pub(crate) fn insert(&mut self, declaration: Declaration) -> &Declaration {
        let key = declaration.name.key().clone();
        let pos = match self.index.get(&key) {
            Some(&pos) => {
                self.declarations[pos] = declaration;
                pos
            }
            None => {
                self.declarations.push(declaration);
                self.index.insert(key, self.declarations.len() - 1);
                self.declarations.len() - 1
            }
        };
        &self.declarations[pos]
    }

    pub fn get(&self, key: &ParamKey) -> Option<&Declaration> {
        self.index.get(key).map(|&pos| &self.declarations[pos])
    }

    pub fn get_mut(&mut self, key: &ParamKey) -> Option<&mut Declaration> {
        match self.index.get(key) {
            Some(&pos) => Some(&mut self.declarations[pos]),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Declaration> {
        self.declarations.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Parent file specs, in the order written.
    pub fn include_specs(&self) -> &[String] {
        &self.include_specs
    }
}

/// Split `[type[c]:]name`.
fn parse_type_and_name(text: &str) -> ParamResult<(Option<ValueKind>, bool, &str)> {
    let Some(colon) = text.find(':') else {
        if text.starts_with('/') {
            return Err(messages::leading_slash());
        }
        return Ok((None, false, text));
    };

    let prefix = &text[..colon];
    let name = &text[colon + 1..];
    if name.is_empty() {
        return Err(messages::no_name_after_colon());
    }
    if prefix.is_empty() {
        return Err(messages::missing_type_before_colon());
    }
    if name.starts_with('/') {
        return Err(messages::leading_slash());
    }

    let (type_part, changeable) = match prefix.strip_suffix(&['c', 'C'][..]) {
        Some(rest) => (rest, true),
        None => (prefix, false),
    };
    let kind =
        ValueKind::from_prefix(type_part).ok_or_else(|| messages::bad_type_before_colon(prefix))?;
    Ok((Some(kind), changeable, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamErrorKind;

    // ==================== Prefix parsing tests ====================

    #[test]
    fn test_typed_declaration() {
        let mut store = DeclarationStore::new();
        let decl = store.add_declaration("d:Ge/Box/HLX", "5 cm", 3).unwrap().unwrap();
        assert_eq!(decl.kind, Some(ValueKind::Double));
        assert!(!decl.changeable);
        assert_eq!(decl.name.as_str(), "Ge/Box/HLX");
        assert_eq!(decl.line, 3);
    }

    #[test]
    fn test_changeable_marker() {
        let mut store = DeclarationStore::new();
        let decl = store.add_declaration("dvc:Ge/Box/Pos", "3 0 0 0 mm", 1).unwrap().unwrap();
        assert_eq!(decl.kind, Some(ValueKind::DoubleVector));
        assert!(decl.changeable);
        assert_eq!(decl.qualified_name(), "dvc:Ge/Box/Pos");
    }

    #[test]
    fn test_untyped_declaration() {
        let mut store = DeclarationStore::new();
        let decl = store.add_declaration("Ge/Box/HLX", "5 cm", 1).unwrap().unwrap();
        assert_eq!(decl.kind, None);
        assert_eq!(decl.qualified_name(), "Ge/Box/HLX");
    }

    #[test]
    fn test_no_name_after_colon() {
        let err = DeclarationStore::new().add_declaration("d:", "1 m", 1).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidName);
        assert!(err.message.contains("no name after the colon"));
    }

    #[test]
    fn test_missing_type_before_colon() {
        let err = DeclarationStore::new().add_declaration(":Ge/A", "1 m", 1).unwrap_err();
        assert!(err.message.contains("missing characters before the colon"));
    }

    #[test]
    fn test_bad_type_before_colon() {
        let err = DeclarationStore::new().add_declaration("x:Ge/A", "1", 1).unwrap_err();
        assert!(err.message.contains("incorrect characters before the colon"));
        let err = DeclarationStore::new().add_declaration("c:Ge/A", "1", 1).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidName);
    }

    #[test]
    fn test_leading_slash_rejected() {
        let err = DeclarationStore::new().add_declaration("d:/Ge/A", "1 m", 1).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidName);
        let err = DeclarationStore::new().add_declaration("/Ge/A", "1 m", 1).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidName);
    }

    // ==================== includeFile tests ====================

    #[test]
    fn test_include_file_specs() {
        let mut store = DeclarationStore::new();
        assert!(store.add_declaration("includeFile", "A.txt  B.txt", 1).unwrap().is_none());
        assert!(store.add_declaration("IncludeFile", "C.txt", 2).unwrap().is_none());
        assert_eq!(store.include_specs(), &["A.txt", "B.txt", "C.txt"]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_include_built_in_defaults_ignored() {
        let mut store = DeclarationStore::new();
        store
            .add_declaration("includeFile", "TOPAS_Built_In_Defaults", 1)
            .unwrap();
        assert!(store.include_specs().is_empty());
    }

    // ==================== Deny-list tests ====================

    #[test]
    fn test_reserved_attribute_not_changeable() {
        let err = DeclarationStore::new()
            .add_declaration("sc:Ge/Box/Type", "\"G4Box\"", 1)
            .unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::NonChangeableAttribute);
        assert_eq!(err.parameter.as_deref(), Some("sc:Ge/Box/Type"));
    }

    #[test]
    fn test_world_half_lengths_not_changeable() {
        let err = DeclarationStore::new()
            .add_declaration("dc:Ge/World/HLZ", "1 m", 1)
            .unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::NonChangeableAttribute);
    }

    #[test]
    fn test_reserved_attribute_plain_is_fine() {
        let mut store = DeclarationStore::new();
        assert!(store.add_declaration("s:Ge/Box/Type", "\"G4Box\"", 1).is_ok());
        assert!(store.add_declaration("dc:Ge/Box/HLX", "1 m", 2).is_ok());
    }

    #[test]
    fn test_is_never_changeable() {
        assert!(is_never_changeable(&ParamKey::new("Sc/Dose/Quantity")));
        assert!(is_never_changeable(&ParamKey::new("Vr/Split/Component")));
        assert!(!is_never_changeable(&ParamKey::new("Sc/Dose/OutputFile")));
        assert!(!is_never_changeable(&ParamKey::new("Ma/Type")));
    }

    // ==================== Duplicate tests ====================

    #[test]
    fn test_duplicate_rejected() {
        let mut store = DeclarationStore::new();
        store.add_declaration("d:Ge/A", "1 m", 1).unwrap();
        let err = store.add_declaration("d:GE/a", "2 m", 2).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::DuplicateDeclaration);
        assert_eq!(err.line, Some(2));
    }

    #[test]
    fn test_duplicate_exemption() {
        let mut store = DeclarationStore::new();
        store.add_declaration("s:Ma/PatientTissue1/Name", "\"a\"", 1).unwrap();
        store.add_declaration("s:Ma/PatientTissue1/Name", "\"b\"", 2).unwrap();
        let decl = store.get(&ParamKey::new("ma/patienttissue1/name")).unwrap();
        assert_eq!(decl.raw_value, "\"b\"");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_redefinition_store() {
        let mut store = DeclarationStore::with_redefinition();
        store.add_declaration("dc:Ge/A", "1 m", 1).unwrap();
        store.add_declaration("dc:Ge/A", "2 m", 1).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&ParamKey::new("ge/a")).unwrap().raw_value, "2 m");
    }

    #[test]
    fn test_includes_kept_apart_from_declarations() {
        let mut store = DeclarationStore::new();
        store.add_declaration("includeFile", "A", 1).unwrap();
        store.add_declaration("i:X", "1", 2).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(&ParamKey::new("includefile")).is_none());
        assert_eq!(store.include_specs(), &["A"]);
    }
}
