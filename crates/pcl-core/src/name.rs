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

//! Hierarchical parameter names.
//!
//! Names are slash-delimited paths compared without regard to case. The
//! canonical lowercase form is computed once, when a name enters the
//! system, and every map in the engine is keyed by it.

use std::borrow::Borrow;
use std::fmt;

/// Canonical, case-folded lookup key of a parameter name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamKey(Box<str>);

impl ParamKey {
    /// Fold a name into its canonical form.
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase().into_boxed_str())
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key begins with an already-lowercase `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// True when the key ends with an already-lowercase `suffix`.
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }
}

impl Borrow<str> for ParamKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parameter name as written, paired with its canonical key.
#[derive(Debug, Clone)]
pub struct ParamName {
    text: Box<str>,
    key: ParamKey,
}

impl ParamName {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.into(),
            key: ParamKey::new(text),
        }
    }

    /// The name with its original spelling.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn key(&self) -> &ParamKey {
        &self.key
    }

    /// Everything after the last `/`, or the whole name.
    pub fn part_after_last_slash(&self) -> &str {
        part_after_last_slash(&self.text)
    }
}

impl PartialEq for ParamName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ParamName {}

impl std::hash::Hash for ParamName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for ParamName {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Everything after the last `/` of `name`, or the whole name.
pub fn part_after_last_slash(name: &str) -> &str {
    match name.rfind('/') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Everything up to and including the last `/` of `name`.
pub(crate) fn part_through_last_slash(name: &str) -> &str {
    match name.rfind('/') {
        Some(pos) => &name[..=pos],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_key_folds_case() {
        assert_eq!(ParamKey::new("Ge/World/HLX"), ParamKey::new("ge/world/hlx"));
        assert_eq!(ParamKey::new("Ge/World/HLX").as_str(), "ge/world/hlx");
    }

    #[test]
    fn test_name_keeps_spelling() {
        let name = ParamName::new("Ge/World/Material");
        assert_eq!(name.as_str(), "Ge/World/Material");
        assert_eq!(name.key().as_str(), "ge/world/material");
        assert_eq!(name.to_string(), "Ge/World/Material");
    }

    #[test]
    fn test_name_equality_ignores_case() {
        assert_eq!(ParamName::new("Sc/Dose/Quantity"), ParamName::new("SC/DOSE/QUANTITY"));
    }

    #[test]
    fn test_key_borrow_lookup() {
        let mut map = HashMap::new();
        map.insert(ParamKey::new("Tf/Rot/Function"), 1);
        assert_eq!(map.get("tf/rot/function"), Some(&1));
    }

    #[test]
    fn test_part_after_last_slash() {
        assert_eq!(part_after_last_slash("Ge/Box/Type"), "Type");
        assert_eq!(part_after_last_slash("Plain"), "Plain");
        assert_eq!(ParamName::new("a/b/").part_after_last_slash(), "");
    }

    #[test]
    fn test_part_through_last_slash() {
        assert_eq!(part_through_last_slash("ge/box/type"), "ge/box/");
        assert_eq!(part_through_last_slash("plain"), "");
    }
}
