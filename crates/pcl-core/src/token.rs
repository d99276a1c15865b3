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

//! Tokenization of raw values and literal classification.

/// Split a raw value on white space. A double-quoted run is kept as one
/// token, quotes included, so `"Hello World" + s` yields three tokens.
pub fn tokenize(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in value.chars() {
        if in_quotes {
            current.push(c);
            if c == '"' {
                in_quotes = false;
            }
        } else if c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            if c == '"' {
                in_quotes = true;
            }
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Cursor over the tokens of one value.
#[derive(Debug)]
pub struct Tokens {
    items: Vec<String>,
    pos: usize,
}

impl Tokens {
    pub fn new(value: &str) -> Self {
        Self {
            items: tokenize(value),
            pos: 0,
        }
    }

    /// Next token, or `None` at the end.
    pub fn next_token(&mut self) -> Option<&str> {
        let token = self.items.get(self.pos)?;
        self.pos += 1;
        Some(token.as_str())
    }

    /// Next token as an owned string, empty at the end.
    pub fn take(&mut self) -> String {
        self.next_token().map(str::to_string).unwrap_or_default()
    }

    pub fn peek(&self) -> Option<&str> {
        self.items.get(self.pos).map(String::as_str)
    }

    /// Tokens not yet consumed.
    pub fn remaining(&self) -> &[String] {
        &self.items[self.pos.min(self.items.len())..]
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Real-number literal: optional sign, digits with an optional point
/// (`5.`, `.5`), optional exponent of at most seven digits.
pub fn is_double(token: &str) -> bool {
    let bytes = token.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let mut mantissa_digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let exponent_digits = i - start;
        if exponent_digits == 0 || exponent_digits > 7 {
            return false;
        }
    }
    i == bytes.len()
}

/// Integer literal: optional sign and at most 32 digits.
pub fn is_integer(token: &str) -> bool {
    let digits = token
        .strip_prefix('+')
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token);
    !digits.is_empty() && digits.len() <= 32 && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Boolean literal, with or without surrounding quotes.
pub fn parse_boolean(token: &str) -> Option<bool> {
    match unquote(token).to_ascii_lowercase().as_str() {
        "t" | "true" | "1" => Some(true),
        "f" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// True for a complete double-quoted token.
pub fn is_quoted(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}
