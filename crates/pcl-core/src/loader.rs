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

//! Line loader: turns parameter file text into ordered name/value records.

use crate::error::ParamResult;
use crate::errors::messages;
use crate::limits::Limits;
use tracing::trace;

/// One `name = value` record as written in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Text left of the first `=`, including any type prefix.
    pub name: String,
    /// Text right of the first `=`, continuation lines joined by `\n`.
    pub value: String,
    /// Line number of the `=` (1-based).
    pub line: usize,
}

const FORBIDDEN_IN_NAME: &[char] = &['=', '+', '-', '*', '"', '\'', '`', '#', ' ', '\t', '\n', '\r'];
const FORBIDDEN_IN_VALUE: &[char] = &['=', '\'', '`', '#', '\r'];

/// Read every record of a parameter file.
///
/// This handles:
/// - UTF-8 validation and BOM skipping
/// - LF, CRLF and bare CR line endings
/// - `#` comments
/// - smart quote and hyphen normalization
/// - continuation lines
/// - forbidden characters in names and values
pub fn load_records(input: &[u8], limits: &Limits) -> ParamResult<Vec<RawRecord>> {
    if input.len() > limits.max_file_size {
        return Err(messages::file_too_large(limits.max_file_size));
    }

    let text = std::str::from_utf8(input).map_err(|_| messages::invalid_utf8())?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);

    let lines = split_lines(text, limits)?;
    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let (line_num, raw) = &lines[i];
        i += 1;

        let content = strip_comment(raw);
        // Text before the first key, and stray lines between records, carry nothing.
        let Some(eq) = content.find('=') else {
            continue;
        };

        let name = content[..eq].trim().to_string();
        let mut value = content[eq + 1..].trim().to_string();

        while i < lines.len() {
            let next = &lines[i].1;
            if ends_value(next) {
                i += 1;
                break;
            }
            if is_comment_only(next) {
                i += 1;
                continue;
            }
            let next_content = strip_comment(next);
            if next_content.contains('=') {
                break;
            }
            i += 1;
            let piece = next_content.trim();
            if !piece.is_empty() {
                value.push('\n');
                value.push_str(piece);
            }
        }

        validate_name(&name, *line_num)?;
        validate_value(&name, &value, *line_num)?;
        trace!(name = %name, line = line_num, "read parameter record");
        records.push(RawRecord {
            name,
            value,
            line: *line_num,
        });
    }

    Ok(records)
}

/// Split on LF, CRLF or bare CR, normalizing punctuation on the way.
fn split_lines(text: &str, limits: &Limits) -> ParamResult<Vec<(usize, String)>> {
    let mut lines = Vec::with_capacity(text.len() / 32 + 1);
    let mut current = String::new();
    let mut line_num = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' | '\r' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                check_line_length(&current, limits, line_num)?;
                lines.push((line_num, std::mem::take(&mut current)));
                line_num += 1;
            }
            other => current.push(normalize_char(other)),
        }
    }
    check_line_length(&current, limits, line_num)?;
    lines.push((line_num, current));
    Ok(lines)
}

fn check_line_length(line: &str, limits: &Limits, line_num: usize) -> ParamResult<()> {
    if line.len() > limits.max_line_length {
        return Err(messages::line_too_long(limits.max_line_length, line_num));
    }
    Ok(())
}

/// Map typographic quotes and dashes to their ASCII forms.
pub fn normalize_char(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' => '"',
        '\u{2010}'..='\u{2015}' => '-',
        other => other,
    }
}

/// Text before the first `#`.
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn validate_name(name: &str, line: usize) -> ParamResult<()> {
    if name.is_empty() {
        return Err(messages::missing_name(line));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_IN_NAME.contains(c)) {
        return Err(messages::forbidden_name_char(c)
            .with_line(line)
            .with_parameter(name));
    }
    Ok(())
}

fn validate_value(name: &str, value: &str, line: usize) -> ParamResult<()> {
    if let Some(c) = value.chars().find(|c| FORBIDDEN_IN_VALUE.contains(c)) {
        return Err(messages::forbidden_value_char(c)
            .with_line(line)
            .with_parameter(name)
            .with_value(value));
    }
    Ok(())
}

/// A raw line with nothing but white space closes the value above it.
fn ends_value(raw: &str) -> bool {
    raw.chars().all(char::is_whitespace)
}

/// A line holding only a comment is skipped inside a value.
fn is_comment_only(raw: &str) -> bool {
    raw.trim_start().starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamErrorKind;

    fn load(input: &str) -> ParamResult<Vec<RawRecord>> {
        load_records(input.as_bytes(), &Limits::default())
    }

    fn pairs(input: &str) -> Vec<(String, String)> {
        load(input)
            .unwrap()
            .into_iter()
            .map(|r| (r.name, r.value))
            .collect()
    }

    // ==================== Basic record tests ====================

    #[test]
    fn test_single_record() {
        let records = load("d:Ge/World/HLX = 1.0 m\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "d:Ge/World/HLX");
        assert_eq!(records[0].value, "1.0 m");
        assert_eq!(records[0].line, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(load("").unwrap().is_empty());
    }

    #[test]
    fn test_text_before_first_key_ignored() {
        let records = pairs("just a title line\n\ns:Ma/Name = \"Water\"\n");
        assert_eq!(records, vec![("s:Ma/Name".into(), "\"Water\"".into())]);
    }

    #[test]
    fn test_split_at_first_equals_only() {
        let err = load("s:A = x = y\n").unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidValue);
        assert!(err.message.contains("Equals Sign"));
    }

    #[test]
    fn test_line_numbers() {
        let records = load("# header\n\ni:A = 1\n\ni:B = 2\n").unwrap();
        assert_eq!(records[0].line, 3);
        assert_eq!(records[1].line, 5);
    }

    // ==================== Comment tests ====================

    #[test]
    fn test_trailing_comment_stripped() {
        assert_eq!(
            pairs("d:A = 5 cm # half length\n"),
            vec![("d:A".into(), "5 cm".into())]
        );
    }

    #[test]
    fn test_commented_out_record_ignored() {
        assert!(pairs("# d:A = 5 cm\n").is_empty());
    }

    #[test]
    fn test_comment_only_and_blank_lines() {
        assert!(is_comment_only("   # note"));
        assert!(!is_comment_only("a # note"));
        assert!(ends_value(" \t "));
        assert!(!ends_value(" x "));
    }

    // ==================== Continuation tests ====================

    #[test]
    fn test_continuation_lines_joined() {
        assert_eq!(
            pairs("sv:Ph/Modules = 2\n  \"g4em\"\n  \"g4decay\"\n"),
            vec![("sv:Ph/Modules".into(), "2\n\"g4em\"\n\"g4decay\"".into())]
        );
    }

    #[test]
    fn test_continuation_ends_at_blank_line() {
        let records = pairs("uv:A = 2\n 1\n\n 3\ni:B = 4\n");
        assert_eq!(records[0], ("uv:A".into(), "2\n1".into()));
        assert_eq!(records[1], ("i:B".into(), "4".into()));
    }

    #[test]
    fn test_continuation_ends_at_next_key() {
        let records = pairs("i:A = 1\ni:B = 2\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].1, "1");
    }

    #[test]
    fn test_comment_line_inside_continuation() {
        let records = pairs("iv:A = 3 1\n# skipped\n 2 3\n");
        assert_eq!(records[0].1, "3 1\n2 3");
    }

    #[test]
    fn test_whitespace_line_ends_value_but_comment_does_not() {
        let records = pairs("uv:A = 3\n  # first\n 1 2\n \t \n  # after\n 3\n");
        assert_eq!(records, vec![("uv:A".into(), "3\n1 2".into())]);
    }

    // ==================== Line ending tests ====================

    #[test]
    fn test_crlf_and_bare_cr() {
        let records = pairs("i:A = 1\r\ni:B = 2\ri:C = 3");
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], ("i:C".into(), "3".into()));
    }

    #[test]
    fn test_bom_skipped() {
        let records = pairs("\u{FEFF}i:A = 1\n");
        assert_eq!(records[0].0, "i:A");
    }

    // ==================== Normalization tests ====================

    #[test]
    fn test_smart_quotes_normalized() {
        let records = pairs("s:Ma/Name = \u{201C}Water\u{201D}\n");
        assert_eq!(records[0].1, "\"Water\"");
    }

    #[test]
    fn test_unicode_hyphen_normalized_everywhere() {
        let records = pairs("u:A = \u{2013}1\nu:B = 2 \u{2212}\n");
        assert_eq!(records[0].1, "-1");
        // U+2212 MINUS SIGN is not in the hyphen block
        assert_eq!(records[1].1, "2 \u{2212}");
    }

    #[test]
    fn test_normalize_char() {
        assert_eq!(normalize_char('\u{2018}'), '"');
        assert_eq!(normalize_char('\u{2015}'), '-');
        assert_eq!(normalize_char('x'), 'x');
    }

    // ==================== Validation tests ====================

    #[test]
    fn test_name_with_space_rejected() {
        let err = load("d:Ge/My Box/HLX = 1 m\n").unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidName);
        assert!(err.message.contains("Space"));
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_name_with_quote_rejected() {
        let err = load("s:Ge/\"Box\" = \"x\"\n").unwrap_err();
        assert!(err.message.contains("Double Quotes"));
    }

    #[test]
    fn test_name_with_hyphen_rejected() {
        let err = load("i:Ts/Run-ID = 1\n").unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidName);
    }

    #[test]
    fn test_missing_name() {
        let err = load(" = 5\n").unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidName);
    }

    #[test]
    fn test_value_with_backtick_rejected() {
        let err = load("s:A = `cmd`\n").unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidValue);
        assert!(err.message.contains("Back Tick"));
        assert_eq!(err.parameter.as_deref(), Some("s:A"));
    }

    #[test]
    fn test_value_with_single_quote_rejected() {
        let err = load("s:A = 'x'\n").unwrap_err();
        assert!(err.message.contains("Single Quote"));
    }

    // ==================== Limit tests ====================

    #[test]
    fn test_file_too_large() {
        let limits = Limits {
            max_file_size: 4,
            ..Limits::default()
        };
        let err = load_records(b"i:A = 1\n", &limits).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::Security);
    }

    #[test]
    fn test_line_too_long() {
        let limits = Limits {
            max_line_length: 5,
            ..Limits::default()
        };
        let err = load_records(b"i:A = 1\n", &limits).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::Security);
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = load_records(&[0x69, 0x3A, 0x41, 0x3D, 0xFF], &Limits::default()).unwrap_err();
        assert_eq!(err.kind, ParamErrorKind::InvalidValue);
    }
}
