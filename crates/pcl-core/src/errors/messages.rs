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

//! Centralized error messages for parameter loading and resolution.
//!
//! Every diagnostic the engine produces is built here so the wording stays
//! consistent between the loader, the file graph and the resolver.

use crate::error::ParamError;
use crate::value::ValueKind;

// ==================== Line Loader Errors ====================

/// File exceeds maximum size limit.
pub fn file_too_large(limit: usize) -> ParamError {
    ParamError::security(format!(
        "file too large: exceeds limit of {} bytes",
        limit
    ))
}

/// Line exceeds maximum length limit.
pub fn line_too_long(limit: usize, line: usize) -> ParamError {
    ParamError::security(format!(
        "line too long: exceeds limit of {} bytes",
        limit
    ))
    .with_line(line)
}

/// Invalid UTF-8 encoding detected.
pub fn invalid_utf8() -> ParamError {
    ParamError::invalid_value("file is not valid UTF-8")
}

/// Line with `=` but nothing before it.
pub fn missing_name(line: usize) -> ParamError {
    ParamError::invalid_name("missing parameter name before the equals sign").with_line(line)
}

/// Readable name of a character the grammar forbids.
pub fn describe_char(c: char) -> String {
    match c {
        '=' => "Equals Sign".to_string(),
        '+' => "Plus Sign".to_string(),
        '-' => "Minus Sign".to_string(),
        '*' => "Asterisk".to_string(),
        '"' => "Double Quotes".to_string(),
        '\'' => "Single Quote".to_string(),
        '`' => "Back Tick".to_string(),
        '#' => "Hash".to_string(),
        ' ' => "Space".to_string(),
        '\t' => "Tab".to_string(),
        '\n' => "Line Feed".to_string(),
        '\r' => "Carriage Return".to_string(),
        other => format!("U+{:04X}", other as u32),
    }
}

/// Forbidden character inside a parameter name.
pub fn forbidden_name_char(c: char) -> ParamError {
    ParamError::invalid_name(format!(
        "parameter name contains a forbidden character: {}",
        describe_char(c)
    ))
}

/// Forbidden character inside a parameter value.
pub fn forbidden_value_char(c: char) -> ParamError {
    ParamError::invalid_value(format!(
        "parameter value contains a forbidden character: {}",
        describe_char(c)
    ))
}

// ==================== Declaration Errors ====================

pub fn no_name_after_colon() -> ParamError {
    ParamError::invalid_name("no name after the colon")
}

pub fn missing_type_before_colon() -> ParamError {
    ParamError::invalid_name("missing characters before the colon")
}

pub fn bad_type_before_colon(prefix: &str) -> ParamError {
    ParamError::invalid_name(format!(
        "incorrect characters before the colon: {}",
        prefix
    ))
    .with_hint("Type prefix must be one of b, i, u, d, s, bv, iv, uv, dv, sv, optionally followed by c.")
}

pub fn leading_slash() -> ParamError {
    ParamError::invalid_name("parameter name must not start with a slash")
}

pub fn reserved_changeable() -> ParamError {
    ParamError::non_changeable_attribute("This parameter should never be set to changeable.")
}

pub fn duplicate_in_file() -> ParamError {
    ParamError::duplicate("parameter has already been defined elsewhere in this same file")
}

// ==================== File Graph Errors ====================

pub fn cannot_open(spec: &str, detail: &str) -> ParamError {
    ParamError::io(format!("unable to open parameter file {}: {}", spec, detail))
}

pub fn include_cycle(spec: &str) -> ParamError {
    ParamError::security(format!(
        "parameter file {} includes itself through its own include chain",
        spec
    ))
}

pub fn include_too_deep(limit: usize) -> ParamError {
    ParamError::security(format!(
        "include chain too deep: exceeds limit of {} files",
        limit
    ))
}

pub fn too_many_files(limit: usize) -> ParamError {
    ParamError::security(format!(
        "too many parameter files: exceeds limit of {}",
        limit
    ))
}

/// Two include chains give different values and the includer is silent.
pub fn ambiguous_chain(includer: &str, chain1: &[String], chain2: &[String]) -> ParamError {
    ParamError::ambiguous_chain(format!(
        "Parameter is set in two different parameter chains included from {} and not set absolutely in that top file.\n  Chain 1: {}\n  Chain 2: {}",
        includer,
        chain1.join(" "),
        chain2.join(" ")
    ))
}

/// The includer settles a conflict with a relative value.
pub fn must_be_absolute() -> ParamError {
    ParamError::ambiguous_chain(
        "Parameter is set in two different include file chains. This is only allowed if the top file sets this parameter to an absolute value.",
    )
}

pub fn different_arms(chain1: &[String], modifier: &str, chain2: &[String]) -> ParamError {
    ParamError::different_arms(format!(
        "has been defined in chain:\n    {}\n  but has been modified by parameter {} in chain:\n    {}",
        chain1.join(" "),
        modifier,
        chain2.join(" ")
    ))
}

pub fn type_differs_between_files(found: ValueKind, declared: ValueKind) -> ParamError {
    ParamError::type_mismatch(format!(
        "parameter has different type in different files: {} here, {} in an included file",
        declared, found
    ))
}

pub fn changeable_differs() -> ParamError {
    ParamError::type_mismatch("parameter has different settings for changeable in different files")
}

pub fn override_non_changeable() -> ParamError {
    ParamError::not_changeable("Attempt to override a non-changeable parameter")
}

/// An edit names an existing parameter that was not declared changeable.
pub fn not_changeable(name: &str) -> ParamError {
    ParamError::not_changeable(format!(
        "Parameter {} already exists and is not changeable. Declare it with a c suffix on its type to allow changes.",
        name
    ))
}

pub fn include_after_load() -> ParamError {
    ParamError::invalid_name("includeFile cannot be changed once the parameter files are loaded")
}

pub fn unknown_type() -> ParamError {
    ParamError::type_mismatch(
        "Parameter has unknown type. A type prefix is required unless an included file already declares this name.",
    )
}

// ==================== Resolver Errors ====================

pub fn unknown_reference(name: &str) -> ParamError {
    ParamError::unknown_reference(format!(
        "refers to parameter {} which has not been defined",
        name
    ))
}

pub fn wrong_reference_kind(name: &str, found: ValueKind, expected: &[ValueKind]) -> ParamError {
    let expected: Vec<&str> = expected.iter().map(|k| k.prefix()).collect();
    ParamError::type_mismatch(format!(
        "refers to parameter {} of type {} where type {} was expected",
        name,
        found,
        expected.join(" or ")
    ))
}

pub fn not_a_number(token: &str) -> ParamError {
    ParamError::invalid_value(format!("expected a number but found {}", token))
}

pub fn not_an_integer(token: &str) -> ParamError {
    ParamError::invalid_value(format!("expected an integer but found {}", token))
}

pub fn not_a_boolean(token: &str) -> ParamError {
    ParamError::invalid_value(format!(
        "expected \"True\" or \"False\" but found {}",
        token
    ))
}

pub fn unterminated_string() -> ParamError {
    ParamError::invalid_value("string value is missing its closing double quote")
}

pub fn empty_value() -> ParamError {
    ParamError::invalid_value("parameter has no value")
}

pub fn missing_operand(operator: &str) -> ParamError {
    ParamError::invalid_value(format!("nothing follows the operator {}", operator))
}

pub fn missing_unit() -> ParamError {
    ParamError::missing_unit("dimensioned parameter is missing its unit")
}

pub fn number_where_unit_expected(token: &str) -> ParamError {
    ParamError::missing_unit(format!(
        "found the number {} where the unit was expected. Check that the correct number of values was provided.",
        token
    ))
}

pub fn unrecognized_unit(unit: &str) -> ParamError {
    ParamError::unrecognized_unit(format!("unit {} is not a recognized unit", unit))
}

/// Overriding a name with a unit of another category.
pub fn unit_differs_from_parent(unit: &str, category: &str, parent_category: &str) -> ParamError {
    ParamError::unit_mismatch(format!(
        "Unit category does not match unit of parent file: {} is {} but the parent is {}",
        unit, category, parent_category
    ))
}

/// Combining operands of different unit categories.
pub fn unit_disagreement(other: &str, category: &str, other_category: &str) -> ParamError {
    ParamError::unit_mismatch(format!(
        "unit category {} does not agree with category {} of parameter {}",
        category, other_category, other
    ))
}

pub fn vector_count_not_integer(token: &str) -> ParamError {
    ParamError::invalid_value(format!(
        "vector parameter has a non-integer {} where the number of values is expected",
        token
    ))
}

pub fn vector_count_negative() -> ParamError {
    ParamError::invalid_value("vector parameter has a negative integer for number of values")
}

pub fn vector_count_zero() -> ParamError {
    ParamError::invalid_value("first token in a vector parameter was less than 1")
}

pub fn vector_too_long(count: usize, limit: usize) -> ParamError {
    ParamError::security(format!(
        "vector length {} exceeds limit of {}",
        count, limit
    ))
}

pub fn vector_too_few_values(count: usize, found: usize) -> ParamError {
    ParamError::invalid_value(format!(
        "vector parameter declares {} values but only {} were provided",
        count, found
    ))
}

pub fn trailing_tokens(is_vector: bool) -> ParamError {
    let mut message =
        String::from("Parameter has extra tokens that do not begin with the comment character.");
    if is_vector {
        message.push_str(
            "\nProblem may be that the vector's stated length does not match the number of values provided.",
        );
    }
    ParamError::trailing_tokens(message)
}

// ==================== Evaluation Errors ====================

pub fn undefined(name: &str) -> ParamError {
    ParamError::undefined(format!("Parameter name: {} has not been defined.", name))
}

pub fn vector_length_mismatch(other: &str, expected: usize, found: usize) -> ParamError {
    ParamError::vector_length(format!(
        "vector of length {} combined with parameter {} of length {}",
        expected, other, found
    ))
}

pub fn evaluation_too_deep(limit: usize) -> ParamError {
    ParamError::security(format!(
        "reference chain too deep: exceeds limit of {} (is there a reference cycle?)",
        limit
    ))
}

pub fn wrong_kind(name: &str, expected: ValueKind, found: ValueKind) -> ParamError {
    ParamError::type_mismatch(format!(
        "Expected the parameter named {} to have type {}\nBut instead found type {}",
        name, expected, found
    ))
}

pub fn wrong_category(name: &str, expected: &str, found: &str) -> ParamError {
    ParamError::unit_mismatch(format!(
        "Expected the parameter named {} to have unit category {}\nBut instead found {}",
        name, expected, found
    ))
}

pub fn wrong_vector_length(name: &str, expected: usize, found: usize) -> ParamError {
    ParamError::vector_length(format!(
        "Expected the parameter named {} to have {} values but found {}",
        name, expected, found
    ))
}

pub fn incompatible_operands(op: char) -> ParamError {
    ParamError::type_mismatch(format!("operands of {} have incompatible types", op))
}

// ==================== Time Feature Errors ====================

pub fn time_function_not_string() -> ParamError {
    ParamError::invalid_value(
        "time feature function must be a quoted string holding the function name and an optional unit",
    )
}

pub fn time_function_unit_is_number(token: &str) -> ParamError {
    ParamError::invalid_value(format!(
        "time feature function has the number {} where its unit was expected",
        token
    ))
}

pub fn time_function_unknown(name: &str) -> ParamError {
    ParamError::invalid_value(format!(
        "unknown time feature function {}. Use Linear, Sqrt, Exponent, Sine, Cosine or Step.",
        name
    ))
}

pub fn time_function_needs_step() -> ParamError {
    ParamError::invalid_value(
        "Only time feature function that supports Boolean or String values is Step",
    )
}

pub fn time_function_must_be_unitless(function: &str) -> ParamError {
    ParamError::invalid_value(format!(
        "time feature function {} must be unitless",
        function
    ))
}

pub fn time_step_lengths(times: usize, values: usize) -> ParamError {
    ParamError::vector_length(format!(
        "# of Values must be same # of Times: found {} times and {} values",
        times, values
    ))
}

pub fn time_step_values_kind() -> ParamError {
    ParamError::type_mismatch("time feature Values must be a vector parameter")
}

// ==================== Grammar hints ====================

/// Accepted value forms for `kind`, shown after a syntax failure.
pub fn grammar_hint(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Double => DOUBLE_FORMS,
        ValueKind::Unitless => UNITLESS_FORMS,
        ValueKind::Integer => INTEGER_FORMS,
        ValueKind::Boolean => BOOLEAN_FORMS,
        ValueKind::String => STRING_FORMS,
        ValueKind::DoubleVector => DOUBLE_VECTOR_FORMS,
        ValueKind::UnitlessVector => UNITLESS_VECTOR_FORMS,
        ValueKind::IntegerVector => INTEGER_VECTOR_FORMS,
        ValueKind::BooleanVector => BOOLEAN_VECTOR_FORMS,
        ValueKind::StringVector => STRING_VECTOR_FORMS,
    }
}

const DOUBLE_FORMS: &str = "Double parameters may have values of the following forms:
  number unit
  number unit + name_of_double_parameter
  number unit - name_of_double_parameter
  number unit * name_of_unitless_or_integer_parameter
  number * name_of_double_parameter unit
  name_of_double_parameter unit
  name_of_double_parameter unit * number
  name_of_double_parameter unit * name_of_unitless_or_integer_parameter
  name_of_unitless_or_integer_parameter * number unit
  name_of_double_parameter + number unit
  name_of_double_parameter - number unit
  name_of_double_parameter + name_of_double_parameter unit
  name_of_double_parameter - name_of_double_parameter unit";

const UNITLESS_FORMS: &str = "Unitless parameters may have values of the following forms:
  number
  number + name_of_unitless_or_integer_parameter
  number - name_of_unitless_or_integer_parameter
  number * name_of_unitless_or_integer_parameter
  name_of_unitless_or_integer_parameter
  name_of_unitless_or_integer_parameter + number
  name_of_unitless_or_integer_parameter - number
  name_of_unitless_or_integer_parameter * number
  name_of_unitless_or_integer_parameter + name_of_unitless_or_integer_parameter
  name_of_unitless_or_integer_parameter - name_of_unitless_or_integer_parameter
  name_of_unitless_or_integer_parameter * name_of_unitless_or_integer_parameter";

const INTEGER_FORMS: &str = "Integer parameters may have values of the following forms:
  integer
  integer + name_of_integer_parameter
  integer - name_of_integer_parameter
  integer * name_of_integer_parameter
  integer * name_of_unitless_parameter
  name_of_integer_parameter
  name_of_unitless_parameter
  name_of_integer_parameter + integer
  name_of_integer_parameter - integer
  name_of_integer_parameter * integer
  name_of_integer_parameter + name_of_integer_parameter
  name_of_integer_parameter - name_of_integer_parameter
  name_of_integer_parameter * name_of_integer_parameter
  name_of_integer_parameter * name_of_unitless_parameter";

const BOOLEAN_FORMS: &str = "Boolean parameters may have values of the following forms:
  \"True\", \"False\", \"T\" or \"F\"
  name_of_boolean_parameter
  name_of_boolean_parameter * name_of_boolean_parameter";

const STRING_FORMS: &str = "String parameters may have values of the following forms:
  \"string\"
  \"string\" + name_of_integer_or_string_parameter
  name_of_integer_or_string_parameter
  name_of_integer_or_string_parameter + \"string\"
  name_of_integer_or_string_parameter + name_of_integer_or_string_parameter";

const DOUBLE_VECTOR_FORMS: &str = "Double vector parameters may have values of the following forms:
  number_of_values value1 value2 ... valueN unit
  number_of_values value1 value2 ... valueN unit + name_of_double_or_double_vector_parameter
  number_of_values value1 value2 ... valueN unit - name_of_double_or_double_vector_parameter
  number_of_values value1 value2 ... valueN unit * name_of_unitless_or_integer_or_unitless_vector_or_integer_vector_parameter
  number_of_values value1 value2 ... valueN * name_of_double_or_double_vector_parameter unit
  number * name_of_double_vector_parameter unit
  name_of_double_vector_parameter unit
  name_of_double_vector_parameter * number_of_values value1 value2 ... valueN unit
  name_of_unitless_or_integer_parameter * name_of_double_vector_parameter unit";

const UNITLESS_VECTOR_FORMS: &str = "Unitless vector parameters may have values of the following forms:
  number_of_values value1 value2 ... valueN
  number_of_values value1 value2 ... valueN + name_of_unitless_or_integer_or_unitless_vector_or_integer_vector_parameter
  number_of_values value1 value2 ... valueN - name_of_unitless_or_integer_or_unitless_vector_or_integer_vector_parameter
  number_of_values value1 value2 ... valueN * name_of_unitless_or_integer_or_unitless_vector_or_integer_vector_parameter
  number * name_of_unitless_vector_parameter
  name_of_unitless_vector_parameter
  name_of_unitless_or_integer_parameter * name_of_unitless_vector_parameter";

const INTEGER_VECTOR_FORMS: &str = "Integer vector parameters may have values of the following forms:
  number_of_values value1 value2 ... valueN
  number_of_values value1 value2 ... valueN + name_of_integer_or_integer_vector_parameter
  number_of_values value1 value2 ... valueN - name_of_integer_or_integer_vector_parameter
  number_of_values value1 value2 ... valueN * name_of_integer_or_integer_vector_parameter
  integer * name_of_integer_vector_parameter
  name_of_integer_vector_parameter
  name_of_integer_parameter * name_of_integer_vector_parameter";

const BOOLEAN_VECTOR_FORMS: &str = "Boolean vector parameters may have values of the following forms:
  number_of_values value1 value2 ... valueN
  name_of_boolean_vector_parameter";

const STRING_VECTOR_FORMS: &str = "String vector parameters may have values of the following forms:
  number_of_values value1 value2 ... valueN
  number_of_values value1 value2 ... valueN + name_of_integer_or_string_or_integer_vector_or_string_vector_parameter
  name_of_string_vector_parameter";
