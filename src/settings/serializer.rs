//! Serialization of settings objects to a YAML-compatible text block.
//!
//! The block is what templates are rendered against and what gets logged
//! for diagnostics. Serializing never fails, and reading a block back with
//! [`parse_block`] yields the original settings.

use serde_yaml::{Mapping, Value};

use crate::config::infer_type;
use crate::error::RenderError;

use super::object::Settings;
use super::value::SettingValue;

/// Indentation step for nested tables.
const INDENT: usize = 2;

/// Plain scalars that YAML readers may interpret as something other than
/// a string.
const RESERVED_WORDS: &[&str] = &["null", "~", "true", "false", "yes", "no", "on", "off", "y", "n"];

/// Characters that may not start a plain scalar.
const INDICATOR_START: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
    '.', '+', '~',
];

/// Characters that force quoting wherever they appear.
const STRUCTURAL: &[char] = &[':', '#', ',', '[', ']', '{', '}', '\'', '"'];

/// Serializes settings into a block, one `name: value` line per field.
#[must_use]
pub fn to_block(settings: &Settings) -> String {
    if settings.is_empty() {
        return String::from("{}\n");
    }

    let mut output = String::new();
    write_table(&mut output, settings, 0);
    output
}

fn write_table(output: &mut String, table: &Settings, indent: usize) {
    for (name, value) in table.iter() {
        output.push_str(&" ".repeat(indent));
        output.push_str(&format_string(name));
        output.push(':');
        match value {
            SettingValue::Table(nested) if !nested.is_empty() => {
                output.push('\n');
                write_table(output, nested, indent + INDENT);
            }
            other => {
                output.push(' ');
                output.push_str(&inline_value(other));
                output.push('\n');
            }
        }
    }
}

/// Formats a value on a single line (flow style for lists and tables).
#[must_use]
pub fn inline_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(b) => b.to_string(),
        SettingValue::Integer(i) => i.to_string(),
        SettingValue::Float(f) => format_float(*f),
        SettingValue::String(s) => format_string(s),
        SettingValue::List(items) => {
            let items: Vec<String> = items.iter().map(inline_value).collect();
            format!("[{}]", items.join(", "))
        }
        SettingValue::Table(table) => {
            let fields: Vec<String> = table
                .iter()
                .map(|(name, value)| format!("{}: {}", format_string(name), inline_value(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

/// Shortest representation that reads back as the same float; always
/// carries a `.` or an exponent so it is never mistaken for an integer.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::from(".nan")
    } else if value.is_infinite() {
        if value > 0.0 {
            String::from(".inf")
        } else {
            String::from("-.inf")
        }
    } else {
        format!("{value:?}")
    }
}

fn format_string(s: &str) -> String {
    if s.chars().any(needs_escape) {
        double_quoted(s)
    } else if needs_quotes(s) {
        format!("'{}'", s.replace('\'', "''"))
    } else {
        s.to_string()
    }
}

fn needs_escape(c: char) -> bool {
    c.is_control() || (c.is_whitespace() && c != ' ') || c == '\u{feff}'
}

fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };

    s.trim() != s
        || INDICATOR_START.contains(&first)
        || first.is_ascii_digit()
        || s.contains(STRUCTURAL)
        || RESERVED_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w))
        || s.parse::<f64>().is_ok()
        || !matches!(infer_type(s), SettingValue::String(_))
}

fn double_quoted(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if needs_escape(c) => quoted.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Reads a settings block back into a settings object.
///
/// # Errors
///
/// Returns an error if the block is not valid YAML, is not a mapping, or
/// contains null values.
pub fn parse_block(block: &str) -> Result<Settings, RenderError> {
    let root: Value = serde_yaml::from_str(block)
        .map_err(|e| RenderError::invalid_settings(format!("YAML parse error: {e}")))?;

    match root {
        Value::Null => Ok(Settings::new()),
        Value::Mapping(mapping) => table_from_mapping(&mapping),
        Value::Tagged(tagged) => match tagged.value {
            Value::Mapping(mapping) => table_from_mapping(&mapping),
            _ => Err(RenderError::invalid_settings("settings block must be a mapping")),
        },
        _ => Err(RenderError::invalid_settings("settings block must be a mapping")),
    }
}

fn table_from_mapping(mapping: &Mapping) -> Result<Settings, RenderError> {
    let mut table = Settings::new();
    for (key, value) in mapping {
        let name = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(RenderError::invalid_settings(format!(
                    "unsupported field name: {other:?}"
                )));
            }
        };
        let value = value_from_yaml(value, &name)?;
        table.insert(name, value);
    }
    Ok(table)
}

fn value_from_yaml(value: &Value, name: &str) -> Result<SettingValue, RenderError> {
    match value {
        Value::Bool(b) => Ok(SettingValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SettingValue::Integer)
            .or_else(|| n.as_f64().map(SettingValue::Float))
            .ok_or_else(|| {
                RenderError::invalid_settings(format!("field '{name}' has an unsupported number"))
            }),
        Value::String(s) => Ok(SettingValue::String(s.clone())),
        Value::Sequence(items) => items
            .iter()
            .map(|item| value_from_yaml(item, name))
            .collect::<Result<Vec<_>, _>>()
            .map(SettingValue::List),
        Value::Mapping(mapping) => table_from_mapping(mapping).map(SettingValue::Table),
        Value::Tagged(tagged) => value_from_yaml(&tagged.value, name),
        Value::Null => Err(RenderError::invalid_settings(format!(
            "field '{name}' has no value"
        ))),
    }
}
