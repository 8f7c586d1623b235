//! Loader for variable-definition files.
//!
//! Two source formats are understood:
//!
//! - shell-style assignment files such as `var_defns.sh`
//!   (`NAME=value`, `export NAME=value`, quoted values, comments and bash
//!   array assignments), and
//! - structured YAML or JSON files whose nested groups are flattened to
//!   their leaf names.
//!
//! Sources are parsed statically; nothing is executed, nothing is exported
//! to the process environment, and `$NAME`/`${NAME}` references resolve
//! against earlier definitions in the same file only.

use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, info};

use crate::error::{ConfigGenError, LoadError, Result};

use super::definitions::Definitions;
use super::typer::{Separator, split_words};

/// Format of a definition source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DefinitionFormat {
    /// Shell assignments (`NAME=value`).
    Shell,
    /// YAML or JSON mapping, possibly nested.
    Structured,
}

impl DefinitionFormat {
    /// Picks a format from the file extension; anything that is not
    /// `.yaml`, `.yml` or `.json` is treated as shell.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext)
                if ext.eq_ignore_ascii_case("yaml")
                    || ext.eq_ignore_ascii_case("yml")
                    || ext.eq_ignore_ascii_case("json") =>
            {
                Self::Structured
            }
            _ => Self::Shell,
        }
    }
}

/// Loader producing a flat [`Definitions`] set.
#[derive(Debug, Default)]
pub struct DefinitionLoader {
    /// Forced format; detected from the extension when unset.
    format: Option<DefinitionFormat>,
}

impl DefinitionLoader {
    /// Creates a loader that detects the format from the file name.
    #[must_use]
    pub const fn new() -> Self {
        Self { format: None }
    }

    /// Forces a source format.
    #[must_use]
    pub const fn with_format(mut self, format: DefinitionFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Loads definitions from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Definitions> {
        let path = path.as_ref();
        info!("Loading definitions from: {}", path.display());

        if !path.exists() {
            return Err(ConfigGenError::Load(LoadError::NotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigGenError::Load(LoadError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })?;

        let format = self.format.unwrap_or_else(|| DefinitionFormat::from_path(path));
        let definitions = Self::parse_str(&content, format, &path.display().to_string())?;

        debug!("Loaded {} definitions ({format:?})", definitions.len());
        Ok(definitions)
    }

    /// Parses definitions from text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed for the given format.
    pub fn parse_str(
        content: &str,
        format: DefinitionFormat,
        source_name: &str,
    ) -> Result<Definitions> {
        let definitions = match format {
            DefinitionFormat::Shell => parse_shell(content, source_name),
            DefinitionFormat::Structured => parse_structured(content, source_name),
        }?;
        Ok(definitions)
    }
}

// ============================================================================
// Shell assignments
// ============================================================================

/// Stands in for an expandable `$` while dotenvy parses the line, so that
/// dotenvy never substitutes from the process environment.
const EXPANSION_MARK: char = '\u{E000}';

fn parse_shell(content: &str, source_name: &str) -> std::result::Result<Definitions, LoadError> {
    let normalized = mask_expansions(&rewrite_arrays(content, source_name)?);

    let mut definitions = Definitions::new();
    for item in dotenvy::from_read_iter(normalized.as_bytes()) {
        let (name, value) =
            item.map_err(|e| LoadError::malformed(source_name, e.to_string()))?;
        let value = expand_references(&value, &definitions, source_name)?;
        definitions.define(name, value);
    }
    Ok(definitions)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quoting {
    None,
    Single,
    Double,
}

/// Replaces every `$` that the shell would expand with [`EXPANSION_MARK`].
/// Single-quoted and backslash-escaped dollars, and comments, are left as
/// they are.
fn mask_expansions(content: &str) -> String {
    let mut masked = String::with_capacity(content.len());
    let mut quoting = Quoting::None;
    let mut after_space = true;
    let mut chars = content.chars();

    while let Some(c) = chars.next() {
        match (quoting, c) {
            (Quoting::Single, '\'') | (Quoting::Double, '"') => quoting = Quoting::None,
            (Quoting::None, '\'') => quoting = Quoting::Single,
            (Quoting::None, '"') => quoting = Quoting::Double,
            (Quoting::None | Quoting::Double, '\\') => {
                masked.push(c);
                if let Some(escaped) = chars.next() {
                    masked.push(escaped);
                }
                after_space = false;
                continue;
            }
            (Quoting::None | Quoting::Double, '$') => {
                masked.push(EXPANSION_MARK);
                after_space = false;
                continue;
            }
            (Quoting::None, '#') if after_space => {
                masked.push(c);
                for rest in chars.by_ref() {
                    masked.push(rest);
                    if rest == '\n' {
                        break;
                    }
                }
                after_space = true;
                continue;
            }
            _ => {}
        }
        masked.push(c);
        after_space = quoting == Quoting::None && c.is_whitespace();
    }
    masked
}

/// Expands marked `$NAME` and `${NAME}` references against the definitions
/// read so far. Unknown names expand to nothing, as in the shell.
fn expand_references(
    value: &str,
    definitions: &Definitions,
    source_name: &str,
) -> std::result::Result<String, LoadError> {
    if !value.contains(EXPANSION_MARK) {
        return Ok(value.to_string());
    }

    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find(EXPANSION_MARK) {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + EXPANSION_MARK.len_utf8()..];

        let (name, remainder) = if let Some(braced) = after.strip_prefix('{') {
            let end = braced.find('}').ok_or_else(|| {
                LoadError::malformed(source_name, "unclosed ${...} reference")
            })?;
            (&braced[..end], &braced[end + 1..])
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], &after[end..])
        };

        if is_identifier(name) {
            match definitions.get(name) {
                Some(defined) => expanded.push_str(defined),
                None => debug!("{source_name}: ${name} is not defined earlier, expanding to ''"),
            }
            rest = remainder;
        } else {
            expanded.push('$');
            rest = after;
        }
    }
    expanded.push_str(rest);
    Ok(expanded)
}

/// Rewrites bash array assignments, which may span several lines, into a
/// single double-quoted assignment holding a parenthesised list token.
fn rewrite_arrays(content: &str, source_name: &str) -> std::result::Result<String, LoadError> {
    let mut output = String::with_capacity(content.len());
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some((name, rest)) = array_start(line) else {
            output.push_str(line);
            output.push('\n');
            continue;
        };

        let mut body = strip_continuation(rest).to_string();
        let body = loop {
            if let Some(end) = closing_paren(&body) {
                body.truncate(end);
                break body;
            }
            let next = lines.next().ok_or_else(|| {
                LoadError::malformed(
                    source_name,
                    format!("unterminated array assignment for {name}"),
                )
            })?;
            body.push(' ');
            body.push_str(strip_continuation(next));
        };

        let elements: Vec<String> = split_words(&body, Separator::Whitespace)
            .into_iter()
            .map(|element| {
                if element.contains('"') {
                    format!("'{element}'")
                } else {
                    format!("\"{element}\"")
                }
            })
            .collect();
        let token = format!("({})", elements.join(" "));

        output.push_str(name);
        output.push_str("=\"");
        output.push_str(&escape_double_quoted(&token));
        output.push_str("\"\n");
    }

    Ok(output)
}

/// Matches `NAME=(` or `export NAME=(` and returns the name and the text
/// after the opening parenthesis.
fn array_start(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix("export ").map_or(trimmed, str::trim_start);
    let (name, rest) = trimmed.split_once('=')?;
    if !is_identifier(name) {
        return None;
    }
    rest.strip_prefix('(').map(|rest| (name, rest))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_continuation(line: &str) -> &str {
    let trimmed = line.trim_end();
    trimmed.strip_suffix('\\').unwrap_or(trimmed)
}

/// Byte offset of the first `)` outside quotes.
fn closing_paren(text: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == ')' => return Some(i),
            None => {}
        }
    }
    None
}

fn escape_double_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ============================================================================
// Structured (YAML / JSON) sources
// ============================================================================

fn parse_structured(
    content: &str,
    source_name: &str,
) -> std::result::Result<Definitions, LoadError> {
    let root: Value = serde_yaml::from_str(content)
        .map_err(|e| LoadError::malformed(source_name, format!("YAML parse error: {e}")))?;

    let mut definitions = Definitions::new();
    match root {
        Value::Null => {}
        Value::Mapping(_) => flatten_into(&root, &mut definitions, source_name)?,
        _ => {
            return Err(LoadError::malformed(
                source_name,
                "top level must be a mapping of names to values",
            ));
        }
    }
    Ok(definitions)
}

/// Flattens nested groups to their leaf names; a later leaf with the same
/// name overrides an earlier one.
fn flatten_into(
    value: &Value,
    definitions: &mut Definitions,
    source_name: &str,
) -> std::result::Result<(), LoadError> {
    let Value::Mapping(mapping) = value else {
        return Ok(());
    };

    for (key, value) in mapping {
        let name = key_name(key)
            .ok_or_else(|| LoadError::malformed(source_name, format!("unsupported key: {key:?}")))?;
        match untag(value) {
            nested @ Value::Mapping(_) => flatten_into(nested, definitions, source_name)?,
            leaf => {
                let token = raw_token(leaf).ok_or_else(|| {
                    LoadError::malformed(source_name, format!("unsupported value for {name}"))
                })?;
                definitions.define(name, token);
            }
        }
    }
    Ok(())
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn key_name(key: &Value) -> Option<String> {
    match untag(key) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Renders a scalar or sequence back to the raw token a shell definition
/// would have carried.
fn raw_token(value: &Value) -> Option<String> {
    match untag(value) {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(items) => {
            let elements = items
                .iter()
                .map(|item| match untag(item) {
                    Value::Sequence(_) => raw_token(item),
                    _ => raw_token(item).map(|token| quote_list_element(&token)),
                })
                .collect::<Option<Vec<_>>>()?;
            Some(format!("[{}]", elements.join(", ")))
        }
        Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn quote_list_element(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '[' | ']' | '(' | ')' | '\''));
    if token.contains('"') {
        format!("'{token}'")
    } else if needs_quotes {
        format!("\"{token}\"")
    } else {
        token.to_string()
    }
}
