//! Conversion of raw definition tokens into typed values.
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. boolean lexicon (`true`/`yes`/`1`, `false`/`no`/`0`, any case)
//! 2. integer literal with optional sign
//! 3. floating-point literal
//! 4. list: `[a, b]`, `(a b)` or an unbracketed token containing a comma
//! 5. anything else is kept verbatim as a string
//!
//! Typing never fails.

use crate::settings::SettingValue;

const TRUE_TOKENS: &[&str] = &["true", "yes", "1"];
const FALSE_TOKENS: &[&str] = &["false", "no", "0"];

/// Infers the typed value of a raw token.
#[must_use]
pub fn infer_type(token: &str) -> SettingValue {
    let trimmed = token.trim();

    if let Some(flag) = parse_bool(trimmed) {
        return SettingValue::Bool(flag);
    }
    if let Some(int) = parse_integer(trimmed) {
        return SettingValue::Integer(int);
    }
    if let Some(float) = parse_float(trimmed) {
        return SettingValue::Float(float);
    }
    if let Some(items) = parse_list(trimmed) {
        return SettingValue::List(items.iter().map(|item| infer_type(item)).collect());
    }

    SettingValue::String(token.to_string())
}

fn parse_bool(token: &str) -> Option<bool> {
    if TRUE_TOKENS.iter().any(|t| token.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE_TOKENS.iter().any(|t| token.eq_ignore_ascii_case(t)) {
        Some(false)
    } else {
        None
    }
}

fn parse_integer(token: &str) -> Option<i64> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Accepts decimal and exponent notation only; words such as `inf` or
/// `nan` stay strings.
fn parse_float(token: &str) -> Option<f64> {
    let has_digit = token.bytes().any(|b| b.is_ascii_digit());
    let numeric_chars = token
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !has_digit || !numeric_chars {
        return None;
    }
    token.parse().ok()
}

fn parse_list(token: &str) -> Option<Vec<String>> {
    let bracketed = (token.starts_with('[') && token.ends_with(']'))
        || (token.starts_with('(') && token.ends_with(')'));

    if bracketed && token.len() >= 2 {
        let inner = &token[1..token.len() - 1];
        let separator = if contains_unquoted(inner, ',') {
            Separator::Comma
        } else {
            Separator::Whitespace
        };
        return Some(split_words(inner, separator));
    }

    if contains_unquoted(token, ',') {
        return Some(split_words(token, Separator::Comma));
    }

    None
}

/// How list elements are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separator {
    /// Elements separated by commas; surrounding whitespace is trimmed.
    Comma,
    /// Elements separated by runs of whitespace.
    Whitespace,
}

fn contains_unquoted(text: &str, needle: char) -> bool {
    let mut quote = None;
    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == needle => return true,
            None => {}
        }
    }
    false
}

/// Splits `text` into elements, honouring single and double quotes.
///
/// Quotes are removed from the returned elements; empty unquoted elements
/// are dropped.
pub(crate) fn split_words(text: &str, separator: Separator) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut quote: Option<char> = None;

    let mut flush = |current: &mut String, quoted: &mut bool| {
        let word = if *quoted {
            std::mem::take(current)
        } else {
            std::mem::take(current).trim().to_string()
        };
        if *quoted || !word.is_empty() {
            words.push(word);
        }
        *quoted = false;
    };

    for c in text.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            } else {
                current.push(c);
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                // Text outside the quotes of a quoted element is discarded
                // whitespace only, so drop it before the quoted part.
                if current.trim().is_empty() {
                    current.clear();
                }
                quote = Some(c);
                quoted = true;
            }
            ',' if separator == Separator::Comma => flush(&mut current, &mut quoted),
            c if c.is_whitespace() && separator == Separator::Whitespace => {
                if quoted || !current.is_empty() {
                    flush(&mut current, &mut quoted);
                }
            }
            c if c.is_whitespace() && quoted => {}
            _ => current.push(c),
        }
    }

    if quoted || !current.trim().is_empty() {
        flush(&mut current, &mut quoted);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> SettingValue {
        SettingValue::List(items.iter().map(|s| SettingValue::from(*s)).collect())
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_reference_tokens() {
        assert_eq!(infer_type("true"), SettingValue::Bool(true));
        assert_eq!(infer_type("42"), SettingValue::Integer(42));
        assert_eq!(infer_type("3.14"), SettingValue::Float(3.14));
        assert_eq!(infer_type("a,b,c"), strings(&["a", "b", "c"]));
        assert_eq!(infer_type("hello"), SettingValue::from("hello"));
    }

    #[test]
    fn test_boolean_lexicon() {
        for token in ["TRUE", "Yes", "1", " true "] {
            assert_eq!(infer_type(token), SettingValue::Bool(true), "{token}");
        }
        for token in ["False", "NO", "0"] {
            assert_eq!(infer_type(token), SettingValue::Bool(false), "{token}");
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(infer_type("-7"), SettingValue::Integer(-7));
        assert_eq!(infer_type("+180"), SettingValue::Integer(180));
        assert_eq!(infer_type("1e3"), SettingValue::Float(1000.0));
        assert_eq!(infer_type("-0.5"), SettingValue::Float(-0.5));
        assert_eq!(infer_type(".25"), SettingValue::Float(0.25));
        // Too large for i64, still numeric.
        assert_eq!(infer_type("99999999999999999999"), SettingValue::Float(1e20));
    }

    #[test]
    fn test_number_like_words_stay_strings() {
        for token in ["inf", "NaN", "1.2.3", "e", "-", "12abc", "0x1F"] {
            assert_eq!(infer_type(token), SettingValue::from(token), "{token}");
        }
    }

    #[test]
    fn test_bracketed_lists() {
        assert_eq!(infer_type("[a, b]"), strings(&["a", "b"]));
        assert_eq!(infer_type("( \"x y\" 'z' w )"), strings(&["x y", "z", "w"]));
        assert_eq!(infer_type("[]"), SettingValue::List(vec![]));
        assert_eq!(infer_type("()"), SettingValue::List(vec![]));
    }

    #[test]
    fn test_list_elements_are_typed() {
        assert_eq!(
            infer_type("[12, 2.5, no, text]"),
            SettingValue::List(vec![
                SettingValue::Integer(12),
                SettingValue::Float(2.5),
                SettingValue::Bool(false),
                SettingValue::from("text"),
            ])
        );
    }

    #[test]
    fn test_quoted_comma_is_not_a_separator() {
        assert_eq!(infer_type("'a,b'"), SettingValue::from("'a,b'"));
        assert_eq!(infer_type("[\"a,b\", c]"), strings(&["a,b", "c"]));
    }

    #[test]
    fn test_strings_are_verbatim() {
        assert_eq!(infer_type("  padded "), SettingValue::from("  padded "));
        assert_eq!(infer_type("/data/bio"), SettingValue::from("/data/bio"));
        assert_eq!(infer_type(""), SettingValue::from(""));
        assert_eq!(infer_type("hourly"), SettingValue::from("hourly"));
    }

    #[test]
    fn test_typer_is_total() {
        let samples = [
            "", " ", "[", "]", "(", ")", "\"", "'", ",", ",,", "[,]", "(\"", "'unterminated",
            "ü", "\u{0}", "--1", "+", "1e", "e1", "1,", "\\", "{a: b}", "a b c",
        ];
        for sample in samples {
            // Any input produces exactly one value without panicking.
            let _ = infer_type(sample);
        }
        assert_eq!(infer_type(",,"), SettingValue::List(vec![]));
    }
}
