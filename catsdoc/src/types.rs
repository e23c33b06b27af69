//! Type-expression helpers shared by the tag lexer, binder and validator.
//!
//! Type expressions stay opaque strings in the model. These helpers only
//! find where one ends inside a tag payload, split `fun(...)` signatures,
//! and list the names an expression refers to.

use crate::model::{FunctionSignature, Literal, Param, Return};
use regex::Regex;
use std::sync::LazyLock;

static RE_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(0[xX][0-9a-fA-F]+|[0-9]+)$").unwrap());

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?$").unwrap()
});

static RE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

fn is_open(c: char) -> bool {
    matches!(c, '(' | '[' | '{' | '<')
}

fn is_close(c: char) -> bool {
    matches!(c, ')' | ']' | '}' | '>')
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// Index just past the string literal starting at `chars[start]`, or
/// `None` when it is not terminated.
fn skip_string(chars: &[(usize, char)], start: usize) -> Option<usize> {
    let quote = chars[start].1;
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i].1 {
            '\\' => i += 2,
            c if c == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Split a leading type expression off `input`.
///
/// Whitespace ends the type only at bracket depth zero and not next to a
/// `|` or after a `:` (`fun(): integer`, `string | nil`). Returns the type
/// and the trimmed remainder, or `None` when there is no type or its
/// brackets/quotes do not balance.
pub fn split_type(input: &str) -> Option<(String, &str)> {
    let input = input.trim();
    if input.is_empty() || input.starts_with('#') {
        return None;
    }

    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut depth = 0usize;
    let mut end = input.len();
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        if is_quote(c) {
            i = skip_string(&chars, i)?;
            continue;
        }
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.checked_sub(1)?;
        } else if c.is_whitespace() && depth == 0 {
            let before = input[..pos].trim_end();
            let after = input[pos..].trim_start();
            if !(before.ends_with('|') || before.ends_with(':') || after.starts_with('|')) {
                end = pos;
                break;
            }
        }
        i += 1;
    }

    if depth != 0 {
        return None;
    }

    let ty = input[..end].trim().to_string();
    Some((ty, input[end..].trim_start()))
}

/// Split `input` on `sep` at bracket depth zero, outside string literals.
pub fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        if is_quote(c) {
            i = skip_string(&chars, i).unwrap_or(chars.len());
            continue;
        }
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        } else if c == sep && depth == 0 {
            parts.push(&input[start..pos]);
            start = pos + c.len_utf8();
        }
        i += 1;
    }
    parts.push(&input[start..]);
    parts
}

/// Split a `# description` suffix off a payload.
pub fn split_comment(input: &str) -> (&str, Option<&str>) {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        if is_quote(c) {
            i = skip_string(&chars, i).unwrap_or(chars.len());
            continue;
        }
        if c == '#' {
            let desc = input[pos + 1..].trim();
            let desc = (!desc.is_empty()).then_some(desc);
            return (input[..pos].trim_end(), desc);
        }
        i += 1;
    }
    (input, None)
}

/// Parse `fun(a: string, b?: integer): boolean` into a signature.
pub fn parse_fun(expr: &str) -> Option<FunctionSignature> {
    let rest = expr.trim().strip_prefix("fun")?.trim_start();
    let inner = rest.strip_prefix('(')?;

    let chars: Vec<(usize, char)> = inner.char_indices().collect();
    let mut depth = 0usize;
    let mut close = None;
    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        if is_quote(c) {
            i = skip_string(&chars, i)?;
            continue;
        }
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            if depth == 0 {
                close = Some(pos);
                break;
            }
            depth -= 1;
        }
        i += 1;
    }
    let close = close?;

    let params = split_top_level(&inner[..close], ',')
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_fun_param)
        .collect();

    let after = inner[close + 1..].trim();
    let returns = if after.is_empty() {
        Vec::new()
    } else {
        let list = after.strip_prefix(':')?;
        split_top_level(list, ',')
            .into_iter()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(parse_fun_return)
            .collect()
    };

    Some(FunctionSignature { params, returns })
}

fn parse_fun_param(text: &str) -> Param {
    let (name, ty) = match split_top_level(text, ':').as_slice() {
        [name, ty, ..] => (name.trim(), ty.trim()),
        _ => (text, "any"),
    };
    let optional = name.ends_with('?');
    Param {
        name: name.trim_end_matches('?').to_string(),
        ty: if ty.is_empty() { "any".to_string() } else { ty.to_string() },
        optional,
        description: None,
    }
}

fn parse_fun_return(text: &str) -> Return {
    if let [name, ty] = split_top_level(text, ':').as_slice() {
        if RE_IDENTIFIER.is_match(name.trim()) {
            return Return {
                ty: ty.trim().to_string(),
                name: Some(name.trim().to_string()),
                description: None,
            };
        }
    }
    Return {
        ty: text.to_string(),
        name: None,
        description: None,
    }
}

/// Names declared by a `@generic T, U : Parent` payload.
pub fn generic_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let name = part.split(':').next()?.trim();
            let name = name.split_whitespace().next()?;
            Some(name.to_string())
        })
        .collect()
}

/// Identifiers a type expression refers to, in order of appearance.
///
/// Skips string literals, numbers, the `fun` keyword, and parameter or
/// field names inside `fun(...)` and `{ ... }` types.
pub fn referenced_names(expr: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = expr.char_indices().collect();
    let mut names = Vec::new();
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i].1;
        if is_quote(c) {
            i = skip_string(&chars, i).unwrap_or(chars.len());
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            let start = chars[i].0;
            while i < chars.len() && (chars[i].1.is_ascii_alphanumeric() || matches!(chars[i].1, '_' | '.')) {
                i += 1;
            }
            let end = chars.get(i).map_or(expr.len(), |&(pos, _)| pos);
            let word = expr[start..end].trim_end_matches('.');

            let mut j = i;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            let keyword = word == "fun" && chars.get(j).map(|&(_, c)| c) == Some('(');
            if j < chars.len() && chars[j].1 == '?' {
                j += 1;
            }
            let member_name = matches!(stack.last(), Some('(') | Some('{'))
                && chars.get(j).map(|&(_, c)| c) == Some(':');

            if !keyword && !member_name {
                names.push(word.to_string());
            }
            continue;
        }
        if c.is_ascii_digit() {
            while i < chars.len() && (chars[i].1.is_ascii_alphanumeric() || chars[i].1 == '.') {
                i += 1;
            }
            continue;
        }
        if is_open(c) {
            stack.push(c);
        } else if is_close(c) {
            stack.pop();
        }
        i += 1;
    }
    names
}

/// Type and literal for a value written in code, when it is a literal.
pub fn infer_literal(value: &str) -> Option<(&'static str, Literal)> {
    let value = value.trim();
    let ty = if RE_INTEGER.is_match(value) {
        "integer"
    } else if RE_NUMBER.is_match(value) {
        "number"
    } else if value == "true" || value == "false" {
        "boolean"
    } else if value == "nil" {
        "nil"
    } else if is_string_literal(value) {
        "string"
    } else {
        return None;
    };
    Some((ty, Literal(value.to_string())))
}

fn is_string_literal(value: &str) -> bool {
    let quoted = |q: char| value.len() >= 2 && value.starts_with(q) && value.ends_with(q);
    quoted('"') || quoted('\'') || (value.starts_with("[[") && value.ends_with("]]"))
}

pub fn is_identifier(word: &str) -> bool {
    RE_IDENTIFIER.is_match(word)
}
