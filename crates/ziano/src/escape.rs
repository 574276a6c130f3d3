// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Expression detection and escaping helpers.
//!
//! Two escaping regimes are involved when compiling a template:
//!
//! - **HTML escaping** of markup, either in text context ([`escape_text`],
//!   quotes untouched) or attribute context ([`escape_property`], quotes
//!   escaped).
//! - **PHP string escaping** of literal fragments so they can be embedded in
//!   the generated double-quoted `echo` statements ([`escape_php_literal`]).
//!
//! Values that may contain an expression are detected with
//! [`maybe_contains_code`] and turned into a PHP expression with
//! [`prepare_code_parts`].

use crate::ast::PropValue;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CODE_MARKER: Regex = Regex::new(r"[$\{\}]").unwrap();
    static ref BARE_VARIABLE: Regex = Regex::new(r"^\$[a-zA-Z0-9_]+$").unwrap();
}

/// Tags that never have children and need no closing marker.
pub const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Attributes rendered bare (`<option selected>`) when set without a value.
pub const DEFAULT_BOOLEAN_ATTRIBUTES: &[&str] = &["selected", "checked", "disabled"];

/// Returns true for HTML void elements.
pub fn is_self_closing_tag(name: &str) -> bool {
    SELF_CLOSING_TAGS.contains(&name)
}

/// Whitespace as the markup scanner sees it. Other Unicode spaces such as
/// U+00A0 are content.
pub fn is_markup_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Returns true if `text` holds nothing but ASCII blanks (space, tab, CR,
/// LF, NUL, vertical tab).
pub fn is_blank(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n' | '\0' | '\x0B'))
}

/// Returns true if `value` contains `$`, `{` or `}` and may therefore hold
/// an embedded expression.
pub fn maybe_contains_code(value: &str) -> bool {
    CODE_MARKER.is_match(value)
}

/// Returns true for a bare variable token such as `$title`.
pub fn is_variable(value: &str) -> bool {
    BARE_VARIABLE.is_match(value)
}

/// HTML-escapes text content. Quotes are left alone.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML-escapes an attribute value, quotes included.
pub fn escape_property(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decodes the entities [`escape_property`] can produce for double-quoted
/// values. `&amp;` is decoded last so `&amp;lt;` stays `&lt;`.
pub fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Escapes a fragment for a PHP double-quoted string with no interpolation.
///
/// Carriage returns are dropped and newlines become `\n`.
pub fn escape_php_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Wraps [`escape_php_literal`] in double quotes.
pub fn php_string(value: &str) -> String {
    format!("\"{}\"", escape_php_literal(value))
}

/// Escapes a fragment for a PHP double-quoted string while keeping `$name`
/// and `{$expr}` interpolation live.
pub fn escape_interpolated_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Quotes a PHP array key.
pub fn php_single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// One piece of an interpolated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Static text between interpolations.
    Literal(&'a str),
    /// The inside of a `{{ ... }}` pair, untrimmed.
    Expr(&'a str),
}

/// Splits a value on `{{ ... }}` boundaries.
///
/// An opening `{{` with no matching `}}` is kept as literal text.
pub fn split_interpolation(value: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = value;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        segments.push(Segment::Literal(&rest[..open]));
        segments.push(Segment::Expr(&after_open[..close]));
        rest = &after_open[close + 2..];
    }
    segments.push(Segment::Literal(rest));
    segments
}

/// Turns a possibly dynamic value into a PHP expression.
///
/// A bare variable passes through untouched. Anything else becomes a
/// concatenation of string literals and the expressions found between
/// `{{` and `}}`, with empty literals left out.
pub fn prepare_code_parts(value: &str) -> String {
    if is_variable(value) {
        return value.to_string();
    }

    let parts: Vec<String> = split_interpolation(value)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Literal("") => None,
            Segment::Literal(text) => Some(format!("\"{}\"", escape_interpolated_literal(text))),
            Segment::Expr(expr) => {
                let expr = expr.trim();
                if expr.is_empty() {
                    None
                } else {
                    Some(expr.replace(['\r', '\n'], " "))
                }
            }
        })
        .collect();

    if parts.is_empty() {
        "\"\"".to_string()
    } else {
        parts.join(" . ")
    }
}

/// Exports an include argument as a PHP expression.
///
/// - `$var` passes through.
/// - `{{ expr }}` and `{$expr}` unwrap to `expr` when no further braces
///   are nested inside.
/// - Anything else becomes a string literal.
pub fn export_property_value(value: &PropValue) -> String {
    let text = match value {
        PropValue::Text(text) => text,
        PropValue::Flag => return "true".to_string(),
        PropValue::Null => return "null".to_string(),
    };

    if is_variable(text) {
        return text.clone();
    }

    if let Some(inner) = text.strip_prefix("{{").and_then(|t| t.strip_suffix("}}")) {
        if !inner.is_empty() && !inner.contains("{{") && !inner.contains("}}") {
            return inner.trim().to_string();
        }
    } else if let Some(inner) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        if inner.len() > 1 && inner.starts_with('$') && !inner.contains('{') && !inner.contains('}') {
            return inner.to_string();
        }
    }

    format!("\"{}\"", escape_interpolated_literal(text))
}
