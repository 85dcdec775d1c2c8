//! Recovery of JavaScript object literals embedded in HTML.
//!
//! Pages carry their data as script literals (`window.__INIT_DATA={...}`,
//! `TShop.Setup({...})`, ...). Those are close to JSON but not quite, so they
//! are cut out of the page with [`extract_balanced`], rewritten into strict
//! JSON with [`js_to_json`] and then handed to `serde_json`.

use regex::Regex;
use serde_json::Value;

use crate::error::{ExtractorError, ExtractorResult};

/// Find `anchor` in `body` and parse the object or array literal that follows it.
///
/// Fails with [`ExtractorError::DataNotFound`] if the anchor is missing and with
/// [`ExtractorError::MalformedData`] if the literal cannot be recovered.
pub fn search_json(body: &str, anchor: &Regex, what: &str) -> ExtractorResult<Value> {
    search_json_opt(body, anchor, what)?.ok_or_else(|| ExtractorError::data_not_found(what))
}

/// Like [`search_json`], but a missing anchor is `Ok(None)`
pub fn search_json_opt(body: &str, anchor: &Regex, what: &str) -> ExtractorResult<Option<Value>> {
    let Some(m) = anchor.find(body) else {
        return Ok(None);
    };

    let rest = body[m.end()..].trim_start();
    let literal = extract_balanced(rest).ok_or_else(|| {
        ExtractorError::malformed_data(what, "no complete object literal after anchor")
    })?;

    parse_js_literal(literal, what).map(Some)
}

/// Decode the escapes of a JSON string body (the text between the quotes).
///
/// Falls back to the raw text if it is not a valid JSON string body.
#[must_use]
pub fn unescape_json_str(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}

pub fn parse_js_literal(literal: &str, what: &str) -> ExtractorResult<Value> {
    serde_json::from_str::<Value>(&js_to_json(literal))
        .map_err(|e| ExtractorError::malformed_data(what, e))
}

/// The `{...}` or `[...]` literal at the start of `s`, including its delimiters.
///
/// String contents (either quote style) are skipped, so braces inside them do
/// not count. Returns `None` if `s` does not start with a literal or it never closes.
#[must_use]
pub fn extract_balanced(s: &str) -> Option<&str> {
    let mut stack = Vec::<u8>::new();
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if i == 0 && b != b'{' && b != b'[' {
            return None;
        }

        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }

        match b {
            b'"' | b'\'' => quote = Some(b),
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Rewrite a JavaScript literal into strict JSON.
///
/// Handles single-quoted strings, unquoted keys, trailing commas, comments,
/// `undefined`/`void 0`, `!0`/`!1`, hex integers and JS-only string escapes.
#[must_use]
pub fn js_to_json(src: &str) -> String {
    let chars = src.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(src.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        match c {
            '"' | '\'' => {
                i = copy_string(&chars, i, &mut out);
            }
            '/' if chars.get(i + 1) == Some(&'/') || chars.get(i + 1) == Some(&'*') => {
                i = skip_comment(&chars, i);
            }
            ',' => {
                let next = skip_insignificant(&chars, i + 1);
                if !matches!(chars.get(next), Some('}' | ']') | None) {
                    out.push(',');
                }
                i += 1;
            }
            '!' if matches!(chars.get(i + 1), Some('0' | '1'))
                && !chars.get(i + 2).is_some_and(char::is_ascii_digit) =>
            {
                out.push_str(if chars[i + 1] == '0' { "true" } else { "false" });
                i += 2;
            }
            c if c == '-'
                || c.is_ascii_digit()
                || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) =>
            {
                let (token, next) = read_number(&chars, i);
                i = next;
                if is_key(&chars, i) {
                    out.push('"');
                    out.push_str(&token);
                    out.push('"');
                } else {
                    out.push_str(&token);
                }
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_part(chars[i]) {
                    i += 1;
                }
                let ident = chars[start..i].iter().collect::<String>();
                i = push_identifier(&chars, i, &ident, &mut out);
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn push_identifier(chars: &[char], i: usize, ident: &str, out: &mut String) -> usize {
    if is_key(chars, i) {
        out.push('"');
        out.push_str(ident);
        out.push('"');
        return i;
    }

    match ident {
        "true" | "false" | "null" => out.push_str(ident),
        "undefined" | "NaN" | "Infinity" => out.push_str("null"),
        "void" => {
            let next = skip_insignificant(chars, i);
            if chars.get(next) == Some(&'0') {
                out.push_str("null");
                return next + 1;
            }
            out.push_str("null");
        }
        _ => {
            out.push('"');
            out.push_str(ident);
            out.push('"');
        }
    }

    i
}

fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');

    while i < chars.len() {
        let c = chars[i];

        if c == quote {
            out.push('"');
            return i + 1;
        }

        match c {
            '\\' => {
                i += 1;
                let Some(&e) = chars.get(i) else {
                    break;
                };
                match e {
                    '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
                        out.push('\\');
                        out.push(e);
                    }
                    'u' => out.push_str("\\u"),
                    'x' => {
                        let hex = chars.get(i + 1..i + 3).map(|x| x.iter().collect::<String>());
                        match hex.filter(|x| x.chars().all(|c| c.is_ascii_hexdigit())) {
                            Some(hex) => {
                                out.push_str("\\u00");
                                out.push_str(&hex);
                                i += 2;
                            }
                            None => out.push('x'),
                        }
                    }
                    '0' if !chars.get(i + 1).is_some_and(char::is_ascii_digit) => {
                        out.push_str("\\u0000");
                    }
                    '\n' | '\r' => {}
                    e => push_json_char(e, out),
                }
            }
            '"' => out.push_str("\\\""),
            c => push_json_char(c, out),
        }

        i += 1;
    }

    // Unterminated string, close it so the error surfaces at parse time with context
    out.push('"');
    i
}

fn push_json_char(c: char, out: &mut String) {
    if (c as u32) < 0x20 {
        out.push_str(&format!("\\u{:04x}", c as u32));
    } else {
        out.push(c);
    }
}

fn skip_comment(chars: &[char], start: usize) -> usize {
    let mut i = start + 2;

    if chars[start + 1] == '/' {
        while i < chars.len() && chars[i] != '\n' {
            i += 1;
        }
        return i;
    }

    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }

    chars.len()
}

fn skip_insignificant(chars: &[char], mut i: usize) -> usize {
    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }

        if chars.get(i) == Some(&'/') && matches!(chars.get(i + 1), Some('/' | '*')) {
            i = skip_comment(chars, i);
        } else {
            return i;
        }
    }
}

fn is_key(chars: &[char], i: usize) -> bool {
    chars.get(skip_insignificant(chars, i)) == Some(&':')
}

const INFINITY: &str = "Infinity";

fn read_number(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    let mut token = String::new();

    if chars[i] == '-' {
        let word_end = i + 1 + INFINITY.len();
        if chars.get(i + 1..word_end).is_some_and(|x| x.iter().copied().eq(INFINITY.chars()))
            && !chars.get(word_end).is_some_and(|x| is_ident_part(*x))
        {
            return ("null".to_string(), word_end);
        }

        token.push('-');
        i += 1;
    }
    let digits_start = token.len();

    if chars.get(i) == Some(&'0') && matches!(chars.get(i + 1), Some('x' | 'X')) {
        let hex_start = i + 2;
        let mut end = hex_start;
        while end < chars.len() && chars[end].is_ascii_hexdigit() {
            end += 1;
        }
        let hex = chars[hex_start..end].iter().collect::<String>();
        if let Ok(n) = u64::from_str_radix(&hex, 16) {
            token.push_str(&n.to_string());
            return (token, end);
        }
    }

    while i < chars.len() {
        let c = chars[i];
        let after_exp = token.ends_with(|x| x == 'e' || x == 'E');
        if c.is_ascii_digit()
            || c == '.'
            || c == 'e'
            || c == 'E'
            || (after_exp && (c == '+' || c == '-'))
        {
            token.push(c);
            i += 1;
        } else {
            break;
        }
    }

    if token[digits_start..].starts_with('.') {
        token.insert(digits_start, '0');
    }
    if token.ends_with('.') {
        token.push('0');
    }

    (token, i)
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

const fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
