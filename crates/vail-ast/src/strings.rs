//! String literal evaluation and unevaluation.
//!
//! Self-contained helper shared by the lexer (decoding literals into
//! values) and the generators (re-encoding values as literals). The escape
//! tables follow the target editor's own string semantics:
//!
//! - single-quoted literals know exactly one escape, `''` for `'`
//! - double-quoted literals use backslash escapes: the usual control
//!   characters, `\xHH`/`\XHH` hex, `\uHHHH`/`\UHHHHHHHH` unicode, one to
//!   three octal digits, and `\<Key>` special-key notation
//!
//! `uneval` always emits a double-quoted literal; the round-trip contract
//! is on the decoded value, not the spelling.

use thiserror::Error;

/// A malformed string literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringError {
    #[error("unterminated string literal")]
    Unterminated,
    #[error("invalid escape sequence: \\{0}")]
    BadEscape(char),
    #[error("unknown special key: <{0}>")]
    UnknownKey(String),
    #[error("truncated escape sequence")]
    TruncatedEscape,
    #[error("invalid unicode escape")]
    BadUnicode,
}

/// Special-key names recognized inside `\<...>`, with the character each
/// decodes to.
const KEY_TABLE: &[(&str, char)] = &[
    ("Esc", '\u{1b}'),
    ("CR", '\r'),
    ("Return", '\r'),
    ("Enter", '\r'),
    ("NL", '\n'),
    ("Tab", '\t'),
    ("Space", ' '),
    ("BS", '\u{8}'),
    ("Del", '\u{7f}'),
    ("Bar", '|'),
    ("Bslash", '\\'),
    ("lt", '<'),
];

/// Decode a quoted string literal (including its quotes) into its value.
pub fn eval_quoted(literal: &str) -> Result<String, StringError> {
    let mut chars = literal.chars();
    match chars.next() {
        Some('\'') => eval_single(chars.as_str()),
        Some('"') => eval_double(chars.as_str()),
        _ => Err(StringError::Unterminated),
    }
}

/// Decode the inside of a single-quoted literal, trailing quote included.
fn eval_single(rest: &str) -> Result<String, StringError> {
    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    loop {
        match chars.next() {
            Some('\'') => {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    // Closing quote; anything after it is the lexer's bug.
                    return if chars.next().is_none() {
                        Ok(out)
                    } else {
                        Err(StringError::Unterminated)
                    };
                }
            }
            Some(ch) => out.push(ch),
            None => return Err(StringError::Unterminated),
        }
    }
}

/// Decode the inside of a double-quoted literal, trailing quote included.
fn eval_double(rest: &str) -> Result<String, StringError> {
    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    loop {
        match chars.next() {
            Some('"') => {
                return if chars.next().is_none() {
                    Ok(out)
                } else {
                    Err(StringError::Unterminated)
                };
            }
            Some('\\') => out.push(eval_escape(&mut chars)?),
            Some(ch) => out.push(ch),
            None => return Err(StringError::Unterminated),
        }
    }
}

fn eval_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<char, StringError> {
    let esc = chars.next().ok_or(StringError::TruncatedEscape)?;
    match esc {
        'b' => Ok('\u{8}'),
        'e' => Ok('\u{1b}'),
        'f' => Ok('\u{c}'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        't' => Ok('\t'),
        '\\' => Ok('\\'),
        '"' => Ok('"'),
        '\'' => Ok('\''),
        'x' | 'X' => hex_escape(chars, 2),
        'u' => hex_escape(chars, 4),
        'U' => hex_escape(chars, 8),
        '0'..='7' => {
            // Up to three octal digits, first already consumed.
            let mut value = esc as u32 - '0' as u32;
            for _ in 0..2 {
                match chars.peek() {
                    Some(d @ '0'..='7') => {
                        value = value * 8 + (*d as u32 - '0' as u32);
                        chars.next();
                    }
                    _ => break,
                }
            }
            char::from_u32(value).ok_or(StringError::BadUnicode)
        }
        '<' => {
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('>') => break,
                    Some(ch) => name.push(ch),
                    None => return Err(StringError::TruncatedEscape),
                }
            }
            KEY_TABLE
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&name))
                .map(|(_, ch)| *ch)
                .ok_or(StringError::UnknownKey(name))
        }
        other => Err(StringError::BadEscape(other)),
    }
}

/// Consume at most `max` hex digits (at least one) and decode them.
fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    max: usize,
) -> Result<char, StringError> {
    let mut value: u32 = 0;
    let mut digits = 0;
    while digits < max {
        match chars.peek().and_then(|ch| ch.to_digit(16)) {
            Some(d) => {
                value = value * 16 + d;
                chars.next();
                digits += 1;
            }
            None => break,
        }
    }
    if digits == 0 {
        return Err(StringError::TruncatedEscape);
    }
    char::from_u32(value).ok_or(StringError::BadUnicode)
}

/// Encode a value as a double-quoted string literal.
///
/// Inverse of [`eval_quoted`] up to quote style: the result always decodes
/// back to `value`.
pub fn uneval(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{1b}' => out.push_str("\\e"),
            ch if (ch as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}
