//! String form of paths: `/a/b[k=v]/c`.
//!
//! Key values may contain `/`, `[` and `=`; a `]` or `\` inside a key value
//! is escaped with a backslash.

use super::path::{Path, PathElem};
use super::PathError;
use std::iter::Peekable;
use std::str::Chars;

/// Parses a path string. The leading `/` is optional; `/` and the empty
/// string both denote the root.
pub fn parse_path(s: &str) -> Result<Path, PathError> {
    let mut chars = s.chars().peekable();
    if chars.peek() == Some(&'/') {
        chars.next();
    }

    let mut path = Path::new();
    while chars.peek().is_some() {
        let elem = parse_elem(s, &mut chars)?;
        path.push(elem);
        match chars.next() {
            None => break,
            Some('/') if chars.peek().is_some() => {}
            Some(c) => return Err(parse_error(s, format!("unexpected '{}' after element", c))),
        }
    }
    Ok(path)
}

fn parse_elem(input: &str, chars: &mut Peekable<Chars<'_>>) -> Result<PathElem, PathError> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '/' || c == '[' {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        return Err(parse_error(input, "empty path element"));
    }

    let mut elem = PathElem::new(name);
    while chars.peek() == Some(&'[') {
        chars.next();
        let (key, value) = parse_key(input, chars)?;
        if elem.key.insert(key.clone(), value).is_some() {
            return Err(parse_error(input, format!("duplicate key {}", key)));
        }
    }
    Ok(elem)
}

fn parse_key(input: &str, chars: &mut Peekable<Chars<'_>>) -> Result<(String, String), PathError> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('=') => break,
            Some(']') | None => return Err(parse_error(input, "key without value")),
            Some(c) => name.push(c),
        }
    }
    if name.is_empty() {
        return Err(parse_error(input, "empty key name"));
    }

    let mut value = String::new();
    loop {
        match chars.next() {
            Some(']') => return Ok((name, value)),
            Some('\\') => match chars.next() {
                Some(c) => value.push(c),
                None => return Err(parse_error(input, "dangling escape")),
            },
            Some(c) => value.push(c),
            None => return Err(parse_error(input, "unterminated key")),
        }
    }
}

fn parse_error(input: &str, message: impl Into<String>) -> PathError {
    PathError::Parse {
        input: input.to_string(),
        message: message.into(),
    }
}
