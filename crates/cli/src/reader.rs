//! A small, deliberately non-conforming s-expression reader.
//!
//! `screme-core` takes `Value` as its program representation and never
//! parses source text itself (a full reader — string escapes, `#;`
//! datum comments, numeric-tower literal syntax, dotted-pair notation in
//! all its forms — is an external collaborator's job). This reader exists
//! only to let this demo binary and its integration tests turn a line of
//! text into something `Interpreter::eval_top` can run; it covers symbols,
//! booleans, integers, strings, lists, and vectors, and nothing more.

use std::iter::Peekable;
use std::str::Chars;

use screme_core::{Interner, Symbol, Value};

#[derive(Debug)]
pub struct ReadError(pub String);

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "read error: {}", self.0)
    }
}

impl std::error::Error for ReadError {}

/// Reads every top-level form in `src`.
pub fn read_all(src: &str, interner: &mut Interner) -> Result<Vec<Value>, ReadError> {
    let mut chars = src.chars().peekable();
    let mut forms = Vec::new();
    loop {
        skip_atmosphere(&mut chars);
        if chars.peek().is_none() {
            return Ok(forms);
        }
        forms.push(read_form(&mut chars, interner)?);
    }
}

fn skip_atmosphere(chars: &mut Peekable<Chars<'_>>) {
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek() == Some(&';') {
            for c in chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
            continue;
        }
        break;
    }
}

fn read_form(chars: &mut Peekable<Chars<'_>>, interner: &mut Interner) -> Result<Value, ReadError> {
    skip_atmosphere(chars);
    match chars.peek() {
        None => Err(ReadError("unexpected end of input".into())),
        Some('(') => {
            chars.next();
            read_list(chars, interner, ')')
        }
        Some('#') => {
            chars.next();
            match chars.next() {
                Some('(') => read_list(chars, interner, ')').map(|v| match v {
                    Value::List(items) => Value::vector(items.borrow().clone()),
                    other => other,
                }),
                Some('t') => Ok(Value::Bool(true)),
                Some('f') => Ok(Value::Bool(false)),
                other => Err(ReadError(format!("unsupported # syntax: {other:?}"))),
            }
        }
        Some('"') => read_string(chars),
        Some(')') => Err(ReadError("unexpected )".into())),
        Some('\'') => {
            chars.next();
            let quoted = read_form(chars, interner)?;
            let quote_sym = interner.intern("quote");
            Ok(Value::list(vec![Value::Symbol(quote_sym), quoted]))
        }
        _ => read_atom(chars, interner),
    }
}

fn read_list(chars: &mut Peekable<Chars<'_>>, interner: &mut Interner, close: char) -> Result<Value, ReadError> {
    let mut items = Vec::new();
    loop {
        skip_atmosphere(chars);
        match chars.peek() {
            None => return Err(ReadError("unterminated list".into())),
            Some(c) if *c == close => {
                chars.next();
                return Ok(Value::list(items));
            }
            Some('.') => {
                // Peek ahead one more to distinguish a dotted tail from a
                // symbol that merely starts with `.` (e.g. `...`).
                let mut lookahead = chars.clone();
                lookahead.next();
                if lookahead.peek().is_none_or(|c| c.is_whitespace() || *c == close) {
                    chars.next();
                    let tail = read_form(chars, interner)?;
                    skip_atmosphere(chars);
                    if chars.next() != Some(close) {
                        return Err(ReadError("malformed dotted list".into()));
                    }
                    if items.is_empty() {
                        return Err(ReadError("dotted list needs at least one head element".into()));
                    }
                    return Ok(items.into_iter().rev().fold(tail, |tail, head| Value::cons(head, tail)));
                }
                items.push(read_atom(chars, interner)?);
            }
            _ => items.push(read_form(chars, interner)?),
        }
    }
}

fn read_string(chars: &mut Peekable<Chars<'_>>) -> Result<Value, ReadError> {
    chars.next();
    let mut s = String::new();
    loop {
        match chars.next() {
            None => return Err(ReadError("unterminated string".into())),
            Some('"') => return Ok(Value::string(s)),
            Some('\\') => match chars.next() {
                Some('n') => s.push('\n'),
                Some('t') => s.push('\t'),
                Some(c) => s.push(c),
                None => return Err(ReadError("unterminated escape".into())),
            },
            Some(c) => s.push(c),
        }
    }
}

fn read_atom(chars: &mut Peekable<Chars<'_>>, interner: &mut Interner) -> Result<Value, ReadError> {
    let mut text = String::new();
    while chars.peek().is_some_and(|c| !c.is_whitespace() && *c != '(' && *c != ')' && *c != '"') {
        text.push(chars.next().unwrap());
    }
    if text.is_empty() {
        return Err(ReadError("empty atom".into()));
    }
    if let Ok(i) = text.parse::<num_bigint::BigInt>() {
        return Ok(Value::Integer(i));
    }
    if let Ok(f) = text.parse::<f64>()
        && (text.contains('.') || text.contains('e') || text.contains('E'))
    {
        return Ok(Value::Real(f));
    }
    let sym: Symbol = interner.intern(&text);
    Ok(Value::Symbol(sym))
}
