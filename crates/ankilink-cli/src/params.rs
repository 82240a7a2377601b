//! Parameter parsing for the command line: `KEY=VALUE` pairs and the `-`
//! stdin placeholder.

use std::io::{self, Read};

use ankilink::Params;
use serde_json::Value;

/// Parse `KEY=VALUE` arguments into a parameter map.
///
/// Values are parsed as JSON so that `cards=[1,2]` and `count=3` arrive
/// typed; anything that is not valid JSON is kept as a plain string, which
/// covers the common `deck=Japanese::JLPT N3` case without quoting.
pub fn parse_pairs(pairs: &[String]) -> Result<Params, String> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got '{pair}'"))?;
        if key.is_empty() {
            return Err(format!("empty key in '{pair}'"));
        }
        params.insert(key.to_owned(), parse_value(raw));
    }
    Ok(params)
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Replace any literal `-` parameter value with the last line of stdin.
///
/// The line is JSON-decoded when possible, falling back to the raw trimmed
/// string. A decoded array of purely-numeric strings is coerced to integers,
/// so `findNotes ... | ankilink notesInfo notes=-` composes without jq.
pub fn substitute_stdin(params: &mut Params) -> io::Result<()> {
    if !params.values().any(is_placeholder) {
        return Ok(());
    }

    let mut buffered = String::new();
    io::stdin().read_to_string(&mut buffered)?;
    let line = last_line(&buffered).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "a '-' parameter was given but stdin was empty",
        )
    })?;
    let substituted = decode_line(line);

    for value in params.values_mut() {
        if is_placeholder(value) {
            *value = substituted.clone();
        }
    }
    Ok(())
}

fn is_placeholder(value: &Value) -> bool {
    value.as_str() == Some("-")
}

fn last_line(input: &str) -> Option<&str> {
    input.lines().rev().find(|line| !line.trim().is_empty())
}

/// Decode one line of piped input into a parameter value.
pub fn decode_line(line: &str) -> Value {
    let trimmed = line.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => Value::Array(coerce_numeric_strings(items)),
        Ok(value) => value,
        Err(_) => Value::String(trimmed.to_owned()),
    }
}

/// If every element is a purely-numeric string, coerce them all to integers;
/// otherwise leave the array untouched.
fn coerce_numeric_strings(items: Vec<Value>) -> Vec<Value> {
    let numbers: Option<Vec<i64>> = items
        .iter()
        .map(|item| {
            let s = item.as_str()?;
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok()
        })
        .collect();
    match numbers {
        Some(numbers) => numbers.into_iter().map(Value::from).collect(),
        None => items,
    }
}
