//! The CEL string extension library.
//!
//! Every offset and length is counted in characters, never bytes. Functions that take optional
//! arguments validate their arity themselves, so a wrong call is an evaluation error rather than a
//! silently ignored argument.

use super::type_name;
use cel_interpreter::extractors::{Arguments, This};
use cel_interpreter::{Context, ExecutionError, FunctionContext, Value};
use std::collections::HashMap;
use std::sync::Arc;

type Result<T> = core::result::Result<T, ExecutionError>;

/// Root variable that namespaces `strings.quote`.
pub const STRINGS_NAMESPACE: &str = "strings";

/// Register every string extension on a root context.
pub fn register(root: &mut Context<'static>) {
    root.add_function("charAt", char_at);
    root.add_function("indexOf", index_of);
    root.add_function("lastIndexOf", last_index_of);
    root.add_function("lowerAscii", lower_ascii);
    root.add_function("upperAscii", upper_ascii);
    root.add_function("replace", replace);
    root.add_function("split", split);
    root.add_function("substring", substring);
    root.add_function("trim", trim);
    root.add_function("join", join);
    root.add_function("reverse", reverse);
    root.add_function("quote", quote);

    // `strings.quote(s)` is a receiver call on this variable
    root.add_variable_from_value(STRINGS_NAMESPACE, HashMap::<String, Value>::new());
}

fn char_at(ftx: &FunctionContext, This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let args = call_args(ftx, &args, 1, 1)?;
    let chars: Vec<char> = this.chars().collect();
    let index = char_position(ftx, int_arg(ftx, args, 0)?, chars.len())?;

    Ok(chars.get(index).map_or_else(String::new, char::to_string).into())
}

/// Character offset of the first occurrence of a substring at or after an optional offset, or -1.
fn index_of(ftx: &FunctionContext, This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let args = call_args(ftx, &args, 1, 2)?;
    let needle: Vec<char> = string_arg(ftx, args, 0)?.chars().collect();
    let haystack: Vec<char> = this.chars().collect();

    let Some(offset) = optional_int_arg(ftx, args, 1)? else {
        let found = find_forward(&haystack, &needle, 0);
        return Ok(Value::Int(found.map_or(-1, to_int)));
    };

    if needle.is_empty() {
        return Ok(Value::Int(offset));
    }

    let start = char_position(ftx, offset, haystack.len())?;
    if start == haystack.len() {
        return Err(out_of_range(ftx, offset));
    }

    Ok(Value::Int(find_forward(&haystack, &needle, start).map_or(-1, to_int)))
}

/// Character offset of the last occurrence of a substring at or before an optional offset, or -1.
fn last_index_of(ftx: &FunctionContext, This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let args = call_args(ftx, &args, 1, 2)?;
    let needle: Vec<char> = string_arg(ftx, args, 0)?.chars().collect();
    let haystack: Vec<char> = this.chars().collect();

    let Some(offset) = optional_int_arg(ftx, args, 1)? else {
        if needle.is_empty() {
            return Ok(Value::Int(to_int(haystack.len())));
        }

        let last = haystack.len().saturating_sub(1);
        return Ok(Value::Int(find_backward(&haystack, &needle, last).map_or(-1, to_int)));
    };

    if needle.is_empty() {
        return Ok(Value::Int(offset));
    }

    let start = char_position(ftx, offset, haystack.len())?;
    if start == haystack.len() {
        return Err(out_of_range(ftx, offset));
    }

    Ok(Value::Int(find_backward(&haystack, &needle, start).map_or(-1, to_int)))
}

fn lower_ascii(This(this): This<Arc<String>>) -> String {
    this.to_ascii_lowercase()
}

fn upper_ascii(This(this): This<Arc<String>>) -> String {
    this.to_ascii_uppercase()
}

/// Replaces every occurrence, or only the first `n` when a non-negative count is given.
fn replace(ftx: &FunctionContext, This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let args = call_args(ftx, &args, 2, 3)?;
    let from = string_arg(ftx, args, 0)?;
    let to = string_arg(ftx, args, 1)?;

    let replaced = match optional_int_arg(ftx, args, 2)?.map(usize::try_from) {
        Some(Ok(count)) => this.replacen(from.as_str(), to.as_str(), count),
        _ => this.replace(from.as_str(), to.as_str()),
    };

    Ok(replaced.into())
}

/// Splits around a separator. A count of zero yields no parts, a positive count caps the number of
/// parts, and an empty separator splits into characters.
fn split(ftx: &FunctionContext, This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let args = call_args(ftx, &args, 1, 2)?;
    let separator = string_arg(ftx, args, 0)?;
    let limit = optional_int_arg(ftx, args, 1)?.and_then(|count| usize::try_from(count).ok());

    let parts: Vec<String> = match limit {
        Some(0) => Vec::new(),
        _ if separator.is_empty() => explode(&this, limit),
        Some(count) => this.splitn(count, separator.as_str()).map(str::to_string).collect(),
        None => this.split(separator.as_str()).map(str::to_string).collect(),
    };

    Ok(parts.into())
}

fn substring(ftx: &FunctionContext, This(this): This<Arc<String>>, Arguments(args): Arguments) -> Result<Value> {
    let args = call_args(ftx, &args, 1, 2)?;
    let chars: Vec<char> = this.chars().collect();

    let start = char_position(ftx, int_arg(ftx, args, 0)?, chars.len())?;
    let end = match optional_int_arg(ftx, args, 1)? {
        Some(end) => char_position(ftx, end, chars.len())?,
        None => chars.len(),
    };

    let Some(range) = chars.get(start..end) else {
        return Err(ftx.error(format!("invalid substring range. start: {start}, end: {end}")));
    };

    Ok(range.iter().collect::<String>().into())
}

fn trim(This(this): This<Arc<String>>) -> String {
    this.trim().to_string()
}

/// Concatenates a list of strings, with an optional separator.
fn join(ftx: &FunctionContext, This(this): This<Arc<Vec<Value>>>, Arguments(args): Arguments) -> Result<Value> {
    let args = call_args(ftx, &args, 0, 1)?;
    let separator = match args.first() {
        Some(_) => string_arg(ftx, args, 0)?,
        None => Arc::default(),
    };

    let parts = this
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.as_str()),
            other => Err(ftx.error(format!("list element is a {}, not a string", type_name(other)))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(parts.join(separator.as_str()).into())
}

fn reverse(This(this): This<Arc<String>>) -> String {
    this.chars().rev().collect()
}

/// Wraps a string in double quotes, escaping quotes, backslashes and the C control escapes.
fn quote(ftx: &FunctionContext, Arguments(args): Arguments) -> Result<Value> {
    let [Value::String(text)] = args.as_slice() else {
        return Err(ftx.error("expected a single string argument"));
    };

    let mut quoted = String::with_capacity(text.len().saturating_add(2));
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\u{07}' => quoted.push_str("\\a"),
            '\u{08}' => quoted.push_str("\\b"),
            '\u{0C}' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{0B}' => quoted.push_str("\\v"),
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');

    Ok(quoted.into())
}

/// The explicit arguments of a receiver-style call, checked against the accepted arity.
///
/// Called as a global function, the receiver arrives as the first argument and is skipped here.
fn call_args<'a>(ftx: &FunctionContext, args: &'a [Value], min: usize, max: usize) -> Result<&'a [Value]> {
    let args = if ftx.this.is_some() {
        args
    } else {
        args.get(1..).unwrap_or_default()
    };

    if (min..=max).contains(&args.len()) {
        Ok(args)
    } else {
        Err(ftx.error(format!("unexpected number of arguments: {}", args.len())))
    }
}

fn string_arg(ftx: &FunctionContext, args: &[Value], index: usize) -> Result<Arc<String>> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(Arc::clone(s)),
        Some(other) => Err(ftx.error(format!("expected a string argument, got a {}", type_name(other)))),
        None => Err(ftx.error("missing string argument")),
    }
}

fn int_arg(ftx: &FunctionContext, args: &[Value], index: usize) -> Result<i64> {
    optional_int_arg(ftx, args, index)?.ok_or_else(|| ftx.error("missing int argument"))
}

fn optional_int_arg(ftx: &FunctionContext, args: &[Value], index: usize) -> Result<Option<i64>> {
    match args.get(index) {
        Some(Value::Int(value)) => Ok(Some(*value)),
        Some(other) => Err(ftx.error(format!("expected an int argument, got a {}", type_name(other)))),
        None => Ok(None),
    }
}

/// A character position in `0..=len`.
fn char_position(ftx: &FunctionContext, index: i64, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|position| *position <= len)
        .ok_or_else(|| out_of_range(ftx, index))
}

fn out_of_range(ftx: &FunctionContext, index: i64) -> ExecutionError {
    ftx.error(format!("index out of range: {index}"))
}

fn find_forward(haystack: &[char], needle: &[char], start: usize) -> Option<usize> {
    let last = haystack.len().checked_sub(needle.len())?;
    (start..=last).find(|&i| haystack.get(i..i.saturating_add(needle.len())) == Some(needle))
}

fn find_backward(haystack: &[char], needle: &[char], start: usize) -> Option<usize> {
    let last = haystack.len().checked_sub(needle.len())?;
    (0..=start.min(last))
        .rev()
        .find(|&i| haystack.get(i..i.saturating_add(needle.len())) == Some(needle))
}

/// Splits into single characters; with a limit, the final part holds the remainder.
fn explode(text: &str, limit: Option<usize>) -> Vec<String> {
    let count = text.chars().count();
    let limit = limit.map_or(count, |limit| limit.min(count));
    let Some(singles) = limit.checked_sub(1) else {
        return Vec::new();
    };

    let mut parts: Vec<String> = text.chars().take(singles).map(String::from).collect();
    parts.push(text.chars().skip(singles).collect());
    parts
}

fn to_int(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}
