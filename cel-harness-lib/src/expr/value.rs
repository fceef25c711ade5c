use cel_interpreter::Value;
use cel_interpreter::objects::Key;

/// The CEL type name of a runtime value.
#[must_use]
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::UInt(_) => "uint",
        Value::Float(_) => "double",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::List(_) => "list",
        Value::Map(_) => "map",
        Value::Null => "null_type",
        Value::Duration(_) => "google.protobuf.Duration",
        Value::Timestamp(_) => "google.protobuf.Timestamp",
        Value::Function(..) => "function",
        #[expect(unreachable_patterns, reason = "newer interpreter releases add value kinds")]
        _ => "unknown",
    }
}

/// Render a value for display.
///
/// Map entries are sorted by key so the output is stable across runs.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => format!("{u}u"),
        Value::Float(f) => format!("{f:?}"),
        Value::String(s) => s.to_string(),
        Value::Bytes(bytes) => format!("b\"{}\"", String::from_utf8_lossy(bytes)),
        Value::List(items) => {
            let rendered: Vec<_> = items.iter().map(format_nested).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Map(map) => {
            let mut entries: Vec<_> = map
                .map
                .iter()
                .map(|(key, value)| (format_key(key), format_nested(value)))
                .collect();
            entries.sort();
            let rendered: Vec<_> = entries.into_iter().map(|(key, value)| format!("{key}: {value}")).collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Value::Null => "null".to_string(),
        Value::Duration(d) => d.to_string(),
        Value::Timestamp(ts) => ts.to_rfc3339(),
        Value::Function(name, _) => format!("<function {name}>"),
        #[expect(unreachable_patterns, reason = "newer interpreter releases add value kinds")]
        _ => format!("{value:?}"),
    }
}

/// Strings nested in containers are quoted so that `["a, b"]` and `["a", "b"]` stay distinguishable.
fn format_nested(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s.as_str()),
        other => format_value(other),
    }
}

pub(crate) fn format_key(key: &Key) -> String {
    match key {
        Key::String(s) => s.to_string(),
        Key::Int(i) => i.to_string(),
        Key::Uint(u) => format!("{u}u"),
        Key::Bool(b) => b.to_string(),
    }
}
