/// Returns the string at `key`, if the field exists and is a string.
pub fn get_str<'a>(val: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    val.get(key).and_then(|v| v.as_str())
}

/// True when `key` exists and is not `null`.
pub fn has_value(val: &serde_json::Value, key: &str) -> bool {
    val.get(key).is_some_and(|v| !v.is_null())
}

/// Short human-readable name of a JSON value's type.
pub fn json_type_name(val: &serde_json::Value) -> &'static str {
    match val {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
