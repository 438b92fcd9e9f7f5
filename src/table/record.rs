use serde_json::Value;

/// One row of data flowing through the table engine.
///
/// Fields are looked up by key so descriptors and filter state can stay
/// string-keyed while the record itself is a typed struct.
pub trait Record {
    fn id(&self) -> &str;

    /// Returns `None` when the field is absent or null.
    fn field(&self, key: &str) -> Option<Value>;

    /// Field value coerced to a display string, if present.
    fn field_text(&self, key: &str) -> Option<String> {
        self.field(key).and_then(|v| coerce_to_string(&v))
    }
}

/// String coercion used by search, filters and default cell rendering.
///
/// Arrays join with `", "`, objects join their values with a space and null is
/// treated as missing.
pub fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(coerce_to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(map) => Some(
            map.values()
                .filter_map(coerce_to_string)
                .collect::<Vec<_>>()
                .join(" "),
        ),
    }
}
