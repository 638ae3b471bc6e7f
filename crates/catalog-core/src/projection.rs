//! Allow-list projection of raw request payloads.

use serde_json::Value;

use crate::store::Document;

/// Restrict `input` to the keys named in `allowed`.
///
/// A key is kept whenever it is present, whatever its value: `0`, `false`,
/// `""` and `null` all survive. Keys outside the allow-list are dropped
/// without complaint, and no key absent from `input` is ever added.
pub fn project(allowed: &[&str], input: &Document) -> Document {
  allowed
    .iter()
    .filter_map(|&field| {
      input
        .get(field)
        .map(|value| (field.to_owned(), value.clone()))
    })
    .collect()
}

/// `null`, `false`, numeric zero and the empty string.
pub fn is_falsy(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::Number(n) => n.as_f64() == Some(0.0),
    Value::String(s) => s.is_empty(),
    Value::Array(_) | Value::Object(_) => false,
  }
}
