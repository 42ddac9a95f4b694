//! YAML output: convert GOMN values to YAML text.
//!
//! Mapping from GOMN to YAML:
//!   - Value::Null        -> YAML null
//!   - Value::Bool        -> YAML bool
//!   - Value::Integer     -> YAML integer
//!   - Value::Float       -> YAML float (including .nan, .inf, -.inf)
//!   - Value::String      -> YAML string
//!   - Value::Codepoints  -> YAML string
//!   - Value::Identifier  -> YAML string
//!   - Value::Array       -> YAML sequence
//!   - Value::Document    -> YAML mapping, keys converted like values
//!
//! Keys keep their type, so `[1]` becomes the integer key `1`. Keys that
//! differ in GOMN but collapse to the same YAML value (`["a"]` and `[a]`)
//! are an error.

use libgomn::{Document, Value};

/// Encode a GOMN value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value)?;
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> Result<serde_yaml::Value, String> {
    match value {
        Value::Null => Ok(serde_yaml::Value::Null),
        Value::Bool(b) => Ok(serde_yaml::Value::Bool(*b)),
        Value::Integer(n) => Ok(serde_yaml::Value::Number(serde_yaml::Number::from(*n))),
        Value::Float(f) => Ok(serde_yaml::Value::Number(serde_yaml::Number::from(*f))),
        Value::String(s) | Value::Identifier(s) => Ok(serde_yaml::Value::String(s.clone())),
        Value::Codepoints(cs) => Ok(serde_yaml::Value::String(cs.iter().collect())),
        Value::Array(arr) => {
            let items: Result<Vec<serde_yaml::Value>, String> =
                arr.iter().map(value_to_yaml).collect();
            Ok(serde_yaml::Value::Sequence(items?))
        }
        Value::Document(doc) => document_to_yaml(doc),
    }
}

fn document_to_yaml(doc: &Document) -> Result<serde_yaml::Value, String> {
    let mut map = serde_yaml::Mapping::new();
    for (k, v) in doc {
        let key = value_to_yaml(k)?;
        if map.insert(key, value_to_yaml(v)?).is_some() {
            return Err(format!("key {:?} collides with another key in YAML", k));
        }
    }
    Ok(serde_yaml::Value::Mapping(map))
}
