//! TOML output: convert GOMN documents to TOML text.
//!
//! Mapping from GOMN to TOML:
//!   - Value::Null          -> error (TOML has no null)
//!   - Value::Bool          -> TOML boolean
//!   - Value::Integer       -> TOML integer
//!   - Value::Float         -> TOML float
//!   - Value::String        -> TOML string
//!   - Value::Codepoints    -> TOML string
//!   - Value::Identifier    -> TOML string
//!   - Value::Array         -> TOML array (documents inside become inline tables)
//!   - Value::Document      -> TOML table
//!
//! Lossy edges:
//!   - TOML keys are strings; String and Identifier keys are written as
//!     their text, any other key type is an error.
//!   - `["a"]` and `[a]` in the same document collide and are an error.
//!   - TOML requires the top level to be a table.

use libgomn::{Document, Value};
use toml_edit::DocumentMut;

/// Encode a GOMN document as a TOML string.
pub fn encode(doc: &Document) -> Result<String, String> {
    let table = document_to_table(doc)?;
    let mut out = DocumentMut::new();
    for (key, item) in table.iter() {
        out[key] = item.clone();
    }
    Ok(out.to_string())
}

fn key_text(key: &Value) -> Result<&str, String> {
    match key {
        Value::String(s) | Value::Identifier(s) => Ok(s),
        other => Err(format!("TOML keys must be text; found {} key {:?}", other.type_name(), other)),
    }
}

fn collision(key: &str) -> String {
    format!("key {:?} appears as both a string and an identifier", key)
}

fn document_to_table(doc: &Document) -> Result<toml_edit::Table, String> {
    let mut table = toml_edit::Table::new();
    for (k, v) in doc {
        let key = key_text(k)?;
        let item = match v {
            Value::Document(inner) => toml_edit::Item::Table(document_to_table(inner)?),
            other => toml_edit::Item::Value(value_to_toml(other)?),
        };
        if table.insert(key, item).is_some() {
            return Err(collision(key));
        }
    }
    Ok(table)
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Null => Err("TOML has no null type".to_string()),
        Value::Bool(b) => Ok(toml_edit::Value::Boolean(toml_edit::Formatted::new(*b))),
        Value::Integer(n) => Ok(toml_edit::Value::Integer(toml_edit::Formatted::new(*n))),
        Value::Float(f) => Ok(toml_edit::Value::Float(toml_edit::Formatted::new(*f))),
        Value::String(s) | Value::Identifier(s) => {
            Ok(toml_edit::Value::String(toml_edit::Formatted::new(s.clone())))
        }
        Value::Codepoints(cs) => Ok(toml_edit::Value::String(toml_edit::Formatted::new(
            cs.iter().collect(),
        ))),
        Value::Array(arr) => {
            let mut toml_arr = toml_edit::Array::new();
            for v in arr {
                toml_arr.push(value_to_toml(v)?);
            }
            Ok(toml_edit::Value::Array(toml_arr))
        }
        Value::Document(doc) => {
            let mut inline = toml_edit::InlineTable::new();
            for (k, v) in doc {
                let key = key_text(k)?;
                if inline.insert(key, value_to_toml(v)?).is_some() {
                    return Err(collision(key));
                }
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libgomn::parse;

    fn toml(src: &str) -> Result<String, String> {
        encode(&parse(src).unwrap())
    }

    #[test]
    fn test_scalars() {
        let out = toml(r#"[name] := "web" [port] := 8080 [ratio] := 0.5"#).unwrap();
        assert!(out.contains("name = \"web\""), "{}", out);
        assert!(out.contains("port = 8080"), "{}", out);
        assert!(out.contains("ratio = 0.5"), "{}", out);
    }

    #[test]
    fn test_nested_document_is_table() {
        let out = toml("[server] := | [host] := localhost |").unwrap();
        assert!(out.contains("[server]"), "{}", out);
        assert!(out.contains("host = \"localhost\""), "{}", out);
    }

    #[test]
    fn test_null_is_rejected() {
        let err = toml("[a] := nil").unwrap_err();
        assert!(err.contains("null"), "{}", err);
    }

    #[test]
    fn test_integer_key_is_rejected() {
        let err = toml("[1] := one").unwrap_err();
        assert!(err.contains("keys must be text"), "{}", err);
    }

    #[test]
    fn test_colliding_keys() {
        let err = toml(r#"["a"] := 1 [a] := 2"#).unwrap_err();
        assert!(err.contains("both"), "{}", err);
    }
}
