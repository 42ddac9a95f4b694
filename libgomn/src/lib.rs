//! GOMN parser implementation.
//!
//! GOMN is a small configuration notation. A document is a sequence of
//! entries, each a bracketed key assigned a value:
//!
//! ```text
//! [name] := "server"          // strings, identifiers, numbers
//! [ports] := { 80, 443 }      // arrays
//! [tls] := | [enabled] := true |   /* nested documents */
//! ```
//!
//! Keys are values too, so `[1]`, `["a"]` and `[a]` are three different
//! keys. Parsing produces a [`Document`], a map from [`Value`] to [`Value`].
//!
//! # Parsing Pipeline
//!
//! There is a single phase: a recursive-descent parser that scans the
//! source once and reports the first failure with a [`Diagnostic`]
//! pointing at the offending byte.

pub mod binary;
mod error;
mod parser;
mod value;

use std::path::Path;

pub use error::{BinaryError, Diagnostic, Error, ParseError, Result};
pub use value::{Document, Value};

/// Deepest nesting of arrays, nested documents and bracketed keys that
/// [`parse`] accepts. Anything the parser returns can be decoded again by
/// [`binary::from_bytes`].
pub const MAX_DEPTH: usize = 320;

/// Parse a GOMN document from a string.
///
/// # Example
///
/// ```
/// use libgomn::{parse, Value};
///
/// let doc = parse("[answer] := 42").unwrap();
/// assert_eq!(doc[&Value::Identifier("answer".into())], Value::Integer(42));
/// ```
pub fn parse(input: &str) -> Result<Document> {
    parser::Scanner::new(input).parse_document()
}

/// Parse a GOMN document, returning an empty document on any error.
pub fn parse_ignoring_error(input: &str) -> Document {
    parse(input).unwrap_or_default()
}

/// Read a file and parse it as a GOMN document.
///
/// I/O failures are returned as [`Error::Io`] unchanged.
pub fn parse_file(path: impl AsRef<Path>) -> std::result::Result<Document, Error> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "parsing file");
    let doc = parse(&text).map_err(|e| {
        tracing::debug!(path = %path.display(), offset = e.offset(), "parse failed");
        e
    })?;
    Ok(doc)
}

/// Parse a single key literal that must span the whole input.
///
/// Accepts exactly what may appear between the brackets of an entry, for
/// example `name`, `"name"`, `42` or `{1, 2}`.
pub fn parse_key(input: &str) -> Result<Value> {
    let mut scanner = parser::Scanner::new(input);
    let key = scanner.parse_key()?;
    scanner.finish()?;
    Ok(key)
}

/// Look up `key` in `doc`.
///
/// A key bound to `null` is found and yields `Some(&Value::Null)`; only an
/// absent key yields `None`. Callers that treated a null binding as missing
/// should match on `Some(Value::Null)` themselves.
pub fn get<'a>(key: &Value, doc: &'a Document) -> Option<&'a Value> {
    doc.get(key)
}

/// Parse `input` and look up `key` in the result.
pub fn get_from_str(key: &Value, input: &str) -> Result<Option<Value>> {
    let doc = parse(input)?;
    Ok(doc.get(key).cloned())
}

/// Follow `keys` through nested documents.
///
/// An empty path yields `None`; there is no value standing for the root.
pub fn get_path<'a>(doc: &'a Document, keys: &[Value]) -> Option<&'a Value> {
    let (last, parents) = keys.split_last()?;
    let mut current = doc;
    for key in parents {
        current = current.get(key)?.as_document()?;
    }
    current.get(last)
}
