//! Binary persistence: GOMN documents as CBOR.
//!
//! Mapping from GOMN to CBOR:
//!   - Value::Null       -> CBOR null (simple value 22)
//!   - Value::Bool       -> CBOR bool (simple values 20/21)
//!   - Value::Integer    -> CBOR integer (smallest encoding that fits)
//!   - Value::Float      -> CBOR float64 (always 9 bytes, never downgraded)
//!   - Value::String     -> CBOR text string
//!   - Value::Codepoints -> tag 0x676d0001 around a text string
//!   - Value::Identifier -> tag 39 (identifier) around a text string
//!   - Value::Array      -> CBOR array (determinate length)
//!   - Value::Document   -> CBOR map (determinate length, keys in order)
//!
//! Map keys are encoded with the same rules as values, so documents keyed
//! by numbers, codepoints or arrays survive a round trip. A persisted
//! document is always a single top-level map.
//!
//! Decoding accepts the above plus untagged CBOR of the same shapes. Byte
//! strings, other tags, and integers outside the i64 range are rejected.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use ciborium::value::Value as CborValue;

use crate::error::{BinaryError, Error};
use crate::value::{Document, Value};
use crate::MAX_DEPTH;

/// CBOR tag for identifiers (IANA registry: "a CBOR identifier").
pub const TAG_IDENTIFIER: u64 = 39;

/// CBOR tag marking a text string as a single-quoted codepoint sequence.
pub const TAG_CODEPOINTS: u64 = 0x676d_0001;

// ---------------------------------------------------------------------------
// Encode (GOMN -> CBOR)
//
// Written by hand rather than through ciborium's Value, which narrows
// float64 to float16/float32 whenever the value fits.
// ---------------------------------------------------------------------------

/// Encode a document as CBOR bytes.
pub fn to_bytes(doc: &Document) -> Vec<u8> {
    let mut buf = Vec::new();
    write_document(&mut buf, doc);
    buf
}

/// Encode a document and write it to `path`, replacing any existing file.
pub fn write_bin(doc: &Document, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    let bytes = to_bytes(doc);
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "writing binary document");
    fs::write(path, bytes)?;
    Ok(())
}

fn write_document(buf: &mut Vec<u8>, doc: &Document) {
    write_type_and_length(buf, 5, doc.len() as u64); // major 5 = map
    for (key, value) in doc {
        write_value(buf, key);
        write_value(buf, value);
    }
}

fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Integer(n) => write_integer(buf, *n),
        Value::Float(f) => {
            // major 7, info 27
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => write_text(buf, s),
        Value::Codepoints(cs) => {
            write_type_and_length(buf, 6, TAG_CODEPOINTS);
            write_text(buf, &cs.iter().collect::<String>());
        }
        Value::Identifier(s) => {
            write_type_and_length(buf, 6, TAG_IDENTIFIER);
            write_text(buf, s);
        }
        Value::Array(arr) => {
            write_type_and_length(buf, 4, arr.len() as u64); // major 4 = array
            for item in arr {
                write_value(buf, item);
            }
        }
        Value::Document(doc) => write_document(buf, doc),
    }
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    write_type_and_length(buf, 3, s.len() as u64); // major 3 = text string
    buf.extend_from_slice(s.as_bytes());
}

/// Write a CBOR major type + length/value argument.
///
/// CBOR encodes the major type in the high 3 bits and uses the low 5 bits
/// plus optional following bytes for the argument:
///   0-23:    argument in the low 5 bits (1 byte total)
///   24:      1-byte argument follows
///   25:      2-byte argument follows
///   26:      4-byte argument follows
///   27:      8-byte argument follows
fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => buf.push(high | val as u8),
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

/// Major 0 encodes n; major 1 encodes -1 - n.
fn write_integer(buf: &mut Vec<u8>, n: i64) {
    if n < 0 {
        write_type_and_length(buf, 1, (-1 - n) as u64);
    } else {
        write_type_and_length(buf, 0, n as u64);
    }
}

// ---------------------------------------------------------------------------
// Decode (CBOR -> GOMN)
// ---------------------------------------------------------------------------

/// Decode CBOR bytes into a document.
pub fn from_bytes(input: &[u8]) -> Result<Document, BinaryError> {
    match read_cbor(input)? {
        CborValue::Map(pairs) => cbor_map_to_document(&pairs),
        other => Err(BinaryError::NotADocument(cbor_kind(&other))),
    }
}

/// Read and decode a document previously written with [`write_bin`].
pub fn read_bin(path: impl AsRef<Path>) -> Result<Document, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "reading binary document");
    Ok(from_bytes(&bytes)?)
}

/// Nesting the decoder accepts: everything the parser allows, plus the
/// top-level map and a tag around the innermost text.
const RECURSION_LIMIT: usize = MAX_DEPTH + 2;

fn read_cbor(input: &[u8]) -> Result<CborValue, BinaryError> {
    ciborium::de::from_reader_with_recursion_limit(input, RECURSION_LIMIT)
        .map_err(|e| BinaryError::Decode(e.to_string()))
}

fn cbor_map_to_document(pairs: &[(CborValue, CborValue)]) -> Result<Document, BinaryError> {
    let mut doc = Document::new();
    for (k, v) in pairs {
        doc.insert(cbor_to_value(k)?, cbor_to_value(v)?);
    }
    Ok(doc)
}

fn cbor_to_value(cbor: &CborValue) -> Result<Value, BinaryError> {
    match cbor {
        CborValue::Null => Ok(Value::Null),
        CborValue::Bool(b) => Ok(Value::Bool(*b)),
        CborValue::Integer(i) => {
            let n: i128 = (*i).into();
            i64::try_from(n)
                .map(Value::Integer)
                .map_err(|_| BinaryError::IntegerRange(n))
        }
        CborValue::Float(f) => Ok(Value::Float(*f)),
        CborValue::Text(s) => Ok(Value::String(s.clone())),
        CborValue::Array(arr) => {
            let items: Result<Vec<Value>, BinaryError> = arr.iter().map(cbor_to_value).collect();
            Ok(Value::Array(items?))
        }
        CborValue::Map(pairs) => Ok(Value::Document(cbor_map_to_document(pairs)?)),
        CborValue::Tag(TAG_IDENTIFIER, inner) => match inner.as_ref() {
            CborValue::Text(s) => Ok(Value::Identifier(s.clone())),
            other => Err(BinaryError::Unsupported(format!(
                "identifier tag around {}",
                cbor_kind(other)
            ))),
        },
        CborValue::Tag(TAG_CODEPOINTS, inner) => match inner.as_ref() {
            CborValue::Text(s) => Ok(Value::Codepoints(s.chars().collect())),
            other => Err(BinaryError::Unsupported(format!(
                "codepoints tag around {}",
                cbor_kind(other)
            ))),
        },
        other => Err(BinaryError::Unsupported(cbor_kind(other))),
    }
}

fn cbor_kind(cbor: &CborValue) -> String {
    match cbor {
        CborValue::Integer(_) => "integer".to_string(),
        CborValue::Bytes(_) => "byte string".to_string(),
        CborValue::Float(_) => "float".to_string(),
        CborValue::Text(_) => "text string".to_string(),
        CborValue::Bool(_) => "bool".to_string(),
        CborValue::Null => "null".to_string(),
        CborValue::Tag(tag, _) => format!("tag {}", tag),
        CborValue::Array(_) => "array".to_string(),
        CborValue::Map(_) => "map".to_string(),
        other => format!("{:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Diagnostic notation (CBOR -> text, RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation (RFC 8949 §8).
///
/// Works on the wire encoding rather than on decoded values, so tags stay
/// visible. The two GOMN tags are followed by a comment naming the variant:
///
/// ```text
/// {
///   39("name") / identifier /: 1735196673("ab") / codepoints /
/// }
/// ```
pub fn diagnostic(input: &[u8]) -> Result<String, BinaryError> {
    let cbor = read_cbor(input)?;
    let mut diag = Diag::default();
    diag.item(&cbor);
    diag.out.push('\n');
    Ok(diag.out)
}

/// Name of the GOMN variant a tag stands for.
fn tag_name(tag: u64) -> Option<&'static str> {
    match tag {
        TAG_IDENTIFIER => Some("identifier"),
        TAG_CODEPOINTS => Some("codepoints"),
        _ => None,
    }
}

/// Scalars, and tags around scalars, print inline.
fn is_inline(cbor: &CborValue) -> bool {
    match cbor {
        CborValue::Array(_) | CborValue::Map(_) => false,
        CborValue::Tag(_, inner) => is_inline(inner),
        _ => true,
    }
}

#[derive(Default)]
struct Diag {
    out: String,
    depth: usize,
}

impl Diag {
    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn item(&mut self, cbor: &CborValue) {
        match cbor {
            CborValue::Null => self.out.push_str("null"),
            CborValue::Bool(b) => write!(self.out, "{}", b).unwrap(),
            CborValue::Integer(i) => write!(self.out, "{}", i128::from(*i)).unwrap(),
            CborValue::Float(f) if f.is_nan() => self.out.push_str("NaN"),
            CborValue::Float(f) if f.is_infinite() => {
                self.out.push_str(if *f > 0.0 { "Infinity" } else { "-Infinity" })
            }
            CborValue::Float(f) => write!(self.out, "{:?}", f).unwrap(),
            CborValue::Text(s) => self.text(s),
            CborValue::Bytes(bytes) => {
                self.out.push_str("h'");
                for b in bytes {
                    write!(self.out, "{:02x}", b).unwrap();
                }
                self.out.push('\'');
            }
            CborValue::Tag(tag, inner) => {
                write!(self.out, "{}(", tag).unwrap();
                self.item(inner);
                self.out.push(')');
                if let Some(name) = tag_name(*tag) {
                    write!(self.out, " / {} /", name).unwrap();
                }
            }
            CborValue::Array(items) if items.iter().all(is_inline) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.item(item);
                }
                self.out.push(']');
            }
            CborValue::Array(items) => self.block('[', ']', items.len(), |d, i| d.item(&items[i])),
            CborValue::Map(pairs) if pairs.is_empty() => self.out.push_str("{}"),
            CborValue::Map(pairs) => self.block('{', '}', pairs.len(), |d, i| {
                let (k, v) = &pairs[i];
                d.item(k);
                d.out.push_str(": ");
                d.item(v);
            }),
            other => write!(self.out, "<?{:?}>", other).unwrap(),
        }
    }

    /// One entry per line, indented one level past the brackets.
    fn block(&mut self, open: char, close: char, len: usize, mut entry: impl FnMut(&mut Self, usize)) {
        self.out.push(open);
        self.depth += 1;
        for i in 0..len {
            self.newline();
            entry(self, i);
            if i + 1 < len {
                self.out.push(',');
            }
        }
        self.depth -= 1;
        self.newline();
        self.out.push(close);
    }

    fn text(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' | '\\' => {
                    self.out.push('\\');
                    self.out.push(c);
                }
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if c.is_control() => write!(self.out, "\\u{:04x}", c as u32).unwrap(),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}
