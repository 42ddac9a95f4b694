//! Recursive-descent parser for GOMN source text.
//!
//! A single [`Scanner`] walks the source once, left to right, with one
//! character of lookahead. Each grammar rule is a method:
//!
//! - Entries: `[key] := value`, at top level and inside `|...|`
//! - Keys: quoted literals, arrays, bracket-wrapped keys, bare words
//! - Values: everything a key can be, plus nested documents
//!
//! Whitespace and `//` / `/* */` comments are skipped between tokens only.

use crate::error::{Diagnostic, ParseError, Result};
use crate::value::{Document, Value};
use crate::MAX_DEPTH;

/// Cursor over a source string.
pub(crate) struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    /// Arrays, nested documents and bracketed keys currently open.
    depth: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    // ========================================================================
    // Cursor primitives
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` if it is the next character.
    fn consume(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Skip whitespace, line comments, and block comments.
    /// An unclosed block comment runs to the end of input.
    fn skip_insignificant(&mut self) {
        loop {
            let rest = &self.src[self.pos..];
            match rest.chars().next() {
                Some(c) if c.is_whitespace() => self.pos += c.len_utf8(),
                Some('/') if rest.starts_with("//") => {
                    self.pos += rest.find('\n').unwrap_or(rest.len());
                }
                Some('/') if rest.starts_with("/*") => {
                    self.pos += rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
                }
                _ => break,
            }
        }
    }

    // ========================================================================
    // Error construction
    // ========================================================================

    fn diag_at(&self, offset: usize) -> Diagnostic {
        Diagnostic::new(self.src, offset)
    }

    fn syntax(&self, expected: &'static str) -> ParseError {
        ParseError::Syntax {
            expected,
            diag: self.diag_at(self.pos),
        }
    }

    fn end_of_input(&self, context: &'static str) -> ParseError {
        ParseError::UnexpectedEndOfInput {
            context,
            diag: self.diag_at(self.pos),
        }
    }

    /// Run `rule` one nesting level deeper. The cursor is on the opening
    /// character, which is where a too-deep error points.
    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_DEPTH,
                diag: self.diag_at(self.pos),
            });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // Documents and entries
    // ========================================================================

    /// Parse entries until end of input.
    pub(crate) fn parse_document(&mut self) -> Result<Document> {
        let mut doc = Document::new();
        loop {
            self.skip_insignificant();
            if self.at_end() {
                return Ok(doc);
            }
            self.parse_entry(&mut doc)?;
        }
    }

    /// Parse one `[key] := value` entry into `doc`. Later keys overwrite.
    fn parse_entry(&mut self, doc: &mut Document) -> Result<()> {
        if !self.consume('[') {
            return Err(self.syntax("'[' to start key"));
        }

        let key = self.parse_key()?;

        self.skip_insignificant();
        if !self.consume(']') {
            return Err(self.syntax("']' after key"));
        }

        self.skip_insignificant();
        if !(self.consume(':') && self.consume('=')) {
            return Err(self.syntax("':=' after key"));
        }

        self.skip_insignificant();
        let value = self.parse_value()?;

        doc.insert(key, value);
        Ok(())
    }

    /// Parse `| entry* |`. The cursor is on the opening pipe.
    fn parse_map(&mut self) -> Result<Document> {
        self.bump();
        let mut doc = Document::new();
        loop {
            self.skip_insignificant();
            match self.peek() {
                Some('|') => {
                    self.bump();
                    return Ok(doc);
                }
                None => return Err(self.end_of_input("nested map")),
                Some(_) => self.parse_entry(&mut doc)?,
            }
        }
    }

    // ========================================================================
    // Values and keys
    // ========================================================================

    /// Full value grammar: anything a key can be, plus nested documents.
    fn parse_value(&mut self) -> Result<Value> {
        self.skip_insignificant();
        match self.peek() {
            None => Err(self.end_of_input("value")),
            Some('|') => Ok(Value::Document(self.nested(Self::parse_map)?)),
            Some(_) => self.parse_key(),
        }
    }

    /// Key grammar: quoted literals, arrays, `[key]`, and bare words.
    pub(crate) fn parse_key(&mut self) -> Result<Value> {
        self.skip_insignificant();
        match self.peek() {
            None => Err(self.end_of_input("literal")),
            Some('"' | '\'') => self.parse_string(),
            Some('{') => Ok(Value::Array(self.nested(Self::parse_array)?)),
            Some('[') => self.nested(Self::parse_bracketed),
            Some(_) => self.parse_identifier_or_number(),
        }
    }

    /// Parse `[key]` used as a key. The cursor is on the opening bracket.
    fn parse_bracketed(&mut self) -> Result<Value> {
        self.bump();
        let inner = self.parse_key()?;
        self.skip_insignificant();
        if !self.consume(']') {
            return Err(self.syntax("']' after bracketed value"));
        }
        Ok(inner)
    }

    /// Require that nothing but insignificant content remains.
    pub(crate) fn finish(&mut self) -> Result<()> {
        self.skip_insignificant();
        if self.at_end() {
            Ok(())
        } else {
            Err(self.syntax("end of input"))
        }
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    /// Parse `{ value, ... }`. The cursor is on the opening brace.
    /// A comma directly before the closing brace is accepted.
    fn parse_array(&mut self) -> Result<Vec<Value>> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_insignificant();
            match self.peek() {
                None => return Err(self.end_of_input("array")),
                Some('}') => {
                    self.bump();
                    return Ok(items);
                }
                Some(_) => {}
            }

            items.push(self.parse_value()?);

            self.skip_insignificant();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(items);
                }
                _ => {
                    return Err(ParseError::ExpectedSeparatorOrClose {
                        diag: self.diag_at(self.pos),
                    })
                }
            }
        }
    }

    // ========================================================================
    // Quoted literals
    // ========================================================================

    /// Parse a quoted literal. The closing quote decides the type: `"`
    /// yields a string and `'` yields codepoints, whichever quote opened it.
    fn parse_string(&mut self) -> Result<Value> {
        self.bump();
        let mut buf = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some(escaped) => buf.push(unescape(escaped)),
                    None => break,
                },
                '"' => return Ok(Value::String(buf)),
                '\'' => return Ok(Value::Codepoints(buf.chars().collect())),
                c => buf.push(c),
            }
        }
        Err(ParseError::UnterminatedString {
            diag: self.diag_at(self.pos),
        })
    }

    // ========================================================================
    // Bare words and numbers
    // ========================================================================

    fn parse_identifier_or_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }

        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
                self.bump();
            }
            return self.convert_number(start);
        }

        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }

        match &self.src[start..self.pos] {
            "" => Err(ParseError::UnexpectedToken {
                diag: self.diag_at(self.pos),
            }),
            word => Ok(parse_keyword(word).unwrap_or_else(|| Value::Identifier(word.to_string()))),
        }
    }

    /// Convert the digit run that started at `start`.
    fn convert_number(&self, start: usize) -> Result<Value> {
        let raw = &self.src[start..self.pos];
        let invalid = || ParseError::NumberFormat {
            literal: raw.to_string(),
            diag: self.diag_at(start),
        };

        if raw.contains('.') {
            return raw.parse::<f64>().map(Value::Float).map_err(|_| invalid());
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(Value::Integer(n));
        }
        // Out of i64 range; fall back to a float.
        raw.parse::<f64>().map(Value::Float).map_err(|_| invalid())
    }
}

/// Map the character after a backslash to the character it stands for.
fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        // `\\`, `\"`, `\'` and unknown escapes pass through.
        other => other,
    }
}

/// Check if `s` is a reserved word and return its value.
fn parse_keyword(s: &str) -> Option<Value> {
    match s {
        "null" | "nil" => Some(Value::Null),
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}
