//! Error types for GOMN parsing and persistence.

use std::fmt;
use thiserror::Error;

/// Result type for GOMN parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Bytes of context shown on each side of a failure position.
const WINDOW: usize = 10;

/// Where a parse failed, with the surrounding source for display.
///
/// The window holds up to ten bytes before and after the offset, widened to
/// character boundaries. Line and column are not tracked; see
/// [`Diagnostic::line_column`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Absolute byte offset of the failure.
    pub offset: usize,
    /// Source text immediately before the offset.
    pub before: String,
    /// The offending character, or `None` at end of input.
    pub found: Option<char>,
    /// Source text immediately after the offending character.
    pub after: String,
}

impl Diagnostic {
    /// Capture the context around `offset` in `source`.
    pub fn new(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());

        let mut start = offset.saturating_sub(WINDOW);
        while !source.is_char_boundary(start) {
            start -= 1;
        }
        let mut end = (offset + WINDOW).min(source.len());
        while !source.is_char_boundary(end) {
            end += 1;
        }

        let found = source[offset..].chars().next();
        let rest = offset + found.map_or(0, char::len_utf8);
        let after = if rest < end { &source[rest..end] } else { "" };

        Self {
            offset,
            before: source[start..offset].to_string(),
            found,
            after: after.to_string(),
        }
    }

    /// Recompute the 1-based line and column of the offset in `source`.
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let upto = &source.as_bytes()[..self.offset.min(source.len())];
        let line = upto.iter().filter(|&&b| b == b'\n').count() + 1;
        let column = match upto.iter().rposition(|&b| b == b'\n') {
            Some(newline) => self.offset - newline,
            None => self.offset + 1,
        };
        (line, column)
    }

    /// The snippet line with the offending character set off as `»c«`.
    pub fn snippet(&self) -> String {
        let mut out = escape_for_display(&self.before);
        out.push('»');
        if let Some(c) = self.found {
            out.push_str(&escape_char(c));
        }
        out.push('«');
        out.push_str(&escape_for_display(&self.after));
        out
    }

    /// Column of the caret under the snippet, counted in characters.
    pub fn caret_column(&self) -> usize {
        escape_for_display(&self.before).chars().count() + 1
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " (pos={})", self.offset)?;
        write!(f, "\n    {}", self.snippet())?;
        write!(f, "\n    {}^", " ".repeat(self.caret_column()))
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c if c.is_control() => format!("\\u{{{:x}}}", c as u32),
        c => c.to_string(),
    }
}

fn escape_for_display(s: &str) -> String {
    s.chars().map(escape_char).collect()
}

/// Error type for GOMN parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A structural character (`[`, `]`, `:=`) was required.
    #[error("expected {expected}{diag}")]
    Syntax {
        expected: &'static str,
        diag: Diagnostic,
    },

    /// Input ended in the middle of a construct.
    #[error("unexpected end of input while parsing {context}{diag}")]
    UnexpectedEndOfInput {
        context: &'static str,
        diag: Diagnostic,
    },

    /// An array element was followed by neither `,` nor `}`.
    #[error("expected ',' or '}}' in array{diag}")]
    ExpectedSeparatorOrClose { diag: Diagnostic },

    /// Quoted literal without a closing quote.
    #[error("unterminated string{diag}")]
    UnterminatedString { diag: Diagnostic },

    /// A digit run that converts to neither an integer nor a float.
    #[error("invalid number {literal:?}{diag}")]
    NumberFormat { literal: String, diag: Diagnostic },

    /// Nothing literal could be scanned at this position.
    #[error("unexpected token{diag}")]
    UnexpectedToken { diag: Diagnostic },

    /// Arrays, nested documents or bracketed keys opened past the limit.
    #[error("nesting deeper than {limit} levels{diag}")]
    NestingTooDeep { limit: usize, diag: Diagnostic },
}

impl ParseError {
    /// The failure position and source context.
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            ParseError::Syntax { diag, .. }
            | ParseError::UnexpectedEndOfInput { diag, .. }
            | ParseError::ExpectedSeparatorOrClose { diag }
            | ParseError::UnterminatedString { diag }
            | ParseError::NumberFormat { diag, .. }
            | ParseError::UnexpectedToken { diag }
            | ParseError::NestingTooDeep { diag, .. } => diag,
        }
    }

    /// Absolute byte offset of the failure.
    pub fn offset(&self) -> usize {
        self.diagnostic().offset
    }
}

/// Error type for the binary (CBOR) document encoding.
#[derive(Error, Debug)]
pub enum BinaryError {
    /// The bytes are not well-formed CBOR.
    #[error("CBOR decode error: {0}")]
    Decode(String),

    /// A CBOR item with no GOMN counterpart.
    #[error("CBOR {0} has no GOMN equivalent")]
    Unsupported(String),

    /// A CBOR integer outside the 64-bit signed range.
    #[error("integer {0} is outside the 64-bit signed range")]
    IntegerRange(i128),

    /// The top-level item is not a map.
    #[error("top-level CBOR item must be a map, got {0}")]
    NotADocument(String),
}

/// Error type for the file-level entry points.
///
/// I/O failures pass through untouched; they are never reported as syntax
/// errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Binary(#[from] BinaryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_clamped() {
        let d = Diagnostic::new("[1] := {1, 2", 12);
        assert_eq!(d.offset, 12);
        assert_eq!(d.before, "] := {1, 2");
        assert_eq!(d.found, None);
        assert_eq!(d.after, "");
    }

    #[test]
    fn test_window_at_start() {
        let d = Diagnostic::new("x] := 1", 0);
        assert_eq!(d.before, "");
        assert_eq!(d.found, Some('x'));
        assert_eq!(d.after, "] := 1");
    }

    #[test]
    fn test_window_respects_char_boundaries() {
        // 'é' is two bytes; the window start would otherwise split it.
        let src = "é123456789Xabc";
        let d = Diagnostic::new(src, 11);
        assert_eq!(d.found, Some('X'));
        assert_eq!(d.before, "é123456789");
    }

    #[test]
    fn test_snippet_and_caret() {
        let d = Diagnostic::new("ab\ncd", 3);
        assert_eq!(d.snippet(), "ab\\n»c«d");
        assert_eq!(d.caret_column(), 5);
        assert_eq!(d.to_string(), " (pos=3)\n    ab\\n»c«d\n         ^");
    }

    #[test]
    fn test_line_column() {
        let src = "[a] := 1\n[b] := 2\n[c] ?";
        let d = Diagnostic::new(src, src.len() - 1);
        assert_eq!(d.line_column(src), (3, 5));
        let first = Diagnostic::new(src, 0);
        assert_eq!(first.line_column(src), (1, 1));
    }

    #[test]
    fn test_message_format() {
        let err = ParseError::Syntax {
            expected: "']' after key",
            diag: Diagnostic::new("[1 := 2", 3),
        };
        assert_eq!(err.offset(), 3);
        let msg = err.to_string();
        assert!(msg.starts_with("expected ']' after key (pos=3)\n"), "{}", msg);
    }
}
