//! Error types for strict XML parsing.
//!
//! Every error carries the 1-based line and column where parsing stopped,
//! plus the byte offset for callers that want to slice the input.

use std::fmt;

use thiserror::Error;

/// Position within the (newline-normalized) input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number, counted in characters.
    pub column: u32,
    /// 0-based byte offset.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// The location of the first character of the input.
    pub const START: Self = Self {
        line: 1,
        column: 1,
        byte_offset: 0,
    };

    /// Compute the location just past `prefix`.
    #[must_use]
    pub fn after(prefix: &str) -> Self {
        let mut location = Self::START;
        for c in prefix.chars() {
            location.step(c);
        }
        location
    }

    /// Move past one character.
    pub(crate) const fn step(&mut self, c: char) {
        self.byte_offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error returned when an XML document is not well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input violates XML syntax or well-formedness.
    #[error("malformed markup at {location}: {message}")]
    MalformedMarkup {
        /// What was wrong.
        message: String,
        /// Where it was noticed.
        location: SourceLocation,
    },
    /// The input ended inside a construct or with elements still open.
    #[error("unexpected end of input at {location}: {message}")]
    UnexpectedEof {
        /// What was still open.
        message: String,
        /// End of the input.
        location: SourceLocation,
    },
}

impl ParseError {
    /// Where parsing stopped.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        match self {
            Self::MalformedMarkup { location, .. } | Self::UnexpectedEof { location, .. } => {
                *location
            }
        }
    }

    /// The error message without the location prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::MalformedMarkup { message, .. } | Self::UnexpectedEof { message, .. } => message,
        }
    }
}
