//! Character cursor over the document text.
//!
//! Tracks line and column as it advances so every error can point at the
//! offending position. Line endings are normalized before the cursor is built,
//! so `\r` never reaches it.

use xq_dom::QuoteStyle;

use crate::error::{ParseError, SourceLocation};

/// [§2.2 Characters](https://www.w3.org/TR/xml/#charsets)
///
/// `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
pub(crate) const fn is_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF
    )
}

/// [§2.3 Common Syntactic Constructs](https://www.w3.org/TR/xml/#NT-NameStartChar)
pub(crate) const fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}' |
        '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}'
    )
}

/// [§2.3](https://www.w3.org/TR/xml/#NT-NameChar): `NameStartChar | "-" | "." | [0-9] | ...`
pub(crate) const fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// [§2.3](https://www.w3.org/TR/xml/#NT-S): `(#x20 | #x9 | #xD | #xA)+`
pub(crate) const fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

pub(crate) struct XmlInput<'a> {
    text: &'a str,
    location: SourceLocation,
}

impl<'a> XmlInput<'a> {
    pub(crate) const fn new(text: &'a str) -> Self {
        Self {
            text,
            location: SourceLocation::START,
        }
    }

    pub(crate) const fn location(&self) -> SourceLocation {
        self.location
    }

    pub(crate) const fn pos(&self) -> usize {
        self.location.byte_offset
    }

    fn rest(&self) -> &'a str {
        &self.text[self.location.byte_offset..]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.rest().is_empty()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    pub(crate) fn looking_at(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Consume one character.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.location.step(c);
        Some(c)
    }

    /// Consume `s`, which the caller has already matched with [`Self::looking_at`].
    pub(crate) fn advance_str(&mut self, s: &str) {
        for c in s.chars() {
            self.location.step(c);
        }
    }

    /// Consume the next character, failing at end of input.
    pub(crate) fn next_char(&mut self, context: &str) -> Result<char, ParseError> {
        self.bump()
            .ok_or_else(|| self.eof(format!("end of input in {context}")))
    }

    pub(crate) fn expect_char(&mut self, expected: char, context: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.location.step(c);
                Ok(())
            }
            Some(c) => Err(self.fatal(format!("expected '{expected}' in {context}, found '{c}'"))),
            None => Err(self.eof(format!("end of input in {context}"))),
        }
    }

    pub(crate) fn expect_str(&mut self, expected: &str, context: &str) -> Result<(), ParseError> {
        if self.looking_at(expected) {
            self.advance_str(expected);
            Ok(())
        } else if expected.starts_with(self.rest()) {
            Err(self.eof(format!("end of input in {context}")))
        } else {
            Err(self.fatal(format!("expected '{expected}' in {context}")))
        }
    }

    /// Skip whitespace. Returns whether any was skipped.
    pub(crate) fn skip_whitespace(&mut self) -> bool {
        let start = self.pos();
        while let Some(c) = self.peek()
            && is_xml_whitespace(c)
        {
            self.location.step(c);
        }
        self.pos() != start
    }

    /// Consume everything up to `delimiter`, then the delimiter itself.
    pub(crate) fn take_until(
        &mut self,
        delimiter: &str,
        context: &str,
    ) -> Result<&'a str, ParseError> {
        let rest = self.rest();
        let Some(end) = rest.find(delimiter) else {
            self.advance_str(rest);
            return Err(self.eof(format!("unterminated {context}")));
        };
        let content = &rest[..end];
        if let Some(bad) = content.chars().find(|&c| !is_xml_char(c)) {
            return Err(self.fatal(format!(
                "invalid character U+{:04X} in {context}",
                bad as u32
            )));
        }
        self.advance_str(content);
        self.advance_str(delimiter);
        Ok(content)
    }

    /// [§2.3 `Name`](https://www.w3.org/TR/xml/#NT-Name)
    pub(crate) fn parse_name(&mut self, context: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(c) if is_name_start_char(c) => {}
            Some(c) => return Err(self.fatal(format!("invalid name start '{c}' in {context}"))),
            None => return Err(self.eof(format!("end of input in {context}"))),
        }
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_name_char(c))
            .map_or(rest.len(), |(i, _)| i);
        let name = &rest[..len];
        self.advance_str(name);
        Ok(name.to_string())
    }

    /// [§4.1 Character and Entity References](https://www.w3.org/TR/xml/#sec-references)
    ///
    /// Called at `&`. Only the five predefined entities are known; there is
    /// no DTD processing, so any other entity name is an error.
    pub(crate) fn parse_reference(&mut self) -> Result<char, ParseError> {
        let start = self.location;
        self.expect_char('&', "reference")?;
        if self.peek() == Some('#') {
            let _ = self.bump();
            let hex = self.peek() == Some('x');
            if hex {
                let _ = self.bump();
            }
            let rest = self.rest();
            let len = rest
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(rest.len());
            let digits = &rest[..len];
            self.advance_str(digits);
            self.expect_char(';', "character reference")?;

            let radix = if hex { 16 } else { 10 };
            return u32::from_str_radix(digits, radix)
                .ok()
                .and_then(char::from_u32)
                .filter(|&c| is_xml_char(c))
                .ok_or_else(|| ParseError::MalformedMarkup {
                    message: format!(
                        "invalid character reference '&#{}{digits};'",
                        if hex { "x" } else { "" }
                    ),
                    location: start,
                });
        }

        let name = self.parse_name("entity reference")?;
        self.expect_char(';', "entity reference")?;
        match name.as_str() {
            "amp" => Ok('&'),
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "quot" => Ok('"'),
            "apos" => Ok('\''),
            _ => Err(ParseError::MalformedMarkup {
                message: format!("unknown entity '&{name};'"),
                location: start,
            }),
        }
    }

    /// [§2.3 `AttValue`](https://www.w3.org/TR/xml/#NT-AttValue), decoded.
    ///
    /// References are expanded; everything else, literal whitespace included,
    /// is kept as written.
    pub(crate) fn parse_attribute_value(&mut self) -> Result<(String, QuoteStyle), ParseError> {
        let start = self.location;
        let (quote, style) = match self.peek() {
            Some('"') => ('"', QuoteStyle::Double),
            Some('\'') => ('\'', QuoteStyle::Single),
            Some(c) => return Err(self.fatal(format!("attribute value must be quoted, found '{c}'"))),
            None => return Err(self.eof("end of input before attribute value".to_string())),
        };
        let _ = self.bump();

        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::MalformedMarkup {
                        message: "unclosed quote in attribute value".to_string(),
                        location: start,
                    });
                }
                Some(c) if c == quote => {
                    let _ = self.bump();
                    return Ok((value, style));
                }
                Some('<') => return Err(self.fatal("'<' not allowed in attribute value")),
                Some('&') => value.push(self.parse_reference()?),
                Some(c) if !is_xml_char(c) => {
                    return Err(self.fatal(format!(
                        "invalid character U+{:04X} in attribute value",
                        c as u32
                    )));
                }
                Some(c) => {
                    let _ = self.bump();
                    value.push(c);
                }
            }
        }
    }

    pub(crate) fn fatal(&self, message: impl Into<String>) -> ParseError {
        ParseError::MalformedMarkup {
            message: message.into(),
            location: self.location,
        }
    }

    pub(crate) fn eof(&self, message: impl Into<String>) -> ParseError {
        ParseError::UnexpectedEof {
            message: message.into(),
            location: self.location,
        }
    }
}
