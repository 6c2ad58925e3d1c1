//! Recursive-descent parser for well-formed XML.
//!
//! [Extensible Markup Language (XML) 1.0](https://www.w3.org/TR/xml/)
//!
//! The first well-formedness violation aborts the parse. Element nesting is
//! tracked with an explicit stack rather than recursion, so deeply nested
//! documents cannot exhaust the call stack.

use std::borrow::Cow;

use xq_dom::{Attribute, DomTree, ElementData, Grammar, NodeId, NodeType};

use crate::error::{ParseError, SourceLocation};
use crate::input::{XmlInput, is_name_start_char, is_xml_char};

/// An element that has been started but not yet ended.
struct OpenElement {
    id: NodeId,
    name: String,
}

/// Strict XML parser producing a [`DomTree`] with [`Grammar::Xml`].
pub struct XmlParser<'a> {
    input: XmlInput<'a>,
    tree: DomTree,
    open_elements: Vec<OpenElement>,
    seen_doctype: bool,
}

impl<'a> XmlParser<'a> {
    /// Create a parser over already-normalized text (see [`normalize_newlines`]).
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            input: XmlInput::new(text),
            tree: DomTree::new(Grammar::Xml),
            open_elements: Vec::new(),
            seen_doctype: false,
        }
    }

    /// [§2.1 `document`](https://www.w3.org/TR/xml/#NT-document):
    /// `prolog element Misc*`
    ///
    /// # Errors
    ///
    /// Returns the first well-formedness violation.
    pub fn parse(mut self) -> Result<DomTree, ParseError> {
        self.parse_misc(true)?;

        if self.input.at_end() {
            return Err(self.input.fatal("missing root element"));
        }
        self.parse_element_tree()?;

        self.parse_misc(false)?;
        if !self.input.at_end() {
            return Err(self.input.fatal("content after document element"));
        }

        log::debug!(target: "xml", "parsed {} nodes", self.tree.len());
        Ok(self.tree)
    }

    /// Comments, PIs and whitespace outside the document element; before it,
    /// also the XML declaration and DOCTYPE. Stops at the first `<` that
    /// starts an element or at anything that cannot appear here.
    fn parse_misc(&mut self, prolog: bool) -> Result<(), ParseError> {
        loop {
            let _ = self.input.skip_whitespace();
            if self.input.looking_at("<!--") {
                self.parse_comment(NodeId::ROOT)?;
            } else if self.input.looking_at("<?") {
                self.parse_processing_instruction(NodeId::ROOT)?;
            } else if self.input.looking_at("<!DOCTYPE") {
                if !prolog {
                    return Err(self.input.fatal("DOCTYPE after document element"));
                }
                self.parse_doctype()?;
            } else if self.input.looking_at("<")
                && self.input.peek_at(1).is_some_and(is_name_start_char)
            {
                if !prolog {
                    return Err(self.input.fatal("content after document element"));
                }
                return Ok(());
            } else if self.input.at_end() {
                return Ok(());
            } else if prolog {
                return Err(self.input.fatal("text before document element"));
            } else {
                return Err(self.input.fatal("content after document element"));
            }
        }
    }

    /// [§2.8 `doctypedecl`](https://www.w3.org/TR/xml/#NT-doctypedecl)
    ///
    /// The declaration is not interpreted; its body, including any internal
    /// subset, is kept verbatim.
    fn parse_doctype(&mut self) -> Result<(), ParseError> {
        if self.seen_doctype {
            return Err(self.input.fatal("more than one DOCTYPE declaration"));
        }
        if self.tree.document_element().is_some() {
            return Err(self.input.fatal("DOCTYPE after document element"));
        }
        self.input.expect_str("<!DOCTYPE", "DOCTYPE")?;
        if self.input.at_end() {
            return Err(self.input.eof("end of input in DOCTYPE declaration"));
        }
        if !self.input.skip_whitespace() {
            return Err(self.input.fatal("whitespace required after '<!DOCTYPE'"));
        }

        let mut quote: Option<char> = None;
        let mut subset_depth = 0usize;
        let mut body = String::new();
        loop {
            let c = self.input.next_char("DOCTYPE declaration")?;
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '[') => subset_depth += 1,
                (None, ']') => subset_depth = subset_depth.saturating_sub(1),
                (None, '>') if subset_depth == 0 => break,
                _ => {}
            }
            body.push(c);
        }
        self.seen_doctype = true;

        let id = self.tree.alloc(NodeType::Doctype(body.trim().to_string()));
        self.tree.append_child(NodeId::ROOT, id);
        Ok(())
    }

    /// Parse the document element and everything inside it.
    fn parse_element_tree(&mut self) -> Result<(), ParseError> {
        self.parse_start_tag()?;
        while let Some(innermost) = self.open_elements.last() {
            let parent = innermost.id;
            if self.input.at_end() {
                let depth = self.open_elements.len();
                let name = innermost.name.clone();
                return Err(self.input.eof(format!(
                    "{depth} unclosed element(s), innermost <{name}>"
                )));
            }

            if self.input.looking_at("</") {
                self.parse_end_tag()?;
            } else if self.input.looking_at("<![CDATA[") {
                self.parse_cdata(parent)?;
            } else if self.input.looking_at("<!--") {
                self.parse_comment(parent)?;
            } else if self.input.looking_at("<?") {
                self.parse_processing_instruction(parent)?;
            } else if self.input.looking_at("<!") {
                return Err(self.input.fatal("markup declaration not allowed in content"));
            } else if self.input.looking_at("<") {
                self.parse_start_tag()?;
            } else {
                self.parse_char_data(parent)?;
            }
        }
        Ok(())
    }

    /// [§3.1 `STag` / `EmptyElemTag`](https://www.w3.org/TR/xml/#sec-starttags)
    fn parse_start_tag(&mut self) -> Result<(), ParseError> {
        self.input.expect_char('<', "start tag")?;
        let name = self.input.parse_name("element name")?;
        let mut element = ElementData::new(name.clone());

        loop {
            let had_whitespace = self.input.skip_whitespace();
            if self.input.looking_at("/>") {
                self.input.advance_str("/>");
                element.self_closing = true;
                break;
            }
            if self.input.looking_at(">") {
                self.input.advance_str(">");
                break;
            }
            if self.input.at_end() {
                return Err(self.input.eof(format!("end of input in start tag <{name}>")));
            }
            if !had_whitespace {
                return Err(self.input.fatal("whitespace required between attributes"));
            }

            let attr_location = self.input.location();
            let attr_name = self.input.parse_name("attribute name")?;
            let _ = self.input.skip_whitespace();
            self.input.expect_char('=', "attribute")?;
            let _ = self.input.skip_whitespace();
            let (value, quote) = self.input.parse_attribute_value()?;

            // [§3.1 WFC: Unique Att Spec]
            if !element.push_attr(Attribute::new(attr_name.clone(), value).with_quote(quote)) {
                return Err(ParseError::MalformedMarkup {
                    message: format!("duplicate attribute '{attr_name}' on <{name}>"),
                    location: attr_location,
                });
            }
        }

        let self_closing = element.self_closing;
        let parent = self.open_elements.last().map_or(NodeId::ROOT, |open| open.id);
        let id = self.tree.alloc(NodeType::Element(element));
        self.tree.append_child(parent, id);
        if !self_closing {
            self.open_elements.push(OpenElement { id, name });
        }
        Ok(())
    }

    /// [§3.1 `ETag`](https://www.w3.org/TR/xml/#NT-ETag)
    fn parse_end_tag(&mut self) -> Result<(), ParseError> {
        let location = self.input.location();
        self.input.expect_str("</", "end tag")?;
        let name = self.input.parse_name("end tag")?;
        let _ = self.input.skip_whitespace();
        self.input.expect_char('>', "end tag")?;

        match self.open_elements.pop() {
            Some(open) if open.name == name => Ok(()),
            Some(open) => Err(ParseError::MalformedMarkup {
                message: format!("mismatched end tag: expected </{}>, found </{name}>", open.name),
                location,
            }),
            None => Err(ParseError::MalformedMarkup {
                message: format!("unexpected end tag </{name}>"),
                location,
            }),
        }
    }

    /// [§2.4 `CharData`](https://www.w3.org/TR/xml/#NT-CharData) and references,
    /// up to the next `<`.
    fn parse_char_data(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let mut text = String::new();
        while let Some(c) = self.input.peek() {
            match c {
                '<' => break,
                '&' => text.push(self.input.parse_reference()?),
                ']' if self.input.looking_at("]]>") => {
                    return Err(self.input.fatal("']]>' not allowed in character data"));
                }
                c if !is_xml_char(c) => {
                    return Err(self.input.fatal(format!(
                        "invalid character U+{:04X} in content",
                        c as u32
                    )));
                }
                c => {
                    let _ = self.input.bump();
                    text.push(c);
                }
            }
        }
        if !text.is_empty() {
            let _ = self.tree.append_text(parent, &text);
        }
        Ok(())
    }

    /// [§2.5 Comments](https://www.w3.org/TR/xml/#sec-comments)
    fn parse_comment(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let location = self.input.location();
        self.input.expect_str("<!--", "comment")?;
        let content = self.input.take_until("-->", "comment")?;
        if content.contains("--") || content.ends_with('-') {
            return Err(ParseError::MalformedMarkup {
                message: "'--' not allowed inside a comment".to_string(),
                location,
            });
        }
        let id = self.tree.alloc(NodeType::Comment(content.to_string()));
        self.tree.append_child(parent, id);
        Ok(())
    }

    /// [§2.7 CDATA Sections](https://www.w3.org/TR/xml/#sec-cdata-sect)
    fn parse_cdata(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.input.expect_str("<![CDATA[", "CDATA section")?;
        let content = self.input.take_until("]]>", "CDATA section")?;
        let id = self.tree.alloc(NodeType::CData(content.to_string()));
        self.tree.append_child(parent, id);
        Ok(())
    }

    /// [§2.6 Processing Instructions](https://www.w3.org/TR/xml/#sec-pi)
    ///
    /// The XML declaration is kept as a PI with target `xml`; it is only
    /// allowed as the very first thing in the document.
    fn parse_processing_instruction(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let location = self.input.location();
        self.input.expect_str("<?", "processing instruction")?;
        let target = self.input.parse_name("processing instruction target")?;
        if target.eq_ignore_ascii_case("xml") && (target != "xml" || location.byte_offset != 0) {
            return Err(ParseError::MalformedMarkup {
                message: "XML declaration allowed only at the start of the document".to_string(),
                location,
            });
        }

        let data = if self.input.looking_at("?>") {
            self.input.advance_str("?>");
            ""
        } else {
            if self.input.at_end() {
                return Err(self.input.eof("end of input in processing instruction"));
            }
            if !self.input.skip_whitespace() {
                return Err(self.input.fatal("whitespace required after PI target"));
            }
            self.input.take_until("?>", "processing instruction")?
        };

        let id = self.tree.alloc(NodeType::ProcessingInstruction {
            target,
            data: data.to_string(),
        });
        self.tree.append_child(parent, id);
        Ok(())
    }
}

/// [§2.11 End-of-Line Handling](https://www.w3.org/TR/xml/#sec-line-ends):
/// `\r\n` and lone `\r` become `\n`.
#[must_use]
pub fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if input.contains('\r') {
        Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Parse a complete XML document.
///
/// A leading byte-order mark is skipped and line endings are normalized.
///
/// # Errors
///
/// Returns [`ParseError`] on the first well-formedness violation.
pub fn parse_xml(input: &str) -> Result<DomTree, ParseError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let text = normalize_newlines(input);
    XmlParser::new(&text).parse()
}

/// Like [`parse_xml`], starting from raw bytes that must be UTF-8.
///
/// # Errors
///
/// Invalid UTF-8 is [`ParseError::MalformedMarkup`] located at the first bad byte.
pub fn parse_xml_bytes(bytes: &[u8]) -> Result<DomTree, ParseError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_xml(text),
        Err(err) => {
            let valid = &bytes[..err.valid_up_to()];
            // The prefix is valid by construction.
            let prefix = std::str::from_utf8(valid).unwrap_or_default();
            let location = SourceLocation::after(&normalize_newlines(prefix));
            Err(ParseError::MalformedMarkup {
                message: format!("invalid UTF-8 at byte {}", err.valid_up_to()),
                location,
            })
        }
    }
}
