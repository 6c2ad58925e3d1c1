//! Line-oriented tree serializer.
//!
//! Each rendered line is assembled in a buffer and handed to the sink with a
//! single `write_all`, so output streams node by node in document order.
//! Traversal uses an explicit stack; nesting depth is bounded only by memory.

use std::io::{self, Write};

use xq_dom::{Attribute, DomTree, ElementData, Grammar, NodeId, NodeType, QuoteStyle};
use xq_html::tags;

use crate::escape::{escape_attribute, escape_text};
use crate::options::{FormatOptions, IndentUnit};
use crate::palette::{Category, Painter};

/// How an element is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `<br>` (HTML void) or `<br/>` (empty-element tag).
    Leaf { slash: bool },
    /// `<a></a>`
    Empty,
    /// Start tag, the single text child, end tag on one line.
    Inline,
    /// Content reproduced exactly as parsed (`pre`, `script`, ...).
    Verbatim,
    /// One child per line, one level deeper.
    Block,
}

enum Frame {
    Open(NodeId, usize),
    Close(NodeId, usize),
}

/// Renders a [`DomTree`] with fresh indentation.
pub struct Formatter<'t> {
    tree: &'t DomTree,
    grammar: Grammar,
    indent: IndentUnit,
    painter: Painter,
}

impl<'t> Formatter<'t> {
    /// Prepare to render `tree`. `is_tty` tells whether the final output is
    /// an interactive terminal, for [`crate::ColorMode::Default`].
    #[must_use]
    pub fn new(tree: &'t DomTree, options: &FormatOptions, is_tty: bool) -> Self {
        Self {
            tree,
            grammar: tree.grammar(),
            indent: options.indent(),
            painter: Painter::new(options.color().enabled(is_tty)),
        }
    }

    /// Render the whole document.
    ///
    /// # Errors
    ///
    /// Any error returned by `sink`.
    pub fn write_document<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        self.write_node(NodeId::ROOT, sink)
    }

    /// Render the subtree at `id` with indentation restarting at zero. The
    /// Document renders as the whole document.
    ///
    /// # Errors
    ///
    /// Any error returned by `sink`.
    pub fn write_node<W: Write + ?Sized>(&self, id: NodeId, sink: &mut W) -> io::Result<()> {
        let mut stack = vec![Frame::Open(id, 0)];
        let mut line = String::new();

        while let Some(frame) = stack.pop() {
            line.clear();
            match frame {
                Frame::Close(id, depth) => {
                    if let Some(element) = self.tree.as_element(id) {
                        self.indent.push_to(&mut line, depth);
                        self.push_end_tag(&mut line, element);
                    }
                }
                Frame::Open(id, depth) => {
                    let Some(node_type) = self.tree.node_type(id) else {
                        continue;
                    };
                    if matches!(node_type, NodeType::Document) {
                        for &child in self.block_children(id).iter().rev() {
                            stack.push(Frame::Open(child, depth));
                        }
                        continue;
                    }
                    self.indent.push_to(&mut line, depth);
                    if let NodeType::Element(element) = node_type {
                        self.push_element(&mut line, id, element);
                        if self.layout(id, element) == Layout::Block {
                            stack.push(Frame::Close(id, depth));
                            for &child in self.block_children(id).iter().rev() {
                                stack.push(Frame::Open(child, depth + 1));
                            }
                        }
                    } else {
                        self.push_leaf(&mut line, node_type);
                    }
                }
            }
            line.push('\n');
            sink.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    /// Write `value` unescaped on its own line, in the text color. Used for
    /// attribute, text and scalar query results.
    ///
    /// # Errors
    ///
    /// Any error returned by `sink`.
    pub fn write_value<W: Write + ?Sized>(&self, value: &str, sink: &mut W) -> io::Result<()> {
        let mut line = String::with_capacity(value.len() + 1);
        self.painter.paint(&mut line, Category::Text, value);
        line.push('\n');
        sink.write_all(line.as_bytes())
    }

    fn layout(&self, id: NodeId, element: &ElementData) -> Layout {
        let html = self.grammar == Grammar::Html;
        if html && tags::is_void(&element.tag_name) {
            return Layout::Leaf { slash: false };
        }
        let children = self.tree.children(id);
        if children.is_empty() {
            return if element.self_closing {
                Layout::Leaf { slash: true }
            } else {
                Layout::Empty
            };
        }
        let name: &str = &element.tag_name;
        if html && (tags::is_preformatted(name) || tags::is_raw_text(name)) {
            return Layout::Verbatim;
        }
        match children {
            [only] if matches!(self.tree.node_type(*only), Some(NodeType::Text(_))) => {
                Layout::Inline
            }
            _ => Layout::Block,
        }
    }

    /// Children shown in block layout: whitespace-only text is replaced by
    /// indentation.
    fn block_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .children(id)
            .iter()
            .copied()
            .filter(|&child| {
                self.tree
                    .as_text(child)
                    .is_none_or(|text| !text.trim().is_empty())
            })
            .collect()
    }

    /// Everything on an element's first line: the start tag, plus the content
    /// and end tag unless the element is laid out as a block.
    fn push_element(&self, line: &mut String, id: NodeId, element: &ElementData) {
        match self.layout(id, element) {
            Layout::Leaf { slash } => self.push_start_tag(line, element, slash),
            Layout::Empty => {
                self.push_start_tag(line, element, false);
                self.push_end_tag(line, element);
            }
            Layout::Inline => {
                self.push_start_tag(line, element, false);
                if let Some(text) = self.tree.first_child(id).and_then(|c| self.tree.as_text(c)) {
                    self.push_text(line, text, false);
                }
                self.push_end_tag(line, element);
            }
            Layout::Verbatim => {
                self.push_start_tag(line, element, false);
                for &child in self.tree.children(id) {
                    self.push_inline(line, child);
                }
                self.push_end_tag(line, element);
            }
            Layout::Block => self.push_start_tag(line, element, false),
        }
    }

    /// Text, comments, CDATA, processing instructions and doctypes each take
    /// one line in block layout.
    fn push_leaf(&self, line: &mut String, node_type: &NodeType) {
        match node_type {
            NodeType::Text(text) => self.push_text(line, text.trim(), false),
            NodeType::CData(text) => {
                self.painter.paint(line, Category::Comment, &format!("<![CDATA[{text}]]>"));
            }
            NodeType::Comment(text) => {
                self.painter.paint(line, Category::Comment, &format!("<!--{text}-->"));
            }
            NodeType::ProcessingInstruction { target, data } => {
                let pi = if data.is_empty() {
                    format!("<?{target}?>")
                } else {
                    format!("<?{target} {data}?>")
                };
                self.painter.paint(line, Category::Comment, &pi);
            }
            NodeType::Doctype(body) => {
                self.painter.paint(line, Category::Comment, &format!("<!DOCTYPE {body}>"));
            }
            NodeType::Document | NodeType::Element(_) => {}
        }
    }

    fn push_text(&self, line: &mut String, text: &str, raw: bool) {
        if raw {
            self.painter.paint(line, Category::Text, text);
        } else {
            self.painter.paint(line, Category::Text, &escape_text(text, self.grammar));
        }
    }

    fn push_start_tag(&self, line: &mut String, element: &ElementData, slash: bool) {
        self.painter.paint(line, Category::Delimiter, "<");
        self.painter.paint(line, Category::ElementName, &element.tag_name);
        for attr in &element.attrs {
            line.push(' ');
            self.push_attribute(line, attr);
        }
        self.painter.paint(line, Category::Delimiter, if slash { "/>" } else { ">" });
    }

    fn push_end_tag(&self, line: &mut String, element: &ElementData) {
        self.painter.paint(line, Category::Delimiter, "</");
        self.painter.paint(line, Category::ElementName, &element.tag_name);
        self.painter.paint(line, Category::Delimiter, ">");
    }

    /// Original quoting is kept; unquoted values gain double quotes.
    fn push_attribute(&self, line: &mut String, attr: &Attribute) {
        self.painter.paint(line, Category::AttributeName, &attr.name);
        if attr.quote == QuoteStyle::Absent && self.grammar == Grammar::Html {
            return;
        }
        let quote = if attr.quote == QuoteStyle::Single { '\'' } else { '"' };
        self.painter.paint(line, Category::Delimiter, "=");
        let value = escape_attribute(&attr.value, self.grammar, quote);
        self.painter
            .paint(line, Category::AttributeValue, &format!("{quote}{value}{quote}"));
    }

    /// Serialize a subtree exactly as parsed, with no added whitespace.
    fn push_inline(&self, line: &mut String, start: NodeId) {
        let mut stack = vec![Frame::Open(start, 0)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Close(id, _) => {
                    if let Some(element) = self.tree.as_element(id) {
                        self.push_end_tag(line, element);
                    }
                }
                Frame::Open(id, _) => match self.tree.node_type(id) {
                    Some(NodeType::Element(element)) => {
                        let void = self.grammar == Grammar::Html && tags::is_void(&element.tag_name);
                        let children = self.tree.children(id);
                        if void || (children.is_empty() && element.self_closing) {
                            self.push_start_tag(line, element, !void);
                            continue;
                        }
                        self.push_start_tag(line, element, false);
                        stack.push(Frame::Close(id, 0));
                        for &child in children.iter().rev() {
                            stack.push(Frame::Open(child, 0));
                        }
                    }
                    Some(NodeType::Text(text)) => {
                        let raw = self.grammar == Grammar::Html
                            && self
                                .tree
                                .parent(id)
                                .and_then(|p| self.tree.as_element(p))
                                .is_some_and(|p| tags::is_raw_text(&p.tag_name));
                        self.push_text(line, text, raw);
                    }
                    Some(other) => self.push_leaf(line, other),
                    None => {}
                },
            }
        }
    }
}
