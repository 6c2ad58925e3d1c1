use core::fmt;

use strum_macros::Display;
use xq_dom::{DomTree, ElementData, Grammar, NodeId, NodeType};

use super::tags;
use crate::tokenizer::{HTMLTokenizer, Token};

/// Which stage noticed a parse issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum IssueStage {
    /// Raised while tokenizing; `position` is a byte offset into the input.
    Tokenizer,
    /// Raised while building the tree; `position` is a token index.
    TreeBuilder,
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A recovered error. HTML parse errors are never fatal; these are logged at
/// debug level and kept for callers that want to inspect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// WHATWG error code, or a short description for tree-builder recoveries.
    pub message: String,
    /// Byte offset or token index, depending on [`Self::stage`].
    pub position: usize,
    /// Where the issue was raised.
    pub stage: IssueStage,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            IssueStage::Tokenizer => write!(f, "{} at byte {}", self.message, self.position),
            IssueStage::TreeBuilder => write!(f, "{} at token {}", self.message, self.position),
        }
    }
}

/// Tolerant tree builder.
///
/// A single "in body"-like mode driven by a stack of open elements:
/// - start tags first pop any current node they implicitly end
///   ([`tags::IMPLIED_END_TAGS`]), then insert; void elements are never pushed
/// - end tags pop up to the nearest matching open element, closing whatever
///   was left open inside it; an end tag with no matching open element is ignored
/// - at end of input every open element is simply closed
///
/// No `html`/`head`/`body` wrappers are synthesized, so a fragment parses to
/// sibling nodes under the Document.
pub struct HTMLParser {
    tokens: Vec<Token>,
    token_index: usize,
    tree: DomTree,
    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack_of_open_elements: Vec<NodeId>,
    /// Consecutive character tokens are gathered here and inserted as one text node.
    pending_text: String,
    issues: Vec<ParseIssue>,
}

impl HTMLParser {
    /// Create a new parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            token_index: 0,
            tree: DomTree::new(Grammar::Html),
            stack_of_open_elements: Vec::new(),
            pending_text: String::new(),
            issues: Vec::new(),
        }
    }

    /// Seed the issue list, typically with the tokenizer's issues.
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<ParseIssue>) -> Self {
        self.issues = issues;
        self
    }

    /// Get all parse issues encountered so far.
    #[must_use]
    pub fn get_issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Run the parser and return the tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return both the tree and any parse issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.into_iter().enumerate() {
            self.token_index = index;
            if self.process_token(token) {
                break;
            }
        }
        self.flush_text();
        (self.tree, self.issues)
    }

    /// Dispatch one token. Returns true at end of input.
    fn process_token(&mut self, token: Token) -> bool {
        if let Token::Character { data } = token {
            self.pending_text.push(data);
            return false;
        }
        self.flush_text();

        match token {
            Token::Character { .. } => {}
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                let mut element = ElementData::new(name);
                for attr in attributes {
                    let _ = element.push_attr(attr);
                }
                self.handle_start_tag(element, self_closing);
            }
            Token::EndTag { name, .. } => self.handle_end_tag(&name),
            Token::Comment { data } => {
                let _ = self.insert_node(NodeType::Comment(data));
            }
            Token::CData { data } => {
                if self.in_foreign_content() {
                    let _ = self.insert_node(NodeType::CData(data));
                } else {
                    // Outside SVG/MathML the section is a bogus comment.
                    self.parse_error("cdata-in-html-content");
                    let _ = self.insert_node(NodeType::Comment(format!("[CDATA[{data}]]")));
                }
            }
            Token::Doctype { data } => {
                if self.stack_of_open_elements.is_empty()
                    && self.tree.document_element().is_none()
                {
                    let id = self.tree.alloc(NodeType::Doctype(data));
                    self.tree.append_child(NodeId::ROOT, id);
                } else {
                    self.parse_error("misplaced-doctype");
                }
            }
            Token::EndOfFile => {
                if !self.stack_of_open_elements.is_empty() {
                    let open = self.stack_of_open_elements.len();
                    log::trace!(target: "html", "closing {open} open elements at end of input");
                }
                self.stack_of_open_elements.clear();
                return true;
            }
        }
        false
    }

    /// The node new content is inserted into: the current node, or the
    /// Document when nothing is open.
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::ROOT)
    }

    fn current_tag_name(&self) -> Option<&str> {
        self.stack_of_open_elements
            .last()
            .and_then(|&id| self.tree.as_element(id))
            .map(|e| e.tag_name.as_str())
    }

    fn in_foreign_content(&self) -> bool {
        self.stack_of_open_elements.iter().any(|&id| {
            self.tree
                .as_element(id)
                .is_some_and(|e| tags::is_foreign_root(&e.tag_name))
        })
    }

    fn insert_node(&mut self, node_type: NodeType) -> NodeId {
        let parent = self.current_node();
        let id = self.tree.alloc(node_type);
        self.tree.append_child(parent, id);
        id
    }

    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        let parent = self.current_node();
        let _ = self.tree.append_text(parent, &text);
    }

    fn handle_start_tag(&mut self, mut element: ElementData, self_closing: bool) {
        // Implied end tags: `<li>` ends an open `li`, block starts end an open `p`.
        while let Some(open) = self.current_tag_name()
            && tags::closed_by_start_tag(open, &element.tag_name)
        {
            let _ = self.stack_of_open_elements.pop();
        }

        let foreign = self.in_foreign_content() || tags::is_foreign_root(&element.tag_name);
        let void = tags::is_void(&element.tag_name);
        if self_closing && !void && !foreign {
            // "non-void-html-element-start-tag-with-trailing-solidus": the flag is ignored.
            self.parse_error("non-void-html-element-start-tag-with-trailing-solidus");
        }
        element.self_closing = self_closing && (void || foreign);
        let leaf = void || element.self_closing;

        let id = self.insert_node(NodeType::Element(element));
        if !leaf {
            self.stack_of_open_elements.push(id);
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        if tags::is_void(name) {
            self.parse_error("end-tag-for-void-element");
            return;
        }
        let position = self.stack_of_open_elements.iter().rposition(|&id| {
            self.tree
                .as_element(id)
                .is_some_and(|e| e.tag_name == name)
        });
        match position {
            Some(index) => {
                let unclosed = self.stack_of_open_elements.len() - index - 1;
                if unclosed > 0 {
                    log::trace!(target: "html", "</{name}> closes {unclosed} unclosed elements");
                }
                self.stack_of_open_elements.truncate(index);
            }
            None => self.parse_error("unexpected-end-tag"),
        }
    }

    fn parse_error(&mut self, message: &str) {
        let issue = ParseIssue {
            message: message.to_string(),
            position: self.token_index,
            stage: IssueStage::TreeBuilder,
        };
        log::debug!(target: "html", "{issue}");
        self.issues.push(issue);
    }
}

/// Tokenize and build a tree in one step.
#[must_use]
pub fn parse_html(input: &str) -> DomTree {
    parse_html_with_issues(input).0
}

/// Like [`parse_html`] but also returns every recovered parse error.
#[must_use]
pub fn parse_html_with_issues(input: &str) -> (DomTree, Vec<ParseIssue>) {
    let mut tokenizer = HTMLTokenizer::new(input);
    tokenizer.run();
    let (tokens, issues) = tokenizer.into_parts();
    HTMLParser::new(tokens).with_issues(issues).run_with_issues()
}
