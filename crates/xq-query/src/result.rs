use strum_macros::Display;
use xq_dom::{Attribute, DomTree, NodeId, NodeType};

/// Which query language an expression is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum QueryLanguage {
    /// XPath 1.0 subset.
    #[strum(serialize = "xpath")]
    XPath,
    /// CSS selector subset.
    #[strum(serialize = "css")]
    Css,
}

/// How many matches a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryMode {
    /// The first match in document order; no match is an error.
    Single,
    /// Every match in document order; no match is an empty result.
    Multi,
}

/// One matched item: a tree node, or an attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Any node, including the Document.
    Node(NodeId),
    /// `attrs[index]` of the element `owner`.
    Attribute {
        /// The element carrying the attribute.
        owner: NodeId,
        /// Index into the element's attribute list.
        index: usize,
    },
}

impl Selection {
    /// The node itself, or the owning element for an attribute.
    #[must_use]
    pub const fn node(self) -> NodeId {
        match self {
            Self::Node(id) | Self::Attribute { owner: id, .. } => id,
        }
    }

    /// The selected attribute, if this is an attribute selection.
    #[must_use]
    pub fn attribute(self, tree: &DomTree) -> Option<&Attribute> {
        match self {
            Self::Attribute { owner, index } => {
                tree.as_element(owner).and_then(|e| e.attrs.get(index))
            }
            Self::Node(_) => None,
        }
    }

    /// The XPath string-value: concatenated text for Documents and elements,
    /// literal content for other nodes, the value for attributes.
    #[must_use]
    pub fn string_value(self, tree: &DomTree) -> String {
        match self {
            Self::Attribute { .. } => self
                .attribute(tree)
                .map(|a| a.value.clone())
                .unwrap_or_default(),
            Self::Node(id) => match tree.node_type(id) {
                Some(NodeType::Document | NodeType::Element(_)) => tree.text_content(id),
                Some(NodeType::Text(s) | NodeType::CData(s) | NodeType::Comment(s)) => s.clone(),
                Some(NodeType::ProcessingInstruction { data, .. }) => data.clone(),
                Some(NodeType::Doctype(_)) | None => String::new(),
            },
        }
    }
}

/// What a query produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Matched {
    /// Selected nodes and attributes, in document order without duplicates.
    Nodes(Vec<Selection>),
    /// An XPath expression that evaluated to a string, number or boolean,
    /// already converted to its string form.
    Value(String),
}

/// The outcome of [`crate::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// The mode the query ran in.
    pub mode: QueryMode,
    /// The matches.
    pub matched: Matched,
}

impl QueryResult {
    /// Selected nodes; empty for a scalar value.
    #[must_use]
    pub fn selections(&self) -> &[Selection] {
        match &self.matched {
            Matched::Nodes(nodes) => nodes,
            Matched::Value(_) => &[],
        }
    }

    /// Number of matched items; a scalar value counts as one.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.matched {
            Matched::Nodes(nodes) => nodes.len(),
            Matched::Value(_) => 1,
        }
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
