//! CSS selector matching
//!
//! Implements the part of [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//! that applies to a static document: type, universal, class, id and
//! attribute selectors, the four combinators, selector lists and the
//! structural pseudo-classes. Anything else is rejected when parsing.
//!
//! Element and attribute names follow the tree's grammar: case-insensitive
//! for HTML, exact for XML. Class, id and attribute values are always exact.

mod parser;

pub use parser::parse_selector_list;

use xq_dom::{DomTree, ElementData, Grammar, NodeId, NodeType};

use crate::error::QueryError;
use crate::result::{Matched, Selection};

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Examples: `div`, `item`, `svg:rect`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Examples: `.highlight`, `.nav-item`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Examples: `#main`, `#nav-bar`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Examples: `[href]`, `[type=text]`, `[lang|=en]`, `[src$=".png"]`
    Attribute(AttributeSelector),
}

/// Structural pseudo-classes. "Element" siblings only count elements; text,
/// comments and other nodes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 4.4 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,

    /// [§ 4.12 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,

    /// [§ 4.12 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,

    /// [§ 4.12 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,

    /// [§ 4.11 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,

    /// [§ 4.11 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,

    /// [§ 4.5 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    ///
    /// Comments, processing instructions and whitespace-only text do not
    /// count as content.
    Empty,
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`
    Exists(String),
    /// `[attr=value]`: exactly `value`.
    Equals(String, String),
    /// `[attr~=value]`: one of the whitespace-separated words is `value`.
    Includes(String, String),
    /// `[attr|=value]`: exactly `value`, or `value` followed by `-`.
    DashMatch(String, String),
    /// `[attr^=value]`: starts with a non-empty `value`.
    PrefixMatch(String, String),
    /// `[attr$=value]`: ends with a non-empty `value`.
    SuffixMatch(String, String),
    /// `[attr*=value]`: contains a non-empty `value`.
    SubstringMatch(String, String),
}

impl AttributeSelector {
    const fn name(&self) -> &String {
        match self {
            Self::Exists(name)
            | Self::Equals(name, _)
            | Self::Includes(name, _)
            | Self::DashMatch(name, _)
            | Self::PrefixMatch(name, _)
            | Self::SuffixMatch(name, _)
            | Self::SubstringMatch(name, _) => name,
        }
    }

    fn matches(&self, element: &ElementData, grammar: Grammar) -> bool {
        let Some(value) = element
            .attrs
            .iter()
            .find(|a| grammar.names_match(&a.name, self.name()))
            .map(|a| a.value.as_str())
        else {
            return false;
        };
        match self {
            Self::Exists(_) => true,
            Self::Equals(_, val) => value == val,
            // "If 'val' contains whitespace, it will never represent anything."
            Self::Includes(_, val) => {
                !val.is_empty()
                    && !val.contains(char::is_whitespace)
                    && value.split_ascii_whitespace().any(|w| w == val)
            }
            Self::DashMatch(_, val) => {
                value == val
                    || value
                        .strip_prefix(val.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            // "If 'val' is the empty string then the selector does not represent anything."
            Self::PrefixMatch(_, val) => !val.is_empty() && value.starts_with(val.as_str()),
            Self::SuffixMatch(_, val) => !val.is_empty() && value.ends_with(val.as_str()),
            Self::SubstringMatch(_, val) => !val.is_empty() && value.contains(val.as_str()),
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators) `A B`
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators) `A > B`
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators) `A + B`
    NextSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators) `A ~ B`
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// `div.container > ul li` is stored as:
/// ```text
/// subject: [li]
/// combinators: [(Descendant, [ul]), (Child, [div.container])]
/// ```
/// The chain runs right-to-left because matching starts at the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector.
    pub subject: CompoundSelector,
    /// (combinator, compound) pairs going left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        compound_matches_in_tree(&self.subject, tree, node_id)
            && self.matches_combinators(tree, node_id, 0)
    }

    /// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    ///
    /// Tries every candidate for `combinators[index]` related to `current`,
    /// backtracking when the rest of the chain fails. `div > p span` must
    /// match `<div><p><p><span>` through the outer `p`, not give up at the
    /// inner one.
    fn matches_combinators(&self, tree: &DomTree, current: NodeId, index: usize) -> bool {
        let Some((combinator, compound)) = self.combinators.get(index) else {
            return true;
        };
        let try_candidate = |candidate: NodeId| {
            compound_matches_in_tree(compound, tree, candidate)
                && self.matches_combinators(tree, candidate, index + 1)
        };
        match combinator {
            Combinator::Descendant => tree.ancestors(current).any(try_candidate),
            Combinator::Child => tree.parent(current).is_some_and(try_candidate),
            Combinator::NextSibling => {
                find_previous_element_sibling(tree, current).is_some_and(try_candidate)
            }
            Combinator::SubsequentSibling => tree
                .preceding_siblings(current)
                .filter(|&sibling| tree.is_element(sibling))
                .any(try_candidate),
        }
    }
}

/// A comma-separated selector list. An element matches when any of its
/// selectors does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// The alternatives, in source order.
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Whether any selector in the list matches `node_id`.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches_in_tree(tree, node_id))
    }
}

/// Parse `expression` and collect every matching element in document order.
///
/// # Errors
///
/// [`QueryError::InvalidExpression`] when the selector uses unsupported or
/// malformed syntax.
pub fn evaluate_css(tree: &DomTree, expression: &str) -> Result<Matched, QueryError> {
    let list = parse_selector_list(expression)?;
    let nodes = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| list.matches_in_tree(tree, id))
        .map(Selection::Node)
        .collect();
    Ok(Matched::Nodes(nodes))
}

/// Check if a compound selector matches an element.
fn compound_matches_in_tree(compound: &CompoundSelector, tree: &DomTree, node_id: NodeId) -> bool {
    let Some(element) = tree.as_element(node_id) else {
        return false;
    };
    let grammar = tree.grammar();
    compound.simple_selectors.iter().all(|simple| match simple {
        SimpleSelector::Type(name) => grammar.names_match(&element.tag_name, name),
        SimpleSelector::Class(class_name) => element.classes().contains(class_name.as_str()),
        SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
        SimpleSelector::Universal => true,
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(*pc, tree, node_id, element),
        SimpleSelector::Attribute(attr_sel) => attr_sel.matches(element, grammar),
    })
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
fn pseudo_class_matches(
    pc: PseudoClass,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    let grammar = tree.grammar();
    let same_type = |c: NodeId| {
        tree.as_element(c)
            .is_some_and(|e| grammar.names_match(&e.tag_name, &element.tag_name))
    };
    match pc {
        PseudoClass::Root => tree.document_element() == Some(node_id),
        PseudoClass::FirstChild => find_previous_element_sibling(tree, node_id).is_none(),
        PseudoClass::LastChild => !tree
            .following_siblings(node_id)
            .any(|s| tree.is_element(s)),
        PseudoClass::OnlyChild => {
            find_previous_element_sibling(tree, node_id).is_none()
                && !tree.following_siblings(node_id).any(|s| tree.is_element(s))
        }
        PseudoClass::FirstOfType => !tree.preceding_siblings(node_id).any(same_type),
        PseudoClass::LastOfType => !tree.following_siblings(node_id).any(same_type),
        PseudoClass::Empty => tree
            .children(node_id)
            .iter()
            .all(|&c| match tree.node_type(c) {
                Some(NodeType::Text(t)) => t.trim().is_empty(),
                Some(NodeType::Comment(_) | NodeType::ProcessingInstruction { .. }) => true,
                _ => false,
            }),
    }
}

/// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
///
/// The immediately preceding element sibling, skipping text and comments.
fn find_previous_element_sibling(tree: &DomTree, node_id: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node_id)
        .find(|&sibling_id| tree.is_element(sibling_id))
}
