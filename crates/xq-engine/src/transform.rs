//! Turning a parsed tree into output: either the formatted document, or the
//! rendered results of a query.

use std::io::Write;

use xq_dom::{DomTree, NodeType};
use xq_format::{FormatOptions, Formatter};
use xq_query::{Matched, QueryLanguage, QueryMode, Selection, evaluate};

use crate::error::Error;

/// A query to run instead of formatting the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// The expression as given on the command line.
    pub expression: String,
    /// XPath or CSS.
    pub language: QueryLanguage,
    /// First match only, or all of them.
    pub mode: QueryMode,
}

impl QueryRequest {
    /// A query in `language` and `mode`.
    #[must_use]
    pub fn new(expression: impl Into<String>, language: QueryLanguage, mode: QueryMode) -> Self {
        Self {
            expression: expression.into(),
            language,
            mode,
        }
    }
}

/// Write `tree` to `sink`: formatted whole, or narrowed by `query`.
///
/// Each match renders on its own: elements and other nodes as formatted
/// subtrees with indentation restarting at zero, attributes as their value,
/// text as its trimmed content, the Document as the whole document. Scalar
/// XPath results are written as a single line.
///
/// # Errors
///
/// [`Error::Query`] when the expression is invalid or single mode found
/// nothing, before anything is written. Sink failures as [`Error::Pipeline`].
pub fn transform<W: Write + ?Sized>(
    tree: &DomTree,
    query: Option<&QueryRequest>,
    options: &FormatOptions,
    is_tty: bool,
    sink: &mut W,
) -> Result<(), Error> {
    let formatter = Formatter::new(tree, options, is_tty);
    let Some(query) = query else {
        log::debug!(target: "engine", "mode: format");
        formatter.write_document(sink)?;
        return Ok(());
    };

    log::debug!(target: "engine", "mode: {} {} query", query.mode, query.language);
    let result = evaluate(tree, &query.expression, query.language, query.mode)?;

    match &result.matched {
        Matched::Value(value) => formatter.write_value(value, sink)?,
        Matched::Nodes(selections) => {
            for &selection in selections {
                write_selection(&formatter, tree, selection, sink)?;
            }
        }
    }
    Ok(())
}

fn write_selection<W: Write + ?Sized>(
    formatter: &Formatter<'_>,
    tree: &DomTree,
    selection: Selection,
    sink: &mut W,
) -> Result<(), Error> {
    match selection {
        Selection::Attribute { .. } => {
            if let Some(attr) = selection.attribute(tree) {
                formatter.write_value(&attr.value, sink)?;
            }
        }
        Selection::Node(id) => match tree.node_type(id) {
            Some(NodeType::Text(text)) => formatter.write_value(text.trim(), sink)?,
            Some(_) => formatter.write_node(id, sink)?,
            None => {}
        },
    }
    Ok(())
}
