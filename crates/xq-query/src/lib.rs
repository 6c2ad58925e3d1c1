//! Query evaluation over xq node trees.
//!
//! Two independent languages select nodes from a parsed [`DomTree`]:
//!
//! - [`xpath`]: an XPath 1.0 subset
//! - [`css`]: a Selectors Level 4 subset
//!
//! Both compile the whole expression before touching the tree, so malformed
//! input fails with [`QueryError::InvalidExpression`] without traversal.
//! Results come back in document order without duplicates.

pub mod css;
mod error;
mod result;
pub mod xpath;

pub use error::QueryError;
pub use result::{Matched, QueryLanguage, QueryMode, QueryResult, Selection};

use xq_dom::DomTree;

/// Evaluate `expression` in `language` and apply `mode`.
///
/// In [`QueryMode::Single`] only the first match is kept. A scalar XPath
/// value counts as one match.
///
/// # Errors
///
/// - [`QueryError::InvalidExpression`] if the expression does not parse or
///   uses unsupported syntax.
/// - [`QueryError::NoMatch`] in single mode when nothing matched.
pub fn evaluate(
    tree: &DomTree,
    expression: &str,
    language: QueryLanguage,
    mode: QueryMode,
) -> Result<QueryResult, QueryError> {
    let matched = match language {
        QueryLanguage::XPath => xpath::evaluate_xpath(tree, expression)?,
        QueryLanguage::Css => css::evaluate_css(tree, expression)?,
    };

    let matched = match (mode, matched) {
        (QueryMode::Single, Matched::Nodes(mut nodes)) => {
            if nodes.is_empty() {
                return Err(QueryError::NoMatch {
                    expression: expression.to_string(),
                });
            }
            nodes.truncate(1);
            Matched::Nodes(nodes)
        }
        (_, matched) => matched,
    };

    let result = QueryResult { mode, matched };
    log::debug!(
        target: "query",
        "{language} `{expression}` ({mode}): {} match(es)",
        result.len()
    );
    Ok(result)
}
