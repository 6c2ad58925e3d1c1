//! XPath 1.0 subset.
//!
//! [XPath 1.0](https://www.w3.org/TR/xpath-10/)
//!
//! Supported: all axes except `namespace`, name/`*`/node-type tests,
//! predicates, the operators of § 3, and the functions listed on
//! [`ast::Function`]. Variables, namespaces and the remaining core functions
//! are rejected as invalid expressions.

pub mod ast;
mod eval;
mod lexer;
mod parser;

pub use eval::{Evaluator, Value};
pub use lexer::{Lexer, Spanned, Token};
pub use parser::parse;

use xq_dom::DomTree;

use crate::error::QueryError;
use crate::result::Matched;

/// Parse and evaluate `expression` with the Document as context node.
///
/// A node-set yields [`Matched::Nodes`]; strings, numbers and booleans yield
/// [`Matched::Value`] holding their XPath string conversion.
///
/// # Errors
///
/// [`QueryError::InvalidExpression`] for syntax errors, unsupported features,
/// and operands of the wrong type; all are found before the tree is searched.
pub fn evaluate_xpath(tree: &DomTree, expression: &str) -> Result<Matched, QueryError> {
    let expr = parse(expression)?;
    let evaluator = Evaluator::new(tree, expression);
    let value = evaluator.evaluate(&expr)?;
    Ok(match value {
        Value::Nodes(nodes) => Matched::Nodes(nodes),
        scalar => Matched::Value(evaluator.string_of(&scalar)),
    })
}
