//! HTML tokenizer and tolerant tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA and RAWTEXT states
//!   - Tag, attribute (quoted, unquoted, valueless), comment and DOCTYPE states
//!   - Named and numeric character references
//!
//! - **Tree Builder**
//!   - Stack of open elements with end-tag recovery
//!   - Void elements and implied end tags from static tables ([`tags`])
//!   - Self-closing syntax honored inside `svg` and `math`
//!
//! # Not Implemented
//!
//! - Insertion modes, foster parenting, the adoption agency algorithm
//! - Synthesized `html`/`head`/`body` wrappers: top-level fragments stay
//!   siblings under the Document

/// HTML tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{
    HTMLParser, IssueStage, ParseIssue, parse_html, parse_html_with_issues, tags,
};
pub use tokenizer::{HTMLTokenizer, Token};
