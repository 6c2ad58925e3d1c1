//! HTML parser module for tree construction.

/// Tolerant tree builder.
pub mod core;
/// Static element tables: void elements, raw text elements, implied end tags.
pub mod tags;

pub use core::{HTMLParser, IssueStage, ParseIssue, parse_html, parse_html_with_issues};
