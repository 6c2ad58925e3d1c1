//! Grammar dispatch from raw bytes to a node tree.

use xq_dom::{DomTree, Grammar};
use xq_html::parse_html_with_issues;
use xq_xml::{ParseError, parse_xml_bytes};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse `bytes` with the given grammar.
///
/// XML is strict and must be UTF-8. HTML never fails: invalid UTF-8 is
/// replaced and structural problems are recovered from, each one logged at
/// debug level by the HTML parser.
///
/// # Errors
///
/// [`ParseError`] for XML input that is not well-formed.
pub fn parse(bytes: &[u8], grammar: Grammar) -> Result<DomTree, ParseError> {
    match grammar {
        Grammar::Xml => parse_xml_bytes(bytes),
        Grammar::Html => {
            let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);
            let text = String::from_utf8_lossy(bytes);
            let (tree, issues) = parse_html_with_issues(&text);
            if !issues.is_empty() {
                log::debug!(target: "engine", "recovered from {} HTML parse errors", issues.len());
            }
            Ok(tree)
        }
    }
}
