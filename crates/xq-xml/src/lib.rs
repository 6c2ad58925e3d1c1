//! Strict XML parser for the xq markup tools.
//!
//! Parses a complete, well-formed XML 1.0 document into an [`xq_dom::DomTree`].
//!
//! # Scope
//!
//! - Elements, attributes (order and quote style preserved), text
//! - The five predefined entities and numeric character references
//! - Comments, CDATA sections, processing instructions (the XML declaration
//!   is kept as a PI with target `xml`)
//! - DOCTYPE declarations, kept as an uninterpreted body
//!
//! # Not Implemented
//!
//! - DTD processing: internal subsets are not parsed and custom entities are
//!   rejected as unknown
//! - Namespaces: prefixed names are plain names
//! - Encodings other than UTF-8

mod error;
mod input;
mod parser;

pub use error::{ParseError, SourceLocation};
pub use parser::{XmlParser, normalize_newlines, parse_xml, parse_xml_bytes};
