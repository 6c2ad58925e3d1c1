//! Pretty-printer for xq node trees.
//!
//! Re-indents markup, one [`IndentUnit`] per nesting level, and optionally
//! colors it for a terminal. Output goes to any [`std::io::Write`] sink one
//! line at a time.
//!
//! # Layout
//!
//! - Childless elements: `<br>` (HTML void), `<a/>` (written self-closing),
//!   `<a></a>` (everything else)
//! - A single text child stays inline: `<b>1</b>`
//! - Anything else is a block: one child per line, whitespace-only text
//!   dropped and other text trimmed
//! - HTML `pre`, `textarea`, `script`, `style` and `listing` are reproduced
//!   exactly
//!
//! Comments, CDATA, processing instructions and doctypes are written
//! literally on their own lines.

mod escape;
mod options;
mod palette;
mod writer;

pub use escape::{escape_attribute, escape_text};
pub use options::{
    ColorMode, ConfigError, DEFAULT_INDENT, FormatOptions, IndentUnit, MAX_INDENT, MIN_INDENT,
};
pub use palette::{Category, Painter};
pub use writer::Formatter;

use std::io::{self, Write};

use xq_dom::{DomTree, NodeId};

/// Render the whole of `tree` into `sink`.
///
/// # Errors
///
/// Any error returned by `sink`.
pub fn format_document<W: Write + ?Sized>(
    tree: &DomTree,
    options: &FormatOptions,
    is_tty: bool,
    sink: &mut W,
) -> io::Result<()> {
    Formatter::new(tree, options, is_tty).write_document(sink)
}

/// Render the subtree at `id` into `sink`, indentation restarting at zero.
///
/// # Errors
///
/// Any error returned by `sink`.
pub fn format_node<W: Write + ?Sized>(
    tree: &DomTree,
    id: NodeId,
    options: &FormatOptions,
    is_tty: bool,
    sink: &mut W,
) -> io::Result<()> {
    Formatter::new(tree, options, is_tty).write_node(id, sink)
}
