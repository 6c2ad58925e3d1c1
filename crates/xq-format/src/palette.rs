//! Terminal colors for formatted markup.

use std::fmt::Write;

use owo_colors::{OwoColorize, Style};

/// What a span of output represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `<`, `>`, `</`, `/>` and `=`.
    Delimiter,
    /// Element names.
    ElementName,
    /// Attribute names.
    AttributeName,
    /// Attribute values, including their quotes.
    AttributeValue,
    /// Character data.
    Text,
    /// Comments, doctype, processing instructions and CDATA sections.
    Comment,
}

impl Category {
    fn style(self) -> Style {
        match self {
            Self::Delimiter => Style::new().blue(),
            Self::ElementName => Style::new().cyan().bold(),
            Self::AttributeName => Style::new().yellow(),
            Self::AttributeValue => Style::new().green(),
            Self::Text => Style::new().white(),
            Self::Comment => Style::new().bright_black(),
        }
    }
}

/// Appends spans to a line buffer, wrapped in ANSI codes when enabled.
///
/// Each span is reset before the next one starts, so colors never bleed
/// across categories or lines.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    /// A painter that colors when `enabled`.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether color codes are emitted.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Append `text` in `category` to `out`.
    pub fn paint(&self, out: &mut String, category: Category, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.enabled {
            // Writing to a String cannot fail.
            let _ = write!(out, "{}", text.style(category.style()));
        } else {
            out.push_str(text);
        }
    }
}
