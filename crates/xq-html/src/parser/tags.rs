//! Static element tables consulted by the tree builder and the formatter.
//!
//! All names are lowercase; callers compare against lowercased tag names.

/// [§ 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements):
/// elements that never have content or an end tag.
pub static VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// [§ 13.1.2 Raw text elements](https://html.spec.whatwg.org/multipage/syntax.html#raw-text-elements),
/// plus the legacy elements the tokenizer also treats as RAWTEXT.
pub static RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes",
];

/// [§ 13.1.2 Escapable raw text elements](https://html.spec.whatwg.org/multipage/syntax.html#escapable-raw-text-elements):
/// no child elements, but character references are decoded.
pub static ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["title", "textarea"];

/// Elements whose text content is significant as written and must be
/// reproduced verbatim by the formatter.
pub static PREFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style", "listing"];

/// Roots of foreign (SVG, MathML) subtrees where `<x/>` really is empty.
pub static FOREIGN_ROOTS: &[&str] = &["svg", "math"];

/// Start tags that close an open `p` element
/// ([§ 13.1.2.4 Optional tags](https://html.spec.whatwg.org/multipage/syntax.html#optional-tags)).
const P_CLOSERS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

const CELL_CLOSERS: &[&str] = &["td", "th", "tr", "tbody", "thead", "tfoot"];

/// Implied end tags: `(open element, start tags that implicitly close it)`.
///
/// When a start tag arrives and the current node is listed here with that
/// tag among its closers, the current node is popped first.
pub static IMPLIED_END_TAGS: &[(&str, &[&str])] = &[
    ("p", P_CLOSERS),
    ("li", &["li"]),
    ("dt", &["dt", "dd"]),
    ("dd", &["dt", "dd"]),
    ("option", &["option", "optgroup"]),
    ("optgroup", &["optgroup"]),
    ("rt", &["rt", "rp"]),
    ("rp", &["rt", "rp"]),
    ("tr", &["tr", "tbody", "thead", "tfoot"]),
    ("td", CELL_CLOSERS),
    ("th", CELL_CLOSERS),
    ("thead", &["tbody", "tfoot"]),
    ("tbody", &["tbody", "tfoot"]),
    ("colgroup", &["thead", "tbody", "tfoot", "tr"]),
    ("caption", &["colgroup", "thead", "tbody", "tfoot", "tr"]),
    ("head", &["body"]),
];

/// Whether `name` is a void element.
#[must_use]
pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Whether `name` switches the tokenizer to RAWTEXT.
#[must_use]
pub fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// Whether `name` switches the tokenizer to RCDATA.
#[must_use]
pub fn is_escapable_raw_text(name: &str) -> bool {
    ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name)
}

/// Whether the content of `name` must be written back untouched.
#[must_use]
pub fn is_preformatted(name: &str) -> bool {
    PREFORMATTED_ELEMENTS.contains(&name)
}

/// Whether `name` starts an SVG or MathML subtree.
#[must_use]
pub fn is_foreign_root(name: &str) -> bool {
    FOREIGN_ROOTS.contains(&name)
}

/// Whether an open `open` element is implicitly ended by an `incoming` start tag.
#[must_use]
pub fn closed_by_start_tag(open: &str, incoming: &str) -> bool {
    IMPLIED_END_TAGS
        .iter()
        .find(|(tag, _)| *tag == open)
        .is_some_and(|(_, closers)| closers.contains(&incoming))
}
