//! Formatting parsed XML and HTML documents.

use std::io::{self, Write};

use xq_dom::{DomTree, NodeId};
use xq_format::{ColorMode, FormatOptions, Formatter, format_document, format_node};
use xq_html::parse_html;
use xq_xml::parse_xml;

fn xml(input: &str) -> DomTree {
    parse_xml(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

fn options(indent: Option<i64>, tab: bool) -> FormatOptions {
    FormatOptions::new(indent, tab, ColorMode::Disabled).unwrap()
}

fn render_with(tree: &DomTree, options: &FormatOptions, is_tty: bool) -> String {
    let mut out = Vec::new();
    format_document(tree, options, is_tty, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn render(tree: &DomTree) -> String {
    render_with(tree, &options(None, false), false)
}

/// Remove `ESC [ ... m` sequences.
fn strip_ansi(colored: &str) -> String {
    let mut plain = String::new();
    let mut chars = colored.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    plain
}

#[test]
fn test_reindents_children() {
    let tree = xml("<a><b>1</b><c>2</c></a>");
    assert_eq!(render(&tree), "<a>\n  <b>1</b>\n  <c>2</c>\n</a>\n");
}

#[test]
fn test_indent_width_and_tab() {
    let tree = xml("<a><b><c/></b></a>");
    assert_eq!(
        render_with(&tree, &options(Some(4), false), false),
        "<a>\n    <b>\n        <c/>\n    </b>\n</a>\n"
    );
    assert_eq!(
        render_with(&tree, &options(None, true), false),
        "<a>\n\t<b>\n\t\t<c/>\n\t</b>\n</a>\n"
    );
}

#[test]
fn test_existing_whitespace_is_replaced() {
    let tree = xml("<a>\n\n      <b>1</b>    <c>  2 </c>\n</a>");
    assert_eq!(render(&tree), "<a>\n  <b>1</b>\n  <c>  2 </c>\n</a>\n");
}

#[test]
fn test_xml_document() {
    let tree = xml(concat!(
        "<?xml version=\"1.0\"?>\n<!DOCTYPE r>\n<!--c-->\n",
        "<r a=\"1\" b='2'><x/><y></y>text<![CDATA[<z>]]><?pi data?></r>",
    ));
    assert_eq!(
        render(&tree),
        concat!(
            "<?xml version=\"1.0\"?>\n",
            "<!DOCTYPE r>\n",
            "<!--c-->\n",
            "<r a=\"1\" b='2'>\n",
            "  <x/>\n",
            "  <y></y>\n",
            "  text\n",
            "  <![CDATA[<z>]]>\n",
            "  <?pi data?>\n",
            "</r>\n",
        )
    );
}

#[test]
fn test_xml_escaping() {
    let tree = xml(r#"<a t="&lt;&amp;&quot;'">1 &lt; 2 &gt; 0 &amp;</a>"#);
    assert_eq!(render(&tree), "<a t=\"&lt;&amp;&quot;&apos;\">1 &lt; 2 &gt; 0 &amp;</a>\n");
}

#[test]
fn test_html_document() {
    let tree = parse_html(concat!(
        "<!DOCTYPE html><html><body>",
        "<p class=x hidden title='t'>a &amp; b<br>c</p>",
        "<pre>  keep\n   this <b>x</b></pre>",
        "<script>if (a<b && c) {}</script>",
        "</body></html>",
    ));
    assert_eq!(
        render(&tree),
        concat!(
            "<!DOCTYPE html>\n",
            "<html>\n",
            "  <body>\n",
            "    <p class=\"x\" hidden title='t'>\n",
            "      a &amp; b\n",
            "      <br>\n",
            "      c\n",
            "    </p>\n",
            "    <pre>  keep\n   this <b>x</b></pre>\n",
            "    <script>if (a<b && c) {}</script>\n",
            "  </body>\n",
            "</html>\n",
        )
    );
}

#[test]
fn test_html_fragments_stay_siblings() {
    let tree = parse_html("<p>one</p>\n<p>two</p>\n");
    assert_eq!(render(&tree), "<p>one</p>\n<p>two</p>\n");
}

#[test]
fn test_colors() {
    let tree = xml(r#"<a k="v"><!--c--><b>t</b></a>"#);
    let plain = render(&tree);

    let forced = FormatOptions::new(None, false, ColorMode::Forced).unwrap();
    let colored = render_with(&tree, &forced, false);
    assert!(colored.contains("\x1b["));
    assert_eq!(strip_ansi(&colored), plain);

    let default = FormatOptions::new(None, false, ColorMode::Default).unwrap();
    assert_eq!(render_with(&tree, &default, false), plain);
    assert!(render_with(&tree, &default, true).contains("\x1b["));

    let disabled = FormatOptions::new(None, false, ColorMode::Disabled).unwrap();
    assert_eq!(render_with(&tree, &disabled, true), plain);
}

#[test]
fn test_format_node_restarts_indentation() {
    let tree = xml("<r><q><a><b>1</b><c/></a></q></r>");
    let r = tree.document_element().unwrap();
    let q = tree.children(r)[0];
    let a = tree.children(q)[0];
    let mut out = Vec::new();
    format_node(&tree, a, &options(None, false), false, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "<a>\n  <b>1</b>\n  <c/>\n</a>\n");

    let mut whole = Vec::new();
    format_node(&tree, NodeId::ROOT, &options(None, false), false, &mut whole).unwrap();
    assert_eq!(String::from_utf8(whole).unwrap(), render(&tree));
}

#[test]
fn test_write_value() {
    let tree = xml("<a/>");
    let mut out = Vec::new();
    Formatter::new(&tree, &options(None, false), false)
        .write_value("a < b", &mut out)
        .unwrap();
    assert_eq!(out, b"a < b\n");
}

#[test]
fn test_formatting_is_idempotent() {
    let source = "<r>\n<a x='1'>t<!--c--><b/></a>\n<c>  </c><d>x</d></r>";
    let once = render(&xml(source));
    let twice = render(&xml(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_attribute_newline_reference_survives_reformatting() {
    let once = render(&xml("<a k=\"x&#10;y\"/>"));
    assert_eq!(once, "<a k=\"x&#10;y\"/>\n");
    assert_eq!(render(&xml(&once)), once);
}

#[test]
fn test_text_carriage_return_reference_survives_reformatting() {
    let once = render(&xml("<a>x&#13;y</a>"));
    assert_eq!(once, "<a>x&#13;y</a>\n");
    assert_eq!(render(&xml(&once)), once);
}

#[test]
fn test_literal_attribute_whitespace_is_kept() {
    let tree = xml("<a k=\"x\ny\tz\"/>");
    let a = tree.document_element().unwrap();
    assert_eq!(tree.as_element(a).unwrap().attrs[0].value, "x\ny\tz");
    assert_eq!(render(&tree), "<a k=\"x&#10;y&#9;z\"/>\n");
}

#[test]
fn test_html_raw_text_is_not_escaped() {
    let once = render(&parse_html("<iframe>a&b</iframe><xmp>1 < 2</xmp>"));
    assert_eq!(once, "<iframe>a&b</iframe>\n<xmp>1 < 2</xmp>\n");
    assert_eq!(render(&parse_html(&once)), once);
}

/// Counts `write` calls and fails after `fail_after` of them.
struct CountingSink {
    writes: usize,
    fail_after: usize,
}

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.writes == self.fail_after {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_one_write_per_line() {
    let tree = xml("<a><b>1</b><c>2</c></a>");
    let mut sink = CountingSink {
        writes: 0,
        fail_after: usize::MAX,
    };
    format_document(&tree, &options(None, false), false, &mut sink).unwrap();
    assert_eq!(sink.writes, 4);
}

#[test]
fn test_sink_error_stops_output() {
    let tree = xml("<a><b>1</b><c>2</c></a>");
    let mut sink = CountingSink {
        writes: 0,
        fail_after: 1,
    };
    let err = format_document(&tree, &options(None, false), false, &mut sink).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    assert_eq!(sink.writes, 1);
}
