//! Integration tests for the tolerant HTML tree builder.

use xq_dom::{DomTree, Grammar, NodeId, NodeType, QuoteStyle};
use xq_html::{IssueStage, parse_html, parse_html_with_issues};

/// Render a subtree compactly: `tag[child,child]`, text as `"text"`.
fn shape(tree: &DomTree, id: NodeId) -> String {
    let children = || {
        tree.children(id)
            .iter()
            .map(|&c| shape(tree, c))
            .collect::<Vec<_>>()
            .join(",")
    };
    match tree.node_type(id) {
        Some(NodeType::Document) => children(),
        Some(NodeType::Element(data)) if tree.children(id).is_empty() => data.tag_name.clone(),
        Some(NodeType::Element(data)) => format!("{}[{}]", data.tag_name, children()),
        Some(NodeType::Text(text)) => format!("\"{text}\""),
        Some(NodeType::Comment(text)) => format!("<!--{text}-->"),
        Some(NodeType::CData(text)) => format!("<![CDATA[{text}]]>"),
        Some(NodeType::Doctype(text)) => format!("!doctype {text}"),
        Some(NodeType::ProcessingInstruction { target, .. }) => format!("?{target}"),
        None => String::new(),
    }
}

fn parse_shape(input: &str) -> String {
    let tree = parse_html(input);
    shape(&tree, NodeId::ROOT)
}

#[test]
fn test_tree_grammar_is_html() {
    assert_eq!(parse_html("<p>").grammar(), Grammar::Html);
}

#[test]
fn test_simple_nesting() {
    assert_eq!(
        parse_shape("<div><p>Hello</p></div>"),
        "div[p[\"Hello\"]]"
    );
}

#[test]
fn test_fragments_stay_siblings_under_document() {
    let tree = parse_html("<b>1</b><i>2</i>");
    assert_eq!(shape(&tree, NodeId::ROOT), "b[\"1\"],i[\"2\"]");
    assert_eq!(tree.children(NodeId::ROOT).len(), 2);
}

#[test]
fn test_doctype_and_document() {
    assert_eq!(
        parse_shape("<!DOCTYPE html><html><body>x</body></html>"),
        "!doctype html,html[body[\"x\"]]"
    );
}

// ========== implied end tags ==========

#[test]
fn test_li_closes_previous_li() {
    assert_eq!(
        parse_shape("<ul><li>a<li>b</ul>"),
        "ul[li[\"a\"],li[\"b\"]]"
    );
}

#[test]
fn test_block_start_closes_paragraph() {
    assert_eq!(
        parse_shape("<p>one<p>two<div>three</div>"),
        "p[\"one\"],p[\"two\"],div[\"three\"]"
    );
}

#[test]
fn test_table_cells_and_rows_close_implicitly() {
    assert_eq!(
        parse_shape("<table><tr><td>1<td>2<tr><td>3</table>"),
        "table[tr[td[\"1\"],td[\"2\"]],tr[td[\"3\"]]]"
    );
}

#[test]
fn test_nested_list_is_not_closed_by_inner_li() {
    assert_eq!(
        parse_shape("<ul><li>a<ul><li>b</ul></ul>"),
        "ul[li[\"a\",ul[li[\"b\"]]]]"
    );
}

// ========== void and self-closing ==========

#[test]
fn test_void_elements_take_no_children() {
    assert_eq!(parse_shape("<p>a<br>b</p>"), "p[\"a\",br,\"b\"]");
    assert_eq!(parse_shape("<img src=x.png>after"), "img,\"after\"");
}

#[test]
fn test_trailing_solidus_ignored_on_html_elements() {
    let (tree, issues) = parse_html_with_issues("<div/>text");
    assert_eq!(shape(&tree, NodeId::ROOT), "div[\"text\"]");
    assert!(issues.iter().any(|i| i.stage == IssueStage::TreeBuilder));
}

#[test]
fn test_self_closing_honored_in_svg() {
    let tree = parse_html("<svg><path d=\"M0\"/><circle/></svg>");
    assert_eq!(shape(&tree, NodeId::ROOT), "svg[path,circle]");
    let svg = tree.document_element().unwrap();
    let path = tree.children(svg)[0];
    assert!(tree.as_element(path).unwrap().self_closing);
}

#[test]
fn test_cdata_outside_foreign_content_is_a_comment() {
    assert_eq!(parse_shape("<p><![CDATA[x]]></p>"), "p[<!--[CDATA[x]]-->]");
    assert_eq!(
        parse_shape("<svg><![CDATA[x]]></svg>"),
        "svg[<![CDATA[x]]>]"
    );
}

// ========== recovery ==========

#[test]
fn test_unbalanced_end_tag_is_ignored() {
    let (tree, issues) = parse_html_with_issues("<div>x</span></div>");
    assert_eq!(shape(&tree, NodeId::ROOT), "div[\"x\"]");
    assert!(issues.iter().any(|i| i.message == "unexpected-end-tag"));
}

#[test]
fn test_unclosed_elements_close_at_eof() {
    assert_eq!(parse_shape("<div><span>text"), "div[span[\"text\"]]");
}

#[test]
fn test_end_tag_closes_unclosed_children() {
    assert_eq!(parse_shape("<div><p>a</div>b"), "div[p[\"a\"]],\"b\"");
}

#[test]
fn test_raw_text_content_kept_verbatim() {
    assert_eq!(
        parse_shape("<script>a<b && c</script>"),
        "script[\"a<b && c\"]"
    );
}

#[test]
fn test_attributes_keep_order_and_quotes() {
    let tree = parse_html("<a href=x title='t' hidden>");
    let a = tree.document_element().unwrap();
    let attrs = &tree.as_element(a).unwrap().attrs;
    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["href", "title", "hidden"]);
    assert_eq!(attrs[0].quote, QuoteStyle::Unquoted);
    assert_eq!(attrs[1].quote, QuoteStyle::Single);
    assert_eq!(attrs[2].quote, QuoteStyle::Absent);
}

#[test]
fn test_text_runs_merge_into_one_node() {
    let tree = parse_html("<p>a &amp; b</p>");
    let p = tree.document_element().unwrap();
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "a & b");
}

#[test]
fn test_empty_input_is_just_a_document() {
    let tree = parse_html("");
    assert!(tree.is_empty());
}
