//! CSS selector matching against parsed trees.

use xq_dom::{DomTree, NodeType};
use xq_html::parse_html;
use xq_query::{QueryError, QueryLanguage, QueryMode, evaluate};
use xq_xml::parse_xml;

/// Tag names of every match, each followed by its `id` when present.
fn select(tree: &DomTree, selector: &str) -> Vec<String> {
    let result = evaluate(tree, selector, QueryLanguage::Css, QueryMode::Multi)
        .unwrap_or_else(|e| panic!("selector {selector} failed: {e}"));
    result
        .selections()
        .iter()
        .map(|s| match tree.node_type(s.node()) {
            Some(NodeType::Element(e)) => match e.id() {
                Some(id) => format!("{}#{id}", e.tag_name),
                None => e.tag_name.clone(),
            },
            other => panic!("Expected an element, got {other:?}"),
        })
        .collect()
}

fn xml(input: &str) -> DomTree {
    parse_xml(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

#[test]
fn test_class_selector() {
    let tree = parse_html(r#"<div><span class="k">v</span></div>"#);
    let result = evaluate(&tree, ".k", QueryLanguage::Css, QueryMode::Multi).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.selections()[0].string_value(&tree), "v");
}

#[test]
fn test_type_universal_and_id() {
    let tree = xml(r#"<r><a id="x1"/><b id="x2"><a id="x3"/></b></r>"#);
    assert_eq!(select(&tree, "a"), vec!["a#x1", "a#x3"]);
    assert_eq!(select(&tree, "b > *"), vec!["a#x3"]);
    assert_eq!(select(&tree, "*").len(), 4);
}

#[test]
fn test_combinators() {
    let tree = xml(concat!(
        r#"<r><h id="h"/><p id="p1"/><x/><p id="p2"/>"#,
        r#"<d><p id="p3"><s id="s"/></p></d></r>"#,
    ));
    assert_eq!(select(&tree, "r p"), vec!["p#p1", "p#p2", "p#p3"]);
    assert_eq!(select(&tree, "r > p"), vec!["p#p1", "p#p2"]);
    assert_eq!(select(&tree, "h + p"), vec!["p#p1"]);
    assert_eq!(select(&tree, "h ~ p"), vec!["p#p1", "p#p2"]);
    assert_eq!(select(&tree, "d s"), vec!["s#s"]);
    assert_eq!(select(&tree, "r>d>p>s"), vec!["s#s"]);
}

#[test]
fn test_combinators_backtrack() {
    // The nearest `p` ancestor of `s` is not a child of `d`; the outer one is.
    let tree = xml(r#"<d><p id="outer"><p id="inner"><s/></p></p></d>"#);
    assert_eq!(select(&tree, "d > p s"), vec!["s"]);

    // The nearest preceding `b` has no `a` before it; an earlier one does.
    let tree = xml(r#"<r><a/><b id="1"/><c/><b id="2"/><t/></r>"#);
    assert_eq!(select(&tree, "a + b ~ t"), vec!["t"]);
}

#[test]
fn test_next_sibling_skips_text() {
    let tree = xml("<r><a/> text <!--c--><b/></r>");
    assert_eq!(select(&tree, "a + b"), vec!["b"]);
}

#[test]
fn test_attribute_selectors() {
    let tree = xml(concat!(
        r#"<r><e id="1" lang="en-US"/><e id="2" lang="en"/>"#,
        r#"<e id="3" href="https://x.org/a.png"/><e id="4" class="btn active"/></r>"#,
    ));
    assert_eq!(select(&tree, "[lang]"), vec!["e#1", "e#2"]);
    assert_eq!(select(&tree, "[lang=en]"), vec!["e#2"]);
    assert_eq!(select(&tree, "[lang|=en]"), vec!["e#1", "e#2"]);
    assert_eq!(select(&tree, r#"[href^="https"]"#), vec!["e#3"]);
    assert_eq!(select(&tree, "[href$='.png']"), vec!["e#3"]);
    assert_eq!(select(&tree, "[href*=x]"), vec!["e#3"]);
    assert_eq!(select(&tree, "[class~=active]"), vec!["e#4"]);
    assert_eq!(select(&tree, ".active.btn"), vec!["e#4"]);
}

#[test]
fn test_structural_pseudo_classes() {
    let tree = xml(r#"<r><u id="a"><i id="1"/><i id="2"/></u><u id="b"><i id="3"/></u><u id="c"> <!--x--> </u></r>"#);
    assert_eq!(select(&tree, "i:first-child"), vec!["i#1", "i#3"]);
    assert_eq!(select(&tree, "i:last-child"), vec!["i#2", "i#3"]);
    assert_eq!(select(&tree, "i:only-child"), vec!["i#3"]);
    assert_eq!(select(&tree, ":empty"), vec!["i#1", "i#2", "i#3", "u#c"]);
    assert_eq!(select(&tree, ":root"), vec!["r"]);
    assert_eq!(select(&tree, "u:last-of-type"), vec!["u#c"]);
}

#[test]
fn test_selector_list_is_in_document_order() {
    let tree = xml("<r><a/><b/><a/></r>");
    assert_eq!(select(&tree, "b, a"), vec!["a", "b", "a"]);
    assert_eq!(select(&tree, "a, a"), vec!["a", "a"]);
}

#[test]
fn test_html_names_match_case_insensitively() {
    let tree = parse_html(r#"<DIV Data-X="1"><P>text</P></DIV>"#);
    assert_eq!(select(&tree, "DIV > p"), vec!["p"]);
    assert_eq!(select(&tree, "[data-x='1']"), vec!["div"]);

    let tree = xml("<Div/>");
    assert!(select(&tree, "div").is_empty());
}

#[test]
fn test_single_mode() {
    let tree = xml("<r><a id=\"1\"/><a id=\"2\"/></r>");
    let multi = evaluate(&tree, "a", QueryLanguage::Css, QueryMode::Multi).unwrap();
    let single = evaluate(&tree, "a", QueryLanguage::Css, QueryMode::Single).unwrap();
    assert_eq!(single.selections(), &multi.selections()[..1]);

    match evaluate(&tree, "zzz", QueryLanguage::Css, QueryMode::Single) {
        Err(QueryError::NoMatch { .. }) => {}
        other => panic!("Expected NoMatch, got {other:?}"),
    }
}

#[test]
fn test_unsupported_syntax() {
    let tree = xml("<r/>");
    for selector in ["", "a:hover", "p::first-line", "li:nth-child(2)", "a >", "a !b"] {
        match evaluate(&tree, selector, QueryLanguage::Css, QueryMode::Multi) {
            Err(QueryError::InvalidExpression { expression, .. }) => {
                assert_eq!(expression, selector);
            }
            other => panic!("Expected InvalidExpression for {selector:?}, got {other:?}"),
        }
    }
}
