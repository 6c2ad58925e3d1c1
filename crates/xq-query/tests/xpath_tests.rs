//! XPath evaluation against parsed XML and HTML trees.

use xq_dom::{DomTree, NodeId, NodeType};
use xq_html::parse_html;
use xq_query::{Matched, QueryError, QueryLanguage, QueryMode, Selection, evaluate};
use xq_xml::parse_xml;

fn xml(input: &str) -> DomTree {
    parse_xml(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

/// Short label for a selection: tag name, `@name=value`, `text:..` and so on.
fn describe(tree: &DomTree, selection: Selection) -> String {
    if let Some(attr) = selection.attribute(tree) {
        return format!("@{}={}", attr.name, attr.value);
    }
    match tree.node_type(selection.node()) {
        Some(NodeType::Document) => "/".to_string(),
        Some(NodeType::Element(e)) => e.tag_name.clone(),
        Some(NodeType::Text(t)) => format!("text:{t}"),
        Some(NodeType::CData(t)) => format!("cdata:{t}"),
        Some(NodeType::Comment(c)) => format!("comment:{c}"),
        Some(NodeType::ProcessingInstruction { target, .. }) => format!("pi:{target}"),
        Some(NodeType::Doctype(_)) => "doctype".to_string(),
        None => panic!("Expected a node for {selection:?}"),
    }
}

fn select(tree: &DomTree, expression: &str) -> Vec<String> {
    let result = evaluate(tree, expression, QueryLanguage::XPath, QueryMode::Multi)
        .unwrap_or_else(|e| panic!("query {expression} failed: {e}"));
    match result.matched {
        Matched::Nodes(nodes) => nodes.into_iter().map(|s| describe(tree, s)).collect(),
        Matched::Value(v) => panic!("Expected a node-set for {expression}, got value {v:?}"),
    }
}

/// String-values of the selected nodes.
fn texts(tree: &DomTree, expression: &str) -> Vec<String> {
    let result = evaluate(tree, expression, QueryLanguage::XPath, QueryMode::Multi)
        .unwrap_or_else(|e| panic!("query {expression} failed: {e}"));
    result
        .selections()
        .iter()
        .map(|s| s.string_value(tree))
        .collect()
}

fn scalar(tree: &DomTree, expression: &str) -> String {
    match evaluate(tree, expression, QueryLanguage::XPath, QueryMode::Multi) {
        Ok(result) => match result.matched {
            Matched::Value(v) => v,
            Matched::Nodes(n) => panic!("Expected a value for {expression}, got {n:?}"),
        },
        Err(e) => panic!("query {expression} failed: {e}"),
    }
}

fn invalid(tree: &DomTree, expression: &str) {
    match evaluate(tree, expression, QueryLanguage::XPath, QueryMode::Multi) {
        Err(QueryError::InvalidExpression { .. }) => {}
        other => panic!("Expected InvalidExpression for {expression}, got {other:?}"),
    }
}

const ITEMS: &str = "<r><i>1</i><i>2</i><i>3</i></r>";

#[test]
fn test_attribute_predicate() {
    let tree = xml(r#"<a><b id="x">1</b><b id="y">2</b></a>"#);
    let result = evaluate(&tree, "//b[@id='y']", QueryLanguage::XPath, QueryMode::Multi).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.selections()[0].string_value(&tree), "2");
}

#[test]
fn test_positional_predicates() {
    let tree = xml(ITEMS);
    assert_eq!(texts(&tree, "//i[2]"), vec!["2"]);
    assert_eq!(texts(&tree, "//i[last()]"), vec!["3"]);
    assert_eq!(texts(&tree, "//i[position() < 3]"), vec!["1", "2"]);
    assert_eq!(texts(&tree, "/r/i[1]"), vec!["1"]);
    assert_eq!(texts(&tree, "(//i)[last() - 1]"), vec!["2"]);
}

#[test]
fn test_reverse_axis_positions_count_outward() {
    let tree = xml(ITEMS);
    assert_eq!(texts(&tree, "//i[3]/preceding-sibling::i[1]"), vec!["2"]);
    // The result is still in document order.
    assert_eq!(texts(&tree, "//i[3]/preceding-sibling::i"), vec!["1", "2"]);
}

#[test]
fn test_ancestor_and_parent() {
    let tree = xml("<a><b><c/></b></a>");
    assert_eq!(select(&tree, "//c/ancestor::*"), vec!["a", "b"]);
    assert_eq!(select(&tree, "//c/ancestor-or-self::*"), vec!["a", "b", "c"]);
    assert_eq!(select(&tree, "//c/.."), vec!["b"]);
    assert_eq!(select(&tree, "//c/parent::b/parent::a"), vec!["a"]);
}

#[test]
fn test_following_and_preceding() {
    let tree = xml("<r><a><x/></a><b/><c><d/></c></r>");
    assert_eq!(select(&tree, "//x/following::*"), vec!["b", "c", "d"]);
    assert_eq!(select(&tree, "//d/preceding::*"), vec!["a", "x", "b"]);
    assert_eq!(select(&tree, "//b/following-sibling::*"), vec!["c"]);
}

#[test]
fn test_attribute_axis() {
    let tree = xml(r#"<a><b id="x" k="1"/><b id="y"/></a>"#);
    assert_eq!(select(&tree, "//b/@id"), vec!["@id=x", "@id=y"]);
    assert_eq!(select(&tree, "//b[1]/@*"), vec!["@id=x", "@k=1"]);
    assert_eq!(select(&tree, "//b[not(@k)]"), vec!["b"]);
    assert_eq!(select(&tree, "//@k/.."), vec!["b"]);
}

#[test]
fn test_node_type_tests() {
    let tree = xml("<r>x<![CDATA[y]]><!--c--><?t d?><?u e?><b/>z</r>");
    assert_eq!(
        select(&tree, "/r/text()"),
        vec!["text:x", "cdata:y", "text:z"]
    );
    assert_eq!(select(&tree, "/r/comment()"), vec!["comment:c"]);
    assert_eq!(select(&tree, "/r/processing-instruction('t')"), vec!["pi:t"]);
    assert_eq!(select(&tree, "/r/processing-instruction()"), vec!["pi:t", "pi:u"]);
    assert_eq!(scalar(&tree, "count(/r/node())"), "7");
}

#[test]
fn test_root_path() {
    let tree = xml("<a/>");
    assert_eq!(select(&tree, "/"), vec!["/"]);
    assert_eq!(select(&tree, "/*"), vec!["a"]);
    assert_eq!(select(&tree, "/a/self::a"), vec!["a"]);
}

#[test]
fn test_comparisons() {
    let tree = xml(ITEMS);
    assert_eq!(texts(&tree, "//i[. > 1]"), vec!["2", "3"]);
    assert_eq!(texts(&tree, "//i[. = '2' or . = '3']"), vec!["2", "3"]);
    assert_eq!(texts(&tree, "//i[. != 2]"), vec!["1", "3"]);
    assert_eq!(texts(&tree, "//i[. >= 2 and . <= 2]"), vec!["2"]);
    assert_eq!(texts(&tree, "/r[i = 3]"), vec!["123"]);
    assert_eq!(texts(&tree, "//i[1 < .]"), vec!["2", "3"]);
}

#[test]
fn test_union_is_in_document_order() {
    let tree = xml("<a><b/><c/></a>");
    assert_eq!(select(&tree, "//c | //a | //c"), vec!["a", "c"]);
}

#[test]
fn test_scalar_results() {
    let tree = xml(ITEMS);
    assert_eq!(scalar(&tree, "count(//i)"), "3");
    assert_eq!(scalar(&tree, "string(/r/i[2])"), "2");
    assert_eq!(scalar(&tree, "name(/*)"), "r");
    assert_eq!(scalar(&tree, "//missing > 1"), "false");
    assert_eq!(scalar(&tree, "1 div 0"), "Infinity");
    assert_eq!(scalar(&tree, "7 mod 3"), "1");
    assert_eq!(scalar(&tree, "0.5 * 3"), "1.5");
    assert_eq!(scalar(&tree, "-(2)"), "-2");
    assert_eq!(scalar(&tree, "number('x')"), "NaN");
    assert_eq!(scalar(&tree, "contains('abc', 'b')"), "true");
    assert_eq!(scalar(&tree, "starts-with('abc', 'c')"), "false");
    assert_eq!(scalar(&tree, "normalize-space('  a   b ')"), "a b");
    assert_eq!(scalar(&tree, "concat('a', 'b', 'c')"), "abc");
    assert_eq!(scalar(&tree, "substring-before('2024-10', '-')"), "2024");
    assert_eq!(scalar(&tree, "substring-after('2024-10', '-')"), "10");
    assert_eq!(scalar(&tree, "string-length('héllo')"), "5");
    assert_eq!(scalar(&tree, "boolean(//i)"), "true");
    assert_eq!(scalar(&tree, "local-name(/r)"), "r");
}

#[test]
fn test_single_mode() {
    let tree = xml(ITEMS);
    let single = evaluate(&tree, "//i", QueryLanguage::XPath, QueryMode::Single).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single.selections()[0].string_value(&tree), "1");

    match evaluate(&tree, "//missing", QueryLanguage::XPath, QueryMode::Single) {
        Err(QueryError::NoMatch { expression }) => assert_eq!(expression, "//missing"),
        other => panic!("Expected NoMatch, got {other:?}"),
    }
    let multi = evaluate(&tree, "//missing", QueryLanguage::XPath, QueryMode::Multi).unwrap();
    assert!(multi.is_empty());
}

#[test]
fn test_single_is_first_of_multi() {
    let tree = xml(r#"<a><b id="1"><c/></b><c/><b id="2"/></a>"#);
    for expression in ["//b", "//c", "//*", "//@id", "/a/node()", "//c/ancestor::*"] {
        let multi = evaluate(&tree, expression, QueryLanguage::XPath, QueryMode::Multi).unwrap();
        let single = evaluate(&tree, expression, QueryLanguage::XPath, QueryMode::Single).unwrap();
        assert_eq!(single.selections(), &multi.selections()[..1], "{expression}");
    }
}

#[test]
fn test_html_names_match_case_insensitively() {
    let tree = parse_html("<DIV CLASS=x><P>text</P></DIV>");
    assert_eq!(select(&tree, "//div/p"), vec!["p"]);
    assert_eq!(select(&tree, "//DIV[@Class='x']"), vec!["div"]);

    let tree = xml("<Div/>");
    assert!(select(&tree, "//div").is_empty());
    assert_eq!(select(&tree, "//Div"), vec!["Div"]);
}

#[test]
fn test_invalid_expressions() {
    let tree = xml(ITEMS);
    for expression in [
        "",
        "//",
        "//i[",
        "count(1)",
        "(1)[1]",
        "1 | //i",
        "'a'/b",
        "$var",
        "translate('a', 'b', 'c')",
        "namespace::x",
    ] {
        invalid(&tree, expression);
    }
}

#[test]
fn test_document_without_elements() {
    let tree = DomTree::new(xq_dom::Grammar::Xml);
    assert_eq!(tree.len(), 1);
    invalid(&tree, "//a[");
    invalid(&tree, "count('a')");
    invalid(&tree, "//a[name(1) = 'x']");
    assert!(select(&tree, "//a").is_empty());
    assert_eq!(select(&tree, "/"), vec!["/"]);
    assert_eq!(tree.document_element(), None::<NodeId>);
}
