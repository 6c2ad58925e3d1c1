//! Integration tests for the HTML tokenizer.

use xq_dom::QuoteStyle;
use xq_html::{HTMLTokenizer, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Concatenate every character token.
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert!(matches!(tokens[0], Token::Character { data: 'H' }));
    assert!(matches!(tokens[4], Token::Character { data: 'o' }));
    assert!(tokens[5].is_eof());
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    assert_eq!(
        tokens[0],
        Token::Doctype {
            data: "html".to_string()
        }
    );
}

#[test]
fn test_doctype_keyword_is_case_insensitive() {
    let tokens = tokenize("<!doctype html>");
    assert!(matches!(&tokens[0], Token::Doctype { data } if data == "html"));
}

#[test]
fn test_start_and_end_tags_are_lowercased() {
    let tokens = tokenize("<DIV CLASS=\"A\"></Div>");
    match &tokens[0] {
        Token::StartTag {
            name, attributes, ..
        } => {
            assert_eq!(name, "div");
            assert_eq!(attributes[0].name, "class");
            assert_eq!(attributes[0].value, "A");
        }
        other => panic!("Expected StartTag token, got {other}"),
    }
    assert_eq!(tokens[1].tag_name(), Some("div"));
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    match &tokens[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        other => panic!("Expected self-closing StartTag token, got {other}"),
    }
}

#[test]
fn test_attribute_quote_styles() {
    let tokens = tokenize("<input type=text disabled value='a b' id=\"x\">");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    let seen: Vec<(&str, &str, QuoteStyle)> = attributes
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str(), a.quote))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("type", "text", QuoteStyle::Unquoted),
            ("disabled", "", QuoteStyle::Absent),
            ("value", "a b", QuoteStyle::Single),
            ("id", "x", QuoteStyle::Double),
        ]
    );
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize("<p id=\"a\" id=\"b\" class=c>");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes[0].value, "a");
    assert_eq!(attributes[1].name, "class");
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hi ".to_string()
        }
    );
}

#[test]
fn test_comment_with_inner_dashes() {
    let tokens = tokenize("<!-- a-b -- c -->");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == " a-b -- c "));
}

#[test]
fn test_processing_instruction_becomes_bogus_comment() {
    let tokens = tokenize("<?php echo 1 ?>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == "?php echo 1 ?"));
}

#[test]
fn test_cdata_section_token() {
    let tokens = tokenize("<![CDATA[x<y]]>");
    assert!(matches!(&tokens[0], Token::CData { data } if data == "x<y"));
}

// ========== character references ==========

#[test]
fn test_character_references_in_text() {
    let tokens = tokenize("a &amp; b &lt;c&gt; &#65;&#x42; &nbsp");
    assert_eq!(text_of(&tokens), "a & b <c> AB \u{a0}");
}

#[test]
fn test_unknown_reference_is_left_alone() {
    let tokens = tokenize("&bogus; x");
    assert_eq!(text_of(&tokens), "&bogus; x");
}

#[test]
fn test_c1_numeric_reference_is_remapped() {
    let tokens = tokenize("&#128;&#x0;");
    assert_eq!(text_of(&tokens), "\u{20AC}\u{FFFD}");
}

#[test]
fn test_ampersand_in_attribute_value() {
    let tokens = tokenize("<a href=\"?a=1&b=2&amp=3&amp;c\">");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(attributes[0].value, "?a=1&b=2&amp=3&c");
}

// ========== raw text ==========

#[test]
fn test_script_content_is_raw_text() {
    let tokens = tokenize("<script>if (a < b) { x = '</div>'; }</script>");
    assert_eq!(tokens[0].tag_name(), Some("script"));
    assert_eq!(text_of(&tokens), "if (a < b) { x = '</div>'; }");
    assert!(matches!(&tokens[tokens.len() - 2], Token::EndTag { name, .. } if name == "script"));
}

#[test]
fn test_title_decodes_references_but_not_tags() {
    let tokens = tokenize("<title>A &amp; <b>B</b></title>");
    assert_eq!(text_of(&tokens), "A & <b>B</b>");
}

// ========== recovery ==========

#[test]
fn test_eof_in_tag_drops_the_tag() {
    let tokens = tokenize("<div");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_eof());
}

#[test]
fn test_lone_less_than_is_text() {
    let tokens = tokenize("1 < 2");
    assert_eq!(text_of(&tokens), "1 < 2");
}

#[test]
fn test_crlf_is_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(text_of(&tokens), "a\nb\nc");
}

#[test]
fn test_issues_are_recorded() {
    let mut tokenizer = HTMLTokenizer::new("<p id=1 id=2>&nbsp</p>");
    tokenizer.run();
    let (_, issues) = tokenizer.into_parts();
    let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
    assert!(messages.contains(&"duplicate-attribute"));
    assert!(messages.contains(&"missing-semicolon-after-character-reference"));
}
