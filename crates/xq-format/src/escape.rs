//! Character escaping for serialized markup.

use std::borrow::Cow;

use xq_dom::Grammar;

/// Escape character data. XML escapes `&`, `<` and `>`, plus `\r` so a
/// reparse does not fold it into a newline; HTML only `&` and `<`.
#[must_use]
pub fn escape_text(text: &str, grammar: Grammar) -> Cow<'_, str> {
    escape(text, |c| match (c, grammar) {
        ('&', _) => Some("&amp;"),
        ('<', _) => Some("&lt;"),
        ('>', Grammar::Xml) => Some("&gt;"),
        ('\r', Grammar::Xml) => Some("&#13;"),
        _ => None,
    })
}

/// Escape an attribute value delimited by `quote`.
///
/// XML escapes all five predefined entities and writes tab, newline and
/// carriage return as character references. HTML escapes `&`, `<` and the
/// delimiting quote only.
#[must_use]
pub fn escape_attribute(value: &str, grammar: Grammar, quote: char) -> Cow<'_, str> {
    escape(value, |c| match (c, grammar) {
        ('&', _) => Some("&amp;"),
        ('<', _) => Some("&lt;"),
        ('>', Grammar::Xml) => Some("&gt;"),
        ('"', Grammar::Xml) => Some("&quot;"),
        ('\'', Grammar::Xml) => Some("&apos;"),
        ('\n', Grammar::Xml) => Some("&#10;"),
        ('\t', Grammar::Xml) => Some("&#9;"),
        ('\r', Grammar::Xml) => Some("&#13;"),
        ('"', Grammar::Html) if quote == '"' => Some("&quot;"),
        ('\'', Grammar::Html) if quote == '\'' => Some("&#39;"),
        _ => None,
    })
}

fn escape(input: &str, replacement: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    let Some(first) = input.find(|c| replacement(c).is_some()) else {
        return Cow::Borrowed(input);
    };
    let mut out = String::with_capacity(input.len() + 8);
    out.push_str(&input[..first]);
    for c in input[first..].chars() {
        match replacement(c) {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text() {
        assert_eq!(escape_text("a<b>&c", Grammar::Xml), "a&lt;b&gt;&amp;c");
        assert_eq!(escape_text("a<b>&c", Grammar::Html), "a&lt;b>&amp;c");
        assert!(matches!(escape_text("plain", Grammar::Xml), Cow::Borrowed(_)));
        assert_eq!(escape_text("a\r\nb\t", Grammar::Xml), "a&#13;\nb\t");
        assert_eq!(escape_text("a\rb", Grammar::Html), "a\rb");
    }

    #[test]
    fn test_attribute_whitespace_references() {
        assert_eq!(escape_attribute("a\tb\nc\rd", Grammar::Xml, '"'), "a&#9;b&#10;c&#13;d");
        assert_eq!(escape_attribute("a\nb", Grammar::Html, '"'), "a\nb");
    }

    #[test]
    fn test_attribute() {
        assert_eq!(
            escape_attribute(r#"<"'>&"#, Grammar::Xml, '"'),
            "&lt;&quot;&apos;&gt;&amp;"
        );
        assert_eq!(escape_attribute(r#"<"'>&"#, Grammar::Html, '"'), r#"&lt;&quot;'>&amp;"#);
        assert_eq!(escape_attribute(r#"<"'>&"#, Grammar::Html, '\''), r#"&lt;"&#39;>&amp;"#);
    }
}
