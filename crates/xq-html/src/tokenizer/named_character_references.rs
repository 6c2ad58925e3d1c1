//! Named character reference lookup table.
//!
//! [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
//!
//! The full table defines 2,231 entities; the common ones are carried here.
//! Unknown references are left in the text as written.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Maps entity names (without the leading '&') to their replacement strings.
///
/// Entries without a trailing semicolon are the legacy forms that browsers
/// still accept (`&amp` for `&amp;`).
static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp;", "&"),
        ("amp", "&"),
        ("AMP;", "&"),
        ("lt;", "<"),
        ("lt", "<"),
        ("LT;", "<"),
        ("gt;", ">"),
        ("gt", ">"),
        ("GT;", ">"),
        ("quot;", "\""),
        ("quot", "\""),
        ("apos;", "'"),
        ("nbsp;", "\u{00A0}"),
        ("nbsp", "\u{00A0}"),
        ("shy;", "\u{00AD}"),
        ("ensp;", "\u{2002}"),
        ("emsp;", "\u{2003}"),
        ("thinsp;", "\u{2009}"),
        ("zwj;", "\u{200D}"),
        ("zwnj;", "\u{200C}"),
        // Punctuation
        ("copy;", "\u{00A9}"),
        ("copy", "\u{00A9}"),
        ("reg;", "\u{00AE}"),
        ("reg", "\u{00AE}"),
        ("trade;", "\u{2122}"),
        ("mdash;", "\u{2014}"),
        ("ndash;", "\u{2013}"),
        ("hellip;", "\u{2026}"),
        ("bull;", "\u{2022}"),
        ("middot;", "\u{00B7}"),
        ("lsquo;", "\u{2018}"),
        ("rsquo;", "\u{2019}"),
        ("sbquo;", "\u{201A}"),
        ("ldquo;", "\u{201C}"),
        ("rdquo;", "\u{201D}"),
        ("bdquo;", "\u{201E}"),
        ("laquo;", "\u{00AB}"),
        ("raquo;", "\u{00BB}"),
        ("lsaquo;", "\u{2039}"),
        ("rsaquo;", "\u{203A}"),
        ("sect;", "\u{00A7}"),
        ("para;", "\u{00B6}"),
        ("dagger;", "\u{2020}"),
        ("Dagger;", "\u{2021}"),
        ("iexcl;", "\u{00A1}"),
        ("iquest;", "\u{00BF}"),
        // Currency
        ("cent;", "\u{00A2}"),
        ("pound;", "\u{00A3}"),
        ("euro;", "\u{20AC}"),
        ("yen;", "\u{00A5}"),
        ("curren;", "\u{00A4}"),
        // Math
        ("times;", "\u{00D7}"),
        ("divide;", "\u{00F7}"),
        ("plusmn;", "\u{00B1}"),
        ("minus;", "\u{2212}"),
        ("ne;", "\u{2260}"),
        ("le;", "\u{2264}"),
        ("ge;", "\u{2265}"),
        ("deg;", "\u{00B0}"),
        ("micro;", "\u{00B5}"),
        ("infin;", "\u{221E}"),
        ("asymp;", "\u{2248}"),
        ("frac12;", "\u{00BD}"),
        ("frac14;", "\u{00BC}"),
        ("frac34;", "\u{00BE}"),
        ("sup2;", "\u{00B2}"),
        ("sup3;", "\u{00B3}"),
        // Arrows
        ("larr;", "\u{2190}"),
        ("uarr;", "\u{2191}"),
        ("rarr;", "\u{2192}"),
        ("darr;", "\u{2193}"),
        ("harr;", "\u{2194}"),
        // Latin-1 letters
        ("aacute;", "\u{00E1}"),
        ("Aacute;", "\u{00C1}"),
        ("agrave;", "\u{00E0}"),
        ("auml;", "\u{00E4}"),
        ("Auml;", "\u{00C4}"),
        ("aring;", "\u{00E5}"),
        ("eacute;", "\u{00E9}"),
        ("Eacute;", "\u{00C9}"),
        ("egrave;", "\u{00E8}"),
        ("euml;", "\u{00EB}"),
        ("iacute;", "\u{00ED}"),
        ("oacute;", "\u{00F3}"),
        ("ouml;", "\u{00F6}"),
        ("Ouml;", "\u{00D6}"),
        ("oslash;", "\u{00F8}"),
        ("uacute;", "\u{00FA}"),
        ("uuml;", "\u{00FC}"),
        ("Uuml;", "\u{00DC}"),
        ("szlig;", "\u{00DF}"),
        ("ntilde;", "\u{00F1}"),
        ("Ntilde;", "\u{00D1}"),
        ("ccedil;", "\u{00E7}"),
        ("Ccedil;", "\u{00C7}"),
        // Greek
        ("alpha;", "\u{03B1}"),
        ("beta;", "\u{03B2}"),
        ("gamma;", "\u{03B3}"),
        ("delta;", "\u{03B4}"),
        ("pi;", "\u{03C0}"),
        ("sigma;", "\u{03C3}"),
        ("lambda;", "\u{03BB}"),
        ("mu;", "\u{03BC}"),
        ("omega;", "\u{03C9}"),
        ("Omega;", "\u{03A9}"),
    ])
});

/// Look up a named character reference.
///
/// Returns the replacement string if found.
/// The `name` should NOT include the leading '&'.
///
/// # Example
/// ```ignore
/// lookup_entity("amp;")  // Returns Some("&")
/// lookup_entity("amp")   // Returns Some("&") - legacy support
/// lookup_entity("xyz;")  // Returns None
/// ```
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES.get(name).copied()
}

/// Check if any entity name starts with the given prefix.
///
/// Used to decide whether to keep consuming characters while looking for the
/// longest match.
pub fn any_entity_has_prefix(prefix: &str) -> bool {
    NAMED_ENTITIES.keys().any(|name| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_with_and_without_semicolon() {
        assert_eq!(lookup_entity("amp;"), Some("&"));
        assert_eq!(lookup_entity("amp"), Some("&"));
        assert_eq!(lookup_entity("hellip"), None);
        assert_eq!(lookup_entity("xyz;"), None);
    }

    #[test]
    fn test_prefix_search() {
        assert!(any_entity_has_prefix("nbs"));
        assert!(!any_entity_has_prefix("zzz"));
    }
}
