//! Selector syntax.
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)

use super::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorList,
    SimpleSelector,
};
use crate::error::QueryError;

/// Parse a selector list such as `ul > li.item, p:first-child`.
///
/// # Errors
///
/// [`QueryError::InvalidExpression`] for empty selectors, dangling
/// combinators, unknown pseudo-classes, pseudo-elements, functional
/// pseudo-classes, namespaces and any other syntax outside the supported
/// subset.
pub fn parse_selector_list(raw: &str) -> Result<SelectorList, QueryError> {
    let mut parser = SelectorParser {
        raw,
        chars: raw.chars().collect(),
        pos: 0,
    };
    let mut selectors = vec![parser.parse_complex()?];
    while parser.eat(',') {
        selectors.push(parser.parse_complex()?);
    }
    if let Some(c) = parser.peek() {
        return Err(parser.error(&format!("unexpected '{c}'")));
    }
    Ok(SelectorList { selectors })
}

struct SelectorParser<'a> {
    raw: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl SelectorParser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether anything was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn error(&self, message: &str) -> QueryError {
        QueryError::invalid(self.raw, format!("{message} at offset {}", self.pos))
    }

    /// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
    ///
    /// Compounds are collected left-to-right, then reversed so the subject
    /// comes first.
    fn parse_complex(&mut self) -> Result<ComplexSelector, QueryError> {
        let _ = self.skip_whitespace();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators_between = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(&format!("unexpected '{c}'"))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                let _ = self.skip_whitespace();
            }
            combinators_between.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        let Some(subject) = compounds.pop() else {
            return Err(self.error("empty selector"));
        };
        let combinators = compounds
            .into_iter()
            .zip(combinators_between)
            .rev()
            .map(|(compound, combinator)| (combinator, compound))
            .collect();
        Ok(ComplexSelector {
            subject,
            combinators,
        })
    }

    /// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound):
    /// an optional type or universal selector followed by any number of
    /// class, id, attribute and pseudo-class selectors.
    fn parse_compound(&mut self) -> Result<CompoundSelector, QueryError> {
        let mut simple_selectors = Vec::new();

        if self.eat('*') {
            simple_selectors.push(SimpleSelector::Universal);
        } else if self.peek().is_some_and(is_ident_start_char) {
            let name = self.parse_ident("type selector")?;
            simple_selectors.push(SimpleSelector::Type(name));
        }
        if self.peek() == Some('|') {
            return Err(self.error("namespace prefixes are not supported"));
        }

        loop {
            match self.peek() {
                // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
                Some('.') => {
                    self.pos += 1;
                    let name = self.parse_ident("class name")?;
                    simple_selectors.push(SimpleSelector::Class(name));
                }
                // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
                Some('#') => {
                    self.pos += 1;
                    let name = self.parse_ident("id")?;
                    simple_selectors.push(SimpleSelector::Id(name));
                }
                Some('[') => {
                    self.pos += 1;
                    let attr_sel = self.parse_attribute()?;
                    simple_selectors.push(SimpleSelector::Attribute(attr_sel));
                }
                Some(':') => {
                    self.pos += 1;
                    let pc = self.parse_pseudo_class()?;
                    simple_selectors.push(SimpleSelector::PseudoClass(pc));
                }
                _ => break,
            }
        }

        if simple_selectors.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(&format!("expected a selector, found '{c}'")),
                None => self.error("expected a selector"),
            });
        }
        Ok(CompoundSelector { simple_selectors })
    }

    /// [§ 4.3.11 ident sequence](https://www.w3.org/TR/css-syntax-3/#ident-sequence)
    ///
    /// A leading `-` is allowed. Backslash escapes are not supported.
    fn parse_ident(&mut self, what: &str) -> Result<String, QueryError> {
        let start = self.pos;
        let _ = self.eat('-');
        if !self.peek().is_some_and(|c| is_ident_start_char(c) || c == '-') {
            self.pos = start;
            return Err(self.error(&format!("expected {what}")));
        }
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors),
    /// after the opening `[`.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, QueryError> {
        let _ = self.skip_whitespace();
        let attr_name = self.parse_ident("attribute name")?;
        let _ = self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeSelector::Exists(attr_name));
            }
            Some('=') => '=',
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.error(&format!("expected '=' after '{op}'")));
                }
                op
            }
            _ => return Err(self.error("expected ']' or an attribute operator")),
        };
        self.pos += 1;
        let _ = self.skip_whitespace();
        let val = self.parse_attr_value()?;
        let _ = self.skip_whitespace();
        if matches!(self.peek(), Some('i' | 's' | 'I' | 'S')) {
            return Err(self.error("attribute case-sensitivity flags are not supported"));
        }
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }

        Ok(match op {
            '~' => AttributeSelector::Includes(attr_name, val),
            '|' => AttributeSelector::DashMatch(attr_name, val),
            '^' => AttributeSelector::PrefixMatch(attr_name, val),
            '$' => AttributeSelector::SuffixMatch(attr_name, val),
            '*' => AttributeSelector::SubstringMatch(attr_name, val),
            _ => AttributeSelector::Equals(attr_name, val),
        })
    }

    /// Parse an attribute value inside `[attr=value]`: a quoted string or an
    /// unquoted ident.
    fn parse_attr_value(&mut self) -> Result<String, QueryError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut val = String::new();
                loop {
                    match self.peek() {
                        Some(c) if c == q => {
                            self.pos += 1;
                            return Ok(val);
                        }
                        Some(c) => {
                            val.push(c);
                            self.pos += 1;
                        }
                        None => return Err(self.error("unterminated string in attribute selector")),
                    }
                }
            }
            _ => self.parse_ident("attribute value"),
        }
    }

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes),
    /// after the `:`.
    fn parse_pseudo_class(&mut self) -> Result<PseudoClass, QueryError> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements are not supported"));
        }
        let name = self.parse_ident("pseudo-class name")?;
        if self.peek() == Some('(') {
            return Err(self.error(&format!("functional pseudo-class :{name}() is not supported")));
        }
        Ok(match name.to_ascii_lowercase().as_str() {
            "root" => PseudoClass::Root,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "empty" => PseudoClass::Empty,
            _ => return Err(self.error(&format!("unsupported pseudo-class :{name}"))),
        })
    }
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}
