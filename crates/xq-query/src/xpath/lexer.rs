//! XPath tokenizer.
//!
//! [§ 3.7 Lexical Structure](https://www.w3.org/TR/xpath-10/#exprlex)
//!
//! Ambiguous tokens are resolved here, from the previous token and the next
//! non-space character:
//! - after an operand, `*` is multiplication and `and`/`or`/`div`/`mod` are
//!   operators
//! - a name followed by `(` is a function name or node type
//! - a name followed by `::` is an axis name

use crate::error::QueryError;

/// "If the name is followed by `(`, and it is one of these, it is a NodeType."
const NODE_TYPE_NAMES: &[&str] = &["comment", "text", "processing-instruction", "node"];

/// An XPath token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `@`
    At,
    /// `,`
    Comma,
    /// `::`
    ColonColon,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `|`
    Pipe,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` as multiplication.
    Multiply,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `and`
    And,
    /// `or`
    Or,
    /// `div`
    Div,
    /// `mod`
    Mod,
    /// Numeric literal.
    Number(f64),
    /// Quoted string literal, without quotes.
    Literal(String),
    /// A name test: a QName or `*`.
    Name(String),
    /// A name followed by `(` that is not a node type.
    FunctionName(String),
    /// `node`, `text`, `comment` or `processing-instruction` before `(`.
    NodeType(String),
    /// A name followed by `::`.
    AxisName(String),
}

impl Token {
    /// "If there is a preceding token and the preceding token is not one of
    /// `@`, `::`, `(`, `[`, `,` or an Operator", the next token ends an operand.
    const fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::RightParen
                | Self::RightBracket
                | Self::Dot
                | Self::DotDot
                | Self::Number(_)
                | Self::Literal(_)
                | Self::Name(_)
                | Self::NodeType(_)
        )
    }
}

/// A token and the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Character offset into the expression.
    pub offset: usize,
}

/// Splits an expression into [`Spanned`] tokens.
pub struct Lexer<'a> {
    expression: &'a str,
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Spanned>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `expression`.
    #[must_use]
    pub fn new(expression: &'a str) -> Self {
        Self {
            expression,
            chars: expression.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole expression.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidExpression`] on an unterminated literal or a
    /// character that cannot start a token.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, QueryError> {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                return Ok(self.tokens);
            };
            let offset = self.pos;
            let token = match c {
                '(' => self.single(Token::LeftParen),
                ')' => self.single(Token::RightParen),
                '[' => self.single(Token::LeftBracket),
                ']' => self.single(Token::RightBracket),
                '@' => self.single(Token::At),
                ',' => self.single(Token::Comma),
                '|' => self.single(Token::Pipe),
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '=' => self.single(Token::Equal),
                '/' => {
                    self.pos += 1;
                    if self.eat('/') {
                        Token::DoubleSlash
                    } else {
                        Token::Slash
                    }
                }
                ':' => {
                    self.pos += 1;
                    if !self.eat(':') {
                        return Err(self.error("expected '::'", offset));
                    }
                    Token::ColonColon
                }
                '!' => {
                    self.pos += 1;
                    if !self.eat('=') {
                        return Err(self.error("expected '!='", offset));
                    }
                    Token::NotEqual
                }
                '<' => {
                    self.pos += 1;
                    if self.eat('=') { Token::LessEqual } else { Token::Less }
                }
                '>' => {
                    self.pos += 1;
                    if self.eat('=') {
                        Token::GreaterEqual
                    } else {
                        Token::Greater
                    }
                }
                '.' if self.peek_at(1) == Some('.') => {
                    self.pos += 2;
                    Token::DotDot
                }
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.number(),
                '.' => self.single(Token::Dot),
                '"' | '\'' => self.literal(c)?,
                '*' => {
                    self.pos += 1;
                    if self.after_operand() {
                        Token::Multiply
                    } else {
                        Token::Name("*".to_string())
                    }
                }
                c if c.is_ascii_digit() => self.number(),
                c if is_name_start_char(c) => self.name(),
                c => return Err(self.error(&format!("unexpected character '{c}'"), offset)),
            };
            self.tokens.push(Spanned { token, offset });
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn after_operand(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.token.ends_operand())
    }

    /// The next non-whitespace character and the one after it.
    fn lookahead(&self) -> (Option<char>, Option<char>) {
        let mut i = self.pos;
        while self.chars.get(i).is_some_and(char::is_ascii_whitespace) {
            i += 1;
        }
        (self.chars.get(i).copied(), self.chars.get(i + 1).copied())
    }

    fn number(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Token::Number(text.parse().unwrap_or(f64::NAN))
    }

    fn literal(&mut self, quote: char) -> Result<Token, QueryError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(Token::Literal(value));
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated string literal", start)),
            }
        }
    }

    fn name(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.pos += 1;
            } else if c == ':' && self.peek_at(1).is_some_and(is_name_start_char) {
                // QName prefix separator; `::` ends the name instead.
                self.pos += 1;
            } else {
                break;
            }
        }
        let name: String = self.chars[start..self.pos].iter().collect();

        if self.after_operand() {
            match name.as_str() {
                "and" => return Token::And,
                "or" => return Token::Or,
                "div" => return Token::Div,
                "mod" => return Token::Mod,
                _ => {}
            }
        }
        match self.lookahead() {
            (Some('('), _) if NODE_TYPE_NAMES.contains(&name.as_str()) => Token::NodeType(name),
            (Some('('), _) => Token::FunctionName(name),
            (Some(':'), Some(':')) => Token::AxisName(name),
            _ => Token::Name(name),
        }
    }

    fn error(&self, message: &str, offset: usize) -> QueryError {
        QueryError::invalid(self.expression, format!("{message} at offset {offset}"))
    }
}

const fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

const fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expression: &str) -> Vec<Token> {
        Lexer::new(expression)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_abbreviated_path() {
        assert_eq!(
            tokens("//b[@id='y']"),
            vec![
                Token::DoubleSlash,
                Token::Name("b".to_string()),
                Token::LeftBracket,
                Token::At,
                Token::Name("id".to_string()),
                Token::Equal,
                Token::Literal("y".to_string()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_star_disambiguation() {
        assert_eq!(
            tokens("* * 2"),
            vec![
                Token::Name("*".to_string()),
                Token::Multiply,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_operator_names_after_operand() {
        assert_eq!(
            tokens("and and or"),
            vec![
                Token::Name("and".to_string()),
                Token::And,
                Token::Name("or".to_string()),
            ]
        );
    }

    #[test]
    fn test_function_axis_and_node_type() {
        assert_eq!(
            tokens("count(child::text())"),
            vec![
                Token::FunctionName("count".to_string()),
                Token::LeftParen,
                Token::AxisName("child".to_string()),
                Token::ColonColon,
                Token::NodeType("text".to_string()),
                Token::LeftParen,
                Token::RightParen,
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_hyphenated_and_prefixed_names() {
        assert_eq!(
            tokens("following-sibling::svg:rect"),
            vec![
                Token::AxisName("following-sibling".to_string()),
                Token::ColonColon,
                Token::Name("svg:rect".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers_and_dots() {
        assert_eq!(
            tokens(". .. .5 3.25"),
            vec![
                Token::Dot,
                Token::DotDot,
                Token::Number(0.5),
                Token::Number(3.25),
            ]
        );
    }

    #[test]
    fn test_errors() {
        assert!(Lexer::new("'open").tokenize().is_err());
        assert!(Lexer::new("a ! b").tokenize().is_err());
        assert!(Lexer::new("a # b").tokenize().is_err());
    }
}
