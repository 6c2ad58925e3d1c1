//! Recursive-descent parser for XPath expressions.
//!
//! [§ 3 Expressions](https://www.w3.org/TR/xpath-10/#section-Expressions)
//!
//! Precedence, loosest first: `or`, `and`, equality, relational, additive,
//! multiplicative, unary minus, union, path.

use super::ast::{Axis, BinaryOp, Expr, Function, LocationPath, NodeTest, Step, ValueType};
use super::lexer::{Lexer, Spanned, Token};
use crate::error::QueryError;

/// Parse `expression` into an [`Expr`].
///
/// Unknown functions, unsupported axes, wrong argument counts and operands
/// that can never be node-sets where one is required are all rejected here,
/// before any tree is touched.
///
/// # Errors
///
/// [`QueryError::InvalidExpression`] describing the first problem found.
pub fn parse(expression: &str) -> Result<Expr, QueryError> {
    let tokens = Lexer::new(expression).tokenize()?;
    if tokens.is_empty() {
        return Err(QueryError::invalid(expression, "empty expression"));
    }
    let mut parser = Parser {
        expression,
        tokens,
        pos: 0,
    };
    let expr = parser.parse_or()?;
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(parser.error_at(extra.offset, &format!("unexpected {:?}", extra.token)));
    }
    check_types(expression, &expr)?;
    Ok(expr)
}

/// Walk `expr` and reject every place that needs a node-set but is given a
/// boolean, number or string.
fn check_types(expression: &str, expr: &Expr) -> Result<(), QueryError> {
    let node_set = |operand: &Expr, what: &str| {
        let found = operand.value_type();
        if found == ValueType::NodeSet {
            Ok(())
        } else {
            let message = format!("{what} expects a node-set, found a {found}");
            Err(QueryError::invalid(expression, message))
        }
    };
    let steps = |steps: &[Step]| {
        steps
            .iter()
            .flat_map(|step| &step.predicates)
            .try_for_each(|predicate| check_types(expression, predicate))
    };

    match expr {
        Expr::Number(_) | Expr::Literal(_) => Ok(()),
        Expr::Negate(inner) => check_types(expression, inner),
        Expr::Binary { left, right, .. } => {
            check_types(expression, left)?;
            check_types(expression, right)
        }
        Expr::Function { function, args } => {
            for arg in args {
                if function.takes_node_set() {
                    node_set(arg, &format!("{function}()"))?;
                }
                check_types(expression, arg)?;
            }
            Ok(())
        }
        Expr::Path(path) => steps(&path.steps),
        Expr::Filter {
            primary,
            predicates,
            steps: trailing,
        } => {
            node_set(primary, "a predicate or path step")?;
            check_types(expression, primary)?;
            predicates
                .iter()
                .try_for_each(|predicate| check_types(expression, predicate))?;
            steps(trailing)
        }
        Expr::Union(left, right) => {
            node_set(left, "'|'")?;
            node_set(right, "'|'")?;
            check_types(expression, left)?;
            check_types(expression, right)
        }
    }
}

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), QueryError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn error(&self, message: &str) -> QueryError {
        match self.tokens.get(self.pos) {
            Some(spanned) => self.error_at(spanned.offset, message),
            None => QueryError::invalid(self.expression, format!("{message} at end of expression")),
        }
    }

    fn error_at(&self, offset: usize, message: &str) -> QueryError {
        QueryError::invalid(self.expression, format!("{message} at offset {offset}"))
    }

    /// Parse one binary precedence level.
    fn binary_level(
        &mut self,
        operators: &[(Token, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, QueryError>,
    ) -> Result<Expr, QueryError> {
        let mut left = next(self)?;
        while let Some(op) = self
            .peek()
            .and_then(|t| operators.iter().find(|(token, _)| token == t))
            .map(|&(_, op)| op)
        {
            self.pos += 1;
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        self.binary_level(&[(Token::Or, BinaryOp::Or)], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        self.binary_level(&[(Token::And, BinaryOp::And)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, QueryError> {
        self.binary_level(
            &[(Token::Equal, BinaryOp::Eq), (Token::NotEqual, BinaryOp::Neq)],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> Result<Expr, QueryError> {
        self.binary_level(
            &[
                (Token::Less, BinaryOp::Lt),
                (Token::LessEqual, BinaryOp::Lte),
                (Token::Greater, BinaryOp::Gt),
                (Token::GreaterEqual, BinaryOp::Gte),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr, QueryError> {
        self.binary_level(
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, QueryError> {
        self.binary_level(
            &[
                (Token::Multiply, BinaryOp::Mul),
                (Token::Div, BinaryOp::Div),
                (Token::Mod, BinaryOp::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr, QueryError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Negate(Box::new(self.parse_unary()?)));
        }
        self.parse_union()
    }

    fn parse_union(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_path()?;
        while self.eat(&Token::Pipe) {
            let right = self.parse_path()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// [§ 3.3 `PathExpr`](https://www.w3.org/TR/xpath-10/#NT-PathExpr)
    fn parse_path(&mut self) -> Result<Expr, QueryError> {
        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                let steps = if self.starts_step() {
                    self.parse_relative_steps()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                let mut steps = vec![Step::descendant_or_self()];
                steps.extend(self.parse_relative_steps()?);
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            _ if self.starts_step() => Ok(Expr::Path(LocationPath {
                absolute: false,
                steps: self.parse_relative_steps()?,
            })),
            _ => self.parse_filter(),
        }
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Name(_)
                    | Token::At
                    | Token::Dot
                    | Token::DotDot
                    | Token::AxisName(_)
                    | Token::NodeType(_)
            )
        )
    }

    /// `Step (('/' | '//') Step)*`
    fn parse_relative_steps(&mut self) -> Result<Vec<Step>, QueryError> {
        let mut steps = vec![self.parse_step()?];
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                steps.push(self.parse_step()?);
            } else {
                return Ok(steps);
            }
        }
    }

    /// [§ 2.1 `Step`](https://www.w3.org/TR/xpath-10/#NT-Step), with the
    /// [§ 2.5 abbreviations](https://www.w3.org/TR/xpath-10/#path-abbrev).
    fn parse_step(&mut self) -> Result<Step, QueryError> {
        if self.eat(&Token::Dot) {
            return Ok(Step {
                axis: Axis::SelfAxis,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }

        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let Some(Token::AxisName(name)) = self.peek() {
            let axis = name
                .parse::<Axis>()
                .map_err(|_| self.error(&format!("unsupported axis '{name}'")))?;
            self.pos += 1;
            self.expect(&Token::ColonColon, "'::'")?;
            axis
        } else {
            Axis::Child
        };

        let test = self.parse_node_test()?;
        let predicates = self.parse_predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    /// [§ 2.3 `NodeTest`](https://www.w3.org/TR/xpath-10/#NT-NodeTest)
    fn parse_node_test(&mut self) -> Result<NodeTest, QueryError> {
        match self.peek().cloned() {
            Some(Token::Name(name)) => {
                self.pos += 1;
                Ok(if name == "*" {
                    NodeTest::Any
                } else {
                    NodeTest::Name(name)
                })
            }
            Some(Token::NodeType(kind)) => {
                self.pos += 1;
                self.expect(&Token::LeftParen, "'('")?;
                let test = match kind.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => {
                        if let Some(Token::Literal(target)) = self.peek().cloned() {
                            self.pos += 1;
                            NodeTest::ProcessingInstruction(Some(target))
                        } else {
                            NodeTest::ProcessingInstruction(None)
                        }
                    }
                };
                self.expect(&Token::RightParen, "')'")?;
                Ok(test)
            }
            _ => Err(self.error("expected a node test")),
        }
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>, QueryError> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.parse_or()?);
            self.expect(&Token::RightBracket, "']'")?;
        }
        Ok(predicates)
    }

    /// [§ 3.3 `FilterExpr`](https://www.w3.org/TR/xpath-10/#NT-FilterExpr)
    /// followed by an optional relative path.
    fn parse_filter(&mut self) -> Result<Expr, QueryError> {
        let primary = self.parse_primary()?;
        let predicates = self.parse_predicates()?;

        let mut steps = Vec::new();
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                steps.push(self.parse_step()?);
            } else {
                break;
            }
        }

        if predicates.is_empty() && steps.is_empty() {
            Ok(primary)
        } else {
            Ok(Expr::Filter {
                primary: Box::new(primary),
                predicates,
                steps,
            })
        }
    }

    /// [§ 3.1 `PrimaryExpr`](https://www.w3.org/TR/xpath-10/#NT-PrimaryExpr)
    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        let offset = self.tokens.get(self.pos).map(|s| s.offset);
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Literal(s)) => Ok(Expr::Literal(s)),
            Some(Token::LeftParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RightParen, "')'")?;
                Ok(inner)
            }
            Some(Token::FunctionName(name)) => {
                let offset = offset.unwrap_or_default();
                let function = name
                    .parse::<Function>()
                    .map_err(|_| self.error_at(offset, &format!("unknown function '{name}()'")))?;
                self.expect(&Token::LeftParen, "'('")?;
                let mut args = Vec::new();
                if !self.eat(&Token::RightParen) {
                    loop {
                        args.push(self.parse_or()?);
                        if self.eat(&Token::RightParen) {
                            break;
                        }
                        self.expect(&Token::Comma, "',' or ')'")?;
                    }
                }
                let (min, max) = function.arity();
                if args.len() < min || max.is_some_and(|max| args.len() > max) {
                    return Err(self.error_at(
                        offset,
                        &format!("wrong number of arguments to {function}(): {}", args.len()),
                    ));
                }
                Ok(Expr::Function { function, args })
            }
            Some(token) => {
                self.pos -= 1;
                Err(self.error(&format!("unexpected {token:?}")))
            }
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(axis: Axis, test: NodeTest) -> Step {
        Step {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    #[test]
    fn test_abbreviations_expand() {
        let expr = parse("//a/@href").unwrap();
        assert_eq!(
            expr,
            Expr::Path(LocationPath {
                absolute: true,
                steps: vec![
                    Step::descendant_or_self(),
                    step(Axis::Child, NodeTest::Name("a".to_string())),
                    step(Axis::Attribute, NodeTest::Name("href".to_string())),
                ],
            })
        );
    }

    #[test]
    fn test_root_alone() {
        assert_eq!(
            parse("/").unwrap(),
            Expr::Path(LocationPath {
                absolute: true,
                steps: Vec::new(),
            })
        );
    }

    #[test]
    fn test_precedence() {
        let Expr::Binary { op, right, .. } = parse("1 or 2 and 3").unwrap() else {
            panic!("Expected binary expression");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn test_filter_with_steps() {
        let expr = parse("(//b)[1]/c").unwrap();
        let Expr::Filter {
            predicates, steps, ..
        } = expr
        else {
            panic!("Expected filter expression");
        };
        assert_eq!(predicates, vec![Expr::Number(1.0)]);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_type_errors_are_found_while_parsing() {
        for (bad, found) in [
            ("count(1)", "number"),
            ("count('a')", "string"),
            ("name(true())", "boolean"),
            ("(1)[1]", "number"),
            ("'a'/b", "string"),
            ("1 | //i", "number"),
            ("//a | count(//b)", "number"),
            ("//a[count(1) > 0]", "number"),
            ("not(local-name(2))", "number"),
        ] {
            let Err(QueryError::InvalidExpression { message, .. }) = parse(bad) else {
                panic!("{bad:?} should be rejected");
            };
            assert!(message.contains(found), "{bad:?}: {message}");
        }
    }

    #[test]
    fn test_node_set_operands_pass_type_check() {
        for good in [
            "count(//a | //b)",
            "name((//a)[1])",
            "(//a)[2]/@k",
            "local-name(.)",
            "//a[count(b) = 1]",
        ] {
            assert!(parse(good).is_ok(), "{good:?}");
        }
    }

    #[test]
    fn test_rejections() {
        for bad in [
            "",
            "//",
            "a[",
            "a]",
            "foo()",
            "count()",
            "contains('a')",
            "namespace::x",
            "a/",
            "@",
            "1 +",
        ] {
            assert!(
                matches!(parse(bad), Err(QueryError::InvalidExpression { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
