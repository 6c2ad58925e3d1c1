//! Syntax tree for the supported XPath 1.0 subset.
//!
//! [XPath 1.0 § 2 Location Paths](https://www.w3.org/TR/xpath-10/#location-paths)

use strum_macros::{Display, EnumString};

/// An XPath expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Literal(String),
    /// Binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary minus.
    Negate(Box<Expr>),
    /// Core library function call; arity is checked when parsing.
    Function {
        /// Which function.
        function: Function,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// A location path, absolute (`/a/b`) or relative (`a/b`).
    Path(LocationPath),
    /// `primary[pred]...` optionally followed by `/steps`.
    ///
    /// [§ 3.3 Node-sets](https://www.w3.org/TR/xpath-10/#node-sets)
    Filter {
        /// The filtered expression; must evaluate to a node-set.
        primary: Box<Expr>,
        /// Predicates applied in order.
        predicates: Vec<Expr>,
        /// Location steps applied to the filtered nodes.
        steps: Vec<Step>,
    },
    /// `a | b`
    Union(Box<Expr>, Box<Expr>),
}

/// The type an expression evaluates to, known without a tree.
///
/// [§ 1](https://www.w3.org/TR/xpath-10/#section-Introduction): node-set,
/// boolean, number, string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ValueType {
    /// `node-set`
    NodeSet,
    /// `boolean`
    Boolean,
    /// `number`
    Number,
    /// `string`
    String,
}

impl Expr {
    /// The static result type of this expression.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Number(_) | Self::Negate(_) => ValueType::Number,
            Self::Literal(_) => ValueType::String,
            Self::Binary { op, .. } => op.value_type(),
            Self::Function { function, .. } => function.value_type(),
            Self::Path(_) | Self::Filter { .. } | Self::Union(..) => ValueType::NodeSet,
        }
    }
}

/// A location path.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// Starts at the Document rather than the context node.
    pub absolute: bool,
    /// Steps applied left to right. `/` alone has none.
    pub steps: Vec<Step>,
}

/// [§ 2.1 Location Steps](https://www.w3.org/TR/xpath-10/#section-Location-Steps)
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Direction of selection.
    pub axis: Axis,
    /// Filter on the candidate nodes.
    pub test: NodeTest,
    /// Predicates, evaluated with positions along `axis`.
    pub predicates: Vec<Expr>,
}

impl Step {
    /// `descendant-or-self::node()`, the expansion of `//`.
    #[must_use]
    pub const fn descendant_or_self() -> Self {
        Self {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

/// [§ 2.2 Axes](https://www.w3.org/TR/xpath-10/#axes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Axis {
    /// `child::`
    Child,
    /// `descendant::`
    Descendant,
    /// `descendant-or-self::`
    DescendantOrSelf,
    /// `self::`
    #[strum(serialize = "self")]
    SelfAxis,
    /// `parent::`
    Parent,
    /// `ancestor::`
    Ancestor,
    /// `ancestor-or-self::`
    AncestorOrSelf,
    /// `following-sibling::`
    FollowingSibling,
    /// `preceding-sibling::`
    PrecedingSibling,
    /// `following::`
    Following,
    /// `preceding::`
    Preceding,
    /// `attribute::` or `@`
    Attribute,
}

impl Axis {
    /// Reverse axes number their nodes from the context node outward.
    ///
    /// [§ 2.4 Predicates](https://www.w3.org/TR/xpath-10/#predicates)
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::Parent
                | Self::Ancestor
                | Self::AncestorOrSelf
                | Self::PrecedingSibling
                | Self::Preceding
        )
    }
}

/// [§ 2.3 Node Tests](https://www.w3.org/TR/xpath-10/#node-tests)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A specific name.
    Name(String),
    /// `*`: any element, or any attribute on the attribute axis.
    Any,
    /// `node()`
    Node,
    /// `text()`, which also matches CDATA sections.
    Text,
    /// `comment()`
    Comment,
    /// `processing-instruction()` with an optional target literal.
    ProcessingInstruction(Option<String>),
}

/// Binary operators, loosest-binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinaryOp {
    /// `or`
    #[strum(serialize = "or")]
    Or,
    /// `and`
    #[strum(serialize = "and")]
    And,
    /// `=`
    #[strum(serialize = "=")]
    Eq,
    /// `!=`
    #[strum(serialize = "!=")]
    Neq,
    /// `<`
    #[strum(serialize = "<")]
    Lt,
    /// `<=`
    #[strum(serialize = "<=")]
    Lte,
    /// `>`
    #[strum(serialize = ">")]
    Gt,
    /// `>=`
    #[strum(serialize = ">=")]
    Gte,
    /// `+`
    #[strum(serialize = "+")]
    Add,
    /// `-`
    #[strum(serialize = "-")]
    Sub,
    /// `*`
    #[strum(serialize = "*")]
    Mul,
    /// `div`
    #[strum(serialize = "div")]
    Div,
    /// `mod`
    #[strum(serialize = "mod")]
    Mod,
}

impl BinaryOp {
    /// Logical and comparison operators yield booleans, arithmetic numbers.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod => ValueType::Number,
            _ => ValueType::Boolean,
        }
    }
}

/// [§ 4 Core Function Library](https://www.w3.org/TR/xpath-10/#corelib), the
/// supported part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Function {
    /// `last()`
    Last,
    /// `position()`
    Position,
    /// `count(node-set)`
    Count,
    /// `name(node-set?)`
    Name,
    /// `local-name(node-set?)`
    LocalName,
    /// `string(object?)`
    String,
    /// `concat(string, string, string*)`
    Concat,
    /// `string-length(string?)`
    StringLength,
    /// `normalize-space(string?)`
    NormalizeSpace,
    /// `contains(string, string)`
    Contains,
    /// `starts-with(string, string)`
    StartsWith,
    /// `substring-before(string, string)`
    SubstringBefore,
    /// `substring-after(string, string)`
    SubstringAfter,
    /// `not(boolean)`
    Not,
    /// `true()`
    True,
    /// `false()`
    False,
    /// `boolean(object)`
    Boolean,
    /// `number(object?)`
    Number,
}

impl Function {
    /// Accepted argument counts, inclusive; `None` means unbounded.
    #[must_use]
    pub const fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::Last | Self::Position | Self::True | Self::False => (0, Some(0)),
            Self::Count | Self::Not | Self::Boolean => (1, Some(1)),
            Self::Name
            | Self::LocalName
            | Self::String
            | Self::StringLength
            | Self::NormalizeSpace
            | Self::Number => (0, Some(1)),
            Self::Contains | Self::StartsWith | Self::SubstringBefore | Self::SubstringAfter => {
                (2, Some(2))
            }
            Self::Concat => (2, None),
        }
    }

    /// What the function returns.
    #[must_use]
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::Last | Self::Position | Self::Count | Self::StringLength | Self::Number => {
                ValueType::Number
            }
            Self::Name
            | Self::LocalName
            | Self::String
            | Self::Concat
            | Self::NormalizeSpace
            | Self::SubstringBefore
            | Self::SubstringAfter => ValueType::String,
            Self::Contains | Self::StartsWith | Self::Not | Self::True | Self::False | Self::Boolean => {
                ValueType::Boolean
            }
        }
    }

    /// Whether the arguments must be node-sets.
    #[must_use]
    pub const fn takes_node_set(self) -> bool {
        matches!(self, Self::Count | Self::Name | Self::LocalName)
    }
}
