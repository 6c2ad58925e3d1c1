//! XPath evaluation over a [`DomTree`].
//!
//! [§ 3 Expressions](https://www.w3.org/TR/xpath-10/#section-Expressions)
//!
//! Node-sets are `Vec<Selection>` kept in document order without duplicates.
//! Attributes sort directly after their owner element and before its children.

use std::cmp::Ordering;

use xq_dom::{DomTree, NodeId, NodeType};

use super::ast::{Axis, BinaryOp, Expr, Function, LocationPath, NodeTest, Step};
use crate::error::QueryError;
use crate::result::Selection;

/// [§ 1 Introduction](https://www.w3.org/TR/xpath-10/#section-Introduction):
/// the four basic types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An ordered, duplicate-free node-set.
    Nodes(Vec<Selection>),
    /// `true` / `false`
    Boolean(bool),
    /// IEEE 754 double.
    Number(f64),
    /// A string.
    String(String),
}

/// [§ 1](https://www.w3.org/TR/xpath-10/#section-Introduction): "the context
/// node, a pair of non-zero positive integers (the context position and the
/// context size)".
#[derive(Debug, Clone, Copy)]
struct Context {
    item: Selection,
    position: usize,
    size: usize,
}

/// Evaluates parsed expressions against one tree.
pub struct Evaluator<'t> {
    tree: &'t DomTree,
    expression: String,
    /// Pre-order index of every node, by `NodeId`.
    order: Vec<usize>,
}

impl<'t> Evaluator<'t> {
    /// Prepare to evaluate `expression` (kept for error messages) over `tree`.
    #[must_use]
    pub fn new(tree: &'t DomTree, expression: &str) -> Self {
        let mut order = vec![usize::MAX; tree.len()];
        let all = std::iter::once(NodeId::ROOT).chain(tree.descendants(NodeId::ROOT));
        for (index, id) in all.enumerate() {
            if let Some(slot) = order.get_mut(id.0) {
                *slot = index;
            }
        }
        Self {
            tree,
            expression: expression.to_string(),
            order,
        }
    }

    /// Evaluate `expr` with the Document as the context node.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidExpression`] when an operation gets a value of
    /// the wrong type, such as a predicate applied to a number.
    pub fn evaluate(&self, expr: &Expr) -> Result<Value, QueryError> {
        let context = Context {
            item: Selection::Node(NodeId::ROOT),
            position: 1,
            size: 1,
        };
        self.eval(expr, context)
    }

    fn type_error(&self, message: &str) -> QueryError {
        QueryError::invalid(&self.expression, message)
    }

    fn eval(&self, expr: &Expr, ctx: Context) -> Result<Value, QueryError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Literal(s) => Ok(Value::String(s.clone())),
            Expr::Negate(inner) => Ok(Value::Number(-self.to_number(&self.eval(inner, ctx)?))),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right, ctx),
            Expr::Function { function, args } => self.eval_function(*function, args, ctx),
            Expr::Path(path) => self.eval_path(path, ctx).map(Value::Nodes),
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let Value::Nodes(mut nodes) = self.eval(primary, ctx)? else {
                    return Err(self.type_error("predicate or path applied to a non-node-set"));
                };
                for predicate in predicates {
                    nodes = self.filter(nodes, predicate)?;
                }
                self.apply_steps(nodes, steps).map(Value::Nodes)
            }
            Expr::Union(left, right) => {
                let (Value::Nodes(mut nodes), Value::Nodes(more)) =
                    (self.eval(left, ctx)?, self.eval(right, ctx)?)
                else {
                    return Err(self.type_error("'|' requires node-sets on both sides"));
                };
                nodes.extend(more);
                self.sort_and_dedup(&mut nodes);
                Ok(Value::Nodes(nodes))
            }
        }
    }

    // ------------------------------------------------------------------
    // Location paths
    // ------------------------------------------------------------------

    fn eval_path(&self, path: &LocationPath, ctx: Context) -> Result<Vec<Selection>, QueryError> {
        let start = if path.absolute {
            Selection::Node(NodeId::ROOT)
        } else {
            ctx.item
        };
        self.apply_steps(vec![start], &path.steps)
    }

    fn apply_steps(
        &self,
        mut nodes: Vec<Selection>,
        steps: &[Step],
    ) -> Result<Vec<Selection>, QueryError> {
        for step in steps {
            let mut next = Vec::new();
            for &item in &nodes {
                let mut candidates: Vec<Selection> = self
                    .axis(item, step.axis)
                    .into_iter()
                    .filter(|&c| self.node_test(c, &step.test, step.axis))
                    .collect();
                // Candidates are in axis order, so positions count outward
                // from the context node on reverse axes.
                for predicate in &step.predicates {
                    candidates = self.filter(candidates, predicate)?;
                }
                next.extend(candidates);
            }
            self.sort_and_dedup(&mut next);
            nodes = next;
        }
        Ok(nodes)
    }

    /// [§ 2.4 Predicates](https://www.w3.org/TR/xpath-10/#predicates): a
    /// number is compared with the context position, anything else is
    /// converted to a boolean.
    fn filter(&self, nodes: Vec<Selection>, predicate: &Expr) -> Result<Vec<Selection>, QueryError> {
        let size = nodes.len();
        let mut kept = Vec::new();
        for (index, item) in nodes.into_iter().enumerate() {
            let ctx = Context {
                item,
                position: index + 1,
                size,
            };
            let keep = match self.eval(predicate, ctx)? {
                #[allow(clippy::cast_precision_loss)]
                Value::Number(n) => (n - (index + 1) as f64).abs() < f64::EPSILON,
                other => to_boolean(&other),
            };
            if keep {
                kept.push(item);
            }
        }
        Ok(kept)
    }

    /// Nodes along `axis` from `item`, in axis order.
    fn axis(&self, item: Selection, axis: Axis) -> Vec<Selection> {
        let tree = self.tree;
        let nodes = |ids: &mut dyn Iterator<Item = NodeId>| -> Vec<Selection> {
            ids.map(Selection::Node).collect()
        };

        let Selection::Node(id) = item else {
            // Attributes have no children or siblings; their parent is the owner.
            let owner = item.node();
            return match axis {
                Axis::SelfAxis | Axis::DescendantOrSelf => vec![item],
                Axis::Parent => vec![Selection::Node(owner)],
                Axis::Ancestor => nodes(&mut std::iter::once(owner).chain(tree.ancestors(owner))),
                Axis::AncestorOrSelf => {
                    let mut out = vec![item];
                    out.extend(nodes(&mut std::iter::once(owner).chain(tree.ancestors(owner))));
                    out
                }
                Axis::Following => {
                    let mut out = nodes(&mut tree.descendants(owner));
                    out.extend(self.axis(Selection::Node(owner), Axis::Following));
                    out
                }
                Axis::Preceding => self.axis(Selection::Node(owner), Axis::Preceding),
                Axis::Child
                | Axis::Descendant
                | Axis::FollowingSibling
                | Axis::PrecedingSibling
                | Axis::Attribute => Vec::new(),
            };
        };

        match axis {
            Axis::Child => nodes(&mut tree.children(id).iter().copied()),
            Axis::Descendant => nodes(&mut tree.descendants(id)),
            Axis::DescendantOrSelf => nodes(&mut std::iter::once(id).chain(tree.descendants(id))),
            Axis::SelfAxis => vec![item],
            Axis::Parent => nodes(&mut tree.parent(id).into_iter()),
            Axis::Ancestor => nodes(&mut tree.ancestors(id)),
            Axis::AncestorOrSelf => nodes(&mut std::iter::once(id).chain(tree.ancestors(id))),
            Axis::FollowingSibling => nodes(&mut tree.following_siblings(id)),
            Axis::PrecedingSibling => nodes(&mut tree.preceding_siblings(id)),
            Axis::Following => {
                // Following siblings of self and of every ancestor, with their subtrees.
                let mut out = Vec::new();
                for start in std::iter::once(id).chain(tree.ancestors(id)) {
                    for sibling in tree.following_siblings(start) {
                        out.push(Selection::Node(sibling));
                        out.extend(tree.descendants(sibling).map(Selection::Node));
                    }
                }
                out.sort_by_key(|&s| self.order_key(s));
                out
            }
            Axis::Preceding => {
                let own = self.order_of(id);
                let mut out: Vec<Selection> = tree
                    .descendants(NodeId::ROOT)
                    .take_while(|&n| self.order_of(n) < own)
                    .filter(|&n| !tree.is_descendant_of(id, n))
                    .map(Selection::Node)
                    .collect();
                out.reverse();
                out
            }
            Axis::Attribute => tree
                .as_element(id)
                .map(|e| {
                    (0..e.attrs.len())
                        .map(|index| Selection::Attribute { owner: id, index })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// [§ 2.3 Node Tests](https://www.w3.org/TR/xpath-10/#node-tests)
    fn node_test(&self, item: Selection, test: &NodeTest, axis: Axis) -> bool {
        let grammar = self.tree.grammar();
        if let Some(attr) = item.attribute(self.tree) {
            // The attribute axis' principal node type is attribute.
            return match test {
                NodeTest::Name(name) => axis == Axis::Attribute && grammar.names_match(&attr.name, name),
                NodeTest::Any => axis == Axis::Attribute,
                NodeTest::Node => true,
                NodeTest::Text | NodeTest::Comment | NodeTest::ProcessingInstruction(_) => false,
            };
        }
        if axis == Axis::Attribute {
            return false;
        }
        let node_type = self.tree.node_type(item.node());
        match (test, node_type) {
            (NodeTest::Node, Some(_)) => true,
            (NodeTest::Any, Some(NodeType::Element(_))) => true,
            (NodeTest::Name(name), Some(NodeType::Element(e))) => grammar.names_match(&e.tag_name, name),
            (NodeTest::Text, Some(NodeType::Text(_) | NodeType::CData(_))) => true,
            (NodeTest::Comment, Some(NodeType::Comment(_))) => true,
            (NodeTest::ProcessingInstruction(wanted), Some(NodeType::ProcessingInstruction { target, .. })) => {
                wanted.as_ref().is_none_or(|w| w == target)
            }
            _ => false,
        }
    }

    fn order_of(&self, id: NodeId) -> usize {
        self.order.get(id.0).copied().unwrap_or(usize::MAX)
    }

    fn order_key(&self, item: Selection) -> (usize, usize) {
        match item {
            Selection::Node(id) => (self.order_of(id), 0),
            Selection::Attribute { owner, index } => (self.order_of(owner), index + 1),
        }
    }

    fn sort_and_dedup(&self, nodes: &mut Vec<Selection>) {
        nodes.sort_by_key(|&s| self.order_key(s));
        nodes.dedup();
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: Context,
    ) -> Result<Value, QueryError> {
        match op {
            BinaryOp::Or => {
                let l = self.eval(left, ctx)?;
                Ok(Value::Boolean(
                    to_boolean(&l) || to_boolean(&self.eval(right, ctx)?),
                ))
            }
            BinaryOp::And => {
                let l = self.eval(left, ctx)?;
                Ok(Value::Boolean(
                    to_boolean(&l) && to_boolean(&self.eval(right, ctx)?),
                ))
            }
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
                let l = self.eval(left, ctx)?;
                let r = self.eval(right, ctx)?;
                Ok(Value::Boolean(self.compare(op, &l, &r)))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                let l = self.to_number(&self.eval(left, ctx)?);
                let r = self.to_number(&self.eval(right, ctx)?);
                Ok(Value::Number(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    _ => l % r,
                }))
            }
        }
    }

    /// [§ 3.4 Booleans](https://www.w3.org/TR/xpath-10/#booleans): comparisons
    /// involving node-sets are true if any member satisfies them.
    fn compare(&self, op: BinaryOp, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Nodes(l), Value::Nodes(r)) => {
                let right_strings: Vec<String> =
                    r.iter().map(|s| s.string_value(self.tree)).collect();
                l.iter().any(|a| {
                    let a = Value::String(a.string_value(self.tree));
                    right_strings
                        .iter()
                        .any(|b| self.compare_atomic(op, &a, &Value::String(b.clone())))
                })
            }
            (Value::Nodes(nodes), other) => match other {
                Value::Boolean(_) => {
                    self.compare_atomic(op, &Value::Boolean(!nodes.is_empty()), other)
                }
                _ => nodes.iter().any(|n| {
                    let value = match other {
                        Value::Number(_) => Value::Number(parse_number(&n.string_value(self.tree))),
                        _ => Value::String(n.string_value(self.tree)),
                    };
                    self.compare_atomic(op, &value, other)
                }),
            },
            (other, Value::Nodes(_)) => self.compare(mirror(op), right, other),
            _ => self.compare_atomic(op, left, right),
        }
    }

    fn compare_atomic(&self, op: BinaryOp, left: &Value, right: &Value) -> bool {
        if matches!(op, BinaryOp::Eq | BinaryOp::Neq) {
            let equal = match (left, right) {
                (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
                    to_boolean(left) == to_boolean(right)
                }
                (Value::Number(_), _) | (_, Value::Number(_)) => {
                    #[allow(clippy::float_cmp)]
                    let equal = self.to_number(left) == self.to_number(right);
                    equal
                }
                _ => self.string_of(left) == self.string_of(right),
            };
            return equal == (op == BinaryOp::Eq);
        }
        let ordering = self.to_number(left).partial_cmp(&self.to_number(right));
        match op {
            BinaryOp::Lt => ordering == Some(Ordering::Less),
            BinaryOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            BinaryOp::Gt => ordering == Some(Ordering::Greater),
            BinaryOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Conversions (§ 4.2 string(), § 4.3 boolean(), § 4.4 number())
    // ------------------------------------------------------------------

    /// [§ 4.4 `number()`](https://www.w3.org/TR/xpath-10/#function-number)
    fn to_number(&self, value: &Value) -> f64 {
        match value {
            Value::Number(n) => *n,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::String(s) => parse_number(s),
            Value::Nodes(_) => parse_number(&self.string_of(value)),
        }
    }

    /// [§ 4.2 `string()`](https://www.w3.org/TR/xpath-10/#function-string):
    /// a node-set converts to the string-value of its first node.
    pub(crate) fn string_of(&self, value: &Value) -> String {
        match value {
            Value::Nodes(nodes) => nodes
                .first()
                .map(|n| n.string_value(self.tree))
                .unwrap_or_default(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    fn eval_function(
        &self,
        function: Function,
        args: &[Expr],
        ctx: Context,
    ) -> Result<Value, QueryError> {
        let string_arg = |index: usize| -> Result<String, QueryError> {
            match args.get(index) {
                Some(arg) => Ok(self.string_of(&self.eval(arg, ctx)?)),
                None => Ok(ctx.item.string_value(self.tree)),
            }
        };
        let node_arg = |index: usize| -> Result<Option<Selection>, QueryError> {
            match args.get(index) {
                Some(arg) => match self.eval(arg, ctx)? {
                    Value::Nodes(nodes) => Ok(nodes.first().copied()),
                    _ => Err(self.type_error(&format!("{function}() expects a node-set"))),
                },
                None => Ok(Some(ctx.item)),
            }
        };

        #[allow(clippy::cast_precision_loss)]
        let value = match function {
            Function::Last => Value::Number(ctx.size as f64),
            Function::Position => Value::Number(ctx.position as f64),
            Function::Count => match args.first().map(|a| self.eval(a, ctx)).transpose()? {
                Some(Value::Nodes(nodes)) => Value::Number(nodes.len() as f64),
                _ => return Err(self.type_error("count() expects a node-set")),
            },
            Function::Name => Value::String(node_arg(0)?.map(|n| self.name_of(n)).unwrap_or_default()),
            Function::LocalName => Value::String(
                node_arg(0)?
                    .map(|n| {
                        let name = self.name_of(n);
                        name.rsplit(':').next().unwrap_or_default().to_string()
                    })
                    .unwrap_or_default(),
            ),
            Function::String => Value::String(string_arg(0)?),
            Function::Concat => {
                let mut out = String::new();
                for index in 0..args.len() {
                    out.push_str(&string_arg(index)?);
                }
                Value::String(out)
            }
            Function::StringLength => Value::Number(string_arg(0)?.chars().count() as f64),
            Function::NormalizeSpace => {
                Value::String(string_arg(0)?.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            Function::Contains => Value::Boolean(string_arg(0)?.contains(&string_arg(1)?)),
            Function::StartsWith => Value::Boolean(string_arg(0)?.starts_with(&string_arg(1)?)),
            Function::SubstringBefore => {
                let (haystack, needle) = (string_arg(0)?, string_arg(1)?);
                Value::String(
                    haystack
                        .split_once(needle.as_str())
                        .map(|(before, _)| before.to_string())
                        .unwrap_or_default(),
                )
            }
            Function::SubstringAfter => {
                let (haystack, needle) = (string_arg(0)?, string_arg(1)?);
                Value::String(
                    haystack
                        .split_once(needle.as_str())
                        .map(|(_, after)| after.to_string())
                        .unwrap_or_default(),
                )
            }
            Function::Not | Function::Boolean => {
                let value = match args.first() {
                    Some(arg) => self.eval(arg, ctx)?,
                    None => Value::Boolean(false),
                };
                let truth = to_boolean(&value);
                Value::Boolean(if function == Function::Not { !truth } else { truth })
            }
            Function::True => Value::Boolean(true),
            Function::False => Value::Boolean(false),
            Function::Number => match args.first() {
                Some(arg) => Value::Number(self.to_number(&self.eval(arg, ctx)?)),
                None => Value::Number(parse_number(&ctx.item.string_value(self.tree))),
            },
        };
        Ok(value)
    }

    /// [§ 4.1 `name()`](https://www.w3.org/TR/xpath-10/#function-name)
    fn name_of(&self, item: Selection) -> String {
        if let Some(attr) = item.attribute(self.tree) {
            return attr.name.clone();
        }
        match self.tree.node_type(item.node()) {
            Some(NodeType::Element(e)) => e.tag_name.clone(),
            Some(NodeType::ProcessingInstruction { target, .. }) => target.clone(),
            _ => String::new(),
        }
    }
}

/// [§ 4.3 `boolean()`](https://www.w3.org/TR/xpath-10/#function-boolean)
fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Nodes(nodes) => !nodes.is_empty(),
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
    }
}

/// `a < b` is `b > a`.
const fn mirror(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::Lte => BinaryOp::Gte,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::Gte => BinaryOp::Lte,
        other => other,
    }
}

/// [§ 4.4](https://www.w3.org/TR/xpath-10/#function-number): optional
/// whitespace, optional minus, then `Digits ('.' Digits?)?` or `'.' Digits`.
/// Anything else is NaN.
fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if valid {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// [§ 4.2](https://www.w3.org/TR/xpath-10/#function-string): integers print
/// without a decimal point.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let integer = n as i64;
        integer.to_string()
    } else {
        n.to_string()
    }
}
