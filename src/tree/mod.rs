//! The expression tree and its smart constructors (spec §4.1, §4.2).
//!
//! `Node` stores no parent back-pointer at all (spec §9's Open Question):
//! every traversal that needs ancestor context threads it through explicit
//! arguments instead, which keeps the tree a plain `Box`-owned structure
//! safe to move, clone and drop without any aliasing bookkeeping.
//!
//! Clone, `PartialEq` and `Drop` are all implemented with an explicit stack
//! rather than recursion, so a tree a few hundred thousand nodes deep never
//! blows the call stack (spec §5, §8).

pub mod printer;

use std::collections::HashSet;
use std::mem;

use crate::error::CasError;
use crate::operator::OpTag;

/// A node in the expression tree: a numeric literal, a named variable, or an
/// operator with one child (unary) or two (binary).
#[derive(Debug)]
pub enum Node {
    Number(f64),
    Variable(String),
    Operator {
        op: OpTag,
        left: Box<Node>,
        right: Option<Box<Node>>,
    },
}

/// First character must be a letter or underscore; the rest alphanumeric or
/// underscore. Rejects names that collide with a function keyword, since
/// `sin` would otherwise be ambiguous between a variable and a call.
pub(crate) fn validate_var_name(name: &str) -> Result<(), CasError> {
    let mut chars = name.chars();
    let ok_first = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
    let ok_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !ok_first || !ok_rest {
        return Err(CasError::InvalidVarName(name.to_string()));
    }
    if OpTag::from_function_name(name).is_some() {
        return Err(CasError::InvalidVarName(name.to_string()));
    }
    Ok(())
}

/// A numeric literal.
pub fn num(value: f64) -> Node {
    Node::Number(value)
}

/// A named variable. Fails on names shaped like a function keyword or with
/// illegal characters.
pub fn var(name: impl Into<String>) -> Result<Node, CasError> {
    let name = name.into();
    validate_var_name(&name)?;
    Ok(Node::Variable(name))
}

/// Accepts both an owned `Node` and a borrowed `&Node` so the arithmetic
/// combinators below can be called either way, cloning on the borrowed path.
pub trait IntoNode {
    fn into_node(self) -> Node;
}

impl IntoNode for Node {
    fn into_node(self) -> Node {
        self
    }
}

impl IntoNode for &Node {
    fn into_node(self) -> Node {
        self.clone()
    }
}

/// Builds a unary-operator node for a fixed, compile-time-known tag. Used by
/// the combinator functions below; the parser uses [`Node::try_unary`] for
/// runtime-determined tags instead.
fn unary_op(op: OpTag, operand: impl IntoNode) -> Node {
    Node::Operator {
        op,
        left: Box::new(operand.into_node()),
        right: None,
    }
}

/// Builds a binary-operator node for a fixed, compile-time-known tag.
fn binary_op(op: OpTag, lhs: impl IntoNode, rhs: impl IntoNode) -> Node {
    Node::Operator {
        op,
        left: Box::new(lhs.into_node()),
        right: Some(Box::new(rhs.into_node())),
    }
}

impl Node {
    /// Builds an operator node for a tag determined at runtime (the parser's
    /// use case), checking its arity matches the number of operands given.
    pub fn try_unary(op: OpTag, operand: Node) -> Result<Node, CasError> {
        if op.arity() != Some(1) {
            return Err(CasError::InvalidOp);
        }
        Ok(unary_op(op, operand))
    }

    pub fn try_binary(op: OpTag, lhs: Node, rhs: Node) -> Result<Node, CasError> {
        if op.arity() != Some(2) {
            return Err(CasError::InvalidOp);
        }
        Ok(binary_op(op, lhs, rhs))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Node::Number(_))
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Node::Operator { .. })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Node::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Collects every distinct variable name, in first-occurrence pre-order,
    /// via an explicit stack (spec §4.2 "non-recursive" requirement).
    pub fn variable_names(&self) -> Vec<String> {
        let mut stack: Vec<&Node> = vec![self];
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        while let Some(node) = stack.pop() {
            match node {
                Node::Variable(name) => {
                    if seen.insert(name.clone()) {
                        names.push(name.clone());
                    }
                }
                Node::Operator { left, right, .. } => {
                    if let Some(r) = right {
                        stack.push(r);
                    }
                    stack.push(left);
                }
                Node::Number(_) => {}
            }
        }
        names
    }

    /// Debug-only sanity check: every operator's arity matches the children
    /// it actually carries. Walked non-recursively like everything else
    /// here; there is no parent pointer left to check (spec §9).
    pub fn check_arity_invariants(&self) -> bool {
        let mut stack: Vec<&Node> = vec![self];
        while let Some(node) = stack.pop() {
            if let Node::Operator { op, left, right } = node {
                let expected = op.arity();
                let actual = if right.is_some() { Some(2) } else { Some(1) };
                if expected != actual {
                    return false;
                }
                if let Some(r) = right {
                    stack.push(r);
                }
                stack.push(left);
            }
        }
        true
    }
}

impl Clone for Node {
    /// Flattens `self` into reverse-postorder with an explicit stack, then
    /// rebuilds the copy bottom-up from a value stack — the same two-stack
    /// shape the parser uses to build a tree from postfix tokens and the
    /// evaluator uses to reduce one (spec §4.2, §4.4, §4.5).
    fn clone(&self) -> Self {
        enum Frame<'a> {
            Visit(&'a Node),
            Build { op: OpTag, has_right: bool },
        }

        let mut work = vec![Frame::Visit(self)];
        let mut values: Vec<Node> = Vec::new();

        while let Some(frame) = work.pop() {
            match frame {
                Frame::Visit(Node::Number(v)) => values.push(Node::Number(*v)),
                Frame::Visit(Node::Variable(name)) => values.push(Node::Variable(name.clone())),
                Frame::Visit(Node::Operator { op, left, right }) => {
                    work.push(Frame::Build {
                        op: *op,
                        has_right: right.is_some(),
                    });
                    if let Some(r) = right {
                        work.push(Frame::Visit(r));
                    }
                    work.push(Frame::Visit(left));
                }
                Frame::Build { op, has_right } => {
                    let right = if has_right { Some(Box::new(values.pop().unwrap())) } else { None };
                    let left = Box::new(values.pop().unwrap());
                    values.push(Node::Operator { op, left, right });
                }
            }
        }

        values.pop().expect("exactly one root value remains")
    }
}

impl PartialEq for Node {
    /// Structural equality via an explicit stack of pending pairs, rather
    /// than a recursive `==`, for the same depth-safety reason as `Clone`.
    fn eq(&self, other: &Self) -> bool {
        let mut stack: Vec<(&Node, &Node)> = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            match (a, b) {
                (Node::Number(x), Node::Number(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Node::Variable(x), Node::Variable(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (
                    Node::Operator { op: op_a, left: la, right: ra },
                    Node::Operator { op: op_b, left: lb, right: rb },
                ) => {
                    if op_a != op_b {
                        return false;
                    }
                    match (ra.as_deref(), rb.as_deref()) {
                        (Some(ra), Some(rb)) => stack.push((ra, rb)),
                        (None, None) => {}
                        _ => return false,
                    }
                    stack.push((la, lb));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Drop for Node {
    /// Detaches every child into a side list behind a trivial placeholder
    /// before dropping it, so Rust's generated drop glue never recurses more
    /// than one level deep no matter how tall the tree is (spec §5, §8).
    fn drop(&mut self) {
        let mut pending: Vec<Node> = Vec::new();

        if let Node::Operator { left, right, .. } = self {
            pending.push(mem::replace(left.as_mut(), Node::Number(0.0)));
            if let Some(r) = right {
                pending.push(mem::replace(r.as_mut(), Node::Number(0.0)));
            }
        }

        while let Some(mut node) = pending.pop() {
            if let Node::Operator { left, right, .. } = &mut node {
                pending.push(mem::replace(left.as_mut(), Node::Number(0.0)));
                if let Some(r) = right {
                    pending.push(mem::replace(r.as_mut(), Node::Number(0.0)));
                }
            }
            // `node`'s own Drop::drop runs here on scope exit, but its
            // children are already trivial placeholders, so it's O(1).
        }
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<Node> for Node {
            type Output = Node;
            fn $method(self, rhs: Node) -> Node {
                binary_op($op, self, rhs)
            }
        }
        impl std::ops::$trait<&Node> for Node {
            type Output = Node;
            fn $method(self, rhs: &Node) -> Node {
                binary_op($op, self, rhs)
            }
        }
        impl std::ops::$trait<Node> for &Node {
            type Output = Node;
            fn $method(self, rhs: Node) -> Node {
                binary_op($op, self, rhs)
            }
        }
        impl std::ops::$trait<&Node> for &Node {
            type Output = Node;
            fn $method(self, rhs: &Node) -> Node {
                binary_op($op, self, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, OpTag::Add);
impl_binary_op!(Sub, sub, OpTag::Sub);
impl_binary_op!(Mul, mul, OpTag::Mul);
impl_binary_op!(Div, div, OpTag::Div);
impl_binary_op!(BitAnd, bitand, OpTag::And);
impl_binary_op!(BitOr, bitor, OpTag::Or);
impl_binary_op!(Rem, rem, OpTag::Mod);

impl std::ops::Neg for Node {
    type Output = Node;
    fn neg(self) -> Node {
        unary_op(OpTag::Negative, self)
    }
}

impl std::ops::Neg for &Node {
    type Output = Node;
    fn neg(self) -> Node {
        unary_op(OpTag::Negative, self)
    }
}

macro_rules! unary_fn {
    ($name:ident, $op:expr) => {
        pub fn $name(operand: impl IntoNode) -> Node {
            unary_op($op, operand)
        }
    };
}

unary_fn!(sin, OpTag::Sin);
unary_fn!(cos, OpTag::Cos);
unary_fn!(tan, OpTag::Tan);
unary_fn!(arcsin, OpTag::Arcsin);
unary_fn!(arccos, OpTag::Arccos);
unary_fn!(arctan, OpTag::Arctan);
unary_fn!(sqrt, OpTag::Sqrt);
unary_fn!(log, OpTag::Log);
unary_fn!(log2, OpTag::Log2);
unary_fn!(log10, OpTag::Log10);
unary_fn!(exp, OpTag::Exp);

pub fn pow(base: impl IntoNode, exponent: impl IntoNode) -> Node {
    binary_op(OpTag::Pow, base, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Node {
        var("x").unwrap()
    }

    #[test]
    fn rejects_names_shaped_like_function_keywords() {
        assert!(var("sin").is_err());
        assert!(var("3x").is_err());
        assert!(var("x").is_ok());
        assert!(var("_underscored1").is_ok());
    }

    #[test]
    fn combinators_accept_owned_and_borrowed_operands() {
        let a = x();
        let b = num(2.0);
        let owned = a.clone() + b.clone();
        let borrowed = &a + &b;
        assert_eq!(owned, borrowed);
    }

    #[test]
    fn clone_produces_a_structurally_equal_deep_copy() {
        let tree = sin(x() + num(1.0)) * num(2.0);
        let cloned = tree.clone();
        assert_eq!(tree, cloned);
    }

    #[test]
    fn variable_names_are_deduplicated_in_first_occurrence_order() {
        let tree = (x() + var("y").unwrap()) * x();
        assert_eq!(tree.variable_names(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn deeply_right_nested_tree_clones_and_drops_without_overflow() {
        let mut tree = num(1.0);
        for _ in 0..200_000 {
            tree = tree + num(1.0);
        }
        let cloned = tree.clone();
        assert_eq!(tree, cloned);
        drop(tree);
        drop(cloned);
    }

    #[test]
    fn arity_invariant_holds_for_well_formed_trees() {
        let tree = sin(x()) + pow(x(), num(2.0));
        assert!(tree.check_arity_invariants());
    }
}
