//! Single-pass algebraic simplifier (spec §4.7).
//!
//! Post-order, non-recursive, and strictly local: constant subtrees fold via
//! [`calc`], and a handful of identities (`x*0`, `x+0`, `x/1`, ...) collapse
//! their parent — nothing is reordered or hoisted across siblings, and
//! there's no common-subexpression elimination. Ported from
//! `tomsolver::internal::SimplifyFunctions`.

use crate::config::Config;
use crate::error::CasError;
use crate::operator::{calc, OpTag};
use crate::tree::Node;

enum Frame<'a> {
    Visit(&'a Node),
    Build { op: OpTag, has_right: bool },
}

fn is_const(node: &Node, value: f64) -> bool {
    matches!(node, Node::Number(v) if *v == value)
}

/// Simplifies `root`, returning a new, independently-owned tree.
pub fn simplify(root: &Node, cfg: &Config) -> Result<Node, CasError> {
    let mut work = vec![Frame::Visit(root)];
    let mut values: Vec<Node> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Visit(Node::Number(v)) => values.push(Node::Number(*v)),
            Frame::Visit(Node::Variable(name)) => values.push(Node::Variable(name.clone())),
            Frame::Visit(Node::Operator { op, left, right }) => {
                work.push(Frame::Build { op: *op, has_right: right.is_some() });
                if let Some(r) = right {
                    work.push(Frame::Visit(r));
                }
                work.push(Frame::Visit(left));
            }
            Frame::Build { op, has_right } => {
                let right = if has_right { Some(values.pop().unwrap()) } else { None };
                let left = values.pop().unwrap();
                values.push(simplify_single(op, left, right, cfg)?);
            }
        }
    }

    Ok(values.pop().expect("exactly one root value remains"))
}

fn simplify_single(op: OpTag, left: Node, right: Option<Node>, cfg: &Config) -> Result<Node, CasError> {
    match right {
        None => {
            if let Node::Number(v) = left {
                return Ok(Node::Number(calc(op, v, 0.0, cfg)?));
            }
            Ok(Node::Operator { op, left: Box::new(left), right: None })
        }
        Some(right) => {
            if let (Node::Number(l), Node::Number(r)) = (&left, &right) {
                return Ok(Node::Number(calc(op, *l, *r, cfg)?));
            }

            let left_is_0 = is_const(&left, 0.0);
            let right_is_0 = is_const(&right, 0.0);
            let left_is_1 = is_const(&left, 1.0);
            let right_is_1 = is_const(&right, 1.0);

            if (op == OpTag::Mul && (left_is_0 || right_is_0))
                || (op == OpTag::Div && left_is_0)
                || (op == OpTag::Pow && left_is_0)
            {
                return Ok(Node::Number(0.0));
            }

            if (op == OpTag::Add && left_is_0) || (op == OpTag::Mul && left_is_1) {
                return Ok(right);
            }
            if (op == OpTag::Add && right_is_0)
                || (op == OpTag::Sub && right_is_0)
                || (op == OpTag::Mul && right_is_1)
                || (op == OpTag::Div && right_is_1)
                || (op == OpTag::Pow && right_is_1)
            {
                return Ok(left);
            }

            Ok(Node::Operator { op, left: Box::new(left), right: Some(Box::new(right)) })
        }
    }
}
