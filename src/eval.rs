//! Non-recursive numeric evaluation ("vpa", spec §4.4).
//!
//! Ported from `tomsolver::NodeImpl::VpaNonRecursively`'s two-stack shape:
//! one stack collects nodes in reverse postorder, then a second pass reduces
//! them left-to-right with a value stack, calling [`crate::operator::calc`]
//! at each operator. No recursion, so depth is bounded only by heap size.

use crate::config::Config;
use crate::error::CasError;
use crate::operator::calc;
use crate::tree::Node;

/// Evaluates `root` to a single `f64`. Every leaf must be a [`Node::Number`]
/// — any [`Node::Variable`] still present raises
/// [`CasError::VariablePresent`] naming the first one found.
pub fn vpa(root: &Node, cfg: &Config) -> Result<f64, CasError> {
    let mut postorder: Vec<&Node> = Vec::new();
    let mut work = vec![root];
    while let Some(node) = work.pop() {
        if let Node::Operator { left, right, .. } = node {
            work.push(left);
            if let Some(r) = right {
                work.push(r);
            }
        }
        postorder.push(node);
    }

    let mut values: Vec<f64> = Vec::new();
    while let Some(node) = postorder.pop() {
        match node {
            Node::Number(v) => values.push(*v),
            Node::Variable(name) => return Err(CasError::VariablePresent(name.clone())),
            Node::Operator { op, right, .. } => {
                if right.is_some() {
                    let r = values.pop().expect("postorder invariant: right operand present");
                    let l = values.pop().expect("postorder invariant: left operand present");
                    values.push(calc(*op, l, r, cfg)?);
                } else {
                    let l = values.pop().expect("postorder invariant: operand present");
                    values.push(calc(*op, l, 0.0, cfg)?);
                }
            }
        }
    }

    values.pop().ok_or(CasError::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{num, pow, sin, var};

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn evaluates_a_simple_arithmetic_tree() {
        let tree = num(1.0) + num(2.0) * num(3.0);
        assert_eq!(vpa(&tree, &cfg()).unwrap(), 7.0);
    }

    #[test]
    fn evaluates_right_associative_power_tower() {
        let tree = pow(num(2.0), pow(num(3.0), num(2.0)));
        assert_eq!(vpa(&tree, &cfg()).unwrap(), 512.0);
    }

    #[test]
    fn evaluates_function_calls() {
        let tree = sin(num(0.0));
        assert!(vpa(&tree, &cfg()).unwrap().abs() < 1e-12);
    }

    #[test]
    fn residual_variable_is_rejected() {
        let tree = var("x").unwrap() + num(1.0);
        assert_eq!(vpa(&tree, &cfg()).unwrap_err(), CasError::VariablePresent("x".to_string()));
    }

    #[test]
    fn deeply_nested_tree_evaluates_without_overflow() {
        let mut tree = num(0.0);
        for _ in 0..200_000 {
            tree = tree + num(1.0);
        }
        assert_eq!(vpa(&tree, &cfg()).unwrap(), 200_000.0);
    }
}
