//! Symbolic differentiation (spec §4.8).
//!
//! `diff_once` rewrites the tree bottom-up with an explicit stack (the same
//! shape `simplify` and `Node::clone` use): every leaf differentiates to a
//! constant, every operator differentiates per the rule table below, and an
//! operator whose operands are already fully numeric short-circuits straight
//! to `0` before the per-op rule ever runs. `diff` runs `diff_once` `k`
//! times, simplifying the result after each pass — the tree only stays
//! algebraically tidy because of that, never because `diff_once` itself
//! tries to fold anything.

use std::f64::consts::{LN_10, LN_2};

use crate::config::Config;
use crate::error::CasError;
use crate::operator::OpTag;
use crate::simplify::simplify;
use crate::tree::{self, num, Node};

enum Frame<'a> {
    Visit(&'a Node),
    Build(&'a Node),
}

/// Differentiates `root` with respect to `varname` once, without
/// simplifying the result.
pub fn diff_once(root: &Node, varname: &str) -> Result<Node, CasError> {
    let mut work = vec![Frame::Visit(root)];
    let mut values: Vec<Node> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Visit(Node::Number(_)) => values.push(num(0.0)),
            Frame::Visit(Node::Variable(name)) => values.push(num(if name == varname { 1.0 } else { 0.0 })),
            Frame::Visit(node @ Node::Operator { left, right, .. }) => {
                work.push(Frame::Build(node));
                if let Some(r) = right {
                    work.push(Frame::Visit(r));
                }
                work.push(Frame::Visit(left));
            }
            Frame::Build(node) => {
                let Node::Operator { op, left, right } = node else {
                    unreachable!("Build frames only ever wrap Operator nodes")
                };
                let right_deriv = if right.is_some() { Some(values.pop().unwrap()) } else { None };
                let left_deriv = values.pop().unwrap();
                let result = rewrite(*op, left, right.as_deref(), left_deriv, right_deriv)?;
                values.push(result);
            }
        }
    }

    Ok(values.pop().expect("exactly one root value remains"))
}

/// Differentiates `root` `k` times, simplifying after each pass.
pub fn diff(root: &Node, varname: &str, k: u32, cfg: &Config) -> Result<Node, CasError> {
    let mut current = simplify(root, cfg)?;
    for _ in 0..k.max(1) {
        let derived = diff_once(&current, varname)?;
        current = simplify(&derived, cfg)?;
    }
    Ok(current)
}

fn rewrite(op: OpTag, left: &Node, right: Option<&Node>, left_d: Node, right_d: Option<Node>) -> Result<Node, CasError> {
    let all_numeric = left.is_number() && right.map_or(true, Node::is_number);
    if all_numeric {
        return Ok(num(0.0));
    }

    use OpTag::*;
    match op {
        Positive | Negative => Node::try_unary(op, left_d),
        Sin => Ok(tree::cos(left.clone()) * left_d),
        Cos => Ok(-tree::sin(left.clone()) * left_d),
        Tan => Ok((num(1.0) / tree::pow(tree::cos(left.clone()), num(2.0))) * left_d),
        Arcsin => Ok((num(1.0) / tree::sqrt(num(1.0) - tree::pow(left.clone(), num(2.0)))) * left_d),
        Arccos => Ok((num(-1.0) / tree::sqrt(num(1.0) - tree::pow(left.clone(), num(2.0)))) * left_d),
        Arctan => Ok((num(1.0) / (num(1.0) + tree::pow(left.clone(), num(2.0)))) * left_d),
        Sqrt => Ok((num(1.0) / (num(2.0) * tree::sqrt(left.clone()))) * left_d),
        Log => Ok((num(1.0) / left.clone()) * left_d),
        Log2 => Ok((num(1.0) / (left.clone() * num(LN_2))) * left_d),
        Log10 => Ok((num(1.0) / (left.clone() * num(LN_10))) * left_d),
        Exp => Ok(tree::exp(left.clone()) * left_d),
        Add => Ok(left_d + right_d.expect("Add is binary")),
        Sub => Ok(left_d - right_d.expect("Sub is binary")),
        Mul => {
            let r = right.expect("Mul is binary");
            let rd = right_d.expect("Mul is binary");
            if left.is_number() {
                Ok(left.clone() * rd)
            } else if r.is_number() {
                Ok(left_d * r.clone())
            } else {
                Ok(left_d * r.clone() + left.clone() * rd)
            }
        }
        Div => {
            let r = right.expect("Div is binary");
            let rd = right_d.expect("Div is binary");
            if r.is_number() {
                Ok(left_d / r.clone())
            } else {
                Ok((left_d * r.clone() - left.clone() * rd) / tree::pow(r.clone(), num(2.0)))
            }
        }
        Pow => {
            let r = right.expect("Pow is binary");
            let rd = right_d.expect("Pow is binary");
            if let Some(c) = r.as_number() {
                Ok(num(c) * tree::pow(left.clone(), num(c - 1.0)) * left_d)
            } else if let Some(c) = left.as_number().filter(|c| *c > 0.0) {
                Ok(tree::pow(left.clone(), r.clone()) * num(c.ln()) * rd)
            } else {
                general_power_rule(left, r, left_d, rd)
            }
        }
        And | Or | Mod => Err(CasError::NonDifferentiable(op)),
        LParen | RParen | Null => unreachable!("parser-internal tags never appear in a built tree"),
    }
}

/// `(u^v)' = u^v * (v'*ln(u) + v*u'/u)`, the closed-form expansion of
/// differentiating `v*ln(u)` by the product and chain rules.
fn general_power_rule(u: &Node, v: &Node, u_d: Node, v_d: Node) -> Result<Node, CasError> {
    Ok(tree::pow(u.clone(), v.clone()) * (v_d * tree::log(u.clone()) + v.clone() * (u_d / u.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::vpa;
    use crate::tree::{cos, exp, sin, var};

    fn cfg() -> Config {
        Config::default()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn derivative_of_sin_is_cos() {
        let d = diff(&sin(var("x").unwrap()), "x", 1, &cfg()).unwrap();
        for x in [-1.2, 0.0, 0.7, 2.5] {
            let at_x = crate::subs::substitute_one(&d, "x", &num(x));
            assert!(close(vpa(&at_x, &cfg()).unwrap(), x.cos()));
        }
    }

    #[test]
    fn derivative_of_exp_sin_uses_the_chain_rule() {
        // d/dx exp(sin(x)) == exp(sin(x)) * cos(x)
        let tree = exp(sin(var("x").unwrap()));
        let d = diff(&tree, "x", 1, &cfg()).unwrap();
        for x in [-1.0, 0.3, 1.8] {
            let at_x = crate::subs::substitute_one(&d, "x", &num(x));
            let expected = x.sin().exp() * x.cos();
            assert!(close(vpa(&at_x, &cfg()).unwrap(), expected));
        }
    }

    #[test]
    fn derivative_of_a_constant_is_zero() {
        let d = diff(&(num(2.0) * num(3.0)), "x", 1, &cfg()).unwrap();
        assert_eq!(d, Node::Number(0.0));
    }

    #[test]
    fn product_rule_matches_numerically() {
        let tree = var("x").unwrap() * cos(var("x").unwrap());
        let d = diff(&tree, "x", 1, &cfg()).unwrap();
        for x in [0.5, 1.5] {
            let at_x = crate::subs::substitute_one(&d, "x", &num(x));
            let expected = x.cos() - x * x.sin();
            assert!(close(vpa(&at_x, &cfg()).unwrap(), expected));
        }
    }

    #[test]
    fn quotient_rule_matches_numerically() {
        let tree = sin(var("x").unwrap()) / var("x").unwrap();
        let d = diff(&tree, "x", 1, &cfg()).unwrap();
        let at_x = crate::subs::substitute_one(&d, "x", &num(2.0));
        let expected = (2.0f64.cos() * 2.0 - 2.0f64.sin()) / (2.0 * 2.0);
        assert!(close(vpa(&at_x, &cfg()).unwrap(), expected));
    }

    #[test]
    fn power_rule_with_constant_exponent() {
        let tree = tree::pow(var("x").unwrap(), num(3.0));
        let d = diff(&tree, "x", 1, &cfg()).unwrap();
        let at_x = crate::subs::substitute_one(&d, "x", &num(2.0));
        assert!(close(vpa(&at_x, &cfg()).unwrap(), 12.0));
    }

    #[test]
    fn second_derivative_of_sin_is_negative_sin() {
        let d2 = diff(&sin(var("x").unwrap()), "x", 2, &cfg()).unwrap();
        let at_x = crate::subs::substitute_one(&d2, "x", &num(1.3));
        assert!(close(vpa(&at_x, &cfg()).unwrap(), -(1.3f64.sin())));
    }

    #[test]
    fn bitwise_and_is_not_differentiable() {
        let tree = var("x").unwrap() & var("y").unwrap();
        assert_eq!(diff_once(&tree, "x").unwrap_err(), CasError::NonDifferentiable(OpTag::And));
    }

    #[test]
    fn bitwise_op_over_constants_still_short_circuits_to_zero() {
        let tree = num(3.0) % num(2.0);
        assert_eq!(diff_once(&tree, "x").unwrap(), num(0.0));
    }
}
