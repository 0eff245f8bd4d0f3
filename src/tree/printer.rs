//! Non-recursive, precedence-aware in-order printer (spec §4.3).
//!
//! Parenthesization is decided purely from the *local* context passed down
//! when a child is pushed onto the work stack — there is no parent pointer
//! to consult, so the context a node needs (its parent's operator and
//! whether it is that parent's right child) is computed once, at the point
//! the parent pushes it, and carried alongside the node on the stack.

use crate::numeric;
use crate::operator::{Associativity, OpTag};
use crate::tree::Node;

/// What a node needs to know about its parent to decide its own
/// parenthesization. `Root` means "no parent" (or: the parent already
/// supplies its own wrapping, as function calls and unary +/- do).
#[derive(Clone, Copy)]
enum Ctx {
    Root,
    Child { parent_op: OpTag, is_right: bool },
}

enum Instr<'a> {
    Print(&'a Node, Ctx),
    Literal(&'static str),
}

/// Renders `root` as an infix expression, adding only the parentheses that
/// precedence and associativity actually require.
pub fn print(root: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![Instr::Print(root, Ctx::Root)];

    while let Some(instr) = stack.pop() {
        match instr {
            Instr::Literal(s) => out.push_str(s),
            Instr::Print(node, ctx) => print_one(node, ctx, &mut out, &mut stack),
        }
    }

    out
}

fn print_one<'a>(node: &'a Node, ctx: Ctx, out: &mut String, stack: &mut Vec<Instr<'a>>) {
    match node {
        Node::Number(v) => {
            let rendered = numeric::to_string(*v);
            // `a-(-3)`: a bare negative literal as the right operand of `-`
            // would otherwise read as `a--3`.
            let wrap = *v < 0.0 && matches!(ctx, Ctx::Child { parent_op: OpTag::Sub, is_right: true });
            if wrap {
                out.push('(');
                out.push_str(&rendered);
                out.push(')');
            } else {
                out.push_str(&rendered);
            }
        }
        Node::Variable(name) => out.push_str(name),
        Node::Operator { op, left, right: None } => {
            if op.is_function() {
                out.push_str(op.display());
                out.push('(');
                stack.push(Instr::Literal(")"));
                stack.push(Instr::Print(left, Ctx::Root));
            } else {
                // unary +/-: parenthesize only when the operand is itself
                // an operator; a bare literal or variable needs none.
                if left.is_operator() {
                    out.push('(');
                    out.push_str(op.display());
                    stack.push(Instr::Literal(")"));
                    stack.push(Instr::Print(left, Ctx::Root));
                } else {
                    out.push_str(op.display());
                    stack.push(Instr::Print(left, Ctx::Root));
                }
            }
        }
        Node::Operator { op, left, right: Some(right) } => {
            if binary_needs_parens(*op, ctx) {
                out.push('(');
                stack.push(Instr::Literal(")"));
            }
            stack.push(Instr::Print(right, Ctx::Child { parent_op: *op, is_right: true }));
            stack.push(Instr::Literal(op.display()));
            stack.push(Instr::Print(left, Ctx::Child { parent_op: *op, is_right: false }));
        }
    }
}

fn binary_needs_parens(op: OpTag, ctx: Ctx) -> bool {
    let Ctx::Child { parent_op, is_right } = ctx else {
        return false;
    };

    let parent_rank = parent_op.precedence();
    let own_rank = op.precedence();

    if parent_rank > own_rank {
        return true;
    }
    if parent_rank < own_rank {
        return false;
    }

    // Same precedence: the "natural" side is the one associativity already
    // groups without ambiguity (left child of a left-associative parent,
    // right child of a right-associative parent); the other side needs
    // parens to preserve grouping, unless the parent is commutative enough
    // that reassociating doesn't change the result (e.g. `a+(b+c)`).
    let natural_side = match parent_op.associativity() {
        Associativity::Left => !is_right,
        Associativity::Right => is_right,
    };

    !natural_side && !parent_op.is_commutative()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{num, var};

    #[test]
    fn simple_sum_has_no_parens() {
        let tree = var("x").unwrap() + num(1.0);
        assert_eq!(print(&tree), "x+1");
    }

    #[test]
    fn multiplication_over_addition_parenthesizes_the_addition() {
        let tree = (var("x").unwrap() + num(1.0)) * num(2.0);
        assert_eq!(print(&tree), "(x+1)*2");
    }

    #[test]
    fn power_is_right_associative_and_does_not_parenthesize_the_right_spine() {
        let tree = crate::tree::pow(num(2.0), crate::tree::pow(num(3.0), num(2.0)));
        assert_eq!(print(&tree), "2^3^2");
    }

    #[test]
    fn right_child_of_non_commutative_same_rank_parent_is_wrapped() {
        let tree = var("a").unwrap() - (var("b").unwrap() + var("c").unwrap());
        assert_eq!(print(&tree), "a-(b+c)");
    }

    #[test]
    fn subtraction_is_left_associative_so_left_spine_is_bare() {
        let tree = (var("a").unwrap() - var("b").unwrap()) - var("c").unwrap();
        assert_eq!(print(&tree), "a-b-c");
    }

    #[test]
    fn unary_minus_on_a_leaf_has_no_parens() {
        let tree = -var("x").unwrap();
        assert_eq!(print(&tree), "-x");
    }

    #[test]
    fn unary_minus_on_an_operator_child_is_wrapped() {
        let tree = -(var("x").unwrap() + num(1.0));
        assert_eq!(print(&tree), "-(x+1)");
    }

    #[test]
    fn function_call_always_wraps_its_argument() {
        let tree = crate::tree::sin(var("x").unwrap() + num(1.0));
        assert_eq!(print(&tree), "sin(x+1)");
    }

    #[test]
    fn bare_negative_literal_as_right_operand_of_minus_is_wrapped() {
        let tree = var("a").unwrap() - num(-3.0);
        assert_eq!(print(&tree), "a-(-3)");
    }

    #[test]
    fn deeply_left_nested_sum_prints_without_overflow() {
        let mut tree = num(0.0);
        for _ in 0..100_000 {
            tree = tree + num(1.0);
        }
        let rendered = print(&tree);
        assert!(rendered.ends_with("+1"));
    }
}
