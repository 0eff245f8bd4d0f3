//! Variable substitution (spec §4.6).
//!
//! Rebuilds the tree bottom-up with an explicit stack — the same shape as
//! [`crate::tree::Node::clone`] — replacing every [`Node::Variable`] whose
//! name is a key of `bindings` with a clone of the bound replacement.
//! Ported from `tomsolver::Subs`/`SubsFunctions::SubsInner`.

use std::collections::HashMap;

use crate::error::CasError;
use crate::tree::Node;

enum Frame<'a> {
    Visit(&'a Node),
    Build { op: crate::operator::OpTag, has_right: bool },
}

/// Substitutes every variable named in `bindings` with its bound subtree,
/// leaving any variable not present in `bindings` untouched.
pub fn substitute(root: &Node, bindings: &HashMap<String, Node>) -> Node {
    let mut work = vec![Frame::Visit(root)];
    let mut values: Vec<Node> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Visit(Node::Number(v)) => values.push(Node::Number(*v)),
            Frame::Visit(Node::Variable(name)) => {
                let replacement = bindings.get(name).cloned().unwrap_or_else(|| Node::Variable(name.clone()));
                values.push(replacement);
            }
            Frame::Visit(Node::Operator { op, left, right }) => {
                work.push(Frame::Build { op: *op, has_right: right.is_some() });
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

/// Substitutes a single named variable with `replacement`.
pub fn substitute_one(root: &Node, name: &str, replacement: &Node) -> Node {
    let mut bindings = HashMap::new();
    bindings.insert(name.to_string(), replacement.clone());
    substitute(root, &bindings)
}

/// Substitutes `vars[i]` with `values[i].clone()` for each pair; fails if
/// the two slices don't match in length.
pub fn substitute_many(root: &Node, vars: &[String], values: &[Node]) -> Result<Node, CasError> {
    if vars.len() != values.len() {
        return Err(CasError::SubsCountMismatch { expected: vars.len(), got: values.len() });
    }
    let bindings: HashMap<String, Node> = vars.iter().cloned().zip(values.iter().cloned()).collect();
    Ok(substitute(root, &bindings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::eval::vpa;
    use crate::tree::{num, var};

    #[test]
    fn substitutes_a_single_variable() {
        let tree = var("x").unwrap() + num(1.0);
        let result = substitute_one(&tree, "x", &num(4.0));
        assert_eq!(vpa(&result, &Config::default()).unwrap(), 5.0);
    }

    #[test]
    fn leaves_unbound_variables_untouched() {
        let tree = var("x").unwrap() + var("y").unwrap();
        let result = substitute_one(&tree, "x", &num(4.0));
        assert_eq!(result.variable_names(), vec!["y".to_string()]);
    }

    #[test]
    fn substitute_many_rejects_length_mismatch() {
        let tree = var("x").unwrap();
        let err = substitute_many(&tree, &["x".to_string(), "y".to_string()], &[num(1.0)]).unwrap_err();
        assert_eq!(err, CasError::SubsCountMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn substitution_does_not_mutate_the_original_tree() {
        let tree = var("x").unwrap() * num(2.0);
        let _ = substitute_one(&tree, "x", &num(3.0));
        assert_eq!(tree.variable_names(), vec!["x".to_string()]);
    }
}
