//! Infix token stream to postfix, then postfix to a [`Node`] tree (spec
//! §4.5). Ported from `tomsolver::internal::ParseFunctions::InOrderToPostOrder`
//! and `BuildExpressionTree`.

use crate::error::{CasError, SingleParseError};
use crate::operator::OpTag;
use crate::parser::lexer::{TokKind, Token};
use crate::tree::Node;

/// Standard shunting yard: operators pop off the stack onto the output
/// ahead of a new operator whenever the stack top binds at least as tightly
/// (strictly more tightly for a right-associative stack top, so `^` doesn't
/// pop its own kind). Parens and unary +/- are handled in their own arms:
/// `(` is pushed unconditionally, `)` unwinds back to its matching `(` (and
/// any function or unary sign wrapping that group), and unary +/- are
/// pushed without ever triggering the precedence-popping loop themselves.
pub(crate) fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, CasError> {
    let mut output: Vec<Token> = Vec::new();
    let mut stack: Vec<Token> = Vec::new();
    let mut paren_balance: i64 = 0;

    for tok in tokens {
        let op = match &tok.kind {
            TokKind::Number(_) | TokKind::Variable(_) => {
                output.push(tok);
                continue;
            }
            TokKind::Op(op) => *op,
        };

        match op {
            OpTag::LParen => {
                paren_balance += 1;
                stack.push(tok);
            }
            OpTag::Positive | OpTag::Negative => {
                stack.push(tok);
            }
            OpTag::RParen => {
                if paren_balance == 0 {
                    return Err(CasError::UnmatchedParenthesis(SingleParseError::new(
                        tok.line,
                        tok.col,
                        tok.line_text.clone(),
                        "unmatched ')'".to_string(),
                    )));
                }
                paren_balance -= 1;
                loop {
                    let top = stack.pop().ok_or_else(|| {
                        CasError::UnmatchedParenthesis(SingleParseError::new(
                            tok.line,
                            tok.col,
                            tok.line_text.clone(),
                            "unmatched ')'".to_string(),
                        ))
                    })?;
                    match &top.kind {
                        TokKind::Op(OpTag::LParen) => break,
                        _ => output.push(top),
                    }
                }
                if matches!(stack.last(), Some(t) if matches!(&t.kind, TokKind::Op(o) if o.is_function())) {
                    output.push(stack.pop().unwrap());
                }
                while matches!(stack.last(), Some(t) if matches!(&t.kind, TokKind::Op(OpTag::Positive) | TokKind::Op(OpTag::Negative)))
                {
                    output.push(stack.pop().unwrap());
                }
            }
            other => {
                let rank = other.precedence();
                while let Some(top) = stack.last() {
                    let top_op = match &top.kind {
                        TokKind::Op(o) => *o,
                        _ => break,
                    };
                    if top_op == OpTag::LParen {
                        break;
                    }
                    let top_rank = top_op.precedence();
                    let pops = if top_op.associativity() == crate::operator::Associativity::Left {
                        top_rank >= rank
                    } else {
                        top_rank > rank
                    };
                    if !pops {
                        break;
                    }
                    output.push(stack.pop().unwrap());
                }
                stack.push(tok);
            }
        }
    }

    while let Some(top) = stack.pop() {
        if matches!(&top.kind, TokKind::Op(OpTag::LParen)) {
            return Err(CasError::UnmatchedParenthesis(SingleParseError::new(
                top.line,
                top.col,
                top.line_text.clone(),
                "unmatched '('".to_string(),
            )));
        }
        output.push(top);
    }

    Ok(output)
}

/// Builds a tree from a postfix token stream with an explicit value stack,
/// the same technique [`Node::clone`] and [`crate::eval::vpa`] use.
pub(crate) fn build_tree(postfix: Vec<Token>) -> Result<Node, CasError> {
    let mut stack: Vec<(Node, Token)> = Vec::new();

    for tok in postfix {
        match &tok.kind {
            TokKind::Number(v) => stack.push((Node::Number(*v), tok)),
            TokKind::Variable(name) => stack.push((Node::Variable(name.clone()), tok)),
            TokKind::Op(op) => {
                let arity = op.arity().ok_or(CasError::InvalidOp)?;
                if arity == 2 {
                    let (right, _) = stack.pop().ok_or_else(|| wrong_expression(&tok))?;
                    let (left, _) = stack.pop().ok_or_else(|| wrong_expression(&tok))?;
                    let node = Node::try_binary(*op, left, right)?;
                    stack.push((node, tok));
                } else {
                    let (operand, _) = stack.pop().ok_or_else(|| wrong_expression(&tok))?;
                    let node = Node::try_unary(*op, operand)?;
                    stack.push((node, tok));
                }
            }
        }
    }

    if stack.len() > 1 {
        stack.pop();
        let errors = stack
            .into_iter()
            .map(|(_, tok)| SingleParseError::new(tok.line, tok.col, tok.line_text, "unexpected token".to_string()))
            .collect();
        return Err(CasError::MultiParseError(errors));
    }

    stack.pop().map(|(node, _)| node).ok_or(CasError::EmptyInput)
}

fn wrong_expression(tok: &Token) -> CasError {
    CasError::WrongExpression(SingleParseError::new(
        tok.line,
        tok.col,
        tok.line_text.clone(),
        "wrong expression: missing operand".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn postfix_kinds(input: &str) -> Vec<TokKind> {
        let toks = tokenize(input).unwrap();
        to_postfix(toks).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn precedence_reorders_multiplication_before_addition() {
        assert_eq!(
            postfix_kinds("1+2*3"),
            vec![TokKind::Number(1.0), TokKind::Number(2.0), TokKind::Number(3.0), TokKind::Op(OpTag::Mul), TokKind::Op(OpTag::Add)]
        );
    }

    #[test]
    fn power_is_right_associative_in_postfix_order() {
        assert_eq!(
            postfix_kinds("2^3^2"),
            vec![
                TokKind::Number(2.0),
                TokKind::Number(3.0),
                TokKind::Number(2.0),
                TokKind::Op(OpTag::Pow),
                TokKind::Op(OpTag::Pow),
            ]
        );
    }

    #[test]
    fn unmatched_right_paren_is_reported() {
        let toks = tokenize("1+2)").unwrap();
        assert!(matches!(to_postfix(toks).unwrap_err(), CasError::UnmatchedParenthesis(_)));
    }

    #[test]
    fn unmatched_left_paren_is_reported() {
        let toks = tokenize("(1+2").unwrap();
        assert!(matches!(to_postfix(toks).unwrap_err(), CasError::UnmatchedParenthesis(_)));
    }

    #[test]
    fn builds_tree_and_evaluates() {
        let toks = tokenize("1+2*3").unwrap();
        let postfix = to_postfix(toks).unwrap();
        let tree = build_tree(postfix).unwrap();
        let cfg = crate::config::Config::default();
        assert_eq!(crate::eval::vpa(&tree, &cfg).unwrap(), 7.0);
    }

    #[test]
    fn dangling_operator_is_a_wrong_expression() {
        let toks = tokenize("1+").unwrap();
        let postfix = to_postfix(toks).unwrap();
        assert!(matches!(build_tree(postfix).unwrap_err(), CasError::WrongExpression(_)));
    }
}
