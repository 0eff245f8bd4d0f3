//! Infix-string to expression-tree parsing (spec §4.5).

mod lexer;
mod shunting_yard;

use crate::error::CasError;
use crate::tree::Node;

/// Parses an infix expression (e.g. `"1+2*sin(x)"`) into a [`Node`] tree.
///
/// Goes through three stages, mirroring `tomsolver::Parse`: tokenize, then
/// shunting-yard to postfix, then reduce postfix into a tree.
pub fn parse(expression: &str) -> Result<Node, CasError> {
    let tokens = lexer::tokenize(expression)?;
    let postfix = shunting_yard::to_postfix(tokens)?;
    shunting_yard::build_tree(postfix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::eval::vpa;

    #[test]
    fn parses_and_evaluates_simple_precedence() {
        let tree = parse("1+2*3").unwrap();
        assert_eq!(vpa(&tree, &Config::default()).unwrap(), 7.0);
    }

    #[test]
    fn parses_right_associative_power_tower() {
        let tree = parse("2^3^2").unwrap();
        assert_eq!(vpa(&tree, &Config::default()).unwrap(), 512.0);
    }

    #[test]
    fn parses_function_calls_and_parens() {
        let tree = parse("sin(0)+cos(0)").unwrap();
        assert_eq!(vpa(&tree, &Config::default()).unwrap(), 1.0);
    }

    #[test]
    fn parses_unary_minus_on_a_parenthesized_group() {
        let tree = parse("-(1+2)").unwrap();
        assert_eq!(vpa(&tree, &Config::default()).unwrap(), -3.0);
    }

    #[test]
    fn round_trips_through_the_printer() {
        let tree = parse("(x+1)*2").unwrap();
        assert_eq!(crate::tree::printer::print(&tree), "(x+1)*2");
    }

    #[test]
    fn reports_illegal_character_with_caret() {
        let err = parse("1+2$3").unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("illegal character"));
    }
}
