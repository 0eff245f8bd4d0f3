//! The error type used throughout this crate.

use thiserror::Error;

use crate::operator::OpTag;

/// A single lexing/parsing failure, pinpointed to a line and column.
///
/// Carries the full source line so a front-end can print it verbatim with a
/// caret under the offending character, the way the source this crate is
/// modeled after does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleParseError {
    pub line: usize,
    pub col: usize,
    pub line_text: String,
    pub message: String,
}

impl SingleParseError {
    pub fn new(line: usize, col: usize, line_text: impl Into<String>, message: impl Into<String>) -> Self {
        SingleParseError {
            line,
            col,
            line_text: line_text.into(),
            message: message.into(),
        }
    }

    /// Renders the offending line followed by a caret line pointing at `col`.
    pub fn render(&self) -> String {
        format!(
            "{}:{}: {}\n{}\n{}^",
            self.line,
            self.col,
            self.message,
            self.line_text,
            " ".repeat(self.col)
        )
    }
}

impl std::fmt::Display for SingleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// The error type for the whole core. See spec §7 for the taxonomy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CasError {
    // --- parse ---
    #[error("empty input")]
    EmptyInput,
    #[error("illegal character at {0}")]
    IllegalChar(SingleParseError),
    #[error("invalid variable name: {0}")]
    InvalidVarName(String),
    #[error("unmatched parenthesis at {0}")]
    UnmatchedParenthesis(SingleParseError),
    #[error("wrong expression: {0}")]
    WrongExpression(SingleParseError),
    #[error("{} parse error(s): {}", .0.len(), .0.iter().map(|e| e.render()).collect::<Vec<_>>().join("\n"))]
    MultiParseError(Vec<SingleParseError>),

    // --- symbolic ---
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("cannot evaluate a tree with variable still present: {0}")]
    VariablePresent(String),
    #[error("substitution count does not match: expected {expected}, got {got}")]
    SubsCountMismatch { expected: usize, got: usize },
    #[error("operator {0:?} is not differentiable")]
    NonDifferentiable(OpTag),

    // --- numeric ---
    #[error("invalid number (inf or NaN) produced by an operation")]
    InvalidNumber,
    #[error("operation is out of domain")]
    OutOfDomain,
    #[error("singular matrix{}", if .0.is_empty() { String::new() } else { format!(": {}", .0) })]
    SingularMatrix(String),
    #[error("indeterminate equation{}", if .0.is_empty() { String::new() } else { format!(": {}", .0) })]
    IndeterminateEquation(String),
    #[error("infinitely many solutions")]
    InfiniteSolutions,
    #[error("over-determined equations: {rows} equations for {cols} unknowns")]
    OverDeterminedEquations { rows: usize, cols: usize },
    #[error("size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    #[error("exceeded the iteration limit ({0}) without converging")]
    TooManyIterations(usize),

    // --- configuration ---
    #[error("invalid operator tag")]
    InvalidOp,
}

pub type Result<T> = std::result::Result<T, CasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_parse_error_renders_caret_under_column() {
        let err = SingleParseError::new(1, 4, "1+2$3", "illegal character '$'");
        let rendered = err.render();
        assert!(rendered.contains("1+2$3"));
        assert!(rendered.ends_with("    ^"));
    }

    #[test]
    fn multi_parse_error_joins_each_rendered_line() {
        let a = SingleParseError::new(1, 0, "1++", "wrong expression");
        let b = SingleParseError::new(1, 2, "1++", "wrong expression");
        let err = CasError::MultiParseError(vec![a, b]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 parse error(s)"));
    }

    #[test]
    fn singular_matrix_without_hint_has_no_colon() {
        let err = CasError::SingularMatrix(String::new());
        assert_eq!(err.to_string(), "singular matrix");
    }
}
