//! Tokenizer (spec §4.5).
//!
//! Scans left to right, accumulating any run of characters that is not a
//! basic operator or whitespace into a name buffer, then classifies each
//! flushed buffer as a number, a function keyword, or a variable — ported
//! from `tomsolver::internal::ParseFunctions::ParseToTokens`.

use crate::error::{CasError, SingleParseError};
use crate::operator::OpTag;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokKind {
    Number(f64),
    Variable(String),
    Op(OpTag),
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokKind,
    pub line: usize,
    pub col: usize,
    pub line_text: String,
}

fn is_basic_operator(c: char) -> bool {
    OpTag::from_base_char(c).is_some()
}

struct Cursor {
    line: usize,
    col: usize,
}

fn flush(
    buf: &str,
    tokens: &[Token],
    start_line: usize,
    start_col: usize,
    line_text: &str,
) -> Result<Option<Token>, CasError> {
    if buf.is_empty() {
        return Ok(None);
    }

    let make_err = |message: String| {
        CasError::InvalidVarName(format!(
            "{}",
            SingleParseError::new(start_line, start_col, line_text.to_string(), message)
        ))
    };

    let starts_numeric = buf.starts_with(|c: char| c.is_ascii_digit()) || buf.starts_with('.');
    if starts_numeric {
        if let Ok(v) = buf.parse::<f64>() {
            return Ok(Some(Token {
                kind: TokKind::Number(v),
                line: start_line,
                col: start_col,
                line_text: line_text.to_string(),
            }));
        }
    }

    if let Some(op) = OpTag::from_function_name(buf) {
        let _ = tokens;
        return Ok(Some(Token {
            kind: TokKind::Op(op),
            line: start_line,
            col: start_col,
            line_text: line_text.to_string(),
        }));
    }

    let mut chars = buf.chars();
    let first_ok = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
    let rest_alnum = buf.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !rest_alnum {
        let bad = buf
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || c == '_'))
            .expect("rest_alnum is false, so a non-alnum/underscore char exists");
        let offset = buf.find(bad).unwrap_or(0);
        return Err(CasError::IllegalChar(SingleParseError::new(
            start_line,
            start_col + offset,
            line_text.to_string(),
            format!("illegal character '{}'", bad),
        )));
    }

    if !first_ok {
        return Err(make_err(format!("invalid variable name \"{}\"", buf)));
    }

    Ok(Some(Token {
        kind: TokKind::Variable(buf.to_string()),
        line: start_line,
        col: start_col,
        line_text: line_text.to_string(),
    }))
}

/// Splits `content` into a flat token stream, resolving `+`/`-` to their
/// unary or binary tags based on what immediately precedes them: unary
/// whenever the token stream is empty or the previous token is an operator
/// other than `)`.
pub(crate) fn tokenize(content: &str) -> Result<Vec<Token>, CasError> {
    if content.is_empty() {
        return Err(CasError::EmptyInput);
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let mut tokens: Vec<Token> = Vec::new();

    for (line_idx, line) in lines.iter().enumerate() {
        let mut name_start: Option<usize> = None;
        let chars: Vec<char> = line.chars().collect();
        let mut cur = Cursor { line: line_idx, col: 0 };

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            cur.col = i;

            if is_basic_operator(c) {
                if let Some(start) = name_start.take() {
                    let buf: String = chars[start..i].iter().collect();
                    if let Some(tok) = flush(&buf, &tokens, line_idx, start, line)? {
                        tokens.push(tok);
                    }
                }
                let unary = tokens.is_empty()
                    || matches!(&tokens.last().unwrap().kind, TokKind::Op(op) if *op != OpTag::RParen);
                let op = if (c == '+' || c == '-') && unary {
                    if c == '+' { OpTag::Positive } else { OpTag::Negative }
                } else {
                    OpTag::from_base_char(c).expect("checked by is_basic_operator")
                };
                tokens.push(Token {
                    kind: TokKind::Op(op),
                    line: line_idx,
                    col: i,
                    line_text: line.to_string(),
                });
            } else if c.is_whitespace() {
                if let Some(start) = name_start.take() {
                    let buf: String = chars[start..i].iter().collect();
                    if let Some(tok) = flush(&buf, &tokens, line_idx, start, line)? {
                        tokens.push(tok);
                    }
                }
            } else if name_start.is_none() {
                name_start = Some(i);
            }

            i += 1;
        }

        if let Some(start) = name_start.take() {
            let buf: String = chars[start..].iter().collect();
            if let Some(tok) = flush(&buf, &tokens, line_idx, start, line)? {
                tokens.push(tok);
            }
        }
    }

    if tokens.is_empty() {
        return Err(CasError::EmptyInput);
    }

    Ok(tokens)
}
