//! The closed set of operator tags plus their static metadata and the
//! `calc` evaluator.
//!
//! A tagged enum with a table of constant metadata, matched in a single
//! `calc` expression — never a v-table hierarchy (spec §9).

use num_traits::Float;

use crate::config::Config;
use crate::error::CasError;

/// The closed set of unary/binary operators plus the two auxiliary parser
/// tokens (`LParen`/`RParen`) and `Null` (the "no operator" placeholder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    Null,
    // unary
    Positive,
    Negative,
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sqrt,
    Log,
    Log2,
    Log10,
    Exp,
    // binary
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    And,
    Or,
    Mod,
    // parser-internal
    LParen,
    RParen,
}

/// Left `a op b op c == (a op b) op c`; right `a op b op c == a op (b op c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl OpTag {
    /// Number of operands; `None` for the parser-internal tokens.
    pub fn arity(self) -> Option<u8> {
        use OpTag::*;
        match self {
            Null | LParen | RParen => None,
            Positive | Negative | Sin | Cos | Tan | Arcsin | Arccos | Arctan | Sqrt | Log | Log2 | Log10 | Exp => {
                Some(1)
            }
            Add | Sub | Mul | Div | Pow | And | Or | Mod => Some(2),
        }
    }

    /// Higher binds tighter. Functions 15, unary +/- 14, `%` 13, `&`/`|` 12,
    /// `^` 11, `*`/`/` 10, `+`/`-` 5, parentheses 0.
    pub fn precedence(self) -> u8 {
        use OpTag::*;
        match self {
            Sin | Cos | Tan | Arcsin | Arccos | Arctan | Sqrt | Log | Log2 | Log10 | Exp => 15,
            Positive | Negative => 14,
            Mod => 13,
            And | Or => 12,
            Pow => 11,
            Mul | Div => 10,
            Add | Sub => 5,
            LParen | RParen | Null => 0,
        }
    }

    /// `^` and unary +/- are right-associative; everything else left.
    pub fn associativity(self) -> Associativity {
        match self {
            OpTag::Pow | OpTag::Positive | OpTag::Negative => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    /// Only `+` and `*` are commutative.
    pub fn is_commutative(self) -> bool {
        matches!(self, OpTag::Add | OpTag::Mul)
    }

    /// Whether the operator is printed as `name(arg)` rather than infix or
    /// `+x`/`-x`.
    pub fn is_function(self) -> bool {
        use OpTag::*;
        matches!(
            self,
            Sin | Cos | Tan | Arcsin | Arccos | Arctan | Sqrt | Log | Log2 | Log10 | Exp
        )
    }

    /// The token/display string for this operator.
    pub fn display(self) -> &'static str {
        use OpTag::*;
        match self {
            Null => "",
            Positive => "+",
            Negative => "-",
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Arcsin => "arcsin",
            Arccos => "arccos",
            Arctan => "arctan",
            Sqrt => "sqrt",
            Log => "log",
            Log2 => "log2",
            Log10 => "log10",
            Exp => "exp",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Pow => "^",
            And => "&",
            Or => "|",
            Mod => "%",
            LParen => "(",
            RParen => ")",
        }
    }

    /// Looks a base operator character up by its single-character token.
    pub fn from_base_char(c: char) -> Option<OpTag> {
        match c {
            '+' => Some(OpTag::Add),
            '-' => Some(OpTag::Sub),
            '*' => Some(OpTag::Mul),
            '/' => Some(OpTag::Div),
            '^' => Some(OpTag::Pow),
            '&' => Some(OpTag::And),
            '|' => Some(OpTag::Or),
            '%' => Some(OpTag::Mod),
            '(' => Some(OpTag::LParen),
            ')' => Some(OpTag::RParen),
            _ => None,
        }
    }

    /// Looks a function name up by its lowercase spelling (§4.5).
    pub fn from_function_name(name: &str) -> Option<OpTag> {
        match name {
            "sin" => Some(OpTag::Sin),
            "cos" => Some(OpTag::Cos),
            "tan" => Some(OpTag::Tan),
            "arcsin" => Some(OpTag::Arcsin),
            "arccos" => Some(OpTag::Arccos),
            "arctan" => Some(OpTag::Arctan),
            "sqrt" => Some(OpTag::Sqrt),
            "log" => Some(OpTag::Log),
            "log2" => Some(OpTag::Log2),
            "log10" => Some(OpTag::Log10),
            "exp" => Some(OpTag::Exp),
            _ => None,
        }
    }
}

fn truncate_to_i64(v: f64, cfg: &Config) -> Result<i64, CasError> {
    if cfg.throw_on_invalid_value && (v.fract()).abs() > cfg.epsilon {
        return Err(CasError::OutOfDomain);
    }
    Ok(v as i64)
}

/// Evaluates `op` on `l` (and `r` for binary operators; ignored for unary
/// ones). Domain violations (division by ~0, logs/roots/inverse trig out of
/// domain) raise [`CasError::OutOfDomain`] when
/// `cfg.throw_on_invalid_value` is set; otherwise the raw IEEE-754 value
/// (including inf/NaN) is returned without any check at all.
pub fn calc(op: OpTag, l: f64, r: f64, cfg: &Config) -> Result<f64, CasError> {
    let checked = cfg.throw_on_invalid_value;

    let raw = match op {
        OpTag::Positive => l,
        OpTag::Negative => -l,
        OpTag::Sin => l.sin(),
        OpTag::Cos => l.cos(),
        OpTag::Tan => l.tan(),
        OpTag::Arcsin => {
            if checked && !(-1.0..=1.0).contains(&l) {
                return Err(CasError::OutOfDomain);
            }
            l.asin()
        }
        OpTag::Arccos => {
            if checked && !(-1.0..=1.0).contains(&l) {
                return Err(CasError::OutOfDomain);
            }
            l.acos()
        }
        OpTag::Arctan => l.atan(),
        OpTag::Sqrt => {
            if checked && l < 0.0 {
                return Err(CasError::OutOfDomain);
            }
            l.sqrt()
        }
        OpTag::Log => {
            if checked && l <= 0.0 {
                return Err(CasError::OutOfDomain);
            }
            l.ln()
        }
        OpTag::Log2 => {
            if checked && l <= 0.0 {
                return Err(CasError::OutOfDomain);
            }
            l.log2()
        }
        OpTag::Log10 => {
            if checked && l <= 0.0 {
                return Err(CasError::OutOfDomain);
            }
            l.log10()
        }
        OpTag::Exp => l.exp(),
        OpTag::Add => l + r,
        OpTag::Sub => l - r,
        OpTag::Mul => l * r,
        OpTag::Div => {
            if checked && r.abs() < cfg.epsilon {
                return Err(CasError::OutOfDomain);
            }
            l / r
        }
        OpTag::Pow => l.powf(r),
        OpTag::And => (truncate_to_i64(l, cfg)? & truncate_to_i64(r, cfg)?) as f64,
        OpTag::Or => (truncate_to_i64(l, cfg)? | truncate_to_i64(r, cfg)?) as f64,
        OpTag::Mod => {
            let ri = truncate_to_i64(r, cfg)?;
            if checked && ri == 0 {
                return Err(CasError::OutOfDomain);
            }
            (truncate_to_i64(l, cfg)? % ri) as f64
        }
        OpTag::LParen | OpTag::RParen | OpTag::Null => return Err(CasError::InvalidOp),
    };

    if checked && !Float::is_finite(raw) {
        return Err(CasError::InvalidNumber);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn arithmetic_matches_expectation() {
        assert_eq!(calc(OpTag::Add, 1.0, 2.0, &cfg()).unwrap(), 3.0);
        assert_eq!(calc(OpTag::Mul, 2.0, 3.0, &cfg()).unwrap(), 6.0);
        assert_eq!(calc(OpTag::Pow, 2.0, 10.0, &cfg()).unwrap(), 1024.0);
    }

    #[test]
    fn division_by_zero_raises_out_of_domain() {
        assert_eq!(calc(OpTag::Div, 1.0, 0.0, &cfg()).unwrap_err(), CasError::OutOfDomain);
    }

    #[test]
    fn division_by_zero_with_checks_disabled_returns_raw_infinity() {
        let mut c = cfg();
        c.throw_on_invalid_value = false;
        let v = calc(OpTag::Div, 1.0, 0.0, &c).unwrap();
        assert!(v.is_infinite());
    }

    #[test]
    fn sqrt_of_negative_is_out_of_domain() {
        assert_eq!(calc(OpTag::Sqrt, -4.0, 0.0, &cfg()).unwrap_err(), CasError::OutOfDomain);
    }

    #[test]
    fn arcsin_out_of_range_is_out_of_domain() {
        assert_eq!(calc(OpTag::Arcsin, 2.0, 0.0, &cfg()).unwrap_err(), CasError::OutOfDomain);
    }

    #[test]
    fn mod_truncates_to_integers() {
        assert_eq!(calc(OpTag::Mod, 7.0, 3.0, &cfg()).unwrap(), 1.0);
    }

    #[test]
    fn precedence_and_associativity_table() {
        assert!(OpTag::Pow.precedence() > OpTag::Mul.precedence());
        assert!(OpTag::Mul.precedence() > OpTag::Add.precedence());
        assert_eq!(OpTag::Pow.associativity(), Associativity::Right);
        assert_eq!(OpTag::Add.associativity(), Associativity::Left);
        assert!(OpTag::Add.is_commutative());
        assert!(!OpTag::Sub.is_commutative());
    }
}
