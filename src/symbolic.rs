//! Symbolic matrices and the Jacobian (spec §4.9). Ported from
//! `tomsolver::SymMat`/`SymVec`/`Jacobian`.

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::diff::diff;
use crate::error::CasError;
use crate::eval::vpa;
use crate::matrix::Mat;
use crate::subs::substitute;
use crate::tree::Node;
use crate::vars_table::VarsTable;

/// A matrix of expression trees rather than numbers.
#[derive(Debug, Clone)]
pub struct SymMat {
    rows: usize,
    cols: usize,
    data: Vec<Vec<Node>>,
}

impl SymMat {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        SymMat { rows, cols, data: (0..rows).map(|_| (0..cols).map(|_| Node::Number(0.0)).collect()).collect() }
    }

    pub fn from_rows(data: Vec<Vec<Node>>) -> Result<Self, CasError> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if data.iter().any(|row| row.len() != cols) {
            return Err(CasError::SizeMismatch { expected: cols, got: 0 });
        }
        Ok(SymMat { rows, cols, data })
    }

    pub fn from_mat(mat: &Mat) -> Self {
        let data = (0..mat.rows())
            .map(|r| (0..mat.cols()).map(|c| Node::Number(mat.get(r, c))).collect())
            .collect();
        SymMat { rows: mat.rows(), cols: mat.cols(), data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> &Node {
        &self.data[row][col]
    }

    pub fn row(&self, row: usize) -> &[Node] {
        &self.data[row]
    }

    /// Downcasts to a column [`SymVec`]. Fails unless `cols == 1`.
    pub fn to_sym_vec(&self) -> Result<SymVec, CasError> {
        if self.cols != 1 {
            return Err(CasError::SizeMismatch { expected: 1, got: self.cols });
        }
        Ok(SymVec(SymMat { rows: self.rows, cols: 1, data: self.data.clone() }))
    }

    /// Evaluates every cell with [`crate::eval::vpa`]; fails if any cell
    /// still has a free variable.
    pub fn calc(&self, cfg: &Config) -> Result<Mat, CasError> {
        let mut out = Mat::zeros(self.rows, self.cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.set(r, c, vpa(&self.data[r][c], cfg)?);
            }
        }
        Ok(out)
    }

    /// Downcasts to a numeric [`Mat`] without evaluating anything; fails if
    /// any cell is not already a bare [`Node::Number`].
    pub fn to_mat(&self) -> Result<Mat, CasError> {
        let mut out = Mat::zeros(self.rows, self.cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                match self.data[r][c] {
                    Node::Number(v) => out.set(r, c, v),
                    _ => return Err(CasError::VariablePresent(String::new())),
                }
            }
        }
        Ok(out)
    }

    pub fn subs(&self, bindings: &HashMap<String, Node>) -> SymMat {
        let data = self.data.iter().map(|row| row.iter().map(|n| substitute(n, bindings)).collect()).collect();
        SymMat { rows: self.rows, cols: self.cols, data }
    }

    pub fn subs_vars_table(&self, table: &VarsTable) -> SymMat {
        let bindings: HashMap<String, Node> =
            table.iter().map(|(name, value)| (name.to_string(), Node::Number(value))).collect();
        self.subs(&bindings)
    }

    pub fn all_var_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for row in &self.data {
            for cell in row {
                for name in cell.variable_names() {
                    if seen.insert(name.clone()) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }

    pub fn elementwise_sub(&self, rhs: &SymMat) -> Result<SymMat, CasError> {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            return Err(CasError::SizeMismatch { expected: self.rows * self.cols, got: rhs.rows * rhs.cols });
        }
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(a_row, b_row)| a_row.iter().zip(b_row.iter()).map(|(a, b)| a - b).collect())
            .collect();
        Ok(SymMat { rows: self.rows, cols: self.cols, data })
    }

    pub fn matmul(&self, rhs: &SymMat) -> Result<SymMat, CasError> {
        if self.cols != rhs.rows {
            return Err(CasError::SizeMismatch { expected: self.cols, got: rhs.rows });
        }
        let mut data = vec![Vec::with_capacity(rhs.cols); self.rows];
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut acc = Node::Number(0.0);
                for k in 0..self.cols {
                    acc = acc + (&self.data[r][k] * &rhs.data[k][c]);
                }
                data[r].push(acc);
            }
        }
        Ok(SymMat { rows: self.rows, cols: rhs.cols, data })
    }
}

impl PartialEq for SymMat {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.data == other.data
    }
}

/// A column [`SymMat`] (`cols == 1`) with convenience indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct SymVec(SymMat);

impl SymVec {
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let rows = nodes.len();
        SymVec(SymMat { rows, cols: 1, data: nodes.into_iter().map(|n| vec![n]).collect() })
    }

    pub fn len(&self) -> usize {
        self.0.rows
    }

    pub fn is_empty(&self) -> bool {
        self.0.rows == 0
    }

    pub fn get(&self, index: usize) -> &Node {
        &self.0.data[index][0]
    }

    pub fn as_sym_mat(&self) -> &SymMat {
        &self.0
    }

    pub fn calc(&self, cfg: &Config) -> Result<Mat, CasError> {
        self.0.calc(cfg)
    }

    pub fn to_mat(&self) -> Result<Mat, CasError> {
        self.0.to_mat()
    }

    pub fn subs(&self, bindings: &HashMap<String, Node>) -> SymVec {
        SymVec(self.0.subs(bindings))
    }

    pub fn subs_vars_table(&self, table: &VarsTable) -> SymVec {
        SymVec(self.0.subs_vars_table(table))
    }

    pub fn all_var_names(&self) -> Vec<String> {
        self.0.all_var_names()
    }

    pub fn elementwise_sub(&self, rhs: &SymVec) -> Result<SymVec, CasError> {
        Ok(SymVec(self.0.elementwise_sub(&rhs.0)?))
    }

    pub fn to_string_pretty(&self) -> String {
        (0..self.len())
            .map(|i| format!("{} = {}", i, crate::tree::printer::print(self.get(i))))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for SymVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_pretty())
    }
}

/// Builds the Jacobian of `equations` with respect to `vars`: one row per
/// equation, one column per variable, `(i, j) = d(equations[i])/d(vars[j])`.
pub fn jacobian(equations: &SymVec, vars: &[String], cfg: &Config) -> Result<SymMat, CasError> {
    let mut data = Vec::with_capacity(equations.len());
    for i in 0..equations.len() {
        let mut row = Vec::with_capacity(vars.len());
        for var in vars {
            row.push(diff(equations.get(i), var, 1, cfg)?);
        }
        data.push(row);
    }
    Ok(SymMat { rows: equations.len(), cols: vars.len(), data })
}
