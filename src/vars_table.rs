//! An ordered variable-name-to-value binding table (spec §4.6, §4.9).
//!
//! Keeps both an insertion-ordered name list (so a [`crate::matrix::Mat`] of
//! values lines up positionally with `jacobian`'s columns) and a name→index
//! lookup. Ported from `tomsolver::VarsTable`.

use std::collections::HashMap;

use crate::error::CasError;
use crate::matrix::Mat;

#[derive(Debug, Clone)]
pub struct VarsTable {
    names: Vec<String>,
    values: Mat,
    index: HashMap<String, usize>,
}

impl VarsTable {
    /// One entry per name in `names`, all seeded to `init_value`. Fails if
    /// `names` contains a duplicate.
    pub fn new(names: Vec<String>, init_value: f64) -> Result<Self, CasError> {
        let values = Mat::vector(vec![init_value; names.len()]);
        Self::with_values(names, values)
    }

    pub fn from_pairs<I: IntoIterator<Item = (String, f64)>>(pairs: I) -> Result<Self, CasError> {
        let (names, vals): (Vec<String>, Vec<f64>) = pairs.into_iter().unzip();
        Self::with_values(names, Mat::vector(vals))
    }

    fn with_values(names: Vec<String>, values: Mat) -> Result<Self, CasError> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            crate::tree::validate_var_name(name)?;
            if index.insert(name.clone(), i).is_some() {
                return Err(CasError::InvalidVarName(format!("duplicate variable name: {}", name)));
            }
        }
        Ok(VarsTable { names, values, index })
    }

    pub fn var_count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Mat {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.index.get(name).map(|&i| self.values.as_slice()[i])
    }

    /// Replaces every value at once; `v` must have one row per variable.
    pub fn set_values(&mut self, v: Mat) -> Result<(), CasError> {
        if v.rows() != self.names.len() || v.cols() != 1 {
            return Err(CasError::SizeMismatch { expected: self.names.len(), got: v.rows() });
        }
        self.values = v;
        Ok(())
    }

    pub fn set(&mut self, name: &str, value: f64) -> Result<(), CasError> {
        let i = *self.index.get(name).ok_or_else(|| CasError::UndefinedVariable(name.to_string()))?;
        self.values.set(i, 0, value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().enumerate().map(move |(i, n)| (n.as_str(), self.values.as_slice()[i]))
    }

    /// Component-wise comparison within `epsilon`; `false` on a size
    /// mismatch rather than panicking.
    pub fn abs_diff_eq(&self, other: &VarsTable, epsilon: f64) -> bool {
        self.names == other.names && self.values.abs_diff_eq(&other.values, epsilon)
    }
}

/// Fixed-tolerance equality, matching `tomsolver::VarsTable::operator==`
/// (which compares the underlying value vector with its own default
/// epsilon). Use [`VarsTable::abs_diff_eq`] to pick your own tolerance.
impl PartialEq for VarsTable {
    fn eq(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, 1.0e-9)
    }
}
