//! Linear solver (spec §4.10's inner primitive): partial-pivot Gaussian
//! elimination with back substitution. Ported from `tomsolver::SolveLinear`.
//!
//! Handles non-square systems the way the source does: a taller-than-wide
//! `A` is over-determined and rejected outright; a wider-than-tall `A` is
//! padded with zero rows and solved for a particular solution, which is
//! returned only when `Config.allow_indeterminate_equation` is set.

use crate::config::Config;
use crate::error::CasError;
use crate::matrix::Mat;
use crate::numeric;

fn format_system(a: &Mat, b: &Mat) -> String {
    let rows: Vec<String> = (0..a.rows())
        .map(|r| {
            let row: Vec<String> = (0..a.cols()).map(|c| numeric::to_string(a.get(r, c))).collect();
            format!("[{}]", row.join(", "))
        })
        .collect();
    let bv: Vec<String> = (0..b.rows()).map(|r| numeric::to_string(b.get(r, 0))).collect();
    format!("A = [{}]\nb = [{}]", rows.join(", "), bv.join(", "))
}

fn max_abs_row_index(a: &Mat, row_start: usize, row_end: usize, col: usize) -> usize {
    let mut max = 0.0;
    let mut index = row_start;
    for i in row_start..=row_end {
        let v = a.get(i, col).abs();
        if v > max {
            max = v;
            index = i;
        }
    }
    index
}

/// Solves `A*x = b` for `x`. `A` is `rows x cols`; `b` is `rows x 1`.
///
/// - `rows > cols`: over-determined, raises [`CasError::OverDeterminedEquations`].
/// - `rows == cols`, full rank: the unique solution.
/// - `rows == cols`, rank-deficient: [`CasError::SingularMatrix`] when the
///   augmented matrix `[A|b]` has the same rank (no solution exists), or
///   [`CasError::InfiniteSolutions`] when it doesn't reach this branch because
///   rank < cols is detected below via the underdetermined path.
/// - `rows < cols`: underdetermined; a zero-padded particular solution is
///   returned when `cfg.allow_indeterminate_equation`, else
///   [`CasError::IndeterminateEquation`].
pub fn solve_linear(a: &Mat, b: &Mat, cfg: &Config) -> Result<Mat, CasError> {
    let rows = a.rows();
    let cols = a.cols();
    if b.rows() != rows || b.cols() != 1 {
        return Err(CasError::SizeMismatch { expected: rows, got: b.rows() });
    }
    if rows > cols {
        return Err(CasError::OverDeterminedEquations { rows, cols });
    }

    let a_orig = a;
    let b_orig = b;
    let mut a = a.clone();
    let mut b = b.clone();
    let mut true_row_number = vec![0usize; cols];

    let mut rank_a = rows;
    let mut rank_ab = rows;
    let mut y = 0usize;
    let mut x = 0usize;

    while y < rows && x < cols {
        let pivot_row = max_abs_row_index(&a, y, rows - 1, x);
        a.swap_rows(y, pivot_row);
        b.swap_rows(y, pivot_row);

        while a.get(y, x).abs() < cfg.epsilon {
            x += 1;
            if x == cols {
                break;
            }
            let pivot_row = max_abs_row_index(&a, y, rows - 1, x);
            a.swap_rows(y, pivot_row);
            b.swap_rows(y, pivot_row);
        }

        if x != cols && x > y {
            true_row_number[y] = x;
        }

        if x == cols {
            rank_a = y;
            if b.get(y, 0).abs() < cfg.epsilon {
                rank_ab = y;
            }
            if rank_a != rank_ab {
                return Err(CasError::SingularMatrix(format_system(a_orig, b_orig)));
            }
            break;
        }

        let pivot = a.get(y, x);
        for j in y..cols {
            a.set(y, j, a.get(y, j) / pivot);
        }
        b.set(y, 0, b.get(y, 0) / pivot);

        for row in (y + 1)..rows {
            let mi = a.get(row, x);
            if mi.abs() >= cfg.epsilon {
                for col in x..cols {
                    a.set(row, col, a.get(row, col) - a.get(y, col) * mi);
                }
                b.set(row, 0, b.get(row, 0) - b.get(y, 0) * mi);
            }
        }

        y += 1;
        x += 1;
    }

    let mut indeterminate = false;
    let mut rows = rows;
    if rows != cols {
        a.resize(cols, cols);
        b.resize(cols, 1);
        rows = cols;
        indeterminate = true;

        for i in (0..rows).rev() {
            if true_row_number[i] != 0 {
                a.swap_rows(i, true_row_number[i]);
                b.swap_rows(i, true_row_number[i]);
            }
        }
    }

    let mut ret = Mat::zeros(cols, 1);
    for i in (0..rows).rev() {
        let mut sum_others = 0.0;
        for j in (i + 1)..rows {
            sum_others += a.get(i, j) * ret.get(j, 0);
        }
        ret.set(i, 0, b.get(i, 0) - sum_others);
    }

    if rank_a < cols && rank_a == rank_ab {
        if indeterminate {
            if !cfg.allow_indeterminate_equation {
                return Err(CasError::IndeterminateEquation(format_system(a_orig, b_orig)));
            }
        } else {
            return Err(CasError::InfiniteSolutions);
        }
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config::default()
    }

    #[test]
    fn solves_the_calibration_4x4_system() {
        let a = Mat::from_data(
            4,
            4,
            vec![
                2.0, 1.0, -5.0, 1.0, //
                1.0, -5.0, 0.0, 7.0, //
                0.0, 2.0, 1.0, -1.0, //
                1.0, 6.0, -1.0, -4.0,
            ],
        )
        .unwrap();
        let b = Mat::vector(vec![13.0, -9.0, 6.0, 0.0]);
        let x = solve_linear(&a, &b, &cfg()).unwrap();
        let expected = [-66.55556, 25.66667, -18.77778, 26.55556];
        for (i, e) in expected.iter().enumerate() {
            assert!((x.get(i, 0) - e).abs() < 1e-4, "component {i}: {} vs {}", x.get(i, 0), e);
        }
    }

    #[test]
    fn square_singular_matrix_is_rejected() {
        // b is not in the column space of a (row 2 would need b[1] == 2*b[0]
        // to be consistent): no solution exists.
        let a = Mat::from_data(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        let b = Mat::vector(vec![1.0, 3.0]);
        assert!(matches!(solve_linear(&a, &b, &cfg()).unwrap_err(), CasError::SingularMatrix(_)));
    }

    #[test]
    fn consistent_rank_deficient_system_has_infinite_solutions() {
        // b == 2 * row 1, so the system is satisfied by an entire line of
        // solutions rather than having none.
        let a = Mat::from_data(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        let b = Mat::vector(vec![1.0, 2.0]);
        assert_eq!(solve_linear(&a, &b, &cfg()).unwrap_err(), CasError::InfiniteSolutions);
    }

    #[test]
    fn taller_than_wide_is_over_determined() {
        let a = Mat::from_data(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let b = Mat::vector(vec![1.0, 2.0, 3.0]);
        assert_eq!(solve_linear(&a, &b, &cfg()).unwrap_err(), CasError::OverDeterminedEquations { rows: 3, cols: 2 });
    }

    #[test]
    fn wider_than_tall_is_indeterminate_unless_allowed() {
        let a = Mat::from_data(1, 2, vec![1.0, 1.0]).unwrap();
        let b = Mat::vector(vec![2.0]);
        assert!(matches!(solve_linear(&a, &b, &cfg()).unwrap_err(), CasError::IndeterminateEquation(_)));

        let mut allowed = cfg();
        allowed.allow_indeterminate_equation = true;
        let x = solve_linear(&a, &b, &allowed).unwrap();
        let residual = x.get(0, 0) + x.get(1, 0) - 2.0;
        assert!(residual.abs() <= allowed.epsilon);
    }

    #[test]
    fn full_rank_square_system_matches_a_known_solution() {
        let a = Mat::from_data(2, 2, vec![2.0, 0.0, 0.0, 3.0]).unwrap();
        let b = Mat::vector(vec![4.0, 9.0]);
        let x = solve_linear(&a, &b, &cfg()).unwrap();
        assert!((x.get(0, 0) - 2.0).abs() < 1e-9);
        assert!((x.get(1, 0) - 3.0).abs() < 1e-9);
    }
}
