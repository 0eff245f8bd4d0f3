//! Nonlinear solver (spec §4.10): Newton–Raphson and Levenberg–Marquardt
//! over a symbolic Jacobian built once up front. Ported from
//! `tomsolver::SolveByNewtonRaphson` / `SolveByLM` / `Armijo`.
//!
//! Both methods assume a square system (as many equations as unknowns) —
//! the same assumption the source makes implicitly by transposing the
//! Jacobian against the step direction in the Armijo acceptance test.

use tracing::trace;

use crate::config::{Config, LogLevel, NonlinearMethod};
use crate::error::CasError;
use crate::linear::solve_linear;
use crate::matrix::Mat;
use crate::symbolic::{jacobian, SymMat, SymVec};
use crate::vars_table::VarsTable;

fn eval_f(equations: &SymVec, table: &VarsTable, cfg: &Config) -> Result<Mat, CasError> {
    equations.subs_vars_table(table).calc(cfg)
}

fn eval_j(jac: &SymMat, table: &VarsTable, cfg: &Config) -> Result<Mat, CasError> {
    jac.subs_vars_table(table).calc(cfg)
}

/// Armijo backtracking line search: halves `alpha` from 1 until
/// `‖F(q+alpha*d)‖ <= ‖F(q) + gamma*alpha*Jᵀ*d‖`.
fn armijo(q: &Mat, d: &Mat, f_q: &Mat, j_q: &Mat, equations: &SymVec, table: &VarsTable, cfg: &Config) -> Result<f64, CasError> {
    const GAMMA: f64 = 0.4;
    const SIGMA: f64 = 0.5;

    let jt_d = j_q.transpose().matmul(d)?;
    let mut alpha = 1.0;
    for _ in 0..cfg.max_iterations {
        let q_new = q + &(d * alpha);
        let mut probe = table.clone();
        probe.set_values(q_new)?;
        let f_new = eval_f(equations, &probe, cfg)?;

        let lhs = f_new.frobenius_norm();
        let rhs = (f_q + &(&jt_d * (GAMMA * alpha))).frobenius_norm();
        if lhs <= rhs {
            return Ok(alpha);
        }
        alpha *= SIGMA;
    }
    Ok(alpha)
}

/// Solves `equations == 0` by plain Newton–Raphson, starting from the
/// values already in `table`.
pub fn newton_raphson(equations: &SymVec, mut table: VarsTable, cfg: &Config) -> Result<VarsTable, CasError> {
    let vars = table.names().to_vec();
    let jac = jacobian(equations, &vars, cfg)?;

    for it in 0..cfg.max_iterations {
        let f_num = eval_f(equations, &table, cfg)?;
        if f_num.norm_inf() <= cfg.epsilon {
            return Ok(table);
        }

        let j_num = eval_j(&jac, &table, cfg)?;
        let neg_f = -&f_num;
        let delta_q = solve_linear(&j_num, &neg_f, cfg).map_err(|e| match e {
            CasError::SingularMatrix(_) => {
                CasError::SingularMatrix("Jacobian is singular; try different initial values".to_string())
            }
            other => other,
        })?;

        let q_new = table.values() + &delta_q;
        table.set_values(q_new)?;

        if cfg.should_log(LogLevel::Trace) {
            trace!(it, residual = f_num.norm_inf(), "newton-raphson step");
        }
    }

    Err(CasError::TooManyIterations(cfg.max_iterations))
}

/// Solves `equations == 0` by Levenberg–Marquardt: each outer step takes a
/// damped Gauss-Newton direction `d = solve_linear(JᵀJ + mu*I, -JᵀF)`, line
/// searched with [`armijo`], accepting once the residual actually shrinks
/// and otherwise growing `mu` by a factor of ten and retrying.
pub fn levenberg_marquardt(equations: &SymVec, mut table: VarsTable, cfg: &Config) -> Result<VarsTable, CasError> {
    let vars = table.names().to_vec();
    let jac = jacobian(equations, &vars, cfg)?;
    let n = vars.len();

    let mut it = 0usize;
    loop {
        let f_num = eval_f(equations, &table, cfg)?;
        if f_num.norm_inf() <= cfg.epsilon {
            return Ok(table);
        }

        let j_num = eval_j(&jac, &table, cfg)?;
        let jt = j_num.transpose();
        let jtj = jt.matmul(&j_num)?;
        let neg_jt_f = -&jt.matmul(&f_num)?;

        let mut mu = 1.0e-5;
        let accepted = loop {
            let damped = &jtj + &(Mat::identity(n) * mu);
            let d = solve_linear(&damped, &neg_jt_f, cfg)?;
            let alpha = armijo(table.values(), &d, &f_num, &j_num, equations, &table, cfg)?;

            let q_new = table.values() + &(&d * alpha);
            let mut probe = table.clone();
            probe.set_values(q_new)?;
            let f_new = eval_f(equations, &probe, cfg)?;

            if cfg.should_log(LogLevel::Trace) {
                trace!(it, mu, old = f_num.frobenius_norm(), new = f_new.frobenius_norm(), "lm inner step");
            }

            if f_new.frobenius_norm_sq() < f_num.frobenius_norm_sq() {
                break probe;
            }
            mu *= 10.0;

            it += 1;
            if it >= cfg.max_iterations {
                return Err(CasError::TooManyIterations(cfg.max_iterations));
            }
        };

        table = accepted;
        it += 1;
        if it >= cfg.max_iterations {
            return Err(CasError::TooManyIterations(cfg.max_iterations));
        }
    }
}

/// Dispatches to [`newton_raphson`] or [`levenberg_marquardt`] per
/// `cfg.nonlinear_method`, starting from the values already in `table`.
pub fn solve_with(equations: &SymVec, table: VarsTable, cfg: &Config) -> Result<VarsTable, CasError> {
    match cfg.nonlinear_method {
        NonlinearMethod::NewtonRaphson => newton_raphson(equations, table, cfg),
        NonlinearMethod::Lm => levenberg_marquardt(equations, table, cfg),
    }
}

/// Derives the variable list from `equations.all_var_names()`, seeds every
/// entry to `cfg.initial_value`, and solves.
pub fn solve(equations: &SymVec, cfg: &Config) -> Result<VarsTable, CasError> {
    let names = equations.all_var_names();
    let table = VarsTable::new(names, cfg.initial_value)?;
    solve_with(equations, table, cfg)
}
