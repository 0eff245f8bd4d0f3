//! Runtime configuration for the core.
//!
//! The source this crate is modeled after keeps a single mutable global
//! [`Config`]; here it is an explicit value the caller threads through every
//! entry point (smart constructors, the parser, the solvers) instead.

/// Output verbosity recognized by the core's `tracing` call sites.
///
/// Every emission site checks `Config.log_level` against its own level
/// before calling into `tracing`, so raising this above `Off` only ever
/// *adds* events — it never changes behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Off,
    Fatal,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
    All,
}

/// Which iterative method [`crate::solver::solve`] dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonlinearMethod {
    #[default]
    NewtonRaphson,
    Lm,
}

/// Explicit, per-instance configuration. See spec §6 for the option table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// If `false`, `calc` returns the raw IEEE-754 value (inf/NaN) instead
    /// of raising [`crate::error::CasError::InvalidNumber`].
    pub throw_on_invalid_value: bool,
    /// Tolerance for zero tests, matrix equality, pivot rejection and
    /// solver termination.
    pub epsilon: f64,
    pub log_level: LogLevel,
    /// Upper bound on Newton-Raphson/Levenberg-Marquardt iterations.
    pub max_iterations: usize,
    pub nonlinear_method: NonlinearMethod,
    /// Initial value for variables not seeded by the caller.
    pub initial_value: f64,
    /// If `true`, `solve_linear` returns a particular solution for
    /// underdetermined systems instead of raising `IndeterminateEquation`.
    pub allow_indeterminate_equation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            throw_on_invalid_value: true,
            epsilon: 1.0e-9,
            log_level: LogLevel::Warn,
            max_iterations: 100,
            nonlinear_method: NonlinearMethod::NewtonRaphson,
            initial_value: 1.0,
            allow_indeterminate_equation: false,
        }
    }
}

impl Config {
    /// Returns all options to the defaults documented on each field.
    pub fn reset(&mut self) {
        *self = Config::default();
    }

    pub(crate) fn should_log(&self, level: LogLevel) -> bool {
        self.log_level >= level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let cfg = Config::default();
        assert!(cfg.throw_on_invalid_value);
        assert_eq!(cfg.epsilon, 1.0e-9);
        assert_eq!(cfg.log_level, LogLevel::Warn);
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.nonlinear_method, NonlinearMethod::NewtonRaphson);
        assert_eq!(cfg.initial_value, 1.0);
        assert!(!cfg.allow_indeterminate_equation);
    }

    #[test]
    fn reset_restores_defaults_after_mutation() {
        let mut cfg = Config {
            epsilon: 1.0,
            max_iterations: 3,
            ..Config::default()
        };
        cfg.reset();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn log_level_ordering_gates_emission() {
        let mut cfg = Config::default();
        cfg.log_level = LogLevel::Warn;
        assert!(cfg.should_log(LogLevel::Error));
        assert!(!cfg.should_log(LogLevel::Debug));
    }
}
