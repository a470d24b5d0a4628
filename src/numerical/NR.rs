///  Newton-Raphson solver for systems of nonlinear equations F(x) = 0, F: R^n -> R^n.
///  Example#1
/// ```
/// use RustedNumMethods::numerical::NR::newton_raphson;
/// use nalgebra::DVector;
/// // the shortest way: function, initial guess, tolerance, max iterations
/// let F = |x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] + x[1] * x[1] - 10.0, x[0] - x[1] - 4.0]);
/// let outcome = newton_raphson(F, DVector::from_vec(vec![1.0, 1.0]), 1e-6, 100).unwrap();
/// let solution = outcome.solution().unwrap();
/// assert!((solution[0] - 3.0).abs() < 1e-6 && (solution[1] + 1.0).abs() < 1e-6);
/// ```
/// Example#2
/// ```
/// // or more verbose way with analytic Jacobian and solver settings
/// use RustedNumMethods::numerical::NR::{NR, LinearSysMethod};
/// use nalgebra::{DMatrix, DVector};
/// let mut NR_instanse = NR::new();
/// NR_instanse
///     .set_equation_system(
///         Box::new(|x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] - 2.0])),
///         DVector::from_vec(vec![1.0]),
///         1e-10,
///         50,
///     )
///     .unwrap();
/// NR_instanse.set_jacobian(Box::new(|x: &DVector<f64>| DMatrix::from_element(1, 1, 2.0 * x[0])));
/// NR_instanse
///     .set_solver_params(Some("off".to_string()), Some(LinearSysMethod::LU), None, None)
///     .unwrap();
/// let outcome = NR_instanse.solve().unwrap();
/// assert!(outcome.is_converged());
/// assert!((NR_instanse.get_result().unwrap()[0] - 2f64.sqrt()).abs() < 1e-10);
/// ```
use crate::Utils::logger::{init_logger, parse_loglevel, statistics_table};
use crate::Utils::task_parser::{
    DocumentMap, get_bool, get_f64, get_f64_vec, get_string, get_usize, unknown_keys,
};
use crate::numerical::iteration_log::{ConvergenceReason, IterationLog, SolveOutcome};
use crate::numerical::num_jacobian::{DiffScheme, finite_difference_jacobian};
use crate::numerical::solver_errors::SolverError;
use crate::somelinalg::linear_sys_diagnostics::{lu_is_singular, poorly_conditioned};
use log::{error, info, warn};
use nalgebra::{DMatrix, DVector};
use std::str::FromStr;
use std::time::Instant;
use strum_macros::{Display, EnumIter, EnumString};

pub type NonlinearFn = Box<dyn Fn(&DVector<f64>) -> DVector<f64>>;
pub type JacobianFn = Box<dyn Fn(&DVector<f64>) -> DMatrix<f64>>;

/// method for the Newton step J dx = -F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinearSysMethod {
    #[default]
    LU,
    Inv,
}

/// condition number above which the Jacobian is reported as poorly conditioned
const JACOBIAN_CONDITION_LIMIT: f64 = 1e12;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NRStatistics {
    pub iterations: usize,
    pub function_evaluations: usize,
    pub jacobian_evaluations: usize,
    pub jacobian_shape: (usize, usize),
}

pub struct NR {
    pub fun: Option<NonlinearFn>,      // system of equations
    pub jac_fun: Option<JacobianFn>,   // analytic jacobian, finite differences if None
    pub initial_guess: DVector<f64>,   // initial guess
    pub tolerance: f64,                // tolerance
    pub max_iterations: usize,         // max number of iterations
    pub damping_factor: f64,
    pub linear_sys_method: LinearSysMethod, // method for solving linear system
    pub diff_scheme: DiffScheme,
    pub loglevel: Option<String>,
    pub save_log: bool,
    pub result: Option<DVector<f64>>, // result of the iteration
    trace: IterationLog,
    statistics: NRStatistics,
}

impl NR {
    pub fn new() -> NR {
        NR {
            fun: None,
            jac_fun: None,
            initial_guess: DVector::zeros(0),
            tolerance: 1e-6,
            max_iterations: 50,
            damping_factor: 1.0,
            linear_sys_method: LinearSysMethod::LU,
            diff_scheme: DiffScheme::Central,
            loglevel: Some("info".to_string()),
            save_log: false,
            result: None,
            trace: IterationLog::new(),
            statistics: NRStatistics::default(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    /// Basic method to set the equation system
    pub fn set_equation_system(
        &mut self,
        fun: NonlinearFn,
        initial_guess: DVector<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<(), SolverError> {
        self.fun = Some(fun);
        self.initial_guess = initial_guess;
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self.check_input()
    }

    /// analytic Jacobian; without it the Jacobian is approximated by finite differences
    pub fn set_jacobian(&mut self, jac_fun: JacobianFn) {
        self.jac_fun = Some(jac_fun);
    }

    pub fn set_solver_params(
        &mut self,
        loglevel: Option<String>,
        linear_sys_method: Option<LinearSysMethod>,
        damping_factor: Option<f64>,
        diff_scheme: Option<DiffScheme>,
    ) -> Result<(), SolverError> {
        if let Some(level) = loglevel {
            parse_loglevel(&level)?;
            self.loglevel = Some(level);
        }
        if let Some(method) = linear_sys_method {
            self.linear_sys_method = method;
        }
        if let Some(damping_factor) = damping_factor {
            if !(damping_factor > 0.0 && damping_factor <= 1.0) {
                return Err(SolverError::InvalidParameter(format!(
                    "damping factor should be in (0, 1], got {}",
                    damping_factor
                )));
            }
            self.damping_factor = damping_factor;
        }
        if let Some(scheme) = diff_scheme {
            self.diff_scheme = scheme;
        }
        Ok(())
    }

    /// read the "newton" section of a task document: tolerance, max_iterations, damping_factor,
    /// linear_sys_method, diff_scheme, initial_guess, loglevel, save_log
    pub fn set_params_from_task(&mut self, task: &DocumentMap) -> Result<(), SolverError> {
        let Some(section) = task.get("newton") else {
            return Err(SolverError::Task("no 'newton' section in task".to_string()));
        };
        let unknown = unknown_keys(
            section,
            &[
                "tolerance",
                "max_iterations",
                "damping_factor",
                "linear_sys_method",
                "diff_scheme",
                "initial_guess",
                "loglevel",
                "save_log",
            ],
        );
        if !unknown.is_empty() {
            warn!("unknown keys in 'newton' section are ignored: {:?}", unknown);
        }
        if let Some(tolerance) = get_f64(section, "tolerance").map_err(SolverError::Task)? {
            self.tolerance = tolerance;
        }
        if let Some(max_iterations) =
            get_usize(section, "max_iterations").map_err(SolverError::Task)?
        {
            self.max_iterations = max_iterations;
        }
        if let Some(guess) = get_f64_vec(section, "initial_guess").map_err(SolverError::Task)? {
            self.initial_guess = DVector::from_vec(guess);
        }
        if let Some(save_log) = get_bool(section, "save_log").map_err(SolverError::Task)? {
            self.save_log = save_log;
        }
        let linear_sys_method = get_string(section, "linear_sys_method")
            .map_err(SolverError::Task)?
            .map(|m| {
                LinearSysMethod::from_str(&m).map_err(|_| {
                    SolverError::Task(format!("linear_sys_method must be lu or inv, got '{}'", m))
                })
            })
            .transpose()?;
        let diff_scheme = get_string(section, "diff_scheme")
            .map_err(SolverError::Task)?
            .map(|s| {
                DiffScheme::from_str(&s).map_err(|_| {
                    SolverError::Task(format!("diff_scheme must be forward or central, got '{}'", s))
                })
            })
            .transpose()?;
        let damping_factor = get_f64(section, "damping_factor").map_err(SolverError::Task)?;
        let loglevel = get_string(section, "loglevel").map_err(SolverError::Task)?;
        self.set_solver_params(loglevel, linear_sys_method, damping_factor, diff_scheme)
    }

    fn check_input(&self) -> Result<(), SolverError> {
        if self.fun.is_none() {
            return Err(SolverError::InvalidParameter(
                "equation system is not set".to_string(),
            ));
        }
        if self.initial_guess.is_empty() {
            return Err(SolverError::InvalidParameter(
                "initial guess should not be empty".to_string(),
            ));
        }
        if !(self.tolerance >= 0.0) {
            return Err(SolverError::InvalidParameter(
                "tolerance should be a non-negative number".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidParameter(
                "max iterations should be a positive number".to_string(),
            ));
        }
        Ok(())
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    /// solve J dx = b; None if J is singular
    pub fn solve_linear_system(
        method: LinearSysMethod,
        A: &DMatrix<f64>,
        b: &DVector<f64>,
    ) -> Option<DVector<f64>> {
        let lu = A.clone().lu();
        if lu_is_singular(&lu) {
            return None;
        }
        match method {
            LinearSysMethod::LU => lu.solve(b),
            LinearSysMethod::Inv => lu.try_inverse().map(|A_inv| A_inv * b),
        }
    }

    fn jacobian_at(
        &self,
        fun: &dyn Fn(&DVector<f64>) -> DVector<f64>,
        x: &DVector<f64>,
        f: &DVector<f64>,
        stats: &mut NRStatistics,
    ) -> DMatrix<f64> {
        stats.jacobian_evaluations += 1;
        match &self.jac_fun {
            Some(jac_fun) => jac_fun(x),
            None => {
                let (jac, evaluations) = finite_difference_jacobian(fun, x, f, self.diff_scheme);
                stats.function_evaluations += evaluations;
                jac
            }
        }
    }

    /// records of the run go into `trace`, so a failed run keeps the iterations made before the error
    fn iterate(
        &self,
        stats: &mut NRStatistics,
        trace: &mut IterationLog,
    ) -> Result<SolveOutcome, SolverError> {
        let Some(fun) = self.fun.as_deref() else {
            return Err(SolverError::InvalidParameter(
                "equation system is not set".to_string(),
            ));
        };
        let n = self.initial_guess.len();
        let lambda = self.damping_factor;
        let mut x = self.initial_guess.clone();
        let mut previous_step: Option<f64> = None;
        for iteration in 1..=self.max_iterations {
            stats.iterations = iteration;
            let f = fun(&x);
            stats.function_evaluations += 1;
            if f.len() != n {
                return Err(SolverError::DimensionMismatch {
                    what: "number of equations".to_string(),
                    expected: n,
                    found: f.len(),
                });
            }
            if f.iter().any(|v| !v.is_finite()) {
                error!("F(x) is not finite at x = {}", x.transpose());
                return Err(SolverError::NonFiniteValue { iteration });
            }
            let fnorm = f.norm();
            if fnorm < self.tolerance {
                // no step is computed at a root
                trace.push(iteration, fnorm, 0.0, x.clone());
                info!("iteration = {}, F norm = {:.3e}", iteration, fnorm);
                return Ok(SolveOutcome::Converged {
                    solution: x,
                    reason: ConvergenceReason::ResidualNorm,
                    trace: trace.clone(),
                });
            }

            let jac = self.jacobian_at(fun, &x, &f, stats);
            stats.jacobian_shape = jac.shape();
            if jac.shape() != (n, n) {
                return Err(SolverError::DimensionMismatch {
                    what: "number of jacobian rows and columns".to_string(),
                    expected: n,
                    found: if jac.nrows() != n { jac.nrows() } else { jac.ncols() },
                });
            }
            if jac.iter().any(|v| !v.is_finite()) {
                return Err(SolverError::NonFiniteValue { iteration });
            }
            poorly_conditioned(&jac, JACOBIAN_CONDITION_LIMIT);
            let Some(delta) = Self::solve_linear_system(self.linear_sys_method, &jac, &(-&f))
            else {
                error!("Jacobian is singular at x = {}", x.transpose());
                return Err(SolverError::SingularJacobian { iteration });
            };
            let dnorm = delta.norm();
            trace.push(iteration, fnorm, dnorm, x.clone());
            info!(
                "iteration = {}, F norm = {:.3e}, D norm = {:.3e}",
                iteration, fnorm, dnorm
            );
            if let Some(previous) = previous_step {
                if dnorm > previous {
                    warn!("Error is increasing");
                }
            }
            x += lambda * delta;
            if dnorm < self.tolerance {
                return Ok(SolveOutcome::Converged {
                    solution: x,
                    reason: ConvergenceReason::StepNorm,
                    trace: trace.clone(),
                });
            }
            previous_step = Some(dnorm);
        }
        error!("Maximum number of iterations reached. No solution found.");
        Ok(SolveOutcome::NotConverged {
            trace: trace.clone(),
            iterations_run: self.max_iterations,
        })
    }

    /// main function to solve the system of equations
    pub fn main_loop(&mut self) -> Result<SolveOutcome, SolverError> {
        self.result = None;
        self.trace = IterationLog::new();
        self.check_input()?;
        let mut stats = NRStatistics::default();
        let mut trace = IterationLog::new();
        let outcome = self.iterate(&mut stats, &mut trace);
        self.statistics = stats;
        self.trace = trace;
        let outcome = outcome?;
        if let Some(solution) = outcome.solution() {
            info!("A solution has been found: {}", solution.transpose());
            self.result = Some(solution.clone());
        }
        Ok(outcome)
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    // wrapper around main_loop to implement logging
    pub fn solve(&mut self) -> Result<SolveOutcome, SolverError> {
        let logging = init_logger(&self.loglevel, self.save_log)?;
        let begin = Instant::now();
        let outcome = self.main_loop()?;
        let elapsed = begin.elapsed();
        if logging {
            if outcome.is_converged() {
                info!("\n Iteration Output: \n{}", outcome.trace().to_table());
            }
            self.calc_statistics(elapsed.as_millis());
        }
        Ok(outcome)
    }

    fn calc_statistics(&self, elapsed_ms: u128) {
        let stats = &self.statistics;
        let (rows, cols) = stats.jacobian_shape;
        let table = statistics_table(&[
            ("number of iterations", stats.iterations.to_string()),
            ("function evaluations", stats.function_evaluations.to_string()),
            ("jacobian evaluations", stats.jacobian_evaluations.to_string()),
            ("number of jacobian elements", (rows * cols).to_string()),
            ("length of x vector", self.initial_guess.len().to_string()),
            ("time elapsed, ms", elapsed_ms.to_string()),
        ]);
        info!("\n \n CALC STATISTICS \n \n {}", table);
    }

    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result.clone()
    }

    pub fn get_trace(&self) -> &IterationLog {
        &self.trace
    }

    pub fn get_statistics(&self) -> &NRStatistics {
        &self.statistics
    }
}

impl Default for NR {
    fn default() -> Self {
        Self::new()
    }
}

/// Newton-Raphson with finite-difference Jacobian and LU steps, logging left to the caller
pub fn newton_raphson<F>(
    fun: F,
    initial_guess: DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<SolveOutcome, SolverError>
where
    F: Fn(&DVector<f64>) -> DVector<f64> + 'static,
{
    let mut NR_instanse = NR::new();
    NR_instanse.set_equation_system(Box::new(fun), initial_guess, tolerance, max_iterations)?;
    NR_instanse.main_loop()
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     TESTS
////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utils::task_parser::parse_document;
    use approx::assert_relative_eq;

    fn circle_and_line(x: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![x[0] * x[0] + x[1] * x[1] - 10.0, x[0] - x[1] - 4.0])
    }

    fn sqrt2_solver() -> NR {
        let mut NR_instanse = NR::new();
        NR_instanse
            .set_equation_system(
                Box::new(|x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] - 2.0])),
                DVector::from_vec(vec![1.0]),
                1e-6,
                50,
            )
            .unwrap();
        NR_instanse
    }

    #[test]
    fn test_NR_sqrt2() {
        let mut NR_instanse = sqrt2_solver();
        let outcome = NR_instanse.main_loop().unwrap();
        assert!(outcome.is_converged());
        assert!(outcome.iterations() <= 6);
        assert_relative_eq!(
            NR_instanse.get_result().unwrap()[0],
            2f64.sqrt(),
            epsilon = 1e-6
        );
        assert_eq!(NR_instanse.get_trace().len(), outcome.iterations());
    }

    #[test]
    fn test_NR_circle_and_line() {
        let outcome =
            newton_raphson(circle_and_line, DVector::from_vec(vec![1.0, 1.0]), 1e-6, 100).unwrap();
        let solution = outcome.solution().unwrap();
        assert_relative_eq!(solution[0], 3.0, epsilon = 1e-6);
        assert_relative_eq!(solution[1], -1.0, epsilon = 1e-6);
        // the first record holds the initial guess
        let first = &outcome.trace().records()[0];
        assert_eq!(first.iteration, 1);
        assert_eq!(first.x, DVector::from_vec(vec![1.0, 1.0]));
        assert_relative_eq!(first.residual_norm, (64.0f64 + 16.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_NR_market_equilibrium() {
        let market = |x: &DVector<f64>| {
            let (p, q) = (x[0], x[1]);
            DVector::from_vec(vec![
                20.0 * 1.5f64.powf(q / 100.0) - p,
                (2000.0 - q).powf(0.7) - p,
            ])
        };
        let outcome = newton_raphson(market, DVector::zeros(2), 1e-6, 50).unwrap();
        let solution = outcome.solution().unwrap();
        assert_relative_eq!(solution[0], 165.55, epsilon = 1e-2);
        assert_relative_eq!(solution[1], 521.26, epsilon = 1e-2);
        assert!(market(solution).norm() < 1e-6);
    }

    #[test]
    fn test_NR_cournot() {
        let cournot = |q: &DVector<f64>| {
            DVector::from_vec(vec![
                5.0 - 0.5 * q[1] - 0.3 * q[2] - q[0],
                7.0 - 0.6 * q[0] - 0.1 * q[2] - q[1],
                4.0 - 0.2 * q[0] - 0.4 * q[1] - q[2],
            ])
        };
        let outcome = newton_raphson(cournot, DVector::zeros(3), 1e-6, 50).unwrap();
        // linear system: one Newton step lands on the solution
        assert_eq!(outcome.iterations(), 2);
        let solution = outcome.solution().unwrap();
        assert_relative_eq!(solution[0], 1.67, epsilon = 1e-2);
        assert_relative_eq!(solution[1], 5.87, epsilon = 1e-2);
        assert_relative_eq!(solution[2], 1.32, epsilon = 1e-2);
    }

    #[test]
    fn test_NR_analytic_and_numerical_jacobian_agree() {
        let mut numerical = NR::new();
        numerical
            .set_equation_system(Box::new(circle_and_line), DVector::from_vec(vec![1.0, 1.0]), 1e-8, 50)
            .unwrap();
        let mut analytic = NR::new();
        analytic
            .set_equation_system(Box::new(circle_and_line), DVector::from_vec(vec![1.0, 1.0]), 1e-8, 50)
            .unwrap();
        analytic.set_jacobian(Box::new(|x: &DVector<f64>| {
            DMatrix::from_row_slice(2, 2, &[2.0 * x[0], 2.0 * x[1], 1.0, -1.0])
        }));
        let a = analytic.main_loop().unwrap();
        let n = numerical.main_loop().unwrap();
        assert_relative_eq!(a.solution().unwrap(), n.solution().unwrap(), epsilon = 1e-7);
        assert_eq!(a.iterations(), n.iterations());
        // analytic jacobian costs no extra function evaluations
        assert_eq!(
            analytic.get_statistics().function_evaluations,
            a.iterations()
        );
        assert!(numerical.get_statistics().function_evaluations > n.iterations());
    }

    #[test]
    fn test_NR_singular_analytic_jacobian() {
        let mut NR_instanse = NR::new();
        NR_instanse
            .set_equation_system(
                Box::new(|x: &DVector<f64>| {
                    DVector::from_vec(vec![x[0] + x[1] - 1.0, 2.0 * x[0] + 2.0 * x[1] - 1.0])
                }),
                DVector::zeros(2),
                1e-6,
                50,
            )
            .unwrap();
        NR_instanse.set_jacobian(Box::new(|_x: &DVector<f64>| {
            DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 2.0])
        }));
        assert_eq!(
            NR_instanse.main_loop(),
            Err(SolverError::SingularJacobian { iteration: 1 })
        );
        assert!(NR_instanse.get_result().is_none());
    }

    #[test]
    fn test_NR_singular_numerical_jacobian() {
        let parallel_lines = |x: &DVector<f64>| {
            DVector::from_vec(vec![x[0] + x[1] - 1.0, 2.0 * x[0] + 2.0 * x[1] - 1.0])
        };
        let res = newton_raphson(parallel_lines, DVector::zeros(2), 1e-6, 50);
        assert_eq!(res, Err(SolverError::SingularJacobian { iteration: 1 }));
    }

    #[test]
    fn test_NR_not_converged_returns_full_trace() {
        // x^2 + 1 = 0 has no real roots, every Newton step is at least 1 long
        let no_root = |x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] + 1.0]);
        let outcome = newton_raphson(no_root, DVector::from_vec(vec![0.5]), 1e-6, 5).unwrap();
        match &outcome {
            SolveOutcome::NotConverged {
                trace,
                iterations_run,
            } => {
                assert_eq!(*iterations_run, 5);
                assert_eq!(trace.len(), 5);
                assert!(trace.iter().all(|r| r.residual_norm >= 1.0 && r.step_norm >= 1.0 - 1e-6));
            }
            _ => panic!("x^2 + 1 = 0 has no real solution"),
        }
        assert_eq!(
            outcome.into_solution(),
            Err(SolverError::DidNotConverge { iterations: 5 })
        );
    }

    #[test]
    fn test_NR_damping_slows_convergence() {
        let mut full = sqrt2_solver();
        let full_steps = full.main_loop().unwrap().iterations();
        let mut damped = sqrt2_solver();
        damped.max_iterations = 100;
        damped.set_solver_params(None, None, Some(0.5), None).unwrap();
        let outcome = damped.main_loop().unwrap();
        assert!(outcome.is_converged());
        assert!(outcome.iterations() > full_steps);
        assert_relative_eq!(damped.get_result().unwrap()[0], 2f64.sqrt(), epsilon = 1e-5);
        assert!(damped.set_solver_params(None, None, Some(1.5), None).is_err());
        assert!(damped.set_solver_params(None, None, Some(0.0), None).is_err());
    }

    #[test]
    fn test_NR_inverse_and_forward_scheme() {
        let mut NR_instanse = NR::new();
        NR_instanse
            .set_equation_system(Box::new(circle_and_line), DVector::from_vec(vec![1.0, 1.0]), 1e-6, 100)
            .unwrap();
        NR_instanse
            .set_solver_params(
                Some("off".to_string()),
                Some(LinearSysMethod::Inv),
                None,
                Some(DiffScheme::Forward),
            )
            .unwrap();
        let outcome = NR_instanse.solve().unwrap();
        assert!(outcome.is_converged());
        assert_relative_eq!(
            NR_instanse.get_result().unwrap(),
            DVector::from_vec(vec![3.0, -1.0]),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_NR_failed_run_replaces_previous_trace() {
        let mut NR_instanse = sqrt2_solver();
        NR_instanse.main_loop().unwrap();
        assert_eq!(NR_instanse.get_trace().len(), 5);
        // f'(0) = 0
        NR_instanse.initial_guess = DVector::from_vec(vec![0.0]);
        assert_eq!(
            NR_instanse.main_loop(),
            Err(SolverError::SingularJacobian { iteration: 1 })
        );
        assert!(NR_instanse.get_trace().is_empty());
        assert!(NR_instanse.get_result().is_none());
        assert_eq!(NR_instanse.get_statistics().iterations, 1);
    }

    #[test]
    fn test_NR_failed_run_keeps_partial_trace() {
        // ln(x): the first full step from x = 3 lands at x < 0
        let mut NR_instanse = NR::new();
        NR_instanse
            .set_equation_system(
                Box::new(|x: &DVector<f64>| DVector::from_vec(vec![x[0].ln()])),
                DVector::from_vec(vec![3.0]),
                1e-10,
                50,
            )
            .unwrap();
        NR_instanse.set_jacobian(Box::new(|x: &DVector<f64>| {
            DMatrix::from_element(1, 1, 1.0 / x[0])
        }));
        let res = NR_instanse.main_loop();
        assert_eq!(res, Err(SolverError::NonFiniteValue { iteration: 2 }));
        assert_eq!(NR_instanse.get_trace().len(), 1);
        assert_eq!(NR_instanse.get_trace().records()[0].x[0], 3.0);
    }

    #[test]
    fn test_NR_step_criterion_returns_updated_point() {
        // scaled so that the residual is still above tolerance when the step falls below it
        let mut NR_instanse = NR::new();
        NR_instanse
            .set_equation_system(
                Box::new(|x: &DVector<f64>| DVector::from_vec(vec![1e3 * (x[0] * x[0] - 2.0)])),
                DVector::from_vec(vec![1.0]),
                1e-5,
                50,
            )
            .unwrap();
        NR_instanse.set_jacobian(Box::new(|x: &DVector<f64>| {
            DMatrix::from_element(1, 1, 2e3 * x[0])
        }));
        let outcome = NR_instanse.main_loop().unwrap();
        let SolveOutcome::Converged { solution, reason, trace } = outcome else {
            panic!("x^2 = 2 must converge");
        };
        assert_eq!(reason, ConvergenceReason::StepNorm);
        assert_eq!(trace.len(), 4);
        let last = trace.last().unwrap();
        assert!(last.step_norm < 1e-5);
        assert!(last.residual_norm > 1e-5);
        // the trace holds the point where F was evaluated, the solution is one step further
        assert_relative_eq!(last.x[0], 1.4142156862745099, epsilon = 1e-12);
        assert_relative_eq!(solution[0], 2f64.sqrt(), epsilon = 1e-10);
        assert!((last.x[0] - solution[0]).abs() > 1e-6);
        assert_eq!(NR_instanse.get_result(), Some(solution));
    }

    #[test]
    fn test_NR_residual_criterion_at_exact_root() {
        let outcome =
            newton_raphson(circle_and_line, DVector::from_vec(vec![3.0, -1.0]), 1e-6, 10).unwrap();
        match outcome {
            SolveOutcome::Converged { reason, trace, .. } => {
                assert_eq!(reason, ConvergenceReason::ResidualNorm);
                assert_eq!(trace.len(), 1);
            }
            _ => panic!("initial guess is the root"),
        }
    }

    #[test]
    fn test_NR_non_finite_and_dimension_errors() {
        let nan_fun = |x: &DVector<f64>| DVector::from_vec(vec![(x[0] - 5.0).sqrt()]);
        assert_eq!(
            newton_raphson(nan_fun, DVector::from_vec(vec![1.0]), 1e-6, 10),
            Err(SolverError::NonFiniteValue { iteration: 1 })
        );
        let wrong_len = |_x: &DVector<f64>| DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            newton_raphson(wrong_len, DVector::zeros(2), 1e-6, 10),
            Err(SolverError::DimensionMismatch { expected: 2, found: 3, .. })
        ));
        assert!(matches!(
            newton_raphson(circle_and_line, DVector::zeros(0), 1e-6, 10),
            Err(SolverError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_NR_params_from_task() {
        let task = parse_document(
            "newton\ntolerance: 1e-9\nmax_iterations: 60\ndamping_factor: 0.8\nlinear_sys_method: inv\ndiff_scheme: forward\ninitial_guess: 1.0, 1.0\nloglevel: off",
        )
        .unwrap();
        let mut NR_instanse = NR::new();
        NR_instanse.fun = Some(Box::new(circle_and_line));
        NR_instanse.set_params_from_task(&task).unwrap();
        assert_eq!(NR_instanse.tolerance, 1e-9);
        assert_eq!(NR_instanse.max_iterations, 60);
        assert_eq!(NR_instanse.damping_factor, 0.8);
        assert_eq!(NR_instanse.linear_sys_method, LinearSysMethod::Inv);
        assert_eq!(NR_instanse.diff_scheme, DiffScheme::Forward);
        assert_eq!(NR_instanse.initial_guess, DVector::from_vec(vec![1.0, 1.0]));
        let outcome = NR_instanse.solve().unwrap();
        assert!(outcome.is_converged());

        let bad = parse_document("newton\nlinear_sys_method: qr").unwrap();
        assert!(matches!(
            NR_instanse.set_params_from_task(&bad),
            Err(SolverError::Task(_))
        ));
    }
}
