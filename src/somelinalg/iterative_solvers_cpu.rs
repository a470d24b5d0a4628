//! Stationary iterative methods for A x = b: Gauss-Jacobi and Gauss-Seidel.
//!
//! The coefficient matrix is split as A = D - L - U, where D is the diagonal of A and L, U are
//! the strictly lower and strictly upper parts of A with flipped sign.
//! * Gauss-Jacobi:  x_(k+1) = D^-1 (b + (L + U) x_k)
//! * Gauss-Seidel:  x_(k+1) = (D - L)^-1 (b + U x_k), the lower triangular system is solved by
//!   forward substitution, so the components updated on this sweep are used at once.
//!
//! Iterations stop when ||x_(k+1) - x_k|| < tolerance. Both methods converge for any initial guess
//! if A is strictly diagonally dominant.
//! ```
//! use RustedNumMethods::somelinalg::iterative_solvers_cpu::{LinearIterativeSolver, IterativeMethod};
//! use nalgebra::{DMatrix, DVector};
//! let A = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
//! let b = DVector::from_vec(vec![1.0, 2.0]);
//! let mut solver = LinearIterativeSolver::new();
//! solver.set_linear_system(A, b, DVector::zeros(2), 1e-10, 100).unwrap();
//! solver.set_solver_params(Some(IterativeMethod::GaussSeidel), Some("off".to_string())).unwrap();
//! let outcome = solver.solve().unwrap();
//! let x = outcome.solution().unwrap();
//! assert!((x[0] - 1.0 / 11.0).abs() < 1e-8);
//! ```
use crate::Utils::logger::{init_logger, parse_loglevel, statistics_table};
use crate::Utils::task_parser::{
    DocumentMap, get_bool, get_f64, get_string, get_usize, unknown_keys,
};
use crate::numerical::iteration_log::{ConvergenceReason, IterationLog, SolveOutcome};
use crate::numerical::solver_errors::SolverError;
use crate::somelinalg::linear_sys_diagnostics::{
    is_diagonally_dominant, lu_is_singular, negligible_diagonal_rows, spectral_radius,
};
use log::{error, info, warn};
use nalgebra::{DMatrix, DVector};
use std::str::FromStr;
use std::time::Instant;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum IterativeMethod {
    #[default]
    #[strum(to_string = "GaussJacobi", serialize = "jacobi", serialize = "gj")]
    GaussJacobi,
    #[strum(to_string = "GaussSeidel", serialize = "seidel", serialize = "gs")]
    GaussSeidel,
}

/// A = D - L - U
#[derive(Debug, Clone)]
pub struct DLUSplitting {
    /// diagonal of A
    pub D: DVector<f64>,
    /// minus the strictly lower part of A
    pub L: DMatrix<f64>,
    /// minus the strictly upper part of A
    pub U: DMatrix<f64>,
    /// D - L, lower triangular
    D_minus_L: DMatrix<f64>,
    /// L + U
    L_plus_U: DMatrix<f64>,
}

impl DLUSplitting {
    pub fn new(A: &DMatrix<f64>) -> DLUSplitting {
        let D = A.diagonal();
        let L = -A.lower_triangle() + DMatrix::from_diagonal(&D);
        let U = -A.upper_triangle() + DMatrix::from_diagonal(&D);
        let D_minus_L = DMatrix::from_diagonal(&D) - &L;
        let L_plus_U = &L + &U;
        DLUSplitting {
            D,
            L,
            U,
            D_minus_L,
            L_plus_U,
        }
    }

    /// matrix M of the iteration x_(k+1) = M x_k + c; None if D or D - L is singular
    pub fn iteration_matrix(&self, method: IterativeMethod) -> Option<DMatrix<f64>> {
        match method {
            IterativeMethod::GaussJacobi => {
                if self.D.iter().any(|d| *d == 0.0) {
                    return None;
                }
                let D_inv = DMatrix::from_diagonal(&self.D.map(|d| 1.0 / d));
                Some(D_inv * &self.L_plus_U)
            }
            IterativeMethod::GaussSeidel => self.D_minus_L.solve_lower_triangular(&self.U),
        }
    }

    /// one sweep of the method: x_k -> x_(k+1)
    pub fn step(
        &self,
        method: IterativeMethod,
        b: &DVector<f64>,
        x: &DVector<f64>,
    ) -> Result<DVector<f64>, SolverError> {
        match method {
            IterativeMethod::GaussJacobi => {
                let rhs = b + &self.L_plus_U * x;
                Ok(rhs.component_div(&self.D))
            }
            IterativeMethod::GaussSeidel => {
                let rhs = b + &self.U * x;
                self.D_minus_L
                    .solve_lower_triangular(&rhs)
                    .ok_or_else(|| SolverError::SingularDecomposition {
                        method: method.to_string(),
                        detail: "D - L is not invertible".to_string(),
                    })
            }
        }
    }
}

pub struct LinearIterativeSolver {
    pub A: DMatrix<f64>,             // coefficient matrix
    pub b: DVector<f64>,             // constant vector
    pub initial_guess: DVector<f64>, // initial guess
    pub tolerance: f64,              // tolerance for the norm of the update
    pub max_iterations: usize,       // max number of iterations
    pub method: IterativeMethod,
    pub loglevel: Option<String>,
    pub save_log: bool,
    pub i: usize,                     // iteration counter
    pub result: Option<DVector<f64>>, // result of the iteration
    trace: IterationLog,
}

impl LinearIterativeSolver {
    pub fn new() -> LinearIterativeSolver {
        LinearIterativeSolver {
            A: DMatrix::zeros(0, 0),
            b: DVector::zeros(0),
            initial_guess: DVector::zeros(0),
            tolerance: 1e-6,
            max_iterations: 100,
            method: IterativeMethod::GaussJacobi,
            loglevel: Some("info".to_string()),
            save_log: false,
            i: 0,
            result: None,
            trace: IterationLog::new(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn set_linear_system(
        &mut self,
        A: DMatrix<f64>,
        b: DVector<f64>,
        initial_guess: DVector<f64>,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<(), SolverError> {
        self.A = A;
        self.b = b;
        self.initial_guess = initial_guess;
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self.check_input()
    }

    pub fn set_solver_params(
        &mut self,
        method: Option<IterativeMethod>,
        loglevel: Option<String>,
    ) -> Result<(), SolverError> {
        if let Some(method) = method {
            self.method = method;
        }
        if let Some(level) = loglevel {
            parse_loglevel(&level)?;
            self.loglevel = Some(level);
        }
        Ok(())
    }

    /// read the "linear" section of a task document:
    /// method, tolerance, max_iterations, loglevel, save_log
    pub fn set_params_from_task(&mut self, task: &DocumentMap) -> Result<(), SolverError> {
        let Some(section) = task.get("linear") else {
            return Err(SolverError::Task("no 'linear' section in task".to_string()));
        };
        let unknown = unknown_keys(
            section,
            &["method", "tolerance", "max_iterations", "loglevel", "save_log"],
        );
        if !unknown.is_empty() {
            warn!("unknown keys in 'linear' section are ignored: {:?}", unknown);
        }
        let method = get_string(section, "method")
            .map_err(SolverError::Task)?
            .map(|m| {
                IterativeMethod::from_str(&m)
                    .map_err(|_| SolverError::Task(format!("unknown iterative method '{}'", m)))
            })
            .transpose()?;
        if let Some(tolerance) = get_f64(section, "tolerance").map_err(SolverError::Task)? {
            self.tolerance = tolerance;
        }
        if let Some(max_iterations) =
            get_usize(section, "max_iterations").map_err(SolverError::Task)?
        {
            self.max_iterations = max_iterations;
        }
        if let Some(save_log) = get_bool(section, "save_log").map_err(SolverError::Task)? {
            self.save_log = save_log;
        }
        let loglevel = get_string(section, "loglevel").map_err(SolverError::Task)?;
        self.set_solver_params(method, loglevel)
    }

    fn check_input(&self) -> Result<(), SolverError> {
        let (n, m) = self.A.shape();
        if n == 0 {
            return Err(SolverError::InvalidParameter(
                "coefficient matrix is empty".to_string(),
            ));
        }
        if n != m {
            return Err(SolverError::DimensionMismatch {
                what: "number of columns of the coefficient matrix".to_string(),
                expected: n,
                found: m,
            });
        }
        if self.b.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "constant vector".to_string(),
                expected: n,
                found: self.b.len(),
            });
        }
        if self.initial_guess.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "initial guess".to_string(),
                expected: n,
                found: self.initial_guess.len(),
            });
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
    pub fn main_loop(&mut self) -> Result<SolveOutcome, SolverError> {
        self.check_input()?;
        self.i = 0;
        self.result = None;
        self.trace = IterationLog::new();
        let method = self.method;

        let singular_rows = negligible_diagonal_rows(&self.A);
        if !singular_rows.is_empty() {
            error!(
                "zero diagonal elements in rows {:?}, {} cannot proceed",
                singular_rows, method
            );
            return Err(SolverError::SingularDecomposition {
                method: method.to_string(),
                detail: format!("zero or negligible diagonal element in rows {:?}", singular_rows),
            });
        }
        // a nonzero diagonal does not make A regular, a singular A has no unique solution
        if lu_is_singular(&self.A.clone().lu()) {
            error!("coefficient matrix is singular, {} cannot proceed", method);
            return Err(SolverError::SingularDecomposition {
                method: method.to_string(),
                detail: "coefficient matrix is singular".to_string(),
            });
        }
        let splitting = DLUSplitting::new(&self.A);
        if !is_diagonally_dominant(&self.A) {
            warn!("convergence of {} is not guaranteed", method);
        }
        if let Some(rho) = splitting
            .iteration_matrix(method)
            .and_then(|M| spectral_radius(&M))
        {
            if rho < 1.0 {
                info!("spectral radius of {} iteration matrix = {:.6}", method, rho);
            } else {
                warn!(
                    "spectral radius of {} iteration matrix = {:.6} >= 1, iterations are expected to diverge",
                    method, rho
                );
            }
        }

        let mut x = self.initial_guess.clone();
        let mut trace = IterationLog::new();
        for iteration in 1..=self.max_iterations {
            self.i = iteration;
            let x_new = splitting.step(method, &self.b, &x)?;
            if x_new.iter().any(|v| !v.is_finite()) {
                error!(
                    "iterate became non-finite on iteration {}, {} diverges",
                    iteration, method
                );
                self.trace = trace.clone();
                // the non-finite iterate is not recorded
                return Ok(SolveOutcome::NotConverged {
                    trace,
                    iterations_run: iteration - 1,
                });
            }
            let step_norm = (&x_new - &x).norm();
            let residual_norm = (&self.b - &self.A * &x_new).norm();
            trace.push(iteration, residual_norm, step_norm, x_new.clone());
            info!(
                "iteration = {}, step norm = {:.3e}, residual norm = {:.3e}",
                iteration, step_norm, residual_norm
            );
            x = x_new;
            if step_norm < self.tolerance {
                info!("A solution has been found during iteration {}", iteration);
                self.result = Some(x.clone());
                self.trace = trace.clone();
                return Ok(SolveOutcome::Converged {
                    solution: x,
                    reason: ConvergenceReason::StepNorm,
                    trace,
                });
            }
        }
        error!("No solution was found in the given iterations");
        self.trace = trace.clone();
        Ok(SolveOutcome::NotConverged {
            trace,
            iterations_run: self.max_iterations,
        })
    }

    /// wrapper around main_loop: sets up logging and reports statistics
    pub fn solve(&mut self) -> Result<SolveOutcome, SolverError> {
        let logging = init_logger(&self.loglevel, self.save_log)?;
        let begin = Instant::now();
        let outcome = self.main_loop()?;
        let elapsed = begin.elapsed();
        if logging {
            if outcome.is_converged() {
                info!("\n The output at each iteration: \n{}", outcome.trace().to_table());
            }
            let table = statistics_table(&[
                ("method", self.method.to_string()),
                ("converged", outcome.is_converged().to_string()),
                ("number of iterations", outcome.iterations().to_string()),
                ("length of x vector", self.b.len().to_string()),
                ("time elapsed, ms", elapsed.as_millis().to_string()),
            ]);
            info!("\n \n CALC STATISTICS \n \n {}", table);
        }
        Ok(outcome)
    }

    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result.clone()
    }

    pub fn get_trace(&self) -> &IterationLog {
        &self.trace
    }
}

impl Default for LinearIterativeSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn solve_with(
    method: IterativeMethod,
    coef: &DMatrix<f64>,
    cons: &DVector<f64>,
    inx: &DVector<f64>,
    maxiter: usize,
    tol: f64,
) -> Result<SolveOutcome, SolverError> {
    let mut solver = LinearIterativeSolver::new();
    solver.set_linear_system(coef.clone(), cons.clone(), inx.clone(), tol, maxiter)?;
    solver.method = method;
    solver.main_loop()
}

/// Gauss-Jacobi iterations for coef * x = cons starting from inx
pub fn gauss_jacobi(
    coef: &DMatrix<f64>,
    cons: &DVector<f64>,
    inx: &DVector<f64>,
    maxiter: usize,
    tol: f64,
) -> Result<SolveOutcome, SolverError> {
    solve_with(IterativeMethod::GaussJacobi, coef, cons, inx, maxiter, tol)
}

/// Gauss-Seidel iterations for coef * x = cons starting from inx
pub fn gauss_seidel(
    coef: &DMatrix<f64>,
    cons: &DVector<f64>,
    inx: &DVector<f64>,
    maxiter: usize,
    tol: f64,
) -> Result<SolveOutcome, SolverError> {
    solve_with(IterativeMethod::GaussSeidel, coef, cons, inx, maxiter, tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utils::task_parser::parse_document;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    fn small_system() -> (DMatrix<f64>, DVector<f64>) {
        (
            DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]),
            DVector::from_vec(vec![1.0, 2.0]),
        )
    }

    /// classic diagonally dominant 4x4 example with solution [1, 2, -1, 1]
    fn four_by_four() -> (DMatrix<f64>, DVector<f64>) {
        (
            DMatrix::from_row_slice(
                4,
                4,
                &[
                    10.0, -1.0, 2.0, 0.0, -1.0, 11.0, -1.0, 3.0, 2.0, -1.0, 10.0, -1.0, 0.0, 3.0,
                    -1.0, 8.0,
                ],
            ),
            DVector::from_vec(vec![6.0, 25.0, -11.0, 15.0]),
        )
    }

    #[test]
    fn test_splitting_reassembles_matrix() {
        let (A, _) = four_by_four();
        let s = DLUSplitting::new(&A);
        let reassembled = DMatrix::from_diagonal(&s.D) - &s.L - &s.U;
        assert_relative_eq!(reassembled, A, epsilon = 1e-14);
        assert_eq!(s.L[(1, 0)], 1.0);
        assert_eq!(s.U[(0, 2)], -2.0);
        assert_eq!(s.L[(0, 1)], 0.0);
    }

    #[test]
    fn test_jacobi_and_seidel_match_direct_solution() {
        let (A, b) = small_system();
        let direct = A.clone().lu().solve(&b).unwrap();
        let x0 = DVector::zeros(2);
        let jacobi = gauss_jacobi(&A, &b, &x0, 100, 1e-10).unwrap();
        let seidel = gauss_seidel(&A, &b, &x0, 100, 1e-10).unwrap();
        for outcome in [&jacobi, &seidel] {
            let x = outcome.solution().unwrap();
            assert_relative_eq!(x[0], 0.0909, epsilon = 1e-4);
            assert_relative_eq!(x[1], 0.6364, epsilon = 1e-4);
            assert_relative_eq!(*x, direct, epsilon = 1e-8);
        }
        assert!(seidel.iterations() < jacobi.iterations());
    }

    #[test]
    fn test_four_by_four_system() {
        let (A, b) = four_by_four();
        let expected = DVector::from_vec(vec![1.0, 2.0, -1.0, 1.0]);
        for method in IterativeMethod::iter() {
            let mut solver = LinearIterativeSolver::new();
            solver
                .set_linear_system(A.clone(), b.clone(), DVector::zeros(4), 1e-8, 100)
                .unwrap();
            solver.set_solver_params(Some(method), Some("off".to_string())).unwrap();
            let outcome = solver.solve().unwrap();
            assert!(outcome.is_converged(), "{} did not converge", method);
            assert_relative_eq!(solver.get_result().unwrap(), expected, epsilon = 1e-6);
            assert_eq!(solver.get_trace().len(), outcome.iterations());
        }
    }

    #[test]
    fn test_trace_records_every_iteration() {
        let (A, b) = small_system();
        let outcome = gauss_jacobi(&A, &b, &DVector::zeros(2), 100, 1e-10).unwrap();
        let trace = outcome.trace();
        for (k, record) in trace.iter().enumerate() {
            assert_eq!(record.iteration, k + 1);
        }
        let last = trace.last().unwrap();
        assert!(last.step_norm < 1e-10);
        assert!(last.residual_norm < 1e-9);
        assert_eq!(&last.x, outcome.solution().unwrap());
        match outcome {
            SolveOutcome::Converged { reason, .. } => assert_eq!(reason, ConvergenceReason::StepNorm),
            _ => panic!("expected convergence"),
        }
    }

    #[test]
    fn test_not_converged_returns_partial_trace() {
        let (A, b) = small_system();
        let outcome = gauss_jacobi(&A, &b, &DVector::zeros(2), 3, 1e-12).unwrap();
        match &outcome {
            SolveOutcome::NotConverged {
                trace,
                iterations_run,
            } => {
                assert_eq!(*iterations_run, 3);
                assert_eq!(trace.len(), 3);
            }
            _ => panic!("three iterations cannot reach 1e-12"),
        }
        assert_eq!(
            outcome.into_solution(),
            Err(SolverError::DidNotConverge { iterations: 3 })
        );
    }

    #[test]
    fn test_zero_diagonal_is_singular_decomposition() {
        let A = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        for method in IterativeMethod::iter() {
            let res = solve_with(method, &A, &b, &DVector::zeros(2), 50, 1e-8);
            match res {
                Err(SolverError::SingularDecomposition { method: m, .. }) => {
                    assert_eq!(m, method.to_string())
                }
                other => panic!("expected singular decomposition, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_singular_matrix_with_nonzero_diagonal() {
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        // inconsistent and consistent right-hand sides
        for b in [vec![1.0, 2.0], vec![2.0, 2.0]] {
            let b = DVector::from_vec(b);
            for method in IterativeMethod::iter() {
                let res = solve_with(method, &A, &b, &DVector::zeros(2), 100, 1e-8);
                assert!(
                    matches!(res, Err(SolverError::SingularDecomposition { .. })),
                    "{} on a singular matrix returned {:?}",
                    method,
                    res
                );
            }
        }
        let mut solver = LinearIterativeSolver::new();
        solver
            .set_linear_system(A, DVector::from_vec(vec![2.0, 2.0]), DVector::zeros(2), 1e-8, 100)
            .unwrap();
        solver.set_solver_params(Some(IterativeMethod::GaussSeidel), Some("off".to_string())).unwrap();
        assert!(solver.solve().is_err());
        assert!(solver.get_result().is_none());
        assert!(solver.get_trace().is_empty());
    }

    #[test]
    fn test_divergent_system_stops_without_nan() {
        // not diagonally dominant: spectral radius of the Jacobi matrix is sqrt(6)
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        let outcome = gauss_jacobi(&A, &b, &DVector::zeros(2), 5000, 1e-8).unwrap();
        assert!(!outcome.is_converged());
        assert!(outcome.iterations() < 5000);
        assert_eq!(outcome.iterations(), outcome.trace().len());
        for record in outcome.trace() {
            assert!(record.x.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_dimension_checks() {
        let (A, b) = small_system();
        let mut solver = LinearIterativeSolver::new();
        let res = solver.set_linear_system(A.clone(), b.clone(), DVector::zeros(3), 1e-8, 10);
        assert!(matches!(res, Err(SolverError::DimensionMismatch { expected: 2, found: 3, .. })));
        let res = solver.set_linear_system(
            DMatrix::zeros(2, 3),
            b.clone(),
            DVector::zeros(2),
            1e-8,
            10,
        );
        assert!(matches!(res, Err(SolverError::DimensionMismatch { .. })));
        let res = solver.set_linear_system(A, b, DVector::zeros(2), 1e-8, 0);
        assert!(matches!(res, Err(SolverError::InvalidParameter(_))));
    }

    #[test]
    fn test_iteration_matrix() {
        let (A, _) = small_system();
        let s = DLUSplitting::new(&A);
        let M = s.iteration_matrix(IterativeMethod::GaussJacobi).unwrap();
        assert_relative_eq!(M[(0, 1)], -0.25, epsilon = 1e-15);
        let rho_j = spectral_radius(&M).unwrap();
        let rho_gs = spectral_radius(&s.iteration_matrix(IterativeMethod::GaussSeidel).unwrap()).unwrap();
        // for consistently ordered matrices rho_GS = rho_J^2
        assert_relative_eq!(rho_gs, rho_j * rho_j, epsilon = 1e-10);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(IterativeMethod::from_str("seidel").unwrap(), IterativeMethod::GaussSeidel);
        assert_eq!(IterativeMethod::from_str("GaussJacobi").unwrap(), IterativeMethod::GaussJacobi);
        assert_eq!(IterativeMethod::from_str("GJ").unwrap(), IterativeMethod::GaussJacobi);
        assert!(IterativeMethod::from_str("sor").is_err());
    }

    #[test]
    fn test_params_from_task() {
        let task = parse_document(
            "linear\nmethod: seidel\ntolerance: 1e-9\nmax_iterations: 40\nloglevel: off\nsave_log: false",
        )
        .unwrap();
        let mut solver = LinearIterativeSolver::new();
        solver.set_params_from_task(&task).unwrap();
        assert_eq!(solver.method, IterativeMethod::GaussSeidel);
        assert_eq!(solver.tolerance, 1e-9);
        assert_eq!(solver.max_iterations, 40);
        assert_eq!(solver.loglevel, Some("off".to_string()));

        let bad = parse_document("linear\nmethod: sor").unwrap();
        assert!(matches!(solver.set_params_from_task(&bad), Err(SolverError::Task(_))));
        let missing = parse_document("newton\ntolerance: 1e-9").unwrap();
        assert!(solver.set_params_from_task(&missing).is_err());
    }
}
