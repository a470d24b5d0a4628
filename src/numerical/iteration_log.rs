//! Iteration trace shared by the Newton-Raphson and Gauss-Jacobi/Gauss-Seidel solvers
//! and the tagged outcome every solver returns.
//!
//! The trace is diagnostic only: the solvers write into it but never read it back.
use crate::numerical::solver_errors::SolverError;
use nalgebra::{DMatrix, DVector};
use strum_macros::Display;
use tabled::{builder::Builder, settings::Style};

/// one row of the iteration table
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    /// ||F(x)|| for Newton-Raphson, ||b - A x|| for linear solvers
    pub residual_norm: f64,
    /// ||dx||, norm of the update made on this iteration. 0.0 on a Newton row that stopped
    /// on the residual test, where no step is computed
    pub step_norm: f64,
    pub x: DVector<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationLog {
    records: Vec<IterationRecord>,
}

impl IterationLog {
    pub fn new() -> Self {
        IterationLog {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, iteration: usize, residual_norm: f64, step_norm: f64, x: DVector<f64>) {
        self.records.push(IterationRecord {
            iteration,
            residual_norm,
            step_norm,
            x,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IterationRecord> {
        self.records.iter()
    }

    /// column names: "Iteration #", "F norm", "D norm", "X_0" ... "X_{n-1}"
    pub fn headers(&self) -> Vec<String> {
        let n = self.records.first().map(|r| r.x.len()).unwrap_or(0);
        let mut headers = vec![
            "Iteration #".to_string(),
            "F norm".to_string(),
            "D norm".to_string(),
        ];
        headers.extend((0..n).map(|i| format!("X_{}", i)));
        headers
    }

    /// rows = iterations, columns as in `headers`
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let ncols = self.headers().len();
        DMatrix::from_fn(self.records.len(), ncols, |i, j| {
            let r = &self.records[i];
            match j {
                0 => r.iteration as f64,
                1 => r.residual_norm,
                2 => r.step_norm,
                _ => r.x[j - 3],
            }
        })
    }

    /// pretty table of the whole trace
    pub fn to_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers());
        for r in &self.records {
            let mut row = vec![
                r.iteration.to_string(),
                format!("{:.6e}", r.residual_norm),
                format!("{:.6e}", r.step_norm),
            ];
            row.extend(r.x.iter().map(|v| format!("{:.8}", v)));
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

impl<'a> IntoIterator for &'a IterationLog {
    type Item = &'a IterationRecord;
    type IntoIter = std::slice::Iter<'a, IterationRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// which stopping test fired
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum ConvergenceReason {
    #[strum(to_string = "residual norm below tolerance")]
    ResidualNorm,
    #[strum(to_string = "step norm below tolerance")]
    StepNorm,
}

/// Result of a completed solve. Running out of iterations is not an error:
/// the partial trace comes back in `NotConverged`.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Converged {
        solution: DVector<f64>,
        reason: ConvergenceReason,
        trace: IterationLog,
    },
    NotConverged {
        trace: IterationLog,
        iterations_run: usize,
    },
}

impl SolveOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolveOutcome::Converged { .. })
    }

    pub fn solution(&self) -> Option<&DVector<f64>> {
        match self {
            SolveOutcome::Converged { solution, .. } => Some(solution),
            SolveOutcome::NotConverged { .. } => None,
        }
    }

    pub fn trace(&self) -> &IterationLog {
        match self {
            SolveOutcome::Converged { trace, .. } => trace,
            SolveOutcome::NotConverged { trace, .. } => trace,
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            SolveOutcome::Converged { trace, .. } => trace.len(),
            SolveOutcome::NotConverged { iterations_run, .. } => *iterations_run,
        }
    }

    /// collapse into a plain Result, dropping the trace
    pub fn into_solution(self) -> Result<DVector<f64>, SolverError> {
        match self {
            SolveOutcome::Converged { solution, .. } => Ok(solution),
            SolveOutcome::NotConverged { iterations_run, .. } => {
                Err(SolverError::DidNotConverge {
                    iterations: iterations_run,
                })
            }
        }
    }
}
