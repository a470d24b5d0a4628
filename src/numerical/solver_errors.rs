use std::fmt;

/// Error types for the iterative equation solvers
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// D (Gauss-Jacobi) or D-L (Gauss-Seidel) cannot be inverted
    SingularDecomposition { method: String, detail: String },
    /// Newton step J*dx = -F(x) has no unique solution
    SingularJacobian { iteration: usize },
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    InvalidParameter(String),
    /// F(x) produced NaN or infinity
    NonFiniteValue { iteration: usize },
    DidNotConverge { iterations: usize },
    /// malformed task document
    Task(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolverError::SingularDecomposition { method, detail } => {
                write!(f, "Singular decomposition in {} method: {}", method, detail)
            }
            SolverError::SingularJacobian { iteration } => {
                write!(f, "Singular Jacobian at iteration {}", iteration)
            }
            SolverError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "Dimension mismatch for {}: expected {}, found {}",
                what, expected, found
            ),
            SolverError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SolverError::NonFiniteValue { iteration } => write!(
                f,
                "Function returned non-finite values at iteration {}",
                iteration
            ),
            SolverError::DidNotConverge { iterations } => write!(
                f,
                "No solution found within {} iterations",
                iterations
            ),
            SolverError::Task(msg) => write!(f, "Task document error: {}", msg),
        }
    }
}

impl std::error::Error for SolverError {}
