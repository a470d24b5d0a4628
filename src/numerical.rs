/// Newton-Raphson solver for systems of nonlinear equations
/// ```
/// use RustedNumMethods::numerical::NR::newton_raphson;
/// use nalgebra::DVector;
/// let F = |x: &DVector<f64>| DVector::from_vec(vec![x[0] * x[0] - 2.0]);
/// let outcome = newton_raphson(F, DVector::from_vec(vec![1.0]), 1e-6, 50).unwrap();
/// assert!((outcome.solution().unwrap()[0] - 2f64.sqrt()).abs() < 1e-6);
/// ```
pub mod NR;
/// finite difference approximation of the Jacobian
pub mod num_jacobian;
/// iteration table and tagged result shared by all iterative solvers
pub mod iteration_log;
pub mod solver_errors;
/// trapezoid, Simpson, Gauss-Legendre, Gauss-Chebyshev and adaptive rules, parameter sweeps
pub mod quadrature;
