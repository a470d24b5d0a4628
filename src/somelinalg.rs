//! some linear algebra functions used throughout the code
/// Gauss-Jacobi and Gauss-Seidel iterations for A x = b
pub mod iterative_solvers_cpu;
/// diagnostics for linear systems and matrices: if it is singular
/// or poorly conditioned
pub mod linear_sys_diagnostics;
